#![no_main]
use libfuzzer_sys::fuzz_target;
use proclang::InspectConfig;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let config = InspectConfig::default();
    let _ = proclang::detect::signature::inspect_bytes(data, &config);
    let _ = proclang::inspect_reader(Cursor::new(data), &config);
});
