#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = proclang::detect::shebang::detect_from_shebang(data);
});
