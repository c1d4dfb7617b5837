// Classify running processes by pid and print the result as JSON.
//
//   cargo run --example classify_pid -- 1234 5678
//   cargo run --example classify_pid -- --config classifier.json 1234
//
// With no pid, classifies itself.
use anyhow::{bail, Context, Result};
use proclang::logging::init_tracing;
use proclang::{Classifier, ClassifierConfig, ProcessInfo, ProcfsDetector};
use std::fs;
use std::sync::Arc;

fn main() -> Result<()> {
    init_tracing();

    let mut config = ClassifierConfig::default();
    let mut pids = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let Some(path) = args.next() else {
                bail!("--config needs a path");
            };
            let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            config = ClassifierConfig::from_json(&text)?;
        } else {
            pids.push(arg.parse::<u32>().with_context(|| format!("bad pid {:?}", arg))?);
        }
    }
    if pids.is_empty() {
        pids.push(std::process::id());
    }

    let detector = ProcfsDetector::with_config(config.privileged.clone(), config.inspect.clone());
    let classifier = Classifier::new(config).with_detector(Arc::new(detector));

    for pid in pids {
        let info = match ProcessInfo::from_pid(pid) {
            Ok(info) => info,
            Err(err) => {
                eprintln!("pid {}: {}", pid, err);
                continue;
            }
        };
        let result = classifier.classify_detailed(&info);
        let line = serde_json::json!({
            "pid": pid,
            "command": info.command(),
            "language": result.language,
            "tier": result.tier,
        });
        println!("{}", line);
    }
    Ok(())
}
