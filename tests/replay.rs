//! Tests running the `gremwire replay` binary against message files.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use gremwire_testing::{MessageBuilder, PARTIAL_FINAL_MESSAGE, PARTIAL_FIRST_MESSAGE, TestResult};
use serde_json::{Value, json};

fn scratch_dir(name: &str) -> TestResult<PathBuf> {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn write(dir: &Path, name: &str, contents: &[u8]) -> TestResult<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

fn replay(args: &[&Path], flags: &[&str]) -> TestResult<Value> {
    let output = Command::new(env!("CARGO_BIN_EXE_gremwire"))
        .arg("replay")
        .args(args)
        .args(flags)
        .output()?;
    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).into_owned().into());
    }
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn replay_prints_aggregated_entries() -> TestResult {
    let dir = scratch_dir("replay_aggregates")?;
    let first = write(&dir, "1.json", PARTIAL_FIRST_MESSAGE.as_bytes())?;
    let second = write(&dir, "2.json", PARTIAL_FINAL_MESSAGE.as_bytes())?;
    let failed = write(&dir, "3.json", &MessageBuilder::new("other", 401).build())?;
    let garbage = write(&dir, "4.json", b"not a message")?;

    let summary = replay(&[&first, &second, &failed, &garbage], &[])?;
    let entries = summary.as_array().ok_or("expected an array")?;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["requestId"], json!("1d6d02bd-8e56-421d-9438-3bd6d0079ff1"));
    assert_eq!(entries[0]["state"], json!("complete"));
    assert_eq!(entries[0]["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(entries[1]["requestId"], json!("other"));
    assert!(entries[1]["error"].as_str().is_some_and(|e| e.contains("401")));
    Ok(())
}

#[test]
fn replay_honours_partial_codes_and_drain() -> TestResult {
    let dir = scratch_dir("replay_drain")?;
    let custom = write(
        &dir,
        "1.json",
        &MessageBuilder::new("r1", 209).data(vec![json!(7)]).build(),
    )?;

    let pending = replay(&[&custom], &["--partial-code", "209"])?;
    assert_eq!(pending[0]["state"], json!("pending"));
    assert_eq!(pending[0]["data"], json!([7]));

    let drained = replay(&[&custom], &["--partial-code", "209", "--drain"])?;
    assert_eq!(drained[0]["state"], json!("complete"));
    assert!(
        drained[0]["error"]
            .as_str()
            .is_some_and(|e| e.contains("replay finished"))
    );
    Ok(())
}
