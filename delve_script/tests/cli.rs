use std::fs;
use std::process::Command;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_delve_script"))
}

#[test]
fn compile_writes_the_output_and_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("game.delve");
    let output = dir.path().join("out.html");
    fs::write(&input, "init: user: unique_name=\"hero\" at (2,3)").unwrap();

    let result = bin()
        .arg("compile")
        .arg(&input)
        .arg(&output)
        .output()
        .expect("binary runs");

    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Successfully compiled"));
    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("\"unique_name\": \"hero\""));
}

#[test]
fn bare_invocation_implies_compile() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("game.delve");
    let output = dir.path().join("out.html");
    fs::write(&input, "init: user: unique_name=\"hero\" at (2,3)").unwrap();

    let result = bin().arg(&input).arg(&output).output().expect("binary runs");
    assert!(result.status.success());
    assert!(output.exists());
}

#[test]
fn missing_input_file_reports_and_exits_nonzero() {
    let result = bin()
        .arg("compile")
        .arg("/nonexistent/adventure.delve")
        .output()
        .expect("binary runs");

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Error: File '/nonexistent/adventure.delve' not found"));
}

#[test]
fn validation_failure_prints_every_diagnostic_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("game.delve");
    let output = dir.path().join("out.html");
    fs::write(
        &input,
        "init:\n\
         user: unique_name=\"p\"\n\
         items:\n\
         item-key: unique_name=\"key\" place at (1,1)\n\
         item-key: unique_name=\"key\" place at (2,2)",
    )
    .unwrap();

    let result = bin().arg("compile").arg(&input).arg(&output).output().expect("binary runs");

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Compilation errors found:"));
    assert!(stderr.contains("  ERROR: Duplicate unique_name: key"));
    assert!(stderr.contains("  ERROR: User must have an initial position"));
    assert!(!output.exists(), "no partial output on failure");
}

#[test]
fn syntax_error_prints_the_position() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("game.delve");
    fs::write(&input, "init: user: unique_name=\"p\" at (1,!)").unwrap();

    let result = bin().arg("compile").arg(&input).output().expect("binary runs");

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Syntax Error:"));
    assert!(stderr.contains("line 1"));
}

#[test]
fn lint_reports_ok_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("game.delve");
    fs::write(&input, "init: user: unique_name=\"hero\" at (2,3)").unwrap();

    let result = bin().arg("lint").arg(&input).output().expect("binary runs");
    assert!(result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("lint: OK"));
}

#[test]
fn usage_errors_exit_two() {
    let result = bin().output().expect("binary runs");
    assert_eq!(result.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Usage:"));
}
