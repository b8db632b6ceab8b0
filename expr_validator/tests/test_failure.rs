use std::{path::Path, process::Command};

#[test]
fn test_source_file_not_present() {
    let not_present = "tests/data/no.such.fn";

    let output = Command::new(env!("CARGO_BIN_EXE_expr_validator"))
        .arg("--source-path")
        .arg(Path::new(env!("CARGO_MANIFEST_DIR")).join(not_present))
        .output()
        .unwrap();

    assert!(!output.status.success());

    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("failed to read source file") && err_msg.contains(not_present));
}

#[test]
fn test_source_without_return() {
    let no_return = "tests/data/no_return.fn";

    let output = Command::new(env!("CARGO_BIN_EXE_expr_validator"))
        .arg("--source-path")
        .arg(Path::new(env!("CARGO_MANIFEST_DIR")).join(no_return))
        .output()
        .unwrap();

    assert!(!output.status.success());

    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("failed to extract expression") && err_msg.contains(no_return));
}

#[test]
fn test_source_with_free_variable() {
    let free_variable = "tests/data/free_variable.fn";

    let output = Command::new(env!("CARGO_BIN_EXE_expr_validator"))
        .arg("--source-path")
        .arg(Path::new(env!("CARGO_MANIFEST_DIR")).join(free_variable))
        .output()
        .unwrap();

    assert!(!output.status.success());

    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("failed to rewrite expression") && err_msg.contains(free_variable));
}
