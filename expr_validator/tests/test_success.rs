use std::{path::Path, process::Command};

#[test]
fn test_valid_function() {
    let output = Command::new(env!("CARGO_BIN_EXE_expr_validator"))
        .arg("--source-path")
        .arg(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/cal.fn"))
        .output()
        .unwrap();

    assert!(output.status.success());
}
