use std::path::Path;
use std::process::Command;

fn data(file: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(file)
}

#[test]
fn test_source_file_not_present() {
    let not_present = data("no.such.fn");

    let output = Command::new(env!("CARGO_BIN_EXE_expr_runner"))
        .arg("--source")
        .arg(&not_present)
        .output()
        .unwrap();

    assert!(!output.status.success());

    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(
        err_msg.contains("failed to read source file")
            && err_msg.contains(not_present.to_str().unwrap())
    );
}

#[test]
fn test_source_without_return() {
    let output = Command::new(env!("CARGO_BIN_EXE_expr_runner"))
        .arg("--source")
        .arg(data("no_return.fn"))
        .output()
        .unwrap();

    assert!(!output.status.success());

    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("no 'return' found in function body"));
}

#[test]
fn test_source_with_free_variable() {
    let output = Command::new(env!("CARGO_BIN_EXE_expr_runner"))
        .arg("--source")
        .arg(data("free_variable.fn"))
        .output()
        .unwrap();

    assert!(!output.status.success());

    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("undeclared identifier 'missing'"));
}
