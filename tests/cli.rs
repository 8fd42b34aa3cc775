use std::process::Command;

fn stackplot() -> Command {
    Command::new(env!("CARGO_BIN_EXE_stackplot"))
}

#[test]
fn wrong_arity_exits_with_one() {
    let output = stackplot().args(["list.txt", "color.txt"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn unreadable_input_list_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = stackplot()
        .args(["/nonexistent/list.txt", "c.txt", "s.txt", "h.txt", "run"])
        .arg("--output-root")
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn empty_input_list_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("list.txt");
    std::fs::write(&list, "").unwrap();
    let output = stackplot()
        .arg(&list)
        .args(["c.txt", "s.txt", "h.txt", "run"])
        .arg("--output-root")
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(dir.path().join("run").join("Integral.txt").exists());
}

#[test]
fn flamegraph_flag_writes_html() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("list.txt");
    std::fs::write(&list, "").unwrap();
    let flame = dir.path().join("flame.html");
    let output = stackplot()
        .arg(&list)
        .args(["c.txt", "s.txt", "h.txt", "run"])
        .arg("--output-root")
        .arg(dir.path())
        .arg("-f")
        .arg(&flame)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let html = std::fs::read_to_string(&flame).unwrap();
    assert!(!html.is_empty());
}
