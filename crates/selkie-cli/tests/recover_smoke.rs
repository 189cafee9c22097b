use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;

#[test]
fn cli_recovers_a_single_line_fragment() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("reply.txt");
    fs::write(
        &input,
        "Вот схема процесса:\n\ngraph TD; A[Start]-->B(Процесс);B-->C{Конец}\n",
    )
    .expect("write fixture");

    let exe = assert_cmd::cargo_bin!("selkie-cli");
    let output = Command::new(exe)
        .args(["recover", input.to_string_lossy().as_ref()])
        .assert()
        .success()
        .get_output()
        .clone();

    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.starts_with("flowchart "));
    assert!(stdout.contains("A[\"Start\"] --> B(\"Процесс\")"));
}

#[test]
fn cli_reports_when_nothing_is_recovered() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("prose.txt");
    fs::write(&input, "Just a plain answer without any diagrams.\n").expect("write fixture");

    let exe = assert_cmd::cargo_bin!("selkie-cli");
    Command::new(exe)
        .args(["recover", input.to_string_lossy().as_ref()])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn cli_renders_svg_from_malformed_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("reply.txt");
    fs::write(&input, "graph TD; A-->B\n").expect("write fixture");
    let out = tmp.path().join("out.svg");

    let exe = assert_cmd::cargo_bin!("selkie-cli");
    Command::new(exe)
        .args([
            "render",
            "--out",
            out.to_string_lossy().as_ref(),
            input.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let svg = fs::read_to_string(&out).expect("read svg");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("viewBox"));
}
