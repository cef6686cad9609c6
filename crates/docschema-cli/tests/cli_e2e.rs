use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::tempdir;

fn docschema_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_docschema"))
}

fn run(args: &[&str], cwd: &Path) -> Output {
    Command::new(docschema_bin())
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("run docschema")
}

fn write_products(dir: &Path) -> PathBuf {
    let path = dir.join("products.jsonl");
    fs::write(
        &path,
        concat!(
            "{\"_id\":{\"$oid\":\"507f1f77bcf86cd799439011\"},\"name\":\"ring\",\"option\":[{\"alloy\":\"gold\"},{\"diamond\":\"\"}]}\n",
            "{\"_id\":{\"$oid\":\"507f1f77bcf86cd799439012\"},\"name\":null,\"price\":12.5}\n",
            "{\"_id\":{\"$oid\":\"507f1f77bcf86cd799439013\"},\"option\":[{\"alloy\":\"silver\"},{\"alloy\":null}]}\n",
        ),
    )
    .expect("write products");
    path
}

#[test]
fn profile_writes_field_list_and_csv() {
    let dir = tempdir().expect("tempdir");
    let input = write_products(dir.path());
    let out_dir = dir.path().join("out");

    let output = run(
        &[
            "profile",
            input.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
            "--scan-limit",
            "0",
            "--json-report",
        ],
        dir.path(),
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let fields = fs::read_to_string(out_dir.join("schema_fields.txt")).expect("fields file");
    assert_eq!(
        fields,
        "_id\nname\noption\noption.alloy\noption.diamond\nprice"
    );

    let csv = fs::read_to_string(out_dir.join("schema_profile.csv")).expect("csv file");
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "field_name,total_docs,present_count,non_null_count,missing_count,missing_pct,types_summary"
    );
    assert!(lines.contains(&"_id,3,3,3,0,0.00,objectId=3"));
    assert!(lines.contains(&"name,3,2,1,1,33.33,null=1; string=1"));
    assert!(lines.contains(&"option.alloy,3,2,2,1,33.33,null=1; string=2"));
    assert!(lines.contains(&"price,3,1,1,2,66.67,float=1"));

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out_dir.join("schema_profile.json")).expect("report file"),
    )
    .expect("report json");
    assert_eq!(report["total_docs"], 3);
    assert_eq!(report["scan_limit"], serde_json::Value::Null);
}

#[test]
fn scan_limit_bounds_both_passes() {
    let dir = tempdir().expect("tempdir");
    let input = write_products(dir.path());
    let out_dir = dir.path().join("out");

    let output = run(
        &[
            "profile",
            input.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
            "--scan-limit",
            "1",
        ],
        dir.path(),
    );
    assert!(output.status.success());

    let fields = fs::read_to_string(out_dir.join("schema_fields.txt")).expect("fields file");
    assert_eq!(fields, "_id\nname\noption\noption.alloy\noption.diamond");
    let csv = fs::read_to_string(out_dir.join("schema_profile.csv")).expect("csv file");
    assert!(csv.lines().skip(1).all(|row| row.split(',').nth(1) == Some("1")));
    assert!(!out_dir.join("schema_profile.json").exists());
}

#[test]
fn fields_prints_to_stdout() {
    let dir = tempdir().expect("tempdir");
    let input = write_products(dir.path());

    let output = run(
        &["fields", input.to_str().unwrap(), "--number-labels", "unified"],
        dir.path(),
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["_id", "name", "option", "option.alloy", "option.diamond", "price"]
    );
}

#[test]
fn invalid_input_fails_with_location() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("broken.jsonl");
    fs::write(&input, "{\"a\":1}\n{\"a\":\n").expect("write input");

    let output = run(&["fields", input.to_str().unwrap()], dir.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.jsonl"), "stderr: {stderr}");
    assert!(stderr.contains("line 2"), "stderr: {stderr}");
}

#[test]
fn fields_out_from_environment_creates_parent_directories() {
    let dir = tempdir().expect("tempdir");
    let input = write_products(dir.path());
    let out = dir.path().join("reports/fields.txt");

    let output = Command::new(docschema_bin())
        .args(["fields", input.to_str().unwrap()])
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env("DOCSCHEMA_FIELDS_OUT", &out)
        .output()
        .expect("run docschema");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        fs::read_to_string(&out).expect("fields file"),
        "_id\nname\noption\noption.alloy\noption.diamond\nprice"
    );
}
