use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_halaqad");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn halaqad");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn raw_request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = raw_request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn str_field(result: &serde_json::Value, key: &str) -> String {
    result
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("missing {key}: {result}"))
        .to_string()
}

fn seed_student(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &std::path::Path,
) -> String {
    let _ = request_ok(
        stdin,
        reader,
        "seed-ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let student = request_ok(
        stdin,
        reader,
        "seed-student",
        "students.create",
        json!({ "name": "Omar", "nameAr": "عمر", "halaqaId": "h1" }),
    );
    str_field(&student, "studentId")
}

// Scenario: two hifz/correct records in a row; the history has exactly those
// two, newest first, with ids and timestamps assigned by the recorder.
#[test]
fn two_records_accumulate_newest_first() {
    let workspace = temp_dir("halaqad-progress-two");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let student_id = seed_student(&mut stdin, &mut reader, &workspace);

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "progress.record",
        json!({
            "studentId": student_id,
            "type": "hifz",
            "status": "correct",
            "surah": "Al-Baqarah",
            "details": "16-20"
        }),
    );
    let second = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "progress.record",
        json!({
            "studentId": student_id,
            "type": "hifz",
            "status": "correct",
            "surah": "Al-Baqarah",
            "details": "16-20"
        }),
    );
    let first_id = first
        .get("record")
        .and_then(|r| r.get("id"))
        .and_then(|v| v.as_str())
        .expect("first record id")
        .to_string();
    let second_id = second
        .get("record")
        .and_then(|r| r.get("id"))
        .and_then(|v| v.as_str())
        .expect("second record id")
        .to_string();
    assert_ne!(first_id, second_id);

    let view = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "views.student",
        json!({ "studentId": student_id }),
    );
    let history = view
        .get("history")
        .and_then(|v| v.as_array())
        .expect("history array");
    assert_eq!(history.len(), 2);
    for record in history {
        assert_eq!(record.get("type").and_then(|v| v.as_str()), Some("hifz"));
        assert_eq!(
            record.get("status").and_then(|v| v.as_str()),
            Some("correct")
        );
        assert_eq!(
            record.get("surah").and_then(|v| v.as_str()),
            Some("Al-Baqarah")
        );
        assert_eq!(record.get("details").and_then(|v| v.as_str()), Some("16-20"));
    }
    // Newest first: dates descend down the history.
    let dates: Vec<&str> = history
        .iter()
        .map(|r| r.get("date").and_then(|v| v.as_str()).expect("date"))
        .collect();
    assert!(dates[0] >= dates[1], "history not newest-first: {dates:?}");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn recording_against_unknown_student_is_not_found() {
    let workspace = temp_dir("halaqad-progress-missing");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let resp = raw_request(
        &mut stdin,
        &mut reader,
        "2",
        "progress.record",
        json!({
            "studentId": "no-such-student",
            "type": "murajaah",
            "status": "correct",
            "surah": "Ya-Sin",
            "details": "Ya-Sin"
        }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        resp.get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_found")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn record_rejects_unknown_type_and_status() {
    let workspace = temp_dir("halaqad-progress-badparams");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let student_id = seed_student(&mut stdin, &mut reader, &workspace);

    for (id, params) in [
        (
            "1",
            json!({ "studentId": student_id, "type": "recitation", "status": "correct" }),
        ),
        (
            "2",
            json!({ "studentId": student_id, "type": "hifz", "status": "partial" }),
        ),
    ] {
        let resp = raw_request(&mut stdin, &mut reader, id, "progress.record", params);
        assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(
            resp.get("error")
                .and_then(|e| e.get("code"))
                .and_then(|v| v.as_str()),
            Some("bad_params")
        );
    }

    // Nothing was appended by the rejected calls.
    let view = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "views.student",
        json!({ "studentId": student_id }),
    );
    assert_eq!(
        view.get("history")
            .and_then(|v| v.as_array())
            .map(|v| v.len()),
        Some(0)
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
