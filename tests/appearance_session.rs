use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradepointd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradepointd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
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
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn result(value: &serde_json::Value) -> serde_json::Value {
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "request failed: {}",
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn defaults_match_the_session_bootstrap() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let got = result(&request(
        &mut stdin,
        &mut reader,
        "1",
        "appearance.get",
        json!({}),
    ));
    assert_eq!(got.get("theme").and_then(|v| v.as_str()), Some("dark"));
    assert_eq!(got.get("accent").and_then(|v| v.as_str()), Some("#00b4d8"));
    assert_eq!(
        got.get("background").and_then(|v| v.as_str()),
        Some("particles")
    );
    assert_eq!(got.get("animationHandle").and_then(|v| v.as_u64()), Some(0));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn theme_and_background_changes_restart_the_animation() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let toggled = result(&request(
        &mut stdin,
        &mut reader,
        "1",
        "appearance.toggleTheme",
        json!({}),
    ));
    assert_eq!(toggled.get("theme").and_then(|v| v.as_str()), Some("light"));
    assert_eq!(
        toggled.get("animationHandle").and_then(|v| v.as_u64()),
        Some(1)
    );

    let set = result(&request(
        &mut stdin,
        &mut reader,
        "2",
        "appearance.setBackground",
        json!({ "style": "waves" }),
    ));
    assert_eq!(set.get("background").and_then(|v| v.as_str()), Some("waves"));
    assert_eq!(set.get("animationHandle").and_then(|v| v.as_u64()), Some(2));

    // Accent recolors without restarting the loop.
    let set = result(&request(
        &mut stdin,
        &mut reader,
        "3",
        "appearance.setAccent",
        json!({ "color": "#ff8800" }),
    ));
    assert_eq!(set.get("accent").and_then(|v| v.as_str()), Some("#ff8800"));
    assert_eq!(set.get("animationHandle").and_then(|v| v.as_u64()), Some(2));

    let back = result(&request(
        &mut stdin,
        &mut reader,
        "4",
        "appearance.toggleTheme",
        json!({}),
    ));
    assert_eq!(back.get("theme").and_then(|v| v.as_str()), Some("dark"));
    assert_eq!(back.get("animationHandle").and_then(|v| v.as_u64()), Some(3));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bad_accent_colors_are_rejected() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    for (i, color) in ["00b4d8", "#00b4d", "#00b4dg", ""].iter().enumerate() {
        let value = request(
            &mut stdin,
            &mut reader,
            &format!("{i}"),
            "appearance.setAccent",
            json!({ "color": color }),
        );
        assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(
            value
                .get("error")
                .and_then(|e| e.get("code"))
                .and_then(|v| v.as_str()),
            Some("bad_params"),
            "color {color:?}"
        );
    }

    // The stored accent survives the rejected updates.
    let got = result(&request(
        &mut stdin,
        &mut reader,
        "5",
        "appearance.get",
        json!({}),
    ));
    assert_eq!(got.get("accent").and_then(|v| v.as_str()), Some("#00b4d8"));

    drop(stdin);
    let _ = child.wait();
}
