
use serde_json::json;
use test_support::{create_student, request_ok, set_average, spawn_sidecar, temp_dir};

const SESSION: &str = "2025/2026";
const TERM: &str = "Third Term";

#[test]
fn score_exactly_at_default_threshold_promotes() {
    let workspace = temp_dir("promotiond-boundary");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // Default threshold is 45; 45.00 clears it, 44.99 does not.
    let at = create_student(&mut stdin, &mut reader, "2", "Primary 3", "Eze", "Ifeoma");
    let below = create_student(&mut stdin, &mut reader, "3", "Primary 3", "Falana", "Seun");
    set_average(&mut stdin, &mut reader, "4", &at, SESSION, TERM, 45.0);
    set_average(&mut stdin, &mut reader, "5", &below, SESSION, TERM, 44.99);

    let preview = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "promotion.preview",
        json!({ "fromClass": "Primary 3", "session": SESSION, "term": TERM }),
    );
    let rows = preview.get("rows").and_then(|v| v.as_array()).expect("rows");
    let row_for = |id: &str| {
        rows.iter()
            .find(|r| r.get("studentId").and_then(|v| v.as_str()) == Some(id))
            .expect("row")
    };
    assert_eq!(
        row_for(&at).get("action").and_then(|v| v.as_str()),
        Some("promoted")
    );
    assert_eq!(
        row_for(&at).get("toClass").and_then(|v| v.as_str()),
        Some("Primary 4")
    );
    assert_eq!(
        row_for(&below).get("action").and_then(|v| v.as_str()),
        Some("retained")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
