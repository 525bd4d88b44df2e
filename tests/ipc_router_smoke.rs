
use serde_json::json;
use test_support::{request, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("promotiond-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let methods: Vec<(&str, serde_json::Value)> = vec![
        ("health", json!({})),
        (
            "workspace.select",
            json!({ "path": workspace.to_string_lossy() }),
        ),
        ("hierarchy.get", json!({})),
        ("settings.get", json!({})),
        (
            "settings.update",
            json!({ "threshold": 50.0, "autoPromotionEnabled": true }),
        ),
        ("students.list", json!({})),
        (
            "students.create",
            json!({ "className": "JSS 1", "lastName": "Smoke", "firstName": "Student" }),
        ),
        (
            "promotion.preview",
            json!({ "fromClass": "JSS 1", "session": "2025/2026", "term": "Third Term" }),
        ),
        (
            "promotion.execute",
            json!({ "fromClass": "JSS 1", "session": "2025/2026", "term": "Third Term" }),
        ),
        ("promotion.history", json!({ "limit": 10 })),
    ];

    for (i, (method, params)) in methods.into_iter().enumerate() {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("{}", i + 1),
            method,
            params,
        );
        if resp.get("ok").and_then(|v| v.as_bool()) == Some(false) {
            let code = resp
                .get("error")
                .and_then(|e| e.get("code"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            assert_ne!(code, "not_implemented", "unknown method {}", method);
        }
    }

    let resp = request(&mut stdin, &mut reader, "99", "no.such.method", json!({}));
    assert_eq!(
        resp.get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
