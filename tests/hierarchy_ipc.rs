
use serde_json::json;
use test_support::{create_student, error_code, request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn fresh_workspace_seeds_the_default_ladder() {
    let workspace = temp_dir("promotiond-hierarchy-seed");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let result = request_ok(&mut stdin, &mut reader, "2", "hierarchy.get", json!({}));
    let classes = result
        .get("classes")
        .and_then(|v| v.as_array())
        .expect("classes");
    assert_eq!(classes.len(), 12);

    let find = |name: &str| {
        classes
            .iter()
            .find(|c| c.get("name").and_then(|v| v.as_str()) == Some(name))
            .unwrap_or_else(|| panic!("class {} missing", name))
    };

    // Rank n points at rank n+1 within the category; the last rank is terminal.
    for (name, next) in [
        ("JSS 1", Some("JSS 2")),
        ("JSS 2", Some("JSS 3")),
        ("JSS 3", None),
        ("Primary 6", None),
        ("SSS 3", None),
    ] {
        let node = find(name);
        assert_eq!(node.get("nextClass").and_then(|v| v.as_str()), next);
        assert_eq!(
            node.get("isTerminal").and_then(|v| v.as_bool()),
            Some(next.is_none())
        );
    }
    assert_eq!(
        find("JSS 1").get("category").and_then(|v| v.as_str()),
        Some("junior_secondary")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn configure_replaces_the_ladder_and_validates_it() {
    let workspace = temp_dir("promotiond-hierarchy-configure");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // Terminal node with a successor is structurally invalid.
    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "hierarchy.configure",
        json!({
            "classes": [
                { "name": "Year 1", "category": "primary", "rank": 1, "nextClass": "Year 2", "isTerminal": true },
                { "name": "Year 2", "category": "primary", "rank": 2 }
            ]
        }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    // Dangling successor is invalid.
    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "hierarchy.configure",
        json!({
            "classes": [
                { "name": "Year 1", "category": "primary", "rank": 1, "nextClass": "Year 9" }
            ]
        }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "hierarchy.configure",
        json!({
            "classes": [
                { "name": "Year 1", "category": "primary", "rank": 1, "nextClass": "Year 2" },
                { "name": "Year 2", "category": "primary", "rank": 2 }
            ]
        }),
    );
    assert_eq!(
        result
            .get("classes")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(2)
    );

    let fetched = request_ok(&mut stdin, &mut reader, "5", "hierarchy.get", json!({}));
    assert_eq!(
        fetched
            .get("classes")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(2)
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn configure_refuses_to_strand_enrolled_students() {
    let workspace = temp_dir("promotiond-hierarchy-strand");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = create_student(&mut stdin, &mut reader, "2", "JSS 1", "Adeyemi", "Tola");

    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "hierarchy.configure",
        json!({
            "classes": [
                { "name": "Year 1", "category": "primary", "rank": 1 }
            ]
        }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    // The seeded ladder is still in place.
    let fetched = request_ok(&mut stdin, &mut reader, "4", "hierarchy.get", json!({}));
    assert_eq!(
        fetched
            .get("classes")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(12)
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn enrolling_into_unknown_class_is_refused() {
    let workspace = temp_dir("promotiond-hierarchy-enrol");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "className": "Grade 13", "lastName": "Adeyemi", "firstName": "Tola" }),
    );
    assert_eq!(error_code(&resp), "unknown_class");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
