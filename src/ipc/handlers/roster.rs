use serde_json::json;
use uuid::Uuid;

use super::{db_conn, required_str};
use crate::db;
use crate::engine;
use crate::hierarchy::ClassHierarchy;
use crate::ipc::error::{engine_err, err, ok};
use crate::ipc::types::{AppState, Request};

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let class_filter = req
        .params
        .get("className")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string());

    let (sql, params): (&str, Vec<String>) = match &class_filter {
        Some(c) => (
            "SELECT id, class_name, last_name, first_name, admission_no, active
             FROM students WHERE class_name = ?
             ORDER BY last_name, first_name, id",
            vec![c.clone()],
        ),
        None => (
            "SELECT id, class_name, last_name, first_name, admission_no, active
             FROM students
             ORDER BY class_name, last_name, first_name, id",
            vec![],
        ),
    };

    let mut stmt = match conn.prepare(sql) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            let id: String = row.get(0)?;
            let class_name: String = row.get(1)?;
            let last_name: String = row.get(2)?;
            let first_name: String = row.get(3)?;
            let admission_no: Option<String> = row.get(4)?;
            let active: i64 = row.get(5)?;
            Ok(json!({
                "id": id,
                "className": class_name,
                "lastName": last_name,
                "firstName": first_name,
                "admissionNo": admission_no,
                "active": active != 0
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let class_name = match required_str(req, "className") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let last_name = match required_str(req, "lastName") {
        Ok(v) => v.trim().to_string(),
        Err(resp) => return resp,
    };
    let first_name = match required_str(req, "firstName") {
        Ok(v) => v.trim().to_string(),
        Err(resp) => return resp,
    };
    if last_name.is_empty() || first_name.is_empty() {
        return err(&req.id, "bad_params", "name must not be empty", None);
    }
    let admission_no = req
        .params
        .get("admissionNo")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string());
    let active = req
        .params
        .get("active")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    // Enrolling into a class the hierarchy doesn't know is always a mistake.
    let hierarchy = match ClassHierarchy::load(conn) {
        Ok(h) => h,
        Err(e) => return engine_err(&req.id, e),
    };
    if let Err(e) = hierarchy.get(&class_name) {
        return engine_err(&req.id, e);
    }

    let student_id = Uuid::new_v4().to_string();
    if let Err(e) = conn.execute(
        "INSERT INTO students(id, class_name, last_name, first_name, admission_no, active, updated_at)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        (
            &student_id,
            &class_name,
            &last_name,
            &first_name,
            admission_no.as_deref(),
            active as i64,
            db::now_rfc3339(),
        ),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "students" })),
        );
    }

    ok(
        &req.id,
        json!({ "studentId": student_id, "className": class_name }),
    )
}

/// Black-box entry point for the reporting subsystem's computed averages.
/// Values are stored as given; the engine treats out-of-range data as a
/// per-student error at evaluation time.
fn handle_reports_set_average(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match required_str(req, "session") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let term = match required_str(req, "term") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let average = match req.params.get("average").and_then(|v| v.as_f64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing average", None),
    };

    if let Err(e) = conn.execute(
        "INSERT INTO report_averages(student_id, session, term, average, finalized_at)
         VALUES(?, ?, ?, ?, NULL)
         ON CONFLICT(student_id, session, term) DO UPDATE SET average = excluded.average",
        (&student_id, &session, &term, average),
    ) {
        return err(&req.id, "db_insert_failed", e.to_string(), None);
    }

    ok(&req.id, json!({ "ok": true }))
}

/// Report-finalization event hook: stores the average, then hands off to the
/// auto-promotion trigger.
fn handle_reports_finalize(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let class_name = match required_str(req, "className") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let session = match required_str(req, "session") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let term = match required_str(req, "term") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let average = req.params.get("average").and_then(|v| v.as_f64());

    if let Some(avg) = average {
        if let Err(e) = conn.execute(
            "INSERT INTO report_averages(student_id, session, term, average, finalized_at)
             VALUES(?, ?, ?, ?, ?)
             ON CONFLICT(student_id, session, term)
             DO UPDATE SET average = excluded.average, finalized_at = excluded.finalized_at",
            (&student_id, &session, &term, avg, db::now_rfc3339()),
        ) {
            return err(&req.id, "db_insert_failed", e.to_string(), None);
        }
    }

    match engine::auto_promote_on_finalize(conn, &student_id, &class_name, &session, &term) {
        Ok(outcome) => ok(&req.id, json!(outcome)),
        Err(e) => engine_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "reports.setAverage" => Some(handle_reports_set_average(state, req)),
        "reports.finalize" => Some(handle_reports_finalize(state, req)),
        _ => None,
    }
}
