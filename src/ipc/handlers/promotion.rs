use serde_json::json;

use super::{db_conn, required_str};
use crate::engine;
use crate::ipc::error::{engine_err, err, ok};
use crate::ipc::types::{AppState, Request};

fn batch_args(req: &Request) -> Result<(String, String, String), serde_json::Value> {
    let from_class = required_str(req, "fromClass")?;
    let session = required_str(req, "session")?;
    let term = required_str(req, "term")?;
    Ok((from_class, session, term))
}

fn handle_preview(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let (from_class, session, term) = match batch_args(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match engine::preview_batch(conn, &from_class, &session, &term) {
        Ok(result) => ok(&req.id, json!(result)),
        Err(e) => engine_err(&req.id, e),
    }
}

fn handle_execute(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let (from_class, session, term) = match batch_args(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match engine::execute_batch(conn, &from_class, &session, &term) {
        Ok(result) => ok(&req.id, json!(result)),
        Err(e) => engine_err(&req.id, e),
    }
}

fn handle_history(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let limit = req
        .params
        .get("limit")
        .and_then(|v| v.as_i64())
        .unwrap_or(50);
    if limit <= 0 {
        return err(&req.id, "bad_params", "limit must be positive", None);
    }

    let records = match engine::ledger_recent(conn, limit) {
        Ok(r) => r,
        Err(e) => return engine_err(&req.id, e),
    };
    let stats = match engine::ledger_stats(conn) {
        Ok(s) => s,
        Err(e) => return engine_err(&req.id, e),
    };

    ok(&req.id, json!({ "records": records, "stats": stats }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "promotion.preview" => Some(handle_preview(state, req)),
        "promotion.execute" => Some(handle_execute(state, req)),
        "promotion.history" => Some(handle_history(state, req)),
        _ => None,
    }
}
