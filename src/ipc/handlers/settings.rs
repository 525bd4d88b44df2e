use serde_json::json;

use super::db_conn;
use crate::engine;
use crate::ipc::error::{engine_err, err, ok};
use crate::ipc::types::{AppState, Request};

fn handle_settings_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match engine::get_or_init_settings(conn) {
        Ok(s) => ok(&req.id, json!({ "settings": s })),
        Err(e) => engine_err(&req.id, e),
    }
}

fn handle_settings_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let threshold = match req.params.get("threshold").and_then(|v| v.as_f64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing threshold", None),
    };
    let auto_enabled = match req
        .params
        .get("autoPromotionEnabled")
        .and_then(|v| v.as_bool())
    {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing autoPromotionEnabled", None),
    };
    let expected = req
        .params
        .get("expectedUpdatedAt")
        .and_then(|v| v.as_str());

    match engine::update_settings(conn, threshold, auto_enabled, expected) {
        Ok(s) => ok(&req.id, json!({ "settings": s })),
        Err(e) => engine_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "settings.get" => Some(handle_settings_get(state, req)),
        "settings.update" => Some(handle_settings_update(state, req)),
        _ => None,
    }
}
