use serde_json::json;

use super::db_conn;
use crate::hierarchy::{self, Category, ClassHierarchy, ClassNode};
use crate::ipc::error::{engine_err, err, ok};
use crate::ipc::types::{AppState, Request};

fn handle_hierarchy_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let h = match ClassHierarchy::load(conn) {
        Ok(h) => h,
        Err(e) => return engine_err(&req.id, e),
    };

    // Flat list plus a per-category view ordered by rank, so the host UI can
    // render the ladder without re-sorting.
    let categories: Vec<serde_json::Value> = [
        Category::Primary,
        Category::JuniorSecondary,
        Category::SeniorSecondary,
    ]
    .into_iter()
    .map(|cat| {
        json!({
            "category": cat,
            "classes": h.nodes_by_category(cat),
        })
    })
    .collect();

    ok(
        &req.id,
        json!({ "classes": h.nodes(), "categories": categories }),
    )
}

fn parse_nodes(req: &Request) -> Result<Vec<ClassNode>, serde_json::Value> {
    let raw = req
        .params
        .get("classes")
        .and_then(|v| v.as_array())
        .ok_or_else(|| err(&req.id, "bad_params", "missing classes array", None))?;

    let mut nodes = Vec::with_capacity(raw.len());
    for item in raw {
        let name = item
            .get("name")
            .and_then(|v| v.as_str())
            .map(|v| v.trim().to_string())
            .ok_or_else(|| err(&req.id, "bad_params", "class entry missing name", None))?;
        let category = item
            .get("category")
            .and_then(|v| v.as_str())
            .and_then(Category::parse)
            .ok_or_else(|| {
                err(
                    &req.id,
                    "bad_params",
                    format!("class {} has missing or unknown category", name),
                    None,
                )
            })?;
        let rank = item.get("rank").and_then(|v| v.as_i64()).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("class {} missing rank", name),
                None,
            )
        })?;
        let next_class = item
            .get("nextClass")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string());
        let is_terminal = item
            .get("isTerminal")
            .and_then(|v| v.as_bool())
            .unwrap_or(next_class.is_none());
        nodes.push(ClassNode {
            name,
            category,
            rank,
            next_class,
            is_terminal,
        });
    }
    Ok(nodes)
}

/// Replaces the tenant's class ladder wholesale. Refused when any student
/// still sits in a class the new ladder drops.
fn handle_hierarchy_configure(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let nodes = match parse_nodes(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = hierarchy::validate_nodes(&nodes) {
        return engine_err(&req.id, e);
    }

    let orphans = {
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        let mut stmt = match conn.prepare("SELECT DISTINCT class_name FROM students") {
            Ok(s) => s,
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        };
        let in_use = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|it| it.collect::<Result<Vec<_>, _>>());
        match in_use {
            Ok(v) => v
                .into_iter()
                .filter(|c| !names.contains(&c.as_str()))
                .collect::<Vec<_>>(),
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        }
    };
    if !orphans.is_empty() {
        return err(
            &req.id,
            "bad_params",
            "students still enrolled in classes missing from the new hierarchy",
            Some(json!({ "classes": orphans })),
        );
    }

    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };
    // Students hold foreign keys into class_nodes; defer enforcement so the
    // delete-and-reinsert settles before the constraint is checked.
    if let Err(e) = tx.execute_batch("PRAGMA defer_foreign_keys = ON") {
        let _ = tx.rollback();
        return err(&req.id, "db_tx_failed", e.to_string(), None);
    }
    if let Err(e) = tx.execute("DELETE FROM class_nodes", []) {
        let _ = tx.rollback();
        return err(&req.id, "db_delete_failed", e.to_string(), None);
    }
    for n in &nodes {
        if let Err(e) = tx.execute(
            "INSERT INTO class_nodes(name, category, rank, next_class, is_terminal)
             VALUES(?, ?, ?, ?, ?)",
            (
                &n.name,
                n.category.as_str(),
                n.rank,
                n.next_class.as_deref(),
                n.is_terminal as i64,
            ),
        ) {
            let _ = tx.rollback();
            return err(
                &req.id,
                "db_insert_failed",
                e.to_string(),
                Some(json!({ "class": n.name.clone() })),
            );
        }
    }
    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }

    ok(&req.id, json!({ "classes": nodes }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "hierarchy.get" => Some(handle_hierarchy_get(state, req)),
        "hierarchy.configure" => Some(handle_hierarchy_configure(state, req)),
        _ => None,
    }
}
