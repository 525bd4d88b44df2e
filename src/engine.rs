use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::db;
use crate::hierarchy::{ClassHierarchy, ClassNode};

pub const FIRST_TERM: &str = "First Term";
pub const SECOND_TERM: &str = "Second Term";
pub const THIRD_TERM: &str = "Third Term";
pub const TERMS: [&str; 3] = [FIRST_TERM, SECOND_TERM, THIRD_TERM];

pub const DEFAULT_THRESHOLD: f64 = 45.0;

#[derive(Debug, Clone, Serialize)]
pub struct PromotionError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PromotionError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

fn db_err(code: &'static str) -> impl Fn(rusqlite::Error) -> PromotionError {
    move |e| PromotionError::new(code, e.to_string())
}

/// Outcome of evaluating one student. Closed set so every consumer has to
/// handle all three legs.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Promoted { to_class: String },
    Retained,
    Graduated,
}

impl Decision {
    pub fn action(&self) -> &'static str {
        match self {
            Decision::Promoted { .. } => "promoted",
            Decision::Retained => "retained",
            Decision::Graduated => "graduated",
        }
    }

    pub fn to_class(&self) -> Option<&str> {
        match self {
            Decision::Promoted { to_class } => Some(to_class),
            Decision::Retained | Decision::Graduated => None,
        }
    }
}

/// Pure eligibility rule. The comparison is inclusive: a score exactly at the
/// threshold advances. A missing average counts as failing. A below-threshold
/// student in a terminal class is retained, not graduated.
pub fn decide(average: Option<f64>, threshold: f64, node: &ClassNode) -> (Decision, String) {
    let Some(avg) = average else {
        return (Decision::Retained, "no report found".to_string());
    };

    if avg < threshold {
        return (
            Decision::Retained,
            format!("average {:.2} below threshold {:.2}", avg, threshold),
        );
    }

    if node.is_terminal {
        return (
            Decision::Graduated,
            format!(
                "average {:.2} met threshold {:.2} in final class",
                avg, threshold
            ),
        );
    }

    match node.next_class.as_deref() {
        Some(next) => (
            Decision::Promoted {
                to_class: next.to_string(),
            },
            format!("average {:.2} met threshold {:.2}", avg, threshold),
        ),
        // A non-terminal node without a successor fails hierarchy validation,
        // so this leg is unreachable for stored data; retain rather than guess.
        None => (
            Decision::Retained,
            "class has no configured successor".to_string(),
        ),
    }
}

fn check_average(avg: f64) -> Result<(), PromotionError> {
    if !avg.is_finite() || !(0.0..=100.0).contains(&avg) {
        return Err(PromotionError::new(
            "bad_report",
            format!("average {} outside 0..=100", avg),
        ));
    }
    Ok(())
}

fn check_term(term: &str) -> Result<(), PromotionError> {
    if TERMS.contains(&term) {
        return Ok(());
    }
    Err(
        PromotionError::new("bad_params", format!("unknown term {}", term))
            .with_details(json!({ "knownTerms": TERMS })),
    )
}

// ---------------------------------------------------------------------------
// Settings

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionSettings {
    pub threshold: f64,
    pub auto_promotion_enabled: bool,
    pub updated_at: String,
}

/// Reads the tenant settings row, creating it with defaults when missing.
/// Missing settings are a recoverable condition, never an abort.
pub fn get_or_init_settings(conn: &Connection) -> Result<PromotionSettings, PromotionError> {
    let existing = conn
        .query_row(
            "SELECT threshold, auto_promotion_enabled, updated_at
             FROM promotion_settings WHERE id = 1",
            [],
            |r| {
                Ok(PromotionSettings {
                    threshold: r.get(0)?,
                    auto_promotion_enabled: r.get::<_, i64>(1)? != 0,
                    updated_at: r.get(2)?,
                })
            },
        )
        .optional()
        .map_err(db_err("db_query_failed"))?;

    if let Some(s) = existing {
        return Ok(s);
    }

    let now = db::now_rfc3339();
    conn.execute(
        "INSERT OR IGNORE INTO promotion_settings(id, threshold, auto_promotion_enabled, updated_at)
         VALUES(1, ?, 1, ?)",
        (DEFAULT_THRESHOLD, &now),
    )
    .map_err(db_err("db_insert_failed"))?;

    // Re-read rather than assume: a concurrent initializer may have won.
    conn.query_row(
        "SELECT threshold, auto_promotion_enabled, updated_at
         FROM promotion_settings WHERE id = 1",
        [],
        |r| {
            Ok(PromotionSettings {
                threshold: r.get(0)?,
                auto_promotion_enabled: r.get::<_, i64>(1)? != 0,
                updated_at: r.get(2)?,
            })
        },
    )
    .map_err(db_err("db_query_failed"))
}

/// Settings writes are optimistic: when the caller supplies the updated_at it
/// last saw and the row has moved on, the update is refused.
pub fn update_settings(
    conn: &Connection,
    threshold: f64,
    auto_promotion_enabled: bool,
    expected_updated_at: Option<&str>,
) -> Result<PromotionSettings, PromotionError> {
    if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
        return Err(PromotionError::new(
            "bad_params",
            format!("threshold must be within 0..=100, got {}", threshold),
        ));
    }

    let current = get_or_init_settings(conn)?;
    if let Some(expected) = expected_updated_at {
        if expected != current.updated_at {
            return Err(PromotionError::new(
                "settings_conflict",
                "settings were changed by another caller",
            )
            .with_details(json!({ "currentUpdatedAt": current.updated_at })));
        }
    }

    let now = db::now_rfc3339();
    conn.execute(
        "UPDATE promotion_settings
         SET threshold = ?, auto_promotion_enabled = ?, updated_at = ?
         WHERE id = 1 AND updated_at = ?",
        (threshold, auto_promotion_enabled as i64, &now, &current.updated_at),
    )
    .map_err(db_err("db_update_failed"))
    .and_then(|n| {
        if n == 0 {
            Err(PromotionError::new(
                "settings_conflict",
                "settings were changed by another caller",
            ))
        } else {
            Ok(())
        }
    })?;

    Ok(PromotionSettings {
        threshold,
        auto_promotion_enabled,
        updated_at: now,
    })
}

// ---------------------------------------------------------------------------
// Batch evaluation

#[derive(Debug, Clone)]
pub struct StudentRef {
    pub id: String,
    pub class_name: String,
    pub last_name: String,
    pub first_name: String,
    pub admission_no: Option<String>,
}

impl StudentRef {
    fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRow {
    pub student_id: String,
    pub name: String,
    pub admission_no: Option<String>,
    pub from_class: String,
    pub to_class: Option<String>,
    pub average: Option<f64>,
    pub action: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: i64,
    pub promoted: i64,
    pub retained: i64,
    pub graduated: i64,
    pub already_processed: i64,
    pub errors: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub rows: Vec<BatchRow>,
    pub summary: BatchSummary,
    pub eligible_for_execute: bool,
}

fn summarize(rows: &[BatchRow]) -> BatchSummary {
    let mut s = BatchSummary::default();
    s.total = rows.len() as i64;
    for row in rows {
        match row.action.as_str() {
            "promoted" => s.promoted += 1,
            "retained" => s.retained += 1,
            "graduated" => s.graduated += 1,
            "already_processed" => s.already_processed += 1,
            _ => s.errors += 1,
        }
    }
    s
}

fn list_students(conn: &Connection, class_name: &str) -> Result<Vec<StudentRef>, PromotionError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, class_name, last_name, first_name, admission_no
             FROM students
             WHERE class_name = ? AND active = 1
             ORDER BY last_name, first_name, id",
        )
        .map_err(db_err("db_query_failed"))?;
    stmt.query_map([class_name], |row| {
        Ok(StudentRef {
            id: row.get(0)?,
            class_name: row.get(1)?,
            last_name: row.get(2)?,
            first_name: row.get(3)?,
            admission_no: row.get(4)?,
        })
    })
    .and_then(|it| it.collect::<Result<Vec<_>, _>>())
    .map_err(db_err("db_query_failed"))
}

fn get_average(
    conn: &Connection,
    student_id: &str,
    session: &str,
    term: &str,
) -> Result<Option<f64>, PromotionError> {
    conn.query_row(
        "SELECT average FROM report_averages
         WHERE student_id = ? AND session = ? AND term = ?",
        [student_id, session, term],
        |r| r.get(0),
    )
    .optional()
    .map_err(db_err("db_query_failed"))
}

fn record_exists(
    conn: &Connection,
    student_id: &str,
    session: &str,
    term: &str,
) -> Result<bool, PromotionError> {
    conn.query_row(
        "SELECT 1 FROM promotion_records
         WHERE student_id = ? AND session = ? AND term = ?",
        [student_id, session, term],
        |r| r.get::<_, i64>(0),
    )
    .optional()
    .map(|v| v.is_some())
    .map_err(db_err("db_query_failed"))
}

fn error_row(student: &StudentRef, average: Option<f64>, reason: String) -> BatchRow {
    BatchRow {
        student_id: student.id.clone(),
        name: student.display_name(),
        admission_no: student.admission_no.clone(),
        from_class: student.class_name.clone(),
        to_class: None,
        average,
        action: "error".to_string(),
        reason,
    }
}

/// Evaluates one student without touching the database. A corrupt stored
/// average becomes an `error` row, never an abort.
fn evaluate_student(
    student: &StudentRef,
    node: &ClassNode,
    threshold: f64,
    average: Option<f64>,
) -> BatchRow {
    if let Some(avg) = average {
        if let Err(e) = check_average(avg) {
            return error_row(student, Some(avg), e.message);
        }
    }

    let (decision, reason) = decide(average, threshold, node);
    BatchRow {
        student_id: student.id.clone(),
        name: student.display_name(),
        admission_no: student.admission_no.clone(),
        from_class: student.class_name.clone(),
        to_class: decision.to_class().map(|s| s.to_string()),
        average,
        action: decision.action().to_string(),
        reason,
    }
}

/// Looks up the batch's class and resolves its successor up front, so a
/// dangling successor surfaces as unknown_class before anyone is evaluated.
fn resolve_class(
    hierarchy: &ClassHierarchy,
    class_name: &str,
) -> Result<ClassNode, PromotionError> {
    let node = hierarchy.get(class_name)?.clone();
    if !hierarchy.is_terminal(class_name)? {
        hierarchy.successor_of(class_name)?;
    }
    Ok(node)
}

/// Dry run: evaluates the whole class and reports what execute would do.
/// Writes nothing, takes no locks, and is idempotent over unchanged data.
pub fn preview_batch(
    conn: &Connection,
    class_name: &str,
    session: &str,
    term: &str,
) -> Result<BatchResult, PromotionError> {
    check_term(term)?;
    let hierarchy = ClassHierarchy::load(conn)?;
    let node = resolve_class(&hierarchy, class_name)?;
    let settings = get_or_init_settings(conn)?;

    let mut rows = Vec::new();
    for student in list_students(conn, class_name)? {
        if record_exists(conn, &student.id, session, term)? {
            rows.push(already_processed_row(conn, &student, session, term)?);
            continue;
        }
        let row = match get_average(conn, &student.id, session, term) {
            Ok(avg) => evaluate_student(&student, &node, settings.threshold, avg),
            Err(e) => error_row(&student, None, e.message),
        };
        rows.push(row);
    }

    let summary = summarize(&rows);
    Ok(BatchResult {
        rows,
        summary,
        eligible_for_execute: term == THIRD_TERM,
    })
}

fn already_processed_row(
    conn: &Connection,
    student: &StudentRef,
    session: &str,
    term: &str,
) -> Result<BatchRow, PromotionError> {
    let average = get_average(conn, &student.id, session, term)?;
    Ok(BatchRow {
        student_id: student.id.clone(),
        name: student.display_name(),
        admission_no: student.admission_no.clone(),
        from_class: student.class_name.clone(),
        to_class: None,
        average,
        action: "already_processed".to_string(),
        reason: "promotion already recorded for this session and term".to_string(),
    })
}

/// Applies one decided row: append the ledger record, then move the student
/// on a promote. Runs inside its own transaction so the existence check and
/// the write are atomic; the UNIQUE(student_id, session, term) constraint
/// backstops a concurrent execute.
fn apply_row(
    conn: &Connection,
    student: &StudentRef,
    row: &BatchRow,
    session: &str,
    term: &str,
) -> Result<BatchRow, PromotionError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(db_err("db_tx_failed"))?;

    if record_exists(&tx, &student.id, session, term)? {
        let out = already_processed_row(&tx, student, session, term)?;
        tx.commit().map_err(db_err("db_tx_failed"))?;
        return Ok(out);
    }

    let now = db::now_rfc3339();
    let insert = tx.execute(
        "INSERT INTO promotion_records(
            id, student_id, from_class, to_class, session, term,
            average, action, reason, promoted_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            Uuid::new_v4().to_string(),
            &student.id,
            &row.from_class,
            row.to_class.as_deref(),
            session,
            term,
            row.average,
            &row.action,
            &row.reason,
            &now,
        ),
    );
    match insert {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            // Lost the race to another execute; report it, don't re-promote.
            let _ = tx.rollback();
            return already_processed_row(conn, student, session, term);
        }
        Err(e) => {
            let _ = tx.rollback();
            return Err(PromotionError::new("db_insert_failed", e.to_string()));
        }
    }

    if let Some(to_class) = row.to_class.as_deref() {
        tx.execute(
            "UPDATE students SET class_name = ?, updated_at = ? WHERE id = ?",
            (to_class, &now, &student.id),
        )
        .map_err(db_err("db_update_failed"))?;
    }

    tx.commit().map_err(db_err("db_tx_failed"))?;
    Ok(row.clone())
}

/// Execute phase: one ledger record per student per (session, term), class
/// mutation only on `Promoted`. Per-student failures are folded into the
/// result; the batch keeps going.
pub fn execute_batch(
    conn: &Connection,
    class_name: &str,
    session: &str,
    term: &str,
) -> Result<BatchResult, PromotionError> {
    check_term(term)?;
    if term != THIRD_TERM {
        return Err(PromotionError::new(
            "term_not_eligible",
            format!("promotion executes only for {}, got {}", THIRD_TERM, term),
        ));
    }

    let hierarchy = ClassHierarchy::load(conn)?;
    let node = resolve_class(&hierarchy, class_name)?;
    let settings = get_or_init_settings(conn)?;

    let mut rows = Vec::new();
    for student in list_students(conn, class_name)? {
        let average = match get_average(conn, &student.id, session, term) {
            Ok(avg) => avg,
            Err(e) => {
                rows.push(error_row(&student, None, e.message));
                continue;
            }
        };
        let decided = evaluate_student(&student, &node, settings.threshold, average);
        if decided.action == "error" {
            rows.push(decided);
            continue;
        }
        match apply_row(conn, &student, &decided, session, term) {
            Ok(row) => rows.push(row),
            Err(e) => rows.push(error_row(&student, average, e.message)),
        }
    }

    let summary = summarize(&rows);
    Ok(BatchResult {
        rows,
        summary,
        eligible_for_execute: true,
    })
}

// ---------------------------------------------------------------------------
// Auto-promotion trigger

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerOutcome {
    pub triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<BatchRow>,
}

fn skipped(reason: &str) -> TriggerOutcome {
    TriggerOutcome {
        triggered: false,
        skipped_reason: Some(reason.to_string()),
        row: None,
    }
}

/// Single-student execute path, fired when a report is finalized. No-op for
/// non-third-term reports and when auto promotion is switched off; otherwise
/// identical (and just as idempotent) as the bulk execute path.
pub fn auto_promote_on_finalize(
    conn: &Connection,
    student_id: &str,
    class_name: &str,
    session: &str,
    term: &str,
) -> Result<TriggerOutcome, PromotionError> {
    check_term(term)?;
    if term != THIRD_TERM {
        return Ok(skipped("not a third-term report"));
    }

    let settings = get_or_init_settings(conn)?;
    if !settings.auto_promotion_enabled {
        return Ok(skipped("auto promotion disabled"));
    }

    let hierarchy = ClassHierarchy::load(conn)?;
    let node = resolve_class(&hierarchy, class_name)?;

    let student = conn
        .query_row(
            "SELECT id, class_name, last_name, first_name, admission_no
             FROM students WHERE id = ?",
            [student_id],
            |row| {
                Ok(StudentRef {
                    id: row.get(0)?,
                    class_name: row.get(1)?,
                    last_name: row.get(2)?,
                    first_name: row.get(3)?,
                    admission_no: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(db_err("db_query_failed"))?
        .ok_or_else(|| {
            PromotionError::new("not_found", format!("student {} not found", student_id))
        })?;

    if student.class_name != class_name {
        return Err(PromotionError::new(
            "bad_params",
            format!(
                "report class {} does not match student's current class {}",
                class_name, student.class_name
            ),
        ));
    }

    let average = get_average(conn, &student.id, session, term)?;
    let decided = evaluate_student(&student, &node, settings.threshold, average);
    if decided.action == "error" {
        return Ok(TriggerOutcome {
            triggered: false,
            skipped_reason: Some(decided.reason.clone()),
            row: Some(decided),
        });
    }

    let row = apply_row(conn, &student, &decided, session, term)?;
    Ok(TriggerOutcome {
        triggered: true,
        skipped_reason: None,
        row: Some(row),
    })
}

// ---------------------------------------------------------------------------
// Ledger

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRecord {
    pub id: String,
    pub student_id: String,
    pub from_class: String,
    pub to_class: Option<String>,
    pub session: String,
    pub term: String,
    pub average: Option<f64>,
    pub action: String,
    pub reason: String,
    pub promoted_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub total: i64,
    pub promoted: i64,
    pub retained: i64,
    pub completed: i64,
}

pub fn ledger_recent(conn: &Connection, limit: i64) -> Result<Vec<PromotionRecord>, PromotionError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, student_id, from_class, to_class, session, term,
                    average, action, reason, promoted_at
             FROM promotion_records
             ORDER BY promoted_at DESC, rowid DESC
             LIMIT ?",
        )
        .map_err(db_err("db_query_failed"))?;
    stmt.query_map([limit], |row| {
        Ok(PromotionRecord {
            id: row.get(0)?,
            student_id: row.get(1)?,
            from_class: row.get(2)?,
            to_class: row.get(3)?,
            session: row.get(4)?,
            term: row.get(5)?,
            average: row.get(6)?,
            action: row.get(7)?,
            reason: row.get(8)?,
            promoted_at: row.get(9)?,
        })
    })
    .and_then(|it| it.collect::<Result<Vec<_>, _>>())
    .map_err(db_err("db_query_failed"))
}

pub fn ledger_stats(conn: &Connection) -> Result<LedgerStats, PromotionError> {
    conn.query_row(
        "SELECT
            COUNT(*),
            COALESCE(SUM(action = 'promoted'), 0),
            COALESCE(SUM(action = 'retained'), 0),
            COALESCE(SUM(action = 'graduated'), 0)
         FROM promotion_records",
        [],
        |r| {
            Ok(LedgerStats {
                total: r.get(0)?,
                promoted: r.get(1)?,
                retained: r.get(2)?,
                completed: r.get(3)?,
            })
        },
    )
    .map_err(db_err("db_query_failed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Category;

    fn node(name: &str, next: Option<&str>) -> ClassNode {
        ClassNode {
            name: name.to_string(),
            category: Category::JuniorSecondary,
            rank: 1,
            next_class: next.map(|s| s.to_string()),
            is_terminal: next.is_none(),
        }
    }

    #[test]
    fn score_at_threshold_promotes() {
        let n = node("JSS 1", Some("JSS 2"));
        let (d, _) = decide(Some(45.0), 45.0, &n);
        assert_eq!(
            d,
            Decision::Promoted {
                to_class: "JSS 2".to_string()
            }
        );
    }

    #[test]
    fn score_just_below_threshold_retains() {
        let n = node("JSS 1", Some("JSS 2"));
        let (d, reason) = decide(Some(44.99), 45.0, &n);
        assert_eq!(d, Decision::Retained);
        assert!(reason.contains("below threshold"));
    }

    #[test]
    fn terminal_class_graduates_at_threshold() {
        let n = node("SSS 3", None);
        let (d, _) = decide(Some(60.0), 45.0, &n);
        assert_eq!(d, Decision::Graduated);
        assert_eq!(d.to_class(), None);
    }

    #[test]
    fn terminal_class_below_threshold_retains_not_graduates() {
        let n = node("SSS 3", None);
        let (d, _) = decide(Some(44.0), 45.0, &n);
        assert_eq!(d, Decision::Retained);
    }

    #[test]
    fn missing_report_always_retains() {
        let n = node("JSS 1", Some("JSS 2"));
        let (d, reason) = decide(None, 0.0, &n);
        assert_eq!(d, Decision::Retained);
        assert_eq!(reason, "no report found");

        let terminal = node("SSS 3", None);
        let (d, _) = decide(None, 0.0, &terminal);
        assert_eq!(d, Decision::Retained);
    }

    #[test]
    fn corrupt_average_becomes_error_row() {
        let n = node("JSS 1", Some("JSS 2"));
        let student = StudentRef {
            id: "s1".to_string(),
            class_name: "JSS 1".to_string(),
            last_name: "Ade".to_string(),
            first_name: "Bola".to_string(),
            admission_no: None,
        };
        let row = evaluate_student(&student, &n, 45.0, Some(250.0));
        assert_eq!(row.action, "error");
        assert!(row.reason.contains("outside"));

        let row = evaluate_student(&student, &n, 45.0, Some(f64::NAN));
        assert_eq!(row.action, "error");
    }

    #[test]
    fn summary_counts_each_action() {
        let student = StudentRef {
            id: "s1".to_string(),
            class_name: "JSS 1".to_string(),
            last_name: "Ade".to_string(),
            first_name: "Bola".to_string(),
            admission_no: None,
        };
        let n = node("JSS 1", Some("JSS 2"));
        let rows = vec![
            evaluate_student(&student, &n, 45.0, Some(72.0)),
            evaluate_student(&student, &n, 45.0, Some(10.0)),
            evaluate_student(&student, &n, 45.0, None),
            evaluate_student(&student, &n, 45.0, Some(-1.0)),
        ];
        let s = summarize(&rows);
        assert_eq!(s.total, 4);
        assert_eq!(s.promoted, 1);
        assert_eq!(s.retained, 2);
        assert_eq!(s.errors, 1);
        assert_eq!(s.already_processed, 0);
    }

    #[test]
    fn unknown_term_is_rejected() {
        let e = check_term("Fourth Term").unwrap_err();
        assert_eq!(e.code, "bad_params");
        assert!(check_term(THIRD_TERM).is_ok());
    }
}
