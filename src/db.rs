use rusqlite::Connection;
use std::path::Path;

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("promotion.sqlite3");
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS class_nodes(
            name TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            rank INTEGER NOT NULL,
            next_class TEXT,
            is_terminal INTEGER NOT NULL,
            UNIQUE(category, rank)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_class_nodes_category ON class_nodes(category, rank)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            class_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            admission_no TEXT,
            active INTEGER NOT NULL,
            updated_at TEXT,
            FOREIGN KEY(class_name) REFERENCES class_nodes(name)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_name)",
        [],
    )?;

    // Existing workspaces may have a students table without updated_at. Add if needed.
    ensure_students_updated_at(&conn)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS report_averages(
            student_id TEXT NOT NULL,
            session TEXT NOT NULL,
            term TEXT NOT NULL,
            average REAL NOT NULL,
            finalized_at TEXT,
            PRIMARY KEY(student_id, session, term),
            FOREIGN KEY(student_id) REFERENCES students(id)
        )",
        [],
    )?;
    ensure_reports_finalized_at(&conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_report_averages_student ON report_averages(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS promotion_settings(
            id INTEGER PRIMARY KEY CHECK(id = 1),
            threshold REAL NOT NULL,
            auto_promotion_enabled INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // The ledger is append-only. The UNIQUE constraint is what makes a
    // concurrent double-execute safe: at most one record per
    // (student, session, term) can ever land.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS promotion_records(
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            from_class TEXT NOT NULL,
            to_class TEXT,
            session TEXT NOT NULL,
            term TEXT NOT NULL,
            average REAL,
            action TEXT NOT NULL,
            reason TEXT NOT NULL,
            promoted_at TEXT NOT NULL,
            UNIQUE(student_id, session, term),
            FOREIGN KEY(student_id) REFERENCES students(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_promotion_records_student ON promotion_records(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_promotion_records_recent ON promotion_records(promoted_at)",
        [],
    )?;

    seed_default_hierarchy(&conn)?;

    Ok(conn)
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn ensure_students_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "students", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE students ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn ensure_reports_finalized_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "report_averages", "finalized_at")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE report_averages ADD COLUMN finalized_at TEXT",
        [],
    )?;
    Ok(())
}

/// Fresh workspaces get the standard 6-3-3 ladder. Tenants with their own
/// structure replace it via hierarchy.configure; a non-empty table is left alone.
fn seed_default_hierarchy(conn: &Connection) -> anyhow::Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM class_nodes", [], |r| r.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO class_nodes(name, category, rank, next_class, is_terminal)
             VALUES(?, ?, ?, ?, ?)",
        )?;
        for (category, prefix, len) in [
            ("primary", "Primary", 6),
            ("junior_secondary", "JSS", 3),
            ("senior_secondary", "SSS", 3),
        ] {
            for rank in 1..=len {
                let name = format!("{} {}", prefix, rank);
                let next = if rank < len {
                    Some(format!("{} {}", prefix, rank + 1))
                } else {
                    None
                };
                stmt.execute((&name, category, rank, next.as_deref(), next.is_none() as i64))?;
            }
        }
    }
    tx.commit()?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
