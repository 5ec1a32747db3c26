use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn apply(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY NOT NULL,
            position INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            color TEXT NOT NULL,
            last_modified TEXT
        );

        CREATE INDEX IF NOT EXISTS notes_position ON notes(position);
        "#,
    )
    .context("applying schema")?;
    Ok(())
}
