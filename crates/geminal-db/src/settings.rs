use rusqlite::{params, Connection, OptionalExtension};

pub fn get(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM settings WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing() {
        let conn = crate::open_in_memory().unwrap();
        assert_eq!(get(&conn, "default_shell").unwrap(), None);
    }

    #[test]
    fn test_set_and_overwrite() {
        let conn = crate::open_in_memory().unwrap();
        set(&conn, "initial_level", "desktop").unwrap();
        set(&conn, "initial_level", "top").unwrap();
        assert_eq!(get(&conn, "initial_level").unwrap().as_deref(), Some("top"));
    }
}
