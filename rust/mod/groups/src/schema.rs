use roster_core::ServiceError;
use roster_sql::SQLStore;

/// Initialize the SQLite schema for the groups module.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    let statements = [
        // Groups: owned exclusively by their creator
        "CREATE TABLE IF NOT EXISTS groups (
            group_id INTEGER PRIMARY KEY,
            owner_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT
        )",
        "CREATE INDEX IF NOT EXISTS idx_groups_owner ON groups(owner_id)",

        // Memberships: row existence is the membership signal
        "CREATE TABLE IF NOT EXISTS group_members (
            id INTEGER PRIMARY KEY,
            group_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            UNIQUE (group_id, user_id),
            FOREIGN KEY (group_id) REFERENCES groups(group_id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_group_members_user ON group_members(user_id)",

        // Users: identity rows for the directory collaborator
        "CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            name TEXT
        )",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Database(e.to_string()))?;
    }

    Ok(())
}
