use rusqlite::{Connection, Result as SqlResult};
use std::path::PathBuf;

/// Name of the counter tracking filter changes
pub const FILTER_CHANGES: &str = "filter_changes";

/// How many filter changes before we ask the user for a review
pub const REVIEW_THRESHOLD: i64 = 3;

/// A persisted named counter
///
/// The session gets its counter handed in at construction instead of
/// reaching for process-wide state, so tests can run against an in-memory
/// implementation.
pub trait CounterStore {
    /// Current value of the counter (0 if it was never written)
    fn get(&self, name: &str) -> SqlResult<i64>;

    /// Increment the counter by one and return the new value
    fn increment(&mut self, name: &str) -> SqlResult<i64>;
}

/// SQLite-backed counter store
///
/// The database file is created in the user's data directory:
/// - Linux: ~/.local/share/filter-studio/filter_studio.db
/// - macOS: ~/Library/Application Support/filter-studio/filter_studio.db
/// - Windows: %APPDATA%\filter-studio\filter_studio.db
pub struct UsageDb {
    conn: Connection,
    db_path: PathBuf,
}

impl UsageDb {
    /// Open (or create) the usage database in the user data directory
    pub fn new() -> SqlResult<Self> {
        let db_path = Self::get_db_path();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create application data directory");
        }

        println!("📁 Usage database at: {}", db_path.display());

        Self::open_at(db_path)
    }

    /// Open the store at an explicit path (tests point this at a temp file)
    pub fn open_at(db_path: PathBuf) -> SqlResult<Self> {
        let conn = Connection::open(&db_path)?;
        let db = UsageDb { conn, db_path };
        db.init_schema()?;
        Ok(db)
    }

    /// Get the path where the database should be stored
    fn get_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .expect("Could not determine user data directory");

        path.push("filter-studio");
        path.push("filter_studio.db");
        path
    }

    fn init_schema(&self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS counters (
                name    TEXT PRIMARY KEY,
                value   INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        Ok(())
    }
}

impl CounterStore for UsageDb {
    fn get(&self, name: &str) -> SqlResult<i64> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM counters WHERE name = ?1",
                [name],
                |row| row.get(0),
            );

        match value {
            Ok(v) => Ok(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn increment(&mut self, name: &str) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO counters (name, value) VALUES (?1, 1)
             ON CONFLICT(name) DO UPDATE SET value = value + 1",
            [name],
        )?;

        self.get(name)
    }
}

impl std::fmt::Debug for UsageDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageDb")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// In-memory counter store for tests
#[derive(Debug, Default)]
pub struct MemoryCounter {
    counters: std::collections::HashMap<String, i64>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-persisted value, as if carried over from a
    /// previous run
    #[cfg(test)]
    pub fn starting_at(name: &str, value: i64) -> Self {
        let mut store = Self::new();
        store.counters.insert(name.to_string(), value);
        store
    }
}

impl CounterStore for MemoryCounter {
    fn get(&self, name: &str) -> SqlResult<i64> {
        Ok(self.counters.get(name).copied().unwrap_or(0))
    }

    fn increment(&mut self, name: &str) -> SqlResult<i64> {
        let value = self.counters.entry(name.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}
