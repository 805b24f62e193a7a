//! The process-wide DuckDB session.
//!
//! DuckDB's in-memory mode creates an isolated database per connection, so
//! the service keeps exactly one connection for its whole lifetime. Every
//! statement takes the connection mutex for its full duration: concurrent
//! callers queue behind one another, and a long query delays everyone else.
//!
//! # Examples
//!
//! ```no_run
//! use duckgate_engine::{EngineSession, SessionSettings, SqlEngine};
//!
//! let settings = SessionSettings {
//!     s3_region: Some("eu-west-1".to_string()),
//!     ..SessionSettings::default()
//! };
//! let session = EngineSession::open(&settings).unwrap();
//! session.configure(&settings).unwrap();
//!
//! let result = session.execute("SELECT 42 AS answer").unwrap();
//! assert_eq!(result.columns, vec!["answer"]);
//! ```

use crate::error::{EngineError, Result};
use crate::materialize::{self, truncate_sql, QueryResult, LOG_SQL_MAX_CHARS};
use duckdb::Connection;
use parking_lot::Mutex;
use std::path::PathBuf;
use tracing::{debug, info};

/// DuckDB setting holding the S3 region.
pub const S3_REGION_SETTING: &str = "s3_region";

/// DuckDB setting holding the S3-compatible endpoint.
pub const S3_ENDPOINT_SETTING: &str = "s3_endpoint";

/// Extension providing `s3://`, `https://` and friends.
const REMOTE_STORAGE_EXTENSION: &str = "httpfs";

/// The statement interface the HTTP layer is written against.
///
/// [`EngineSession`] is the production implementation. Every method blocks
/// the calling thread until DuckDB is done.
pub trait SqlEngine: Send + Sync {
    /// Execute a statement that returns no rows (`SET`, `INSTALL`, DDL).
    fn run(&self, statement: &str) -> Result<()>;

    /// Execute a query and materialise its rows.
    fn execute(&self, sql: &str) -> Result<QueryResult>;

    /// Set the S3 region for every subsequent query.
    fn set_region(&self, region: &str) -> Result<()> {
        self.run(&set_statement(S3_REGION_SETTING, region))
    }

    /// Set the S3 endpoint for every subsequent query.
    fn set_endpoint(&self, endpoint: &str) -> Result<()> {
        self.run(&set_statement(S3_ENDPOINT_SETTING, endpoint))
    }

    /// Install and load `httpfs`, then apply the default region/endpoint.
    ///
    /// Every failure is a [`EngineError::Startup`] naming the statement; the
    /// session is unusable for remote reads without it. Blank region or
    /// endpoint values are skipped.
    fn configure(&self, settings: &SessionSettings) -> Result<()> {
        for statement in setup_statements(settings) {
            self.run(&statement)
                .map_err(|e| EngineError::startup(statement.as_str(), e.detail()))?;
        }

        if let Some(region) = non_blank(&settings.s3_region) {
            self.set_region(region)
                .map_err(|e| EngineError::startup("SET s3_region", e.detail()))?;
        }
        if let Some(endpoint) = non_blank(&settings.s3_endpoint) {
            self.set_endpoint(endpoint)
                .map_err(|e| EngineError::startup("SET s3_endpoint", e.detail()))?;
        }

        info!(
            extension = REMOTE_STORAGE_EXTENSION,
            region = non_blank(&settings.s3_region).unwrap_or(""),
            "DuckDB session configured"
        );
        Ok(())
    }
}

/// `INSTALL` (unless skipped) then `LOAD` of the remote storage extension.
fn setup_statements(settings: &SessionSettings) -> Vec<String> {
    let mut statements = Vec::with_capacity(2);
    if !settings.skip_extension_install {
        statements.push(format!("INSTALL {}", REMOTE_STORAGE_EXTENSION));
    }
    statements.push(format!("LOAD {}", REMOTE_STORAGE_EXTENSION));
    statements
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Startup settings for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSettings {
    /// Database file; `None` opens an in-memory database.
    pub database: Option<PathBuf>,

    /// Skip `INSTALL httpfs` and only `LOAD` it (pre-installed, offline hosts).
    pub skip_extension_install: bool,

    /// Region applied once at startup.
    pub s3_region: Option<String>,

    /// Endpoint applied once at startup.
    pub s3_endpoint: Option<String>,
}

/// The single DuckDB connection shared by the whole process.
pub struct EngineSession {
    /// Note: Mutex because DuckDB `Connection` contains `RefCell` and is not `Sync`.
    connection: Mutex<Connection>,
}

impl EngineSession {
    /// Open the database described by `settings` (file or in-memory).
    ///
    /// No setup statements are run; call [`SqlEngine::configure`] next.
    pub fn open(settings: &SessionSettings) -> Result<Self> {
        let connection = match &settings.database {
            Some(path) => {
                info!(path = %path.display(), "Opening DuckDB database file");
                Connection::open(path)
            }
            None => {
                info!("Opening in-memory DuckDB database");
                Connection::open_in_memory()
            }
        }
        .map_err(|e| EngineError::startup("open database", e.to_string()))?;

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&SessionSettings::default())
    }

}

impl SqlEngine for EngineSession {
    fn run(&self, statement: &str) -> Result<()> {
        let conn = self.connection.lock();
        conn.execute_batch(statement)?;
        debug!(statement = %truncate_sql(statement, LOG_SQL_MAX_CHARS), "Statement applied");
        Ok(())
    }

    fn execute(&self, sql: &str) -> Result<QueryResult> {
        let conn = self.connection.lock();
        materialize::execute(&conn, sql)
    }
}

/// Escape a value for use inside a single-quoted SQL string literal.
///
/// Only doubles single quotes. This is enough for the literal context it is
/// used in and nothing else; never splice the result anywhere but between
/// `'` characters.
///
/// # Examples
///
/// ```
/// use duckgate_engine::escape_literal;
///
/// assert_eq!(escape_literal("a'b"), "a''b");
/// ```
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Build `SET <key>='<escaped value>'`.
pub fn set_statement(key: &str, value: &str) -> String {
    format!("SET {}='{}'", key, escape_literal(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    /// Records statements instead of running them; fails the one named.
    #[derive(Default)]
    struct RecordingEngine {
        statements: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingEngine {
        fn failing_on(statement: &'static str) -> Self {
            Self {
                fail_on: Some(statement),
                ..Self::default()
            }
        }

        fn statements(&self) -> Vec<String> {
            self.statements.lock().clone()
        }
    }

    impl SqlEngine for RecordingEngine {
        fn run(&self, statement: &str) -> Result<()> {
            self.statements.lock().push(statement.to_string());
            match self.fail_on {
                Some(failing) if failing == statement => {
                    Err(EngineError::execution("extension \"httpfs\" not found"))
                }
                _ => Ok(()),
            }
        }

        fn execute(&self, _sql: &str) -> Result<QueryResult> {
            Ok(QueryResult::default())
        }
    }

    #[test]
    fn test_configure_installs_then_loads_then_sets() {
        let engine = RecordingEngine::default();
        let settings = SessionSettings {
            s3_region: Some("eu-west-1".to_string()),
            s3_endpoint: Some("minio:9000".to_string()),
            ..SessionSettings::default()
        };

        engine.configure(&settings).unwrap();

        assert_eq!(
            engine.statements(),
            vec![
                "INSTALL httpfs",
                "LOAD httpfs",
                "SET s3_region='eu-west-1'",
                "SET s3_endpoint='minio:9000'",
            ]
        );
    }

    #[test]
    fn test_configure_skip_install_only_loads() {
        let engine = RecordingEngine::default();
        let settings = SessionSettings {
            skip_extension_install: true,
            ..SessionSettings::default()
        };

        engine.configure(&settings).unwrap();

        assert_eq!(engine.statements(), vec!["LOAD httpfs"]);
    }

    #[test]
    fn test_configure_blank_defaults_issue_no_set() {
        let engine = RecordingEngine::default();
        let settings = SessionSettings {
            s3_region: Some(String::new()),
            s3_endpoint: Some("   ".to_string()),
            ..SessionSettings::default()
        };

        engine.configure(&settings).unwrap();

        assert_eq!(engine.statements(), vec!["INSTALL httpfs", "LOAD httpfs"]);
    }

    #[test]
    fn test_configure_failure_names_statement() {
        let engine = RecordingEngine::failing_on("LOAD httpfs");
        let settings = SessionSettings {
            s3_region: Some("us-east-1".to_string()),
            ..SessionSettings::default()
        };

        let err = engine.configure(&settings).unwrap_err();

        assert!(err.is_startup());
        match &err {
            EngineError::Startup { statement, detail } => {
                assert_eq!(statement, "LOAD httpfs");
                assert_eq!(detail, "extension \"httpfs\" not found");
            }
            other => panic!("expected startup error, got {:?}", other),
        }
        assert_eq!(err.to_string(), "LOAD httpfs: extension \"httpfs\" not found");
        // Nothing after the failing statement runs.
        assert_eq!(engine.statements(), vec!["INSTALL httpfs", "LOAD httpfs"]);
    }

    #[test]
    fn test_configure_failing_region_is_startup_error() {
        let engine = RecordingEngine::failing_on("SET s3_region='nowhere'");
        let settings = SessionSettings {
            skip_extension_install: true,
            s3_region: Some("nowhere".to_string()),
            s3_endpoint: Some("e".to_string()),
            ..SessionSettings::default()
        };

        let err = engine.configure(&settings).unwrap_err();

        assert!(matches!(
            &err,
            EngineError::Startup { statement, .. } if statement == "SET s3_region"
        ));
        assert_eq!(
            engine.statements(),
            vec!["LOAD httpfs", "SET s3_region='nowhere'"]
        );
    }

    #[test]
    fn test_set_statement_escapes_quotes() {
        assert_eq!(
            set_statement(S3_REGION_SETTING, "us-east-1"),
            "SET s3_region='us-east-1'"
        );
        assert_eq!(
            set_statement(S3_ENDPOINT_SETTING, "it's.example.com"),
            "SET s3_endpoint='it''s.example.com'"
        );
    }

    #[test]
    fn test_escape_literal_leaves_other_text_alone() {
        assert_eq!(escape_literal("s3://bucket/key.parquet"), "s3://bucket/key.parquet");
        assert_eq!(escape_literal("''"), "''''");
    }

    #[test]
    fn test_session_executes_queries() {
        let session = EngineSession::open_in_memory().unwrap();
        let result = session.execute("SELECT 42 AS answer").unwrap();
        assert_eq!(result.columns, vec!["answer"]);
        assert_eq!(result.rows[0]["answer"], json!(42));
    }

    #[test]
    fn test_state_is_shared_across_calls() {
        let session = EngineSession::open_in_memory().unwrap();
        session.run("CREATE TABLE t (v INTEGER)").unwrap();
        session.run("INSERT INTO t VALUES (1), (2), (3)").unwrap();
        let result = session.execute("SELECT sum(v) AS total FROM t").unwrap();
        assert_eq!(result.rows[0]["total"], json!(6));
    }

    #[test]
    fn test_run_surfaces_engine_errors() {
        let session = EngineSession::open_in_memory().unwrap();
        let err = session.run("SET no_such_setting='x'").unwrap_err();
        assert!(matches!(err, EngineError::Execution(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_file_backed_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SessionSettings {
            database: Some(dir.path().join("gate.duckdb")),
            ..SessionSettings::default()
        };

        {
            let session = EngineSession::open(&settings).unwrap();
            session.run("CREATE TABLE kept AS SELECT 7 AS v").unwrap();
        }

        let session = EngineSession::open(&settings).unwrap();
        let result = session.execute("SELECT v FROM kept").unwrap();
        assert_eq!(result.rows[0]["v"], json!(7));
    }

    #[test]
    fn test_concurrent_queries_share_one_connection() {
        let session = Arc::new(EngineSession::open_in_memory().unwrap());
        session.run("CREATE TABLE hits (n INTEGER)").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let session = session.clone();
                std::thread::spawn(move || {
                    session.run(&format!("INSERT INTO hits VALUES ({})", n)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let result = session.execute("SELECT count(*) AS c FROM hits").unwrap();
        assert_eq!(result.rows[0]["c"], json!(8));
    }
}
