//! Embedded DuckDB session for duckgate.
//!
//! This crate is a workspace member that isolates the heavy `duckdb` (bundled C++)
//! dependency into its own compilation unit, preventing recompilation of DuckDB
//! when the HTTP layer changes.
//!
//! # Overview
//!
//! The HTTP facade talks to DuckDB through the [`SqlEngine`] trait:
//!
//! 1. [`EngineSession`] owns the one and only DuckDB connection and performs
//!    the startup setup (`httpfs` extension, default S3 settings).
//! 2. Statements run one at a time on that connection.
//! 3. Query results are materialised into ordered JSON rows by the
//!    [`materialize`] module, coercing each value by its column type.
//! 4. [`quick`] builds bounded `SELECT *` queries over remote files.
//!
//! # Modules
//!
//! - [`session`] -- Connection lifecycle, setup, `SET` helpers.
//! - [`materialize`] -- Column classification and JSON coercion.
//! - [`quick`] -- Quick-view SQL construction.
//! - [`error`] -- Domain-specific error types.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

pub mod error;
pub mod materialize;
pub mod quick;
pub mod session;

pub use error::{EngineError, Result};
pub use materialize::{truncate_sql, ColumnKind, QueryResult, Row};
pub use quick::{FileFormat, QuickView, DEFAULT_QUICK_LIMIT};
pub use session::{escape_literal, set_statement, EngineSession, SessionSettings, SqlEngine};
