//! Result materialisation: DuckDB result sets to ordered JSON rows.
//!
//! Every column is classified once into a [`ColumnKind`] from the type DuckDB
//! reports for it, and every cell of that column is coerced through the same
//! kind. The classification is deliberately coarse:
//!
//! | Kind | DuckDB types | JSON |
//! |---|---|---|
//! | `Boolean` | `BOOLEAN` | `true` / `false` |
//! | `Integer` | all integer widths, signed and unsigned, `HUGEINT`, `UHUGEINT` | number |
//! | `Float` | `FLOAT`, `DOUBLE`, `DECIMAL` | number (decimals narrowed to `f64`) |
//! | `Text` | `DATE`, `TIME`, `TIMESTAMP`, `TIMESTAMPTZ` | engine textual form |
//! | `Opaque` | anything else | the value's own shape (see below) |
//!
//! SQL `NULL` is always JSON `null`, whatever the column kind.
//! `TIMESTAMPTZ` values are instants and are printed in UTC with a `+00`
//! offset. `TIMETZ` arrives without its offset and prints as a plain time.
//!
//! Opaque values keep their structure: `STRUCT` and `MAP` become objects
//! (map keys rendered as strings), `LIST` and `ARRAY` become arrays, a
//! `UNION` becomes its active member, `INTERVAL` becomes
//! `{"months", "days", "micros"}` and blobs are decoded as text.
//!
//! Narrowing `DECIMAL` to `f64` loses precision for values with more than
//! ~15 significant digits. Results are meant for display, not arithmetic.
//! Integers outside the `i64` range are emitted as strings of digits.

use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::arrow::datatypes::DataType;
use duckdb::types::{TimeUnit, Value};
use duckdb::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value as JsonValue};
use std::time::Instant;
use tracing::{info, warn};

/// Maximum number of SQL characters written to the log per execution.
pub const LOG_SQL_MAX_CHARS: usize = 200;

/// Days between 0001-01-01 (chrono's CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Offset suffix DuckDB prints for a UTC `TIMESTAMPTZ`.
const UTC_OFFSET_SUFFIX: &str = "+00";

/// One result row: column name to JSON value, in result-set column order.
///
/// When a result set carries the same column name twice (e.g. `SELECT *`
/// over a join), the later value overwrites the earlier one and the key
/// keeps its first position.
pub type Row = Map<String, JsonValue>;

/// The materialised result of a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Rows in arrival order.
    pub rows: Vec<Row>,

    /// Column names in result-set order, duplicates included.
    pub columns: Vec<String>,
}

/// Coercion class of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// `BOOLEAN`.
    Boolean,
    /// Any integer type, rendered as a signed 64-bit integer when it fits.
    Integer,
    /// `FLOAT`, `DOUBLE` and fractional `DECIMAL`, rendered as `f64`.
    Float,
    /// Dates, times and timestamps, rendered as text. `zoned` columns
    /// (`TIMESTAMPTZ`) carry a UTC offset suffix.
    Text {
        /// Whether the column is zone-aware.
        zoned: bool,
    },
    /// Everything else.
    Opaque,
}

impl ColumnKind {
    /// Classify a column from the type DuckDB reports for it.
    ///
    /// DuckDB reports `HUGEINT` and `UHUGEINT` as `DECIMAL(38, 0)`; decimals
    /// with a zero scale are integral and classified as
    /// [`ColumnKind::Integer`].
    pub fn of(data_type: &DataType) -> Self {
        match data_type {
            DataType::Boolean => ColumnKind::Boolean,
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Decimal32(_, 0)
            | DataType::Decimal64(_, 0)
            | DataType::Decimal128(_, 0)
            | DataType::Decimal256(_, 0) => ColumnKind::Integer,
            DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal32(..)
            | DataType::Decimal64(..)
            | DataType::Decimal128(..)
            | DataType::Decimal256(..) => ColumnKind::Float,
            DataType::Timestamp(_, zone) => ColumnKind::Text {
                zoned: zone.is_some(),
            },
            DataType::Date32 | DataType::Date64 | DataType::Time32(_) | DataType::Time64(_) => {
                ColumnKind::Text { zoned: false }
            }
            _ => ColumnKind::Opaque,
        }
    }

    /// Convert one engine value into JSON according to this kind.
    ///
    /// A value whose variant does not belong to the kind (which DuckDB should
    /// never produce) falls back to the opaque conversion instead of failing.
    pub fn coerce(self, value: Value) -> JsonValue {
        if matches!(value, Value::Null) {
            return JsonValue::Null;
        }
        match self {
            ColumnKind::Boolean => match value {
                Value::Boolean(b) => JsonValue::Bool(b),
                other => opaque_to_json(other),
            },
            ColumnKind::Integer => integer_to_json(value),
            ColumnKind::Float => float_to_json(value),
            ColumnKind::Text { zoned: false } => temporal_to_json(value),
            ColumnKind::Text { zoned: true } => zoned_to_json(value),
            ColumnKind::Opaque => opaque_to_json(value),
        }
    }
}

/// Execute `sql` on `conn` and materialise the full result set.
///
/// The execution is logged with its elapsed time and a truncated copy of the
/// SQL whether it succeeds or fails.
pub(crate) fn execute(conn: &Connection, sql: &str) -> Result<QueryResult> {
    let start = Instant::now();
    let result = collect(conn, sql);
    let execution_time_ms = start.elapsed().as_millis() as u64;
    let sql_preview = truncate_sql(sql, LOG_SQL_MAX_CHARS);

    match &result {
        Ok(r) => info!(
            execution_time_ms,
            rows = r.rows.len(),
            sql = %sql_preview,
            "Query executed"
        ),
        Err(e) => warn!(
            execution_time_ms,
            error = %e,
            sql = %sql_preview,
            "Query failed"
        ),
    }

    result
}

fn collect(conn: &Connection, sql: &str) -> Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;

    // Rows holds a mutable borrow on stmt, so raw values are gathered first
    // and column metadata is read once the borrow is released.
    let mut raw_rows: Vec<Vec<Value>> = Vec::new();
    {
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let column_count = row.as_ref().column_count();
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(row.get::<_, Value>(i)?);
            }
            raw_rows.push(values);
        }
    }

    let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|i| ColumnKind::of(&stmt.column_type(i)))
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|values| build_row(&columns, &kinds, values))
        .collect();

    Ok(QueryResult { rows, columns })
}

fn build_row(columns: &[String], kinds: &[ColumnKind], values: Vec<Value>) -> Row {
    let mut row = Map::with_capacity(columns.len());
    for ((name, kind), value) in columns.iter().zip(kinds).zip(values) {
        row.insert(name.clone(), kind.coerce(value));
    }
    row
}

/// Shorten `sql` to at most `max_chars` characters for logging.
///
/// Truncated text is suffixed with `... (<original length in characters>)`.
///
/// # Examples
///
/// ```
/// use duckgate_engine::truncate_sql;
///
/// assert_eq!(truncate_sql("SELECT 1", 200), "SELECT 1");
/// assert_eq!(truncate_sql("SELECT 12345", 6), "SELECT... (12)");
/// ```
pub fn truncate_sql(sql: &str, max_chars: usize) -> String {
    match sql.char_indices().nth(max_chars) {
        None => sql.to_string(),
        Some((cut, _)) => format!("{}... ({})", &sql[..cut], sql.chars().count()),
    }
}

// ─── Coercions ───────────────────────────────────────────────────────────────

fn integer_to_json(value: Value) -> JsonValue {
    match value {
        Value::TinyInt(i) => JsonValue::from(i),
        Value::SmallInt(i) => JsonValue::from(i),
        Value::Int(i) => JsonValue::from(i),
        Value::BigInt(i) => JsonValue::from(i),
        Value::UTinyInt(i) => JsonValue::from(i),
        Value::USmallInt(i) => JsonValue::from(i),
        Value::UInt(i) => JsonValue::from(i),
        // Out-of-range values keep their exact digits as a string.
        Value::UBigInt(i) => i64::try_from(i)
            .map(JsonValue::from)
            .unwrap_or_else(|_| JsonValue::String(i.to_string())),
        Value::HugeInt(i) => i64::try_from(i)
            .map(JsonValue::from)
            .unwrap_or_else(|_| JsonValue::String(i.to_string())),
        Value::UHugeInt(i) => i64::try_from(i)
            .map(JsonValue::from)
            .unwrap_or_else(|_| JsonValue::String(i.to_string())),
        Value::Decimal(d) => {
            let digits = d.to_string();
            digits
                .parse::<i64>()
                .map(JsonValue::from)
                .unwrap_or(JsonValue::String(digits))
        }
        other => opaque_to_json(other),
    }
}

fn float_to_json(value: Value) -> JsonValue {
    match value {
        Value::Float(f) => f64_to_json(f64::from(f)),
        Value::Double(f) => f64_to_json(f),
        // Lossy: DECIMAL(p, s) is narrowed to the nearest f64.
        Value::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(f64_to_json)
            .unwrap_or(JsonValue::Null),
        other => opaque_to_json(other),
    }
}

/// NaN and infinities have no JSON representation and become `null`.
fn f64_to_json(f: f64) -> JsonValue {
    Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn temporal_to_json(value: Value) -> JsonValue {
    match value {
        Value::Date32(days) => JsonValue::String(date_text(days)),
        Value::Timestamp(unit, raw) => JsonValue::String(timestamp_text(unit, raw, "")),
        Value::Time64(unit, raw) => JsonValue::String(time_text(unit, raw)),
        Value::Text(s) => JsonValue::String(s),
        other => opaque_to_json(other),
    }
}

/// `TIMESTAMPTZ` values are UTC instants; they are printed in UTC.
fn zoned_to_json(value: Value) -> JsonValue {
    match value {
        Value::Timestamp(unit, raw) => {
            JsonValue::String(timestamp_text(unit, raw, UTC_OFFSET_SUFFIX))
        }
        other => temporal_to_json(other),
    }
}

fn date_text(days: i32) -> String {
    match days {
        i32::MAX => "infinity".to_string(),
        d if d == -i32::MAX => "-infinity".to_string(),
        _ => days
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| days.to_string()),
    }
}

fn timestamp_text(unit: TimeUnit, raw: i64, offset: &str) -> String {
    match raw {
        i64::MAX => "infinity".to_string(),
        r if r == -i64::MAX => "-infinity".to_string(),
        _ => {
            let (secs, nanos) = split_seconds(unit, raw);
            DateTime::from_timestamp(secs, nanos)
                .map(|ts| {
                    format!(
                        "{}{}{}",
                        ts.naive_utc().format("%Y-%m-%d %H:%M:%S"),
                        fraction_text(nanos),
                        offset
                    )
                })
                .unwrap_or_else(|| raw.to_string())
        }
    }
}

fn time_text(unit: TimeUnit, raw: i64) -> String {
    let (secs, nanos) = split_seconds(unit, raw);
    // TIME allows the end-of-day value 24:00:00, which chrono does not.
    if secs == 86_400 && nanos == 0 {
        return "24:00:00".to_string();
    }
    u32::try_from(secs)
        .ok()
        .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos))
        .map(|time| format!("{}{}", time.format("%H:%M:%S"), fraction_text(nanos)))
        .unwrap_or_else(|| raw.to_string())
}

/// `.` plus the sub-second digits without trailing zeros; empty when whole.
fn fraction_text(nanos: u32) -> String {
    if nanos == 0 {
        return String::new();
    }
    let digits = format!("{:09}", nanos);
    format!(".{}", digits.trim_end_matches('0'))
}

/// Split a count of `unit` ticks into whole seconds and nanoseconds.
fn split_seconds(unit: TimeUnit, raw: i64) -> (i64, u32) {
    let ticks_per_second: i64 = match unit {
        TimeUnit::Second => 1,
        TimeUnit::Millisecond => 1_000,
        TimeUnit::Microsecond => 1_000_000,
        TimeUnit::Nanosecond => 1_000_000_000,
    };
    let nanos_per_tick = 1_000_000_000 / ticks_per_second;
    let secs = raw.div_euclid(ticks_per_second);
    let nanos = raw.rem_euclid(ticks_per_second) * nanos_per_tick;
    (secs, nanos as u32)
}

/// Untyped fallback: keep whatever shape the value has.
fn opaque_to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(b),
        Value::Text(s) | Value::Enum(s) => JsonValue::String(s),
        Value::Blob(bytes) | Value::Geometry(bytes) => {
            JsonValue::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        Value::List(items) | Value::Array(items) => {
            JsonValue::Array(items.into_iter().map(opaque_to_json).collect())
        }
        Value::Struct(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(name, field)| (name.clone(), opaque_to_json(field.clone())))
                .collect(),
        ),
        Value::Map(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(key, entry)| (map_key(key), opaque_to_json(entry.clone())))
                .collect(),
        ),
        Value::Union(member) => opaque_to_json(*member),
        Value::Interval { months, days, nanos } => json!({
            "months": months,
            "days": days,
            "micros": nanos / 1_000,
        }),
        v @ (Value::TinyInt(_)
        | Value::SmallInt(_)
        | Value::Int(_)
        | Value::BigInt(_)
        | Value::HugeInt(_)
        | Value::UHugeInt(_)
        | Value::UTinyInt(_)
        | Value::USmallInt(_)
        | Value::UInt(_)
        | Value::UBigInt(_)) => integer_to_json(v),
        v @ (Value::Float(_) | Value::Double(_) | Value::Decimal(_)) => float_to_json(v),
        v @ (Value::Date32(_) | Value::Time64(..) | Value::Timestamp(..)) => temporal_to_json(v),
        other => JsonValue::String(format!("{:?}", other)),
    }
}

/// JSON object keys must be strings; non-text map keys use their JSON text.
fn map_key(key: &Value) -> String {
    match opaque_to_json(key.clone()) {
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
