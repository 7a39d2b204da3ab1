// used for binding values into prepared statements
use rusqlite::ToSql;
use rusqlite::types::{Null, ToSqlOutput};

// used for timestamps carried by date/time clauses
use chrono::{NaiveDate, NaiveDateTime};

use std::fmt;

/// The timestamp layout of the grammar: `yyyy-MM-dd HH:mm:ss`.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// The date layout of the grammar: `yyyy-MM-dd`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A coerced native value bound under a named SQL parameter.
///
/// Coercion happens once, when the fragment is compiled; the value then
/// travels untouched to the caller's statement execution. `Null` appears
/// only for clauses whose type could not be resolved; such clauses match
/// nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Str(String),
    Num(i64),
    Time(NaiveDateTime),
    Null,
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Str(s) => write!(f, "{}", s),
            BindValue::Num(n) => write!(f, "{}", n),
            BindValue::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            BindValue::Null => write!(f, "null"),
        }
    }
}

impl ToSql for BindValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            BindValue::Str(s) => Ok(ToSqlOutput::from(s.as_str())),
            BindValue::Num(n) => Ok(ToSqlOutput::from(*n)),
            // Timestamps bind in the grammar's own layout so that textual
            // columns compare the way the predicate backend compares them.
            BindValue::Time(t) => Ok(ToSqlOutput::from(t.format(TIME_FORMAT).to_string())),
            BindValue::Null => Ok(ToSqlOutput::from(Null)),
        }
    }
}

/// Parse a `yyyy-MM-dd HH:mm:ss` literal.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, TIME_FORMAT)
}

/// Widen a `yyyy-MM-dd` literal to the first second of that day.
pub fn start_of_day(date: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    parse_timestamp(&format!("{} 00:00:00", date))
}

/// Widen a `yyyy-MM-dd` literal to the last second of that day.
pub fn end_of_day(date: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    parse_timestamp(&format!("{} 23:59:59", date))
}

/// Render a date in the grammar's date layout.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Render a timestamp in the grammar's time layout.
pub fn format_timestamp(time: NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
