//! Builders for grammar-conformant condition strings.
//!
//! These are the only functions callers should need to put a condition into
//! a [`crate::record::FieldMap`]; each returns a plain `String` carrying the
//! tag keywords of [`crate::grammar`]. An empty return value means "no
//! constraint" and is skipped by both interpreters.

use chrono::{NaiveDate, NaiveDateTime};

use crate::datatype::{format_date, format_timestamp};
use crate::grammar::{self, ValueType};

/// Condition: `is null`.
pub fn is_null() -> String {
    grammar::IS_NULL.to_string()
}

/// Condition: `is not null`.
pub fn is_not_null() -> String {
    grammar::IS_NOT_NULL.to_string()
}

/// Wrap values into an IN condition.
///
/// `is_in(["1", "2"])` compiles to `IN ('1','2')`. Zero values, or a single
/// empty string, yield `IN ('')`: a constraint that matches nothing, not
/// the absence of a constraint.
pub fn is_in<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("{}{}", grammar::IN, join(values))
}

/// Wrap values into a NOT IN condition. Zero values, or a single empty
/// string, yield an empty string: no constraint at all. Deliberately
/// asymmetric with [`is_in`].
pub fn not_in<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let values: Vec<String> = values.into_iter().map(|s| s.as_ref().to_string()).collect();
    if values.is_empty() || (values.len() == 1 && values[0].is_empty()) {
        return String::new();
    }
    format!("{}{}", grammar::NOT_IN, values.join(","))
}

/// Condition: not equal. Delegates to [`not_in`].
pub fn ne(value: &str) -> String {
    not_in([value])
}

/// Wrap patterns into LIKE conditions, OR-joined.
///
/// A non-empty pattern without `%` or `_` is stored as a plain value and
/// compiles to an equality instead of a needless scan. Blank patterns are
/// dropped.
pub fn like<I, S>(patterns: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let clauses: Vec<String> = patterns
        .into_iter()
        .filter(|p| !p.as_ref().is_empty())
        .map(|p| {
            let p = p.as_ref();
            if !p.contains('%') && !p.contains('_') {
                p.to_string()
            } else {
                format!("{}{}", grammar::LIKE, p)
            }
        })
        .collect();
    or(clauses)
}

/// Wrap patterns into NOT LIKE conditions, AND-joined. Blanks are dropped.
pub fn not_like<I, S>(patterns: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let clauses: Vec<String> = patterns
        .into_iter()
        .filter(|p| !p.as_ref().is_empty())
        .map(|p| format!("{}{}", grammar::NOT_LIKE, p.as_ref()))
        .collect();
    and(clauses)
}

/// Match values starting with any of the given prefixes (`value%`).
pub fn prefix<I, S>(prefixes: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let clauses: Vec<String> = prefixes
        .into_iter()
        .filter(|p| !p.as_ref().is_empty())
        .map(|p| like([format!("{}%", p.as_ref())]))
        .collect();
    or(clauses)
}

/// Match values ending with any of the given suffixes (`%value`).
pub fn suffix<I, S>(suffixes: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let clauses: Vec<String> = suffixes
        .into_iter()
        .filter(|s| !s.as_ref().is_empty())
        .map(|s| like([format!("%{}", s.as_ref())]))
        .collect();
    or(clauses)
}

/// Match values containing any of the given fragments (`%value%`).
pub fn include<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let clauses: Vec<String> = fragments
        .into_iter()
        .filter(|s| !s.as_ref().is_empty())
        .map(|s| like([format!("%{}%", s.as_ref())]))
        .collect();
    or(clauses)
}

/// Match values containing none of the given fragments, AND-joined.
pub fn exclude<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let clauses: Vec<String> = fragments
        .into_iter()
        .filter(|s| !s.as_ref().is_empty())
        .map(|s| not_like([format!("%{}%", s.as_ref())]))
        .collect();
    and(clauses)
}

/// Condition: `< value`, type inferred from the value's shape. Blank value
/// yields no constraint.
pub fn lt(value: &str) -> String {
    compare(grammar::LT, value)
}

/// Condition: `> value`, type inferred from the value's shape.
pub fn gt(value: &str) -> String {
    compare(grammar::GT, value)
}

/// Condition: `<= value`, type inferred from the value's shape.
pub fn lte(value: &str) -> String {
    compare(grammar::LTE, value)
}

/// Condition: `>= value`, type inferred from the value's shape.
pub fn gte(value: &str) -> String {
    compare(grammar::GTE, value)
}

fn compare(op_tag: &str, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    format!("{}{}{}", op_tag, ValueType::infer(value).tag(), value)
}

/// Condition: `< n` on a numeric column.
pub fn lt_num(value: i64) -> String {
    format!("{}{}{}", grammar::LT, grammar::NUM, value)
}

/// Condition: `> n` on a numeric column.
pub fn gt_num(value: i64) -> String {
    format!("{}{}{}", grammar::GT, grammar::NUM, value)
}

/// Condition: `<= n` on a numeric column.
pub fn lte_num(value: i64) -> String {
    format!("{}{}{}", grammar::LTE, grammar::NUM, value)
}

/// Condition: `>= n` on a numeric column.
pub fn gte_num(value: i64) -> String {
    format!("{}{}{}", grammar::GTE, grammar::NUM, value)
}

/// Condition: `< date`, tagged as a date (widened per the day-boundary
/// rule when compiled).
pub fn lt_date(value: NaiveDate) -> String {
    format!("{}{}{}", grammar::LT, grammar::DATE, format_date(value))
}

/// Condition: `> date`, tagged as a date.
pub fn gt_date(value: NaiveDate) -> String {
    format!("{}{}{}", grammar::GT, grammar::DATE, format_date(value))
}

/// Condition: `< timestamp`, tagged as a time.
pub fn lt_time(value: NaiveDateTime) -> String {
    format!("{}{}{}", grammar::LT, grammar::TIME, format_timestamp(value))
}

/// Condition: `> timestamp`, tagged as a time.
pub fn gt_time(value: NaiveDateTime) -> String {
    format!("{}{}{}", grammar::GT, grammar::TIME, format_timestamp(value))
}

/// Wrap bounds into a BETWEEN condition.
///
/// One blank bound degrades to the single-sided compare; two blank bounds
/// yield no constraint. The type is a date or time only when *both* bounds
/// share that shape, else the bounds compare as strings.
pub fn between(start: &str, end: &str) -> String {
    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (true, false) => lte(end),
        (false, true) => gte(start),
        (false, false) => {
            let vtype = if grammar::is_date_shaped(start) && grammar::is_date_shaped(end) {
                ValueType::Date
            } else if grammar::is_time_shaped(start) && grammar::is_time_shaped(end) {
                ValueType::Time
            } else {
                ValueType::Str
            };
            format!("{}{}{},{}", grammar::BETWEEN, vtype.tag(), start, end)
        }
    }
}

/// Wrap numeric bounds into a BETWEEN condition.
pub fn between_num(start: i64, end: i64) -> String {
    format!("{}{}{},{}", grammar::BETWEEN, grammar::NUM, start, end)
}

/// Join clauses with the AND connective, dropping blanks. A single
/// remaining clause passes through unwrapped; several are each
/// parenthesized so the grouping survives inside the outer AND chain.
pub fn and<I, S>(clauses: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    connect(clauses, grammar::AND)
}

/// Join clauses with the OR connective, dropping blanks.
pub fn or<I, S>(clauses: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    connect(clauses, grammar::OR)
}

fn connect<I, S>(clauses: I, connective: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut kept: Vec<String> = clauses
        .into_iter()
        .filter(|c| !c.as_ref().is_empty())
        .map(|c| c.as_ref().to_string())
        .collect();
    if kept.len() > 1 {
        for clause in &mut kept {
            *clause = format!("( {} )", clause);
        }
    }
    kept.join(&format!(" {} ", connective))
}

/// Order marker: sort ascending with the given sequence (lower sequences
/// sort first across fields).
pub fn order_by_asc(sequence: u32) -> String {
    format!("{}-{}", grammar::ASC, sequence)
}

/// Order marker: sort descending with the given sequence.
pub fn order_by_desc(sequence: u32) -> String {
    format!("{}-{}", grammar::DESC, sequence)
}

fn join<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
