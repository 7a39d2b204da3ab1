//! The predicate-emitting interpreter of the condition grammar.
//!
//! The same [`FieldMap`] the SQL backend compiles can run directly against
//! an already-materialized record collection, typically cached rows. Each
//! non-blank field contributes one predicate; predicates conjoin with
//! logical AND; pagination, when requested, applies strictly after
//! filtering.
//!
//! Not everything the SQL backend can express runs in memory. Ordering
//! comparisons (`<`, `>`, `<=`, `>=`) and values joining several clauses
//! with `and:`/`or:` raise a typed error instead of silently mis-filtering;
//! the caller is expected to route those conditions to the database.

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::error;

use crate::datatype;
use crate::error::{Result, SiftqlError};
use crate::grammar::{self, ConditionToken, ValueType};
use crate::page::Pagination;
use crate::record::{FieldAccess, FieldMap};

type BoxPredicate<'a, R> = Box<dyn Fn(&R) -> bool + 'a>;

/// All records matching the condition, in input order.
pub fn filter<'a, R: FieldAccess>(data: &'a [R], cond: &FieldMap) -> Result<Vec<&'a R>> {
    filter_page(data, cond, None)
}

/// Records matching the condition, windowed to `page` (1-based skip/limit)
/// after filtering.
pub fn filter_page<'a, R: FieldAccess>(
    data: &'a [R],
    cond: &FieldMap,
    page: Option<&Pagination>,
) -> Result<Vec<&'a R>> {
    let predicates = compile(cond)?;
    let matching = data
        .iter()
        .filter(move |record| predicates.iter().all(|p| p(record)));
    let rows = match page {
        Some(page) => matching
            .skip(page.start() as usize - 1)
            .take(page.page_size() as usize)
            .collect(),
        None => matching.collect(),
    };
    Ok(rows)
}

/// Number of records matching the condition; the same composition as
/// [`filter`] without materializing a page.
pub fn count<R: FieldAccess>(data: &[R], cond: &FieldMap) -> Result<usize> {
    let predicates = compile(cond)?;
    Ok(data
        .iter()
        .filter(|record| predicates.iter().all(|p| p(record)))
        .count())
}

fn compile<'a, R: FieldAccess + 'a>(cond: &FieldMap) -> Result<Vec<BoxPredicate<'a, R>>> {
    let mut predicates = Vec::new();
    for (field, raw) in cond.iter() {
        if raw.is_empty() {
            continue;
        }
        // Order markers carry no filtering semantics; in-memory results
        // keep their input order.
        let (value, _) = grammar::strip_order_marker(raw);
        if value.is_empty() {
            continue;
        }
        if grammar::has_connective(&value) {
            return Err(SiftqlError::UnsupportedCondition {
                field: field.to_string(),
                detail: "clauses joined with and:/or: can only run against the database".to_string(),
            });
        }
        predicates.push(field_predicate(field, &value)?);
    }
    Ok(predicates)
}

fn field_predicate<'a, R: FieldAccess + 'a>(field: &str, clause: &str) -> Result<BoxPredicate<'a, R>> {
    let name = field.to_string();
    match grammar::tokenize(clause) {
        ConditionToken::In(values) => Ok(Box::new(move |record| {
            record.get(&name).is_some_and(|v| values.contains(&v))
        })),
        ConditionToken::NotIn(values) => Ok(Box::new(move |record| {
            record.get(&name).is_none_or(|v| !values.contains(&v))
        })),
        ConditionToken::IsNull => Ok(Box::new(move |record| record.get(&name).is_none())),
        ConditionToken::IsNotNull => Ok(Box::new(move |record| record.get(&name).is_some())),
        ConditionToken::Compare { op, .. } => Err(SiftqlError::UnsupportedOperator {
            field: field.to_string(),
            operator: op.symbol().to_string(),
        }),
        ConditionToken::Between { low, high, vtype } => {
            Ok(between_predicate(field, low, high, vtype))
        }
        ConditionToken::Like(pattern) => {
            let regex = like_regex(field, &pattern)?;
            Ok(Box::new(move |record| {
                record.get(&name).is_some_and(|v| regex.is_match(&v))
            }))
        }
        ConditionToken::NotLike(pattern) => {
            let regex = like_regex(field, &pattern)?;
            Ok(Box::new(move |record| {
                record.get(&name).is_some_and(|v| !regex.is_match(&v))
            }))
        }
        ConditionToken::Equals(value) => Ok(Box::new(move |record| {
            record.get(&name).is_some_and(|v| v == value)
        })),
    }
}

/// Compile a LIKE pattern to an anchored regex: metacharacters are
/// bracket-escaped, then `%` becomes `.*` and `_` becomes `.`.
fn like_regex(field: &str, pattern: &str) -> Result<Regex> {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    for c in pattern.chars() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            '^' | '$' | '*' | '+' | '?' | '.' | '|' | '(' | ')' | '\\' => {
                regex.push('[');
                regex.push(c);
                regex.push(']');
            }
            _ => regex.push(c),
        }
    }
    regex.push('$');
    Regex::new(&regex).map_err(|e| SiftqlError::InvalidPattern {
        field: field.to_string(),
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn between_predicate<'a, R: FieldAccess + 'a>(
    field: &str,
    low: String,
    high: String,
    vtype: Option<ValueType>,
) -> BoxPredicate<'a, R> {
    let name = field.to_string();
    match vtype {
        Some(ValueType::Date) => {
            match (datatype::start_of_day(&low), datatype::end_of_day(&high)) {
                (Ok(start), Ok(end)) => time_range(name, start, end),
                _ => {
                    error!(field, %low, %high, "date bound does not parse, matching nothing");
                    Box::new(|_| false)
                }
            }
        }
        Some(ValueType::Time) => {
            match (datatype::parse_timestamp(&low), datatype::parse_timestamp(&high)) {
                (Ok(start), Ok(end)) => time_range(name, start, end),
                _ => {
                    error!(field, %low, %high, "time bound does not parse, matching nothing");
                    Box::new(|_| false)
                }
            }
        }
        Some(ValueType::Num) => match (low.parse::<i64>(), high.parse::<i64>()) {
            (Ok(start), Ok(end)) => Box::new(move |record| {
                record
                    .get(&name)
                    .and_then(|v| v.parse::<i64>().ok())
                    .is_some_and(|n| n >= start && n <= end)
            }),
            _ => {
                error!(field, %low, %high, "numeric bound does not parse, matching nothing");
                Box::new(|_| false)
            }
        },
        Some(ValueType::Str) => Box::new(move |record| {
            record
                .get(&name)
                .is_some_and(|v| v.as_str() >= low.as_str() && v.as_str() <= high.as_str())
        }),
        // No recognized type tag: deterministically matches nothing.
        None => Box::new(|_| false),
    }
}

fn time_range<'a, R: FieldAccess + 'a>(
    name: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> BoxPredicate<'a, R> {
    Box::new(move |record| {
        record
            .get(&name)
            .and_then(|v| datatype::parse_timestamp(&v).ok())
            .is_some_and(|t| t >= start && t <= end)
    })
}
