//! The SQL-emitting interpreter of the condition grammar.
//!
//! [`compile`] turns a [`FieldMap`] into a WHERE fragment plus named
//! parameter bindings. The fragment never includes the `where` keyword
//! itself; [`compile_for_splice`] produces a leading ` and ` variant for
//! appending after an existing base clause. [`wrap_page`] wraps a complete
//! statement in the row-number-bounded nested query used for pagination.
//!
//! Statement execution stays with the caller: the connection that runs the
//! fragment is supplied and released outside this module, per call.

use std::collections::HashMap;

use rusqlite::ToSql;
use tracing::{debug, error};

use crate::datatype::{self, BindValue};
use crate::grammar::{self, CompareOp, ConditionToken, OrderSpec, ValueType};
use crate::page::Pagination;
use crate::record::FieldMap;

/// Databases reject IN lists beyond 1000 items; longer lists are split into
/// chained groups of at most this many. Protocol constant, never altered.
pub const IN_CHUNK_SIZE: usize = 1000;

/// A compiled WHERE fragment and the values bound under its names.
#[derive(Debug, Clone, Default)]
pub struct CompiledSql {
    pub sql: String,
    pub params: HashMap<String, BindValue>,
}

impl CompiledSql {
    /// The bindings in the `(":name", &dyn ToSql)` shape prepared statements
    /// take. Names gain the leading colon here; the map itself stores them
    /// bare.
    pub fn named_params(&self) -> Vec<(String, &dyn ToSql)> {
        self.params
            .iter()
            .map(|(name, value)| (format!(":{}", name), value as &dyn ToSql))
            .collect()
    }
}

/// Compile a field map into a standalone condition fragment.
pub fn compile(fields: &FieldMap) -> CompiledSql {
    compile_inner(fields, false)
}

/// Compile a field map into a fragment prefixed with ` and `, for splicing
/// after an existing base clause.
pub fn compile_for_splice(fields: &FieldMap) -> CompiledSql {
    compile_inner(fields, true)
}

fn compile_inner(fields: &FieldMap, leading_and: bool) -> CompiledSql {
    let mut sql = String::new();
    let mut params: HashMap<String, BindValue> = HashMap::new();
    let mut order_specs: Vec<OrderSpec> = Vec::new();

    for (field, raw) in fields.iter() {
        // Blank means the caller put no constraint on this field.
        if raw.is_empty() {
            continue;
        }
        let (value, marker) = grammar::strip_order_marker(raw);
        if let Some((direction, sequence)) = marker {
            order_specs.push(OrderSpec {
                field: field.to_string(),
                direction,
                sequence,
            });
        }
        // Ordering may be the only thing the field contributes.
        if value.is_empty() {
            continue;
        }

        let fragment = if grammar::has_connective(&value) {
            // One level of parenthesized sub-clauses: translate each group
            // with an indexed bind base, splice the translations back, then
            // turn the connective tags into SQL keywords.
            let mut spliced = format!(" ({}) ", value);
            for (index, sub) in grammar::sub_clauses(&value).iter().enumerate() {
                if sub.is_empty() {
                    continue;
                }
                let bind_base = format!("{}{}", field, index);
                let translated = translate_clause(field, &bind_base, sub, &mut params);
                spliced = spliced.replacen(sub.as_str(), &translated, 1);
            }
            spliced
                .replace(grammar::AND, "and")
                .replace(grammar::OR, "or")
        } else {
            translate_clause(field, field, &value, &mut params)
        };

        if !sql.is_empty() || leading_and {
            sql.push_str(" and ");
        }
        sql.push_str(&fragment);
    }

    if !order_specs.is_empty() {
        // Stable sort: equal sequences keep field-map insertion order.
        order_specs.sort_by_key(|spec| spec.sequence);
        let tail = order_specs
            .iter()
            .map(|spec| format!("{} {}", spec.field, spec.direction.keyword()))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(" order by ");
        sql.push_str(&tail);
    }

    debug!(sql = %sql, "compiled condition fragment");
    CompiledSql { sql, params }
}

/// Translate one clause into its fragment, binding values under `bind_base`.
fn translate_clause(
    field: &str,
    bind_base: &str,
    clause: &str,
    params: &mut HashMap<String, BindValue>,
) -> String {
    match grammar::tokenize(clause) {
        ConditionToken::In(values) => in_list_fragment(field, &values, false),
        ConditionToken::NotIn(values) => in_list_fragment(field, &values, true),
        ConditionToken::IsNull => format!("{} is null", field),
        ConditionToken::IsNotNull => format!("{} is not null", field),
        ConditionToken::Compare { op, value, vtype } => {
            compare_fragment(field, bind_base, op, &value, vtype, params)
        }
        ConditionToken::Between { low, high, vtype } => {
            between_fragment(field, bind_base, &low, &high, vtype, params)
        }
        ConditionToken::Like(pattern) => {
            params.insert(bind_base.to_string(), BindValue::Str(pattern));
            format!("{} like :{}", field, bind_base)
        }
        ConditionToken::NotLike(pattern) => {
            params.insert(bind_base.to_string(), BindValue::Str(pattern));
            format!("{} not like :{}", field, bind_base)
        }
        ConditionToken::Equals(value) => {
            params.insert(bind_base.to_string(), BindValue::Str(value));
            format!("{} = :{}", field, bind_base)
        }
    }
}

// IN values are inlined as quoted literals, never bound.
fn in_list_fragment(field: &str, values: &[String], negated: bool) -> String {
    let keyword = if negated { "NOT IN" } else { "IN" };
    if values.len() <= IN_CHUNK_SIZE {
        return format!("{} {} ({})", field, keyword, quote_list(values));
    }
    let connective = if negated { " and " } else { " or " };
    let groups = values
        .chunks(IN_CHUNK_SIZE)
        .map(|chunk| format!("{} {} ({})", field, keyword, quote_list(chunk)))
        .collect::<Vec<_>>()
        .join(connective);
    format!("({})", groups)
}

// Embedded spaces are stripped before quoting.
fn quote_list(values: &[String]) -> String {
    values
        .iter()
        .map(|value| format!("'{}'", value.replace(' ', "")))
        .collect::<Vec<_>>()
        .join(",")
}

fn compare_fragment(
    field: &str,
    bind_base: &str,
    op: CompareOp,
    value: &str,
    vtype: Option<ValueType>,
    params: &mut HashMap<String, BindValue>,
) -> String {
    let mut resolved = vtype;
    let bind = match vtype {
        Some(ValueType::Date) => {
            let widened = if op.widens_to_end_of_day() {
                datatype::end_of_day(value)
            } else {
                datatype::start_of_day(value)
            };
            match widened {
                Ok(t) => BindValue::Time(t),
                Err(e) => {
                    error!(field, value, error = %e, "date literal does not parse, comparing as string");
                    resolved = Some(ValueType::Str);
                    BindValue::Str(value.to_string())
                }
            }
        }
        Some(ValueType::Time) => match datatype::parse_timestamp(value) {
            Ok(t) => BindValue::Time(t),
            Err(e) => {
                error!(field, value, error = %e, "time literal does not parse, comparing as string");
                resolved = Some(ValueType::Str);
                BindValue::Str(value.to_string())
            }
        },
        Some(ValueType::Num) => match value.parse::<i64>() {
            Ok(n) => BindValue::Num(n),
            Err(e) => {
                error!(field, value, error = %e, "numeric literal does not parse, comparing as string");
                resolved = Some(ValueType::Str);
                BindValue::Str(value.to_string())
            }
        },
        Some(ValueType::Str) => BindValue::Str(value.to_string()),
        // No resolved type: bind nulls, which no row compares against.
        None => BindValue::Null,
    };
    params.insert(bind_base.to_string(), bind);
    let mut fragment = format!("{} {} :{}", field, op.symbol(), bind_base);
    if resolved == Some(ValueType::Str) {
        // Length guard: without it a lexical compare would let '1000'
        // satisfy < '111'.
        let length_name = format!("{}_length", bind_base);
        fragment.push_str(&format!(" and length({}) = :{}", field, length_name));
        params.insert(length_name, BindValue::Num(value.chars().count() as i64));
    }
    fragment
}

fn between_fragment(
    field: &str,
    bind_base: &str,
    low: &str,
    high: &str,
    vtype: Option<ValueType>,
    params: &mut HashMap<String, BindValue>,
) -> String {
    let start_name = format!("{}_start", bind_base);
    let end_name = format!("{}_end", bind_base);
    let mut resolved = vtype;
    let (start_bind, end_bind) = match vtype {
        Some(ValueType::Date) => match (datatype::start_of_day(low), datatype::end_of_day(high)) {
            (Ok(s), Ok(e)) => (BindValue::Time(s), BindValue::Time(e)),
            _ => {
                error!(field, low, high, "date bound does not parse, comparing as strings");
                resolved = Some(ValueType::Str);
                (
                    BindValue::Str(low.to_string()),
                    BindValue::Str(high.to_string()),
                )
            }
        },
        Some(ValueType::Time) => {
            match (datatype::parse_timestamp(low), datatype::parse_timestamp(high)) {
                (Ok(s), Ok(e)) => (BindValue::Time(s), BindValue::Time(e)),
                _ => {
                    error!(field, low, high, "time bound does not parse, comparing as strings");
                    resolved = Some(ValueType::Str);
                    (
                        BindValue::Str(low.to_string()),
                        BindValue::Str(high.to_string()),
                    )
                }
            }
        }
        Some(ValueType::Num) => match (low.parse::<i64>(), high.parse::<i64>()) {
            (Ok(s), Ok(e)) => (BindValue::Num(s), BindValue::Num(e)),
            _ => {
                error!(field, low, high, "numeric bound does not parse, comparing as strings");
                resolved = Some(ValueType::Str);
                (
                    BindValue::Str(low.to_string()),
                    BindValue::Str(high.to_string()),
                )
            }
        },
        Some(ValueType::Str) => (
            BindValue::Str(low.to_string()),
            BindValue::Str(high.to_string()),
        ),
        None => (BindValue::Null, BindValue::Null),
    };
    let mut fragment = format!("{} between :{} and :{}", field, start_name, end_name);
    params.insert(start_name, start_bind);
    params.insert(end_name, end_bind);
    if resolved == Some(ValueType::Str) {
        // Same guard as compare_fragment, keyed off the lower bound.
        let length_name = format!("{}_length", bind_base);
        fragment.push_str(&format!(" and length({}) = :{}", field, length_name));
        params.insert(length_name, BindValue::Num(low.chars().count() as i64));
    }
    fragment
}

/// Wrap a complete statement in the row-number window for `page`, binding
/// the 1-based inclusive bounds as `X_START`/`X_END`. Without a page the
/// statement passes through untouched.
pub fn wrap_page(
    sql: &str,
    page: Option<&Pagination>,
    params: &mut HashMap<String, BindValue>,
) -> String {
    let Some(page) = page else {
        return sql.to_string();
    };
    params.insert("X_START".to_string(), BindValue::Num(page.start()));
    params.insert("X_END".to_string(), BindValue::Num(page.end()));
    format!(
        "SELECT *\n\
         FROM (SELECT\n\
         \x20       BASE_.*,\n\
         \x20       ROWNUM RN\n\
         \x20     FROM ( {} ) BASE_\n\
         \x20     WHERE ROWNUM <= :X_END )\n\
         WHERE RN >= :X_START",
        sql
    )
}
