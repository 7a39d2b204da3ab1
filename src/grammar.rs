//! The shared lexical contract of the condition grammar.
//!
//! Every condition a [`crate::record::FieldMap`] carries is a plain string
//! built from the tag keywords below. The tags are a de facto protocol:
//! hand-built field maps must use exactly these tokens, and changing any of
//! them breaks every consumer. Both interpreters ([`crate::sql`] and
//! [`crate::predicate`]) parse condition text through the single
//! [`tokenize`] function in this module, so they cannot drift apart on what
//! a clause *means*, only on how they execute it.

use lazy_static::lazy_static;
use regex::Regex;

// ------------- Tag keywords -------------
pub const IN: &str = "in:";
pub const NOT_IN: &str = "not-in:";
pub const LIKE: &str = "like:";
pub const NOT_LIKE: &str = "not-like:";
pub const IS_NULL: &str = "is-null:";
pub const IS_NOT_NULL: &str = "is-not-null:";
pub const GT: &str = ">:";
pub const LT: &str = "<:";
pub const GTE: &str = ">=:";
pub const LTE: &str = "<=:";
pub const BETWEEN: &str = "between:";
pub const AND: &str = "and:";
pub const OR: &str = "or:";

// ------------- Type tags -------------
pub const STR: &str = "str:";
pub const DATE: &str = "date:";
pub const TIME: &str = "time:";
pub const NUM: &str = "num:";

// Order-marker suffix halves, completed by `-N` where N is the sequence.
pub const ASC: &str = ":orderByAsc";
pub const DESC: &str = ":orderByDesc";

lazy_static! {
    // One balanced, non-nested parenthesized sub-clause.
    static ref PATTERN_GROUP: Regex = Regex::new(r"\((\s*([^()]*?)\s*)\)").unwrap();
    // The order marker, anywhere in a condition string.
    static ref PATTERN_ORDER: Regex = Regex::new(r":orderBy(Asc|Desc)-(\d*)").unwrap();
    static ref PATTERN_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref PATTERN_TIME: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap();
    // A secondary tag the original grammar would strip even when unknown.
    static ref PATTERN_WORD_TAG: Regex = Regex::new(r"^[a-z]+$").unwrap();
}

/// The value type a compare or between clause coerces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Str,
    Num,
    Date,
    Time,
}

impl ValueType {
    /// Resolve an explicit type tag (without trailing text), if recognized.
    pub fn from_tag(tag: &str) -> Option<ValueType> {
        match tag {
            STR => Some(ValueType::Str),
            DATE => Some(ValueType::Date),
            TIME => Some(ValueType::Time),
            NUM => Some(ValueType::Num),
            _ => None,
        }
    }

    /// Shape inference used by the encoder when no explicit tag is given:
    /// `yyyy-MM-dd` is a date, `yyyy-MM-dd HH:mm:ss` a time, all else string.
    pub fn infer(value: &str) -> ValueType {
        if PATTERN_TIME.is_match(value) {
            ValueType::Time
        } else if PATTERN_DATE.is_match(value) {
            ValueType::Date
        } else {
            ValueType::Str
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ValueType::Str => STR,
            ValueType::Date => DATE,
            ValueType::Time => TIME,
            ValueType::Num => NUM,
        }
    }
}

pub fn is_date_shaped(value: &str) -> bool {
    PATTERN_DATE.is_match(value)
}

pub fn is_time_shaped(value: &str) -> bool {
    PATTERN_TIME.is_match(value)
}

/// One of the four ordering comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Lte,
    Gte,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Lte => "<=",
            CompareOp::Gte => ">=",
        }
    }

    /// Date bounds widen towards the *inclusive* side of the operator:
    /// `<=` and `>` take end-of-day, `>=` and `<` take start-of-day.
    pub fn widens_to_end_of_day(&self) -> bool {
        matches!(self, CompareOp::Lte | CompareOp::Gt)
    }
}

/// Sort direction extracted from an order marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

/// One field's contribution to the order-by tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub direction: OrderDirection,
    pub sequence: u32,
}

/// A single field clause, resolved from its leading tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionToken {
    Equals(String),
    In(Vec<String>),
    NotIn(Vec<String>),
    Like(String),
    NotLike(String),
    IsNull,
    IsNotNull,
    Compare {
        op: CompareOp,
        value: String,
        vtype: Option<ValueType>,
    },
    Between {
        low: String,
        high: String,
        vtype: Option<ValueType>,
    },
}

/// Tokenize one clause (no connectives, no order marker) into its
/// [`ConditionToken`]. Text up to and including the first `:` selects the
/// variant; an unrecognized or absent tag yields `Equals` of the whole
/// clause, which both backends execute as a plain equality.
pub fn tokenize(clause: &str) -> ConditionToken {
    let tag = match clause.find(':') {
        Some(i) => &clause[..=i],
        None => "",
    };
    match tag {
        IN => ConditionToken::In(split_list(&clause[IN.len()..])),
        NOT_IN => ConditionToken::NotIn(split_list(&clause[NOT_IN.len()..])),
        LIKE => ConditionToken::Like(clause[LIKE.len()..].to_string()),
        NOT_LIKE => ConditionToken::NotLike(clause[NOT_LIKE.len()..].to_string()),
        IS_NULL => ConditionToken::IsNull,
        IS_NOT_NULL => ConditionToken::IsNotNull,
        LT | GT | LTE | GTE => {
            let op = match tag {
                LT => CompareOp::Lt,
                GT => CompareOp::Gt,
                LTE => CompareOp::Lte,
                _ => CompareOp::Gte,
            };
            let (vtype, value) = split_type_tag(&clause[tag.len()..]);
            ConditionToken::Compare {
                op,
                value: value.to_string(),
                vtype,
            }
        }
        BETWEEN => {
            let (vtype, rest) = split_type_tag(&clause[BETWEEN.len()..]);
            // BETWEEN carries exactly two values; everything after the first
            // comma belongs to the upper bound.
            let (low, high) = rest.split_once(',').unwrap_or((rest, ""));
            ConditionToken::Between {
                low: low.to_string(),
                high: high.to_string(),
                vtype,
            }
        }
        _ => ConditionToken::Equals(clause.to_string()),
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',').map(str::to_string).collect()
}

// A recognized type tag resolves the value type. An unrecognized all-letter
// tag is still stripped (the grammar reserves that position), leaving the
// type unresolved so the clause deterministically matches nothing.
fn split_type_tag(text: &str) -> (Option<ValueType>, &str) {
    if let Some(i) = text.find(':') {
        let candidate = &text[..=i];
        if let Some(vtype) = ValueType::from_tag(candidate) {
            return (Some(vtype), &text[i + 1..]);
        }
        if PATTERN_WORD_TAG.is_match(&text[..i]) {
            return (None, &text[i + 1..]);
        }
    }
    (None, text)
}

/// Remove the order marker from a condition string, returning the remaining
/// condition text and the extracted direction/sequence, if any. Markers must
/// be stripped before any other parsing; a missing sequence counts as 0.
pub fn strip_order_marker(value: &str) -> (String, Option<(OrderDirection, u32)>) {
    match PATTERN_ORDER.captures(value) {
        Some(caps) => {
            let direction = if &caps[1] == "Asc" {
                OrderDirection::Asc
            } else {
                OrderDirection::Desc
            };
            let sequence = caps[2].parse().unwrap_or(0);
            let remaining = value.replacen(&caps[0], "", 1);
            (remaining, Some((direction, sequence)))
        }
        None => (value.to_string(), None),
    }
}

/// Does this value join several clauses with a connective tag?
pub fn has_connective(value: &str) -> bool {
    value.contains(AND) || value.contains(OR)
}

/// The contents of every balanced, non-nested parenthesized sub-clause, in
/// order of appearance, trimmed.
pub fn sub_clauses(value: &str) -> Vec<String> {
    PATTERN_GROUP
        .captures_iter(value)
        .map(|caps| caps[2].to_string())
        .collect()
}
