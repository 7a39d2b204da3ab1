//! Siftql – a string-encoded query-condition grammar with two interpreters.
//!
//! One textual grammar, two execution targets: conditions written into a
//! [`record::FieldMap`] compile either into a parameterized SQL WHERE
//! fragment (for the database) or into an in-memory predicate (for cached
//! record collections). Both interpreters parse through one shared
//! tokenizer, so they agree on selection semantics by construction:
//! * [`grammar`] – the lexical contract: tag keywords, type tags, order
//!   markers, sub-clause groups, and the shared [`grammar::tokenize`].
//! * [`encode`] – builders producing grammar-conformant condition strings
//!   (`is_in`, `like`, `between`, `and`/`or`, order markers, ...).
//! * [`sql`] – the SQL-emitting backend: WHERE fragment + named bindings,
//!   oracle-style IN-list chunking, order-by tail, row-number pagination.
//! * [`predicate`] – the predicate-emitting backend: composable filters,
//!   paged filtering and counting over anything implementing
//!   [`record::FieldAccess`].
//! * [`datatype`] – coerced bind values ([`datatype::BindValue`]) and the
//!   grammar's date/time parsing and day-boundary widening.
//! * [`page`] – the 1-based inclusive row-number window.
//! * [`error`] – the crate error type and `Result` alias.
//!
//! ## Quick Start
//! ```
//! use siftql::record::FieldMap;
//! use siftql::{encode, predicate, sql};
//! use std::collections::HashMap;
//!
//! let mut cond = FieldMap::new();
//! cond.set("STATUS", encode::is_in(["1", "2"]));
//! cond.set("NAME", encode::include(["li"]));
//!
//! // SQL backend: a WHERE fragment plus named bindings.
//! let compiled = sql::compile(&cond);
//! assert!(compiled.sql.contains("STATUS IN ('1','2')"));
//! assert!(compiled.sql.contains("NAME like :NAME"));
//!
//! // Predicate backend: the same condition against cached records.
//! let records: Vec<HashMap<String, String>> = vec![
//!     HashMap::from([("STATUS".into(), "1".into()), ("NAME".into(), "colin".into())]),
//!     HashMap::from([("STATUS".into(), "3".into()), ("NAME".into(), "lisa".into())]),
//! ];
//! let rows = predicate::filter(&records, &cond).unwrap();
//! assert_eq!(rows.len(), 1);
//! ```
//!
//! ## Grammar stability
//! The tag literals (`in:`, `not-in:`, `like:`, `between:`, ...) are a de
//! facto protocol shared with every hand-built field map; they never
//! change. The same goes for the 1000-item IN-list chunk size, which
//! encodes a real database limit.
//!
//! ## What this is not
//! No SQL parsing, no joins, no object mapping, and no connection
//! handling: statement execution happens on a caller-supplied connection,
//! and the predicate backend leaves cache refresh and concurrent mutation
//! to the caching layer feeding it.

pub mod datatype;
pub mod encode;
pub mod error;
pub mod grammar;
pub mod page;
pub mod predicate;
pub mod record;
pub mod sql;
