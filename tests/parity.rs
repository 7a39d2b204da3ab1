//! Both interpreters must select the same records for the same field map.
//! These tests run each condition twice, once compiled to SQL and executed
//! on an in-memory SQLite connection and once compiled to predicates over
//! the same rows, and compare the selected ids.

use std::collections::HashMap;

use rusqlite::{Connection, ToSql};
use siftql::record::FieldMap;
use siftql::{encode, predicate, sql};

fn connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "
        create table records (
            ID text not null,
            NAME text not null,
            STATUS text not null,
            CREATED text not null,
            AMT text not null,
            QTY integer not null,
            NICK text null
        );
        insert into records values ('1', 'colin', '1', '2019-01-31 23:59:59', '111',  111,  'co');
        insert into records values ('2', 'lisa',  '2', '2019-02-01 00:00:00', '1000', 1000, null);
        insert into records values ('3', 'bob',   '3', '2019-01-01 00:00:00', '99',   99,   null);
        insert into records values ('4', '1234',  '1', '2018-12-31 10:00:00', '011',  11,   null);
        insert into records values ('5', '01234', '2', '2019-01-15 12:00:00', '100',  100,  null);
        ",
    )
    .unwrap();
    conn
}

fn dataset() -> Vec<HashMap<String, String>> {
    let rows = [
        vec![
            ("ID", "1"),
            ("NAME", "colin"),
            ("STATUS", "1"),
            ("CREATED", "2019-01-31 23:59:59"),
            ("AMT", "111"),
            ("QTY", "111"),
            ("NICK", "co"),
        ],
        vec![
            ("ID", "2"),
            ("NAME", "lisa"),
            ("STATUS", "2"),
            ("CREATED", "2019-02-01 00:00:00"),
            ("AMT", "1000"),
            ("QTY", "1000"),
        ],
        vec![
            ("ID", "3"),
            ("NAME", "bob"),
            ("STATUS", "3"),
            ("CREATED", "2019-01-01 00:00:00"),
            ("AMT", "99"),
            ("QTY", "99"),
        ],
        vec![
            ("ID", "4"),
            ("NAME", "1234"),
            ("STATUS", "1"),
            ("CREATED", "2018-12-31 10:00:00"),
            ("AMT", "011"),
            ("QTY", "11"),
        ],
        vec![
            ("ID", "5"),
            ("NAME", "01234"),
            ("STATUS", "2"),
            ("CREATED", "2019-01-15 12:00:00"),
            ("AMT", "100"),
            ("QTY", "100"),
        ],
    ];
    rows.iter()
        .map(|pairs| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

fn sql_ids(conn: &Connection, cond: &FieldMap) -> Vec<String> {
    let compiled = sql::compile(cond);
    let statement = if compiled.sql.is_empty() {
        "select ID from records".to_string()
    } else if compiled.sql.trim_start().starts_with("order by") {
        format!("select ID from records {}", compiled.sql)
    } else {
        format!("select ID from records where {}", compiled.sql)
    };
    let named = compiled.named_params();
    let args: Vec<(&str, &dyn ToSql)> = named.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let mut stmt = conn.prepare(&statement).unwrap();
    let rows = stmt
        .query_map(args.as_slice(), |row| row.get::<_, String>(0))
        .unwrap();
    rows.map(|r| r.unwrap()).collect()
}

fn memory_ids(cond: &FieldMap) -> Vec<String> {
    let data = dataset();
    predicate::filter(&data, cond)
        .expect("filter compiles")
        .iter()
        .map(|r| r["ID"].clone())
        .collect()
}

fn assert_parity(cond: &FieldMap, expected: &[&str]) {
    let conn = connection();
    let mut from_sql = sql_ids(&conn, cond);
    let mut from_memory = memory_ids(cond);
    from_sql.sort();
    from_memory.sort();
    assert_eq!(from_sql, expected, "sql backend selection");
    assert_eq!(from_memory, expected, "predicate backend selection");
}

fn cond(entries: &[(&str, &str)]) -> FieldMap {
    entries.iter().copied().collect()
}

#[test]
fn equality_selects_the_same_rows() {
    assert_parity(&cond(&[("NAME", "1234")]), &["4"]);
    assert_parity(&cond(&[("NAME", "no such name")]), &[]);
}

#[test]
fn no_constraints_select_everything() {
    assert_parity(&FieldMap::new(), &["1", "2", "3", "4", "5"]);
    assert_parity(&cond(&[("NAME", "")]), &["1", "2", "3", "4", "5"]);
}

#[test]
fn in_lists_agree() {
    assert_parity(&cond(&[("STATUS", &encode::is_in(["1", "3"]))]), &["1", "3", "4"]);
}

#[test]
fn empty_in_matches_nothing_in_both_backends() {
    assert_parity(&cond(&[("STATUS", &encode::is_in(Vec::<&str>::new()))]), &[]);
    assert_parity(&cond(&[("STATUS", &encode::is_in([""]))]), &[]);
}

#[test]
fn empty_not_in_matches_everything_in_both_backends() {
    assert_parity(
        &cond(&[("STATUS", &encode::not_in(Vec::<&str>::new()))]),
        &["1", "2", "3", "4", "5"],
    );
}

#[test]
fn not_in_agrees() {
    assert_parity(&cond(&[("STATUS", &encode::not_in(["1"]))]), &["2", "3", "5"]);
}

#[test]
fn chunked_in_lists_lose_no_values() {
    // 1500 values force two IN groups; ids 1..=5 are all inside the list.
    let values: Vec<String> = (1..=1500).map(|n| n.to_string()).collect();
    assert_parity(
        &cond(&[("ID", &encode::is_in(&values))]),
        &["1", "2", "3", "4", "5"],
    );
}

#[test]
fn like_agrees_on_equality_and_wildcard_forms() {
    assert_parity(&cond(&[("NAME", &encode::like(["1234"]))]), &["4"]);
    assert_parity(&cond(&[("NAME", &encode::like(["%1234%"]))]), &["4", "5"]);
    assert_parity(&cond(&[("NAME", &encode::like(["_1234"]))]), &["5"]);
}

#[test]
fn not_like_agrees_on_present_fields() {
    assert_parity(&cond(&[("NAME", &encode::not_like(["%123%"]))]), &["1", "2", "3"]);
}

#[test]
fn include_agrees() {
    assert_parity(&cond(&[("NAME", &encode::include(["li"]))]), &["1", "2"]);
}

#[test]
fn between_dates_agree_on_the_widened_boundaries() {
    assert_parity(
        &cond(&[("CREATED", &encode::between("2019-01-01", "2019-01-31"))]),
        &["1", "3", "5"],
    );
}

#[test]
fn between_times_agree() {
    assert_parity(
        &cond(&[(
            "CREATED",
            &encode::between("2019-01-01 00:00:00", "2019-01-31 23:59:58"),
        )]),
        &["3", "5"],
    );
}

#[test]
fn between_numbers_agree() {
    assert_parity(&cond(&[("QTY", &encode::between_num(100, 1000))]), &["1", "2", "5"]);
}

#[test]
fn null_checks_agree() {
    assert_parity(&cond(&[("NICK", &encode::is_null())]), &["2", "3", "4", "5"]);
    assert_parity(&cond(&[("NICK", &encode::is_not_null())]), &["1"]);
}

#[test]
fn conjoined_fields_agree() {
    let mut c = FieldMap::new();
    c.set("STATUS", encode::is_in(["1", "2"]));
    c.set("NAME", encode::like(["%o%"]));
    assert_parity(&c, &["1"]);
}

#[test]
fn string_compare_length_guard_blocks_lexical_partial_matches() {
    // AMT is text: '011' < '100' with the same length passes, '99' is
    // shorter and '1000' longer, so neither may leak into the result.
    let conn = connection();
    let ids = sql_ids(&conn, &cond(&[("AMT", &encode::lt("100"))]));
    assert_eq!(ids, ["4"], "only the equal-length lexical match survives");

    let ids = sql_ids(&conn, &cond(&[("AMT", &encode::gte("100"))]));
    let mut ids = ids;
    ids.sort();
    assert_eq!(ids, ["1", "5"], "'1000' fails the length guard despite sorting higher");
}

#[test]
fn grouped_sub_clauses_execute_after_splicing() {
    let value = encode::or([encode::is_in(["1"]), encode::is_in(["3"])]);
    let conn = connection();
    let mut ids = sql_ids(&conn, &cond(&[("STATUS", &value)]));
    ids.sort();
    assert_eq!(ids, ["1", "3", "4"]);
}

#[test]
fn order_markers_order_the_sql_result() {
    let mut c = FieldMap::new();
    c.set("STATUS", encode::order_by_asc(0));
    c.set("ID", encode::order_by_desc(1));
    let conn = connection();
    let ids = sql_ids(&conn, &c);
    // status ascending first, id descending within equal status
    assert_eq!(ids, ["4", "1", "5", "2", "3"]);
}
