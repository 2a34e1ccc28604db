//! A small hand-written recognizer: regex matches the top-level shape of
//! each statement kind, and a quote/paren-aware splitter breaks lists
//! (column defs, values, predicates) apart without a full tokenizer.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::catalog::ForeignKey;
use crate::core::common::error::DbError;
use crate::core::common::types::{Column, Constraint, DataType, Value};
use crate::core::storage::{CompareOp, Predicate};

use super::ast::{AggArg, AggFunc, SelectItem, SelectStatement, Statement};

pub fn parse(input: &str) -> Result<Statement, DbError> {
    let sql = input.trim().trim_end_matches(';').trim();
    let upper = sql.to_ascii_uppercase();

    if upper == "BEGIN" {
        return Ok(Statement::Begin);
    }
    if upper == "COMMIT" {
        return Ok(Statement::Commit);
    }
    if upper == "ROLLBACK" {
        return Ok(Statement::Rollback);
    }
    if upper.starts_with("CREATE TABLE") {
        return parse_create_table(sql);
    }
    if upper.starts_with("CREATE INDEX") {
        return parse_create_index(sql);
    }
    if upper.starts_with("DROP TABLE") {
        return parse_drop_table(sql);
    }
    if upper.starts_with("INSERT INTO") {
        return parse_insert(sql);
    }
    if upper.starts_with("SELECT") {
        return parse_select(sql);
    }
    if upper.starts_with("UPDATE") {
        return parse_update(sql);
    }
    if upper.starts_with("DELETE FROM") {
        return parse_delete(sql);
    }

    Err(DbError::ParseError(format!("unrecognized statement: {sql}")))
}

fn create_table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^CREATE\s+TABLE\s+(\w+)\s*\((.*)\)$").unwrap())
}

fn foreign_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)FOREIGN\s+KEY\s*\(\s*(\w+)\s*\)\s*REFERENCES\s+(\w+)\s*\(\s*(\w+)\s*\)")
            .unwrap()
    })
}

fn create_index_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^CREATE\s+INDEX\s+(\w+)\s+ON\s+(\w+)\s*\(\s*(\w+)\s*\)$").unwrap()
    })
}

fn drop_table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^DROP\s+TABLE\s+(\w+)$").unwrap())
}

fn insert_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^INSERT\s+INTO\s+(\w+)\s*(\(([^)]*)\))?\s*VALUES\s*(.*)$").unwrap()
    })
}

fn select_head_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^SELECT\s+(.*?)\s+FROM\s+(.*)$").unwrap())
}

fn join_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^(\w+)\s+(?:INNER\s+)?JOIN\s+(\w+)\s+ON\s+(\S+)\s*=\s*(\S+)$").unwrap()
    })
}

fn join_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bJOIN\b").unwrap())
}

fn plain_from_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^(\w+)(?:\s+WHERE\s+(.+?))?(?:\s+GROUP\s+BY\s+(\w+))?$").unwrap()
    })
}

fn update_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^UPDATE\s+(\w+)\s+SET\s+(.+?)(?:\s+WHERE\s+(.+))?$").unwrap()
    })
}

fn delete_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^DELETE\s+FROM\s+(\w+)(?:\s+WHERE\s+(.+))?$").unwrap())
}

fn comparison_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^(\S+)\s*(!=|>=|<=|=|>|<|LIKE)\s*(.+)$").unwrap()
    })
}

fn aggregate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^(COUNT|SUM|AVG|MIN|MAX)\s*\(\s*(\*|[\w.]+)\s*\)$").unwrap()
    })
}

fn parse_create_table(sql: &str) -> Result<Statement, DbError> {
    let caps = create_table_re()
        .captures(sql)
        .ok_or_else(|| DbError::ParseError(format!("malformed CREATE TABLE: {sql}")))?;
    let name = caps[1].to_string();
    let body = caps[2].trim();

    let mut columns = Vec::new();
    let mut foreign_keys = Vec::new();
    for def in split_top_level(body, ',') {
        if def.trim_start().to_ascii_uppercase().starts_with("FOREIGN KEY") {
            let fk_caps = foreign_key_re()
                .captures(&def)
                .ok_or_else(|| DbError::ParseError(format!("malformed FOREIGN KEY: {def}")))?;
            foreign_keys.push(ForeignKey {
                local_column: fk_caps[1].to_string(),
                referenced_table: fk_caps[2].to_string(),
                referenced_column: fk_caps[3].to_string(),
            });
        } else {
            columns.push(parse_coldef(&def)?);
        }
    }

    Ok(Statement::CreateTable { name, columns, foreign_keys })
}

fn parse_coldef(def: &str) -> Result<Column, DbError> {
    let tokens: Vec<&str> = def.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(DbError::ParseError(format!("invalid column definition: {def}")));
    }
    let name = tokens[0].to_string();
    let data_type = DataType::parse(tokens[1])
        .ok_or_else(|| DbError::ParseError(format!("unknown type in column definition: {def}")))?;

    let rest = tokens[2..].join(" ").to_ascii_uppercase();
    let mut constraints = Vec::new();
    if rest.contains("PRIMARY KEY") {
        constraints.push(Constraint::PrimaryKey);
    }
    if rest.contains("NOT NULL") {
        constraints.push(Constraint::NotNull);
    }
    if rest.contains("UNIQUE") {
        constraints.push(Constraint::Unique);
    }
    Ok(Column::new(name, data_type, constraints))
}

fn parse_create_index(sql: &str) -> Result<Statement, DbError> {
    let caps = create_index_re()
        .captures(sql)
        .ok_or_else(|| DbError::ParseError(format!("malformed CREATE INDEX: {sql}")))?;
    Ok(Statement::CreateIndex {
        name: caps[1].to_string(),
        table: caps[2].to_string(),
        column: caps[3].to_string(),
    })
}

fn parse_drop_table(sql: &str) -> Result<Statement, DbError> {
    let caps = drop_table_re()
        .captures(sql)
        .ok_or_else(|| DbError::ParseError(format!("malformed DROP TABLE: {sql}")))?;
    Ok(Statement::DropTable { name: caps[1].to_string() })
}

fn parse_insert(sql: &str) -> Result<Statement, DbError> {
    let caps = insert_re()
        .captures(sql)
        .ok_or_else(|| DbError::ParseError(format!("malformed INSERT: {sql}")))?;
    let table = caps[1].to_string();
    let columns = caps
        .get(3)
        .map(|m| split_top_level(m.as_str(), ',').into_iter().collect::<Vec<_>>())
        .filter(|cols| !cols.is_empty());
    let values_part = strip_outer_parens(caps[4].trim())?;
    let values = split_top_level(values_part, ',')
        .into_iter()
        .map(|lit| Value::parse_literal(&lit))
        .collect();
    Ok(Statement::Insert { table, columns, values })
}

fn parse_select(sql: &str) -> Result<Statement, DbError> {
    let caps = select_head_re()
        .captures(sql)
        .ok_or_else(|| DbError::ParseError(format!("malformed SELECT: {sql}")))?;
    let items_str = caps[1].trim();
    let rest = caps[2].trim();

    let items = parse_select_items(items_str)?;

    let join_count = join_keyword_re().find_iter(rest).count();
    if join_count > 1 {
        return Err(DbError::UnsupportedFeature(
            "multiple JOIN keywords in one statement".to_string(),
        ));
    }
    if join_count == 1 {
        let jcaps = join_re()
            .captures(rest)
            .ok_or_else(|| DbError::ParseError(format!("malformed JOIN: {rest}")))?;
        return Ok(Statement::Select(SelectStatement::Join {
            items,
            left_table: jcaps[1].to_string(),
            right_table: jcaps[2].to_string(),
            left_col: jcaps[3].to_string(),
            right_col: jcaps[4].to_string(),
        }));
    }

    let pcaps = plain_from_re()
        .captures(rest)
        .ok_or_else(|| DbError::ParseError(format!("malformed FROM clause: {rest}")))?;
    let table = pcaps[1].to_string();
    let predicate = match pcaps.get(2) {
        Some(m) => parse_predicate(m.as_str())?,
        None => Vec::new(),
    };
    let group_by = pcaps.get(3).map(|m| m.as_str().to_string());

    Ok(Statement::Select(SelectStatement::Plain { items, table, predicate, group_by }))
}

fn parse_select_items(items_str: &str) -> Result<Vec<SelectItem>, DbError> {
    if items_str.trim() == "*" {
        return Ok(vec![SelectItem::Star]);
    }
    split_top_level(items_str, ',')
        .into_iter()
        .map(|raw| {
            let item = raw.trim();
            if item == "*" {
                return Ok(SelectItem::Star);
            }
            if let Some(caps) = aggregate_re().captures(item) {
                let func = AggFunc::parse(&caps[1])
                    .ok_or_else(|| DbError::ParseError(format!("unknown aggregate: {item}")))?;
                let arg = if caps[2].trim() == "*" {
                    AggArg::Star
                } else {
                    AggArg::Column(caps[2].trim().to_string())
                };
                return Ok(SelectItem::Aggregate { func, arg });
            }
            Ok(SelectItem::Column(item.to_string()))
        })
        .collect()
}

fn parse_update(sql: &str) -> Result<Statement, DbError> {
    let caps = update_re()
        .captures(sql)
        .ok_or_else(|| DbError::ParseError(format!("malformed UPDATE: {sql}")))?;
    let table = caps[1].to_string();
    let assignments = split_top_level(caps[2].trim(), ',')
        .into_iter()
        .map(|pair| {
            let (col, lit) = pair
                .split_once('=')
                .ok_or_else(|| DbError::ParseError(format!("malformed assignment: {pair}")))?;
            Ok((col.trim().to_string(), Value::parse_literal(lit.trim())))
        })
        .collect::<Result<Vec<_>, DbError>>()?;
    let predicate = match caps.get(3) {
        Some(m) => parse_predicate(m.as_str())?,
        None => Vec::new(),
    };
    Ok(Statement::Update { table, assignments, predicate })
}

fn parse_delete(sql: &str) -> Result<Statement, DbError> {
    let caps = delete_re()
        .captures(sql)
        .ok_or_else(|| DbError::ParseError(format!("malformed DELETE: {sql}")))?;
    let table = caps[1].to_string();
    let predicate = match caps.get(2) {
        Some(m) => parse_predicate(m.as_str())?,
        None => Vec::new(),
    };
    Ok(Statement::Delete { table, predicate })
}

fn parse_predicate(clause: &str) -> Result<Vec<Predicate>, DbError> {
    split_conjunction(clause.trim())
        .into_iter()
        .map(|comparison| {
            let caps = comparison_re()
                .captures(comparison.trim())
                .ok_or_else(|| DbError::ParseError(format!("malformed predicate: {comparison}")))?;
            let column = caps[1].trim().to_string();
            let op = CompareOp::parse(caps[2].trim())
                .ok_or_else(|| DbError::ParseError(format!("unknown operator: {}", &caps[2])))?;
            let value = Value::parse_literal(caps[3].trim());
            Ok(Predicate::new(column, op, value))
        })
        .collect()
}

/// Splits `s` at every top-level `sep`, honoring parenthesis nesting and
/// single/double-quoted strings so literals and FK parens never get cut.
fn split_top_level(s: &str, sep: char) -> Vec<String> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_quote: Option<char> = None;
    let mut current = String::new();

    for c in s.chars() {
        if let Some(q) = in_quote {
            current.push(c);
            if c == q {
                in_quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                in_quote = Some(c);
                current.push(c);
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            c if c == sep && depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    parts.push(current.trim().to_string());
    parts
}

/// Splits a predicate clause on top-level ` AND ` (case-insensitive),
/// staying quote-aware so a literal never gets cut mid-string.
fn split_conjunction(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quote: Option<char> = None;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = in_quote {
            current.push(c);
            if c == q {
                in_quote = None;
            }
            i += 1;
            continue;
        }
        if c == '\'' || c == '"' {
            in_quote = Some(c);
            current.push(c);
            i += 1;
            continue;
        }
        if i + 5 <= chars.len() {
            let window: String = chars[i..i + 5].iter().collect();
            if window.eq_ignore_ascii_case(" and ") {
                parts.push(current.trim().to_string());
                current = String::new();
                i += 5;
                continue;
            }
        }
        current.push(c);
        i += 1;
    }
    parts.push(current.trim().to_string());
    parts
}

fn strip_outer_parens(s: &str) -> Result<&str, DbError> {
    let t = s.trim();
    if t.starts_with('(') && t.ends_with(')') {
        Ok(&t[1..t.len() - 1])
    } else {
        Err(DbError::ParseError(format!("expected a parenthesized list: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::CompareOp;

    #[test]
    fn parses_create_table_with_foreign_key() {
        let stmt = parse(
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER, \
             FOREIGN KEY (user_id) REFERENCES users (id))",
        )
        .unwrap();
        match stmt {
            Statement::CreateTable { name, columns, foreign_keys } => {
                assert_eq!(name, "orders");
                assert_eq!(columns.len(), 2);
                assert_eq!(foreign_keys.len(), 1);
                assert_eq!(foreign_keys[0].referenced_table, "users");
            }
            other => panic!("expected CreateTable, got {other:?}"),
        }
    }

    #[test]
    fn parses_insert_with_quoted_text_containing_commas() {
        let stmt = parse("INSERT INTO t (id, note) VALUES (1, 'a, b, c')").unwrap();
        match stmt {
            Statement::Insert { table, columns, values } => {
                assert_eq!(table, "t");
                assert_eq!(columns, Some(vec!["id".to_string(), "note".to_string()]));
                assert_eq!(values, vec![Value::Int(1), Value::Text("a, b, c".into())]);
            }
            other => panic!("expected Insert, got {other:?}"),
        }
    }

    #[test]
    fn parses_select_with_where_and_group_by() {
        let stmt = parse("SELECT type, SUM(amount) FROM tx WHERE amount > 0 GROUP BY type").unwrap();
        match stmt {
            Statement::Select(SelectStatement::Plain { items, predicate, group_by, .. }) => {
                assert_eq!(items.len(), 2);
                assert_eq!(predicate.len(), 1);
                assert_eq!(predicate[0].op, CompareOp::Gt);
                assert_eq!(group_by, Some("type".to_string()));
            }
            other => panic!("expected plain Select, got {other:?}"),
        }
    }

    #[test]
    fn parses_join() {
        let stmt = parse("SELECT * FROM a JOIN b ON a.id = b.a_id").unwrap();
        match stmt {
            Statement::Select(SelectStatement::Join { left_table, right_table, .. }) => {
                assert_eq!(left_table, "a");
                assert_eq!(right_table, "b");
            }
            other => panic!("expected Join, got {other:?}"),
        }
    }

    #[test]
    fn rejects_multiple_joins() {
        let err = parse("SELECT * FROM a JOIN b ON a.id = b.id JOIN c ON b.id = c.id");
        assert!(matches!(err, Err(DbError::UnsupportedFeature(_))));
    }

    #[test]
    fn parses_conjunctive_predicate() {
        let stmt = parse("DELETE FROM t WHERE x = 1 AND y != 'z'").unwrap();
        match stmt {
            Statement::Delete { predicate, .. } => assert_eq!(predicate.len(), 2),
            other => panic!("expected Delete, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unrecognized_statements() {
        assert!(parse("EXPLAIN SELECT 1").is_err());
    }
}
