//! Dynamic bind lists for raw statements
//!
//! Variable-length `IN (...)` filters get one positional placeholder per
//! value, with the values kept in placeholder order.

use sea_orm::{DbBackend, Statement, Value};

use crate::error::{AppError, AppResult};

/// Placeholder/value pairs for a single statement
#[derive(Debug, Default)]
pub struct Binds {
    entries: Vec<(String, Value)>,
}

impl Binds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind one value and return its placeholder
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        let placeholder = format!("${}", self.entries.len() + 1);
        self.entries.push((placeholder.clone(), value.into()));
        placeholder
    }

    /// Bind every value and return the placeholders joined for an `IN` list
    pub fn bind_all<V>(&mut self, values: &[V]) -> String
    where
        V: Clone + Into<Value>,
    {
        values
            .iter()
            .map(|v| self.bind(v.clone()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    /// Build the statement with values in placeholder order
    pub fn into_statement(self, backend: DbBackend, sql: &str) -> Statement {
        let values = self.entries.into_iter().map(|(_, v)| v);
        Statement::from_sql_and_values(backend, sql, values)
    }
}

/// Parse an `ids=1,2,3` query value
///
/// Blank tokens are skipped. No ids at all, or any token that is not an
/// integer, is a client error.
pub fn parse_id_list(raw: Option<&str>) -> AppResult<Vec<i32>> {
    let ids = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i32>()
                .map_err(|_| AppError::BadRequest(format!("Invalid id: {}", token)))
        })
        .collect::<AppResult<Vec<i32>>>()?;

    if ids.is_empty() {
        return Err(AppError::BadRequest("No ids supplied".to_string()));
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn one_placeholder_per_value() {
        let ids = [7, 3, 7, 12];
        let mut binds = Binds::new();
        let list = binds.bind_all(&ids);

        assert_eq!(list, "$1, $2, $3, $4");
        assert_eq!(binds.len(), ids.len());

        let unique: HashSet<&str> = binds.placeholders().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn placeholders_continue_after_scalar_bind() {
        let mut binds = Binds::new();
        assert_eq!(binds.bind("solicitado"), "$1");
        assert_eq!(binds.bind_all(&[10, 20]), "$2, $3");

        let stmt = binds.into_statement(
            DbBackend::Postgres,
            "SELECT 1 WHERE status = $1 AND id IN ($2, $3)",
        );
        let values = stmt.values.expect("values are bound").0;
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], Value::from("solicitado"));
        assert_eq!(values[2], Value::from(20));
    }

    #[test]
    fn parses_trimmed_ids() {
        assert_eq!(parse_id_list(Some("1, 2,3")).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list(Some(" 5 ,,6")).unwrap(), vec![5, 6]);
        assert_eq!(parse_id_list(Some("4,4")).unwrap(), vec![4, 4]);
    }

    #[test]
    fn empty_id_list_is_client_error() {
        assert!(matches!(parse_id_list(None), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_id_list(Some("")), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_id_list(Some(" , ")), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn non_numeric_id_is_client_error() {
        assert!(matches!(
            parse_id_list(Some("1,abc")),
            Err(AppError::BadRequest(_))
        ));
    }
}
