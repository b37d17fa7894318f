use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use roster_sql::{SQLError, SQLStore, Value};

use crate::entity::{Entity, FieldKind, TableDef};

/// Entity store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("storage: {0}")]
    Storage(String),
}

impl From<SQLError> for StoreError {
    fn from(e: SQLError) -> Self {
        StoreError::Storage(e.to_string())
    }
}

/// Sort direction for ordered reads. ASC unless asked otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Ordering by a named column. The column must exist in the entity's
/// table descriptor.
#[derive(Debug, Clone)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: Direction::Desc,
        }
    }
}

/// Pagination window. Page numbers are 1-indexed; the row offset is
/// `(number - 1) * size`.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

/// Options for [`EntityStore::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub order: Option<Order>,
    /// Row offset, applied only when `limit` is set.
    pub offset: u64,
    pub limit: Option<u64>,
    /// Substring filters: (column, needle). Each adds a
    /// `column LIKE '%needle%'` clause. Columns must be text-kind.
    pub like: Vec<(String, String)>,
}

/// Generic store translating entities into parameterized queries.
///
/// One instance serves every entity type; the SQL handle is injected at
/// construction. No caching — every call round-trips to the database.
pub struct EntityStore {
    sql: Arc<dyn SQLStore>,
}

impl EntityStore {
    pub fn new(sql: Arc<dyn SQLStore>) -> Self {
        Self { sql }
    }

    /// Persist an entity: update all non-key fields when a row with the
    /// entity's key already exists, insert otherwise. On insert the
    /// generated key is written back into the entity. Returns the
    /// affected-row count.
    pub fn save<E: Entity>(&self, entity: &mut E) -> Result<u64, StoreError> {
        if self.get_by_key::<E>(entity.key())?.is_some() {
            self.update(entity)
        } else {
            self.create(entity)
        }
    }

    /// Fetch the single entity with this primary key. An unset key
    /// short-circuits to `None` without touching the database.
    pub fn get_by_key<E: Entity>(&self, key: Option<i64>) -> Result<Option<E>, StoreError> {
        let Some(key) = key else {
            return Ok(None);
        };
        let table = &E::TABLE;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 LIMIT 1",
            select_list(table),
            quote(table.name),
            quote(table.key),
        );
        let rows = self.sql.query(&sql, &[Value::Integer(key)])?;
        Ok(rows.first().map(E::from_row))
    }

    /// Read the whole table, optionally ordered and paginated.
    ///
    /// Without a page this loads every row — fine for small tables,
    /// a resource hazard for large ones.
    pub fn get_all<E: Entity>(
        &self,
        page: Option<Page>,
        order: Option<&Order>,
    ) -> Result<Vec<E>, StoreError> {
        let table = &E::TABLE;
        let mut sql = format!("SELECT {} FROM {}", select_list(table), quote(table.name));
        if let Some(order) = order {
            sql.push_str(&order_clause(table, order)?);
        }
        if let Some(page) = page {
            if page.number == 0 {
                return Err(StoreError::InvalidQuery(
                    "page numbers are 1-indexed".into(),
                ));
            }
            sql.push_str(&format!(
                " LIMIT {} OFFSET {}",
                page.size,
                (page.number - 1) * page.size,
            ));
        }
        let rows = self.sql.query(&sql, &[])?;
        Ok(rows.iter().map(E::from_row).collect())
    }

    /// Search by example: every non-null field of `example` becomes a
    /// parameter-bound equality clause, every `opts.like` entry a
    /// substring clause. With no clauses at all this degrades to an
    /// unordered, unpaginated [`get_all`](Self::get_all).
    pub fn search<E: Entity>(
        &self,
        example: &E,
        opts: &SearchOptions,
    ) -> Result<Vec<E>, StoreError> {
        let table = &E::TABLE;
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        let values = example.values();
        debug_assert_eq!(values.len(), table.fields.len());
        for (field, value) in table.fields.iter().zip(values) {
            if value.is_null() {
                continue;
            }
            clauses.push(format!("{} = ?{}", quote(field.name), params.len() + 1));
            params.push(value);
        }

        for (column, needle) in &opts.like {
            let field = table.field(column).ok_or_else(|| {
                StoreError::InvalidQuery(format!("unknown like column: {}", column))
            })?;
            if field.kind != FieldKind::Text {
                return Err(StoreError::InvalidQuery(format!(
                    "like filter on non-text column: {}",
                    column
                )));
            }
            // Escaped into the statement as a literal, matching the
            // generated-DAO query shape.
            clauses.push(format!(
                "{} LIKE '%{}%'",
                quote(column),
                escape_literal(needle),
            ));
        }

        if clauses.is_empty() {
            return self.get_all(None, None);
        }

        let mut sql = format!(
            "SELECT {} FROM {} WHERE ({})",
            select_list(table),
            quote(table.name),
            clauses.join(" AND "),
        );
        if let Some(order) = &opts.order {
            sql.push_str(&order_clause(table, order)?);
        }
        if let Some(limit) = opts.limit {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, opts.offset));
        }

        debug!(table = table.name, clauses = clauses.len(), "search");
        let rows = self.sql.query(&sql, &params)?;
        Ok(rows.iter().map(E::from_row).collect())
    }

    /// Range search over two criterion entities. Per field: both set →
    /// bounded between the smaller and larger value (criterion order
    /// doesn't matter); one set → exact match; neither → not filtered.
    /// At least one field must be set on either criterion.
    pub fn by_range<E: Entity>(
        &self,
        low: &E,
        high: &E,
        order: Option<&Order>,
    ) -> Result<Vec<E>, StoreError> {
        let table = &E::TABLE;
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        for ((field, a), b) in table.fields.iter().zip(low.values()).zip(high.values()) {
            match (a.is_null(), b.is_null()) {
                (false, false) => {
                    let (lo, hi) = ordered_pair(a, b);
                    clauses.push(format!(
                        "({col} >= ?{} AND {col} <= ?{})",
                        params.len() + 1,
                        params.len() + 2,
                        col = quote(field.name),
                    ));
                    params.push(lo);
                    params.push(hi);
                }
                (false, true) => {
                    clauses.push(format!("{} = ?{}", quote(field.name), params.len() + 1));
                    params.push(a);
                }
                (true, false) => {
                    clauses.push(format!("{} = ?{}", quote(field.name), params.len() + 1));
                    params.push(b);
                }
                (true, true) => {}
            }
        }

        if clauses.is_empty() {
            return Err(StoreError::InvalidQuery(
                "range search requires at least one bounded field".into(),
            ));
        }

        let mut sql = format!(
            "SELECT {} FROM {} WHERE ({})",
            select_list(table),
            quote(table.name),
            clauses.join(" AND "),
        );
        if let Some(order) = order {
            sql.push_str(&order_clause(table, order)?);
        }

        let rows = self.sql.query(&sql, &params)?;
        Ok(rows.iter().map(E::from_row).collect())
    }

    /// Delete the row matching the entity's primary key. Deleting a row
    /// that does not exist is a [`StoreError::NotFound`].
    pub fn delete<E: Entity>(&self, entity: &E) -> Result<u64, StoreError> {
        let table = &E::TABLE;
        let Some(key) = entity.key() else {
            return Err(StoreError::NotFound(format!(
                "{}: no primary key set",
                table.name
            )));
        };
        if self.get_by_key::<E>(Some(key))?.is_none() {
            return Err(StoreError::NotFound(format!("{}/{}", table.name, key)));
        }
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            quote(table.name),
            quote(table.key),
        );
        Ok(self.sql.exec(&sql, &[Value::Integer(key)])?)
    }

    fn create<E: Entity>(&self, entity: &mut E) -> Result<u64, StoreError> {
        let table = &E::TABLE;
        let cols: Vec<String> = table.fields.iter().map(|f| quote(f.name)).collect();
        let placeholders: Vec<String> =
            (1..=table.fields.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table.name),
            cols.join(", "),
            placeholders.join(", "),
        );
        let id = self.sql.insert(&sql, &entity.values())?;
        entity.set_key(id);
        Ok(1)
    }

    fn update<E: Entity>(&self, entity: &E) -> Result<u64, StoreError> {
        let table = &E::TABLE;
        let mut sets = Vec::new();
        let mut params = Vec::new();

        for (field, value) in table.fields.iter().zip(entity.values()) {
            if field.name == table.key {
                continue;
            }
            sets.push(format!("{} = ?{}", quote(field.name), params.len() + 1));
            params.push(value);
        }

        // save() only routes here after finding the keyed row.
        let key = entity
            .key()
            .ok_or_else(|| StoreError::InvalidQuery("update without primary key".into()))?;
        params.push(Value::Integer(key));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            quote(table.name),
            sets.join(", "),
            quote(table.key),
            params.len(),
        );
        Ok(self.sql.exec(&sql, &params)?)
    }
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident)
}

fn select_list(table: &TableDef) -> String {
    table
        .fields
        .iter()
        .map(|f| quote(f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build an ORDER BY clause, rejecting columns the descriptor doesn't know.
fn order_clause(table: &TableDef, order: &Order) -> Result<String, StoreError> {
    if !table.has_column(&order.column) {
        return Err(StoreError::InvalidQuery(format!(
            "unknown order column: {}",
            order.column
        )));
    }
    Ok(format!(
        " ORDER BY {} {}",
        quote(&order.column),
        order.direction.as_sql(),
    ))
}

/// Escape a value for embedding in a single-quoted SQL literal.
fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}

/// Sort a pair of same-kind values so the caller may pass range bounds
/// in either order.
fn ordered_pair(a: Value, b: Value) -> (Value, Value) {
    let swap = match (&a, &b) {
        (Value::Integer(x), Value::Integer(y)) => x > y,
        (Value::Text(x), Value::Text(y)) => x > y,
        (Value::Real(x), Value::Real(y)) => x > y,
        _ => false,
    };
    if swap {
        (b, a)
    } else {
        (a, b)
    }
}
