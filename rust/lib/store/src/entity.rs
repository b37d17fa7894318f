use roster_sql::{Row, Value};

/// Column kinds the store knows how to bind and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
}

/// One column of an entity's table.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Static description of an entity's table: name, primary-key column,
/// and the full column list in table order (key included).
///
/// The primary key is a single integer column, auto-assigned on insert
/// when the entity carries no key value.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub key: &'static str,
    pub fields: &'static [FieldDef],
}

impl TableDef {
    /// Look up a column descriptor by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the table has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// A table-backed record type.
///
/// Fields are optional on the Rust side: an unset field binds as SQL NULL,
/// which is also how a search example marks a field as "not a criterion".
pub trait Entity: Sized {
    /// Table descriptor for this entity type.
    const TABLE: TableDef;

    /// Field values aligned one-to-one with `TABLE.fields`.
    fn values(&self) -> Vec<Value>;

    /// Decode an entity from a queried row.
    fn from_row(row: &Row) -> Self;

    /// Primary-key value, if set.
    fn key(&self) -> Option<i64>;

    /// Write back a generated primary key after insert.
    fn set_key(&mut self, key: i64);
}

/// Bind helper: optional integer field to a SQL value.
pub fn integer_or_null(v: Option<i64>) -> Value {
    v.map(Value::Integer).unwrap_or(Value::Null)
}

/// Bind helper: optional text field to a SQL value.
pub fn text_or_null(v: Option<&str>) -> Value {
    v.map(|s| Value::Text(s.to_string())).unwrap_or(Value::Null)
}
