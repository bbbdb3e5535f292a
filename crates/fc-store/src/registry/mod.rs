//! Canonical schema registry.
//!
//! The registry is the single source of truth for what the store *should*
//! look like. It is pure data compiled into the binary: every table is a
//! [`TableDef`] built from `const` column, index, and foreign-key
//! descriptions. Iteration order is creation order, so a table must appear
//! after every table it references.
//!
//! The canonical registry lives in [`canonical`]; tests construct their own
//! registries from `static` table slices to exercise failure paths.

pub mod canonical;

pub use canonical::{canonical, MIGRATION_RECORD_TABLE, TARGET_SCHEMA_VERSION};

use std::collections::HashSet;

/// Declared storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Blob,
    Numeric,
    /// Stored as ISO-8601 text; declared as `TIMESTAMP` for readability.
    Timestamp,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
            SqlType::Numeric => "NUMERIC",
            SqlType::Timestamp => "TIMESTAMP",
        }
    }
}

/// Primary-key participation of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKey {
    No,
    Yes,
    /// `INTEGER PRIMARY KEY AUTOINCREMENT`; rowids are never reused.
    AutoIncrement,
}

/// Column default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(&'static str),
    CurrentTimestamp,
    /// Arbitrary expression, rendered in parentheses.
    Expr(&'static str),
}

impl DefaultValue {
    /// Whether the default is a constant SQLite accepts in
    /// `ALTER TABLE ... ADD COLUMN`.
    pub fn is_constant(&self) -> bool {
        !matches!(self, DefaultValue::CurrentTimestamp | DefaultValue::Expr(_))
    }
}

/// Generated (computed) column expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generated {
    pub expr: &'static str,
    /// `STORED` when true, `VIRTUAL` otherwise.
    pub stored: bool,
}

/// A single declared column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub primary_key: PrimaryKey,
    pub unique: bool,
    pub default: Option<DefaultValue>,
    pub check: Option<&'static str>,
    pub generated: Option<Generated>,
}

impl ColumnDef {
    /// A nullable column with no constraints.
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: true,
            primary_key: PrimaryKey::No,
            unique: false,
            default: None,
            check: None,
            generated: None,
        }
    }

    pub const fn not_null(self) -> Self {
        Self {
            nullable: false,
            ..self
        }
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: PrimaryKey::Yes,
            nullable: false,
            ..self
        }
    }

    pub const fn autoincrement(self) -> Self {
        Self {
            primary_key: PrimaryKey::AutoIncrement,
            nullable: false,
            ..self
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    pub const fn default(self, value: DefaultValue) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    pub const fn check(self, expr: &'static str) -> Self {
        Self {
            check: Some(expr),
            ..self
        }
    }

    pub const fn generated(self, expr: &'static str, stored: bool) -> Self {
        Self {
            generated: Some(Generated { expr, stored }),
            ..self
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key != PrimaryKey::No
    }
}

/// Action taken on the child row when the parent row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl FkAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            FkAction::NoAction => "NO ACTION",
            FkAction::Restrict => "RESTRICT",
            FkAction::Cascade => "CASCADE",
            FkAction::SetNull => "SET NULL",
            FkAction::SetDefault => "SET DEFAULT",
        }
    }
}

/// A table-level foreign-key clause. Only ever applied when the table is
/// created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub columns: &'static [&'static str],
    pub references_table: &'static str,
    pub references_columns: &'static [&'static str],
    pub on_delete: FkAction,
}

/// A declared index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub unique: bool,
}

/// Registry entry for one table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableDef {
    pub name: &'static str,
    pub description: &'static str,
    /// Columns in declaration order; new columns are appended, never inserted.
    pub columns: &'static [ColumnDef],
    pub indexes: &'static [IndexDef],
    pub foreign_keys: &'static [ForeignKeyDef],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Tables this table references through foreign keys.
    pub fn referenced_tables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.foreign_keys.iter().map(|fk| fk.references_table)
    }
}

/// An ordered, closed set of table definitions plus the schema version they
/// describe.
#[derive(Debug, Clone, Copy)]
pub struct SchemaRegistry {
    version: &'static str,
    description: &'static str,
    tables: &'static [TableDef],
}

impl SchemaRegistry {
    pub const fn new(
        version: &'static str,
        description: &'static str,
        tables: &'static [TableDef],
    ) -> Self {
        Self {
            version,
            description,
            tables,
        }
    }

    /// Version string recorded after a successful migration to this registry.
    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Free-text description stored alongside the version row.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// All table definitions in creation order.
    pub fn tables(&self) -> &'static [TableDef] {
        self.tables
    }

    pub fn get_definition(&self, name: &str) -> Option<&'static TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Look up a table the caller knows is declared.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not in the registry. The registry is compiled in
    /// and closed, so asking for an unknown table is a programming error.
    pub fn definition(&self, name: &str) -> &'static TableDef {
        match self.get_definition(name) {
            Some(def) => def,
            None => panic!(
                "table '{name}' is not declared in schema registry {}",
                self.version
            ),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_definition(name).is_some()
    }

    /// Table names in registry order.
    pub fn all_table_names(&self) -> Vec<&'static str> {
        self.tables.iter().map(|t| t.name).collect()
    }

    /// Check the registry's internal consistency.
    ///
    /// Returns one message per problem: duplicate tables or columns, foreign
    /// keys or indexes naming undeclared columns on either side, references to tables that
    /// are not declared earlier, and generated columns with defaults. The
    /// engine does not call this; it exists so the canonical registry can be
    /// checked by tests and the `check` command.
    pub fn lint(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen_tables: HashSet<&str> = HashSet::new();

        for table in self.tables {
            if !seen_tables.insert(table.name) {
                problems.push(format!("table '{}' declared twice", table.name));
            }

            let mut seen_columns: HashSet<&str> = HashSet::new();
            for column in table.columns {
                if !seen_columns.insert(column.name) {
                    problems.push(format!("{}.{} declared twice", table.name, column.name));
                }
                if column.generated.is_some() && column.default.is_some() {
                    problems.push(format!(
                        "{}.{} is generated and cannot have a default",
                        table.name, column.name
                    ));
                }
                if column.primary_key == PrimaryKey::AutoIncrement
                    && column.sql_type != SqlType::Integer
                {
                    problems.push(format!(
                        "{}.{} uses AUTOINCREMENT but is not INTEGER",
                        table.name, column.name
                    ));
                }
            }

            for fk in table.foreign_keys {
                for col in fk.columns {
                    if !seen_columns.contains(col) {
                        problems.push(format!(
                            "{}: foreign key column '{col}' is not declared",
                            table.name
                        ));
                    }
                }
                if fk.columns.len() != fk.references_columns.len() {
                    problems.push(format!(
                        "{}: foreign key to '{}' has mismatched column counts",
                        table.name, fk.references_table
                    ));
                }
                if fk.references_table != table.name
                    && !seen_tables.contains(fk.references_table)
                {
                    problems.push(format!(
                        "{} references '{}', which is not declared before it",
                        table.name, fk.references_table
                    ));
                }
                let parent = if fk.references_table == table.name {
                    Some(table)
                } else {
                    self.get_definition(fk.references_table)
                };
                if let Some(parent) = parent {
                    for col in fk.references_columns {
                        if parent.column(col).is_none() {
                            problems.push(format!(
                                "{} references undeclared column {}.{col}",
                                table.name, parent.name
                            ));
                        }
                    }
                }
            }

            for index in table.indexes {
                for col in index.columns {
                    if !seen_columns.contains(col) {
                        problems.push(format!(
                            "index '{}' on {} names undeclared column '{col}'",
                            index.name, table.name
                        ));
                    }
                }
            }
        }

        problems
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
