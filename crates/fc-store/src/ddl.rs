//! Typed DDL rendering for SQLite.
//!
//! Everything dialect-specific about turning a [`TableDef`] into SQL text
//! lives here. The migration engine decides *what* to apply; this module only
//! decides how it is spelled.

use crate::error::{StoreError, StoreResult};
use crate::registry::{ColumnDef, DefaultValue, ForeignKeyDef, IndexDef, PrimaryKey, TableDef};

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn quote_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| quote_ident(n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_default(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Null => "NULL".to_string(),
        DefaultValue::Integer(n) => n.to_string(),
        // `{:?}` keeps the decimal point for whole numbers (0.0, not 0)
        DefaultValue::Real(f) => format!("{f:?}"),
        DefaultValue::Text(s) => quote_literal(s),
        DefaultValue::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
        DefaultValue::Expr(e) => format!("({e})"),
    }
}

/// Render one column definition as it appears inside `CREATE TABLE` or after
/// `ADD COLUMN`.
pub fn render_column(column: &ColumnDef) -> String {
    let mut sql = format!("{} {}", quote_ident(column.name), column.sql_type.as_sql());

    match column.primary_key {
        PrimaryKey::No => {}
        PrimaryKey::Yes => sql.push_str(" PRIMARY KEY"),
        PrimaryKey::AutoIncrement => sql.push_str(" PRIMARY KEY AUTOINCREMENT"),
    }
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }
    if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&render_default(default));
    }
    if let Some(check) = column.check {
        sql.push_str(&format!(" CHECK ({check})"));
    }
    if let Some(generated) = &column.generated {
        let kind = if generated.stored { "STORED" } else { "VIRTUAL" };
        sql.push_str(&format!(" GENERATED ALWAYS AS ({}) {kind}", generated.expr));
    }
    sql
}

fn render_foreign_key(fk: &ForeignKeyDef) -> String {
    let mut sql = format!(
        "FOREIGN KEY ({}) REFERENCES {} ({})",
        quote_list(fk.columns),
        quote_ident(fk.references_table),
        quote_list(fk.references_columns)
    );
    if fk.on_delete != crate::registry::FkAction::NoAction {
        sql.push_str(" ON DELETE ");
        sql.push_str(fk.on_delete.as_sql());
    }
    sql
}

/// Render `CREATE TABLE` with every declared column and foreign key.
///
/// Foreign keys are only ever declared here: SQLite cannot attach a
/// constraint to an existing table.
pub fn render_create_table(table: &TableDef, if_not_exists: bool) -> String {
    let mut lines: Vec<String> = table.columns.iter().map(render_column).collect();
    lines.extend(table.foreign_keys.iter().map(render_foreign_key));

    format!(
        "CREATE TABLE {}{} (\n    {}\n)",
        if if_not_exists { "IF NOT EXISTS " } else { "" },
        quote_ident(table.name),
        lines.join(",\n    ")
    )
}

/// Render `ALTER TABLE ... ADD COLUMN`, rejecting column shapes SQLite can
/// only declare at creation time.
pub fn render_add_column(table: &TableDef, column: &ColumnDef) -> StoreResult<String> {
    let reject = |reason: &str| StoreError::UnsupportedAddColumn {
        table: table.name.to_string(),
        column: column.name.to_string(),
        reason: reason.to_string(),
    };

    if column.is_primary_key() {
        return Err(reject("PRIMARY KEY columns can only be declared at creation"));
    }
    if column.unique {
        return Err(reject("UNIQUE columns can only be declared at creation"));
    }
    if let Some(generated) = &column.generated {
        if generated.stored {
            return Err(reject("STORED generated columns can only be declared at creation"));
        }
    } else {
        match &column.default {
            Some(default) if !default.is_constant() => {
                return Err(reject("default must be a constant"));
            }
            Some(DefaultValue::Null) | None if !column.nullable => {
                return Err(reject("NOT NULL requires a non-NULL default"));
            }
            _ => {}
        }
    }

    Ok(format!(
        "ALTER TABLE {} ADD COLUMN {}",
        quote_ident(table.name),
        render_column(column)
    ))
}

/// Render `CREATE INDEX IF NOT EXISTS`; re-running it is a no-op.
pub fn render_create_index(table: &TableDef, index: &IndexDef) -> String {
    format!(
        "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
        if index.unique { "UNIQUE " } else { "" },
        quote_ident(index.name),
        quote_ident(table.name),
        quote_list(index.columns)
    )
}

#[cfg(test)]
#[path = "ddl_test.rs"]
mod tests;
