use super::*;
use crate::registry::{canonical, FkAction, SqlType};

static WIDGET_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", SqlType::Integer).autoincrement(),
    ColumnDef::new("owner_id", SqlType::Integer).not_null(),
    ColumnDef::new("label", SqlType::Text)
        .not_null()
        .default(DefaultValue::Text("it's new")),
];

static WIDGET_FKS: &[ForeignKeyDef] = &[ForeignKeyDef {
    columns: &["owner_id"],
    references_table: "owners",
    references_columns: &["id"],
    on_delete: FkAction::Cascade,
}];

static WIDGET_INDEXES: &[IndexDef] = &[IndexDef {
    name: "idx_widgets_owner_label",
    columns: &["owner_id", "label"],
    unique: true,
}];

static WIDGETS: TableDef = TableDef {
    name: "widgets",
    description: "",
    columns: WIDGET_COLUMNS,
    indexes: WIDGET_INDEXES,
    foreign_keys: WIDGET_FKS,
};

#[test]
fn quote_ident_doubles_quotes() {
    assert_eq!(quote_ident("plain"), "\"plain\"");
    assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
}

#[test]
fn render_column_orders_constraints() {
    let col = ColumnDef::new("status", SqlType::Text)
        .not_null()
        .default(DefaultValue::Text("available"))
        .check("status IN ('available', 'sold')");
    assert_eq!(
        render_column(&col),
        "\"status\" TEXT NOT NULL DEFAULT 'available' CHECK (status IN ('available', 'sold'))"
    );
}

#[test]
fn render_column_defaults() {
    let real = ColumnDef::new("rate", SqlType::Real).default(DefaultValue::Real(0.0));
    assert_eq!(render_column(&real), "\"rate\" REAL DEFAULT 0.0");

    let ts = ColumnDef::new("at", SqlType::Timestamp).default(DefaultValue::CurrentTimestamp);
    assert_eq!(render_column(&ts), "\"at\" TIMESTAMP DEFAULT CURRENT_TIMESTAMP");

    let expr = ColumnDef::new("n", SqlType::Integer).default(DefaultValue::Expr("1 + 1"));
    assert_eq!(render_column(&expr), "\"n\" INTEGER DEFAULT (1 + 1)");
}

#[test]
fn render_generated_column() {
    let col = ColumnDef::new("total", SqlType::Real).generated("a + b", true);
    assert_eq!(
        render_column(&col),
        "\"total\" REAL GENERATED ALWAYS AS (a + b) STORED"
    );
}

#[test]
fn render_create_table_includes_foreign_keys() {
    let sql = render_create_table(&WIDGETS, false);
    assert!(sql.starts_with("CREATE TABLE \"widgets\" ("));
    assert!(sql.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL"));
    assert!(sql.contains("DEFAULT 'it''s new'"));
    assert!(sql.contains(
        "FOREIGN KEY (\"owner_id\") REFERENCES \"owners\" (\"id\") ON DELETE CASCADE"
    ));
    assert!(render_create_table(&WIDGETS, true).starts_with("CREATE TABLE IF NOT EXISTS"));
}

#[test]
fn render_create_index_is_idempotent_form() {
    assert_eq!(
        render_create_index(&WIDGETS, &WIDGET_INDEXES[0]),
        "CREATE UNIQUE INDEX IF NOT EXISTS \"idx_widgets_owner_label\" ON \"widgets\" (\"owner_id\", \"label\")"
    );
}

#[test]
fn add_column_accepts_constant_default() {
    let sql = render_add_column(&WIDGETS, &WIDGET_COLUMNS[2]).unwrap();
    assert_eq!(
        sql,
        "ALTER TABLE \"widgets\" ADD COLUMN \"label\" TEXT NOT NULL DEFAULT 'it''s new'"
    );
}

#[test]
fn add_column_rejects_creation_only_shapes() {
    let cases = [
        ColumnDef::new("id", SqlType::Integer).primary_key(),
        ColumnDef::new("code", SqlType::Text).unique(),
        ColumnDef::new("code", SqlType::Text).not_null(),
        ColumnDef::new("code", SqlType::Text)
            .not_null()
            .default(DefaultValue::Null),
        ColumnDef::new("at", SqlType::Timestamp).default(DefaultValue::CurrentTimestamp),
        ColumnDef::new("total", SqlType::Real).generated("a + b", true),
    ];
    for column in &cases {
        let err = render_add_column(&WIDGETS, column).unwrap_err();
        assert!(
            matches!(err, StoreError::UnsupportedAddColumn { .. }),
            "expected rejection for {column:?}"
        );
    }
}

#[test]
fn add_column_allows_virtual_generated() {
    let col = ColumnDef::new("shout", SqlType::Text).generated("upper(label)", false);
    assert!(render_add_column(&WIDGETS, &col).is_ok());
}

#[test]
fn canonical_columns_added_after_1_0_are_addable() {
    let vehicles = canonical().definition("vehicles");
    for name in ["condition", "display_name"] {
        let col = vehicles.column(name).unwrap();
        assert!(render_add_column(vehicles, col).is_ok(), "{name}");
    }
    let sales = canonical().definition("sales");
    let commission = sales.column("commission").unwrap();
    assert!(render_add_column(sales, commission).is_ok());
}
