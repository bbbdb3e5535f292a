//! The canonical Forecourt schema.
//!
//! Append-only: existing deployments only ever gain tables, columns, and
//! indexes. Bump [`TARGET_SCHEMA_VERSION`] whenever a definition changes.
//!
//! A column appended to an existing table must be addable with
//! `ALTER TABLE ADD COLUMN`: nullable or NOT NULL with a constant default,
//! not a key, not UNIQUE, not STORED, and not defaulting to
//! `CURRENT_TIMESTAMP`. The 1.0.0 columns predate this rule, so a store
//! missing one of those (for example `created_at`) fails with S005 instead
//! of being widened; such tables have to be rebuilt by hand.
//!
//! | Version | Change |
//! |---------|--------|
//! | 1.0.0   | dealers, users, vehicles, customers, sales |
//! | 1.1.0   | `vehicles.condition`, `vehicles.display_name`, `sales.commission`, migration history |

use super::{
    ColumnDef, DefaultValue, FkAction, ForeignKeyDef, IndexDef, SchemaRegistry, SqlType, TableDef,
};

/// Schema version this binary migrates stores to.
pub const TARGET_SCHEMA_VERSION: &str = "1.1.0";

/// Append-only history of structural changes made by the engine.
pub const MIGRATION_RECORD_TABLE: &str = "schema_migrations";

const fn id() -> ColumnDef {
    ColumnDef::new("id", SqlType::Integer).autoincrement()
}

const fn created_at() -> ColumnDef {
    ColumnDef::new("created_at", SqlType::Timestamp)
        .not_null()
        .default(DefaultValue::CurrentTimestamp)
}

// ── schema_migrations ──────────────────────────────────────────────────

static SCHEMA_MIGRATIONS_COLUMNS: &[ColumnDef] = &[
    id(),
    ColumnDef::new("table_name", SqlType::Text).not_null(),
    ColumnDef::new("applied_at", SqlType::Text).not_null(),
    ColumnDef::new("description", SqlType::Text),
    ColumnDef::new("checksum", SqlType::Text).not_null(),
];

static SCHEMA_MIGRATIONS_INDEXES: &[IndexDef] = &[IndexDef {
    name: "idx_schema_migrations_table",
    columns: &["table_name", "applied_at"],
    unique: false,
}];

// ── dealers ────────────────────────────────────────────────────────────

static DEALERS_COLUMNS: &[ColumnDef] = &[
    id(),
    ColumnDef::new("name", SqlType::Text).not_null(),
    ColumnDef::new("license_number", SqlType::Text)
        .not_null()
        .unique(),
    ColumnDef::new("address", SqlType::Text),
    ColumnDef::new("city", SqlType::Text),
    ColumnDef::new("state", SqlType::Text),
    ColumnDef::new("phone", SqlType::Text),
    ColumnDef::new("email", SqlType::Text),
    ColumnDef::new("compliance_limit", SqlType::Real)
        .not_null()
        .default(DefaultValue::Real(0.0))
        .check("compliance_limit >= 0"),
    created_at(),
];

static DEALERS_INDEXES: &[IndexDef] = &[IndexDef {
    name: "idx_dealers_state",
    columns: &["state"],
    unique: false,
}];

// ── users ──────────────────────────────────────────────────────────────

static USERS_COLUMNS: &[ColumnDef] = &[
    id(),
    ColumnDef::new("dealer_id", SqlType::Integer),
    ColumnDef::new("username", SqlType::Text).not_null().unique(),
    ColumnDef::new("password_hash", SqlType::Text).not_null(),
    ColumnDef::new("role", SqlType::Text)
        .not_null()
        .default(DefaultValue::Text("staff"))
        .check("role IN ('admin', 'manager', 'staff')"),
    ColumnDef::new("api_key_hash", SqlType::Text),
    created_at(),
];

static USERS_INDEXES: &[IndexDef] = &[IndexDef {
    name: "idx_users_dealer",
    columns: &["dealer_id"],
    unique: false,
}];

static USERS_FOREIGN_KEYS: &[ForeignKeyDef] = &[ForeignKeyDef {
    columns: &["dealer_id"],
    references_table: "dealers",
    references_columns: &["id"],
    on_delete: FkAction::SetNull,
}];

// ── vehicles ───────────────────────────────────────────────────────────

static VEHICLES_COLUMNS: &[ColumnDef] = &[
    id(),
    ColumnDef::new("dealer_id", SqlType::Integer).not_null(),
    ColumnDef::new("vin", SqlType::Text)
        .not_null()
        .unique()
        .check("length(vin) = 17"),
    ColumnDef::new("make", SqlType::Text).not_null(),
    ColumnDef::new("model", SqlType::Text).not_null(),
    ColumnDef::new("year", SqlType::Integer)
        .not_null()
        .check("year BETWEEN 1900 AND 2100"),
    ColumnDef::new("mileage", SqlType::Integer)
        .not_null()
        .default(DefaultValue::Integer(0)),
    ColumnDef::new("price", SqlType::Real).not_null(),
    ColumnDef::new("cost", SqlType::Real)
        .not_null()
        .default(DefaultValue::Real(0.0)),
    ColumnDef::new("status", SqlType::Text)
        .not_null()
        .default(DefaultValue::Text("available"))
        .check("status IN ('available', 'pending', 'sold')"),
    created_at(),
    // 1.1.0
    ColumnDef::new("condition", SqlType::Text)
        .not_null()
        .default(DefaultValue::Text("used"))
        .check("condition IN ('new', 'used', 'certified')"),
    ColumnDef::new("display_name", SqlType::Text)
        .generated("year || ' ' || make || ' ' || model", false),
];

static VEHICLES_INDEXES: &[IndexDef] = &[
    IndexDef {
        name: "idx_vehicles_dealer",
        columns: &["dealer_id"],
        unique: false,
    },
    IndexDef {
        name: "idx_vehicles_status",
        columns: &["dealer_id", "status"],
        unique: false,
    },
];

static VEHICLES_FOREIGN_KEYS: &[ForeignKeyDef] = &[ForeignKeyDef {
    columns: &["dealer_id"],
    references_table: "dealers",
    references_columns: &["id"],
    on_delete: FkAction::Cascade,
}];

// ── customers ──────────────────────────────────────────────────────────

static CUSTOMERS_COLUMNS: &[ColumnDef] = &[
    id(),
    ColumnDef::new("dealer_id", SqlType::Integer).not_null(),
    ColumnDef::new("first_name", SqlType::Text).not_null(),
    ColumnDef::new("last_name", SqlType::Text).not_null(),
    ColumnDef::new("email", SqlType::Text),
    ColumnDef::new("phone", SqlType::Text),
    ColumnDef::new("drivers_license", SqlType::Text),
    created_at(),
];

static CUSTOMERS_INDEXES: &[IndexDef] = &[
    IndexDef {
        name: "idx_customers_dealer",
        columns: &["dealer_id"],
        unique: false,
    },
    IndexDef {
        name: "idx_customers_email",
        columns: &["email"],
        unique: false,
    },
];

static CUSTOMERS_FOREIGN_KEYS: &[ForeignKeyDef] = &[ForeignKeyDef {
    columns: &["dealer_id"],
    references_table: "dealers",
    references_columns: &["id"],
    on_delete: FkAction::Cascade,
}];

// ── sales ──────────────────────────────────────────────────────────────

static SALES_COLUMNS: &[ColumnDef] = &[
    id(),
    ColumnDef::new("vehicle_id", SqlType::Integer).not_null(),
    ColumnDef::new("customer_id", SqlType::Integer).not_null(),
    ColumnDef::new("dealer_id", SqlType::Integer).not_null(),
    ColumnDef::new("sale_price", SqlType::Real)
        .not_null()
        .check("sale_price >= 0"),
    ColumnDef::new("cost_basis", SqlType::Real)
        .not_null()
        .default(DefaultValue::Real(0.0)),
    ColumnDef::new("commission_rate", SqlType::Real)
        .not_null()
        .default(DefaultValue::Real(0.05)),
    ColumnDef::new("payment_method", SqlType::Text)
        .not_null()
        .default(DefaultValue::Text("cash"))
        .check("payment_method IN ('cash', 'finance', 'lease')"),
    ColumnDef::new("sale_date", SqlType::Timestamp)
        .not_null()
        .default(DefaultValue::CurrentTimestamp),
    ColumnDef::new("gross_profit", SqlType::Real).generated("sale_price - cost_basis", false),
    // 1.1.0
    ColumnDef::new("commission", SqlType::Real)
        .generated("round(sale_price * commission_rate, 2)", false),
];

static SALES_INDEXES: &[IndexDef] = &[
    IndexDef {
        name: "idx_sales_vehicle",
        columns: &["vehicle_id"],
        unique: true,
    },
    IndexDef {
        name: "idx_sales_customer",
        columns: &["customer_id"],
        unique: false,
    },
    IndexDef {
        name: "idx_sales_dealer_date",
        columns: &["dealer_id", "sale_date"],
        unique: false,
    },
];

static SALES_FOREIGN_KEYS: &[ForeignKeyDef] = &[
    ForeignKeyDef {
        columns: &["vehicle_id"],
        references_table: "vehicles",
        references_columns: &["id"],
        on_delete: FkAction::Restrict,
    },
    ForeignKeyDef {
        columns: &["customer_id"],
        references_table: "customers",
        references_columns: &["id"],
        on_delete: FkAction::Restrict,
    },
    ForeignKeyDef {
        columns: &["dealer_id"],
        references_table: "dealers",
        references_columns: &["id"],
        on_delete: FkAction::Cascade,
    },
];

// ── registry ───────────────────────────────────────────────────────────

static TABLES: &[TableDef] = &[
    TableDef {
        name: MIGRATION_RECORD_TABLE,
        description: "Structural changes applied by the migration engine",
        columns: SCHEMA_MIGRATIONS_COLUMNS,
        indexes: SCHEMA_MIGRATIONS_INDEXES,
        foreign_keys: &[],
    },
    TableDef {
        name: "dealers",
        description: "Licensed dealerships",
        columns: DEALERS_COLUMNS,
        indexes: DEALERS_INDEXES,
        foreign_keys: &[],
    },
    TableDef {
        name: "users",
        description: "API and back-office accounts",
        columns: USERS_COLUMNS,
        indexes: USERS_INDEXES,
        foreign_keys: USERS_FOREIGN_KEYS,
    },
    TableDef {
        name: "vehicles",
        description: "Vehicle inventory per dealer",
        columns: VEHICLES_COLUMNS,
        indexes: VEHICLES_INDEXES,
        foreign_keys: VEHICLES_FOREIGN_KEYS,
    },
    TableDef {
        name: "customers",
        description: "Customers per dealer",
        columns: CUSTOMERS_COLUMNS,
        indexes: CUSTOMERS_INDEXES,
        foreign_keys: CUSTOMERS_FOREIGN_KEYS,
    },
    TableDef {
        name: "sales",
        description: "Completed vehicle sales",
        columns: SALES_COLUMNS,
        indexes: SALES_INDEXES,
        foreign_keys: SALES_FOREIGN_KEYS,
    },
];

static CANONICAL: SchemaRegistry = SchemaRegistry::new(
    TARGET_SCHEMA_VERSION,
    "Forecourt dealer records schema",
    TABLES,
);

/// The registry compiled into this binary.
pub fn canonical() -> &'static SchemaRegistry {
    &CANONICAL
}
