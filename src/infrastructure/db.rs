use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create users table (owner identity only; authentication lives outside
    // this service)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create clients table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            cep TEXT,
            street_address TEXT,
            city TEXT,
            state TEXT,
            birth_date TEXT,
            notes TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_clients_owner_id ON clients(owner_id);
        CREATE INDEX IF NOT EXISTS idx_clients_is_active ON clients(is_active);
        "#
        .to_owned(),
    ))
    .await?;

    // Create sales table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS sales (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id INTEGER NOT NULL,
            owner_id INTEGER NOT NULL,
            property_type TEXT NOT NULL,
            address TEXT NOT NULL,
            amount REAL NOT NULL,
            sale_date TEXT NOT NULL,
            broker_commission_amount REAL,
            agency_commission_amount REAL,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (client_id) REFERENCES clients(id),
            FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_sales_client_id ON sales(client_id);
        CREATE INDEX IF NOT EXISTS idx_sales_owner_id ON sales(owner_id);
        CREATE INDEX IF NOT EXISTS idx_sales_sale_date ON sales(sale_date);
        "#
        .to_owned(),
    ))
    .await?;

    // Create commissions table (one per sale)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS commissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sale_id INTEGER NOT NULL UNIQUE,
            owner_id INTEGER NOT NULL,
            client_name TEXT NOT NULL,
            property TEXT NOT NULL,
            value_at_creation REAL NOT NULL,
            agency_commission_amount REAL NOT NULL DEFAULT 0,
            broker_commission_amount REAL NOT NULL DEFAULT 0,
            contract_date TEXT NOT NULL,
            sale_date TEXT NOT NULL,
            payment_date TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            value_status TEXT NOT NULL DEFAULT 'up_to_date',
            original_sale_amount REAL,
            current_sale_amount REAL,
            value_difference REAL,
            justification_text TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (sale_id) REFERENCES sales(id),
            FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_commissions_owner_id ON commissions(owner_id);
        CREATE INDEX IF NOT EXISTS idx_commissions_status ON commissions(status);
        CREATE INDEX IF NOT EXISTS idx_commissions_value_status ON commissions(value_status);
        CREATE INDEX IF NOT EXISTS idx_commissions_sale_date ON commissions(sale_date);
        "#
        .to_owned(),
    ))
    .await?;

    // Create receipts table (immutable partial payments)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS receipts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            commission_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            idempotency_key TEXT UNIQUE,
            created_at TEXT NOT NULL,
            FOREIGN KEY (commission_id) REFERENCES commissions(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_receipts_commission_id ON receipts(commission_id);
        CREATE INDEX IF NOT EXISTS idx_receipts_date ON receipts(date);
        "#
        .to_owned(),
    ))
    .await?;

    // Create goal tables (one row per period per owner)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS monthly_goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            value REAL NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(owner_id, month, year),
            FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS annual_goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            value REAL NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(owner_id, year),
            FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Migration: add idempotency_key to receipts created before it existed.
    // SQLite has no IF NOT EXISTS for ALTER TABLE, so we ignore errors.
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE receipts ADD COLUMN idempotency_key TEXT".to_owned(),
        ))
        .await;

    // Migration: add payment_date to commissions
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE commissions ADD COLUMN payment_date TEXT".to_owned(),
        ))
        .await;

    Ok(())
}
