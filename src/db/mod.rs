//! Database pool, schema and first-startup seeding.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::QUOTE_TICKER;

pub struct Database {
    pub pool: PgPool,
}

/// Idempotent DDL, applied statement by statement on every startup.
const SCHEMA: &[&str] = &[
    "DO $$ BEGIN CREATE TYPE user_role AS ENUM ('USER', 'ADMIN'); \
     EXCEPTION WHEN duplicate_object THEN NULL; END $$",
    "DO $$ BEGIN CREATE TYPE direction AS ENUM ('BUY', 'SELL'); \
     EXCEPTION WHEN duplicate_object THEN NULL; END $$",
    "DO $$ BEGIN CREATE TYPE order_kind AS ENUM ('LIMIT', 'MARKET'); \
     EXCEPTION WHEN duplicate_object THEN NULL; END $$",
    "DO $$ BEGIN CREATE TYPE order_status AS ENUM \
     ('NEW', 'PARTIALLY_EXECUTED', 'EXECUTED', 'CANCELLED'); \
     EXCEPTION WHEN duplicate_object THEN NULL; END $$",
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        role user_role NOT NULL DEFAULT 'USER',
        api_key TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS instruments (
        ticker TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        kind TEXT NOT NULL DEFAULT 'STOCK',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS balances (
        user_id UUID NOT NULL REFERENCES users(id),
        ticker TEXT NOT NULL REFERENCES instruments(ticker),
        amount BIGINT NOT NULL DEFAULT 0 CHECK (amount >= 0),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (user_id, ticker)
    )",
    "CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id),
        ticker TEXT NOT NULL REFERENCES instruments(ticker),
        direction direction NOT NULL,
        kind order_kind NOT NULL,
        qty BIGINT NOT NULL CHECK (qty >= 1),
        price BIGINT CHECK (price > 0),
        status order_status NOT NULL DEFAULT 'NEW',
        filled BIGINT NOT NULL DEFAULT 0 CHECK (filled >= 0 AND filled <= qty),
        ts TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS orders_resting_idx \
     ON orders (ticker, direction, price, ts, id) \
     WHERE kind = 'LIMIT' AND status IN ('NEW', 'PARTIALLY_EXECUTED')",
    "CREATE TABLE IF NOT EXISTS trades (
        id BIGSERIAL PRIMARY KEY,
        ticker TEXT NOT NULL REFERENCES instruments(ticker),
        amount BIGINT NOT NULL,
        price BIGINT NOT NULL,
        buyer_id UUID NOT NULL REFERENCES users(id),
        seller_id UUID NOT NULL REFERENCES users(id),
        ts TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS trades_tape_idx ON trades (ticker, ts DESC, id DESC)",
];

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("database schema ready");
        Ok(())
    }

    /// Seed the bootstrap administrator and the default currency instruments.
    pub async fn bootstrap(&self, admin_token: &str) -> Result<(), sqlx::Error> {
        let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE api_key = $1")
            .bind(admin_token)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_none() {
            sqlx::query("INSERT INTO users (id, name, role, api_key) VALUES ($1, 'Admin', 'ADMIN', $2)")
                .bind(Uuid::new_v4())
                .bind(admin_token)
                .execute(&self.pool)
                .await?;
            tracing::info!("bootstrap administrator created");
        }

        for (ticker, name) in [(QUOTE_TICKER, "Russian rouble"), ("USD", "US dollar")] {
            sqlx::query(
                "INSERT INTO instruments (ticker, name, kind) VALUES ($1, $2, 'CURRENCY') \
                 ON CONFLICT (ticker) DO NOTHING",
            )
            .bind(ticker)
            .bind(name)
            .execute(&self.pool)
            .await?;
        }
        tracing::info!("default instruments seeded");
        Ok(())
    }
}
