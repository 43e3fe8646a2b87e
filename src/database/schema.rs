use sqlx::PgPool;

const CREATE_WATCHLIST_ITEMS: &str = r#"
    CREATE TABLE IF NOT EXISTS watchlist_items (
        id UUID PRIMARY KEY,
        user_id TEXT NOT NULL,
        symbol TEXT NOT NULL,
        company TEXT NOT NULL,
        added_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (user_id, symbol)
    )
"#;

/// Idempotent; runs once per pool creation
pub async fn bootstrap(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_WATCHLIST_ITEMS).execute(pool).await?;
    Ok(())
}
