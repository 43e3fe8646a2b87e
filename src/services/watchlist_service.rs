use chrono::Utc;
use uuid::Uuid;

use crate::database::models::watchlist::WatchlistItem;
use crate::database::{DatabaseError, DatabaseManager};

const MAX_SYMBOL_LEN: usize = 10;

/// Trim and uppercase a ticker, rejecting anything that is not a plausible symbol
pub fn normalize_symbol(raw: &str) -> Result<String, DatabaseError> {
    let symbol = raw.trim().to_uppercase();

    if symbol.is_empty() {
        return Err(DatabaseError::Validation("Symbol is required".to_string()));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(DatabaseError::Validation(format!(
            "Symbol must be at most {} characters",
            MAX_SYMBOL_LEN
        )));
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') {
        return Err(DatabaseError::Validation(format!("Invalid symbol: {}", symbol)));
    }

    Ok(symbol)
}

fn normalize_company(raw: &str, symbol: &str) -> String {
    let company = raw.trim();
    if company.is_empty() {
        symbol.to_string()
    } else {
        company.to_string()
    }
}

/// Items for a user, newest first
pub async fn list(db: &DatabaseManager, user_id: &str) -> Result<Vec<WatchlistItem>, DatabaseError> {
    let pool = db.pool().await?;

    let items = sqlx::query_as::<_, WatchlistItem>(
        "SELECT id, user_id, symbol, company, added_at
         FROM watchlist_items
         WHERE user_id = $1
         ORDER BY added_at DESC",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(items)
}

pub async fn symbols_for_user(db: &DatabaseManager, user_id: &str) -> Result<Vec<String>, DatabaseError> {
    let pool = db.pool().await?;

    let symbols = sqlx::query_scalar::<_, String>(
        "SELECT symbol FROM watchlist_items WHERE user_id = $1 ORDER BY added_at DESC",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(symbols)
}

pub async fn is_in_watchlist(db: &DatabaseManager, user_id: &str, symbol: &str) -> Result<bool, DatabaseError> {
    let symbol = normalize_symbol(symbol)?;
    let pool = db.pool().await?;

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM watchlist_items WHERE user_id = $1 AND symbol = $2)",
    )
    .bind(user_id)
    .bind(&symbol)
    .fetch_one(&pool)
    .await?;

    Ok(exists)
}

/// Add a symbol; a second add of the same symbol is a conflict
pub async fn add(
    db: &DatabaseManager,
    user_id: &str,
    symbol: &str,
    company: &str,
) -> Result<WatchlistItem, DatabaseError> {
    let symbol = normalize_symbol(symbol)?;
    let company = normalize_company(company, &symbol);
    let pool = db.pool().await?;

    let inserted = sqlx::query_as::<_, WatchlistItem>(
        "INSERT INTO watchlist_items (id, user_id, symbol, company, added_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (user_id, symbol) DO NOTHING
         RETURNING id, user_id, symbol, company, added_at",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&symbol)
    .bind(&company)
    .bind(Utc::now())
    .fetch_optional(&pool)
    .await?;

    match inserted {
        Some(item) => {
            tracing::info!("Added {} to watchlist of {}", item.symbol, user_id);
            Ok(item)
        }
        None => Err(DatabaseError::Conflict(format!("{} is already in the watchlist", symbol))),
    }
}

pub async fn remove(db: &DatabaseManager, user_id: &str, symbol: &str) -> Result<String, DatabaseError> {
    let symbol = normalize_symbol(symbol)?;
    let pool = db.pool().await?;

    let result = sqlx::query("DELETE FROM watchlist_items WHERE user_id = $1 AND symbol = $2")
        .bind(user_id)
        .bind(&symbol)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("{} is not in the watchlist", symbol)));
    }

    tracing::info!("Removed {} from watchlist of {}", symbol, user_id);
    Ok(symbol)
}
