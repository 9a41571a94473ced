use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// Resolved badge identity, enough to answer a scan without a user lookup.
#[derive(Debug, Clone)]
pub struct BadgeOwner {
    pub user_id: u64,
    pub full_name: String,
}

/// token -> owner for active badges. Entries are invalidated when a token is
/// regenerated; otherwise the TTL bounds staleness.
pub static TOKEN_CACHE: Lazy<Cache<String, BadgeOwner>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub async fn remember(token: &str, owner: BadgeOwner) {
    TOKEN_CACHE.insert(token.to_string(), owner).await;
}

pub async fn lookup(token: &str) -> Option<BadgeOwner> {
    TOKEN_CACHE.get(token).await
}

pub async fn forget(token: &str) {
    TOKEN_CACHE.invalidate(token).await;
}

/// Batch-remember owners during warmup.
async fn batch_remember(entries: &[(String, BadgeOwner)]) {
    let futures: Vec<_> = entries
        .iter()
        .map(|(token, owner)| TOKEN_CACHE.insert(token.clone(), owner.clone()))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load active badge tokens into the in-memory cache (batched).
pub async fn warmup_token_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, u64, String)>(
        r#"
        SELECT qr_token, id, full_name
        FROM users
        WHERE is_active
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (token, user_id, full_name) = row?;
        batch.push((token, BadgeOwner { user_id, full_name }));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_remember(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_remember(&batch).await;
    }

    log::info!("Token cache warmup complete: {} active badges", total_count);

    Ok(())
}
