use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected badge-token population and false-positive rate.
/// Tune these based on workforce size.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static TOKEN_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Check if a QR token might belong to a user (false positives possible).
/// A negative answer lets the scan endpoint reject garbage tokens without
/// touching the database.
pub fn might_exist(token: &str) -> bool {
    TOKEN_FILTER
        .read()
        .expect("token filter poisoned")
        .contains(&token.to_string())
}

/// Register a freshly issued token.
pub fn insert(token: &str) {
    TOKEN_FILTER
        .write()
        .expect("token filter poisoned")
        .add(&token.to_string());
}

/// Drop a revoked or regenerated token.
pub fn remove(token: &str) {
    TOKEN_FILTER
        .write()
        .expect("token filter poisoned")
        .remove(&token.to_string());
}

/// Warm up the token filter from active users using streaming + batching.
pub async fn warmup_token_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream =
        sqlx::query_as::<_, (String,)>("SELECT qr_token FROM users WHERE is_active").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (token,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(token);
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Token filter warmup complete: {} active badges", total);
    Ok(())
}

fn insert_batch(tokens: &[String]) {
    let mut filter = TOKEN_FILTER.write().expect("token filter poisoned");

    for token in tokens {
        filter.add(token);
    }
}
