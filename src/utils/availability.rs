//! Fast username-availability checks for registration.
//!
//! Layered lookup: a cuckoo filter answers definite negatives in memory, a
//! moka cache answers known-taken names, and the database is the fallback.
//! Both layers are warmed from the users table on startup.

use std::sync::RwLock;
use std::time::Duration;

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;

/// Tune these based on real user counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static USERNAME_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Value is always `true`: only taken names are stored.
static TAKEN_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86_400))
        .build()
});

#[inline]
fn normalize(username: &str) -> String {
    username.to_lowercase()
}

/// Record a username as taken in both layers.
pub async fn mark_taken(username: &str) {
    let username = normalize(username);
    USERNAME_FILTER
        .write()
        .expect("username filter poisoned")
        .add(&username);
    TAKEN_CACHE.insert(username, true).await;
}

/// true => username AVAILABLE, false => TAKEN.
pub async fn is_username_available(username: &str, pool: &MySqlPool) -> bool {
    let username = normalize(username);

    // Definite negative from the filter: the name was never inserted.
    {
        let filter = USERNAME_FILTER.read().expect("username filter poisoned");
        if !filter.contains(&username) {
            return true;
        }
    }

    // Filter positives can be false; the cache only holds confirmed names.
    if TAKEN_CACHE.get(&username).await.unwrap_or(false) {
        return false;
    }

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
    )
    .bind(&username)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe: treat lookup errors as taken

    !exists
}

/// Stream every username into the filter, and the recently-active ones into
/// the cache, in batches.
pub async fn warmup(pool: &MySqlPool, recent_days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, bool)>(
        r#"
        SELECT username,
               COALESCE(last_login_at >= NOW() - INTERVAL ? DAY, FALSE) AS recent
        FROM users
        "#,
    )
    .bind(recent_days)
    .fetch(pool);

    let mut batch: Vec<(String, bool)> = Vec::with_capacity(batch_size);
    let mut total = 0usize;
    let mut recent_total = 0usize;

    while let Some(row) = stream.next().await {
        let (username, recent) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;
        batch.push((normalize(&username), recent));
        total += 1;
        if recent {
            recent_total += 1;
        }

        if batch.len() >= batch_size {
            flush_batch(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        flush_batch(&batch).await;
    }

    log::info!(
        "Username availability warmup complete: {} users, {} recent (last {} days)",
        total,
        recent_total,
        recent_days
    );
    Ok(())
}

async fn flush_batch(batch: &[(String, bool)]) {
    {
        let mut filter = USERNAME_FILTER.write().expect("username filter poisoned");
        for (username, _) in batch {
            filter.add(username);
        }
    }

    let inserts: Vec<_> = batch
        .iter()
        .filter(|(_, recent)| *recent)
        .map(|(username, _)| TAKEN_CACHE.insert(username.clone(), true))
        .collect();
    futures::future::join_all(inserts).await;
}
