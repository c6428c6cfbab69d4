use anyhow::Context;
use chrono::{Datelike, NaiveDate};

// Advisory locks are session-scoped in Postgres. Used as a best-effort guard
// against two daily-news runs racing on the same run date.
const LOCK_NAMESPACE: i64 = 0x5349_474E_414C; // "SIGNAL" in hex bytes.

fn lock_key_for_date(run_date: NaiveDate) -> i64 {
    LOCK_NAMESPACE ^ (run_date.num_days_from_ce() as i64)
}

pub async fn try_acquire_daily_run_lock(
    pool: &sqlx::PgPool,
    run_date: NaiveDate,
) -> anyhow::Result<bool> {
    let key = lock_key_for_date(run_date);
    let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .persistent(false)
        .bind(key)
        .fetch_one(pool)
        .await
        .with_context(|| format!("failed to acquire advisory lock (key={key})"))?;
    Ok(acquired.0)
}

pub async fn release_daily_run_lock(pool: &sqlx::PgPool, run_date: NaiveDate) -> anyhow::Result<()> {
    let key = lock_key_for_date(run_date);
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .persistent(false)
        .bind(key)
        .execute(pool)
        .await
        .with_context(|| format!("failed to release advisory lock (key={key})"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_dates_use_distinct_keys() {
        let a = lock_key_for_date(NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
        let b = lock_key_for_date(NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn key_is_stable_for_a_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(lock_key_for_date(date), lock_key_for_date(date));
    }
}
