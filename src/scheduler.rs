//! Cooperative execution of the key schedule.
//!
//! The `2^cost` loop runs in slices of a fixed number of rounds. Between
//! slices the task yields to the tokio scheduler, so a single-threaded
//! runtime keeps serving other tasks while a hash is being computed.
//! Suspension happens only on slice boundaries, never inside a round.

use tokio::task;
use tracing::trace;

use crate::crypto::{self, CipherState, KeySchedule};
use crate::error::Result;
use crate::format::{HashRecord, Salt};

/// Builds the cipher state, reporting the completed fraction after every
/// slice. Fractions strictly increase and the last one is `1.0`.
pub async fn build_state<F>(
    password: &[u8],
    salt: &Salt,
    rounds_per_slice: u32,
    mut on_progress: F,
) -> CipherState
where
    F: FnMut(f64),
{
    let mut schedule = KeySchedule::new(password, salt.bytes(), salt.cost());
    let slice = u64::from(rounds_per_slice.max(1));

    loop {
        schedule.advance(slice);
        trace!(
            completed = schedule.completed(),
            total = schedule.total(),
            "key schedule slice done"
        );
        on_progress(schedule.progress());

        if schedule.is_complete() {
            break;
        }
        task::yield_now().await;
    }

    schedule.finish()
}

pub async fn hash<F>(
    password: &[u8],
    salt: &Salt,
    rounds_per_slice: u32,
    on_progress: F,
) -> HashRecord
where
    F: FnMut(f64),
{
    let state = build_state(password, salt, rounds_per_slice, on_progress).await;
    HashRecord::new(salt.clone(), crypto::compute_digest(&state))
}

pub async fn verify<F>(
    password: &[u8],
    hash_text: &str,
    rounds_per_slice: u32,
    on_progress: F,
) -> Result<bool>
where
    F: FnMut(f64),
{
    let stored: HashRecord = hash_text.parse()?;
    let computed = hash(password, stored.salt(), rounds_per_slice, on_progress).await;
    Ok(crypto::bcrypt::matches(&stored, &computed))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn salt(text: &str) -> Salt {
        text.parse().unwrap()
    }

    #[tokio::test]
    async fn matches_blocking_hash() {
        let salt = salt("$2a$04$......................");
        let record = hash(b"password", &salt, 3, |_| {}).await;
        assert_eq!(record, crypto::hash(b"password", &salt));
    }

    #[tokio::test]
    async fn progress_increases_to_one() {
        let salt = salt("$2a$05$CCCCCCCCCCCCCCCCCCCCC.");
        let mut seen = Vec::new();
        hash(b"U*U", &salt, 4, |f| seen.push(f)).await;

        assert_eq!(seen.len(), 8);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(seen[0] > 0.0);
        assert_eq!(*seen.last().unwrap(), 1.0);
    }

    #[tokio::test]
    async fn yields_between_slices() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = Arc::clone(&ticks);
            tokio::spawn(async move {
                loop {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    task::yield_now().await;
                }
            })
        };

        let salt = salt("$2a$04$......................");
        let mut observed = Vec::new();
        hash(b"password", &salt, 2, |_| observed.push(ticks.load(Ordering::SeqCst))).await;
        ticker.abort();

        // current-thread runtime: the ticker only runs while we are suspended
        assert_eq!(observed.len(), 8);
        assert!(observed.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn verify_reports_parse_errors() {
        assert!(verify(b"pw", "$2a$04$short", 8, |_| {}).await.is_err());
        assert!(
            verify(
                b"U*U",
                "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW",
                8,
                |_| {}
            )
            .await
            .unwrap()
        );
    }
}
