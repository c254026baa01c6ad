//! Bounded perceptual hashing off the async runtime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, warn};

use galleria_core::{Error, PerceptualHasher, Result};

/// Hash `data` on a blocking thread, giving up after `timeout`.
pub async fn fingerprint(
    hasher: Arc<dyn PerceptualHasher>,
    data: Bytes,
    timeout: Duration,
) -> Result<String> {
    let start = Instant::now();
    let task = tokio::task::spawn_blocking(move || hasher.hash(&data));

    let phash = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_err)) => {
            return Err(Error::Hashing(format!("Hash task failed: {}", join_err)));
        }
        Err(_) => {
            return Err(Error::Timeout(format!(
                "Perceptual hash exceeded {} ms",
                timeout.as_millis()
            )));
        }
    };

    debug!(
        subsystem = "hash",
        op = "fingerprint",
        phash = %phash,
        duration_ms = start.elapsed().as_millis() as u64,
        "Fingerprint computed"
    );
    Ok(phash)
}

/// Like [`fingerprint`], but logs and swallows failures.
pub async fn fingerprint_or_none(
    hasher: Arc<dyn PerceptualHasher>,
    data: Bytes,
    timeout: Duration,
    owner_id: &str,
) -> Option<String> {
    match fingerprint(hasher, data, timeout).await {
        Ok(phash) => Some(phash),
        Err(e) => {
            warn!(
                subsystem = "hash",
                op = "fingerprint",
                owner_id = %owner_id,
                error = %e,
                "Perceptual hash failed, continuing without duplicate check"
            );
            None
        }
    }
}
