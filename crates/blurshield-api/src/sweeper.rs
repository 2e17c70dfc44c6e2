//! Background task that deletes temp-directory uploads and exports
//! older than 24h, checked every 1h. Shaped after the original
//! codebase's `StaleJobDetector::run` background loop.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tokio::time::interval;
use tracing::{error, info, warn};
use uuid::Uuid;

const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);
const MAX_AGE: Duration = Duration::from_secs(24 * 3600);

/// Runs forever; spawn as a background task from `main`.
pub async fn run(temp_dir: PathBuf) {
    let mut ticker = interval(SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        if let Err(e) = sweep_once(&temp_dir).await {
            error!(error = %e, "temp directory sweep failed");
        }
    }
}

/// Matches `{uuid}` or `{uuid}_blurred`, the only two stems this service
/// ever writes into the temp directory — guards against sweeping
/// unrelated `.mp4` files left by other processes sharing the same OS
/// temp directory.
fn is_managed_stem(stem: &str) -> bool {
    let uuid_part = stem.strip_suffix("_blurred").unwrap_or(stem);
    Uuid::parse_str(uuid_part).is_ok()
}

async fn sweep_once(temp_dir: &PathBuf) -> std::io::Result<()> {
    let mut entries = tokio::fs::read_dir(temp_dir).await?;
    let mut removed = 0u32;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_mp4 = path.extension().and_then(|e| e.to_str()) == Some("mp4");
        let is_ours = is_mp4
            && path
                .file_stem()
                .and_then(|n| n.to_str())
                .is_some_and(is_managed_stem);
        if !is_ours {
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "sweep: failed to stat file, skipping");
                continue;
            }
        };
        let age = metadata
            .modified()
            .ok()
            .and_then(|m| SystemTime::now().duration_since(m).ok());
        match age {
            Some(age) if age >= MAX_AGE => {}
            _ => continue,
        }

        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "sweep: failed to remove expired file");
        } else {
            removed += 1;
        }
    }

    if removed > 0 {
        info!(removed, "temp directory sweep removed expired files");
    }
    Ok(())
}
