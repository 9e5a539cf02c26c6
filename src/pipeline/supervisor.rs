use std::time::Duration;

use tokio::time::sleep;

use crate::{
    error, info,
    management::ProcessedSet,
    pipeline::{BatchProcessor, PassError, PassReport},
};

/// Runs passes until one completes.
///
/// A failed pass is logged, followed by the cooldown, and the pass starts over
/// from the first file. The processed-set is kept, so files finished before the
/// failure are skipped. An invalid target directory ends the run immediately,
/// and `max_restarts`, when set, caps the number of restarts.
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    cooldown: Duration,
    max_restarts: Option<u32>,
}

impl Supervisor {
    pub fn new(cooldown: Duration, max_restarts: Option<u32>) -> Self {
        Self {
            cooldown,
            max_restarts,
        }
    }

    pub async fn run(
        &self,
        batch: &BatchProcessor,
        processed: &mut ProcessedSet,
    ) -> Result<PassReport, PassError> {
        let mut report = PassReport::default();
        let mut restarts: u32 = 0;

        loop {
            let err = match batch.run_pass(processed, &mut report).await {
                Ok(()) => return Ok(report),
                Err(err) => err,
            };

            error!("Fatal error: {}", err);
            if !err.is_restartable() {
                return Err(err);
            }
            if self.max_restarts.is_some_and(|max| restarts >= max) {
                error!("Giving up after {} restarts", restarts);
                return Err(err);
            }

            restarts += 1;
            info!("Restarting in {}s...", self.cooldown.as_secs());
            if !processed.is_empty() {
                info!("{} files already done will be skipped", processed.len());
            }
            sleep(self.cooldown).await;
        }
    }
}
