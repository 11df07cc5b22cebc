//! Reachability probe for the site under test

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Poll `url` until it answers with a success status or `timeout_duration` passes
pub async fn wait_for_reachable(url: &str, timeout_duration: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let start = std::time::Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Target reachable at {}", url);
                return Ok(());
            }
            Ok(resp) => {
                warn!("Probe of {} returned {}", url, resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} ...", url);
                }
                if !e.is_connect() {
                    warn!("Probe error: {}", e);
                }
            }
        }

        if start.elapsed() >= timeout_duration {
            break;
        }
        sleep(Duration::from_millis(500)).await;
    }

    Err(E2eError::TargetUnreachable {
        url: url.to_string(),
        attempts,
    })
}
