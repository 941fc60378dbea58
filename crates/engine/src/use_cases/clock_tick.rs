//! Periodic clock driver.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::matchmaking::Matchmaker;

/// Spawn the task that ticks every live session once per `period`.
///
/// Missed ticks are delayed rather than bursted: elapsed time is measured
/// from the session's anchor, so a late tick charges the full interval anyway.
pub fn spawn_clock_driver(matchmaker: Arc<Matchmaker>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(period_ms = period.as_millis() as u64, "Clock driver started");

        loop {
            interval.tick().await;
            matchmaker.tick_all().await;
        }
    })
}
