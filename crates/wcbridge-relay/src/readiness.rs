//! Tab readiness: the flag that gates forwarding, and the wait on it.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use wcbridge_common::{CommandEnvelope, RelayError};

use crate::context::RelayContext;

/// Floor for the ping period; `interval` rejects a zero period.
const MIN_PING_INTERVAL: Duration = Duration::from_millis(1);

impl RelayContext {
    pub fn is_tab_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub(crate) fn set_tab_ready(&self, ready: bool) {
        let changed = self.ready.send_if_modified(|current| {
            if *current == ready {
                return false;
            }
            *current = ready;
            true
        });
        if changed {
            tracing::info!(relay = %self.id, ready, "Tab readiness changed");
        }
    }

    /// Broadcast a connection-check so a live tab re-announces itself.
    pub(crate) fn ping_tab(&self) {
        if let Err(e) = self.channel.post_json(&CommandEnvelope::ping(self.id.clone())) {
            tracing::debug!(relay = %self.id, error = %e, "Ping not sent");
        }
    }

    /// Suspend until the tab reports ready.
    ///
    /// Pings immediately and then every `ping_interval` while waiting. Gives
    /// up after `ready_timeout`, or as soon as the relay shuts down.
    pub async fn wait_until_ready(&self) -> Result<(), RelayError> {
        let mut rx = self.ready.subscribe();
        if *rx.borrow_and_update() {
            return Ok(());
        }

        let mut ticker = tokio::time::interval(self.settings.ping_interval.max(MIN_PING_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = tokio::time::sleep(self.settings.ready_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(RelayError::Cancelled),
                _ = &mut deadline => {
                    return Err(RelayError::ReadyTimeout(self.settings.ready_timeout));
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Err(RelayError::ChannelClosed);
                    }
                    if *rx.borrow_and_update() {
                        return Ok(());
                    }
                }
                _ = ticker.tick() => self.ping_tab(),
            }
        }
    }
}
