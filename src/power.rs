//! Operating-system power notifications.
//!
//! The native shell owns the OS subscription and forwards events through
//! the host channel (`power-resume`, `power-unlock`). Inside the process
//! they fan out over a broadcast channel.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A power or session notification from the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerEvent {
    /// System resumed from sleep.
    Resume,
    /// User session unlocked.
    Unlock,
}

/// Broadcast hub for [`PowerEvent`]s.
#[derive(Debug, Clone)]
pub struct PowerMonitor {
    tx: broadcast::Sender<PowerEvent>,
}

impl PowerMonitor {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Deliver an event to every subscriber. Returns the subscriber count.
    pub fn publish(&self, event: PowerEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PowerEvent> {
        self.tx.subscribe()
    }
}

impl Default for PowerMonitor {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_noop() {
        let monitor = PowerMonitor::default();
        assert_eq!(monitor.publish(PowerEvent::Resume), 0);
    }

    #[test]
    fn subscribers_receive_events() {
        let monitor = PowerMonitor::default();
        let mut rx = monitor.subscribe();
        assert_eq!(monitor.publish(PowerEvent::Unlock), 1);
        assert_eq!(rx.try_recv().ok(), Some(PowerEvent::Unlock));
    }
}
