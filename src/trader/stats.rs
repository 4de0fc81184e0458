//! Session counters for the trader.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Running totals for one trading session.
#[derive(Debug, Clone, Serialize)]
pub struct TraderStats {
    pub started_at: DateTime<Utc>,
    pub events: u64,
    pub book_updates: u64,
    pub orders_inserted: u64,
    pub cancels_sent: u64,
    pub hedges_sent: u64,
    pub fills: u64,
    pub hedge_fills: u64,
    pub errors: u64,
}

impl TraderStats {
    /// Uptime in whole seconds.
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// One-line JSON summary for the log.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Default for TraderStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            events: 0,
            book_updates: 0,
            orders_inserted: 0,
            cancels_sent: 0,
            hedges_sent: 0,
            fills: 0,
            hedge_fills: 0,
            errors: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_contains_counters() {
        let stats = TraderStats {
            orders_inserted: 3,
            ..TraderStats::default()
        };
        let json = stats.to_json();
        assert!(json.contains(r#""orders_inserted":3"#));
        assert!(stats.uptime_secs() >= 0);
    }
}
