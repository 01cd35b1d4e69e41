//! Cumulative run metrics (spec.md §4.12).
//!
//! `total_bundles_stored_cumulative` accumulates every tick from each
//! routing protocol's `RoutingState::num_stored_bundles`; the other two
//! counts are read once at finalization from the agents themselves (a
//! client's or flat-topology agent's handshake/ground handler already
//! tracks `received_payloads` and `num_drops_picked_up`).

#[derive(Clone, Debug, Default)]
pub struct Metrics {
    pub total_bundles_stored_cumulative: u64,
    pub num_drops_picked_up: u64,
    pub delivered_latencies: Vec<u64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add this tick's sum of `num_stored_bundles` across every routing
    /// protocol instance.
    pub fn record_tick(&mut self, stored_bundles_this_tick: usize) {
        self.total_bundles_stored_cumulative += stored_bundles_this_tick as u64;
    }

    pub fn record_drop_picked_up(&mut self) {
        self.num_drops_picked_up += 1;
    }

    pub fn record_delivery(&mut self, latency: u64) {
        self.delivered_latencies.push(latency);
    }

    /// `Σ(recv_latencies) / #delivered`; `None` if nothing was delivered.
    pub fn avg_payload_delivery_latency(&self) -> Option<f64> {
        if self.delivered_latencies.is_empty() {
            return None;
        }
        let sum: u64 = self.delivered_latencies.iter().sum();
        Some(sum as f64 / self.delivered_latencies.len() as f64)
    }

    /// `#received_at_any_client / #drops_picked_up_from_ground`; `None` if
    /// nothing was ever picked up.
    pub fn delivery_success_rate(&self) -> Option<f64> {
        if self.num_drops_picked_up == 0 {
            return None;
        }
        Some(self.delivered_latencies.len() as f64 / self.num_drops_picked_up as f64)
    }

    pub fn avg_bundle_storage_overhead(&self, max_steps: u64) -> f64 {
        if max_steps == 0 {
            return 0.0;
        }
        self.total_bundles_stored_cumulative as f64 / max_steps as f64
    }

    /// Summary used by both single-trial reporting and batch aggregation.
    pub fn summary(&self, max_steps: u64) -> Summary {
        Summary {
            avg_payload_delivery_latency: self.avg_payload_delivery_latency(),
            delivery_success_rate: self.delivery_success_rate(),
            avg_bundle_storage_overhead: self.avg_bundle_storage_overhead(max_steps),
        }
    }
}

/// A finalized, run-independent metrics summary — what `dtn-output` writes
/// to the metrics text file and what batch mode averages across trials.
#[derive(Clone, Copy, Debug, Default)]
pub struct Summary {
    pub avg_payload_delivery_latency: Option<f64>,
    pub delivery_success_rate: Option<f64>,
    pub avg_bundle_storage_overhead: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_when_nothing_delivered_or_picked_up() {
        let m = Metrics::new();
        assert_eq!(m.avg_payload_delivery_latency(), None);
        assert_eq!(m.delivery_success_rate(), None);
    }

    #[test]
    fn aggregates_latency_and_success_rate() {
        let mut m = Metrics::new();
        m.record_drop_picked_up();
        m.record_drop_picked_up();
        m.record_delivery(4);
        m.record_delivery(6);
        assert_eq!(m.avg_payload_delivery_latency(), Some(5.0));
        assert_eq!(m.delivery_success_rate(), Some(1.0));
    }

    #[test]
    fn storage_overhead_divides_by_max_steps() {
        let mut m = Metrics::new();
        m.record_tick(10);
        m.record_tick(20);
        assert_eq!(m.avg_bundle_storage_overhead(10), 3.0);
    }
}
