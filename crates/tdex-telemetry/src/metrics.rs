//! Prometheus metrics for the swap router.
//!
//! Covers:
//! - Discovery results per network (providers, markets, priced markets)
//! - Absorbed failures (unreachable providers, missing prices, malformed elements)
//! - Negotiation outcomes per stage
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means
//! duplicate metric names, which is a build defect and aborts on first use.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_gauge_vec, register_histogram_vec, Counter,
    CounterVec, Encoder, GaugeVec, HistogramVec, TextEncoder,
};

/// Providers resolved from the registry in the last discovery.
pub static PROVIDERS_DISCOVERED: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "tdex_providers_discovered",
        "Providers resolved from the registry in the last discovery",
        &["network"]
    )
    .unwrap()
});

/// Markets aggregated in the last discovery.
pub static MARKETS_DISCOVERED: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "tdex_markets_discovered",
        "Markets aggregated across providers in the last discovery",
        &["network"]
    )
    .unwrap()
});

/// Markets that received a price snapshot in the last discovery.
pub static MARKETS_PRICED: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "tdex_markets_priced",
        "Markets with a valid price snapshot in the last discovery",
        &["network"]
    )
    .unwrap()
});

/// Provider market fetches that failed and contributed zero markets.
pub static PROVIDER_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tdex_provider_failures_total",
        "Provider market fetches that failed",
        &["provider"]
    )
    .unwrap()
});

/// Price fetches that returned nothing usable.
pub static PRICE_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tdex_price_failures_total",
        "Market price fetches without a valid price",
        &["provider"]
    )
    .unwrap()
});

/// Response elements dropped by shape validation.
pub static MALFORMED_DROPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tdex_malformed_dropped_total",
        "Provider response elements dropped by shape validation",
        &["kind"]
    )
    .unwrap()
});

/// Discovery results discarded because a newer discovery superseded them.
pub static DISCOVERY_STALE_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "tdex_discovery_stale_total",
        "Discovery results discarded as stale"
    )
    .unwrap()
});

/// Wall time of a full discovery cycle.
pub static DISCOVERY_DURATION_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tdex_discovery_duration_ms",
        "Discovery cycle duration in milliseconds",
        &["network"],
        vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0]
    )
    .unwrap()
});

/// Negotiation step outcomes.
/// Labels: stage (preview/propose/complete), result (ok/failed/error)
pub static NEGOTIATION_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tdex_negotiation_total",
        "Negotiation step outcomes",
        &["stage", "result"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record the outcome of a discovery cycle.
    pub fn discovery_completed(network: &str, providers: usize, markets: usize, priced: usize) {
        PROVIDERS_DISCOVERED
            .with_label_values(&[network])
            .set(providers as f64);
        MARKETS_DISCOVERED
            .with_label_values(&[network])
            .set(markets as f64);
        MARKETS_PRICED
            .with_label_values(&[network])
            .set(priced as f64);
    }

    /// Record discovery duration.
    pub fn discovery_duration(network: &str, duration_ms: f64) {
        DISCOVERY_DURATION_MS
            .with_label_values(&[network])
            .observe(duration_ms);
    }

    /// Record a discarded stale discovery.
    pub fn discovery_stale() {
        DISCOVERY_STALE_TOTAL.inc();
    }

    /// Record a failed provider market fetch.
    pub fn provider_failed(provider: &str) {
        PROVIDER_FAILURES_TOTAL
            .with_label_values(&[provider])
            .inc();
    }

    /// Record a market left without a price.
    pub fn price_missing(provider: &str) {
        PRICE_FAILURES_TOTAL.with_label_values(&[provider]).inc();
    }

    /// Record a dropped malformed element.
    pub fn malformed_dropped(kind: &str) {
        MALFORMED_DROPPED_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a negotiation step outcome.
    pub fn negotiation(stage: &str, result: &str) {
        NEGOTIATION_TOTAL.with_label_values(&[stage, result]).inc();
    }

    /// Render the default registry in Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_records() {
        Metrics::discovery_completed("testnet", 2, 5, 4);
        assert_eq!(
            MARKETS_DISCOVERED.with_label_values(&["testnet"]).get(),
            5.0
        );

        let before = NEGOTIATION_TOTAL
            .with_label_values(&["preview", "ok"])
            .get();
        Metrics::negotiation("preview", "ok");
        assert_eq!(
            NEGOTIATION_TOTAL.with_label_values(&["preview", "ok"]).get(),
            before + 1.0
        );
    }

    #[test]
    fn test_registered_in_default_registry() {
        Metrics::malformed_dropped("market");
        let names: Vec<String> = prometheus::gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "tdex_malformed_dropped_total"));
    }

    #[test]
    fn test_render_text_format() {
        Metrics::discovery_stale();
        let text = Metrics::render().unwrap();
        assert!(text.contains("tdex_discovery_stale_total"));
    }
}
