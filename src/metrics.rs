use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    init_metric_descriptions();

    handle
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "car_pricer_requests_total",
        "Total number of pricing requests by outcome"
    );
    describe_histogram!(
        "car_pricer_request_duration_seconds",
        "Pricing request duration in seconds"
    );
    describe_counter!(
        "car_pricer_field_fallbacks_total",
        "Input fields replaced by their default value"
    );
    describe_counter!(
        "car_pricer_gap_adjustments_total",
        "Predicted prices raised to keep the minimum tier gap"
    );
    describe_gauge!("car_pricer_info", "Service version information");

    gauge!("car_pricer_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a finished request
pub fn record_request(outcome: &str, duration: Duration) {
    counter!("car_pricer_requests_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("car_pricer_request_duration_seconds").record(duration.as_secs_f64());
}

/// Record a field that fell back to its default
pub fn record_fallback(field: &str) {
    counter!("car_pricer_field_fallbacks_total", "field" => field.to_string()).increment(1);
}

/// Record a price raised by gap enforcement
pub fn record_gap_adjustment(label: &str) {
    counter!("car_pricer_gap_adjustments_total", "label" => label.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_metrics() {
        init_metric_descriptions();

        record_request("success", Duration::from_millis(12));
        record_request("unrecognized", Duration::from_millis(3));
        record_fallback("trim");
        record_gap_adjustment("Retail");

        // No recorder is installed here; the calls just must not panic
    }
}
