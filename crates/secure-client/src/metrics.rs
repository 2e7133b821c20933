//! Client-side counters
//!
//! Emitted through the `metrics` facade; they are no-ops until the embedding
//! application installs a recorder.
//!
//! - `secure_client_requests_total` (counter): label `status` (`"error"` when no response)
//! - `secure_client_refresh_total` (counter): label `outcome`
//! - `secure_client_queued_total` (counter): requests parked behind a refresh

/// Record one dispatched request attempt.
pub fn record_request(status: Option<u16>) {
    let status = status.map_or_else(|| "error".to_string(), |s| s.to_string());
    metrics::counter!("secure_client_requests_total", "status" => status).increment(1);
}

/// Record a settled refresh cycle. Outcomes: `success`, `failure`, `missing_token`.
pub fn record_refresh(outcome: &'static str) {
    metrics::counter!("secure_client_refresh_total", "outcome" => outcome).increment(1);
}

/// Record a request queued behind an in-flight refresh.
pub fn record_queued() {
    metrics::counter!("secure_client_queued_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

    fn isolated_recorder() -> (PrometheusRecorder, PrometheusHandle) {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        (recorder, handle)
    }

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_request(Some(200));
        record_refresh("success");
        record_queued();
    }

    #[test]
    fn refresh_outcomes_are_labelled() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_refresh("success");
        record_refresh("failure");

        let output = handle.render();
        assert!(output.contains("secure_client_refresh_total"));
        assert!(output.contains("outcome=\"success\""));
        assert!(output.contains("outcome=\"failure\""));
    }

    #[test]
    fn transport_failures_use_error_status_label() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_request(None);
        record_request(Some(401));
        record_queued();

        let output = handle.render();
        assert!(output.contains("status=\"error\""));
        assert!(output.contains("status=\"401\""));
        assert!(output.contains("secure_client_queued_total"));
    }
}
