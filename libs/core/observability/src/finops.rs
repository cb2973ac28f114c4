//! FinOps engine metrics: job outcomes, collector health, and the
//! recommendation/savings gauges the scheduled pipeline reports on every
//! tick.

use metrics::{counter, gauge, histogram};

/// FinOps metrics recorder
pub struct FinopsMetrics;

impl FinopsMetrics {
    /// Record a completed job run, successful or failed.
    pub fn record_job_run(status: &str, duration_secs: f64) {
        counter!("finops_job_runs_total", "status" => status.to_string()).increment(1);
        histogram!("finops_job_duration_seconds").record(duration_secs);
    }

    /// Record one collector batch's wall-clock duration.
    pub fn record_collector_batch_duration(duration_secs: f64) {
        histogram!("finops_collector_batch_duration_seconds").record(duration_secs);
    }

    /// Record a single collector's failure.
    pub fn record_collector_error(service: &str) {
        counter!("finops_collector_errors_total", "service" => service.to_string()).increment(1);
    }

    /// Set the current open-recommendation count for one (type, status) pair.
    pub fn set_recommendations_total(recommendation_type: &str, status: &str, count: usize) {
        gauge!(
            "finops_recommendations_total",
            "type" => recommendation_type.to_string(),
            "status" => status.to_string()
        )
        .set(count as f64);
    }

    /// Set the estimated monthly savings total across open recommendations.
    pub fn set_estimated_monthly_savings(amount_usd: f64) {
        gauge!("finops_estimated_monthly_savings_usd").set(amount_usd);
    }

    /// Set the current inventory count for one service.
    pub fn set_resources_total(service: &str, count: usize) {
        gauge!("finops_resources_total", "service" => service.to_string()).set(count as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_metrics_does_not_panic_without_an_installed_recorder() {
        FinopsMetrics::record_job_run("completed", 1.5);
        FinopsMetrics::record_collector_batch_duration(0.2);
        FinopsMetrics::record_collector_error("EC2");
        FinopsMetrics::set_recommendations_total("EC2_DOWN_SIZE", "new", 3);
        FinopsMetrics::set_estimated_monthly_savings(123.45);
        FinopsMetrics::set_resources_total("EC2", 4);
    }
}
