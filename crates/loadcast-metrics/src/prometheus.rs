//! Prometheus text exposition format.
//!
//! Renders a pipeline metrics snapshot for scraping by a Prometheus
//! server or compatible agent.

use std::fmt::Write;

use crate::collector::MetricsSnapshot;

/// Render a metrics snapshot into Prometheus text format.
pub fn render_prometheus(snap: &MetricsSnapshot) -> String {
    let mut out = String::new();

    out.push_str("# HELP loadcast_predictions_total Predictions served, by source.\n");
    out.push_str("# TYPE loadcast_predictions_total counter\n");
    let _ = writeln!(out, "loadcast_predictions_total{{source=\"model\"}} {}", snap.model_predictions);
    let _ = writeln!(out, "loadcast_predictions_total{{source=\"fallback\"}} {}", snap.fallback_predictions);

    out.push_str("# HELP loadcast_trainings_total Completed training rounds.\n");
    out.push_str("# TYPE loadcast_trainings_total counter\n");
    let _ = writeln!(out, "loadcast_trainings_total {}", snap.trainings);

    out.push_str("# HELP loadcast_training_failures_total Training rounds that failed to fit.\n");
    out.push_str("# TYPE loadcast_training_failures_total counter\n");
    let _ = writeln!(out, "loadcast_training_failures_total {}", snap.training_failures);

    out.push_str("# HELP loadcast_persistence_failures_total Trained models that could not be saved.\n");
    out.push_str("# TYPE loadcast_persistence_failures_total counter\n");
    let _ = writeln!(out, "loadcast_persistence_failures_total {}", snap.persistence_failures);

    out.push_str("# HELP loadcast_dropped_training_jobs_total Background training jobs dropped on a full queue.\n");
    out.push_str("# TYPE loadcast_dropped_training_jobs_total counter\n");
    let _ = writeln!(out, "loadcast_dropped_training_jobs_total {}", snap.dropped_training_jobs);

    out.push_str("# HELP loadcast_errors_total Failed prediction requests, by class.\n");
    out.push_str("# TYPE loadcast_errors_total counter\n");
    let _ = writeln!(out, "loadcast_errors_total{{class=\"validation\"}} {}", snap.validation_errors);
    let _ = writeln!(out, "loadcast_errors_total{{class=\"internal\"}} {}", snap.internal_errors);

    out.push_str("# HELP loadcast_model_ready Whether a loaded or trained model is available.\n");
    out.push_str("# TYPE loadcast_model_ready gauge\n");
    let _ = writeln!(out, "loadcast_model_ready {}", u8::from(snap.model_ready));

    out.push_str("# HELP loadcast_last_predicted_load Most recent predicted load.\n");
    out.push_str("# TYPE loadcast_last_predicted_load gauge\n");
    let _ = writeln!(out, "loadcast_last_predicted_load {:.4}", snap.last_predicted_load);

    out.push_str("# HELP loadcast_last_confidence Confidence of the most recent prediction.\n");
    out.push_str("# TYPE loadcast_last_confidence gauge\n");
    let _ = writeln!(out, "loadcast_last_confidence {:.4}", snap.last_confidence);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            model_predictions: 7,
            fallback_predictions: 2,
            trainings: 5,
            training_failures: 0,
            persistence_failures: 1,
            dropped_training_jobs: 0,
            validation_errors: 3,
            internal_errors: 1,
            model_ready: true,
            last_predicted_load: 42.125,
            last_confidence: 0.54,
        }
    }

    #[test]
    fn render_empty() {
        let output = render_prometheus(&MetricsSnapshot::default());
        assert!(output.contains("# TYPE loadcast_predictions_total counter"));
        assert!(output.contains("loadcast_model_ready 0"));
    }

    #[test]
    fn render_values() {
        let output = render_prometheus(&test_snapshot());
        assert!(output.contains("loadcast_predictions_total{source=\"model\"} 7"));
        assert!(output.contains("loadcast_predictions_total{source=\"fallback\"} 2"));
        assert!(output.contains("loadcast_persistence_failures_total 1"));
        assert!(output.contains("loadcast_errors_total{class=\"validation\"} 3"));
        assert!(output.contains("loadcast_model_ready 1"));
        assert!(output.contains("loadcast_last_predicted_load 42.1250"));
        assert!(output.contains("loadcast_last_confidence 0.5400"));
    }

    #[test]
    fn every_sample_line_has_name_and_value() {
        let output = render_prometheus(&test_snapshot());
        for line in output.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.rsplitn(2, ' ');
            let value = parts.next().unwrap();
            let name = parts.next().unwrap();
            assert!(name.starts_with("loadcast_"), "bad line: {line}");
            assert!(value.parse::<f64>().is_ok(), "bad value: {line}");
        }
    }
}
