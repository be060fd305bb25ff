//! Metric registry for discovering the available quality metrics.

use salou_traits::QualityMetric;
use serde::Serialize;

/// Metadata about a quality metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricInfo {
    /// Metric identifier
    pub metric: QualityMetric,

    /// Numerator line item
    pub numerator: &'static str,

    /// Denominator line item
    pub denominator: &'static str,

    /// Human-readable description
    pub description: &'static str,
}

/// Get information about all available quality metrics.
#[must_use]
pub fn available_metrics() -> Vec<MetricInfo> {
    vec![
        MetricInfo {
            metric: QualityMetric::NetMargin,
            numerator: "net_income",
            denominator: "revenue",
            description: "Share of revenue kept as net income",
        },
        MetricInfo {
            metric: QualityMetric::OperatingMargin,
            numerator: "operating_income",
            denominator: "revenue",
            description: "Share of revenue kept as operating income",
        },
        MetricInfo {
            metric: QualityMetric::ReturnOnEquity,
            numerator: "net_income",
            denominator: "total_equity",
            description: "Net income relative to period-end equity",
        },
        MetricInfo {
            metric: QualityMetric::ReturnOnAssets,
            numerator: "net_income",
            denominator: "total_assets",
            description: "Net income relative to period-end total assets",
        },
    ]
}

/// Look up metadata for one metric.
#[must_use]
pub fn metric_info(metric: QualityMetric) -> Option<MetricInfo> {
    available_metrics().into_iter().find(|m| m.metric == metric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_metric_registered() {
        let metrics = available_metrics();
        assert_eq!(metrics.len(), QualityMetric::ALL.len());
        for metric in QualityMetric::ALL {
            assert!(metric_info(metric).is_some(), "{metric} missing");
        }
    }

    #[test]
    fn test_metric_info_lines() {
        let info = metric_info(QualityMetric::ReturnOnAssets).unwrap();
        assert_eq!(info.numerator, "net_income");
        assert_eq!(info.denominator, "total_assets");
    }
}
