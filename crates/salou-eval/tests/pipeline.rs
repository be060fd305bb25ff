//! End-to-end backtest runs over in-memory providers.

use approx::assert_relative_eq;
use salou_data::{MemoryFundamentals, MemoryPriceProvider, MemorySink};
use salou_eval::{BacktestConfig, ExclusionReason, PairState, QualityBacktest};
use salou_traits::{Date, FundamentalRecord, QualityMetric, ReportKind, SalouError};

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd_opt(y, m, d).unwrap()
}

fn record(id: &str, report: Date, kind: ReportKind, net_income: f64) -> FundamentalRecord {
    FundamentalRecord {
        security_id: id.to_string(),
        period_end_date: report,
        report_kind: kind,
        revenue: 100.0,
        operating_income: net_income * 2.0,
        net_income,
        total_equity: 1000.0 - net_income * 10.0,
        total_assets: 2000.0,
    }
}

/// Six filers in Q1, three in H1, plus one filing with a mismatched kind.
fn fundamentals() -> MemoryFundamentals {
    let q1 = date(2023, 3, 31);
    let h1 = date(2023, 6, 30);
    let mut records: Vec<FundamentalRecord> = ["A", "B", "C", "D", "E", "F"]
        .iter()
        .enumerate()
        .map(|(i, id)| record(id, q1, ReportKind::Q1, (i + 1) as f64))
        .collect();
    records.extend(["A", "B", "C"].iter().map(|id| record(id, h1, ReportKind::H1, 1.0)));
    records.push(record("Z", q1, ReportKind::Annual, 50.0));
    MemoryFundamentals::new(records)
}

fn series(values: &[f64]) -> Vec<(Date, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (date(2023, 4, 3 + i as u32), v))
        .collect()
}

fn prices() -> MemoryPriceProvider {
    MemoryPriceProvider::new()
        .with_returns("A", series(&[0.01, 0.03]))
        .with_returns("B", series(&[0.02, 0.00]))
        .with_returns("C", series(&[0.01, -0.01, 0.03]))
        .with_returns("D", series(&[-0.02, 0.01]))
        .with_failure("E", "upstream unavailable")
}

fn config() -> BacktestConfig {
    BacktestConfig {
        metrics: vec![QualityMetric::NetMargin, QualityMetric::ReturnOnEquity],
        concurrency: 3,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_quarterly_run() {
    let backtest = QualityBacktest::new(config(), prices()).unwrap();
    let mut sink = MemorySink::new();
    let report = backtest.run(&fundamentals(), &mut sink).await.unwrap();

    // two dates x two metrics, June has too few filers
    assert_eq!(report.pairs.len(), 4);
    assert_eq!(report.discarded_records, 1);
    assert_eq!(report.skipped_pairs(), 2);
    assert_eq!(report.completed_pairs(), 2);
    assert!(
        report
            .pairs
            .iter()
            .filter(|p| p.report_date() == date(2023, 6, 30))
            .all(|p| p.state == PairState::Skipped)
    );

    // E failed and F had no series, in both March pairs
    assert_eq!(report.excluded_securities(), 4);
    let march = &report.pairs[0];
    assert_eq!(march.metric, QualityMetric::NetMargin);
    assert_eq!(march.window.buy_date, date(2023, 4, 1));
    assert_eq!(march.window.sell_date, date(2023, 6, 30));
    assert_eq!(march.population, 6);
    let reasons: Vec<(&str, &ExclusionReason)> = march
        .exclusions
        .iter()
        .map(|e| (e.security_id.as_str(), &e.reason))
        .collect();
    assert_eq!(reasons.len(), 2);
    assert_eq!(reasons[0].0, "E");
    assert!(matches!(reasons[0].1, ExclusionReason::LookupFailed(_)));
    assert_eq!(reasons[1], ("F", &ExclusionReason::EmptySeries));

    // labels by rank: A,B -> 1, C -> 2, D -> 3, E -> 4, F -> 5
    let groups = &march.groups;
    assert_eq!(groups.len(), 5);
    let std_ab = (0.02_f64 * 0.02 / 2.0).sqrt();
    assert_relative_eq!(
        groups[0].mean_score.unwrap(),
        (0.04 / std_ab + 0.02 / std_ab) / 2.0,
        epsilon = 1e-9
    );
    assert_eq!(groups[0].contributors, 2);
    assert_eq!(groups[3].mean_score, None);
    assert_eq!(groups[4].mean_score, None);
    assert_eq!(march.spread(), None);
}

#[tokio::test]
async fn test_sink_receives_every_grouped_security() {
    let backtest = QualityBacktest::new(config(), prices()).unwrap();
    let mut sink = MemorySink::new();
    backtest.run(&fundamentals(), &mut sink).await.unwrap();

    assert_eq!(sink.tables().len(), 2);
    let rows = sink
        .rows(date(2023, 3, 31), QualityMetric::ReturnOnEquity)
        .unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.security_id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C", "D", "E", "F"]);

    let e = &rows[4];
    assert!(e.cumulative_return.is_none());
    assert!(e.score.is_none());
    let a = &rows[0];
    assert_relative_eq!(a.cumulative_return.unwrap(), 0.04, epsilon = 1e-12);
}

#[tokio::test]
async fn test_date_range_limits_schedule() {
    let cfg = BacktestConfig {
        start: Some(date(2023, 4, 1)),
        ..config()
    };
    let backtest = QualityBacktest::new(cfg, prices()).unwrap();
    let mut sink = MemorySink::new();
    let report = backtest.run(&fundamentals(), &mut sink).await.unwrap();

    assert_eq!(report.pairs.len(), 2);
    assert_eq!(report.skipped_pairs(), 2);
    assert!(sink.tables().is_empty());
}

#[tokio::test]
async fn test_sink_failure_is_fatal() {
    let backtest = QualityBacktest::new(config(), prices()).unwrap();
    let mut sink = MemorySink::failing("read-only file system");
    let err = backtest.run(&fundamentals(), &mut sink).await.unwrap_err();
    assert!(matches!(err, SalouError::Sink(_)));
}

#[tokio::test]
async fn test_overview_per_metric() {
    let backtest = QualityBacktest::new(config(), prices()).unwrap();
    let mut sink = MemorySink::new();
    let report = backtest.run(&fundamentals(), &mut sink).await.unwrap();

    let overview = report.metric_overview();
    let metrics: Vec<QualityMetric> = overview.iter().map(|o| o.metric).collect();
    assert_eq!(
        metrics,
        vec![QualityMetric::NetMargin, QualityMetric::ReturnOnEquity]
    );
    assert!(overview.iter().all(|o| o.pairs == 1));
    assert!(overview.iter().all(|o| o.group_means.len() == 5));
}
