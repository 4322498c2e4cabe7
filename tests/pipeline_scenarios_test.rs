//! End-to-end scenarios: raw report JSON through to timeline correlation.

use maude_risk::config::{BaselineWindow, EngineConfig};
use maude_risk::core::{DeviceId, MilestoneKind, ReporterType, YearMonth};
use maude_risk::normalize::RawReport;
use maude_risk::pipeline::{run_pipeline, AnalysisReport, PipelineInput, PipelineOptions};
use maude_risk::scoring::{Indicator, RiskTier, TierOutcome};
use maude_risk::testkit::{date, milestone, records_for, ym, MonthSpec};
use maude_risk::timeline::SignalTiming;
use maude_risk::{assert_tier, LitigationMilestone};
use pretty_assertions::assert_eq;

/// Raw openFDA-shaped reports that normalize to the given monthly counts.
fn raw_reports(device: &str, start: YearMonth, specs: &[MonthSpec]) -> Vec<RawReport> {
    let months = std::iter::successors(Some(start), |m| m.succ());
    specs
        .iter()
        .zip(months)
        .flat_map(|(spec, month)| records_for(device, month, *spec))
        .map(|record| {
            let source = match record.reporter {
                ReporterType::Patient => "P",
                _ => "U",
            };
            RawReport::new()
                .with("device", record.device.as_str())
                .with("date_received", record.received.format("%Y%m%d").to_string())
                .with("event_type", record.outcome.label())
                .with("report_source_code", source)
        })
        .collect()
}

fn run(reports: Vec<RawReport>, milestones: Vec<LitigationMilestone>) -> AnalysisReport {
    let input = PipelineInput {
        reports,
        milestones,
        ..PipelineInput::default()
    };
    run_pipeline(input, &EngineConfig::default(), PipelineOptions::default())
}

#[test]
fn test_volume_spike_from_fifty_to_two_hundred() {
    let mut specs = vec![MonthSpec::others(50); 6];
    specs.extend(vec![MonthSpec::others(100); 5]);
    specs.push(MonthSpec::others(200));
    let report = run(raw_reports("Essure", ym(2013, 1), &specs), vec![]);

    let essure = &report.devices[0];
    let metrics = essure.metrics.as_ref().unwrap();
    assert_eq!(metrics.growth_ratio, Some(4.0));
    assert!(essure.assessment.triggered.contains(&Indicator::VolumeSpike));
}

#[test]
fn test_device_with_no_records_is_indeterminate() {
    let report = run(
        vec![],
        vec![milestone("Essure", MilestoneKind::FirstFiling, date(2016, 1, 1))],
    );
    let essure = report.device(&DeviceId::new("Essure")).unwrap();
    assert!(essure.series.is_empty());
    assert!(essure.assessment.insufficient_data);
    assert_tier!(essure.assessment, indeterminate);
    assert_eq!(essure.timeline.lead_time_days, None);
}

#[test]
fn test_reporter_mix_shift_twenty_to_eighty_percent() {
    let mut specs = vec![MonthSpec::others(10).patients(2); 6];
    specs.extend(vec![MonthSpec::others(10).patients(8); 6]);
    let report = run(raw_reports("Essure", ym(2013, 1), &specs), vec![]);

    let essure = &report.devices[0];
    let shift = essure.metrics.as_ref().unwrap().reporter_mix_shift;
    assert!((shift - 60.0).abs() < 1e-9, "shift was {shift}");
    assert_eq!(essure.assessment.triggered, vec![Indicator::ReporterMixShift]);
    assert_tier!(essure.assessment, Low);
}

#[test]
fn test_score_boundaries_high_and_critical() {
    let mut specs = vec![MonthSpec::others(10).patients(1); 6];
    specs.extend(vec![MonthSpec::malfunctions(40).deaths(2).patients(40); 6]);

    let report = run(raw_reports("Essure", ym(2013, 1), &specs), vec![]);
    assert_eq!(report.devices[0].assessment.score, 4);
    assert_tier!(report.devices[0].assessment, High);

    let recall = milestone("Essure", MilestoneKind::Recall, date(2013, 9, 15));
    let report = run(raw_reports("Essure", ym(2013, 1), &specs), vec![recall]);
    assert_eq!(report.devices[0].assessment.score, 5);
    assert_tier!(report.devices[0].assessment, Critical);
}

#[test]
fn test_lead_time_when_high_precedes_filing_by_two_months() {
    // Quiet year, then a surge from 2014-01. Deaths accumulate to 10 by 2014-05.
    let mut specs = vec![MonthSpec::others(10).patients(1); 12];
    specs.extend(vec![MonthSpec::malfunctions(40).deaths(2).patients(40); 12]);
    let reports = raw_reports("Essure", ym(2013, 1), &specs);

    let filing = date(2014, 7, 20);
    let report = run(
        reports,
        vec![milestone("Essure", MilestoneKind::FirstFiling, filing)],
    );
    let timeline = &report.devices[0].timeline;
    let flag = timeline.first_flag.as_ref().unwrap();

    assert_eq!(flag.month, ym(2014, 5));
    assert_eq!(flag.score, 4);
    assert_eq!(timeline.lead_time_days, Some((filing - flag.date).num_days()));
    assert_eq!(timeline.lead_time_days, Some(50));
    assert_eq!(timeline.timing, SignalTiming::Predictive);
    assert_eq!(report.backtest.predictive, 1);
    assert_eq!(report.backtest.mean_predictive_lead_days, Some(50.0));
}

#[test]
fn test_zero_baseline_excludes_volume_spike() {
    let mut specs = vec![MonthSpec::EMPTY; 5];
    specs.insert(0, MonthSpec::others(1));
    specs.extend(vec![MonthSpec::others(30); 6]);
    let mut config = EngineConfig::default();
    config.window.baseline = BaselineWindow::Explicit {
        start: ym(2013, 2),
        end: ym(2013, 6),
    };
    config.window.size = 5;
    let input = PipelineInput {
        reports: raw_reports("Essure", ym(2013, 1), &specs),
        ..PipelineInput::default()
    };
    let report = run_pipeline(input, &config, PipelineOptions::default());

    let assessment = &report.devices[0].assessment;
    assert_eq!(report.devices[0].metrics.as_ref().unwrap().growth_ratio, None);
    assert!(assessment.indeterminate.contains(&Indicator::VolumeSpike));
    assert!(!assessment.triggered.contains(&Indicator::VolumeSpike));
    assert_tier!(assessment, Low);
}

#[test]
fn test_malformed_dates_are_tallied_not_bucketed() {
    let mut reports = raw_reports("Essure", ym(2015, 1), &[MonthSpec::others(2); 3]);
    reports.push(
        RawReport::new()
            .with("device", "Essure")
            .with("date_received", "2015/02/01"),
    );
    reports.push(RawReport::new().with("device", "Essure"));
    reports.push(RawReport::new().with("date_received", "20150201"));

    let report = run(reports, vec![]);
    assert_eq!(report.accepted, 6);
    assert_eq!(report.rejected.malformed_date, 1);
    assert_eq!(report.rejected.missing_date, 1);
    assert_eq!(report.rejected.missing_device, 1);
    assert_eq!(report.devices[0].summary.as_ref().unwrap().total_reports, 6);
}

#[test]
fn test_distribution_counts_every_device_once() {
    let mut reports = raw_reports("Essure", ym(2013, 1), &[MonthSpec::others(3); 12]);
    reports.extend(raw_reports("IVC Filter", ym(2013, 10), &[MonthSpec::others(3); 3]));
    let report = run(reports, vec![]);

    assert_eq!(report.distribution.total, 2);
    assert_eq!(report.distribution.low, 1);
    // Three months of history cannot rule out a higher tier.
    assert_eq!(report.distribution.indeterminate, 1);
    assert_eq!(
        report.devices[1].assessment.tier,
        TierOutcome::Indeterminate
    );
    assert_eq!(report.devices[1].assessment.floor_tier, RiskTier::Low);
}
