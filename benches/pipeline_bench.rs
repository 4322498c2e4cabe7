use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use maude_risk::aggregation::aggregate_monthly;
use maude_risk::config::EngineConfig;
use maude_risk::core::{DeviceId, ReporterType};
use maude_risk::normalize::RawReport;
use maude_risk::pipeline::{run_pipeline, PipelineInput, PipelineOptions};
use maude_risk::testkit::{records_for, ym, MonthSpec};
use std::hint::black_box;

fn synthetic_reports(devices: usize, months: usize) -> Vec<RawReport> {
    let mut reports = Vec::new();
    for d in 0..devices {
        let name = format!("device-{d:03}");
        let start = ym(2010, 1);
        let months_iter = std::iter::successors(Some(start), |m| m.succ()).take(months);
        for (i, month) in months_iter.enumerate() {
            let spec = MonthSpec::malfunctions(5 + (i as u32 % 7))
                .deaths((i as u32 + d as u32) % 3)
                .patients(i as u32 % 4);
            for record in records_for(&name, month, spec) {
                let source = match record.reporter {
                    ReporterType::Patient => "P",
                    _ => "U",
                };
                reports.push(
                    RawReport::new()
                        .with("device", name.as_str())
                        .with("date_received", record.received.format("%Y%m%d").to_string())
                        .with("event_type", record.outcome.label())
                        .with("report_source_code", source),
                );
            }
        }
    }
    reports
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    for devices in [10, 50] {
        let reports = synthetic_reports(devices, 60);
        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, devices), &reports, |b, reports| {
                b.iter(|| {
                    let input = PipelineInput {
                        reports: reports.clone(),
                        ..PipelineInput::default()
                    };
                    let options = PipelineOptions {
                        as_of: None,
                        parallel,
                    };
                    black_box(run_pipeline(input, &EngineConfig::default(), options))
                })
            });
        }
    }
    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let device = DeviceId::new("device-000");
    let records: Vec<_> = (0..120)
        .flat_map(|i| {
            let month = std::iter::successors(Some(ym(2005, 1)), |m| m.succ())
                .nth(i)
                .unwrap_or(ym(2005, 1));
            records_for("device-000", month, MonthSpec::malfunctions(25).patients(5))
        })
        .collect();

    c.bench_function("aggregate_monthly_120_months", |b| {
        b.iter(|| black_box(aggregate_monthly(&device, black_box(&records))))
    });
}

criterion_group!(benches, bench_pipeline, bench_aggregation);
criterion_main!(benches);
