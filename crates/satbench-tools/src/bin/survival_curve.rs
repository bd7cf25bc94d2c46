use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use satbench_core::{
    build_curves, check_table, Category, CategoryPartition, Instance, SurvivalCurve,
    SurvivalOptions, ThresholdComparison, ThresholdGrid,
};
use satbench_tools::common::csv::csv_writer;
use satbench_tools::common::io::open_writer;
use satbench_tools::config::{init_logger, AnalysisArgs};
use satbench_tools::report::{print_warning_summary, Report};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "結果表から、閾値時間以内に解けたインスタンス割合（生存曲線）の系列を出力する"
)]
struct Cli {
    /// 結果表（`-` で標準入力、.gz 可）
    datafile: PathBuf,

    /// 閾値の最大値（秒）
    #[arg(long)]
    threshold: f64,

    /// 閾値の分割数（グリッドは 0 から threshold/steps 刻みで steps+2 点、最大 1000000）
    #[arg(long)]
    steps: usize,

    /// 割合ではなく件数を出す
    #[arg(long)]
    raw_counts: bool,

    /// time < threshold で数える（既定は time <= threshold）
    #[arg(long)]
    exclusive: bool,

    /// 出力するカテゴリ（sat, unsat, both）
    #[arg(long, value_delimiter = ',', default_value = "sat,unsat,both")]
    categories: Vec<Category>,

    /// both の母数から INCONSISTENT / ERROR のインスタンスを除く
    #[arg(long)]
    exclude_unclassified: bool,

    /// 出力先（`-` で標準出力、.gz 可）
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// CSV ではなく JSON レポートを出す
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    analysis: AnalysisArgs,
}

#[derive(Serialize)]
struct SurvivalBody<'a> {
    thresholds: &'a [f64],
    comparison: ThresholdComparison,
    normalized: bool,
    family: Option<&'a str>,
    curves: &'a [SurvivalCurve],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.analysis.verbose);

    let analysis = cli.analysis.resolve()?;
    let grid =
        ThresholdGrid::new(cli.threshold, cli.steps).context("invalid --threshold/--steps")?;
    let table = analysis.load_table(&cli.datafile)?;
    let mut warnings = table.warnings.clone();
    warnings.extend(check_table(&table).into_iter().inspect(|w| log::warn!("{w}")));

    let selected: Vec<&Instance> = table
        .instances
        .iter()
        .filter(|inst| analysis.family.as_deref().is_none_or(|f| inst.family == f))
        .collect();
    if selected.is_empty() {
        log::warn!("no instances selected; every curve is empty");
    }
    let partition =
        CategoryPartition::with_unclassified(selected.iter().copied(), !cli.exclude_unclassified);
    log::info!(
        "sat={} unsat={} inconsistent={} error={}",
        partition.sat.len(),
        partition.unsat.len(),
        partition.inconsistent.len(),
        partition.error.len()
    );

    let options = SurvivalOptions {
        comparison: if cli.exclusive {
            ThresholdComparison::Exclusive
        } else {
            ThresholdComparison::Inclusive
        },
        normalize: !cli.raw_counts,
    };
    let curves = build_curves(&grid, &table.tools, &partition, &cli.categories, options);

    let mut writer = open_writer(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    if cli.json {
        let body = SurvivalBody {
            thresholds: grid.points(),
            comparison: options.comparison,
            normalized: options.normalize,
            family: analysis.family.as_deref(),
            curves: &curves,
        };
        Report::new("survival_curve", &cli.datafile, &warnings, body).write_json(&mut writer)?;
    } else {
        let mut out = csv_writer(&mut writer);
        out.write_record(["threshold", "tool", "category", "count", "total", "percentage"])?;
        for point in curves.iter().flat_map(|c| &c.points) {
            out.write_record([
                point.threshold.to_string(),
                point.tool.clone(),
                point.category.to_string(),
                point.count.to_string(),
                point.total.to_string(),
                point.percentage.to_string(),
            ])?;
        }
        out.flush()?;
    }
    writer.close().with_context(|| format!("failed to finish {}", cli.output.display()))?;

    print_warning_summary(&warnings);
    Ok(())
}
