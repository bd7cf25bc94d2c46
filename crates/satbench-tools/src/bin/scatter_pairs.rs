use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use satbench_core::{check_table, compare, ComparisonPoint, ComparisonSeries, PairwiseOptions};
use satbench_tools::common::csv::csv_writer;
use satbench_tools::common::io::open_writer;
use satbench_tools::config::{init_logger, AnalysisArgs};
use satbench_tools::report::{print_warning_summary, Report};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "2 ツールの実行時間を対にして散布図用の系列を出力する"
)]
struct Cli {
    /// 結果表（`-` で標準入力、.gz 可）
    datafile: PathBuf,

    /// x 軸のツール
    xtool: String,

    /// y 軸のツール
    ytool: String,

    /// 時間がない結果（タイムアウト・エラー）に使う値
    errortime: f64,

    /// INCONSISTENT / ERROR のインスタンスも出力する
    #[arg(long)]
    include_unusable: bool,

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
struct ScatterBody<'a> {
    x_tool: &'a str,
    y_tool: &'a str,
    errortime: f64,
    family: Option<&'a str>,
    points: &'a [ComparisonPoint],
    series: Vec<ComparisonSeries>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.analysis.verbose);

    let analysis = cli.analysis.resolve()?;
    let table = analysis.load_table(&cli.datafile)?;

    let options = PairwiseOptions {
        family: analysis.family.clone(),
        include_unusable: cli.include_unusable,
        ..PairwiseOptions::new(cli.errortime)
    };
    let comparison = compare(&table, &cli.xtool, &cli.ytool, &options)?;
    log::info!(
        "{} vs {}: {} points, {} disagreements",
        comparison.x_tool,
        comparison.y_tool,
        comparison.points.len(),
        comparison.warnings.len()
    );

    let mut warnings = table.warnings.clone();
    warnings.extend(check_table(&table).into_iter().inspect(|w| log::warn!("{w}")));
    warnings.extend(comparison.warnings.iter().cloned());

    let mut writer = open_writer(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    if cli.json {
        let body = ScatterBody {
            x_tool: &comparison.x_tool,
            y_tool: &comparison.y_tool,
            errortime: cli.errortime,
            family: options.family.as_deref(),
            points: &comparison.points,
            series: comparison.series(),
        };
        Report::new("scatter_pairs", &cli.datafile, &warnings, body).write_json(&mut writer)?;
    } else {
        let mut out = csv_writer(&mut writer);
        out.write_record(["category", "family", "formula", "time_x", "time_y"])?;
        for point in &comparison.points {
            out.write_record([
                point.category.to_string(),
                point.family.clone(),
                point.formula_id.clone(),
                point.time_x.to_string(),
                point.time_y.to_string(),
            ])?;
        }
        out.flush()?;
    }
    writer.close().with_context(|| format!("failed to finish {}", cli.output.display()))?;

    print_warning_summary(&warnings);
    Ok(())
}
