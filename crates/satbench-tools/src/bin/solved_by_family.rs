use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use satbench_core::{check_table, Instance, SolvedRow, SolvedStats};
use satbench_tools::common::csv::csv_writer;
use satbench_tools::common::io::open_writer;
use satbench_tools::config::{init_logger, AnalysisArgs};
use satbench_tools::report::{print_warning_summary, Report};

#[derive(Parser, Debug)]
#[command(author, version, about = "family × ツールごとの解けたインスタンス数（棒グラフ用）")]
struct Cli {
    /// 結果表（`-` で標準入力、.gz 可）
    datafile: PathBuf,

    /// 出力先（`-` で標準出力、.gz 可）
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// 全 family 合計の行（family = all）を出さない
    #[arg(long)]
    no_totals: bool,

    /// CSV ではなく JSON レポートを出す
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    analysis: AnalysisArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.analysis.verbose);

    let analysis = cli.analysis.resolve()?;
    let table = analysis.load_table(&cli.datafile)?;
    let mut warnings = table.warnings.clone();
    warnings.extend(check_table(&table).into_iter().inspect(|w| log::warn!("{w}")));

    let stats = match analysis.family.as_deref() {
        Some(family) => {
            let selected: Vec<Instance> = table.family(family).cloned().collect();
            if selected.is_empty() {
                log::warn!("family {family} has no instances");
            }
            SolvedStats::compute(&table.tools, &selected)
        }
        None => SolvedStats::compute(&table.tools, &table.instances),
    };

    let mut writer = open_writer(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    if cli.json {
        Report::new("solved_by_family", &cli.datafile, &warnings, &stats).write_json(&mut writer)?;
    } else {
        let mut out = csv_writer(&mut writer);
        out.write_record(["family", "tool", "solved", "total", "ratio"])?;
        let totals: &[SolvedRow] = if cli.no_totals { &[] } else { &stats.totals };
        for row in stats.rows.iter().chain(totals) {
            out.write_record([
                row.family.clone(),
                row.tool.clone(),
                row.solved.to_string(),
                row.total.to_string(),
                row.ratio.to_string(),
            ])?;
        }
        out.flush()?;
    }
    writer.close().with_context(|| format!("failed to finish {}", cli.output.display()))?;

    print_warning_summary(&warnings);
    Ok(())
}
