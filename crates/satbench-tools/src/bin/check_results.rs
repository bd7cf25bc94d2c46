use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use satbench_core::check_pair;
use satbench_tools::common::io::open_writer;
use satbench_tools::config::{init_logger, AnalysisArgs};
use satbench_tools::report::print_warning_summary;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "2 ツールの判定を突き合わせる（どちらかがタイムアウト・エラーの行は除く）"
)]
struct Cli {
    /// 結果表（`-` で標準入力、.gz 可）
    datafile: PathBuf,

    xtool: String,

    ytool: String,

    /// 出力先（`-` で標準出力）
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// 不一致があれば終了コード 1 にする
    #[arg(long)]
    fail_on_mismatch: bool,

    #[command(flatten)]
    analysis: AnalysisArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.analysis.verbose);

    let analysis = cli.analysis.resolve()?;
    let table = analysis.load_table(&cli.datafile)?;
    let mismatches = check_pair(&table, &cli.xtool, &cli.ytool)?;

    let mut writer = open_writer(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    if mismatches.is_empty() {
        writeln!(writer, "All results of {} and {} coincide.", cli.xtool, cli.ytool)?;
    }
    for m in &mismatches {
        writeln!(
            writer,
            "The results of {} and {} do not coincide on line {} ({}: {} vs {}).",
            cli.xtool, cli.ytool, m.line, m.formula_id, m.x_outcome, m.y_outcome
        )?;
    }
    writer.close().with_context(|| format!("failed to finish {}", cli.output.display()))?;

    print_warning_summary(&table.warnings);
    if cli.fail_on_mismatch && !mismatches.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
