use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use satbench_core::{check, ConsistencyResult, Instance, ToolSet};
use satbench_tools::common::io::open_writer;
use satbench_tools::config::{init_logger, AnalysisArgs};
use satbench_tools::report::print_warning_summary;

#[derive(Parser, Debug)]
#[command(author, version, about = "同じフォーミュラで SAT と UNSAT が混在している行を一覧にする")]
struct Cli {
    /// 結果表（`-` で標準入力、.gz 可）
    datafile: PathBuf,

    /// 出力先（`-` で標準出力）
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// 不整合があれば終了コード 1 にする
    #[arg(long)]
    fail_on_inconsistent: bool,

    #[command(flatten)]
    analysis: AnalysisArgs,
}

fn describe(instance: &Instance, tools: &ToolSet) -> String {
    let mut line = format!(
        "line {}: {} (family {})",
        instance.line, instance.formula_id, instance.family
    );
    for (id, name) in tools.iter() {
        let record = instance.record(id);
        line.push_str(&format!(" {name}={}/{}", record.raw_time, record.raw_result));
    }
    line
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.analysis.verbose);

    let analysis = cli.analysis.resolve()?;
    let table = analysis.load_table(&cli.datafile)?;

    let inconsistent: Vec<&Instance> = table
        .instances
        .iter()
        .filter(|inst| analysis.family.as_deref().is_none_or(|f| inst.family == f))
        .filter(|inst| matches!(check(inst), ConsistencyResult::Inconsistent { .. }))
        .collect();

    let mut writer = open_writer(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    if inconsistent.is_empty() {
        writeln!(writer, "No inconsistencies found.")?;
    } else {
        writeln!(writer, "The following inconsistencies have been found:")?;
        for instance in &inconsistent {
            writeln!(writer, "{}", describe(instance, &table.tools))?;
        }
    }
    writer.close().with_context(|| format!("failed to finish {}", cli.output.display()))?;

    log::info!("{} of {} instances are inconsistent", inconsistent.len(), table.len());
    print_warning_summary(&table.warnings);

    if cli.fail_on_inconsistent && !inconsistent.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
