use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use satbench_core::{merge, Delimiter, RawTable, DEFAULT_MERGE_KEYS};
use satbench_tools::common::io::{open_writer, read_text};
use satbench_tools::config::{init_logger, parse_tool_list};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "2 つの結果表をキー列で結合する（左表の古いツール列を再実行結果で置き換える用途）"
)]
struct Cli {
    /// 元の結果表
    left: PathBuf,

    /// 追加する結果表
    right: PathBuf,

    /// 出力先（`-` で標準出力、.gz 可）
    #[arg(long)]
    output: PathBuf,

    /// 結合キー（カンマ区切り）
    #[arg(long, default_value_t = DEFAULT_MERGE_KEYS.join(","))]
    keys: String,

    /// 左表から除く列（カンマ区切り）
    #[arg(long)]
    drop: Option<String>,

    /// 空白ではなくカンマ区切りで書き出す
    #[arg(long)]
    comma: bool,

    /// デバッグログを出す
    #[arg(short, long)]
    verbose: bool,
}

fn read_table(path: &Path) -> Result<RawTable> {
    let text = read_text(path).with_context(|| format!("failed to read {}", path.display()))?;
    RawTable::parse(&text, Delimiter::Auto)
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    // 列名のリストも tool リストと同じ規則で読む
    let keys = parse_tool_list(&cli.keys).context("invalid --keys")?;
    let drop = match &cli.drop {
        Some(list) => parse_tool_list(list).context("invalid --drop")?,
        None => Vec::new(),
    };

    let left = read_table(&cli.left)?;
    let right = read_table(&cli.right)?;
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let drop_refs: Vec<&str> = drop.iter().map(String::as_str).collect();
    let merged = merge(&left, &right, &key_refs, &drop_refs)?;
    log::info!(
        "merged {} x {} rows into {} rows with {} columns",
        left.rows.len(),
        right.rows.len(),
        merged.rows.len(),
        merged.header.len()
    );

    let mut writer = open_writer(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    merged.write(&mut writer, if cli.comma { ',' } else { ' ' })?;
    writer.close().with_context(|| format!("failed to finish {}", cli.output.display()))?;
    Ok(())
}
