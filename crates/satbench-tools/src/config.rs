//! 共通オプション
//!
//! どのバイナリも同じ読み込み設定を受け取る。TOML ファイル（`--config`）で既定値を与え、
//! コマンドラインのフラグがそれを上書きする。

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;

use satbench_core::{
    Delimiter, LoadOptions, RawTable, ResultColumn, ResultTable, RowPolicy, TimePolicy, ToolSet,
};

use crate::common::io::read_text;

/// 設定ファイルの内容（全項目省略可）
///
/// ```toml
/// tools = ["black", "aaltaf"]
/// family = "counter"
/// strict_time = false
/// lenient_rows = true
/// result_by_name = false
/// delimiter = "whitespace"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub tools: Option<Vec<String>>,
    pub family: Option<String>,
    pub strict_time: bool,
    pub lenient_rows: bool,
    pub result_by_name: bool,
    pub delimiter: Delimiter,
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse analysis config")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// コマンドラインの値で上書きし、読み込み設定を確定する。
    pub fn resolve(self, args: &AnalysisArgs) -> Result<ResolvedAnalysis> {
        let tools = match (&args.tools, self.tools) {
            (Some(list), _) => Some(parse_tool_list(list)?),
            (None, Some(list)) => Some(validate_tools(list)?),
            (None, None) => None,
        };
        let family = args.family.clone().or(self.family);

        let time_policy = if switch(args.strict_time, args.no_strict_time, self.strict_time) {
            TimePolicy::Strict
        } else {
            TimePolicy::Lenient
        };
        let row_policy = if switch(args.lenient_rows, args.no_lenient_rows, self.lenient_rows) {
            RowPolicy::Lenient
        } else {
            RowPolicy::Strict
        };
        let result_column =
            if switch(args.result_by_name, args.no_result_by_name, self.result_by_name) {
                ResultColumn::ByName
            } else {
                ResultColumn::Adjacent
            };

        Ok(ResolvedAnalysis {
            tools,
            family,
            load: LoadOptions {
                delimiter: args.delimiter.unwrap_or(self.delimiter),
                result_column,
                row_policy,
                time_policy,
            },
        })
    }
}

/// 全バイナリ共通のフラグ
#[derive(Args, Clone, Debug, Default)]
pub struct AnalysisArgs {
    /// 設定ファイル（TOML）
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// 解析するツール（カンマ区切り。省略時はヘッダの `<tool>:result` 列から検出）
    #[arg(long, value_name = "A,B,...")]
    pub tools: Option<String>,

    /// この family のインスタンスだけを使う
    #[arg(long)]
    pub family: Option<String>,

    /// SAT/UNSAT なのに時間が数値でない行をエラーにする
    #[arg(long, overrides_with = "no_strict_time")]
    pub strict_time: bool,

    /// 設定ファイルの strict_time = true を打ち消す
    #[arg(long, overrides_with = "strict_time")]
    pub no_strict_time: bool,

    /// 列が足りない行を警告して読み飛ばす
    #[arg(long, overrides_with = "no_lenient_rows")]
    pub lenient_rows: bool,

    /// 設定ファイルの lenient_rows = true を打ち消す
    #[arg(long, overrides_with = "lenient_rows")]
    pub no_lenient_rows: bool,

    /// 結果列を隣の列ではなく `<tool>:result` という名前で探す
    #[arg(long, overrides_with = "no_result_by_name")]
    pub result_by_name: bool,

    /// 設定ファイルの result_by_name = true を打ち消す
    #[arg(long, overrides_with = "result_by_name")]
    pub no_result_by_name: bool,

    /// 区切り文字: auto / whitespace / comma
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<Delimiter>,

    /// デバッグログを出す
    #[arg(short, long)]
    pub verbose: bool,
}

impl AnalysisArgs {
    /// `--config` があれば読み、フラグで上書きした設定を返す。
    pub fn resolve(&self) -> Result<ResolvedAnalysis> {
        let config = match &self.config {
            Some(path) => AnalysisConfig::from_path(path)?,
            None => AnalysisConfig::default(),
        };
        config.resolve(self)
    }
}

/// 確定した読み込み設定
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAnalysis {
    /// None ならヘッダから検出する
    pub tools: Option<Vec<String>>,
    pub family: Option<String>,
    pub load: LoadOptions,
}

impl ResolvedAnalysis {
    /// 明示されたツール、なければ `:result` 列のツール全部
    pub fn tool_set(&self, raw: &RawTable) -> Result<ToolSet> {
        let names = match &self.tools {
            Some(names) => names.clone(),
            None => raw.result_tools(),
        };
        if names.is_empty() {
            bail!("no tools given and no `<tool>:result` columns in the header");
        }
        Ok(ToolSet::new(names)?)
    }

    /// 結果表を読み込む（`-` は標準入力、`.gz` 可）。
    pub fn load_table(&self, path: &Path) -> Result<ResultTable> {
        let text = read_text(path).with_context(|| format!("failed to read {}", path.display()))?;
        let raw = RawTable::parse(&text, self.load.delimiter)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let tools = self.tool_set(&raw)?;
        let table = ResultTable::from_raw(&raw, tools, self.load)
            .with_context(|| format!("failed to load {}", path.display()))?;
        log::info!(
            "{}: {} instances, tools [{}]",
            path.display(),
            table.len(),
            table.tools
        );
        Ok(table)
    }
}

/// `--x` / `--no-x` が指定されていればそれ、なければ設定ファイルの値
fn switch(on: bool, off: bool, file: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        file
    }
}

fn parse_delimiter(s: &str) -> Result<Delimiter, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(Delimiter::Auto),
        "whitespace" | "space" | "ws" => Ok(Delimiter::Whitespace),
        "comma" | "," => Ok(Delimiter::Comma),
        other => Err(format!("unknown delimiter: {other} (expected auto, whitespace or comma)")),
    }
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    s.trim_matches(|c| c == '"' || c == '\'')
}

/// `"a, b,c"` → `["a", "b", "c"]`。空の要素はエラー。
pub fn parse_tool_list(s: &str) -> Result<Vec<String>> {
    let list = strip_quotes(s);
    if list.is_empty() {
        bail!("tool list is empty");
    }
    validate_tools(list.split(',').map(ToOwned::to_owned).collect())
}

fn validate_tools(list: Vec<String>) -> Result<Vec<String>> {
    let mut tools = Vec::with_capacity(list.len());
    for (idx, raw) in list.iter().enumerate() {
        let name = strip_quotes(raw);
        if name.is_empty() {
            bail!("tool list entry #{} is empty", idx + 1);
        }
        tools.push(name.to_owned());
    }
    if tools.is_empty() {
        bail!("tool list is empty");
    }
    Ok(tools)
}

/// `--verbose` なら debug、そうでなければ info（`RUST_LOG` が優先）
pub fn init_logger(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
