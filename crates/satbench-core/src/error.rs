//! エラー型と警告型
//!
//! 解析を中断する構造的な問題は [`AnalysisError`]、
//! インスタンス単位のデータ品質の問題は [`Warning`] として区別する。

use std::fmt;

use serde::Serialize;

use crate::outcome::Outcome;

/// 解析を中断するエラー
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// ヘッダに要求された列が存在しない
    #[error("column not found in header: {column}")]
    ColumnNotFound { column: String },

    /// データ行のフィールド数がスキーマに足りない
    #[error("malformed row at line {line}: expected at least {expected} fields, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// SAT/UNSAT の行で時間が数値でない（strict ポリシー時）
    #[error("malformed time at line {line} for tool {tool}: {raw_time:?} is not a number")]
    MalformedTime {
        line: usize,
        tool: String,
        raw_time: String,
    },

    /// ヘッダ行がない
    #[error("result table has no header line")]
    EmptyTable,

    /// ツール一覧が空、または重複を含む
    #[error("invalid tool list: {0}")]
    InvalidToolList(String),

    /// 読み込み済みのツール集合に含まれないツール名
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// 閾値グリッドのパラメータが不正
    #[error("invalid threshold grid: max_threshold={max_threshold}, steps={steps}")]
    InvalidGrid { max_threshold: f64, steps: usize },

    /// 結合の指定が矛盾している
    #[error("invalid merge: {0}")]
    InvalidMerge(String),

    /// errortime が有限値でない
    #[error("invalid errortime: {0}")]
    InvalidErrortime(f64),

    /// File I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// 解析は継続するが報告が必要な状態
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// SAT/UNSAT なのに時間が数値でない（lenient ポリシー時）
    MalformedTime {
        line: usize,
        formula_id: String,
        tool: String,
        raw_time: String,
    },
    /// フィールド不足の行を読み飛ばした（lenient ポリシー時）
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// 同じインスタンスで SAT と UNSAT が混在している
    InconsistentResult {
        line: usize,
        formula_id: String,
        sat_tools: Vec<String>,
        unsat_tools: Vec<String>,
    },
    /// 比較中の 2 ツールが逆の判定を返した
    Disagreement {
        line: usize,
        formula_id: String,
        x_tool: String,
        x_outcome: Outcome,
        y_tool: String,
        y_outcome: Outcome,
    },
}

impl Warning {
    pub fn label(&self) -> &'static str {
        match self {
            Warning::MalformedTime { .. } => "malformed_time",
            Warning::MalformedRow { .. } => "malformed_row",
            Warning::InconsistentResult { .. } => "inconsistent_result",
            Warning::Disagreement { .. } => "disagreement",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MalformedTime {
                line,
                formula_id,
                tool,
                raw_time,
            } => write!(
                f,
                "line {line} ({formula_id}): {tool} reported a verdict with non-numeric time {raw_time:?}"
            ),
            Warning::MalformedRow {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {line}: skipped row with {found} fields (expected at least {expected})"
            ),
            Warning::InconsistentResult {
                line,
                formula_id,
                sat_tools,
                unsat_tools,
            } => write!(
                f,
                "line {line} ({formula_id}): SAT by [{}] but UNSAT by [{}]",
                sat_tools.join(", "),
                unsat_tools.join(", ")
            ),
            Warning::Disagreement {
                line,
                formula_id,
                x_tool,
                x_outcome,
                y_tool,
                y_outcome,
            } => write!(
                f,
                "line {line} ({formula_id}): {x_tool} says {x_outcome} but {y_tool} says {y_outcome}"
            ),
        }
    }
}
