//! ソルバーベンチマーク結果の分類・集計エンジン
//!
//! 複数ツールを同じフォーミュラ群に対して実行した結果表
//! （`formula type family <tool> <tool>:result ...`）を読み込み、
//! 判定の分類、ツール間の不整合検出、family/カテゴリ別の分割、
//! 生存曲線と 2 ツールの時間比較を計算する。
//!
//! 描画やファイル出力は行わない。数値系列と警告一覧を返すだけなので、
//! 呼び出し側（`satbench-tools` の各バイナリ）が CSV/JSON に書き出す。
//!
//! ```
//! use satbench_core::{
//!     build_curves, Category, CategoryPartition, LoadOptions, ResultTable, SurvivalOptions,
//!     ThresholdGrid, ToolSet,
//! };
//!
//! let text = "formula type family a a:result\nf1 ltl fam 1.0 SAT\nf2 ltl fam TO TIMEOUT\n";
//! let tools = ToolSet::new(["a"]).unwrap();
//! let table = ResultTable::from_text(text, tools, LoadOptions::default()).unwrap();
//! let partition = CategoryPartition::new(&table.instances);
//! let grid = ThresholdGrid::new(2.0, 2).unwrap();
//! let curves = build_curves(&grid, &table.tools, &partition, &[Category::Both], SurvivalOptions::default());
//! assert_eq!(curves[0].points.last().unwrap().percentage, 0.5);
//! ```

pub mod compare;
pub mod consistency;
pub mod error;
pub mod group;
pub mod instance;
pub mod outcome;
pub mod schema;
pub mod survival;
pub mod table;

pub use compare::{compare, Comparison, ComparisonPoint, ComparisonSeries, PairwiseOptions};
pub use consistency::{check, check_pair, check_table, ConsistencyResult, ResultMismatch};
pub use error::{AnalysisError, AnalysisResult, Warning};
pub use group::{Category, CategoryPartition, FamilyGroups, SolvedRow, SolvedStats};
pub use instance::{load, Instance, LoadOptions, ResultTable, RowPolicy};
pub use outcome::{classify, parse_time, AggregateOutcome, Outcome, TimePolicy, ToolRecord};
pub use schema::{ResultColumn, Schema, ToolColumns, ToolId, ToolSet};
pub use survival::{
    build_curve, build_curves, SurvivalCurve, SurvivalOptions, SurvivalPoint, ThresholdComparison,
    ThresholdGrid,
};
pub use table::{merge, Delimiter, RawRow, RawTable, DEFAULT_MERGE_KEYS};
