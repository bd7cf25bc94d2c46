//! ツール間の判定の食い違いを検出する

use serde::Serialize;

use crate::error::{AnalysisResult, Warning};
use crate::instance::{Instance, ResultTable};
use crate::outcome::{parse_time, Outcome};
use crate::schema::{ToolId, ToolSet};

/// 1 インスタンスの整合性
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsistencyResult {
    Consistent,
    /// SAT と UNSAT を返したツール
    Inconsistent {
        sat_tools: Vec<ToolId>,
        unsat_tools: Vec<ToolId>,
    },
}

impl ConsistencyResult {
    pub fn is_consistent(&self) -> bool {
        matches!(self, ConsistencyResult::Consistent)
    }
}

/// SAT を返したツールと UNSAT を返したツールが両方あれば不整合。
pub fn check(instance: &Instance) -> ConsistencyResult {
    let mut sat_tools = Vec::new();
    let mut unsat_tools = Vec::new();
    for (idx, record) in instance.records().iter().enumerate() {
        match record.outcome {
            Outcome::Sat => sat_tools.push(ToolId(idx)),
            Outcome::Unsat => unsat_tools.push(ToolId(idx)),
            Outcome::Error => {}
        }
    }
    if sat_tools.is_empty() || unsat_tools.is_empty() {
        ConsistencyResult::Consistent
    } else {
        ConsistencyResult::Inconsistent {
            sat_tools,
            unsat_tools,
        }
    }
}

/// 不整合なインスタンスごとに警告を 1 つ作る（表の順）。
pub fn check_table(table: &ResultTable) -> Vec<Warning> {
    table
        .instances
        .iter()
        .filter_map(|instance| inconsistency_warning(instance, &table.tools))
        .collect()
}

fn inconsistency_warning(instance: &Instance, tools: &ToolSet) -> Option<Warning> {
    match check(instance) {
        ConsistencyResult::Consistent => None,
        ConsistencyResult::Inconsistent {
            sat_tools,
            unsat_tools,
        } => {
            let names = |ids: Vec<ToolId>| -> Vec<String> {
                ids.into_iter().map(|id| tools.name(id).to_owned()).collect()
            };
            Some(Warning::InconsistentResult {
                line: instance.line,
                formula_id: instance.formula_id.clone(),
                sat_tools: names(sat_tools),
                unsat_tools: names(unsat_tools),
            })
        }
    }
}

/// 2 ツールの判定の不一致（時間が両方数値の行のみ）
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResultMismatch {
    pub line: usize,
    pub formula_id: String,
    pub x_outcome: Outcome,
    pub y_outcome: Outcome,
}

/// `x` と `y` の判定を突き合わせる。
///
/// どちらかの時間が数値でない（タイムアウト・エラー）行は比較しない。
/// 空なら全行で一致している。
pub fn check_pair(table: &ResultTable, x: &str, y: &str) -> AnalysisResult<Vec<ResultMismatch>> {
    let x_id = table.tools.require(x)?;
    let y_id = table.tools.require(y)?;

    let mismatches = table
        .instances
        .iter()
        .filter_map(|instance| {
            let rx = instance.record(x_id);
            let ry = instance.record(y_id);
            let timed = parse_time(&rx.raw_time).is_some() && parse_time(&ry.raw_time).is_some();
            (timed && rx.outcome != ry.outcome).then(|| ResultMismatch {
                line: instance.line,
                formula_id: instance.formula_id.clone(),
                x_outcome: rx.outcome,
                y_outcome: ry.outcome,
            })
        })
        .collect();
    Ok(mismatches)
}
