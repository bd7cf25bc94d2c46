//! 2 ツールの時間の対比較（散布図用）
//!
//! 時間のないツール結果は errortime に置き換える。置き換えはこの境界でだけ行い、
//! [`ToolRecord`](crate::outcome::ToolRecord) には書き戻さない。

use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult, Warning};
use crate::instance::ResultTable;
use crate::outcome::{AggregateOutcome, ToolRecord};

/// 比較の設定
#[derive(Clone, Debug, PartialEq)]
pub struct PairwiseOptions {
    /// 時間がないときに使う値
    pub errortime: f64,
    /// 指定があればその family だけ
    pub family: Option<String>,
    /// INCONSISTENT / ERROR のインスタンスも出力する
    pub include_unusable: bool,
}

impl PairwiseOptions {
    pub fn new(errortime: f64) -> Self {
        Self {
            errortime,
            family: None,
            include_unusable: false,
        }
    }
}

/// 比較の 1 点
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub category: AggregateOutcome,
    pub family: String,
    pub formula_id: String,
    pub time_x: f64,
    pub time_y: f64,
}

/// (category, family) ごとの系列
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonSeries {
    pub category: AggregateOutcome,
    pub family: String,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

/// 比較結果
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Comparison {
    pub x_tool: String,
    pub y_tool: String,
    pub points: Vec<ComparisonPoint>,
    pub warnings: Vec<Warning>,
}

impl Comparison {
    /// 初出順に (category, family) でまとめる。
    pub fn series(&self) -> Vec<ComparisonSeries> {
        let mut series: Vec<ComparisonSeries> = Vec::new();
        for point in &self.points {
            let existing = series
                .iter_mut()
                .find(|s| s.category == point.category && s.family == point.family);
            match existing {
                Some(s) => {
                    s.xs.push(point.time_x);
                    s.ys.push(point.time_y);
                }
                None => series.push(ComparisonSeries {
                    category: point.category,
                    family: point.family.clone(),
                    xs: vec![point.time_x],
                    ys: vec![point.time_y],
                }),
            }
        }
        series
    }
}

fn effective_time(record: &ToolRecord, errortime: f64) -> f64 {
    if record.outcome.is_definitive() {
        record.numeric_time.unwrap_or(errortime)
    } else {
        errortime
    }
}

/// `x` と `y` の時間を対にする。
///
/// 既定では SAT のみ・UNSAT のみのインスタンスだけを出力する。
/// `x` と `y` が逆の判定を返した場合は、点を出すかどうかに関係なく警告する。
pub fn compare(
    table: &ResultTable,
    x: &str,
    y: &str,
    options: &PairwiseOptions,
) -> AnalysisResult<Comparison> {
    if !options.errortime.is_finite() {
        return Err(AnalysisError::InvalidErrortime(options.errortime));
    }
    let x_id = table.tools.require(x)?;
    let y_id = table.tools.require(y)?;

    let mut points = Vec::new();
    let mut warnings = Vec::new();
    let selected = table
        .instances
        .iter()
        .filter(|inst| options.family.as_deref().is_none_or(|f| inst.family == f));

    for instance in selected {
        let rx = instance.record(x_id);
        let ry = instance.record(y_id);
        if rx.outcome.contradicts(ry.outcome) {
            let warning = Warning::Disagreement {
                line: instance.line,
                formula_id: instance.formula_id.clone(),
                x_tool: x.to_owned(),
                x_outcome: rx.outcome,
                y_tool: y.to_owned(),
                y_outcome: ry.outcome,
            };
            log::warn!("{warning}");
            warnings.push(warning);
        }

        let category = instance.aggregate();
        if !category.is_usable() && !options.include_unusable {
            continue;
        }
        points.push(ComparisonPoint {
            category,
            family: instance.family.clone(),
            formula_id: instance.formula_id.clone(),
            time_x: effective_time(rx, options.errortime),
            time_y: effective_time(ry, options.errortime),
        });
    }

    Ok(Comparison {
        x_tool: x.to_owned(),
        y_tool: y.to_owned(),
        points,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::LoadOptions;
    use crate::schema::ToolSet;

    const TABLE: &str = "\
formula type family x x:result y y:result z z:result
f1 ltl alpha 1.0 SAT 1.5 SAT 1.0 SAT
f2 ltl alpha 2.0 UNSAT 2.5 SAT 1.0 SAT
f3 ltl beta TO TIMEOUT 0.1 UNSAT 1.0 UNSAT
f4 ltl beta TO TIMEOUT TO ERROR TO ERROR
f5 ltl alpha err SAT 0.3 SAT 1.0 SAT
";

    fn table() -> ResultTable {
        let tools = ToolSet::new(["x", "y", "z"]).expect("tools");
        ResultTable::from_text(TABLE, tools, LoadOptions::default()).expect("load")
    }

    #[test]
    fn substitutes_errortime_only_in_output() {
        let table = table();
        let cmp = compare(&table, "x", "y", &PairwiseOptions::new(480.0)).expect("compare");

        let ids: Vec<&str> = cmp.points.iter().map(|p| p.formula_id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f3", "f5"]);
        assert_eq!((cmp.points[0].time_x, cmp.points[0].time_y), (1.0, 1.5));
        assert_eq!((cmp.points[1].time_x, cmp.points[1].time_y), (480.0, 0.1));
        // 時間が壊れている SAT も errortime
        assert_eq!(cmp.points[2].time_x, 480.0);
        assert_eq!(cmp.points[1].category, AggregateOutcome::Unsat);

        // 元のレコードには errortime が入らない
        let x = table.tools.require("x").expect("x");
        assert_eq!(table.instances[2].record(x).numeric_time, None);
    }

    #[test]
    fn disagreement_is_reported_even_when_point_is_skipped() {
        let table = table();
        let cmp = compare(&table, "x", "y", &PairwiseOptions::new(480.0)).expect("compare");
        assert_eq!(cmp.warnings.len(), 1);
        assert!(matches!(
            &cmp.warnings[0],
            Warning::Disagreement { formula_id, line: 3, .. } if formula_id == "f2"
        ));

        let options = PairwiseOptions {
            include_unusable: true,
            ..PairwiseOptions::new(480.0)
        };
        let cmp = compare(&table, "x", "y", &options).expect("compare");
        assert_eq!(cmp.points.len(), 5);
        assert_eq!(cmp.points[1].category, AggregateOutcome::Inconsistent);
        assert_eq!(cmp.points[3].category, AggregateOutcome::Error);
        assert_eq!(cmp.warnings.len(), 1);
    }

    #[test]
    fn family_filter_and_series_grouping() {
        let table = table();
        let options = PairwiseOptions {
            family: Some("alpha".to_owned()),
            ..PairwiseOptions::new(100.0)
        };
        let cmp = compare(&table, "y", "z", &options).expect("compare");
        assert!(cmp.points.iter().all(|p| p.family == "alpha"));
        // f2 は x が UNSAT なので INCONSISTENT で除外される
        assert_eq!(cmp.points.len(), 2);

        let all = compare(&table, "y", "z", &PairwiseOptions::new(100.0)).expect("compare");
        let series = all.series();
        assert_eq!(series.len(), 2);
        assert_eq!(
            (series[0].category, series[0].family.as_str()),
            (AggregateOutcome::Sat, "alpha")
        );
        assert_eq!(series[0].xs, vec![1.5, 0.3]);
        assert_eq!(series[0].ys, vec![1.0, 1.0]);
        assert_eq!(
            (series[1].category, series[1].family.as_str()),
            (AggregateOutcome::Unsat, "beta")
        );
    }

    #[test]
    fn rejects_unknown_tools_and_bad_errortime() {
        let table = table();
        assert!(matches!(
            compare(&table, "x", "w", &PairwiseOptions::new(1.0)),
            Err(AnalysisError::UnknownTool(name)) if name == "w"
        ));
        assert!(matches!(
            compare(&table, "x", "y", &PairwiseOptions::new(f64::INFINITY)),
            Err(AnalysisError::InvalidErrortime(_))
        ));
    }
}
