//! 生存曲線（閾値時間以内に解けたインスタンスの累積割合）

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::group::{Category, CategoryPartition};
use crate::schema::{ToolId, ToolSet};

/// 閾値の列（0 から等間隔、最大値以上の点を 1 つ含む）
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ThresholdGrid {
    points: Vec<f64>,
}

impl ThresholdGrid {
    /// 分割数の上限
    pub const MAX_STEPS: usize = 1_000_000;

    /// `factor = max_threshold / steps` 刻みで `0 ..= max_threshold + factor` を作る。
    ///
    /// 足し込みではなく掛け算で点を作るので、刻みが 2 進で割り切れなくても点数は一定。
    /// `steps` は `1..=MAX_STEPS`。
    pub fn new(max_threshold: f64, steps: usize) -> AnalysisResult<Self> {
        let invalid = || AnalysisError::InvalidGrid {
            max_threshold,
            steps,
        };
        if steps == 0 || steps > Self::MAX_STEPS {
            return Err(invalid());
        }
        if !max_threshold.is_finite() || max_threshold <= 0.0 {
            return Err(invalid());
        }
        let last = steps.checked_add(1).ok_or_else(invalid)?;
        let factor = max_threshold / steps as f64;
        let points = (0..=last).map(|i| i as f64 * factor).collect();
        Ok(Self { points })
    }

    /// 任意の点列から作る（非減少でなければ並べ替える）。
    pub fn from_points(mut points: Vec<f64>) -> AnalysisResult<Self> {
        if points.is_empty() || points.iter().any(|p| !p.is_finite()) {
            return Err(AnalysisError::InvalidGrid {
                max_threshold: points.last().copied().unwrap_or(f64::NAN),
                steps: points.len(),
            });
        }
        points.sort_by(f64::total_cmp);
        Ok(Self { points })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> f64 {
        self.points.last().copied().unwrap_or(0.0)
    }
}

/// 時間と閾値の比較方法
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdComparison {
    /// time <= threshold
    #[default]
    Inclusive,
    /// time < threshold
    Exclusive,
}

impl ThresholdComparison {
    #[inline]
    pub fn within(self, time: f64, threshold: f64) -> bool {
        match self {
            ThresholdComparison::Inclusive => time <= threshold,
            ThresholdComparison::Exclusive => time < threshold,
        }
    }
}

/// 生存曲線の設定
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurvivalOptions {
    pub comparison: ThresholdComparison,
    /// false なら母数を 1 にして件数をそのまま出す
    pub normalize: bool,
}

impl Default for SurvivalOptions {
    fn default() -> Self {
        Self {
            comparison: ThresholdComparison::Inclusive,
            normalize: true,
        }
    }
}

/// 曲線上の 1 点
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SurvivalPoint {
    pub threshold: f64,
    pub tool: String,
    pub category: Category,
    pub count: usize,
    pub total: usize,
    /// count / total（total が 0 なら 0）
    pub percentage: f64,
}

/// ツール × カテゴリの曲線（グリッド順）
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SurvivalCurve {
    pub tool: String,
    pub category: Category,
    pub points: Vec<SurvivalPoint>,
}

impl SurvivalCurve {
    pub fn percentages(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.percentage)
    }
}

/// 1 本の曲線を作る。
pub fn build_curve(
    grid: &ThresholdGrid,
    tools: &ToolSet,
    tool: ToolId,
    partition: &CategoryPartition<'_>,
    category: Category,
    options: SurvivalOptions,
) -> SurvivalCurve {
    let members = partition.category(category);
    let total = if options.normalize {
        partition.category_len(category)
    } else {
        1
    };

    let mut times: Vec<f64> =
        members.iter().filter_map(|inst| inst.record(tool).numeric_time).collect();
    times.sort_by(f64::total_cmp);

    let name = tools.name(tool);
    let mut solved = 0;
    let points = grid
        .points()
        .iter()
        .map(|&threshold| {
            // グリッドは非減少なので前の点の位置から進めればよい
            while solved < times.len() && options.comparison.within(times[solved], threshold) {
                solved += 1;
            }
            let percentage = if total > 0 {
                solved as f64 / total as f64
            } else {
                0.0
            };
            SurvivalPoint {
                threshold,
                tool: name.to_owned(),
                category,
                count: solved,
                total,
                percentage,
            }
        })
        .collect();

    SurvivalCurve {
        tool: name.to_owned(),
        category,
        points,
    }
}

/// ツール順 → カテゴリ順に曲線を並べる。
pub fn build_curves(
    grid: &ThresholdGrid,
    tools: &ToolSet,
    partition: &CategoryPartition<'_>,
    categories: &[Category],
    options: SurvivalOptions,
) -> Vec<SurvivalCurve> {
    let mut curves = Vec::with_capacity(tools.len() * categories.len());
    for tool in tools.ids() {
        for &category in categories {
            curves.push(build_curve(grid, tools, tool, partition, category, options));
        }
    }
    curves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{LoadOptions, ResultTable};

    #[test]
    fn grid_includes_one_point_past_max() {
        let grid = ThresholdGrid::new(10.0, 5).expect("grid");
        assert_eq!(grid.points(), &[0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);

        // 0.1 刻みでも点数は steps + 2
        let grid = ThresholdGrid::new(1.0, 10).expect("grid");
        assert_eq!(grid.len(), 12);
        assert!(grid.last() >= 1.0);
    }

    #[test]
    fn grid_rejects_bad_parameters() {
        assert!(ThresholdGrid::new(10.0, 0).is_err());
        assert!(ThresholdGrid::new(0.0, 5).is_err());
        assert!(ThresholdGrid::new(f64::NAN, 5).is_err());
        assert!(matches!(
            ThresholdGrid::new(10.0, usize::MAX),
            Err(AnalysisError::InvalidGrid { steps: usize::MAX, .. })
        ));
        assert!(ThresholdGrid::new(10.0, ThresholdGrid::MAX_STEPS + 1).is_err());
        let grid = ThresholdGrid::new(10.0, ThresholdGrid::MAX_STEPS).expect("grid");
        assert_eq!(grid.len(), ThresholdGrid::MAX_STEPS + 2);
        assert!(ThresholdGrid::from_points(vec![]).is_err());
        let grid = ThresholdGrid::from_points(vec![2.0, 0.0, 1.0]).expect("grid");
        assert_eq!(grid.points(), &[0.0, 1.0, 2.0]);
    }

    const TABLE: &str = "\
formula type family a a:result b b:result
f1 ltl fam 1.0 SAT 1.5 SAT
f2 ltl fam 2.0 UNSAT 2.5 SAT
";

    #[test]
    fn inconsistent_instance_is_not_counted_as_sat() {
        let tools = ToolSet::new(["a", "b"]).expect("tools");
        let table = ResultTable::from_text(TABLE, tools, LoadOptions::default()).expect("load");
        let partition = CategoryPartition::new(&table.instances);
        let grid = ThresholdGrid::from_points(vec![0.0, 1.0, 2.0]).expect("grid");

        let curve = build_curve(
            &grid,
            &table.tools,
            ToolId(0),
            &partition,
            Category::Sat,
            SurvivalOptions::default(),
        );
        let counts: Vec<usize> = curve.points.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![0, 1, 1]);
        assert_eq!(curve.points[2].total, 1);
        assert_eq!(curve.points[2].percentage, 1.0);
    }

    #[test]
    fn exclusive_comparison_skips_equal_times() {
        let tools = ToolSet::new(["a", "b"]).expect("tools");
        let table = ResultTable::from_text(TABLE, tools, LoadOptions::default()).expect("load");
        let partition = CategoryPartition::new(&table.instances);
        let grid = ThresholdGrid::from_points(vec![1.0, 2.0, 3.0]).expect("grid");

        let inclusive = build_curve(
            &grid,
            &table.tools,
            ToolId(0),
            &partition,
            Category::Both,
            SurvivalOptions::default(),
        );
        let exclusive = build_curve(
            &grid,
            &table.tools,
            ToolId(0),
            &partition,
            Category::Both,
            SurvivalOptions {
                comparison: ThresholdComparison::Exclusive,
                normalize: true,
            },
        );
        let counts = |c: &SurvivalCurve| c.points.iter().map(|p| p.count).collect::<Vec<_>>();
        assert_eq!(counts(&inclusive), vec![1, 2, 2]);
        assert_eq!(counts(&exclusive), vec![0, 1, 2]);
        assert_eq!(inclusive.points[1].percentage, 1.0);
    }

    #[test]
    fn raw_counts_disable_normalization() {
        let tools = ToolSet::new(["a", "b"]).expect("tools");
        let table = ResultTable::from_text(TABLE, tools, LoadOptions::default()).expect("load");
        let partition = CategoryPartition::new(&table.instances);
        let grid = ThresholdGrid::new(3.0, 3).expect("grid");
        let options = SurvivalOptions {
            normalize: false,
            ..SurvivalOptions::default()
        };
        let curves = build_curves(&grid, &table.tools, &partition, &Category::ALL, options);
        assert_eq!(curves.len(), 6);

        let b_both = curves
            .iter()
            .find(|c| c.tool == "b" && c.category == Category::Both)
            .expect("b both");
        let values: Vec<f64> = b_both.percentages().collect();
        assert_eq!(values, vec![0.0, 0.0, 1.0, 2.0, 2.0]);
        assert!(b_both.points.iter().all(|p| p.total == 1));
    }

    #[test]
    fn empty_category_yields_zero_percentage() {
        let tools = ToolSet::new(["a", "b"]).expect("tools");
        let table = ResultTable::from_text(TABLE, tools, LoadOptions::default()).expect("load");
        let partition = CategoryPartition::new(&table.instances);
        let grid = ThresholdGrid::new(2.0, 2).expect("grid");
        let curve = build_curve(
            &grid,
            &table.tools,
            ToolId(1),
            &partition,
            Category::Unsat,
            SurvivalOptions::default(),
        );
        assert!(curve.points.iter().all(|p| p.total == 0 && p.percentage == 0.0));
    }
}
