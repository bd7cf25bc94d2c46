//! family 別・判定カテゴリ別の分割と、棒グラフ用の解決数集計

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::instance::Instance;
use crate::outcome::AggregateOutcome;
use crate::schema::{ToolId, ToolSet};

/// family ごとのインスタンス列（初出順）
#[derive(Debug, Default)]
pub struct FamilyGroups<'a> {
    groups: Vec<(&'a str, Vec<&'a Instance>)>,
}

impl<'a> FamilyGroups<'a> {
    pub fn new<I>(instances: I) -> Self
    where
        I: IntoIterator<Item = &'a Instance>,
    {
        let mut groups: Vec<(&'a str, Vec<&'a Instance>)> = Vec::new();
        for instance in instances {
            match groups.iter_mut().find(|(family, _)| *family == instance.family) {
                Some((_, members)) => members.push(instance),
                None => groups.push((instance.family.as_str(), vec![instance])),
            }
        }
        Self { groups }
    }

    /// 初出順の family 名
    pub fn families(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.iter().map(|(family, _)| *family)
    }

    pub fn get(&self, family: &str) -> Option<&[&'a Instance]> {
        self.groups.iter().find(|(f, _)| *f == family).map(|(_, members)| members.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a Instance])> + '_ {
        self.groups.iter().map(|(family, members)| (*family, members.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// 生存曲線・比較で選ぶカテゴリ
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// SAT のみのインスタンス
    Sat,
    /// UNSAT のみのインスタンス
    Unsat,
    /// SAT/UNSAT 合算（設定により分類不能も含む）
    Both,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Sat, Category::Unsat, Category::Both];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Sat => "sat",
            Category::Unsat => "unsat",
            Category::Both => "both",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sat" => Ok(Category::Sat),
            "unsat" => Ok(Category::Unsat),
            "both" | "either" | "all" => Ok(Category::Both),
            other => Err(format!("unknown category: {other} (expected sat, unsat or both)")),
        }
    }
}

/// 集計判定による 4 分割（互いに素、合計は全インスタンス数）
#[derive(Debug, Default)]
pub struct CategoryPartition<'a> {
    pub sat: Vec<&'a Instance>,
    pub unsat: Vec<&'a Instance>,
    pub inconsistent: Vec<&'a Instance>,
    pub error: Vec<&'a Instance>,
    /// Both に INCONSISTENT / ERROR を含めるか
    pub include_unclassified: bool,
}

impl<'a> CategoryPartition<'a> {
    /// 分類不能（INCONSISTENT / ERROR）も Both の母数に含める既定の分割
    pub fn new<I>(instances: I) -> Self
    where
        I: IntoIterator<Item = &'a Instance>,
    {
        Self::with_unclassified(instances, true)
    }

    pub fn with_unclassified<I>(instances: I, include_unclassified: bool) -> Self
    where
        I: IntoIterator<Item = &'a Instance>,
    {
        let mut partition = Self {
            include_unclassified,
            ..Self::default()
        };
        for instance in instances {
            match instance.aggregate() {
                AggregateOutcome::Sat => partition.sat.push(instance),
                AggregateOutcome::Unsat => partition.unsat.push(instance),
                AggregateOutcome::Inconsistent => partition.inconsistent.push(instance),
                AggregateOutcome::Error => partition.error.push(instance),
            }
        }
        partition
    }

    /// 集計判定ごとのバケット
    pub fn bucket(&self, outcome: AggregateOutcome) -> &[&'a Instance] {
        match outcome {
            AggregateOutcome::Sat => &self.sat,
            AggregateOutcome::Unsat => &self.unsat,
            AggregateOutcome::Inconsistent => &self.inconsistent,
            AggregateOutcome::Error => &self.error,
        }
    }

    /// カテゴリに属するインスタンス（Both は SAT → UNSAT → 分類不能の順）
    pub fn category(&self, category: Category) -> Vec<&'a Instance> {
        match category {
            Category::Sat => self.sat.clone(),
            Category::Unsat => self.unsat.clone(),
            Category::Both => {
                let mut members = Vec::with_capacity(self.total());
                members.extend(&self.sat);
                members.extend(&self.unsat);
                if self.include_unclassified {
                    members.extend(&self.inconsistent);
                    members.extend(&self.error);
                }
                members
            }
        }
    }

    /// カテゴリの母数
    pub fn category_len(&self, category: Category) -> usize {
        match category {
            Category::Sat => self.sat.len(),
            Category::Unsat => self.unsat.len(),
            Category::Both if self.include_unclassified => self.total(),
            Category::Both => self.sat.len() + self.unsat.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.sat.len() + self.unsat.len() + self.inconsistent.len() + self.error.len()
    }
}

/// family × ツールの解決数
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolvedRow {
    pub family: String,
    pub tool: String,
    pub solved: usize,
    pub total: usize,
    pub ratio: f64,
}

/// 棒グラフ用の集計
///
/// 判定が SAT/UNSAT なら「解けた」とみなす（時間の有無は見ない）。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolvedStats {
    /// family 初出順 → ツール順
    pub rows: Vec<SolvedRow>,
    /// 全 family 合計（ツール順）
    pub totals: Vec<SolvedRow>,
}

impl SolvedStats {
    pub fn compute(tools: &ToolSet, instances: &[Instance]) -> Self {
        let groups = FamilyGroups::new(instances);
        let mut rows = Vec::with_capacity(groups.len() * tools.len());
        for (family, members) in groups.iter() {
            for (id, name) in tools.iter() {
                rows.push(solved_row(
                    family,
                    name,
                    solved_count(members.iter().copied(), id),
                    members.len(),
                ));
            }
        }
        let totals = tools
            .iter()
            .map(|(id, name)| solved_row("all", name, solved_count(instances, id), instances.len()))
            .collect();
        Self { rows, totals }
    }
}

fn solved_count<'a>(instances: impl IntoIterator<Item = &'a Instance>, tool: ToolId) -> usize {
    instances.into_iter().filter(|inst| inst.record(tool).is_solved()).count()
}

fn solved_row(family: &str, tool: &str, solved: usize, total: usize) -> SolvedRow {
    let ratio = if total > 0 {
        solved as f64 / total as f64
    } else {
        0.0
    };
    SolvedRow {
        family: family.to_owned(),
        tool: tool.to_owned(),
        solved,
        total,
        ratio,
    }
}
