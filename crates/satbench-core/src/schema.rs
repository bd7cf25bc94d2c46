//! ヘッダから列位置を解決する
//!
//! ツールごとに時間列・結果列の位置を一度だけ求め、以後の行処理は
//! 位置参照だけで済ませる。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// family 列の名前
pub const FAMILY_COLUMN: &str = "family";
/// type 列の名前（任意）
pub const TYPE_COLUMN: &str = "type";
/// 結果列の接尾辞
pub const RESULT_SUFFIX: &str = ":result";

/// 結果列の探し方
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultColumn {
    /// 時間列の直後
    #[default]
    Adjacent,
    /// `<tool>:result` という名前の列
    ByName,
}

/// ツールの識別子（[`ToolSet`] 内での添字）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolId(pub usize);

impl ToolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// 解析対象ツールの閉じた集合（要求順）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolSet {
    names: Vec<String>,
}

impl ToolSet {
    /// 空・重複を拒否して作る。
    pub fn new<I, S>(names: I) -> AnalysisResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if name.is_empty() {
                return Err(AnalysisError::InvalidToolList("empty tool name".to_owned()));
            }
            if seen.contains(&name) {
                return Err(AnalysisError::InvalidToolList(format!("duplicate tool: {name}")));
            }
            seen.push(name);
        }
        if seen.is_empty() {
            return Err(AnalysisError::InvalidToolList("no tools requested".to_owned()));
        }
        Ok(Self { names: seen })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: ToolId) -> &str {
        &self.names[id.index()]
    }

    pub fn id(&self, name: &str) -> Option<ToolId> {
        self.names.iter().position(|n| n == name).map(ToolId)
    }

    /// 名前から ID を引く。なければ [`AnalysisError::UnknownTool`]。
    pub fn require(&self, name: &str) -> AnalysisResult<ToolId> {
        self.id(name).ok_or_else(|| AnalysisError::UnknownTool(name.to_owned()))
    }

    pub fn ids(&self) -> impl Iterator<Item = ToolId> + '_ {
        (0..self.names.len()).map(ToolId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ToolId, &str)> + '_ {
        self.names.iter().enumerate().map(|(i, n)| (ToolId(i), n.as_str()))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl fmt::Display for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(","))
    }
}

/// 1 ツール分の列位置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolColumns {
    pub time: usize,
    pub result: usize,
}

/// 解決済みの列位置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    pub tools: ToolSet,
    /// formula 列（慣例で先頭）
    pub formula: usize,
    pub family: usize,
    pub kind: Option<usize>,
    /// `tools` と同じ順
    pub columns: Vec<ToolColumns>,
}

impl Schema {
    /// ヘッダとツール集合から列位置を解決する。
    pub fn resolve(header: &[String], tools: ToolSet, mode: ResultColumn) -> AnalysisResult<Self> {
        let find = |name: &str| header.iter().position(|col| col == name);
        let not_found = |name: String| AnalysisError::ColumnNotFound { column: name };

        let family = find(FAMILY_COLUMN).ok_or_else(|| not_found(FAMILY_COLUMN.to_owned()))?;
        let kind = find(TYPE_COLUMN);

        let mut columns = Vec::with_capacity(tools.len());
        for (_, name) in tools.iter() {
            let time = find(name).ok_or_else(|| not_found(name.to_owned()))?;
            let result_name = format!("{name}{RESULT_SUFFIX}");
            let result = match mode {
                ResultColumn::Adjacent => Some(time + 1).filter(|&idx| idx < header.len()),
                ResultColumn::ByName => find(&result_name),
            }
            .ok_or_else(|| not_found(result_name))?;
            columns.push(ToolColumns { time, result });
        }

        Ok(Self {
            tools,
            formula: 0,
            family,
            kind,
            columns,
        })
    }

    pub fn tool_columns(&self, id: ToolId) -> ToolColumns {
        self.columns[id.index()]
    }

    /// 行に必要な最大の列位置
    pub fn max_index(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|c| [c.time, c.result])
            .chain([self.formula, self.family])
            .chain(self.kind)
            .max()
            .unwrap_or(0)
    }
}
