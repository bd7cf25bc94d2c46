//! データ行を型付きインスタンスに変換する

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult, Warning};
use crate::outcome::{classify, AggregateOutcome, TimePolicy, ToolRecord};
use crate::schema::{ResultColumn, Schema, ToolId, ToolSet};
use crate::table::{Delimiter, RawRow, RawTable};

/// フィールド不足の行の扱い
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// 解析を中断する
    #[default]
    Strict,
    /// 警告を出して読み飛ばす
    Lenient,
}

/// 読み込み設定
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: Delimiter,
    pub result_column: ResultColumn,
    pub row_policy: RowPolicy,
    pub time_policy: TimePolicy,
}

/// 1 フォーミュラ分のベンチマーク結果
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub formula_id: String,
    pub family: String,
    /// type 列（ヘッダにあれば）
    pub kind: Option<String>,
    /// 元テキストでの行番号
    pub line: usize,
    /// [`ToolSet`] と同じ順
    records: Vec<ToolRecord>,
}

impl Instance {
    pub fn new(
        formula_id: impl Into<String>,
        family: impl Into<String>,
        line: usize,
        records: Vec<ToolRecord>,
    ) -> Self {
        Self {
            formula_id: formula_id.into(),
            family: family.into(),
            kind: None,
            line,
            records,
        }
    }

    #[inline]
    pub fn record(&self, tool: ToolId) -> &ToolRecord {
        &self.records[tool.index()]
    }

    pub fn records(&self) -> &[ToolRecord] {
        &self.records
    }

    pub fn aggregate(&self) -> AggregateOutcome {
        AggregateOutcome::of(&self.records)
    }
}

/// 読み込み結果（インスタンス列 + 収集した警告）
#[derive(Clone, Debug)]
pub struct ResultTable {
    pub tools: ToolSet,
    pub instances: Vec<Instance>,
    pub warnings: Vec<Warning>,
}

impl ResultTable {
    /// テキストを読み、指定ツールのインスタンス列を作る。
    pub fn from_text(text: &str, tools: ToolSet, options: LoadOptions) -> AnalysisResult<Self> {
        let raw = RawTable::parse(text, options.delimiter)?;
        Self::from_raw(&raw, tools, options)
    }

    pub fn from_raw(raw: &RawTable, tools: ToolSet, options: LoadOptions) -> AnalysisResult<Self> {
        let schema = Schema::resolve(&raw.header, tools, options.result_column)?;
        let (instances, warnings) = load(&schema, &raw.rows, options)?;
        log::debug!(
            "loaded {} instances for tools [{}] with {} warnings",
            instances.len(),
            schema.tools,
            warnings.len()
        );
        Ok(Self {
            tools: schema.tools,
            instances,
            warnings,
        })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// family で絞り込んだインスタンス
    pub fn family<'a>(&'a self, family: &'a str) -> impl Iterator<Item = &'a Instance> + 'a {
        self.instances.iter().filter(move |inst| inst.family == family)
    }
}

/// 解決済みスキーマで行を読み込む。
///
/// 行順を保つ。時間の扱いは `options.time_policy`、短い行は `options.row_policy` に従う。
pub fn load<'a, I>(
    schema: &Schema,
    rows: I,
    options: LoadOptions,
) -> AnalysisResult<(Vec<Instance>, Vec<Warning>)>
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let expected = schema.max_index() + 1;
    let mut instances = Vec::new();
    let mut warnings = Vec::new();

    for row in rows {
        if row.fields.len() < expected {
            match options.row_policy {
                RowPolicy::Strict => {
                    return Err(AnalysisError::MalformedRow {
                        line: row.line,
                        expected,
                        found: row.fields.len(),
                    });
                }
                RowPolicy::Lenient => {
                    let warning = Warning::MalformedRow {
                        line: row.line,
                        expected,
                        found: row.fields.len(),
                    };
                    log::warn!("{warning}");
                    warnings.push(warning);
                    continue;
                }
            }
        }

        let formula_id = &row.fields[schema.formula];
        let mut records = Vec::with_capacity(schema.tools.len());
        for (id, name) in schema.tools.iter() {
            let cols = schema.tool_columns(id);
            let record = classify(&row.fields[cols.time], &row.fields[cols.result]);
            if let Some(warning) = options.time_policy.check(&record, row.line, formula_id, name)? {
                log::warn!("{warning}");
                warnings.push(warning);
            }
            records.push(record);
        }

        let mut instance =
            Instance::new(formula_id.clone(), row.fields[schema.family].clone(), row.line, records);
        instance.kind = schema.kind.map(|idx| row.fields[idx].clone());
        instances.push(instance);
    }

    Ok((instances, warnings))
}
