//! JSON レポートと警告のサマリ

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use satbench_core::Warning;

/// バイナリ共通の JSON ラッパー（`body` のフィールドはトップレベルに展開される）
#[derive(Debug, Serialize)]
pub struct Report<'a, T: Serialize> {
    pub command: &'static str,
    pub generated_at: String,
    pub input: String,
    pub warnings: &'a [Warning],
    #[serde(flatten)]
    pub body: T,
}

impl<'a, T: Serialize> Report<'a, T> {
    pub fn new(command: &'static str, input: &Path, warnings: &'a [Warning], body: T) -> Self {
        Self::at(Utc::now(), command, input, warnings, body)
    }

    pub fn at(
        now: DateTime<Utc>,
        command: &'static str,
        input: &Path,
        warnings: &'a [Warning],
        body: T,
    ) -> Self {
        Self {
            command,
            generated_at: now.to_rfc3339(),
            input: input.display().to_string(),
            warnings,
            body,
        }
    }

    pub fn write_json<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self).context("failed to serialize report")?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// 種類ごとの件数（ラベル順）
pub fn count_warnings(warnings: &[Warning]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for warning in warnings {
        *counts.entry(warning.label()).or_insert(0) += 1;
    }
    counts
}

/// 最後に 1 行だけ stderr にまとめる。警告がなければ何も出さない。
pub fn print_warning_summary(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    let detail = count_warnings(warnings)
        .into_iter()
        .map(|(label, n)| format!("{label}={n}"))
        .collect::<Vec<_>>()
        .join(", ");
    eprintln!("warnings: {} ({detail})", warnings.len());
}
