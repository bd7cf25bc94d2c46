//! 区切り文字付きテキストの表
//!
//! ベンチマーク結果ファイルは空白区切り（連続空白あり）かカンマ区切り。
//! 空トークンは捨てるので、整列用の空白はそのまま読める。

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// 区切り文字
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// ヘッダにカンマがあればカンマ、なければ空白
    #[default]
    Auto,
    Whitespace,
    Comma,
}

impl Delimiter {
    fn resolve(self, header_line: &str) -> Delimiter {
        match self {
            Delimiter::Auto if header_line.contains(',') => Delimiter::Comma,
            Delimiter::Auto => Delimiter::Whitespace,
            other => other,
        }
    }

    /// 1 行をトークンに分割する（空トークンは捨てる）。
    pub fn split(self, line: &str) -> Vec<String> {
        match self {
            Delimiter::Comma => line
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
            Delimiter::Whitespace | Delimiter::Auto => {
                line.split_whitespace().map(ToOwned::to_owned).collect()
            }
        }
    }
}

/// データ行
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRow {
    /// 元テキストでの行番号（1 始まり）
    pub line: usize,
    pub fields: Vec<String>,
}

/// ヘッダ付きの生の表
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// テキスト全体を読む。最初の空でない行がヘッダ。
    pub fn parse(text: &str, delimiter: Delimiter) -> AnalysisResult<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header_line) = lines.next().ok_or(AnalysisError::EmptyTable)?;
        let delimiter = delimiter.resolve(header_line);
        let header = delimiter.split(header_line);
        if header.is_empty() {
            return Err(AnalysisError::EmptyTable);
        }

        let rows = lines
            .map(|(line, text)| RawRow {
                line,
                fields: delimiter.split(text),
            })
            .collect();
        Ok(Self { header, rows })
    }

    /// 列名の最初の出現位置
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|col| col == name)
    }

    fn require_column(&self, name: &str) -> AnalysisResult<usize> {
        self.column(name).ok_or_else(|| AnalysisError::ColumnNotFound {
            column: name.to_owned(),
        })
    }

    /// `<tool>:result` 列からツール名を列挙する（ヘッダ順）。
    pub fn result_tools(&self) -> Vec<String> {
        self.header
            .iter()
            .filter_map(|col| col.strip_suffix(":result"))
            .filter(|tool| !tool.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    /// 1 文字の区切りで書き出す。
    pub fn write<W: Write>(&self, writer: &mut W, sep: char) -> io::Result<()> {
        let mut buf = [0_u8; 4];
        let sep = sep.encode_utf8(&mut buf).as_bytes();
        write_fields(writer, &self.header, sep)?;
        for row in &self.rows {
            write_fields(writer, &row.fields, sep)?;
        }
        Ok(())
    }
}

fn write_fields<W: Write>(writer: &mut W, fields: &[String], sep: &[u8]) -> io::Result<()> {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            writer.write_all(sep)?;
        }
        writer.write_all(field.as_bytes())?;
    }
    writer.write_all(b"\n")
}

/// 結合の既定キー列
pub const DEFAULT_MERGE_KEYS: [&str; 3] = ["formula", "type", "family"];

/// 2 つの結果表をキー列で内部結合する。
///
/// `drop_left` の列を左表から除いたうえで、左表の列 + 右表のキー以外の列を出力する。
/// 行順は左表順、同じキーに複数の右行があれば右表順に展開する。
pub fn merge(
    left: &RawTable,
    right: &RawTable,
    keys: &[&str],
    drop_left: &[&str],
) -> AnalysisResult<RawTable> {
    let dropped: HashSet<usize> =
        drop_left.iter().map(|name| left.require_column(name)).collect::<AnalysisResult<_>>()?;
    let left_keys: Vec<usize> =
        keys.iter().map(|name| left.require_column(name)).collect::<AnalysisResult<_>>()?;
    let right_keys: Vec<usize> =
        keys.iter().map(|name| right.require_column(name)).collect::<AnalysisResult<_>>()?;

    if let Some(name) = keys.iter().find(|name| drop_left.contains(*name)) {
        return Err(AnalysisError::InvalidMerge(format!("cannot drop key column {name}")));
    }

    let left_cols: Vec<usize> = (0..left.header.len()).filter(|i| !dropped.contains(i)).collect();
    let right_cols: Vec<usize> =
        (0..right.header.len()).filter(|i| !right_keys.contains(i)).collect();

    let header = left_cols
        .iter()
        .map(|&i| left.header[i].clone())
        .chain(right_cols.iter().map(|&i| right.header[i].clone()))
        .collect();

    let full_row = |table: &RawTable, row: &RawRow| -> AnalysisResult<()> {
        if row.fields.len() < table.header.len() {
            return Err(AnalysisError::MalformedRow {
                line: row.line,
                expected: table.header.len(),
                found: row.fields.len(),
            });
        }
        Ok(())
    };

    // キー → 右表の行（右表順）
    let mut right_index: HashMap<Vec<&str>, Vec<&RawRow>> =
        HashMap::with_capacity(right.rows.len());
    for row in &right.rows {
        full_row(right, row)?;
        let key = right_keys.iter().map(|&i| row.fields[i].as_str()).collect();
        right_index.entry(key).or_default().push(row);
    }

    let mut rows = Vec::new();
    for row in &left.rows {
        full_row(left, row)?;
        let key: Vec<&str> = left_keys.iter().map(|&i| row.fields[i].as_str()).collect();
        let Some(matches) = right_index.get(&key) else {
            continue;
        };
        for right_row in matches {
            let fields = left_cols
                .iter()
                .map(|&i| row.fields[i].clone())
                .chain(right_cols.iter().map(|&i| right_row.fields[i].clone()))
                .collect();
            rows.push(RawRow {
                line: rows.len() + 2,
                fields,
            });
        }
    }

    log::debug!(
        "merged {} left rows with {} right rows into {} rows",
        left.rows.len(),
        right.rows.len(),
        rows.len()
    );
    Ok(RawTable { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_collapses_repeated_spaces() {
        let text = "formula  type family   a a:result\n\nf1 ltl  fam  1.0   SAT\n";
        let table = RawTable::parse(text, Delimiter::Auto).expect("parse");
        assert_eq!(table.header, vec!["formula", "type", "family", "a", "a:result"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].line, 3);
        assert_eq!(table.rows[0].fields, vec!["f1", "ltl", "fam", "1.0", "SAT"]);
    }

    #[test]
    fn auto_delimiter_detects_commas() {
        let text = "formula,type,family,a,a:result\r\nf1,ltl,fam,1.0,SAT\r\n";
        let table = RawTable::parse(text, Delimiter::Auto).expect("parse");
        assert_eq!(table.header.len(), 5);
        assert_eq!(table.rows[0].fields[4], "SAT");

        // 空フィールドは捨てられる
        let table = RawTable::parse("a,b,,c\n1,,2,3\n", Delimiter::Comma).expect("parse");
        assert_eq!(table.header, vec!["a", "b", "c"]);
        assert_eq!(table.rows[0].fields, vec!["1", "2", "3"]);
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(RawTable::parse("", Delimiter::Auto), Err(AnalysisError::EmptyTable)));
        assert!(matches!(
            RawTable::parse("\n  \n", Delimiter::Whitespace),
            Err(AnalysisError::EmptyTable)
        ));
    }

    #[test]
    fn result_tools_follow_header_order() {
        let table =
            RawTable::parse("formula type family b b:result a a:result\n", Delimiter::Auto)
                .expect("parse");
        assert_eq!(table.result_tools(), vec!["b", "a"]);
    }

    #[test]
    fn merge_replaces_dropped_tool_columns() {
        let left = RawTable::parse(
            "formula type family black black:result ls4 ls4:result\n\
             f1 ltl fa 1.0 SAT 9.0 SAT\n\
             f2 ltl fb 2.0 UNSAT 9.0 UNSAT\n\
             f3 ltl fb 3.0 SAT 9.0 SAT\n",
            Delimiter::Auto,
        )
        .expect("left");
        let right = RawTable::parse(
            "formula type family ls4 ls4:result\n\
             f2 ltl fb 0.5 UNSAT\n\
             f1 ltl fa 0.7 SAT\n",
            Delimiter::Auto,
        )
        .expect("right");

        let merged =
            merge(&left, &right, &DEFAULT_MERGE_KEYS, &["ls4", "ls4:result"]).expect("merge");
        assert_eq!(
            merged.header,
            vec!["formula", "type", "family", "black", "black:result", "ls4", "ls4:result"]
        );
        // 左表の順序、f3 は右にないので落ちる
        assert_eq!(merged.rows.len(), 2);
        assert_eq!(merged.rows[0].fields, vec!["f1", "ltl", "fa", "1.0", "SAT", "0.7", "SAT"]);
        assert_eq!(merged.rows[1].fields, vec!["f2", "ltl", "fb", "2.0", "UNSAT", "0.5", "UNSAT"]);

        let mut out = Vec::new();
        merged.write(&mut out, ' ').expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("formula type family black black:result ls4 ls4:result\n"));
        assert!(text.ends_with("f2 ltl fb 2.0 UNSAT 0.5 UNSAT\n"));
    }

    #[test]
    fn merge_keeps_left_order_then_right_order_for_shuffled_right_table() {
        let n = 200;
        let mut left_text = String::from("formula type family a a:result\n");
        for i in 0..n {
            left_text.push_str(&format!("f{i} ltl fam {i}.0 SAT\n"));
        }
        // 右表は逆順、偶数番は 2 行ずつ
        let mut right_text = String::from("formula type family b b:result\n");
        for i in (0..n).rev() {
            right_text.push_str(&format!("f{i} ltl fam {i}.5 UNSAT\n"));
            if i % 2 == 0 {
                right_text.push_str(&format!("f{i} ltl fam {i}.9 UNSAT\n"));
            }
        }
        let left = RawTable::parse(&left_text, Delimiter::Auto).expect("left");
        let right = RawTable::parse(&right_text, Delimiter::Auto).expect("right");

        let merged = merge(&left, &right, &DEFAULT_MERGE_KEYS, &[]).expect("merge");
        assert_eq!(merged.rows.len(), n + n / 2);

        let mut expected = Vec::new();
        for i in 0..n {
            expected.push((format!("f{i}"), format!("{i}.5")));
            if i % 2 == 0 {
                expected.push((format!("f{i}"), format!("{i}.9")));
            }
        }
        let actual: Vec<(String, String)> =
            merged.rows.iter().map(|r| (r.fields[0].clone(), r.fields[5].clone())).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn merge_reports_missing_columns() {
        let left = RawTable::parse("formula family a a:result\n", Delimiter::Auto).expect("left");
        let right = RawTable::parse("formula type family\n", Delimiter::Auto).expect("right");
        let err = merge(&left, &right, &DEFAULT_MERGE_KEYS, &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound { column } if column == "type"));

        let err = merge(&right, &right, &DEFAULT_MERGE_KEYS, &["nope"]).unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound { column } if column == "nope"));
    }

    #[test]
    fn merge_rejects_short_rows() {
        let left =
            RawTable::parse("formula type family a\nf1 ltl\n", Delimiter::Auto).expect("left");
        let right = RawTable::parse("formula type family b\n", Delimiter::Auto).expect("right");
        let err = merge(&left, &right, &DEFAULT_MERGE_KEYS, &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedRow { line: 2, expected: 4, found: 2 }));
    }
}
