//! ツールの判定の分類
//!
//! 表のセル（時間・結果）から [`ToolRecord`] を作り、
//! 全ツールの判定からインスタンス単位の [`AggregateOutcome`] を導く。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult, Warning};

/// 1 ツールの判定
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Sat,
    Unsat,
    /// タイムアウト・クラッシュ・その他すべてのトークン
    Error,
}

impl Outcome {
    /// 結果トークンを正規化して判定に変換する。
    pub fn from_token(raw: &str) -> Self {
        let token = raw.trim();
        if token.eq_ignore_ascii_case("SAT") {
            Outcome::Sat
        } else if token.eq_ignore_ascii_case("UNSAT") {
            Outcome::Unsat
        } else {
            Outcome::Error
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Sat => "SAT",
            Outcome::Unsat => "UNSAT",
            Outcome::Error => "ERROR",
        }
    }

    /// SAT または UNSAT
    pub fn is_definitive(self) -> bool {
        matches!(self, Outcome::Sat | Outcome::Unsat)
    }

    /// SAT と UNSAT の組み合わせかどうか
    pub fn contradicts(self, other: Outcome) -> bool {
        matches!(
            (self, other),
            (Outcome::Sat, Outcome::Unsat) | (Outcome::Unsat, Outcome::Sat)
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1 インスタンスに対する 1 ツールの結果
#[derive(Clone, Debug, PartialEq)]
pub struct ToolRecord {
    pub raw_time: String,
    pub raw_result: String,
    pub outcome: Outcome,
    /// outcome が SAT/UNSAT かつ時間が有限の数値のときだけ Some
    pub numeric_time: Option<f64>,
}

impl ToolRecord {
    /// 判定は SAT/UNSAT なのに時間が読めなかった
    pub fn has_malformed_time(&self) -> bool {
        self.outcome.is_definitive() && self.numeric_time.is_none()
    }

    /// 判定が SAT/UNSAT（棒グラフの「解けた」）
    pub fn is_solved(&self) -> bool {
        self.outcome.is_definitive()
    }
}

/// 時間セルを有限の数値として読む。
pub fn parse_time(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|t| t.is_finite())
}

/// セルの組から [`ToolRecord`] を作る（副作用なし）。
///
/// 結果トークンが SAT/UNSAT 以外なら時間の内容にかかわらず ERROR になる。
pub fn classify(raw_time: &str, raw_result: &str) -> ToolRecord {
    let outcome = Outcome::from_token(raw_result);
    let numeric_time = if outcome.is_definitive() {
        parse_time(raw_time)
    } else {
        None
    };
    ToolRecord {
        raw_time: raw_time.to_owned(),
        raw_result: raw_result.to_owned(),
        outcome,
        numeric_time,
    }
}

/// 判定付きで時間が数値でない行の扱い
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePolicy {
    /// 警告を出し、判定はそのままで時間なしとして扱う
    #[default]
    Lenient,
    /// 解析を中断する
    Strict,
}

impl TimePolicy {
    /// レコードにポリシーを適用する。lenient なら警告を返す。
    pub fn check(
        self,
        record: &ToolRecord,
        line: usize,
        formula_id: &str,
        tool: &str,
    ) -> AnalysisResult<Option<Warning>> {
        if !record.has_malformed_time() {
            return Ok(None);
        }
        match self {
            TimePolicy::Lenient => Ok(Some(Warning::MalformedTime {
                line,
                formula_id: formula_id.to_owned(),
                tool: tool.to_owned(),
                raw_time: record.raw_time.clone(),
            })),
            TimePolicy::Strict => Err(AnalysisError::MalformedTime {
                line,
                tool: tool.to_owned(),
                raw_time: record.raw_time.clone(),
            }),
        }
    }
}

/// インスタンス単位の判定
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregateOutcome {
    Sat,
    Unsat,
    /// SAT と UNSAT が両方現れた
    Inconsistent,
    /// どのツールも確定判定を出していない
    Error,
}

impl AggregateOutcome {
    pub fn of<'a>(records: impl IntoIterator<Item = &'a ToolRecord>) -> Self {
        let mut sat = false;
        let mut unsat = false;
        for record in records {
            match record.outcome {
                Outcome::Sat => sat = true,
                Outcome::Unsat => unsat = true,
                Outcome::Error => {}
            }
        }
        match (sat, unsat) {
            (true, true) => AggregateOutcome::Inconsistent,
            (true, false) => AggregateOutcome::Sat,
            (false, true) => AggregateOutcome::Unsat,
            (false, false) => AggregateOutcome::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AggregateOutcome::Sat => "SAT",
            AggregateOutcome::Unsat => "UNSAT",
            AggregateOutcome::Inconsistent => "INCONSISTENT",
            AggregateOutcome::Error => "ERROR",
        }
    }

    /// 比較・カテゴリ集計に使える（SAT のみ or UNSAT のみ）
    pub fn is_usable(self) -> bool {
        matches!(self, AggregateOutcome::Sat | AggregateOutcome::Unsat)
    }
}

impl fmt::Display for AggregateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_definitive_with_numeric_time() {
        let r = classify("1.25", "SAT");
        assert_eq!(r.outcome, Outcome::Sat);
        assert_eq!(r.numeric_time, Some(1.25));
        assert!(!r.has_malformed_time());

        let r = classify(" 3 ", " unsat ");
        assert_eq!(r.outcome, Outcome::Unsat);
        assert_eq!(r.numeric_time, Some(3.0));
    }

    #[test]
    fn classify_other_tokens_as_error() {
        for token in ["", "err", "error", "TIMEOUT", "SATISFIABLE", "-"] {
            let r = classify("12.0", token);
            assert_eq!(r.outcome, Outcome::Error, "token {token:?}");
            assert_eq!(r.numeric_time, None);
            assert!(!r.has_malformed_time());
        }
    }

    #[test]
    fn classify_keeps_verdict_when_time_is_malformed() {
        let r = classify("err", "SAT");
        assert_eq!(r.outcome, Outcome::Sat);
        assert_eq!(r.numeric_time, None);
        assert!(r.has_malformed_time());

        // inf / NaN は有限値ではない
        assert!(classify("inf", "UNSAT").has_malformed_time());
        assert!(classify("NaN", "SAT").has_malformed_time());
    }

    #[test]
    fn classify_is_idempotent_on_canonical_tokens() {
        for (time, result) in [("0.5", "SAT"), ("17", "UNSAT")] {
            let first = classify(time, result);
            let second = classify(&first.raw_time, first.outcome.as_str());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn time_policy_lenient_warns_strict_fails() {
        let r = classify("err", "UNSAT");
        let warning = TimePolicy::Lenient.check(&r, 4, "f4", "black").expect("lenient");
        assert!(matches!(warning, Some(Warning::MalformedTime { line: 4, .. })));

        let err = TimePolicy::Strict.check(&r, 4, "f4", "black").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedTime { line: 4, .. }));

        let ok = classify("1.0", "SAT");
        assert!(TimePolicy::Strict.check(&ok, 1, "f1", "black").expect("ok").is_none());
    }

    #[test]
    fn aggregate_outcome_combines_verdicts() {
        let sat = classify("1", "SAT");
        let unsat = classify("1", "UNSAT");
        let err = classify("TO", "TIMEOUT");
        assert_eq!(AggregateOutcome::of([&sat, &err]), AggregateOutcome::Sat);
        assert_eq!(AggregateOutcome::of([&err, &unsat]), AggregateOutcome::Unsat);
        assert_eq!(AggregateOutcome::of([&sat, &unsat]), AggregateOutcome::Inconsistent);
        assert_eq!(AggregateOutcome::of([&err, &err]), AggregateOutcome::Error);
        assert_eq!(AggregateOutcome::of(std::iter::empty()), AggregateOutcome::Error);
    }

    #[test]
    fn contradicts_only_for_sat_unsat_pairs() {
        assert!(Outcome::Sat.contradicts(Outcome::Unsat));
        assert!(Outcome::Unsat.contradicts(Outcome::Sat));
        assert!(!Outcome::Sat.contradicts(Outcome::Error));
        assert!(!Outcome::Sat.contradicts(Outcome::Sat));
    }
}
