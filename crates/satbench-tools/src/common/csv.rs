//! CSV 出力

use std::io::Write;

/// 出力先に `csv::Writer` を被せる（改行は `\n`）。
///
/// 書き終えたら `flush()` してから元の writer を閉じること。
pub fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().terminator(csv::Terminator::Any(b'\n')).from_writer(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        let mut out = Vec::new();
        {
            let mut w = csv_writer(&mut out);
            w.write_record(["sat", "a,b", "say \"hi\"", "1.5"]).expect("write");
            w.write_record(["cr\rin", "lf\nin", "plain"]).expect("write");
            w.flush().expect("flush");
        }
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "sat,\"a,b\",\"say \"\"hi\"\"\",1.5\n\"cr\rin\",\"lf\nin\",plain\n"
        );
    }
}
