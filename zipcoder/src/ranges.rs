//! Compact range encoding for sets of postal codes.
//!
//! A set such as `{78701, 78702, 78703, 78710}` is written as
//! `"78701-78703,78710"`: consecutive runs collapse to `start-end`,
//! singletons stand alone, and segments appear in ascending order.
//! Ranges are inclusive at both ends.

use std::collections::BTreeSet;

use crate::domain::{Code, InvalidCode};

/// Errors from decoding a range string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// A bound or singleton is not a valid code
    #[error(transparent)]
    InvalidCode(#[from] InvalidCode),

    /// Range start is after its end
    #[error("range {start}-{end} is reversed")]
    Reversed { start: Code, end: Code },

    /// Segment has more than one `-`
    #[error("malformed range segment {0:?}")]
    Malformed(String),
}

/// Encode a set of codes as comma-separated runs.
///
/// Input order and duplicates do not matter. Empty input gives `""`.
///
/// # Examples
///
/// ```
/// use zipcoder::domain::Code;
/// use zipcoder::ranges::combine;
///
/// let codes = ["12346", "12347", "12345", "78746"].map(|s| Code::parse(s).unwrap());
/// assert_eq!(combine(codes), "12345-12347,78746");
/// ```
pub fn combine<I>(codes: I) -> String
where
    I: IntoIterator<Item = Code>,
{
    let sorted: BTreeSet<Code> = codes.into_iter().collect();

    let mut segments = Vec::new();
    let mut run: Option<(Code, Code)> = None;

    for code in sorted {
        run = match run {
            Some((start, last)) if last.next() == Some(code) => Some((start, code)),
            Some((start, last)) => {
                segments.push(segment(start, last));
                Some((code, code))
            }
            None => Some((code, code)),
        };
    }

    if let Some((start, last)) = run {
        segments.push(segment(start, last));
    }

    segments.join(",")
}

fn segment(start: Code, last: Code) -> String {
    if start == last {
        start.to_string()
    } else {
        format!("{start}-{last}")
    }
}

/// Decode a range string into every code it covers, sorted ascending.
///
/// Whitespace around segments is ignored, as are empty segments.
pub fn breakout(ranges: &str) -> Result<Vec<Code>, RangeError> {
    let mut codes = BTreeSet::new();

    for part in ranges.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let mut bounds = part.split('-').map(str::trim);
        let first = bounds.next().unwrap_or_default();

        match (bounds.next(), bounds.next()) {
            (None, _) => {
                codes.insert(Code::parse(first)?);
            }
            (Some(last), None) => {
                let start = Code::parse(first)?;
                let end = Code::parse(last)?;
                if start > end {
                    return Err(RangeError::Reversed { start, end });
                }
                codes.extend(
                    (start.value()..=end.value()).filter_map(|n| Code::from_number(n).ok()),
                );
            }
            (Some(_), Some(_)) => return Err(RangeError::Malformed(part.to_string())),
        }
    }

    Ok(codes.into_iter().collect())
}

/// Codes present in both range strings, re-encoded.
pub fn intersect_ranges(a: &str, b: &str) -> Result<String, RangeError> {
    let a: BTreeSet<Code> = breakout(a)?.into_iter().collect();
    let b = breakout(b)?;
    Ok(combine(b.into_iter().filter(|code| a.contains(code))))
}

/// Parse a caller-supplied spec of codes and ranges, e.g. `"78703, 78701-78702"`.
///
/// The result is deduplicated and sorted.
pub fn parse_code_spec(spec: &str) -> Result<BTreeSet<Code>, RangeError> {
    Ok(breakout(spec)?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<Code> {
        list.iter().map(|s| Code::parse(s).unwrap()).collect()
    }

    fn shown(codes: &[Code]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn combine_collapses_runs() {
        let cases: [(&[&str], &str); 5] = [
            (&["12345", "12346", "12347"], "12345-12347"),
            (&["12347", "12346", "12345"], "12345-12347"),
            (&["12346", "12347", "12345"], "12345-12347"),
            (&["12346", "12347", "12345", "78746"], "12345-12347,78746"),
            (
                &["78748", "78746", "12346", "12347", "12345"],
                "12345-12347,78746,78748",
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(combine(codes(input)), expected, "input {input:?}");
        }
    }

    #[test]
    fn combine_empty_is_empty_string() {
        assert_eq!(combine(Vec::new()), "");
    }

    #[test]
    fn combine_ignores_duplicates() {
        assert_eq!(combine(codes(&["78701", "78701", "78702"])), "78701-78702");
    }

    #[test]
    fn combine_zero_pads() {
        assert_eq!(combine(codes(&["00601", "00602", "00705"])), "00601-00602,00705");
    }

    #[test]
    fn breakout_is_inclusive() {
        let out = breakout("78701-78703,78710").unwrap();
        assert_eq!(shown(&out), ["78701", "78702", "78703", "78710"]);
    }

    #[test]
    fn breakout_sorts_and_trims() {
        let out = breakout(" 78710 , 78701-78702,").unwrap();
        assert_eq!(shown(&out), ["78701", "78702", "78710"]);
    }

    #[test]
    fn breakout_empty() {
        assert!(breakout("").unwrap().is_empty());
    }

    #[test]
    fn breakout_rejects_bad_input() {
        assert!(matches!(breakout("100"), Err(RangeError::InvalidCode(_))));
        assert!(matches!(breakout("78701-787"), Err(RangeError::InvalidCode(_))));
        assert!(matches!(
            breakout("78705-78701"),
            Err(RangeError::Reversed { .. })
        ));
        assert!(matches!(
            breakout("78701-78702-78703"),
            Err(RangeError::Malformed(_))
        ));
    }

    #[test]
    fn intersect_keeps_shared_codes() {
        let city = "78701-78705,78710,78712,78717";
        assert_eq!(intersect_ranges("78703-78712", city).unwrap(), "78703-78705,78710,78712");
        assert_eq!(intersect_ranges("78613", city).unwrap(), "");
    }

    #[test]
    fn parse_code_spec_dedups() {
        let parsed = parse_code_spec("78703, 78701").unwrap();
        assert_eq!(shown(&parsed.into_iter().collect::<Vec<_>>()), ["78701", "78703"]);

        let parsed = parse_code_spec("78701-78703, 78702").unwrap();
        assert_eq!(
            shown(&parsed.into_iter().collect::<Vec<_>>()),
            ["78701", "78702", "78703"]
        );
    }
}
