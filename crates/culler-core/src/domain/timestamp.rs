//! CreationDate - イメージの作成日時
//!
//! プロバイダは作成日時を 1 種類の形式の文字列で返します:
//! ミリ秒精度の ISO-8601 UTC（`2020-01-03T00:00:00.000Z`）。
//!
//! この形式に完全一致しない値もエラーにはしません。元の文字列は保持したまま、
//! 並べ替えでは最も古い時刻として扱うので、不正な値は削除候補の先頭に来ます。

use chrono::{DateTime, NaiveDateTime, Utc};
use std::cmp::Ordering;
use std::fmt;

/// `chrono` format string of the canonical creation date form.
pub const CREATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationDate {
    raw: String,
    parsed: Option<DateTime<Utc>>,
}

impl CreationDate {
    /// Parse a provider creation date. Never fails.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = NaiveDateTime::parse_from_str(&raw, CREATION_DATE_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
            // chrono accepts a missing or longer fraction; only the exact form counts
            .filter(|time| time.format(CREATION_DATE_FORMAT).to_string() == raw);
        Self { raw, parsed }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_malformed(&self) -> bool {
        self.parsed.is_none()
    }

    /// Ordering key: the parsed instant, or `DateTime::<Utc>::MIN_UTC` when malformed.
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.parsed.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Compare so that the most recent date comes first.
    pub fn newest_first(&self, other: &Self) -> Ordering {
        other.sort_key().cmp(&self.sort_key())
    }
}

impl fmt::Display for CreationDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn parses_canonical_form() {
        let date = CreationDate::parse("2020-01-03T04:05:06.789Z");
        let expected = Utc.with_ymd_and_hms(2020, 1, 3, 4, 5, 6).unwrap()
            + chrono::Duration::milliseconds(789);

        assert!(!date.is_malformed());
        assert_eq!(date.sort_key(), expected);
        assert_eq!(date.as_str(), "2020-01-03T04:05:06.789Z");
    }

    #[rstest]
    #[case::no_millis("2020-01-03T00:00:00Z")]
    #[case::micros("2020-01-03T00:00:00.000000Z")]
    #[case::offset("2020-01-03T00:00:00.000+00:00")]
    #[case::date_only("2020-01-03")]
    #[case::garbage("yesterday")]
    #[case::empty("")]
    fn non_canonical_input_is_malformed(#[case] raw: &str) {
        let date = CreationDate::parse(raw);
        assert!(date.is_malformed());
        assert_eq!(date.sort_key(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(date.as_str(), raw);
    }

    #[test]
    fn malformed_sorts_after_valid_dates() {
        let valid = CreationDate::parse("1970-01-01T00:00:00.000Z");
        let malformed = CreationDate::parse("not a date");

        assert_eq!(valid.newest_first(&malformed), Ordering::Less);
        assert_eq!(malformed.newest_first(&valid), Ordering::Greater);
    }
}
