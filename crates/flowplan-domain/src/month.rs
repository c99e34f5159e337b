//! Year-month tokens used as projection keys.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate, Utc};
use serde::{de::Deserializer, Deserialize, Serialize, Serializer};
use thiserror::Error;

const MAX_YEAR: i32 = 9999;

/// A calendar month, rendered as `YYYY-MM`.
///
/// Field order matters: the derived ordering compares `year` first, which
/// makes it agree with the lexical ordering of the rendered token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearMonthError {
    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),
    #[error("year {0} cannot be rendered as four digits")]
    YearOutOfRange(i32),
    #[error("malformed year-month token `{0}`, expected YYYY-MM")]
    Malformed(String),
}

impl YearMonth {
    /// Earliest representable month, `0000-01`.
    pub const MIN: YearMonth = YearMonth { year: 0, month: 1 };
    /// Latest representable month, `9999-12`.
    pub const MAX: YearMonth = YearMonth {
        year: MAX_YEAR,
        month: 12,
    };

    pub fn new(year: i32, month: u32) -> Result<Self, YearMonthError> {
        if !(1..=12).contains(&month) {
            return Err(YearMonthError::MonthOutOfRange(month));
        }
        if !(0..=MAX_YEAR).contains(&year) {
            return Err(YearMonthError::YearOutOfRange(year));
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`. Fails for dates outside years 0..=9999.
    pub fn from_date(date: NaiveDate) -> Result<Self, YearMonthError> {
        Self::new(date.year(), date.month())
    }

    /// Month containing today's UTC date.
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive()).unwrap_or(Self::MAX)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Steps forward `months` months, rolling over year boundaries.
    /// Returns `None` past [`YearMonth::MAX`].
    pub fn checked_add_months(&self, months: u32) -> Option<Self> {
        let index = self.index() + i64::from(months);
        (index <= Self::MAX.index()).then(|| Self::from_index(index))
    }

    /// Like [`Self::checked_add_months`] but saturates at [`YearMonth::MAX`].
    pub fn add_months(&self, months: u32) -> Self {
        self.checked_add_months(months).unwrap_or(Self::MAX)
    }

    pub fn succ(&self) -> Option<Self> {
        self.checked_add_months(1)
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: YearMonth) -> i64 {
        other.index() - self.index()
    }

    /// Up to `count` consecutive months beginning at `start`, stopping after
    /// [`YearMonth::MAX`].
    pub fn sequence(start: YearMonth, count: usize) -> impl Iterator<Item = YearMonth> {
        (0..count).map_while(move |offset| {
            u32::try_from(offset)
                .ok()
                .and_then(|offset| start.checked_add_months(offset))
        })
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || YearMonthError::Malformed(value.to_string());
        let bytes = value.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(malformed());
        }
        let digits_ok = bytes
            .iter()
            .enumerate()
            .all(|(idx, b)| idx == 4 || b.is_ascii_digit());
        if !digits_ok {
            return Err(malformed());
        }
        let year: i32 = value[..4].parse().map_err(|_| malformed())?;
        let month: u32 = value[5..].parse().map_err(|_| malformed())?;
        YearMonth::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(raw: &str) -> YearMonth {
        raw.parse().unwrap()
    }

    #[test]
    fn formats_zero_padded() {
        assert_eq!(YearMonth::new(2024, 3).unwrap().to_string(), "2024-03");
        assert_eq!(YearMonth::new(987, 11).unwrap().to_string(), "0987-11");
    }

    #[test]
    fn rejects_malformed_tokens() {
        for raw in ["2024-13", "2024-00", "2024-1", "24-01", "2024/01", "2024-0a", ""] {
            assert!(raw.parse::<YearMonth>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn add_months_rolls_over_years() {
        assert_eq!(ym("2024-11").add_months(3), ym("2025-02"));
        assert_eq!(ym("2024-12").succ(), Some(ym("2025-01")));
        assert_eq!(ym("2024-01").add_months(24), ym("2026-01"));
        assert_eq!(ym("2024-01").months_until(ym("2025-03")), 14);
    }

    #[test]
    fn arithmetic_stops_at_last_representable_month() {
        assert_eq!(ym("9999-11").checked_add_months(1), Some(YearMonth::MAX));
        assert_eq!(ym("9999-11").checked_add_months(2), None);
        assert_eq!(YearMonth::MAX.succ(), None);
        assert_eq!(ym("9998-06").add_months(40), YearMonth::MAX);
        assert_eq!(YearMonth::MIN.add_months(u32::MAX), YearMonth::MAX);

        let tail: Vec<String> = YearMonth::sequence(ym("9999-11"), 3)
            .map(|m| m.to_string())
            .collect();
        assert_eq!(tail, vec!["9999-11", "9999-12"]);
        assert!(tail.iter().all(|token| token.parse::<YearMonth>().is_ok()));
    }

    #[test]
    fn ordering_matches_lexical_order() {
        let mut months = vec![ym("2025-01"), ym("2024-12"), ym("2024-02")];
        let mut tokens: Vec<String> = months.iter().map(ToString::to_string).collect();
        months.sort();
        tokens.sort();
        let rendered: Vec<String> = months.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, tokens);
    }

    #[test]
    fn sequence_yields_consecutive_months() {
        let months: Vec<String> = YearMonth::sequence(ym("2024-11"), 3)
            .map(|m| m.to_string())
            .collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01"]);
        assert_eq!(YearMonth::sequence(ym("2024-11"), 0).count(), 0);
    }

    #[test]
    fn serde_uses_token_string() {
        let json = serde_json::to_string(&ym("2024-06")).unwrap();
        assert_eq!(json, "\"2024-06\"");
        let parsed: YearMonth = serde_json::from_str("\"2023-09\"").unwrap();
        assert_eq!(parsed, ym("2023-09"));
        assert!(serde_json::from_str::<YearMonth>("\"2023-9\"").is_err());
    }

    #[test]
    fn bridges_to_chrono_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let month = YearMonth::from_date(date).unwrap();
        assert_eq!(month, ym("2024-02"));
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        let far = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        assert_eq!(
            YearMonth::from_date(far),
            Err(YearMonthError::YearOutOfRange(10_000))
        );
    }
}
