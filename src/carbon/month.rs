use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Calendar month of a usage record.
///
/// Records are labelled with a month name rather than a number. Declaration order is
/// calendar order, so the derived `Ord` sorts chronologically within a year.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown month name: '{0}'")]
pub struct UnknownMonth(pub String);

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// 1-based calendar number (Jan = 1).
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index as usize).copied())
    }

    /// Canonical three-letter name used for storage and labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Month::Jan => "January",
            Month::Feb => "February",
            Month::Mar => "March",
            Month::Apr => "April",
            Month::May => "May",
            Month::Jun => "June",
            Month::Jul => "July",
            Month::Aug => "August",
            Month::Sep => "September",
            Month::Oct => "October",
            Month::Nov => "November",
            Month::Dec => "December",
        }
    }
}

impl FromStr for Month {
    type Err = UnknownMonth;

    /// Accepts three-letter or full names in any casing ("jan", "JANUARY", "Sept").
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        if needle == "sept" {
            return Ok(Month::Sep);
        }

        Self::ALL
            .into_iter()
            .find(|month| {
                needle == month.as_str().to_ascii_lowercase()
                    || needle == month.full_name().to_ascii_lowercase()
            })
            .ok_or_else(|| UnknownMonth(value.to_string()))
    }
}

impl TryFrom<String> for Month {
    type Error = UnknownMonth;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for &'static str {
    fn from(month: Month) -> Self {
        month.as_str()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("jan".parse::<Month>().unwrap(), Month::Jan);
        assert_eq!("JAN".parse::<Month>().unwrap(), Month::Jan);
        assert_eq!("February".parse::<Month>().unwrap(), Month::Feb);
        assert_eq!(" dec ".parse::<Month>().unwrap(), Month::Dec);
        assert_eq!("Sept".parse::<Month>().unwrap(), Month::Sep);
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!("Janu".parse::<Month>().is_err());
        assert!("".parse::<Month>().is_err());
        assert!("13".parse::<Month>().is_err());
    }

    #[test]
    fn test_ordering_is_calendar_not_lexical() {
        let mut months = vec![Month::Dec, Month::Apr, Month::Aug, Month::Feb, Month::Jan];
        months.sort();
        assert_eq!(
            months,
            vec![Month::Jan, Month::Feb, Month::Apr, Month::Aug, Month::Dec]
        );
        // Lexically "Apr" < "Aug" < "Dec" < "Feb" < "Jan", which is wrong.
        assert!(Month::Jan < Month::Apr);
    }

    #[test]
    fn test_number_round_trip() {
        assert_eq!(Month::Jan.number(), 1);
        assert_eq!(Month::Dec.number(), 12);
        assert_eq!(Month::from_number(9), Some(Month::Sep));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&Month::Mar).unwrap();
        assert_eq!(json, "\"Mar\"");

        let parsed: Month = serde_json::from_str("\"march\"").unwrap();
        assert_eq!(parsed, Month::Mar);

        assert!(serde_json::from_str::<Month>("\"Smarch\"").is_err());
    }
}
