//! Projection output rows and horizon lengths.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::month::YearMonth;

/// Aggregates for one projected month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MonthData {
    pub month: YearMonth,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    /// Running balance after this month's net flow.
    pub balance: f64,
}

/// Number of months projected forward from the starting month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum Horizon {
    #[default]
    TwelveMonths,
    EighteenMonths,
    TwentyFourMonths,
    Custom(u32),
}

impl Horizon {
    pub fn months(self) -> usize {
        match self {
            Horizon::TwelveMonths => 12,
            Horizon::EighteenMonths => 18,
            Horizon::TwentyFourMonths => 24,
            Horizon::Custom(months) => months as usize,
        }
    }
}

impl From<u32> for Horizon {
    fn from(months: u32) -> Self {
        match months {
            12 => Horizon::TwelveMonths,
            18 => Horizon::EighteenMonths,
            24 => Horizon::TwentyFourMonths,
            other => Horizon::Custom(other),
        }
    }
}

impl From<Horizon> for u32 {
    fn from(horizon: Horizon) -> Self {
        horizon.months() as u32
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} months", self.months())
    }
}
