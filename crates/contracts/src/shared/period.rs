use chrono::Datelike;
use thiserror::Error;

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("El mes debe estar entre 0 y 12 (0 para todo el año)")]
    InvalidMonth,
    #[error("El año debe estar entre 2000 y 2100")]
    InvalidYear,
}

/// Reporting period. `month == 0` means the whole year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    month: u32,
    year: i32,
}

impl Period {
    pub fn new(month: i64, year: i64) -> Result<Self, PeriodError> {
        if !(0..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth);
        }
        if !(MIN_YEAR as i64..=MAX_YEAR as i64).contains(&year) {
            return Err(PeriodError::InvalidYear);
        }
        Ok(Self {
            month: month as u32,
            year: year as i32,
        })
    }

    /// Current calendar month in local time
    pub fn current() -> Self {
        let now = chrono::Local::now();
        Self {
            month: now.month(),
            year: now.year(),
        }
    }

    pub fn whole_year(year: i32) -> Result<Self, PeriodError> {
        Self::new(0, year as i64)
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn is_whole_year(&self) -> bool {
        self.month == 0
    }

    pub fn contains(&self, year: i32, month: u32) -> bool {
        year == self.year && (self.month == 0 || month == self.month)
    }

    /// Half-open date range `[from, to)` as `YYYYMMDD` literals,
    /// the unambiguous format SQL Server accepts for any language setting.
    pub fn sql_bounds(&self) -> (String, String) {
        let y = self.year;
        match self.month {
            0 => (format!("{:04}0101", y), format!("{:04}0101", y + 1)),
            12 => (format!("{:04}1201", y), format!("{:04}0101", y + 1)),
            m => (
                format!("{:04}{:02}01", y, m),
                format!("{:04}{:02}01", y, m + 1),
            ),
        }
    }

    /// "2024-03" or "2024" for the whole year
    pub fn label(&self) -> String {
        if self.month == 0 {
            format!("{:04}", self.year)
        } else {
            format!("{:04}-{:02}", self.year, self.month)
        }
    }
}
