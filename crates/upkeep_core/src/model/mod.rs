mod catalog;
mod progress;
mod task;

pub use catalog::catalog;
pub use progress::{CustomTaskRecord, OccurrenceKey, ProgressRecord, TaskStatus};
pub use task::{Cadence, Task};

use crate::error::AppError;
use time::Month;

pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 3000;

pub const ALL_MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

pub fn month_from_number(number: u8) -> Result<Month, AppError> {
    Month::try_from(number)
        .map_err(|_| AppError::invalid_input(format!("month must be 1-12, got {number}")))
}

pub fn validate_year(year: i32) -> Result<i32, AppError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(AppError::invalid_input(format!(
            "year must be {MIN_YEAR}-{MAX_YEAR}, got {year}"
        )))
    }
}

/// Serde adapter storing a [`Month`] as its calendar number.
pub(crate) mod month_number {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use time::Month;

    pub fn serialize<S: Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*month))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Month, D::Error> {
        let number = u8::deserialize(deserializer)?;
        Month::try_from(number)
            .map_err(|_| de::Error::custom(format!("month out of range: {number}")))
    }
}
