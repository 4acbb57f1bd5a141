use serde::{Deserialize, Serialize};
use skybook_core::FareClass;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// A seat such as "12C": row 1-99 followed by a column letter A-K.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatCode {
    row: u8,
    column: char,
}

impl SeatCode {
    pub fn parse(raw: &str) -> Result<Self, SeatCodeError> {
        let raw = raw.trim();
        let mut chars = raw.chars();
        let column = chars
            .next_back()
            .map(|c| c.to_ascii_uppercase())
            .ok_or_else(|| SeatCodeError::Malformed(raw.to_string()))?;
        let row_part = chars.as_str();

        // 1-99, no sign and no leading zero
        let row_ok = matches!(row_part.len(), 1 | 2)
            && row_part.bytes().all(|b| b.is_ascii_digit())
            && !row_part.starts_with('0');
        if !('A'..='K').contains(&column) || !row_ok {
            return Err(SeatCodeError::Malformed(raw.to_string()));
        }
        let row: u8 = row_part
            .parse()
            .map_err(|_| SeatCodeError::Malformed(raw.to_string()))?;

        Ok(Self { row, column })
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn column(&self) -> char {
        self.column
    }
}

impl fmt::Display for SeatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

impl TryFrom<String> for SeatCode {
    type Error = SeatCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SeatCode::parse(&value)
    }
}

impl From<SeatCode> for String {
    fn from(value: SeatCode) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeatCodeError {
    #[error("Malformed seat code: {0:?}")]
    Malformed(String),
}

/// Booked seats for one flight and cabin, as seen when the wizard opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatMapSnapshot {
    pub flight_id: Uuid,
    pub fare_class: FareClass,
    booked: HashSet<SeatCode>,
}

impl SeatMapSnapshot {
    /// Unparseable codes from the collaborator cannot be chosen anyway and are skipped.
    pub fn new(flight_id: Uuid, fare_class: FareClass, booked: impl IntoIterator<Item = String>) -> Self {
        let booked = booked
            .into_iter()
            .filter_map(|raw| SeatCode::parse(&raw).ok())
            .collect();
        Self { flight_id, fare_class, booked }
    }

    pub fn is_booked(&self, seat: &SeatCode) -> bool {
        self.booked.contains(seat)
    }

    pub fn booked_count(&self) -> usize {
        self.booked.len()
    }
}
