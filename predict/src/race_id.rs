//! The 12-character composite race identifier: `YYYYVVMMDDRR`, encoding year,
//! venue code, meeting round, day-of-meeting and race number.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRaceId {
    #[error("race id {0:?} must be exactly 12 characters, got {1}")]
    WrongLength(String, usize),

    #[error("race id {0:?} contains a non-digit character")]
    NonDigit(String),

    #[error("race id {0:?} has unknown venue code {1:?}; JRA venues are 01..=10")]
    UnknownVenue(String, String),
}

/// A validated 12-character race identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct RaceId(String);

impl RaceId {
    pub const LEN: usize = 12;

    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidRaceId> {
        let raw = raw.into();
        if raw.len() != Self::LEN {
            return Err(InvalidRaceId::WrongLength(raw.clone(), raw.len()));
        }
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidRaceId::NonDigit(raw));
        }
        let venue = &raw[4..6];
        let venue_num: u8 = venue.parse().unwrap();
        if !(1..=10).contains(&venue_num) {
            return Err(InvalidRaceId::UnknownVenue(raw.clone(), venue.to_string()));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> u16 {
        self.0[0..4].parse().unwrap()
    }

    pub fn venue_code(&self) -> &str {
        &self.0[4..6]
    }

    pub fn meeting_round(&self) -> &str {
        &self.0[6..8]
    }

    pub fn day_of_meeting(&self) -> &str {
        &self.0[8..10]
    }

    pub fn race_number(&self) -> u8 {
        self.0[10..12].parse().unwrap()
    }

    /// `true` for venues 01..=10, the JRA-member tracks this workspace covers.
    pub fn is_jra(&self) -> bool {
        true // parse() already rejects every other venue code
    }
}

impl Display for RaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RaceId {
    type Err = InvalidRaceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_id() {
        let id = RaceId::parse("202506010801").unwrap();
        assert_eq!(2025, id.year());
        assert_eq!("06", id.venue_code());
        assert_eq!("01", id.meeting_round());
        assert_eq!("08", id.day_of_meeting());
        assert_eq!(1, id.race_number());
        assert_eq!("202506010801", id.as_str());
    }

    #[test]
    fn wrong_length() {
        let err = RaceId::parse("2025060108011").unwrap_err();
        assert_eq!(InvalidRaceId::WrongLength("2025060108011".into(), 13), err);
    }

    #[test]
    fn non_digit() {
        let err = RaceId::parse("20250a010801").unwrap_err();
        assert_eq!(InvalidRaceId::NonDigit("20250a010801".into()), err);
    }

    #[test]
    fn unknown_venue() {
        let err = RaceId::parse("202511010801").unwrap_err();
        assert_eq!(
            InvalidRaceId::UnknownVenue("202511010801".into(), "11".into()),
            err
        );
    }

    #[test]
    fn venue_boundaries() {
        assert!(RaceId::parse("202501010801").is_ok());
        assert!(RaceId::parse("202510010801").is_ok());
        assert!(RaceId::parse("202500010801").is_err());
    }
}
