//! Core entities: races, horses, recorded results and the prediction-input
//! shapes (`RaceEntry`, `ShutubaData`) and prediction-output shape
//! (`PredictionResult`). These mirror the read-only database contract in
//! spirit but carry no storage concerns of their own.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::race_id::RaceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    Turf,
    Dirt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackCondition {
    Good,
    SlightlyHeavy,
    Heavy,
    Bad,
    Unknown,
}

impl TrackCondition {
    /// The two-way grouping used by the pedigree factor: firm-ish vs soft-ish.
    pub fn track_type(&self) -> Option<PedigreeTrackType> {
        match self {
            TrackCondition::Good | TrackCondition::SlightlyHeavy => Some(PedigreeTrackType::Good),
            TrackCondition::Heavy | TrackCondition::Bad => Some(PedigreeTrackType::Heavy),
            TrackCondition::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PedigreeTrackType {
    Good,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    G1,
    G2,
    G3,
    Listed,
    OpenClass,
    Conditional,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Colt,
    Filly,
    Gelding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub date: NaiveDate,
    pub venue_name: String,
    pub race_number: u8,
    pub distance_metres: u16,
    pub surface: Surface,
    pub track_condition: TrackCondition,
    pub grade: Grade,
    pub weather: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horse {
    pub id: String,
    pub name: String,
    pub sex: Sex,
    pub birth_year: u16,
    pub sire_name: Option<String>,
    pub dam_sire_name: Option<String>,
}

/// One row per horse per race: the recorded outcome used both to train the
/// model and to build the leak-free `PastResultRecord` history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub race_id: RaceId,
    pub horse_id: String,
    /// 0 means did-not-finish.
    pub finish_position: u8,
    pub bracket_number: u8,
    pub horse_number: u8,
    pub odds: Option<f64>,
    pub popularity: Option<u8>,
    pub body_weight: Option<u16>,
    pub body_weight_delta: Option<i16>,
    pub finish_time_seconds: Option<f64>,
    pub margin: Option<String>,
    pub last_3f_seconds: Option<f64>,
    pub sex: Sex,
    pub age: u8,
    pub impost_kg: f64,
    /// "p1-p2-p3-p4", p1 is the first-corner position.
    pub passing_order: Option<String>,
}

impl RaceResult {
    pub fn did_not_finish(&self) -> bool {
        self.finish_position == 0
    }

    pub fn finished_in_top3(&self) -> bool {
        !self.did_not_finish() && self.finish_position <= 3
    }
}

/// A single past result as returned by the past-results repository: a denormalized
/// snapshot carrying everything the factor calculators need, without a live
/// foreign-key join back to the race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastResultRecord {
    pub race_id: RaceId,
    pub race_date: NaiveDate,
    pub surface: Surface,
    pub distance_metres: u16,
    pub finish_position: u8,
    pub field_size: u16,
    pub finish_time_seconds: Option<f64>,
    pub last_3f_seconds: Option<f64>,
    pub odds: Option<f64>,
    pub popularity: Option<u8>,
    pub passing_order: Option<String>,
    pub total_runners: u16,
}

impl PastResultRecord {
    pub fn did_not_finish(&self) -> bool {
        self.finish_position == 0
    }
}

/// One entrant in an upcoming race, as known before the result exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceEntry {
    pub horse_id: String,
    pub horse_name: String,
    pub horse_number: u8,
    pub bracket_number: u8,
    pub jockey_id: String,
    pub jockey_name: String,
    pub impost_kg: f64,
    pub sex: Option<Sex>,
    pub age: Option<u8>,
    pub odds: Option<f64>,
    pub popularity: Option<u8>,
    pub body_weight: Option<u16>,
    pub body_weight_delta: Option<i16>,
}

/// The shutuba (entry list) bundle: everything the prediction service needs
/// for one race, before results exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutubaData {
    pub race_id: RaceId,
    pub race_name: String,
    pub race_number: u8,
    pub venue_name: String,
    pub distance_metres: u16,
    pub surface: Surface,
    pub track_condition: TrackCondition,
    pub date: NaiveDate,
    pub entries: Vec<RaceEntry>,
}

impl ShutubaData {
    pub fn field_size(&self) -> usize {
        self.entries.len()
    }
}

/// The seven analytical factor names, in the fixed order used by the
/// aggregator, the feature builder and every reported table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum FactorName {
    PastResults,
    CourseFit,
    TimeIndex,
    Last3f,
    Popularity,
    Pedigree,
    RunningStyle,
}

impl FactorName {
    pub const ALL: [FactorName; 7] = [
        FactorName::PastResults,
        FactorName::CourseFit,
        FactorName::TimeIndex,
        FactorName::Last3f,
        FactorName::Popularity,
        FactorName::Pedigree,
        FactorName::RunningStyle,
    ];
}

/// Per-horse prediction output: factor scores, the aggregate, the ML
/// probability and the combined rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub horse_number: u8,
    pub horse_name: String,
    pub horse_id: String,
    pub ml_probability: f64,
    pub factor_scores: rustc_hash::FxHashMap<FactorName, Option<f64>>,
    pub total_score: Option<f64>,
    pub combined_score: Option<f64>,
    pub rank: u32,
}
