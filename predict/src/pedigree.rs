//! The pedigree master: classifies a sire name into one of eight coarse sire
//! lines and looks up that line's aptitude for a distance band and a track
//! type. Grounded in real thoroughbred bloodstock nomenclature (Sunday
//! Silence, Northern Dancer and its descendants), but the numeric aptitudes
//! are a house table, not an external data feed.

use rustc_hash::FxHashMap;

use crate::domain::PedigreeTrackType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum SireLine {
    SundaySilence,
    NorthernDancer,
    MrProspector,
    Roberto,
    NativeDancer,
    Halo,
    Nasrullah,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceBand {
    Sprint,
    Mile,
    Middle,
    Long,
}

impl DistanceBand {
    pub fn classify(distance_metres: u16) -> Self {
        if distance_metres <= 1400 {
            DistanceBand::Sprint
        } else if distance_metres <= 1800 {
            DistanceBand::Mile
        } else if distance_metres <= 2200 {
            DistanceBand::Middle
        } else {
            DistanceBand::Long
        }
    }
}

/// Known bloodline affiliations. Real pedigrees fan out far wider than this;
/// anything not recognised here falls through to [`SireLine::Other`].
fn classify_sire_name(name: &str) -> SireLine {
    let lower = name.to_lowercase();
    let contains_any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if contains_any(&["sunday silence", "deep impact", "heart's cry", "stay gold"]) {
        SireLine::SundaySilence
    } else if contains_any(&[
        "northern dancer",
        "storm cat",
        "storm bird",
        "nijinsky",
        "danzig",
    ]) {
        SireLine::NorthernDancer
    } else if contains_any(&["mr. prospector", "mr prospector", "kingmambo", "fappiano"]) {
        SireLine::MrProspector
    } else if contains_any(&["roberto", "silver hawk", "kris s"]) {
        SireLine::Roberto
    } else if contains_any(&["native dancer", "raise a native", "mr leader"]) {
        SireLine::NativeDancer
    } else if contains_any(&["halo", "devil's bag"]) {
        SireLine::Halo
    } else if contains_any(&["nasrullah", "bold ruler", "what a pleasure"]) {
        SireLine::Nasrullah
    } else {
        SireLine::Other
    }
}

#[derive(Debug, Clone, Copy)]
struct Aptitude {
    sprint: f64,
    mile: f64,
    middle: f64,
    long: f64,
    good: f64,
    heavy: f64,
}

impl Aptitude {
    fn distance(&self, band: DistanceBand) -> f64 {
        match band {
            DistanceBand::Sprint => self.sprint,
            DistanceBand::Mile => self.mile,
            DistanceBand::Middle => self.middle,
            DistanceBand::Long => self.long,
        }
    }

    fn track(&self, track_type: PedigreeTrackType) -> f64 {
        match track_type {
            PedigreeTrackType::Good => self.good,
            PedigreeTrackType::Heavy => self.heavy,
        }
    }
}

pub struct PedigreeMaster {
    table: FxHashMap<&'static str, Aptitude>,
}

impl Default for PedigreeMaster {
    fn default() -> Self {
        let mut table = FxHashMap::default();
        table.insert(
            "SundaySilence",
            Aptitude { sprint: 0.4, mile: 0.8, middle: 1.0, long: 0.7, good: 1.0, heavy: 0.5 },
        );
        table.insert(
            "NorthernDancer",
            Aptitude { sprint: 0.7, mile: 0.9, middle: 0.6, long: 0.3, good: 1.0, heavy: 0.4 },
        );
        table.insert(
            "MrProspector",
            Aptitude { sprint: 0.9, mile: 0.7, middle: 0.4, long: 0.2, good: 0.9, heavy: 0.5 },
        );
        table.insert(
            "Roberto",
            Aptitude { sprint: 0.3, mile: 0.6, middle: 0.9, long: 0.8, good: 0.7, heavy: 0.8 },
        );
        table.insert(
            "NativeDancer",
            Aptitude { sprint: 0.6, mile: 0.7, middle: 0.6, long: 0.4, good: 0.8, heavy: 0.6 },
        );
        table.insert(
            "Halo",
            Aptitude { sprint: 0.4, mile: 0.7, middle: 0.9, long: 0.6, good: 0.9, heavy: 0.5 },
        );
        table.insert(
            "Nasrullah",
            Aptitude { sprint: 0.5, mile: 0.8, middle: 0.7, long: 0.5, good: 0.8, heavy: 0.6 },
        );
        table.insert(
            "Other",
            Aptitude { sprint: 0.5, mile: 0.5, middle: 0.5, long: 0.5, good: 0.5, heavy: 0.5 },
        );
        Self { table }
    }
}

impl PedigreeMaster {
    pub fn classify(&self, sire_name: &str) -> SireLine {
        classify_sire_name(sire_name)
    }

    fn aptitude(&self, line: SireLine) -> Aptitude {
        let key = match line {
            SireLine::SundaySilence => "SundaySilence",
            SireLine::NorthernDancer => "NorthernDancer",
            SireLine::MrProspector => "MrProspector",
            SireLine::Roberto => "Roberto",
            SireLine::NativeDancer => "NativeDancer",
            SireLine::Halo => "Halo",
            SireLine::Nasrullah => "Nasrullah",
            SireLine::Other => "Other",
        };
        self.table[key]
    }

    pub fn distance_aptitude(&self, line: SireLine, band: DistanceBand) -> f64 {
        self.aptitude(line).distance(band)
    }

    pub fn track_aptitude(&self, line: SireLine, track_type: PedigreeTrackType) -> f64 {
        self.aptitude(line).track(track_type)
    }
}
