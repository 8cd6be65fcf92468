use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResidentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotteryId(pub String);

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for LotteryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Current,
    Overdue,
    Delinquent,
}

impl PaymentStatus {
    /// Case-insensitive parse of the spreadsheet value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "current" => Some(Self::Current),
            "overdue" => Some(Self::Overdue),
            "delinquent" => Some(Self::Delinquent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    pub id: ResidentId,
    pub name: String,
    pub apartment: String,
    pub payment_status: PaymentStatus,
    pub months_overdue: u32,
    pub has_justification: bool,
    #[serde(default)]
    pub has_double_spot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotCategory {
    Covered,
    Uncovered,
}

impl SpotCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Covered => "Covered",
            Self::Uncovered => "Uncovered",
        }
    }
}

/// Garage level a spot sits on. Free-text locations land in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotSection {
    G1,
    G2,
    Terreo,
    Other(String),
}

impl SpotSection {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match fold_accents(trimmed).as_str() {
            "G1" => Self::G1,
            "G2" => Self::G2,
            "TERREO" => Self::Terreo,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::G1 => "G1",
            Self::G2 => "G2",
            Self::Terreo => "TERREO",
            Self::Other(location) => location,
        }
    }

    /// Ground-level spots are open-air; every garage level is covered.
    pub fn default_category(&self) -> SpotCategory {
        match self {
            Self::Terreo => SpotCategory::Uncovered,
            _ => SpotCategory::Covered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotKind {
    Single,
    Double,
    Visitor,
}

impl SpotKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match fold_accents(raw.trim()).as_str() {
            "UNICA" => Some(Self::Single),
            "DUPLA" => Some(Self::Double),
            "VISITANTE" => Some(Self::Visitor),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "ÚNICA",
            Self::Double => "DUPLA",
            Self::Visitor => "VISITANTE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub id: SpotId,
    pub number: String,
    pub section: SpotSection,
    pub category: SpotCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SpotKind>,
    #[serde(default)]
    pub pre_selected: bool,
    #[serde(default)]
    pub hidden_rule: bool,
    #[serde(default)]
    pub eligible_apartments: Vec<String>,
    #[serde(default)]
    pub observations: String,
}

impl ParkingSpot {
    pub fn is_drawable(&self) -> bool {
        !self.pre_selected && !self.hidden_rule
    }

    pub fn is_reserved(&self) -> bool {
        !self.eligible_apartments.is_empty()
    }

    pub fn number_value(&self) -> u64 {
        spot_number_value(&self.number)
    }
}

/// Numeric value of a spot number taken from its leading digits ("120C" is 120).
/// Numbers without leading digits sort as 0.
pub fn spot_number_value(number: &str) -> u64 {
    let digits: String = number
        .trim()
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Spreadsheet layout a spot inventory was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotLayout {
    /// `G1`, `G2`, `TERREO` columns of spot numbers.
    Sections,
    /// One row per spot with type, flags and eligible apartments.
    Detailed,
}

impl SpotLayout {
    /// Only the detailed layout carries a spot kind.
    pub fn of(entries: &[AssignmentEntry]) -> Self {
        if entries.iter().any(|entry| entry.spot.kind.is_some()) {
            Self::Detailed
        } else {
            Self::Sections
        }
    }
}

/// One ticket in a draw. A resident entitled to a double spot holds two
/// tickets; the second one carries `secondary_slot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub apartment: String,
    pub resident_id: ResidentId,
    pub resident_name: String,
    pub secondary_slot: bool,
}

impl Candidate {
    pub fn key(&self) -> String {
        if self.secondary_slot {
            format!("{}#2", self.resident_id)
        } else {
            self.resident_id.0.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    Drawn,
    PreSelected,
    NotDrawable,
    NoEligibleCandidates,
}

impl Observation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Drawn => "drawn",
            Self::PreSelected => "pre-selected, not drawn",
            Self::NotDrawable => "not drawable",
            Self::NoEligibleCandidates => "no eligible candidates",
        }
    }
}

/// Snapshot of the spot a result entry refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotDescriptor {
    pub id: SpotId,
    pub number: String,
    pub section: SpotSection,
    pub category: SpotCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SpotKind>,
}

impl From<&ParkingSpot> for SpotDescriptor {
    fn from(spot: &ParkingSpot) -> Self {
        Self {
            id: spot.id.clone(),
            number: spot.number.clone(),
            section: spot.section.clone(),
            category: spot.category,
            kind: spot.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub apartment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_id: Option<ResidentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_name: Option<String>,
    #[serde(default)]
    pub secondary_slot: bool,
}

impl From<Candidate> for Assignee {
    fn from(candidate: Candidate) -> Self {
        Self {
            apartment: candidate.apartment,
            resident_id: Some(candidate.resident_id),
            resident_name: Some(candidate.resident_name),
            secondary_slot: candidate.secondary_slot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentEntry {
    pub spot: SpotDescriptor,
    pub assignee: Option<Assignee>,
    pub observation: Observation,
}

impl AssignmentEntry {
    pub fn apartment(&self) -> Option<&str> {
        self.assignee
            .as_ref()
            .map(|assignee| assignee.apartment.as_str())
    }

    pub fn number_value(&self) -> u64 {
        spot_number_value(&self.spot.number)
    }
}

/// Non-fatal conditions surfaced to the operator alongside a result or import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotteryWarning {
    NoValidRows,
    NoSpotsConfigured,
    NoEligibleCandidates,
}

impl LotteryWarning {
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoValidRows => "no valid rows found in the uploaded file",
            Self::NoSpotsConfigured => "no parking spots configured",
            Self::NoEligibleCandidates => "no resident is eligible for the draw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryResult {
    pub id: LotteryId,
    pub drawn_at: DateTime<Utc>,
    pub entries: Vec<AssignmentEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<LotteryWarning>,
}

impl LotteryResult {
    pub fn entry_for(&self, number: &str) -> Option<&AssignmentEntry> {
        self.entries.iter().find(|entry| entry.spot.number == number)
    }
}

fn fold_accents(value: &str) -> String {
    value
        .to_uppercase()
        .chars()
        .map(|ch| match ch {
            'Á' | 'À' | 'Â' | 'Ã' => 'A',
            'É' | 'Ê' => 'E',
            'Í' => 'I',
            'Ó' | 'Ô' | 'Õ' => 'O',
            'Ú' | 'Ü' => 'U',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}
