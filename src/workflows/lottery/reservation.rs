use super::domain::{Candidate, ParkingSpot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How open spots treat apartments that some reserved spot lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationPolicy {
    /// Apartments listed by any reserved spot never enter an open pool.
    #[default]
    CrossSpotExclusion,
    /// Eligible lists only restrict their own spot.
    PerSpot,
}

impl ReservationPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cross_spot" | "cross_spot_exclusion" => Some(Self::CrossSpotExclusion),
            "per_spot" => Some(Self::PerSpot),
            _ => None,
        }
    }
}

/// Why a spot stays out of the random draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// Manually assigned upfront; carries the first configured apartment, if any.
    PreSelected { apartment: Option<String> },
    NotDrawable,
}

/// Pools hold indexes into the candidate slice handed to `resolve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Excluded(Exclusion),
    Reserved(Vec<usize>),
    Open(Vec<usize>),
}

pub struct ReservationResolver {
    policy: ReservationPolicy,
    reserved_apartments: HashSet<String>,
}

impl ReservationResolver {
    pub fn new(spots: &[ParkingSpot], policy: ReservationPolicy) -> Self {
        let reserved_apartments = spots
            .iter()
            .flat_map(|spot| spot.eligible_apartments.iter())
            .map(|apartment| apartment.trim().to_string())
            .filter(|apartment| !apartment.is_empty())
            .collect();

        Self {
            policy,
            reserved_apartments,
        }
    }

    pub fn is_reserved_elsewhere(&self, apartment: &str) -> bool {
        self.reserved_apartments.contains(apartment.trim())
    }

    pub fn resolve(&self, spot: &ParkingSpot, candidates: &[Candidate]) -> Resolution {
        if spot.hidden_rule {
            return Resolution::Excluded(Exclusion::NotDrawable);
        }

        if spot.pre_selected {
            let apartment = spot
                .eligible_apartments
                .iter()
                .map(|apartment| apartment.trim())
                .find(|apartment| !apartment.is_empty())
                .map(str::to_string);
            return Resolution::Excluded(Exclusion::PreSelected { apartment });
        }

        if spot.is_reserved() {
            let pool = candidates
                .iter()
                .enumerate()
                .filter(|(_, candidate)| {
                    spot.eligible_apartments
                        .iter()
                        .any(|apartment| apartment.trim() == candidate.apartment.trim())
                })
                .map(|(index, _)| index)
                .collect();
            return Resolution::Reserved(pool);
        }

        let pool = candidates
            .iter()
            .enumerate()
            .filter(|(_, candidate)| match self.policy {
                ReservationPolicy::CrossSpotExclusion => {
                    !self.is_reserved_elsewhere(&candidate.apartment)
                }
                ReservationPolicy::PerSpot => true,
            })
            .map(|(index, _)| index)
            .collect();
        Resolution::Open(pool)
    }
}
