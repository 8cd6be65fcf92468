use super::domain::{
    Assignee, AssignmentEntry, Candidate, LotteryId, LotteryResult, LotteryWarning, Observation,
    ParkingSpot, Resident, SpotCategory, SpotDescriptor,
};
use super::eligibility::classify;
use super::expansion::expand;
use super::report::sort_entries;
use super::reservation::{Exclusion, ReservationPolicy, ReservationResolver, Resolution};
use crate::config::LotteryConfig;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Whether a ticket that already won may win again within the same run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinnerPolicy {
    /// A winning ticket leaves every remaining pool. A double-spot resident
    /// still competes with their second ticket.
    #[default]
    Exclusive,
    Repeat,
}

impl WinnerPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exclusive" => Some(Self::Exclusive),
            "repeat" => Some(Self::Repeat),
            _ => None,
        }
    }
}

static LOTTERY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_lottery_id() -> LotteryId {
    let id = LOTTERY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LotteryId(format!("lottery-{id:06}"))
}

/// Runs one lottery over explicit snapshots of residents and spots.
#[derive(Debug, Clone, Copy, Default)]
pub struct LotteryEngine {
    winner_policy: WinnerPolicy,
    reservation_policy: ReservationPolicy,
}

impl LotteryEngine {
    pub fn new(winner_policy: WinnerPolicy, reservation_policy: ReservationPolicy) -> Self {
        Self {
            winner_policy,
            reservation_policy,
        }
    }

    pub fn from_config(config: &LotteryConfig) -> Self {
        Self::new(config.winner_policy, config.reservation_policy)
    }

    pub fn draw(&self, residents: &[Resident], spots: &[ParkingSpot]) -> LotteryResult {
        self.draw_with_rng(residents, spots, &mut rand::thread_rng())
    }

    pub fn draw_with_rng<R>(
        &self,
        residents: &[Resident],
        spots: &[ParkingSpot],
        rng: &mut R,
    ) -> LotteryResult
    where
        R: Rng + ?Sized,
    {
        let mut warnings = Vec::new();
        if spots.is_empty() {
            warnings.push(LotteryWarning::NoSpotsConfigured);
        }

        let eligibility: Vec<_> = residents.iter().map(classify).collect();
        let mut covered = expand(
            residents
                .iter()
                .zip(&eligibility)
                .filter(|(_, eligibility)| eligibility.covered)
                .map(|(resident, _)| resident),
        );
        let mut uncovered = expand(
            residents
                .iter()
                .zip(&eligibility)
                .filter(|(_, eligibility)| eligibility.uncovered)
                .map(|(resident, _)| resident),
        );
        if covered.is_empty() && uncovered.is_empty() {
            warnings.push(LotteryWarning::NoEligibleCandidates);
        }

        let resolver = ReservationResolver::new(spots, self.reservation_policy);

        // Reserved spots first so open spots cannot consume their closed pools.
        let mut order: Vec<&ParkingSpot> = spots.iter().collect();
        order.sort_by_key(|spot| (!spot.is_reserved(), spot.number_value()));

        let mut entries = Vec::with_capacity(spots.len());
        for spot in order {
            let candidates = match spot.category {
                SpotCategory::Covered => &covered,
                SpotCategory::Uncovered => &uncovered,
            };

            let entry = match resolver.resolve(spot, candidates) {
                Resolution::Excluded(Exclusion::NotDrawable) => {
                    excluded_entry(spot, None, Observation::NotDrawable)
                }
                Resolution::Excluded(Exclusion::PreSelected { apartment }) => {
                    let assignee =
                        apartment.map(|apartment| pre_selected_assignee(apartment, residents));
                    excluded_entry(spot, assignee, Observation::PreSelected)
                }
                Resolution::Reserved(pool) | Resolution::Open(pool) => {
                    match pick(&pool, candidates, rng) {
                        Some(winner) => {
                            if self.winner_policy == WinnerPolicy::Exclusive {
                                let key = winner.key();
                                covered.retain(|candidate| candidate.key() != key);
                                uncovered.retain(|candidate| candidate.key() != key);
                            }
                            AssignmentEntry {
                                spot: SpotDescriptor::from(spot),
                                assignee: Some(Assignee::from(winner)),
                                observation: Observation::Drawn,
                            }
                        }
                        None => {
                            debug!(spot = %spot.number, "no eligible candidates for spot");
                            excluded_entry(spot, None, Observation::NoEligibleCandidates)
                        }
                    }
                }
            };
            entries.push(entry);
        }

        sort_entries(&mut entries);

        let result = LotteryResult {
            id: next_lottery_id(),
            drawn_at: Utc::now(),
            entries,
            warnings,
        };

        info!(
            lottery_id = %result.id,
            spots = spots.len(),
            residents = residents.len(),
            drawn = result
                .entries
                .iter()
                .filter(|entry| entry.observation == Observation::Drawn)
                .count(),
            "lottery draw completed"
        );

        result
    }
}

/// Uniform pick over the live pool for this spot.
fn pick<R>(pool: &[usize], candidates: &[Candidate], rng: &mut R) -> Option<Candidate>
where
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return None;
    }
    let index = pool[rng.gen_range(0..pool.len())];
    candidates.get(index).cloned()
}

fn excluded_entry(
    spot: &ParkingSpot,
    assignee: Option<Assignee>,
    observation: Observation,
) -> AssignmentEntry {
    AssignmentEntry {
        spot: SpotDescriptor::from(spot),
        assignee,
        observation,
    }
}

fn pre_selected_assignee(apartment: String, residents: &[Resident]) -> Assignee {
    let resident = residents
        .iter()
        .find(|resident| resident.apartment.trim() == apartment);

    Assignee {
        resident_id: resident.map(|resident| resident.id.clone()),
        resident_name: resident.map(|resident| resident.name.clone()),
        apartment,
        secondary_slot: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::lottery::domain::{PaymentStatus, ResidentId, SpotId, SpotSection};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn resident(apartment: &str, status: PaymentStatus) -> Resident {
        Resident {
            id: ResidentId(format!("r-{apartment}")),
            name: format!("Resident {apartment}"),
            apartment: apartment.to_string(),
            payment_status: status,
            months_overdue: 0,
            has_justification: false,
            has_double_spot: false,
        }
    }

    fn spot(number: &str, category: SpotCategory) -> ParkingSpot {
        ParkingSpot {
            id: SpotId(format!("spot-{number}")),
            number: number.to_string(),
            section: match category {
                SpotCategory::Covered => SpotSection::G1,
                SpotCategory::Uncovered => SpotSection::Terreo,
            },
            category,
            kind: None,
            pre_selected: false,
            hidden_rule: false,
            eligible_apartments: Vec::new(),
            observations: String::new(),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn single_current_resident_wins_single_spot() {
        let residents = vec![resident("101", PaymentStatus::Current)];
        let spots = vec![spot("1", SpotCategory::Covered)];

        let result = LotteryEngine::default().draw(&residents, &spots);

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].spot.number, "1");
        assert_eq!(result.entries[0].apartment(), Some("101"));
        assert_eq!(result.entries[0].observation, Observation::Drawn);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn empty_resident_set_still_reports_each_spot() {
        let spots = vec![spot("1", SpotCategory::Uncovered)];

        let result = LotteryEngine::default().draw(&[], &spots);

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].apartment(), None);
        assert_eq!(
            result.entries[0].observation,
            Observation::NoEligibleCandidates
        );
        assert_eq!(result.warnings, vec![LotteryWarning::NoEligibleCandidates]);
    }

    #[test]
    fn empty_inputs_yield_empty_result() {
        let result = LotteryEngine::default().draw(&[], &[]);
        assert!(result.entries.is_empty());
        assert!(result.warnings.contains(&LotteryWarning::NoSpotsConfigured));
    }

    #[test]
    fn hidden_rule_spot_is_never_assigned() {
        let residents: Vec<_> = ["101", "102", "103"]
            .iter()
            .map(|apt| resident(apt, PaymentStatus::Current))
            .collect();
        let mut hidden = spot("7", SpotCategory::Covered);
        hidden.hidden_rule = true;
        hidden.eligible_apartments = vec!["101".to_string()];

        let engine = LotteryEngine::default();
        let mut rng = rng();
        for _ in 0..50 {
            let spots = std::slice::from_ref(&hidden);
            let result = engine.draw_with_rng(&residents, spots, &mut rng);
            let entry = result.entry_for("7").expect("hidden spot reported");
            assert_eq!(entry.assignee, None);
            assert_eq!(entry.observation, Observation::NotDrawable);
        }
    }

    #[test]
    fn pre_selected_spot_keeps_configured_apartment() {
        let residents = vec![
            resident("201", PaymentStatus::Current),
            resident("202", PaymentStatus::Current),
        ];
        let mut pre = spot("2", SpotCategory::Covered);
        pre.pre_selected = true;
        pre.eligible_apartments = vec!["202".to_string(), "201".to_string()];

        let engine = LotteryEngine::default();
        let mut rng = rng();
        for _ in 0..50 {
            let spots = std::slice::from_ref(&pre);
            let result = engine.draw_with_rng(&residents, spots, &mut rng);
            let entry = result.entry_for("2").expect("pre-selected spot reported");
            assert_eq!(entry.apartment(), Some("202"));
            assert_eq!(entry.observation, Observation::PreSelected);
            let assignee = entry.assignee.as_ref().expect("assignee present");
            assert_eq!(assignee.resident_name.as_deref(), Some("Resident 202"));
        }
    }

    #[test]
    fn ineligible_residents_never_win_covered_spots() {
        let mut overdue = resident("301", PaymentStatus::Overdue);
        overdue.has_justification = true;
        overdue.months_overdue = 3;
        let residents = vec![overdue, resident("302", PaymentStatus::Delinquent)];
        let spots = vec![
            spot("1", SpotCategory::Covered),
            spot("2", SpotCategory::Uncovered),
        ];

        let result = LotteryEngine::default().draw_with_rng(&residents, &spots, &mut rng());

        let covered = result.entry_for("1").expect("covered spot");
        assert_eq!(covered.observation, Observation::NoEligibleCandidates);
        let uncovered = result.entry_for("2").expect("uncovered spot");
        assert_eq!(uncovered.apartment(), Some("301"));
    }

    #[test]
    fn exclusive_policy_gives_each_ticket_at_most_one_spot() {
        let residents: Vec<_> = ["101", "102", "103"]
            .iter()
            .map(|apt| resident(apt, PaymentStatus::Current))
            .collect();
        let spots: Vec<_> = (1..=5)
            .map(|n| spot(&n.to_string(), SpotCategory::Covered))
            .collect();

        let result = LotteryEngine::default().draw_with_rng(&residents, &spots, &mut rng());

        let mut winners: Vec<_> = result.entries.iter().filter_map(|e| e.apartment()).collect();
        assert_eq!(winners.len(), 3);
        winners.sort();
        winners.dedup();
        assert_eq!(winners.len(), 3);
    }

    #[test]
    fn double_spot_resident_can_win_twice_under_exclusive_policy() {
        let mut double = resident("101", PaymentStatus::Current);
        double.has_double_spot = true;
        let spots = vec![
            spot("1", SpotCategory::Covered),
            spot("2", SpotCategory::Covered),
            spot("3", SpotCategory::Covered),
        ];

        let residents = vec![double];
        let result = LotteryEngine::default().draw_with_rng(&residents, &spots, &mut rng());

        let assignees: Vec<_> = result
            .entries
            .iter()
            .filter_map(|entry| entry.assignee.as_ref())
            .collect();
        assert_eq!(assignees.len(), 2);
        assert_eq!(
            assignees.iter().filter(|assignee| assignee.secondary_slot).count(),
            1
        );
    }

    #[test]
    fn repeat_policy_lets_one_ticket_win_every_spot() {
        let residents = vec![resident("101", PaymentStatus::Current)];
        let spots: Vec<_> = (1..=4)
            .map(|n| spot(&n.to_string(), SpotCategory::Uncovered))
            .collect();
        let engine = LotteryEngine::new(WinnerPolicy::Repeat, ReservationPolicy::default());

        let result = engine.draw_with_rng(&residents, &spots, &mut rng());

        assert!(result
            .entries
            .iter()
            .all(|entry| entry.apartment() == Some("101")));
    }

    #[test]
    fn reserved_spot_draws_only_from_its_list() {
        let residents: Vec<_> = ["101", "102", "103", "104"]
            .iter()
            .map(|apt| resident(apt, PaymentStatus::Current))
            .collect();
        let mut reserved = spot("9", SpotCategory::Covered);
        reserved.eligible_apartments = vec!["103".to_string(), "404".to_string()];
        let open = spot("1", SpotCategory::Covered);
        let spots = vec![open, reserved];

        let engine = LotteryEngine::default();
        let mut rng = rng();
        for _ in 0..50 {
            let result = engine.draw_with_rng(&residents, &spots, &mut rng);
            assert_eq!(result.entry_for("9").and_then(|e| e.apartment()), Some("103"));
            let open_winner = result.entry_for("1").and_then(|e| e.apartment());
            assert!(matches!(open_winner, Some("101") | Some("102") | Some("104")));
        }
    }

    #[test]
    fn entries_come_back_in_numeric_order() {
        let residents: Vec<_> = (1..=6)
            .map(|n| resident(&format!("10{n}"), PaymentStatus::Current))
            .collect();
        let spots: Vec<_> = ["12", "3", "C01", "20"]
            .iter()
            .map(|number| spot(number, SpotCategory::Covered))
            .collect();

        let result = LotteryEngine::default().draw_with_rng(&residents, &spots, &mut rng());

        let numbers: Vec<_> = result.entries.iter().map(|e| e.spot.number.as_str()).collect();
        assert_eq!(numbers, vec!["C01", "3", "12", "20"]);
    }

    #[test]
    fn selection_is_uniform_across_pool() {
        let residents: Vec<_> = ["101", "102", "103", "104"]
            .iter()
            .map(|apt| resident(apt, PaymentStatus::Current))
            .collect();
        let spots = vec![spot("1", SpotCategory::Covered)];
        let engine = LotteryEngine::default();
        let mut rng = rng();
        let trials = 8_000;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            let result = engine.draw_with_rng(&residents, &spots, &mut rng);
            let winner = result.entries[0].apartment().expect("winner").to_string();
            *counts.entry(winner).or_default() += 1;
        }

        assert_eq!(counts.len(), 4);
        for (apartment, count) in counts {
            let frequency = count as f64 / trials as f64;
            assert!(
                (frequency - 0.25).abs() < 0.03,
                "apartment {apartment} drawn with frequency {frequency}"
            );
        }
    }

    #[test]
    fn lottery_ids_are_unique_per_run() {
        let engine = LotteryEngine::default();
        let first = engine.draw(&[], &[]);
        let second = engine.draw(&[], &[]);
        assert_ne!(first.id, second.id);
        assert!(first.id.0.starts_with("lottery-"));
    }
}
