use super::domain::{ParkingSpot, PaymentStatus, Resident, SpotCategory};
use super::eligibility::{classify, standing, PaymentStanding};
use serde::Serialize;

/// Dashboard counters over the current resident list and spot inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LotteryStats {
    pub residents: usize,
    pub current: usize,
    pub overdue: usize,
    /// Includes residents that also count towards `no_privilege`.
    pub delinquent: usize,
    pub no_privilege: usize,
    pub double_spot: usize,
    pub eligible_covered: usize,
    pub eligible_uncovered: usize,
    pub spots: SpotStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpotStats {
    pub total: usize,
    pub covered: usize,
    pub uncovered: usize,
    pub drawable: usize,
    pub reserved: usize,
}

impl LotteryStats {
    pub fn collect(residents: &[Resident], spots: &[ParkingSpot]) -> Self {
        let mut stats = Self {
            residents: residents.len(),
            spots: SpotStats::collect(spots),
            ..Self::default()
        };

        for resident in residents {
            match resident.payment_status {
                PaymentStatus::Current => stats.current += 1,
                PaymentStatus::Overdue => stats.overdue += 1,
                PaymentStatus::Delinquent => stats.delinquent += 1,
            }
            if standing(resident) == PaymentStanding::NoPrivilege {
                stats.no_privilege += 1;
            }
            if resident.has_double_spot {
                stats.double_spot += 1;
            }

            let eligibility = classify(resident);
            if eligibility.covered {
                stats.eligible_covered += 1;
            }
            if eligibility.uncovered {
                stats.eligible_uncovered += 1;
            }
        }

        stats
    }
}

impl SpotStats {
    pub fn collect(spots: &[ParkingSpot]) -> Self {
        Self {
            total: spots.len(),
            covered: spots
                .iter()
                .filter(|spot| spot.category == SpotCategory::Covered)
                .count(),
            uncovered: spots
                .iter()
                .filter(|spot| spot.category == SpotCategory::Uncovered)
                .count(),
            drawable: spots.iter().filter(|spot| spot.is_drawable()).count(),
            reserved: spots.iter().filter(|spot| spot.is_reserved()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::lottery::domain::ResidentId;
    use crate::workflows::lottery::import::generate_spots;

    fn resident(
        apartment: &str,
        payment_status: PaymentStatus,
        months_overdue: u32,
        has_justification: bool,
    ) -> Resident {
        Resident {
            id: ResidentId(format!("r-{apartment}")),
            name: format!("Resident {apartment}"),
            apartment: apartment.to_string(),
            payment_status,
            months_overdue,
            has_justification,
            has_double_spot: false,
        }
    }

    #[test]
    fn counts_standings_and_eligibility() {
        let mut residents = vec![
            resident("101", PaymentStatus::Current, 0, false),
            resident("102", PaymentStatus::Overdue, 2, true),
            resident("103", PaymentStatus::Overdue, 4, true),
            resident("104", PaymentStatus::Overdue, 1, false),
            resident("201", PaymentStatus::Delinquent, 5, false),
            resident("202", PaymentStatus::Delinquent, 5, true),
        ];
        residents[0].has_double_spot = true;

        let mut spots = generate_spots(2, 1);
        spots[0].pre_selected = true;
        spots[1].eligible_apartments = vec!["101".to_string()];

        let stats = LotteryStats::collect(&residents, &spots);
        assert_eq!(stats.residents, 6);
        assert_eq!(stats.current, 1);
        assert_eq!(stats.overdue, 3);
        assert_eq!(stats.delinquent, 2);
        assert_eq!(stats.no_privilege, 1);
        assert_eq!(stats.double_spot, 1);
        assert_eq!(stats.eligible_covered, 2);
        assert_eq!(stats.eligible_uncovered, 3);
        assert_eq!(
            stats.spots,
            SpotStats {
                total: 3,
                covered: 2,
                uncovered: 1,
                drawable: 2,
                reserved: 1,
            }
        );
    }

    #[test]
    fn empty_inputs_are_all_zero() {
        assert_eq!(LotteryStats::collect(&[], &[]), LotteryStats::default());
    }
}
