use super::domain::{PaymentStatus, Resident, SpotCategory};
use serde::Serialize;

/// Spot categories a resident may compete for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Eligibility {
    pub covered: bool,
    pub uncovered: bool,
}

impl Eligibility {
    pub fn allows(self, category: SpotCategory) -> bool {
        match category {
            SpotCategory::Covered => self.covered,
            SpotCategory::Uncovered => self.uncovered,
        }
    }

    pub fn is_none(self) -> bool {
        !self.covered && !self.uncovered
    }
}

/// Months of debt a justified resident may carry and still draw a covered spot.
pub const COVERED_GRACE_MONTHS: u32 = 2;

/// Delinquency beyond this many months without justification loses every privilege.
pub const NO_PRIVILEGE_THRESHOLD_MONTHS: u32 = 3;

pub fn classify(resident: &Resident) -> Eligibility {
    let is_paid = resident.payment_status == PaymentStatus::Current;
    let has_qualifying_justification =
        resident.payment_status == PaymentStatus::Overdue && resident.has_justification;
    let base = is_paid || has_qualifying_justification;

    let covered = base
        && (is_paid
            || (has_qualifying_justification
                && resident.months_overdue <= COVERED_GRACE_MONTHS));

    Eligibility {
        covered,
        uncovered: base,
    }
}

/// Payment standing shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStanding {
    Current,
    Overdue,
    Delinquent,
    NoPrivilege,
}

impl PaymentStanding {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Overdue => "Overdue",
            Self::Delinquent => "Delinquent",
            Self::NoPrivilege => "No privilege",
        }
    }
}

pub fn standing(resident: &Resident) -> PaymentStanding {
    match resident.payment_status {
        PaymentStatus::Current => PaymentStanding::Current,
        PaymentStatus::Overdue => PaymentStanding::Overdue,
        PaymentStatus::Delinquent
            if resident.months_overdue > NO_PRIVILEGE_THRESHOLD_MONTHS
                && !resident.has_justification =>
        {
            PaymentStanding::NoPrivilege
        }
        PaymentStatus::Delinquent => PaymentStanding::Delinquent,
    }
}
