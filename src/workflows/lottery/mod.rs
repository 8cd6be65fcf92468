//! Condominium parking-spot lottery: eligibility, reservations, draw and exports.

pub mod domain;
pub(crate) mod eligibility;
mod engine;
pub(crate) mod expansion;
pub mod export;
pub mod import;
pub mod report;
pub(crate) mod reservation;
pub mod router;
pub mod service;
pub mod session;
pub mod stats;

pub use domain::{
    Assignee, AssignmentEntry, Candidate, LotteryId, LotteryResult, LotteryWarning, Observation,
    ParkingSpot, PaymentStatus, Resident, ResidentId, SpotCategory, SpotId, SpotKind, SpotLayout,
    SpotSection,
};
pub use eligibility::{classify, standing, Eligibility, PaymentStanding};
pub use engine::{LotteryEngine, WinnerPolicy};
pub use expansion::expand;
pub use report::{AssignmentView, LotteryReport};
pub use reservation::{Exclusion, ReservationPolicy, ReservationResolver, Resolution};
pub use router::lottery_router;
pub use service::LotteryService;
pub use session::{DoubleSpotUpdate, LotterySession, SessionError};
pub use stats::LotteryStats;
