use super::domain::{LotteryWarning, ParkingSpot, Resident, SpotLayout};
use super::engine::LotteryEngine;
use super::import::{
    ResidentDraft, ResidentImportError, ResidentImporter, SkippedRow, SpotImportError,
    SpotImporter,
};
use super::report::LotteryReport;
use super::session::{DoubleSpotUpdate, LotterySession, SessionError};
use super::stats::LotteryStats;
use serde::Serialize;
use std::io::Read;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe front for a [`LotterySession`] shared by HTTP handlers.
pub struct LotteryService {
    session: Mutex<LotterySession>,
    engine: LotteryEngine,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResidentImportSummary {
    pub imported: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpotImportSummary {
    pub layout: SpotLayout,
    pub imported: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpotInventory {
    pub layout: Option<SpotLayout>,
    pub spots: Vec<ParkingSpot>,
}

fn messages(warnings: &[LotteryWarning]) -> Vec<&'static str> {
    warnings.iter().map(|warning| warning.message()).collect()
}

impl LotteryService {
    pub fn new(engine: LotteryEngine) -> Self {
        Self::with_session(LotterySession::new(), engine)
    }

    pub fn with_session(session: LotterySession, engine: LotteryEngine) -> Self {
        Self {
            session: Mutex::new(session),
            engine,
        }
    }

    fn session(&self) -> MutexGuard<'_, LotterySession> {
        self.session.lock().expect("lottery session mutex poisoned")
    }

    /// Parses outside the lock; the resident list is only replaced on success.
    pub fn import_residents<R: Read>(
        &self,
        reader: R,
    ) -> Result<ResidentImportSummary, ResidentImportError> {
        let import = ResidentImporter::from_reader(reader)?;
        let summary = ResidentImportSummary {
            imported: import.residents.len(),
            warnings: messages(&import.warnings),
        };
        self.session().replace_residents(import.residents);
        Ok(summary)
    }

    pub fn residents(&self) -> Vec<Resident> {
        self.session().residents().to_vec()
    }

    pub fn add_resident(&self, draft: ResidentDraft) -> Result<Resident, SessionError> {
        self.session().add_resident(draft).cloned()
    }

    pub fn configure_double_spots(&self, apartments: &[String]) -> DoubleSpotUpdate {
        self.session().configure_double_spots(apartments)
    }

    pub fn import_spots<R: Read>(
        &self,
        reader: R,
        layout: Option<SpotLayout>,
    ) -> Result<SpotImportSummary, SpotImportError> {
        let import = SpotImporter::from_reader(reader, layout)?;
        let summary = SpotImportSummary {
            layout: import.layout,
            imported: import.spots.len(),
            skipped: import.skipped.clone(),
            warnings: messages(&import.warnings),
        };
        self.session().replace_spots(import);
        Ok(summary)
    }

    pub fn generate_spots(&self, covered: usize, uncovered: usize) -> SpotInventory {
        let mut session = self.session();
        let spots = session.generate_spots(covered, uncovered).to_vec();
        SpotInventory {
            layout: session.spot_layout(),
            spots,
        }
    }

    pub fn spots(&self) -> SpotInventory {
        let session = self.session();
        SpotInventory {
            layout: session.spot_layout(),
            spots: session.spots().to_vec(),
        }
    }

    /// Holds the session lock for the whole draw.
    pub fn draw(&self) -> LotteryReport {
        let mut session = self.session();
        LotteryReport::from_result(session.draw(&self.engine))
    }

    pub fn latest(&self) -> Option<LotteryReport> {
        self.session().latest().map(LotteryReport::from_result)
    }

    pub fn stats(&self) -> LotteryStats {
        let session = self.session();
        LotteryStats::collect(session.residents(), session.spots())
    }
}
