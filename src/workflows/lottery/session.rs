use super::domain::{LotteryResult, ParkingSpot, Resident, SpotLayout};
use super::engine::LotteryEngine;
use super::import::{generate_spots, ResidentDraft, SpotImport};
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// Residents, spot inventory and draw history for one condominium.
#[derive(Debug, Clone, Default)]
pub struct LotterySession {
    residents: Vec<Resident>,
    spots: Vec<ParkingSpot>,
    spot_layout: Option<SpotLayout>,
    results: Vec<LotteryResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid resident: {0}")]
    InvalidResident(String),
}

/// Outcome of applying a double-spot apartment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoubleSpotUpdate {
    pub enabled: usize,
    /// Listed apartments with no resident on file.
    pub unknown: Vec<String>,
}

impl LotterySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn residents(&self) -> &[Resident] {
        &self.residents
    }

    pub fn spots(&self) -> &[ParkingSpot] {
        &self.spots
    }

    pub fn spot_layout(&self) -> Option<SpotLayout> {
        self.spot_layout
    }

    pub fn results(&self) -> &[LotteryResult] {
        &self.results
    }

    pub fn latest(&self) -> Option<&LotteryResult> {
        self.results.last()
    }

    pub fn replace_residents(&mut self, residents: Vec<Resident>) {
        info!(residents = residents.len(), "resident list replaced");
        self.residents = residents;
    }

    pub fn add_resident(&mut self, draft: ResidentDraft) -> Result<&Resident, SessionError> {
        let resident = draft
            .into_resident()
            .map_err(SessionError::InvalidResident)?;
        info!(apartment = %resident.apartment, "resident added manually");

        self.residents.push(resident);
        let index = self.residents.len() - 1;
        Ok(&self.residents[index])
    }

    /// Listed apartments get a second ticket; every other resident loses it.
    pub fn configure_double_spots<I, S>(&mut self, apartments: I) -> DoubleSpotUpdate
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let listed: HashSet<String> = apartments
            .into_iter()
            .map(|apartment| apartment.as_ref().trim().to_string())
            .filter(|apartment| !apartment.is_empty())
            .collect();

        let mut enabled = 0;
        for resident in &mut self.residents {
            resident.has_double_spot = listed.contains(resident.apartment.trim());
            if resident.has_double_spot {
                enabled += 1;
            }
        }

        let known: HashSet<&str> = self
            .residents
            .iter()
            .map(|resident| resident.apartment.trim())
            .collect();
        let mut unknown: Vec<String> = listed
            .iter()
            .filter(|apartment| !known.contains(apartment.as_str()))
            .cloned()
            .collect();
        unknown.sort();

        info!(enabled, unknown = unknown.len(), "double spots configured");
        DoubleSpotUpdate { enabled, unknown }
    }

    pub fn replace_spots(&mut self, import: SpotImport) {
        info!(spots = import.spots.len(), layout = ?import.layout, "spot inventory replaced");
        self.spot_layout = Some(import.layout);
        self.spots = import.spots;
    }

    pub fn generate_spots(&mut self, covered: usize, uncovered: usize) -> &[ParkingSpot] {
        self.spots = generate_spots(covered, uncovered);
        self.spot_layout = Some(SpotLayout::Sections);
        info!(covered, uncovered, "spot inventory generated");
        &self.spots
    }

    pub fn draw(&mut self, engine: &LotteryEngine) -> &LotteryResult {
        self.draw_with_rng(engine, &mut rand::thread_rng())
    }

    /// Draws over the current residents and spots and appends the result.
    pub fn draw_with_rng<R>(&mut self, engine: &LotteryEngine, rng: &mut R) -> &LotteryResult
    where
        R: Rng + ?Sized,
    {
        let result = engine.draw_with_rng(&self.residents, &self.spots, rng);
        self.results.push(result);
        let index = self.results.len() - 1;
        &self.results[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::lottery::domain::{Observation, SpotCategory};
    use crate::workflows::lottery::import::{ResidentImporter, SpotImporter};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    const RESIDENTS: &str = "Nome,Apartamento,Status de Pagamento,Meses em Atraso,Possui Justificativa\n\
Ana Costa,101,current,0,não\n\
Bruno Lima,102,current,0,não\n";

    fn draft(name: &str, apartment: &str, status: &str) -> ResidentDraft {
        ResidentDraft {
            name: Some(name.to_string()),
            apartment: Some(apartment.to_string()),
            payment_status: Some(status.to_string()),
            ..ResidentDraft::default()
        }
    }

    fn session_with_residents() -> LotterySession {
        let mut session = LotterySession::new();
        let import = ResidentImporter::from_reader(Cursor::new(RESIDENTS)).expect("import");
        session.replace_residents(import.residents);
        session
    }

    #[test]
    fn manual_entry_uses_import_rules() {
        let mut session = LotterySession::new();
        let added = session
            .add_resident(draft("Paula Reis", "301", "Overdue"))
            .expect("valid resident");
        assert_eq!(added.apartment, "301");

        let error = session
            .add_resident(draft("Paula Reis", "302", "late"))
            .expect_err("invalid status");
        assert!(error.to_string().contains("invalid payment status 'late'"));
        assert_eq!(session.residents().len(), 1);
    }

    #[test]
    fn double_spot_configuration_replaces_previous_flags() {
        let mut session = session_with_residents();

        let update = session.configure_double_spots(["101", " 999 "]);
        assert_eq!(update.enabled, 1);
        assert_eq!(update.unknown, vec!["999".to_string()]);
        assert!(session.residents()[0].has_double_spot);

        let update = session.configure_double_spots(["102"]);
        assert_eq!(update.enabled, 1);
        assert!(!session.residents()[0].has_double_spot);
        assert!(session.residents()[1].has_double_spot);
    }

    #[test]
    fn draws_are_appended_to_history() {
        let mut session = session_with_residents();
        let import = SpotImporter::from_reader(Cursor::new("G1,G2,TERREO\n1,,\n"), None)
            .expect("spot import");
        session.replace_spots(import);
        assert_eq!(session.spot_layout(), Some(SpotLayout::Sections));

        let engine = LotteryEngine::default();
        let mut rng = StdRng::seed_from_u64(11);
        let first_id = session.draw_with_rng(&engine, &mut rng).id.clone();
        let second_id = session.draw_with_rng(&engine, &mut rng).id.clone();

        assert_eq!(session.results().len(), 2);
        assert_ne!(first_id, second_id);
        let latest = session.latest().expect("latest result");
        assert_eq!(latest.id, second_id);
        assert_eq!(latest.entries.len(), 1);
        assert_eq!(latest.entries[0].observation, Observation::Drawn);
    }

    #[test]
    fn generated_spots_replace_inventory() {
        let mut session = LotterySession::new();
        session.generate_spots(1, 2);
        assert_eq!(session.spots().len(), 3);
        assert_eq!(session.spots()[2].category, SpotCategory::Uncovered);
        assert!(session.latest().is_none());
    }
}
