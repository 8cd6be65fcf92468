use super::fields::{non_empty, parse_flag};
use super::table::{is_blank_row, RawTable, SheetError};
use super::RowError;
use crate::workflows::lottery::domain::{LotteryWarning, PaymentStatus, Resident, ResidentId};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

pub const RESIDENT_HEADERS: [&str; 5] = [
    "Nome",
    "Apartamento",
    "Status de Pagamento",
    "Meses em Atraso",
    "Possui Justificativa",
];

static RESIDENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_resident_id() -> ResidentId {
    let id = RESIDENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ResidentId(format!("resident-{id:06}"))
}

#[derive(Debug, Clone)]
pub struct ResidentImport {
    pub residents: Vec<Resident>,
    pub warnings: Vec<LotteryWarning>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResidentImportError {
    #[error("failed to read resident spreadsheet: {0}")]
    Sheet(#[from] SheetError),
    #[error("invalid resident row data: {0}")]
    Csv(#[from] csv::Error),
    #[error("resident import rejected: {}", summarize(.0))]
    Validation(Vec<RowError>),
}

impl ResidentImportError {
    pub fn row_errors(&self) -> &[RowError] {
        match self {
            Self::Validation(errors) => errors,
            Self::Sheet(_) | Self::Csv(_) => &[],
        }
    }
}

fn summarize(errors: &[RowError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One spreadsheet row before validation. Manual entries go through the same rules.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResidentDraft {
    #[serde(rename = "Nome", alias = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Apartamento", alias = "Apartment", default)]
    pub apartment: Option<String>,
    #[serde(rename = "Status de Pagamento", alias = "Payment Status", default)]
    pub payment_status: Option<String>,
    #[serde(rename = "Meses em Atraso", alias = "Months Overdue", default)]
    pub months_overdue: Option<String>,
    #[serde(rename = "Possui Justificativa", alias = "Has Justification", default)]
    pub has_justification: Option<String>,
}

impl ResidentDraft {
    /// Validates the draft. Only the first problem of a row is reported.
    pub fn validate(self, row: usize) -> Result<Resident, RowError> {
        self.into_resident().map_err(|message| RowError::new(row, message))
    }

    /// Same rules as a spreadsheet row, for manually entered residents.
    pub fn into_resident(self) -> Result<Resident, String> {
        let name = non_empty(self.name.as_deref())
            .ok_or_else(|| "name (Nome) is required".to_string())?;
        let apartment = non_empty(self.apartment.as_deref())
            .ok_or_else(|| "apartment (Apartamento) is required".to_string())?;

        let raw_status = non_empty(self.payment_status.as_deref()).unwrap_or_default();
        let payment_status = PaymentStatus::parse(&raw_status).ok_or_else(|| {
            format!("invalid payment status '{raw_status}' (expected current, overdue or delinquent)")
        })?;

        let months_overdue = match non_empty(self.months_overdue.as_deref()) {
            None => 0,
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                format!("months overdue must be a non-negative integer (got '{raw}')")
            })?,
        };

        let has_justification = parse_flag(self.has_justification.as_deref()).ok_or_else(|| {
            format!(
                "invalid justification '{}' (expected yes/no or true/false)",
                self.has_justification.as_deref().unwrap_or_default().trim()
            )
        })?;

        Ok(Resident {
            id: next_resident_id(),
            name,
            apartment,
            payment_status,
            months_overdue,
            has_justification,
            has_double_spot: false,
        })
    }
}

pub struct ResidentImporter;

impl ResidentImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ResidentImport, ResidentImportError> {
        let file = std::fs::File::open(path).map_err(SheetError::from)?;
        Self::from_reader(file)
    }

    /// Reads CSV or XLSX. All-or-nothing: a single invalid row rejects the whole file.
    pub fn from_reader<R: Read>(reader: R) -> Result<ResidentImport, ResidentImportError> {
        let table = RawTable::from_reader(reader)?;

        let mut residents = Vec::new();
        let mut errors = Vec::new();

        for (row, record) in table.numbered_rows() {
            // Rows whose values sit under unknown headers still fail validation.
            if is_blank_row(record) {
                continue;
            }

            let draft: ResidentDraft = record.deserialize(Some(&table.headers))?;
            match draft.validate(row) {
                Ok(resident) => residents.push(resident),
                Err(error) => errors.push(error),
            }
        }

        if !errors.is_empty() {
            warn!(errors = errors.len(), "resident import rejected");
            return Err(ResidentImportError::Validation(errors));
        }

        let mut warnings = Vec::new();
        if residents.is_empty() {
            warnings.push(LotteryWarning::NoValidRows);
        }

        info!(residents = residents.len(), "resident import accepted");
        Ok(ResidentImport {
            residents,
            warnings,
        })
    }
}
