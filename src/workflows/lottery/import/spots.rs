use super::fields::{is_sim, non_empty, split_apartments};
use super::table::{is_blank_row, RawTable, SheetError};
use crate::workflows::lottery::domain::{
    LotteryWarning, Observation, ParkingSpot, SpotCategory, SpotId, SpotKind, SpotLayout,
    SpotSection,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub const SECTION_HEADERS: [&str; 3] = ["G1", "G2", "TERREO"];

pub const DETAILED_HEADERS: [&str; 6] = [
    "Número da Vaga",
    "Localização",
    "Tipo de Vaga",
    "Pré-Selecionada",
    "Regra Oculta",
    "Apartamentos Elegíveis",
];

pub const DOUBLE_SPOT_NOTE: &str = "double spot";

#[derive(Debug, Clone)]
pub struct SpotImport {
    pub layout: SpotLayout,
    pub spots: Vec<ParkingSpot>,
    pub skipped: Vec<SkippedRow>,
    pub warnings: Vec<LotteryWarning>,
}

/// Detailed-layout row left out of the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SpotImportError {
    #[error("failed to read spot spreadsheet: {0}")]
    Sheet(#[from] SheetError),
    #[error("invalid spot row data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unrecognized spot layout: expected columns G1, G2, TERREO or Número da Vaga")]
    UnknownLayout,
}

pub struct SpotImporter;

impl SpotImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        layout: Option<SpotLayout>,
    ) -> Result<SpotImport, SpotImportError> {
        let file = std::fs::File::open(path).map_err(SheetError::from)?;
        Self::from_reader(file, layout)
    }

    /// Reads a CSV or XLSX spot spreadsheet. Without an explicit layout the header
    /// row decides.
    pub fn from_reader<R: Read>(
        reader: R,
        layout: Option<SpotLayout>,
    ) -> Result<SpotImport, SpotImportError> {
        let table = RawTable::from_reader(reader)?;
        let headers: Vec<String> = table.headers.iter().map(str::to_string).collect();

        let layout = match layout {
            Some(layout) => layout,
            None => detect_layout(&headers).ok_or(SpotImportError::UnknownLayout)?,
        };

        let import = match layout {
            SpotLayout::Sections => read_sections(&table, &headers)?,
            SpotLayout::Detailed => read_detailed(&table)?,
        };

        info!(
            ?layout,
            spots = import.spots.len(),
            skipped = import.skipped.len(),
            "spot import finished"
        );
        Ok(import)
    }
}

pub fn detect_layout(headers: &[String]) -> Option<SpotLayout> {
    let has = |name: &str| headers.iter().any(|header| header == name);

    if has(DETAILED_HEADERS[0]) || has("Numero da Vaga") {
        Some(SpotLayout::Detailed)
    } else if SECTION_HEADERS.iter().any(|section| has(section)) {
        Some(SpotLayout::Sections)
    } else {
        None
    }
}

fn read_sections(table: &RawTable, headers: &[String]) -> Result<SpotImport, SpotImportError> {
    let columns: Vec<(SpotSection, usize)> = SECTION_HEADERS
        .iter()
        .filter_map(|name| {
            headers
                .iter()
                .position(|header| header == name)
                .map(|index| (SpotSection::parse(name), index))
        })
        .collect();
    if columns.is_empty() {
        return Err(SpotImportError::UnknownLayout);
    }

    let mut values: Vec<Vec<String>> = vec![Vec::new(); columns.len()];
    for record in &table.rows {
        for (slot, (_, index)) in columns.iter().enumerate() {
            if let Some(value) = non_empty(record.get(*index)) {
                values[slot].push(value);
            }
        }
    }

    let mut spots = Vec::new();
    for ((section, _), numbers) in columns.into_iter().zip(values) {
        let mut totals: HashMap<&str, usize> = HashMap::new();
        for number in &numbers {
            *totals.entry(number.as_str()).or_default() += 1;
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for number in &numbers {
            let occurrence = seen.entry(number.as_str()).or_default();
            *occurrence += 1;
            let repeated = totals.get(number.as_str()).copied().unwrap_or(1) > 1;

            spots.push(ParkingSpot {
                id: SpotId(format!(
                    "{}-{}-{}",
                    section.label().to_lowercase(),
                    number,
                    occurrence
                )),
                number: number.clone(),
                category: section.default_category(),
                section: section.clone(),
                kind: None,
                pre_selected: false,
                hidden_rule: false,
                eligible_apartments: Vec::new(),
                observations: if repeated {
                    DOUBLE_SPOT_NOTE.to_string()
                } else {
                    String::new()
                },
            });
        }
    }

    Ok(finish(SpotLayout::Sections, spots, Vec::new()))
}

#[derive(Debug, Deserialize)]
struct DetailedRow {
    #[serde(rename = "Número da Vaga", alias = "Numero da Vaga", default)]
    number: Option<String>,
    #[serde(rename = "Localização", alias = "Localizacao", default)]
    location: Option<String>,
    #[serde(rename = "Tipo de Vaga", default)]
    kind: Option<String>,
    #[serde(rename = "Pré-Selecionada", alias = "Pre-Selecionada", default)]
    pre_selected: Option<String>,
    #[serde(rename = "Regra Oculta", default)]
    hidden_rule: Option<String>,
    #[serde(
        rename = "Apartamentos Elegíveis",
        alias = "Apartamentos Elegiveis",
        default
    )]
    eligible_apartments: Option<String>,
}

fn read_detailed(table: &RawTable) -> Result<SpotImport, SpotImportError> {
    let mut spots = Vec::new();
    let mut skipped = Vec::new();

    for (row, record) in table.numbered_rows() {
        let parsed: DetailedRow = record.deserialize(Some(&table.headers))?;

        let number = non_empty(parsed.number.as_deref());
        let location = non_empty(parsed.location.as_deref());
        let raw_kind = non_empty(parsed.kind.as_deref());

        let (Some(number), Some(location), Some(raw_kind)) = (number, location, raw_kind) else {
            if !is_blank_row(record) {
                warn!(row, "spot row missing number, location or type; skipping");
                skipped.push(SkippedRow {
                    row,
                    reason: "missing number, location or type".to_string(),
                });
            }
            continue;
        };

        let Some(kind) = SpotKind::parse(&raw_kind) else {
            warn!(row, kind = %raw_kind, "spot row has invalid type; skipping");
            skipped.push(SkippedRow {
                row,
                reason: format!("invalid type '{raw_kind}' (expected ÚNICA, DUPLA or VISITANTE)"),
            });
            continue;
        };

        let pre_selected = is_sim(parsed.pre_selected.as_deref());
        let hidden_rule = is_sim(parsed.hidden_rule.as_deref());
        let section = SpotSection::parse(&location);
        let observations = if pre_selected {
            Observation::PreSelected.label().to_string()
        } else if hidden_rule {
            Observation::NotDrawable.label().to_string()
        } else {
            String::new()
        };

        spots.push(ParkingSpot {
            id: SpotId(format!("spot-{number}-{row}")),
            number,
            category: section.default_category(),
            section,
            kind: Some(kind),
            pre_selected,
            hidden_rule,
            eligible_apartments: split_apartments(parsed.eligible_apartments.as_deref()),
            observations,
        });
    }

    Ok(finish(SpotLayout::Detailed, spots, skipped))
}

fn finish(layout: SpotLayout, spots: Vec<ParkingSpot>, skipped: Vec<SkippedRow>) -> SpotImport {
    let mut warnings = Vec::new();
    if spots.is_empty() {
        warnings.push(LotteryWarning::NoSpotsConfigured);
    }
    SpotImport {
        layout,
        spots,
        skipped,
        warnings,
    }
}

/// Builds `C01…` covered and `D01…` uncovered spots from plain counts.
pub fn generate_spots(covered: usize, uncovered: usize) -> Vec<ParkingSpot> {
    let plan = [
        (SpotCategory::Covered, 'C', covered),
        (SpotCategory::Uncovered, 'D', uncovered),
    ];

    plan.iter()
        .flat_map(|&(category, prefix, count)| {
            (1..=count).map(move |index| ParkingSpot {
                id: SpotId(format!("{}{index}", prefix.to_ascii_lowercase())),
                number: format!("{prefix}{index:02}"),
                section: SpotSection::Other(category.label().to_string()),
                category,
                kind: None,
                pre_selected: false,
                hidden_rule: false,
                eligible_apartments: Vec::new(),
                observations: String::new(),
            })
        })
        .collect()
}
