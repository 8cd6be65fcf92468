//! Tabular exports of lottery results and blank import templates.

mod csv_export;
mod templates;
mod xlsx;

pub use csv_export::result_csv;
pub use templates::TemplateKind;
pub use xlsx::result_xlsx;

use super::domain::SpotLayout;
use super::report::{AssignmentView, LotteryReport};

pub const DETAILED_RESULT_HEADERS: [&str; 6] = [
    "Número da Vaga",
    "Localização",
    "Tipo de Vaga",
    "Apartamento",
    "Morador",
    "Observações",
];

pub const SECTIONS_RESULT_HEADERS: [&str; 6] = [
    "Setor",
    "Vaga",
    "Categoria",
    "Apartamento",
    "Morador",
    "Observação",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush export buffer: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to build XLSX workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Result rows in export column order. Columns follow the spot layout the
/// draw ran over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    pub headers: [&'static str; 6],
    pub rows: Vec<[String; 6]>,
}

impl ResultTable {
    pub fn from_report(report: &LotteryReport) -> Self {
        let headers = match report.layout {
            SpotLayout::Detailed => DETAILED_RESULT_HEADERS,
            SpotLayout::Sections => SECTIONS_RESULT_HEADERS,
        };
        let rows = report
            .assignments
            .iter()
            .map(|view| row(report.layout, view))
            .collect();

        Self { headers, rows }
    }
}

fn row(layout: SpotLayout, view: &AssignmentView) -> [String; 6] {
    let resident = view.resident_name.clone().unwrap_or_default();
    match layout {
        SpotLayout::Detailed => [
            view.spot_number.clone(),
            view.section.clone(),
            view.kind_label.unwrap_or_default().to_string(),
            view.apartment.clone(),
            resident,
            view.observation_label.to_string(),
        ],
        SpotLayout::Sections => [
            view.section.clone(),
            view.spot_number.clone(),
            view.category_label.to_string(),
            view.apartment.clone(),
            resident,
            view.observation_label.to_string(),
        ],
    }
}

/// Suggested download name, e.g. `sorteio_lottery-000003.csv`.
pub fn result_file_name(report: &LotteryReport, extension: &str) -> String {
    format!("sorteio_{}.{extension}", report.lottery_id)
}
