use super::xlsx::{write_workbook, Sheet};
use super::ExportError;
use crate::workflows::lottery::import::{DETAILED_HEADERS, RESIDENT_HEADERS, SECTION_HEADERS};
use serde::Serialize;

/// Blank workbooks operators fill in before importing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Residents,
    SpotSections,
    SpotDetailed,
}

const RESIDENT_INSTRUCTIONS: [&str; 10] = [
    "Status de Pagamento deve ser:",
    "current - pagamentos em dia",
    "overdue - pagamentos em atraso",
    "delinquent - inadimplentes",
    "",
    "Possui Justificativa deve ser:",
    "sim - morador com justificativa",
    "não - morador sem justificativa",
    "",
    "Meses em Atraso: número inteiro (0 ou maior)",
];

const SECTION_INSTRUCTIONS: [&str; 5] = [
    "Preencha apenas as colunas G1, G2 e TERREO com os números das vagas.",
    "Um número repetido NA MESMA COLUNA indica vaga dupla.",
    "G1 e G2 são vagas cobertas; TERREO é vaga descoberta.",
    "Células em branco são ignoradas.",
    "Os números podem conter letras (ex: 120C).",
];

const DETAILED_INSTRUCTIONS: [&str; 8] = [
    "Preencha as colunas conforme o modelo:",
    "- Número da Vaga: identificador da vaga",
    "- Localização: TÉRREO, G1, G2, etc.",
    "- Tipo de Vaga: ÚNICA, DUPLA ou VISITANTE",
    "- Pré-Selecionada: SIM ou NÃO (vagas pré-selecionadas não entram no sorteio)",
    "- Regra Oculta: SIM ou NÃO (vagas com regra oculta não são sorteadas)",
    "- Apartamentos Elegíveis: números separados por vírgula (ex: 101,102,103)",
    "Deixe 'Apartamentos Elegíveis' em branco para vagas VISITANTE.",
];

impl TemplateKind {
    pub const ALL: [Self; 3] = [Self::Residents, Self::SpotSections, Self::SpotDetailed];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "residents" => Some(Self::Residents),
            "spots-sections" | "sections" => Some(Self::SpotSections),
            "spots-detailed" | "detailed" => Some(Self::SpotDetailed),
            _ => None,
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Residents => "residents",
            Self::SpotSections => "spots-sections",
            Self::SpotDetailed => "spots-detailed",
        }
    }

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Residents => "modelo_moradores.xlsx",
            Self::SpotSections => "modelo_vagas.xlsx",
            Self::SpotDetailed => "modelo_vagas_sorteio.xlsx",
        }
    }

    fn data_sheet(self) -> &'static str {
        match self {
            Self::Residents => "Moradores",
            Self::SpotSections | Self::SpotDetailed => "Vagas",
        }
    }

    fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Residents => &RESIDENT_HEADERS,
            Self::SpotSections => &SECTION_HEADERS,
            Self::SpotDetailed => &DETAILED_HEADERS,
        }
    }

    fn instructions(self) -> &'static [&'static str] {
        match self {
            Self::Residents => &RESIDENT_INSTRUCTIONS,
            Self::SpotSections => &SECTION_INSTRUCTIONS,
            Self::SpotDetailed => &DETAILED_INSTRUCTIONS,
        }
    }

    fn sample_rows(self) -> Vec<Vec<String>> {
        let rows: &[&[&str]] = match self {
            Self::Residents => &[
                &["João Silva", "101", "current", "0", "não"],
                &["Maria Santos", "102", "overdue", "2", "não"],
                &["Carlos Oliveira", "201", "delinquent", "5", "sim"],
            ],
            Self::SpotSections => &[
                &["101", "", ""],
                &["102", "201", ""],
                &["", "202", "T01"],
                &["105", "105", ""],
            ],
            Self::SpotDetailed => &[
                &["1", "TÉRREO", "DUPLA", "NÃO", "NÃO", "101,102,103"],
                &["2", "TÉRREO", "ÚNICA", "SIM", "NÃO", "201,202"],
                &["3", "TÉRREO", "VISITANTE", "NÃO", "SIM", ""],
            ],
        };

        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    /// Data sheet with sample rows plus an instructions sheet.
    pub fn workbook(self) -> Result<Vec<u8>, ExportError> {
        let instructions = self
            .instructions()
            .iter()
            .map(|line| vec![line.to_string()])
            .collect();

        write_workbook(&[
            Sheet {
                name: self.data_sheet(),
                headers: self.headers(),
                rows: self.sample_rows(),
            },
            Sheet {
                name: "Instruções",
                headers: &["Instruções de Preenchimento"],
                rows: instructions,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::lottery::import::{ResidentImporter, SpotImporter};
    use crate::workflows::lottery::domain::SpotLayout;
    use std::io::Cursor;

    #[test]
    fn parse_accepts_slugs_and_short_names() {
        for kind in TemplateKind::ALL {
            assert_eq!(TemplateKind::parse(kind.slug()), Some(kind));
        }
        assert_eq!(TemplateKind::parse("detailed"), Some(TemplateKind::SpotDetailed));
        assert_eq!(
            TemplateKind::parse("SPOTS_SECTIONS"),
            Some(TemplateKind::SpotSections)
        );
        assert_eq!(TemplateKind::parse("visitors"), None);
    }

    #[test]
    fn every_template_builds() {
        for kind in TemplateKind::ALL {
            let bytes = kind.workbook().expect("template workbook");
            assert!(bytes.starts_with(b"PK"), "{kind:?} is not an xlsx container");
        }
    }

    #[test]
    fn template_workbooks_import_as_uploaded() {
        let residents = ResidentImporter::from_reader(Cursor::new(
            TemplateKind::Residents.workbook().expect("resident template"),
        ))
        .expect("resident template imports");
        assert_eq!(residents.residents.len(), 3);
        assert_eq!(residents.residents[0].apartment, "101");
        assert!(residents.residents[2].has_justification);

        let sections = SpotImporter::from_reader(
            Cursor::new(TemplateKind::SpotSections.workbook().expect("sections template")),
            None,
        )
        .expect("sections template imports");
        assert_eq!(sections.layout, SpotLayout::Sections);
        assert_eq!(sections.spots.len(), 7);

        let detailed = SpotImporter::from_reader(
            Cursor::new(TemplateKind::SpotDetailed.workbook().expect("detailed template")),
            None,
        )
        .expect("detailed template imports");
        assert_eq!(detailed.layout, SpotLayout::Detailed);
        assert_eq!(detailed.spots.len(), 3);
        assert_eq!(detailed.spots[0].eligible_apartments, vec!["101", "102", "103"]);
        assert!(detailed.skipped.is_empty());
    }
}
