use super::domain::{AssignmentEntry, LotteryResult, Observation, SpotCategory, SpotLayout};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SECOND_SPOT_SUFFIX: &str = "(2nd spot)";

/// Orders entries by the numeric value of their spot number. The sort is
/// stable, so ties keep their draw order and re-sorting is a no-op.
pub fn sort_entries(entries: &mut [AssignmentEntry]) {
    entries.sort_by_key(AssignmentEntry::number_value);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentView {
    pub spot_number: String,
    pub section: String,
    pub category: SpotCategory,
    pub category_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind_label: Option<&'static str>,
    pub apartment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resident_name: Option<String>,
    pub observation: Observation,
    pub observation_label: &'static str,
}

impl From<&AssignmentEntry> for AssignmentView {
    fn from(entry: &AssignmentEntry) -> Self {
        let apartment = match &entry.assignee {
            Some(assignee) if assignee.secondary_slot => {
                format!("{} {SECOND_SPOT_SUFFIX}", assignee.apartment)
            }
            Some(assignee) => assignee.apartment.clone(),
            None => String::new(),
        };

        Self {
            spot_number: entry.spot.number.clone(),
            section: entry.spot.section.label().to_string(),
            category: entry.spot.category,
            category_label: entry.spot.category.label(),
            kind_label: entry.spot.kind.map(|kind| kind.label()),
            apartment,
            resident_name: entry
                .assignee
                .as_ref()
                .and_then(|assignee| assignee.resident_name.clone()),
            observation: entry.observation,
            observation_label: entry.observation.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LotteryReport {
    pub lottery_id: String,
    pub drawn_at: DateTime<Utc>,
    pub layout: SpotLayout,
    pub drawn: usize,
    pub unassigned: usize,
    pub assignments: Vec<AssignmentView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<&'static str>,
}

impl LotteryReport {
    pub fn from_result(result: &LotteryResult) -> Self {
        let mut entries = result.entries.clone();
        sort_entries(&mut entries);

        let drawn = entries
            .iter()
            .filter(|entry| entry.observation == Observation::Drawn)
            .count();
        let unassigned = entries
            .iter()
            .filter(|entry| entry.assignee.is_none())
            .count();

        Self {
            lottery_id: result.id.0.clone(),
            drawn_at: result.drawn_at,
            layout: SpotLayout::of(&entries),
            drawn,
            unassigned,
            assignments: entries.iter().map(AssignmentView::from).collect(),
            warnings: result
                .warnings
                .iter()
                .map(|warning| warning.message())
                .collect(),
        }
    }

    pub fn by_category(&self, category: SpotCategory) -> impl Iterator<Item = &AssignmentView> {
        self.assignments
            .iter()
            .filter(move |view| view.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::lottery::domain::{
        Assignee, LotteryId, ResidentId, SpotDescriptor, SpotId, SpotKind, SpotSection,
    };

    fn entry(number: &str, assignee: Option<Assignee>, observation: Observation) -> AssignmentEntry {
        AssignmentEntry {
            spot: SpotDescriptor {
                id: SpotId(format!("spot-{number}")),
                number: number.to_string(),
                section: SpotSection::G2,
                category: SpotCategory::Covered,
                kind: None,
            },
            assignee,
            observation,
        }
    }

    fn assignee(apartment: &str, secondary_slot: bool) -> Assignee {
        Assignee {
            apartment: apartment.to_string(),
            resident_id: Some(ResidentId(format!("r-{apartment}"))),
            resident_name: Some("Lucia Pereira".to_string()),
            secondary_slot,
        }
    }

    #[test]
    fn sorting_is_numeric_and_idempotent() {
        let mut entries = vec![
            entry("10", None, Observation::NotDrawable),
            entry("C01", None, Observation::NotDrawable),
            entry("2", None, Observation::NotDrawable),
            entry("x", None, Observation::NotDrawable),
        ];

        sort_entries(&mut entries);
        let numbers: Vec<_> = entries.iter().map(|e| e.spot.number.as_str()).collect();
        assert_eq!(numbers, vec!["C01", "x", "2", "10"]);

        let once = entries.clone();
        sort_entries(&mut entries);
        assert_eq!(entries, once);
    }

    #[test]
    fn secondary_winner_is_rendered_with_suffix() {
        let view = AssignmentView::from(&entry(
            "3",
            Some(assignee("202", true)),
            Observation::Drawn,
        ));
        assert_eq!(view.apartment, "202 (2nd spot)");
        assert_eq!(view.observation_label, "drawn");

        let view = AssignmentView::from(&entry(
            "4",
            Some(assignee("202", false)),
            Observation::Drawn,
        ));
        assert_eq!(view.apartment, "202");
    }

    #[test]
    fn report_counts_drawn_and_unassigned() {
        let mut detailed = entry("1", None, Observation::NotDrawable);
        detailed.spot.kind = Some(SpotKind::Visitor);
        let result = LotteryResult {
            id: LotteryId("lottery-000042".to_string()),
            drawn_at: Utc::now(),
            entries: vec![
                entry("2", Some(assignee("101", false)), Observation::Drawn),
                detailed,
            ],
            warnings: Vec::new(),
        };

        let report = LotteryReport::from_result(&result);
        assert_eq!(report.layout, SpotLayout::Detailed);
        assert_eq!(report.drawn, 1);
        assert_eq!(report.unassigned, 1);
        assert_eq!(report.assignments[0].spot_number, "1");
        assert_eq!(report.assignments[0].kind_label, Some("VISITANTE"));
        assert_eq!(report.by_category(SpotCategory::Covered).count(), 2);
    }
}
