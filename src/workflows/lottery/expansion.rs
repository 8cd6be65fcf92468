use super::domain::{Candidate, Resident};

/// Turns eligible residents into draw tickets. Residents holding a double-spot
/// entitlement get a second, secondary ticket appended after all primaries.
pub fn expand<'a, I>(eligible: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = &'a Resident>,
{
    let mut primaries = Vec::new();
    let mut secondaries = Vec::new();

    for resident in eligible {
        let candidate = Candidate {
            apartment: resident.apartment.clone(),
            resident_id: resident.id.clone(),
            resident_name: resident.name.clone(),
            secondary_slot: false,
        };

        if resident.has_double_spot {
            secondaries.push(Candidate {
                secondary_slot: true,
                ..candidate.clone()
            });
        }
        primaries.push(candidate);
    }

    primaries.extend(secondaries);
    primaries
}
