/// Strips byte-order marks and zero-width characters spreadsheet exports leave
/// behind, then trims.
pub(crate) fn clean_cell(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(clean_cell).filter(|cell| !cell.is_empty())
}

/// Yes/no answers in either English or Portuguese. Empty cells read as "no".
pub(crate) fn parse_flag(value: Option<&str>) -> Option<bool> {
    let cleaned = value.map(clean_cell).unwrap_or_default();
    match cleaned.to_lowercase().as_str() {
        "" | "no" | "n" | "false" | "não" | "nao" => Some(false),
        "yes" | "y" | "true" | "sim" | "s" => Some(true),
        _ => None,
    }
}

/// SIM/NÃO columns of the detailed spot layout: anything but SIM is false.
pub(crate) fn is_sim(value: Option<&str>) -> bool {
    value
        .map(clean_cell)
        .is_some_and(|cell| cell.to_uppercase() == "SIM")
}

pub(crate) fn split_apartments(value: Option<&str>) -> Vec<String> {
    value
        .map(|list| {
            list.split(',')
                .map(clean_cell)
                .filter(|apartment| !apartment.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
