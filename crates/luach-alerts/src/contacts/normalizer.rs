use chrono::{DateTime, NaiveDate};

pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Dates as they show up in exported sheets; anything else counts as absent.
pub fn parse_sheet_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Splits a comma or semicolon separated list, keeping the first spelling of
/// each address.
pub fn split_recipients(value: &str) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    for address in value.split([',', ';']).map(str::trim) {
        if address.is_empty() {
            continue;
        }
        if recipients
            .iter()
            .any(|known| known.eq_ignore_ascii_case(address))
        {
            continue;
        }
        recipients.push(address.to_string());
    }
    recipients
}
