//! Export and viewing of collected seller records.

use serde::Serialize;

use harvest_protocols::{NOT_FOUND, SellerRecord};

const CSV_HEADERS: [&str; 6] = [
    "ID",
    "Seller ID",
    "Business Name",
    "Email",
    "Headquarters",
    "Store Link",
];

/// Pretty JSON of the records, field names as stored.
pub fn to_json(records: &[SellerRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// CSV with an unquoted header row and every data field quoted.
///
/// Empty input yields an empty string, not a lone header.
pub fn to_csv(records: &[SellerRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for record in records {
        let id = record.id.to_string();
        let cells = [
            id.as_str(),
            record.unique_id.as_str(),
            record.business_name.as_deref().unwrap_or(""),
            record.email.as_str(),
            record.headquarters.as_deref().unwrap_or(""),
            record.store_link.as_deref().unwrap_or(""),
        ];
        let row: Vec<String> = cells.iter().map(|cell| quote(cell)).collect();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Case-insensitive substring search over business name, email and seller id.
pub fn filter_records<'a>(records: &'a [SellerRecord], query: &str) -> Vec<&'a SellerRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return records.iter().collect();
    }

    let matches = |field: &str| field.to_lowercase().contains(&query);

    records
        .iter()
        .filter(|record| {
            record.business_name.as_deref().is_some_and(matches)
                || matches(&record.email)
                || matches(&record.unique_id)
        })
        .collect()
}

/// Viewer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordStats {
    pub total: usize,
    pub with_email: usize,
}

impl RecordStats {
    pub fn from_records(records: &[SellerRecord]) -> Self {
        Self {
            total: records.len(),
            with_email: records.iter().filter(|r| r.is_found()).count(),
        }
    }
}

/// Plain-text table, one line per record.
pub fn render_table(records: &[&SellerRecord]) -> String {
    let mut out = format!(
        "{:<5} {:<14} {:<30} {:<34} {:<10}\n",
        "ID", "Seller ID", "Business Name", "Email", "Status"
    );

    for record in records {
        let status = if record.is_found() { "Found" } else { "Not Found" };
        out.push_str(&format!(
            "{:<5} {:<14} {:<30} {:<34} {:<10}\n",
            record.id,
            truncate(&record.unique_id, 14),
            truncate(record.business_name.as_deref().unwrap_or("N/A"), 30),
            truncate(&record.email, 34),
            status,
        ));

        if let Some(link) = record.store_link.as_deref().filter(|l| !l.contains(NOT_FOUND)) {
            out.push_str(&format!("      {}\n", link));
        }
    }

    out
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
