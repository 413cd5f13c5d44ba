//! Contact-text parsing.
//!
//! Total and deterministic: every field falls back to `"Not found"`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use harvest_protocols::{NOT_FOUND, SellerRecord};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._-]+@[a-zA-Z0-9._-]+\.[a-zA-Z0-9_-]+").expect("Invalid regex")
});

static BUSINESS_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Legal Business Name:\s*(.+?)(?:Headquarters:|$)").expect("Invalid regex")
});

static HEADQUARTERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Headquarters:(.+?)(?:Contact|Partner Information|$)").expect("Invalid regex")
});

/// Fields pulled out of a seller's contact region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDetails {
    pub business_name: String,
    pub email: String,
    pub headquarters: String,
}

impl Default for ContactDetails {
    fn default() -> Self {
        Self {
            business_name: NOT_FOUND.to_string(),
            email: NOT_FOUND.to_string(),
            headquarters: NOT_FOUND.to_string(),
        }
    }
}

impl ContactDetails {
    pub fn has_valid_email(&self) -> bool {
        self.email != NOT_FOUND && self.email.contains('@')
    }

    /// Number of fields that were actually found.
    pub fn completeness(&self) -> usize {
        [&self.business_name, &self.email, &self.headquarters]
            .into_iter()
            .filter(|v| v.as_str() != NOT_FOUND)
            .count()
    }

    pub fn into_record(self, id: usize, unique_id: &str, store_link: &str) -> SellerRecord {
        SellerRecord::found(id, unique_id, self.business_name, self.email, self.headquarters)
            .with_store_link(store_link)
    }
}

/// Parse the raw text of a contact region.
pub fn parse_contact(raw: &str) -> ContactDetails {
    let mut details = ContactDetails::default();

    if let Some(m) = EMAIL_RE.find(raw) {
        details.email = m.as_str().to_string();
    }

    if let Some(name) = BUSINESS_NAME_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
    {
        details.business_name = name.to_string();
    }

    if let Some(span) = HEADQUARTERS_RE.captures(raw).and_then(|c| c.get(1)) {
        let summary = span
            .as_str()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if !summary.is_empty() {
            details.headquarters = summary;
        }
    }

    details
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
