//! Sentinel strings written in place of real contact data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by every "not found" sentinel.
pub const NOT_FOUND: &str = "Not found";

/// A fixed, recognizable failure value stored in [`crate::SellerRecord::email`].
///
/// Downstream code distinguishes failure kinds by these exact strings, so the
/// wire text of each variant must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentinel {
    /// Generic miss: a field pattern did not match or no product was listed.
    NotFound,
    /// The listing page did not come back after applying the filter.
    NavigationFailed,
    /// The auxiliary context could not be opened.
    PopupBlocked,
    /// The auxiliary context never finished loading.
    TabLoadTimeout,
    /// The seller page had no contact tab.
    NoContactTab,
    /// The contact tab opened but its content region stayed empty.
    NoContactContent,
    /// The facet checkbox vanished from the live document.
    CheckboxMissing,
    /// An error escaped the per-seller scope.
    UnexpectedError,
    /// The "sold & shipped by" link never rendered on the product page.
    SellerLinkNotFound,
}

impl Sentinel {
    pub const ALL: [Sentinel; 9] = [
        Sentinel::NotFound,
        Sentinel::NavigationFailed,
        Sentinel::PopupBlocked,
        Sentinel::TabLoadTimeout,
        Sentinel::NoContactTab,
        Sentinel::NoContactContent,
        Sentinel::CheckboxMissing,
        Sentinel::UnexpectedError,
        Sentinel::SellerLinkNotFound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentinel::NotFound => NOT_FOUND,
            Sentinel::NavigationFailed => "Not found - Navigation failed",
            Sentinel::PopupBlocked => "Not found - Popup blocked",
            Sentinel::TabLoadTimeout => "Not found - Tab load timeout",
            Sentinel::NoContactTab => "Not found - No contact tab",
            Sentinel::NoContactContent => "Not found - No contact content",
            Sentinel::CheckboxMissing => "Not found - Checkbox missing",
            Sentinel::UnexpectedError => "Not found - Unexpected error",
            Sentinel::SellerLinkNotFound => "Sold & shipped by not found",
        }
    }

    /// Looks up the sentinel with exactly this wire text.
    pub fn parse(value: &str) -> Option<Sentinel> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Whether `value` denotes a failure rather than real data.
    ///
    /// Besides the known sentinels, anything mentioning "not found" counts,
    /// so records written by older runs are tagged consistently.
    pub fn is_sentinel(value: &str) -> bool {
        Self::parse(value).is_some() || value.to_ascii_lowercase().contains("not found")
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Sentinel> for String {
    fn from(s: Sentinel) -> Self {
        s.as_str().to_string()
    }
}
