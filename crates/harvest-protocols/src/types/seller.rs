//! Seller facets and persisted seller records.

use serde::{Deserialize, Serialize};

use super::sentinel::{NOT_FOUND, Sentinel};

/// A filter control as reported by the probe, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetControl {
    /// Identifier extracted from the control attribute (prefix already stripped).
    pub id: String,
    /// `disabled` or `aria-disabled="true"` on the control.
    pub disabled: bool,
}

impl FacetControl {
    pub fn new(id: impl Into<String>, disabled: bool) -> Self {
        Self {
            id: id.into(),
            disabled,
        }
    }
}

/// One selectable seller option in the filter panel.
///
/// Enumerated fresh every time the panel opens; never cached across reopenings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerFacet {
    pub id: String,
    pub is_selectable: bool,
}

impl SellerFacet {
    /// Classify a raw control. The out-of-stock meta option is never selectable.
    pub fn from_control(control: &FacetControl, out_of_stock_marker: &str) -> Self {
        let is_selectable = !control.disabled && !Self::is_out_of_stock(&control.id, out_of_stock_marker);
        Self {
            id: control.id.clone(),
            is_selectable,
        }
    }

    /// Whether a facet id denotes the "include out-of-stock" toggle.
    pub fn is_out_of_stock(id: &str, marker: &str) -> bool {
        !marker.is_empty() && id.contains(marker)
    }
}

/// Navigation step captured from the listing page's breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbStep {
    pub name: String,
    pub href: String,
}

impl BreadcrumbStep {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
        }
    }
}

/// One persisted result per processed seller.
///
/// `email` is never empty: it holds either an address or a [`Sentinel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRecord {
    /// 1-based position in the facet list.
    pub id: usize,
    /// Facet id of the seller.
    pub unique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_link: Option<String>,
}

impl SellerRecord {
    /// A record carrying parsed contact data.
    pub fn found(
        id: usize,
        unique_id: impl Into<String>,
        business_name: impl Into<String>,
        email: impl Into<String>,
        headquarters: impl Into<String>,
    ) -> Self {
        let email = email.into();
        Self {
            id,
            unique_id: unique_id.into(),
            business_name: Some(business_name.into()),
            email: if email.is_empty() { NOT_FOUND.to_string() } else { email },
            headquarters: Some(headquarters.into()),
            store_link: None,
        }
    }

    /// A record whose only content is a failure sentinel.
    pub fn failed(id: usize, unique_id: impl Into<String>, sentinel: Sentinel) -> Self {
        Self {
            id,
            unique_id: unique_id.into(),
            business_name: None,
            email: sentinel.into(),
            headquarters: None,
            store_link: None,
        }
    }

    /// A failure record for a seller whose store page was never reached.
    pub fn unreachable(id: usize, unique_id: impl Into<String>, sentinel: Sentinel) -> Self {
        Self::failed(id, unique_id, sentinel).with_store_link(NOT_FOUND)
    }

    pub fn with_store_link(mut self, link: impl Into<String>) -> Self {
        self.store_link = Some(link.into());
        self
    }

    /// Found/Not-Found tag used by the viewer.
    pub fn is_found(&self) -> bool {
        !self.email.is_empty() && !Sentinel::is_sentinel(&self.email)
    }

    /// Number of contact fields holding real data; used to rank partial parses.
    pub fn completeness(&self) -> usize {
        let real = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty() && s != NOT_FOUND);
        usize::from(self.is_found())
            + usize::from(real(&self.business_name))
            + usize::from(real(&self.headquarters))
    }
}
