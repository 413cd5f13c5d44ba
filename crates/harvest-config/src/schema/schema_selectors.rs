//! Site-specific selectors used by the UI probe.
//!
//! These are opaque strings tied to one site's markup and the most likely
//! thing to need updating, so every one of them is overridable from TOML.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Entry point that opens the filter modal.
    pub filters_menu: String,
    pub modal: String,
    pub modal_close: String,
    /// "Sold by" facet group inside the modal.
    pub seller_group: String,
    pub facet_checkbox: String,
    /// Attribute carrying the facet id.
    pub facet_id_attribute: String,
    /// Prefix stripped from the attribute value to get the facet id.
    pub facet_id_prefix: String,
    /// Facet ids containing this marker are the "include out-of-stock" toggle.
    pub out_of_stock_marker: String,
    pub apply_button: String,
    pub product_card: String,
    pub product_link: String,
    pub contact_tab: String,
    pub contact_content: String,
    pub category_name: String,
    pub breadcrumb_link: String,
    /// Link texts tried, in order, when looking for the seller page link.
    pub seller_link_texts: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            filters_menu: r#"[data-test="filters-menu"]"#.to_string(),
            modal: r#"div[role="dialog"][aria-modal="true"]"#.to_string(),
            modal_close: r#"div[role="dialog"][aria-modal="true"] button[aria-label*="close" i]"#
                .to_string(),
            seller_group: r#"[data-test="facet-group-d_sellers_all"]"#.to_string(),
            facet_checkbox: r#"input[data-test^="facet-checkbox-"]"#.to_string(),
            facet_id_attribute: "data-test".to_string(),
            facet_id_prefix: "facet-checkbox-".to_string(),
            out_of_stock_marker: "out_of_stock".to_string(),
            apply_button: r#"[data-test="@web/FacetModalButtons/ApplyButton"]"#.to_string(),
            product_card: r#"[data-test="@web/site-top-of-funnel/ProductCardWrapper"]"#.to_string(),
            product_link: r#"a[data-test="@web/ProductCard/title"]"#.to_string(),
            contact_tab: r#"[data-test="tabContact"]"#.to_string(),
            contact_content: r#"[data-test="tab-tabContent-tab-Contact"]"#.to_string(),
            category_name: "h1".to_string(),
            breadcrumb_link: r#"nav[aria-label="Breadcrumbs"] a"#.to_string(),
            seller_link_texts: vec![
                "Sold & shipped by".to_string(),
                "Sold and shipped by".to_string(),
            ],
        }
    }
}

impl SelectorConfig {
    /// Named selector fields, for validation and display.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("filters_menu", self.filters_menu.as_str()),
            ("modal", self.modal.as_str()),
            ("modal_close", self.modal_close.as_str()),
            ("seller_group", self.seller_group.as_str()),
            ("facet_checkbox", self.facet_checkbox.as_str()),
            ("facet_id_attribute", self.facet_id_attribute.as_str()),
            ("apply_button", self.apply_button.as_str()),
            ("product_card", self.product_card.as_str()),
            ("product_link", self.product_link.as_str()),
            ("contact_tab", self.contact_tab.as_str()),
            ("contact_content", self.contact_content.as_str()),
            ("category_name", self.category_name.as_str()),
            ("breadcrumb_link", self.breadcrumb_link.as_str()),
        ]
    }
}
