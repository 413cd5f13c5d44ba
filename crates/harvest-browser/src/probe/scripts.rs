//! JavaScript snippets evaluated in the page.
//!
//! Every caller-supplied string is embedded as a JSON string literal, so
//! selectors and ids never need escaping by hand.

use serde_json::Value;

fn lit(s: &str) -> String {
    Value::from(s).to_string()
}

/// `true` when an element matches.
pub fn exists(selector: &str) -> String {
    format!("document.querySelector({}) !== null", lit(selector))
}

/// Number of matching elements.
pub fn count(selector: &str) -> String {
    format!("document.querySelectorAll({}).length", lit(selector))
}

/// Click the first match; `false` when there is none.
pub fn click(selector: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  if (!el) return false;
  el.click();
  return true;
}})()"#,
        sel = lit(selector)
    )
}

/// Shared prelude: `facetId(el)` strips the prefix from the id attribute.
fn facet_prelude(attribute: &str, prefix: &str) -> String {
    format!(
        r#"const attr = {attr};
  const prefix = {prefix};
  const facetId = (el) => {{
    const raw = el.getAttribute(attr) || "";
    return raw.startsWith(prefix) ? raw.slice(prefix.length) : raw;
  }};"#,
        attr = lit(attribute),
        prefix = lit(prefix)
    )
}

/// `[{id, disabled}]` for every facet checkbox, in document order.
pub fn facet_controls(checkbox: &str, attribute: &str, prefix: &str) -> String {
    format!(
        r#"(() => {{
  {prelude}
  return Array.from(document.querySelectorAll({sel}))
    .map((el) => ({{
      id: facetId(el),
      disabled: el.disabled === true || el.getAttribute("aria-disabled") === "true",
    }}))
    .filter((c) => c.id.length > 0);
}})()"#,
        prelude = facet_prelude(attribute, prefix),
        sel = lit(checkbox)
    )
}

/// Ids of checked facet checkboxes.
pub fn checked_facets(checkbox: &str, attribute: &str, prefix: &str) -> String {
    format!(
        r#"(() => {{
  {prelude}
  return Array.from(document.querySelectorAll({sel}))
    .filter((el) => el.checked === true)
    .map(facetId)
    .filter((id) => id.length > 0);
}})()"#,
        prelude = facet_prelude(attribute, prefix),
        sel = lit(checkbox)
    )
}

/// Re-resolve one facet checkbox by id and click it.
pub fn click_facet(checkbox: &str, attribute: &str, prefix: &str, facet_id: &str) -> String {
    format!(
        r#"(() => {{
  {prelude}
  const target = {id};
  const el = Array.from(document.querySelectorAll({sel})).find((c) => facetId(c) === target);
  if (!el) return false;
  el.click();
  return true;
}})()"#,
        prelude = facet_prelude(attribute, prefix),
        id = lit(facet_id),
        sel = lit(checkbox)
    )
}

/// Absolute `href` of the first match, or `null`.
pub fn first_href(selector: &str) -> String {
    format!(
        r#"(() => {{
  const a = document.querySelector({sel});
  return a && a.href ? a.href : null;
}})()"#,
        sel = lit(selector)
    )
}

/// Trimmed `textContent` of the first match, or `null` when absent or blank.
pub fn text_of(selector: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  const text = el && el.textContent ? el.textContent.trim() : "";
  return text.length > 0 ? text : null;
}})()"#,
        sel = lit(selector)
    )
}

/// Raw `textContent` of the first match (line structure preserved), or `null`.
pub fn raw_text_of(selector: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  const text = el ? el.textContent : null;
  return text && text.length > 0 ? text : null;
}})()"#,
        sel = lit(selector)
    )
}

/// `[{name, href}]` for every breadcrumb link.
pub fn breadcrumbs(selector: &str) -> String {
    format!(
        r#"Array.from(document.querySelectorAll({sel})).map((a) => ({{
  name: (a.textContent || "").trim(),
  href: a.href || "",
}}))"#,
        sel = lit(selector)
    )
}

/// Click the first element among `tags` whose trimmed text contains `text`, case-insensitively.
pub fn click_text_match(text: &str, tags: &str) -> String {
    format!(
        r#"(() => {{
  const target = {text}.trim().toLowerCase();
  for (const el of document.querySelectorAll({tags})) {{
    if (el.textContent && el.textContent.trim().toLowerCase().includes(target)) {{
      el.scrollIntoView({{ block: "center" }});
      el.click();
      return true;
    }}
  }}
  return false;
}})()"#,
        text = lit(text),
        tags = lit(tags)
    )
}

/// `true` once the document finished loading.
pub fn document_complete() -> &'static str {
    "document.readyState === \"complete\""
}

#[cfg(test)]
#[path = "scripts_tests.rs"]
mod tests;
