/* src/server/core/rust/src/view.rs */

use serde_json::Value;

use crate::definition::PageDefinition;
use crate::errors::PageError;

/// Renders a page's data for HTML requests. Templating lives outside the
/// core; implementations receive the evaluated data provider output.
pub trait ViewRenderer: Send + Sync {
  fn render(&self, page: &PageDefinition, data: &Value) -> Result<String, PageError>;
}

impl<F> ViewRenderer for F
where
  F: Fn(&PageDefinition, &Value) -> Result<String, PageError> + Send + Sync,
{
  fn render(&self, page: &PageDefinition, data: &Value) -> Result<String, PageError> {
    self(page, data)
  }
}

/// Minimal HTML shell that hands the data to a client-side component through
/// a JSON script tag.
#[derive(Debug, Clone)]
pub struct DataScriptView {
  pub data_id: String,
}

impl Default for DataScriptView {
  fn default() -> Self {
    Self { data_id: "__data".to_string() }
  }
}

impl ViewRenderer for DataScriptView {
  fn render(&self, page: &PageDefinition, data: &Value) -> Result<String, PageError> {
    let json = serde_json::to_string(data).map_err(|e| PageError::internal(e.to_string()))?;
    let id = escape_attr(page.id());
    Ok(format!(
      concat!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{id}</title></head>",
        "<body><div id=\"quire-page\" data-page=\"{id}\"></div>",
        "<script id=\"{data_id}\" type=\"application/json\">{json}</script></body></html>",
      ),
      id = id,
      data_id = escape_attr(&self.data_id),
      json = escape_script_json(&json),
    ))
  }
}

/// Make serialized JSON safe inside a `<script>` element: inside string
/// literals, `<`, `>`, `&` and every non-ASCII char become `\uXXXX`
/// (surrogate pairs above the BMP). Structure outside strings is untouched.
pub fn escape_script_json(json: &str) -> String {
  let mut out = String::with_capacity(json.len());
  let mut in_string = false;
  let mut escaped = false;
  for ch in json.chars() {
    if !in_string {
      in_string = ch == '"';
      out.push(ch);
      continue;
    }
    if escaped {
      escaped = false;
      out.push(ch);
      continue;
    }
    match ch {
      '\\' => {
        escaped = true;
        out.push(ch);
      }
      '"' => {
        in_string = false;
        out.push(ch);
      }
      '<' | '>' | '&' => push_unicode_escape(&mut out, ch as u32),
      c if !c.is_ascii() => {
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
          push_unicode_escape(&mut out, u32::from(*unit));
        }
      }
      c => out.push(c),
    }
  }
  out
}

fn push_unicode_escape(out: &mut String, unit: u32) {
  out.push_str(&format!("\\u{unit:04x}"));
}

fn escape_attr(value: &str) -> String {
  value
    .replace('&', "&amp;")
    .replace('"', "&quot;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
}
