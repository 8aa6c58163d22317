//! Text to XML entity encoding.
//!
//! Every piece of caller-supplied text goes through [`escape_xml`] exactly once before it is
//! embedded in the document. The five markup-significant characters are replaced with their
//! predefined entities (`&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`), which makes the result safe
//! both as element content and inside double- or single-quoted attribute values.

use super::*;

/// Escapes `raw` for placement inside XML text or attribute content.
///
/// Borrows when nothing needs replacing.
///
/// ```
/// use jatsmith::escape::escape_xml;
///
/// assert_eq!(escape_xml(r#"Tom & "Jerry" <'cats'>"#), "Tom &amp; &quot;Jerry&quot; &lt;&apos;cats&apos;&gt;");
/// assert_eq!(escape_xml(""), "");
/// ```
pub fn escape_xml(raw: &str) -> Cow<'_, str> { quick_xml::escape::escape(raw) }

/// Escapes an optional value, mapping an absent value to the empty string.
pub fn escape_opt(raw: Option<&str>) -> String {
  raw.map(|s| escape_xml(s).into_owned()).unwrap_or_default()
}
