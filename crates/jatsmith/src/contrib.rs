//! Author and affiliation linking.
//!
//! Every author at position `i` (1-indexed) owns exactly one affiliation with id `aff{i}`, and
//! the author's contributor block cross-references it through that id. The two lists are built
//! together in one pass so they always have the same length and dense ids `1..=N`, whether or not
//! authors share the same data.
//!
//! ```
//! use jatsmith::{contrib::link_authors, metadata::Author};
//!
//! let authors = vec![
//!   Author { name: "Maria Silva".into(), affiliation: "UFRJ".into(), ..Author::default() },
//!   Author { name: "Maria Silva".into(), affiliation: "UFRJ".into(), ..Author::default() },
//! ];
//! let linked = link_authors(&authors);
//! assert_eq!(linked.contributors[1].aff_id, "aff2");
//! assert_eq!(linked.affiliations[1].id, "aff2");
//! ```

use super::*;
use crate::country::CountryResolver;

/// Base URL of canonical ORCID identifiers.
pub const ORCID_BASE_URL: &str = "https://orcid.org/";

/// A personal name split into its JATS parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
  /// Family name
  pub surname:     String,
  /// Given names, possibly empty
  pub given_names: String,
}

/// Strategy for splitting a single free-text name into surname and given names.
///
/// Any boundary heuristic is lossy for some names. The default [`LastTokenSurname`] gets
/// "Juan de la Cruz" wrong, so callers who know better can supply their own strategy or set the
/// explicit fields on [`Author`].
pub trait NameSplitter: Send + Sync {
  /// Splits `full_name`.
  fn split(&self, full_name: &str) -> PersonName;
}

/// Takes the last whitespace-separated token as the surname and the rest as given names.
///
/// A single token becomes the surname with empty given names.
///
/// ```
/// use jatsmith::contrib::{LastTokenSurname, NameSplitter};
///
/// let name = LastTokenSurname.split("Ana Maria  Souza");
/// assert_eq!(name.surname, "Souza");
/// assert_eq!(name.given_names, "Ana Maria");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LastTokenSurname;

impl NameSplitter for LastTokenSurname {
  fn split(&self, full_name: &str) -> PersonName {
    let mut tokens: Vec<&str> = full_name.split_whitespace().collect();
    match tokens.pop() {
      Some(surname) => PersonName { surname: surname.to_string(), given_names: tokens.join(" ") },
      None => PersonName::default(),
    }
  }
}

/// Resolves the name parts of `author`, preferring explicit fields over `splitter`.
pub fn person_name(author: &Author, splitter: &dyn NameSplitter) -> PersonName {
  if author.has_explicit_name() {
    return PersonName {
      surname:     author.surname.clone().unwrap_or_default(),
      given_names: author.given_names.clone().unwrap_or_default(),
    };
  }
  splitter.split(&author.name)
}

lazy_static! {
  /// Anything that starts like `scheme://`.
  static ref URL_SCHEME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").unwrap();
}

/// Produces the canonical ORCID URL for a stored value.
///
/// Values that already carry a URL scheme are kept as they are. Anything else is reduced to
/// digits, hyphens and `X` and appended to [`ORCID_BASE_URL`].
///
/// Returns `None` for an empty value, and also for a non-empty value with no identifier
/// characters left after filtering (e.g. `"n/a"`). The latter is logged as a warning and the
/// `contrib-id` is left out rather than emitting a bare base URL.
///
/// ```
/// use jatsmith::contrib::normalize_orcid;
///
/// assert_eq!(
///   normalize_orcid("0000-0002-1825-009X").as_deref(),
///   Some("https://orcid.org/0000-0002-1825-009X")
/// );
/// assert_eq!(
///   normalize_orcid("http://orcid.org/0000-0002-1825-0097").as_deref(),
///   Some("http://orcid.org/0000-0002-1825-0097")
/// );
/// assert_eq!(normalize_orcid("  "), None);
/// assert_eq!(normalize_orcid("n/a"), None);
/// ```
pub fn normalize_orcid(raw: &str) -> Option<String> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  if URL_SCHEME.is_match(raw) {
    return Some(raw.to_string());
  }
  let id: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '-' || *c == 'X').collect();
  if id.is_empty() {
    warn!(orcid = %raw, "ORCID has no identifier characters, leaving it out");
    return None;
  }
  Some(format!("{ORCID_BASE_URL}{id}"))
}

/// One `<contrib>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
  /// Id of the affiliation this contributor points at
  pub aff_id: String,
  /// 1-indexed position of the author
  pub label:  usize,
  /// Name parts
  pub name:   PersonName,
  /// Canonical ORCID URL
  pub orcid:  Option<String>,
  /// Contact email
  pub email:  Option<String>,
}

impl Contributor {
  /// The element lines, children indented by two spaces.
  pub fn lines(&self) -> Vec<String> {
    let mut lines = vec![r#"<contrib contrib-type="author">"#.to_string()];
    if let Some(orcid) = &self.orcid {
      lines.push(format!(
        r#"  <contrib-id contrib-id-type="orcid">{}</contrib-id>"#,
        escape_xml(orcid)
      ));
    }
    lines.push("  <name>".to_string());
    lines.push(format!("    <surname>{}</surname>", escape_xml(&self.name.surname)));
    lines.push(format!("    <given-names>{}</given-names>", escape_xml(&self.name.given_names)));
    lines.push("  </name>".to_string());
    if let Some(email) = &self.email {
      lines.push(format!("  <email>{}</email>", escape_xml(email)));
    }
    lines.push(format!(r#"  <xref ref-type="aff" rid="{}">{}</xref>"#, self.aff_id, self.label));
    lines.push("</contrib>".to_string());
    lines
  }
}

/// One `<aff>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affiliation {
  /// Element id, `aff{label}`
  pub id:           String,
  /// 1-indexed position of the owning author
  pub label:        usize,
  /// Institution name
  pub institution:  String,
  /// Country as typed
  pub country:      String,
  /// Resolved alpha-2 code, empty when unknown
  pub country_code: String,
}

impl Affiliation {
  /// The element lines, children indented by two spaces.
  ///
  /// The `country` attribute is only present when a code was resolved; the country text is
  /// always kept as content.
  pub fn lines(&self) -> Vec<String> {
    let country = if self.country_code.is_empty() {
      format!("  <country>{}</country>", escape_xml(&self.country))
    } else {
      format!(
        r#"  <country country="{}">{}</country>"#,
        escape_xml(&self.country_code),
        escape_xml(&self.country)
      )
    };
    vec![
      format!(r#"<aff id="{}">"#, self.id),
      format!("  <label>{}</label>", self.label),
      format!(r#"  <institution content-type="orgname">{}</institution>"#, escape_xml(&self.institution)),
      country,
      "</aff>".to_string(),
    ]
  }
}

/// Parallel contributor and affiliation lists; index `i` of one belongs to index `i` of the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Linked {
  /// Contributors in author order
  pub contributors: Vec<Contributor>,
  /// Affiliations in author order
  pub affiliations: Vec<Affiliation>,
}

/// Non-empty value or `None`.
fn non_empty(value: &str) -> Option<String> {
  Some(value.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Links `authors` with the default name splitter and the built-in country table.
pub fn link_authors(authors: &[Author]) -> Linked {
  link_authors_with(authors, &LastTokenSurname, &CountryResolver::new())
}

/// Links `authors`, numbering affiliations by position.
#[instrument(skip_all, fields(authors = authors.len()), level = "debug")]
pub fn link_authors_with(
  authors: &[Author],
  splitter: &dyn NameSplitter,
  countries: &CountryResolver,
) -> Linked {
  let mut linked = Linked {
    contributors: Vec::with_capacity(authors.len()),
    affiliations: Vec::with_capacity(authors.len()),
  };

  for (index, author) in authors.iter().enumerate() {
    let label = index + 1;
    let id = format!("aff{label}");

    linked.contributors.push(Contributor {
      aff_id: id.clone(),
      label,
      name: person_name(author, splitter),
      orcid: normalize_orcid(&author.orcid),
      email: non_empty(&author.email),
    });
    linked.affiliations.push(Affiliation {
      id,
      label,
      institution: author.affiliation.clone(),
      country: author.country.clone(),
      country_code: countries.resolve(&author.country),
    });
  }

  debug_assert_eq!(linked.contributors.len(), linked.affiliations.len());
  linked
}

#[cfg(test)]
mod tests {
  use super::*;

  fn author(name: &str) -> Author { Author { name: name.to_string(), ..Author::default() } }

  #[test]
  fn test_split_multiple_tokens() {
    let name = LastTokenSurname.split("Maria Silva");
    assert_eq!(name, PersonName { surname: "Silva".into(), given_names: "Maria".into() });
  }

  #[test]
  fn test_split_single_token() {
    let name = LastTokenSurname.split("  Pelé ");
    assert_eq!(name, PersonName { surname: "Pelé".into(), given_names: String::new() });
  }

  #[test]
  fn test_split_empty() {
    assert_eq!(LastTokenSurname.split("   "), PersonName::default());
  }

  #[test]
  fn test_explicit_name_wins() {
    let author = Author {
      name: "Juan de la Cruz".into(),
      surname: Some("de la Cruz".into()),
      given_names: Some("Juan".into()),
      ..Author::default()
    };
    let name = person_name(&author, &LastTokenSurname);
    assert_eq!(name.surname, "de la Cruz");
    assert_eq!(name.given_names, "Juan");
  }

  #[test]
  fn test_custom_splitter() {
    struct FirstTokenSurname;
    impl NameSplitter for FirstTokenSurname {
      fn split(&self, full_name: &str) -> PersonName {
        let (surname, given) = full_name.split_once(' ').unwrap_or((full_name, ""));
        PersonName { surname: surname.into(), given_names: given.into() }
      }
    }
    let name = person_name(&author("Mao Zedong"), &FirstTokenSurname);
    assert_eq!(name.surname, "Mao");
  }

  #[test]
  fn test_orcid_bare_id_is_stripped() {
    assert_eq!(
      normalize_orcid(" orcid: 0000 0002 1825 0097 ").as_deref(),
      Some("https://orcid.org/0000000218250097")
    );
    assert_eq!(
      normalize_orcid("orcid.org/0000-0002-1825-0097").as_deref(),
      Some("https://orcid.org/0000-0002-1825-0097")
    );
  }

  #[traced_test]
  #[test]
  fn test_orcid_without_digits_is_dropped() {
    assert_eq!(normalize_orcid("n/a"), None);
    assert!(logs_contain("ORCID has no identifier characters"));
  }

  #[test]
  fn test_contrib_lines_omit_missing_optionals() {
    let linked = link_authors(&[author("Maria Silva")]);
    let lines = linked.contributors[0].lines().join("\n");
    assert!(!lines.contains("contrib-id"));
    assert!(!lines.contains("<email>"));
    assert!(lines.contains("<surname>Silva</surname>"));
    assert!(lines.contains(r#"<xref ref-type="aff" rid="aff1">1</xref>"#));
  }

  #[test]
  fn test_contrib_lines_include_optionals() {
    let author = Author {
      name: "Ana <Dev>".into(),
      email: "ana@example.org".into(),
      orcid: "0000-0001-2345-6789".into(),
      ..Author::default()
    };
    let lines = link_authors(&[author]).contributors[0].lines().join("\n");
    assert!(lines.contains(
      r#"<contrib-id contrib-id-type="orcid">https://orcid.org/0000-0001-2345-6789</contrib-id>"#
    ));
    assert!(lines.contains("<email>ana@example.org</email>"));
    assert!(lines.contains("<surname>&lt;Dev&gt;</surname>"));
  }

  #[test]
  fn test_affiliation_country_attribute() {
    let known = Author { affiliation: "UFRJ".into(), country: "Brasil".into(), ..Author::default() };
    let unknown = Author { affiliation: "U & I".into(), country: "Atlantis".into(), ..Author::default() };
    let linked = link_authors(&[known, unknown]);

    let first = linked.affiliations[0].lines().join("\n");
    assert!(first.contains(r#"<country country="BR">Brasil</country>"#));
    assert!(first.contains("<label>1</label>"));

    let second = linked.affiliations[1].lines().join("\n");
    assert!(second.contains("<country>Atlantis</country>"));
    assert!(second.contains(r#"<institution content-type="orgname">U &amp; I</institution>"#));
    assert!(second.contains(r#"<aff id="aff2">"#));
  }

  #[test]
  fn test_ids_are_dense_and_parallel() {
    let authors = vec![Author::default(); 5];
    let linked = link_authors(&authors);
    assert_eq!(linked.contributors.len(), 5);
    assert_eq!(linked.affiliations.len(), 5);
    for (i, (contrib, aff)) in linked.contributors.iter().zip(&linked.affiliations).enumerate() {
      assert_eq!(contrib.aff_id, format!("aff{}", i + 1));
      assert_eq!(contrib.aff_id, aff.id);
      assert_eq!(aff.label, i + 1);
    }
  }
}
