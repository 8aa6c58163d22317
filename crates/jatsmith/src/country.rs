//! Country name to ISO 3166-1 alpha-2 code resolution.
//!
//! Names are normalised by trimming and lowercasing before the lookup, so `"Brasil"`, `"brasil "`
//! and `"BRASIL"` all resolve to `BR`. The built-in table covers Latin America, the Iberian
//! peninsula and the United States in Spanish, Portuguese and English spellings. A miss is not an
//! error: it resolves to the empty string, and the affiliation builder then leaves the `country`
//! attribute off.
//!
//! ```
//! use jatsmith::country::country_code;
//!
//! assert_eq!(country_code("Brasil"), "BR");
//! assert_eq!(country_code("  méxico"), "MX");
//! assert_eq!(country_code("Atlantis"), "");
//! ```

use std::collections::HashMap;

use super::*;

lazy_static! {
  /// Normalised country name to alpha-2 code.
  static ref COUNTRY_CODES: HashMap<&'static str, &'static str> = HashMap::from([
    ("argentina", "AR"),
    ("bolivia", "BO"),
    ("bolívia", "BO"),
    ("brasil", "BR"),
    ("brazil", "BR"),
    ("chile", "CL"),
    ("colombia", "CO"),
    ("colômbia", "CO"),
    ("costa rica", "CR"),
    ("cuba", "CU"),
    ("ecuador", "EC"),
    ("equador", "EC"),
    ("el salvador", "SV"),
    ("guatemala", "GT"),
    ("haiti", "HT"),
    ("haití", "HT"),
    ("honduras", "HN"),
    ("méxico", "MX"),
    ("mexico", "MX"),
    ("méjico", "MX"),
    ("nicaragua", "NI"),
    ("nicarágua", "NI"),
    ("panamá", "PA"),
    ("panama", "PA"),
    ("paraguay", "PY"),
    ("paraguai", "PY"),
    ("perú", "PE"),
    ("peru", "PE"),
    ("puerto rico", "PR"),
    ("porto rico", "PR"),
    ("república dominicana", "DO"),
    ("republica dominicana", "DO"),
    ("dominican republic", "DO"),
    ("uruguay", "UY"),
    ("uruguai", "UY"),
    ("venezuela", "VE"),
    ("españa", "ES"),
    ("espana", "ES"),
    ("espanha", "ES"),
    ("spain", "ES"),
    ("portugal", "PT"),
    ("andorra", "AD"),
    ("estados unidos", "US"),
    ("estados unidos de américa", "US"),
    ("estados unidos da américa", "US"),
    ("united states", "US"),
    ("united states of america", "US"),
    ("usa", "US"),
    ("eua", "US"),
    ("ee.uu.", "US"),
    ("ee. uu.", "US"),
  ]);
}

/// Normalises a free-text country name into a lookup key.
pub fn normalize_country(name: &str) -> String { name.trim().to_lowercase() }

/// Resolves `name` against the built-in table, returning `""` on a miss.
pub fn country_code(name: &str) -> &'static str {
  COUNTRY_CODES.get(normalize_country(name).as_str()).copied().unwrap_or_default()
}

/// Country resolution with caller-supplied additions on top of the built-in table.
///
/// Extra entries win over the built-in ones, which lets a configuration correct or extend the
/// table without touching the code. Keys are normalised on insertion.
///
/// ```
/// use jatsmith::country::CountryResolver;
///
/// let resolver = CountryResolver::new().with_country("Deutschland", "de");
/// assert_eq!(resolver.resolve("deutschland"), "DE");
/// assert_eq!(resolver.resolve("Chile"), "CL");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CountryResolver {
  /// Additional normalised names and their codes
  extra: BTreeMap<String, String>,
}

impl CountryResolver {
  /// Creates a resolver backed by the built-in table only.
  pub fn new() -> Self { Self::default() }

  /// Adds (or overrides) a single mapping.
  pub fn with_country(mut self, name: &str, code: &str) -> Self {
    self.extra.insert(normalize_country(name), code.trim().to_uppercase());
    self
  }

  /// Adds every mapping in `entries`.
  pub fn with_countries<'a>(self, entries: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
    entries.into_iter().fold(self, |resolver, (name, code)| resolver.with_country(name, code))
  }

  /// Returns the alpha-2 code for `name`, or an empty string when it is unknown.
  pub fn resolve(&self, name: &str) -> String {
    let key = normalize_country(name);
    if let Some(code) = self.extra.get(&key) {
      return code.clone();
    }
    let code = COUNTRY_CODES.get(key.as_str()).copied().unwrap_or_default();
    if code.is_empty() && !key.is_empty() {
      debug!(country = %name, "No country code found");
    }
    code.to_string()
  }
}
