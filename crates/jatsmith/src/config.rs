//! Configuration for the serializer and its collaborators.
//!
//! The serializer has no required configuration. What can be configured:
//! - [`Boilerplate`]: the stand-in content emitted unconditionally (journal id, publisher, page
//!   range, license, placeholder reference, section headings)
//! - Extra country names on top of the built-in table
//! - The language model used for metadata suggestions
//!
//! Configuration lives in a TOML file, by default under the platform config directory:
//!
//! ```toml
//! [boilerplate]
//! journal_id = "rbef"
//! publisher_name = "Sociedade Brasileira de Física"
//!
//! [countries]
//! "alemanha" = "DE"
//!
//! [llm]
//! host = "http://localhost:11434"
//! model = "llama3.2:3b"
//! ```

use super::*;
use crate::{country::CountryResolver, llm::Model};

/// Top level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Unconditional document content
  pub boilerplate: Boilerplate,
  /// Additional country name to alpha-2 code mappings
  pub countries:   BTreeMap<String, String>,
  /// Metadata suggester settings
  pub llm:         LlmConfig,
}

/// Stand-in content the serializer always includes verbatim.
///
/// These are acknowledged placeholders an editor completes by hand after generation. Changing
/// them changes every generated document in the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Boilerplate {
  /// `<journal-id journal-id-type="publisher-id">`
  pub journal_id:         String,
  /// `<publisher-name>`
  pub publisher_name:     String,
  /// Heading subject in `<article-categories>`
  pub subject:            String,
  /// First page placeholder
  pub fpage:              String,
  /// Last page placeholder
  pub lpage:              String,
  /// License URL
  pub license_url:        String,
  /// License paragraph
  pub license_text:       String,
  /// Comment emitted in place of a missing DOI
  pub doi_placeholder:    String,
  /// Title of the primary abstract
  pub abstract_title:     String,
  /// Title of the English abstract
  pub abstract_en_title:  String,
  /// Title of the primary keyword group
  pub keywords_title:     String,
  /// Title of the English keyword group
  pub keywords_en_title:  String,
  /// Title of the reference list
  pub references_title:   String,
  /// The single placeholder reference
  pub reference_citation: String,
}

impl Default for Boilerplate {
  fn default() -> Self {
    Self {
      journal_id:         "journal-id".to_string(),
      publisher_name:     "Publisher".to_string(),
      subject:            "Artículo de investigación".to_string(),
      fpage:              "1".to_string(),
      lpage:              "10".to_string(),
      license_url:        "http://creativecommons.org/licenses/by/4.0/".to_string(),
      license_text:       "Este es un artículo publicado en acceso abierto bajo una licencia \
                           Creative Commons"
        .to_string(),
      doi_placeholder:    "DOI not available: add the article-id element manually".to_string(),
      abstract_title:     "Resumen".to_string(),
      abstract_en_title:  "Abstract".to_string(),
      keywords_title:     "Palabras clave:".to_string(),
      keywords_en_title:  "Keywords:".to_string(),
      references_title:   "Referencias".to_string(),
      reference_citation: "Apellido, N. (Año). Título del trabajo citado. Revista, Volumen(Número), \
                           páginas."
        .to_string(),
    }
  }
}

/// Settings for the Ollama-backed metadata suggester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
  /// Base URL of the Ollama service
  pub host:      String,
  /// Model to ask
  pub model:     Model,
  /// Maximum number of characters of body text sent along
  pub max_chars: usize,
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self { host: "http://localhost:11434".to_string(), model: Model::Llama3p2c3b, max_chars: 15_000 }
  }
}

impl Config {
  /// Returns the default path of the configuration file.
  ///
  /// - On Unix: `~/.config/jatsmith/config.toml`
  /// - On macOS: `~/Library/Application Support/jatsmith/config.toml`
  /// - On Windows: `%APPDATA%\jatsmith\config.toml`
  /// - Fallback: `./jatsmith/config.toml`
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("jatsmith").join("config.toml")
  }

  /// Reads the configuration at `path`.
  ///
  /// # Errors
  ///
  /// Fails when the file cannot be read or is not valid TOML for this structure.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let config: Self = toml::from_str(&content)?;
    Ok(config.normalized())
  }

  /// Reads the configuration at `path`, falling back to defaults when the file does not exist.
  pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if path.exists() {
      Self::load(path)
    } else {
      trace!("No configuration at {}, using defaults", path.display());
      Ok(Self::default())
    }
  }

  /// Writes the configuration to `path`, creating parent directories as needed.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    Ok(())
  }

  /// Replaces the boilerplate.
  pub fn with_boilerplate(mut self, boilerplate: Boilerplate) -> Self {
    self.boilerplate = boilerplate;
    self
  }

  /// Adds a country mapping.
  pub fn with_country(mut self, name: &str, code: &str) -> Self {
    self.countries.insert(country::normalize_country(name), code.trim().to_uppercase());
    self
  }

  /// Replaces the language model settings.
  pub fn with_llm(mut self, llm: LlmConfig) -> Self {
    self.llm = llm;
    self
  }

  /// Country resolver seeded with the configured extras.
  pub fn country_resolver(&self) -> CountryResolver {
    CountryResolver::new().with_countries(&self.countries)
  }

  /// Normalises country keys so lookups stay trimmed and lowercased.
  fn normalized(mut self) -> Self {
    self.countries = std::mem::take(&mut self.countries)
      .into_iter()
      .map(|(name, code)| (country::normalize_country(&name), code.trim().to_uppercase()))
      .collect();
    self
  }
}
