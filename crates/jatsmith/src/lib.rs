//! Article metadata to JATS XML, following the SciELO Publishing Schema (SPS).
//!
//! `jatsmith` takes a loosely structured bibliographic record (titles, authors, affiliations,
//! abstracts, keywords, dates) together with the free-form body text of a manuscript and produces
//! a single JATS document with:
//!
//! - Contributors cross-referenced to their affiliations by id
//! - Country names normalised to ISO 3166 alpha-2 codes
//! - English translations of the title, abstract and keywords when available
//! - Every piece of caller-supplied text escaped exactly once
//!
//! # Features
//!
//! - **Pure serializer**: [`document::JatsWriter`] is a deterministic function of its input
//! - **Document ingestion**: plain text and PDF bodies via [`ingest`]
//! - **Metadata suggestions**: best-effort extraction from a local Ollama model via [`llm`]
//! - **Editing workflow**: an explicit upload/edit/generate state machine in [`workflow`]
//!
//! # Getting Started
//!
//! ```
//! use jatsmith::{
//!   document::to_jats,
//!   metadata::{Author, Metadata},
//! };
//!
//! let mut metadata = Metadata::blank("2024");
//! metadata.title = "Test".to_string();
//! metadata.journal = "J".to_string();
//! metadata.authors = vec![Author {
//!   name: "Maria Silva".to_string(),
//!   affiliation: "UFRJ".to_string(),
//!   country: "Brasil".to_string(),
//!   ..Author::default()
//! }];
//!
//! let xml = to_jats(&metadata, "First paragraph.\n\nSecond paragraph.");
//! assert!(xml.contains("<surname>Silva</surname>"));
//! assert!(xml.contains(r#"<country country="BR">Brasil</country>"#));
//! ```
//!
//! # Module Organization
//!
//! - [`escape`]: XML text escaping
//! - [`country`]: country name to ISO code resolution
//! - [`sections`]: keywords, publication date and body paragraph builders
//! - [`contrib`]: author name splitting, ORCID normalisation, contributor/affiliation linking
//! - [`document`]: the assembler producing the final document
//! - [`metadata`]: the input record and the suggestion merge
//! - [`config`]: overridable boilerplate, extra country names and model settings
//! - [`ingest`]: body text extraction from uploaded documents
//! - [`llm`]: metadata suggestions from a language model
//! - [`workflow`]: upload/edit/generate stages
//! - [`prelude`]: common traits and types for ergonomic imports

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  borrow::Cow,
  collections::BTreeMap,
  fmt::Display,
  path::{Path, PathBuf},
};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};
#[cfg(test)] use tracing_test::traced_test;

pub mod config;
pub mod contrib;
pub mod country;
pub mod document;
pub mod error;
pub mod escape;
pub mod ingest;
pub mod llm;
pub mod metadata;
pub mod sections;
pub mod workflow;

use crate::{error::*, escape::escape_xml, metadata::*};

/// Common traits and types for ergonomic imports.
///
/// ```
/// use jatsmith::prelude::*;
///
/// fn render(metadata: &Metadata) -> Result<String, JatsError> {
///   metadata.validate()?;
///   Ok(JatsWriter::new().write(metadata, ""))
/// }
/// ```
pub mod prelude {
  pub use crate::{
    contrib::NameSplitter,
    document::JatsWriter,
    error::JatsError,
    ingest::TextExtractor,
    llm::MetadataSuggester,
    metadata::{Author, Metadata, Suggestion},
  };
}
