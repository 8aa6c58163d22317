//! The upload, edit and generate stages of turning a document into JATS.
//!
//! Each transition is a pure function from the current [`Stage`] to the next one. The current
//! stage is only borrowed, so a rejected transition leaves it usable.
//!
//! ```
//! use jatsmith::{document::JatsWriter, metadata::Metadata, workflow::Stage};
//!
//! let stage = Stage::Uploading;
//! let stage = stage.uploaded(Metadata::blank("2024"), "Body text".to_string(), None).unwrap();
//! let stage = stage.edit(|m| m.title = "Título".to_string()).unwrap();
//! let stage = stage.generate(&JatsWriter::new()).unwrap();
//! assert!(stage.xml().unwrap().contains("<article-title>Título</article-title>"));
//! ```

use super::*;
use crate::document::JatsWriter;

/// Warning shown when suggestions could not be used.
pub const SUGGESTION_WARNING: &str = "AI extraction failed, fill in manually";

/// Everything an editor works on between upload and generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
  /// The record being edited
  pub metadata: Metadata,
  /// Extracted body text
  pub body:     String,
  /// Warning to surface to the editor, if any
  pub warning:  Option<String>,
}

/// Where a document is in the workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Stage {
  /// Waiting for a document
  #[default]
  Uploading,
  /// Metadata is being completed
  Editing(Draft),
  /// A document was produced from the draft
  Generated {
    /// The draft the document was produced from
    draft: Draft,
    /// The produced XML
    xml:   String,
  },
}

impl Stage {
  /// Short name of the stage, for messages.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Uploading => "uploading",
      Self::Editing(_) => "editing",
      Self::Generated { .. } => "generated",
    }
  }

  /// Rejection for `action` from the current stage.
  fn invalid(&self, action: &'static str) -> JatsError {
    JatsError::InvalidTransition { stage: self.name(), action }
  }

  /// Uploading → Editing, once body text was extracted.
  ///
  /// `suggestion` is the outcome of asking a suggester, if one was asked. A successful
  /// suggestion is merged onto `defaults`; a failed one leaves `defaults` as they are and records
  /// [`SUGGESTION_WARNING`] on the draft.
  pub fn uploaded(
    &self,
    defaults: Metadata,
    body: String,
    suggestion: Option<Result<Suggestion>>,
  ) -> Result<Self> {
    if !matches!(self, Self::Uploading) {
      return Err(self.invalid("upload a document"));
    }

    let (metadata, warning) = match suggestion {
      None => (defaults, None),
      Some(Ok(suggestion)) => (suggestion.merge_onto(defaults), None),
      Some(Err(e)) => {
        warn!("Metadata suggestion failed: {e}");
        (defaults, Some(SUGGESTION_WARNING.to_string()))
      },
    };
    Ok(Self::Editing(Draft { metadata, body, warning }))
  }

  /// Editing → Editing, applying `change` to the metadata.
  pub fn edit(&self, change: impl FnOnce(&mut Metadata)) -> Result<Self> {
    match self {
      Self::Editing(draft) => {
        let mut draft = draft.clone();
        change(&mut draft.metadata);
        Ok(Self::Editing(draft))
      },
      _ => Err(self.invalid("edit metadata")),
    }
  }

  /// Editing → Generated.
  ///
  /// # Errors
  ///
  /// Rejects records that break the serializer's contract (see [`Metadata::validate`]).
  pub fn generate(&self, writer: &JatsWriter) -> Result<Self> {
    match self {
      Self::Editing(draft) => {
        draft.metadata.validate()?;
        let missing = draft.metadata.missing_required();
        if !missing.is_empty() {
          debug!(?missing, "Generating with empty required fields");
        }
        let xml = writer.write(&draft.metadata, &draft.body);
        Ok(Self::Generated { draft: draft.clone(), xml })
      },
      _ => Err(self.invalid("generate XML")),
    }
  }

  /// Generated → Editing, to correct something and generate again.
  pub fn back_to_editing(&self) -> Result<Self> {
    match self {
      Self::Generated { draft, .. } => Ok(Self::Editing(draft.clone())),
      _ => Err(self.invalid("go back to editing")),
    }
  }

  /// Any stage → Uploading.
  pub fn reset(&self) -> Self { Self::Uploading }

  /// The draft, while editing or after generation.
  pub fn draft(&self) -> Option<&Draft> {
    match self {
      Self::Uploading => None,
      Self::Editing(draft) | Self::Generated { draft, .. } => Some(draft),
    }
  }

  /// The produced XML, once generated.
  pub fn xml(&self) -> Option<&str> {
    match self {
      Self::Generated { xml, .. } => Some(xml),
      _ => None,
    }
  }
}
