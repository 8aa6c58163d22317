//! Metadata suggestions from a locally running Ollama model.
//!
//! The suggester is an untrusted collaborator: it may leave fields out, return an empty author
//! list or fail entirely. Whatever it returns is a [`Suggestion`] to be merged onto defaults, and
//! every failure is reported as [`JatsError::Suggestion`], which callers treat as a warning.
//!
//! # Examples
//!
//! ```no_run
//! use jatsmith::{
//!   config::LlmConfig,
//!   llm::{MetadataSuggester, OllamaSuggester},
//!   metadata::Metadata,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let suggester = OllamaSuggester::new(&LlmConfig::default());
//! let suggestion = suggester.suggest_metadata("Título: Aguas profundas ...").await?;
//! let metadata = suggestion.merge_onto(Metadata::for_current_year());
//! println!("Title: {}", metadata.title);
//! # Ok(())
//! # }
//! ```

use serde_json::Value;

use super::*;
use crate::config::LlmConfig;

/// Path of the Ollama chat endpoint.
const CHAT_ENDPOINT: &str = "api/chat";

/// Instructions sent ahead of the article text.
const SUGGESTION_PROMPT: &str = "You extract bibliographic metadata from scholarly articles. Reply \
                                 with one JSON object and nothing else, using these keys: title, \
                                 titleEn, journal, issn, volume, issue, year, doi, datePublished \
                                 (YYYY-MM-DD), abstract, abstractEn, keywords (comma separated), \
                                 keywordsEn, authors (an array of objects with name, affiliation, \
                                 email, orcid, country). Leave out any key you cannot find.\n\n\
                                 Article text:\n";

/// Models that can be asked through the Ollama service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Model {
  /// Llama 3.2 3B model variant
  Llama3p2c3b,
  /// Any other model tag known to the local Ollama install
  Other(String),
}

impl Display for Model {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Model::Llama3p2c3b => write!(f, "llama3.2:3b"),
      Model::Other(tag) => write!(f, "{tag}"),
    }
  }
}

impl From<String> for Model {
  fn from(tag: String) -> Self {
    match tag.as_str() {
      "llama3.2:3b" => Self::Llama3p2c3b,
      _ => Self::Other(tag),
    }
  }
}

impl From<Model> for String {
  fn from(model: Model) -> Self { model.to_string() }
}

/// Request builder for Ollama chat interactions.
///
/// ```no_run
/// # use jatsmith::llm::{LlamaRequest, Model};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let response = LlamaRequest::new()
///   .with_host("http://localhost:11434")
///   .with_model(Model::Llama3p2c3b)
///   .with_json_format()
///   .with_message("Reply with {\"ok\": true}")
///   .send()
///   .await?;
/// println!("{}", response.message.content);
/// # Ok(())
/// # }
/// ```
#[derive(Serialize, Default)]
pub struct LlamaRequest {
  /// The model to use. Sending without one is an error.
  pub model: Option<Model>,

  /// Conversation messages, processed in order. Must not be empty when sending.
  pub messages: Vec<Message>,

  /// Whether to stream the response. Always off, the reply is read in one piece.
  pub stream: bool,

  /// Output format constraint, `"json"` to force a JSON reply.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub format: Option<String>,

  /// Generation parameters.
  pub options: Options,

  /// The target URL. Defaults to the local chat endpoint with a warning.
  #[serde(skip)]
  pub url: Option<Url>,
}

/// Message structure for LLM interactions.
///
/// ```
/// use jatsmith::llm::Message;
///
/// let message = Message { role: "user".to_string(), content: "Extract the title".to_string() };
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Message {
  /// `"user"` for prompts, `"assistant"` for model replies
  pub role:    String,
  /// The text of the message
  pub content: String,
}

/// Configuration options for LLM inference.
#[derive(Debug, Serialize, Deserialize)]
pub struct Options {
  /// Maximum number of tokens to generate
  num_predict: u64,
  /// Top-k sampling parameter
  top_k:       u64,
  /// Top-p (nucleus) sampling parameter
  top_p:       f64,
  /// Temperature for controlling randomness in generation
  temperature: f64,
}

// Extraction wants the most literal answer the model can give.
impl Default for Options {
  fn default() -> Self { Self { num_predict: 4096, top_k: 20, top_p: 0.9, temperature: 0.1 } }
}

/// Response structure from Ollama chat requests.
///
/// Only `message` matters here; the timing fields default when absent.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlamaResponse {
  /// Name of the model used
  pub model:             String,
  /// Timestamp of response creation
  pub created_at:        String,
  /// Generated message content
  pub message:           Message,
  /// Reason for completion
  pub done_reason:       String,
  /// Whether generation is complete
  pub done:              bool,
  /// Total processing time in nanoseconds
  pub total_duration:    u64,
  /// Number of tokens in the prompt
  pub prompt_eval_count: u64,
  /// Number of generated tokens
  pub eval_count:        u64,
}

impl LlamaRequest {
  /// Creates a new request with default settings.
  pub fn new() -> Self { Self::default() }

  /// Points the request at the chat endpoint of the Ollama service at `host`.
  pub fn with_host(mut self, host: &str) -> Self {
    self.url = Url::parse(host).ok().and_then(|base| base.join(CHAT_ENDPOINT).ok());
    if self.url.is_none() {
      warn!("Could not use host {host}, falling back to localhost");
    }
    self
  }

  /// Sets the model to use for the request.
  pub fn with_model(mut self, model: Model) -> Self {
    self.model.replace(model);
    self
  }

  /// Asks Ollama to constrain the reply to valid JSON.
  pub fn with_json_format(mut self) -> Self {
    self.format = Some("json".to_string());
    self
  }

  /// Adds a user message to the conversation.
  pub fn with_message(mut self, content: &str) -> Self {
    self.messages.push(Message { role: "user".to_string(), content: content.to_string() });
    self
  }

  /// Sends the request to the Ollama service.
  ///
  /// # Errors
  ///
  /// This function will return an error if:
  /// - No model is specified
  /// - No messages are provided
  /// - The network request fails
  /// - The response cannot be parsed
  pub async fn send(&self) -> Result<LlamaResponse> {
    let url = match &self.url {
      Some(url) => url.clone(),
      None => {
        warn!("No URL set, using localhost/chat");
        Url::parse("http://localhost:11434/api/chat")
          .map_err(|e| JatsError::Config(format!("Invalid default Ollama URL: {e}")))?
      },
    };

    if self.model.is_none() {
      return Err(JatsError::LLMMissingModel);
    }

    if self.messages.is_empty() {
      return Err(JatsError::LLMMissingMessage);
    }

    let client = reqwest::Client::new();
    let response = client.post(url).json(&self).send().await?.error_for_status()?;
    let llama_response: LlamaResponse = response.json().await?;
    Ok(llama_response)
  }
}

/// Something that proposes metadata for a document from its text.
#[async_trait]
pub trait MetadataSuggester: Send + Sync {
  /// Proposes a possibly partial record for `text`.
  ///
  /// # Errors
  ///
  /// Implementations report every failure as [`JatsError::Suggestion`].
  async fn suggest_metadata(&self, text: &str) -> Result<Suggestion>;
}

/// [`MetadataSuggester`] backed by an Ollama chat model.
#[derive(Debug, Clone)]
pub struct OllamaSuggester {
  /// Base URL of the service
  host:      String,
  /// Model to ask
  model:     Model,
  /// How much of the text is sent
  max_chars: usize,
}

impl OllamaSuggester {
  /// Creates a suggester from the configured settings.
  pub fn new(config: &LlmConfig) -> Self {
    Self { host: config.host.clone(), model: config.model.clone(), max_chars: config.max_chars }
  }

  /// The full prompt for `text`, truncated to the configured number of characters.
  pub fn prompt(&self, text: &str) -> String {
    let mut prompt = SUGGESTION_PROMPT.to_string();
    prompt.extend(text.chars().take(self.max_chars));
    prompt
  }
}

#[async_trait]
impl MetadataSuggester for OllamaSuggester {
  #[instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
  async fn suggest_metadata(&self, text: &str) -> Result<Suggestion> {
    let response = LlamaRequest::new()
      .with_host(&self.host)
      .with_model(self.model.clone())
      .with_json_format()
      .with_message(&self.prompt(text))
      .send()
      .await
      .map_err(|e| JatsError::Suggestion(e.to_string()))?;
    debug!(eval_count = response.eval_count, "Model replied");
    parse_suggestion(&response.message.content)
  }
}

lazy_static! {
  /// Outermost JSON object in a reply that may carry prose or code fences around it.
  static ref JSON_OBJECT: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Text of a scalar JSON value.
fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(text) => Some(text.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Coerces one text field: numbers become strings and lists of scalars are joined with commas, so
/// `"year": 2020` and `"keywords": ["agua", "mar"]` still read. Anything else is dropped.
fn normalize_field(key: &str, value: &mut Value) {
  match value {
    Value::Null | Value::String(_) => {},
    Value::Number(n) => *value = Value::String(n.to_string()),
    Value::Array(items) if items.iter().all(|item| scalar_text(item).is_some()) => {
      let joined = items.iter().filter_map(scalar_text).collect::<Vec<_>>().join(", ");
      *value = Value::String(joined);
    },
    _ => {
      warn!(field = %key, "Dropping suggested field of an unexpected type");
      *value = Value::Null;
    },
  }
}

/// An author entry as an object, or `None` when it cannot be one. A bare string is taken as the
/// name.
fn author_object(author: Value) -> Option<Value> {
  match author {
    Value::Object(mut fields) => {
      fields.iter_mut().for_each(|(key, value)| normalize_field(key, value));
      Some(Value::Object(fields))
    },
    Value::String(name) => Some(serde_json::json!({ "name": name })),
    other => {
      warn!(author = %other, "Dropping suggested author of an unexpected type");
      None
    },
  }
}

/// Brings a reply object into the shape of [`Suggestion`] field by field, so one badly typed
/// field does not cost the others.
fn normalize_reply(value: &mut Value) {
  let Value::Object(fields) = value else {
    return;
  };
  for (key, value) in fields.iter_mut() {
    if key.as_str() != "authors" {
      normalize_field(key, value);
      continue;
    }
    match value {
      Value::Array(authors) =>
        *authors = std::mem::take(authors).into_iter().filter_map(author_object).collect(),
      Value::Null => {},
      _ => {
        warn!("Dropping suggested authors that are not a list");
        *value = Value::Null;
      },
    }
  }
}

/// Parses a model reply into a [`Suggestion`].
///
/// ```
/// use jatsmith::llm::parse_suggestion;
///
/// let reply = "Sure! ```json\n{\"title\": \"Aguas\", \"year\": 2020}\n```";
/// let suggestion = parse_suggestion(reply).unwrap();
/// assert_eq!(suggestion.title.as_deref(), Some("Aguas"));
/// assert_eq!(suggestion.year.as_deref(), Some("2020"));
/// ```
///
/// # Errors
///
/// Returns [`JatsError::Suggestion`] when the reply holds no JSON object of the expected shape.
pub fn parse_suggestion(reply: &str) -> Result<Suggestion> {
  let json = JSON_OBJECT
    .find(reply)
    .ok_or_else(|| JatsError::Suggestion("the model reply holds no JSON object".to_string()))?;
  let mut value: Value = serde_json::from_str(json.as_str()).map_err(|e| {
    warn!("Model reply is not valid JSON: {e}");
    JatsError::Suggestion(e.to_string())
  })?;
  normalize_reply(&mut value);
  serde_json::from_value(value).map_err(|e| {
    warn!("Model reply does not look like article metadata: {e}");
    JatsError::Suggestion(e.to_string())
  })
}
