//! LLM-backed summary provider.
//!
//! Speaks blocking HTTP+JSON to an OpenAI-compatible chat-completions
//! endpoint. Prompts ask for Apple/Swift-style `///` documentation comments;
//! replies are post-processed so only well-formed comment lines reach the
//! rewriter.

use crate::config::WeaverConfig;
use crate::resolve::{ProviderError, SummaryProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum width of an emitted `///` line.
const MAX_DOC_LINE: usize = 120;

const MEMBER_DOC_INSTRUCTION: &str = "\
You generate documentation comments for provided Swift functions and properties, \
following the official Apple and Swift guidelines. The comment includes:

1. A concise description of the declaration's purpose and data flow.
2. A list of parameters, with a description for each, if applicable.
3. A description of the return value, if applicable.
4. Any additional notes or context, if necessary.

Every line in your reply must start with ///.";

const TYPE_DOC_INSTRUCTION: &str = "\
Write a concise standalone documentation comment for a type described by code \
or comments, following the official Apple and Swift guidelines. The comment \
includes a concise description of the type's purpose and data flow, plus any \
additional notes or context if necessary. Every line in your reply must start \
with ///.";

const COMBINE_PREAMBLE: &str = "\
/// Documentation of all methods and properties in the current type, should \
not be included in final documentation:";

pub struct LlmProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_key: String,
}

impl LlmProvider {
    /// Build a provider from config, reading the API key from the
    /// environment variable the config names.
    pub fn new(config: &WeaverConfig) -> Result<Self, ProviderError> {
        let api_key =
            std::env::var(&config.api_key_env).map_err(|_| ProviderError::MissingApiKey {
                env: config.api_key_env.clone(),
            })?;
        Self::with_api_key(config, api_key)
    }

    /// Build a provider with an explicit API key.
    pub fn with_api_key(config: &WeaverConfig, api_key: String) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key,
        })
    }

    fn chat(&self, instruction: &str, input: &str) -> Result<String, ProviderError> {
        tracing::debug!("requesting summary for {} bytes of input", input.len());

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: instruction,
                },
                Message {
                    role: "user",
                    content: input,
                },
            ],
            temperature: 0.0,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| ProviderError::Http {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                code: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let reply: ChatResponse = response.json().map_err(|e| ProviderError::Malformed {
            message: e.to_string(),
        })?;

        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Malformed {
                message: "response contained no choices".to_string(),
            })
    }
}

impl SummaryProvider for LlmProvider {
    fn member_summary(&self, declaration: &str) -> Result<String, ProviderError> {
        // Single-line members carry no body worth documenting; skip the
        // round-trip and contribute an empty summary.
        if declaration.lines().count() <= 1 {
            tracing::info!(
                "member body too short, skipping: {}",
                declaration.lines().next().unwrap_or_default()
            );
            return Ok(String::new());
        }

        let input =
            format!("Declaration implementation:\n```\n{declaration}\n```\n\nProvide the documentation comment for this implementation.");
        let reply = self.chat(MEMBER_DOC_INSTRUCTION, &input)?;
        Ok(wrap_doc_comment(&reply, MAX_DOC_LINE))
    }

    fn combine(&self, member_summaries: &[String]) -> Result<String, ProviderError> {
        let digest = format!("{COMBINE_PREAMBLE}\n///\n{}", member_summaries.join("\n///\n"));
        let reply = self.chat(TYPE_DOC_INSTRUCTION, &digest)?;
        Ok(wrap_doc_comment(&reply, MAX_DOC_LINE))
    }

    fn class_body_summary(&self, body: &str) -> Result<String, ProviderError> {
        let reply = self.chat(TYPE_DOC_INSTRUCTION, body)?;
        Ok(wrap_doc_comment(&reply, MAX_DOC_LINE))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

/// Keep only the leading run of `///` lines and re-wrap them at `max_len`.
///
/// Model replies occasionally append prose after the comment block; anything
/// from the first non-comment line on is discarded.
pub fn wrap_doc_comment(text: &str, max_len: usize) -> String {
    let mut wrapped = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if !line.starts_with("///") {
            break;
        }

        let mut words = line.split_whitespace();
        let Some(first) = words.next() else { continue };
        let mut current = first.to_string();

        for word in words {
            if current.len() + word.len() + 1 > max_len {
                wrapped.push(std::mem::replace(&mut current, format!("/// {word}")));
            } else {
                current.push(' ');
                current.push_str(word);
            }
        }
        wrapped.push(current);
    }

    wrapped.join("\n")
}
