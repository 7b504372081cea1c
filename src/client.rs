//! HTTP client for the Wissen-Kompaktor API.
//!
//! Two endpoints, one attempt per call, no client-side timeout:
//! - `POST {base}/api/compact` with a JSON body
//! - `POST {base}/api/compact-file` with a multipart body
//!
//! Both answer `{result: {summary?, bullets?, cards?}, text?}` on success or
//! `{success: false, error: {message}}` on failure.

use crate::errors::ClientError;
use crate::model::{CompactOptions, CompactionMode, CompactionResult, Flashcard, LanguageCode, ResultShape};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Question used when a card-mode answer came back as unstructured text.
pub const FALLBACK_CARD_QUESTION: &str = "What is this text about?";

/// A successful compaction as returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Compaction {
    pub result: CompactionResult,
    /// Source text the server extracted from an uploaded file.
    pub extracted_text: Option<String>,
}

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub async fn from_path(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self { name, mime, bytes })
    }
}

/// The remote compaction service. Implemented over HTTP by [`HttpClient`];
/// tests drive the orchestrator with fakes.
#[async_trait]
pub trait SummarizationApi: Send + Sync {
    async fn compact_text(
        &self,
        text: &str,
        mode: CompactionMode,
        language: LanguageCode,
        options: &CompactOptions,
    ) -> Result<Compaction, ClientError>;

    async fn compact_file(
        &self,
        file: &UploadFile,
        mode: CompactionMode,
        language: LanguageCode,
    ) -> Result<Compaction, ClientError>;
}

#[derive(Debug, Serialize)]
struct CompactRequest<'a> {
    text: &'a str,
    mode: CompactionMode,
    language: LanguageCode,
    options: &'a CompactOptions,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .user_agent(concat!("kompaktor/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn finish(
        &self,
        request: reqwest::RequestBuilder,
        mode: CompactionMode,
    ) -> Result<Compaction, ClientError> {
        let resp = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Compaction request did not reach the server");
            ClientError::Network {
                detail: e.to_string(),
            }
        })?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| ClientError::Network {
            detail: e.to_string(),
        })?;
        tracing::debug!(status, bytes = body.len(), "Compaction response received");
        decode_response(mode, status, &body)
    }
}

#[async_trait]
impl SummarizationApi for HttpClient {
    async fn compact_text(
        &self,
        text: &str,
        mode: CompactionMode,
        language: LanguageCode,
        options: &CompactOptions,
    ) -> Result<Compaction, ClientError> {
        let url = self.endpoint("/api/compact");
        tracing::info!(%url, %mode, %language, chars = text.chars().count(), "Compacting text");
        let body = CompactRequest {
            text,
            mode,
            language,
            options,
        };
        self.finish(self.http.post(&url).json(&body), mode).await
    }

    async fn compact_file(
        &self,
        file: &UploadFile,
        mode: CompactionMode,
        language: LanguageCode,
    ) -> Result<Compaction, ClientError> {
        use reqwest::multipart::{Form, Part};

        let url = self.endpoint("/api/compact-file");
        tracing::info!(%url, %mode, %language, file = %file.name, bytes = file.bytes.len(), "Compacting file");

        let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let part = match part.mime_str(&file.mime) {
            Ok(part) => part,
            Err(e) => {
                tracing::debug!(error = %e, mime = %file.mime, "Ignoring unusable MIME type");
                Part::bytes(file.bytes.clone()).file_name(file.name.clone())
            }
        };
        let form = Form::new()
            .part("file", part)
            .text("mode", mode.as_str())
            .text("language", language.as_str());

        self.finish(self.http.post(&url).multipart(form), mode).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    result: Option<ResultPayload>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Plain(String),
    Structured {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Result payloads: the structured object, or a bare string from older
/// server revisions.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResultPayload {
    Legacy(String),
    Fields(ResultFields),
}

#[derive(Debug, Default, Deserialize)]
struct ResultFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    bullets: Option<Vec<String>>,
    #[serde(default)]
    cards: Option<Vec<Flashcard>>,
}

impl ApiResponse {
    fn server_message(&self) -> Option<String> {
        let from_error = self.error.as_ref().and_then(|e| match e {
            ApiErrorBody::Plain(s) => Some(s.clone()),
            ApiErrorBody::Structured { message } => message.clone(),
        });
        let from_detail = self.detail.as_ref().and_then(|d| match d {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });
        from_error
            .or(from_detail)
            .or_else(|| self.message.clone())
            .filter(|m| !m.trim().is_empty())
    }
}

/// Turn a raw HTTP status and body into a compaction or a typed error.
pub fn decode_response(
    mode: CompactionMode,
    status: u16,
    body: &str,
) -> Result<Compaction, ClientError> {
    let parsed = serde_json::from_str::<ApiResponse>(body);

    if !(200..300).contains(&status) {
        let message = match &parsed {
            Ok(resp) => resp.server_message().or_else(|| Some(body.to_string())),
            Err(_) => Some(body.to_string()),
        };
        return Err(ClientError::request(Some(status), message));
    }

    let resp = parsed.map_err(|e| {
        tracing::warn!(error = %e, "Could not decode compaction response");
        ClientError::request(Some(status), Some("Unexpected response from server.".into()))
    })?;

    if resp.success == Some(false) {
        return Err(ClientError::request(None, resp.server_message()));
    }

    let result = match resp.result {
        Some(payload) => result_from_payload(mode, payload),
        None => CompactionResult::empty(mode),
    };
    let extracted_text = resp.text.filter(|t| !t.trim().is_empty());

    Ok(Compaction {
        result,
        extracted_text,
    })
}

/// Pick the field that belongs to `mode`; anything else is ignored and a
/// missing field decodes to the empty value.
fn result_from_payload(mode: CompactionMode, payload: ResultPayload) -> CompactionResult {
    match (mode.shape(), payload) {
        (ResultShape::Text, ResultPayload::Fields(f)) => CompactionResult::Text {
            text: f.summary.unwrap_or_default(),
        },
        (ResultShape::List, ResultPayload::Fields(f)) => CompactionResult::Bullets {
            items: f.bullets.unwrap_or_default(),
        },
        (ResultShape::Cards, ResultPayload::Fields(f)) => CompactionResult::Cards {
            cards: f.cards.unwrap_or_default(),
        },
        (ResultShape::Text, ResultPayload::Legacy(text)) => CompactionResult::Text { text },
        (ResultShape::List, ResultPayload::Legacy(text)) => CompactionResult::Bullets {
            items: split_bullet_lines(&text),
        },
        (ResultShape::Cards, ResultPayload::Legacy(text)) => {
            let answer = text.trim();
            let cards = if answer.is_empty() {
                Vec::new()
            } else {
                vec![Flashcard {
                    question: FALLBACK_CARD_QUESTION.to_string(),
                    answer: answer.to_string(),
                }]
            };
            CompactionResult::Cards { cards }
        }
    }
}

fn split_bullet_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
