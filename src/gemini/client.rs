use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::DEFAULT_MODELS;
use super::config::GeminiConfig;
use super::wire::*;
use crate::core::{FacturaError, InvoiceExtractor, InvoiceRecord, parse_extraction_response};

const CONNECTION_PROBE: &str = "Reply only with the word 'OK' if you can read me.";

/// Upper bound on `models` pages fetched by one listing.
pub const MAX_MODEL_PAGES: usize = 50;

/// Async client for the Gemini `generativelanguage` REST API.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
    api_key: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .field("api_key", &"***")
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Build a client; resolves the API key up front.
    ///
    /// # Errors
    ///
    /// `FacturaError::Config` without an API key,
    /// `FacturaError::Network` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, FacturaError> {
        let api_key = config.resolve_api_key()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FacturaError::Network(e.to_string()))?;
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Switch to another model, e.g. one picked from [`available_models`](Self::available_models).
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
    }

    /// Send a PDF plus instructions and decode the JSON answer into a record.
    pub async fn extract_invoice(
        &self,
        pdf: &[u8],
        prompt: &str,
    ) -> Result<InvoiceRecord, FacturaError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::inline("application/pdf", BASE64.encode(pdf)),
                    Part::text(prompt),
                ],
            }],
            generation_config: Some(GenerationConfig::json(&self.config.generation)),
        };

        info!(model = %self.config.model, pdf_bytes = pdf.len(), "requesting invoice extraction");
        let text = self.generate(&request).await?;
        parse_extraction_response(&text)
    }

    /// Ask the model for a one-word reply; returns what it said.
    pub async fn test_connection(&self) -> Result<String, FacturaError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(CONNECTION_PROBE)],
            }],
            generation_config: None,
        };
        let reply = self.generate(&request).await?;
        info!(model = %self.config.model, "connection ok");
        Ok(reply.trim().to_string())
    }

    /// Gemini model ids available to this key (`models/` prefix stripped).
    ///
    /// # Errors
    ///
    /// `FacturaError::Protocol` if the server repeats a page token or the
    /// listing runs past [`MAX_MODEL_PAGES`].
    pub async fn list_models(&self) -> Result<Vec<String>, FacturaError> {
        let url = format!("{}/models", self.config.base_url);
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        for _ in 0..MAX_MODEL_PAGES {
            let mut query = vec![("pageSize", "1000".to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let resp = self
                .http
                .get(&url)
                .header("x-goog-api-key", &self.api_key)
                .query(&query)
                .send()
                .await
                .map_err(|e| FacturaError::Network(e.to_string()))?;
            let page: ListModelsResponse = read_json(resp).await?;

            names.extend(page.models.into_iter().map(|m| m.name));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) if !seen_tokens.insert(token.clone()) => {
                    return Err(FacturaError::Protocol(format!(
                        "model listing repeated page token '{token}'"
                    )));
                }
                Some(token) => page_token = Some(token),
                None => return Ok(filter_gemini_models(names)),
            }
        }

        Err(FacturaError::Protocol(format!(
            "model listing exceeded {MAX_MODEL_PAGES} pages"
        )))
    }

    /// Like [`list_models`](Self::list_models), but falls back to
    /// [`DEFAULT_MODELS`] on any error.
    pub async fn available_models(&self) -> Vec<String> {
        match self.list_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!(error = %e, "could not list models, using defaults");
                default_models()
            }
        }
    }

    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, FacturaError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| FacturaError::Network(e.to_string()))?;
        let body: GenerateContentResponse = read_json(resp).await?;

        if let Some(reason) = body.block_reason() {
            return Err(FacturaError::Extraction(format!("prompt blocked: {reason}")));
        }
        if let Some(reason) = body.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            debug!(finish_reason = reason, "generation finished");
        }
        body.text().ok_or(FacturaError::EmptyResponse)
    }
}

impl InvoiceExtractor for GeminiClient {
    fn extract(
        &self,
        pdf: &[u8],
        prompt: &str,
    ) -> impl Future<Output = Result<InvoiceRecord, FacturaError>> + Send {
        self.extract_invoice(pdf, prompt)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, FacturaError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| FacturaError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(FacturaError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

/// Keep Gemini models, strip the `models/` prefix; empty → [`DEFAULT_MODELS`].
pub fn filter_gemini_models(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let models: Vec<String> = names
        .into_iter()
        .filter(|n| n.to_lowercase().contains("gemini"))
        .map(|n| n.strip_prefix("models/").map(str::to_string).unwrap_or(n))
        .collect();

    if models.is_empty() {
        default_models()
    } else {
        models
    }
}
