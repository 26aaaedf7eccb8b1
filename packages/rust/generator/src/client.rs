//! Chat-completion client for OpenAI-compatible APIs.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use qaforge_shared::{ChatMessage, OpenAiConfig, QaForgeError, Result};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("qaforge/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body echoed back in diagnostics.
const MAX_ERROR_BODY: usize = 300;

/// A service that turns a conversation into one reply.
///
/// `Ok(None)` means the service answered but gave no content.
pub trait ChatCompletion {
    fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// OpenAiClient
// ---------------------------------------------------------------------------

/// `POST {base_url}/chat/completions` with bearer auth. One attempt per call.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QaForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: completions_endpoint(&config.base_url)?,
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Parse the base URL and join `chat/completions` onto it, tolerating a
/// missing trailing slash.
fn completions_endpoint(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)
        .map_err(|e| QaForgeError::config(format!("invalid base_url '{base_url}': {e}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("chat/completions")
        .map_err(|e| QaForgeError::config(format!("invalid base_url '{base}': {e}")))
}

impl ChatCompletion for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model, endpoint = %self.endpoint))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
        };

        let mut request = self.http.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| QaForgeError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(QaForgeError::Network(format!(
                "{}: HTTP {status}: {snippet}",
                self.endpoint
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| QaForgeError::Generation(format!("malformed completion response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| QaForgeError::Generation("completion response has no choices".into()))?;

        debug!(
            has_content = choice.message.content.is_some(),
            "completion received"
        );

        Ok(choice.message.content)
    }
}
