use std::{
    fmt::{self, Formatter},
    sync::{Arc, LazyLock},
    time::Duration,
};

use reqwest::{
    Client, ClientBuilder, Response,
    header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use snafu::{ResultExt, Snafu};
use tracing::{Level, Span, instrument};
use url::Url;

use crate::embedding::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, EmbedBuilder, EmbedContentRequest,
    EmbedContentResponse,
};
use crate::generation::{ContentBuilder, GenerateContentRequest, GenerationResponse};

static DEFAULT_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://generativelanguage.googleapis.com/v1beta/")
        .expect("unreachable error: failed to parse default base URL")
});

/// Request timeout applied when the builder is not given one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    #[default]
    Gemini25Flash,
    Gemini25FlashLite,
    Gemini25Pro,
    TextEmbedding004,
    GeminiEmbedding001,
    Custom(String),
}

impl Model {
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gemini25Flash => "models/gemini-2.5-flash",
            Model::Gemini25FlashLite => "models/gemini-2.5-flash-lite",
            Model::Gemini25Pro => "models/gemini-2.5-pro",
            Model::TextEmbedding004 => "models/text-embedding-004",
            Model::GeminiEmbedding001 => "models/gemini-embedding-001",
            Model::Custom(model) => model,
        }
    }

    /// Model name without the `models/` resource prefix.
    pub fn id(&self) -> &str {
        self.as_str().strip_prefix("models/").unwrap_or(self.as_str())
    }

    /// Resolve a user supplied name such as `gemini-2.5-flash` or
    /// `models/text-embedding-004` to a known variant when possible.
    pub fn from_name(name: &str) -> Self {
        let id = name.trim().strip_prefix("models/").unwrap_or(name.trim());
        match id {
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            "text-embedding-004" => Model::TextEmbedding004,
            "gemini-embedding-001" => Model::GeminiEmbedding001,
            other => Model::Custom(format!("models/{other}")),
        }
    }
}

impl From<&str> for Model {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<String> for Model {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("failed to parse API key"))]
    InvalidApiKey { source: InvalidHeaderValue },

    #[snafu(display("failed to build HTTP client"))]
    BuildHttpClient { source: reqwest::Error },

    #[snafu(display("failed to construct URL (probably incorrect model name): {suffix}"))]
    ConstructUrl { source: url::ParseError, suffix: String },

    #[snafu(display("failed to perform request to '{url}'"))]
    PerformRequest { source: reqwest::Error, url: Url },

    #[snafu(display(
        "bad response from server; code {code}; description: {}",
        description.as_deref().unwrap_or("none")
    ))]
    BadResponse {
        /// HTTP status code
        code: u16,
        /// HTTP error description
        description: Option<String>,
    },

    #[snafu(display("failed to decode JSON response"))]
    DecodeResponse { source: reqwest::Error },
}

impl Error {
    /// Whether repeating the same request may succeed: rate limiting,
    /// server-side failures and transport errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::BadResponse { code, .. } => *code == 429 || *code >= 500,
            Error::PerformRequest { .. } => true,
            _ => false,
        }
    }
}

/// Internal client for making requests to the Gemini API
pub struct GeminiClient {
    http_client: Client,
    pub model: Model,
    base_url: Url,
}

impl GeminiClient {
    fn new(
        client_builder: ClientBuilder,
        model: Model,
        base_url: Url,
        api_key: &str,
    ) -> Result<Self, Error> {
        let headers = HeaderMap::from_iter([(
            HeaderName::from_static("x-goog-api-key"),
            HeaderValue::from_str(api_key).context(InvalidApiKeySnafu)?,
        )]);

        let http_client =
            client_builder.default_headers(headers).build().context(BuildHttpClientSnafu)?;

        Ok(Self { http_client, model, base_url })
    }

    /// Check the response status code and return an error if it is not successful
    #[instrument(skip_all, err)]
    async fn check_response(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if !status.is_success() {
            let description = response.text().await.ok();
            BadResponseSnafu { code: status.as_u16(), description }.fail()
        } else {
            Ok(response)
        }
    }

    /// Perform a POST request with JSON body and deserialize the JSON response.
    #[instrument(skip(self, body), fields(request.url = %url))]
    async fn post_json<Req: Serialize, Res: DeserializeOwned>(
        &self,
        url: Url,
        body: &Req,
    ) -> Result<Res, Error> {
        let response = self
            .http_client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .context(PerformRequestSnafu { url })?;
        tracing::debug!("response received successfully");
        let response = Self::check_response(response).await?;
        response.json().await.context(DecodeResponseSnafu)
    }

    /// Generate content
    #[instrument(skip_all, fields(
        model = %self.model,
        messages.count = request.contents.len(),
        usage.prompt_tokens,
        usage.candidates_tokens,
        usage.total_tokens,
    ), err)]
    pub(crate) async fn generate_content_raw(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerationResponse, Error> {
        let url = self.build_url("generateContent")?;
        let response: GenerationResponse = self.post_json(url, request).await?;

        if let Some(usage) = &response.usage_metadata {
            Span::current()
                .record("usage.prompt_tokens", usage.prompt_token_count)
                .record("usage.candidates_tokens", usage.candidates_token_count)
                .record("usage.total_tokens", usage.total_token_count);
            tracing::debug!("generation usage evaluated");
        }

        Ok(response)
    }

    /// Embed content
    #[instrument(skip_all, fields(
        model = %self.model,
        task.type = request.task_type.as_ref().map(|t| format!("{t:?}")),
    ), err)]
    pub(crate) async fn embed_content(
        &self,
        request: &EmbedContentRequest,
    ) -> Result<EmbedContentResponse, Error> {
        let url = self.build_url("embedContent")?;
        self.post_json(url, request).await
    }

    /// Batch embed content
    #[instrument(skip_all, fields(model = %self.model, batch.size = request.requests.len()), err)]
    pub(crate) async fn embed_content_batch(
        &self,
        request: &BatchEmbedContentsRequest,
    ) -> Result<BatchEmbedContentsResponse, Error> {
        let url = self.build_url("batchEmbedContents")?;
        self.post_json(url, request).await
    }

    /// Build a URL for the API
    #[instrument(skip(self), ret(level = Level::DEBUG))]
    fn build_url(&self, endpoint: &str) -> Result<Url, Error> {
        let suffix = format!("{}:{endpoint}", self.model);
        self.base_url.join(&suffix).context(ConstructUrlSnafu { suffix })
    }
}

/// A builder for the [`Gemini`] client.
///
/// ```no_run
/// use nepisirsem_gemini::{GeminiBuilder, Model};
///
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let gemini = GeminiBuilder::new("YOUR_API_KEY")
///     .with_model(Model::TextEmbedding004)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiBuilder {
    api_key: String,
    model: Model,
    base_url: Url,
    timeout: Duration,
}

impl GeminiBuilder {
    /// Creates a new `GeminiBuilder` with the given API key.
    pub fn new<K: Into<String>>(key: K) -> Self {
        Self {
            api_key: key.into(),
            model: Model::default(),
            base_url: DEFAULT_BASE_URL.clone(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the model for the client.
    pub fn with_model<M: Into<Model>>(mut self, model: M) -> Self {
        self.model = model.into();
        self
    }

    /// Sets a custom base URL for the API. Must end with `/`.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the `Gemini` client.
    pub fn build(self) -> Result<Gemini, Error> {
        let client_builder = ClientBuilder::new().timeout(self.timeout);
        Ok(Gemini {
            client: Arc::new(GeminiClient::new(
                client_builder,
                self.model,
                self.base_url,
                &self.api_key,
            )?),
        })
    }
}

/// Client for the Gemini API
#[derive(Clone)]
pub struct Gemini {
    client: Arc<GeminiClient>,
}

impl Gemini {
    /// Create a new client with the specified API key and the default model
    pub fn new<K: AsRef<str>>(api_key: K) -> Result<Self, Error> {
        Self::with_model(api_key, Model::default())
    }

    /// Create a new client with the specified API key and model
    pub fn with_model<K: AsRef<str>, M: Into<Model>>(api_key: K, model: M) -> Result<Self, Error> {
        GeminiBuilder::new(api_key.as_ref()).with_model(model).build()
    }

    /// The model every request of this client targets.
    pub fn model(&self) -> &Model {
        &self.client.model
    }

    /// Start building a content generation request
    pub fn generate_content(&self) -> ContentBuilder {
        ContentBuilder::new(self.client.clone())
    }

    /// Start building a content embedding request
    pub fn embed_content(&self) -> EmbedBuilder {
        EmbedBuilder::new(self.client.clone())
    }
}
