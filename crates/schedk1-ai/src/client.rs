//! Extraction client: encode, ask the model, repair and coerce the answer.
//!
//! One call is a small state machine over attempts. Each attempt halves the
//! document size budget. Only transport failures are retried; anything that
//! goes wrong after the model has answered yields an all-default mapping.

use std::fmt;
use std::path::{Path, PathBuf};

use schedk1_core::{FieldMap, K1Extraction, RecordKind, all_field_names, defaulted_fields};
use schedk1_pdf::{DocumentEncoder, budget_bytes};
use tracing::{error, info, warn};

use crate::coerce::coerce_fields;
use crate::error::{ContentError, ExtractError};
use crate::prompt::{K1_EXAMPLES, SYSTEM_INSTRUCTION, build_prompt, field_guide};
use crate::response::parse_model_json;
use crate::transport::{
    ChatRequest, ChatResponse, CompletionTransport, ContentPart, Message, ResponseFormat,
};

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_APP_TITLE: &str = "K-1 Tax Form Extraction";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_MAX_TOKENS: u32 = 16000;
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_MAX_PDF_MB: u64 = 20;

/// Filename reported to the model for the inline document.
const DOCUMENT_FILENAME: &str = "document.pdf";

/// Section label used for whole-document K-1 calls.
const K1_SECTION: &str = "Schedule K-1 (Form 1065) cover page and federal footnotes";

/// Settings for the extraction client.
#[derive(Clone)]
pub struct ExtractorConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub max_attempts: u32,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Size budget for the first attempt, in megabytes.
    pub max_pdf_mb: u64,
    /// Sent as the `X-Title` header.
    pub app_title: String,
}

impl ExtractorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            model: DEFAULT_MODEL.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_pdf_mb: DEFAULT_MAX_PDF_MB,
            app_title: DEFAULT_APP_TITLE.into(),
        }
    }

    /// Byte budget for a zero-based attempt: the maximum halved per attempt.
    pub fn budget_for_attempt(&self, attempt: u32) -> usize {
        budget_bytes(self.max_pdf_mb.checked_shr(attempt).unwrap_or(0))
    }
}

impl fmt::Debug for ExtractorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_attempts", &self.max_attempts)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_pdf_mb", &self.max_pdf_mb)
            .field("app_title", &self.app_title)
            .finish()
    }
}

/// What to extract from which document.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub document: PathBuf,
    /// Field whitelist; the result holds exactly these names.
    pub fields: Vec<String>,
    pub section: String,
    /// Record schema to validate against in complete mode.
    pub target: Option<RecordKind>,
    pub examples: String,
    pub partial: bool,
}

impl ExtractionRequest {
    /// Partial-mode request for an arbitrary field subset.
    pub fn new<S: AsRef<str>>(document: impl Into<PathBuf>, fields: &[S]) -> Self {
        Self {
            document: document.into(),
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            section: String::new(),
            target: None,
            examples: String::new(),
            partial: true,
        }
    }

    /// Complete-mode request for every field of one record.
    pub fn for_record(document: impl Into<PathBuf>, kind: RecordKind) -> Self {
        Self::new(document, kind.field_names())
            .section(kind.as_str())
            .target(kind)
            .complete()
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    pub fn target(mut self, kind: RecordKind) -> Self {
        self.target = Some(kind);
        self
    }

    pub fn examples(mut self, examples: impl Into<String>) -> Self {
        self.examples = examples.into();
        self
    }

    pub fn complete(mut self) -> Self {
        self.partial = false;
        self
    }

    fn defaults(&self) -> FieldMap {
        defaulted_fields(self.fields.iter().map(String::as_str))
    }
}

/// Vision-model extraction client.
pub struct ExtractionClient {
    config: ExtractorConfig,
    transport: Box<dyn CompletionTransport>,
    encoder: Box<dyn DocumentEncoder>,
}

impl ExtractionClient {
    pub fn with_transport(
        config: ExtractorConfig,
        transport: impl CompletionTransport + 'static,
        encoder: impl DocumentEncoder + 'static,
    ) -> Self {
        Self {
            config,
            transport: Box::new(transport),
            encoder: Box::new(encoder),
        }
    }

    /// Client talking to the configured OpenRouter endpoint.
    #[cfg(feature = "http")]
    pub fn openrouter(config: ExtractorConfig, encoder: impl DocumentEncoder + 'static) -> Self {
        let transport = crate::openrouter::OpenRouterTransport::new(
            &config.endpoint,
            config.api_key.clone(),
            config.app_title.clone(),
        );
        Self::with_transport(config, transport, encoder)
    }

    /// Extract the requested fields from one document.
    ///
    /// The field guide follows the target schema, or the cover page when
    /// the request has none. Errors only when every attempt failed at the
    /// transport level.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<FieldMap, ExtractError> {
        let schema = request.target.unwrap_or(RecordKind::CoverPage);
        let guide = field_guide(schema.field_names());
        let prompt = build_prompt(&request.section, &request.fields, &guide, &request.examples);
        let max_attempts = self.config.max_attempts.max(1);
        let document = request.document.display();

        let mut attempt = 0u32;
        loop {
            let budget = self.config.budget_for_attempt(attempt);
            info!(
                document = %document,
                section = %request.section,
                attempt = attempt + 1,
                max_attempts,
                budget,
                "extraction attempt"
            );

            let encoded = match self.encoder.encode(&request.document, budget) {
                Ok(encoded) => encoded,
                Err(e) => {
                    error!(document = %document, section = %request.section, error = %e, "failed to encode document");
                    return Ok(request.defaults());
                }
            };

            let chat = self.chat_request(&encoded, &prompt);
            match self.transport.complete(&chat).await {
                Ok(response) => {
                    return Ok(read_fields(request, &response).unwrap_or_else(|e| {
                        error!(document = %document, section = %request.section, error = %e, "unusable model response");
                        request.defaults()
                    }));
                }
                Err(source) => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        return Err(ExtractError::Transport {
                            attempts: attempt,
                            source,
                        });
                    }
                    warn!(
                        document = %document,
                        attempt,
                        error = %source,
                        "transport failure, retrying with a smaller document"
                    );
                }
            }
        }
    }

    /// Extract every cover page and footnote field in a single pass.
    pub async fn extract_k1(&self, path: &Path) -> Result<K1Extraction, ExtractError> {
        let request = ExtractionRequest::new(path, &all_field_names())
            .section(K1_SECTION)
            .examples(K1_EXAMPLES)
            .complete();
        let fields = self.extract(&request).await?;
        let extraction = K1Extraction::from_fields(&fields);
        info!(
            document = %path.display(),
            populated = extraction.populated(),
            "document extracted"
        );
        Ok(extraction)
    }

    fn chat_request(&self, encoded_pdf: &str, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message::user(vec![
                ContentPart::text(SYSTEM_INSTRUCTION),
                ContentPart::pdf(DOCUMENT_FILENAME, encoded_pdf),
                ContentPart::text(prompt),
            ])],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: Some(ResponseFormat::json_object()),
        }
    }
}

fn read_fields(
    request: &ExtractionRequest,
    response: &ChatResponse,
) -> Result<FieldMap, ContentError> {
    let content = response.first_content().ok_or(ContentError::MissingContent)?;
    let payload = parse_model_json(content)?;
    coerce_fields(&payload, &request.fields, request.target, request.partial)
}
