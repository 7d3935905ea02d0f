//! Vision-model extraction of Schedule K-1 fields.

pub mod client;
pub mod coerce;
pub mod error;
#[cfg(feature = "http")]
pub mod openrouter;
pub mod prompt;
pub mod response;
pub mod transport;

pub use client::{ExtractionClient, ExtractionRequest, ExtractorConfig};
pub use error::{ContentError, ExtractError, TransportError};
#[cfg(feature = "http")]
pub use openrouter::OpenRouterTransport;
pub use transport::{ChatRequest, ChatResponse, CompletionTransport};
