//! # nepisirsem-gemini
//!
//! A small client for the Google Gemini REST API covering the two calls the
//! recipe assistant needs: `generateContent` and `embedContent` /
//! `batchEmbedContents`. Authentication uses an API key sent in the
//! `x-goog-api-key` header.
//!
//! ```no_run
//! use nepisirsem_gemini::{Gemini, Model, TaskType};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let gemini = Gemini::with_model("API_KEY", Model::TextEmbedding004)?;
//! let response = gemini
//!     .embed_content()
//!     .with_text("Menemen tarifi")
//!     .with_task_type(TaskType::RetrievalQuery)
//!     .execute()
//!     .await?;
//! println!("{} dimensions", response.embedding.values.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod embedding;
pub mod generation;


pub use client::{DEFAULT_TIMEOUT, Error, Gemini, GeminiBuilder, Model};
pub use embedding::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, ContentEmbedding, EmbedBuilder,
    EmbedContentRequest, EmbedContentResponse, TaskType,
};
pub use generation::{
    BlockReason, Candidate, Content, ContentBuilder, FinishReason, GenerateContentRequest,
    GenerationConfig, GenerationResponse, Part, PromptFeedback, Role, UsageMetadata,
};
