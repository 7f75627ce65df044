//! # nepisirsem-model
//!
//! Answer generation for the Ne Pişirsem recipe assistant.
//!
//! - [`GeminiModel`] - Google Gemini via `generateContent`, temperature 0
//! - [`MockLlm`] - scripted model for tests and offline runs
//!
//! ```rust,no_run
//! use nepisirsem_model::{GeminiModel, GenerationRequest, Llm};
//!
//! # async fn run() -> Result<(), nepisirsem_model::LlmError> {
//! let model = GeminiModel::new("API_KEY", "gemini-2.5-flash")?;
//! let answer = model.generate(GenerationRequest::new("Menemen nasıl yapılır?")).await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;
pub mod llm;
pub mod mock;

#[cfg(feature = "gemini")]
pub use gemini::{DEFAULT_GENERATION_MODEL, GeminiModel};
pub use llm::{GenerationRequest, Llm, LlmError, Result};
pub use mock::MockLlm;
