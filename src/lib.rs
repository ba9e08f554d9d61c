//! Extract recipe names and ingredient lists from YouTube videos.
//!
//! A video's captions are handed to a text-generation model together with a
//! fixed instruction prompt, and the model's answer is decoded into
//! [`RecipesResponse`]. The pipeline lives in [`RecipeExtractor`]; the
//! [`server`] module exposes it over HTTP.

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod providers;
pub mod secrets;
pub mod server;
pub mod transcript;

pub use builder::RecipeExtractorBuilder;
pub use crate::config::AppConfig;
pub use error::{ExtractionError, GenerationError, ParseError, SetupError, TranscriptError};
pub use model::{Recipe, RecipesResponse};
pub use parser::parse_recipes;
pub use pipeline::{RecipeExtractor, RetryPolicy};
pub use providers::{build_prompt, TextGenerator};
pub use secrets::SecretStore;
pub use transcript::TranscriptSource;

use std::error::Error;

/// Extract recipes from a video using configuration from `recitube.toml` and
/// `RECITUBE__*` environment variables.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// let response = recitube::extract_recipes("dQw4w9WgXcQ").await?;
/// for recipe in response.recipes {
///     println!("{}: {}", recipe.name, recipe.ingredients.join(", "));
/// }
/// # Ok(())
/// # }
/// ```
pub async fn extract_recipes(
    video_id: &str,
) -> Result<RecipesResponse, Box<dyn Error + Send + Sync>> {
    let config = AppConfig::load().map_err(SetupError::from)?;
    let extractor = RecipeExtractor::builder().config(config).build()?;
    Ok(extractor.extract(video_id).await?)
}
