use log::{error, info};
use recitube::{server, AppConfig, RecipeExtractor};
use std::env;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;

const USAGE: &str = "Usage: recitube [serve | extract <video-id> | extract-file <transcript-path>]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = AppConfig::load()?;

    match args.first().map(String::as_str) {
        None | Some("serve") => serve(config).await,
        Some("extract") => {
            let video_id = args.get(1).ok_or(USAGE)?;
            let extractor = RecipeExtractor::builder().config(config).build()?;
            let response = extractor.extract(video_id).await.map_err(|e| {
                error!("{}", e);
                e
            })?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Some("extract-file") => {
            let path = args.get(1).ok_or(USAGE)?;
            let transcript = std::fs::read_to_string(path)?;
            if transcript.trim().is_empty() {
                return Err(format!("Transcript file '{}' is empty", path).into());
            }
            let extractor = RecipeExtractor::builder().config(config).build()?;
            let response = extractor.extract_from_transcript(&transcript).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Some(_) => Err(USAGE.into()),
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn Error>> {
    let cors_permissive = config.server.cors_permissive;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let extractor = RecipeExtractor::builder().config(config).build()?;
    info!(
        "Extractor ready (retry budget: {})",
        extractor.retry_policy().retry_attempts
    );

    let listener = TcpListener::bind(&addr).await?;
    server::serve(listener, server::create_router(Arc::new(extractor), cors_permissive)).await?;
    Ok(())
}
