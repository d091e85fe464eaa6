//! Postcraft Server
//!
//! Axum server exposing the post generation stream, plus a one-shot
//! `generate` command that prints the same events as JSON lines.

mod api;
mod config;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use postcraft_core::pipeline::{EventKind, LengthCategory};
use postcraft_core::{spawn_generation, GenerationRequest, StageContext};
use tokio::net::TcpListener;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::api::AppState;
use crate::config::{PersistedConfig, CONFIG_PATH};

#[derive(Parser)]
#[command(author, version, about = "Generate LinkedIn posts with streamed progress")]
struct Args {
    /// Config file to layer under environment and flags
    #[arg(long, global = true, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Completion backend (anthropic, openai, gemini, openrouter, grok, deepseek, mock)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model name; defaults to the provider's default
    #[arg(long, global = true)]
    model: Option<String>,

    /// Preferred SearXNG instance
    #[arg(long, global = true)]
    searxng_url: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Start the HTTP server (default)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
    /// Run one generation and print its events as JSON lines
    Generate(GenerateArgs),
}

#[derive(ClapArgs)]
struct GenerateArgs {
    #[arg(long)]
    topic: String,
    #[arg(long)]
    tone: Option<String>,
    /// Comma-separated audience list
    #[arg(long, value_delimiter = ',')]
    audience: Vec<String>,
    /// short, medium, long or any
    #[arg(long, default_value = "medium", value_parser = parse_length)]
    length: LengthCategory,
    /// "suggest" to generate hashtags, anything else to skip them
    #[arg(long, default_value = "suggest")]
    hashtags: String,
    /// Fixed call-to-action instead of a generated one
    #[arg(long)]
    cta: Option<String>,
    /// Example post whose style should be mimicked
    #[arg(long)]
    mimic: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long, default_value_t = 3)]
    post_count: u32,
    #[arg(long, default_value_t = 1)]
    emoji_level: u8,
    #[arg(long)]
    github_url: Option<String>,
}

impl GenerateArgs {
    fn into_request(self) -> GenerationRequest {
        let mut request = GenerationRequest::new(self.topic);
        request.tone = self.tone;
        request.audience = (!self.audience.is_empty()).then_some(self.audience);
        request.length = self.length;
        request.hashtags_option = self.hashtags;
        request.cta_text = self.cta;
        request.mimic_examples = self.mimic;
        request.language = self.language;
        request.post_count = self.post_count;
        request.emoji_level = self.emoji_level;
        request.github_project_url = self.github_url;
        request
    }
}

fn parse_length(value: &str) -> Result<LengthCategory, String> {
    match value.trim().to_lowercase().as_str() {
        "short" => Ok(LengthCategory::Short),
        "medium" => Ok(LengthCategory::Medium),
        "long" => Ok(LengthCategory::Long),
        "any" => Ok(LengthCategory::Any),
        other => Err(format!("unknown length '{}'", other)),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the JSON lines of `generate`
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(env_filter),
        )
        .init();
}

/// File, then environment, then flags.
async fn load_context(args: &Args) -> anyhow::Result<StageContext> {
    let mut layered = PersistedConfig::load(&args.config).await;
    layered.merge(PersistedConfig::from_env());
    layered.merge(PersistedConfig {
        provider: args.provider.clone(),
        model: args.model.clone(),
        searxng_url: args.searxng_url.clone(),
        ..PersistedConfig::default()
    });

    let config = layered.resolve().context("Invalid configuration")?;
    tracing::info!(
        provider = %config.model.provider,
        model = config.model.model_name(),
        "Configuration resolved"
    );
    config
        .build_context()
        .context("Failed to initialise completion backend")
}

async fn serve(ctx: StageContext, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;
    let app = api::router(AppState::new(ctx));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "Postcraft server listening");
    println!("🚀 Postcraft Server running at http://{}", addr);
    println!("   Stream:    POST /api/generate-posts-stream");
    println!("   Health:    GET  /health");
    println!("   Providers: GET  /api/providers");
    println!("   OpenAPI:   GET  /api/openapi.json");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn generate(ctx: StageContext, args: GenerateArgs) -> anyhow::Result<()> {
    let request = args.into_request();
    request.validate().context("Invalid generation request")?;

    let mut events = spawn_generation(ctx, request);
    let mut failed = false;
    while let Some(event) = events.recv().await {
        failed = event.kind == EventKind::Error;
        println!("{}", serde_json::to_string(&event)?);
    }
    if failed {
        anyhow::bail!("Generation failed");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    dotenvy::from_path(".postcraft/.env").ok();
    init_tracing();

    let mut args = Args::parse();
    let ctx = load_context(&args).await?;

    match args.command.take() {
        Some(CliCommand::Generate(generate_args)) => generate(ctx, generate_args).await,
        Some(CliCommand::Serve { host, port }) => serve(ctx, &host, port).await,
        None => serve(ctx, "0.0.0.0", 8000).await,
    }
}
