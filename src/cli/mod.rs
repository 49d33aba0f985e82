//! CLI entry point for localgen.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::CapabilityTag;

/// localgen CLI
#[derive(Parser, Debug)]
#[command(name = "localgen", version, about = "Stream text from a local Ollama server")]
pub struct Cli {
    /// Model service base URL (overrides env and config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List installed models and their capabilities
    Models(ModelsArgs),
    /// Print the preferred model for a capability
    Best(BestArgs),
    /// Stream a completion to stdout
    Generate(GenerateArgs),
    /// Compute an embedding vector
    Embed(EmbedArgs),
}

/// Arguments for `localgen models`.
#[derive(Parser, Debug)]
pub struct ModelsArgs {
    /// Only show models with this capability
    #[arg(short, long, value_parser = parse_capability)]
    pub capability: Option<CapabilityTag>,
}

/// Arguments for `localgen best`.
#[derive(Parser, Debug)]
pub struct BestArgs {
    /// embedding, vision, tools, thinking or chat
    #[arg(value_parser = parse_capability)]
    pub capability: CapabilityTag,
}

/// Arguments for `localgen generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Model to use (default: best installed chat or vision model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Image file to attach (repeatable)
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,

    /// User prompt
    pub prompt: String,
}

/// Arguments for `localgen embed`.
#[derive(Parser, Debug)]
pub struct EmbedArgs {
    /// Embedding model (default: best installed embedding model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Text to embed
    pub text: String,
}

fn parse_capability(raw: &str) -> Result<CapabilityTag, String> {
    CapabilityTag::parse(raw).map_err(|e| e.to_string())
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
