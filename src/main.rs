//! localgen CLI binary entry point.

use std::io::Write;

use localgen::cli::{BestArgs, Cli, Commands, EmbedArgs, GenerateArgs, ModelsArgs};
use localgen::config::LocalGenConfig;
use localgen::generation::StreamingGenerator;
use localgen::models::{CapabilityTag, ModelCapabilityClassifier};
use localgen::provider::{ModelService, OllamaService};
use localgen::types::{EmbeddingRequest, GenerationRequest, ImageInput};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "localgen=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = LocalGenConfig::load()?;
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }
    let service = std::sync::Arc::new(OllamaService::new(config)?);
    let classifier = ModelCapabilityClassifier::with_service(service.clone());

    match cli.command {
        Commands::Models(args) => handle_models(&classifier, args).await,
        Commands::Best(args) => handle_best(&classifier, args).await,
        Commands::Generate(args) => {
            let generator = StreamingGenerator::with_service(service);
            handle_generate(&classifier, &generator, args).await
        }
        Commands::Embed(args) => handle_embed(&classifier, service.as_ref(), args).await,
    }
}

async fn handle_models(
    classifier: &ModelCapabilityClassifier,
    args: ModelsArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for model in classifier.local_models(args.capability).await? {
        let tags: Vec<&str> = model.capabilities.iter().map(|t| t.as_str()).collect();
        println!("{}\t{}", model.name, tags.join(","));
    }
    Ok(())
}

async fn handle_best(
    classifier: &ModelCapabilityClassifier,
    args: BestArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("{}", classifier.best_model_for(args.capability).await);
    Ok(())
}

async fn handle_generate(
    classifier: &ModelCapabilityClassifier,
    generator: &StreamingGenerator,
    args: GenerateArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let images = args
        .images
        .iter()
        .map(ImageInput::from_path)
        .collect::<Result<Vec<_>, _>>()?;

    let model = match args.model {
        Some(model) => model,
        None if images.is_empty() => classifier.best_model_for(CapabilityTag::Chat).await,
        None => classifier.best_model_for(CapabilityTag::Vision).await,
    };

    let request = GenerationRequest::builder()
        .model(model)
        .prompt(args.prompt)
        .maybe_system(args.system)
        .build()
        .with_images(images);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    // Progress carries the whole text; print only what is new.
    let mut printed = 0usize;
    let mut stdout = std::io::stdout();
    let result = generator
        .run_cancellable(&request, &cancel, |partial| {
            let _ = stdout.write_all(partial[printed..].as_bytes());
            let _ = stdout.flush();
            printed = partial.len();
        })
        .await;

    println!(); // newline after streaming
    result?;
    Ok(())
}

async fn handle_embed(
    classifier: &ModelCapabilityClassifier,
    service: &OllamaService,
    args: EmbedArgs,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let model = match args.model {
        Some(model) => model,
        None => classifier.best_model_for(CapabilityTag::Embedding).await,
    };
    let response = service.embed(&EmbeddingRequest::new(model, args.text)).await?;
    println!("{}", format_embedding(&response.embedding));
    Ok(())
}

/// `N dimensions: [a, b, ...]` with at most eight leading values.
fn format_embedding(values: &[f32]) -> String {
    let preview: Vec<String> = values.iter().take(8).map(|v| format!("{v:.4}")).collect();
    format!(
        "{} dimensions: [{}{}]",
        values.len(),
        preview.join(", "),
        if values.len() > 8 { ", ..." } else { "" }
    )
}
