use clap::Parser;
use roi_narrative_service::{
    calculator::compute_financials,
    config::AppConfig,
    llm::OpenAiClient,
    models::RequestInput,
    narrative::NarrativeService,
};
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Compute an illustrative ROI projection for a request file
#[derive(Parser, Debug)]
#[command(name = "roi", version, about)]
struct Args {
    /// Request JSON file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Print the generation prompt instead of the projection
    #[arg(long, conflicts_with = "narrate")]
    prompt: bool,

    /// Also call the configured model and print the narratives
    #[arg(long)]
    narrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let input = RequestInput::from_json_str(&raw)?;
    let financials = compute_financials(&input);

    info!(customer = %input.customer_name, "Projection computed");

    if args.prompt {
        let request = NarrativeService::build_request(&input, &financials);
        println!("=== SYSTEM ===\n{}\n", request.instructions);
        println!("=== DATA ===\n{}", request.input);
        return Ok(());
    }

    if !args.narrate {
        println!("{}", serde_json::to_string_pretty(&financials)?);
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    let service = NarrativeService::new(Arc::new(OpenAiClient::new(&config)?));
    let output = service.build_and_normalize(&input, &financials).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "model": service.model(),
            "financials": financials,
            "output": output,
        }))?
    );

    Ok(())
}
