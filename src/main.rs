use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sketch_scribble::app::{App, Generate, SceneOutcome};
use sketch_scribble::credential::Credential;
use sketch_scribble::models::{render_script, Config};
use sketch_scribble::prompts;
use sketch_scribble::Error;
use std::io::Read;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "sketch-scribble")]
#[command(about = "Describe a scene, and let AI craft the conversation and visualize the setting")]
struct CliArgs {
    /// Google Gemini API key. Falls back to GEMINI_API_KEY.
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Scenario text. Read from stdin when neither this nor a file is given.
    #[arg(long, conflicts_with_all = ["scenario_file", "example"])]
    scenario: Option<String>,

    /// Read the scenario from a file.
    #[arg(long, value_name = "PATH", conflicts_with = "example")]
    scenario_file: Option<PathBuf>,

    /// Use the built-in Eldoria example scenario.
    #[arg(long)]
    example: bool,

    /// Save results as dialogue.json and narrative-scene.jpeg in this directory.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a dialogue script
    Dialogue,
    /// Generate a scene image
    Image,
    /// Generate both concurrently
    Scene,
}

impl From<&Command> for Generate {
    fn from(command: &Command) -> Self {
        match command {
            Command::Dialogue => Generate::Dialogue,
            Command::Image => Generate::Image,
            Command::Scene => Generate::Both,
        }
    }
}

fn read_scenario(args: &CliArgs) -> Result<String> {
    if args.example {
        return Ok(prompts::EXAMPLE_SCENARIO.trim().to_string());
    }
    if let Some(scenario) = &args.scenario {
        return Ok(scenario.clone());
    }
    if let Some(path) = &args.scenario_file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()));
    }
    let mut scenario = String::new();
    std::io::stdin()
        .read_to_string(&mut scenario)
        .context("Failed to read scenario from stdin")?;
    Ok(scenario)
}

fn hint_for(err: &Error) -> Option<&'static str> {
    err.needs_credential()
        .then_some("Pass --api-key or set GEMINI_API_KEY.")
}

fn report_error(err: &Error) {
    eprintln!("{}", err);
    if let Some(hint) = hint_for(err) {
        eprintln!("{}", hint);
    }
}

fn report(outcome: &SceneOutcome) {
    if let Some(result) = &outcome.dialogue {
        match result {
            Ok(lines) => println!("{}", render_script(lines)),
            Err(e) => report_error(e),
        }
    }
    if let Some(result) = &outcome.image {
        match result {
            // The data URI is only useful when the image was not saved.
            Ok(image) if !outcome.image_saved() => println!("{}", image.to_data_uri()),
            Ok(_) => {}
            Err(e) => report_error(e),
        }
    }
    for path in &outcome.saved {
        println!("Saved {}", path.display());
    }
    for e in &outcome.save_errors {
        eprintln!("Failed to save: {}", e);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketch_scribble=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env()?;
    if let Some(api_key) = &args.api_key {
        config.api_key = Some(Credential::new(api_key.as_str()));
    }

    let scenario = read_scenario(&args)?;
    let app = App::new(&config, args.output_dir.clone())?;

    info!("Starting sketch-scribble");
    let outcome = app.run(Generate::from(&args.command), &scenario).await;
    report(&outcome);

    if !outcome.is_success() {
        error!("Generation finished with errors");
        bail!("generation failed");
    }
    info!("Generation completed successfully");
    Ok(())
}
