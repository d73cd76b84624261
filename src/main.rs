use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubesum::cli::{Cli, Commands};
use tubesum::config::{Config, Credentials};
use tubesum::fetch::SourceRegistry;
use tubesum::frontend::{self, batch, interactive::InteractiveApp, Capability};
use tubesum::output;
use tubesum::pipeline::Pipeline;
use tubesum::utils;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only the pipeline run can take over the terminal
    let capability = match cli.command {
        None => frontend::probe(),
        Some(_) => Capability::BatchOnly,
    };

    // Logs go to stderr so batch stdout carries only results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter(capability).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Some(Commands::Config { show }) => {
            if show {
                config.display();
            } else {
                let path = match &cli.config {
                    Some(path) => path.clone(),
                    None => Config::config_path()?,
                };
                println!("Configuration file: {}", path.display());
                println!("Run with --show to print the current settings.");
            }
        }
        Some(Commands::Sources) => {
            println!("Supported sources:");
            for name in SourceRegistry::from_config(&config, false).list_sources() {
                println!("  • {}", name);
            }
            println!();
            println!("  yt-dlp covers YouTube (youtube.com, youtu.be) and X/Twitter status links.");
            println!("  Direct URL covers http(s) links ending in an audio/video extension.");
        }
        None => run(&cli, &config, capability).await?,
    }

    Ok(())
}

async fn run(cli: &Cli, config: &Config, capability: Capability) -> Result<()> {
    // The key is a hard prerequisite; fail before asking for anything
    let credentials = Credentials::from_env()?;

    let missing_deps = utils::check_dependencies(&config.fetch.yt_dlp_path).await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - local files and direct URLs still work)");
    }

    tracing::debug!(?capability, "Selected front-end");

    let pipeline = Pipeline::from_config(config, credentials, cli.show_progress(capability))?;

    match capability {
        Capability::InteractiveAvailable => {
            InteractiveApp::new(&pipeline, config.app.default_summary_length)
                .run()
                .await?;
        }
        Capability::BatchOnly => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let outcome = batch::run(&pipeline, &mut stdin.lock(), &mut stdout.lock()).await?;

            if let Some(path) = &cli.output {
                output::save_to_file(path, outcome.text()).context("Failed to save result")?;
                eprintln!("Saved to: {}", path.display());
            }
        }
    }

    Ok(())
}
