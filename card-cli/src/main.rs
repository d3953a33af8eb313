//! # Cardsmith
//!
//! Command-line entry point.

use std::path::Path;

use card_cli::commands::{self, PrefsUpdate};
use card_cli::{CliArgs, Command};
use card_core::Preferences;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,card_core=debug,card_renderer=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,card_core=debug,card_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Write `contents` to `output`, or stdout when there is none.
fn write_output(output: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{contents}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = args.editor_config()?;

    match &args.command {
        Command::Render {
            input,
            out_dir,
            scale,
        } => {
            let summary = commands::render(input, out_dir, *scale, &config).await?;
            if !summary.skipped.is_empty() {
                tracing::warn!(
                    "Skipped cards: {:?}",
                    summary.skipped.iter().map(|i| i + 1).collect::<Vec<_>>()
                );
            }
        }
        Command::Normalize { input, output } => {
            let xml = commands::normalize(input, &config).await?;
            write_output(output.as_deref(), &xml)?;
        }
        Command::Replay {
            input,
            events,
            card,
            output,
        } => {
            let preferences = Preferences::load(&args.prefs)?;
            let xml = commands::replay(input, events, *card, &config, &preferences).await?;
            write_output(output.as_deref(), &xml)?;
        }
        Command::Prefs {
            grid,
            frames,
            aspect_lock,
        } => {
            let update = PrefsUpdate {
                grid: *grid,
                frames: *frames,
                aspect_lock: *aspect_lock,
            };
            let preferences = commands::prefs(&args.prefs, update)?;
            println!("{}", serde_json::to_string_pretty(&preferences)?);
        }
    }

    Ok(())
}
