//! Capsub - CapCut caption extraction
//!
//! Entry point for the `capsub` binary: pulls the captions out of CapCut
//! projects, censors them, optionally translates them and writes SRT files.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use capsub::censor::CensorResult;
use capsub::cli::{Args, Commands, KeyAction, SessionAction};
use capsub::config::Config;
use capsub::error::CapsubError;
use capsub::storage::Session;
use capsub::subtitle::{ExportOutcome, format_srt_time};
use capsub::translate::{LanguageModelFactory, TranslationStatus};
use capsub::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;

    // Setup logging to both console and file
    setup_logging(args.verbose, &config.storage.resolve_dir().join("log"))?;

    let workflow = Workflow::new(config.clone())?;

    match args.command {
        Commands::Scan { dir } => {
            let projects = workflow.scan_projects(&dir)?;

            println!("\nCapCut Projects in {}:", dir.display());
            println!("{:<40} {:<20} {:<60}", "Name", "Modified", "Project File");
            println!("{}", "-".repeat(120));

            for project in &projects {
                let modified = project
                    .modified
                    .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!("{:<40} {:<20} {:<60}", project.name, modified, project.source_file.display());
            }
        }
        Commands::Extract { input, output_dir, name, no_censor } => {
            let session = workflow.open_project(&input, name.as_deref()).await?;
            export_session(&workflow, &session, !no_censor, output_dir.as_deref(), None).await?;
        }
        Commands::Translate { input, target_lang, output_dir, name, no_censor, api_key } => {
            let mut session = match input {
                Some(input) => workflow.open_project(&input, None).await?,
                None => load_session(&workflow)?,
            };

            let api_key = workflow.resolve_api_key(api_key);
            let model = LanguageModelFactory::create(&config.translate, api_key)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            spinner.set_message(format!("Translating {} subtitles to {}...", session.subtitles.len(), target_lang));
            spinner.enable_steady_tick(Duration::from_millis(120));

            let result = workflow.translate(&mut session, model.as_ref(), &target_lang).await;
            spinner.finish_and_clear();

            match result? {
                TranslationStatus::Padded { failed } => {
                    println!("Warning: {} subtitles could not be translated and are marked as failed", failed);
                }
                status => info!("Translation status: {:?}", status),
            }

            export_session(&workflow, &session, !no_censor, output_dir.as_deref(), name.as_deref()).await?;
        }
        Commands::Export { output_dir, name, no_censor } => {
            let session = load_session(&workflow)?;
            export_session(&workflow, &session, !no_censor, output_dir.as_deref(), name.as_deref()).await?;
        }
        Commands::Session { action } => match action {
            SessionAction::Show { no_censor } => match workflow.resume_session() {
                Some(session) => {
                    let view = workflow.censored_view(&session, !no_censor);
                    println!("\nSession '{}' ({} subtitles):", session.file_name, view.subtitles.len());
                    for entry in &view.subtitles {
                        let text: String = entry
                            .text_parts
                            .iter()
                            .map(|p| if p.is_highlighted { format!("[{}]", p.text) } else { p.text.clone() })
                            .collect();
                        println!(
                            "{:>4}  {} --> {}  {}",
                            entry.id,
                            format_srt_time(entry.start),
                            format_srt_time(entry.end),
                            text
                        );
                    }
                    print_replaced_words(&view);
                }
                None => println!("No saved session."),
            },
            SessionAction::Clear => {
                if workflow.store().clear_session()? {
                    println!("Saved session cleared");
                } else {
                    println!("No saved session.");
                }
            }
        },
        Commands::Key { action } => match action {
            KeyAction::Set { key } => {
                let model = LanguageModelFactory::create(&config.translate, Some(key.clone()))?;
                workflow.store_api_key(model.as_ref(), &key).await?;
                println!("API key validated and stored");
            }
            KeyAction::Check => {
                let api_key = workflow.resolve_api_key(None);
                let model = LanguageModelFactory::create(&config.translate, api_key)?;
                model.check_credential().await?;
                println!("API key is valid for {}", model.name());
            }
            KeyAction::Clear => {
                if workflow.store().clear_credential()? {
                    println!("API key removed");
                } else {
                    println!("No API key stored.");
                }
            }
        },
        Commands::InitConfig { output } => {
            if output.exists() {
                return Err(CapsubError::Config(format!("{} already exists", output.display())).into());
            }
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

fn load_session(workflow: &Workflow) -> Result<Session> {
    workflow
        .resume_session()
        .ok_or_else(|| anyhow::anyhow!("No saved session. Run `capsub extract --input <PROJECT>` first"))
}

async fn export_session(
    workflow: &Workflow,
    session: &Session,
    censor_enabled: bool,
    output_dir: Option<&Path>,
    name: Option<&str>,
) -> Result<()> {
    let (outcome, view) = workflow.export(session, censor_enabled, output_dir, name).await?;

    match outcome {
        ExportOutcome::Written(path) => {
            println!("Exported {} subtitles to {}", view.subtitles.len(), path.display());
            if censor_enabled {
                print_replaced_words(&view);
            }
        }
        ExportOutcome::Empty => println!("No subtitles to export."),
    }
    Ok(())
}

fn print_replaced_words(view: &CensorResult) {
    if view.replaced_words.is_empty() {
        return;
    }

    println!("\nCensored words ({} replacements):", view.total_replacements());
    for (word, count) in &view.replaced_words {
        println!("- {} ({} times)", word, count);
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool, log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(log_dir, "capsub.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so stdout stays for command results
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}", log_level, log_dir.join("capsub.log").display());

    Ok(())
}
