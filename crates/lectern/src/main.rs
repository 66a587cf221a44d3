// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lectern - assigns report sections to LLM providers and drafts them.
//!
//! This is the binary entry point.

mod input;
mod models;
mod wiring;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lectern_config::LecternConfig;
use lectern_core::LecternError;
use lectern_orchestrator::{ResearchPipeline, TopicAnalyzer};
use lectern_router::{Coordinator, join_messages};
use serde::Serialize;
use tracing::error;

/// Lectern - content-aware section assignment across LLM providers.
#[derive(Parser, Debug)]
#[command(name = "lectern", version, about, long_about = None)]
struct Cli {
    /// Extra configuration file, merged after the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Score content and print the section assignment plan as JSON.
    Analyze {
        /// Input file; reads stdin when omitted.
        file: Option<PathBuf>,
        /// Treat the input as plain text instead of a JSON message array.
        #[arg(long)]
        text: bool,
    },
    /// Pick the roster model best suited to lead a topic.
    Topic { topic: String },
    /// Plan, draft and archive a report.
    Research {
        file: PathBuf,
        #[arg(long)]
        topic: String,
        #[arg(long)]
        text: bool,
        /// Skip archiving drafts in the vector store.
        #[arg(long)]
        no_archive: bool,
    },
    /// Search archived sections by similarity.
    Search {
        query: String,
        #[arg(short, default_value_t = 5)]
        k: usize,
        /// Minimum similarity; defaults to `vector_store.similarity_threshold`.
        #[arg(long)]
        threshold: Option<f64>,
        /// Only return sections of this type.
        #[arg(long)]
        section: Option<String>,
    },
    /// List the model roster.
    Models {
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Validate the configuration and print the effective TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match lectern_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            lectern_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    let Some(command) = cli.command else {
        println!("lectern: use --help for available commands");
        return;
    };

    if let Err(e) = run(command, &config).await {
        error!(error = %e, "command failed");
        eprintln!("lectern: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &LecternConfig) -> Result<(), LecternError> {
    match command {
        Commands::Analyze { file, text } => {
            let messages = input::read_messages(file.as_deref(), text)?;
            let coordinator = Coordinator::from_config(config)?;
            let plan = match wiring::build_semantic_profiler(config)? {
                Some(profiler) => {
                    let semantic = profiler.profile(&join_messages(&messages)).await?;
                    coordinator.analyze_content_with(&messages, &semantic)?
                }
                None => coordinator.analyze_content(&messages)?,
            };
            print_json(&plan)
        }
        Commands::Topic { topic } => {
            let pool = wiring::build_pool(config)?;
            let roster = config.models.iter().map(|m| m.id.clone()).collect();
            let analysis = TopicAnalyzer::new(pool, config.topic.clone(), roster)
                .analyze(&topic)
                .await?;
            print_json(&analysis)
        }
        Commands::Research {
            file,
            topic,
            text,
            no_archive,
        } => {
            let messages = input::read_messages(Some(file.as_path()), text)?;
            let mut pipeline = ResearchPipeline::new(config, wiring::build_pool(config)?)?;
            if !no_archive {
                pipeline = pipeline.with_archive(wiring::build_archive(config).await?);
            }
            if let Some(profiler) = wiring::build_semantic_profiler(config)? {
                pipeline = pipeline.with_semantic_profiler(profiler);
            }
            let outcome = pipeline.run(&topic, &messages).await?;
            print_json(&outcome)
        }
        Commands::Search {
            query,
            k,
            threshold,
            section,
        } => {
            let archive = wiring::build_archive(config).await?;
            let threshold = threshold.unwrap_or(config.vector_store.similarity_threshold);
            let hits = archive
                .similarity_search(&query, k, threshold, section.as_deref())
                .await?;
            print_json(&hits)
        }
        Commands::Models { plain } => {
            models::print_roster(config, plain);
            Ok(())
        }
        Commands::Config => {
            let rendered = toml::to_string_pretty(&models::redacted(config))
                .map_err(|e| LecternError::Internal(format!("failed to render config: {e}")))?;
            print!("{rendered}");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), LecternError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `RUST_LOG` wins; otherwise `lectern*` targets log at `level`, everything else at warn.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lectern={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
