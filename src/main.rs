//! Mindful Crew - command-line client for the content-generation backend
//!
//! Checks the backend, shows the latest artifacts, streams a run to the
//! terminal and browses the post archive.

use anyhow::Result;
use clap::{Parser, Subcommand};
use mindful_crew::{
    execution::RunOutcome,
    types::{ActiveView, Category, CategoryFilter},
    ClientConfig, ViewCoordinator,
};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mindful-crew")]
#[command(author = "Mindful Crew Team")]
#[command(version)]
#[command(about = "Client for streamed content generation runs and the post archive")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MINDFUL_CREW_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the configuration file)
    #[arg(long, env = "MINDFUL_CREW_BASE_URL")]
    base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the backend
    Health,

    /// Show the latest generated content
    Latest {
        /// Only this category (blog, linkedin)
        #[arg(long)]
        category: Option<Category>,
    },

    /// Run a generation job and stream its output
    Run {
        /// Topic to generate for (defaults to execution.default_topic)
        topic: Option<String>,
    },

    /// Browse the post archive
    Memory {
        #[command(subcommand)]
        command: MemoryCommands,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[derive(Subcommand)]
enum MemoryCommands {
    /// Most recent posts
    List {
        /// Only this category (blog, linkedin)
        #[arg(long)]
        filter: Option<Category>,
    },

    /// Full-text search across all categories
    Search {
        /// Search text
        query: String,
    },

    /// Show one post
    Show {
        /// Post id
        id: i64,

        /// Make it the current content of its category
        #[arg(long)]
        open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("mindful_crew={}", log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Load configuration
    let mut config = ClientConfig::resolve(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
        config.validate()?;
    }

    match cli.command {
        Commands::Health => check_health(config).await?,
        Commands::Latest { category } => show_latest(config, category).await?,
        Commands::Run { topic } => {
            let topic = topic.unwrap_or_else(|| config.execution.default_topic.clone());
            run_job(config, &topic).await?;
        }
        Commands::Memory { command } => browse_memory(config, command).await?,
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn check_health(config: ClientConfig) -> Result<()> {
    let view = ViewCoordinator::with_http(config);
    let base_url = view.config().backend.base_url.clone();
    if view.connect().await {
        println!("✓ Backend connected at {}", base_url);
        Ok(())
    } else {
        anyhow::bail!("Backend not reachable at {}", base_url)
    }
}

async fn show_latest(config: ClientConfig, only: Option<Category>) -> Result<()> {
    let view = ViewCoordinator::with_http(config);
    view.startup().await;

    let state = view.state().snapshot().await;
    let categories: Vec<Category> = match only {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };
    for category in categories {
        println!("== Latest {} ==", category.label());
        match state.snapshot(category) {
            Some(snapshot) => println!("{}", snapshot.content),
            None => println!("(nothing loaded)"),
        }
        println!();
    }
    Ok(())
}

async fn run_job(config: ClientConfig, topic: &str) -> Result<()> {
    let view = ViewCoordinator::with_http(config);
    view.connect().await;

    let mut changes = view.state().subscribe();
    let run = view.run(topic);
    tokio::pin!(run);

    let mut printed = 0;
    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            Ok(()) = changes.changed() => {
                printed = print_transcript_from(&view, printed).await?;
            }
        }
    };
    print_transcript_from(&view, printed).await?;

    match outcome {
        RunOutcome::Completed => {
            let state = view.state().snapshot().await;
            println!();
            for category in Category::ALL {
                let first_line = state
                    .snapshot(category)
                    .and_then(|s| s.content.lines().find(|l| !l.trim().is_empty()))
                    .unwrap_or("(nothing loaded)");
                println!("✓ Latest {}: {}", category.label(), first_line);
            }
            Ok(())
        }
        RunOutcome::Rejected => anyhow::bail!("A run is already in progress"),
        RunOutcome::Failed | RunOutcome::NotConnected => anyhow::bail!("Run did not complete"),
    }
}

/// Print transcript chunks not yet shown; returns the new count
async fn print_transcript_from(view: &ViewCoordinator, printed: usize) -> Result<usize> {
    let fresh: Vec<String> = view
        .state()
        .read(|s| {
            let chunks = s.execution().transcript().chunks();
            chunks.get(printed..).map(|c| c.to_vec()).unwrap_or_default()
        })
        .await;
    let mut stdout = std::io::stdout().lock();
    for chunk in &fresh {
        write!(stdout, "{}", chunk)?;
    }
    stdout.flush()?;
    Ok(printed + fresh.len())
}

async fn browse_memory(config: ClientConfig, command: MemoryCommands) -> Result<()> {
    let view = ViewCoordinator::with_http(config);
    if !view.connect().await {
        anyhow::bail!(
            "Backend not connected. Please ensure the backend server is running at {}.",
            view.config().backend.base_url
        );
    }

    match command {
        MemoryCommands::List { filter } => {
            if let Some(category) = filter {
                view.set_category_filter(CategoryFilter::Only(category)).await;
            }
            view.switch_view(ActiveView::Memory).await;
            print_memory_list(&view).await
        }
        MemoryCommands::Search { query } => {
            view.set_query_text(query).await;
            view.switch_view(ActiveView::Memory).await;
            print_memory_list(&view).await
        }
        MemoryCommands::Show { id, open } => {
            let detail = view.select_item(id).await?;
            println!("{}", detail.summary.headline());
            println!("{}", detail.summary.byline());
            println!();
            println!("{}", detail.content);
            if open {
                if let Some(category) = view.open_selection().await {
                    println!();
                    println!("✓ Now the current {}", category.label());
                }
            }
            Ok(())
        }
    }
}

async fn print_memory_list(view: &ViewCoordinator) -> Result<()> {
    let memory = view.state().read(|s| s.memory().clone()).await;
    if let Some(error) = memory.error() {
        anyhow::bail!("{}", error);
    }
    if memory.items().is_empty() {
        println!("No posts found.");
        return Ok(());
    }
    for item in memory.items() {
        println!("[{}] {}", item.id, item.headline());
        println!("     {}", item.byline());
    }
    Ok(())
}

fn show_config(config: Option<&ClientConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    println!("{}", config.to_toml()?);
    Ok(())
}
