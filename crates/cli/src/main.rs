use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use library::PromptLibrary;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod compose;

const STUDIO_DIR: &str = ".prompt-studio";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_LIBRARY_PATH: &str = "prompt_library.json";
const DEFAULT_DOCUMENTS_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(name = "prompt-studio")]
#[command(about = "Fill in prompt templates and compile them", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Prompt library file (overrides the config file)
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Document service base URL (overrides the config file)
    #[arg(long, global = true)]
    documents_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init,
    /// List prompt categories
    Categories,
    /// List prompts
    List {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Search titles, descriptions, categories and tags
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show a prompt and its fields
    Show {
        id: i64,

        #[arg(long)]
        json: bool,
    },
    /// Fill a prompt and print the compiled text
    Compose {
        id: i64,

        /// Field value, repeatable
        #[arg(long = "set", value_name = "ID=VALUE")]
        set: Vec<String>,

        /// Entry for a list field, repeatable
        #[arg(long = "item", value_name = "ID=VALUE")]
        item: Vec<String>,

        /// File for an upload field, repeatable
        #[arg(long = "attach", value_name = "ID=PATH")]
        attach: Vec<String>,

        /// Print even if required fields are missing
        #[arg(long)]
        force: bool,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StudioConfig {
    #[serde(default)]
    library: LibraryConfig,
    #[serde(default)]
    documents: DocumentsConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct LibraryConfig {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentsConfig {
    base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LIBRARY_PATH),
        }
    }
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DOCUMENTS_URL.to_string(),
            token: None,
        }
    }
}

impl StudioConfig {
    async fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(STUDIO_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config {}", config_path.display()))
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(path) = &cli.library {
            self.library.path = path.clone();
        }
        if let Some(url) = &cli.documents_url {
            self.documents.base_url = url.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cwd = std::env::current_dir()?;
    let mut config = StudioConfig::load(&cwd).await?;
    config.apply_overrides(&cli);

    match cli.command {
        Commands::Init => init_project(&cwd).await,
        Commands::Categories => {
            let library = PromptLibrary::read(&config.library.path).await;
            categories(&library);
            Ok(())
        }
        Commands::List { category } => {
            let library = PromptLibrary::read(&config.library.path).await;
            let prompts = match category.as_deref() {
                Some(category) => library.by_category(category),
                None => library.prompts().iter().collect(),
            };
            print_prompts(&prompts);
            Ok(())
        }
        Commands::Search { query } => {
            let library = PromptLibrary::read(&config.library.path).await;
            print_prompts(&library.search(&query.join(" ")));
            Ok(())
        }
        Commands::Show { id, json } => {
            let library = PromptLibrary::read(&config.library.path).await;
            let prompt = library.find(id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(prompt)?);
            } else {
                compose::show(prompt);
            }
            Ok(())
        }
        Commands::Compose {
            id,
            set,
            item,
            attach,
            force,
            json,
        } => {
            let library = PromptLibrary::read(&config.library.path).await;
            let prompt = library.find(id)?;
            let edits = compose::Edits::parse(&set, &item, &attach)?;
            compose::run(prompt, edits, &config.documents, force, json).await
        }
    }
}

async fn init_project(cwd: &Path) -> Result<()> {
    let studio_dir = cwd.join(STUDIO_DIR);
    let config_path = studio_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("Already initialized at {}", config_path.display());
        return Ok(());
    }

    tokio::fs::create_dir_all(&studio_dir).await?;
    let content = toml::to_string_pretty(&StudioConfig::default())?;
    tokio::fs::write(&config_path, content).await?;

    println!("Initialized Prompt Studio in {}", cwd.display());
    println!();
    println!("Created:");
    println!("  {}/", STUDIO_DIR);
    println!("  └── {}", CONFIG_FILE);
    println!();
    println!("Next steps:");
    println!("  1. Point [library] path at your prompt library");
    println!("  2. Run 'prompt-studio categories'");

    Ok(())
}

fn categories(library: &PromptLibrary) {
    let categories = library.categories();
    if categories.is_empty() {
        println!("No prompts in the library.");
        return;
    }

    for category in categories {
        println!(
            "  {:<16} {} ({})",
            category.id.dimmed(),
            category.label.bold(),
            category.count
        );
    }
}

fn print_prompts(prompts: &[&prompt_core::Prompt]) {
    if prompts.is_empty() {
        println!("No matching prompts.");
        return;
    }

    for prompt in prompts {
        let marker = if prompt.is_workflow { "⟳" } else { " " };
        println!(
            "  {:>4} {} {}  {}",
            prompt.id.to_string().cyan(),
            marker,
            prompt.title.bold(),
            prompt.category_label.dimmed()
        );
        if !prompt.description.is_empty() {
            println!("         {}", prompt.description);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prompt_studio=info,library=info,documents=info".into()),
        )
        .init();
}
