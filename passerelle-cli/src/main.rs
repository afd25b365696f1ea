use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use passerelle_core::config::{Config, DEFAULT_CONFIG_PATH};
use passerelle_core::provider::create_provider;
use passerelle_core::rag::{load_embeddings_from_documents, Embedder};
use passerelle_core::writer::{load_examples, Headline, HeadlineGenerator, TransitionGenerator};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "passerelle")]
#[command(about = "Transitions, titles and context retrieval for French news digests", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Write a transition between two paragraphs")]
    Transition {
        #[arg(help = "Paragraph before the transition")]
        para_a: String,

        #[arg(help = "Paragraph after the transition")]
        para_b: String,

        #[arg(short, long, help = "JSON file of {\"input\", \"transition\"} examples")]
        examples: PathBuf,

        #[arg(long, help = "Folder of documents to retrieve context from")]
        context_dir: Option<PathBuf>,

        #[arg(short, help = "Documents to retrieve (defaults to rag.top_k)")]
        k: Option<usize>,
    },

    #[command(about = "Write a title and blurb for a paragraph")]
    Headline {
        paragraph: String,

        #[arg(long, help = "Split the reply into title and blurb")]
        parse: bool,
    },

    #[command(about = "Print the documents closest to a query")]
    Retrieve {
        #[arg(help = "Folder of documents to index")]
        dir: PathBuf,

        query: String,

        #[arg(short, help = "Documents to retrieve (defaults to rag.top_k)")]
        k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Show => show_config(&config),
        Commands::Transition {
            para_a,
            para_b,
            examples,
            context_dir,
            k,
        } => transition(&config, &para_a, &para_b, &examples, context_dir.as_deref(), k).await,
        Commands::Headline { paragraph, parse } => headline(&config, &paragraph, parse).await,
        Commands::Retrieve { dir, query, k } => retrieve(&config, &dir, &query, k).await,
    }
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
    } else {
        debug!(path = %path.display(), "Config file not found, using defaults");
        Ok(Config::default())
    }
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", "Current Configuration:".bold().green());
    println!();
    println!("{}", "LLM:".bold());
    println!("  Backend:        {:?}", config.llm.backend);
    println!("  Base URL:       {}", config.llm.base_url);
    println!("  API key env:    {}", config.llm.api_key_env);
    println!();
    println!("{}", "Transition:".bold());
    println!("  Model:          {}", config.transition.model.cyan());
    println!("  Temperature:    {}", config.transition.temperature);
    println!("  Max tokens:     {}", config.transition.max_tokens);
    println!("  Few-shot:       {}", config.transition.few_shot);
    println!();
    println!("{}", "Headline:".bold());
    println!("  Model:          {}", config.headline.model.cyan());
    println!("  Temperature:    {}", config.headline.temperature);
    println!("  Max tokens:     {}", config.headline.max_tokens);
    println!();
    println!("{}", "RAG:".bold());
    println!("  Embedding Model: {}", config.rag.embedding_model.cyan());
    println!("  Top K:           {}", config.rag.top_k);

    Ok(())
}

async fn transition(
    config: &Config,
    para_a: &str,
    para_b: &str,
    examples_path: &Path,
    context_dir: Option<&Path>,
    k: Option<usize>,
) -> Result<()> {
    let provider = create_provider(&config.llm).context("Failed to create provider")?;
    let examples = load_examples(examples_path)?;

    let context = match context_dir {
        Some(dir) => {
            let embedder = Embedder::new(provider.clone(), config.rag.embedding_model.clone());
            let kb = load_embeddings_from_documents(dir, embedder)
                .await
                .context("Failed to index context documents")?;
            let query = format!("{}\n{}", para_a, para_b);
            Some(
                kb.retrieve_context(&query, neighbor_count(k, config.rag.top_k, kb.len()))
                    .await?,
            )
        }
        None => None,
    };

    let generator = TransitionGenerator::from_config(provider, config.transition.clone());
    let transition = generator
        .generate(para_a, para_b, &examples, context.as_deref())
        .await
        .context("Failed to generate transition")?;

    println!("{}", transition);
    Ok(())
}

async fn headline(config: &Config, paragraph: &str, parse: bool) -> Result<()> {
    let provider = create_provider(&config.llm).context("Failed to create provider")?;
    let generator = HeadlineGenerator::from_config(provider, config.headline.clone());

    let raw = generator
        .generate(paragraph)
        .await
        .context("Failed to generate headline")?;

    if !parse {
        println!("{}", raw);
        return Ok(());
    }

    match Headline::parse(&raw) {
        Some(headline) => {
            println!("{} {}", "Titre:".bold(), headline.title);
            println!("{} {}", "Chapeau:".bold(), headline.blurb);
        }
        None => {
            eprintln!("{}", "Reply did not follow the Titre/Chapeau format:".yellow());
            println!("{}", raw);
        }
    }
    Ok(())
}

async fn retrieve(config: &Config, dir: &Path, query: &str, k: Option<usize>) -> Result<()> {
    let provider = create_provider(&config.llm).context("Failed to create provider")?;
    let embedder = Embedder::new(provider, config.rag.embedding_model.clone());

    let kb = load_embeddings_from_documents(dir, embedder)
        .await
        .context("Failed to index documents")?;
    eprintln!(
        "{} Indexed {} documents from {}",
        "✓".green().bold(),
        kb.len(),
        dir.display()
    );

    let context = kb
        .retrieve_context(query, neighbor_count(k, config.rag.top_k, kb.len()))
        .await?;
    println!("{}", context);
    Ok(())
}

/// An explicit `-k` is passed through untouched; the configured default is
/// capped at the number of indexed documents.
fn neighbor_count(requested: Option<usize>, default: usize, indexed: usize) -> usize {
    requested.unwrap_or_else(|| default.min(indexed))
}
