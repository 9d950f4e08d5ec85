use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use docrag_core::config::{load_dotenv, Config, Settings};
use docrag_core::types::DocId;
use docrag_rag::DocQa;
use docrag_vector::IndexStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ask questions about your documents", long_about = None)]
struct Cli {
    /// Extra TOML config file, applied after config.toml and before APP_* variables.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index a PDF or text file and print its document id.
    Ingest { path: PathBuf },
    /// Answer a question from one ingested document.
    Query {
        doc_id: String,
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Show the excerpts a question would be answered from, without generation.
    Retrieve {
        doc_id: String,
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// List ingested documents.
    List,
}

fn main() -> ExitCode {
    let dotenv = load_dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match dotenv {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "environment read from .env"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env file"),
    }
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let not_found = err
                .downcast_ref::<docrag_core::Error>()
                .is_some_and(docrag_core::Error::is_not_found);
            if not_found { ExitCode::from(2) } else { ExitCode::FAILURE }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Config::load_with(cli.config.as_deref())?.settings()?;
    tracing::debug!(index_root = %settings.storage.index_root, embedding = ?settings.embedding.backend, "configuration loaded");
    match cli.command {
        Command::Ingest { path } => {
            let qa = DocQa::from_settings(settings)?;
            let spinner = spinner(format!("ingesting {}", path.display()))?;
            let report = qa.ingest(&path);
            spinner.finish_and_clear();
            print_json(&report?)
        }
        Command::Query { doc_id, question, top_k } => {
            let doc_id = DocId::parse(&doc_id)?;
            let top_k = top_k.unwrap_or(settings.retrieval.top_k);
            let qa = DocQa::from_settings(settings)?;
            print_json(&qa.answer_with(&doc_id, &question.join(" "), top_k)?)
        }
        Command::Retrieve { doc_id, question, top_k } => {
            let doc_id = DocId::parse(&doc_id)?;
            let top_k = top_k.unwrap_or(settings.retrieval.top_k);
            let qa = DocQa::from_settings(settings)?;
            print_json(&qa.retrieve(&doc_id, &question.join(" "), top_k)?)
        }
        Command::List => list(&settings),
    }
}

fn list(settings: &Settings) -> Result<()> {
    let root = settings.storage.index_root_path();
    let store = IndexStore::open(&root).with_context(|| format!("opening index root {}", root.display()))?;
    print_json(&store.list()?)
}

fn spinner(message: String) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
