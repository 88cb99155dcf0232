use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use review_rag::{
    EmbeddingBackend, Mode, ReviewRagConfig, ReviewRagService, default_eval_set, run_evaluation,
};
use review_rag_web::{AppState, ServerConfig, run_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ask questions about a product, answered from its customer reviews.
#[derive(Parser, Debug)]
#[command(name = "review-rag", version, about, long_about = None)]
struct Cli {
    /// Embed with the offline hashing embedder instead of Ollama
    #[arg(long, global = true)]
    offline: bool,

    /// Bundled sample reviews used by `index --sample`, `eval` and the web form
    #[arg(long, global = true, default_value = "data/sample_reviews.json")]
    sample_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild the index from a review file or the bundled sample
    Index {
        /// CSV or JSON review file
        #[arg(long, conflicts_with = "sample")]
        file: Option<PathBuf>,

        /// Index the bundled sample reviews
        #[arg(long)]
        sample: bool,
    },
    /// Ask a question about the indexed reviews
    Ask {
        question: String,

        /// Answer mode: qa, faq, summarize
        #[arg(long, default_value = "qa")]
        mode: String,

        /// Only use reviews rated at least this (0 = no filter)
        #[arg(long)]
        min_rating: Option<f64>,
    },
    /// Print the number of indexed chunks
    Count,
    /// Discard the index
    Reset,
    /// List review files in the raw-data directory
    Files,
    /// Index the sample and score answers on the built-in question set
    Eval {
        /// Where to write the JSON report
        #[arg(long, default_value = "eval_results.json")]
        output: PathBuf,
    },
    /// Serve the browser form and JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ReviewRagConfig::from_env().context("invalid REVIEW_RAG_* configuration")?;
    if cli.offline {
        config.embedding_backend = EmbeddingBackend::Hashing;
    }
    let service = Arc::new(ReviewRagService::from_config(config).await?);

    match cli.command {
        Commands::Index { file, sample } => {
            let summary = match (file, sample) {
                (Some(path), _) => service.index_file(&path).await?,
                (None, true) => service.index_file(&cli.sample_path).await?,
                (None, false) => bail!("No file selected: pass --file PATH or --sample"),
            };
            println!("Indexed {} chunks from {} reviews.", summary.chunks, summary.reviews);
        }
        Commands::Ask { question, mode, min_rating } => {
            let mode: Mode = mode.parse()?;
            let min_rating = min_rating.filter(|rating| *rating > 0.0);
            let answer = service.ask(&question, mode, min_rating).await?;

            println!("{}\n", answer.answer);
            println!("Sources ({}):", answer.sources.len());
            for (i, source) in answer.sources.iter().enumerate() {
                let rating = source
                    .metadata
                    .rating
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "?".to_string());
                println!("\n[Review {} - rating {}/5]\n{}", i + 1, rating, source.text);
            }
        }
        Commands::Count => {
            println!("{}", service.count().await?);
        }
        Commands::Reset => {
            service.reset().await?;
            println!("Index cleared.");
        }
        Commands::Files => {
            for file in service.loader().list_files()? {
                println!("{file}");
            }
        }
        Commands::Eval { output } => {
            let summary = service.index_file(&cli.sample_path).await?;
            println!("Indexed {} chunks.\n", summary.chunks);

            let report = run_evaluation(&service, &default_eval_set()).await?;
            for result in &report.results {
                println!("Q: {}", result.question);
                println!("  Answer: {}", preview(&result.answer, 120));
                println!(
                    "  Keyword recall: {:.0}% ({})",
                    result.keyword_score * 100.0,
                    result.keyword_hits.join(", ")
                );
                println!("  Retrieved: {} chunks\n", result.retrieved_count);
            }
            println!("Average keyword recall: {:.0}%", report.average_keyword_recall * 100.0);

            let json = serde_json::to_string_pretty(&report)?;
            std::fs::write(&output, json)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(path = %output.display(), "evaluation report written");
            println!("Results saved to {}", output.display());
        }
        Commands::Serve { host, port } => {
            let mut server = ServerConfig::from_env();
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }
            run_server(server, AppState::new(service, cli.sample_path)).await?;
        }
    }

    Ok(())
}

/// The first `max` characters of `text`, with an ellipsis when cut.
fn preview(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() { format!("{head}...") } else { head }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ask_with_mode_and_rating() {
        let cli = Cli::try_parse_from([
            "review-rag",
            "--offline",
            "ask",
            "Is it loud?",
            "--mode",
            "faq",
            "--min-rating",
            "4",
        ])
        .unwrap();
        assert!(cli.offline);
        match cli.command {
            Commands::Ask { question, mode, min_rating } => {
                assert_eq!(question, "Is it loud?");
                assert_eq!(mode, "faq");
                assert_eq!(min_rating, Some(4.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn index_file_and_sample_conflict() {
        assert!(Cli::try_parse_from(["review-rag", "index", "--file", "a.csv", "--sample"]).is_err());
    }

    #[test]
    fn preview_cuts_on_characters() {
        assert_eq!(preview("héllo wörld", 5), "héllo...");
        assert_eq!(preview("short", 10), "short");
    }
}
