//! Opening explorer CLI.
//!
//! `explorer build` turns a classified game corpus and a transition graph into
//! index artifacts under the data directory. Every other subcommand answers
//! one query against those artifacts and prints the result as JSON on stdout.
//! Logs go to stderr, or to daily files under `EXPLORER_LOG_DIR` when set.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use opening_index::{
    build_indexes, BuildConfig, Explorer, ExplorerService, FsBlobStore, ResolveRequest, SortBy,
    SortOrder, TransitionGraph,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "explorer", about = "Chess opening position index and query engine")]
struct Cli {
    /// Artifact directory. Defaults to `EXPLORER_DATA_DIR` or `./data`.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build index artifacts from a JSONL corpus and a transition graph.
    Build {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long)]
        transitions: PathBuf,
        /// Games per chunk. Defaults to `EXPLORER_CHUNK_SIZE` or 4000.
        #[arg(long)]
        chunk_size: Option<u64>,
    },
    /// Openings, continuations and players at a position.
    Resolve {
        fen: String,
        /// Position tried when nothing is found at `fen`.
        #[arg(long)]
        fallback: Option<String>,
        #[command(flatten)]
        paging: Paging,
        #[arg(long, default_value = "gameCount")]
        sort_by: SortBy,
        #[arg(long, default_value = "desc")]
        sort_order: SortOrder,
    },
    /// Games at exactly this position, strongest first.
    Games {
        fen: String,
        #[command(flatten)]
        paging: Paging,
    },
    /// Openings grouped by ECO volume and code.
    Eco,
    /// Players of the named openings.
    Players {
        #[arg(required = true)]
        names: Vec<String>,
        #[command(flatten)]
        paging: Paging,
        #[arg(long, default_value = "gameCount")]
        sort_by: SortBy,
        #[arg(long, default_value = "desc")]
        sort_order: SortOrder,
    },
    /// Games of one player in the named openings, by opponent.
    PlayerGames {
        player: String,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Move text and metadata of one game.
    Moves { game_id: u64 },
}

#[derive(clap::Args)]
struct Paging {
    #[arg(long, default_value_t = 0)]
    page: usize,
    /// Defaults to `EXPLORER_PAGE_SIZE` or 50.
    #[arg(long)]
    page_size: Option<usize>,
}

impl Paging {
    fn page_size(&self) -> usize {
        self.page_size.unwrap_or_else(config::get_page_size)
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<serde_json::Value> {
    serde_json::to_value(value).context("failed to serialize result")
}

async fn build(
    data_dir: &Path,
    corpus: &Path,
    transitions: &Path,
    chunk_size: u64,
) -> anyhow::Result<serde_json::Value> {
    let graph = tokio::fs::read(transitions)
        .await
        .with_context(|| format!("failed to read {}", transitions.display()))?;
    let graph: TransitionGraph = serde_json::from_slice(&graph)
        .with_context(|| format!("failed to parse {}", transitions.display()))?;

    // Blocking line reads. A build is the only task on the runtime.
    let corpus = BufReader::new(
        File::open(corpus).with_context(|| format!("failed to open {}", corpus.display()))?,
    );

    let store = FsBlobStore::new(data_dir.to_path_buf());
    let report = build_indexes(&store, corpus, &graph, &BuildConfig { chunk_size }).await?;
    to_json(&report)
}

async fn run(cli: Cli) -> anyhow::Result<serde_json::Value> {
    let data_dir = cli.data_dir.unwrap_or_else(config::get_data_dir);
    tracing::debug!("Using data directory: {}", data_dir.display());

    let service = || {
        let store = Arc::new(FsBlobStore::new(data_dir.clone()));
        ExplorerService::new(Arc::new(Explorer::new(store)))
    };

    match cli.command {
        Command::Build {
            corpus,
            transitions,
            chunk_size,
        } => {
            let chunk_size = chunk_size.unwrap_or_else(config::get_chunk_size);
            build(&data_dir, &corpus, &transitions, chunk_size).await
        }
        Command::Resolve {
            fen,
            fallback,
            paging,
            sort_by,
            sort_order,
        } => {
            let request = ResolveRequest {
                fen,
                fallback_fen: fallback,
                page: paging.page,
                page_size: paging.page_size(),
                sort_by,
                sort_order,
            };
            to_json(&service().resolve_position(&request).await?)
        }
        Command::Games { fen, paging } => to_json(
            &service()
                .list_games_at_position(&fen, paging.page, paging.page_size())
                .await?,
        ),
        Command::Eco => to_json(&service().list_openings_by_eco_category().await?),
        Command::Players {
            names,
            paging,
            sort_by,
            sort_order,
        } => to_json(
            &service()
                .list_players_for_openings(
                    &names,
                    paging.page,
                    paging.page_size(),
                    sort_by,
                    sort_order,
                )
                .await?,
        ),
        Command::PlayerGames { player, names } => to_json(
            &service()
                .list_games_for_player_and_openings(&player, &names)
                .await?,
        ),
        Command::Moves { game_id } => to_json(&service().get_game_moves(game_id).await?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Held until exit so buffered file logs are flushed.
    let _guard = match config::get_log_dir() {
        Some(log_dir) => {
            std::fs::create_dir_all(&log_dir).ok();
            let file_appender = tracing_appender::rolling::daily(log_dir, "explorer");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
            None
        }
    };

    let output = run(Cli::parse()).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
    const AFTER_E4_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2";
    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("explorer").chain(args.iter().copied())).unwrap()
    }

    fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let corpus = dir.join("corpus.jsonl");
        let mut file = File::create(&corpus).unwrap();
        for (white, black, fen, name, eco) in [
            ("Carlsen, Magnus", "Caruana, Fabiano", AFTER_E4, "King's Pawn Game", "B00"),
            ("Ding, Liren", "Carlsen, Magnus", AFTER_E4_E5, "Open Game", "C20"),
        ] {
            let line = serde_json::json!({
                "white": white,
                "black": black,
                "result": "1-0",
                "moves": "1. e4",
                "classification": {"name": name, "eco": eco, "fen": fen},
            });
            writeln!(file, "{line}").unwrap();
        }

        let transitions = dir.join("transitions.json");
        let mut graph = TransitionGraph::new();
        graph.add_edge(START, AFTER_E4);
        graph.add_edge(AFTER_E4, AFTER_E4_E5);
        std::fs::write(&transitions, serde_json::to_vec(&graph).unwrap()).unwrap();
        (corpus, transitions)
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = parse(&["resolve", AFTER_E4, "--sort-by", "name", "--sort-order", "asc"]);
        assert!(matches!(
            cli.command,
            Command::Resolve {
                sort_by: SortBy::Name,
                sort_order: SortOrder::Asc,
                ..
            }
        ));

        let cli = parse(&["--data-dir", "/tmp/x", "players", "Open Game", "Sicilian Defense"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Command::Players { ref names, .. } if names.len() == 2));

        assert!(Cli::try_parse_from(["explorer", "players"]).is_err());
        assert!(Cli::try_parse_from(["explorer", "moves", "abc"]).is_err());
    }

    #[tokio::test]
    async fn test_build_then_query() {
        let tmp = tempfile::tempdir().unwrap();
        let (corpus, transitions) = write_inputs(tmp.path());
        let data = tmp.path().join("data");
        let data_arg = data.to_str().unwrap();

        let report = run(parse(&[
            "--data-dir",
            data_arg,
            "build",
            "--corpus",
            corpus.to_str().unwrap(),
            "--transitions",
            transitions.to_str().unwrap(),
        ]))
        .await
        .unwrap();
        assert_eq!(report["games"], 2);
        assert_eq!(report["openings"], 2);

        let resolved = run(parse(&["--data-dir", data_arg, "resolve", AFTER_E4]))
            .await
            .unwrap();
        assert_eq!(resolved["directGames"], 1);
        assert_eq!(resolved["hasDescendants"], true);

        let moves = run(parse(&["--data-dir", data_arg, "moves", "1"]))
            .await
            .unwrap();
        assert_eq!(moves["moves"], "1. e4 1-0");

        let missing = run(parse(&["--data-dir", data_arg, "moves", "7"])).await;
        assert!(missing.is_err());
    }
}
