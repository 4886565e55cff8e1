use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

mod chunk;
mod collect;
mod config;
mod export;
mod gemini;
mod metrics;
mod prompt;
mod record;
mod riot_api;

use collect::{Collection, MatchSource, collect_games};
use riot_api::RiotClient;

#[derive(Parser, Debug)]
#[command(
    name = "lol-coach",
    about = "Fetch recent League matches, flatten per-game stats and generate coaching reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a Riot ID to its PUUID
    Puuid {
        #[arg(long = "game-name")]
        game_name: String,

        #[arg(long = "tag-line")]
        tag_line: String,
    },

    /// Export recent games as CSV, JSON and compact text files
    Export {
        #[arg(long = "game-name")]
        game_name: String,

        #[arg(long = "tag-line")]
        tag_line: String,

        /// How many recent matches to process
        #[arg(long, default_value_t = 20)]
        games: usize,

        #[arg(long = "out-dir", default_value = ".")]
        out_dir: PathBuf,
    },

    /// Generate a coaching report from recent games via Gemini
    Coach {
        #[arg(long = "game-name")]
        game_name: String,

        #[arg(long = "tag-line")]
        tag_line: String,

        /// How many recent matches to analyze
        #[arg(long, default_value_t = 100)]
        games: usize,

        /// Prompt template; the data marker is replaced with the game records
        #[arg(long, default_value = "prompt_lol.md")]
        prompt: PathBuf,

        /// Also write the full report to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Puuid {
            game_name,
            tag_line,
        } => {
            let client = build_client()?;
            let puuid = client.resolve_puuid(&game_name, &tag_line)?;
            println!("{}", puuid);
            Ok(())
        }
        Command::Export {
            game_name,
            tag_line,
            games,
            out_dir,
        } => run_export(&game_name, &tag_line, games, &out_dir),
        Command::Coach {
            game_name,
            tag_line,
            games,
            prompt,
            out,
        } => run_coach(&game_name, &tag_line, games, &prompt, out.as_deref()),
    }
}

fn build_client() -> Result<RiotClient> {
    let api_key = config::required_var("RIOT_API_KEY")?;
    let region = config::optional_var("REGION_ROUTING", "europe");
    let max_reqs = config::int_var("RIOT_MAX_REQS_PER_2MIN", 80)?;

    Ok(RiotClient::new_with_max(&api_key, &region, max_reqs)?)
}

/// Fatal only when the identity cannot be resolved or the match list
/// cannot be fetched at all; everything after that skips per match.
fn collect_for_player(game_name: &str, tag_line: &str, games: usize) -> Result<Collection> {
    let client = build_client()?;

    let puuid = client
        .resolve_puuid(game_name, tag_line)
        .with_context(|| format!("failed to resolve PUUID for {}#{}", game_name, tag_line))?;
    eprintln!("PUUID for {}#{}: {}", game_name, tag_line, puuid);

    let match_ids = client
        .list_match_ids(&puuid, games)
        .context("failed to fetch match list")?;
    eprintln!(
        "Found {} recent matches for {}#{}.",
        match_ids.len(),
        game_name,
        tag_line
    );

    let collection = collect_games(&client, &match_ids, &puuid);
    eprintln!(
        "Collected {} of {} matches.",
        collection.records.len(),
        collection.attempted
    );

    Ok(collection)
}

fn run_export(game_name: &str, tag_line: &str, games: usize, out_dir: &PathBuf) -> Result<()> {
    let collection = collect_for_player(game_name, tag_line, games)?;

    let label = format!("{}_{}", game_name, tag_line);
    export::export_tabular_files(&collection.records, out_dir, &label)?;
    export::export_toon_file(&collection.records, out_dir, &label)?;

    println!(
        "Export completed for {}#{}. ({} of {} games exported)",
        game_name,
        tag_line,
        collection.records.len(),
        collection.attempted
    );

    Ok(())
}

fn run_coach(
    game_name: &str,
    tag_line: &str,
    games: usize,
    prompt_path: &PathBuf,
    out: Option<&std::path::Path>,
) -> Result<()> {
    let template = prompt::read_prompt_template(prompt_path)?;

    let collection = collect_for_player(game_name, tag_line, games)?;
    if collection.records.is_empty() {
        bail!(
            "no games data found for {}#{} ({} matches attempted)",
            game_name,
            tag_line,
            collection.attempted
        );
    }

    let marker = config::optional_var("PROMPT_MARKER", prompt::DEFAULT_MARKER);
    let full_prompt = prompt::build_prompt(&collection.records, &template, &marker)?;

    let api_key = config::required_var("GEMINI_API_KEY")?;
    let model = config::optional_var("GEMINI_MODEL", "gemini-1.5-pro");
    let client = gemini::GeminiClient::new(api_key, model)?;

    eprintln!(
        "Requesting coaching report for {} games...",
        collection.records.len()
    );
    let report = client.generate(&full_prompt)?;

    if let Some(path) = out {
        fs::write(path, &report).with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Report written to {}", path.display());
    }

    let limit = config::int_var("MESSAGE_CHUNK_LIMIT", chunk::DEFAULT_CHUNK_LIMIT)?;
    let chunks = chunk::chunk_text(&report, limit);
    let total = chunks.len();

    for (index, part) in chunks.iter().enumerate() {
        if total > 1 {
            eprintln!("--- part {}/{} ---", index + 1, total);
        }
        println!("{}", part);
    }

    Ok(())
}
