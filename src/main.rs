//! gitmit - CLI entry point.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use dialoguer::{Confirm, Input, Select};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use gitmit::analysis::{CommitContext, DiffAnalyzer};
use gitmit::config::{self, CONFIG_FILENAME};
use gitmit::error::ConfigError;
use gitmit::git::{
    LastCommitScope, collect_commit_stats, collect_staged_changes, commit_index, open_repository, repo_root,
};
use gitmit::history::{CommitHistory, HistoryStore};
use gitmit::insights::{CommitStats, TOP_LIMIT};
use gitmit::template::{
    Corpus, MessageFormatter, OsRandom, ScoreMode, Suggestion, SuggestionSelector, base_score, missing_value,
};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "GITMIT_LOG";

/// Commits newer than this count as recent activity in `analyze`.
const RECENT_DAYS: i64 = 7;

/// Candidate templates listed by `--debug`.
const DEBUG_TEMPLATES: usize = 10;

/// Suggest Conventional Commits messages for staged changes.
#[derive(Parser, Debug)]
#[command(name = "gitmit")]
#[command(about = "Suggest Conventional Commits messages for staged changes, offline")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    propose: ProposeArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sample .gitmit.json tailored to the detected project type
    Init {
        /// Write the global config instead of the repository one
        #[arg(long)]
        global: bool,
    },

    /// Summarize the commit history: type distribution, active files, contributors
    Analyze,
}

#[derive(Args, Debug)]
struct ProposeArgs {
    /// Print a ranked list of suggestions and exit
    #[arg(short = 's', long)]
    suggestions: bool,

    /// Pick the message from the ranked suggestions
    #[arg(short = 'i', long, conflicts_with = "suggestions")]
    interactive: bool,

    /// Number of suggestions shown with --suggestions or --interactive
    #[arg(long, default_value_t = 5)]
    max_suggestions: usize,

    /// Print the analysis of the staged changes
    #[arg(long)]
    context: bool,

    /// Print the best message without committing
    #[arg(long)]
    dry_run: bool,

    /// Commit the best message without prompting
    #[arg(long)]
    auto: bool,

    /// Template corpus to use instead of the built-in one
    #[arg(long, value_name = "PATH")]
    templates: Option<PathBuf>,

    /// Append " (major change)" to subjects of large changes
    #[arg(long)]
    mark_major: bool,

    /// Print the analysis, the resolved template group and its candidates
    #[arg(long)]
    debug: bool,

    /// Show debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.propose.verbose);

    match cli.command {
        Some(Command::Init { global }) => run_init(global),
        Some(Command::Analyze) => run_analyze(),
        None => run_propose(&cli.propose),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Write a sample configuration, asking before replacing an existing file.
fn run_init(global: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    let (path, project_root) = if global {
        let path = config::global_config_path().ok_or(ConfigError::NoHomeDirectory)?;
        (path, cwd)
    } else {
        let repo = open_repository(&cwd).context("Not a git repository. Run gitmit from within a git repository.")?;
        let root = repo_root(&repo)?;
        (root.join(CONFIG_FILENAME), root)
    };

    let project_type = config::detect_project_type(&project_root);
    println!("Detected project type: {}", project_type);

    if path.exists() {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", path.display()))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !overwrite {
            println!("Left {} unchanged.", path.display());
            return Ok(());
        }
    }

    config::write(&path, &config::sample(project_type)).context("Failed to write config")?;
    println!("✓ Wrote {}", path.display());
    Ok(())
}

/// Analyze the staged changes and propose, print or commit a message.
fn run_propose(args: &ProposeArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let repo = open_repository(&cwd).context("Not a git repository. Run gitmit from within a git repository.")?;
    let root = repo_root(&repo)?;

    let staged = collect_staged_changes(&repo).context("Failed to read staged changes")?;
    let config = config::load(Some(&root)).context("Failed to load configuration")?;
    let corpus = load_corpus(args.templates.as_deref())?;

    let history_path = CommitHistory::path_in(&root);
    let mut history = CommitHistory::load(&history_path).unwrap_or_else(|e| {
        warn!("Ignoring unreadable history: {e}");
        CommitHistory::default()
    });

    let recent = LastCommitScope::new(&repo);
    let ctx = DiffAnalyzer::new(&config)
        .with_recent_scope(&recent)
        .analyze(&staged.changes, staged.total_added, staged.total_removed)?;

    if args.context || args.debug {
        print_context(&ctx);
    }
    if args.debug {
        print_candidates(&corpus, &ctx)?;
    }

    let mut random = OsRandom;
    let formatter = MessageFormatter::new().with_major_suffix(args.mark_major);

    if args.suggestions {
        let selector = SuggestionSelector::new(&corpus, &history).with_formatter(formatter);
        let ranked = selector.ranked(&ctx, args.max_suggestions, &mut random)?;
        for (i, suggestion) in ranked.iter().enumerate() {
            println!("{}. {}", i + 1, suggestion.message);
        }
        return Ok(());
    }

    let best = if args.interactive {
        let selector = SuggestionSelector::new(&corpus, &history).with_formatter(formatter);
        pick_from_ranked(selector.ranked(&ctx, args.max_suggestions, &mut random)?)?
    } else {
        SuggestionSelector::new(&corpus, &history)
            .with_formatter(formatter)
            .best(&ctx, &mut random)?
    };

    if args.dry_run {
        println!("{}", best.message);
        return Ok(());
    }

    let accepted = if args.auto {
        Some((best.message, best.template))
    } else {
        let selector = SuggestionSelector::new(&corpus, &history).with_formatter(formatter);
        choose_interactively(&selector, &ctx, best, &mut random)?
    };

    let Some((message, template)) = accepted else {
        println!("Commit cancelled.");
        return Ok(());
    };

    let oid = commit_index(&repo, &message).context("Failed to create commit")?;
    println!("✓ Committed {}: {}", &oid.to_string()[..7], message);

    history.add(&message, &template);
    if let Err(e) = history.save(&history_path) {
        warn!("Failed to save history: {e}");
    }
    Ok(())
}

fn load_corpus(path: Option<&Path>) -> Result<Corpus> {
    match path {
        Some(path) => Corpus::from_path(path).with_context(|| format!("Invalid template corpus {}", path.display())),
        None => Corpus::embedded().context("Built-in template corpus is invalid"),
    }
}

/// Let the user choose one of the ranked suggestions.
fn pick_from_ranked(mut ranked: Vec<Suggestion>) -> Result<Suggestion> {
    if ranked.is_empty() {
        bail!("No suitable commit messages found");
    }
    let messages: Vec<&str> = ranked.iter().map(|s| s.message.as_str()).collect();
    let choice = Select::new()
        .with_prompt("Choose a commit message")
        .items(&messages)
        .default(0)
        .interact()
        .context("Failed to read selection")?;
    Ok(ranked.swap_remove(choice))
}

/// Accept, edit or regenerate until the user commits or cancels.
///
/// Returns the message and the template it came from (empty when edited).
fn choose_interactively(
    selector: &SuggestionSelector<'_>,
    ctx: &CommitContext,
    first: Suggestion,
    random: &mut OsRandom,
) -> Result<Option<(String, String)>> {
    const CHOICES: [&str; 4] = ["Accept", "Edit", "Regenerate", "Cancel"];

    let mut shown = BTreeSet::from([first.message.clone()]);
    let mut current = first;

    loop {
        println!();
        println!("  {}", current.message);
        println!();

        let choice = Select::new()
            .with_prompt("Use this message?")
            .items(&CHOICES)
            .default(0)
            .interact()
            .context("Failed to read selection")?;

        match choice {
            0 => return Ok(Some((current.message, current.template))),
            1 => {
                let edited: String = Input::new()
                    .with_prompt("Message")
                    .with_initial_text(current.message.clone())
                    .interact_text()
                    .context("Failed to read message")?;
                let edited = edited.trim().to_string();
                if edited.is_empty() {
                    bail!("Commit message cannot be empty");
                }
                return Ok(Some((edited, String::new())));
            }
            2 => {
                current = selector.alternative(ctx, &shown, random)?;
                shown.insert(current.message.clone());
            }
            _ => return Ok(None),
        }
    }
}

fn print_context(ctx: &CommitContext) {
    let join = |items: &[String]| if items.is_empty() { "-".to_string() } else { items.join(", ") };
    let join_set = |items: &BTreeSet<String>| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };

    println!("Analysis:");
    println!("  Action:     {}", ctx.action);
    println!("  Topic:      {}", ctx.topic);
    println!("  Item:       {}", if ctx.item.is_empty() { "-" } else { ctx.item.as_str() });
    println!("  Purpose:    {}", ctx.purpose);
    println!("  Scope:      {}", if ctx.scope.is_empty() { "-" } else { ctx.scope.as_str() });
    println!("  Lines:      +{} -{}", ctx.total_added, ctx.total_removed);
    println!("  Major:      {}", ctx.is_major);
    println!("  Extensions: {}", join_set(&ctx.file_extensions));
    println!("  Functions:  {}", join(&ctx.detected_functions));
    println!("  Types:      {}", join(&ctx.detected_structs));
    println!("  Methods:    {}", join(&ctx.detected_methods));
    let patterns: Vec<String> = ctx.change_patterns.iter().map(|p| p.to_string()).collect();
    println!("  Patterns:   {}", join(&patterns));
    println!("  Multi-file: {}", join(&ctx.multi_file_patterns));
    if let Some(file_move) = ctx.file_move() {
        println!("  Move:       {} -> {}", file_move.source, file_move.target);
    }
    println!();
}

fn print_candidates(corpus: &Corpus, ctx: &CommitContext) -> Result<()> {
    let bucket = corpus.resolve(ctx)?;
    println!("Template group: {} (topic bucket: {})", bucket.group, bucket.topic);
    println!("Candidate templates:");
    for template in bucket.templates.iter().take(DEBUG_TEMPLATES) {
        let note = if missing_value(template, ctx) { "  [missing value]" } else { "" };
        println!(
            "  {:>6.1}  {}{}",
            base_score(template, ctx, ScoreMode::Select),
            template,
            note
        );
    }
    println!();
    Ok(())
}

/// Print commit-history insights for the current repository.
fn run_analyze() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let repo = open_repository(&cwd).context("Not a git repository. Run gitmit from within a git repository.")?;

    let since = Utc::now() - Duration::days(RECENT_DAYS);
    let stats = collect_commit_stats(&repo, since).context("Failed to read commit history")?;
    if stats.total_commits == 0 {
        println!("No commits yet.");
        return Ok(());
    }

    print_insights(&stats);
    Ok(())
}

fn print_insights(stats: &CommitStats) {
    println!("Overall:");
    println!("  Total commits:    {}", stats.total_commits);
    println!("  Last {RECENT_DAYS} days:      {}", stats.recent_commits);
    println!("  Breaking changes: {}", stats.breaking_changes);
    println!();

    println!("Commit types:");
    let mut types: Vec<(String, usize)> = stats
        .action_counts
        .iter()
        .map(|(action, count)| (action.to_string(), *count))
        .collect();
    if stats.unconventional > 0 {
        types.push(("other".to_string(), stats.unconventional));
    }
    types.sort_by(|a, b| b.1.cmp(&a.1));
    for (label, count) in types {
        println!("  {:<9} {:>5} ({:.1}%)", label, count, stats.percentage(count));
    }
    println!();

    println!("Most active files:");
    for (i, (file, count)) in stats.most_active_files(TOP_LIMIT).into_iter().enumerate() {
        println!("  {}. {} ({} commits)", i + 1, file, count);
    }
    println!();

    println!("Top contributors:");
    for (author, count) in stats.top_contributors(TOP_LIMIT) {
        println!("  {}: {} commits", author, count);
    }

    let recommendations = stats.recommendations();
    if !recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for recommendation in recommendations {
            println!("  - {}", recommendation);
        }
    }
}
