// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Perspective CLI
//!
//! Score text against the Perspective comment analysis API from the shell.

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use perspective::attributes::{self, AttributeGroup};
use perspective::config::{AppConfig, LogLevel};
use perspective::language;
use perspective::report::{self, History, HistoryEntry};
use perspective::resolver::{self, AttributeSelection};
use perspective::{AnalyzeOptions, AnalyzeOutcome, AnalyzeResult, Client, Result, SortOrder};

/// Perspective CLI - comment analysis from the terminal
#[derive(Parser, Debug)]
#[command(name = "perspective")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Score text with the Perspective comment analysis API", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "perspective.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a piece of text
    Analyze(AnalyzeArgs),

    /// List the attributes the API can score
    Attributes {
        /// Only show one group (production, experimental, nyt, all)
        #[arg(short, long)]
        group: Option<String>,

        /// Show descriptions and supported languages
        #[arg(long)]
        details: bool,
    },

    /// Look up a language code or name, or list them all
    Languages {
        /// Code or English name, typos allowed
        query: Option<String>,
    },

    /// Check that the configured API key is accepted
    Check,

    /// Analysis history
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Text to analyze ("-" reads standard input)
    text: String,

    /// Attribute, group or comma-separated list; repeatable
    #[arg(short, long = "attribute")]
    attributes: Vec<String>,

    /// Language of the text, as a code or English name
    #[arg(short, long)]
    language: Option<String>,

    /// Drop attributes that do not support the language instead of failing
    #[arg(long)]
    skip_on_lang: bool,

    /// Drop unrecognized attribute names instead of failing
    #[arg(long)]
    skip_on_unknown: bool,

    /// Print the untouched API response
    #[arg(long)]
    raw: bool,

    /// Sort scores (asc or desc)
    #[arg(long)]
    sort: Option<String>,

    /// Right-align attribute names
    #[arg(long)]
    align_right: bool,

    /// Also save the scores to a SQLite file (default: output.database_path)
    #[arg(long, num_args = 0..=1)]
    save_db: Option<Option<PathBuf>>,

    /// Also draw an SVG bar chart (default: output.chart_path)
    #[arg(long, num_args = 0..=1)]
    chart: Option<Option<PathBuf>>,

    /// Chart title
    #[arg(long, requires = "chart")]
    title: Option<String>,

    /// Do not record this analysis in the history log
    #[arg(long)]
    no_history: bool,
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// List recent analyses
    List {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },

    /// Clear all history
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "perspective.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    // Flags win, then RUST_LOG, then the configured level
    let filter = match cli_filter(&cli) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_string())),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let level = cli_log_level(&cli);

    match cli.command {
        Commands::Analyze(args) => run_analyze(config, args, &cli.format, level).await,
        Commands::Attributes { group, details } => run_attributes(group, details, &cli.format),
        Commands::Languages { query } => run_languages(query, &cli.format),
        Commands::Check => run_check(config, level).await,
        Commands::History { action } => run_history_command(config, action, &cli.format),
        Commands::Config { action } => run_config_command(config, action, &cli.config),
    }
}

/// Subscriber directive implied by the global flags, if any
fn cli_filter(cli: &Cli) -> Option<&'static str> {
    if cli.trace {
        Some("trace")
    } else if cli.verbose {
        Some("debug")
    } else if cli.quiet {
        Some("warn")
    } else {
        None
    }
}

/// Client log level implied by the global flags, if any
fn cli_log_level(cli: &Cli) -> Option<LogLevel> {
    if cli.trace || cli.verbose {
        Some(LogLevel::Debug)
    } else if cli.quiet {
        Some(LogLevel::Warn)
    } else {
        None
    }
}

async fn connect(config: &AppConfig, level: Option<LogLevel>) -> Result<Client> {
    let token = config.resolve_token()?;
    let mut client_config = config.client_config();
    if let Some(level) = level {
        client_config.log_level = level;
    }
    Client::connect(token, client_config).await
}

fn read_text(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(arg.to_string())
    }
}

/// Run one analysis and report it
async fn run_analyze(config: AppConfig, args: AnalyzeArgs, format: &str, level: Option<LogLevel>) -> Result<()> {
    let text = read_text(&args.text)?;

    let selection: AttributeSelection = if args.attributes.is_empty() {
        config.analysis.attributes.clone().into()
    } else {
        args.attributes.clone().into()
    };
    let language = args.language.clone().or_else(|| config.analysis.language.clone());
    let options = AnalyzeOptions {
        skip_on_lang: args.skip_on_lang || config.analysis.skip_on_lang,
        skip_on_unknown: args.skip_on_unknown || config.analysis.skip_on_unknown,
        return_raw: args.raw,
    };
    let sort = args
        .sort
        .as_deref()
        .or(config.output.sort_by.as_deref())
        .map(str::parse::<SortOrder>)
        .transpose()?;

    let client = connect(&config, level).await?;
    debug!("Analyzing {} characters", text.chars().count());

    let outcome = client.analyze(&text, selection, language.as_deref(), options).await?;

    let scores = match outcome {
        AnalyzeOutcome::Raw(raw) => {
            println!("{}", serde_json::to_string_pretty(&raw)?);
            AnalyzeResult::from_raw(&raw)?
        }
        AnalyzeOutcome::Scores(scores) => {
            print_scores(&scores, format, args.align_right || config.output.align_right, sort)?;
            scores
        }
    };

    if scores.is_empty() {
        warn!("No attribute could be scored");
        return Ok(());
    }

    if let Some(path) = &args.save_db {
        let path = path.clone().unwrap_or_else(|| PathBuf::from(&config.output.database_path));
        report::save_data(&scores, &path, sort)?;
    }
    if let Some(path) = &args.chart {
        let path = path.clone().unwrap_or_else(|| PathBuf::from(&config.output.chart_path));
        report::save_chart(&scores, &path, args.title.as_deref(), true)?;
    }

    if !args.no_history {
        let code = language
            .as_deref()
            .and_then(language::language_code)
            .map(String::from);
        let history = History::new(PathBuf::from(&config.output.history_path));
        history.append(&HistoryEntry::new(text, code, scores))?;
    }

    Ok(())
}

fn print_scores(scores: &AnalyzeResult, format: &str, align_right: bool, sort: Option<SortOrder>) -> Result<()> {
    if format == "json" {
        let ordered: AnalyzeResult = match sort {
            Some(order) => scores.sorted(order).into_iter().map(|s| (s.attribute, s.value)).collect(),
            None => scores.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&ordered.to_map())?);
    } else if scores.is_empty() {
        println!("No scores");
    } else {
        println!("{}", report::format_response(scores, align_right, sort)?);
    }
    Ok(())
}

/// List the attribute catalog
fn run_attributes(group: Option<String>, details: bool, format: &str) -> Result<()> {
    let group = match group {
        Some(g) => g.parse::<AttributeGroup>()?,
        None => AttributeGroup::All,
    };
    let infos: Vec<_> = group.members().iter().map(|a| a.info()).collect();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("{} ({} attributes)", group, infos.len());
    println!("  {}", group.description());
    println!("  Common languages: {}", group.common_languages().join(", "));
    for info in infos {
        let marker = if info.is_experimental { " [experimental]" } else { "" };
        println!("  {}{}", info.name, marker);
        if details {
            println!("      {}", info.description);
            println!("      Languages: {}", info.supported_languages.join(", "));
        }
    }
    Ok(())
}

/// Resolve one language or list all of them
fn run_languages(query: Option<String>, format: &str) -> Result<()> {
    match query {
        Some(q) => match language::lookup(&q) {
            Some(lang) => {
                if format == "json" {
                    println!("{}", serde_json::to_string_pretty(&lang)?);
                } else {
                    println!("{}  {}", lang.code, lang.name);
                    let supported: Vec<_> = attributes::list_all()
                        .iter()
                        .filter(|i| i.attribute.supports(lang.code))
                        .map(|i| i.name)
                        .collect();
                    if supported.is_empty() {
                        println!("  No attribute supports this language");
                    } else {
                        println!("  Supported by: {}", supported.join(", "));
                    }
                }
            }
            None => eprintln!("No language matches \"{}\"", q),
        },
        None => {
            let all: Vec<_> = language::all_languages().collect();
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else {
                for lang in all {
                    println!("{}  {}", lang.code, lang.name);
                }
            }
        }
    }
    Ok(())
}

/// Verify the API key
async fn run_check(config: AppConfig, level: Option<LogLevel>) -> Result<()> {
    connect(&config, level).await?;
    info!("API key accepted by {}", config.api.endpoint);
    println!("API key is valid");
    Ok(())
}

fn run_history_command(config: AppConfig, action: HistoryCommands, format: &str) -> Result<()> {
    let history = History::new(PathBuf::from(&config.output.history_path));

    match action {
        HistoryCommands::List { count } => {
            let entries = history.get_recent(count)?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            println!("Recent history ({} entries):", entries.len());
            for entry in entries {
                let top = report::highest(&entry.scores)
                    .map(|a| format!("{} {:.2}%", a, entry.scores.get(a).unwrap_or_default()))
                    .unwrap_or_else(|_| "no scores".to_string());
                println!(
                    "  {} [{}] {} :: {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.language.as_deref().unwrap_or("auto"),
                    preview(&entry.text, 48),
                    top
                );
            }
        }
        HistoryCommands::Clear { force } => {
            if !force {
                eprintln!("Use --force to confirm clearing history");
                return Ok(());
            }
            history.clear()?;
            println!("History cleared");
        }
    }

    Ok(())
}

fn preview(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    }
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let mut shown = config.clone();
            if shown.api.token.is_some() {
                shown.api.token = Some("<redacted>".to_string());
            }
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            let selection: AttributeSelection = config.analysis.attributes.clone().into();
            let resolved = resolver::resolve(&selection, config.analysis.skip_on_unknown)?;
            if let Some(sort) = &config.output.sort_by {
                sort.parse::<SortOrder>()?;
            }

            println!("Configuration at {:?} is valid", config_path);
            println!("  Endpoint: {}", config.api.endpoint);
            println!(
                "  Attributes: {}",
                resolved.iter().map(|a| a.as_str()).collect::<Vec<_>>().join(", ")
            );
            match config.analysis.language.as_deref() {
                Some(lang) => match language::lookup(lang) {
                    Some(l) => println!("  Language: {} ({})", l.name, l.code),
                    None => println!("  Language: \"{}\" is unknown and will be left to detection", lang),
                },
                None => println!("  Language: detected by the service"),
            }
            println!("  Log level: {}", config.logging.level);
            println!(
                "  API key: {}",
                if config.resolve_token().is_ok() { "configured" } else { "missing" }
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["perspective", "check"]).unwrap();
        assert!(!cli.verbose);
        assert_eq!(cli.format, "text");
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_cli_analyze_command() {
        let cli = Cli::try_parse_from([
            "perspective", "analyze", "you are great", "-a", "toxicity", "-a", "insult,threat",
            "-l", "German", "--skip-on-lang", "--sort", "desc", "--chart", "/tmp/c.svg",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.text, "you are great");
                assert_eq!(args.attributes, vec!["toxicity", "insult,threat"]);
                assert_eq!(args.language.as_deref(), Some("German"));
                assert!(args.skip_on_lang);
                assert!(!args.skip_on_unknown);
                assert_eq!(args.sort.as_deref(), Some("desc"));
                assert_eq!(args.chart, Some(Some(PathBuf::from("/tmp/c.svg"))));
                assert_eq!(args.save_db, None);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_outputs_default_paths() {
        let cli = Cli::try_parse_from(["perspective", "analyze", "hi", "--save-db", "--chart"]).unwrap();
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.save_db, Some(None));
                assert_eq!(args.chart, Some(None));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_title_requires_chart() {
        assert!(Cli::try_parse_from(["perspective", "analyze", "hi", "--title", "T"]).is_err());
    }

    #[test]
    fn test_cli_history_and_format() {
        let cli = Cli::try_parse_from(["perspective", "history", "list", "-n", "3", "--format", "json"]).unwrap();
        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::History {
                action: HistoryCommands::List { count },
            } => assert_eq!(count, 3),
            _ => panic!("Expected History List command"),
        }
        assert!(Cli::try_parse_from(["perspective", "check", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_cli_log_level_flags() {
        let cli = Cli::try_parse_from(["perspective", "-q", "check"]).unwrap();
        assert_eq!(cli_log_level(&cli), Some(LogLevel::Warn));
        let cli = Cli::try_parse_from(["perspective", "check", "--verbose"]).unwrap();
        assert_eq!(cli_log_level(&cli), Some(LogLevel::Debug));
        let cli = Cli::try_parse_from(["perspective", "check"]).unwrap();
        assert_eq!(cli_log_level(&cli), None);
    }

    #[test]
    fn test_cli_filter_defers_to_config_without_flags() {
        let cli = Cli::try_parse_from(["perspective", "check"]).unwrap();
        assert_eq!(cli_filter(&cli), None);
        let cli = Cli::try_parse_from(["perspective", "--trace", "-q", "check"]).unwrap();
        assert_eq!(cli_filter(&cli), Some("trace"));

        // the configured level must be a valid subscriber directive
        for level in [LogLevel::Off, LogLevel::Error, LogLevel::Warn, LogLevel::Info, LogLevel::Debug] {
            assert!(level.to_string().parse::<tracing_subscriber::filter::Directive>().is_ok());
        }
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short  text", 20), "short text");
        assert_eq!(preview("abcdefghij", 4), "abcd...");
    }
}
