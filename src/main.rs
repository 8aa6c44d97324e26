use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use speech_commands::{
    CallbackResult, Command, CommandMatch, CommandMatcher, CommandPattern, Config,
    RecognitionManager, ReplayEngine, ResetHandle, Subscription, TranscriptStore,
};

/// Speech Commands - match voice commands against speech transcripts
#[derive(Parser)]
#[command(name = "speech-commands", version, about)]
struct Cli {
    /// Command file (default: $SPEECH_COMMANDS_FILE, then
    /// ~/.config/speech-commands/commands.toml)
    #[arg(short, long)]
    commands: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Compile every configured command and list them
    Check,
    /// Match a single phrase against the configured commands
    Match {
        /// Phrase to match
        text: String,
        /// Treat the phrase as interim text instead of a final phrase
        #[arg(long)]
        interim: bool,
    },
    /// Replay a recorded transcript through a listening session
    Replay {
        /// Recording to replay (stdin if omitted)
        file: Option<PathBuf>,
        /// Listen continuously
        #[arg(long)]
        continuous: bool,
        /// Recognition language
        #[arg(long)]
        language: Option<String>,
    },
}

/// One matched command, printed as a JSON line
#[derive(Serialize)]
struct MatchReport<'a> {
    action: &'a str,
    command: &'a str,
    #[serde(flatten)]
    result: &'a CommandMatch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr, matches to stdout
    let filter = match cli.verbose {
        0 => "warn,speech_commands=info",
        1 => "info,speech_commands=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.commands.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Cmd::Check => cmd_check(&config),
        Cmd::Match { text, interim } => cmd_match(&config, &text, interim),
        Cmd::Replay {
            file,
            continuous,
            language,
        } => cmd_replay(config, file, continuous, language).await,
    }
}

fn cmd_check(config: &Config) -> anyhow::Result<()> {
    let matcher = CommandMatcher::new(
        build_commands(config)?,
        ResetHandle::new(TranscriptStore::new()),
    )?;

    match &config.source {
        Some(path) => println!("{} commands from {}", matcher.len(), path.display()),
        None => println!("{} commands (no command file)", matcher.len()),
    }

    for (entry, patterns) in config.commands.iter().zip(matcher.patterns()) {
        let mode = if entry.fuzzy {
            let threshold = entry.fuzzy_threshold;
            format!("fuzzy>={threshold}")
        } else if entry.regex {
            "regex".to_string()
        } else {
            "exact".to_string()
        };
        let patterns: Vec<&str> = patterns.iter().map(CommandPattern::as_str).collect();
        println!("  {:<20} {:<12} {}", entry.action, mode, patterns.join(" | "));
    }

    Ok(())
}

fn cmd_match(config: &Config, text: &str, interim: bool) -> anyhow::Result<()> {
    let mut matcher = CommandMatcher::new(
        build_commands(config)?,
        ResetHandle::new(TranscriptStore::new()),
    )?;

    if interim {
        matcher.match_commands(text, "")?;
    } else {
        matcher.match_commands("", text)?;
    }
    Ok(())
}

async fn cmd_replay(
    config: Config,
    file: Option<PathBuf>,
    continuous: bool,
    language: Option<String>,
) -> anyhow::Result<()> {
    let engine = match &file {
        Some(path) => {
            let reader = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            ReplayEngine::from_reader(BufReader::new(reader))?
        }
        None => ReplayEngine::from_reader(std::io::stdin().lock())?,
    };

    let subscription = Subscription::new(build_commands(&config)?, config.subscription)?;
    let transcript = subscription.transcript_store();

    let mut manager = RecognitionManager::new(Box::new(engine));
    manager.subscribe(Box::new(subscription));

    let mut options = config.listen;
    if continuous {
        options.continuous = true;
    }
    if let Some(language) = language {
        options.language = language;
    }

    manager.start_listening(options).await?;
    manager.run().await?;

    let transcript = transcript.snapshot();
    println!("{}", serde_json::json!({ "transcript": transcript }));
    Ok(())
}

/// Build registrations that print each match
fn build_commands(config: &Config) -> speech_commands::Result<Vec<Command>> {
    config
        .commands
        .iter()
        .map(|entry| {
            let action = entry.action.clone();
            entry.to_command(move |result, ctx| report(&action, ctx.command.as_str(), result))
        })
        .collect()
}

fn report(action: &str, command: &str, result: &CommandMatch) -> CallbackResult {
    let line = serde_json::to_string(&MatchReport {
        action,
        command,
        result,
    })?;
    println!("{line}");
    Ok(())
}
