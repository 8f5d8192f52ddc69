#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # feynman
//!
//! Terminal front end for the explain-it-back check and the stuck-learner
//! nudge.
//!
//! Configure an evaluator through the environment (or a `.env` file), either
//! `FEYNMAN_EVALUATOR_ENDPOINT` for a dedicated service or `OPENAI_ENDPOINT`,
//! `OPENAI_API_KEY` and `OPENAI_MODEL` for an LLM judge.

use std::path::Path;

use anyhow::{Context, Result};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use feynman::{
    Location, StuckSignal, advise, config,
    validation::{ConfiguredEvaluator, SessionHost, SubmitOutcome, ValidationSession},
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Explain a snippet back and have it validated
    Explain {
        /// Language override
        language:    Option<String>,
        /// First explanation, instead of reading it from stdin
        explanation: Option<String>,
        /// Path to the snippet
        file:        String,
    },
    /// Show the nudge for a stuck-detector reason
    Nudge {
        /// File the learner was working in
        file:   Option<String>,
        /// Line the learner was working on
        line:   Option<u32>,
        /// Reason reported by the stuck detector
        reason: String,
    },
}

/// Parsed command line.
#[derive(Debug, Clone)]
struct Opts {
    /// Log at debug level
    verbose: bool,
    /// The command to run
    cmd:     Cmd,
}

/// Parse the command line arguments and return the options
fn options() -> Opts {
    /// parses the snippet path
    fn snippet() -> impl Parser<String> {
        positional("FILE").help("Path to the code snippet to explain")
    }

    /// parses the stuck reason
    fn reason() -> impl Parser<String> {
        positional("REASON").help("Reason string reported by the stuck detector")
    }

    let language = short('l')
        .long("language")
        .help("Language of the snippet; guessed from the file extension if omitted")
        .argument::<String>("LANG")
        .optional();
    let explanation = short('e')
        .long("explanation")
        .help("Explanation to submit first; otherwise read from stdin")
        .argument::<String>("TEXT")
        .optional();
    let file = snippet();
    let explain = construct!(Cmd::Explain {
        language,
        explanation,
        file
    })
    .to_options()
    .command("explain")
    .help("Explain a code snippet in your own words and get it checked");

    let file = long("file")
        .help("File the learner was working in")
        .argument::<String>("PATH")
        .optional();
    let line = long("line")
        .help("Line the learner was working on")
        .argument::<u32>("LINE")
        .optional();
    let reason = reason();
    let nudge = construct!(Cmd::Nudge { file, line, reason })
        .to_options()
        .command("nudge")
        .help("Show the help offer for a stuck learner");

    let verbose = short('v')
        .long("verbose")
        .help("Show debug logs")
        .switch();
    let cmd = construct!([explain, nudge]);

    construct!(Opts { verbose, cmd })
        .to_options()
        .descr("Explain-it-back checks and stuck-learner nudges")
        .run()
}

/// Reports session callbacks to the terminal log.
#[derive(Debug, Default)]
struct TerminalHost {
    /// Genuine evaluator responses seen so far.
    responses: usize,
}

impl SessionHost for TerminalHost {
    fn on_validation_complete(&mut self, passed: bool, _feedback: &str) {
        self.responses += 1;
        tracing::info!(passed, "Evaluator responded");
    }

    fn on_close(&mut self) {
        tracing::debug!(responses = self.responses, "Session closed");
    }
}

/// Guesses a language name from a file extension.
fn language_from_path(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "py" => "python",
        "rs" => "rust",
        "java" => "java",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" => "typescript",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "go" => "go",
        "rb" => "ruby",
        "" => "text",
        other => return other.to_string(),
    }
    .to_string()
}

/// Reads one explanation from stdin, ending at a blank line or EOF. Returns
/// `None` when stdin is exhausted.
async fn read_explanation(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    eprintln!(
        "{}",
        "Explain the code in your own words (finish with an empty line):".bold()
    );
    let mut text = Vec::new();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Could not read explanation from stdin")?
    {
        if line.trim().is_empty() {
            break;
        }
        text.push(line);
    }

    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text.join("\n")))
    }
}

/// Asks a yes/no question on stdin; anything but `y` means no.
async fn confirm(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    let answer = lines
        .next_line()
        .await
        .context("Could not read answer from stdin")?;
    Ok(matches!(answer.as_deref().map(str::trim), Some("y" | "Y" | "yes")))
}

/// Prints a verdict and the actions on offer.
fn print_verdict(session: &ValidationSession) {
    let Some(verdict) = session.verdict() else {
        return;
    };
    let style = verdict.understanding_level.style();

    println!(
        "\n{} {}",
        style.emoji,
        format!("Understanding: {}", style.label)
            .color(style.color)
            .bold()
    );
    println!("\n{}\n", verdict.feedback);

    for (title, items) in [
        ("Concepts covered", &verdict.concepts_covered),
        ("Concepts missed", &verdict.concepts_missed),
        ("Questions to think about", &verdict.follow_up_questions),
    ] {
        if items.is_empty() {
            continue;
        }
        println!("{}", title.bold());
        for item in items {
            println!("  - {item}");
        }
        println!();
    }

    let view = session.view();
    if view.offer_retry {
        println!("[Try again]  [{}]", view.terminal_action);
    } else {
        println!("[{}]", view.terminal_action);
    }
}

/// Runs an interactive explain-it-back session for the snippet at `file`.
async fn explain(
    file: String,
    language: Option<String>,
    explanation: Option<String>,
) -> Result<()> {
    let path = Path::new(&file);
    let code = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Could not read {}", path.display()))?;
    let language = language.unwrap_or_else(|| language_from_path(path));

    let config = config::ensure_initialized()?;
    let evaluator = ConfiguredEvaluator::from_config(&config)?;
    tracing::debug!(evaluator = evaluator.kind(), "Using configured evaluator");

    let mut session = ValidationSession::new(code, language);
    let mut host = TerminalHost::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = explanation;

    loop {
        let text = match pending.take() {
            Some(text) => text,
            None => match read_explanation(&mut lines).await? {
                Some(text) => text,
                None => break,
            },
        };
        session.set_draft(text);

        eprintln!("{}", "Validating your explanation...".dimmed());
        if session.submit(&evaluator, &mut host).await == SubmitOutcome::Ignored {
            eprintln!("{}", "An explanation can't be blank.".yellow());
            continue;
        }
        print_verdict(&session);

        if session.view().offer_retry && confirm(&mut lines, "Try again?").await? {
            session.retry()?;
            continue;
        }
        break;
    }

    session.close(&mut host);
    Ok(())
}

/// Prints the advisory for a stuck signal.
fn nudge(reason: String, file: Option<String>, line: Option<u32>) {
    let location = match (file, line) {
        (Some(file), Some(line)) => Some(Location::new(file, line)),
        (None, None) => None,
        _ => {
            tracing::warn!("Ignoring location: both --file and --line are needed");
            None
        }
    };
    let signal = StuckSignal::builder()
        .reason_code(reason)
        .maybe_location(location)
        .build();
    let advisory = advise(&signal);

    println!("{}", advisory.message.bold());
    if let Some(context) = &advisory.context_line {
        println!("{}", context.dimmed());
    }
    let actions: Vec<String> = advisory
        .actions
        .iter()
        .map(|a| format!("[{}]", a.label()))
        .collect();
    println!("{}", actions.join("  "));
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let level = if opts.verbose { Level::DEBUG } else { Level::INFO };
    let filter_layer = LevelFilter::from_level(level);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match opts.cmd {
        Cmd::Explain {
            language,
            explanation,
            file,
        } => explain(file, language, explanation).await?,
        Cmd::Nudge { file, line, reason } => nudge(reason, file, line),
    };

    Ok(())
}
