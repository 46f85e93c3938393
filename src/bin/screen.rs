//! Screen CLI - Command-line interface for Synheart Screen
//!
//! Commands:
//! - questions: Print the question catalog
//! - score: Score a complete answer sheet (batch mode)
//! - run: Administer the questionnaire on stdin (interactive mode)
//! - history: Print the score series of a saved history file

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use synheart_screen::{
    evaluate_with, Question, ResponseSet, ScreeningConfig, ScreeningError, ScreeningHistory,
    ScreeningResult, ScreeningSession, INSTRUMENT_NAME, SCREEN_VERSION,
};

/// Screen - On-device EPDS screening engine
#[derive(Parser)]
#[command(name = "screen")]
#[command(author = "Synheart AI Inc")]
#[command(version = SCREEN_VERSION)]
#[command(about = "Administer and score the Edinburgh Postnatal Depression Scale", long_about = None)]
struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the question catalog
    Questions {
        /// Load catalog and recommendations from a JSON config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score a complete answer sheet (batch mode)
    Score {
        /// Input file path holding `{"1": 3, ...}` (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Load catalog and recommendations from a JSON config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Administer the questionnaire on stdin (interactive mode)
    Run {
        /// Load catalog and recommendations from a JSON config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Append the result to this JSON history file
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Print the score series of a saved history file
    History {
        /// History file written by `screen run --history`
        #[arg(short, long)]
        file: PathBuf,

        /// Output the series as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ScreenCliError> {
    match cli.command {
        Commands::Questions { config, json } => cmd_questions(config.as_deref(), json),

        Commands::Score {
            input,
            config,
            output_format,
        } => cmd_score(&input, config.as_deref(), output_format),

        Commands::Run { config, history } => cmd_run(config.as_deref(), history.as_deref()),

        Commands::History { file, json } => cmd_history(&file, json),
    }
}

fn load_config(path: Option<&Path>) -> Result<Arc<ScreeningConfig>, ScreenCliError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading screening configuration");
            let json = fs::read_to_string(path)?;
            Ok(Arc::new(ScreeningConfig::from_json(&json)?))
        }
        None => Ok(ScreeningConfig::shared()),
    }
}

fn cmd_questions(config: Option<&Path>, json: bool) -> Result<(), ScreenCliError> {
    let config = load_config(config)?;

    if json {
        println!("{}", config.catalog().to_json()?);
        return Ok(());
    }

    println!("{INSTRUMENT_NAME}");
    for question in config.catalog().iter() {
        println!();
        print_question(&mut io::stdout(), question)?;
    }
    Ok(())
}

fn cmd_score(input: &Path, config: Option<&Path>, output_format: OutputFormat) -> Result<(), ScreenCliError> {
    let config = load_config(config)?;

    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    if input_data.trim().is_empty() {
        return Err(ScreenCliError::NoResponses);
    }

    let responses: ResponseSet = serde_json::from_str(&input_data)?;
    debug!(answered = responses.answered_count(), "parsed answer sheet");

    let result = evaluate_with(config, &responses)?;
    println!("{}", format_result(&result, &output_format)?);
    Ok(())
}

fn cmd_run(config: Option<&Path>, history_path: Option<&Path>) -> Result<(), ScreenCliError> {
    let config = load_config(config)?;
    let interactive = atty::is(atty::Stream::Stdin);
    let mut session = ScreeningSession::new(config);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();
    let mut alerted = false;

    if interactive {
        writeln!(stdout, "{INSTRUMENT_NAME}")?;
        writeln!(stdout, "In the past 7 days... (enter an option number, or 'b' to go back)")?;
    }

    while !session.responses().is_complete() {
        let question = session.current_question()?.clone();

        if interactive {
            writeln!(stdout)?;
            writeln!(
                stdout,
                "[{}/{}] {:.0}% complete",
                question.index,
                session.config().catalog().count(),
                session.progress() * 100.0
            )?;
            print_question(&mut stdout, &question)?;
            write!(stdout, "> ")?;
            stdout.flush()?;
        }

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(ScreenCliError::Aborted(session.responses().unanswered()));
            }
        };
        let choice = line.trim();

        if choice.is_empty() {
            continue;
        }

        if choice.eq_ignore_ascii_case("b") {
            if !step_back(&mut session)? && interactive {
                writeln!(stdout, "Already at the first question.")?;
            }
            continue;
        }

        let value = match parse_choice(&question, choice) {
            Some(value) => value,
            None if interactive => {
                writeln!(stdout, "Please enter a number from 1 to {}.", question.options.len())?;
                continue;
            }
            None => return Err(ScreenCliError::InvalidChoice(question.index, choice.to_string())),
        };

        session.answer(question.index, value)?;

        if session.crisis_alert() && !alerted {
            alerted = true;
            if interactive {
                writeln!(stdout)?;
                writeln!(
                    stdout,
                    "If you are having thoughts of harming yourself, please reach out now: call or text 988."
                )?;
            }
        }

        // Answering the last question leaves the cursor in place
        if session.responses().is_answered(session.cursor()) {
            if let Some(&next) = session.responses().unanswered().first() {
                session.go_to(next)?;
            }
        }
    }

    let result = session.finalize()?;

    if interactive {
        print_summary(&mut stdout, &result)?;
    } else {
        writeln!(stdout, "{}", result.to_json()?)?;
    }

    if let Some(path) = history_path {
        let mut history = if path.exists() {
            ScreeningHistory::from_json(&fs::read_to_string(path)?)?
        } else {
            ScreeningHistory::new()
        };
        history.record(result);
        fs::write(path, history.to_json()?)?;
        info!(path = %path.display(), results = history.len(), "history updated");
    }

    Ok(())
}

fn cmd_history(file: &Path, json: bool) -> Result<(), ScreenCliError> {
    let history = ScreeningHistory::from_json(&fs::read_to_string(file)?)?;

    if history.is_empty() {
        return Err(ScreenCliError::EmptyHistory);
    }

    let series = history.score_series();

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    for point in &series {
        println!(
            "{}  {:>2}/30  {}",
            point.completed_at.format("%Y-%m-%d %H:%M"),
            point.total_score,
            point.risk_level
        );
    }

    if let Some(change) = history.score_change() {
        println!();
        println!("Change since previous screening: {change:+}");
    }
    Ok(())
}

/// Move the cursor back one question; false when already at the first
fn step_back(session: &mut ScreeningSession) -> Result<bool, ScreeningError> {
    let before = session.cursor();
    Ok(session.previous_question()? != before)
}

/// Map a 1-based option number to the raw value of that option
fn parse_choice(question: &Question, choice: &str) -> Option<u8> {
    let position: usize = choice.parse().ok()?;
    let option = question.options.get(position.checked_sub(1)?)?;
    Some(option.value)
}

fn print_question(out: &mut impl Write, question: &Question) -> io::Result<()> {
    writeln!(out, "{}. {}", question.index, question.prompt)?;
    for (position, option) in question.options.iter().enumerate() {
        writeln!(out, "   {}) {}", position + 1, option.label)?;
    }
    Ok(())
}

fn print_summary(out: &mut impl Write, result: &ScreeningResult) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Score: {}/30  Risk: {}", result.total_score(), result.risk_level())?;
    writeln!(out, "{}", result.risk_level().interpretation(result.total_score()))?;
    writeln!(out)?;
    for recommendation in result.recommendations() {
        writeln!(out, " - {recommendation}")?;
    }
    if let Some(resources) = result.crisis_resources() {
        writeln!(out)?;
        writeln!(out, "Crisis resources:")?;
        for resource in resources {
            writeln!(out, " - {resource}")?;
        }
    }
    Ok(())
}

fn format_result(result: &ScreeningResult, format: &OutputFormat) -> Result<String, ScreenCliError> {
    match format {
        OutputFormat::Json => Ok(result.to_json()?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(result)?),
    }
}

// Error types

#[derive(Debug)]
enum ScreenCliError {
    Io(io::Error),
    Screening(ScreeningError),
    Json(serde_json::Error),
    NoResponses,
    EmptyHistory,
    InvalidChoice(u8, String),
    Aborted(Vec<u8>),
}

impl From<io::Error> for ScreenCliError {
    fn from(e: io::Error) -> Self {
        ScreenCliError::Io(e)
    }
}

impl From<ScreeningError> for ScreenCliError {
    fn from(e: ScreeningError) -> Self {
        ScreenCliError::Screening(e)
    }
}

impl From<serde_json::Error> for ScreenCliError {
    fn from(e: serde_json::Error) -> Self {
        ScreenCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ScreenCliError> for CliError {
    fn from(e: ScreenCliError) -> Self {
        match e {
            ScreenCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ScreenCliError::Screening(e) => {
                let hint = match &e {
                    ScreeningError::OutOfRange { .. } => "Answers must be 0-3 for questions 1-10",
                    ScreeningError::IncompleteResponses { .. } => "Answer all 10 questions before scoring",
                    ScreeningError::InvalidCatalog(_) => "Check the config file against 'screen questions --json'",
                    _ => "Check input format",
                };
                CliError {
                    code: "SCREENING_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            ScreenCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ScreenCliError::NoResponses => CliError {
                code: "NO_RESPONSES".to_string(),
                message: "No responses found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            ScreenCliError::EmptyHistory => CliError {
                code: "EMPTY_HISTORY".to_string(),
                message: "History file contains no results".to_string(),
                hint: Some("Record a screening with 'screen run --history <file>'".to_string()),
            },
            ScreenCliError::InvalidChoice(index, choice) => CliError {
                code: "INVALID_CHOICE".to_string(),
                message: format!("Invalid choice '{}' for question {}", choice, index),
                hint: Some("Enter the option number shown by 'screen questions'".to_string()),
            },
            ScreenCliError::Aborted(missing) => CliError {
                code: "ABORTED".to_string(),
                message: format!("Input ended with {} question(s) unanswered {:?}", missing.len(), missing),
                hint: Some("Provide one option number per question".to_string()),
            },
        }
    }
}
