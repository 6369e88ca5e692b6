use std::fmt;

use quiz_core::QuizMode;
use quiz_core::model::{AccountDraft, AccountMode, Subject, SubjectConfig, UnknownSubject};
use services::{AppServices, ChatService};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingSubject,
    UnknownArg(String),
    UnknownCommand(String),
    InvalidSubject(UnknownSubject),
    InvalidQuestionCount { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingSubject => {
                write!(f, "quiz requires a subject (addition, subtraction, multiplication)")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidSubject(err) => write!(f, "{err}"),
            ArgsError::InvalidQuestionCount { raw } => {
                write!(f, "invalid --questions value: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- quiz <subject> [--timed] [--db <sqlite_url>] [--questions <n>]");
    eprintln!("  cargo run -p app -- progress [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- puzzle");
    eprintln!("  cargo run -p app -- chat");
    eprintln!(
        "  cargo run -p app -- account <login|create> --username <name> --email <addr> --password <pw>"
    );
    eprintln!();
    eprintln!("Subjects: addition, subtraction, multiplication");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --questions {}", SubjectConfig::DEFAULT_QUESTION_COUNT);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_QUESTION_COUNT, QUIZ_CHAT_URL, QUIZ_CHAT_API_KEY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Progress,
    Puzzle,
    Chat,
    Account,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "progress" => Some(Self::Progress),
            "puzzle" => Some(Self::Puzzle),
            "chat" => Some(Self::Chat),
            "account" => Some(Self::Account),
            _ => None,
        }
    }
}

/// Storage knobs shared by the commands that touch saved scores.
struct StoreArgs {
    db_url: String,
    question_count: usize,
}

impl StoreArgs {
    fn from_env() -> Result<Self, ArgsError> {
        let db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let question_count = match std::env::var("QUIZ_QUESTION_COUNT") {
            Ok(raw) => parse_question_count(raw)?,
            Err(_) => SubjectConfig::DEFAULT_QUESTION_COUNT,
        };
        Ok(Self {
            db_url,
            question_count,
        })
    }

    /// Consume `flag` if it is a storage flag; `Ok(false)` leaves it to the caller.
    fn accept(
        &mut self,
        flag: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<bool, ArgsError> {
        match flag {
            "--db" => {
                let value = require_value(args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                self.db_url = normalize_sqlite_url(value);
                Ok(true)
            }
            "--questions" => {
                self.question_count = parse_question_count(require_value(args, "--questions")?)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn parse_question_count(raw: String) -> Result<usize, ArgsError> {
    match raw.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ArgsError::InvalidQuestionCount { raw }),
    }
}

struct QuizArgs {
    subject: Subject,
    mode: QuizMode,
    store: StoreArgs,
}

impl QuizArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut store = StoreArgs::from_env()?;
        let mut subject = None;
        let mut mode = QuizMode::Untimed;

        while let Some(arg) = args.next() {
            if store.accept(&arg, args)? {
                continue;
            }
            match arg.as_str() {
                "--timed" => mode = QuizMode::Timed,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                raw if !raw.starts_with("--") && subject.is_none() => {
                    subject = Some(raw.parse::<Subject>().map_err(ArgsError::InvalidSubject)?);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            subject: subject.ok_or(ArgsError::MissingSubject)?,
            mode,
            store,
        })
    }
}

fn parse_progress(args: &mut impl Iterator<Item = String>) -> Result<StoreArgs, ArgsError> {
    let mut store = StoreArgs::from_env()?;
    while let Some(arg) = args.next() {
        if store.accept(&arg, args)? {
            continue;
        }
        return Err(ArgsError::UnknownArg(arg));
    }
    Ok(store)
}

fn parse_account(args: &mut impl Iterator<Item = String>) -> Result<AccountDraft, ArgsError> {
    let mut draft = AccountDraft {
        mode: AccountMode::Login,
        username: String::new(),
        email: String::new(),
        password: String::new(),
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "login" => draft.mode = AccountMode::Login,
            "create" => draft.mode = AccountMode::Create,
            "--username" => draft.username = require_value(args, "--username")?,
            "--email" => draft.email = require_value(args, "--email")?,
            "--password" => draft.password = require_value(args, "--password")?,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(draft)
}

fn expect_no_args(args: &mut impl Iterator<Item = String>) -> Result<(), ArgsError> {
    match args.next() {
        Some(arg) => Err(ArgsError::UnknownArg(arg)),
        None => Ok(()),
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn open_services(store: &StoreArgs) -> Result<AppServices, Box<dyn std::error::Error>> {
    prepare_sqlite_file(&store.db_url)?;
    Ok(AppServices::new_sqlite(&store.db_url, store.question_count).await?)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            let err = ArgsError::UnknownCommand(first);
            eprintln!("{err}");
            print_usage();
            err
        })?,
    };

    let report = |err: ArgsError| {
        eprintln!("{err}");
        print_usage();
        err
    };

    match cmd {
        Command::Quiz => {
            let parsed = QuizArgs::parse(&mut argv).map_err(report)?;
            let services = open_services(&parsed.store).await?;
            commands::quiz(&services, parsed.subject, parsed.mode).await
        }
        Command::Progress => {
            let store = parse_progress(&mut argv).map_err(report)?;
            let services = open_services(&store).await?;
            commands::progress(&services).await
        }
        Command::Puzzle => {
            expect_no_args(&mut argv).map_err(report)?;
            commands::puzzle().await
        }
        Command::Chat => {
            expect_no_args(&mut argv).map_err(report)?;
            commands::chat(&ChatService::from_env()?).await
        }
        Command::Account => {
            let draft = parse_account(&mut argv).map_err(report)?;
            commands::account(draft)
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
