use std::fmt;
use std::str::FromStr;

use services::{AppServices, Clock, DetailSort, OverviewSort, QuizRequest, SortOrder};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use trivia_core::QuizSettings;
use trivia_core::model::catalog::ALL_SUBCATEGORIES;
use trivia_core::model::{DifficultyMode, SubcategoryFilter, UserId};

mod play;
mod report;
mod seed;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUser { raw: String },
    InvalidDifficulty { raw: String },
    InvalidSort { raw: String },
    MissingCategory,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw:?}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw} (expected default, easy or hard)")
            }
            ArgsError::InvalidSort { raw } => write!(f, "invalid --sort value: {raw}"),
            ArgsError::MissingCategory => write!(f, "play requires --category"),
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
    eprintln!(
        "  cargo run -p app -- play --category <name> [--subcategory <name|All>] [--difficulty <mode>]"
    );
    eprintln!("  cargo run -p app -- profile");
    eprintln!(
        "  cargo run -p app -- collection [--subcategory <name>] [--sort <key>] [--desc]"
    );
    eprintln!("  cargo run -p app -- demo-seed");
    eprintln!();
    eprintln!("Common flags:");
    eprintln!("  --db <sqlite_url>   default sqlite://trivia.sqlite3");
    eprintln!("  --user <id>         default local");
    eprintln!();
    eprintln!("Sort keys:");
    eprintln!("  overview: alphabetical | progress");
    eprintln!("  detail:   last-seen | correct | total");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRIVIA_DB_URL, TRIVIA_USER, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Profile,
    Collection,
    DemoSeed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "profile" => Some(Self::Profile),
            "collection" => Some(Self::Collection),
            "demo-seed" => Some(Self::DemoSeed),
            _ => None,
        }
    }
}

/// Flags shared by every command.
struct CommonArgs {
    db_url: String,
    user: UserId,
}

impl CommonArgs {
    fn from_env() -> Self {
        let db_url = std::env::var("TRIVIA_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://trivia.sqlite3".into(), normalize_sqlite_url);
        let user = std::env::var("TRIVIA_USER")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| UserId::new("local"), UserId::new);
        Self { db_url, user }
    }

    /// Consume `--db`/`--user` if `flag` is one of them.
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
            "--user" => {
                let value = require_value(args, "--user")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidUser { raw: value });
                }
                self.user = UserId::new(value.trim());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

enum Args {
    Play {
        common: CommonArgs,
        request: QuizRequest,
    },
    Profile {
        common: CommonArgs,
    },
    Collection {
        common: CommonArgs,
        subcategory: Option<String>,
        sort: Option<String>,
        order: SortOrder,
    },
    DemoSeed {
        common: CommonArgs,
    },
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        match cmd {
            Command::Play => Self::parse_play(args),
            Command::Profile => Self::parse_common(args).map(|common| Self::Profile { common }),
            Command::Collection => Self::parse_collection(args),
            Command::DemoSeed => Self::parse_common(args).map(|common| Self::DemoSeed { common }),
        }
    }

    fn parse_common(args: &mut impl Iterator<Item = String>) -> Result<CommonArgs, ArgsError> {
        let mut common = CommonArgs::from_env();
        while let Some(arg) = args.next() {
            if !common.accept(&arg, args)? {
                return Err(unknown_or_help(arg));
            }
        }
        Ok(common)
    }

    fn parse_play(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut common = CommonArgs::from_env();
        let mut category = None;
        let mut subcategory = SubcategoryFilter::All;
        let mut mode = DifficultyMode::Default;

        while let Some(arg) = args.next() {
            if common.accept(&arg, args)? {
                continue;
            }
            match arg.as_str() {
                "--category" => category = Some(require_value(args, "--category")?),
                "--subcategory" => {
                    subcategory = SubcategoryFilter::parse(&require_value(args, "--subcategory")?);
                }
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    mode = DifficultyMode::from_str(&value)
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                }
                _ => return Err(unknown_or_help(arg)),
            }
        }

        let category = category
            .filter(|c| !c.trim().is_empty())
            .ok_or(ArgsError::MissingCategory)?;
        Ok(Self::Play {
            common,
            request: QuizRequest::new(category.trim(), subcategory, mode),
        })
    }

    fn parse_collection(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut common = CommonArgs::from_env();
        let mut subcategory = None;
        let mut sort = None;
        let mut order = SortOrder::Ascending;

        while let Some(arg) = args.next() {
            if common.accept(&arg, args)? {
                continue;
            }
            match arg.as_str() {
                "--subcategory" => {
                    let value = require_value(args, "--subcategory")?;
                    if value.trim() != ALL_SUBCATEGORIES {
                        subcategory = Some(value.trim().to_owned());
                    }
                }
                "--sort" => sort = Some(require_value(args, "--sort")?),
                "--desc" => order = SortOrder::Descending,
                "--asc" => order = SortOrder::Ascending,
                _ => return Err(unknown_or_help(arg)),
            }
        }

        Ok(Self::Collection {
            common,
            subcategory,
            sort,
            order,
        })
    }
}

fn unknown_or_help(arg: String) -> ArgsError {
    if arg == "--help" || arg == "-h" {
        print_usage();
        std::process::exit(0);
    }
    ArgsError::UnknownArg(arg)
}

fn parse_overview_sort(raw: Option<&str>) -> Result<OverviewSort, ArgsError> {
    match raw {
        None | Some("alphabetical") => Ok(OverviewSort::Alphabetical),
        Some("progress") => Ok(OverviewSort::Progress),
        Some(other) => Err(ArgsError::InvalidSort { raw: other.into() }),
    }
}

fn parse_detail_sort(raw: Option<&str>) -> Result<DetailSort, ArgsError> {
    match raw {
        None | Some("last-seen") => Ok(DetailSort::LastSeen),
        Some("correct") => Ok(DetailSort::CorrectPercent),
        Some("total") => Ok(DetailSort::Total),
        Some(other) => Err(ArgsError::InvalidSort { raw: other.into() }),
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

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn open_services(common: &CommonArgs) -> Result<AppServices, Box<dyn std::error::Error>> {
    prepare_sqlite_file(&common.db_url)?;
    let services =
        AppServices::new_sqlite(&common.db_url, Clock::system(), QuizSettings::default()).await?;
    Ok(services)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let mut iter = argv.into_iter().skip(1);
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    match parsed {
        Args::Play { common, request } => {
            let services = open_services(&common).await?;
            play::run(&services, common.user, request).await?;
        }
        Args::Profile { common } => {
            let services = open_services(&common).await?;
            let profile = services.stats().profile(&common.user).await?;
            report::print_profile(&common.user, &profile);
        }
        Args::Collection {
            common,
            subcategory,
            sort,
            order,
        } => {
            let services = open_services(&common).await?;
            let collection = services.collection();
            match subcategory {
                Some(subcategory) => {
                    let sort = parse_detail_sort(sort.as_deref())?;
                    let detail = collection
                        .detail(&common.user, &subcategory, sort, order)
                        .await?;
                    report::print_collection_detail(&detail);
                }
                None => {
                    let sort = parse_overview_sort(sort.as_deref())?;
                    let groups = collection.overview(&common.user, sort, order).await?;
                    report::print_collection_overview(&groups);
                }
            }
        }
        Args::DemoSeed { common } => {
            let services = open_services(&common).await?;
            let inserted = seed::insert_demo_questions(services.questions().as_ref()).await?;
            println!("Inserted {inserted} demo questions into {}", common.db_url);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
