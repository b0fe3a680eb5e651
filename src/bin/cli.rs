//! Marryroute CLI
//!
//! Command-line front-end over the extraction engine and the profile store.

use anyhow::Result;
use clap::{Parser as ClapParser, Subcommand};

use marryroute::commit::Planner;
use marryroute::parser::Parser;
use marryroute::storage::Storage;
use marryroute::summary::render_summary;

#[derive(ClapParser)]
#[command(name = "marryroute")]
#[command(about = "Korean wedding planning assistant core CLI")]
#[command(version)]
struct Cli {
    /// Database path
    #[arg(long, env = "MARRYROUTE_DB_PATH", default_value = "marryroute.db")]
    db_path: String,

    /// User id (single-user installs keep the default)
    #[arg(long, default_value = "1")]
    user: i64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse text and print the extracted facts as JSON, without committing
    Parse {
        /// Input text
        text: String,
        /// Reference date for year inference (YYYY-MM-DD, default today)
        #[arg(long)]
        today: Option<String>,
    },
    /// Parse text and merge the facts into the stored profile
    Update {
        /// Input text
        text: String,
        /// Show the would-be writes without touching storage
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the stored profile and its rendered summary
    Show,
    /// List summary history
    Summaries {
        /// Maximum rows to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
        /// Promote this summary id back to latest
        #[arg(long)]
        promote: Option<i64>,
    },
}

fn build_parser(today: Option<&str>) -> Result<Parser> {
    match today {
        Some(s) => {
            let date = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
            Ok(Parser::new(date))
        }
        None => Ok(Parser::for_today()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { text, today } => {
            let parser = build_parser(today.as_deref())?;
            let fact = parser.parse(&text);
            println!("{}", serde_json::to_string_pretty(&fact)?);
        }
        Commands::Update { text, dry_run } => {
            let parser = build_parser(None)?;
            if dry_run {
                let fact = parser.parse(&text);
                let plan = Planner::plan(&fact);
                println!("=== DRY RUN ===");
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }
            let storage = Storage::open(&cli.db_path)?;
            let planner = Planner::new(storage);
            let result = planner.update_from_text(cli.user, &text, &parser)?;
            if result.outcome.reinput.is_empty() {
                println!("[재입력요청] 없음");
            } else {
                println!("[재입력요청]");
                for msg in &result.outcome.reinput {
                    println!("- {msg}");
                }
            }
            println!("{}", serde_json::to_string_pretty(&result.outcome.profile)?);
            println!("최신 요약 저장 완료 (summary_id={})", result.outcome.summary_id);
        }
        Commands::Show => {
            let storage = Storage::open(&cli.db_path)?;
            let planner = Planner::new(storage);
            let snapshot = planner.snapshot(cli.user)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            println!("{}", render_summary(&snapshot));
        }
        Commands::Summaries { limit, promote } => {
            let storage = Storage::open(&cli.db_path)?;
            let planner = Planner::new(storage);
            if let Some(id) = promote {
                if planner.promote_summary(cli.user, id)? {
                    println!("summary_id={id} 최신본으로 승격");
                } else {
                    println!("대상 없음: summary_id={id}");
                }
            }
            for row in planner.list_summaries(cli.user, limit)? {
                let flag = if row.latest { "*" } else { " " };
                let preview: String = row.content.chars().take(80).collect();
                println!("{flag} #{} | {} | {}", row.summary_id, row.updated_at, preview);
            }
        }
    }

    Ok(())
}
