//! Feedforge CLI - ingest vendor product feeds into SQLite
//!
//! # Main Commands
//!
//! ```bash
//! feedforge run --url https://vendor.example/csv/    # Full ingestion pipeline
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! feedforge parse feed.csv          # Parse + normalize a local feed to JSON
//! feedforge validate feed.csv       # Show validation issues for a local feed
//! ```

use clap::{Parser, Subcommand};
use feedforge::{
    normalize_table, parse_feed, run, validate_product, AnthropicClient, MockTitleGenerator,
    PipelineConfig, TitleGenerator,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "feedforge")]
#[command(about = "Ingest, clean and store vendor product feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: download feed, normalize, validate, improve titles, store
    Run {
        /// Feed endpoint URL
        #[arg(long, env = "FEED_URL")]
        url: String,

        /// SQLite database path
        #[arg(long, env = "FEEDFORGE_DB", default_value = "products.db")]
        db: String,

        /// Download timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        /// Field delimiter
        #[arg(short, long, default_value = ";")]
        delimiter: char,

        /// Declared feed encoding (utf-8, iso-8859-1, windows-1252)
        #[arg(long, default_value = "utf-8")]
        encoding: String,

        /// Use the heuristic mock generator instead of the Anthropic API
        #[arg(long)]
        mock_ai: bool,
    },

    /// Parse and normalize a local feed file, output canonical records as JSON
    Parse {
        /// Input feed file
        input: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ";")]
        delimiter: char,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show validation issues for a local feed file
    Validate {
        /// Input feed file
        input: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ";")]
        delimiter: char,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            url,
            db,
            timeout,
            delimiter,
            encoding,
            mock_ai,
        } => cmd_run(url, db, timeout, delimiter, encoding, mock_ai).await,

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()).await,

        Commands::Validate { input, delimiter } => cmd_validate(&input, delimiter),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_run(
    url: String,
    db: String,
    timeout: u64,
    delimiter: char,
    encoding: String,
    mock_ai: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let generator: Box<dyn TitleGenerator> = if mock_ai {
        eprintln!("🤖 Using mock title generator (no API calls)");
        Box::new(MockTitleGenerator)
    } else {
        Box::new(AnthropicClient::from_env()?)
    };

    let config = PipelineConfig::new(url, db)
        .with_timeout(Duration::from_secs(timeout))
        .with_delimiter(delimiter)
        .with_encoding(&encoding);

    let report = run(&config, generator.as_ref()).await?;

    eprintln!("\n📊 Summary:");
    eprintln!("   Total products: {}", report.total);
    eprintln!("   Issues flagged: {}", report.flagged);
    eprintln!("   Titles improved: {}", report.improved);
    if let Some(ref example) = report.example_improved {
        eprintln!("   Example improved title: {}", example);
    }
    eprintln!("\n✨ Done!");
    Ok(())
}

async fn cmd_parse(
    input: &Path,
    delimiter: char,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing feed: {}", input.display());

    let text = fs::read_to_string(input)?;
    let table = parse_feed(&text, delimiter)?;
    eprintln!("   Columns: {}", table.headers.join(", "));
    eprintln!("✅ Parsed {} records", table.rows.len());

    let products = normalize_table(&table);
    let json = serde_json::to_string_pretty(&products)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path, delimiter: char) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let text = fs::read_to_string(input)?;
    let table = parse_feed(&text, delimiter)?;
    let products = normalize_table(&table);

    let mut clean = 0;
    let mut flagged = 0;

    for product in &products {
        let issues = validate_product(product);
        if issues.is_empty() {
            clean += 1;
        } else {
            flagged += 1;
            if flagged <= 10 {
                eprintln!("\n❌ Product '{}':", product.id);
                for code in &issues {
                    eprintln!("   - {}", code.as_str());
                }
            }
        }
    }

    eprintln!("\n📊 Results: {} clean, {} flagged", clean, flagged);

    if flagged > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
