use anyhow::Result;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use footfall::config::Config;
use footfall::models::ClientIdentity;
use footfall::storage;

#[derive(Parser)]
#[command(name = "footfall-admin")]
#[command(about = "Footfall visit ledger management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the ledger tables if they are missing
    Init,
    /// Show the running total and table sizes
    Status,
    /// Show the last counted visit for an identity
    Lookup {
        /// Client IP as recorded (or "unknown")
        ip: String,
        /// Exact user-agent string as recorded
        user_agent: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = storage::connect(&config.database).await?;

    // Ensure database is initialized
    storage.ensure_schema().await?;

    match cli.command {
        Commands::Init => {
            println!("✓ Ledger schema is in place");
        }
        Commands::Status => {
            let stats = storage.stats().await?;
            println!("Total visits:   {}", stats.count);
            println!("Counter rows:   {}", stats.counter_rows);
            println!("Visit records:  {}", stats.record_rows);
        }
        Commands::Lookup { ip, user_agent } => {
            let identity = ClientIdentity::new(Some(ip.as_str()), Some(user_agent.as_str()));
            match storage.get_record(&identity).await? {
                Some(record) => {
                    let seen = DateTime::from_timestamp(record.last_visit_at, 0)
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| record.last_visit_at.to_string());
                    println!(
                        "Last counted visit for {} / {}: {}",
                        record.ip, record.user_agent, seen
                    );
                }
                None => {
                    println!(
                        "⚠ No visit recorded for {} / {}",
                        identity.ip, identity.user_agent
                    );
                }
            }
        }
    }

    Ok(())
}
