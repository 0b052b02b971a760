//! Portfolio Hub - CLI Tool
//!
//! Command-line interface for reading the portfolio API, announcing changes
//! and watching them arrive the way the public site does.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use portfolio_hub::content::MessageFilter;
use portfolio_hub::events::{ChangeType, Interest, CHANGE_CHANNEL_KEY, DEFAULT_POLL_INTERVAL};
use portfolio_hub::site::{PortfolioClient, PublicSite, SiteSections};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "portfolio-cli")]
#[command(about = "CLI for the Portfolio API")]
struct Cli {
    /// Portfolio API URL
    #[arg(long, env = "PORTFOLIO_URL", default_value = "http://localhost:8000")]
    server: String,

    /// Admin bearer token (from `login`)
    #[arg(long, env = "PORTFOLIO_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in as the admin and print the access token
    Login {
        #[arg(short, long, default_value = "admin")]
        username: String,

        #[arg(short, long, env = "ADMIN_PASSWORD")]
        password: String,
    },

    /// Print one content section as JSON
    Show {
        section: Section,
    },

    /// Announce a change category (admin)
    Notify {
        /// about, highlights, experiences, projects, skills, contact or all
        change_type: ChangeType,
    },

    /// Follow change notifications and print refreshed sections
    Watch {
        /// Comma-separated categories to report (default: all)
        #[arg(long)]
        types: Option<String>,

        /// Poll period in milliseconds
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
        interval_ms: u64,
    },

    /// List contact messages (admin)
    Messages {
        #[arg(long)]
        unread_only: bool,

        #[arg(short, long, default_value = "100")]
        limit: usize,

        #[arg(long, default_value = "0")]
        offset: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Section {
    About,
    Highlights,
    Experiences,
    Projects,
    Featured,
    Skills,
    Contact,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,portfolio_hub=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut client = PortfolioClient::new(&cli.server)?;
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Login { username, password } => {
            let resp = client.login(&username, &password).await?;
            println!("{}", resp.access_token);
        }
        Commands::Show { section } => handle_show(&client, section).await?,
        Commands::Notify { change_type } => {
            let notification = client.notify(change_type).await?;
            println!(
                "Announced {} at {}",
                notification.change_type, notification.timestamp
            );
        }
        Commands::Watch { types, interval_ms } => {
            let interest = match types {
                Some(raw) => Interest::from(ChangeType::parse_list(&raw)?),
                None => Interest::everything(),
            };
            handle_watch(client, interest, Duration::from_millis(interval_ms.max(1))).await?
        }
        Commands::Messages {
            unread_only,
            limit,
            offset,
        } => {
            let filter = MessageFilter {
                offset,
                limit,
                unread_only,
            };
            let messages = client.messages(&filter).await?;

            println!("{:<6} {:<6} {:<28} {}", "ID", "READ", "FROM", "SUBJECT");
            println!("{}", "-".repeat(80));
            for message in messages {
                println!(
                    "{:<6} {:<6} {:<28} {}",
                    message.id,
                    if message.is_read { "yes" } else { "no" },
                    message.email,
                    message.subject.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn handle_show(client: &PortfolioClient, section: Section) -> Result<()> {
    match section {
        Section::About => print_json(&client.about().await?),
        Section::Highlights => print_json(&client.highlights().await?),
        Section::Experiences => print_json(&client.experiences().await?),
        Section::Projects => print_json(&client.projects(None).await?),
        Section::Featured => print_json(&client.projects(Some(true)).await?),
        Section::Skills => print_json(&client.skills_grouped().await?),
        Section::Contact => print_json(&client.contact_info().await?),
    }
}

fn summary(sections: &SiteSections) -> String {
    format!(
        "about=\"{}\" highlights={} experiences={} projects={} skill_categories={} contact={}",
        sections.about.data().name,
        sections.highlights.data().len(),
        sections.experiences.data().len(),
        sections.projects.data().len(),
        sections.skills.data().len(),
        sections.contact.data().email,
    )
}

async fn handle_watch(client: PortfolioClient, interest: Interest, period: Duration) -> Result<()> {
    let site = PublicSite::connect(client, CHANGE_CHANNEL_KEY, period);
    site.sections.settled().await;
    println!("initial: {}", summary(&site.sections));
    for (label, error) in site.sections.errors() {
        eprintln!("  {} unavailable, showing fallback: {}", label, error);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _subscription = site.hub.subscribe(interest, move |change_type: ChangeType| {
        let _ = tx.send(change_type);
    });

    loop {
        tokio::select! {
            Some(change_type) = rx.recv() => {
                site.sections.settled().await;
                println!("{}: {}", change_type, summary(&site.sections));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
