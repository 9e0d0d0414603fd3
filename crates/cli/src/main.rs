//! Bloom Bouquet CLI - database migrations and shop maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! bb-cli migrate
//!
//! # Create a super admin (a password is generated when -p is omitted)
//! bb-cli admin create -e owner@bloombouquet.id -n "Shop Owner" -r super_admin
//!
//! # Reset an admin password
//! bb-cli admin reset-password -e owner@bloombouquet.id
//!
//! # Give slugs to rows that have none
//! bb-cli slugs backfill all
//!
//! # Run the expiry sweeps once
//! bb-cli orders check-expired
//! bb-cli orders expire-qr
//!
//! # Load categories and products from YAML
//! bb-cli seed catalog -f seeds/catalog.yaml
//! ```
//!
//! Every command reads `ADMIN_DATABASE_URL` (or `DATABASE_URL`) and exits
//! with status 1 on failure.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "bb-cli")]
#[command(author, version, about = "Bloom Bouquet maintenance tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Slug maintenance
    Slugs {
        #[command(subcommand)]
        action: SlugAction,
    },
    /// Run the unpaid-order sweeps once
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Load data from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin role (`super_admin`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Password; generated and printed when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Set a new password for an existing admin
    ResetPassword {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// New password; generated and printed when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum SlugAction {
    /// Assign slugs to rows with a missing or blank slug
    Backfill {
        #[arg(value_enum, default_value_t = SlugTarget::All)]
        target: SlugTarget,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SlugTarget {
    Products,
    Categories,
    All,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Cancel orders whose payment deadline has passed
    CheckExpired,
    /// Cancel QRIS orders whose code has expired
    ExpireQr,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Categories and products from a YAML file
    Catalog {
        /// Path to the YAML file
        #[arg(short, long, default_value = "seeds/catalog.yaml")]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bb_cli=info,bloom_bouquet_admin=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::admin::create(&email, &name, &role, password.as_deref()).await?;
            }
            AdminAction::ResetPassword { email, password } => {
                commands::admin::reset_password(&email, password.as_deref()).await?;
            }
        },
        Commands::Slugs {
            action: SlugAction::Backfill { target },
        } => {
            use bloom_bouquet_admin::db::slugs::SlugTable;
            let tables: &[SlugTable] = match target {
                SlugTarget::Products => &[SlugTable::Products],
                SlugTarget::Categories => &[SlugTable::Categories],
                SlugTarget::All => &[SlugTable::Categories, SlugTable::Products],
            };
            commands::slugs::backfill(tables).await?;
        }
        Commands::Orders { action } => {
            use bloom_bouquet_admin::services::SweepKind;
            let kind = match action {
                OrderAction::CheckExpired => SweepKind::CheckExpired,
                OrderAction::ExpireQr => SweepKind::ExpireQr,
            };
            commands::orders::sweep(kind).await?;
        }
        Commands::Seed {
            target: SeedTarget::Catalog { file },
        } => commands::seed::catalog(&file).await?,
    }
    Ok(())
}
