mod config;
mod http;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use config::AppConfig;
use directory::{AppState, employees, seed};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::{Level, info};

#[derive(Parser, Debug)]
#[command(name = "directory-server", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Apply pending migrations, then run the HTTP server
    Serve {
        #[arg(long, env = "BIND", default_value = "127.0.0.1:8080")]
        bind: String,
    },
    /// Run migrations
    Migrate {
        #[arg(long, value_enum, default_value_t = MigrateAction::Up)]
        action: MigrateAction,
    },
    /// Provision the first admin and sample catalog entries
    Seed {
        #[arg(long, env = "SEED_ADMIN_USERNAME", default_value = "admin")]
        admin_username: String,
        #[arg(long, env = "SEED_ADMIN_PASSWORD")]
        admin_password: String,
    },
    /// Create an employee account
    AddEmployee {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        admin: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MigrateAction {
    Up,
    Down,
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    info!(environment = %config.environment, "configuration loaded");

    let db = Database::connect(config.connect_options())
        .await
        .context("failed to connect to DATABASE_URL")?;

    match cli.cmd {
        Cmd::Migrate { action } => {
            match action {
                MigrateAction::Up => Migrator::up(&db, None).await?,
                MigrateAction::Down => Migrator::down(&db, None).await?,
                MigrateAction::Reset => Migrator::reset(&db).await?,
            }
            info!(?action, "migrations applied");
            Ok(())
        }
        Cmd::Seed {
            admin_username,
            admin_password,
        } => {
            Migrator::up(&db, None).await?;
            let report = seed::seed_directory(&db, &admin_username, &admin_password)
                .await
                .map_err(|err| anyhow!("seed failed: {}", err))?;
            println!(
                "admin created: {}, departments created: {}, roles created: {}",
                report.admin_created, report.departments_created, report.roles_created
            );
            Ok(())
        }
        Cmd::AddEmployee {
            username,
            password,
            admin,
        } => {
            let employee = employees::provision_employee(&db, &username, &password, admin)
                .await
                .map_err(|err| anyhow!("could not add employee {:?}: {}", username, err))?;
            println!("employee {} created with id {}", employee.username, employee.id);
            Ok(())
        }
        Cmd::Serve { bind } => {
            Migrator::up(&db, None).await?;
            let addr: SocketAddr = bind
                .parse()
                .with_context(|| format!("invalid bind address {:?}", bind))?;
            let state = AppState::new(Arc::new(db), Arc::new(config.auth));
            http::serve(addr, state).await
        }
    }
}
