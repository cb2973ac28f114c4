//! FinOps Engine
//!
//! Scheduled AWS cost-optimization pipeline: collects an account's resource
//! inventory, runs it through a library of cost-saving heuristics, and
//! records the resulting recommendations against each workspace. Can run as
//! a long-lived scheduled service or print the latest status and exit,
//! mirroring the teacher's `pricing-collector` subcommand shape.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use domain_finops::{FinopsService, PgFinopsRepository};
use eyre::Result;
use tracing::info;

mod cloud_client;
mod collectors;
mod config;
mod error;
mod job;
mod scheduler;

use cloud_client::live::LiveCloudClient;
use cloud_client::mock::MockCloudClient;
use cloud_client::CloudClient;
use config::Config;
use job::{BoxCloudClientFuture, CloudClientFactory};

#[derive(Parser)]
#[command(name = "finops-engine")]
#[command(about = "Scheduled cloud cost collection and optimization recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the scheduler and block forever.
    Run,
    /// Print the latest job run per workspace and exit.
    Status,
}

/// Builds a freshly scoped client per workspace per tick: a live,
/// role-assumed client in production, or the deterministic fixture client
/// when `FINOPS_MOCK_MODE` is set.
struct DefaultClientFactory {
    mock_mode: bool,
}

impl CloudClientFactory for DefaultClientFactory {
    fn build(&self, role_arn: &str, region: &str) -> BoxCloudClientFuture {
        let role_arn = role_arn.to_string();
        let region = region.to_string();
        let mock_mode = self.mock_mode;
        Box::pin(async move {
            if mock_mode {
                let seed = {
                    use std::hash::{Hash, Hasher};
                    let mut hasher = std::collections::hash_map::DefaultHasher::new();
                    role_arn.hash(&mut hasher);
                    hasher.finish()
                };
                Arc::new(MockCloudClient::new(seed, chrono::Utc::now())) as Arc<dyn CloudClient>
            } else {
                Arc::new(LiveCloudClient::new(role_arn, region).await) as Arc<dyn CloudClient>
            }
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    let config = Config::from_env().map_err(|err| eyre::eyre!(err.to_string()))?;
    init_tracing(&environment);
    observability::init_metrics();

    info!("Connecting to database...");
    let db =
        database::postgres::connect_from_config_with_retry(config.database.clone(), None).await?;

    database::postgres::run_migrations::<migration::Migrator>(&db, "finops-engine").await?;

    let pg_repository = PgFinopsRepository::new(db);
    let repository = Arc::new(pg_repository.clone());
    let service = FinopsService::new(pg_repository);
    let client_factory: Arc<dyn CloudClientFactory> = Arc::new(DefaultClientFactory {
        mock_mode: config.mock_mode,
    });

    let cli = Cli::parse();
    match cli.command {
        Commands::Run => {
            info!(
                cron = %config.scheduler_cron,
                mock_mode = config.mock_mode,
                "starting finops engine"
            );
            scheduler::run(
                repository,
                client_factory,
                config.aws_default_region.clone(),
                &config.scheduler_cron,
            )
            .await?;
        }
        Commands::Status => {
            print_status(&service).await?;
        }
    }

    Ok(())
}

async fn print_status(service: &FinopsService<PgFinopsRepository>) -> Result<()> {
    let workspaces = service.list_workspaces().await?;
    if workspaces.is_empty() {
        println!("No workspaces configured.");
        return Ok(());
    }

    for workspace in workspaces {
        match service.latest_job_run(workspace.id).await? {
            Some(job_run) => {
                println!(
                    "{} ({}): {:?} — started {} recommendations={}",
                    workspace.name, workspace.id, job_run.status, job_run.started_at, job_run.recommendations_found
                );
            }
            None => {
                println!("{} ({}): no job runs yet", workspace.name, workspace.id);
            }
        }
    }
    Ok(())
}
