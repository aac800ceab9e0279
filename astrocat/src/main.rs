use astrocat::config::{Args, Command};
use astrocat::{AdapterCollection, Config, telemetry};
use chrono::Utc;
use clap::Parser;
use tracing::info;

/// Actor recorded on rows touched by maintenance commands
const SYSTEM_ACTOR: &str = "system";

async fn run(command: Command, config: &Config, adapters: &AdapterCollection) -> anyhow::Result<()> {
    // Schema is brought up to date before any command touches the tables
    astrocat::migrator().run(adapters.pools().write()).await?;
    info!("Database migrations applied");

    match command {
        Command::Migrate => {}
        Command::ExpireMemberships => {
            let expired = adapters.membership.expire_overdue(Utc::now(), SYSTEM_ACTOR).await?;
            info!(expired, "Expired overdue memberships");
        }
        Command::PurgeAuditLogs { days } => {
            let days = days.unwrap_or(config.audit_retention_days);
            let deleted = adapters.audit_log.delete_old(days).await?;
            info!(deleted, days, "Purged old audit log entries");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry(config.enable_otel_export)?;
    tracing::debug!("{:?}", args);

    let pools = astrocat::connect(&config).await?;
    let adapters = AdapterCollection::new(pools.clone());

    let result = run(Config::command(&args), &config, &adapters).await;
    if let Err(e) = &result
        && let Some(err) = e.downcast_ref::<astrocat::Error>()
    {
        err.log();
    }

    pools.close().await;
    telemetry::shutdown_telemetry();
    result
}
