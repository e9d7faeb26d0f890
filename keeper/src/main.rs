//! Liquidity Pool Keeper
//!
//! Hosts the pool service and watches its liquidity: polls snapshots, tracks
//! registered withdrawal demand and warns when custody cannot cover it.
//!
//! `pool-keeper init [path]` writes a default config and exits.

mod config;
mod demand;
mod liquidity;

use anyhow::{Context, Result};
use config::Config;
use demand::DemandQueue;
use liquidity::{LiquidityReport, LiquidityStatus};
use liquidity_vault::{Pool, PoolHandle, PoolService};
use std::time::Duration;
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("init") {
        let path = args.next().unwrap_or_else(|| "pool-keeper.toml".to_string());
        return Config::write_default(&path);
    }

    log::info!("Starting Liquidity Pool Keeper");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default local config", e);
        Config::default_local()
    });

    log::info!("Pool custodian: {}", config.pool_address);
    log::info!("Pool owner: {}", config.owner);

    let custody = config.build_custody()?;
    let pool = Pool::with_params(custody, config.owner, config.params());
    let (handle, task) = PoolService::spawn(pool, config.mailbox_capacity);

    for borrower in &config.authorized_borrowers {
        handle
            .set_authorized_borrower(config.owner, *borrower, true)
            .await
            .context(format!("Failed to authorize borrower {}", borrower))?;
        log::info!("Authorized borrower {}", borrower);
    }

    let mut demand = DemandQueue::new();

    log::info!("Keeper service started. Monitoring pool liquidity...");

    // Main event loop
    let mut interval = time::interval(Duration::from_secs(config.poll_interval_secs.max(1)));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = poll_liquidity(&handle, &mut demand, &config).await {
                    log::error!("Error polling pool liquidity: {:#}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutdown requested");
                break;
            }
        }
    }

    drop(handle);
    let pool = task.await.context("Pool service task failed")?;
    log::info!(
        "Final state: reserve {}, total loan {}, supply {}",
        pool.reserve(),
        pool.total_loan(),
        pool.total_supply()
    );

    Ok(())
}

/// Fetch a snapshot, refresh the demand queue and report liquidity
async fn poll_liquidity(handle: &PoolHandle, demand: &mut DemandQueue, config: &Config) -> Result<()> {
    let snapshot = handle.snapshot().await.context("Failed to fetch pool snapshot")?;

    if log::log_enabled!(log::Level::Debug) {
        let json = serde_json::to_string(&snapshot).context("Failed to serialize snapshot")?;
        log::debug!("Pool snapshot: {}", json);
    }

    let report = LiquidityReport::from_snapshot(&snapshot);
    // Prefunded repayments may sit above the accounted balance until booked
    if report.custody < report.reserve.saturating_sub(report.total_loan) {
        log::error!(
            "Custody {} does not match reserve {} - total loan {}",
            report.custody,
            report.reserve,
            report.total_loan
        );
    }

    demand.refresh(&snapshot);
    if !demand.is_empty() {
        log::debug!("Demand queue size: {}", demand.len());

        if let Some((holder, shares)) = demand.peek() {
            log::debug!("Largest request: {} shares from {}", shares, holder);
        }
    }

    match report.status() {
        LiquidityStatus::Idle => {
            log::debug!("No withdrawal demand (custody {})", report.custody);
        }
        LiquidityStatus::Serviceable => {
            log::info!(
                "{} holders can withdraw now: {} shares worth {}, custody {}",
                demand.len(),
                report.pending_shares,
                report.pending_value,
                report.custody
            );
        }
        LiquidityStatus::Short(shortfall) => {
            log::warn!(
                "Withdrawal demand exceeds available liquidity by {}: {} shares worth {}, available {}, utilization {} bps",
                shortfall,
                report.pending_shares,
                report.pending_value,
                report.available,
                report.utilization_bps
            );
            for (holder, shares) in demand.top(config.demand_report_limit) {
                log::warn!("  {} waiting on {} shares", holder, shares);
            }
        }
    }

    Ok(())
}
