//! Keeper configuration

use anyhow::{Context, Result};
use liquidity_vault::{MemoryCustody, PoolParams, Principal, RepayMode, DEFAULT_FLASH_FEE_RATE, DEFAULT_MAILBOX_CAPACITY};
use serde::{Deserialize, Serialize};

/// Starting asset balance for one account of the in-memory ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub holder: Principal,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Account holding pool custody
    pub pool_address: Principal,

    /// Principal allowed to manage borrowers
    pub owner: Principal,

    /// Borrowers enabled at startup
    pub authorized_borrowers: Vec<Principal>,

    pub flash_fee_rate: u64,

    pub repay_mode: RepayMode,

    /// Polling interval in seconds
    pub poll_interval_secs: u64,

    /// How many holders to list when demand exceeds custody
    pub demand_report_limit: usize,

    /// Pool service mailbox size
    pub mailbox_capacity: usize,

    pub genesis_balances: Vec<GenesisBalance>,
}

impl Config {
    /// Load configuration from the TOML file named by `POOL_KEEPER_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("POOL_KEEPER_CONFIG")
            .unwrap_or_else(|_| "pool-keeper.toml".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let config_str = std::fs::read_to_string(expanded.as_ref())
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Single-process setup with one funded holder and one borrower
    pub fn default_local() -> Self {
        let holder = Principal::new([3u8; 32]);
        let borrower = Principal::new([4u8; 32]);
        Self {
            pool_address: Principal::new([1u8; 32]),
            owner: Principal::new([2u8; 32]),
            authorized_borrowers: vec![borrower],
            flash_fee_rate: DEFAULT_FLASH_FEE_RATE,
            repay_mode: RepayMode::Pull,
            poll_interval_secs: 5,
            demand_report_limit: 10,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            genesis_balances: vec![
                GenesisBalance { holder, amount: 1_000_000 },
                GenesisBalance { holder: borrower, amount: 100_000 },
            ],
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_local();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        let expanded = shellexpand::tilde(path);
        std::fs::write(expanded.as_ref(), toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }

    pub fn params(&self) -> PoolParams {
        PoolParams {
            flash_fee_rate: self.flash_fee_rate,
            repay_mode: self.repay_mode,
        }
    }

    /// In-memory asset ledger seeded with the genesis balances
    pub fn build_custody(&self) -> Result<MemoryCustody> {
        let balances = self
            .genesis_balances
            .iter()
            .map(|g| (g.holder, u128::from(g.amount)));
        MemoryCustody::with_balances(self.pool_address, balances)
            .context("Failed to seed genesis balances")
    }
}
