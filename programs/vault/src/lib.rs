//! Pooled-liquidity vault ledger
//!
//! Depositors receive proportional claim-shares; authorized borrowers draw
//! down liquidity and later return principal plus or minus a trading result,
//! which every shareholder absorbs through NAV per share.
//!
//! The ledger holds `custody == reserve - total_loan` after every completed
//! operation, and a failed operation leaves no trace.

pub mod principal;
pub mod custody;
pub mod error;
pub mod state;
pub mod instructions;
pub mod entrypoint;
pub mod service;


pub use principal::*;
pub use custody::*;
pub use error::*;
pub use state::*;
pub use service::*;
pub use pool_model::Settlement;
