//! Pool instruction handlers

pub mod deposit;
pub mod withdraw;
pub mod request_withdraw;
pub mod loan;
pub mod repay;
pub mod admin;

pub use deposit::*;
pub use withdraw::*;
pub use request_withdraw::*;
pub use loan::*;
pub use repay::*;
pub use admin::*;

// Note: handlers are called from the `Pool` methods in entrypoint.rs, which
// own logging of the instruction name.
