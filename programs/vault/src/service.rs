//! Serialized pool service
//!
//! A single task owns the `Pool` and drains a bounded mailbox, so operations
//! are applied one at a time in arrival order. `PoolHandle` is the cloneable
//! client side; every call carries the caller's principal and waits for its
//! own reply.

use crate::custody::Custody;
use crate::error::VaultError;
use crate::principal::Principal;
use crate::state::{HolderView, Pool, PoolSnapshot};
use pool_model::Settlement;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, VaultError>>;

/// Messages accepted by the pool task
#[derive(Debug)]
pub enum Command {
    Deposit { caller: Principal, amount: u128, reply: Reply<u128> },
    Withdraw { caller: Principal, shares: u128, reply: Reply<u128> },
    RequestWithdraw { caller: Principal, shares: u128, reply: Reply<u128> },
    Loan { caller: Principal, amount: u128, reply: Reply<()> },
    Repay { caller: Principal, principal: u128, returned: u128, reply: Reply<Settlement> },
    SetAuthorizedBorrower { caller: Principal, borrower: Principal, enabled: bool, reply: Reply<bool> },
    TransferOwnership { caller: Principal, new_owner: Principal, reply: Reply<()> },
    Snapshot { reply: Reply<PoolSnapshot> },
    Holder { holder: Principal, reply: Reply<HolderView> },
}

pub struct PoolService<C: Custody> {
    pool: Pool<C>,
    mailbox: mpsc::Receiver<Command>,
}

impl<C> PoolService<C>
where
    C: Custody + Send + 'static,
{
    /// Start the pool task on the current tokio runtime.
    ///
    /// The task ends when every handle is dropped and hands the pool back
    /// through the join handle.
    pub fn spawn(pool: Pool<C>, capacity: usize) -> (PoolHandle, JoinHandle<Pool<C>>) {
        let (sender, mailbox) = mpsc::channel(capacity.max(1));
        let service = Self { pool, mailbox };
        let task = tokio::spawn(service.run());
        (PoolHandle { sender }, task)
    }

    async fn run(mut self) -> Pool<C> {
        log::info!("Pool service started");
        while let Some(command) = self.mailbox.recv().await {
            self.handle(command);
        }
        log::info!("Pool service stopped");
        self.pool
    }

    fn handle(&mut self, command: Command) {
        let pool = &mut self.pool;
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::Deposit { caller, amount, reply } => {
                let _ = reply.send(pool.deposit(&caller, amount));
            }
            Command::Withdraw { caller, shares, reply } => {
                let _ = reply.send(pool.withdraw(&caller, shares));
            }
            Command::RequestWithdraw { caller, shares, reply } => {
                let _ = reply.send(pool.request_withdraw(&caller, shares));
            }
            Command::Loan { caller, amount, reply } => {
                let _ = reply.send(pool.loan(&caller, amount));
            }
            Command::Repay { caller, principal, returned, reply } => {
                let _ = reply.send(pool.repay(&caller, principal, returned));
            }
            Command::SetAuthorizedBorrower { caller, borrower, enabled, reply } => {
                let _ = reply.send(pool.set_authorized_borrower(&caller, borrower, enabled));
            }
            Command::TransferOwnership { caller, new_owner, reply } => {
                let _ = reply.send(pool.transfer_ownership(&caller, new_owner));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(Ok(pool.snapshot()));
            }
            Command::Holder { holder, reply } => {
                let _ = reply.send(Ok(pool.holder(&holder)));
            }
        }
    }
}

/// Client side of the pool service
#[derive(Debug, Clone)]
pub struct PoolHandle {
    sender: mpsc::Sender<Command>,
}

impl PoolHandle {
    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, VaultError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(make(reply))
            .await
            .map_err(|_| VaultError::ServiceUnavailable)?;
        response.await.map_err(|_| VaultError::ServiceUnavailable)?
    }

    pub async fn deposit(&self, caller: Principal, amount: u128) -> Result<u128, VaultError> {
        self.call(|reply| Command::Deposit { caller, amount, reply }).await
    }

    pub async fn withdraw(&self, caller: Principal, shares: u128) -> Result<u128, VaultError> {
        self.call(|reply| Command::Withdraw { caller, shares, reply }).await
    }

    pub async fn request_withdraw(&self, caller: Principal, shares: u128) -> Result<u128, VaultError> {
        self.call(|reply| Command::RequestWithdraw { caller, shares, reply }).await
    }

    pub async fn loan(&self, caller: Principal, amount: u128) -> Result<(), VaultError> {
        self.call(|reply| Command::Loan { caller, amount, reply }).await
    }

    pub async fn repay(&self, caller: Principal, principal: u128, returned: u128) -> Result<Settlement, VaultError> {
        self.call(|reply| Command::Repay { caller, principal, returned, reply }).await
    }

    pub async fn set_authorized_borrower(
        &self,
        caller: Principal,
        borrower: Principal,
        enabled: bool,
    ) -> Result<bool, VaultError> {
        self.call(|reply| Command::SetAuthorizedBorrower { caller, borrower, enabled, reply })
            .await
    }

    pub async fn transfer_ownership(&self, caller: Principal, new_owner: Principal) -> Result<(), VaultError> {
        self.call(|reply| Command::TransferOwnership { caller, new_owner, reply }).await
    }

    pub async fn snapshot(&self) -> Result<PoolSnapshot, VaultError> {
        self.call(|reply| Command::Snapshot { reply }).await
    }

    pub async fn holder(&self, holder: Principal) -> Result<HolderView, VaultError> {
        self.call(|reply| Command::Holder { holder, reply }).await
    }
}
