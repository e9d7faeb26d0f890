pub mod pool;
pub mod gateway;
pub mod snapshot;

pub use pool::*;
pub use gateway::*;
pub use snapshot::*;
