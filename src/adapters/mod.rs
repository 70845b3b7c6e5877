pub mod router;
pub mod signals;
pub mod store;

pub use router::RouterClient;
pub use signals::{HttpSignalClient, SignalSource};
pub use store::{AccountFeed, PostgresStore};

#[cfg(test)]
pub use signals::MockSignalSource;
