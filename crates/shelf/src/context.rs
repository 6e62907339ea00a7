//! Shared per-server state.

use std::time::Duration;

use shelf_http::ReadConfig;
use shelf_store::FileStore;

/// Default socket receive timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a connection handler needs: the store plus read tuning.
///
/// Built once at startup and borrowed by every connection in turn; the
/// server owns exactly one.
pub struct ServerContext<S> {
    store: S,
    read_config: ReadConfig,
    read_timeout: Option<Duration>,
}

impl<S: FileStore> ServerContext<S> {
    /// Context with default read tuning and timeout.
    pub fn new(store: S) -> Self {
        Self {
            store,
            read_config: ReadConfig::default(),
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }

    /// Override the receive timeout; `None` disables it.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Override socket read chunk sizes.
    #[must_use]
    pub fn with_read_config(mut self, config: ReadConfig) -> Self {
        self.read_config = config;
        self
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Socket read chunk sizes.
    #[must_use]
    pub fn read_config(&self) -> &ReadConfig {
        &self.read_config
    }

    /// Socket receive timeout, if any.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }
}
