//! Host runtime hooks invoked at lifecycle transitions.

/// Controls the host exposes to a worker generation.
pub trait WorkerHost: Send + Sync {
    /// Activate as soon as install finishes instead of waiting for the
    /// previous generation's pages to close.
    fn skip_waiting(&self);

    /// Start controlling every open page without waiting for a reload.
    fn claim_clients(&self);
}

/// Host with no page clients of its own; records the calls in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHost;

impl WorkerHost for LoggingHost {
    fn skip_waiting(&self) {
        tracing::debug!("skip_waiting");
    }

    fn claim_clients(&self) {
        tracing::debug!("claim_clients");
    }
}

impl<T: WorkerHost + ?Sized> WorkerHost for std::sync::Arc<T> {
    fn skip_waiting(&self) {
        (**self).skip_waiting();
    }

    fn claim_clients(&self) {
        (**self).claim_clients();
    }
}
