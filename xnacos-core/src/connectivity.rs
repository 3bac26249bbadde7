//! Transport failures (io, hyper, body) become `DiscoveryError::Connectivity` tagged with the failing step.

use crate::DiscoveryError;

pub trait ConnectivityExt<T> {
    /// `Err(e)` -> `Connectivity("<step> <server>: <e>")`.
    fn or_connectivity(self, step: &str, server: &str) -> Result<T, DiscoveryError>;
}

impl<T, E: std::fmt::Display> ConnectivityExt<T> for Result<T, E> {
    fn or_connectivity(self, step: &str, server: &str) -> Result<T, DiscoveryError> {
        self.map_err(|e| DiscoveryError::Connectivity(format!("{step} {server}: {e}")))
    }
}
