//! xnacos for Rust: the host-runtime adapter over xnacos-core.
//! Marshals untyped construction arguments, drives the async core from synchronous script calls.

pub mod module;
pub mod params;

pub use module::{HostModule, ScriptClient, RESERVED_KEY_PREFIX};
pub use params::NacosParams;
pub use xnacos_core::{ConnectionConfig, DiscoveryError, Instance};

use thiserror::Error;

/// Error surfaced to scripts. Discovery errors keep their message unmodified.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("runtime error: {0}")]
    Runtime(String),
}
