// Domain models for the daemon client and monitor state

mod container;
mod endpoint;

pub use container::{ContainerDescriptor, ContainerRecord, ContainerStats, CpuSample, UNKNOWN_NAME};
pub use endpoint::{DEFAULT_SOCKET_PATH, DaemonAddress, DaemonEndpoint};
