// Docker daemon client: one fresh connection per request, JSON decoding of the
// container list and one-shot stats endpoints.

mod error;
mod exchange;
mod list;
mod stats;
mod transport;

pub use error::{ConnectError, DaemonError, ExchangeError, ParseError};
pub use exchange::{MAX_RESPONSE_BYTES, extract_body, format_request};
pub use list::{MAX_ID_LEN, MAX_IMAGE_LEN, MAX_NAME_LEN, MAX_STATUS_LEN, decode_container_list};
pub use stats::{NETWORK_INTERFACE, decode_stats};
pub use transport::{Connection, connect};

use crate::models::{ContainerDescriptor, ContainerStats, DaemonEndpoint};
use tracing::instrument;

pub const CONTAINERS_PATH: &str = "/containers/json";

pub fn stats_path(container_id: &str) -> String {
    format!("/containers/{}/stats?stream=false", container_id)
}

/// Owns the endpoint configuration; every request goes through `&self`.
#[derive(Debug, Clone)]
pub struct DockerClient {
    endpoint: DaemonEndpoint,
}

impl DockerClient {
    pub fn new(endpoint: DaemonEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &DaemonEndpoint {
        &self.endpoint
    }

    /// Opens and closes one connection to check the daemon is reachable.
    pub async fn probe(&self) -> Result<(), ConnectError> {
        let conn = connect(&self.endpoint).await?;
        conn.close().await;
        Ok(())
    }

    /// One GET round trip; returns the response body text.
    pub async fn get(&self, path: &str) -> Result<String, DaemonError> {
        let mut conn = connect(&self.endpoint).await?;
        let request = format_request("GET", path, &self.endpoint.host_header());
        let body = conn.exchange(&request).await;
        conn.close().await;
        Ok(body?)
    }

    #[instrument(skip(self), fields(operation = "list_containers"))]
    pub async fn list_containers(
        &self,
        max_count: usize,
    ) -> Result<Vec<ContainerDescriptor>, DaemonError> {
        let body = self.get(CONTAINERS_PATH).await?;
        Ok(decode_container_list(&body, max_count)?)
    }

    #[instrument(skip(self), fields(operation = "container_stats"))]
    pub async fn container_stats(&self, container_id: &str) -> Result<ContainerStats, DaemonError> {
        let body = self.get(&stats_path(container_id)).await?;
        Ok(decode_stats(&body)?)
    }
}
