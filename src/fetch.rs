//! Dataset fetch: one HTTP GET of the world-atlas topology document.

use serde_json::Value;

use crate::world::topology::WorldTopology;

/// Upstream world borders dataset at 50m resolution.
pub const WORLD_ATLAS_URL: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-50m.json";

/// Dataset fetch failures. Terminal for the session that issued the
/// fetch; there is no retry.
#[derive(Debug)]
pub enum FetchError {
    /// Transport-level failure or body decode failure.
    Http(reqwest::Error),
    /// The server answered with a non-success status.
    Status(u16),
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl FetchError {
    /// Human-readable message surfaced in the session's failed state.
    pub fn message(&self) -> String {
        match self {
            Self::Http(err) => format!("failed to load map: {err}"),
            Self::Status(code) => format!("failed to load map: HTTP {code}"),
        }
    }
}

/// Fetches and decodes the world topology. A body that is valid JSON but
/// not a topology decodes to an empty topology; only transport and status
/// failures are errors.
pub async fn load_world(client: &reqwest::Client, url: &str) -> Result<WorldTopology, FetchError> {
    tracing::debug!(url, "fetching world topology");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(code = status.as_u16(), "world topology fetch rejected");
        return Err(FetchError::Status(status.as_u16()));
    }
    let value: Value = response.json().await?;
    Ok(WorldTopology::from_value(value))
}
