//! Schema fetching boundary.

use crate::error::FelError;

/// Fetches a schema blob by name from wherever schemas live.
///
/// The cache calls this on a miss or a stale entry; tests inject fixture
/// XSDs through it.
pub trait SchemaFetcher: Send + Sync {
    /// Fetch `name` and return `(content, source_url)`.
    fn fetch(&self, name: &str) -> Result<(String, String), FelError>;
}

/// HTTPS fetcher against the configured schema base URL.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSchemaFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpSchemaFetcher {
    pub fn new(
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, FelError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FelError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[cfg(feature = "http")]
impl SchemaFetcher for HttpSchemaFetcher {
    fn fetch(&self, name: &str) -> Result<(String, String), FelError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), name);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FelError::Http(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().map_err(|e| FelError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(FelError::Http(format!("HTTP {status} al obtener {url}")));
        }
        Ok((body, url))
    }
}

/// Fetcher backed by a fixed set of in-memory schemas.
///
/// Used in tests and air-gapped deployments that embed the SAT schemas.
#[derive(Debug, Default, Clone)]
pub struct StaticSchemaFetcher {
    schemas: std::collections::HashMap<String, String>,
}

impl StaticSchemaFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.schemas.insert(name.into(), content.into());
        self
    }
}

impl SchemaFetcher for StaticSchemaFetcher {
    fn fetch(&self, name: &str) -> Result<(String, String), FelError> {
        match self.schemas.get(name) {
            Some(content) => Ok((content.clone(), format!("static://{name}"))),
            None => Err(FelError::SchemaLoad {
                name: name.to_string(),
                reason: "no registrado en el fetcher estático".into(),
            }),
        }
    }
}
