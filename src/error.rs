use thiserror::Error;

/// Errors from the certification infrastructure.
///
/// Rule defects never surface here — they are accumulated as
/// [`Finding`](crate::rules::Finding)s in the verdict. `FelError` is
/// reserved for the machinery around the rules: cache I/O, schema
/// fetching, and schema compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FelError {
    /// Schema could not be fetched and no cached copy exists.
    #[error("no se pudo cargar el esquema '{name}': {reason}")]
    SchemaLoad { name: String, reason: String },

    /// The cached or fetched XSD could not be compiled.
    #[error("esquema '{name}' inválido: {reason}")]
    SchemaCompile { name: String, reason: String },

    /// Cache directory or entry I/O failure.
    #[error("error de caché de esquemas: {0}")]
    Cache(String),

    /// HTTP transport failure.
    #[error("error HTTP: {0}")]
    Http(String),

    /// Configuration rejected at construction time.
    #[error("configuración inválida: {0}")]
    Config(String),
}

impl From<std::io::Error> for FelError {
    fn from(e: std::io::Error) -> Self {
        FelError::Cache(e.to_string())
    }
}
