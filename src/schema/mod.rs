//! Schema validator — resolution, caching, and instance checking.
//!
//! A document maps to an XSD by kind (one schema for every DTE class, a
//! dedicated one for anulaciones). Blobs come through the time-bounded
//! on-disk cache; compiled schemas are memoized once per process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::ValidatorConfig;
use crate::error::FelError;

mod cache;
mod fetch;
mod validate;
mod xsd;

pub use cache::{CacheOutcome, SchemaCache, Sidecar};
pub use fetch::*;
pub use validate::validate_instance;
pub(crate) use validate::line_col;
pub use xsd::{AttrDecl, ChildDecl, CompiledSchema, ElementDecl};

/// Which schema a payload validates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// All DTE classes share the main document schema.
    Document,
    /// Anulaciones have their own schema.
    Anulacion,
}

impl SchemaKind {
    /// Schema file name under the configured base URL.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Document => "GT_Documento-0.2.0.xsd",
            Self::Anulacion => "GT_AnulacionDocumento-0.1.0.xsd",
        }
    }
}

/// Resolves schemas through the cache and memoizes the compiled form.
pub struct SchemaManager {
    cache: SchemaCache,
    fetcher: Box<dyn SchemaFetcher>,
    compiled: Mutex<HashMap<&'static str, Arc<CompiledSchema>>>,
}

impl SchemaManager {
    pub fn new(config: &ValidatorConfig, fetcher: Box<dyn SchemaFetcher>) -> Self {
        Self {
            cache: SchemaCache::new(&config.schema_cache_dir, config.schema_refresh_hours),
            fetcher,
            compiled: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve and compile the schema for `kind`.
    ///
    /// The first resolution per name goes through the disk cache (and the
    /// network on a miss); later calls return the memoized compilation,
    /// reported as [`CacheOutcome::Hit`]. The lock serializes compilation
    /// so each schema parses once.
    pub fn resolve(&self, kind: SchemaKind) -> Result<(Arc<CompiledSchema>, CacheOutcome), FelError> {
        let name = kind.file_name();
        let mut compiled = self
            .compiled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(schema) = compiled.get(name) {
            return Ok((Arc::clone(schema), CacheOutcome::Hit));
        }

        let (content, outcome) = self.cache.load(name, self.fetcher.as_ref())?;
        let schema = Arc::new(CompiledSchema::compile(name, &content)?);
        compiled.insert(name, Arc::clone(&schema));
        Ok((schema, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="GTDocumento"><xs:complexType><xs:sequence>
    <xs:element name="SAT"/>
  </xs:sequence></xs:complexType></xs:element>
</xs:schema>"#;

    fn manager(dir: &std::path::Path) -> SchemaManager {
        let config = ValidatorConfig {
            schema_cache_dir: dir.to_path_buf(),
            ..ValidatorConfig::default()
        };
        let fetcher = StaticSchemaFetcher::new()
            .with_schema(SchemaKind::Document.file_name(), MINI_XSD)
            .with_schema(SchemaKind::Anulacion.file_name(), MINI_XSD);
        SchemaManager::new(&config, Box::new(fetcher))
    }

    #[test]
    fn resolves_and_memoizes() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(dir.path());

        let (schema, outcome) = mgr.resolve(SchemaKind::Document).unwrap();
        assert_eq!(schema.root(), "GTDocumento");
        assert_eq!(outcome, CacheOutcome::Refreshed);

        let (again, outcome) = mgr.resolve(SchemaKind::Document).unwrap();
        assert_eq!(outcome, CacheOutcome::Hit);
        assert!(Arc::ptr_eq(&schema, &again));
    }

    #[test]
    fn kinds_resolve_distinct_names() {
        assert_ne!(
            SchemaKind::Document.file_name(),
            SchemaKind::Anulacion.file_name()
        );
    }
}
