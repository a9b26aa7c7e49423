//! The two-stage validation pipeline.
//!
//! `XML bytes → schema validation → projection → rule groups → verdict`.
//! Schema failure short-circuits; everything after accumulates. The
//! validator holds no per-document state and is safe to share across
//! threads for concurrent validations.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::catalog::{DteType, message_for};
use crate::config::ValidatorConfig;
use crate::error::FelError;
use crate::projection::{parse_anulacion, parse_document};
use crate::registry::{PersonsRegistry, TaxpayerRegistry};
use crate::rules::{
    Category, Finding, RuleContext, Verdict, run_anulacion, run_groups,
};
use crate::schema::{CacheOutcome, SchemaFetcher, SchemaKind, SchemaManager, validate_instance};

/// Certification-side validator for DTEs and anulaciones.
pub struct DteValidator {
    config: ValidatorConfig,
    schemas: SchemaManager,
    taxpayers: Arc<dyn TaxpayerRegistry>,
    persons: Arc<dyn PersonsRegistry>,
}

impl DteValidator {
    /// Build a validator with an explicit schema fetcher.
    pub fn with_fetcher(
        config: ValidatorConfig,
        fetcher: Box<dyn SchemaFetcher>,
        taxpayers: Arc<dyn TaxpayerRegistry>,
        persons: Arc<dyn PersonsRegistry>,
    ) -> Self {
        let schemas = SchemaManager::new(&config, fetcher);
        Self {
            config,
            schemas,
            taxpayers,
            persons,
        }
    }

    /// Build a validator fetching schemas over HTTPS from the configured
    /// base URL.
    #[cfg(feature = "http")]
    pub fn new(
        config: ValidatorConfig,
        taxpayers: Arc<dyn TaxpayerRegistry>,
        persons: Arc<dyn PersonsRegistry>,
    ) -> Result<Self, FelError> {
        let fetcher = crate::schema::HttpSchemaFetcher::new(
            config.schema_base_url.clone(),
            std::time::Duration::from_secs(config.http_timeout_seconds),
        )?;
        Ok(Self::with_fetcher(
            config,
            Box::new(fetcher),
            taxpayers,
            persons,
        ))
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a DTE body.
    pub fn validate(&self, xml: &[u8], hint: Option<DteType>) -> Verdict {
        self.validate_with_cancel(xml, hint, &CancelToken::new())
    }

    /// Validate a DTE body under a cancellation token.
    pub fn validate_with_cancel(
        &self,
        xml: &[u8],
        hint: Option<DteType>,
        cancel: &CancelToken,
    ) -> Verdict {
        let schema_used = SchemaKind::Document.file_name().to_string();

        // Encoding plane.
        let Ok(text) = std::str::from_utf8(xml) else {
            return self.verdict(
                vec![invalid_encoding()],
                Vec::new(),
                hint,
                Some(schema_used),
            );
        };
        let mut preamble: Vec<Finding> = Vec::new();
        if missing_encoding_decl(text) {
            preamble.push(Finding::inform_warning(
                "MISSING_ENCODING_DECL",
                Category::GeneralPart1,
                message_for("MISSING_ENCODING_DECL").unwrap_or_default(),
            ));
        }

        // Schema plane; failure short-circuits.
        let schema = match self.schemas.resolve(SchemaKind::Document) {
            Ok((schema, outcome)) => {
                if outcome == CacheOutcome::StaleFallback {
                    preamble.push(stale_fallback());
                }
                schema
            }
            Err(e) => {
                preamble.push(schema_load_error(&e));
                return self.verdict(preamble, Vec::new(), hint, Some(schema_used));
            }
        };
        let schema_findings = validate_instance(&schema, text);
        if !schema_findings.is_empty() {
            preamble.extend(schema_findings);
            return self.verdict(preamble, Vec::new(), hint, Some(schema_used));
        }

        // Projection plane.
        let doc = match parse_document(text) {
            Ok(doc) => doc,
            Err(finding) => {
                preamble.push(finding);
                return self.verdict(preamble, Vec::new(), hint, Some(schema_used));
            }
        };
        debug!(
            tipo = doc.dte_type.map(|t| t.code()).unwrap_or("?"),
            items = doc.items.len(),
            "proyección construida"
        );

        // Rule plane.
        let ctx = RuleContext {
            doc: &doc,
            taxpayers: self.taxpayers.as_ref(),
            persons: self.persons.as_ref(),
            config: &self.config,
            cancel,
        };
        let (findings, applied) = run_groups(&ctx);
        if findings.iter().any(|f| f.code == "CANCELLED") {
            // No partial verdict on cancellation.
            return self.verdict(
                findings,
                Vec::new(),
                doc.dte_type.or(hint),
                Some(schema_used),
            );
        }

        preamble.extend(findings);
        let verdict = self.verdict(preamble, applied, doc.dte_type.or(hint), Some(schema_used));
        info!(
            valido = verdict.is_valid,
            errores = verdict.errors.len(),
            advertencias = verdict.warnings.len(),
            tipo = verdict.document_type.map(|t| t.code()).unwrap_or("?"),
            "validación completada"
        );
        verdict
    }

    /// Validate an anulación body.
    pub fn validate_anulacion(&self, xml: &[u8]) -> Verdict {
        self.validate_anulacion_with_cancel(xml, &CancelToken::new())
    }

    /// Validate an anulación body under a cancellation token.
    pub fn validate_anulacion_with_cancel(&self, xml: &[u8], cancel: &CancelToken) -> Verdict {
        let schema_used = SchemaKind::Anulacion.file_name().to_string();

        let Ok(text) = std::str::from_utf8(xml) else {
            return self.verdict(vec![invalid_encoding()], Vec::new(), None, Some(schema_used));
        };
        let mut preamble: Vec<Finding> = Vec::new();
        if missing_encoding_decl(text) {
            preamble.push(Finding::inform_warning(
                "MISSING_ENCODING_DECL",
                Category::GeneralPart1,
                message_for("MISSING_ENCODING_DECL").unwrap_or_default(),
            ));
        }

        let schema = match self.schemas.resolve(SchemaKind::Anulacion) {
            Ok((schema, outcome)) => {
                if outcome == CacheOutcome::StaleFallback {
                    preamble.push(stale_fallback());
                }
                schema
            }
            Err(e) => {
                preamble.push(schema_load_error(&e));
                return self.verdict(preamble, Vec::new(), None, Some(schema_used));
            }
        };
        let schema_findings = validate_instance(&schema, text);
        if !schema_findings.is_empty() {
            preamble.extend(schema_findings);
            return self.verdict(preamble, Vec::new(), None, Some(schema_used));
        }

        let anulacion = match parse_anulacion(text) {
            Ok(a) => a,
            Err(finding) => {
                preamble.push(finding);
                return self.verdict(preamble, Vec::new(), None, Some(schema_used));
            }
        };

        let (findings, applied) = run_anulacion(&anulacion, self.taxpayers.as_ref(), cancel);
        if findings.iter().any(|f| f.code == "CANCELLED") {
            let cancelled: Vec<Finding> =
                findings.into_iter().filter(|f| f.code == "CANCELLED").collect();
            return self.verdict(cancelled, Vec::new(), None, Some(schema_used));
        }

        preamble.extend(findings);
        self.verdict(preamble, applied, None, Some(schema_used))
    }

    fn verdict(
        &self,
        findings: Vec<Finding>,
        applied: Vec<String>,
        document_type: Option<DteType>,
        schema_used: Option<String>,
    ) -> Verdict {
        Verdict::from_findings(
            findings,
            applied,
            document_type,
            schema_used,
            self.config.rulebook_version.clone(),
        )
    }
}

fn invalid_encoding() -> Finding {
    Finding::reject(
        "INVALID_ENCODING",
        Category::GeneralPart1,
        message_for("INVALID_ENCODING").unwrap_or_default(),
    )
}

fn stale_fallback() -> Finding {
    Finding::inform_warning(
        "SCHEMA_STALE_FALLBACK",
        Category::GeneralPart1,
        message_for("SCHEMA_STALE_FALLBACK").unwrap_or_default(),
    )
}

fn schema_load_error(e: &FelError) -> Finding {
    Finding::reject(
        "SCHEMA_LOAD_ERROR",
        Category::GeneralPart1,
        format!("{}: {e}", message_for("SCHEMA_LOAD_ERROR").unwrap_or_default()),
    )
}

/// Whether the XML prologue fails to declare an encoding.
fn missing_encoding_decl(text: &str) -> bool {
    let t = text.trim_start();
    if let Some(rest) = t.strip_prefix("<?xml") {
        if let Some(end) = rest.find("?>") {
            return !rest[..end].contains("encoding");
        }
    }
    true
}
