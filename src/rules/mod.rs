//! Business rule engine.
//!
//! Eight ordered rule groups interpret the document projection against the
//! SAT rulebook, accumulating severity-graded findings into a [`Verdict`].
//! Groups never throw past the engine boundary; see `engine` for the
//! containment policy.

mod anulacion;
mod authorization;
mod complements;
mod context;
mod engine;
mod finding;
mod general;
mod items;
mod phrases;
mod signatures;
mod taxes;
mod totals;

pub use authorization::derive_serie_numero;
pub use context::RuleContext;
pub use finding::{Category, Finding, SatLevel, Severity, Verdict};

pub(crate) use anulacion::run_anulacion;
pub(crate) use engine::run_groups;

use crate::cancel::CancelToken;
use crate::config::ValidatorConfig;
use crate::projection::Document;
use crate::registry::{PersonsRegistry, TaxpayerRegistry};

/// Run the business rules over an already-built projection.
///
/// This is the engine alone — no schema validation, no parsing. The full
/// pipeline lives in [`DteValidator`](crate::DteValidator).
pub fn validate_projection(
    doc: &Document,
    taxpayers: &dyn TaxpayerRegistry,
    persons: &dyn PersonsRegistry,
    config: &ValidatorConfig,
    cancel: &CancelToken,
) -> Verdict {
    let ctx = RuleContext {
        doc,
        taxpayers,
        persons,
        config,
        cancel,
    };
    let (findings, applied) = run_groups(&ctx);
    Verdict::from_findings(
        findings,
        applied,
        doc.dte_type,
        None,
        config.rulebook_version.clone(),
    )
}
