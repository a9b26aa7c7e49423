//! Rule orchestration.
//!
//! The eight groups run in a fixed order over one shared context. Groups
//! never abort one another: a panicking group collapses into a synthetic
//! `SYSTEM_<GROUP>` REJECT finding and the rest still run. Findings keep
//! (group order, emission order), so identical inputs produce identical
//! verdicts.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::warn;

use super::context::RuleContext;
use super::finding::{Category, Finding, Severity};
use super::{authorization, complements, general, items, phrases, signatures, taxes, totals};
use crate::catalog::message_for;
use crate::registry::RegistryError;

/// Collects one group's findings and the rule codes it evaluated.
pub(crate) struct Sink {
    pub(crate) findings: Vec<Finding>,
    pub(crate) applied: Vec<String>,
}

impl Sink {
    fn new() -> Self {
        Self {
            findings: Vec::new(),
            applied: Vec::new(),
        }
    }

    /// Record that a rule was evaluated, found something or not.
    pub(crate) fn rule(&mut self, code: &str) {
        self.applied.push(code.to_string());
    }

    pub(crate) fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Translate a registry failure into its engine-plane finding.
    pub(crate) fn registry_failure(&mut self, err: &RegistryError, category: Category) {
        let finding = match err {
            RegistryError::Cancelled => cancelled_finding(),
            other => Finding::reject(
                "REGISTRY_UNAVAILABLE",
                category,
                format!(
                    "{}: {other}",
                    message_for("REGISTRY_UNAVAILABLE").unwrap_or_default()
                ),
            ),
        };
        self.findings.push(finding);
    }
}

type GroupFn = for<'a, 'b> fn(&'a RuleContext<'b>, &mut Sink);

/// The fixed execution order; the tag names the group in `SYSTEM_<GROUP>`
/// findings.
const GROUPS: &[(&str, Category, GroupFn)] = &[
    ("GENERAL", Category::GeneralPart1, general::run),
    ("ITEMS", Category::GeneralPart2, items::run),
    ("TAXES", Category::TaxSpecific, taxes::run),
    ("PHRASES", Category::PhraseValidation, phrases::run),
    ("COMPLEMENTS", Category::ComplementValidation, complements::run),
    ("TOTALS", Category::GeneralPart3, totals::run),
    ("SIGNATURES", Category::GeneralPart4, signatures::run),
    ("AUTHORIZATION", Category::GeneralPart4, authorization::run),
];

fn cancelled_finding() -> Finding {
    Finding::reject(
        "CANCELLED",
        Category::GeneralPart1,
        message_for("CANCELLED").unwrap_or_default(),
    )
}

/// Run every group in order, returning findings plus the evaluated rule
/// codes (deduplicated, in evaluation order).
///
/// A cancellation discards any partial findings: the result is exactly one
/// `CANCELLED` REJECT.
pub(crate) fn run_groups(ctx: &RuleContext<'_>) -> (Vec<Finding>, Vec<String>) {
    let mut findings: Vec<Finding> = Vec::new();
    let mut applied: Vec<String> = Vec::new();

    for (name, category, group) in GROUPS {
        if ctx.cancel.is_cancelled() {
            return (vec![cancelled_finding()], Vec::new());
        }

        match catch_unwind(AssertUnwindSafe(|| {
            let mut sink = Sink::new();
            group(ctx, &mut sink);
            sink
        })) {
            Ok(sink) => {
                if sink.findings.iter().any(|f| f.code == "CANCELLED") {
                    return (vec![cancelled_finding()], Vec::new());
                }
                findings.extend(sink.findings);
                applied.extend(sink.applied);
            }
            Err(panic) => {
                let detail = panic_message(&panic);
                warn!(group = name, detail, "grupo de reglas falló con pánico");
                findings.push(Finding::new(
                    format!("SYSTEM_{name}"),
                    Severity::Reject,
                    *category,
                    format!("falla interna del grupo de reglas {name}: {detail}"),
                ));
            }
        }
    }

    dedup_preserving_order(&mut applied);
    (findings, applied)
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "pánico sin mensaje"
    }
}

fn dedup_preserving_order(codes: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    codes.retain(|c| seen.insert(c.clone()));
}
