//! Group 7 — signature block structure.
//!
//! Presence of the EMISOR and CERTIFICADOR blocks and a recognized
//! algorithm identifier. Cryptographic verification happens outside the
//! core.

use super::context::RuleContext;
use super::engine::Sink;
use super::finding::{Category, Finding};
use crate::projection::SignatureRole;

const CAT: Category = Category::GeneralPart4;

/// Algorithm URI suffixes accepted on DTE signatures.
const KNOWN_ALGORITHM_SUFFIXES: &[&str] = &[
    "#rsa-sha256",
    "#rsa-sha384",
    "#rsa-sha512",
    "#ecdsa-sha256",
];

pub(crate) fn run(ctx: &RuleContext<'_>, out: &mut Sink) {
    let has_role = |role: SignatureRole| {
        ctx.doc
            .signatures
            .iter()
            .any(|s| s.role == Some(role))
    };

    out.rule("2.20.1.1");
    if !has_role(SignatureRole::Emisor) {
        out.push(
            Finding::reject(
                "2.20.1.1",
                CAT,
                "falta el bloque de firma electrónica del emisor",
            )
            .with_field("Signature"),
        );
    }

    out.rule("2.20.1.2");
    if !has_role(SignatureRole::Certificador) {
        out.push(
            Finding::reject(
                "2.20.1.2",
                CAT,
                "falta el bloque de firma electrónica del certificador",
            )
            .with_field("Signature"),
        );
    }

    for (idx, signature) in ctx.doc.signatures.iter().enumerate() {
        out.rule("2.20.2.1");
        let recognized = signature
            .algorithm
            .as_deref()
            .is_some_and(|a| KNOWN_ALGORITHM_SUFFIXES.iter().any(|s| a.ends_with(s)));
        if !recognized {
            out.push(
                Finding::inform_warning(
                    "2.20.2.1",
                    CAT,
                    format!(
                        "algoritmo de firma '{}' no reconocido",
                        signature.algorithm.as_deref().unwrap_or("(ausente)")
                    ),
                )
                .with_field(format!("Signature[{idx}].SignatureMethod")),
            );
        }
    }
}
