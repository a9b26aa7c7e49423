//! Group 4 — phrase validations.
//!
//! Catalog admissibility of (type, scenario) pairs and the mandatory
//! phrases per document type and flags.

use super::context::RuleContext;
use super::engine::Sink;
use super::finding::{Category, Finding};
use crate::catalog::{
    DteType, EXPORT_PHRASE_SCENARIO, EXPORT_PHRASE_TYPE, EXEMPTION_PHRASE_TYPE, ISR_PHRASE_TYPE,
    RETENTION_PHRASE_TYPE, is_known_phrase_type, is_scenario_admissible,
};

const CAT: Category = Category::PhraseValidation;

pub(crate) fn run(ctx: &RuleContext<'_>, out: &mut Sink) {
    for (idx, phrase) in ctx.doc.phrases.iter().enumerate() {
        admissibility(idx, phrase, out);
    }
    export_phrase(ctx, out);
    isr_phrase(ctx, out);
    retention_phrase(ctx, out);
}

fn admissibility(idx: usize, phrase: &crate::projection::Phrase, out: &mut Sink) {
    let field = |name: &str| format!("Frases.Frase[{idx}].{name}");

    out.rule("2.6.1.1");
    let Some(phrase_type) = phrase.phrase_type.filter(|t| is_known_phrase_type(*t)) else {
        out.push(
            Finding::reject(
                "2.6.1.1",
                CAT,
                format!(
                    "tipo de frase {} fuera del catálogo (1..9)",
                    phrase
                        .phrase_type
                        .map(|t| t.to_string())
                        .unwrap_or("(ausente)".into())
                ),
            )
            .with_field(field("TipoFrase")),
        );
        return;
    };

    out.rule("2.6.1.2");
    match phrase.scenario {
        Some(scenario) if is_scenario_admissible(phrase_type, scenario) => {}
        Some(scenario) => out.push(
            Finding::reject(
                "2.6.1.2",
                CAT,
                format!(
                    "el escenario {scenario} no es admisible para la frase tipo {phrase_type}"
                ),
            )
            .with_field(field("CodigoEscenario")),
        ),
        None => out.push(
            Finding::reject("2.6.1.2", CAT, "código de escenario ausente")
                .with_field(field("CodigoEscenario")),
        ),
    }

    out.rule("2.6.4.1");
    if phrase_type == EXEMPTION_PHRASE_TYPE
        && (phrase.resolution_number.is_none() || phrase.resolution_date.is_none())
    {
        out.push(
            Finding::inform_error(
                "2.6.4.1",
                CAT,
                "las frases de exención llevan número y fecha de resolución",
            )
            .with_field(field("NumeroResolucion")),
        );
    }
}

fn export_phrase(ctx: &RuleContext<'_>, out: &mut Sink) {
    let export_phrase_types = [
        DteType::Fact,
        DteType::Fcam,
        DteType::Ndeb,
        DteType::Ncre,
    ];
    let applies = ctx
        .doc
        .dte_type
        .is_some_and(|t| export_phrase_types.contains(&t));

    out.rule("2.6.1.6");
    if ctx.doc.is_export
        && applies
        && !ctx
            .doc
            .has_phrase(EXPORT_PHRASE_TYPE, EXPORT_PHRASE_SCENARIO)
    {
        out.push(
            Finding::inform_error(
                "2.6.1.6",
                CAT,
                "las exportaciones llevan la frase tipo 4 escenario 1",
            )
            .with_field("Frases"),
        );
    }

    out.rule("2.6.1.7");
    if !ctx.doc.is_export
        && ctx
            .doc
            .has_phrase(EXPORT_PHRASE_TYPE, EXPORT_PHRASE_SCENARIO)
    {
        out.push(
            Finding::inform_warning(
                "2.6.1.7",
                CAT,
                "la frase tipo 4 escenario 1 corresponde solo a exportaciones",
            )
            .with_field("Frases"),
        );
    }
}

fn isr_phrase(ctx: &RuleContext<'_>, out: &mut Sink) {
    let Some(dte_type) = ctx.doc.dte_type else {
        return;
    };
    if !dte_type.is_invoice_class()
        || dte_type.is_small_contributor()
        || dte_type == DteType::Fesp
    {
        return;
    }

    out.rule("2.6.2.1");
    let has_isr = ctx
        .doc
        .phrases
        .iter()
        .any(|p| p.phrase_type == Some(ISR_PHRASE_TYPE));
    if !has_isr {
        out.push(
            Finding::inform_error(
                "2.6.2.1",
                CAT,
                format!(
                    "el tipo {} lleva la frase de ISR (tipo 1) del régimen del emisor",
                    dte_type.code()
                ),
            )
            .with_field("Frases"),
        );
    }
}

fn retention_phrase(ctx: &RuleContext<'_>, out: &mut Sink) {
    if ctx.doc.dte_type != Some(DteType::Fesp) {
        return;
    }

    out.rule("2.6.3.1");
    let has_retention = ctx
        .doc
        .phrases
        .iter()
        .any(|p| p.phrase_type == Some(RETENTION_PHRASE_TYPE));
    if !has_retention {
        out.push(
            Finding::reject(
                "2.6.3.1",
                CAT,
                "las facturas especiales llevan la frase de retención del IVA (tipo 2)",
            )
            .with_field("Frases"),
        );
    }
}
