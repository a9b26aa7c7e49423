//! Group 5 — complement validations.
//!
//! Mandatory complements per flag and type, admissibility, and payload
//! field checks for the typed complements.

use rust_decimal::Decimal;

use super::context::RuleContext;
use super::engine::Sink;
use super::finding::{Category, Finding};
use crate::catalog::{ComplementType, DteType, is_admissible, is_known_incoterm};
use crate::format::is_uuid_v4;
use crate::projection::{Complement, ComplementPayload};

const CAT: Category = Category::ComplementValidation;

pub(crate) fn run(ctx: &RuleContext<'_>, out: &mut Sink) {
    mandatory(ctx, out);
    for (idx, complement) in ctx.doc.complements.iter().enumerate() {
        admissibility(ctx, idx, complement, out);
        payload(ctx, idx, complement, out);
    }
}

fn mandatory(ctx: &RuleContext<'_>, out: &mut Sink) {
    let dte_type = ctx.doc.dte_type;

    out.rule("2.2.5.2");
    let export_exempt = matches!(dte_type, Some(DteType::Ndeb) | Some(DteType::Ncre));
    if ctx.doc.is_export
        && !export_exempt
        && !ctx.doc.has_complement(ComplementType::Exportacion)
    {
        out.push(
            Finding::reject(
                "2.2.5.2",
                CAT,
                "las exportaciones llevan el complemento Exportacion",
            )
            .with_field("Complementos"),
        );
    }

    out.rule("3.3.1.1");
    if matches!(dte_type, Some(DteType::Ncre) | Some(DteType::Ndeb))
        && !ctx.doc.has_complement(ComplementType::ReferenciasNota)
    {
        out.push(
            Finding::reject(
                "3.3.1.1",
                CAT,
                "las notas de crédito y débito llevan el complemento ReferenciasNota",
            )
            .with_field("Complementos"),
        );
    }

    out.rule("3.4.1.1");
    if ctx.doc.is_public_show
        && !ctx
            .doc
            .has_complement(ComplementType::EspectaculosPublicos)
    {
        out.push(
            Finding::reject(
                "3.4.1.1",
                CAT,
                "los espectáculos públicos llevan el complemento EspectaculosPublicos",
            )
            .with_field("Complementos"),
        );
    }

    out.rule("3.5.1.1");
    if dte_type == Some(DteType::Fesp)
        && !ctx
            .doc
            .has_complement(ComplementType::RetencionFacturaEspecial)
    {
        out.push(
            Finding::reject(
                "3.5.1.1",
                CAT,
                "las facturas especiales llevan el complemento RetencionesFacturaEspecial",
            )
            .with_field("Complementos"),
        );
    }
}

fn admissibility(ctx: &RuleContext<'_>, idx: usize, complement: &Complement, out: &mut Sink) {
    out.rule("3.1.1.1");
    match (complement.kind, ctx.doc.dte_type) {
        (None, _) => {
            let raw = complement.raw_name.as_deref().unwrap_or("(sin nombre)");
            out.push(
                Finding::inform_warning(
                    "3.1.1.1",
                    CAT,
                    format!("complemento '{raw}' no reconocido en el catálogo"),
                )
                .with_field(format!("Complementos.Complemento[{idx}]")),
            );
        }
        (Some(kind), Some(dte_type)) if !is_admissible(dte_type, kind) => {
            out.push(
                Finding::inform_warning(
                    "3.1.1.1",
                    CAT,
                    format!(
                        "el complemento {} no corresponde al tipo {}",
                        kind.xml_name(),
                        dte_type.code()
                    ),
                )
                .with_field(format!("Complementos.Complemento[{idx}]")),
            );
        }
        _ => {}
    }
}

fn payload(ctx: &RuleContext<'_>, idx: usize, complement: &Complement, out: &mut Sink) {
    let field = |name: &str| format!("Complementos.Complemento[{idx}].{name}");

    match &complement.payload {
        ComplementPayload::Exportacion(exp) => {
            out.rule("3.2.1.2");
            if !ctx.doc.is_export {
                out.push(
                    Finding::reject(
                        "3.2.1.2",
                        CAT,
                        "el complemento Exportacion exige la marca de exportación",
                    )
                    .with_field(field("Exportacion")),
                );
            }

            out.rule("3.2.1.1");
            match exp.incoterm.as_deref() {
                Some(code) if is_known_incoterm(code) => {}
                Some(code) => out.push(
                    Finding::reject(
                        "3.2.1.1",
                        CAT,
                        format!("INCOTERM '{code}' fuera del catálogo"),
                    )
                    .with_field(field("INCOTERM"))
                    .with_expected_actual("INCOTERM del catálogo", code),
                ),
                None => out.push(
                    Finding::reject("3.2.1.1", CAT, "INCOTERM ausente")
                        .with_field(field("INCOTERM")),
                ),
            }
        }
        ComplementPayload::ReferenciasNota(refs) => {
            out.rule("3.3.1.2");
            match refs.origin_authorization.as_deref() {
                Some(uuid) if is_uuid_v4(uuid) => {}
                Some(uuid) => out.push(
                    Finding::reject(
                        "3.3.1.2",
                        CAT,
                        format!(
                            "la autorización del documento origen '{uuid}' no es un UUID v4"
                        ),
                    )
                    .with_field(field("NumeroAutorizacionDocumentoOrigen")),
                ),
                None => out.push(
                    Finding::reject(
                        "3.3.1.2",
                        CAT,
                        "autorización del documento origen ausente",
                    )
                    .with_field(field("NumeroAutorizacionDocumentoOrigen")),
                ),
            }

            out.rule("3.3.1.3");
            if let (Some(origin), Some(emission)) =
                (refs.origin_emission_date, ctx.doc.emission)
            {
                if origin > emission.date() {
                    out.push(
                        Finding::inform_error(
                            "3.3.1.3",
                            CAT,
                            format!(
                                "el documento origen ({origin}) no puede ser posterior a esta emisión ({})",
                                emission.date()
                            ),
                        )
                        .with_field(field("FechaEmisionDocumentoOrigen")),
                    );
                }
            }
        }
        ComplementPayload::RetencionFacturaEspecial(ret) => {
            out.rule("3.5.1.2");
            let retained =
                ret.retained_iva.unwrap_or(Decimal::ZERO) + ret.retained_isr.unwrap_or(Decimal::ZERO);
            let negative = ret.retained_iva.is_some_and(|v| v < Decimal::ZERO)
                || ret.retained_isr.is_some_and(|v| v < Decimal::ZERO);
            let exceeds = ctx
                .doc
                .grand_total
                .is_some_and(|total| retained > total + ctx.config.monetary_tolerance);
            if negative || exceeds {
                out.push(
                    Finding::inform_error(
                        "3.5.1.2",
                        CAT,
                        "las retenciones de la factura especial son negativas o exceden el gran total",
                    )
                    .with_field(field("RetencionesFacturaEspecial")),
                );
            }
        }
        ComplementPayload::EspectaculoPublico(_) | ComplementPayload::Opaque => {}
    }
}
