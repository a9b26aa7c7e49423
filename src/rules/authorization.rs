//! Group 8 — authorization UUID, serie and número.
//!
//! The serie is the first 8 hex digits of the authorization, uppercased;
//! the número is the next 8 hex digits modulo 999 999 999.

use super::context::RuleContext;
use super::engine::Sink;
use super::finding::{Category, Finding};
use crate::format::{is_uuid_v4, uuid_hex};

const CAT: Category = Category::GeneralPart4;

const NUMERO_MODULUS: u64 = 999_999_999;

/// Derive `(serie, numero)` from a canonical authorization UUID.
pub fn derive_serie_numero(authorization: &str) -> Option<(String, u64)> {
    let hex = uuid_hex(authorization)?;
    let serie = hex[0..8].to_ascii_uppercase();
    let numero = u64::from_str_radix(&hex[8..16], 16).ok()? % NUMERO_MODULUS;
    Some((serie, numero))
}

pub(crate) fn run(ctx: &RuleContext<'_>, out: &mut Sink) {
    let Some(authorization) = ctx.doc.authorization_id.as_deref() else {
        out.rule("3.12.5.2");
        if ctx.doc.serie.is_some() || ctx.doc.numero.is_some() {
            out.push(
                Finding::inform_error(
                    "3.12.5.2",
                    CAT,
                    "serie o número presentes sin número de autorización",
                )
                .with_field("Certificacion.NumeroAutorizacion"),
            );
        }
        return;
    };

    out.rule("3.12.5.1");
    if !is_uuid_v4(authorization) {
        out.push(
            Finding::reject(
                "3.12.5.1",
                CAT,
                format!("el número de autorización '{authorization}' no es un UUID v4"),
            )
            .with_field("Certificacion.NumeroAutorizacion"),
        );
        return;
    }

    let Some((expected_serie, expected_numero)) = derive_serie_numero(authorization) else {
        return;
    };

    out.rule("3.12.6.1");
    match ctx.doc.serie.as_deref() {
        Some(serie) if serie == expected_serie => {}
        other => out.push(
            Finding::reject(
                "3.12.6.1",
                CAT,
                "la serie no se deriva del número de autorización",
            )
            .with_field("Certificacion.NumeroAutorizacion.Serie")
            .with_expected_actual(expected_serie.clone(), other.unwrap_or("(ausente)")),
        ),
    }

    out.rule("3.12.7.1");
    let declared = ctx
        .doc
        .numero
        .as_deref()
        .and_then(|n| n.trim().parse::<u64>().ok());
    match declared {
        Some(numero) if numero == expected_numero => {}
        _ => out.push(
            Finding::reject(
                "3.12.7.1",
                CAT,
                "el número no se deriva del número de autorización",
            )
            .with_field("Certificacion.NumeroAutorizacion.Numero")
            .with_expected_actual(
                expected_numero.to_string(),
                ctx.doc.numero.as_deref().unwrap_or("(ausente)"),
            ),
        ),
    }
}
