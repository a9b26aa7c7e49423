//! Group 6 — totals.
//!
//! Grand-total reconstruction from the items and the consumidor-final
//! amount cap.

use rust_decimal::Decimal;

use super::context::RuleContext;
use super::engine::Sink;
use super::finding::{Category, Finding};
use crate::format::{approx_eq, in_bounds, round2};
use crate::projection::ReceptorIdKind;

const CAT: Category = Category::GeneralPart3;

pub(crate) fn run(ctx: &RuleContext<'_>, out: &mut Sink) {
    let Some(grand_total) = ctx.doc.grand_total else {
        out.rule("ERR_103");
        out.push(
            Finding::reject("ERR_103", CAT, "gran total ausente o inválido")
                .with_field("Totales.GranTotal"),
        );
        return;
    };

    out.rule("2.19.1.1");
    if !in_bounds(grand_total) {
        out.push(
            Finding::reject(
                "2.19.1.1",
                CAT,
                format!("gran total {grand_total} fuera del rango permitido"),
            )
            .with_field("Totales.GranTotal"),
        );
    }
    if let Some(total) = ctx.doc.total {
        if !in_bounds(total) {
            out.push(
                Finding::reject(
                    "2.19.1.1",
                    CAT,
                    format!("total {total} fuera del rango permitido"),
                )
                .with_field("Totales.Total"),
            );
        }
    }

    reconstruction(ctx, grand_total, out);
    cf_cap(ctx, grand_total, out);
}

fn reconstruction(ctx: &RuleContext<'_>, grand_total: Decimal, out: &mut Sink) {
    // Items with missing totals already failed 2.3.x; the sum would lie.
    if ctx.doc.items.is_empty() || ctx.doc.items.iter().any(|i| i.total.is_none()) {
        return;
    }

    out.rule("2.19.2.1");
    let sum: Decimal = ctx.doc.items.iter().filter_map(|i| i.total).sum();
    if !approx_eq(grand_total, sum, ctx.config.monetary_tolerance) {
        out.push(
            Finding::reject(
                "2.19.2.1",
                CAT,
                "el gran total no corresponde a la suma de los totales de ítems",
            )
            .with_field("Totales.GranTotal")
            .with_expected_actual(sum.to_string(), grand_total.to_string()),
        );
    }
}

fn cf_cap(ctx: &RuleContext<'_>, grand_total: Decimal, out: &mut Sink) {
    let invoice_class = ctx.doc.dte_type.is_some_and(|t| t.is_invoice_class());
    if !invoice_class || ctx.doc.receptor_id_kind != Some(ReceptorIdKind::Cf) {
        return;
    }

    out.rule("2.2.4.11");
    let currency = ctx.doc.currency.as_deref().unwrap_or("GTQ");
    let Some(rate) = ctx.config.gtq_rate(currency) else {
        out.push(
            Finding::inform_warning(
                "2.2.4.11",
                CAT,
                format!(
                    "sin tasa de conversión configurada para {currency}; límite de consumidor final no verificado"
                ),
            )
            .with_field("Totales.GranTotal"),
        );
        return;
    };

    let amount_gtq = round2(grand_total * rate);
    if amount_gtq >= ctx.config.max_cf_amount_gtq {
        out.push(
            Finding::reject(
                "2.2.4.11",
                CAT,
                format!(
                    "los documentos a consumidor final deben ser menores a Q{}",
                    ctx.config.max_cf_amount_gtq
                ),
            )
            .with_field("Totales.GranTotal")
            .with_expected_actual(
                format!("< {}", ctx.config.max_cf_amount_gtq),
                amount_gtq.to_string(),
            ),
        );
    }
}
