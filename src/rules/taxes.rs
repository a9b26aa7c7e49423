//! Group 3 — tax validations.
//!
//! Per-kind unit codes and amount recomputation. IVA and petróleo carry
//! full arithmetic; the remaining cataloged kinds are recognized but have
//! no amount rules.

use rust_decimal::Decimal;

use super::context::RuleContext;
use super::engine::Sink;
use super::finding::{Category, Finding};
use crate::catalog::{IVA_RATE, TaxType, UnitRate, gravable_unit};
use crate::format::{approx_eq, round2};
use crate::projection::Tax;

const CAT: Category = Category::TaxSpecific;

pub(crate) fn run(ctx: &RuleContext<'_>, out: &mut Sink) {
    for (idx, tax) in ctx.doc.taxes.iter().enumerate() {
        per_entry(ctx, idx, tax, out);
    }
    iva_presence(ctx, out);
    iva_taxable_base(ctx, out);
    totals_per_kind(ctx, out);
}

fn per_entry(ctx: &RuleContext<'_>, idx: usize, tax: &Tax, out: &mut Sink) {
    let field = |name: &str| format!("Impuestos.Impuesto[{idx}].{name}");

    out.rule("2.7.1.1");
    let Some(kind) = tax.kind else {
        let raw = tax.raw_name.as_deref().unwrap_or("(ausente)");
        out.push(
            Finding::reject(
                "2.7.1.1",
                CAT,
                format!("impuesto '{raw}' no reconocido en el catálogo"),
            )
            .with_field(field("NombreCorto")),
        );
        return;
    };

    match kind {
        TaxType::Iva => iva_entry(ctx, idx, tax, out),
        TaxType::Petroleo => petroleo_entry(ctx, idx, tax, out),
        // Cataloged kinds without amount rules.
        _ => {}
    }
}

fn iva_entry(ctx: &RuleContext<'_>, idx: usize, tax: &Tax, out: &mut Sink) {
    let field = |name: &str| format!("Impuestos.Impuesto[{idx}].{name}");

    out.rule("2.7.3.1");
    let unit_code = match tax.unit_code {
        Some(c @ (1 | 2)) => c,
        other => {
            out.push(
                Finding::reject(
                    "2.7.3.1",
                    CAT,
                    format!(
                        "código de unidad gravable de IVA debe ser 1 o 2, se recibió {}",
                        other.map(|c| c.to_string()).unwrap_or("(ausente)".into())
                    ),
                )
                .with_field(field("CodigoUnidadGravable")),
            );
            return;
        }
    };

    let Some(tax_amount) = tax.tax_amount else {
        out.rule("ERR_104");
        out.push(
            Finding::reject("ERR_104", CAT, "monto de impuesto IVA ausente")
                .with_field(field("MontoImpuesto")),
        );
        return;
    };

    out.rule("2.7.4.1");
    let expected = match unit_code {
        1 => {
            let Some(taxable) = tax.taxable_amount else {
                out.push(
                    Finding::reject(
                        "2.7.4.1",
                        CAT,
                        "monto gravable ausente para IVA con unidad gravable 1",
                    )
                    .with_field(field("MontoGravable")),
                );
                return;
            };
            round2(taxable * IVA_RATE)
        }
        _ => Decimal::ZERO,
    };

    if !approx_eq(tax_amount, expected, ctx.config.monetary_tolerance) {
        out.push(
            Finding::reject(
                "2.7.4.1",
                CAT,
                match unit_code {
                    1 => "el monto de IVA no corresponde al 12% del monto gravable",
                    _ => "el monto de IVA debe ser 0 para la unidad gravable exenta",
                },
            )
            .with_field(field("MontoImpuesto"))
            .with_expected_actual(expected.to_string(), tax_amount.to_string()),
        );
    }
}

fn petroleo_entry(ctx: &RuleContext<'_>, idx: usize, tax: &Tax, out: &mut Sink) {
    let field = |name: &str| format!("Impuestos.Impuesto[{idx}].{name}");

    out.rule("2.7.6.1");
    let unit = tax.unit_code.and_then(|c| gravable_unit(TaxType::Petroleo, c));
    let Some(unit) = unit else {
        out.push(
            Finding::reject(
                "2.7.6.1",
                CAT,
                format!(
                    "unidad gravable {} no catalogada para el impuesto al petróleo",
                    tax.unit_code
                        .map(|c| c.to_string())
                        .unwrap_or("(ausente)".into())
                ),
            )
            .with_field(field("CodigoUnidadGravable")),
        );
        return;
    };

    let (Some(quantity), Some(tax_amount)) = (tax.unit_quantity, tax.tax_amount) else {
        out.push(
            Finding::reject(
                "2.7.6.1",
                CAT,
                "el impuesto al petróleo exige cantidad de unidades gravables y monto",
            )
            .with_field(field("CantidadUnidadesGravables")),
        );
        return;
    };

    if let UnitRate::PerUnit(rate) = unit.rate {
        let expected = round2(quantity * rate);
        if !approx_eq(tax_amount, expected, ctx.config.monetary_tolerance) {
            out.push(
                Finding::reject(
                    "2.7.6.1",
                    CAT,
                    format!(
                        "el monto no corresponde a {quantity} galones × Q{rate} ({})",
                        unit.name
                    ),
                )
                .with_field(field("MontoImpuesto"))
                .with_expected_actual(expected.to_string(), tax_amount.to_string()),
            );
        }
    }
}

fn iva_presence(ctx: &RuleContext<'_>, out: &mut Sink) {
    let Some(dte_type) = ctx.doc.dte_type else {
        return;
    };
    let has_iva = ctx.doc.taxes.iter().any(|t| t.kind == Some(TaxType::Iva));

    out.rule("2.7.2.2");
    if dte_type.is_small_contributor() && has_iva {
        out.push(
            Finding::reject(
                "2.7.2.2",
                CAT,
                format!(
                    "los documentos de pequeño contribuyente ({}) no llevan IVA",
                    dte_type.code()
                ),
            )
            .with_field("Impuestos"),
        );
        return;
    }

    out.rule("2.7.2.1");
    if dte_type.is_invoice_class() && !dte_type.is_small_contributor() && !has_iva {
        out.push(
            Finding::inform_error(
                "2.7.2.1",
                CAT,
                format!("el tipo {} normalmente detalla IVA", dte_type.code()),
            )
            .with_field("Impuestos"),
        );
    }
}

fn iva_taxable_base(ctx: &RuleContext<'_>, out: &mut Sink) {
    let Some(grand_total) = ctx.doc.grand_total else {
        return;
    };
    let bases: Vec<Decimal> = ctx
        .doc
        .taxes
        .iter()
        .filter(|t| t.kind == Some(TaxType::Iva))
        .filter_map(|t| t.taxable_amount)
        .collect();
    if bases.is_empty() {
        return;
    }

    out.rule("2.7.5.1");
    let base_sum: Decimal = bases.iter().sum();
    if base_sum > grand_total + ctx.config.monetary_tolerance {
        out.push(
            Finding::inform_error(
                "2.7.5.1",
                CAT,
                format!(
                    "la suma de montos gravables de IVA ({base_sum}) excede el gran total ({grand_total})"
                ),
            )
            .with_field("Impuestos"),
        );
    }
}

fn totals_per_kind(ctx: &RuleContext<'_>, out: &mut Sink) {
    // One check per kind that declared a TotalMontoImpuesto.
    let mut kinds_seen: Vec<TaxType> = Vec::new();
    for tax in &ctx.doc.taxes {
        let (Some(kind), Some(declared_total)) = (tax.kind, tax.total_tax_amount) else {
            continue;
        };
        if kinds_seen.contains(&kind) {
            continue;
        }
        kinds_seen.push(kind);

        out.rule("2.7.7.1");
        let sum: Decimal = ctx
            .doc
            .taxes
            .iter()
            .filter(|t| t.kind == Some(kind))
            .filter_map(|t| t.tax_amount)
            .sum();
        if !approx_eq(sum, declared_total, ctx.config.monetary_tolerance) {
            out.push(
                Finding::inform_error(
                    "2.7.7.1",
                    CAT,
                    format!(
                        "el total declarado del impuesto {} no corresponde a la suma de sus montos",
                        kind.short_name()
                    ),
                )
                .with_field("Totales.TotalImpuestos")
                .with_expected_actual(sum.to_string(), declared_total.to_string()),
            );
        }
    }
}
