//! Group 2 — item validations.
//!
//! Count caps per document class, line numbering, per-item arithmetic,
//! discount bounds, and good-vs-service constraints.

use rust_decimal::Decimal;

use super::context::RuleContext;
use super::engine::Sink;
use super::finding::{Category, Finding};
use crate::format::{approx_eq, in_bounds, round2};
use crate::projection::{Item, ItemKind};

const CAT: Category = Category::GeneralPart2;
const TYPE_CAT: Category = Category::DteTypeSpecific;

pub(crate) fn run(ctx: &RuleContext<'_>, out: &mut Sink) {
    counts(ctx, out);
    line_numbers(ctx, out);
    for (idx, item) in ctx.doc.items.iter().enumerate() {
        arithmetic(ctx, idx, item, out);
        kind_constraints(ctx, idx, item, out);
    }
}

fn counts(ctx: &RuleContext<'_>, out: &mut Sink) {
    out.rule("2.3.1.3");
    if ctx.doc.items.is_empty() {
        out.push(
            Finding::reject("2.3.1.3", CAT, "el documento no contiene ítems").with_field("Items"),
        );
        return;
    }

    out.rule("2.3.1.1");
    if ctx.doc.is_public_show && ctx.doc.items.len() != 1 {
        out.push(
            Finding::reject(
                "2.3.1.1",
                TYPE_CAT,
                format!(
                    "los documentos de espectáculo público llevan exactamente un ítem, no {}",
                    ctx.doc.items.len()
                ),
            )
            .with_field("Items"),
        );
    }

    if let Some(max) = ctx.doc.dte_type.and_then(|t| t.max_items()) {
        out.rule("2.3.1.2");
        if ctx.doc.items.len() > max {
            out.push(
                Finding::reject(
                    "2.3.1.2",
                    TYPE_CAT,
                    format!(
                        "el tipo {} admite a lo sumo {max} ítems, no {}",
                        ctx.doc.dte_type.map(|t| t.code()).unwrap_or("?"),
                        ctx.doc.items.len()
                    ),
                )
                .with_field("Items"),
            );
        }
    }
}

fn line_numbers(ctx: &RuleContext<'_>, out: &mut Sink) {
    if ctx.doc.items.is_empty() {
        return;
    }
    out.rule("2.3.2.1");

    let mut numbers: Vec<u32> = Vec::with_capacity(ctx.doc.items.len());
    for (idx, item) in ctx.doc.items.iter().enumerate() {
        match item.line_number {
            Some(n) if n >= 1 => numbers.push(n),
            _ => {
                out.push(
                    Finding::reject(
                        "2.3.2.1",
                        CAT,
                        "número de línea ausente o menor que 1".to_string(),
                    )
                    .with_field(format!("Items.Item[{idx}].NumeroLinea")),
                );
                return;
            }
        }
    }

    numbers.sort_unstable();
    let gapless = numbers
        .iter()
        .enumerate()
        .all(|(i, n)| *n == (i as u32) + 1);
    if !gapless {
        out.push(
            Finding::reject(
                "2.3.2.1",
                CAT,
                format!(
                    "los números de línea deben formar 1..{} sin huecos ni repetidos",
                    ctx.doc.items.len()
                ),
            )
            .with_field("Items"),
        );
    }
}

fn arithmetic(ctx: &RuleContext<'_>, idx: usize, item: &Item, out: &mut Sink) {
    let tol = ctx.config.monetary_tolerance;
    let field = |name: &str| format!("Items.Item[{idx}].{name}");

    out.rule("2.3.3.1");
    match item.quantity {
        Some(q) if in_bounds(q) => {}
        Some(q) => out.push(
            Finding::reject(
                "2.3.3.1",
                CAT,
                format!("cantidad {q} fuera del rango permitido"),
            )
            .with_field(field("Cantidad")),
        ),
        None => out.push(
            Finding::reject("2.3.3.1", CAT, "cantidad ausente o inválida")
                .with_field(field("Cantidad")),
        ),
    }

    out.rule("2.3.3.2");
    match item.unit_price {
        Some(p) if in_bounds(p) => {}
        Some(p) => out.push(
            Finding::reject(
                "2.3.3.2",
                CAT,
                format!("precio unitario {p} fuera del rango permitido"),
            )
            .with_field(field("PrecioUnitario")),
        ),
        None => out.push(
            Finding::reject("2.3.3.2", CAT, "precio unitario ausente o inválido")
                .with_field(field("PrecioUnitario")),
        ),
    }

    out.rule("2.3.4.1");
    if let (Some(quantity), Some(unit_price), Some(price)) =
        (item.quantity, item.unit_price, item.price)
    {
        let expected = round2(quantity * unit_price);
        if !approx_eq(price, expected, tol) {
            out.push(
                Finding::reject(
                    "2.3.4.1",
                    CAT,
                    format!(
                        "el precio no corresponde a cantidad × precio unitario ({quantity} × {unit_price})"
                    ),
                )
                .with_field(field("Precio"))
                .with_expected_actual(expected.to_string(), price.to_string()),
            );
        }
    }

    let price = item.price.unwrap_or(Decimal::ZERO);
    let discount = item.discount.unwrap_or(Decimal::ZERO);
    let other = item.other_discount.unwrap_or(Decimal::ZERO);

    out.rule("2.3.5.1");
    if discount < Decimal::ZERO || discount > price {
        out.push(
            Finding::reject(
                "2.3.5.1",
                CAT,
                format!("el descuento {discount} excede el precio {price} o es negativo"),
            )
            .with_field(field("Descuento")),
        );
    }

    out.rule("2.3.5.2");
    if other < Decimal::ZERO || other > price - discount {
        out.push(
            Finding::reject(
                "2.3.5.2",
                CAT,
                format!(
                    "otros descuentos {other} exceden el precio menos el descuento ({})",
                    price - discount
                ),
            )
            .with_field(field("OtrosDescuentos")),
        );
    }

    out.rule("2.3.6.1");
    if let (Some(price), Some(total)) = (item.price, item.total) {
        let expected = round2(price - discount - other);
        if !approx_eq(total, expected, tol) {
            out.push(
                Finding::reject(
                    "2.3.6.1",
                    CAT,
                    "el total del ítem no corresponde al precio menos descuentos",
                )
                .with_field(field("Total"))
                .with_expected_actual(expected.to_string(), total.to_string()),
            );
        }
    }

    out.rule("2.3.7.1");
    if item
        .description
        .as_deref()
        .is_none_or(|d| d.trim().is_empty())
    {
        out.push(
            Finding::inform_error("2.3.7.1", CAT, "descripción del ítem vacía")
                .with_field(field("Descripcion")),
        );
    }
}

fn kind_constraints(ctx: &RuleContext<'_>, idx: usize, item: &Item, out: &mut Sink) {
    let field = format!("Items.Item[{idx}].BienOServicio");

    if let Some(dte_type) = ctx.doc.dte_type {
        out.rule("2.3.8.1");
        if dte_type.is_agricultural() && item.kind != Some(ItemKind::Good) {
            out.push(
                Finding::reject(
                    "2.3.8.1",
                    TYPE_CAT,
                    format!(
                        "los documentos agropecuarios ({}) solo admiten bienes",
                        dte_type.code()
                    ),
                )
                .with_field(field.clone())
                .with_expected_actual("B", item.kind.map(|k| k.code()).unwrap_or("(ausente)")),
            );
        }
    }

    out.rule("2.3.8.2");
    if ctx.doc.is_public_show && item.kind != Some(ItemKind::Service) {
        out.push(
            Finding::reject(
                "2.3.8.2",
                TYPE_CAT,
                "los documentos de espectáculo público solo admiten servicios",
            )
            .with_field(field)
            .with_expected_actual("S", item.kind.map(|k| k.code()).unwrap_or("(ausente)")),
        );
    }
}
