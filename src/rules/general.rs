//! Group 1 — general validations, part 1.
//!
//! Document type, emission dates, emisor identity and registry state,
//! establishment activity, receptor identity, export and public-show flag
//! coherence, currency.

use chrono::{Datelike, Duration, NaiveDate};

use super::context::RuleContext;
use super::engine::Sink;
use super::finding::{Category, Finding, SatLevel};
use crate::catalog;
use crate::format;
use crate::projection::ReceptorIdKind;
use crate::registry::{PersonStatus, TaxpayerStatus};

const CAT: Category = Category::GeneralPart1;

pub(crate) fn run(ctx: &RuleContext<'_>, out: &mut Sink) {
    document_type(ctx, out);
    dates(ctx, out);
    flags(ctx, out);
    currency(ctx, out);
    // Registry-backed checks last; a registry failure aborts the rest of
    // the group but the pure checks above already ran.
    if !emisor(ctx, out) {
        return;
    }
    receptor(ctx, out);
}

fn document_type(ctx: &RuleContext<'_>, out: &mut Sink) {
    out.rule("2.1.1.1");
    if ctx.doc.dte_type.is_none() {
        let raw = ctx.doc.raw_type.as_deref().unwrap_or("(ausente)");
        out.push(
            Finding::reject(
                "2.1.1.1",
                CAT,
                format!("tipo de documento '{raw}' no reconocido en el catálogo FEL"),
            )
            .with_field("DatosGenerales.Tipo")
            .with_expected_actual("tipo del catálogo FEL", raw),
        );
    }
}

fn dates(ctx: &RuleContext<'_>, out: &mut Sink) {
    let Some(emission) = ctx.doc.emission else {
        out.rule("ERR_101");
        out.push(
            Finding::reject(
                "ERR_101",
                CAT,
                "fecha y hora de emisión ausente o inválida",
            )
            .with_field("DatosGenerales.FechaHoraEmision"),
        );
        return;
    };
    let certified = ctx.certified_at();

    out.rule("2.2.1.3");
    if emission > certified {
        out.push(
            Finding::reject(
                "2.2.1.3",
                CAT,
                format!(
                    "la fecha de emisión {emission} es posterior a la fecha de certificación {certified}"
                ),
            )
            .with_field("DatosGenerales.FechaHoraEmision"),
        );
    }

    let exempt = ctx
        .doc
        .dte_type
        .is_some_and(|t| t.is_exemption_constancy());
    out.rule("2.2.1.1");
    if !exempt {
        let days = (certified.date() - emission.date()).num_days();
        if days > ctx.config.max_emission_days_back {
            out.push(
                Finding::inform_error(
                    "2.2.1.1",
                    CAT,
                    format!(
                        "la certificación ocurre {days} días después de la emisión; el máximo es {}",
                        ctx.config.max_emission_days_back
                    ),
                )
                .with_field("DatosGenerales.FechaHoraEmision")
                .with_expected_actual(
                    format!("≤ {} días", ctx.config.max_emission_days_back),
                    format!("{days} días"),
                ),
            );
        }
    }

    out.rule("2.2.1.2");
    if emission.date() > last_day_of_month(certified.date()) {
        out.push(
            Finding::inform_error(
                "2.2.1.2",
                CAT,
                format!(
                    "la fecha de emisión {} excede el último día del mes de certificación",
                    emission.date()
                ),
            )
            .with_field("DatosGenerales.FechaHoraEmision"),
        );
    }
}

fn last_day_of_month(d: NaiveDate) -> NaiveDate {
    let (y, m) = (d.year(), d.month());
    let (ny, nm) = if m == 12 { (y + 1, 1) } else { (y, m + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .map(|first| first - Duration::days(1))
        .unwrap_or(d)
}

fn flags(ctx: &RuleContext<'_>, out: &mut Sink) {
    let Some(dte_type) = ctx.doc.dte_type else {
        return;
    };

    out.rule("2.2.5.1");
    if ctx.doc.is_export && dte_type.forbids_export() {
        out.push(
            Finding::reject(
                "2.2.5.1",
                CAT,
                format!(
                    "el tipo {} no admite la marca de exportación",
                    dte_type.code()
                ),
            )
            .with_field("DatosGenerales.Exp"),
        );
    }

    out.rule("2.2.6.1");
    if ctx.doc.is_public_show && !dte_type.allows_public_show() {
        out.push(
            Finding::reject(
                "2.2.6.1",
                CAT,
                format!(
                    "el tipo {} no admite la marca de espectáculo público",
                    dte_type.code()
                ),
            )
            .with_field("DatosGenerales.EspectaculoPublico"),
        );
    }
}

fn currency(ctx: &RuleContext<'_>, out: &mut Sink) {
    out.rule("2.2.7.1");
    match ctx.doc.currency.as_deref() {
        None => out.push(
            Finding::reject("2.2.7.1", CAT, "código de moneda ausente")
                .with_field("DatosGenerales.CodigoMoneda"),
        ),
        Some(code) if !catalog::is_known_currency_code(code) => out.push(
            Finding::reject(
                "2.2.7.1",
                CAT,
                format!("código de moneda '{code}' no es un código ISO 4217 reconocido"),
            )
            .with_field("DatosGenerales.CodigoMoneda")
            .with_expected_actual("código ISO 4217 del catálogo", code),
        ),
        Some(_) => {}
    }
}

/// Emisor NIT, registry state, affiliations, establishment. Returns false
/// when a registry failure aborted the group.
fn emisor(ctx: &RuleContext<'_>, out: &mut Sink) -> bool {
    let Some(nit) = ctx.doc.emisor_nit.as_deref() else {
        out.rule("ERR_102");
        out.push(
            Finding::reject("ERR_102", CAT, "NIT del emisor ausente")
                .with_field("Emisor.NITEmisor"),
        );
        return true;
    };

    out.rule("2.2.2.1");
    if nit.eq_ignore_ascii_case("CF") || !format::validate_nit(nit) {
        out.push(
            Finding::reject(
                "2.2.2.1",
                CAT,
                format!("NIT del emisor '{nit}' con dígito verificador inválido"),
            )
            .with_field("Emisor.NITEmisor"),
        );
        // An invalid NIT cannot be looked up.
        return true;
    }

    out.rule("2.2.2.2");
    let info = match ctx.get_taxpayer(nit) {
        Ok(info) => info,
        Err(e) => {
            out.registry_failure(&e, CAT);
            return false;
        }
    };
    let Some(info) = info else {
        out.push(
            Finding::reject(
                "2.2.2.2",
                CAT,
                format!("NIT del emisor '{nit}' no registrado en el RTU"),
            )
            .with_field("Emisor.NITEmisor"),
        );
        return true;
    };

    out.rule("2.2.2.3");
    if info.status != TaxpayerStatus::Active {
        out.push(
            Finding::reject(
                "2.2.2.3",
                CAT,
                format!("el emisor '{nit}' no se encuentra activo en el RTU"),
            )
            .with_field("Emisor.NITEmisor")
            .with_expected_actual("ACTIVO", format!("{:?}", info.status)),
        );
    }

    if let Some(dte_type) = ctx.doc.dte_type {
        out.rule("2.2.2.4");
        if dte_type.is_small_contributor()
            && info.iva_affiliation != crate::registry::IvaAffiliation::PequenoContribuyente
        {
            out.push(
                Finding::reject(
                    "2.2.2.4",
                    CAT,
                    format!(
                        "el tipo {} exige afiliación de pequeño contribuyente",
                        dte_type.code()
                    ),
                )
                .with_field("Emisor.NITEmisor"),
            );
        }

        out.rule("2.2.2.5");
        if dte_type.is_agricultural()
            && info.iva_affiliation != crate::registry::IvaAffiliation::Agropecuario
        {
            out.push(
                Finding::reject(
                    "2.2.2.5",
                    CAT,
                    format!(
                        "el tipo {} exige afiliación de contribuyente agropecuario",
                        dte_type.code()
                    ),
                )
                .with_field("Emisor.NITEmisor"),
            );
        }
    }

    if let (Some(code), Some(emission)) = (ctx.doc.establishment_code, ctx.doc.emission) {
        out.rule("2.2.3.1");
        match ctx.establishment_active(nit, code, emission.date()) {
            Ok(true) => {}
            Ok(false) => out.push(
                Finding::reject(
                    "2.2.3.1",
                    CAT,
                    format!(
                        "el establecimiento {code} del emisor no estaba activo en la fecha de emisión"
                    ),
                )
                .with_field("Emisor.CodigoEstablecimiento"),
            ),
            Err(e) => {
                out.registry_failure(&e, CAT);
                return false;
            }
        }
    }

    true
}

fn receptor(ctx: &RuleContext<'_>, out: &mut Sink) {
    let Some(id) = ctx.doc.receptor_id.as_deref() else {
        out.rule("2.2.4.1");
        out.push(
            Finding::reject("2.2.4.1", CAT, "identificación del receptor ausente")
                .with_field("Receptor.IDReceptor"),
        );
        return;
    };

    match ctx.doc.receptor_id_kind {
        Some(ReceptorIdKind::Nit) => {
            out.rule("2.2.4.1");
            if !format::validate_nit(id) {
                out.push(
                    Finding::reject(
                        "2.2.4.1",
                        CAT,
                        format!("NIT del receptor '{id}' con dígito verificador inválido"),
                    )
                    .with_field("Receptor.IDReceptor"),
                );
                return;
            }
            out.rule("2.2.4.2");
            match ctx.nit_exists(id) {
                Ok(true) => {}
                Ok(false) => out.push(
                    Finding::inform_error(
                        "2.2.4.2",
                        CAT,
                        format!("NIT del receptor '{id}' no registrado en el RTU"),
                    )
                    .with_field("Receptor.IDReceptor")
                    .at_sat_level(SatLevel::Sat1),
                ),
                Err(e) => out.registry_failure(&e, CAT),
            }
        }
        Some(ReceptorIdKind::Cui) => {
            out.rule("2.2.4.5");
            if !format::validate_cui(id) {
                out.push(
                    Finding::reject(
                        "2.2.4.5",
                        CAT,
                        format!("CUI del receptor '{id}' con dígito verificador inválido"),
                    )
                    .with_field("Receptor.IDReceptor"),
                );
                return;
            }
            out.rule("2.2.4.6");
            match ctx.validate_cui(id) {
                Ok(record) if !record.valid => out.push(
                    Finding::inform_error(
                        "2.2.4.6",
                        CAT,
                        format!("CUI del receptor '{id}' no registrado en RENAP"),
                    )
                    .with_field("Receptor.IDReceptor")
                    .at_sat_level(SatLevel::Sat1),
                ),
                Ok(record) if record.status == PersonStatus::Deceased => out.push(
                    Finding::inform_error(
                        "2.2.4.6",
                        CAT,
                        format!("el CUI del receptor '{id}' corresponde a una persona fallecida"),
                    )
                    .with_field("Receptor.IDReceptor")
                    .at_sat_level(SatLevel::Sat1),
                ),
                Ok(_) => {}
                Err(e) => out.registry_failure(&e, CAT),
            }
        }
        // Foreign identifiers and consumidor final have no registry.
        Some(ReceptorIdKind::Ext) | Some(ReceptorIdKind::Cf) | None => {}
    }
}
