//! Anulación validation — the reduced rule set for document voiding.

use tracing::debug;

use super::finding::{Category, Finding};
use crate::cancel::CancelToken;
use crate::format::{is_uuid_v4, validate_nit};
use crate::registry::{RegistryError, TaxpayerRegistry, TaxpayerStatus};
use crate::projection::Anulacion;

const CAT: Category = Category::GeneralPart1;

/// Run the anulación rules, returning findings plus the evaluated codes.
pub(crate) fn run_anulacion(
    anulacion: &Anulacion,
    taxpayers: &dyn TaxpayerRegistry,
    cancel: &CancelToken,
) -> (Vec<Finding>, Vec<String>) {
    let mut findings = Vec::new();
    let mut applied: Vec<String> = Vec::new();

    applied.push("4.1.1".into());
    match anulacion.voided_authorization_id.as_deref() {
        Some(uuid) if is_uuid_v4(uuid) => {}
        Some(uuid) => findings.push(
            Finding::reject(
                "4.1.1",
                CAT,
                format!("el documento a anular '{uuid}' no es un UUID v4"),
            )
            .with_field("DatosGenerales.NumeroDocumentoAAnular"),
        ),
        None => findings.push(
            Finding::reject("4.1.1", CAT, "número del documento a anular ausente")
                .with_field("DatosGenerales.NumeroDocumentoAAnular"),
        ),
    }

    applied.push("4.1.2".into());
    if let Some(uuid) = anulacion.authorization_id.as_deref() {
        if !is_uuid_v4(uuid) {
            findings.push(
                Finding::reject(
                    "4.1.2",
                    CAT,
                    format!("la autorización de la anulación '{uuid}' no es un UUID v4"),
                )
                .with_field("Certificacion.NumeroAutorizacion"),
            );
        }
    }

    applied.push("4.1.3".into());
    emisor_state(anulacion, taxpayers, cancel, &mut findings);

    applied.push("4.1.4".into());
    if let (Some(original), Some(void_date)) =
        (anulacion.original_emission, anulacion.void_date)
    {
        if void_date < original {
            findings.push(
                Finding::reject(
                    "4.1.4",
                    CAT,
                    format!(
                        "la fecha de anulación {void_date} es anterior a la emisión original {original}"
                    ),
                )
                .with_field("DatosGenerales.FechaHoraAnulacion"),
            );
        }
    }

    applied.push("4.1.5".into());
    if anulacion
        .motivo
        .as_deref()
        .is_none_or(|m| m.trim().is_empty())
    {
        findings.push(
            Finding::inform_error("4.1.5", CAT, "motivo de anulación vacío")
                .with_field("DatosGenerales.MotivoAnulacion"),
        );
    }

    debug!(findings = findings.len(), "reglas de anulación evaluadas");
    (findings, applied)
}

fn emisor_state(
    anulacion: &Anulacion,
    taxpayers: &dyn TaxpayerRegistry,
    cancel: &CancelToken,
    findings: &mut Vec<Finding>,
) {
    let Some(nit) = anulacion.emisor_nit.as_deref() else {
        findings.push(
            Finding::reject("4.1.3", CAT, "NIT del emisor ausente")
                .with_field("DatosGenerales.NITEmisor"),
        );
        return;
    };

    if nit.eq_ignore_ascii_case("CF") || !validate_nit(nit) {
        findings.push(
            Finding::reject(
                "4.1.3",
                CAT,
                format!("NIT del emisor '{nit}' con dígito verificador inválido"),
            )
            .with_field("DatosGenerales.NITEmisor"),
        );
        return;
    }

    if cancel.is_cancelled() {
        findings.push(Finding::reject(
            "CANCELLED",
            CAT,
            crate::catalog::message_for("CANCELLED").unwrap_or_default(),
        ));
        return;
    }

    match taxpayers.get_taxpayer(nit) {
        Ok(Some(info)) if info.status == TaxpayerStatus::Active => {}
        Ok(Some(_)) => findings.push(
            Finding::reject(
                "4.1.3",
                CAT,
                format!("el emisor '{nit}' no se encuentra activo en el RTU"),
            )
            .with_field("DatosGenerales.NITEmisor"),
        ),
        Ok(None) => findings.push(
            Finding::reject(
                "4.1.3",
                CAT,
                format!("NIT del emisor '{nit}' no registrado en el RTU"),
            )
            .with_field("DatosGenerales.NITEmisor"),
        ),
        Err(RegistryError::Cancelled) => findings.push(Finding::reject(
            "CANCELLED",
            CAT,
            crate::catalog::message_for("CANCELLED").unwrap_or_default(),
        )),
        Err(e) => findings.push(Finding::reject(
            "REGISTRY_UNAVAILABLE",
            CAT,
            format!(
                "{}: {e}",
                crate::catalog::message_for("REGISTRY_UNAVAILABLE").unwrap_or_default()
            ),
        )),
    }
}
