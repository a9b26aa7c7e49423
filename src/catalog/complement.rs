use serde::{Deserialize, Serialize};

use super::dte::DteType;

/// Closed set of complement types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplementType {
    Exportacion,
    RetencionFacturaEspecial,
    AbonosFacturaCambiaria,
    ReferenciasNota,
    CobroCuentaAjena,
    EspectaculosPublicos,
    ReferenciasConstancia,
    MediosPago,
    Decreto312022,
    OrganizacionesPoliticas,
    TrasladoMercancias,
}

impl ComplementType {
    /// `NombreComplemento` as it appears on the wire.
    pub fn xml_name(&self) -> &'static str {
        match self {
            Self::Exportacion => "Exportacion",
            Self::RetencionFacturaEspecial => "RetencionesFacturaEspecial",
            Self::AbonosFacturaCambiaria => "AbonosFacturaCambiaria",
            Self::ReferenciasNota => "ReferenciasNota",
            Self::CobroCuentaAjena => "CobroXCuentaAjena",
            Self::EspectaculosPublicos => "EspectaculosPublicos",
            Self::ReferenciasConstancia => "ReferenciasConstancia",
            Self::MediosPago => "MediosDePago",
            Self::Decreto312022 => "Decreto312022",
            Self::OrganizacionesPoliticas => "OrganizacionesPoliticas",
            Self::TrasladoMercancias => "TrasladoMercancias",
        }
    }

    /// Parse from `NombreComplemento`.
    pub fn from_xml_name(name: &str) -> Option<Self> {
        match name.trim() {
            "Exportacion" => Some(Self::Exportacion),
            "RetencionesFacturaEspecial" => Some(Self::RetencionFacturaEspecial),
            "AbonosFacturaCambiaria" => Some(Self::AbonosFacturaCambiaria),
            "ReferenciasNota" => Some(Self::ReferenciasNota),
            "CobroXCuentaAjena" => Some(Self::CobroCuentaAjena),
            "EspectaculosPublicos" => Some(Self::EspectaculosPublicos),
            "ReferenciasConstancia" => Some(Self::ReferenciasConstancia),
            "MediosDePago" => Some(Self::MediosPago),
            "Decreto312022" => Some(Self::Decreto312022),
            "OrganizacionesPoliticas" => Some(Self::OrganizacionesPoliticas),
            "TrasladoMercancias" => Some(Self::TrasladoMercancias),
            _ => None,
        }
    }
}

/// Whether a complement type is admissible on a document type.
///
/// Inadmissible pairs are warnings, not rejections; mandatory-complement
/// rules live in `rules::complements`.
pub fn is_admissible(dte: DteType, complement: ComplementType) -> bool {
    use ComplementType::*;
    match complement {
        Exportacion => matches!(
            dte,
            DteType::Fact | DteType::Fcam | DteType::Ndeb | DteType::Ncre
        ),
        RetencionFacturaEspecial => dte == DteType::Fesp,
        AbonosFacturaCambiaria => matches!(
            dte,
            DteType::Fcam | DteType::Fcap | DteType::Fcca | DteType::Fcpe | DteType::Fcae
        ),
        ReferenciasNota => matches!(dte, DteType::Ndeb | DteType::Ncre | DteType::Nabn),
        CobroCuentaAjena => matches!(dte, DteType::Fact | DteType::Fcam),
        EspectaculosPublicos => dte.allows_public_show(),
        ReferenciasConstancia => dte.is_exemption_constancy(),
        MediosPago => dte.is_invoice_class(),
        Decreto312022 => dte.is_invoice_class(),
        OrganizacionesPoliticas => dte == DteType::Fact,
        TrasladoMercancias => dte == DteType::Nev,
    }
}
