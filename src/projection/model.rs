use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{ComplementType, DteType, TaxType};

/// Kind of identifier the receptor presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceptorIdKind {
    Nit,
    Cui,
    /// Foreign identifier (pasaporte u otro documento extranjero).
    Ext,
    /// Consumidor final.
    Cf,
}

/// The normalized view of a DTE the rule engine operates on.
///
/// Built once from the XML tree and immutable afterwards. Required fields
/// the XML failed to provide stay `None`; their absence is a business-rule
/// finding, not a projection failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub dte_type: Option<DteType>,
    /// Raw `Tipo` attribute, kept for diagnostics when unrecognized.
    pub raw_type: Option<String>,
    pub emission: Option<NaiveDateTime>,
    pub certification: Option<NaiveDateTime>,
    pub currency: Option<String>,
    pub is_export: bool,
    pub is_public_show: bool,
    pub receptor_id: Option<String>,
    pub receptor_id_kind: Option<ReceptorIdKind>,
    pub emisor_nit: Option<String>,
    pub establishment_code: Option<u32>,
    pub total: Option<Decimal>,
    pub grand_total: Option<Decimal>,
    pub authorization_id: Option<String>,
    pub serie: Option<String>,
    pub numero: Option<String>,
    pub items: Vec<Item>,
    pub taxes: Vec<Tax>,
    pub phrases: Vec<Phrase>,
    pub complements: Vec<Complement>,
    pub signatures: Vec<SignatureDescriptor>,
}

/// B = bien, S = servicio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Good,
    Service,
}

impl ItemKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Good => "B",
            Self::Service => "S",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "B" => Some(Self::Good),
            "S" => Some(Self::Service),
            _ => None,
        }
    }
}

/// One invoice line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    pub line_number: Option<u32>,
    pub kind: Option<ItemKind>,
    /// Up to 6 decimal places.
    pub quantity: Option<Decimal>,
    /// Up to 6 decimal places.
    pub unit_price: Option<Decimal>,
    /// 2 decimal places; `quantity × unit_price` before discounts.
    pub price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub other_discount: Option<Decimal>,
    /// 2 decimal places; line total after discounts.
    pub total: Option<Decimal>,
    pub uom: Option<String>,
    pub description: Option<String>,
    pub product_code: Option<String>,
}

/// One tax summary entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tax {
    pub kind: Option<TaxType>,
    /// Raw `NombreCorto`, kept for diagnostics when unrecognized.
    pub raw_name: Option<String>,
    pub taxable_amount: Option<Decimal>,
    pub unit_code: Option<u32>,
    pub unit_quantity: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub total_tax_amount: Option<Decimal>,
}

/// A legal phrase attached to the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Phrase {
    pub phrase_type: Option<u8>,
    pub scenario: Option<u32>,
    pub resolution_number: Option<String>,
    pub resolution_date: Option<NaiveDate>,
    pub text: Option<String>,
}

/// A structured extension block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complement {
    pub kind: Option<ComplementType>,
    /// Raw `NombreComplemento`, kept for diagnostics when unrecognized.
    pub raw_name: Option<String>,
    pub payload: ComplementPayload,
}

/// Typed payloads for the complements the rules inspect; everything else
/// stays opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComplementPayload {
    Exportacion(Exportacion),
    ReferenciasNota(ReferenciasNota),
    EspectaculoPublico(EspectaculoPublico),
    RetencionFacturaEspecial(RetencionFacturaEspecial),
    Opaque,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Exportacion {
    pub incoterm: Option<String>,
    pub consignee_name: Option<String>,
    pub consignee_address: Option<String>,
    pub export_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenciasNota {
    /// Authorization UUID of the referenced document.
    pub origin_authorization: Option<String>,
    pub origin_emission_date: Option<NaiveDate>,
    pub origin_serie: Option<String>,
    pub origin_numero: Option<String>,
    pub motivo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EspectaculoPublico {
    pub event_name: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetencionFacturaEspecial {
    pub retained_iva: Option<Decimal>,
    pub retained_isr: Option<Decimal>,
}

/// Signature roles expected on a certified document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureRole {
    Emisor,
    Certificador,
}

impl SignatureRole {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_uppercase().as_str() {
            "EMISOR" => Some(Self::Emisor),
            "CERTIFICADOR" => Some(Self::Certificador),
            _ => None,
        }
    }
}

/// Structural descriptor of a signature block; cryptographic verification
/// happens outside the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureDescriptor {
    pub role: Option<SignatureRole>,
    pub algorithm: Option<String>,
    pub signed_at: Option<NaiveDateTime>,
}

/// Projection of an anulación payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anulacion {
    /// Authorization of the anulación itself.
    pub authorization_id: Option<String>,
    /// Authorization of the document being voided.
    pub voided_authorization_id: Option<String>,
    pub emisor_nit: Option<String>,
    /// Emission date of the voided document.
    pub original_emission: Option<NaiveDateTime>,
    pub void_date: Option<NaiveDateTime>,
    pub motivo: Option<String>,
}

impl Document {
    /// Complement entries of a given type.
    pub fn complements_of(&self, kind: ComplementType) -> impl Iterator<Item = &Complement> {
        self.complements
            .iter()
            .filter(move |c| c.kind == Some(kind))
    }

    /// Whether any complement of `kind` is attached.
    pub fn has_complement(&self, kind: ComplementType) -> bool {
        self.complements_of(kind).next().is_some()
    }

    /// Whether a phrase with the given type and scenario is attached.
    pub fn has_phrase(&self, phrase_type: u8, scenario: u32) -> bool {
        self.phrases
            .iter()
            .any(|p| p.phrase_type == Some(phrase_type) && p.scenario == Some(scenario))
    }
}
