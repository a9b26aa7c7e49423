//! Registry clients — capability interfaces over the RTU taxpayer
//! registry and the RENAP persons registry.
//!
//! Implementations answer *negatively* (a NIT does not exist, a CUI is
//! unknown) through the return values; transport and availability
//! problems surface as [`RegistryError`] so the engine can distinguish a
//! negative answer from an unreachable registry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod memory;
#[cfg(feature = "http")]
mod http;

pub use memory::*;
#[cfg(feature = "http")]
pub use http::*;

/// Transport-plane registry failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The registry could not be reached or answered abnormally.
    #[error("registro no disponible: {0}")]
    Unavailable(String),
    /// The lookup exceeded its time budget.
    #[error("tiempo de espera agotado consultando el registro")]
    Timeout,
    /// The caller cancelled the validation mid-lookup.
    #[error("consulta cancelada")]
    Cancelled,
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// RTU taxpayer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxpayerStatus {
    Active,
    Inactive,
    Suspended,
}

/// IVA regime affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum IvaAffiliation {
    /// GEN — régimen general.
    General,
    /// PEQ — pequeño contribuyente.
    PequenoContribuyente,
    /// AGR — contribuyente agropecuario.
    Agropecuario,
    /// AGENT — agente de retención.
    AgenteRetencion,
}

/// ISR regime affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum IsrAffiliation {
    /// REG — sujeto a pagos trimestrales.
    Regular,
    /// OPT — régimen opcional simplificado.
    Optional,
}

/// RTU answer for a taxpayer lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerInfo {
    pub status: TaxpayerStatus,
    pub iva_affiliation: IvaAffiliation,
    pub isr_affiliation: IsrAffiliation,
}

/// RENAP person status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PersonStatus {
    Active,
    Deceased,
    Unknown,
}

/// RENAP answer for a CUI lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuiRecord {
    /// Whether RENAP recognizes the CUI at all.
    pub valid: bool,
    pub status: PersonStatus,
    pub name: Option<String>,
}

impl CuiRecord {
    /// The negative answer: RENAP does not know this CUI.
    pub fn unknown() -> Self {
        Self {
            valid: false,
            status: PersonStatus::Unknown,
            name: None,
        }
    }
}

/// Lookups against the RTU taxpayer registry.
pub trait TaxpayerRegistry: Send + Sync {
    /// Whether the NIT is registered at all.
    fn nit_exists(&self, nit: &str) -> RegistryResult<bool>;

    /// Full taxpayer record, `None` when the NIT is not registered.
    fn get_taxpayer(&self, nit: &str) -> RegistryResult<Option<TaxpayerInfo>>;

    /// Whether the establishment was active on `at_date`.
    fn establishment_active(&self, nit: &str, code: u32, at_date: NaiveDate)
    -> RegistryResult<bool>;
}

/// Lookups against the RENAP persons registry.
pub trait PersonsRegistry: Send + Sync {
    fn validate_cui(&self, cui: &str) -> RegistryResult<CuiRecord>;
}
