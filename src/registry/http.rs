//! HTTP registry clients for the RTU and RENAP lookup services.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use super::{
    CuiRecord, IsrAffiliation, IvaAffiliation, PersonStatus, PersonsRegistry, RegistryError,
    RegistryResult, TaxpayerInfo, TaxpayerRegistry, TaxpayerStatus,
};

/// Blocking HTTP client against the miniature-RTU lookup service.
///
/// The service is a thin JSON facade over the registry; every endpoint is
/// a GET. Timeouts and transport failures map to
/// [`RegistryError::Unavailable`] / [`RegistryError::Timeout`] so the
/// engine reports `REGISTRY_UNAVAILABLE` instead of inventing a negative
/// answer.
#[derive(Debug, Clone)]
pub struct HttpTaxpayerRegistry {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTaxpayerRegistry {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RegistryResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> RegistryResult<T> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let resp = self.client.get(&url).send().map_err(map_transport)?;
        let status = resp.status();
        let body = resp.text().map_err(map_transport)?;
        if !status.is_success() {
            return Err(RegistryError::Unavailable(format!("HTTP {status}: {body}")));
        }
        serde_json::from_str(&body).map_err(|e| RegistryError::Unavailable(e.to_string()))
    }
}

fn map_transport(e: reqwest::Error) -> RegistryError {
    if e.is_timeout() {
        RegistryError::Timeout
    } else {
        RegistryError::Unavailable(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    exists: bool,
}

#[derive(Debug, Deserialize)]
struct TaxpayerResponse {
    found: bool,
    status: Option<String>,
    #[serde(rename = "ivaAffiliation")]
    iva_affiliation: Option<String>,
    #[serde(rename = "isrAffiliation")]
    isr_affiliation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EstablishmentResponse {
    active: bool,
}

fn parse_status(s: &str) -> Option<TaxpayerStatus> {
    match s {
        "ACTIVO" | "ACTIVE" => Some(TaxpayerStatus::Active),
        "INACTIVO" | "INACTIVE" => Some(TaxpayerStatus::Inactive),
        "SUSPENDIDO" | "SUSPENDED" => Some(TaxpayerStatus::Suspended),
        _ => None,
    }
}

fn parse_iva(s: &str) -> Option<IvaAffiliation> {
    match s {
        "GEN" => Some(IvaAffiliation::General),
        "PEQ" => Some(IvaAffiliation::PequenoContribuyente),
        "AGR" => Some(IvaAffiliation::Agropecuario),
        "AGENT" => Some(IvaAffiliation::AgenteRetencion),
        _ => None,
    }
}

fn parse_isr(s: &str) -> Option<IsrAffiliation> {
    match s {
        "REG" => Some(IsrAffiliation::Regular),
        "OPT" => Some(IsrAffiliation::Optional),
        _ => None,
    }
}

impl TaxpayerRegistry for HttpTaxpayerRegistry {
    fn nit_exists(&self, nit: &str) -> RegistryResult<bool> {
        let resp: ExistsResponse = self.get_json(&format!("nit/{nit}/exists"))?;
        Ok(resp.exists)
    }

    fn get_taxpayer(&self, nit: &str) -> RegistryResult<Option<TaxpayerInfo>> {
        let resp: TaxpayerResponse = self.get_json(&format!("nit/{nit}"))?;
        if !resp.found {
            return Ok(None);
        }
        let status = resp.status.as_deref().and_then(parse_status);
        let iva = resp.iva_affiliation.as_deref().and_then(parse_iva);
        let isr = resp.isr_affiliation.as_deref().and_then(parse_isr);
        match (status, iva, isr) {
            (Some(status), Some(iva_affiliation), Some(isr_affiliation)) => {
                Ok(Some(TaxpayerInfo {
                    status,
                    iva_affiliation,
                    isr_affiliation,
                }))
            }
            _ => Err(RegistryError::Unavailable(
                "respuesta del RTU con campos no reconocidos".into(),
            )),
        }
    }

    fn establishment_active(
        &self,
        nit: &str,
        code: u32,
        at_date: NaiveDate,
    ) -> RegistryResult<bool> {
        let resp: EstablishmentResponse =
            self.get_json(&format!("nit/{nit}/establecimiento/{code}?fecha={at_date}"))?;
        Ok(resp.active)
    }
}

/// Blocking HTTP client against the RENAP CUI validation service.
#[derive(Debug, Clone)]
pub struct HttpPersonsRegistry {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpPersonsRegistry {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RegistryResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CuiResponse {
    valid: bool,
    status: Option<String>,
    name: Option<String>,
}

impl PersonsRegistry for HttpPersonsRegistry {
    fn validate_cui(&self, cui: &str) -> RegistryResult<CuiRecord> {
        let url = format!("{}/cui/{}", self.base_url.trim_end_matches('/'), cui);
        let resp = self.client.get(&url).send().map_err(map_transport)?;
        let status = resp.status();
        let body = resp.text().map_err(map_transport)?;
        if !status.is_success() {
            return Err(RegistryError::Unavailable(format!("HTTP {status}: {body}")));
        }
        let parsed: CuiResponse =
            serde_json::from_str(&body).map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        let status = match parsed.status.as_deref() {
            Some("VIGENTE") | Some("ACTIVE") => PersonStatus::Active,
            Some("FALLECIDO") | Some("DECEASED") => PersonStatus::Deceased,
            _ => PersonStatus::Unknown,
        };
        Ok(CuiRecord {
            valid: parsed.valid,
            status,
            name: parsed.name.filter(|n| !n.is_empty()),
        })
    }
}
