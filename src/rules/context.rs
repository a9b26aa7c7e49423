use chrono::{NaiveDateTime, Utc};

use crate::cancel::CancelToken;
use crate::config::ValidatorConfig;
use crate::projection::Document;
use crate::registry::{
    CuiRecord, PersonsRegistry, RegistryError, RegistryResult, TaxpayerInfo, TaxpayerRegistry,
};

/// Everything a rule group may read.
///
/// Groups are pure functions of this context; registry calls go through
/// the cancel-guarded wrappers so a cancellation aborts the lookup.
pub struct RuleContext<'a> {
    pub doc: &'a Document,
    pub taxpayers: &'a dyn TaxpayerRegistry,
    pub persons: &'a dyn PersonsRegistry,
    pub config: &'a ValidatorConfig,
    pub cancel: &'a CancelToken,
}

impl RuleContext<'_> {
    /// Certification instant the date rules measure against: the
    /// document's own certification timestamp when present, otherwise the
    /// wall clock.
    pub fn certified_at(&self) -> NaiveDateTime {
        self.doc
            .certification
            .unwrap_or_else(|| Utc::now().naive_utc())
    }

    fn guard(&self) -> RegistryResult<()> {
        if self.cancel.is_cancelled() {
            Err(RegistryError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn nit_exists(&self, nit: &str) -> RegistryResult<bool> {
        self.guard()?;
        self.taxpayers.nit_exists(nit)
    }

    pub fn get_taxpayer(&self, nit: &str) -> RegistryResult<Option<TaxpayerInfo>> {
        self.guard()?;
        self.taxpayers.get_taxpayer(nit)
    }

    pub fn establishment_active(
        &self,
        nit: &str,
        code: u32,
        at_date: chrono::NaiveDate,
    ) -> RegistryResult<bool> {
        self.guard()?;
        self.taxpayers.establishment_active(nit, code, at_date)
    }

    pub fn validate_cui(&self, cui: &str) -> RegistryResult<CuiRecord> {
        self.guard()?;
        self.persons.validate_cui(cui)
    }
}
