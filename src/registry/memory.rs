use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::{
    CuiRecord, PersonsRegistry, RegistryResult, TaxpayerInfo, TaxpayerRegistry,
};

/// In-memory RTU snapshot.
///
/// Backs tests and embedded deployments; every lookup is infallible and a
/// missing entry is the negative answer.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaxpayerRegistry {
    taxpayers: HashMap<String, TaxpayerInfo>,
    establishments: HashSet<(String, u32)>,
}

impl InMemoryTaxpayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taxpayer(mut self, nit: impl Into<String>, info: TaxpayerInfo) -> Self {
        self.taxpayers.insert(nit.into(), info);
        self
    }

    pub fn with_establishment(mut self, nit: impl Into<String>, code: u32) -> Self {
        self.establishments.insert((nit.into(), code));
        self
    }
}

impl TaxpayerRegistry for InMemoryTaxpayerRegistry {
    fn nit_exists(&self, nit: &str) -> RegistryResult<bool> {
        Ok(self.taxpayers.contains_key(nit))
    }

    fn get_taxpayer(&self, nit: &str) -> RegistryResult<Option<TaxpayerInfo>> {
        Ok(self.taxpayers.get(nit).copied())
    }

    fn establishment_active(
        &self,
        nit: &str,
        code: u32,
        _at_date: NaiveDate,
    ) -> RegistryResult<bool> {
        Ok(self.establishments.contains(&(nit.to_string(), code)))
    }
}

/// In-memory RENAP snapshot.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPersonsRegistry {
    persons: HashMap<String, CuiRecord>,
}

impl InMemoryPersonsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_person(mut self, cui: impl Into<String>, record: CuiRecord) -> Self {
        self.persons.insert(cui.into(), record);
        self
    }
}

impl PersonsRegistry for InMemoryPersonsRegistry {
    fn validate_cui(&self, cui: &str) -> RegistryResult<CuiRecord> {
        Ok(self
            .persons
            .get(cui)
            .cloned()
            .unwrap_or_else(CuiRecord::unknown))
    }
}
