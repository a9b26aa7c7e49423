use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::DteType;

/// How a finding gates the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Blocks certification.
    Reject,
    /// Reported to SAT, does not block.
    InformError,
    /// Reported to SAT, does not block.
    InformWarning,
}

/// Rule family a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    GeneralPart1,
    GeneralPart2,
    TaxSpecific,
    DteTypeSpecific,
    PhraseValidation,
    ComplementValidation,
    GeneralPart3,
    GeneralPart4,
}

/// Tier at which the rule would fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SatLevel {
    /// This system.
    Certificador,
    Sat1,
    Sat2,
}

/// One diagnostic produced by the validation pipeline.
///
/// Messages are Spanish per the tax-authority taxonomy; `code` is the
/// stable correlation key (a rulebook `N.N.N.N` code or a surface
/// `ERR_xxx` / engine-plane code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: String,
    pub message: String,
    pub severity: Severity,
    pub category: Category,
    pub xpath: Option<String>,
    pub field: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub sat_level: SatLevel,
}

impl Finding {
    pub fn new(
        code: impl Into<String>,
        severity: Severity,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            category,
            xpath: None,
            field: None,
            expected: None,
            actual: None,
            sat_level: SatLevel::Certificador,
        }
    }

    pub fn reject(
        code: impl Into<String>,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, Severity::Reject, category, message)
    }

    pub fn inform_error(
        code: impl Into<String>,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, Severity::InformError, category, message)
    }

    pub fn inform_warning(
        code: impl Into<String>,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, Severity::InformWarning, category, message)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_xpath(mut self, xpath: impl Into<String>) -> Self {
        self.xpath = Some(xpath.into());
        self
    }

    pub fn with_expected_actual(
        mut self,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    pub fn at_sat_level(mut self, level: SatLevel) -> Self {
        self.sat_level = level;
        self
    }

    pub fn is_reject(&self) -> bool {
        self.severity == Severity::Reject
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}] {}: {}", self.code, field, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// Aggregate outcome of one validation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// True iff no REJECT finding was produced.
    pub is_valid: bool,
    /// REJECT findings, in emission order.
    pub errors: Vec<Finding>,
    /// INFORM_ERROR and INFORM_WARNING findings, in emission order.
    pub warnings: Vec<Finding>,
    /// Rule codes evaluated, in evaluation order, deduplicated.
    pub rules_applied: Vec<String>,
    pub validation_time: DateTime<Utc>,
    pub document_type: Option<DteType>,
    pub schema_used: Option<String>,
    /// Rulebook edition the rules were drawn from.
    pub rulebook_version: String,
}

impl Verdict {
    /// Partition findings into the verdict shape.
    pub fn from_findings(
        findings: Vec<Finding>,
        rules_applied: Vec<String>,
        document_type: Option<DteType>,
        schema_used: Option<String>,
        rulebook_version: impl Into<String>,
    ) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for f in findings {
            if f.is_reject() {
                errors.push(f);
            } else {
                warnings.push(f);
            }
        }
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            rules_applied,
            validation_time: Utc::now(),
            document_type,
            schema_used,
            rulebook_version: rulebook_version.into(),
        }
    }

    /// All findings: errors first, then warnings.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Whether any finding carries `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.findings().any(|f| f.code == code)
    }

    /// First finding carrying `code`, if any.
    pub fn finding(&self, code: &str) -> Option<&Finding> {
        self.findings().find(|f| f.code == code)
    }
}
