//! # certifel
//!
//! Certification engine for Guatemala's FEL regime: validates DTE XML
//! documents against the SAT schema and business rulebook, producing a
//! categorized, severity-graded verdict. An analogous pipeline validates
//! anulaciones.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating
//! point. Rule defects are accumulated as findings, not raised; the
//! engine never throws past its public boundary.
//!
//! ## Quick Start
//!
//! Running the business rules over a projection, with in-memory
//! registries:
//!
//! ```rust
//! use certifel::cancel::CancelToken;
//! use certifel::catalog::DteType;
//! use certifel::config::ValidatorConfig;
//! use certifel::projection::{Document, Item, ItemKind, ReceptorIdKind};
//! use certifel::registry::*;
//! use certifel::rules::validate_projection;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let rtu = InMemoryTaxpayerRegistry::new()
//!     .with_taxpayer("109208", TaxpayerInfo {
//!         status: TaxpayerStatus::Active,
//!         iva_affiliation: IvaAffiliation::General,
//!         isr_affiliation: IsrAffiliation::Regular,
//!     })
//!     .with_establishment("109208", 1);
//! let renap = InMemoryPersonsRegistry::new();
//!
//! let mut doc = Document::default();
//! doc.dte_type = Some(DteType::Fact);
//! doc.raw_type = Some("FACT".into());
//! doc.emission = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap().and_hms_opt(10, 0, 0);
//! doc.certification = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap().and_hms_opt(11, 0, 0);
//! doc.currency = Some("GTQ".into());
//! doc.emisor_nit = Some("109208".into());
//! doc.establishment_code = Some(1);
//! doc.receptor_id = Some("CF".into());
//! doc.receptor_id_kind = Some(ReceptorIdKind::Cf);
//! doc.grand_total = Some(dec!(100.00));
//! doc.items.push(Item {
//!     line_number: Some(1),
//!     kind: Some(ItemKind::Good),
//!     quantity: Some(dec!(1)),
//!     unit_price: Some(dec!(100.00)),
//!     price: Some(dec!(100.00)),
//!     total: Some(dec!(100.00)),
//!     description: Some("Café".into()),
//!     ..Item::default()
//! });
//!
//! let verdict = validate_projection(
//!     &doc,
//!     &rtu,
//!     &renap,
//!     &ValidatorConfig::default(),
//!     &CancelToken::new(),
//! );
//! // The CF cap (2.2.4.11) does not fire below Q2500.
//! assert!(!verdict.has_code("2.2.4.11"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `http` (default) | HTTPS schema fetching and HTTP registry clients |

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod projection;
pub mod registry;
pub mod rules;
pub mod schema;

mod validator;

pub use crate::cancel::CancelToken;
pub use crate::config::ValidatorConfig;
pub use crate::error::FelError;
pub use crate::rules::{Category, Finding, SatLevel, Severity, Verdict};
pub use crate::validator::DteValidator;
