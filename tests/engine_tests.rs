//! Business-rule engine tests over hand-built projections.
//!
//! These exercise the boundary scenarios of the rulebook: the CF cap, IVA
//! recomputation, emission windows, export complements, public shows, and
//! serie/número derivation.

use certifel::cancel::CancelToken;
use certifel::catalog::{ComplementType, DteType};
use certifel::config::ValidatorConfig;
use certifel::projection::*;
use certifel::registry::*;
use certifel::rules::{Severity, Verdict, validate_projection};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const EMISOR_NIT: &str = "109208";
const AUTH: &str = "550e8400-e29b-41d4-a716-446655440000";

fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn rtu() -> InMemoryTaxpayerRegistry {
    InMemoryTaxpayerRegistry::new()
        .with_taxpayer(
            EMISOR_NIT,
            TaxpayerInfo {
                status: TaxpayerStatus::Active,
                iva_affiliation: IvaAffiliation::General,
                isr_affiliation: IsrAffiliation::Regular,
            },
        )
        .with_establishment(EMISOR_NIT, 1)
}

fn renap() -> InMemoryPersonsRegistry {
    InMemoryPersonsRegistry::new()
}

fn item(quantity: Decimal, unit_price: Decimal) -> Item {
    let price = (quantity * unit_price).round_dp(2);
    Item {
        line_number: Some(1),
        kind: Some(ItemKind::Good),
        quantity: Some(quantity),
        unit_price: Some(unit_price),
        price: Some(price),
        total: Some(price),
        uom: Some("UND".into()),
        description: Some("Café tostado".into()),
        ..Item::default()
    }
}

fn iva(taxable: Decimal, amount: Decimal) -> Tax {
    Tax {
        kind: Some(certifel::catalog::TaxType::Iva),
        raw_name: Some("IVA".into()),
        taxable_amount: Some(taxable),
        unit_code: Some(1),
        tax_amount: Some(amount),
        total_tax_amount: Some(amount),
        ..Tax::default()
    }
}

fn signature(role: SignatureRole) -> SignatureDescriptor {
    SignatureDescriptor {
        role: Some(role),
        algorithm: Some("http://www.w3.org/2001/04/xmldsig-more#rsa-sha256".into()),
        signed_at: None,
    }
}

fn exportacion_complement() -> Complement {
    Complement {
        kind: Some(ComplementType::Exportacion),
        raw_name: Some("Exportacion".into()),
        payload: ComplementPayload::Exportacion(Exportacion {
            incoterm: Some("CIF".into()),
            consignee_name: Some("ACME Corp".into()),
            ..Exportacion::default()
        }),
    }
}

/// A FACT to consumidor final that passes every rule.
fn baseline() -> Document {
    Document {
        dte_type: Some(DteType::Fact),
        raw_type: Some("FACT".into()),
        emission: Some(dt(2024, 6, 15, 10)),
        certification: Some(dt(2024, 6, 15, 11)),
        currency: Some("GTQ".into()),
        emisor_nit: Some(EMISOR_NIT.into()),
        establishment_code: Some(1),
        receptor_id: Some("CF".into()),
        receptor_id_kind: Some(ReceptorIdKind::Cf),
        grand_total: Some(dec!(1000.00)),
        authorization_id: Some(AUTH.into()),
        serie: Some("550E8400".into()),
        numero: Some("801825751".into()),
        items: vec![item(dec!(10), dec!(100.00))],
        taxes: vec![iva(dec!(1000.00), dec!(120.00))],
        phrases: vec![Phrase {
            phrase_type: Some(1),
            scenario: Some(1),
            ..Phrase::default()
        }],
        signatures: vec![
            signature(SignatureRole::Emisor),
            signature(SignatureRole::Certificador),
        ],
        ..Document::default()
    }
}

fn validate(doc: &Document) -> Verdict {
    validate_projection(
        doc,
        &rtu(),
        &renap(),
        &ValidatorConfig::default(),
        &CancelToken::new(),
    )
}

#[test]
fn baseline_is_valid() {
    let verdict = validate(&baseline());
    assert!(
        verdict.is_valid,
        "unexpected errors: {:?}",
        verdict.errors
    );
    assert!(
        verdict.warnings.is_empty(),
        "unexpected warnings: {:?}",
        verdict.warnings
    );
    assert!(verdict.rules_applied.contains(&"2.2.4.11".to_string()));
    assert_eq!(verdict.document_type, Some(DteType::Fact));
    assert_eq!(verdict.rulebook_version, "1.7.9");
}

// ── CF cap ──────────────────────────────────────────────────────────────────

#[test]
fn cf_cap_rejects_at_2500() {
    let mut doc = baseline();
    doc.items = vec![item(dec!(25), dec!(100.00))];
    doc.taxes = vec![iva(dec!(2500.00), dec!(300.00))];
    doc.grand_total = Some(dec!(2500.00));

    let verdict = validate(&doc);
    let finding = verdict.finding("2.2.4.11").expect("expected 2.2.4.11");
    assert_eq!(finding.severity, Severity::Reject);
    assert!(!verdict.is_valid);
}

#[test]
fn cf_cap_allows_2499_99() {
    let mut doc = baseline();
    doc.items = vec![item(dec!(1), dec!(2499.99))];
    doc.taxes = vec![iva(dec!(2499.99), dec!(300.00))];
    doc.grand_total = Some(dec!(2499.99));

    let verdict = validate(&doc);
    assert!(!verdict.has_code("2.2.4.11"), "{:?}", verdict.errors);
}

#[test]
fn cf_cap_skipped_with_warning_for_unconfigured_currency() {
    let mut doc = baseline();
    doc.currency = Some("USD".into());
    doc.grand_total = Some(dec!(9000.00));
    doc.items = vec![item(dec!(90), dec!(100.00))];
    doc.taxes = vec![iva(dec!(9000.00), dec!(1080.00))];

    let verdict = validate(&doc);
    let finding = verdict.finding("2.2.4.11").expect("expected skip warning");
    assert_eq!(finding.severity, Severity::InformWarning);
    assert!(verdict.is_valid, "{:?}", verdict.errors);
}

#[test]
fn cf_cap_converts_with_configured_rate() {
    let mut doc = baseline();
    doc.currency = Some("USD".into());
    doc.grand_total = Some(dec!(400.00));
    doc.items = vec![item(dec!(4), dec!(100.00))];
    doc.taxes = vec![iva(dec!(400.00), dec!(48.00))];

    let mut config = ValidatorConfig::default();
    config.gtq_rates.insert("USD".into(), dec!(7.80));
    let verdict = validate_projection(&doc, &rtu(), &renap(), &config, &CancelToken::new());
    // 400 × 7.80 = 3120 ≥ 2500
    let finding = verdict.finding("2.2.4.11").expect("expected rejection");
    assert_eq!(finding.severity, Severity::Reject);
    assert_eq!(finding.actual.as_deref(), Some("3120.00"));
}

// ── IVA recomputation ───────────────────────────────────────────────────────

#[test]
fn iva_correct_amount_passes() {
    let verdict = validate(&baseline());
    assert!(!verdict.has_code("2.7.4.1"));
}

#[test]
fn iva_miscalculation_rejects_with_expected_actual() {
    let mut doc = baseline();
    doc.taxes = vec![Tax {
        total_tax_amount: None,
        tax_amount: Some(dec!(121.00)),
        ..iva(dec!(1000.00), dec!(120.00))
    }];

    let verdict = validate(&doc);
    let finding = verdict.finding("2.7.4.1").expect("expected 2.7.4.1");
    assert_eq!(finding.severity, Severity::Reject);
    assert_eq!(finding.expected.as_deref(), Some("120.00"));
    assert_eq!(finding.actual.as_deref(), Some("121.00"));
}

#[test]
fn iva_exempt_unit_requires_zero() {
    let mut doc = baseline();
    doc.taxes = vec![Tax {
        unit_code: Some(2),
        taxable_amount: Some(dec!(1000.00)),
        tax_amount: Some(dec!(120.00)),
        total_tax_amount: None,
        ..iva(dec!(1000.00), dec!(120.00))
    }];

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.7.4.1"));
}

#[test]
fn iva_unit_code_out_of_range_rejects() {
    let mut doc = baseline();
    doc.taxes[0].unit_code = Some(3);
    let verdict = validate(&doc);
    assert!(verdict.has_code("2.7.3.1"));
}

// ── Emission window ─────────────────────────────────────────────────────────

#[test]
fn late_emission_informs_for_fact() {
    let mut doc = baseline();
    doc.emission = Some(dt(2024, 1, 1, 9));
    doc.certification = Some(dt(2024, 1, 7, 9));

    let verdict = validate(&doc);
    let finding = verdict.finding("2.2.1.1").expect("expected 2.2.1.1");
    assert_eq!(finding.severity, Severity::InformError);
    assert!(verdict.is_valid, "{:?}", verdict.errors);
}

#[test]
fn late_emission_exempt_for_civa() {
    let mut doc = baseline();
    doc.dte_type = Some(DteType::Civa);
    doc.raw_type = Some("CIVA".into());
    doc.emission = Some(dt(2024, 1, 1, 9));
    doc.certification = Some(dt(2024, 1, 7, 9));

    let verdict = validate(&doc);
    assert!(!verdict.has_code("2.2.1.1"));
}

#[test]
fn emission_after_certification_rejects() {
    let mut doc = baseline();
    doc.emission = Some(dt(2024, 6, 16, 10));
    doc.certification = Some(dt(2024, 6, 15, 10));

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.2.1.3"));
    assert!(!verdict.is_valid);
}

// ── Export ──────────────────────────────────────────────────────────────────

#[test]
fn export_without_complement_rejects() {
    let mut doc = baseline();
    doc.is_export = true;

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.2.5.2"));
    assert!(verdict.has_code("2.6.1.6"));
}

#[test]
fn export_with_complement_and_phrase_clears() {
    let mut doc = baseline();
    doc.is_export = true;
    doc.complements.push(exportacion_complement());
    doc.phrases.push(Phrase {
        phrase_type: Some(4),
        scenario: Some(1),
        ..Phrase::default()
    });

    let verdict = validate(&doc);
    assert!(!verdict.has_code("2.2.5.2"), "{:?}", verdict.errors);
    assert!(!verdict.has_code("2.6.1.6"), "{:?}", verdict.warnings);
}

#[test]
fn export_forbidden_types_reject() {
    let mut doc = baseline();
    doc.dte_type = Some(DteType::Fesp);
    doc.raw_type = Some("FESP".into());
    doc.is_export = true;

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.2.5.1"));
}

#[test]
fn unknown_incoterm_rejects() {
    let mut doc = baseline();
    doc.is_export = true;
    let mut complement = exportacion_complement();
    if let ComplementPayload::Exportacion(ref mut exp) = complement.payload {
        exp.incoterm = Some("XXX".into());
    }
    doc.complements.push(complement);

    let verdict = validate(&doc);
    assert!(verdict.has_code("3.2.1.1"));
}

#[test]
fn export_toggle_diff_is_confined_to_export_rules() {
    let allowed = [
        "2.2.5.1", "2.2.5.2", "2.2.6.1", "2.6.1.6", "2.6.1.7", "3.2.1.1", "3.2.1.2",
    ];
    let collect = |doc: &Document| -> Vec<String> {
        let v = validate(doc);
        v.findings().map(|f| f.code.clone()).collect()
    };

    let off = collect(&baseline());
    let mut exported = baseline();
    exported.is_export = true;
    let on = collect(&exported);

    for code in off.iter().filter(|c| !on.contains(c)).chain(
        on.iter().filter(|c| !off.contains(c)),
    ) {
        assert!(
            allowed.contains(&code.as_str()),
            "export toggle changed unrelated rule {code}"
        );
    }
}

// ── Public show ─────────────────────────────────────────────────────────────

fn public_show_doc(kind: ItemKind) -> Document {
    let mut doc = baseline();
    doc.is_public_show = true;
    doc.items[0].kind = Some(kind);
    doc.complements.push(Complement {
        kind: Some(ComplementType::EspectaculosPublicos),
        raw_name: Some("EspectaculosPublicos".into()),
        payload: ComplementPayload::EspectaculoPublico(EspectaculoPublico {
            event_name: Some("Concierto".into()),
            ..EspectaculoPublico::default()
        }),
    });
    doc
}

#[test]
fn public_show_requires_services() {
    let verdict = validate(&public_show_doc(ItemKind::Good));
    assert!(verdict.has_code("2.3.8.2"));

    let verdict = validate(&public_show_doc(ItemKind::Service));
    assert!(!verdict.has_code("2.3.8.2"), "{:?}", verdict.errors);
}

#[test]
fn public_show_requires_exactly_one_item() {
    let mut doc = public_show_doc(ItemKind::Service);
    let mut second = item(dec!(1), dec!(50.00));
    second.line_number = Some(2);
    second.kind = Some(ItemKind::Service);
    doc.items.push(second);

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.3.1.1"));
}

#[test]
fn public_show_flag_restricted_by_type() {
    let mut doc = public_show_doc(ItemKind::Service);
    doc.dte_type = Some(DteType::Ncre);
    doc.raw_type = Some("NCRE".into());

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.2.6.1"));
}

// ── Items ───────────────────────────────────────────────────────────────────

#[test]
fn civa_allows_at_most_two_items() {
    let mut doc = baseline();
    doc.dte_type = Some(DteType::Civa);
    doc.raw_type = Some("CIVA".into());
    for n in 2..=3 {
        let mut extra = item(dec!(1), dec!(10.00));
        extra.line_number = Some(n);
        doc.items.push(extra);
    }
    doc.grand_total = Some(dec!(1020.00));

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.3.1.2"));
}

#[test]
fn agricultural_types_reject_services() {
    let mut doc = baseline();
    doc.dte_type = Some(DteType::Faca);
    doc.raw_type = Some("FACA".into());
    doc.items[0].kind = Some(ItemKind::Service);

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.3.8.1"));
}

#[test]
fn line_number_gaps_reject() {
    let mut doc = baseline();
    let mut second = item(dec!(1), dec!(10.00));
    second.line_number = Some(3);
    doc.items.push(second);
    doc.grand_total = Some(dec!(1010.00));

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.3.2.1"));
}

#[test]
fn price_mismatch_rejects() {
    let mut doc = baseline();
    doc.items[0].price = Some(dec!(999.00));
    doc.items[0].total = Some(dec!(999.00));
    doc.grand_total = Some(dec!(999.00));

    let verdict = validate(&doc);
    let finding = verdict.finding("2.3.4.1").expect("expected 2.3.4.1");
    assert_eq!(finding.expected.as_deref(), Some("1000.00"));
    assert_eq!(finding.actual.as_deref(), Some("999.00"));
}

#[test]
fn discount_over_price_rejects() {
    let mut doc = baseline();
    doc.items[0].discount = Some(dec!(1500.00));

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.3.5.1"));
}

#[test]
fn price_within_tolerance_passes() {
    let mut doc = baseline();
    // 10 × 100.00 = 1000.00; 1000.01 is within the centavo tolerance.
    doc.items[0].price = Some(dec!(1000.01));
    doc.items[0].total = Some(dec!(1000.01));
    doc.grand_total = Some(dec!(1000.01));

    let verdict = validate(&doc);
    assert!(!verdict.has_code("2.3.4.1"), "{:?}", verdict.errors);
}

// ── Totals ──────────────────────────────────────────────────────────────────

#[test]
fn grand_total_reconstruction() {
    let mut doc = baseline();
    doc.grand_total = Some(dec!(1000.02));

    let verdict = validate(&doc);
    let finding = verdict.finding("2.19.2.1").expect("expected 2.19.2.1");
    assert_eq!(finding.expected.as_deref(), Some("1000.00"));

    let mut doc = baseline();
    doc.grand_total = Some(dec!(1000.01));
    let verdict = validate(&doc);
    assert!(!verdict.has_code("2.19.2.1"));
}

#[test]
fn missing_grand_total_is_err_103() {
    let mut doc = baseline();
    doc.grand_total = None;

    let verdict = validate(&doc);
    assert!(verdict.has_code("ERR_103"));
    assert!(!verdict.is_valid);
}

// ── Registry state ──────────────────────────────────────────────────────────

#[test]
fn unknown_emisor_rejects() {
    let doc = baseline();
    let empty_rtu = InMemoryTaxpayerRegistry::new();
    let verdict = validate_projection(
        &doc,
        &empty_rtu,
        &renap(),
        &ValidatorConfig::default(),
        &CancelToken::new(),
    );
    assert!(verdict.has_code("2.2.2.2"));
}

#[test]
fn suspended_emisor_rejects() {
    let doc = baseline();
    let suspended = InMemoryTaxpayerRegistry::new()
        .with_taxpayer(
            EMISOR_NIT,
            TaxpayerInfo {
                status: TaxpayerStatus::Suspended,
                iva_affiliation: IvaAffiliation::General,
                isr_affiliation: IsrAffiliation::Regular,
            },
        )
        .with_establishment(EMISOR_NIT, 1);
    let verdict = validate_projection(
        &doc,
        &suspended,
        &renap(),
        &ValidatorConfig::default(),
        &CancelToken::new(),
    );
    assert!(verdict.has_code("2.2.2.3"));
}

#[test]
fn small_contributor_type_needs_peq_affiliation() {
    let mut doc = baseline();
    doc.dte_type = Some(DteType::Fpeq);
    doc.raw_type = Some("FPEQ".into());
    doc.taxes = vec![];

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.2.2.4"));
}

#[test]
fn inactive_establishment_rejects() {
    let mut doc = baseline();
    doc.establishment_code = Some(7);

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.2.3.1"));
}

struct DownRegistry;

impl TaxpayerRegistry for DownRegistry {
    fn nit_exists(&self, _: &str) -> RegistryResult<bool> {
        Err(RegistryError::Unavailable("conexión rechazada".into()))
    }
    fn get_taxpayer(&self, _: &str) -> RegistryResult<Option<TaxpayerInfo>> {
        Err(RegistryError::Unavailable("conexión rechazada".into()))
    }
    fn establishment_active(
        &self,
        _: &str,
        _: u32,
        _: NaiveDate,
    ) -> RegistryResult<bool> {
        Err(RegistryError::Timeout)
    }
}

#[test]
fn registry_unavailable_is_reject_not_negative() {
    let doc = baseline();
    let verdict = validate_projection(
        &doc,
        &DownRegistry,
        &renap(),
        &ValidatorConfig::default(),
        &CancelToken::new(),
    );
    assert!(verdict.has_code("REGISTRY_UNAVAILABLE"));
    assert!(!verdict.has_code("2.2.2.2"), "{:?}", verdict.errors);
    assert!(!verdict.is_valid);
}

// ── Receptor identity ───────────────────────────────────────────────────────

#[test]
fn receptor_nit_with_bad_check_digit_rejects() {
    let mut doc = baseline();
    doc.receptor_id = Some("109209".into());
    doc.receptor_id_kind = Some(ReceptorIdKind::Nit);

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.2.4.1"));
}

#[test]
fn receptor_cui_unknown_to_renap_informs() {
    let mut doc = baseline();
    // Valid check digit, not in the registry.
    doc.receptor_id = Some("1234567820101".into());
    doc.receptor_id_kind = Some(ReceptorIdKind::Cui);

    let verdict = validate(&doc);
    let finding = verdict.finding("2.2.4.6").expect("expected 2.2.4.6");
    assert_eq!(finding.severity, Severity::InformError);
}

// ── Authorization ───────────────────────────────────────────────────────────

#[test]
fn serie_mismatch_rejects_with_expected_actual() {
    let mut doc = baseline();
    doc.serie = Some("AAAA0000".into());

    let verdict = validate(&doc);
    let finding = verdict.finding("3.12.6.1").expect("expected 3.12.6.1");
    assert_eq!(finding.expected.as_deref(), Some("550E8400"));
    assert_eq!(finding.actual.as_deref(), Some("AAAA0000"));
}

#[test]
fn numero_mismatch_rejects() {
    let mut doc = baseline();
    doc.numero = Some("7".into());

    let verdict = validate(&doc);
    let finding = verdict.finding("3.12.7.1").expect("expected 3.12.7.1");
    assert_eq!(finding.expected.as_deref(), Some("801825751"));
}

#[test]
fn non_v4_authorization_rejects() {
    let mut doc = baseline();
    doc.authorization_id = Some("550e8400-e29b-11d4-a716-446655440000".into());

    let verdict = validate(&doc);
    assert!(verdict.has_code("3.12.5.1"));
    assert!(!verdict.has_code("3.12.6.1"));
}

// ── Signatures ──────────────────────────────────────────────────────────────

#[test]
fn missing_certificador_signature_rejects() {
    let mut doc = baseline();
    doc.signatures.retain(|s| s.role == Some(SignatureRole::Emisor));

    let verdict = validate(&doc);
    assert!(verdict.has_code("2.20.1.2"));
    assert!(!verdict.has_code("2.20.1.1"));
}

#[test]
fn unknown_signature_algorithm_warns() {
    let mut doc = baseline();
    doc.signatures[0].algorithm = Some("urn:viejo#md5".into());

    let verdict = validate(&doc);
    let finding = verdict.finding("2.20.2.1").expect("expected 2.20.2.1");
    assert_eq!(finding.severity, Severity::InformWarning);
}

// ── Engine policy ───────────────────────────────────────────────────────────

#[test]
fn determinism_over_identical_inputs() {
    let doc = {
        let mut d = baseline();
        d.is_export = true;
        d.grand_total = Some(dec!(1000.05));
        d
    };
    let a = validate(&doc);
    let b = validate(&doc);
    assert_eq!(a.errors, b.errors);
    assert_eq!(a.warnings, b.warnings);
    assert_eq!(a.rules_applied, b.rules_applied);
    assert_eq!(a.is_valid, b.is_valid);
}

#[test]
fn findings_keep_group_order() {
    let mut doc = baseline();
    doc.emission = Some(dt(2024, 1, 1, 9));
    doc.certification = Some(dt(2024, 1, 9, 9)); // group 1, inform
    doc.items[0].discount = Some(dec!(2000.00)); // group 2, reject
    doc.taxes[0].tax_amount = Some(dec!(121.00));
    doc.taxes[0].total_tax_amount = Some(dec!(121.00)); // group 3, reject
    doc.phrases.clear(); // group 4, inform
    doc.serie = Some("MALO0000".into()); // group 8, reject

    let verdict = validate(&doc);
    let reject_codes: Vec<&str> = verdict.errors.iter().map(|f| f.code.as_str()).collect();
    let pos = |code: &str| {
        reject_codes
            .iter()
            .position(|c| *c == code)
            .unwrap_or_else(|| panic!("missing {code} in {reject_codes:?}"))
    };
    assert!(pos("2.3.5.1") < pos("2.7.4.1"));
    assert!(pos("2.7.4.1") < pos("3.12.6.1"));

    let warn_codes: Vec<&str> = verdict.warnings.iter().map(|f| f.code.as_str()).collect();
    let wpos = |code: &str| {
        warn_codes
            .iter()
            .position(|c| *c == code)
            .unwrap_or_else(|| panic!("missing {code} in {warn_codes:?}"))
    };
    assert!(wpos("2.2.1.1") < wpos("2.6.2.1"));
}

#[test]
fn cancelled_validation_yields_single_finding() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let verdict = validate_projection(
        &baseline(),
        &rtu(),
        &renap(),
        &ValidatorConfig::default(),
        &cancel,
    );
    assert!(!verdict.is_valid);
    assert_eq!(verdict.errors.len(), 1);
    assert_eq!(verdict.errors[0].code, "CANCELLED");
    assert!(verdict.warnings.is_empty());
}

#[test]
fn inform_findings_do_not_block() {
    // Only inform-level findings: late emission.
    let mut doc = baseline();
    doc.emission = Some(dt(2024, 6, 8, 10));
    doc.certification = Some(dt(2024, 6, 15, 10));
    let verdict = validate(&doc);
    assert!(verdict.errors.is_empty(), "{:?}", verdict.errors);
    assert!(verdict.is_valid);
    assert!(verdict.has_code("2.2.1.1"));
}
