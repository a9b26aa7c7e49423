//! Full pipeline tests: bytes in, verdict out.
//!
//! The schema fetcher is a static fixture and the cache lives in a temp
//! directory, so these run offline.

use std::sync::Arc;

use certifel::cancel::CancelToken;
use certifel::catalog::DteType;
use certifel::config::ValidatorConfig;
use certifel::registry::*;
use certifel::schema::{SchemaKind, StaticSchemaFetcher};
use certifel::{DteValidator, Severity};

const EMISOR_NIT: &str = "109208";

/// Schema subset mirroring the SAT document schema's outer shell; the
/// interior of SAT is simple-typed here so the fixture stays small.
const DOC_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="GTDocumento">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="SAT"/>
        <xs:element name="Signature" minOccurs="0" maxOccurs="unbounded"/>
      </xs:sequence>
      <xs:attribute name="Version" use="required"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

const ANUL_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="GTAnulacionDocumento">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="SAT"/>
      </xs:sequence>
      <xs:attribute name="Version" use="required"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

fn validator(dir: &std::path::Path) -> DteValidator {
    let config = ValidatorConfig {
        schema_cache_dir: dir.to_path_buf(),
        ..ValidatorConfig::default()
    };
    let fetcher = StaticSchemaFetcher::new()
        .with_schema(SchemaKind::Document.file_name(), DOC_XSD)
        .with_schema(SchemaKind::Anulacion.file_name(), ANUL_XSD);
    let rtu = InMemoryTaxpayerRegistry::new()
        .with_taxpayer(
            EMISOR_NIT,
            TaxpayerInfo {
                status: TaxpayerStatus::Active,
                iva_affiliation: IvaAffiliation::General,
                isr_affiliation: IsrAffiliation::Regular,
            },
        )
        .with_establishment(EMISOR_NIT, 1);
    DteValidator::with_fetcher(
        config,
        Box::new(fetcher),
        Arc::new(rtu),
        Arc::new(InMemoryPersonsRegistry::new()),
    )
}

fn sample_fact() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<dte:GTDocumento xmlns:dte="http://www.sat.gob.gt/dte/fel/0.2.0" Version="0.1">
  <dte:SAT ClaseDocumento="dte">
    <dte:DTE ID="DatosCertificados">
      <dte:DatosEmision ID="DatosEmision">
        <dte:DatosGenerales Tipo="FACT" FechaHoraEmision="2024-06-15T10:30:00" CodigoMoneda="GTQ"/>
        <dte:Emisor NITEmisor="{EMISOR_NIT}" CodigoEstablecimiento="1" NombreEmisor="Cafetales S.A."/>
        <dte:Receptor IDReceptor="CF" NombreReceptor="Consumidor Final"/>
        <dte:Frases>
          <dte:Frase TipoFrase="1" CodigoEscenario="1">Sujeto a pagos trimestrales ISR</dte:Frase>
        </dte:Frases>
        <dte:Items>
          <dte:Item BienOServicio="B" NumeroLinea="1">
            <dte:Cantidad>10</dte:Cantidad>
            <dte:UnidadMedida>UND</dte:UnidadMedida>
            <dte:Descripcion>Café tostado</dte:Descripcion>
            <dte:PrecioUnitario>100.00</dte:PrecioUnitario>
            <dte:Precio>1000.00</dte:Precio>
            <dte:Impuestos>
              <dte:Impuesto>
                <dte:NombreCorto>IVA</dte:NombreCorto>
                <dte:CodigoUnidadGravable>1</dte:CodigoUnidadGravable>
                <dte:MontoGravable>1000.00</dte:MontoGravable>
                <dte:MontoImpuesto>120.00</dte:MontoImpuesto>
              </dte:Impuesto>
            </dte:Impuestos>
            <dte:Total>1000.00</dte:Total>
          </dte:Item>
        </dte:Items>
        <dte:Totales>
          <dte:TotalImpuestos>
            <dte:TotalImpuesto NombreCorto="IVA" TotalMontoImpuesto="120.00"/>
          </dte:TotalImpuestos>
          <dte:GranTotal>1000.00</dte:GranTotal>
        </dte:Totales>
      </dte:DatosEmision>
      <dte:Certificacion>
        <dte:NITCertificador>9876543</dte:NITCertificador>
        <dte:NumeroAutorizacion Serie="550E8400" Numero="801825751">550e8400-e29b-41d4-a716-446655440000</dte:NumeroAutorizacion>
        <dte:FechaHoraCertificacion>2024-06-15T11:00:00</dte:FechaHoraCertificacion>
      </dte:Certificacion>
    </dte:DTE>
  </dte:SAT>
  <ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#" Id="EMISOR">
    <ds:SignedInfo><ds:SignatureMethod Algorithm="http://www.w3.org/2001/04/xmldsig-more#rsa-sha256"/></ds:SignedInfo>
  </ds:Signature>
  <ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#" Id="CERTIFICADOR">
    <ds:SignedInfo><ds:SignatureMethod Algorithm="http://www.w3.org/2001/04/xmldsig-more#rsa-sha256"/></ds:SignedInfo>
  </ds:Signature>
</dte:GTDocumento>"#
    )
}

#[test]
fn valid_document_passes_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let verdict = v.validate(sample_fact().as_bytes(), None);

    assert!(verdict.is_valid, "errors: {:?}", verdict.errors);
    assert!(verdict.warnings.is_empty(), "warnings: {:?}", verdict.warnings);
    assert_eq!(verdict.document_type, Some(DteType::Fact));
    assert_eq!(
        verdict.schema_used.as_deref(),
        Some(SchemaKind::Document.file_name())
    );
    assert!(!verdict.rules_applied.is_empty());
}

#[test]
fn malformed_xml_short_circuits_with_err_002() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let verdict = v.validate(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><dte:GTDocumento Version=\"0.1\"><sin-cerrar", None);

    assert!(!verdict.is_valid);
    assert!(verdict.has_code("ERR_002"));
    assert!(verdict.rules_applied.is_empty());
}

#[test]
fn schema_violation_short_circuits_with_err_001() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    // Missing the required Version attribute.
    let xml = sample_fact().replace(" Version=\"0.1\"", "");
    let verdict = v.validate(xml.as_bytes(), None);

    assert!(!verdict.is_valid);
    assert!(verdict.has_code("ERR_001"));
    // Business rules never ran.
    assert!(verdict.rules_applied.is_empty());
}

#[test]
fn invalid_utf8_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let verdict = v.validate(&[0x3c, 0xff, 0xfe, 0x3e], None);

    assert!(!verdict.is_valid);
    assert!(verdict.has_code("INVALID_ENCODING"));
}

#[test]
fn missing_encoding_decl_warns_only() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let xml = sample_fact().replace(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
        "<?xml version=\"1.0\"?>",
    );
    let verdict = v.validate(xml.as_bytes(), None);

    assert!(verdict.is_valid, "errors: {:?}", verdict.errors);
    let finding = verdict
        .finding("MISSING_ENCODING_DECL")
        .expect("expected encoding warning");
    assert_eq!(finding.severity, Severity::InformWarning);
}

#[test]
fn unfetchable_schema_is_schema_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ValidatorConfig {
        schema_cache_dir: dir.path().to_path_buf(),
        ..ValidatorConfig::default()
    };
    let v = DteValidator::with_fetcher(
        config,
        Box::new(StaticSchemaFetcher::new()),
        Arc::new(InMemoryTaxpayerRegistry::new()),
        Arc::new(InMemoryPersonsRegistry::new()),
    );
    let verdict = v.validate(sample_fact().as_bytes(), None);

    assert!(!verdict.is_valid);
    assert!(verdict.has_code("SCHEMA_LOAD_ERROR"));
}

#[test]
fn cancelled_call_returns_only_cancelled() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let cancel = CancelToken::new();
    cancel.cancel();
    let verdict = v.validate_with_cancel(sample_fact().as_bytes(), None, &cancel);

    assert!(!verdict.is_valid);
    assert_eq!(verdict.errors.len(), 1);
    assert_eq!(verdict.errors[0].code, "CANCELLED");
}

#[test]
fn hint_fills_unknown_document_type() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let xml = sample_fact().replace("Tipo=\"FACT\"", "Tipo=\"ZZZZ\"");
    let verdict = v.validate(xml.as_bytes(), Some(DteType::Fact));

    assert_eq!(verdict.document_type, Some(DteType::Fact));
    assert!(verdict.has_code("2.1.1.1"));
}

#[test]
fn concurrent_validations_share_the_validator() {
    let dir = tempfile::tempdir().unwrap();
    let v = Arc::new(validator(dir.path()));
    let xml = Arc::new(sample_fact());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let v = Arc::clone(&v);
            let xml = Arc::clone(&xml);
            std::thread::spawn(move || v.validate(xml.as_bytes(), None))
        })
        .collect();
    for handle in handles {
        let verdict = handle.join().expect("thread panicked");
        assert!(verdict.is_valid, "errors: {:?}", verdict.errors);
    }
}

// ── Anulación ───────────────────────────────────────────────────────────────

fn sample_anulacion() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<anu:GTAnulacionDocumento xmlns:anu="http://www.sat.gob.gt/dte/fel/anulacion/0.1.0" Version="0.1">
  <anu:SAT>
    <anu:AnulacionDTE ID="DatosCertificados">
      <anu:DatosGenerales ID="DatosAnulacion"
        NumeroDocumentoAAnular="550e8400-e29b-41d4-a716-446655440000"
        NITEmisor="{EMISOR_NIT}"
        FechaEmisionDocumentoAnular="2024-06-15T10:30:00"
        FechaHoraAnulacion="2024-06-20T09:00:00"
        MotivoAnulacion="Error en montos facturados"/>
      <anu:Certificacion>
        <anu:NumeroAutorizacion Serie="11111111" Numero="5">11111111-2222-4333-8444-555555555555</anu:NumeroAutorizacion>
      </anu:Certificacion>
    </anu:AnulacionDTE>
  </anu:SAT>
</anu:GTAnulacionDocumento>"#
    )
}

#[test]
fn valid_anulacion_passes() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let verdict = v.validate_anulacion(sample_anulacion().as_bytes());

    assert!(verdict.is_valid, "errors: {:?}", verdict.errors);
    assert_eq!(
        verdict.schema_used.as_deref(),
        Some(SchemaKind::Anulacion.file_name())
    );
    assert_eq!(
        verdict.rules_applied,
        vec!["4.1.1", "4.1.2", "4.1.3", "4.1.4", "4.1.5"]
    );
}

#[test]
fn anulacion_of_malformed_uuid_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let xml = sample_anulacion().replace(
        "NumeroDocumentoAAnular=\"550e8400-e29b-41d4-a716-446655440000\"",
        "NumeroDocumentoAAnular=\"no-es-uuid\"",
    );
    let verdict = v.validate_anulacion(xml.as_bytes());

    assert!(!verdict.is_valid);
    assert!(verdict.has_code("4.1.1"));
}

#[test]
fn anulacion_before_original_emission_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let xml = sample_anulacion().replace(
        "FechaHoraAnulacion=\"2024-06-20T09:00:00\"",
        "FechaHoraAnulacion=\"2024-06-01T09:00:00\"",
    );
    let verdict = v.validate_anulacion(xml.as_bytes());

    assert!(verdict.has_code("4.1.4"));
}

#[test]
fn anulacion_without_motivo_informs() {
    let dir = tempfile::tempdir().unwrap();
    let v = validator(dir.path());
    let xml = sample_anulacion().replace(
        "MotivoAnulacion=\"Error en montos facturados\"",
        "MotivoAnulacion=\"\"",
    );
    let verdict = v.validate_anulacion(xml.as_bytes());

    assert!(verdict.is_valid, "errors: {:?}", verdict.errors);
    assert!(verdict.has_code("4.1.5"));
}
