//! XML → projection.
//!
//! Streams the document once with a path stack, capturing attributes and
//! text into the model. Unknown elements are skipped; missing required
//! elements stay `None` and surface later as business-rule findings.
//! Only malformed XML aborts, as an `ERR_002` finding.

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::model::*;
use crate::catalog::{ComplementType, DteType, TaxType};
use crate::rules::{Category, Finding};
use crate::schema::line_col;

/// Parse a DTE body into its projection.
///
/// The `Err` carries the `ERR_002` finding for malformed XML; everything
/// else parses, however incomplete.
pub fn parse_document(xml: &str) -> Result<Document, Finding> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut p = DteParsed::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local(e.name().as_ref()).to_string();
                p.open(&name, e);
                path.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                let name = local(e.name().as_ref()).to_string();
                p.open(&name, e);
                p.close(&name);
            }
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().unwrap_or_default().to_string();
                if !text.is_empty() {
                    p.text(&path, &text);
                }
            }
            Ok(Event::End(_)) => {
                if let Some(name) = path.pop() {
                    p.close(&name);
                }
            }
            Ok(Event::Eof) => {
                if let Some(open) = path.last() {
                    return Err(truncated(xml, open));
                }
                break;
            }
            Err(e) => return Err(malformed(xml, reader.buffer_position() as usize, &e)),
            _ => {}
        }
    }

    Ok(p.into_document())
}

/// Accumulator for the streaming parse.
#[derive(Default)]
struct DteParsed {
    doc: Document,
    current_item: Option<Item>,
    current_tax: Option<Tax>,
    current_phrase: Option<Phrase>,
    current_complement: Option<Complement>,
    current_signature: Option<SignatureDescriptor>,
    /// `TotalImpuesto` rows, applied onto the tax entries at the end.
    tax_totals: Vec<(Option<TaxType>, Option<Decimal>)>,
}

impl DteParsed {
    fn open(&mut self, name: &str, e: &BytesStart<'_>) {
        match name {
            "DatosGenerales" => {
                for (key, val) in attrs(e) {
                    match key.as_str() {
                        "Tipo" => {
                            self.doc.dte_type = DteType::from_code(&val);
                            self.doc.raw_type = Some(val);
                        }
                        "FechaHoraEmision" => self.doc.emission = parse_datetime(&val),
                        "CodigoMoneda" => self.doc.currency = Some(val),
                        "Exp" => self.doc.is_export = val == "SI",
                        "EspectaculoPublico" => self.doc.is_public_show = val == "SI",
                        _ => {}
                    }
                }
            }
            "Emisor" => {
                for (key, val) in attrs(e) {
                    match key.as_str() {
                        "NITEmisor" => self.doc.emisor_nit = Some(val),
                        "CodigoEstablecimiento" => {
                            self.doc.establishment_code = val.trim().parse().ok();
                        }
                        _ => {}
                    }
                }
            }
            "Receptor" => {
                let mut id: Option<String> = None;
                let mut special: Option<String> = None;
                for (key, val) in attrs(e) {
                    match key.as_str() {
                        "IDReceptor" => id = Some(val),
                        "TipoEspecial" => special = Some(val),
                        _ => {}
                    }
                }
                self.doc.receptor_id_kind = match (special.as_deref(), id.as_deref()) {
                    (Some("CUI"), _) => Some(ReceptorIdKind::Cui),
                    (Some("EXT"), _) => Some(ReceptorIdKind::Ext),
                    (_, Some(v)) if v.eq_ignore_ascii_case("CF") => Some(ReceptorIdKind::Cf),
                    (_, Some(_)) => Some(ReceptorIdKind::Nit),
                    _ => None,
                };
                self.doc.receptor_id = id;
            }
            "Frase" => {
                let mut phrase = Phrase::default();
                for (key, val) in attrs(e) {
                    match key.as_str() {
                        "TipoFrase" => phrase.phrase_type = val.trim().parse().ok(),
                        "CodigoEscenario" => phrase.scenario = val.trim().parse().ok(),
                        "NumeroResolucion" => phrase.resolution_number = Some(val),
                        "FechaResolucion" => phrase.resolution_date = parse_date(&val),
                        _ => {}
                    }
                }
                self.current_phrase = Some(phrase);
            }
            "Item" => {
                let mut item = Item::default();
                for (key, val) in attrs(e) {
                    match key.as_str() {
                        "NumeroLinea" => item.line_number = val.trim().parse().ok(),
                        "BienOServicio" => item.kind = ItemKind::from_code(val.trim()),
                        _ => {}
                    }
                }
                self.current_item = Some(item);
            }
            "Impuesto" => {
                self.current_tax = Some(Tax::default());
            }
            "TotalImpuesto" => {
                let mut kind: Option<TaxType> = None;
                let mut amount: Option<Decimal> = None;
                for (key, val) in attrs(e) {
                    match key.as_str() {
                        "NombreCorto" => kind = TaxType::from_short_name(&val),
                        "TotalMontoImpuesto" => amount = parse_decimal(&val),
                        _ => {}
                    }
                }
                self.tax_totals.push((kind, amount));
            }
            "Complemento" => {
                let mut kind: Option<ComplementType> = None;
                let mut raw_name: Option<String> = None;
                for (key, val) in attrs(e) {
                    if key == "NombreComplemento" {
                        kind = ComplementType::from_xml_name(&val);
                        raw_name = Some(val);
                    }
                }
                let payload = match kind {
                    Some(ComplementType::Exportacion) => {
                        ComplementPayload::Exportacion(Exportacion::default())
                    }
                    Some(ComplementType::ReferenciasNota) => {
                        ComplementPayload::ReferenciasNota(ReferenciasNota::default())
                    }
                    Some(ComplementType::EspectaculosPublicos) => {
                        ComplementPayload::EspectaculoPublico(EspectaculoPublico::default())
                    }
                    Some(ComplementType::RetencionFacturaEspecial) => {
                        ComplementPayload::RetencionFacturaEspecial(
                            RetencionFacturaEspecial::default(),
                        )
                    }
                    _ => ComplementPayload::Opaque,
                };
                self.current_complement = Some(Complement {
                    kind,
                    raw_name,
                    payload,
                });
            }
            "ReferenciasNota" => {
                if let Some(Complement {
                    payload: ComplementPayload::ReferenciasNota(ref mut refs),
                    ..
                }) = self.current_complement
                {
                    for (key, val) in attrs(e) {
                        match key.as_str() {
                            "NumeroAutorizacionDocumentoOrigen" => {
                                refs.origin_authorization = Some(val);
                            }
                            "FechaEmisionDocumentoOrigen" => {
                                refs.origin_emission_date = parse_date(&val);
                            }
                            "SerieDocumentoOrigen" => refs.origin_serie = Some(val),
                            "NumeroDocumentoOrigen" => refs.origin_numero = Some(val),
                            "MotivoAjuste" => refs.motivo = Some(val),
                            _ => {}
                        }
                    }
                }
            }
            "EspectaculoPublico" => {
                if let Some(Complement {
                    payload: ComplementPayload::EspectaculoPublico(ref mut show),
                    ..
                }) = self.current_complement
                {
                    for (key, val) in attrs(e) {
                        match key.as_str() {
                            "NombreEspectaculo" => show.event_name = Some(val),
                            "FechaEspectaculo" => show.event_date = parse_date(&val),
                            "LugarEspectaculo" => show.venue = Some(val),
                            _ => {}
                        }
                    }
                }
            }
            "RetencionesFacturaEspecial" => {
                if let Some(Complement {
                    payload: ComplementPayload::RetencionFacturaEspecial(ref mut ret),
                    ..
                }) = self.current_complement
                {
                    for (key, val) in attrs(e) {
                        match key.as_str() {
                            "MontoRetencionIVA" => ret.retained_iva = parse_decimal(&val),
                            "MontoRetencionISR" => ret.retained_isr = parse_decimal(&val),
                            _ => {}
                        }
                    }
                }
            }
            "NumeroAutorizacion" => {
                for (key, val) in attrs(e) {
                    match key.as_str() {
                        "Serie" => self.doc.serie = Some(val),
                        "Numero" => self.doc.numero = Some(val),
                        _ => {}
                    }
                }
            }
            "Signature" => {
                let mut sig = SignatureDescriptor::default();
                for (key, val) in attrs(e) {
                    if key == "Id" {
                        sig.role = SignatureRole::from_id(&val);
                    }
                }
                self.current_signature = Some(sig);
            }
            "SignatureMethod" => {
                if let Some(ref mut sig) = self.current_signature {
                    for (key, val) in attrs(e) {
                        if key == "Algorithm" {
                            sig.algorithm = Some(val);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, path: &[String], text: &str) {
        let Some(last) = path.last().map(String::as_str) else {
            return;
        };

        // Tax fields nest inside items; check the tax accumulator first.
        if let Some(ref mut tax) = self.current_tax {
            match last {
                "NombreCorto" => {
                    tax.kind = TaxType::from_short_name(text);
                    tax.raw_name = Some(text.to_string());
                    return;
                }
                "CodigoUnidadGravable" => {
                    tax.unit_code = text.trim().parse().ok();
                    return;
                }
                "MontoGravable" => {
                    tax.taxable_amount = parse_decimal(text);
                    return;
                }
                "CantidadUnidadesGravables" => {
                    tax.unit_quantity = parse_decimal(text);
                    return;
                }
                "MontoImpuesto" => {
                    tax.tax_amount = parse_decimal(text);
                    return;
                }
                _ => {}
            }
        }

        if let Some(ref mut item) = self.current_item {
            match last {
                "Cantidad" => {
                    item.quantity = parse_decimal(text);
                    return;
                }
                "UnidadMedida" => {
                    item.uom = Some(text.to_string());
                    return;
                }
                "Descripcion" => {
                    item.description = Some(text.to_string());
                    return;
                }
                "PrecioUnitario" => {
                    item.unit_price = parse_decimal(text);
                    return;
                }
                "Precio" => {
                    item.price = parse_decimal(text);
                    return;
                }
                "Descuento" => {
                    item.discount = parse_decimal(text);
                    return;
                }
                "OtrosDescuentos" => {
                    item.other_discount = parse_decimal(text);
                    return;
                }
                "Total" => {
                    item.total = parse_decimal(text);
                    return;
                }
                "CodigoProducto" => {
                    item.product_code = Some(text.to_string());
                    return;
                }
                _ => {}
            }
        }

        if let Some(ref mut complement) = self.current_complement {
            if let ComplementPayload::Exportacion(ref mut exp) = complement.payload {
                match last {
                    "INCOTERM" => {
                        exp.incoterm = Some(text.to_string());
                        return;
                    }
                    "NombreConsignatarioODestinatario" => {
                        exp.consignee_name = Some(text.to_string());
                        return;
                    }
                    "DireccionConsignatarioODestinatario" => {
                        exp.consignee_address = Some(text.to_string());
                        return;
                    }
                    "CodigoExportador" => {
                        exp.export_code = Some(text.to_string());
                        return;
                    }
                    _ => {}
                }
            }
        }

        if let Some(ref mut phrase) = self.current_phrase {
            if last == "Frase" {
                phrase.text = Some(text.to_string());
                return;
            }
        }

        match last {
            "GranTotal" => self.doc.grand_total = parse_decimal(text),
            "Total" if path.iter().any(|p| p == "Totales") => {
                self.doc.total = parse_decimal(text);
            }
            "NumeroAutorizacion" => self.doc.authorization_id = Some(text.to_string()),
            "FechaHoraCertificacion" => self.doc.certification = parse_datetime(text),
            "SigningTime" => {
                if let Some(ref mut sig) = self.current_signature {
                    sig.signed_at = parse_datetime(text);
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "Item" => {
                if let Some(item) = self.current_item.take() {
                    self.doc.items.push(item);
                }
            }
            "Impuesto" => {
                if let Some(tax) = self.current_tax.take() {
                    self.doc.taxes.push(tax);
                }
            }
            "Frase" => {
                if let Some(phrase) = self.current_phrase.take() {
                    self.doc.phrases.push(phrase);
                }
            }
            "Complemento" => {
                if let Some(complement) = self.current_complement.take() {
                    self.doc.complements.push(complement);
                }
            }
            "Signature" => {
                if let Some(sig) = self.current_signature.take() {
                    self.doc.signatures.push(sig);
                }
            }
            _ => {}
        }
    }

    fn into_document(mut self) -> Document {
        for (kind, amount) in self.tax_totals {
            let mut matched = false;
            for tax in self.doc.taxes.iter_mut().filter(|t| t.kind == kind) {
                tax.total_tax_amount = amount;
                matched = true;
            }
            if !matched {
                self.doc.taxes.push(Tax {
                    kind,
                    total_tax_amount: amount,
                    ..Tax::default()
                });
            }
        }
        self.doc
    }
}

/// Parse an anulación body into its projection.
pub fn parse_anulacion(xml: &str) -> Result<Anulacion, Finding> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut anulacion = Anulacion::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local(e.name().as_ref()).to_string();
                read_anulacion_attrs(&name, e, &mut anulacion);
                path.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                let name = local(e.name().as_ref()).to_string();
                read_anulacion_attrs(&name, e, &mut anulacion);
            }
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().unwrap_or_default().to_string();
                if path.last().map(String::as_str) == Some("NumeroAutorizacion") && !text.is_empty()
                {
                    anulacion.authorization_id = Some(text);
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => {
                if let Some(open) = path.last() {
                    return Err(truncated(xml, open));
                }
                break;
            }
            Err(e) => return Err(malformed(xml, reader.buffer_position() as usize, &e)),
            _ => {}
        }
    }

    Ok(anulacion)
}

fn read_anulacion_attrs(name: &str, e: &BytesStart<'_>, anulacion: &mut Anulacion) {
    if name != "DatosGenerales" {
        return;
    }
    for (key, val) in attrs(e) {
        match key.as_str() {
            "NumeroDocumentoAAnular" => anulacion.voided_authorization_id = Some(val),
            "NITEmisor" => anulacion.emisor_nit = Some(val),
            "FechaEmisionDocumentoAnular" => anulacion.original_emission = parse_datetime(&val),
            "FechaHoraAnulacion" => anulacion.void_date = parse_datetime(&val),
            "MotivoAnulacion" => anulacion.motivo = Some(val),
            _ => {}
        }
    }
}

/// Local part of a possibly-prefixed XML name.
fn local(qname: &[u8]) -> &str {
    let s = std::str::from_utf8(qname).unwrap_or("");
    match s.rsplit_once(':') {
        Some((_, l)) => l,
        None => s,
    }
}

fn attrs(e: &BytesStart<'_>) -> Vec<(String, String)> {
    e.attributes()
        .flatten()
        .map(|a| {
            (
                local(a.key.as_ref()).to_string(),
                String::from_utf8_lossy(&a.value).into_owned(),
            )
        })
        .collect()
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_local())
}

fn malformed(xml: &str, pos: usize, e: &quick_xml::Error) -> Finding {
    let (line, col) = line_col(xml, pos);
    Finding::reject(
        "ERR_002",
        Category::GeneralPart1,
        format!("XML mal formado: {e} (línea {line}, columna {col})"),
    )
}

fn truncated(xml: &str, open_element: &str) -> Finding {
    let (line, col) = line_col(xml, xml.len());
    Finding::reject(
        "ERR_002",
        Category::GeneralPart1,
        format!(
            "XML mal formado: el elemento '{open_element}' queda sin cerrar (línea {line}, columna {col})"
        ),
    )
}
