//! Instance validation against a compiled schema.
//!
//! Every violation becomes a finding with a stable code: `ERR_001` for a
//! schema violation, `ERR_002` for malformed XML. Findings carry an XPath
//! and the line/column where the reader stood.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::xsd::{CompiledSchema, ElementDecl, local_name};
use crate::rules::{Category, Finding};

struct Frame<'s> {
    name: String,
    decl: Option<&'s ElementDecl>,
    child_counts: HashMap<String, u32>,
}

/// Validate `xml` against `schema`, returning all violations.
///
/// Malformed XML aborts with a single `ERR_002`; schema violations
/// accumulate.
pub fn validate_instance(schema: &CompiledSchema, xml: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut seen_root = false;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                open_element(schema, e, xml, pos, &mut stack, &mut seen_root, &mut findings);
            }
            Ok(Event::Empty(ref e)) => {
                open_element(schema, e, xml, pos, &mut stack, &mut seen_root, &mut findings);
                close_element(xml, pos, &mut stack, &mut findings);
            }
            Ok(Event::End(_)) => {
                close_element(xml, pos, &mut stack, &mut findings);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                let (line, col) = line_col(xml, reader.buffer_position() as usize);
                findings.push(
                    Finding::reject(
                        "ERR_002",
                        Category::GeneralPart1,
                        format!("XML mal formado: {e} (línea {line}, columna {col})"),
                    )
                    .with_xpath(xpath(&stack)),
                );
                return findings;
            }
            _ => {}
        }
    }

    if !seen_root {
        findings.push(Finding::reject(
            "ERR_002",
            Category::GeneralPart1,
            "XML mal formado: el documento no contiene ningún elemento",
        ));
    } else if !stack.is_empty() {
        let (line, col) = line_col(xml, xml.len());
        findings.push(
            Finding::reject(
                "ERR_002",
                Category::GeneralPart1,
                format!(
                    "XML mal formado: el elemento '{}' queda sin cerrar (línea {line}, columna {col})",
                    stack[stack.len() - 1].name
                ),
            )
            .with_xpath(xpath(&stack)),
        );
    }

    findings
}

fn open_element<'s>(
    schema: &'s CompiledSchema,
    e: &BytesStart<'_>,
    xml: &str,
    pos: usize,
    stack: &mut Vec<Frame<'s>>,
    seen_root: &mut bool,
    findings: &mut Vec<Finding>,
) {
    let name = local_name(e.name().as_ref()).to_string();
    let (line, col) = line_col(xml, pos);
    let parent_path = xpath(stack);

    if stack.is_empty() {
        *seen_root = true;
        if name != schema.root() {
            findings.push(
                Finding::reject(
                    "ERR_001",
                    Category::GeneralPart1,
                    format!(
                        "elemento raíz '{}' no corresponde al esquema, se esperaba '{}' (línea {line}, columna {col})",
                        name,
                        schema.root()
                    ),
                )
                .with_xpath(format!("/{name}")),
            );
        }
    } else if let Some(parent) = stack.last_mut() {
        // A declaration without children models simple or unparsed content
        // in the XSD subset; its interior is not constrained.
        if let Some(decl) = parent.decl.filter(|d| !d.children.is_empty()) {
            match decl.child(&name) {
                Some(child) => {
                    let count = parent.child_counts.entry(name.clone()).or_insert(0);
                    *count += 1;
                    if let Some(max) = child.max {
                        if *count > max {
                            findings.push(
                                Finding::reject(
                                    "ERR_001",
                                    Category::GeneralPart1,
                                    format!(
                                        "el elemento '{name}' aparece más de {max} veces (línea {line}, columna {col})"
                                    ),
                                )
                                .with_xpath(format!("{parent_path}/{name}")),
                            );
                        }
                    }
                }
                None => {
                    findings.push(
                        Finding::reject(
                            "ERR_001",
                            Category::GeneralPart1,
                            format!(
                                "elemento '{name}' no permitido dentro de '{}' (línea {line}, columna {col})",
                                parent.name
                            ),
                        )
                        .with_xpath(format!("{parent_path}/{name}")),
                    );
                }
            }
        }
    }

    let decl = schema.element(&name);
    if let Some(decl) = decl {
        for attr_decl in decl.attributes.iter().filter(|a| a.required) {
            let present = e
                .attributes()
                .flatten()
                .any(|a| local_name(a.key.as_ref()) == attr_decl.name);
            if !present {
                findings.push(
                    Finding::reject(
                        "ERR_001",
                        Category::GeneralPart1,
                        format!(
                            "atributo requerido '{}' ausente en '{name}' (línea {line}, columna {col})",
                            attr_decl.name
                        ),
                    )
                    .with_xpath(format!("{parent_path}/{name}")),
                );
            }
        }
    }

    stack.push(Frame {
        name,
        decl,
        child_counts: HashMap::new(),
    });
}

fn close_element(xml: &str, pos: usize, stack: &mut Vec<Frame<'_>>, findings: &mut Vec<Finding>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let Some(decl) = frame.decl else {
        return;
    };
    let (line, col) = line_col(xml, pos);
    for child in &decl.children {
        let count = frame.child_counts.get(&child.name).copied().unwrap_or(0);
        if count < child.min {
            findings.push(
                Finding::reject(
                    "ERR_001",
                    Category::GeneralPart1,
                    format!(
                        "elemento requerido '{}' ausente en '{}' (línea {line}, columna {col})",
                        child.name, frame.name
                    ),
                )
                .with_xpath(format!("{}/{}/{}", xpath(stack), frame.name, child.name)),
            );
        }
    }
}

fn xpath(stack: &[Frame<'_>]) -> String {
    let mut path = String::new();
    for frame in stack {
        path.push('/');
        path.push_str(&frame.name);
    }
    path
}

/// 1-based line and column of a byte offset.
pub(crate) fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = &text.as_bytes()[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let col = before
        .iter()
        .rev()
        .take_while(|b| **b != b'\n')
        .count()
        + 1;
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_schema() -> CompiledSchema {
        let src = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="GTDocumento">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="SAT">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="DTE">
                <xs:complexType>
                  <xs:sequence>
                    <xs:element name="DatosEmision"/>
                    <xs:element name="Certificacion" minOccurs="0" maxOccurs="1"/>
                  </xs:sequence>
                  <xs:attribute name="ID" use="required"/>
                </xs:complexType>
              </xs:element>
            </xs:sequence>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
        CompiledSchema::compile("doc.xsd", src).unwrap()
    }

    #[test]
    fn valid_instance_passes() {
        let schema = fixture_schema();
        let xml = r#"<dte:GTDocumento xmlns:dte="ns"><dte:SAT><dte:DTE ID="X"><dte:DatosEmision/></dte:DTE></dte:SAT></dte:GTDocumento>"#;
        let findings = validate_instance(&schema, xml);
        assert!(findings.is_empty(), "unexpected: {findings:?}");
    }

    #[test]
    fn missing_required_child() {
        let schema = fixture_schema();
        let xml = r#"<dte:GTDocumento xmlns:dte="ns"><dte:SAT><dte:DTE ID="X"></dte:DTE></dte:SAT></dte:GTDocumento>"#;
        let findings = validate_instance(&schema, xml);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "ERR_001");
        assert!(findings[0].message.contains("DatosEmision"));
    }

    #[test]
    fn missing_required_attribute() {
        let schema = fixture_schema();
        let xml = r#"<dte:GTDocumento xmlns:dte="ns"><dte:SAT><dte:DTE><dte:DatosEmision/></dte:DTE></dte:SAT></dte:GTDocumento>"#;
        let findings = validate_instance(&schema, xml);
        assert!(findings.iter().any(|f| f.message.contains("'ID'")));
    }

    #[test]
    fn unexpected_element() {
        let schema = fixture_schema();
        let xml = r#"<dte:GTDocumento xmlns:dte="ns"><dte:SAT><dte:DTE ID="X"><dte:DatosEmision/><dte:Extra/></dte:DTE></dte:SAT></dte:GTDocumento>"#;
        let findings = validate_instance(&schema, xml);
        assert!(findings.iter().any(|f| f.message.contains("'Extra'")));
    }

    #[test]
    fn cardinality_overflow() {
        let schema = fixture_schema();
        let xml = r#"<dte:GTDocumento xmlns:dte="ns"><dte:SAT><dte:DTE ID="X"><dte:DatosEmision/><dte:Certificacion/><dte:Certificacion/></dte:DTE></dte:SAT></dte:GTDocumento>"#;
        let findings = validate_instance(&schema, xml);
        assert!(findings.iter().any(|f| f.message.contains("más de 1")));
    }

    #[test]
    fn wrong_root() {
        let schema = fixture_schema();
        let findings = validate_instance(&schema, "<Otro/>");
        assert!(findings.iter().any(|f| f.code == "ERR_001"));
    }

    #[test]
    fn malformed_xml_is_err_002() {
        let schema = fixture_schema();
        let findings = validate_instance(&schema, "<dte:GTDocumento><unclosed");
        assert_eq!(findings.last().map(|f| f.code.as_str()), Some("ERR_002"));
    }

    #[test]
    fn empty_input_is_err_002() {
        let schema = fixture_schema();
        let findings = validate_instance(&schema, "");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "ERR_002");
    }

    #[test]
    fn line_col_computation() {
        let text = "abc\ndef\nghi";
        assert_eq!(line_col(text, 0), (1, 1));
        assert_eq!(line_col(text, 5), (2, 2));
        assert_eq!(line_col(text, 8), (3, 1));
    }
}
