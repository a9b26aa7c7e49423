//! XSD-subset compiler.
//!
//! Compiles the subset of XML Schema the SAT document schemas use into a
//! declaration table the instance walker checks against: named elements,
//! `xs:sequence`/`xs:choice` content with `minOccurs`/`maxOccurs`, and
//! required attributes. Simple-type facets and type derivation are not
//! interpreted; value-level defects belong to the business rules.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::FelError;

/// A child element slot inside a declaration.
#[derive(Debug, Clone)]
pub struct ChildDecl {
    pub name: String,
    pub min: u32,
    pub max: Option<u32>,
}

/// A declared attribute.
#[derive(Debug, Clone)]
pub struct AttrDecl {
    pub name: String,
    pub required: bool,
}

/// One compiled element declaration.
#[derive(Debug, Clone, Default)]
pub struct ElementDecl {
    pub children: Vec<ChildDecl>,
    pub attributes: Vec<AttrDecl>,
}

impl ElementDecl {
    pub fn child(&self, name: &str) -> Option<&ChildDecl> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// A compiled schema: the root element plus a declaration per element name.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub name: String,
    root: String,
    elements: HashMap<String, ElementDecl>,
}

impl CompiledSchema {
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn element(&self, name: &str) -> Option<&ElementDecl> {
        self.elements.get(name)
    }

    /// Compile `source` under the given schema name.
    pub fn compile(name: &str, source: &str) -> Result<Self, FelError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);

        let mut elements: HashMap<String, ElementDecl> = HashMap::new();
        let mut root: Option<String> = None;
        // Builders for nested xs:element declarations currently open.
        let mut open: Vec<(String, ElementDecl)> = Vec::new();
        let mut choice_depth: u32 = 0;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    "element" => {
                        let (child, decl_name) = read_element_decl(e, choice_depth);
                        if let Some((_, parent)) = open.last_mut() {
                            parent.children.push(child);
                        } else if root.is_none() {
                            root = Some(decl_name.clone());
                        }
                        open.push((decl_name, ElementDecl::default()));
                    }
                    "choice" => choice_depth += 1,
                    "attribute" => {
                        if let Some(attr) = read_attribute_decl(e) {
                            if let Some((_, parent)) = open.last_mut() {
                                parent.attributes.push(attr);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                    "element" => {
                        let (child, decl_name) = read_element_decl(e, choice_depth);
                        if let Some((_, parent)) = open.last_mut() {
                            parent.children.push(child);
                        } else if root.is_none() {
                            root = Some(decl_name.clone());
                        }
                        elements.entry(decl_name).or_default();
                    }
                    "attribute" => {
                        if let Some(attr) = read_attribute_decl(e) {
                            if let Some((_, parent)) = open.last_mut() {
                                parent.attributes.push(attr);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    "element" => {
                        if let Some((decl_name, decl)) = open.pop() {
                            elements.insert(decl_name, decl);
                        }
                    }
                    "choice" => choice_depth = choice_depth.saturating_sub(1),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(FelError::SchemaCompile {
                        name: name.to_string(),
                        reason: e.to_string(),
                    });
                }
                _ => {}
            }
        }

        let root = root.ok_or_else(|| FelError::SchemaCompile {
            name: name.to_string(),
            reason: "el esquema no declara ningún elemento".into(),
        })?;

        Ok(Self {
            name: name.to_string(),
            root,
            elements,
        })
    }
}

/// Local part of a possibly-prefixed XML name.
pub(crate) fn local_name(qname: &[u8]) -> &str {
    let s = std::str::from_utf8(qname).unwrap_or("");
    match s.rsplit_once(':') {
        Some((_, local)) => local,
        None => s,
    }
}

fn attr_value(e: &BytesStart<'_>, key: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if local_name(attr.key.as_ref()) == key {
            return Some(String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
    None
}

/// Read an `xs:element` declaration into a child slot plus its own name.
///
/// A `ref` child points at a declaration made elsewhere; a `name` child
/// both occupies a slot and opens a declaration. Inside `xs:choice`
/// members are individually optional.
fn read_element_decl(e: &BytesStart<'_>, choice_depth: u32) -> (ChildDecl, String) {
    let name = attr_value(e, "name")
        .or_else(|| attr_value(e, "ref"))
        .unwrap_or_default();

    let mut min = attr_value(e, "minOccurs")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(1);
    if choice_depth > 0 {
        min = 0;
    }
    let max = match attr_value(e, "maxOccurs").as_deref() {
        Some("unbounded") => None,
        Some(v) => Some(v.parse::<u32>().unwrap_or(1)),
        None => Some(1),
    };

    (
        ChildDecl {
            name: name.clone(),
            min,
            max,
        },
        name,
    )
}

fn read_attribute_decl(e: &BytesStart<'_>) -> Option<AttrDecl> {
    let name = attr_value(e, "name")?;
    let required = attr_value(e, "use").as_deref() == Some("required");
    Some(AttrDecl { name, required })
}
