//! Pure-data intermediate representation of a serialized entity.
//!
//! A [`Record`] is an ordered list of named children, each holding at most one
//! text value. The entity maps to and from records; the BeerXML codec maps
//! records to and from documents. Nothing here knows about XML.

use serde::{Deserialize, Serialize};

/// One named child of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    /// `None` when the child had no single text payload (empty, or nested
    /// elements).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// 1-based source line, when the record came from a document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl FieldNode {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            line: None,
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
}

impl Record {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            line: None,
            fields: Vec::new(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn push(&mut self, node: FieldNode) {
        self.fields.push(node);
    }

    /// Builder form of [`Record::push`] for a text child.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FieldNode::text(name, value));
        self
    }

    /// Text of the first child called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .and_then(FieldNode::value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldNode> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a FieldNode;
    type IntoIter = std::slice::Iter<'a, FieldNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Decimal places used for every numeric field.
pub const REAL_DECIMALS: usize = 3;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("not a number: {0:?}")]
    Real(String),

    #[error("not an integer: {0:?}")]
    Int(String),

    #[error("not a boolean: {0:?}")]
    Bool(String),
}

pub fn format_real(v: f64) -> String {
    let s = format!("{:.*}", REAL_DECIMALS, v);
    // -0.000 reads back as 0 anyway; keep the text canonical
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

pub fn format_int(v: i32) -> String {
    v.to_string()
}

pub fn format_bool(v: bool) -> String {
    let text = if v { "TRUE" } else { "FALSE" };
    text.to_string()
}

pub fn parse_real(text: &str) -> Result<f64, TextError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| TextError::Real(text.to_string()))
}

pub fn parse_int(text: &str) -> Result<i32, TextError> {
    let t = text.trim();
    if let Ok(v) = t.parse::<i32>() {
        return Ok(v);
    }
    // BeerXML writers occasionally emit "1.0" for integer fields
    match t.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) => {
            Ok(v as i32)
        }
        _ => Err(TextError::Int(text.to_string())),
    }
}

pub fn parse_bool(text: &str) -> Result<bool, TextError> {
    match text.trim().to_ascii_uppercase().as_str() {
        "TRUE" | "1" | "YES" => Ok(true),
        "FALSE" | "0" | "NO" => Ok(false),
        _ => Err(TextError::Bool(text.to_string())),
    }
}
