//! Typed S-57 attribute values.
//!
//! Attributes are keyed by their six character acronym (`DRVAL1`, `COLOUR`,
//! ...). Multi-valued enumerations such as `COLOUR`, `CATREA` or `RESTRN`
//! are held as an [`AttrList`] from ingestion onward, so procedures never
//! have to split strings.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

/// Ordered list of small enumeration codes (S-57 "list" attributes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttrList(SmallVec<[u16; 4]>);

impl AttrList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma separated list such as `"1,3"`. Returns `None` if any
    /// element is not a small non-negative integer.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Some(Self::new());
        }
        s.split(',')
            .map(|part| part.trim().parse::<u16>().ok())
            .collect::<Option<SmallVec<[u16; 4]>>>()
            .map(AttrList)
    }

    pub fn contains(&self, code: u16) -> bool {
        self.0.contains(&code)
    }

    /// True if any of `codes` is in the list.
    pub fn contains_any(&self, codes: &[u16]) -> bool {
        self.0.iter().any(|c| codes.contains(c))
    }

    pub fn first(&self) -> Option<u16> {
        self.0.first().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }

    pub fn push(&mut self, code: u16) {
        self.0.push(code);
    }
}

impl FromIterator<u16> for AttrList {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        AttrList(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[u16; N]> for AttrList {
    fn from(codes: [u16; N]) -> Self {
        codes.into_iter().collect()
    }
}

impl fmt::Display for AttrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}

/// A single attribute value as delivered by the chart reader.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
    List(AttrList),
}

impl AttrValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            AttrValue::Str(s) => s.trim().parse().ok(),
            AttrValue::List(l) if l.len() == 1 => l.first().map(f64::from),
            AttrValue::List(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            AttrValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            AttrValue::Float(_) => None,
            AttrValue::Str(s) => s.trim().parse().ok(),
            AttrValue::List(l) if l.len() == 1 => l.first().map(i64::from),
            AttrValue::List(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// View the value as an enumeration list. Single integers are promoted
    /// to a one element list, as S-57 allows either form for list attributes.
    pub fn to_list(&self) -> Option<AttrList> {
        match self {
            AttrValue::List(l) => Some(l.clone()),
            AttrValue::Int(i) => u16::try_from(*i).ok().map(|c| AttrList::from([c])),
            AttrValue::Float(_) => None,
            AttrValue::Str(s) => AttrList::parse(s),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Str(s) => f.write_str(s.trim()),
            AttrValue::List(l) => write!(f, "{}", l),
        }
    }
}

/// Attribute map of one feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attributes(HashMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, value: AttrValue) {
        self.0.insert(code.into(), value);
    }

    /// Builder-style insert.
    pub fn with(mut self, code: impl Into<String>, value: AttrValue) -> Self {
        self.insert(code, value);
        self
    }

    pub fn get(&self, code: &str) -> Option<&AttrValue> {
        self.0.get(code)
    }

    pub fn has(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn f64(&self, code: &str) -> Option<f64> {
        self.get(code).and_then(AttrValue::as_f64)
    }

    pub fn i64(&self, code: &str) -> Option<i64> {
        self.get(code).and_then(AttrValue::as_i64)
    }

    pub fn str(&self, code: &str) -> Option<&str> {
        self.get(code).and_then(AttrValue::as_str)
    }

    /// Enumeration list for `code`, empty when absent.
    pub fn list(&self, code: &str) -> AttrList {
        self.get(code).and_then(AttrValue::to_list).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, AttrValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, AttrValue)>>(iter: I) -> Self {
        Attributes(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
