// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Schema paths: `/name[key=value][key2=value2]/name`

use std::fmt::{Display, Write};
use std::str::FromStr;

use crate::EndpointError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PathElem {
    pub name: String,
    pub keys: Vec<(String, String)>, /* list keys, in path order */
}
impl PathElem {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            keys: vec![],
        }
    }
    #[must_use]
    pub fn with_key(mut self, key: &str, value: &str) -> Self {
        self.keys.push((key.to_owned(), value.to_owned()));
        self
    }
    #[must_use]
    pub fn key(&self, key: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    elems: Vec<PathElem>,
}

impl Path {
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn elems(&self) -> &[PathElem] {
        &self.elems
    }
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.elems.is_empty()
    }
    #[must_use]
    pub fn push(mut self, elem: PathElem) -> Self {
        self.elems.push(elem);
        self
    }
    #[must_use]
    pub fn last(&self) -> Option<&PathElem> {
        self.elems.last()
    }
    /// Tell if `self` is `other` or lies under it
    #[must_use]
    pub fn starts_with(&self, other: &Path) -> bool {
        self.elems.starts_with(&other.elems)
    }
}

/// Escape the characters that would otherwise end a key value
#[must_use]
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_name(name: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c == '\\' || specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl Display for PathElem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&escape_name(&self.name, &['/', '[', ']']))?;
        for (key, value) in &self.keys {
            write!(
                f,
                "[{}={}]",
                escape_name(key, &['=', '[', ']']),
                escape_value(value)
            )?;
        }
        Ok(())
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.elems.is_empty() {
            return f.write_char('/');
        }
        for elem in &self.elems {
            write!(f, "/{elem}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = EndpointError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid =
            |reason: &str| EndpointError::InvalidPath(input.to_owned(), reason.to_owned());
        let Some(rest) = input.strip_prefix('/') else {
            return Err(invalid("must start with '/'"));
        };
        let mut path = Path::root();
        if rest.is_empty() {
            return Ok(path);
        }

        let mut elem = PathElem::default();
        let mut chars = rest.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if !elem.keys.is_empty() {
                        return Err(invalid("text after list keys"));
                    }
                    elem.name
                        .push(chars.next().ok_or_else(|| invalid("dangling escape"))?);
                }
                '/' => {
                    if elem.name.is_empty() {
                        return Err(invalid("empty element"));
                    }
                    path.elems.push(std::mem::take(&mut elem));
                }
                '[' => {
                    if elem.name.is_empty() {
                        return Err(invalid("list keys without element name"));
                    }
                    let mut key = String::new();
                    let mut value = String::new();
                    let mut in_value = false;
                    loop {
                        match chars.next() {
                            None => return Err(invalid("unterminated list key")),
                            Some('\\') => {
                                let escaped =
                                    chars.next().ok_or_else(|| invalid("dangling escape"))?;
                                if in_value {
                                    value.push(escaped);
                                } else {
                                    key.push(escaped);
                                }
                            }
                            Some('=') if !in_value => in_value = true,
                            Some(']') if in_value => break,
                            Some(']') => return Err(invalid("list key without value")),
                            Some(c) if in_value => value.push(c),
                            Some(c) => key.push(c),
                        }
                    }
                    if key.is_empty() {
                        return Err(invalid("empty list key name"));
                    }
                    elem.keys.push((key, value));
                }
                c => {
                    if !elem.keys.is_empty() {
                        return Err(invalid("text after list keys"));
                    }
                    elem.name.push(c);
                }
            }
        }
        if elem.name.is_empty() {
            return Err(invalid("empty element"));
        }
        path.elems.push(elem);
        Ok(path)
    }
}
