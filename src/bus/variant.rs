// Sysbus Gateway - Variants
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Self-describing bus values.

use std::fmt;

/// A D-Bus object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath(String);

impl ObjectPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// A value received from or sent to the bus, carrying its own type.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Bool(bool),
    Byte(u8),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    ObjectPath(ObjectPath),
    /// Homogeneous array; the element signature is kept so empty arrays
    /// still describe their type.
    Array {
        element: String,
        items: Vec<Variant>,
    },
    Struct(Vec<Variant>),
    /// A nested `v` value.
    Boxed(Box<Variant>),
    /// A value this crate does not model (dicts, file descriptors, ...),
    /// kept only by signature.
    Opaque(String),
}

impl Variant {
    /// The D-Bus type signature of this value.
    pub fn signature(&self) -> String {
        match self {
            Variant::Bool(_) => "b".to_string(),
            Variant::Byte(_) => "y".to_string(),
            Variant::I32(_) => "i".to_string(),
            Variant::U32(_) => "u".to_string(),
            Variant::I64(_) => "x".to_string(),
            Variant::U64(_) => "t".to_string(),
            Variant::F64(_) => "d".to_string(),
            Variant::Str(_) => "s".to_string(),
            Variant::ObjectPath(_) => "o".to_string(),
            Variant::Array { element, .. } => format!("a{}", element),
            Variant::Struct(fields) => {
                let inner: String = fields.iter().map(Variant::signature).collect();
                format!("({})", inner)
            }
            Variant::Boxed(_) => "v".to_string(),
            Variant::Opaque(signature) => signature.clone(),
        }
    }

    /// Strip any number of `v` wrappers.
    pub fn unboxed(self) -> Variant {
        match self {
            Variant::Boxed(inner) => inner.unboxed(),
            other => other,
        }
    }

    /// Build a string array.
    pub fn strings<I, S>(items: I) -> Variant
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Variant::Array {
            element: "s".to_string(),
            items: items.into_iter().map(|s| Variant::Str(s.into())).collect(),
        }
    }

    /// Build an array of structs with the given element signature.
    pub fn structs(element: &str, items: Vec<Vec<Variant>>) -> Variant {
        Variant::Array {
            element: element.to_string(),
            items: items.into_iter().map(Variant::Struct).collect(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Str(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::Str(value)
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Variant::I32(value)
    }
}

impl From<ObjectPath> for Variant {
    fn from(value: ObjectPath) -> Self {
        Variant::ObjectPath(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_signatures() {
        assert_eq!(Variant::from("x").signature(), "s");
        assert_eq!(Variant::from(true).signature(), "b");
        assert_eq!(Variant::from(0i32).signature(), "i");
        assert_eq!(Variant::from(ObjectPath::new("/a")).signature(), "o");
    }

    #[test]
    fn test_container_signatures() {
        assert_eq!(Variant::strings(Vec::<String>::new()).signature(), "as");
        assert_eq!(
            Variant::structs("(ss)", vec![vec!["80".into(), "tcp".into()]]).signature(),
            "a(ss)"
        );
        let tuple = Variant::Struct(vec!["a".into(), false.into(), Variant::strings(["x"])]);
        assert_eq!(tuple.signature(), "(sbas)");
        assert_eq!(Variant::Boxed(Box::new("a".into())).signature(), "v");
    }

    #[test]
    fn test_unboxed_strips_nesting() {
        let nested = Variant::Boxed(Box::new(Variant::Boxed(Box::new(Variant::U32(7)))));
        assert_eq!(nested.unboxed(), Variant::U32(7));
    }
}
