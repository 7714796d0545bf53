use serde::{Deserialize, Serialize};
use std::fmt;

/// An IR type expression.
///
/// Widths are in bits and limited to 8, 16, 32 and 64. Records are referred
/// to by their `@@` identifier; layout is given by the record declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Texpr {
    Int(u32),
    Ptr(u32),
    Ident(String),
    Array { size: u64, elem: Box<Texpr> },
    VaList,
}

impl Texpr {
    /// Storage size in bytes. Records are not sized here (the serializer
    /// resolves them through the record declaration), so they report `None`.
    pub fn size(&self) -> Option<u64> {
        match self {
            Texpr::Int(bits) | Texpr::Ptr(bits) => Some(u64::from(*bits) / 8),
            Texpr::Ident(_) => None,
            Texpr::Array { size, elem } => Some(size * elem.size()?),
            Texpr::VaList => Some(16),
        }
    }
}

impl fmt::Display for Texpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Texpr::Int(bits) => write!(f, "int.{bits}"),
            Texpr::Ptr(bits) => write!(f, "ptr.{bits}"),
            Texpr::Ident(ident) => write!(f, "ident({ident})"),
            Texpr::Array { size, elem } => write!(f, "array[{size}]({elem})"),
            Texpr::VaList => write!(f, "va_list"),
        }
    }
}
