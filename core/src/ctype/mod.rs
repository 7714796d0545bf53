//! C type representation and operations.
//!
//! [CGType] values are owned by their embedder (symbol, scope member,
//! expression result, array element, pointer target) and cloned on sharing;
//! record and enum cases hold registry indices, so cloning never duplicates
//! a definition.
//!
//! Type dimensions are fixed for the target: pointers are 16 bits, `char`
//! 8, `short`/`int`/`_Bool` 16, `long` 32, `long long` 64, enums 16.


use crate::records::{EnumRef, Enums, RecordRef, Records};
use bitflags::bitflags;
use std::fmt;
use thiserror::Error;

/// Basic (element) types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElmType {
    Void,
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    /// C `_Bool`. Kept distinct from `int`; several diagnostics key on it.
    Logic,
    VaList,
}

impl ElmType {
    /// Width in bits; zero for `void`.
    pub fn bits(self) -> u32 {
        match self {
            ElmType::Void => 0,
            ElmType::Char | ElmType::UChar => 8,
            ElmType::Short | ElmType::UShort | ElmType::Int | ElmType::UInt | ElmType::Logic => 16,
            ElmType::Long | ElmType::ULong => 32,
            ElmType::LongLong | ElmType::ULongLong => 64,
            ElmType::VaList => 128,
        }
    }

    pub fn signed(self) -> bool {
        matches!(
            self,
            ElmType::Char | ElmType::Short | ElmType::Int | ElmType::Long | ElmType::LongLong
        )
    }

    /// Integer conversion rank ordering. `_Bool` ranks below `char`.
    pub fn rank(self) -> u32 {
        match self {
            ElmType::Logic => 0,
            ElmType::Char | ElmType::UChar => 1,
            ElmType::Short | ElmType::UShort => 2,
            ElmType::Int | ElmType::UInt => 3,
            ElmType::Long | ElmType::ULong => 4,
            ElmType::LongLong | ElmType::ULongLong => 5,
            ElmType::Void | ElmType::VaList => 0,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, ElmType::Void | ElmType::VaList)
    }

    /// The signed/unsigned counterpart with the same rank.
    pub fn with_signedness(self, signed: bool) -> ElmType {
        match (self, signed) {
            (ElmType::Char | ElmType::UChar, true) => ElmType::Char,
            (ElmType::Char | ElmType::UChar, false) => ElmType::UChar,
            (ElmType::Short | ElmType::UShort, true) => ElmType::Short,
            (ElmType::Short | ElmType::UShort, false) => ElmType::UShort,
            (ElmType::Int | ElmType::UInt, true) => ElmType::Int,
            (ElmType::Int | ElmType::UInt, false) => ElmType::UInt,
            (ElmType::Long | ElmType::ULong, true) => ElmType::Long,
            (ElmType::Long | ElmType::ULong, false) => ElmType::ULong,
            (ElmType::LongLong | ElmType::ULongLong, true) => ElmType::LongLong,
            (ElmType::LongLong | ElmType::ULongLong, false) => ElmType::ULongLong,
            (other, _) => other,
        }
    }
}

impl fmt::Display for ElmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElmType::Void => "void",
            ElmType::Char => "char",
            ElmType::UChar => "unsigned char",
            ElmType::Short => "short",
            ElmType::UShort => "unsigned short",
            ElmType::Int => "int",
            ElmType::UInt => "unsigned int",
            ElmType::Long => "long",
            ElmType::ULong => "unsigned long",
            ElmType::LongLong => "long long",
            ElmType::ULongLong => "unsigned long long",
            ElmType::Logic => "_Bool",
            ElmType::VaList => "va_list",
        };
        write!(f, "{name}")
    }
}

bitflags! {
    /// Pointer target qualifier bits.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Quals: u8 {
        const CONST = 1;
        const RESTRICT = 1 << 1;
        const VOLATILE = 1 << 2;
        const ATOMIC = 1 << 3;
    }
}

/// Calling convention of a function type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CConv {
    #[default]
    Default,
    Usr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    pub ret: CGType,
    pub args: Vec<CGType>,
    pub variadic: bool,
    pub cconv: CConv,
}

/// A complete or partially built C type.
#[derive(Debug, Clone, PartialEq)]
pub enum CGType {
    Basic(ElmType),
    Pointer {
        target: Box<CGType>,
        quals: Quals,
    },
    Array {
        elem: Box<CGType>,
        /// Declared index type, when one was given.
        index_type: Option<Box<CGType>>,
        /// `None` while the size is unknown (incomplete array).
        size: Option<u64>,
    },
    Record(RecordRef),
    Enum(EnumRef),
    Func(Box<FuncType>),
}

/// Failure to form a composite type from incompatible declarations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CompositionError {
    #[error("type mismatch")]
    Conflict,
}

impl CGType {
    pub fn basic(elm: ElmType) -> CGType {
        CGType::Basic(elm)
    }

    pub fn pointer(target: CGType) -> CGType {
        CGType::Pointer {
            target: Box::new(target),
            quals: Quals::empty(),
        }
    }

    pub fn array(elem: CGType, size: Option<u64>) -> CGType {
        CGType::Array {
            elem: Box::new(elem),
            index_type: None,
            size,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, CGType::Basic(ElmType::Void))
    }

    pub fn is_logic(&self) -> bool {
        matches!(self, CGType::Basic(ElmType::Logic))
    }

    pub fn is_va_list(&self) -> bool {
        matches!(self, CGType::Basic(ElmType::VaList))
    }

    /// Integer type (including `_Bool`), excluding enums.
    pub fn is_integer(&self) -> bool {
        matches!(self, CGType::Basic(elm) if elm.is_integer())
    }

    /// Integer or enum.
    pub fn is_integral(&self) -> bool {
        self.is_integer() || matches!(self, CGType::Enum(_))
    }

    /// Arithmetic type. The target has no floating point, so this equals
    /// [CGType::is_integral].
    pub fn is_arithmetic(&self) -> bool {
        self.is_integral()
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, CGType::Pointer { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self, CGType::Array { .. })
    }

    pub fn is_record(&self) -> bool {
        matches!(self, CGType::Record(_))
    }

    pub fn is_func(&self) -> bool {
        matches!(self, CGType::Func(_))
    }

    /// Scalar type: arithmetic or pointer.
    pub fn is_scalar(&self) -> bool {
        self.is_arithmetic() || self.is_pointer()
    }

    pub fn is_function_pointer(&self) -> bool {
        matches!(self, CGType::Pointer { target, .. } if target.is_func())
    }

    /// A strict enum's values are incompatible with plain integers for
    /// warning purposes.
    pub fn is_strict_enum(&self, enums: &Enums) -> bool {
        matches!(self, CGType::Enum(eref) if enums[*eref].strict())
    }

    /// Integer conversion rank; enums rank as `int`.
    pub fn int_rank(&self) -> Option<u32> {
        match self {
            CGType::Basic(elm) if elm.is_integer() => Some(elm.rank()),
            CGType::Enum(_) => Some(ElmType::Int.rank()),
            _ => None,
        }
    }

    /// Signedness of the value representation; enums count as signed.
    pub fn signed(&self) -> bool {
        match self {
            CGType::Basic(elm) => elm.signed(),
            CGType::Enum(_) => true,
            _ => false,
        }
    }

    /// Width in bits of a scalar value of this type.
    pub fn bits(&self) -> u32 {
        match self {
            CGType::Basic(elm) => elm.bits(),
            CGType::Pointer { .. } => 16,
            CGType::Enum(_) => 16,
            CGType::Array { .. } | CGType::Record(_) | CGType::Func(_) => 0,
        }
    }

    /// Storage size in bytes; `None` for incomplete and function types.
    pub fn sizeof(&self, records: &Records, enums: &Enums) -> Option<u64> {
        match self {
            CGType::Basic(ElmType::Void) => None,
            CGType::Basic(elm) => Some(u64::from(elm.bits()) / 8),
            CGType::Pointer { .. } => Some(2),
            CGType::Array { elem, size, .. } => Some(size.as_ref()? * elem.sizeof(records, enums)?),
            CGType::Record(rref) => records.size(*rref, enums),
            CGType::Enum(eref) => enums[*eref].defined.then_some(2),
            CGType::Func(_) => None,
        }
    }

    /// A type is incomplete if its size cannot be computed: unsized arrays,
    /// arrays of incomplete elements, undefined records and enums, `void`.
    pub fn is_complete(&self, records: &Records, enums: &Enums) -> bool {
        match self {
            CGType::Func(_) => true,
            other => other.sizeof(records, enums).is_some(),
        }
    }

    /// Element compatibility for pointer assignment/comparison purposes.
    /// Qualifiers are ignored; `void *` pairs only via the explicit cast
    /// path, which does not come through here.
    pub fn pointer_compatible(&self, other: &CGType) -> bool {
        match (self, other) {
            (CGType::Basic(a), CGType::Basic(b)) => a == b,
            (
                CGType::Pointer { target: a, .. },
                CGType::Pointer { target: b, .. },
            ) => a.pointer_compatible(b),
            (
                CGType::Array {
                    elem: ea, size: sa, ..
                },
                CGType::Array {
                    elem: eb, size: sb, ..
                },
            ) => {
                ea.pointer_compatible(eb)
                    && match (sa, sb) {
                        (Some(a), Some(b)) => a == b,
                        _ => true,
                    }
            }
            (CGType::Record(a), CGType::Record(b)) => a == b,
            (CGType::Enum(a), CGType::Enum(b)) => a == b,
            (CGType::Func(a), CGType::Func(b)) => {
                a.ret.pointer_compatible(&b.ret)
                    && a.variadic == b.variadic
                    && a.args.len() == b.args.len()
                    && a.args
                        .iter()
                        .zip(&b.args)
                        .all(|(x, y)| x.pointer_compatible(y))
            }
            _ => false,
        }
    }

    /// C composite type over two compatible declarations. For arrays, one
    /// side may leave the size unknown; for functions, argument lists are
    /// composed member-wise and the variadic flag must match.
    pub fn compose(&self, other: &CGType) -> Result<CGType, CompositionError> {
        match (self, other) {
            (CGType::Basic(a), CGType::Basic(b)) if a == b => Ok(CGType::Basic(*a)),
            (
                CGType::Pointer { target: a, quals: qa },
                CGType::Pointer { target: b, quals: qb },
            ) if qa == qb => Ok(CGType::Pointer {
                target: Box::new(a.compose(b)?),
                quals: *qa,
            }),
            (
                CGType::Array {
                    elem: ea,
                    index_type: ia,
                    size: sa,
                },
                CGType::Array {
                    elem: eb,
                    index_type: ib,
                    size: sb,
                },
            ) => {
                let size = match (sa, sb) {
                    (Some(a), Some(b)) if a != b => return Err(CompositionError::Conflict),
                    (Some(a), _) => Some(*a),
                    (None, b) => *b,
                };
                Ok(CGType::Array {
                    elem: Box::new(ea.compose(eb)?),
                    index_type: ia.clone().or_else(|| ib.clone()),
                    size,
                })
            }
            (CGType::Record(a), CGType::Record(b)) if a == b => Ok(CGType::Record(*a)),
            (CGType::Enum(a), CGType::Enum(b)) if a == b => Ok(CGType::Enum(*a)),
            (CGType::Func(a), CGType::Func(b)) => {
                if a.variadic != b.variadic || a.cconv != b.cconv {
                    return Err(CompositionError::Conflict);
                }
                // An empty argument list composes with anything (unprototyped
                // declaration).
                if a.args.is_empty() && !b.args.is_empty() {
                    return Ok(CGType::Func(Box::new(FuncType {
                        ret: a.ret.compose(&b.ret)?,
                        args: b.args.clone(),
                        variadic: b.variadic,
                        cconv: b.cconv,
                    })));
                }
                if b.args.is_empty() && !a.args.is_empty() {
                    return Ok(CGType::Func(Box::new(FuncType {
                        ret: a.ret.compose(&b.ret)?,
                        args: a.args.clone(),
                        variadic: a.variadic,
                        cconv: a.cconv,
                    })));
                }
                if a.args.len() != b.args.len() {
                    return Err(CompositionError::Conflict);
                }
                let args = a
                    .args
                    .iter()
                    .zip(&b.args)
                    .map(|(x, y)| x.compose(y))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CGType::Func(Box::new(FuncType {
                    ret: a.ret.compose(&b.ret)?,
                    args,
                    variadic: a.variadic,
                    cconv: a.cconv,
                })))
            }
            _ => Err(CompositionError::Conflict),
        }
    }
}

impl fmt::Display for CGType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CGType::Basic(elm) => write!(f, "{elm}"),
            CGType::Pointer { target, .. } => write!(f, "pointer to {target}"),
            CGType::Array { elem, size, .. } => match size {
                Some(size) => write!(f, "array[{size}] of {elem}"),
                None => write!(f, "array of {elem}"),
            },
            CGType::Record(_) => write!(f, "record"),
            CGType::Enum(_) => write!(f, "enum"),
            CGType::Func(_) => write!(f, "function"),
        }
    }
}
