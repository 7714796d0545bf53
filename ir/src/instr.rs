use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction opcodes, three-address form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrKind {
    /// Load an integer immediate.
    Imm,
    Copy,
    /// Load through a pointer.
    Read,
    /// Store through a pointer.
    Write,
    /// Copy a record value between two pointers.
    Reccopy,
    /// Pointer to a local variable.
    Lvarptr,
    /// Pointer to a global variable.
    Varptr,
    /// Pointer to a record member.
    Recmbr,
    /// Pointer plus scaled index.
    Ptridx,
    /// Difference of two pointers, in elements.
    Ptrdiff,
    Add,
    Sub,
    Neg,
    Mul,
    Sdiv,
    Udiv,
    Smod,
    Umod,
    Shl,
    /// Arithmetic shift right.
    Shra,
    /// Logical shift right.
    Shrl,
    And,
    Or,
    Xor,
    Bnot,
    Eq,
    Neq,
    Lt,
    Lteq,
    Gt,
    Gteq,
    Ltu,
    Lteu,
    Gtu,
    Gteu,
    Trunc,
    Sgnext,
    Zrext,
    Call,
    /// Indirect call through a function pointer; the callee signature is
    /// conveyed by a callsign procedure declaration.
    Calli,
    Ret,
    Retv,
    Jmp,
    Jz,
    Jnz,
    Nop,
    Vastart,
    Vaarg,
    Vaend,
    Vacopy,
}

impl InstrKind {
    pub fn mnemonic(self) -> &'static str {
        match self {
            InstrKind::Imm => "imm",
            InstrKind::Copy => "copy",
            InstrKind::Read => "read",
            InstrKind::Write => "write",
            InstrKind::Reccopy => "reccopy",
            InstrKind::Lvarptr => "lvarptr",
            InstrKind::Varptr => "varptr",
            InstrKind::Recmbr => "recmbr",
            InstrKind::Ptridx => "ptridx",
            InstrKind::Ptrdiff => "ptrdiff",
            InstrKind::Add => "add",
            InstrKind::Sub => "sub",
            InstrKind::Neg => "neg",
            InstrKind::Mul => "mul",
            InstrKind::Sdiv => "sdiv",
            InstrKind::Udiv => "udiv",
            InstrKind::Smod => "smod",
            InstrKind::Umod => "umod",
            InstrKind::Shl => "shl",
            InstrKind::Shra => "shra",
            InstrKind::Shrl => "shrl",
            InstrKind::And => "and",
            InstrKind::Or => "or",
            InstrKind::Xor => "xor",
            InstrKind::Bnot => "bnot",
            InstrKind::Eq => "eq",
            InstrKind::Neq => "neq",
            InstrKind::Lt => "lt",
            InstrKind::Lteq => "lteq",
            InstrKind::Gt => "gt",
            InstrKind::Gteq => "gteq",
            InstrKind::Ltu => "ltu",
            InstrKind::Lteu => "lteu",
            InstrKind::Gtu => "gtu",
            InstrKind::Gteu => "gteu",
            InstrKind::Trunc => "trunc",
            InstrKind::Sgnext => "sgnext",
            InstrKind::Zrext => "zrext",
            InstrKind::Call => "call",
            InstrKind::Calli => "calli",
            InstrKind::Ret => "ret",
            InstrKind::Retv => "retv",
            InstrKind::Jmp => "jmp",
            InstrKind::Jz => "jz",
            InstrKind::Jnz => "jnz",
            InstrKind::Nop => "nop",
            InstrKind::Vastart => "vastart",
            InstrKind::Vaarg => "vaarg",
            InstrKind::Vaend => "vaend",
            InstrKind::Vacopy => "vacopy",
        }
    }
}

/// An instruction operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Oper {
    /// A named variable or label (`%` or `@` prefixed).
    Var(String),
    Imm(i64),
    /// A parenthesized operand list (call arguments).
    List(Vec<Oper>),
}

impl Oper {
    pub fn var(name: impl AsRef<str>) -> Oper {
        Oper::Var(name.as_ref().to_string())
    }
}

impl fmt::Display for Oper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Oper::Var(name) => write!(f, "{name}"),
            Oper::Imm(value) => write!(f, "{value}"),
            Oper::List(opers) => {
                write!(f, "(")?;
                for (i, oper) in opers.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{oper}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// One three-address instruction. `width` is the operation width in bits;
/// zero for instructions that have no width (`jmp`, `ret`, `nop`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instr {
    pub kind: InstrKind,
    pub width: u32,
    pub dest: Option<Oper>,
    pub ops: Vec<Oper>,
}

impl Instr {
    pub fn new(kind: InstrKind, width: u32, dest: Option<Oper>, ops: Vec<Oper>) -> Instr {
        Instr {
            kind,
            width,
            dest,
            ops,
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dest) = &self.dest {
            write!(f, "{dest} = ")?;
        }
        write!(f, "{}", self.kind.mnemonic())?;
        if self.width != 0 {
            write!(f, ".{}", self.width)?;
        }
        for (i, oper) in self.ops.iter().enumerate() {
            if i == 0 {
                write!(f, " {oper}")?;
            } else {
                write!(f, ", {oper}")?;
            }
        }
        Ok(())
    }
}
