use crate::{Instr, Texpr};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Linkage of a procedure or variable declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Linkage {
    /// Module-local (C `static`).
    #[default]
    Default,
    /// Visible to other modules.
    Global,
    /// Declared here, defined elsewhere.
    Extern,
    /// Carries an indirect-call signature only; never emitted as code.
    Callsign,
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Linkage::Default => write!(f, "default"),
            Linkage::Global => write!(f, "global"),
            Linkage::Extern => write!(f, "extern"),
            Linkage::Callsign => write!(f, "callsign"),
        }
    }
}

/// One entry of a labeled block: an optional label, an optional instruction.
/// A label-only entry labels the next instruction; an entry with neither is
/// not constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LBlockEntry {
    pub label: Option<String>,
    pub instr: Option<Instr>,
}

/// An ordered labeled block of instructions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LBlock {
    pub entries: Vec<LBlockEntry>,
}

impl LBlock {
    pub fn new() -> LBlock {
        LBlock::default()
    }

    /// Appends an instruction without a label.
    pub fn append(&mut self, instr: Instr) {
        self.entries.push(LBlockEntry {
            label: None,
            instr: Some(instr),
        });
    }

    /// Appends a label-only entry.
    pub fn append_label(&mut self, label: impl AsRef<str>) {
        self.entries.push(LBlockEntry {
            label: Some(label.as_ref().to_string()),
            instr: None,
        });
    }

    /// Moves all of `other`'s entries to the end of `self`, leaving `other`
    /// empty. Used when a block is synthesized aside and spliced in later.
    pub fn append_block(&mut self, other: &mut LBlock) {
        self.entries.append(&mut other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for LBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            if let Some(label) = &entry.label {
                writeln!(f, "{label}:")?;
            }
            if let Some(instr) = &entry.instr {
                writeln!(f, "\t{instr}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcArg {
    pub ident: String,
    pub atype: Texpr,
}

/// A procedure-local variable table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LVar {
    pub ident: String,
    pub vtype: Texpr,
}

/// A procedure declaration. `body` is `None` for extern and callsign
/// declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proc {
    pub ident: String,
    pub linkage: Linkage,
    pub args: Vec<ProcArg>,
    pub rtype: Option<Texpr>,
    pub body: Option<LBlock>,
    pub lvars: Vec<LVar>,
    pub attrs: Vec<String>,
    pub variadic: bool,
}

impl fmt::Display for Proc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proc {} {}(", self.linkage, self.ident)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} : {}", arg.ident, arg.atype)?;
        }
        if self.variadic {
            if !self.args.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        write!(f, ")")?;
        if let Some(rtype) = &self.rtype {
            write!(f, " : {rtype}")?;
        }
        for attr in &self.attrs {
            write!(f, " @{attr}")?;
        }
        let Some(body) = &self.body else {
            return writeln!(f, ";");
        };
        writeln!(f, " {{")?;
        write!(f, "{body}")?;
        writeln!(f, "}}")
    }
}

/// One entry of a variable's data block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataEntry {
    Int { width: u32, value: i64 },
    /// Address of `symbol` plus a byte offset.
    Ptr { width: u32, symbol: String, offset: i64 },
}

impl fmt::Display for DataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataEntry::Int { width, value } => write!(f, "int.{width} {value}"),
            DataEntry::Ptr {
                width,
                symbol,
                offset,
            } => {
                if *offset == 0 {
                    write!(f, "ptr.{width} {symbol}")
                } else {
                    write!(f, "ptr.{width} {symbol} + {offset}")
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DBlock {
    pub entries: Vec<DataEntry>,
}

impl DBlock {
    pub fn new() -> DBlock {
        DBlock::default()
    }

    pub fn append(&mut self, entry: DataEntry) {
        self.entries.push(entry);
    }
}

/// A variable declaration with its initial data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Var {
    pub ident: String,
    pub linkage: Linkage,
    pub vtype: Texpr,
    pub dblock: DBlock,
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var {} {} : {}", self.linkage, self.ident, self.vtype)?;
        if self.dblock.entries.is_empty() {
            return writeln!(f, ";");
        }
        writeln!(f, " {{")?;
        for entry in &self.dblock.entries {
            writeln!(f, "\t{entry};")?;
        }
        writeln!(f, "}}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Struct,
    Union,
}

/// A record type declaration: member types in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDecln {
    pub ident: String,
    pub kind: RecordKind,
    pub elems: Vec<Texpr>,
}

impl fmt::Display for RecordDecln {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            RecordKind::Struct => "record",
            RecordKind::Union => "union",
        };
        writeln!(f, "{kind} {} {{", self.ident)?;
        for elem in &self.elems {
            writeln!(f, "\t{elem};")?;
        }
        writeln!(f, "}}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decln {
    Proc(Proc),
    Var(Var),
    Record(RecordDecln),
}

impl Decln {
    /// The declared IR identifier.
    pub fn ident(&self) -> &str {
        match self {
            Decln::Proc(proc) => &proc.ident,
            Decln::Var(var) => &var.ident,
            Decln::Record(rec) => &rec.ident,
        }
    }
}

impl fmt::Display for Decln {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decln::Proc(proc) => write!(f, "{proc}"),
            Decln::Var(var) => write!(f, "{var}"),
            Decln::Record(rec) => write!(f, "{rec}"),
        }
    }
}

/// A complete IR module: declarations in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub declns: Vec<Decln>,
}

impl Module {
    pub fn new() -> Module {
        Module::default()
    }

    pub fn append(&mut self, decln: Decln) {
        self.declns.push(decln);
    }

    /// Looks up a declaration by IR identifier.
    pub fn find(&self, ident: &str) -> Option<&Decln> {
        self.declns.iter().find(|d| d.ident() == ident)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, decln) in self.declns.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{decln}")?;
        }
        Ok(())
    }
}
