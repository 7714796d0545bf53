//! Machine-independent three-address IR produced by the `ccir` code
//! generator.
//!
//! This crate owns the IR data structures only: a [Module] of declarations
//! (procedures, variables with data blocks, records), labeled instruction
//! blocks, and the IR type expressions. Validation of invariants lives here;
//! code that builds IR lives in `ccir_core`.
//!
//! `Display` renders the canonical one-line text of each entity
//! (`%1 = add.16 %0, %2`, `array[10](int.8)`). Diagnostics and tests rely on
//! it; writing whole modules to files is the job of the external serializer.
//!
//! IR identifiers keep their prefix in the string: `@` for global symbols,
//! `@@` for tags, strings and callsign procedures, `%` for locals and labels.

mod instr;
mod module;
mod texpr;


pub use instr::{Instr, InstrKind, Oper};
pub use module::{
    DBlock, DataEntry, Decln, LBlock, LBlockEntry, LVar, Linkage, Module, Proc, ProcArg,
    RecordDecln, RecordKind, Var,
};
pub use texpr::Texpr;
