//! Expression lowering.
//!
//! Every C expression form is translated into virtual-register IR with
//! simultaneous constant folding and diagnostics. Results flow bottom-up as
//! [EResult] values; [ProcGen::as_lvalue] and [ProcGen::as_rvalue] enforce
//! the lvalue/rvalue discipline and perform array/function decay.
//!
//! For an lvalue result, `var` holds a pointer to the designated location;
//! for a scalar rvalue it holds the value itself. `cvknown` marks results
//! known at compile time: plain integers carry the value in `cvint`, and
//! pointer constants carry the base symbol in `cvsymbol` with `cvint` as
//! the byte offset from it.

mod binop;
mod fold;

#[cfg(test)]
mod tests;

pub(crate) use binop::adjust_param;

use crate::CgenError;
use crate::ctype::{CGType, ElmType};
use crate::literal;
use crate::module::ProcGen;
use crate::scope::ScopeMember;
use crate::symbols::{SymbolFlags, SymbolKind, SymbolRef};
use ccir_ast::{Expr, Ident, Lit, Span, UnOp};
use ccir_ir::{DBlock, DataEntry, Decln, Instr, InstrKind, LBlock, Linkage, Oper, Texpr, Var};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValType {
    Lvalue,
    Rvalue,
}

/// Masks a constant to the given width, sign-extending when signed.
/// Returns the masked value and whether masking changed it.
pub(crate) fn mask_const(bits: u32, signed: bool, value: i64) -> (i64, bool) {
    fold::mask_value(bits, signed, i128::from(value))
}

/// The outcome of lowering one expression.
#[derive(Debug, Clone, PartialEq)]
pub struct EResult {
    /// IR variable holding the result; `None` for void results and for
    /// function designators named directly.
    pub var: Option<String>,
    pub valtype: ValType,
    pub cgtype: CGType,
    pub cvknown: bool,
    pub cvint: i64,
    pub cvsymbol: Option<SymbolRef>,
    pub span: Span,
    /// True when discarding the value is not worth a warning (assignments,
    /// calls, increment/decrement and similar).
    pub valused: bool,
}

impl EResult {
    pub(crate) fn rvalue(var: Option<String>, cgtype: CGType, span: Span) -> EResult {
        EResult {
            var,
            valtype: ValType::Rvalue,
            cgtype,
            cvknown: false,
            cvint: 0,
            cvsymbol: None,
            span,
            valused: false,
        }
    }

    pub(crate) fn lvalue(var: String, cgtype: CGType, span: Span) -> EResult {
        EResult {
            var: Some(var),
            valtype: ValType::Lvalue,
            cgtype,
            cvknown: false,
            cvint: 0,
            cvsymbol: None,
            span,
            valused: false,
        }
    }

    pub(crate) fn with_const(mut self, cvint: i64) -> EResult {
        self.cvknown = true;
        self.cvint = cvint;
        self
    }

    /// The IR operand for this result.
    pub(crate) fn oper(&self) -> Oper {
        Oper::Var(self.var.clone().expect("result has no variable"))
    }
}

/// How a conversion request arose; gates its diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConvCtx {
    /// Implicit conversion: the full warning set applies.
    Implicit,
    /// Explicit cast: questionable conversions are taken silently.
    Explicit,
    /// Compiler-internal conversion with diagnostics already handled by the
    /// caller (usual arithmetic conversions, conditional arms).
    Silent,
}

impl ProcGen<'_> {
    /// Lowers one expression into `lblock`.
    pub fn process_expr(&mut self, expr: &Expr, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        match expr {
            Expr::Num(lit) => self.eint(lit, lblock),
            Expr::ChrLit(lit) => self.echar(lit, lblock),
            Expr::StrLit(lit) => self.estring(lit, lblock),
            Expr::Ident(ident) => self.eident(ident, lblock),
            Expr::Unary { op, op_span, arg } => match op {
                UnOp::Plus => self.eplus(arg, *op_span, lblock),
                UnOp::Minus => self.eneg(arg, *op_span, lblock),
                UnOp::BitNot => self.ebnot(arg, *op_span, lblock),
                UnOp::LogNot => self.elognot(arg, *op_span, lblock),
                UnOp::Deref => self.ederef(arg, *op_span, lblock),
                UnOp::Addr => self.eaddr(arg, *op_span, lblock),
                UnOp::PreInc => self.eincdec(arg, *op_span, true, true, lblock),
                UnOp::PreDec => self.eincdec(arg, *op_span, false, true, lblock),
                UnOp::PostInc => self.eincdec(arg, *op_span, true, false, lblock),
                UnOp::PostDec => self.eincdec(arg, *op_span, false, false, lblock),
            },
            Expr::Binary {
                op,
                op_span,
                lhs,
                rhs,
            } => self.ebinary(*op, lhs, rhs, *op_span, lblock),
            Expr::Assign {
                op,
                op_span,
                lhs,
                rhs,
            } => self.eassign(*op, lhs, rhs, *op_span, lblock),
            Expr::Ternary {
                cond,
                then_arm,
                else_arm,
                op_span,
            } => self.etcond(cond, then_arm, else_arm, *op_span, lblock),
            Expr::Call { callee, args, span } => self.ecall(callee, args, *span, lblock),
            Expr::Index { base, index, span } => self.eindex(base, index, *span, lblock),
            Expr::Member {
                base,
                member,
                arrow,
            } => self.emember(base, member, *arrow, lblock),
            Expr::Cast { tname, arg, span } => self.ecast(tname, arg, *span, lblock),
            Expr::SizeofExpr { arg, span } => self.esizeof_expr(arg, *span, lblock),
            Expr::SizeofType { tname, span } => self.esizeof_type(tname, *span, lblock),
            Expr::VaStart { ap, span } => self.eva_start(ap, *span, lblock),
            Expr::VaArg { ap, tname, span } => self.eva_arg(ap, tname, *span, lblock),
            Expr::VaEnd { ap, span } => self.eva_end(ap, *span, lblock),
            Expr::VaCopy { dest, src, span } => self.eva_copy(dest, src, *span, lblock),
        }
    }

    /// Verifies that `eres` designates a location.
    pub fn as_lvalue(&mut self, eres: EResult) -> Result<EResult, CgenError> {
        if eres.valtype == ValType::Lvalue {
            Ok(eres)
        } else {
            self.cg.diags.fatal(eres.span, "lvalue required");
            Err(CgenError::Invalid)
        }
    }

    /// Converts `eres` to a value: arrays decay to pointers to their first
    /// element, functions to function pointers, records pass through (they
    /// are handled by pointer), and scalars are read from memory.
    pub fn as_rvalue(&mut self, eres: EResult, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        if eres.valtype == ValType::Rvalue {
            return Ok(eres);
        }
        match &eres.cgtype {
            CGType::Array { elem, .. } => {
                let mut decayed = EResult::rvalue(
                    eres.var.clone(),
                    CGType::pointer((**elem).clone()),
                    eres.span,
                );
                decayed.cvknown = eres.cvknown;
                decayed.cvint = eres.cvint;
                decayed.cvsymbol = eres.cvsymbol;
                Ok(decayed)
            }
            CGType::Func(_) => {
                let var = match &eres.var {
                    Some(var) => var.clone(),
                    None => {
                        // Direct function designator: materialize its address.
                        let symbol = eres.cvsymbol.expect("function designator without symbol");
                        let irident = self.cg.symbols[symbol].irident.clone();
                        let var = self.new_tmp();
                        lblock.append(Instr::new(
                            InstrKind::Varptr,
                            16,
                            Some(Oper::var(&var)),
                            vec![Oper::var(irident)],
                        ));
                        var
                    }
                };
                let mut decayed =
                    EResult::rvalue(Some(var), CGType::pointer(eres.cgtype.clone()), eres.span);
                decayed.cvknown = eres.cvknown;
                decayed.cvint = eres.cvint;
                decayed.cvsymbol = eres.cvsymbol;
                Ok(decayed)
            }
            CGType::Record(_) => {
                let mut passed = EResult::rvalue(eres.var.clone(), eres.cgtype.clone(), eres.span);
                passed.cvknown = eres.cvknown;
                passed.cvint = eres.cvint;
                passed.cvsymbol = eres.cvsymbol;
                Ok(passed)
            }
            _ => self.read_lvalue(&eres, lblock),
        }
    }

    /// Emits the memory read for a scalar lvalue.
    pub(crate) fn read_lvalue(
        &mut self,
        eres: &EResult,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        if eres.cgtype.is_void() {
            self.cg.diags.fatal(eres.span, "void value used");
            return Err(CgenError::Invalid);
        }
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Read,
            eres.cgtype.bits(),
            Some(Oper::var(&var)),
            vec![eres.oper()],
        ));
        Ok(EResult::rvalue(Some(var), eres.cgtype.clone(), eres.span))
    }

    fn eint(&mut self, lit: &Lit, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let (value, elm) = literal::parse_int(&mut self.cg.diags, lit.span, &lit.text)?;
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Imm,
            elm.bits(),
            Some(Oper::var(&var)),
            vec![Oper::Imm(value)],
        ));
        Ok(EResult::rvalue(Some(var), CGType::basic(elm), lit.span).with_const(value))
    }

    fn echar(&mut self, lit: &Lit, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        // A character literal has type int, wide or not.
        let (value, _wide) = literal::parse_char(&mut self.cg.diags, lit.span, &lit.text)?;
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Imm,
            16,
            Some(Oper::var(&var)),
            vec![Oper::Imm(value)],
        ));
        Ok(EResult::rvalue(Some(var), CGType::basic(ElmType::Int), lit.span).with_const(value))
    }

    /// Lowers a string literal: emits a module-level variable holding the
    /// characters and yields an array lvalue designating it.
    fn estring(&mut self, lit: &Lit, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let (chars, wide) = literal::parse_string(&mut self.cg.diags, lit.span, &lit.text)?;
        let elm = if wide { ElmType::Int } else { ElmType::Char };
        let size = chars.len() as u64 + 1;
        let cgtype = CGType::array(CGType::basic(elm), Some(size));

        let ident = self.cg.next_string_ident();
        let mut dblock = DBlock::new();
        for ch in &chars {
            dblock.append(DataEntry::Int {
                width: elm.bits(),
                value: *ch,
            });
        }
        dblock.append(DataEntry::Int {
            width: elm.bits(),
            value: 0,
        });
        self.cg.module.append(Decln::Var(Var {
            ident: ident.clone(),
            linkage: Linkage::Default,
            vtype: Texpr::Array {
                size,
                elem: Box::new(Texpr::Int(elm.bits())),
            },
            dblock,
        }));
        // Registered as a defined static so pointer constants can name it.
        let symbol = self.cg.symbols.insert(
            SymbolKind::Var,
            &ident,
            ident.clone(),
            cgtype.clone(),
            SymbolFlags::DEFINED | SymbolFlags::STATIC,
            lit.span,
        )?;

        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Varptr,
            16,
            Some(Oper::var(&var)),
            vec![Oper::var(&ident)],
        ));
        let mut eres = EResult::lvalue(var, cgtype, lit.span).with_const(0);
        eres.cvsymbol = Some(symbol);
        Ok(eres)
    }

    fn eident(&mut self, ident: &Ident, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let Some(entry) = self.cg.scope.lookup(&ident.name) else {
            self.cg
                .diags
                .fatal(ident.span, format!("undeclared identifier '{}'", ident.name));
            return Err(CgenError::Invalid);
        };
        let member = entry.member.clone();
        self.cg.scope.mark_used(&ident.name);
        match member {
            ScopeMember::GSym { symbol, .. } => {
                let sym = &self.cg.symbols[symbol];
                let cgtype = sym.cgtype.clone();
                let irident = sym.irident.clone();
                if sym.kind == SymbolKind::Fun {
                    // Function designator: address is materialized on decay.
                    return Ok(EResult {
                        var: None,
                        valtype: ValType::Lvalue,
                        cgtype,
                        cvknown: true,
                        cvint: 0,
                        cvsymbol: Some(symbol),
                        span: ident.span,
                        valused: false,
                    });
                }
                let var = self.new_tmp();
                lblock.append(Instr::new(
                    InstrKind::Varptr,
                    16,
                    Some(Oper::var(&var)),
                    vec![Oper::var(irident)],
                ));
                let mut eres = EResult::lvalue(var, cgtype, ident.span).with_const(0);
                eres.cvsymbol = Some(symbol);
                Ok(eres)
            }
            ScopeMember::Arg { vname, cgtype } | ScopeMember::LVar { vname, cgtype } => {
                let var = self.new_tmp();
                lblock.append(Instr::new(
                    InstrKind::Lvarptr,
                    16,
                    Some(Oper::var(&var)),
                    vec![Oper::var(vname)],
                ));
                Ok(EResult::lvalue(var, cgtype, ident.span))
            }
            ScopeMember::EElem { elem } => {
                let value = self.cg.enums.elem(elem).value;
                let var = self.new_tmp();
                lblock.append(Instr::new(
                    InstrKind::Imm,
                    16,
                    Some(Oper::var(&var)),
                    vec![Oper::Imm(value)],
                ));
                Ok(EResult::rvalue(Some(var), CGType::Enum(elem.0), ident.span).with_const(value))
            }
            ScopeMember::TDef { .. } => {
                self.cg.diags.fatal(
                    ident.span,
                    format!("expected expression, found type name '{}'", ident.name),
                );
                Err(CgenError::Invalid)
            }
            ScopeMember::RecordTag { .. } | ScopeMember::EnumTag { .. } => {
                // Tags live in a separate namespace; ordinary lookup cannot
                // produce them.
                unreachable!("tag member in ordinary namespace")
            }
        }
    }

    fn eplus(&mut self, arg: &Expr, span: Span, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let eres = self.process_expr(arg, lblock)?;
        let eres = self.as_rvalue(eres, lblock)?;
        if !eres.cgtype.is_arithmetic() {
            self.cg
                .diags
                .fatal(span, format!("invalid operand of unary '+' ({})", eres.cgtype));
            return Err(CgenError::Invalid);
        }
        self.promote(eres, lblock)
    }

    fn eneg(&mut self, arg: &Expr, span: Span, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let eres = self.process_expr(arg, lblock)?;
        let eres = self.as_rvalue(eres, lblock)?;
        if !eres.cgtype.is_arithmetic() {
            self.cg
                .diags
                .fatal(span, format!("invalid operand of unary '-' ({})", eres.cgtype));
            return Err(CgenError::Invalid);
        }
        let eres = self.promote(eres, lblock)?;
        let bits = eres.cgtype.bits();
        let signed = eres.cgtype.signed();
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Neg,
            bits,
            Some(Oper::var(&var)),
            vec![eres.oper()],
        ));
        let mut out = EResult::rvalue(Some(var), eres.cgtype.clone(), span);
        if eres.cvknown {
            let (value, issues) = fold::neg(eres.cvint, bits, signed);
            issues.report(&mut self.cg.diags, span);
            out = out.with_const(value);
        }
        Ok(out)
    }

    fn ebnot(&mut self, arg: &Expr, span: Span, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let eres = self.process_expr(arg, lblock)?;
        let eres = self.as_rvalue(eres, lblock)?;
        if !eres.cgtype.is_integral() {
            self.cg
                .diags
                .fatal(span, format!("invalid operand of unary '~' ({})", eres.cgtype));
            return Err(CgenError::Invalid);
        }
        if eres.cgtype.signed() {
            self.cg.diags.warn(span, "bitwise operation on signed value");
        }
        let eres = self.promote(eres, lblock)?;
        let bits = eres.cgtype.bits();
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Bnot,
            bits,
            Some(Oper::var(&var)),
            vec![eres.oper()],
        ));
        let mut out = EResult::rvalue(Some(var), eres.cgtype.clone(), span);
        if eres.cvknown {
            let (value, _) = fold::mask_value(bits, eres.cgtype.signed(), !(eres.cvint as i128));
            out = out.with_const(value);
        }
        Ok(out)
    }

    fn elognot(&mut self, arg: &Expr, span: Span, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let eres = self.process_expr(arg, lblock)?;
        let eres = self.as_rvalue(eres, lblock)?;
        if !eres.cgtype.is_scalar() {
            self.cg
                .diags
                .fatal(span, format!("invalid operand of unary '!' ({})", eres.cgtype));
            return Err(CgenError::Invalid);
        }
        let bits = eres.cgtype.bits();
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Eq,
            bits,
            Some(Oper::var(&var)),
            vec![eres.oper(), Oper::Imm(0)],
        ));
        let mut out = EResult::rvalue(Some(var), CGType::basic(ElmType::Logic), span);
        if eres.cvknown && eres.cvsymbol.is_none() {
            out = out.with_const(i64::from(eres.cvint == 0));
        } else if eres.cvknown {
            // A pointer to a named symbol is never null.
            out = out.with_const(0);
        }
        Ok(out)
    }

    fn ederef(&mut self, arg: &Expr, span: Span, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let eres = self.process_expr(arg, lblock)?;
        let eres = self.as_rvalue(eres, lblock)?;
        let CGType::Pointer { target, .. } = &eres.cgtype else {
            self.cg
                .diags
                .fatal(span, format!("cannot dereference non-pointer ({})", eres.cgtype));
            return Err(CgenError::Invalid);
        };
        if target.is_func() {
            self.cg
                .diags
                .warn(span, "explicit dereference of a function pointer");
        }
        let mut out = EResult::lvalue(
            eres.var.clone().expect("pointer rvalue has no variable"),
            (**target).clone(),
            span,
        );
        out.cvknown = eres.cvknown;
        out.cvint = eres.cvint;
        out.cvsymbol = eres.cvsymbol;
        Ok(out)
    }

    fn eaddr(&mut self, arg: &Expr, span: Span, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let eres = self.process_expr(arg, lblock)?;
        let eres = self.as_lvalue(eres)?;
        if eres.cgtype.is_func() {
            self.cg.diags.warn(span, "explicitly taking the address of a function");
            return self.as_rvalue(eres, lblock);
        }
        let mut out = EResult::rvalue(
            eres.var.clone(),
            CGType::pointer(eres.cgtype.clone()),
            span,
        );
        out.cvknown = eres.cvknown;
        out.cvint = eres.cvint;
        out.cvsymbol = eres.cvsymbol;
        Ok(out)
    }

    /// Array indexing. Decay is commutative: either operand may be the
    /// pointer/array side.
    fn eindex(
        &mut self,
        base: &Expr,
        index: &Expr,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let bres = self.process_expr(base, lblock)?;
        let ires = self.process_expr(index, lblock)?;
        // Bounds information lives on the pre-decay array type.
        let (bres, ires) = if !bres.cgtype.is_array() && !bres.cgtype.is_pointer() {
            (ires, bres)
        } else {
            (bres, ires)
        };
        let bound = match &bres.cgtype {
            CGType::Array { size, .. } => *size,
            _ => None,
        };
        let bres = self.as_rvalue(bres, lblock)?;
        let ires = self.as_rvalue(ires, lblock)?;
        if !bres.cgtype.is_pointer() {
            self.cg
                .diags
                .fatal(span, format!("subscripted value is not a pointer ({})", bres.cgtype));
            return Err(CgenError::Invalid);
        }
        if !ires.cgtype.is_integral() {
            self.cg
                .diags
                .fatal(span, format!("array subscript is not an integer ({})", ires.cgtype));
            return Err(CgenError::Invalid);
        }
        if ires.cvknown {
            if ires.cvint < 0 && self.constexpr {
                self.cg
                    .diags
                    .fatal(span, "negative array index in constant expression");
                return Err(CgenError::Invalid);
            }
            if let Some(bound) = bound {
                if ires.cvint < 0 || ires.cvint as u64 >= bound {
                    self.cg.diags.warn(span, "array index out of bounds");
                }
            }
        }
        let pres = self.pointer_index(bres, ires, false, span, lblock)?;
        let CGType::Pointer { target, .. } = &pres.cgtype else {
            unreachable!("pointer arithmetic result is not a pointer");
        };
        let mut out = EResult::lvalue(
            pres.var.clone().expect("pointer result has no variable"),
            (**target).clone(),
            span,
        );
        out.cvknown = pres.cvknown;
        out.cvint = pres.cvint;
        out.cvsymbol = pres.cvsymbol;
        Ok(out)
    }

    /// Member access (`.` and `->`).
    fn emember(
        &mut self,
        base: &Expr,
        member: &Ident,
        arrow: bool,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let bres = self.process_expr(base, lblock)?;
        let span = bres.span.join(member.span);
        let (rref, bres) = if arrow {
            let bres = self.as_rvalue(bres, lblock)?;
            let rref = match &bres.cgtype {
                CGType::Pointer { target, .. } => match &**target {
                    CGType::Record(rref) => *rref,
                    _ => {
                        self.cg.diags.fatal(
                            span,
                            format!("'->' on non-record pointer ({})", bres.cgtype),
                        );
                        return Err(CgenError::Invalid);
                    }
                },
                _ => {
                    self.cg
                        .diags
                        .fatal(span, format!("'->' on non-pointer ({})", bres.cgtype));
                    return Err(CgenError::Invalid);
                }
            };
            (rref, bres)
        } else {
            let rref = match &bres.cgtype {
                CGType::Record(rref) => *rref,
                _ => {
                    self.cg
                        .diags
                        .fatal(span, format!("'.' on non-record ({})", bres.cgtype));
                    return Err(CgenError::Invalid);
                }
            };
            (rref, bres)
        };
        let rec = &self.cg.records[rref];
        if !rec.defined {
            self.cg
                .diags
                .fatal(span, "member access on incomplete record type");
            return Err(CgenError::Invalid);
        }
        let Some((index, elem)) = rec.find_elem(&member.name) else {
            self.cg
                .diags
                .fatal(member.span, format!("no member named '{}'", member.name));
            return Err(CgenError::Invalid);
        };
        let etype = elem.etype.clone();
        let irident = rec.irident.clone();
        let offset = self
            .cg
            .records
            .offset(rref, index, &self.cg.enums)
            .expect("defined record has no offset");
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Recmbr,
            16,
            Some(Oper::var(&var)),
            vec![
                bres.oper(),
                Oper::var(irident),
                Oper::Imm(index as i64),
            ],
        ));
        let mut out = EResult::lvalue(var, etype, span);
        if bres.cvknown {
            out.cvknown = true;
            out.cvint = bres.cvint + offset as i64;
            out.cvsymbol = bres.cvsymbol;
        }
        Ok(out)
    }

    fn ecast(
        &mut self,
        tname: &ccir_ast::TypeName,
        arg: &Expr,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let cgtype = self.cg.process_typename(tname)?;
        let eres = self.process_expr(arg, lblock)?;
        let eres = self.as_rvalue(eres, lblock)?;
        let mut out = self.type_convert(eres, &cgtype, ConvCtx::Explicit, lblock)?;
        out.span = span;
        Ok(out)
    }

    fn esizeof_expr(
        &mut self,
        arg: &Expr,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        // The operand is not evaluated; lower it into a discarded block
        // just to learn its type.
        let mut scratch = LBlock::new();
        let eres = self.process_expr(arg, &mut scratch)?;
        self.emit_sizeof(&eres.cgtype, span, lblock)
    }

    fn esizeof_type(
        &mut self,
        tname: &ccir_ast::TypeName,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let cgtype = self.cg.process_typename(tname)?;
        self.emit_sizeof(&cgtype, span, lblock)
    }

    fn emit_sizeof(
        &mut self,
        cgtype: &CGType,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let Some(size) = cgtype.sizeof(&self.cg.records, &self.cg.enums) else {
            self.cg
                .diags
                .fatal(span, format!("sizeof applied to incomplete type ({cgtype})"));
            return Err(CgenError::Invalid);
        };
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Imm,
            16,
            Some(Oper::var(&var)),
            vec![Oper::Imm(size as i64)],
        ));
        Ok(EResult::rvalue(Some(var), CGType::basic(ElmType::UInt), span).with_const(size as i64))
    }

    fn eva_start(&mut self, ap: &Expr, span: Span, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        if !self.variadic {
            self.cg
                .diags
                .fatal(span, "'va_start' used in a non-variadic function");
            return Err(CgenError::Invalid);
        }
        let apres = self.va_list_lvalue(ap, lblock)?;
        let mut ops = vec![apres.oper()];
        if let Some(last_arg) = &self.last_arg {
            ops.push(Oper::var(last_arg.clone()));
        }
        lblock.append(Instr::new(InstrKind::Vastart, 0, None, ops));
        let mut out = EResult::rvalue(None, CGType::basic(ElmType::Void), span);
        out.valused = true;
        Ok(out)
    }

    fn eva_arg(
        &mut self,
        ap: &Expr,
        tname: &ccir_ast::TypeName,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let apres = self.va_list_lvalue(ap, lblock)?;
        let cgtype = self.cg.process_typename(tname)?;
        let bits = cgtype.bits();
        if bits == 0 {
            self.cg
                .diags
                .fatal(span, format!("invalid 'va_arg' type ({cgtype})"));
            return Err(CgenError::Invalid);
        }
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Vaarg,
            bits,
            Some(Oper::var(&var)),
            vec![apres.oper()],
        ));
        let mut out = EResult::rvalue(Some(var), cgtype, span);
        out.valused = true;
        Ok(out)
    }

    fn eva_end(&mut self, ap: &Expr, span: Span, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let apres = self.va_list_lvalue(ap, lblock)?;
        lblock.append(Instr::new(InstrKind::Vaend, 0, None, vec![apres.oper()]));
        let mut out = EResult::rvalue(None, CGType::basic(ElmType::Void), span);
        out.valused = true;
        Ok(out)
    }

    fn eva_copy(
        &mut self,
        dest: &Expr,
        src: &Expr,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let dres = self.va_list_lvalue(dest, lblock)?;
        let sres = self.va_list_lvalue(src, lblock)?;
        lblock.append(Instr::new(
            InstrKind::Vacopy,
            0,
            None,
            vec![dres.oper(), sres.oper()],
        ));
        let mut out = EResult::rvalue(None, CGType::basic(ElmType::Void), span);
        out.valused = true;
        Ok(out)
    }

    fn va_list_lvalue(&mut self, ap: &Expr, lblock: &mut LBlock) -> Result<EResult, CgenError> {
        let apres = self.process_expr(ap, lblock)?;
        let apres = self.as_lvalue(apres)?;
        if !apres.cgtype.is_va_list() {
            self.cg.diags.fatal(
                apres.span,
                format!("'va_list' expected ({})", apres.cgtype),
            );
            return Err(CgenError::Invalid);
        }
        Ok(apres)
    }

    /// Integer promotion: any integral rvalue of rank below `int` is
    /// converted to `int`. Enums and `_Bool` lose their identity here.
    pub(crate) fn promote(
        &mut self,
        eres: EResult,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        debug_assert!(eres.cgtype.is_integral());
        let rank = eres.cgtype.int_rank().expect("promoting non-integral type");
        if rank >= ElmType::Int.rank() && !matches!(eres.cgtype, CGType::Enum(_)) {
            return Ok(eres);
        }
        Ok(self.retype_int(eres, CGType::basic(ElmType::Int), lblock))
    }

    /// Pure integer re-typing: emits the trunc/sign-extend/zero-extend
    /// instruction when the width changes and re-masks the constant value.
    /// Diagnostics are the caller's business.
    pub(crate) fn retype_int(
        &mut self,
        eres: EResult,
        dst: CGType,
        lblock: &mut LBlock,
    ) -> EResult {
        let sbits = eres.cgtype.bits();
        let dbits = dst.bits();
        let var = if sbits == dbits {
            eres.var.clone()
        } else {
            let kind = if dbits < sbits {
                InstrKind::Trunc
            } else if eres.cgtype.signed() {
                InstrKind::Sgnext
            } else {
                InstrKind::Zrext
            };
            let var = self.new_tmp();
            lblock.append(Instr::new(
                kind,
                dbits,
                Some(Oper::var(&var)),
                vec![eres.oper()],
            ));
            Some(var)
        };
        let mut out = EResult::rvalue(var, dst, eres.span);
        if eres.cvknown {
            let (value, _) = fold::mask_value(out.cgtype.bits(), out.cgtype.signed(), eres.cvint as i128);
            out = out.with_const(value);
        }
        out
    }

    /// Converts a scalar rvalue to a truth value, emitting the `!= 0` test
    /// unless the operand already is one.
    pub(crate) fn to_truth(&mut self, eres: EResult, lblock: &mut LBlock) -> EResult {
        if eres.cgtype.is_logic() {
            return eres;
        }
        let bits = eres.cgtype.bits();
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Neq,
            bits,
            Some(Oper::var(&var)),
            vec![eres.oper(), Oper::Imm(0)],
        ));
        let mut out = EResult::rvalue(Some(var), CGType::basic(ElmType::Logic), eres.span);
        if eres.cvknown && eres.cvsymbol.is_none() {
            out = out.with_const(i64::from(eres.cvint != 0));
        }
        out
    }

    /// The conversion engine: converts `eres` to `dst`, dispatching on the
    /// source/destination kind pair and emitting the gated diagnostics.
    pub(crate) fn type_convert(
        &mut self,
        eres: EResult,
        dst: &CGType,
        ctx: ConvCtx,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let span = eres.span;
        let implicit = ctx == ConvCtx::Implicit;

        // Conversion to void discards the value.
        if dst.is_void() {
            let mut out = EResult::rvalue(None, dst.clone(), span);
            out.valused = true;
            return Ok(out);
        }

        // Identical scalar type: nothing to do.
        if eres.cgtype == *dst {
            return Ok(eres);
        }

        match (&eres.cgtype, dst) {
            // Conversion to _Bool is a != 0 test, not a truncation.
            (src, CGType::Basic(ElmType::Logic)) if src.is_scalar() => {
                if implicit && !src.is_logic() {
                    self.cg.diags.warn(span, format!("'{src}' used as a truth value"));
                }
                Ok(self.to_truth(eres, lblock))
            }
            (CGType::Basic(selm), CGType::Basic(delm))
                if selm.is_integer() && delm.is_integer() =>
            {
                if implicit {
                    if selm == &ElmType::Logic {
                        self.cg.diags.warn(span, "truth value used as an integer");
                    }
                    if delm.bits() < selm.bits() {
                        if eres.cvknown {
                            let (masked, changed) =
                                fold::mask_value(delm.bits(), delm.signed(), eres.cvint as i128);
                            let _ = masked;
                            if changed {
                                self.cg.diags.warn(span, "number changed in conversion");
                            }
                        } else {
                            self.cg.diags.warn(
                                span,
                                format!("conversion from '{selm}' to '{delm}' may lose digits"),
                            );
                        }
                    } else if selm.signed() != delm.signed() {
                        if eres.cvknown && eres.cvint < 0 && !delm.signed() {
                            self.cg
                                .diags
                                .warn(span, "negative value converted to unsigned");
                        } else {
                            self.cg.diags.warn(span, "conversion changes signedness");
                        }
                    }
                }
                Ok(self.retype_int(eres, dst.clone(), lblock))
            }
            (CGType::Enum(senum), CGType::Enum(denum)) => {
                if senum != denum && implicit {
                    self.cg
                        .diags
                        .warn(span, "converting between different enum types");
                }
                let mut out = eres;
                out.cgtype = dst.clone();
                Ok(out)
            }
            (CGType::Enum(senum), CGType::Basic(delm)) if delm.is_integer() => {
                if implicit && self.cg.enums[*senum].strict() {
                    self.cg.diags.warn(span, "enum value used as an integer");
                }
                let mut out = eres;
                out.cgtype = CGType::basic(ElmType::Int);
                Ok(self.retype_int(out, dst.clone(), lblock))
            }
            (CGType::Basic(selm), CGType::Enum(denum)) if selm.is_integer() => {
                if implicit && self.cg.enums[*denum].strict() {
                    self.cg.diags.warn(span, "integer used as an enum value");
                }
                let out = self.retype_int(eres, CGType::basic(ElmType::Int), lblock);
                let mut out = out;
                out.cgtype = dst.clone();
                Ok(out)
            }
            (CGType::Pointer { target: st, .. }, CGType::Pointer { target: dt, .. }) => {
                if implicit && !dt.is_void() && !st.pointer_compatible(dt) {
                    self.cg
                        .diags
                        .warn(span, "converting to incompatible pointer type");
                }
                let mut out = eres;
                out.cgtype = dst.clone();
                Ok(out)
            }
            (src, CGType::Pointer { .. }) if src.is_integral() => {
                // A literal zero is the null pointer constant.
                let null = eres.cvknown && eres.cvint == 0 && eres.cvsymbol.is_none();
                if implicit && !null {
                    self.cg
                        .diags
                        .warn(span, "integer converted to pointer without a cast");
                }
                let out = self.retype_int(eres, CGType::basic(ElmType::UInt), lblock);
                let mut out = out;
                out.cgtype = dst.clone();
                Ok(out)
            }
            (CGType::Pointer { .. }, CGType::Basic(delm)) if delm.is_integer() => {
                if implicit {
                    self.cg
                        .diags
                        .warn(span, "pointer converted to integer without a cast");
                }
                let mut out = eres;
                out.cgtype = CGType::basic(ElmType::UInt);
                // Pointer constants do not fold into plain integers.
                out.cvknown = out.cvknown && out.cvsymbol.is_none();
                Ok(self.retype_int(out, dst.clone(), lblock))
            }
            (CGType::Record(srec), CGType::Record(drec)) => {
                if srec != drec {
                    self.cg.diags.fatal(span, "incompatible record types");
                    return Err(CgenError::Invalid);
                }
                Ok(eres)
            }
            _ => {
                self.cg.diags.fatal(
                    span,
                    format!("cannot convert '{}' to '{}'", eres.cgtype, dst),
                );
                Err(CgenError::Invalid)
            }
        }
    }
}
