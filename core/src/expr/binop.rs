//! Binary operators, assignment, the conditional operator and calls.
//!
//! The usual arithmetic conversions live here; they collect a flag set
//! describing everything questionable observed on the way, and each
//! operator reports the subset of flags relevant to it.

use super::{ConvCtx, EResult, ValType, fold};
use crate::CgenError;
use crate::ctype::{CGType, ElmType, FuncType};
use crate::module::ProcGen;
use ccir_ast::{AssignOp, BinOp, Expr, Span};
use bitflags::bitflags;
use ccir_ir::{Instr, InstrKind, LBlock, Oper};

bitflags! {
    /// Everything the usual arithmetic conversions noticed.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub(crate) struct UacFlags: u16 {
        /// At least one operand is signed.
        const SIGNED = 1;
        /// At least one operand is a known negative constant.
        const NEGATIVE = 1 << 1;
        /// A signed operand was converted to an unsigned result type.
        const MIX2U = 1 << 2;
        /// A known negative constant was converted to unsigned.
        const NEG2U = 1 << 3;
        /// An enum operand was involved.
        const ENUM = 1 << 4;
        /// Exactly one operand was a strict enum.
        const ENUMMIX = 1 << 5;
        /// Two different enum types met.
        const ENUMINC = 1 << 6;
        /// A truth value was involved.
        const TRUTH = 1 << 7;
        /// A truth value met a non-truth operand.
        const TRUTHMIX = 1 << 8;
    }
}

/// Which warning subset an operator draws from the UAC flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpClass {
    Arith,
    Bitwise,
    Shift,
    Compare,
}

impl ProcGen<'_> {
    /// Validates that a result can stand as a condition and warns when a
    /// non-truth scalar is used.
    pub(crate) fn truth_check(&mut self, eres: &EResult, span: Span) -> Result<(), CgenError> {
        if !eres.cgtype.is_scalar() {
            self.cg
                .diags
                .fatal(span, format!("'{}' used as a truth value", eres.cgtype));
            return Err(CgenError::Invalid);
        }
        if !eres.cgtype.is_logic() {
            self.cg
                .diags
                .warn(span, format!("'{}' used as a truth value", eres.cgtype));
        }
        Ok(())
    }

    pub(crate) fn ebinary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        match op {
            BinOp::Comma => return self.ecomma(lhs, rhs, lblock),
            BinOp::LogAnd => return self.eand(lhs, rhs, span, lblock),
            BinOp::LogOr => return self.eor(lhs, rhs, span, lblock),
            _ => {}
        }
        let lres = self.process_expr(lhs, lblock)?;
        let lres = self.as_rvalue(lres, lblock)?;
        let rres = self.process_expr(rhs, lblock)?;
        let rres = self.as_rvalue(rres, lblock)?;
        match op {
            BinOp::Add => {
                if lres.cgtype.is_pointer() && rres.cgtype.is_integral() {
                    return self.pointer_index(lres, rres, false, span, lblock);
                }
                if lres.cgtype.is_integral() && rres.cgtype.is_pointer() {
                    return self.pointer_index(rres, lres, false, span, lblock);
                }
                self.arith_values(op, OpClass::Arith, lres, rres, span, lblock)
            }
            BinOp::Sub => {
                if lres.cgtype.is_pointer() && rres.cgtype.is_integral() {
                    return self.pointer_index(lres, rres, true, span, lblock);
                }
                if lres.cgtype.is_pointer() && rres.cgtype.is_pointer() {
                    return self.pointer_diff(lres, rres, span, lblock);
                }
                self.arith_values(op, OpClass::Arith, lres, rres, span, lblock)
            }
            BinOp::Mul | BinOp::Div | BinOp::Mod => {
                self.arith_values(op, OpClass::Arith, lres, rres, span, lblock)
            }
            BinOp::Shl | BinOp::Shr => {
                self.arith_values(op, OpClass::Shift, lres, rres, span, lblock)
            }
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => {
                self.arith_values(op, OpClass::Bitwise, lres, rres, span, lblock)
            }
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq | BinOp::Eq | BinOp::Neq => {
                if lres.cgtype.is_pointer() || rres.cgtype.is_pointer() {
                    self.pointer_compare(op, lres, rres, span, lblock)
                } else {
                    self.compare_values(op, lres, rres, span, lblock)
                }
            }
            BinOp::Comma | BinOp::LogAnd | BinOp::LogOr => unreachable!("handled above"),
        }
    }

    /// The usual arithmetic conversions: both operands are promoted, a
    /// common type is chosen (max rank; signed only if the wider operand is
    /// signed), and both are converted to it. The returned flags record
    /// what happened for the operator's warning pass.
    pub(crate) fn uac(
        &mut self,
        a: EResult,
        b: EResult,
        lblock: &mut LBlock,
    ) -> Result<(EResult, EResult, UacFlags), CgenError> {
        let mut flags = UacFlags::empty();
        let aenum = match a.cgtype {
            CGType::Enum(eref) => Some(eref),
            _ => None,
        };
        let benum = match b.cgtype {
            CGType::Enum(eref) => Some(eref),
            _ => None,
        };
        if aenum.is_some() || benum.is_some() {
            flags |= UacFlags::ENUM;
        }
        match (aenum, benum) {
            (Some(x), Some(y)) if x != y => flags |= UacFlags::ENUMINC,
            (Some(eref), None) | (None, Some(eref)) => {
                if self.cg.enums[eref].strict() {
                    flags |= UacFlags::ENUMMIX;
                }
            }
            _ => {}
        }
        let alogic = a.cgtype.is_logic();
        let blogic = b.cgtype.is_logic();
        if alogic || blogic {
            flags |= UacFlags::TRUTH;
            if alogic != blogic {
                flags |= UacFlags::TRUTHMIX;
            }
        }
        if a.cgtype.signed() || b.cgtype.signed() {
            flags |= UacFlags::SIGNED;
        }
        if (a.cvknown && a.cvint < 0) || (b.cvknown && b.cvint < 0) {
            flags |= UacFlags::NEGATIVE;
        }

        let a = self.promote(a, lblock)?;
        let b = self.promote(b, lblock)?;
        let aelm = basic_elm(&a.cgtype);
        let belm = basic_elm(&b.cgtype);
        let relm = common_elm(aelm, belm);
        if !relm.signed() {
            if aelm.signed() {
                flags |= UacFlags::MIX2U;
                if a.cvknown && a.cvint < 0 {
                    flags |= UacFlags::NEG2U;
                }
            }
            if belm.signed() {
                flags |= UacFlags::MIX2U;
                if b.cvknown && b.cvint < 0 {
                    flags |= UacFlags::NEG2U;
                }
            }
        }
        let rtype = CGType::basic(relm);
        let a = self.retype_int(a, rtype.clone(), lblock);
        let b = self.retype_int(b, rtype, lblock);
        Ok((a, b, flags))
    }

    /// Reports the flag subset relevant to the operator class.
    fn warn_uac(&mut self, class: OpClass, flags: UacFlags, span: Span) {
        if flags.contains(UacFlags::ENUMINC) {
            self.cg.diags.warn(span, "mixing incompatible enum types");
        } else if flags.contains(UacFlags::ENUMMIX) {
            self.cg.diags.warn(span, "mixing enum and non-enum operands");
        }
        if flags.contains(UacFlags::TRUTHMIX) {
            self.cg.diags.warn(span, "mixing truth value and integer");
        }
        match class {
            OpClass::Arith => {
                if flags.contains(UacFlags::NEG2U) {
                    self.cg.diags.warn(span, "negative value converted to unsigned");
                } else if flags.contains(UacFlags::MIX2U) {
                    self.cg.diags.warn(span, "signed value converted to unsigned");
                }
            }
            OpClass::Compare => {
                if flags.contains(UacFlags::MIX2U) {
                    self.cg
                        .diags
                        .warn(span, "comparison of signed and unsigned values");
                }
            }
            OpClass::Bitwise | OpClass::Shift => {
                if flags.contains(UacFlags::NEGATIVE) {
                    self.cg.diags.warn(span, "bitwise operation on negative value");
                } else if flags.contains(UacFlags::SIGNED) {
                    self.cg.diags.warn(span, "bitwise operation on signed value");
                }
            }
        }
    }

    /// Arithmetic/bitwise/shift operation over two integral rvalues.
    pub(crate) fn arith_values(
        &mut self,
        op: BinOp,
        class: OpClass,
        a: EResult,
        b: EResult,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        if !a.cgtype.is_integral() || !b.cgtype.is_integral() {
            self.cg.diags.fatal(
                span,
                format!("invalid operands ({}, {})", a.cgtype, b.cgtype),
            );
            return Err(CgenError::Invalid);
        }
        let (a, b, flags) = self.uac(a, b, lblock)?;
        self.warn_uac(class, flags, span);
        let rtype = a.cgtype.clone();
        let bits = rtype.bits();
        let signed = rtype.signed();
        let kind = match op {
            BinOp::Add => InstrKind::Add,
            BinOp::Sub => InstrKind::Sub,
            BinOp::Mul => InstrKind::Mul,
            BinOp::Div => {
                if signed {
                    InstrKind::Sdiv
                } else {
                    InstrKind::Udiv
                }
            }
            BinOp::Mod => {
                if signed {
                    InstrKind::Smod
                } else {
                    InstrKind::Umod
                }
            }
            BinOp::Shl => InstrKind::Shl,
            BinOp::Shr => {
                if signed {
                    InstrKind::Shra
                } else {
                    InstrKind::Shrl
                }
            }
            BinOp::BitAnd => InstrKind::And,
            BinOp::BitOr => InstrKind::Or,
            BinOp::BitXor => InstrKind::Xor,
            _ => unreachable!("not an arithmetic operator"),
        };
        let var = self.new_tmp();
        lblock.append(Instr::new(
            kind,
            bits,
            Some(Oper::var(&var)),
            vec![a.oper(), b.oper()],
        ));
        let mut out = EResult::rvalue(Some(var), rtype, span);
        if a.cvknown && b.cvknown {
            let (value, issues) = fold::binop(op, a.cvint, b.cvint, bits, signed);
            issues.report(&mut self.cg.diags, span);
            if !issues.divzero {
                out = out.with_const(value);
            }
        }
        Ok(out)
    }

    /// Integer comparison; yields a truth value.
    fn compare_values(
        &mut self,
        op: BinOp,
        a: EResult,
        b: EResult,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        if !a.cgtype.is_integral() || !b.cgtype.is_integral() {
            self.cg.diags.fatal(
                span,
                format!("invalid operands ({}, {})", a.cgtype, b.cgtype),
            );
            return Err(CgenError::Invalid);
        }
        let (a, b, flags) = self.uac(a, b, lblock)?;
        self.warn_uac(OpClass::Compare, flags, span);
        let bits = a.cgtype.bits();
        let signed = a.cgtype.signed();
        let kind = compare_kind(op, signed);
        let var = self.new_tmp();
        lblock.append(Instr::new(
            kind,
            bits,
            Some(Oper::var(&var)),
            vec![a.oper(), b.oper()],
        ));
        let mut out = EResult::rvalue(Some(var), CGType::basic(ElmType::Logic), span);
        if a.cvknown && b.cvknown {
            out = out.with_const(fold::compare(op, a.cvint, b.cvint, bits, signed));
        }
        Ok(out)
    }

    /// Pointer plus (optionally negated) scaled index.
    pub(crate) fn pointer_index(
        &mut self,
        ptr: EResult,
        idx: EResult,
        negate: bool,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let CGType::Pointer { target, .. } = &ptr.cgtype else {
            self.cg
                .diags
                .fatal(span, format!("pointer expected ({})", ptr.cgtype));
            return Err(CgenError::Invalid);
        };
        let Some(esize) = target.sizeof(&self.cg.records, &self.cg.enums) else {
            self.cg
                .diags
                .fatal(span, "arithmetic on pointer to incomplete type");
            return Err(CgenError::Invalid);
        };
        if !idx.cgtype.is_integral() {
            self.cg
                .diags
                .fatal(span, format!("integer expected ({})", idx.cgtype));
            return Err(CgenError::Invalid);
        }
        // The index is brought to pointer width.
        let idx = self.retype_int(idx, CGType::basic(ElmType::Int), lblock);
        let idx = if negate {
            let var = self.new_tmp();
            lblock.append(Instr::new(
                InstrKind::Neg,
                16,
                Some(Oper::var(&var)),
                vec![idx.oper()],
            ));
            let mut negated = EResult::rvalue(Some(var), idx.cgtype.clone(), idx.span);
            if idx.cvknown {
                let (value, _) = fold::mask_value(16, true, -i128::from(idx.cvint));
                negated = negated.with_const(value);
            }
            negated
        } else {
            idx
        };
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Ptridx,
            16,
            Some(Oper::var(&var)),
            vec![ptr.oper(), idx.oper(), Oper::Imm(esize as i64)],
        ));
        let mut out = EResult::rvalue(Some(var), ptr.cgtype.clone(), span);
        if ptr.cvknown && idx.cvknown {
            out.cvknown = true;
            out.cvint = ptr.cvint.wrapping_add(idx.cvint.wrapping_mul(esize as i64));
            out.cvsymbol = ptr.cvsymbol;
        }
        Ok(out)
    }

    /// Pointer difference in elements.
    fn pointer_diff(
        &mut self,
        a: EResult,
        b: EResult,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let (CGType::Pointer { target: ta, .. }, CGType::Pointer { target: tb, .. }) =
            (&a.cgtype, &b.cgtype)
        else {
            unreachable!("pointer_diff on non-pointers");
        };
        if !ta.pointer_compatible(tb) {
            self.cg
                .diags
                .warn(span, "subtraction of incompatible pointer types");
        }
        let Some(esize) = ta.sizeof(&self.cg.records, &self.cg.enums) else {
            self.cg
                .diags
                .fatal(span, "arithmetic on pointer to incomplete type");
            return Err(CgenError::Invalid);
        };
        let var = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Ptrdiff,
            16,
            Some(Oper::var(&var)),
            vec![a.oper(), b.oper(), Oper::Imm(esize as i64)],
        ));
        let mut out = EResult::rvalue(Some(var), CGType::basic(ElmType::Int), span);
        if a.cvknown && b.cvknown && a.cvsymbol == b.cvsymbol && esize != 0 {
            out = out.with_const((a.cvint - b.cvint) / esize as i64);
        }
        Ok(out)
    }

    /// Pointer comparison; also covers pointer-against-integer.
    fn pointer_compare(
        &mut self,
        op: BinOp,
        a: EResult,
        b: EResult,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let mut a = a;
        let mut b = b;
        for side in [&mut a, &mut b] {
            if side.cgtype.is_integral() {
                let null = side.cvknown && side.cvint == 0 && side.cvsymbol.is_none();
                if !null {
                    self.cg
                        .diags
                        .warn(span, "comparison between pointer and integer");
                }
                let retyped = self.retype_int(side.clone(), CGType::basic(ElmType::UInt), lblock);
                *side = retyped;
            }
        }
        if let (CGType::Pointer { target: ta, .. }, CGType::Pointer { target: tb, .. }) =
            (&a.cgtype, &b.cgtype)
        {
            if !ta.pointer_compatible(tb) && !ta.is_void() && !tb.is_void() {
                self.cg
                    .diags
                    .warn(span, "comparison of incompatible pointer types");
            }
        }
        let kind = compare_kind(op, false);
        let var = self.new_tmp();
        lblock.append(Instr::new(
            kind,
            16,
            Some(Oper::var(&var)),
            vec![a.oper(), b.oper()],
        ));
        let mut out = EResult::rvalue(Some(var), CGType::basic(ElmType::Logic), span);
        // Constant pointers fold only over a common base symbol; comparing
        // addresses of different symbols stays unknown.
        if a.cvknown && b.cvknown && a.cvsymbol == b.cvsymbol {
            out = out.with_const(fold::compare(op, a.cvint, b.cvint, 16, false));
        }
        Ok(out)
    }

    /// Short-circuit `&&`.
    fn eand(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let false_label = self.create_label("false_and");
        let end_label = self.create_label("end_and");
        let lres = self.process_expr(lhs, lblock)?;
        let lres = self.as_rvalue(lres, lblock)?;
        self.truth_check(&lres, lres.span)?;
        lblock.append(Instr::new(
            InstrKind::Jz,
            lres.cgtype.bits(),
            None,
            vec![lres.oper(), Oper::var(&false_label)],
        ));
        let rres = self.process_expr(rhs, lblock)?;
        let rres = self.as_rvalue(rres, lblock)?;
        self.truth_check(&rres, rres.span)?;
        let rtruth = self.to_truth(rres, lblock);
        let dest = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Copy,
            16,
            Some(Oper::var(&dest)),
            vec![rtruth.oper()],
        ));
        lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&end_label)]));
        lblock.append_label(&false_label);
        lblock.append(Instr::new(
            InstrKind::Imm,
            16,
            Some(Oper::var(&dest)),
            vec![Oper::Imm(0)],
        ));
        lblock.append_label(&end_label);
        let mut out = EResult::rvalue(Some(dest), CGType::basic(ElmType::Logic), span);
        if lres.cvknown && lres.cvsymbol.is_none() && lres.cvint == 0 {
            out = out.with_const(0);
        } else if lres.cvknown && rtruth.cvknown {
            out = out.with_const(i64::from(lres.cvint != 0 && rtruth.cvint != 0));
        }
        Ok(out)
    }

    /// Short-circuit `||`.
    fn eor(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let true_label = self.create_label("true_or");
        let end_label = self.create_label("end_or");
        let lres = self.process_expr(lhs, lblock)?;
        let lres = self.as_rvalue(lres, lblock)?;
        self.truth_check(&lres, lres.span)?;
        lblock.append(Instr::new(
            InstrKind::Jnz,
            lres.cgtype.bits(),
            None,
            vec![lres.oper(), Oper::var(&true_label)],
        ));
        let rres = self.process_expr(rhs, lblock)?;
        let rres = self.as_rvalue(rres, lblock)?;
        self.truth_check(&rres, rres.span)?;
        let rtruth = self.to_truth(rres, lblock);
        let dest = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Copy,
            16,
            Some(Oper::var(&dest)),
            vec![rtruth.oper()],
        ));
        lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&end_label)]));
        lblock.append_label(&true_label);
        lblock.append(Instr::new(
            InstrKind::Imm,
            16,
            Some(Oper::var(&dest)),
            vec![Oper::Imm(1)],
        ));
        lblock.append_label(&end_label);
        let mut out = EResult::rvalue(Some(dest), CGType::basic(ElmType::Logic), span);
        let lhs_true = lres.cvknown && (lres.cvint != 0 || lres.cvsymbol.is_some());
        if lhs_true {
            out = out.with_const(1);
        } else if lres.cvknown && rtruth.cvknown {
            out = out.with_const(i64::from(lres.cvint != 0 || rtruth.cvint != 0));
        }
        Ok(out)
    }

    fn ecomma(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let lres = self.process_expr(lhs, lblock)?;
        if !lres.valused {
            self.cg
                .diags
                .warn(lres.span, "left operand of comma expression has no effect");
        }
        let rres = self.process_expr(rhs, lblock)?;
        self.as_rvalue(rres, lblock)
    }

    /// Simple and compound assignment.
    pub(crate) fn eassign(
        &mut self,
        op: AssignOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let lres = self.process_expr(lhs, lblock)?;
        let lres = self.as_lvalue(lres)?;
        if lres.cgtype.is_array() {
            self.cg
                .diags
                .fatal(span, "assignment to expression with array type");
            return Err(CgenError::Invalid);
        }
        if op == AssignOp::Assign {
            let rres = self.process_expr(rhs, lblock)?;
            let rres = self.as_rvalue(rres, lblock)?;
            let rres = self.type_convert(rres, &lres.cgtype.clone(), ConvCtx::Implicit, lblock)?;
            self.store(&lres, &rres, lblock);
            let mut out = EResult::rvalue(rres.var.clone(), lres.cgtype, span);
            out.valused = true;
            return Ok(out);
        }

        let cur = self.read_lvalue(&lres, lblock)?;
        let rres = self.process_expr(rhs, lblock)?;
        let rres = self.as_rvalue(rres, lblock)?;
        let binop = match op {
            AssignOp::Add => BinOp::Add,
            AssignOp::Sub => BinOp::Sub,
            AssignOp::Mul => BinOp::Mul,
            AssignOp::Div => BinOp::Div,
            AssignOp::Mod => BinOp::Mod,
            AssignOp::Shl => BinOp::Shl,
            AssignOp::Shr => BinOp::Shr,
            AssignOp::BitAnd => BinOp::BitAnd,
            AssignOp::BitOr => BinOp::BitOr,
            AssignOp::BitXor => BinOp::BitXor,
            AssignOp::Assign => unreachable!("handled above"),
        };
        let class = match binop {
            BinOp::Shl | BinOp::Shr => OpClass::Shift,
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => OpClass::Bitwise,
            _ => OpClass::Arith,
        };
        let val = if cur.cgtype.is_pointer() && matches!(binop, BinOp::Add | BinOp::Sub) {
            if !rres.cgtype.is_integral() {
                self.cg
                    .diags
                    .fatal(span, format!("integer expected ({})", rres.cgtype));
                return Err(CgenError::Invalid);
            }
            self.pointer_index(cur, rres, binop == BinOp::Sub, span, lblock)?
        } else {
            self.arith_values(binop, class, cur, rres, span, lblock)?
        };
        let val = self.widen_to_lvalue_type(val, &lres.cgtype, lblock)?;
        self.store(&lres, &val, lblock);
        let mut out = EResult::rvalue(val.var.clone(), lres.cgtype, span);
        out.valused = true;
        Ok(out)
    }

    /// Brings a computed value back to the destination type of a compound
    /// assignment. An enum destination takes the int-typed result of its
    /// own arithmetic back silently.
    fn widen_to_lvalue_type(
        &mut self,
        val: EResult,
        dst: &CGType,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        if matches!(dst, CGType::Enum(_)) && val.cgtype.is_integer() {
            let mut out = self.retype_int(val, CGType::basic(ElmType::Int), lblock);
            out.cgtype = dst.clone();
            return Ok(out);
        }
        if val.cgtype == *dst {
            return Ok(val);
        }
        self.type_convert(val, dst, ConvCtx::Implicit, lblock)
    }

    /// Emits the store for an assignment.
    pub(crate) fn store(&mut self, lres: &EResult, val: &EResult, lblock: &mut LBlock) {
        if lres.cgtype.is_record() {
            lblock.append(Instr::new(
                InstrKind::Reccopy,
                0,
                None,
                vec![lres.oper(), val.oper()],
            ));
        } else {
            lblock.append(Instr::new(
                InstrKind::Write,
                lres.cgtype.bits(),
                None,
                vec![lres.oper(), val.oper()],
            ));
        }
    }

    /// Pre/post increment and decrement.
    pub(crate) fn eincdec(
        &mut self,
        arg: &Expr,
        span: Span,
        inc: bool,
        pre: bool,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let lres = self.process_expr(arg, lblock)?;
        let lres = self.as_lvalue(lres)?;
        if lres.cgtype.is_array() {
            self.cg
                .diags
                .fatal(span, "assignment to expression with array type");
            return Err(CgenError::Invalid);
        }
        let cur = self.read_lvalue(&lres, lblock)?;
        let val = if cur.cgtype.is_pointer() {
            let one_var = self.new_tmp();
            lblock.append(Instr::new(
                InstrKind::Imm,
                16,
                Some(Oper::var(&one_var)),
                vec![Oper::Imm(1)],
            ));
            let one =
                EResult::rvalue(Some(one_var), CGType::basic(ElmType::Int), span).with_const(1);
            self.pointer_index(cur.clone(), one, !inc, span, lblock)?
        } else if cur.cgtype.is_integral() {
            let bits = cur.cgtype.bits();
            let one_var = self.new_tmp();
            lblock.append(Instr::new(
                InstrKind::Imm,
                bits,
                Some(Oper::var(&one_var)),
                vec![Oper::Imm(1)],
            ));
            let var = self.new_tmp();
            lblock.append(Instr::new(
                if inc { InstrKind::Add } else { InstrKind::Sub },
                bits,
                Some(Oper::var(&var)),
                vec![cur.oper(), Oper::var(&one_var)],
            ));
            EResult::rvalue(Some(var), cur.cgtype.clone(), span)
        } else {
            self.cg.diags.fatal(
                span,
                format!("invalid operand of increment/decrement ({})", cur.cgtype),
            );
            return Err(CgenError::Invalid);
        };
        self.store(&lres, &val, lblock);
        let mut out = if pre { val } else { cur };
        out.span = span;
        out.valused = true;
        Ok(out)
    }

    /// The conditional operator. The false arm is synthesized into a
    /// detached block first, because the result type is only known once
    /// both arms have been lowered; the block is spliced into place after
    /// the common type is settled.
    pub(crate) fn etcond(
        &mut self,
        cond: &Expr,
        then_arm: &Expr,
        else_arm: &Expr,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        let false_label = self.create_label("false_cond");
        let end_label = self.create_label("end_cond");
        let cres = self.process_expr(cond, lblock)?;
        let cres = self.as_rvalue(cres, lblock)?;
        self.truth_check(&cres, cres.span)?;
        lblock.append(Instr::new(
            InstrKind::Jz,
            cres.cgtype.bits(),
            None,
            vec![cres.oper(), Oper::var(&false_label)],
        ));

        let tres = self.process_expr(then_arm, lblock)?;
        let tres = self.as_rvalue(tres, lblock)?;
        let mut detached = LBlock::new();
        let fres = self.process_expr(else_arm, &mut detached)?;
        let fres = self.as_rvalue(fres, &mut detached)?;

        let rtype = self.cond_result_type(&tres, &fres, span)?;
        if rtype.is_void() {
            lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&end_label)]));
            lblock.append_label(&false_label);
            lblock.append_block(&mut detached);
            lblock.append_label(&end_label);
            let mut out = EResult::rvalue(None, rtype, span);
            out.valused = tres.valused && fres.valused;
            return Ok(out);
        }

        let dest = self.new_tmp();
        let bits = rtype.bits();
        let tconv = self.type_convert(tres, &rtype, ConvCtx::Silent, lblock)?;
        lblock.append(Instr::new(
            InstrKind::Copy,
            bits,
            Some(Oper::var(&dest)),
            vec![tconv.oper()],
        ));
        lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&end_label)]));
        lblock.append_label(&false_label);
        lblock.append_block(&mut detached);
        let fconv = self.type_convert(fres, &rtype, ConvCtx::Silent, lblock)?;
        lblock.append(Instr::new(
            InstrKind::Copy,
            bits,
            Some(Oper::var(&dest)),
            vec![fconv.oper()],
        ));
        lblock.append_label(&end_label);

        let mut out = EResult::rvalue(Some(dest), rtype, span);
        if cres.cvknown {
            let taken = if cres.cvint != 0 || cres.cvsymbol.is_some() {
                &tconv
            } else {
                &fconv
            };
            if taken.cvknown {
                out.cvknown = true;
                out.cvint = taken.cvint;
                out.cvsymbol = taken.cvsymbol;
            }
        }
        Ok(out)
    }

    /// Result type of the conditional operator (C99 6.5.15).
    fn cond_result_type(
        &mut self,
        t: &EResult,
        f: &EResult,
        span: Span,
    ) -> Result<CGType, CgenError> {
        if t.cgtype.is_void() && f.cgtype.is_void() {
            return Ok(CGType::basic(ElmType::Void));
        }
        if let (CGType::Enum(a), CGType::Enum(b)) = (&t.cgtype, &f.cgtype) {
            if a == b {
                return Ok(t.cgtype.clone());
            }
        }
        if t.cgtype.is_arithmetic() && f.cgtype.is_arithmetic() {
            let ta = promoted_elm(&t.cgtype);
            let fb = promoted_elm(&f.cgtype);
            return Ok(CGType::basic(common_elm(ta, fb)));
        }
        if let (CGType::Record(a), CGType::Record(b)) = (&t.cgtype, &f.cgtype) {
            if a == b {
                return Ok(t.cgtype.clone());
            }
        }
        match (&t.cgtype, &f.cgtype) {
            (CGType::Pointer { target: ta, .. }, CGType::Pointer { target: tb, .. }) => {
                if ta.is_void() {
                    return Ok(t.cgtype.clone());
                }
                if tb.is_void() {
                    return Ok(f.cgtype.clone());
                }
                if !ta.pointer_compatible(tb) {
                    self.cg
                        .diags
                        .warn(span, "pointer type mismatch in conditional expression");
                }
                Ok(t.cgtype.clone())
            }
            (CGType::Pointer { .. }, other) if other.is_integral() => {
                if !(f.cvknown && f.cvint == 0 && f.cvsymbol.is_none()) {
                    self.cg
                        .diags
                        .warn(span, "pointer/integer type mismatch in conditional expression");
                }
                Ok(t.cgtype.clone())
            }
            (other, CGType::Pointer { .. }) if other.is_integral() => {
                if !(t.cvknown && t.cvint == 0 && t.cvsymbol.is_none()) {
                    self.cg
                        .diags
                        .warn(span, "pointer/integer type mismatch in conditional expression");
                }
                Ok(f.cgtype.clone())
            }
            _ => {
                self.cg.diags.fatal(
                    span,
                    format!(
                        "type mismatch in conditional expression ({}, {})",
                        t.cgtype, f.cgtype
                    ),
                );
                Err(CgenError::Invalid)
            }
        }
    }

    /// Function call, direct or through a function pointer.
    pub(crate) fn ecall(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<EResult, CgenError> {
        enum CallTarget {
            Direct(String),
            Indirect(String),
        }

        let cres = self.process_expr(callee, lblock)?;
        // A named function is called directly; anything else goes through a
        // function pointer and a synthesized callsign declaration.
        let direct = match (&cres.cgtype, cres.cvsymbol, cres.valtype) {
            (CGType::Func(ftype), Some(symbol), ValType::Lvalue) => Some((
                (**ftype).clone(),
                self.cg.symbols[symbol].irident.clone(),
            )),
            _ => None,
        };
        let (ftype, target): (FuncType, CallTarget) = match direct {
            Some((ftype, irident)) => (ftype, CallTarget::Direct(irident)),
            None => {
                let cres = self.as_rvalue(cres, lblock)?;
                let ftype = match &cres.cgtype {
                    CGType::Pointer { target, .. } => match &**target {
                        CGType::Func(ftype) => (**ftype).clone(),
                        _ => {
                            self.cg.diags.fatal(
                                span,
                                format!("called object is not a function ({})", cres.cgtype),
                            );
                            return Err(CgenError::Invalid);
                        }
                    },
                    _ => {
                        self.cg.diags.fatal(
                            span,
                            format!("called object is not a function ({})", cres.cgtype),
                        );
                        return Err(CgenError::Invalid);
                    }
                };
                let fptr = cres.var.clone().expect("function pointer has no variable");
                (ftype, CallTarget::Indirect(fptr))
            }
        };

        let fixed = ftype.args.len();
        if args.len() < fixed {
            self.cg.diags.fatal(span, "too few arguments in function call");
            return Err(CgenError::Invalid);
        }
        if args.len() > fixed && !ftype.variadic {
            self.cg.diags.fatal(span, "too many arguments in function call");
            return Err(CgenError::Invalid);
        }

        let mut aopers = Vec::new();
        for (i, arg) in args.iter().enumerate() {
            let ares = self.process_expr(arg, lblock)?;
            if i < fixed {
                let ptype = ftype.args[i].clone();
                if let (
                    CGType::Array {
                        size: Some(psize), ..
                    },
                    CGType::Array {
                        size: Some(asize), ..
                    },
                ) = (&ptype, &ares.cgtype)
                {
                    if asize < psize {
                        self.cg
                            .diags
                            .warn(ares.span, "array argument smaller than expected");
                    }
                }
                let ares = self.as_rvalue(ares, lblock)?;
                let ptype = adjust_param(&ptype);
                let ares = self.type_convert(ares, &ptype, ConvCtx::Implicit, lblock)?;
                aopers.push(ares.oper());
            } else {
                let ares = self.as_rvalue(ares, lblock)?;
                let ares = if ares.cgtype.is_integral() {
                    self.promote(ares, lblock)?
                } else {
                    ares
                };
                aopers.push(ares.oper());
            }
        }

        let (dest, width) = if ftype.ret.is_void() {
            (None, 0)
        } else {
            (Some(self.new_tmp()), ftype.ret.bits())
        };
        match target {
            CallTarget::Direct(irident) => {
                lblock.append(Instr::new(
                    InstrKind::Call,
                    width,
                    dest.clone().map(Oper::Var),
                    vec![Oper::var(irident), Oper::List(aopers)],
                ));
            }
            CallTarget::Indirect(fptr) => {
                let callsign = self.cg.create_callsign(&ftype, span)?;
                lblock.append(Instr::new(
                    InstrKind::Calli,
                    width,
                    dest.clone().map(Oper::Var),
                    vec![Oper::var(fptr), Oper::List(aopers), Oper::var(callsign)],
                ));
            }
        }
        let mut out = EResult::rvalue(dest, ftype.ret.clone(), span);
        out.valused = true;
        Ok(out)
    }
}

/// Adjusts a declared parameter type: arrays become pointers to their
/// element, functions become function pointers.
pub(crate) fn adjust_param(ptype: &CGType) -> CGType {
    match ptype {
        CGType::Array { elem, .. } => CGType::pointer((**elem).clone()),
        CGType::Func(_) => CGType::pointer(ptype.clone()),
        other => other.clone(),
    }
}

fn basic_elm(cgtype: &CGType) -> ElmType {
    match cgtype {
        CGType::Basic(elm) => *elm,
        _ => unreachable!("basic type expected after promotion"),
    }
}

/// Integer promotion on the type level only.
fn promoted_elm(cgtype: &CGType) -> ElmType {
    match cgtype {
        CGType::Basic(elm) if elm.rank() >= ElmType::Int.rank() => *elm,
        CGType::Basic(_) => ElmType::Int,
        CGType::Enum(_) => ElmType::Int,
        _ => unreachable!("arithmetic type expected"),
    }
}

/// Common type of two promoted operands: maximum rank; signed only when the
/// wider operand is signed, unsigned when the widths tie with mixed signs.
fn common_elm(a: ElmType, b: ElmType) -> ElmType {
    if a.bits() == b.bits() {
        a.with_signedness(a.signed() && b.signed())
    } else if a.bits() > b.bits() {
        a
    } else {
        b
    }
}

fn compare_kind(op: BinOp, signed: bool) -> InstrKind {
    match (op, signed) {
        (BinOp::Eq, _) => InstrKind::Eq,
        (BinOp::Neq, _) => InstrKind::Neq,
        (BinOp::Lt, true) => InstrKind::Lt,
        (BinOp::LtEq, true) => InstrKind::Lteq,
        (BinOp::Gt, true) => InstrKind::Gt,
        (BinOp::GtEq, true) => InstrKind::Gteq,
        (BinOp::Lt, false) => InstrKind::Ltu,
        (BinOp::LtEq, false) => InstrKind::Lteu,
        (BinOp::Gt, false) => InstrKind::Gtu,
        (BinOp::GtEq, false) => InstrKind::Gteu,
        _ => unreachable!("not a comparison operator"),
    }
}
