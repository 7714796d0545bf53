//! Statement lowering.
//!
//! Structured statements expand to labels and conditional jumps. Labels are
//! minted from a per-procedure counter (`%while0`, `%end_while1`, ...), so
//! every minted label is unique within the procedure; goto labels use the
//! `%_` prefix and cannot collide with them.
//!
//! Loops push their break/continue targets onto the owned stacks in
//! [ProcGen]; switches additionally push a [SwitchFrame] carrying the
//! dispatch-chain state.

#[cfg(test)]
mod tests;

use crate::CgenError;
use crate::ctype::CGType;
use crate::module::{BreakTarget, ContinueTarget, ProcGen, SwitchFrame};
use crate::expr::ConvCtx;
use crate::labels::Labels;
use crate::scope::ScopeMember;
use ccir_ast::{Block, Expr, ForInit, IfStmt, Span, Stmt};
use ccir_ir::{Instr, InstrKind, LBlock, Oper};

impl ProcGen<'_> {
    /// Lowers a block body in a fresh scope. The scope closes on all paths,
    /// including error returns, so the unused-identifier pass always runs.
    pub fn process_block(&mut self, block: &Block, lblock: &mut LBlock) -> Result<(), CgenError> {
        self.cg.scope.push();
        let mut result = Ok(());
        for stmt in &block.stmts {
            if let Err(err) = self.process_stmt(stmt, lblock) {
                result = Err(err);
                break;
            }
        }
        self.scope_pop_warn();
        result
    }

    /// Pops the innermost scope and warns about unused definitions, in
    /// insertion order.
    pub(crate) fn scope_pop_warn(&mut self) {
        for entry in self.cg.scope.pop() {
            if entry.used {
                continue;
            }
            match entry.member {
                ScopeMember::Arg { .. } => self
                    .cg
                    .diags
                    .warn(entry.span, format!("unused parameter '{}'", entry.name)),
                ScopeMember::LVar { .. } => self
                    .cg
                    .diags
                    .warn(entry.span, format!("unused variable '{}'", entry.name)),
                ScopeMember::TDef { .. } => self
                    .cg
                    .diags
                    .warn(entry.span, format!("unused type definition '{}'", entry.name)),
                _ => {}
            }
        }
    }

    /// Lowers one statement.
    pub fn process_stmt(&mut self, stmt: &Stmt, lblock: &mut LBlock) -> Result<(), CgenError> {
        match stmt {
            Stmt::Expr(expr) => {
                let eres = self.process_expr(expr, lblock)?;
                if !eres.valused {
                    self.cg
                        .diags
                        .warn(eres.span, "computed expression value is not used");
                }
                Ok(())
            }
            Stmt::Decl(decln) => self.process_stdecln(decln, lblock),
            Stmt::Block(block) => {
                self.cg.diags.warn(block.span, "gratuitous nested block");
                self.process_block(block, lblock)
            }
            Stmt::If(ifstmt) => self.process_if(ifstmt, lblock),
            Stmt::While { cond, body, .. } => self.process_while(cond, body, lblock),
            Stmt::DoWhile { body, cond, .. } => self.process_do(body, cond, lblock),
            Stmt::For {
                init,
                cond,
                next,
                body,
                ..
            } => self.process_for(init.as_ref(), cond.as_ref(), next.as_ref(), body, lblock),
            Stmt::Switch { expr, body, span } => self.process_switch(expr, body, *span, lblock),
            Stmt::Case { expr, span } => self.process_case(expr, *span, lblock),
            Stmt::Default { span } => self.process_default(*span, lblock),
            Stmt::Break { span } => self.process_break(*span, lblock),
            Stmt::Continue { span } => self.process_continue(*span, lblock),
            Stmt::Goto { label } => {
                self.labels.use_label(&label.name, label.span);
                lblock.append(Instr::new(
                    InstrKind::Jmp,
                    0,
                    None,
                    vec![Oper::var(Labels::ir_label(&label.name))],
                ));
                Ok(())
            }
            Stmt::Labeled { label } => {
                if self.labels.define(&label.name, label.span).is_err() {
                    self.cg
                        .diags
                        .fatal(label.span, format!("duplicate label '{}'", label.name));
                    return Err(CgenError::Invalid);
                }
                lblock.append_label(Labels::ir_label(&label.name));
                Ok(())
            }
            Stmt::Return { expr, span } => self.process_return(expr.as_ref(), *span, lblock),
            Stmt::Null { .. } => Ok(()),
        }
    }

    /// Lowers a condition and emits the conditional jump. Validates that
    /// the condition is scalar and warns when it is not a truth value.
    pub(crate) fn truth_cjmp(
        &mut self,
        cond: &Expr,
        label: &str,
        jump_true: bool,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        let cres = self.process_expr(cond, lblock)?;
        let cres = self.as_rvalue(cres, lblock)?;
        self.truth_check(&cres, cres.span)?;
        lblock.append(Instr::new(
            if jump_true { InstrKind::Jnz } else { InstrKind::Jz },
            cres.cgtype.bits(),
            None,
            vec![cres.oper(), Oper::var(label)],
        ));
        Ok(())
    }

    /// `if` / `else if` / `else`: each branch gets its own false label, the
    /// whole statement shares one end label.
    pub fn process_if(&mut self, ifstmt: &IfStmt, lblock: &mut LBlock) -> Result<(), CgenError> {
        if ifstmt.branches.is_empty() {
            return Ok(());
        }
        let end_label = self.create_label("end_if");
        let last = ifstmt.branches.len() - 1;
        for (i, (cond, body)) in ifstmt.branches.iter().enumerate() {
            let false_label = self.create_label("false_if");
            self.truth_cjmp(cond, &false_label, false, lblock)?;
            self.process_block(body, lblock)?;
            // The final branch falls through to the end label unless an
            // else block follows.
            if i != last || ifstmt.else_block.is_some() {
                lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&end_label)]));
            }
            lblock.append_label(&false_label);
        }
        if let Some(else_block) = &ifstmt.else_block {
            self.process_block(else_block, lblock)?;
        }
        lblock.append_label(&end_label);
        Ok(())
    }

    pub fn process_while(
        &mut self,
        cond: &Expr,
        body: &Block,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        let while_label = self.create_label("while");
        let end_label = self.create_label("end_while");
        lblock.append_label(&while_label);
        self.truth_cjmp(cond, &end_label, false, lblock)?;
        self.break_stack.push(BreakTarget {
            label: end_label.clone(),
        });
        self.continue_stack.push(ContinueTarget {
            label: while_label.clone(),
        });
        let result = self.process_block(body, lblock);
        self.continue_stack.pop();
        self.break_stack.pop();
        result?;
        lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&while_label)]));
        lblock.append_label(&end_label);
        Ok(())
    }

    pub fn process_do(
        &mut self,
        body: &Block,
        cond: &Expr,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        let do_label = self.create_label("do");
        let next_label = self.create_label("next_do");
        let end_label = self.create_label("end_do");
        lblock.append_label(&do_label);
        self.break_stack.push(BreakTarget {
            label: end_label.clone(),
        });
        self.continue_stack.push(ContinueTarget {
            label: next_label.clone(),
        });
        let result = self.process_block(body, lblock);
        self.continue_stack.pop();
        self.break_stack.pop();
        result?;
        lblock.append_label(&next_label);
        self.truth_cjmp(cond, &do_label, true, lblock)?;
        lblock.append_label(&end_label);
        Ok(())
    }

    pub fn process_for(
        &mut self,
        init: Option<&ForInit>,
        cond: Option<&Expr>,
        next: Option<&Expr>,
        body: &Block,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        // A declaration in the init position scopes over the whole loop.
        let decl_scope = matches!(init, Some(ForInit::Decl(_)));
        if decl_scope {
            self.cg.scope.push();
        }
        let result = self.process_for_inner(init, cond, next, body, lblock);
        if decl_scope {
            self.scope_pop_warn();
        }
        result
    }

    fn process_for_inner(
        &mut self,
        init: Option<&ForInit>,
        cond: Option<&Expr>,
        next: Option<&Expr>,
        body: &Block,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        match init {
            Some(ForInit::Expr(expr)) => {
                let eres = self.process_expr(expr, lblock)?;
                if !eres.valused {
                    self.cg
                        .diags
                        .warn(eres.span, "computed expression value is not used");
                }
            }
            Some(ForInit::Decl(decln)) => self.process_stdecln(decln, lblock)?,
            None => {}
        }
        let for_label = self.create_label("for");
        let next_label = self.create_label("next_for");
        let end_label = self.create_label("end_for");
        lblock.append_label(&for_label);
        if let Some(cond) = cond {
            self.truth_cjmp(cond, &end_label, false, lblock)?;
        }
        self.break_stack.push(BreakTarget {
            label: end_label.clone(),
        });
        self.continue_stack.push(ContinueTarget {
            label: next_label.clone(),
        });
        let result = self.process_block(body, lblock);
        self.continue_stack.pop();
        self.break_stack.pop();
        result?;
        lblock.append_label(&next_label);
        if let Some(next) = next {
            let eres = self.process_expr(next, lblock)?;
            if !eres.valused {
                self.cg
                    .diags
                    .warn(eres.span, "computed expression value is not used");
            }
        }
        lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&for_label)]));
        lblock.append_label(&end_label);
        Ok(())
    }

    /// Switch lowering: the expression is evaluated once, control jumps
    /// over the body to the first dispatch label, and each `case` emits a
    /// compare-and-branch dispatch entry chained to the next. Bodies sit
    /// between the dispatch entries and chain fall-through via bridge
    /// jumps.
    pub fn process_switch(
        &mut self,
        expr: &Expr,
        body: &Block,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        let sres = self.process_expr(expr, lblock)?;
        let sres = self.as_rvalue(sres, lblock)?;
        if !sres.cgtype.is_integral() {
            self.cg.diags.fatal(
                span,
                format!("switch quantity is not an integer ({})", sres.cgtype),
            );
            return Err(CgenError::Invalid);
        }
        let first_cnd = self.create_label("case_cnd");
        let end_label = self.create_label("end_switch");
        lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&first_cnd)]));
        self.switch_stack.push(SwitchFrame {
            sres: sres.clone(),
            next_cnd: first_cnd,
            end_label: end_label.clone(),
            default_label: None,
            seen: Vec::new(),
        });
        self.break_stack.push(BreakTarget {
            label: end_label.clone(),
        });
        let result = self.process_block(body, lblock);
        self.break_stack.pop();
        let frame = self.switch_stack.pop().expect("switch frame missing");
        result?;

        // Bridge out of the last body, then the final dispatch point: jump
        // to the default body if there is one, out of the switch otherwise.
        lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&end_label)]));
        lblock.append_label(&frame.next_cnd);
        let fallback = frame.default_label.as_deref().unwrap_or(&frame.end_label);
        lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(fallback)]));

        // Enum exhaustiveness: without a default, every enumerator must
        // appear among the case values.
        if frame.default_label.is_none() {
            if let CGType::Enum(eref) = &sres.cgtype {
                for elem in &self.cg.enums[*eref].elems {
                    if !frame.seen.contains(&elem.value) {
                        self.cg.diags.warn(
                            span,
                            format!("enumeration value '{}' not handled in switch", elem.name),
                        );
                    }
                }
            }
        }
        lblock.append_label(&end_label);
        Ok(())
    }

    fn process_case(
        &mut self,
        expr: &Expr,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        if self.switch_stack.is_empty() {
            self.cg
                .diags
                .fatal(span, "case label not within a switch statement");
            return Err(CgenError::Invalid);
        }
        let (value, vtype) = self.cg.constexpr_eval_int(expr)?;
        let body_label = self.create_label("case_body");
        let new_cnd = self.create_label("case_cnd");

        let frame = self.switch_stack.last_mut().expect("switch frame missing");
        if frame.seen.contains(&value) {
            let value_text = value.to_string();
            self.cg
                .diags
                .fatal(span, format!("duplicate case value {value_text}"));
            return Err(CgenError::Invalid);
        }
        frame.seen.push(value);
        let sval = frame.sres.oper();
        let bits = frame.sres.cgtype.bits();
        let old_cnd = std::mem::replace(&mut frame.next_cnd, new_cnd.clone());
        let switch_type = frame.sres.cgtype.clone();

        // A case value from a different enum than the switch expression is
        // suspect.
        match (&switch_type, &vtype) {
            (CGType::Enum(seref), CGType::Enum(ceref)) if seref != ceref => {
                self.cg
                    .diags
                    .warn(span, "case value from a different enum type");
            }
            (CGType::Enum(seref), other) if other.is_integer() => {
                if self.cg.enums[*seref].strict()
                    && self.cg.enums.find_value(*seref, value).is_none()
                {
                    self.cg
                        .diags
                        .warn(span, "case value not in enumerated type");
                }
            }
            _ => {}
        }

        // Fall-through bridge from the preceding body over the dispatch
        // code.
        lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&body_label)]));
        lblock.append_label(&old_cnd);
        let cval = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Imm,
            bits,
            Some(Oper::var(&cval)),
            vec![Oper::Imm(value)],
        ));
        let cmp = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Eq,
            bits,
            Some(Oper::var(&cmp)),
            vec![sval, Oper::var(&cval)],
        ));
        lblock.append(Instr::new(
            InstrKind::Jnz,
            16,
            None,
            vec![Oper::var(&cmp), Oper::var(&body_label)],
        ));
        lblock.append(Instr::new(InstrKind::Jmp, 0, None, vec![Oper::var(&new_cnd)]));
        lblock.append_label(&body_label);
        Ok(())
    }

    fn process_default(&mut self, span: Span, lblock: &mut LBlock) -> Result<(), CgenError> {
        let Some(frame) = self.switch_stack.last_mut() else {
            self.cg
                .diags
                .fatal(span, "'default' label not within a switch statement");
            return Err(CgenError::Invalid);
        };
        if frame.default_label.is_some() {
            self.cg
                .diags
                .fatal(span, "multiple default labels in one switch");
            return Err(CgenError::Invalid);
        }
        let label = self.create_label("default");
        let frame = self.switch_stack.last_mut().expect("switch frame missing");
        frame.default_label = Some(label.clone());
        lblock.append_label(&label);
        Ok(())
    }

    fn process_break(&mut self, span: Span, lblock: &mut LBlock) -> Result<(), CgenError> {
        let Some(target) = self.break_stack.last() else {
            self.cg
                .diags
                .fatal(span, "break statement not within a loop or switch");
            return Err(CgenError::Invalid);
        };
        lblock.append(Instr::new(
            InstrKind::Jmp,
            0,
            None,
            vec![Oper::var(target.label.clone())],
        ));
        Ok(())
    }

    fn process_continue(&mut self, span: Span, lblock: &mut LBlock) -> Result<(), CgenError> {
        let Some(target) = self.continue_stack.last() else {
            self.cg
                .diags
                .fatal(span, "continue statement not within a loop");
            return Err(CgenError::Invalid);
        };
        lblock.append(Instr::new(
            InstrKind::Jmp,
            0,
            None,
            vec![Oper::var(target.label.clone())],
        ));
        Ok(())
    }

    fn process_return(
        &mut self,
        expr: Option<&Expr>,
        span: Span,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        match expr {
            Some(expr) if self.ret_type.is_void() => {
                self.cg
                    .diags
                    .warn(span, "'return' with a value in a function returning void");
                self.process_expr(expr, lblock)?;
                lblock.append(Instr::new(InstrKind::Ret, 0, None, vec![]));
            }
            Some(expr) => {
                let eres = self.process_expr(expr, lblock)?;
                let eres = self.as_rvalue(eres, lblock)?;
                let ret_type = self.ret_type.clone();
                let eres = self.type_convert(eres, &ret_type, ConvCtx::Implicit, lblock)?;
                lblock.append(Instr::new(
                    InstrKind::Retv,
                    ret_type.bits(),
                    None,
                    vec![eres.oper()],
                ));
            }
            None if !self.ret_type.is_void() => {
                self.cg
                    .diags
                    .warn(span, "'return' without a value in a non-void function");
                lblock.append(Instr::new(InstrKind::Ret, 0, None, vec![]));
            }
            None => {
                lblock.append(Instr::new(InstrKind::Ret, 0, None, vec![]));
            }
        }
        Ok(())
    }
}
