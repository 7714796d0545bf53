//! Designated-initializer digestion.
//!
//! An initializer is first walked into a sparse [InitNode] tree mirroring
//! the target type: one child per initialized array index or record field,
//! leaves holding the initializer expressions. Designator chains navigate
//! into (or create) the tree; positional items follow the next-index /
//! next-field trackers. The tree is then digested: globals flatten into an
//! IR data block with zero filling, locals into a sequence of member-wise
//! stores.
//!
//! An array declared without a size is fixed to the highest initialized
//! index plus one.


use crate::CgenError;
use crate::ctype::{CGType, ElmType};
use crate::expr::ConvCtx;
use crate::literal;
use crate::module::{CodeGen, ProcGen};
use crate::records::{RecordKind, RecordRef};
use ccir_ast::{Designator, Expr, InitItem, Initializer, Lit, Span};
use ccir_ir::{DBlock, DataEntry, Instr, InstrKind, LBlock, Oper};
use std::collections::BTreeMap;

/// Sparse initializer tree.
#[derive(Debug, Clone)]
pub(crate) enum InitNode {
    /// A scalar leaf (also a whole-record value for local initializers).
    Scalar(Expr),
    /// A string literal initializing a character (or wide, `int`) array.
    Str(Lit),
    /// Array or record with children keyed by element index.
    Aggregate(BTreeMap<u64, InitNode>),
}

/// Kind of the aggregate a position points into.
enum Slot {
    Array { elem: CGType, size: Option<u64> },
    Record { rref: RecordRef },
}

fn slot_of(cgtype: &CGType) -> Option<Slot> {
    match cgtype {
        CGType::Array { elem, size, .. } => Some(Slot::Array {
            elem: (**elem).clone(),
            size: *size,
        }),
        CGType::Record(rref) => Some(Slot::Record { rref: *rref }),
        _ => None,
    }
}

/// True when a string literal of the given wideness may directly
/// initialize an array of this element type.
fn string_initializable(elem: &CGType, wide: bool) -> bool {
    match elem {
        CGType::Basic(ElmType::Char | ElmType::UChar) => !wide,
        CGType::Basic(ElmType::Int | ElmType::UInt) => wide,
        _ => false,
    }
}

impl CodeGen {
    /// Builds the initializer tree and fixes an unsized top-level array
    /// from its highest initialized index.
    pub(crate) fn build_initializer(
        &mut self,
        cgtype: &CGType,
        init: &Initializer,
    ) -> Result<(CGType, InitNode), CgenError> {
        let node = self.build_node(cgtype, init)?;
        let cgtype = match cgtype {
            CGType::Array {
                elem,
                index_type,
                size: None,
            } => {
                let size = match &node {
                    InitNode::Str(lit) => {
                        let (chars, _) =
                            literal::parse_string(&mut self.diags, lit.span, &lit.text)?;
                        chars.len() as u64 + 1
                    }
                    InitNode::Aggregate(children) => {
                        children.keys().next_back().map_or(0, |max| max + 1)
                    }
                    InitNode::Scalar(_) => {
                        self.diags
                            .fatal(init.span(), "invalid initializer for an array");
                        return Err(CgenError::Invalid);
                    }
                };
                CGType::Array {
                    elem: elem.clone(),
                    index_type: index_type.clone(),
                    size: Some(size),
                }
            }
            other => other.clone(),
        };
        Ok((cgtype, node))
    }

    fn build_node(&mut self, cgtype: &CGType, init: &Initializer) -> Result<InitNode, CgenError> {
        match init {
            Initializer::Expr(Expr::StrLit(lit)) if cgtype.is_array() => {
                let CGType::Array { elem, size, .. } = cgtype else {
                    unreachable!("array expected");
                };
                let (chars, wide) = literal::parse_string(&mut self.diags, lit.span, &lit.text)?;
                if !string_initializable(elem, wide) {
                    self.diags
                        .fatal(lit.span, "invalid string initializer for this array");
                    return Err(CgenError::Invalid);
                }
                if let Some(size) = size {
                    if chars.len() as u64 > *size {
                        self.diags
                            .fatal(lit.span, "initializer string is too long");
                        return Err(CgenError::Invalid);
                    }
                }
                Ok(InitNode::Str(lit.clone()))
            }
            Initializer::Expr(expr) => {
                if matches!(cgtype, CGType::Array { .. }) {
                    self.diags
                        .fatal(expr.span(), "invalid initializer for an array");
                    return Err(CgenError::Invalid);
                }
                // A record accepts a whole-record expression; everything
                // else is a scalar leaf.
                Ok(InitNode::Scalar(expr.clone()))
            }
            Initializer::List { items, span } => {
                let mut iter = items.iter().peekable();
                let node = self.build_list(cgtype, &mut iter, true, *span)?;
                if iter.peek().is_some() {
                    self.diags.fatal(*span, "excess elements in initializer");
                    return Err(CgenError::Invalid);
                }
                Ok(node)
            }
        }
    }

    /// Builds one brace level. With `braced` false the iterator is shared
    /// with the enclosing level (non-bracketed sub-aggregate): the walk
    /// stops when this aggregate is full or a designator aims elsewhere.
    fn build_list(
        &mut self,
        cgtype: &CGType,
        iter: &mut std::iter::Peekable<std::slice::Iter<'_, InitItem>>,
        braced: bool,
        span: Span,
    ) -> Result<InitNode, CgenError> {
        let Some(slot) = slot_of(cgtype) else {
            // Braces around a scalar.
            self.diags.warn(span, "braces around scalar initializer");
            let Some(item) = iter.next() else {
                self.diags.fatal(span, "empty scalar initializer");
                return Err(CgenError::Invalid);
            };
            if !item.designators.is_empty() {
                self.diags
                    .fatal(span, "designator in a scalar initializer");
                return Err(CgenError::Invalid);
            }
            return self.build_node(cgtype, &item.init);
        };

        let mut children: BTreeMap<u64, InitNode> = BTreeMap::new();
        let mut next: u64 = 0;
        let is_union = matches!(
            &slot,
            Slot::Record { rref } if self.records[*rref].kind == RecordKind::Union
        );

        loop {
            let Some(item) = iter.peek() else { break };
            if let Some(designator) = item.designators.first() {
                // Try the designator against the current aggregate; on a
                // mismatch an unbraced level hands the item back to its
                // parent.
                let index = match (designator, &slot) {
                    (Designator::Index(expr), Slot::Array { size, .. }) => {
                        let (value, _) = self.constexpr_eval_int(expr)?;
                        if value < 0 {
                            self.diags
                                .fatal(expr.span(), "array index negative in constant context");
                            return Err(CgenError::Invalid);
                        }
                        if let Some(size) = size {
                            if value as u64 >= *size {
                                self.diags
                                    .fatal(expr.span(), "array index exceeds array bounds");
                                return Err(CgenError::Invalid);
                            }
                        }
                        value as u64
                    }
                    (Designator::Field(name), Slot::Record { rref }) => {
                        match self.records[*rref].find_elem(&name.name) {
                            Some((index, _)) => index as u64,
                            None => {
                                if braced {
                                    self.diags.fatal(
                                        name.span,
                                        format!("no member named '{}'", name.name),
                                    );
                                    return Err(CgenError::Invalid);
                                }
                                break;
                            }
                        }
                    }
                    _ => {
                        if braced {
                            self.diags
                                .fatal(span, "designator does not match the initialized type");
                            return Err(CgenError::Invalid);
                        }
                        break;
                    }
                };
                let item = iter.next().expect("peeked item vanished");
                let etype = self.slot_elem_type(&slot, index);
                self.assign_path(
                    &mut children,
                    is_union,
                    index,
                    &etype,
                    &item.designators[1..],
                    &item.init,
                    span,
                )?;
                next = index + 1;
                continue;
            }

            // Positional item.
            let full = match &slot {
                Slot::Array {
                    size: Some(size), ..
                } => next >= *size,
                Slot::Array { size: None, .. } => false,
                Slot::Record { rref } => next as usize >= self.records[*rref].elems.len(),
            };
            if full {
                if braced {
                    self.diags.fatal(span, "excess elements in initializer");
                    return Err(CgenError::Invalid);
                }
                break;
            }
            let etype = self.slot_elem_type(&slot, next);
            let child = self.build_positional(&etype, iter, span)?;
            self.set_child(&mut children, is_union, next, child, span);
            next += 1;
        }
        Ok(InitNode::Aggregate(children))
    }

    fn slot_elem_type(&self, slot: &Slot, index: u64) -> CGType {
        match slot {
            Slot::Array { elem, .. } => elem.clone(),
            Slot::Record { rref } => self.records[*rref].elems[index as usize].etype.clone(),
        }
    }

    /// Consumes the items for one positional element.
    fn build_positional(
        &mut self,
        etype: &CGType,
        iter: &mut std::iter::Peekable<std::slice::Iter<'_, InitItem>>,
        span: Span,
    ) -> Result<InitNode, CgenError> {
        let item = iter.peek().expect("positional item missing");
        match &item.init {
            Initializer::List { .. } => {
                let item = iter.next().expect("peeked item vanished");
                self.build_node(etype, &item.init)
            }
            Initializer::Expr(Expr::StrLit(_)) if etype.is_array() => {
                let item = iter.next().expect("peeked item vanished");
                self.build_node(etype, &item.init)
            }
            Initializer::Expr(_) => {
                if slot_of(etype).is_some() && !etype.is_record() {
                    // Flat list spilling into a sub-aggregate.
                    self.diags
                        .warn(span, "missing braces around initializer");
                    return self.build_list(etype, iter, false, span);
                }
                if etype.is_record() {
                    // A record position takes either a flat spill or a
                    // whole-record expression; the latter cannot be told
                    // apart here, so flat spill wins for struct members.
                    self.diags
                        .warn(span, "missing braces around initializer");
                    return self.build_list(etype, iter, false, span);
                }
                let item = iter.next().expect("peeked item vanished");
                self.build_node(etype, &item.init)
            }
        }
    }

    /// Assigns through a (possibly empty) remaining designator chain,
    /// creating intermediate aggregate nodes as needed.
    #[allow(clippy::too_many_arguments)]
    fn assign_path(
        &mut self,
        children: &mut BTreeMap<u64, InitNode>,
        is_union: bool,
        index: u64,
        etype: &CGType,
        rest: &[Designator],
        init: &Initializer,
        span: Span,
    ) -> Result<(), CgenError> {
        if rest.is_empty() {
            let node = self.build_node(etype, init)?;
            self.set_child(children, is_union, index, node, span);
            return Ok(());
        }
        let Some(slot) = slot_of(etype) else {
            self.diags
                .fatal(span, "designator applied to a non-aggregate type");
            return Err(CgenError::Invalid);
        };
        let sub_index = match (&rest[0], &slot) {
            (Designator::Index(expr), Slot::Array { size, .. }) => {
                let (value, _) = self.constexpr_eval_int(expr)?;
                if value < 0 {
                    self.diags
                        .fatal(expr.span(), "array index negative in constant context");
                    return Err(CgenError::Invalid);
                }
                if let Some(size) = size {
                    if value as u64 >= *size {
                        self.diags
                            .fatal(expr.span(), "array index exceeds array bounds");
                        return Err(CgenError::Invalid);
                    }
                }
                value as u64
            }
            (Designator::Field(name), Slot::Record { rref }) => {
                match self.records[*rref].find_elem(&name.name) {
                    Some((i, _)) => i as u64,
                    None => {
                        self.diags
                            .fatal(name.span, format!("no member named '{}'", name.name));
                        return Err(CgenError::Invalid);
                    }
                }
            }
            _ => {
                self.diags
                    .fatal(span, "designator does not match the initialized type");
                return Err(CgenError::Invalid);
            }
        };
        if is_union {
            children.retain(|k, _| *k == index);
        }
        let sub_union = matches!(
            &slot,
            Slot::Record { rref } if self.records[*rref].kind == RecordKind::Union
        );
        let sub_etype = self.slot_elem_type(&slot, sub_index);
        let entry = children.entry(index).or_insert_with(|| InitNode::Aggregate(BTreeMap::new()));
        if !matches!(entry, InitNode::Aggregate(_)) {
            self.diags
                .warn(span, "initialized field overwritten");
            *entry = InitNode::Aggregate(BTreeMap::new());
        }
        let InitNode::Aggregate(sub_children) = entry else {
            unreachable!("aggregate node expected");
        };
        // Detach to satisfy the borrow checker while recursing.
        let mut detached = std::mem::take(sub_children);
        let result = self.assign_path(
            &mut detached,
            sub_union,
            sub_index,
            &sub_etype,
            &rest[1..],
            init,
            span,
        );
        if let Some(InitNode::Aggregate(sub_children)) = children.get_mut(&index) {
            *sub_children = detached;
        }
        result
    }

    /// Installs a child node, warning when a previously initialized field
    /// is overwritten. Inside a union prior initializers are discarded
    /// silently.
    fn set_child(
        &mut self,
        children: &mut BTreeMap<u64, InitNode>,
        is_union: bool,
        index: u64,
        node: InitNode,
        span: Span,
    ) {
        if is_union {
            children.clear();
        } else if children.contains_key(&index) {
            self.diags.warn(span, "initialized field overwritten");
        }
        children.insert(index, node);
    }

    /// Digests an initializer for a module-level variable into a flat data
    /// block.
    pub(crate) fn process_global_initializer(
        &mut self,
        cgtype: &CGType,
        init: &Initializer,
    ) -> Result<(CGType, DBlock), CgenError> {
        let (cgtype, node) = self.build_initializer(cgtype, init)?;
        let mut dblock = DBlock::new();
        self.digest_node(&cgtype, Some(&node), &mut dblock, init.span())?;
        Ok((cgtype, dblock))
    }

    /// Emits the data entries for one type, zero-filling where no
    /// initializer node is present.
    fn digest_node(
        &mut self,
        cgtype: &CGType,
        node: Option<&InitNode>,
        dblock: &mut DBlock,
        span: Span,
    ) -> Result<(), CgenError> {
        match cgtype {
            CGType::Array { elem, size, .. } => {
                let Some(size) = *size else {
                    return Err(CgenError::Invalid);
                };
                match node {
                    Some(InitNode::Str(lit)) => {
                        let (chars, _) =
                            literal::parse_string(&mut self.diags, lit.span, &lit.text)?;
                        let width = elem.bits();
                        for ch in &chars {
                            dblock.append(DataEntry::Int {
                                width,
                                value: *ch,
                            });
                        }
                        for _ in chars.len() as u64..size {
                            dblock.append(DataEntry::Int { width, value: 0 });
                        }
                    }
                    Some(InitNode::Aggregate(children)) => {
                        for i in 0..size {
                            self.digest_node(elem, children.get(&i), dblock, span)?;
                        }
                    }
                    Some(InitNode::Scalar(_)) => {
                        self.diags.fatal(span, "invalid initializer for an array");
                        return Err(CgenError::Invalid);
                    }
                    None => {
                        for _ in 0..size {
                            self.digest_node(elem, None, dblock, span)?;
                        }
                    }
                }
                Ok(())
            }
            CGType::Record(rref) => {
                let rec = &self.records[*rref];
                if !rec.defined {
                    self.diags.fatal(span, "initializer for an incomplete type");
                    return Err(CgenError::Invalid);
                }
                let kind = rec.kind;
                let elem_types: Vec<CGType> =
                    rec.elems.iter().map(|e| e.etype.clone()).collect();
                match kind {
                    RecordKind::Struct => {
                        let children = match node {
                            Some(InitNode::Aggregate(children)) => Some(children.clone()),
                            Some(_) => {
                                self.diags
                                    .fatal(span, "invalid initializer for a record");
                                return Err(CgenError::Invalid);
                            }
                            None => None,
                        };
                        for (i, etype) in elem_types.iter().enumerate() {
                            let child = children.as_ref().and_then(|c| c.get(&(i as u64)));
                            self.digest_node(etype, child, dblock, span)?;
                        }
                    }
                    RecordKind::Union => {
                        let total = self
                            .records
                            .size(*rref, &self.enums)
                            .ok_or(CgenError::Invalid)?;
                        let (index, child) = match node {
                            Some(InitNode::Aggregate(children)) => match children.iter().next() {
                                Some((index, child)) => (*index, Some(child.clone())),
                                None => (0, None),
                            },
                            Some(_) => {
                                self.diags
                                    .fatal(span, "invalid initializer for a record");
                                return Err(CgenError::Invalid);
                            }
                            None => (0, None),
                        };
                        let etype = &elem_types[index as usize];
                        let used = etype
                            .sizeof(&self.records, &self.enums)
                            .ok_or(CgenError::Invalid)?;
                        self.digest_node(etype, child.as_ref(), dblock, span)?;
                        // Unions are padded with zero bytes to their full
                        // size.
                        for _ in used..total {
                            dblock.append(DataEntry::Int { width: 8, value: 0 });
                        }
                    }
                }
                Ok(())
            }
            scalar => {
                let entry = match node {
                    None => DataEntry::Int {
                        width: scalar.bits(),
                        value: 0,
                    },
                    Some(InitNode::Scalar(expr)) => self.digest_scalar(scalar, expr)?,
                    Some(_) => {
                        self.diags.fatal(span, "invalid initializer");
                        return Err(CgenError::Invalid);
                    }
                };
                dblock.append(entry);
                Ok(())
            }
        }
    }

    /// Evaluates and converts one scalar constant initializer.
    fn digest_scalar(&mut self, cgtype: &CGType, expr: &Expr) -> Result<DataEntry, CgenError> {
        let span = expr.span();
        let eres = self.constexpr_eval(expr)?;
        if cgtype.is_pointer() {
            if let Some(symbol) = eres.cvsymbol {
                if let CGType::Pointer { target: dt, .. } = cgtype {
                    let compatible = match &eres.cgtype {
                        CGType::Pointer { target: st, .. } => {
                            st.pointer_compatible(dt) || dt.is_void()
                        }
                        _ => false,
                    };
                    if !compatible {
                        self.diags
                            .warn(span, "converting to incompatible pointer type");
                    }
                }
                return Ok(DataEntry::Ptr {
                    width: 16,
                    symbol: self.symbols[symbol].irident.clone(),
                    offset: eres.cvint,
                });
            }
            if !eres.cgtype.is_pointer() && eres.cvint != 0 {
                self.diags
                    .warn(span, "integer converted to pointer without a cast");
            }
            return Ok(DataEntry::Int {
                width: 16,
                value: eres.cvint,
            });
        }
        if eres.cvsymbol.is_some() {
            // An address does not reduce to an integer constant.
            self.diags.fatal(span, "constant expression required");
            return Err(CgenError::NotConstant);
        }
        if eres.cgtype.is_pointer() {
            self.diags
                .warn(span, "pointer converted to integer without a cast");
        }
        let value = if cgtype.is_logic() {
            i64::from(eres.cvint != 0)
        } else {
            let (value, changed) =
                crate::expr::mask_const(cgtype.bits(), cgtype.signed(), eres.cvint);
            if changed {
                self.diags.warn(span, "number changed in conversion");
            }
            value
        };
        Ok(DataEntry::Int {
            width: cgtype.bits(),
            value,
        })
    }
}

impl ProcGen<'_> {
    /// Lowers a local variable's initializer into stores.
    pub(crate) fn process_local_initializer(
        &mut self,
        vname: &str,
        cgtype: &CGType,
        node: &InitNode,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        let base = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Lvarptr,
            16,
            Some(Oper::var(&base)),
            vec![Oper::var(vname)],
        ));
        self.write_init_node(&base, cgtype, Some(node), lblock)
    }

    fn write_init_node(
        &mut self,
        ptr: &str,
        cgtype: &CGType,
        node: Option<&InitNode>,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        use crate::expr::EResult;
        match cgtype {
            CGType::Array { elem, size, .. } => {
                let Some(size) = *size else {
                    return Err(CgenError::Invalid);
                };
                let chars = match node {
                    Some(InitNode::Str(lit)) => Some(literal::parse_string(
                        &mut self.cg.diags,
                        lit.span,
                        &lit.text,
                    )?),
                    _ => None,
                };
                for i in 0..size {
                    let eptr = self.elem_ptr(ptr, i, elem, lblock)?;
                    match (&chars, node) {
                        (Some((chars, _)), _) => {
                            let value = chars.get(i as usize).copied().unwrap_or(0);
                            self.write_imm(&eptr, elem, value, lblock);
                        }
                        (None, Some(InitNode::Aggregate(children))) => {
                            self.write_init_node(&eptr, elem, children.get(&i), lblock)?;
                        }
                        (None, None) => {
                            self.write_init_node(&eptr, elem, None, lblock)?;
                        }
                        (None, Some(_)) => return Err(CgenError::Invalid),
                    }
                }
                Ok(())
            }
            CGType::Record(rref) => {
                if let Some(InitNode::Scalar(expr)) = node {
                    // Whole-record initialization from a record value.
                    let eres = self.process_expr(expr, lblock)?;
                    let eres = self.as_rvalue(eres, lblock)?;
                    let eres =
                        self.type_convert(eres, cgtype, ConvCtx::Implicit, lblock)?;
                    lblock.append(Instr::new(
                        InstrKind::Reccopy,
                        0,
                        None,
                        vec![Oper::var(ptr), eres.oper()],
                    ));
                    return Ok(());
                }
                let rec = &self.cg.records[*rref];
                let kind = rec.kind;
                let irident = rec.irident.clone();
                let elem_types: Vec<CGType> =
                    rec.elems.iter().map(|e| e.etype.clone()).collect();
                let children = match node {
                    Some(InitNode::Aggregate(children)) => Some(children.clone()),
                    None => None,
                    Some(_) => return Err(CgenError::Invalid),
                };
                match kind {
                    RecordKind::Struct => {
                        for (i, etype) in elem_types.iter().enumerate() {
                            let mptr = self.member_ptr(ptr, &irident, i, lblock);
                            let child = children.as_ref().and_then(|c| c.get(&(i as u64)));
                            self.write_init_node(&mptr, etype, child, lblock)?;
                        }
                    }
                    RecordKind::Union => {
                        // Only the initialized member (or the first, for
                        // zero initialization) is written.
                        let (index, child) = match &children {
                            Some(children) => match children.iter().next() {
                                Some((index, child)) => (*index as usize, Some(child.clone())),
                                None => (0, None),
                            },
                            None => (0, None),
                        };
                        let mptr = self.member_ptr(ptr, &irident, index, lblock);
                        self.write_init_node(&mptr, &elem_types[index], child.as_ref(), lblock)?;
                    }
                }
                Ok(())
            }
            scalar => {
                match node {
                    None => self.write_imm(ptr, scalar, 0, lblock),
                    Some(InitNode::Scalar(expr)) => {
                        let eres = self.process_expr(expr, lblock)?;
                        let eres = self.as_rvalue(eres, lblock)?;
                        let eres =
                            self.type_convert(eres, scalar, ConvCtx::Implicit, lblock)?;
                        let lres = EResult::lvalue(ptr.to_string(), scalar.clone(), eres.span);
                        self.store(&lres, &eres, lblock);
                    }
                    Some(_) => return Err(CgenError::Invalid),
                }
                Ok(())
            }
        }
    }

    fn elem_ptr(
        &mut self,
        ptr: &str,
        index: u64,
        elem: &CGType,
        lblock: &mut LBlock,
    ) -> Result<String, CgenError> {
        let esize = elem
            .sizeof(&self.cg.records, &self.cg.enums)
            .ok_or(CgenError::Invalid)?;
        let ivar = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Imm,
            16,
            Some(Oper::var(&ivar)),
            vec![Oper::Imm(index as i64)],
        ));
        let evar = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Ptridx,
            16,
            Some(Oper::var(&evar)),
            vec![Oper::var(ptr), Oper::var(&ivar), Oper::Imm(esize as i64)],
        ));
        Ok(evar)
    }

    fn member_ptr(
        &mut self,
        ptr: &str,
        irident: &str,
        index: usize,
        lblock: &mut LBlock,
    ) -> String {
        let mvar = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Recmbr,
            16,
            Some(Oper::var(&mvar)),
            vec![
                Oper::var(ptr),
                Oper::var(irident),
                Oper::Imm(index as i64),
            ],
        ));
        mvar
    }

    fn write_imm(&mut self, ptr: &str, cgtype: &CGType, value: i64, lblock: &mut LBlock) {
        let bits = cgtype.bits();
        let vvar = self.new_tmp();
        lblock.append(Instr::new(
            InstrKind::Imm,
            bits,
            Some(Oper::var(&vvar)),
            vec![Oper::Imm(value)],
        ));
        lblock.append(Instr::new(
            InstrKind::Write,
            bits,
            None,
            vec![Oper::var(ptr), Oper::var(&vvar)],
        ));
    }
}
