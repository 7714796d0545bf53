//! Declaration processing: specifier analysis, declarator application,
//! typedefs, record and enum definitions, and block-local declarations.
//!
//! Specifiers are collected into a small builder that counts the
//! `short`/`long`/`signed`/`unsigned` occurrences and remembers the storage
//! class and base type specifier; conflicting combinations are fatal.
//! Declarator application is recursive and wraps the base type from the
//! outside in, so the identifier leaf receives the fully built type.


use crate::CgenError;
use crate::ctype::{CConv, CGType, ElmType, FuncType, Quals};
use crate::module::{CodeGen, ProcGen};
use crate::records::RecordKind;
use crate::scope::ScopeMember;
use ccir_ast::{
    DeclSpec, DeclSpecs, Declarator, Decln, EnumSpec, RecordSpec, Span, StorageClass, TypeName,
    TypeQual, TypeSpec,
};
use ccir_ir::LBlock;
use tracing::trace;

/// Outcome of declaration-specifier processing.
#[derive(Debug)]
pub(crate) struct SpecAnalysis {
    pub storage: Option<(StorageClass, Span)>,
    pub base: CGType,
    /// The `usr` attribute was present; applies to function declarators.
    pub usr_attr: bool,
    /// The specifiers declared or defined a tag, so a declaration without
    /// declarators is still meaningful.
    pub declares_tag: bool,
}

/// What the single base type specifier was.
enum BaseSpec {
    None,
    Elm(ElmType),
    Type(CGType),
}

/// Ordering category of a specifier, for the order-of-specifiers warning.
/// Storage class < qualifier < function specifier < attribute < type
/// specifier; finer sub-ranks keep `const` before `volatile` and sign
/// before length before base.
fn spec_order(spec: &DeclSpec) -> u32 {
    match spec {
        DeclSpec::Storage(..) => 0,
        DeclSpec::TypeQual(qual, _) => {
            10 + match qual {
                TypeQual::Const => 0,
                TypeQual::Restrict => 1,
                TypeQual::Volatile => 2,
                TypeQual::Atomic => 3,
            }
        }
        DeclSpec::FuncSpec(..) => 20,
        DeclSpec::Attr(_) => 30,
        DeclSpec::TypeSpec(ts, _) => {
            40 + match ts {
                TypeSpec::Signed | TypeSpec::Unsigned => 0,
                TypeSpec::Short | TypeSpec::Long => 1,
                _ => 2,
            }
        }
    }
}

impl CodeGen {
    /// Processes declaration specifiers into a storage class and base type.
    pub(crate) fn process_decl_specs(
        &mut self,
        specs: &DeclSpecs,
    ) -> Result<SpecAnalysis, CgenError> {
        let span = specs.span();
        let mut storage: Option<(StorageClass, Span)> = None;
        let mut base = BaseSpec::None;
        let mut short = 0u32;
        let mut long = 0u32;
        let mut signed = 0u32;
        let mut unsigned = 0u32;
        let mut usr_attr = false;
        let mut declares_tag = false;
        let mut max_order = 0;
        let mut order_warned = false;

        for spec in &specs.specs {
            let order = spec_order(spec);
            if order < max_order && !order_warned {
                self.diags
                    .warn(spec.span(), "declaration specifiers out of order");
                order_warned = true;
            }
            max_order = max_order.max(order);
            match spec {
                DeclSpec::Storage(sc, sspan) => {
                    if storage.is_some() {
                        self.diags
                            .fatal(*sspan, "multiple storage classes in declaration");
                        return Err(CgenError::Invalid);
                    }
                    storage = Some((*sc, *sspan));
                }
                DeclSpec::TypeQual(..) => {
                    // Qualifiers on the base type do not affect generated
                    // code; pointer target qualifiers are handled by the
                    // declarator.
                }
                DeclSpec::FuncSpec(..) => {}
                DeclSpec::Attr(attr) => {
                    if attr.name.name == "usr" {
                        usr_attr = true;
                    } else {
                        self.diags.warn(
                            attr.name.span,
                            format!("unrecognized attribute '{}'", attr.name.name),
                        );
                    }
                }
                DeclSpec::TypeSpec(ts, tspan) => match ts {
                    TypeSpec::Short => short += 1,
                    TypeSpec::Long => long += 1,
                    TypeSpec::Signed => signed += 1,
                    TypeSpec::Unsigned => unsigned += 1,
                    TypeSpec::Void => base = self.set_base(base, BaseSpec::Elm(ElmType::Void), *tspan)?,
                    TypeSpec::Char => base = self.set_base(base, BaseSpec::Elm(ElmType::Char), *tspan)?,
                    TypeSpec::Int => base = self.set_base(base, BaseSpec::Elm(ElmType::Int), *tspan)?,
                    TypeSpec::Bool => base = self.set_base(base, BaseSpec::Elm(ElmType::Logic), *tspan)?,
                    TypeSpec::VaList => {
                        base = self.set_base(base, BaseSpec::Elm(ElmType::VaList), *tspan)?
                    }
                    TypeSpec::Record(rs) => {
                        declares_tag = true;
                        let rtype = self.process_record_spec(rs)?;
                        base = self.set_base(base, BaseSpec::Type(rtype), *tspan)?;
                    }
                    TypeSpec::Enum(es) => {
                        declares_tag = true;
                        let etype = self.process_enum_spec(es)?;
                        base = self.set_base(base, BaseSpec::Type(etype), *tspan)?;
                    }
                    TypeSpec::TypedefName(id) => {
                        let Some(entry) = self.scope.lookup(&id.name) else {
                            self.diags
                                .fatal(id.span, format!("undeclared type name '{}'", id.name));
                            return Err(CgenError::Invalid);
                        };
                        let ScopeMember::TDef { cgtype } = &entry.member else {
                            self.diags
                                .fatal(id.span, format!("'{}' is not a type name", id.name));
                            return Err(CgenError::Invalid);
                        };
                        let cgtype = cgtype.clone();
                        self.scope.mark_used(&id.name);
                        base = self.set_base(base, BaseSpec::Type(cgtype), *tspan)?;
                    }
                },
            }
        }

        if signed > 1 || unsigned > 1 || short > 1 || long > 2 {
            self.diags.fatal(span, "duplicate type specifier");
            return Err(CgenError::Invalid);
        }
        if signed > 0 && unsigned > 0 {
            self.diags.fatal(span, "both 'signed' and 'unsigned' in declaration");
            return Err(CgenError::Invalid);
        }
        if short > 0 && long > 0 {
            self.diags.fatal(span, "both 'short' and 'long' in declaration");
            return Err(CgenError::Invalid);
        }

        let modifiers = short + long + signed + unsigned;
        let cgtype = match base {
            // An empty type specifier defaults to int, with the modifiers
            // applied.
            BaseSpec::None | BaseSpec::Elm(ElmType::Int) => {
                let elm = match (short, long) {
                    (1, _) => ElmType::Short,
                    (0, 0) => ElmType::Int,
                    (0, 1) => ElmType::Long,
                    (0, _) => ElmType::LongLong,
                    _ => unreachable!("short and long together"),
                };
                CGType::basic(elm.with_signedness(unsigned == 0))
            }
            BaseSpec::Elm(ElmType::Char) => {
                if short > 0 || long > 0 {
                    self.diags.fatal(span, "invalid length modifier on 'char'");
                    return Err(CgenError::Invalid);
                }
                CGType::basic(ElmType::Char.with_signedness(unsigned == 0))
            }
            BaseSpec::Elm(elm) => {
                if modifiers > 0 {
                    self.diags
                        .fatal(span, format!("invalid modifiers on '{elm}'"));
                    return Err(CgenError::Invalid);
                }
                CGType::basic(elm)
            }
            BaseSpec::Type(cgtype) => {
                if modifiers > 0 {
                    self.diags.fatal(span, "invalid modifiers on type");
                    return Err(CgenError::Invalid);
                }
                cgtype
            }
        };
        Ok(SpecAnalysis {
            storage,
            base: cgtype,
            usr_attr,
            declares_tag,
        })
    }

    fn set_base(&mut self, base: BaseSpec, new: BaseSpec, span: Span) -> Result<BaseSpec, CgenError> {
        match base {
            BaseSpec::None => Ok(new),
            _ => {
                self.diags
                    .fatal(span, "multiple type specifiers in declaration");
                Err(CgenError::Invalid)
            }
        }
    }

    /// Processes a struct/union specifier: reference, forward declaration
    /// or definition.
    fn process_record_spec(&mut self, rs: &RecordSpec) -> Result<CGType, CgenError> {
        let kind = match rs.kind {
            ccir_ast::RecordKind::Struct => RecordKind::Struct,
            ccir_ast::RecordKind::Union => RecordKind::Union,
        };
        let what = match kind {
            RecordKind::Struct => "struct",
            RecordKind::Union => "union",
        };

        if rs.members.is_none() {
            let tag = rs.tag.as_ref().expect("record reference without tag");
            // Reference or forward declaration.
            if let Some(entry) = self.scope.lookup_tag(&tag.name) {
                return match entry.member {
                    ScopeMember::RecordTag { record, kind: k } if k == kind => {
                        self.scope.mark_used_tag(&tag.name);
                        Ok(CGType::Record(record))
                    }
                    _ => {
                        self.diags.fatal(
                            tag.span,
                            format!("'{}' referenced with the wrong tag kind", tag.name),
                        );
                        Err(CgenError::Invalid)
                    }
                };
            }
            let irident = self.tag_ir_ident(Some(&tag.name));
            let rref = self.records.create(kind, Some(tag.name.clone()), irident);
            self.scope
                .insert_record_tag(&tag.name, tag.span, rref, kind)
                .expect("fresh tag insert failed");
            return Ok(CGType::Record(rref));
        }

        // Definition.
        if !self.scope.in_module_scope() {
            self.diags.warn(
                rs.span,
                format!("{what} defined in an inner scope has limited visibility"),
            );
        }
        if self.record_depth > 0 {
            self.diags
                .warn(rs.span, format!("{what} defined inside another record"));
        }
        if self.param_depth > 0 {
            self.diags
                .warn(rs.span, format!("{what} defined inside a parameter list"));
        }
        let rref = match &rs.tag {
            Some(tag) => match self.scope.lookup_tag_local(&tag.name) {
                Some(entry) => match entry.member {
                    ScopeMember::RecordTag { record, kind: k } if k == kind => {
                        if self.records[record].defined {
                            self.diags
                                .fatal(tag.span, format!("redefinition of '{what} {}'", tag.name));
                            return Err(CgenError::Invalid);
                        }
                        record
                    }
                    _ => {
                        self.diags
                            .fatal(tag.span, format!("redefinition of tag '{}'", tag.name));
                        return Err(CgenError::Invalid);
                    }
                },
                None => {
                    if self.scope.shadows(&tag.name, true) {
                        self.diags.warn(
                            tag.span,
                            format!("tag '{}' shadows a wider-scope tag", tag.name),
                        );
                    }
                    let irident = self.tag_ir_ident(Some(&tag.name));
                    let rref = self.records.create(kind, Some(tag.name.clone()), irident);
                    self.scope
                        .insert_record_tag(&tag.name, tag.span, rref, kind)
                        .expect("fresh tag insert failed");
                    rref
                }
            },
            None => {
                let irident = self.tag_ir_ident(None);
                self.records.create(kind, None, irident)
            }
        };

        self.record_depth += 1;
        let result = self.define_record_members(rref, rs);
        self.record_depth -= 1;
        result?;
        Ok(CGType::Record(rref))
    }

    fn define_record_members(&mut self, rref: crate::records::RecordRef, rs: &RecordSpec) -> Result<(), CgenError> {
        let members = rs.members.as_ref().expect("record definition without members");
        for member in members {
            let mspec = self.process_decl_specs(&member.specs)?;
            if let Some((_, sspan)) = mspec.storage {
                self.diags
                    .fatal(sspan, "storage class on a record member");
                return Err(CgenError::Invalid);
            }
            for declarator in &member.declarators {
                let (mtype, mident) = self.process_declarator(mspec.base.clone(), declarator)?;
                let Some(mident) = mident else {
                    self.diags.fatal(rs.span, "record member has no name");
                    return Err(CgenError::Invalid);
                };
                if mtype.is_func() {
                    self.diags.fatal(
                        mident.span,
                        format!("member '{}' declared as a function", mident.name),
                    );
                    return Err(CgenError::Invalid);
                }
                if !mtype.is_complete(&self.records, &self.enums) {
                    self.diags.fatal(
                        mident.span,
                        format!("member '{}' has incomplete type", mident.name),
                    );
                    return Err(CgenError::Invalid);
                }
                self.note_enum_instance(&mtype);
                if self.records.append(rref, &mident.name, mtype).is_err() {
                    self.diags.fatal(
                        mident.span,
                        format!("duplicate member '{}'", mident.name),
                    );
                    return Err(CgenError::Invalid);
                }
            }
        }
        self.records[rref].defined = true;

        // Emit the IR record declaration now that the layout is known.
        let rec = &self.records[rref];
        let irident = rec.irident.clone();
        let kind = match rec.kind {
            RecordKind::Struct => ccir_ir::RecordKind::Struct,
            RecordKind::Union => ccir_ir::RecordKind::Union,
        };
        let mut elems = Vec::new();
        for elem in &self.records[rref].elems {
            elems.push(self.cgtype_texpr(&elem.etype, rs.span)?);
        }
        self.module.append(ccir_ir::Decln::Record(ccir_ir::RecordDecln {
            ident: irident,
            kind,
            elems,
        }));
        trace!("defined record {}", self.records[rref].irident);
        Ok(())
    }

    /// Processes an enum specifier: reference, forward declaration or
    /// definition.
    fn process_enum_spec(&mut self, es: &EnumSpec) -> Result<CGType, CgenError> {
        if es.elems.is_none() {
            let tag = es.tag.as_ref().expect("enum reference without tag");
            if let Some(entry) = self.scope.lookup_tag(&tag.name) {
                return match entry.member {
                    ScopeMember::EnumTag { enum_ref } => {
                        self.scope.mark_used_tag(&tag.name);
                        Ok(CGType::Enum(enum_ref))
                    }
                    _ => {
                        self.diags.fatal(
                            tag.span,
                            format!("'{}' referenced with the wrong tag kind", tag.name),
                        );
                        Err(CgenError::Invalid)
                    }
                };
            }
            let eref = self.enums.create(Some(tag.name.clone()));
            self.scope
                .insert_enum_tag(&tag.name, tag.span, eref)
                .expect("fresh tag insert failed");
            return Ok(CGType::Enum(eref));
        }

        if !self.scope.in_module_scope() {
            self.diags.warn(
                es.span,
                "enum defined in an inner scope has limited visibility",
            );
        }
        let eref = match &es.tag {
            Some(tag) => match self.scope.lookup_tag_local(&tag.name) {
                Some(entry) => match entry.member {
                    ScopeMember::EnumTag { enum_ref } => {
                        if self.enums[enum_ref].defined {
                            self.diags
                                .fatal(tag.span, format!("redefinition of 'enum {}'", tag.name));
                            return Err(CgenError::Invalid);
                        }
                        enum_ref
                    }
                    _ => {
                        self.diags
                            .fatal(tag.span, format!("redefinition of tag '{}'", tag.name));
                        return Err(CgenError::Invalid);
                    }
                },
                None => {
                    if self.scope.shadows(&tag.name, true) {
                        self.diags.warn(
                            tag.span,
                            format!("tag '{}' shadows a wider-scope tag", tag.name),
                        );
                    }
                    let eref = self.enums.create(Some(tag.name.clone()));
                    self.scope
                        .insert_enum_tag(&tag.name, tag.span, eref)
                        .expect("fresh tag insert failed");
                    eref
                }
            },
            None => self.enums.create(None),
        };

        let elems = es.elems.as_ref().expect("enum definition without elements");
        if elems.is_empty() {
            self.diags.fatal(es.span, "enum has no enumerators");
            return Err(CgenError::Invalid);
        }
        let mut next_value: i64 = 0;
        for elem in elems {
            let value = match &elem.value {
                Some(expr) => self.constexpr_eval_int(expr)?.0,
                None => next_value,
            };
            next_value = value.wrapping_add(1);
            let Ok(elref) = self.enums.append(eref, &elem.name.name, value) else {
                self.diags.fatal(
                    elem.name.span,
                    format!("redefinition of enumerator '{}'", elem.name.name),
                );
                return Err(CgenError::Invalid);
            };
            if self.scope.shadows(&elem.name.name, false) {
                self.diags.warn(
                    elem.name.span,
                    format!("'{}' shadows a wider-scope declaration", elem.name.name),
                );
            }
            if self
                .scope
                .insert_eelem(&elem.name.name, elem.name.span, elref)
                .is_err()
            {
                self.diags.fatal(
                    elem.name.span,
                    format!("redefinition of '{}'", elem.name.name),
                );
                return Err(CgenError::Invalid);
            }
        }
        self.enums[eref].defined = true;
        Ok(CGType::Enum(eref))
    }

    /// Applies a declarator to the base type, producing the declared type
    /// and identifier.
    pub(crate) fn process_declarator(
        &mut self,
        base: CGType,
        decl: &Declarator,
    ) -> Result<(CGType, Option<ccir_ast::Ident>), CgenError> {
        match decl {
            Declarator::Abstract => Ok((base, None)),
            Declarator::Ident(id) => Ok((base, Some(id.clone()))),
            Declarator::Ptr { inner, quals } => {
                let mut bits = Quals::empty();
                for (qual, _) in quals {
                    bits |= match qual {
                        TypeQual::Const => Quals::CONST,
                        TypeQual::Restrict => Quals::RESTRICT,
                        TypeQual::Volatile => Quals::VOLATILE,
                        TypeQual::Atomic => Quals::ATOMIC,
                    };
                }
                let wrapped = CGType::Pointer {
                    target: Box::new(base),
                    quals: bits,
                };
                self.process_declarator(wrapped, inner)
            }
            Declarator::Array { inner, size, span } => {
                if base.is_func() {
                    self.diags.fatal(*span, "array of functions");
                    return Err(CgenError::Invalid);
                }
                if base.is_void() || !base.is_complete(&self.records, &self.enums) {
                    self.diags.fatal(*span, "array has incomplete element type");
                    return Err(CgenError::Invalid);
                }
                let (size, index_type) = match size {
                    Some(expr) => {
                        let (value, vtype) = self.constexpr_eval_int(expr)?;
                        if value < 0 {
                            self.diags.fatal(*span, "array size is negative");
                            return Err(CgenError::Invalid);
                        }
                        if value == 0 {
                            self.diags.warn(*span, "zero-size array");
                        }
                        (Some(value as u64), Some(Box::new(vtype)))
                    }
                    None => (None, None),
                };
                let wrapped = CGType::Array {
                    elem: Box::new(base),
                    index_type,
                    size,
                };
                self.process_declarator(wrapped, inner)
            }
            Declarator::Func {
                inner,
                params,
                variadic,
                span,
            } => {
                if base.is_array() {
                    self.diags.fatal(*span, "function returning an array");
                    return Err(CgenError::Invalid);
                }
                if base.is_func() {
                    self.diags.fatal(*span, "function returning a function");
                    return Err(CgenError::Invalid);
                }
                self.param_depth += 1;
                let args = self.process_params(params, *span);
                self.param_depth -= 1;
                let wrapped = CGType::Func(Box::new(FuncType {
                    ret: base,
                    args: args?,
                    variadic: *variadic,
                    cconv: CConv::Default,
                }));
                self.process_declarator(wrapped, inner)
            }
        }
    }

    fn process_params(
        &mut self,
        params: &[ccir_ast::ParamDecl],
        span: Span,
    ) -> Result<Vec<CGType>, CgenError> {
        let mut args = Vec::new();
        let mut named = 0usize;
        let mut unnamed = 0usize;
        for param in params {
            let pspec = self.process_decl_specs(&param.specs)?;
            if let Some((_, sspan)) = pspec.storage {
                self.diags.fatal(sspan, "storage class on a parameter");
                return Err(CgenError::Invalid);
            }
            let (ptype, pident) = self.process_declarator(pspec.base, &param.decl)?;
            if ptype.is_void() {
                // `void` may only stand as the sole unnamed parameter.
                if params.len() != 1 || pident.is_some() {
                    self.diags.fatal(span, "'void' must be the only parameter");
                    return Err(CgenError::Invalid);
                }
                return Ok(args);
            }
            match pident {
                Some(_) => named += 1,
                None => unnamed += 1,
            }
            self.note_enum_instance(&ptype);
            args.push(ptype);
        }
        if named > 0 && unnamed > 0 {
            self.diags.warn(span, "mixing named and unnamed parameters");
        }
        Ok(args)
    }

    /// Processes a type name (casts, `sizeof`, `va_arg`).
    pub(crate) fn process_typename(&mut self, tname: &TypeName) -> Result<CGType, CgenError> {
        let spec = self.process_decl_specs(&tname.specs)?;
        if let Some((_, sspan)) = spec.storage {
            self.diags.fatal(sspan, "storage class in a type name");
            return Err(CgenError::Invalid);
        }
        let (cgtype, ident) = self.process_declarator(spec.base, &tname.decl)?;
        if let Some(ident) = ident {
            self.diags.fatal(
                ident.span,
                format!("unexpected identifier '{}' in type name", ident.name),
            );
            return Err(CgenError::Invalid);
        }
        Ok(cgtype)
    }

    /// Records that an instance of an enum type was declared.
    pub(crate) fn note_enum_instance(&mut self, cgtype: &CGType) {
        if let CGType::Enum(eref) = cgtype {
            self.enums[*eref].named = true;
        }
    }

    /// Applies the `usr` attribute to a declared function type.
    pub(crate) fn apply_usr_attr(&mut self, cgtype: &mut CGType, usr: bool, span: Span) {
        if !usr {
            return;
        }
        match cgtype {
            CGType::Func(ftype) => ftype.cconv = CConv::Usr,
            _ => self
                .diags
                .warn(span, "'usr' attribute ignored on a non-function"),
        }
    }
}

impl ProcGen<'_> {
    /// Lowers a block-local declaration.
    pub(crate) fn process_stdecln(
        &mut self,
        decln: &Decln,
        lblock: &mut LBlock,
    ) -> Result<(), CgenError> {
        let spec = self.cg.process_decl_specs(&decln.specs)?;

        if let Some((StorageClass::Typedef, _)) = spec.storage {
            for d in &decln.decls {
                if d.init.is_some() {
                    self.cg
                        .diags
                        .fatal(decln.span, "typedef with an initializer");
                    return Err(CgenError::Invalid);
                }
                let (cgtype, ident) = self.cg.process_declarator(spec.base.clone(), &d.decl)?;
                let Some(ident) = ident else {
                    self.cg
                        .diags
                        .fatal(decln.span, "typedef without an identifier");
                    return Err(CgenError::Invalid);
                };
                if self.cg.scope.shadows(&ident.name, false) {
                    self.cg.diags.warn(
                        ident.span,
                        format!("'{}' shadows a wider-scope declaration", ident.name),
                    );
                }
                if self
                    .cg
                    .scope
                    .insert_tdef(&ident.name, ident.span, cgtype)
                    .is_err()
                {
                    self.cg
                        .diags
                        .fatal(ident.span, format!("redefinition of '{}'", ident.name));
                    return Err(CgenError::Invalid);
                }
            }
            return Ok(());
        }

        match spec.storage {
            None | Some((StorageClass::Auto, _)) => {}
            Some((StorageClass::Register, _)) => {
                self.cg
                    .diags
                    .warn(decln.span, "'register' storage class ignored");
            }
            Some((sc, sspan)) => {
                let name = match sc {
                    StorageClass::Static => "static",
                    StorageClass::Extern => "extern",
                    _ => unreachable!("handled above"),
                };
                self.cg.diags.fatal(
                    sspan,
                    format!("'{name}' storage class on a local variable is not supported"),
                );
                return Err(CgenError::Invalid);
            }
        }

        if decln.decls.is_empty() {
            if !spec.declares_tag {
                self.cg
                    .diags
                    .warn(decln.span, "useless type in empty declaration");
            }
            return Ok(());
        }

        for d in &decln.decls {
            let (cgtype, ident) = self.cg.process_declarator(spec.base.clone(), &d.decl)?;
            let Some(ident) = ident else {
                self.cg
                    .diags
                    .fatal(decln.span, "declaration without an identifier");
                return Err(CgenError::Invalid);
            };
            if cgtype.is_func() {
                self.cg.diags.fatal(
                    ident.span,
                    format!("local function declaration of '{}' is not supported", ident.name),
                );
                return Err(CgenError::Invalid);
            }
            self.cg.note_enum_instance(&cgtype);

            // An unsized array takes its size from the initializer.
            let (cgtype, node) = match &d.init {
                Some(init) => {
                    let (cgtype, node) = self.cg.build_initializer(&cgtype, init)?;
                    (cgtype, Some(node))
                }
                None => (cgtype, None),
            };
            if !cgtype.is_complete(&self.cg.records, &self.cg.enums) {
                self.cg.diags.fatal(
                    ident.span,
                    format!("variable '{}' has incomplete type", ident.name),
                );
                return Err(CgenError::Invalid);
            }

            if self.cg.scope.shadows(&ident.name, false) {
                self.cg.diags.warn(
                    ident.span,
                    format!("'{}' shadows a wider-scope declaration", ident.name),
                );
            }
            let vtype = self.cg.cgtype_texpr(&cgtype, ident.span)?;
            let vname = self.new_named_var(&ident.name, vtype, false);
            if self
                .cg
                .scope
                .insert_lvar(&ident.name, ident.span, vname.clone(), cgtype.clone())
                .is_err()
            {
                self.cg
                    .diags
                    .fatal(ident.span, format!("redefinition of '{}'", ident.name));
                return Err(CgenError::Invalid);
            }

            if let Some(node) = node {
                self.process_local_initializer(&vname, &cgtype, &node, lblock)?;
            }
        }
        Ok(())
    }
}
