//! Module-level orchestration.
//!
//! [CodeGen] owns every per-translation-unit structure (registries, scopes,
//! symbol directory, diagnostic sink, the IR module under construction) and
//! drives an [AstSource] one top-level declaration at a time. [ProcGen] is
//! the per-procedure context created for each function definition; the
//! expression and statement lowering subsystems are implemented as methods
//! on it in their own modules.

#[cfg(test)]
mod tests;

use crate::CgenError;
use crate::ctype::{CGType, ElmType, FuncType};
use crate::decl::SpecAnalysis;
use crate::diag::Diagnostics;
use crate::expr::EResult;
use crate::labels::Labels;
use crate::records::{Enums, Records};
use crate::scope::Scope;
use crate::symbols::{SymbolFlags, SymbolKind, SymbolRef, Symbols};
use ccir_ast::{
    AstSource, Block, Decln, Expr, Ident, InitDeclarator, Span, StorageClass, TypeQuery,
};
use ccir_ir as ir;
use std::collections::HashMap;
use tracing::{debug, info};

/// The code generator for one translation unit.
pub struct CodeGen {
    pub diags: Diagnostics,
    pub records: Records,
    pub enums: Enums,
    pub symbols: Symbols,
    pub scope: Scope,
    /// The IR module under construction. Discard it if [Diagnostics::failed]
    /// reports true at the end.
    pub module: ir::Module,
    anon_counter: u64,
    string_counter: u64,
    callsign_counter: u64,
    /// Occupied `@@` identifiers, for `.N` disambiguation.
    tag_idents: HashMap<String, u32>,
    /// Nonzero while record members are being processed; nested record
    /// definitions warn.
    pub(crate) record_depth: u32,
    /// Nonzero while a parameter list is being processed.
    pub(crate) param_depth: u32,
}

impl Default for CodeGen {
    fn default() -> CodeGen {
        CodeGen::new()
    }
}

impl CodeGen {
    pub fn new() -> CodeGen {
        CodeGen::with_diags(Diagnostics::new())
    }

    /// Creates a code generator over a caller-provided sink (tests use a
    /// silent one).
    pub fn with_diags(diags: Diagnostics) -> CodeGen {
        CodeGen {
            diags,
            records: Records::new(),
            enums: Enums::new(),
            symbols: Symbols::new(),
            scope: Scope::new(),
            module: ir::Module::new(),
            anon_counter: 0,
            string_counter: 0,
            callsign_counter: 0,
            tag_idents: HashMap::new(),
            record_depth: 0,
            param_depth: 0,
        }
    }

    /// Processes an entire translation unit: pulls top-level declarations
    /// until the source is exhausted, then emits extern declarations for
    /// everything declared but never defined.
    ///
    /// A fatal diagnostic in one declaration does not stop the loop; the
    /// error flag stays set and the final result is `Err`.
    pub fn process_source(&mut self, src: &mut dyn AstSource) -> Result<(), CgenError> {
        loop {
            let decln = match src.next_global_decln(&*self) {
                Ok(Some(decln)) => decln,
                Ok(None) => break,
                Err(fault) => {
                    self.diags.fatal(fault.span, &fault.message);
                    return Err(fault.into());
                }
            };
            if let Err(err) = self.process_global_decln(&decln) {
                debug!("top-level declaration failed: {err}");
            }
        }
        self.emit_externs();
        info!(
            declns = self.module.declns.len(),
            warnings = self.diags.warning_count(),
            "module processed"
        );
        if self.diags.failed() {
            Err(CgenError::Invalid)
        } else {
            Ok(())
        }
    }

    /// Lowers one top-level declaration: a function definition, a typedef,
    /// a type-only declaration or a set of global variable/function
    /// declarators.
    pub fn process_global_decln(&mut self, decln: &Decln) -> Result<(), CgenError> {
        let spec = self.process_decl_specs(&decln.specs)?;
        if let Some(body) = &decln.body {
            if decln.decls.len() != 1 {
                self.diags.fatal(decln.span, "invalid function definition");
                return Err(CgenError::Invalid);
            }
            return self.process_fundef(&spec, &decln.decls[0], body);
        }
        if let Some((StorageClass::Typedef, _)) = spec.storage {
            for d in &decln.decls {
                self.process_global_typedef(&spec, d, decln.span)?;
            }
            return Ok(());
        }
        if decln.decls.is_empty() {
            if !spec.declares_tag {
                self.diags
                    .warn(decln.span, "useless type in empty declaration");
            }
            return Ok(());
        }
        for d in &decln.decls {
            self.process_global_var(&spec, d, decln.span)?;
        }
        Ok(())
    }

    fn process_global_typedef(
        &mut self,
        spec: &SpecAnalysis,
        d: &InitDeclarator,
        span: Span,
    ) -> Result<(), CgenError> {
        if d.init.is_some() {
            self.diags.fatal(span, "typedef with an initializer");
            return Err(CgenError::Invalid);
        }
        let (cgtype, ident) = self.process_declarator(spec.base.clone(), &d.decl)?;
        let Some(ident) = ident else {
            self.diags.fatal(span, "typedef without an identifier");
            return Err(CgenError::Invalid);
        };
        match self.symbols.lookup(&ident.name) {
            Some(sref) => {
                self.symbols.redeclare(
                    &mut self.diags,
                    sref,
                    SymbolKind::Type,
                    &cgtype,
                    SymbolFlags::DEFINED,
                    ident.span,
                )?;
            }
            None => {
                self.symbols.insert(
                    SymbolKind::Type,
                    &ident.name,
                    format!("@{}", ident.name),
                    cgtype.clone(),
                    SymbolFlags::DEFINED,
                    ident.span,
                )?;
                if self
                    .scope
                    .insert_tdef(&ident.name, ident.span, cgtype)
                    .is_err()
                {
                    self.diags
                        .fatal(ident.span, format!("redefinition of '{}'", ident.name));
                    return Err(CgenError::Invalid);
                }
            }
        }
        Ok(())
    }

    fn process_global_var(
        &mut self,
        spec: &SpecAnalysis,
        d: &InitDeclarator,
        span: Span,
    ) -> Result<(), CgenError> {
        let (mut cgtype, ident) = self.process_declarator(spec.base.clone(), &d.decl)?;
        let Some(ident) = ident else {
            self.diags.fatal(span, "declaration without an identifier");
            return Err(CgenError::Invalid);
        };
        self.apply_usr_attr(&mut cgtype, spec.usr_attr, ident.span);
        let storage = spec.storage.map(|(sc, _)| sc);
        if matches!(storage, Some(StorageClass::Auto | StorageClass::Register)) {
            self.diags
                .fatal(ident.span, "invalid storage class at module scope");
            return Err(CgenError::Invalid);
        }
        let mut flags = SymbolFlags::empty();
        if storage == Some(StorageClass::Static) {
            flags |= SymbolFlags::STATIC;
        }
        if storage == Some(StorageClass::Extern) {
            flags |= SymbolFlags::EXTERN;
        }

        if cgtype.is_func() {
            if d.init.is_some() {
                self.diags
                    .fatal(ident.span, "function initialized like a variable");
                return Err(CgenError::Invalid);
            }
            self.declare_symbol(SymbolKind::Fun, &ident, &cgtype, flags)?;
            return Ok(());
        }

        self.note_enum_instance(&cgtype);
        match &d.init {
            Some(init) => {
                if storage == Some(StorageClass::Extern) {
                    self.diags
                        .warn(ident.span, "'extern' variable has an initializer");
                }
                let (cgtype, dblock) = self.process_global_initializer(&cgtype, init)?;
                flags |= SymbolFlags::DEFINED;
                let sref = self.declare_symbol(SymbolKind::Var, &ident, &cgtype, flags)?;
                let vtype = self.cgtype_texpr(&cgtype, ident.span).map_err(|err| {
                    self.diags.fatal(
                        ident.span,
                        format!("variable '{}' has incomplete type", ident.name),
                    );
                    err
                })?;
                let linkage = if storage == Some(StorageClass::Static) {
                    ir::Linkage::Default
                } else {
                    ir::Linkage::Global
                };
                self.module.append(ir::Decln::Var(ir::Var {
                    ident: self.symbols[sref].irident.clone(),
                    linkage,
                    vtype,
                    dblock,
                }));
            }
            None => {
                self.declare_symbol(SymbolKind::Var, &ident, &cgtype, flags)?;
            }
        }
        Ok(())
    }

    /// Lowers one function definition: sets up the per-procedure context,
    /// opens the argument scope, lowers the body and emits the completed
    /// procedure.
    pub fn process_fundef(
        &mut self,
        spec: &SpecAnalysis,
        d: &InitDeclarator,
        body: &Block,
    ) -> Result<(), CgenError> {
        if d.init.is_some() {
            self.diags
                .fatal(body.span, "function definition with an initializer");
            return Err(CgenError::Invalid);
        }
        let (mut cgtype, ident) = self.process_declarator(spec.base.clone(), &d.decl)?;
        let Some(ident) = ident else {
            self.diags.fatal(body.span, "function definition without a name");
            return Err(CgenError::Invalid);
        };
        self.apply_usr_attr(&mut cgtype, spec.usr_attr, ident.span);
        let ftype = match &cgtype {
            CGType::Func(ftype) => (**ftype).clone(),
            _ => {
                self.diags
                    .fatal(ident.span, format!("'{}' is not a function", ident.name));
                return Err(CgenError::Invalid);
            }
        };
        if !ftype.ret.is_void() && !ftype.ret.is_complete(&self.records, &self.enums) {
            self.diags
                .fatal(ident.span, "function return type is incomplete");
            return Err(CgenError::Invalid);
        }
        let storage = spec.storage.map(|(sc, _)| sc);
        let mut flags = SymbolFlags::DEFINED;
        if storage == Some(StorageClass::Static) {
            flags |= SymbolFlags::STATIC;
        }
        let sref = self.declare_symbol(SymbolKind::Fun, &ident, &cgtype, flags)?;
        let irident = self.symbols[sref].irident.clone();
        let linkage = if storage == Some(StorageClass::Static) {
            ir::Linkage::Default
        } else {
            ir::Linkage::Global
        };
        let rtype = if ftype.ret.is_void() {
            None
        } else {
            Some(self.cgtype_texpr(&ftype.ret, ident.span)?)
        };
        let attrs = match ftype.cconv {
            crate::ctype::CConv::Default => Vec::new(),
            crate::ctype::CConv::Usr => vec!["usr".to_string()],
        };
        let (params, _) = d
            .decl
            .innermost_func()
            .expect("function definition without a parameter list");
        debug!("lowering function {}", ident.name);

        let mut pgen = ProcGen::new(self, ftype.ret.clone(), ftype.variadic);
        pgen.cg.scope.push();
        let mut result = pgen.setup_args(params);
        let mut lblock = ir::LBlock::new();
        if result.is_ok() {
            result = pgen.process_block(body, &mut lblock);
        }
        pgen.labels.check(&mut pgen.cg.diags);
        // A body that does not end in a terminator falls off the end of
        // the function.
        let terminated = matches!(
            lblock.entries.last().and_then(|e| e.instr.as_ref()),
            Some(instr) if matches!(
                instr.kind,
                ir::InstrKind::Ret | ir::InstrKind::Retv | ir::InstrKind::Jmp
            )
        );
        if !terminated {
            lblock.append(ir::Instr::new(ir::InstrKind::Ret, 0, None, vec![]));
        }
        let args = std::mem::take(&mut pgen.args);
        let lvars = std::mem::take(&mut pgen.lvars);
        pgen.scope_pop_warn();
        drop(pgen);

        self.module.append(ir::Decln::Proc(ir::Proc {
            ident: irident,
            linkage,
            args,
            rtype,
            body: Some(lblock),
            lvars,
            attrs,
            variadic: ftype.variadic,
        }));
        result
    }

    /// Mints the `@@` identifier for a tag, disambiguating with a `.N`
    /// suffix when the name was already taken by a shadowed tag.
    pub(crate) fn tag_ir_ident(&mut self, cname: Option<&str>) -> String {
        let base = match cname {
            Some(name) => format!("@@{name}"),
            None => {
                let n = self.anon_counter;
                self.anon_counter += 1;
                format!("@@anon{n}")
            }
        };
        let count = self.tag_idents.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}.{}", *count - 1)
        }
    }

    pub(crate) fn next_string_ident(&mut self) -> String {
        let n = self.string_counter;
        self.string_counter += 1;
        format!("@@str{n}")
    }

    pub(crate) fn next_callsign_ident(&mut self) -> String {
        let n = self.callsign_counter;
        self.callsign_counter += 1;
        format!("@@csign{n}")
    }

    /// Translates a complete C type to its IR type expression.
    pub(crate) fn cgtype_texpr(&self, cgtype: &CGType, span: Span) -> Result<ir::Texpr, CgenError> {
        // Only called with types that can occupy storage; diagnostics for
        // incomplete types are emitted here so call sites stay lean.
        match cgtype {
            CGType::Basic(ElmType::Void) => Err(CgenError::Invalid),
            CGType::Basic(ElmType::VaList) => Ok(ir::Texpr::VaList),
            CGType::Basic(elm) => Ok(ir::Texpr::Int(elm.bits())),
            CGType::Pointer { .. } => Ok(ir::Texpr::Ptr(16)),
            CGType::Enum(_) => Ok(ir::Texpr::Int(16)),
            CGType::Array { elem, size, .. } => match size {
                Some(size) => Ok(ir::Texpr::Array {
                    size: *size,
                    elem: Box::new(self.cgtype_texpr(elem, span)?),
                }),
                None => Err(CgenError::Invalid),
            },
            CGType::Record(rref) => Ok(ir::Texpr::Ident(self.records[*rref].irident.clone())),
            CGType::Func(_) => Err(CgenError::Invalid),
        }
    }

    /// Declares (or re-declares) a module-level symbol and keeps the module
    /// scope in sync. Returns the directory entry.
    pub(crate) fn declare_symbol(
        &mut self,
        kind: SymbolKind,
        ident: &Ident,
        cgtype: &CGType,
        flags: SymbolFlags,
    ) -> Result<SymbolRef, CgenError> {
        match self.symbols.lookup(&ident.name) {
            Some(sref) => {
                self.symbols
                    .redeclare(&mut self.diags, sref, kind, cgtype, flags, ident.span)?;
                Ok(sref)
            }
            None => {
                let irident = format!("@{}", ident.name);
                let sref = self.symbols.insert(
                    kind,
                    &ident.name,
                    irident,
                    cgtype.clone(),
                    flags,
                    ident.span,
                )?;
                self.scope
                    .insert_gsym(&ident.name, ident.span, sref, cgtype.clone())
                    .map_err(|err| {
                        self.diags
                            .fatal(ident.span, format!("redefinition of '{}'", ident.name));
                        err
                    })?;
                Ok(sref)
            }
        }
    }

    /// Synthesizes a callsign procedure declaration conveying the signature
    /// of an indirect call target. Returns its `@@` identifier.
    pub(crate) fn create_callsign(&mut self, ftype: &FuncType, span: Span) -> Result<String, CgenError> {
        let ident = self.next_callsign_ident();
        let mut args = Vec::new();
        for (i, atype) in ftype.args.iter().enumerate() {
            let atype = self.arg_texpr(atype, span)?;
            args.push(ir::ProcArg {
                ident: format!("%{i}"),
                atype,
            });
        }
        let rtype = if ftype.ret.is_void() {
            None
        } else {
            Some(self.cgtype_texpr(&ftype.ret, span)?)
        };
        self.module.append(ir::Decln::Proc(ir::Proc {
            ident: ident.clone(),
            linkage: ir::Linkage::Callsign,
            args,
            rtype,
            body: None,
            lvars: Vec::new(),
            attrs: match ftype.cconv {
                crate::ctype::CConv::Default => Vec::new(),
                crate::ctype::CConv::Usr => vec!["usr".to_string()],
            },
            variadic: ftype.variadic,
        }));
        Ok(ident)
    }

    /// IR type of a declared argument: arrays are adjusted to pointers at
    /// the call boundary.
    pub(crate) fn arg_texpr(&self, cgtype: &CGType, span: Span) -> Result<ir::Texpr, CgenError> {
        match cgtype {
            CGType::Array { .. } | CGType::Func(_) => Ok(ir::Texpr::Ptr(16)),
            other => self.cgtype_texpr(other, span),
        }
    }

    /// Evaluates a constant expression by lowering it into a throwaway
    /// procedure context and requiring a compile-time-known result.
    pub fn constexpr_eval(&mut self, expr: &Expr) -> Result<EResult, CgenError> {
        let span = expr.span();
        let mut pgen = ProcGen::new(self, CGType::basic(ElmType::Int), false);
        pgen.constexpr = true;
        let mut lblock = ir::LBlock::new();
        let eres = pgen.process_expr(expr, &mut lblock)?;
        let eres = pgen.as_rvalue(eres, &mut lblock)?;
        if !eres.cvknown {
            self.diags.fatal(span, "constant expression required");
            return Err(CgenError::NotConstant);
        }
        Ok(eres)
    }

    /// Evaluates a constant integer expression.
    pub fn constexpr_eval_int(&mut self, expr: &Expr) -> Result<(i64, CGType), CgenError> {
        let eres = self.constexpr_eval(expr)?;
        if !eres.cgtype.is_integral() {
            self.diags
                .fatal(expr.span(), "constant integer expression required");
            return Err(CgenError::Invalid);
        }
        Ok((eres.cvint, eres.cgtype))
    }

    /// Emits an extern IR declaration for every symbol that was declared
    /// but never defined. Runs once, after the source is exhausted.
    fn emit_externs(&mut self) {
        let pending: Vec<SymbolRef> = self
            .symbols
            .iter()
            .filter(|(_, sym)| {
                sym.kind != SymbolKind::Type && !sym.flags.contains(SymbolFlags::DEFINED)
            })
            .map(|(sref, _)| sref)
            .collect();
        for sref in pending {
            let sym = self.symbols[sref].clone();
            debug!("emitting extern declaration for {}", sym.cident);
            match sym.kind {
                SymbolKind::Fun => {
                    let CGType::Func(ftype) = &sym.cgtype else {
                        continue;
                    };
                    let args: Result<Vec<ir::ProcArg>, CgenError> = ftype
                        .args
                        .iter()
                        .enumerate()
                        .map(|(i, atype)| {
                            Ok(ir::ProcArg {
                                ident: format!("%{i}"),
                                atype: self.arg_texpr(atype, sym.span)?,
                            })
                        })
                        .collect();
                    let Ok(args) = args else {
                        self.diags.fatal(
                            sym.span,
                            format!("function '{}' has an invalid argument type", sym.cident),
                        );
                        continue;
                    };
                    let rtype = if ftype.ret.is_void() {
                        None
                    } else {
                        match self.cgtype_texpr(&ftype.ret, sym.span) {
                            Ok(texpr) => Some(texpr),
                            Err(_) => continue,
                        }
                    };
                    self.module.append(ir::Decln::Proc(ir::Proc {
                        ident: sym.irident.clone(),
                        linkage: ir::Linkage::Extern,
                        args,
                        rtype,
                        body: None,
                        lvars: Vec::new(),
                        attrs: match ftype.cconv {
                            crate::ctype::CConv::Default => Vec::new(),
                            crate::ctype::CConv::Usr => vec!["usr".to_string()],
                        },
                        variadic: ftype.variadic,
                    }));
                }
                SymbolKind::Var => {
                    let Ok(vtype) = self.cgtype_texpr(&sym.cgtype, sym.span) else {
                        self.diags.fatal(
                            sym.span,
                            format!("variable '{}' has incomplete type", sym.cident),
                        );
                        continue;
                    };
                    self.module.append(ir::Decln::Var(ir::Var {
                        ident: sym.irident.clone(),
                        linkage: ir::Linkage::Extern,
                        vtype,
                        dblock: ir::DBlock::new(),
                    }));
                }
                SymbolKind::Type => {}
            }
        }
    }
}

impl TypeQuery for CodeGen {
    /// The parser's typedef disambiguation query.
    fn ident_is_type(&self, ident: &str) -> bool {
        matches!(
            self.scope.lookup(ident).map(|entry| &entry.member),
            Some(crate::scope::ScopeMember::TDef { .. })
        )
    }
}

/// Break target stacked by loops and switches.
#[derive(Debug, Clone)]
pub(crate) struct BreakTarget {
    pub label: String,
}

/// Continue target stacked by loops only.
#[derive(Debug, Clone)]
pub(crate) struct ContinueTarget {
    pub label: String,
}

/// Per-switch lowering state.
#[derive(Debug)]
pub(crate) struct SwitchFrame {
    /// The switch expression's rvalue.
    pub sres: EResult,
    /// Label of the next dispatch entry, jumped to by the previous one and
    /// defined when the next `case` (or the end of the switch) is reached.
    pub next_cnd: String,
    pub end_label: String,
    pub default_label: Option<String>,
    /// Case values already seen, for duplicate detection and the enum
    /// exhaustiveness warning.
    pub seen: Vec<i64>,
}

/// Per-procedure code generation context.
///
/// Owns the goto-label registry, the loop/switch stacks and the local
/// variable and label counters; drops at the end of the function
/// definition.
pub struct ProcGen<'a> {
    pub cg: &'a mut CodeGen,
    pub labels: Labels,
    pub ret_type: CGType,
    pub variadic: bool,
    /// IR name of the last fixed argument, for `va_start`.
    pub last_arg: Option<String>,
    pub args: Vec<ir::ProcArg>,
    pub lvars: Vec<ir::LVar>,
    /// Set when evaluating a constant expression: reads from memory poison
    /// the result and some diagnostics harden into errors.
    pub(crate) constexpr: bool,
    next_var: u64,
    next_label: u64,
    lvar_names: HashMap<String, u32>,
    pub(crate) break_stack: Vec<BreakTarget>,
    pub(crate) continue_stack: Vec<ContinueTarget>,
    pub(crate) switch_stack: Vec<SwitchFrame>,
}

impl<'a> ProcGen<'a> {
    pub fn new(cg: &'a mut CodeGen, ret_type: CGType, variadic: bool) -> ProcGen<'a> {
        ProcGen {
            cg,
            labels: Labels::new(),
            ret_type,
            variadic,
            last_arg: None,
            args: Vec::new(),
            lvars: Vec::new(),
            constexpr: false,
            next_var: 0,
            next_label: 0,
            lvar_names: HashMap::new(),
            break_stack: Vec::new(),
            continue_stack: Vec::new(),
            switch_stack: Vec::new(),
        }
    }

    /// Mints a fresh virtual register.
    pub(crate) fn new_tmp(&mut self) -> String {
        let n = self.next_var;
        self.next_var += 1;
        format!("%{n}")
    }

    /// Mints the IR name for a named local or argument, disambiguating
    /// shadowed names with a `.N` suffix. Registers locals in the
    /// procedure's variable table.
    pub(crate) fn new_named_var(&mut self, cname: &str, vtype: ir::Texpr, arg: bool) -> String {
        let count = self.lvar_names.entry(cname.to_string()).or_insert(0);
        *count += 1;
        let ident = if *count == 1 {
            format!("%{cname}")
        } else {
            format!("%{cname}.{}", *count - 1)
        };
        if arg {
            self.args.push(ir::ProcArg {
                ident: ident.clone(),
                atype: vtype,
            });
        } else {
            self.lvars.push(ir::LVar {
                ident: ident.clone(),
                vtype,
            });
        }
        ident
    }

    /// Mints a fresh `%<pattern><n>` label.
    pub(crate) fn create_label(&mut self, pattern: &str) -> String {
        let n = self.next_label;
        self.next_label += 1;
        format!("%{pattern}{n}")
    }

    /// Processes a function definition's parameter declarations into the
    /// argument scope and the procedure argument list.
    pub(crate) fn setup_args(&mut self, params: &[ccir_ast::ParamDecl]) -> Result<(), CgenError> {
        for param in params {
            let pspan = param.specs.span();
            let pspec = self.cg.process_decl_specs(&param.specs)?;
            if let Some((_, sspan)) = pspec.storage {
                self.cg.diags.fatal(sspan, "storage class on a parameter");
                return Err(CgenError::Invalid);
            }
            let (ptype, pident) = self.cg.process_declarator(pspec.base, &param.decl)?;
            if ptype.is_void() {
                if params.len() == 1 && pident.is_none() {
                    break;
                }
                self.cg
                    .diags
                    .fatal(pspan, "'void' must be the only parameter");
                return Err(CgenError::Invalid);
            }
            let Some(pident) = pident else {
                self.cg
                    .diags
                    .fatal(pspan, "parameter name omitted in function definition");
                return Err(CgenError::Invalid);
            };
            self.cg.note_enum_instance(&ptype);
            let adjusted = crate::expr::adjust_param(&ptype);
            let atype = self.cg.arg_texpr(&ptype, pident.span)?;
            let vname = self.new_named_var(&pident.name, atype, true);
            if self
                .cg
                .scope
                .insert_arg(&pident.name, pident.span, vname.clone(), adjusted)
                .is_err()
            {
                self.cg.diags.fatal(
                    pident.span,
                    format!("redefinition of parameter '{}'", pident.name),
                );
                return Err(CgenError::Invalid);
            }
            self.last_arg = Some(vname);
        }
        Ok(())
    }
}
