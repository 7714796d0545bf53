//! Per-procedure goto-label registry.
//!
//! Labels are tracked as they are defined (`name:`) and used (`goto name`).
//! A label may be used before it is defined; the closure check at the end
//! of the procedure reports the ones that never were.

#[cfg(test)]
mod tests;

use crate::CgenError;
use crate::diag::Diagnostics;
use ccir_ast::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelEntry {
    pub name: String,
    /// Span of the definition, or of the first use while undefined.
    pub span: Span,
    pub defined: bool,
    pub used: bool,
}

#[derive(Debug, Default)]
pub struct Labels {
    entries: Vec<LabelEntry>,
}

impl Labels {
    pub fn new() -> Labels {
        Labels::default()
    }

    /// The IR label for a goto label. User labels get a `%_` prefix so
    /// they can never collide with minted `%<pattern><n>` labels.
    pub fn ir_label(name: &str) -> String {
        format!("%_{name}")
    }

    fn find(&mut self, name: &str) -> Option<&mut LabelEntry> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    /// Records a label definition.
    pub fn define(&mut self, name: &str, span: Span) -> Result<(), CgenError> {
        match self.find(name) {
            Some(entry) if entry.defined => Err(CgenError::Exists),
            Some(entry) => {
                entry.defined = true;
                entry.span = span;
                Ok(())
            }
            None => {
                self.entries.push(LabelEntry {
                    name: name.to_string(),
                    span,
                    defined: true,
                    used: false,
                });
                Ok(())
            }
        }
    }

    /// Records a label use, creating an undefined entry if needed.
    pub fn use_label(&mut self, name: &str, span: Span) {
        match self.find(name) {
            Some(entry) => entry.used = true,
            None => self.entries.push(LabelEntry {
                name: name.to_string(),
                span,
                defined: false,
                used: true,
            }),
        }
    }

    /// End-of-procedure closure check: a used-but-undefined label is fatal,
    /// a defined-but-unused one warns.
    pub fn check(&self, diags: &mut Diagnostics) {
        for entry in &self.entries {
            if entry.used && !entry.defined {
                diags.fatal(
                    entry.span,
                    format!("label '{}' used but not defined", entry.name),
                );
            } else if entry.defined && !entry.used {
                diags.warn(entry.span, format!("label '{}' defined but not used", entry.name));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelEntry> {
        self.entries.iter()
    }
}
