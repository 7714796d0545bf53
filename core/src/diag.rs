//! Accumulating diagnostic sink.
//!
//! Diagnostics are collected in emission order and written to standard
//! error as they arrive. A fatal diagnostic sets the module-wide error
//! flag; processing continues so further diagnostics can be collected, and
//! the caller discards the module at the end. Warnings only increment a
//! counter.

use ccir_ast::Span;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One emitted diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl fmt::Display for Diag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}: {}", self.span, severity, self.message)
    }
}

/// The per-translation-unit diagnostic sink.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diags: Vec<Diag>,
    error: bool,
    warnings: u32,
    silent: bool,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    /// A sink that does not write to stderr. Used by tests, which assert on
    /// the collected list instead.
    pub fn silent() -> Diagnostics {
        Diagnostics {
            silent: true,
            ..Diagnostics::default()
        }
    }

    /// Reports a fatal diagnostic and sets the error flag.
    pub fn fatal(&mut self, span: Span, message: impl fmt::Display) {
        self.emit(Diag {
            severity: Severity::Error,
            span,
            message: message.to_string(),
        });
        self.error = true;
    }

    /// Reports a warning. Never interrupts code generation.
    pub fn warn(&mut self, span: Span, message: impl fmt::Display) {
        self.emit(Diag {
            severity: Severity::Warning,
            span,
            message: message.to_string(),
        });
        self.warnings += 1;
    }

    fn emit(&mut self, diag: Diag) {
        debug!("diagnostic: {diag}");
        if !self.silent {
            eprintln!("{diag}");
        }
        self.diags.push(diag);
    }

    /// True once any fatal diagnostic has been reported.
    pub fn failed(&self) -> bool {
        self.error
    }

    pub fn warning_count(&self) -> u32 {
        self.warnings
    }

    /// Emitted diagnostics in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diag> {
        self.diags.iter()
    }

    /// Warning messages only, in emission order. Test convenience.
    pub fn warnings(&self) -> Vec<&str> {
        self.diags
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| d.message.as_str())
            .collect()
    }

    /// Error messages only, in emission order. Test convenience.
    pub fn errors(&self) -> Vec<&str> {
        self.diags
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| d.message.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_sets_flag_and_keeps_collecting() {
        let mut diags = Diagnostics::silent();
        assert!(!diags.failed());
        diags.fatal(Span::default(), "first");
        diags.warn(Span::default(), "second");
        diags.fatal(Span::default(), "third");
        assert!(diags.failed());
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.iter().count(), 3);
        assert_eq!(diags.errors(), ["first", "third"]);
    }

    #[test]
    fn warnings_do_not_set_error() {
        let mut diags = Diagnostics::silent();
        diags.warn(Span::default(), "w1");
        diags.warn(Span::default(), "w2");
        assert!(!diags.failed());
        assert_eq!(diags.warning_count(), 2);
    }

    #[test]
    fn display_includes_position() {
        let diag = Diag {
            severity: Severity::Warning,
            span: Span::new(ccir_ast::Pos::new(3, 14), ccir_ast::Pos::new(3, 15)),
            message: "unused variable 'x'".into(),
        };
        assert_eq!(diag.to_string(), "3:14: warning: unused variable 'x'");
    }
}
