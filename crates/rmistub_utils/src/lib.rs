pub mod errors;
pub mod suggest;

pub use errors::{Diagnostic, DiagnosticSeverity, emit_diagnostic, emit_diagnostics};
pub use suggest::find_best_match;
