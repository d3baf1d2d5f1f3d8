//! Diagnostic records and the collector the checker reports into.
//!
//! The collector only ever appends. Reporting never interrupts the pass, so a
//! single run surfaces every independent error in the order it was found.

use std::fmt::{self, Display, Formatter};

use crate::errors::TypeCheckError;

/// Source-located error record handed to the compiler driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub message: String,
}

impl From<&TypeCheckError> for Diagnostic {
    fn from(error: &TypeCheckError) -> Self {
        let location = error.location();
        Self {
            start_line: location.start_line,
            start_column: location.start_column,
            end_line: location.end_line,
            end_column: location.end_column,
            message: error.message(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.start_line, self.start_column, self.message)
    }
}

#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    errors: Vec<TypeCheckError>,
}

impl DiagnosticCollector {
    pub fn report(&mut self, error: TypeCheckError) {
        tracing::trace!(%error, "type error reported");
        self.errors.push(error);
    }

    #[must_use]
    pub fn errors(&self) -> &[TypeCheckError] {
        &self.errors
    }

    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.iter().map(Diagnostic::from).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }
}
