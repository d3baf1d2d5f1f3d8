use std::fmt::{self, Display, Formatter};

use lattice_ast::nodes::Location;
use thiserror::Error;

use crate::type_info::TypeInfo;

/// Kind of name an undeclared reference was expected to resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Set,
    VariableOrConstant,
    Function,
    ElementType,
}

impl Display for IdentifierKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::Set => write!(f, "set"),
            IdentifierKind::VariableOrConstant => write!(f, "variable or constant"),
            IdentifierKind::Function => write!(f, "function"),
            IdentifierKind::ElementType => write!(f, "element type"),
        }
    }
}

/// Kind of declaration that collided with an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    ElementType,
    VariableOrConstant,
    FunctionOrProcedure,
    Field,
}

impl Display for DefinitionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::ElementType => write!(f, "element type"),
            DefinitionKind::VariableOrConstant => write!(f, "variable or constant"),
            DefinitionKind::FunctionOrProcedure => write!(f, "function or procedure"),
            DefinitionKind::Field => write!(f, "field"),
        }
    }
}

/// Permission a symbol reference required but did not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAccess {
    Readable,
    Writable,
}

impl Display for RequiredAccess {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RequiredAccess::Readable => write!(f, "readable"),
            RequiredAccess::Writable => write!(f, "writable"),
        }
    }
}

/// Coarse classification of a [`TypeCheckError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UndeclaredIdentifier,
    MultipleDefinition,
    TypeMismatch,
    ArityMismatch,
    PermissionViolation,
    UnsupportedConstruct,
}

/// Represents a type checking error with source location.
/// All type errors are tied to AST nodes and must have a location.
#[derive(Debug, Clone, Error)]
pub enum TypeCheckError {
    #[error("{location}: undeclared {kind} '{name}'")]
    UndeclaredIdentifier {
        kind: IdentifierKind,
        name: String,
        location: Location,
    },

    #[error("{location}: undefined field '{field}'")]
    UndefinedField { field: String, location: Location },

    #[error("{location}: multiple definitions of {kind} '{name}'")]
    MultipleDefinition {
        kind: DefinitionKind,
        name: String,
        location: Location,
    },

    #[error("{location}: {message}")]
    TypeMismatch { message: String, location: Location },

    #[error("{location}: passed in {found} arguments but function '{function}' expects {expected}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        found: usize,
        location: Location,
    },

    #[error(
        "{location}: map operation passes {found} arguments to assembly function but function '{function}' expects {expected} arguments"
    )]
    MapArgumentCountMismatch {
        function: String,
        expected: usize,
        found: usize,
        location: Location,
    },

    #[error("{location}: cannot assign an expression returning {values} values to {targets} targets")]
    AssignmentArityMismatch {
        values: usize,
        targets: usize,
        location: Location,
    },

    #[error("{location}: tensor access expected {expected} indices but got {found}")]
    IndexCountMismatch {
        expected: usize,
        found: usize,
        location: Location,
    },

    #[error("{location}: tuple access expects exactly one index but got {found}")]
    TupleIndexCountMismatch { found: usize, location: Location },

    #[error("{location}: '{name}' is not {required}")]
    PermissionViolation {
        name: String,
        required: RequiredAccess,
        location: Location,
    },

    #[error("{location}: {construct} is not supported")]
    UnsupportedConstruct {
        construct: &'static str,
        location: Location,
    },
}

impl TypeCheckError {
    /// Returns the source location associated with this error.
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            TypeCheckError::UndeclaredIdentifier { location, .. }
            | TypeCheckError::UndefinedField { location, .. }
            | TypeCheckError::MultipleDefinition { location, .. }
            | TypeCheckError::TypeMismatch { location, .. }
            | TypeCheckError::ArgumentCountMismatch { location, .. }
            | TypeCheckError::MapArgumentCountMismatch { location, .. }
            | TypeCheckError::AssignmentArityMismatch { location, .. }
            | TypeCheckError::IndexCountMismatch { location, .. }
            | TypeCheckError::TupleIndexCountMismatch { location, .. }
            | TypeCheckError::PermissionViolation { location, .. }
            | TypeCheckError::UnsupportedConstruct { location, .. } => location,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            TypeCheckError::UndeclaredIdentifier { .. } | TypeCheckError::UndefinedField { .. } => {
                ErrorKind::UndeclaredIdentifier
            }
            TypeCheckError::MultipleDefinition { .. } => ErrorKind::MultipleDefinition,
            TypeCheckError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            TypeCheckError::ArgumentCountMismatch { .. }
            | TypeCheckError::MapArgumentCountMismatch { .. }
            | TypeCheckError::AssignmentArityMismatch { .. }
            | TypeCheckError::IndexCountMismatch { .. }
            | TypeCheckError::TupleIndexCountMismatch { .. } => ErrorKind::ArityMismatch,
            TypeCheckError::PermissionViolation { .. } => ErrorKind::PermissionViolation,
            TypeCheckError::UnsupportedConstruct { .. } => ErrorKind::UnsupportedConstruct,
        }
    }

    /// The error text without its `line:column: ` prefix.
    #[must_use]
    pub fn message(&self) -> String {
        let text = self.to_string();
        let prefix = format!("{}: ", self.location());
        match text.strip_prefix(&prefix) {
            Some(message) => message.to_string(),
            None => text,
        }
    }
}

/// A narrowing accessor or registry lookup was used without the check that
/// guarantees it succeeds. This is a defect in the checker, never a user
/// error, and aborts the pass.
#[derive(Debug, Clone, Error)]
#[error("internal invariant violated: {message}")]
pub struct InvariantViolation {
    pub message: String,
}

impl InvariantViolation {
    pub(crate) fn narrowing(expected: &str, found: &TypeInfo) -> Self {
        Self {
            message: format!("expected a {expected} type but found '{found}'"),
        }
    }

    pub(crate) fn missing(kind: &str, name: &str) -> Self {
        Self {
            message: format!("{kind} '{name}' is not registered"),
        }
    }
}
