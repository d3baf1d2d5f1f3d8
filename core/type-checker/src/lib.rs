#![warn(clippy::pedantic)]
//! Type Checker for the Lattice Simulation Language
//!
//! This crate implements the semantic analysis pass of the lattice compiler.
//! It walks a [`SourceFile`] once, resolves type annotations, checks every
//! declaration, statement and expression, and records the inferred result
//! types of expressions for later stages.
//!
//! ## Core Features
//!
//! **Type System Support**:
//! - Scalars: `int`, `float`, `bool`
//! - Tensors over index domains, including blocked tensors and column vectors
//! - Sets of elements and edge sets with endpoint sets
//! - Tuples of elements and element records with named fields
//!
//! **Type Checking**:
//! - Scoped symbol table with read-only and read-write bindings
//! - Linear algebra rules for `*`, `/` and element-wise operators
//! - Shape inference for dense tensor literals
//! - Map operations over sets and edge sets
//! - Implicit declaration on first assignment
//!
//! **Error Handling**:
//! - Error recovery: one pass reports every independent error
//! - Each error is reported once, at the node it can be attributed to
//! - Precise locations: all errors include source line and column information
//!
//! ## Quick Start
//!
//! ```ignore
//! use lattice_type_checker::TypeCheckerBuilder;
//!
//! let typed_context = TypeCheckerBuilder::build_typed_context(&source_file)?
//!     .typed_context();
//!
//! typed_context.ensure_no_errors()?;
//! if let Some(types) = typed_context.get_node_types(node_id) {
//!     println!("Node {} produces {} value(s)", node_id, types.len());
//! }
//! ```
//!
//! ## Public Modules
//!
//! - [`errors`] - User-facing errors and the internal invariant violation
//! - [`diagnostics`] - Diagnostic records handed to the compiler driver
//! - [`type_info`] - Semantic types (`TypeInfo`, `TensorType`, `SetType`, ...)
//! - [`typed_context`] - Results of a pass with query API
//! - [`literal_shape`] - Dense tensor literal shape inference
//! - [`intrinsics`] - Built-in function prelude

use std::rc::Rc;

use lattice_ast::nodes::SourceFile;

use crate::{type_checker::TypeChecker, typed_context::TypedContext};

pub mod diagnostics;
pub mod errors;
pub mod intrinsics;
pub mod literal_shape;
mod symbol_table;
mod type_checker;
pub mod type_info;
pub mod typed_context;

/// Marker state holding the configuration of a pass that has not run yet.
pub struct TypeCheckerInitState {
    register_intrinsics: bool,
}

/// Marker state indicating type checking is complete and context is ready.
pub struct TypeCheckerCompleteState {
    typed_context: TypedContext,
}

/// Type alias for a completed type checker builder ready to yield its context.
pub type CompletedTypeCheckerBuilder = TypeCheckerBuilder<TypeCheckerCompleteState>;

/// Builder for running type checking on a source file.
///
/// Uses the typestate pattern to ensure type checking completes before
/// accessing the typed context.
pub struct TypeCheckerBuilder<S> {
    state: S,
}

impl Default for TypeCheckerBuilder<TypeCheckerInitState> {
    fn default() -> Self {
        TypeCheckerBuilder::new()
    }
}

impl TypeCheckerBuilder<TypeCheckerInitState> {
    #[must_use]
    pub fn new() -> Self {
        TypeCheckerBuilder {
            state: TypeCheckerInitState {
                register_intrinsics: true,
            },
        }
    }

    /// Whether the intrinsic prelude is registered before the first
    /// definition. Enabled by default.
    #[must_use]
    pub fn with_intrinsics(mut self, register_intrinsics: bool) -> Self {
        self.state.register_intrinsics = register_intrinsics;
        self
    }

    /// Run type checking on `source_file` and return a completed builder.
    ///
    /// User errors do not fail this call; they are collected in the typed
    /// context.
    ///
    /// # Errors
    ///
    /// Returns an error if the checker violates one of its internal
    /// invariants.
    pub fn check(self, source_file: &Rc<SourceFile>) -> anyhow::Result<CompletedTypeCheckerBuilder> {
        let mut ctx = TypedContext::new(Rc::clone(source_file));
        let mut type_checker = TypeChecker::new(self.state.register_intrinsics);
        type_checker.infer_types(&mut ctx)?;
        Ok(TypeCheckerBuilder {
            state: TypeCheckerCompleteState { typed_context: ctx },
        })
    }

    /// Run type checking with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the checker violates one of its internal
    /// invariants.
    pub fn build_typed_context(source_file: &Rc<SourceFile>) -> anyhow::Result<CompletedTypeCheckerBuilder> {
        TypeCheckerBuilder::new().check(source_file)
    }
}

impl TypeCheckerBuilder<TypeCheckerCompleteState> {
    /// Consume the builder and return the typed context.
    #[must_use = "consumes builder and returns the typed context"]
    pub fn typed_context(self) -> TypedContext {
        self.state.typed_context
    }
}
