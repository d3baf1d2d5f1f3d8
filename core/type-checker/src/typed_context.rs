//! Typed Context - Results of a Type Checking Pass
//!
//! This module provides [`TypedContext`], the data structure handed to later
//! compilation stages once a pass has run over a source file.
//!
//! ## Architecture
//!
//! ```text
//! TypedContext
//! ├─ SourceFile (original AST, never mutated)
//! ├─ node_types: HashMap<NodeID, Vec<TypeInfo>>
//! │  └─ Result types of every expression whose type could be inferred
//! ├─ DiagnosticCollector
//! │  └─ Errors in the order they were found
//! └─ SymbolTable
//!    ├─ Element type registry
//!    └─ Function registry (intrinsics and user functions)
//! ```
//!
//! ## Node ID to Type Mapping
//!
//! An expression produces zero, one or many values, so each entry is a list:
//! a call to a procedure without results maps to an empty list, a call to a
//! function with two results maps to two types. Expressions whose type could
//! not be determined have no entry.
//!
//! ```ignore
//! if let Some(types) = typed_context.get_node_types(node_id) {
//!     println!("Node {} has {} result(s)", node_id, types.len());
//! }
//! ```
//!
//! Structural nodes (type annotations, declared names, callee names, field
//! names) never have entries.

use std::rc::Rc;

use anyhow::bail;
use lattice_ast::nodes::SourceFile;
use rustc_hash::FxHashMap;

use crate::{
    diagnostics::{Diagnostic, DiagnosticCollector},
    errors::TypeCheckError,
    symbol_table::SymbolTable,
    type_info::{ElementType, Func, FuncKind, TypeInfo},
};

pub struct TypedContext {
    pub(crate) symbol_table: SymbolTable,
    pub(crate) diagnostics: DiagnosticCollector,
    node_types: FxHashMap<u32, Vec<TypeInfo>>,
    source_file: Rc<SourceFile>,
}

impl TypedContext {
    pub(crate) fn new(source_file: Rc<SourceFile>) -> Self {
        Self {
            symbol_table: SymbolTable::default(),
            diagnostics: DiagnosticCollector::default(),
            node_types: FxHashMap::default(),
            source_file,
        }
    }

    /// Returns the checked source file.
    #[must_use = "returns the source file without side effects"]
    pub fn source_file(&self) -> Rc<SourceFile> {
        Rc::clone(&self.source_file)
    }

    /// Gets the result types of an expression node.
    ///
    /// Returns `None` if the node is structural, does not exist, or its type
    /// could not be inferred.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn get_node_types(&self, node_id: u32) -> Option<&[TypeInfo]> {
        self.node_types.get(&node_id).map(Vec::as_slice)
    }

    /// Gets the type of an expression node that produces exactly one value.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn get_node_type(&self, node_id: u32) -> Option<&TypeInfo> {
        match self.get_node_types(node_id) {
            Some([single]) => Some(single),
            _ => None,
        }
    }

    pub(crate) fn set_node_types(&mut self, node_id: u32, types: Vec<TypeInfo>) {
        self.node_types.insert(node_id, types);
    }

    /// Errors found by the pass, in report order.
    #[must_use]
    pub fn errors(&self) -> &[TypeCheckError] {
        self.diagnostics.errors()
    }

    /// Diagnostic records for every error found by the pass, in report order.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.diagnostics()
    }

    #[must_use = "this is a pure check with no side effects"]
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Succeeds only for a program that type-checked without errors.
    ///
    /// # Errors
    ///
    /// Returns an error joining every diagnostic when the pass reported any.
    pub fn ensure_no_errors(&self) -> anyhow::Result<()> {
        if self.has_errors() {
            let messages: Vec<String> = self.errors().iter().map(ToString::to_string).collect();
            bail!(messages.join("; "));
        }
        Ok(())
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub fn element_type(&self, name: &str) -> Option<Rc<ElementType>> {
        self.symbol_table.lookup_element_type(name)
    }

    /// Element types in declaration order.
    #[must_use]
    pub fn element_types(&self) -> Vec<Rc<ElementType>> {
        self.symbol_table.element_types().to_vec()
    }

    /// Looks up a registered function or intrinsic.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn function(&self, name: &str) -> Option<Rc<Func>> {
        self.symbol_table.lookup_function(name)
    }

    /// User-declared functions in declaration order.
    #[must_use]
    pub fn functions(&self) -> Vec<Rc<Func>> {
        self.symbol_table
            .functions()
            .iter()
            .filter(|func| func.kind == FuncKind::Normal)
            .cloned()
            .collect()
    }
}
