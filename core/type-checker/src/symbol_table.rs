//! Symbol Table
//!
//! This module implements the scoped symbol table used during type checking.
//! It supports:
//!
//! - Lexically nested scopes with a parent chain
//! - Variable and constant bindings with read/write access permissions
//! - Element type and function registries keyed in the root scope
//!
//! Scopes follow a stack discipline: a scope is pushed when a function body,
//! loop body or branch body is entered and popped when it is left, dropping
//! every binding it held. Lookup walks from the current scope towards the root
//! until a match is found, so inner bindings shadow outer ones.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::bail;
use rustc_hash::FxHashMap;

use crate::errors::InvariantViolation;
use crate::type_info::{ElementType, Func, Var};

pub(crate) type ScopeRef = Rc<RefCell<Scope>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    ReadWrite,
}

impl Access {
    #[must_use = "this is a pure check with no side effects"]
    pub(crate) fn is_readable(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    #[must_use = "this is a pure check with no side effects"]
    pub(crate) fn is_writable(self) -> bool {
        matches!(self, Access::ReadWrite)
    }
}

/// A name bound to a typed variable together with its access permission.
#[derive(Debug, Clone)]
pub(crate) struct Symbol {
    pub(crate) var: Rc<Var>,
    pub(crate) access: Access,
}

/// A scope in the symbol table chain.
#[derive(Debug)]
pub(crate) struct Scope {
    pub(crate) id: u32,
    pub(crate) depth: u32,
    pub(crate) parent: Option<ScopeRef>,
    pub(crate) symbols: FxHashMap<String, Symbol>,
    pub(crate) element_types: FxHashMap<String, Rc<ElementType>>,
    pub(crate) functions: FxHashMap<String, Rc<Func>>,
}

impl Scope {
    #[must_use = "scope constructor returns a new scope that should be used"]
    pub(crate) fn new(id: u32, parent: Option<ScopeRef>) -> ScopeRef {
        let depth = parent.as_ref().map_or(0, |p| p.borrow().depth + 1);
        Rc::new(RefCell::new(Self {
            id,
            depth,
            parent,
            symbols: FxHashMap::default(),
            element_types: FxHashMap::default(),
            functions: FxHashMap::default(),
        }))
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub(crate) fn lookup_symbol_local(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub(crate) fn lookup_symbol(&self, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.lookup_symbol_local(name) {
            return Some(symbol.clone());
        }
        if let Some(parent) = &self.parent {
            return parent.borrow().lookup_symbol(name);
        }
        None
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub(crate) fn lookup_element_type(&self, name: &str) -> Option<Rc<ElementType>> {
        if let Some(element_type) = self.element_types.get(name) {
            return Some(Rc::clone(element_type));
        }
        if let Some(parent) = &self.parent {
            return parent.borrow().lookup_element_type(name);
        }
        None
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub(crate) fn lookup_function(&self, name: &str) -> Option<Rc<Func>> {
        if let Some(func) = self.functions.get(name) {
            return Some(Rc::clone(func));
        }
        if let Some(parent) = &self.parent {
            return parent.borrow().lookup_function(name);
        }
        None
    }
}

/// Scope stack plus the global element-type and function registries of one
/// compilation unit. Created at the start of a pass and handed to the
/// [`TypedContext`](crate::typed_context::TypedContext) at its end.
#[derive(Debug)]
pub(crate) struct SymbolTable {
    root_scope: ScopeRef,
    current_scope: ScopeRef,
    next_scope_id: u32,
    element_type_order: Vec<Rc<ElementType>>,
    function_order: Vec<Rc<Func>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        let root = Scope::new(0, None);
        SymbolTable {
            root_scope: Rc::clone(&root),
            current_scope: root,
            next_scope_id: 1,
            element_type_order: Vec::new(),
            function_order: Vec::new(),
        }
    }
}

impl SymbolTable {
    pub(crate) fn push_scope(&mut self) -> u32 {
        let scope_id = self.next_scope_id;
        self.next_scope_id += 1;
        let scope = Scope::new(scope_id, Some(Rc::clone(&self.current_scope)));
        tracing::trace!(scope_id, depth = scope.borrow().depth, "push scope");
        self.current_scope = scope;
        scope_id
    }

    pub(crate) fn pop_scope(&mut self) {
        let parent = self.current_scope.borrow().parent.clone();
        if let Some(parent) = parent {
            tracing::trace!(
                scope_id = self.current_scope.borrow().id,
                depth = parent.borrow().depth,
                "pop scope"
            );
            self.current_scope = parent;
        }
    }

    /// Nesting depth of the current scope; the root scope has depth 0.
    #[must_use]
    pub(crate) fn depth(&self) -> u32 {
        self.current_scope.borrow().depth
    }

    /// Binds `var` under its own name in the current scope, replacing any
    /// binding of that name in this scope.
    pub(crate) fn add_symbol(&mut self, var: Rc<Var>, access: Access) {
        let name = var.name.clone();
        self.current_scope
            .borrow_mut()
            .symbols
            .insert(name, Symbol { var, access });
    }

    #[must_use = "this is a pure check with no side effects"]
    pub(crate) fn has_symbol(&self, name: &str, current_scope_only: bool) -> bool {
        let scope = self.current_scope.borrow();
        if current_scope_only {
            scope.lookup_symbol_local(name).is_some()
        } else {
            scope.lookup_symbol(name).is_some()
        }
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub(crate) fn lookup_symbol(&self, name: &str) -> Option<Symbol> {
        self.current_scope.borrow().lookup_symbol(name)
    }

    /// Returns the innermost binding of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] if no scope binds `name`; callers check
    /// [`SymbolTable::has_symbol`] first.
    pub(crate) fn get_symbol(&self, name: &str) -> Result<Symbol, InvariantViolation> {
        self.lookup_symbol(name)
            .ok_or_else(|| InvariantViolation::missing("symbol", name))
    }

    pub(crate) fn add_element_type(&mut self, element_type: Rc<ElementType>) -> anyhow::Result<()> {
        let name = element_type.name.clone();
        if self.contains_element_type(&name) {
            bail!("Element type `{name}` is already registered");
        }
        self.root_scope
            .borrow_mut()
            .element_types
            .insert(name, Rc::clone(&element_type));
        self.element_type_order.push(element_type);
        Ok(())
    }

    #[must_use = "this is a pure check with no side effects"]
    pub(crate) fn contains_element_type(&self, name: &str) -> bool {
        self.lookup_element_type(name).is_some()
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub(crate) fn lookup_element_type(&self, name: &str) -> Option<Rc<ElementType>> {
        self.current_scope.borrow().lookup_element_type(name)
    }

    /// # Errors
    ///
    /// Returns [`InvariantViolation`] if `name` is not a registered element type.
    pub(crate) fn get_element_type(&self, name: &str) -> Result<Rc<ElementType>, InvariantViolation> {
        self.lookup_element_type(name)
            .ok_or_else(|| InvariantViolation::missing("element type", name))
    }

    pub(crate) fn add_function(&mut self, func: Rc<Func>) -> anyhow::Result<()> {
        let name = func.name.clone();
        if self.contains_function(&name) {
            bail!("Function `{name}` is already registered");
        }
        self.root_scope
            .borrow_mut()
            .functions
            .insert(name, Rc::clone(&func));
        self.function_order.push(func);
        Ok(())
    }

    #[must_use = "this is a pure check with no side effects"]
    pub(crate) fn contains_function(&self, name: &str) -> bool {
        self.lookup_function(name).is_some()
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub(crate) fn lookup_function(&self, name: &str) -> Option<Rc<Func>> {
        self.current_scope.borrow().lookup_function(name)
    }

    /// # Errors
    ///
    /// Returns [`InvariantViolation`] if `name` is not a registered function.
    pub(crate) fn get_function(&self, name: &str) -> Result<Rc<Func>, InvariantViolation> {
        self.lookup_function(name)
            .ok_or_else(|| InvariantViolation::missing("function", name))
    }

    /// Registered element types in registration order.
    #[must_use]
    pub(crate) fn element_types(&self) -> &[Rc<ElementType>] {
        &self.element_type_order
    }

    /// Registered functions, intrinsics included, in registration order.
    #[must_use]
    pub(crate) fn functions(&self) -> &[Rc<Func>] {
        &self.function_order
    }
}
