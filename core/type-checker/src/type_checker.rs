//! Type Checker Implementation
//!
//! This module contains the checking pass that walks a [`SourceFile`] once,
//! depth first, in definition order:
//!
//! 1. **seed intrinsics** - Register the built-in function prelude
//! 2. **definitions** - Element types, externs, functions and global constants
//!    are checked and registered as they are met, so a definition can only
//!    refer to definitions that precede it
//! 3. **statements and expressions** - Function bodies are checked inside the
//!    function's scope; every expression whose type is inferred is recorded in
//!    the [`TypedContext`]
//!
//! The pass never stops at a user error. Each node reports the errors it can
//! attribute to itself, its type becomes undefined, and everything that
//! depends on that type is skipped without reporting again. Only an
//! [`InvariantViolation`](crate::errors::InvariantViolation) aborts the pass.

mod expressions;

use std::rc::Rc;

use lattice_ast::nodes::{
    Block, ConstantDefinition, Definition, ElementTypeDefinition, Expression, ExternDefinition,
    ForDomain, ForStatement, FunctionDefinition, Identifier, IndexSet as AstIndexSet, Location,
    RangeDomain, SetIndexSet, Statement, Type, TypeSet, TypeTensor, TypeTuple,
};

use crate::{
    diagnostics::DiagnosticCollector,
    errors::{DefinitionKind, IdentifierKind, TypeCheckError},
    intrinsics::intrinsics,
    symbol_table::{Access, SymbolTable},
    type_info::{
        ElementType, Field, Func, FuncKind, IndexDomain, IndexSet, SetType, TensorType, TupleType,
        TypeInfo, Var, type_string,
    },
    typed_context::TypedContext,
};

/// How a variable reference is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AccessMode {
    Read,
    Write,
    /// Bare assignment target: must be writable if it exists, may be
    /// undeclared.
    Define,
}

pub(crate) struct TypeChecker {
    symbol_table: SymbolTable,
    diagnostics: DiagnosticCollector,
    register_intrinsics: bool,
}

impl Default for TypeChecker {
    fn default() -> Self {
        TypeChecker::new(true)
    }
}

impl TypeChecker {
    pub(crate) fn new(register_intrinsics: bool) -> Self {
        Self {
            symbol_table: SymbolTable::default(),
            diagnostics: DiagnosticCollector::default(),
            register_intrinsics,
        }
    }

    /// Checks every definition of the context's source file.
    ///
    /// User errors are collected and moved into `ctx` together with the
    /// populated registries.
    ///
    /// # Errors
    ///
    /// Returns an error only when the checker breaks one of its own
    /// invariants.
    #[tracing::instrument(skip_all)]
    pub(crate) fn infer_types(&mut self, ctx: &mut TypedContext) -> anyhow::Result<()> {
        if self.register_intrinsics {
            for func in intrinsics() {
                self.symbol_table.add_function(Rc::new(func))?;
            }
        }
        let source_file = ctx.source_file();
        for definition in &source_file.definitions {
            match definition {
                Definition::ElementType(element_type) => {
                    self.check_element_type_definition(element_type)?;
                }
                Definition::Extern(extern_definition) => {
                    self.check_extern_definition(extern_definition)?;
                }
                Definition::Function(function_definition) => {
                    self.check_function_definition(function_definition, ctx)?;
                }
                Definition::Constant(constant_definition) => {
                    self.check_constant_definition(constant_definition, ctx)?;
                }
                Definition::Test(test) => {
                    // Tests may call functions declared after them.
                    tracing::trace!(function = %test.function.name, "skipping test definition");
                }
            }
        }
        debug_assert_eq!(self.symbol_table.depth(), 0, "unbalanced scopes");
        tracing::debug!(errors = self.diagnostics.len(), "type checking finished");
        ctx.symbol_table = std::mem::take(&mut self.symbol_table);
        ctx.diagnostics = std::mem::take(&mut self.diagnostics);
        Ok(())
    }

    /// Runs `body` in a fresh scope. The scope is popped on every path out of
    /// `body`, including early `?` returns inside it.
    fn scoped<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.symbol_table.depth();
        self.symbol_table.push_scope();
        let result = body(self);
        self.symbol_table.pop_scope();
        debug_assert_eq!(self.symbol_table.depth(), depth);
        result
    }

    fn report(&mut self, error: TypeCheckError) {
        self.diagnostics.report(error);
    }

    fn report_mismatch(&mut self, message: String, location: Location) {
        self.report(TypeCheckError::TypeMismatch { message, location });
    }

    fn report_undeclared(&mut self, kind: IdentifierKind, name: &str, location: Location) {
        self.report(TypeCheckError::UndeclaredIdentifier {
            kind,
            name: name.to_string(),
            location,
        });
    }

    fn report_multiple_definitions(&mut self, kind: DefinitionKind, name: &str, location: Location) {
        self.report(TypeCheckError::MultipleDefinition {
            kind,
            name: name.to_string(),
            location,
        });
    }
}

// Type annotations
impl TypeChecker {
    fn resolve_type(&mut self, ty: &Type) -> anyhow::Result<Option<TypeInfo>> {
        match ty {
            Type::Scalar(scalar) => Ok(Some(TypeInfo::Tensor(TensorType::scalar(
                scalar.kind.into(),
            )))),
            Type::Tensor(tensor) => self.resolve_tensor_type(tensor),
            Type::Element(element) => {
                if !self.symbol_table.contains_element_type(&element.name) {
                    self.report_undeclared(
                        IdentifierKind::ElementType,
                        &element.name,
                        element.location.clone(),
                    );
                    return Ok(None);
                }
                let element_type = self.symbol_table.get_element_type(&element.name)?;
                Ok(Some(TypeInfo::Element(element_type)))
            }
            Type::Set(set) => self.resolve_set_type(set),
            Type::Tuple(tuple) => self.resolve_tuple_type(tuple),
        }
    }

    fn resolve_set_type(&mut self, set: &TypeSet) -> anyhow::Result<Option<TypeInfo>> {
        let element_type = self.resolve_type(&Type::Element(Rc::clone(&set.element)))?;
        let mut type_checked = element_type.is_some();

        let mut endpoints = Vec::with_capacity(set.endpoints.len());
        for endpoint in &set.endpoints {
            if !self.symbol_table.has_symbol(&endpoint.name, false) {
                self.report_undeclared(IdentifierKind::Set, &endpoint.name, endpoint.location.clone());
                type_checked = false;
                continue;
            }
            let symbol = self.symbol_table.get_symbol(&endpoint.name)?;
            match &symbol.var.ty {
                Some(TypeInfo::Set(_)) => endpoints.push(Rc::clone(&symbol.var)),
                Some(other) => {
                    self.report_mismatch(
                        format!(
                            "expected endpoint to be of set type but got an endpoint of type '{other}'"
                        ),
                        endpoint.location.clone(),
                    );
                    type_checked = false;
                }
                None => type_checked = false,
            }
        }

        let Some(element_type) = element_type.filter(|_| type_checked) else {
            return Ok(None);
        };
        Ok(Some(TypeInfo::Set(SetType {
            element_type: Box::new(element_type),
            endpoints,
        })))
    }

    fn resolve_tuple_type(&mut self, tuple: &TypeTuple) -> anyhow::Result<Option<TypeInfo>> {
        let element_type = self.resolve_type(&Type::Element(Rc::clone(&tuple.element)))?;
        let length = match u32::try_from(tuple.length.value) {
            Ok(length) if length >= 1 => length,
            _ => {
                self.report_mismatch(
                    "tuple must have length greater than or equal to one".to_string(),
                    tuple.length.location.clone(),
                );
                return Ok(None);
            }
        };
        Ok(element_type.map(|element_type| {
            TypeInfo::Tuple(TupleType {
                element_type: Box::new(element_type),
                length,
            })
        }))
    }

    /// Resolves `tensor[index sets](block)`.
    ///
    /// With a scalar block every index set is a dimension of its own. With a
    /// tensor block of order k there must be k index sets, and dimension i
    /// nests index set i outside the block's dimension i.
    fn resolve_tensor_type(&mut self, tensor: &TypeTensor) -> anyhow::Result<Option<TypeInfo>> {
        let block_type = self.resolve_type(&tensor.block_type)?;
        let mut index_sets = Vec::with_capacity(tensor.index_sets.len());
        let mut type_checked = true;
        for index_set in &tensor.index_sets {
            match self.resolve_index_set(index_set)? {
                Some(index_set) => index_sets.push(index_set),
                None => type_checked = false,
            }
        }

        let Some(block_type) = block_type.filter(|_| type_checked) else {
            return Ok(None);
        };
        let block = match block_type {
            TypeInfo::Tensor(block) => block,
            other => {
                self.report_mismatch(
                    format!("expected a tensor block type but got a block of type '{other}'"),
                    tensor.block_type.location(),
                );
                return Ok(None);
            }
        };

        let mut tensor_type = if index_sets.is_empty() {
            block
        } else if block.is_scalar() {
            let dimensions = index_sets.into_iter().map(IndexDomain::from).collect();
            TensorType::new(block.component, dimensions)
        } else if block.order() == index_sets.len() {
            let dimensions = index_sets
                .into_iter()
                .zip(&block.dimensions)
                .map(|(outer, inner)| {
                    let mut nested = vec![outer];
                    nested.extend(inner.index_sets.iter().cloned());
                    IndexDomain::new(nested)
                })
                .collect();
            TensorType::new(block.component, dimensions)
        } else {
            self.report_mismatch(
                "blocked tensor type must contain same number of dimensions as its blocks"
                    .to_string(),
                tensor.location.clone(),
            );
            return Ok(None);
        };

        if tensor.is_column_vector {
            if tensor_type.order() != 1 {
                self.report_mismatch(
                    format!(
                        "tensor type declared with {} dimensions but column vector type must strictly contain one",
                        tensor_type.order()
                    ),
                    tensor.location.clone(),
                );
                return Ok(None);
            }
            tensor_type.is_column_vector = true;
        }
        Ok(Some(TypeInfo::Tensor(tensor_type)))
    }

    fn resolve_index_set(&mut self, index_set: &AstIndexSet) -> anyhow::Result<Option<IndexSet>> {
        match index_set {
            AstIndexSet::Range(range) => Ok(Some(IndexSet::Range(range.range))),
            AstIndexSet::Set(set) => self.resolve_set_index_set(set),
            AstIndexSet::Dynamic(_) => Ok(Some(IndexSet::Dynamic)),
        }
    }

    fn resolve_set_index_set(&mut self, set: &SetIndexSet) -> anyhow::Result<Option<IndexSet>> {
        if !self.symbol_table.has_symbol(&set.name, false) {
            self.report_undeclared(IdentifierKind::Set, &set.name, set.location.clone());
            return Ok(None);
        }
        let symbol = self.symbol_table.get_symbol(&set.name)?;
        match &symbol.var.ty {
            Some(TypeInfo::Set(_)) => Ok(Some(IndexSet::Set(symbol.var))),
            Some(_) => {
                self.report_mismatch(
                    "index set must be a set, a range, or dynamic (*)".to_string(),
                    set.location.clone(),
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

// Definitions
impl TypeChecker {
    fn check_element_type_definition(
        &mut self,
        definition: &ElementTypeDefinition,
    ) -> anyhow::Result<()> {
        let mut fields = Vec::with_capacity(definition.fields.len());
        let mut declared: Vec<&str> = Vec::with_capacity(definition.fields.len());
        for field in &definition.fields {
            let ty = self.resolve_type(&field.ty)?;
            let field_name = &field.name.name;
            if declared.contains(&field_name.as_str()) {
                self.report_multiple_definitions(
                    DefinitionKind::Field,
                    field_name,
                    field.location.clone(),
                );
                continue;
            }
            declared.push(field_name);
            // Fields of undefined type were reported by their annotation.
            if let Some(ty) = ty {
                fields.push(Field {
                    name: field_name.clone(),
                    ty,
                });
            }
        }

        let name = &definition.name.name;
        if self.symbol_table.contains_element_type(name) {
            self.report_multiple_definitions(
                DefinitionKind::ElementType,
                name,
                definition.location.clone(),
            );
            return Ok(());
        }
        self.symbol_table.add_element_type(Rc::new(ElementType {
            name: name.clone(),
            fields,
        }))?;
        tracing::debug!(element_type = %name, "registered element type");
        Ok(())
    }

    fn check_extern_definition(&mut self, definition: &ExternDefinition) -> anyhow::Result<()> {
        let ty = self.resolve_type(&definition.ty)?;
        let name = &definition.name.name;
        if self.symbol_table.has_symbol(name, false) {
            self.report_multiple_definitions(
                DefinitionKind::VariableOrConstant,
                name,
                definition.location.clone(),
            );
            return Ok(());
        }
        self.symbol_table
            .add_symbol(Rc::new(Var::new(name.clone(), ty)), Access::ReadWrite);
        tracing::debug!(name = %name, "registered extern");
        Ok(())
    }

    fn check_function_definition(
        &mut self,
        definition: &FunctionDefinition,
        ctx: &mut TypedContext,
    ) -> anyhow::Result<()> {
        let (arguments, results, type_checked) =
            self.scoped(|checker| -> anyhow::Result<_> {
                let mut type_checked = true;

                let mut arguments = Vec::with_capacity(definition.arguments.len());
                for argument in &definition.arguments {
                    let Some(ty) = checker.resolve_type(&argument.ty)? else {
                        type_checked = false;
                        continue;
                    };
                    let var = Rc::new(Var::new(argument.name.name.clone(), Some(ty)));
                    let access = if argument.is_inout {
                        Access::ReadWrite
                    } else {
                        Access::Read
                    };
                    checker.symbol_table.add_symbol(Rc::clone(&var), access);
                    arguments.push(var);
                }

                let mut results = Vec::with_capacity(definition.results.len());
                for result in &definition.results {
                    let Some(ty) = checker.resolve_type(&result.ty)? else {
                        type_checked = false;
                        continue;
                    };
                    let var = Rc::new(Var::new(result.name.name.clone(), Some(ty)));
                    checker.symbol_table.add_symbol(Rc::clone(&var), Access::ReadWrite);
                    results.push(var);
                }

                checker.check_block(&definition.body, ctx)?;
                Ok((arguments, results, type_checked))
            })?;

        // Undefined argument or result types were reported by their annotations.
        if !type_checked {
            return Ok(());
        }

        let name = &definition.name.name;
        if self.symbol_table.contains_function(name) {
            self.report_multiple_definitions(
                DefinitionKind::FunctionOrProcedure,
                name,
                definition.location.clone(),
            );
            return Ok(());
        }
        self.symbol_table.add_function(Rc::new(Func {
            name: name.clone(),
            arguments,
            results,
            body: Some(Rc::clone(&definition.body)),
            kind: FuncKind::Normal,
        }))?;
        tracing::debug!(function = %name, kind = ?definition.kind, "registered function");
        Ok(())
    }

    fn check_constant_definition(
        &mut self,
        definition: &ConstantDefinition,
        ctx: &mut TypedContext,
    ) -> anyhow::Result<()> {
        self.check_variable_or_constant(
            &definition.name,
            &definition.ty,
            definition.value.as_ref(),
            true,
            &definition.location,
            ctx,
        )
    }

    /// Declares a variable or constant.
    ///
    /// The initializer is checked first and the name is bound before the
    /// initializer is validated, so later statements see the declaration
    /// even when it is ill-typed.
    fn check_variable_or_constant(
        &mut self,
        name: &Identifier,
        ty: &Type,
        value: Option<&Expression>,
        is_constant: bool,
        location: &Location,
        ctx: &mut TypedContext,
    ) -> anyhow::Result<()> {
        let declared_type = self.resolve_type(ty)?;
        let init_types = match value {
            Some(value) => self.infer_expression(value, AccessMode::Read, ctx)?,
            None => None,
        };

        // An earlier declaration of undefined type may be re-bound.
        if self.symbol_table.has_symbol(&name.name, true)
            && self.symbol_table.get_symbol(&name.name)?.var.ty.is_some()
        {
            self.report_multiple_definitions(
                DefinitionKind::VariableOrConstant,
                &name.name,
                location.clone(),
            );
            return Ok(());
        }

        let access = if is_constant {
            Access::Read
        } else {
            Access::ReadWrite
        };
        self.symbol_table.add_symbol(
            Rc::new(Var::new(name.name.clone(), declared_type.clone())),
            access,
        );

        let (Some(declared_type), Some(init_types)) = (declared_type, init_types) else {
            return Ok(());
        };
        if let [init_type] = init_types.as_slice()
            && *init_type == declared_type
        {
            return Ok(());
        }

        if let (Some(declared), [TypeInfo::Tensor(init)]) =
            (declared_type.as_tensor(), init_types.as_slice())
        {
            // A scalar initializes every component of a tensor.
            if init.is_scalar() && declared.component == init.component {
                return Ok(());
            }
            if is_constant && constant_shapes_match(declared, init) {
                return Ok(());
            }
        }

        self.report_mismatch(
            format!(
                "cannot initialize a variable or constant of type {} with an expression of type {}",
                type_string(std::slice::from_ref(&declared_type)),
                type_string(&init_types)
            ),
            location.clone(),
        );
        Ok(())
    }
}

/// Constants accept an initializer with the same block type whose outer
/// dimensions are equal once leading size-1 ranges are stripped from both
/// sides. Only leading dimensions are stripped, and the remainders must have
/// the same length.
fn constant_shapes_match(declared: &TensorType, init: &TensorType) -> bool {
    if declared.block_type() != init.block_type() {
        return false;
    }
    let declared_dims = declared.outer_dimensions();
    let init_dims = init.outer_dimensions();
    strip_unit_ranges(&declared_dims) == strip_unit_ranges(&init_dims)
}

fn strip_unit_ranges(dimensions: &[IndexSet]) -> &[IndexSet] {
    let first_non_unit = dimensions
        .iter()
        .position(|index_set| *index_set != IndexSet::Range(1))
        .unwrap_or(dimensions.len());
    &dimensions[first_non_unit..]
}

// Statements
impl TypeChecker {
    fn check_block(&mut self, block: &Block, ctx: &mut TypedContext) -> anyhow::Result<()> {
        for statement in &block.statements {
            self.check_statement(statement, ctx)?;
        }
        Ok(())
    }

    fn check_statement(&mut self, statement: &Statement, ctx: &mut TypedContext) -> anyhow::Result<()> {
        match statement {
            Statement::VariableDefinition(definition) => self.check_variable_or_constant(
                &definition.name,
                &definition.ty,
                definition.value.as_ref(),
                false,
                &definition.location,
                ctx,
            ),
            Statement::ConstantDefinition(definition) => self.check_constant_definition(definition, ctx),
            Statement::While(while_statement) => {
                let condition_types =
                    self.infer_expression(&while_statement.condition, AccessMode::Read, ctx)?;
                self.scoped(|checker| checker.check_block(&while_statement.body, ctx))?;
                self.check_condition(condition_types, &while_statement.condition);
                Ok(())
            }
            Statement::If(if_statement) => {
                let condition_types =
                    self.infer_expression(&if_statement.condition, AccessMode::Read, ctx)?;
                self.scoped(|checker| checker.check_block(&if_statement.if_arm, ctx))?;
                if let Some(else_arm) = &if_statement.else_arm {
                    self.scoped(|checker| checker.check_block(else_arm, ctx))?;
                }
                self.check_condition(condition_types, &if_statement.condition);
                Ok(())
            }
            Statement::For(for_statement) => {
                self.scoped(|checker| checker.check_for_statement(for_statement, ctx))
            }
            Statement::Print(print_statement) => {
                let types = self.infer_expression(&print_statement.expression, AccessMode::Read, ctx)?;
                if let Some(types) = types
                    && !matches!(types.as_slice(), [TypeInfo::Tensor(_)])
                {
                    self.report_mismatch(
                        format!("cannot print an expression of type {}", type_string(&types)),
                        print_statement.expression.location(),
                    );
                }
                Ok(())
            }
            Statement::Assign(assign_statement) => self.check_assignment(
                &assign_statement.targets,
                &assign_statement.value,
                &assign_statement.location,
                ctx,
            ),
            Statement::Expression(expression_statement) => {
                self.infer_expression(&expression_statement.expression, AccessMode::Read, ctx)?;
                Ok(())
            }
        }
    }

    fn check_condition(&mut self, types: Option<Vec<TypeInfo>>, condition: &Expression) {
        if let Some(types) = types
            && !matches!(types.as_slice(), [ty] if ty.is_boolean())
        {
            self.report_mismatch(
                format!(
                    "expected a boolean conditional expression but got an expression of type {}",
                    type_string(&types)
                ),
                condition.location(),
            );
        }
    }

    /// Runs inside the loop's scope.
    fn check_for_statement(
        &mut self,
        for_statement: &ForStatement,
        ctx: &mut TypedContext,
    ) -> anyhow::Result<()> {
        match &for_statement.domain {
            ForDomain::Range(range) => self.check_range_domain(range, ctx)?,
            ForDomain::IndexSet(domain) => {
                self.resolve_set_index_set(&domain.set)?;
            }
        }
        let loop_variable = Rc::new(Var::new(
            for_statement.loop_variable.name.clone(),
            Some(TypeInfo::int()),
        ));
        self.symbol_table.add_symbol(loop_variable, Access::Read);
        self.check_block(&for_statement.body, ctx)
    }

    fn check_range_domain(&mut self, range: &RangeDomain, ctx: &mut TypedContext) -> anyhow::Result<()> {
        let lower = self.infer_expression(&range.lower, AccessMode::Read, ctx)?;
        let upper = self.infer_expression(&range.upper, AccessMode::Read, ctx)?;
        for (bound, types, expression) in [("lower", lower, &range.lower), ("upper", upper, &range.upper)] {
            if let Some(types) = types
                && !matches!(types.as_slice(), [ty] if ty.is_int())
            {
                self.report_mismatch(
                    format!(
                        "expected {bound} bound of for-loop range to be integral but got an expression of type {}",
                        type_string(&types)
                    ),
                    expression.location(),
                );
            }
        }
        Ok(())
    }

    fn check_assignment(
        &mut self,
        targets: &[Expression],
        value: &Expression,
        location: &Location,
        ctx: &mut TypedContext,
    ) -> anyhow::Result<()> {
        let value_types = self.infer_expression(value, AccessMode::Read, ctx)?;

        let mut target_types = Vec::with_capacity(targets.len());
        for target in targets {
            let mode = if target.as_identifier().is_some() {
                AccessMode::Define
            } else {
                AccessMode::Write
            };
            let types = self.infer_expression(target, mode, ctx)?;
            target_types.push(match types.as_deref() {
                Some([ty]) => Some(ty.clone()),
                _ => None,
            });
        }

        let mut type_checked = value_types.is_some();
        if let Some(values) = &value_types
            && values.len() != targets.len()
        {
            self.report(TypeCheckError::AssignmentArityMismatch {
                values: values.len(),
                targets: targets.len(),
                location: location.clone(),
            });
            type_checked = false;
        }

        if type_checked && let Some(values) = &value_types {
            for ((target, target_type), value_type) in targets.iter().zip(&target_types).zip(values) {
                let Some(target_type) = target_type else {
                    continue;
                };
                if target_type == value_type || scalar_fills_tensor(target_type, value_type) {
                    continue;
                }
                self.report_mismatch(
                    format!(
                        "cannot assign a value of type '{value_type}' to a target of type '{target_type}'"
                    ),
                    target.location(),
                );
                type_checked = false;
            }
        }

        // First assignment to a bare name declares it.
        for (i, target) in targets.iter().enumerate() {
            let Some(identifier) = target.as_identifier() else {
                continue;
            };
            if self.symbol_table.has_symbol(&identifier.name, false) {
                continue;
            }
            let ty = value_types
                .as_ref()
                .filter(|_| type_checked)
                .and_then(|values| values.get(i).cloned());
            self.symbol_table
                .add_symbol(Rc::new(Var::new(identifier.name.clone(), ty)), Access::ReadWrite);
        }
        Ok(())
    }
}

/// A scalar may be assigned to a tensor with the same component type.
fn scalar_fills_tensor(target: &TypeInfo, value: &TypeInfo) -> bool {
    match (target, value) {
        (TypeInfo::Tensor(target), TypeInfo::Tensor(value)) => {
            value.is_scalar() && target.component == value.component
        }
        _ => false,
    }
}
