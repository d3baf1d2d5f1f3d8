//! Expression typing rules.
//!
//! Every rule returns the result types of its expression, or `None` when they
//! could not be determined. A `None` from an operand suppresses every check
//! that depends on it, so an error is reported once at the node that caused
//! it.

use std::rc::Rc;

use lattice_ast::nodes::{
    BinaryExpression, ComparisonExpression, DenseTensorLiteral, Expression, FieldReadExpression,
    FunctionCallExpression, Literal, MapExpression, OperatorKind, PrefixUnaryExpression,
    ReadParam, TensorReadExpression, UnaryOperatorKind,
};

use super::{AccessMode, TypeChecker};
use crate::{
    errors::{IdentifierKind, InvariantViolation, RequiredAccess, TypeCheckError},
    literal_shape::infer_shape,
    type_info::{IndexDomain, IndexSet, SetType, TensorType, TupleType, TypeInfo, Var, type_string},
    typed_context::TypedContext,
};

type InferResult = anyhow::Result<Option<Vec<TypeInfo>>>;

/// The tensor of a single-valued, non-boolean tensor result.
fn numeric_tensor(types: &[TypeInfo]) -> Option<&TensorType> {
    match types {
        [TypeInfo::Tensor(tensor)] if tensor.component.is_numeric() => Some(tensor),
        _ => None,
    }
}

fn is_single_boolean(types: &[TypeInfo]) -> bool {
    matches!(types, [ty] if ty.is_boolean())
}

fn is_single_int(types: &[TypeInfo]) -> bool {
    matches!(types, [ty] if ty.is_int())
}

fn single(ty: TypeInfo) -> Option<Vec<TypeInfo>> {
    Some(vec![ty])
}

/// Set type of a variable that was bound as a set.
fn bound_set_type(set: &Var) -> Result<&SetType, InvariantViolation> {
    match &set.ty {
        Some(ty) => ty.to_set(),
        None => Err(InvariantViolation::missing("set type", &set.name)),
    }
}

impl TypeChecker {
    /// Infers the result types of `expression` and records them in `ctx`.
    pub(super) fn infer_expression(
        &mut self,
        expression: &Expression,
        mode: AccessMode,
        ctx: &mut TypedContext,
    ) -> InferResult {
        let types = match expression {
            Expression::Binary(binary) => self.infer_binary(binary, ctx)?,
            Expression::Comparison(comparison) => self.infer_comparison(comparison, ctx)?,
            Expression::PrefixUnary(unary) => self.infer_prefix_unary(unary, ctx)?,
            Expression::Transpose(transpose) => {
                let operand = self.infer_expression(&transpose.expression, AccessMode::Read, ctx)?;
                self.infer_transpose(operand, &transpose.expression)
            }
            Expression::FunctionCall(call) => self.infer_call(call, ctx)?,
            Expression::Map(map) => self.infer_map(map, ctx)?,
            Expression::TensorRead(read) => self.infer_tensor_read(read, mode, ctx)?,
            Expression::FieldRead(read) => self.infer_field_read(read, mode, ctx)?,
            Expression::Parenthesized(paren) => self.infer_expression(&paren.expression, mode, ctx)?,
            Expression::Literal(literal) => self.infer_literal(literal),
            Expression::Identifier(identifier) => {
                let name = &identifier.name;
                if !self.symbol_table.has_symbol(name, false) {
                    if mode != AccessMode::Define {
                        self.report_undeclared(
                            IdentifierKind::VariableOrConstant,
                            name,
                            identifier.location.clone(),
                        );
                    }
                    return Ok(None);
                }
                let symbol = self.symbol_table.get_symbol(name)?;
                let denied = match mode {
                    AccessMode::Read => (!symbol.access.is_readable()).then_some(RequiredAccess::Readable),
                    AccessMode::Write | AccessMode::Define => {
                        (!symbol.access.is_writable()).then_some(RequiredAccess::Writable)
                    }
                };
                if let Some(required) = denied {
                    self.report(TypeCheckError::PermissionViolation {
                        name: name.clone(),
                        required,
                        location: identifier.location.clone(),
                    });
                }
                symbol.var.ty.clone().and_then(single)
            }
        };
        if let Some(types) = &types {
            ctx.set_node_types(expression.id(), types.clone());
        }
        Ok(types)
    }

    fn infer_binary(&mut self, binary: &BinaryExpression, ctx: &mut TypedContext) -> InferResult {
        let left = self.infer_expression(&binary.left, AccessMode::Read, ctx)?;
        let right = self.infer_expression(&binary.right, AccessMode::Read, ctx)?;
        let types = match binary.operator {
            OperatorKind::Or | OperatorKind::And | OperatorKind::Xor => {
                self.check_boolean_operands(left, right, binary)
            }
            OperatorKind::Add | OperatorKind::Sub | OperatorKind::ElwiseMul | OperatorKind::ElwiseDiv => {
                self.check_elementwise(left, right, binary)
            }
            OperatorKind::Mul => self.check_multiplication(left, right, binary),
            OperatorKind::Div => self.check_division(left, right, binary),
            OperatorKind::Exp => {
                self.report(TypeCheckError::UnsupportedConstruct {
                    construct: "exponentiation",
                    location: binary.location.clone(),
                });
                None
            }
        };
        Ok(types)
    }

    fn check_boolean_operands(
        &mut self,
        left: Option<Vec<TypeInfo>>,
        right: Option<Vec<TypeInfo>>,
        binary: &BinaryExpression,
    ) -> Option<Vec<TypeInfo>> {
        for (side, types, operand) in [("left", left, &binary.left), ("right", right, &binary.right)] {
            if let Some(types) = types
                && !is_single_boolean(&types)
            {
                self.report_mismatch(
                    format!(
                        "expected {side} operand of boolean operation to be a boolean but got an operand of type {}",
                        type_string(&types)
                    ),
                    operand.location(),
                );
            }
        }
        single(TypeInfo::boolean())
    }

    /// Checks that both operands are numeric tensors, reporting each operand
    /// that is not. Returns the pair only when both are present and valid.
    fn numeric_operands<'a>(
        &mut self,
        operation: &str,
        left: Option<&'a [TypeInfo]>,
        right: Option<&'a [TypeInfo]>,
        binary: &BinaryExpression,
    ) -> Option<(&'a TensorType, &'a TensorType)> {
        let mut operands = [None, None];
        for (slot, (side, types, operand)) in operands
            .iter_mut()
            .zip([("left", left, &binary.left), ("right", right, &binary.right)])
        {
            let Some(types) = types else {
                continue;
            };
            match numeric_tensor(types) {
                Some(tensor) => *slot = Some(tensor),
                None => self.report_mismatch(
                    format!(
                        "expected {side} operand of {operation} operation to be a numeric tensor but got an operand of type {}",
                        type_string(types)
                    ),
                    operand.location(),
                ),
            }
        }
        match operands {
            [Some(left), Some(right)] => Some((left, right)),
            _ => None,
        }
    }

    fn check_elementwise(
        &mut self,
        left: Option<Vec<TypeInfo>>,
        right: Option<Vec<TypeInfo>>,
        binary: &BinaryExpression,
    ) -> Option<Vec<TypeInfo>> {
        let (ltype, rtype) =
            self.numeric_operands("element-wise", left.as_deref(), right.as_deref(), binary)?;
        let compatible = if ltype.is_scalar() || rtype.is_scalar() {
            ltype.component == rtype.component
        } else {
            ltype == rtype
        };
        if !compatible {
            self.report_mismatch(
                format!(
                    "cannot perform element-wise operation on tensors of type '{ltype}' and type '{rtype}'"
                ),
                binary.location.clone(),
            );
            return None;
        }
        let result = if ltype.is_scalar() { rtype } else { ltype };
        single(TypeInfo::Tensor(result.clone()))
    }

    fn check_multiplication(
        &mut self,
        left: Option<Vec<TypeInfo>>,
        right: Option<Vec<TypeInfo>>,
        binary: &BinaryExpression,
    ) -> Option<Vec<TypeInfo>> {
        let (ltype, rtype) =
            self.numeric_operands("multiplication", left.as_deref(), right.as_deref(), binary)?;
        let location = binary.location.clone();
        if ltype.component != rtype.component {
            self.report_mismatch(
                format!(
                    "cannot multiply tensors containing elements of type '{}' and type '{}'",
                    ltype.component, rtype.component
                ),
                location,
            );
            return None;
        }
        let component = ltype.component;
        let ldims = &ltype.dimensions;
        let rdims = &rtype.dimensions;

        let result = match (ltype.order(), rtype.order()) {
            (0, _) => rtype.clone(),
            (_, 0) => ltype.clone(),
            (1, 1) => {
                if ltype.is_column_vector && rtype.is_column_vector {
                    self.report_mismatch("cannot multiply two column vectors".to_string(), location);
                    return None;
                }
                if !ltype.is_column_vector && !rtype.is_column_vector {
                    self.report_mismatch("cannot multiply two row vectors".to_string(), location);
                    return None;
                }
                if ldims[0] != rdims[0] {
                    self.report_mismatch(
                        format!("cannot multiply vectors of type '{ltype}' and type '{rtype}'"),
                        location,
                    );
                    return None;
                }
                // Column times row is an outer product, row times column an
                // inner product.
                if ltype.is_column_vector {
                    TensorType::new(component, vec![ldims[0].clone(), rdims[0].clone()])
                } else {
                    TensorType::scalar(component)
                }
            }
            (2, 1) => {
                if ldims[1] != rdims[0] {
                    self.report_mismatch(
                        format!(
                            "cannot multiply a matrix of type '{ltype}' by a vector of type '{rtype}'"
                        ),
                        location,
                    );
                    return None;
                }
                if !rtype.is_column_vector {
                    self.report_mismatch(
                        "cannot multiply a matrix by a row vector".to_string(),
                        location,
                    );
                }
                TensorType::with_orientation(component, vec![ldims[0].clone()], true)
            }
            (1, 2) => {
                if ldims[0] != rdims[0] {
                    self.report_mismatch(
                        format!(
                            "cannot multiply a vector of type '{ltype}' by a matrix of type '{rtype}'"
                        ),
                        location,
                    );
                    return None;
                }
                if ltype.is_column_vector {
                    self.report_mismatch(
                        "cannot multiply a column vector by a matrix".to_string(),
                        location,
                    );
                }
                TensorType::new(component, vec![rdims[1].clone()])
            }
            (2, 2) => {
                if ldims[1] != rdims[0] {
                    self.report_mismatch(
                        format!("cannot multiply matrices of type '{ltype}' and type '{rtype}'"),
                        location,
                    );
                    return None;
                }
                TensorType::new(component, vec![ldims[0].clone(), rdims[1].clone()])
            }
            _ => {
                self.report_mismatch(
                    "cannot multiply tensors of order 3 or greater using *".to_string(),
                    location,
                );
                return None;
            }
        };
        single(TypeInfo::Tensor(result))
    }

    fn check_division(
        &mut self,
        left: Option<Vec<TypeInfo>>,
        right: Option<Vec<TypeInfo>>,
        binary: &BinaryExpression,
    ) -> Option<Vec<TypeInfo>> {
        let (ltype, rtype) =
            self.numeric_operands("division", left.as_deref(), right.as_deref(), binary)?;
        if ltype.component != rtype.component {
            self.report_mismatch(
                format!(
                    "cannot divide tensors containing elements of type '{}' and type '{}'",
                    ltype.component, rtype.component
                ),
                binary.location.clone(),
            );
            return None;
        }
        // Policy restriction, not a typing rule: at least one side must be a
        // scalar.
        if !ltype.is_scalar() && !rtype.is_scalar() {
            self.report_mismatch(
                format!(
                    "division of a non-scalar tensor of type '{ltype}' by a non-scalar tensor of type '{rtype}' is not supported"
                ),
                binary.location.clone(),
            );
            return None;
        }
        let result = if ltype.is_scalar() { rtype } else { ltype };
        single(TypeInfo::Tensor(result.clone()))
    }

    fn infer_comparison(&mut self, comparison: &ComparisonExpression, ctx: &mut TypedContext) -> InferResult {
        let mut representative: Option<Vec<TypeInfo>> = None;
        for operand in &comparison.operands {
            let Some(types) = self.infer_expression(operand, AccessMode::Read, ctx)? else {
                continue;
            };
            if !matches!(types.as_slice(), [ty] if ty.is_scalar()) {
                self.report_mismatch(
                    format!(
                        "comparison operations can only be performed on scalar values, not values of type {}",
                        type_string(&types)
                    ),
                    operand.location(),
                );
                continue;
            }
            match &representative {
                None => representative = Some(types),
                Some(first) if *first != types => {
                    self.report_mismatch(
                        format!(
                            "value of type {} cannot be compared to value of type {}",
                            type_string(&types),
                            type_string(first)
                        ),
                        operand.location(),
                    );
                }
                Some(_) => {}
            }
        }
        Ok(single(TypeInfo::boolean()))
    }

    fn infer_prefix_unary(&mut self, unary: &PrefixUnaryExpression, ctx: &mut TypedContext) -> InferResult {
        let operand = self.infer_expression(&unary.expression, AccessMode::Read, ctx)?;
        match unary.operator {
            UnaryOperatorKind::Not => {
                if let Some(types) = operand
                    && !is_single_boolean(&types)
                {
                    self.report_mismatch(
                        format!(
                            "expected a boolean operand but got an operand of type {}",
                            type_string(&types)
                        ),
                        unary.expression.location(),
                    );
                }
                Ok(single(TypeInfo::boolean()))
            }
            UnaryOperatorKind::Neg => {
                let Some(types) = operand else {
                    return Ok(None);
                };
                if numeric_tensor(&types).is_none() {
                    self.report_mismatch(
                        format!(
                            "expected operand of tensor negation to be a numeric tensor but got an operand of type {}",
                            type_string(&types)
                        ),
                        unary.expression.location(),
                    );
                    return Ok(None);
                }
                Ok(Some(types))
            }
        }
    }

    fn infer_transpose(
        &mut self,
        operand: Option<Vec<TypeInfo>>,
        expression: &Expression,
    ) -> Option<Vec<TypeInfo>> {
        let types = operand?;
        let transposed = match types.as_slice() {
            [TypeInfo::Tensor(tensor)] => tensor.transposed(),
            _ => None,
        };
        if transposed.is_none() {
            self.report_mismatch(
                format!(
                    "operand of tensor transpose must be a tensor of order 2 or less, but got an operand of type {}",
                    type_string(&types)
                ),
                expression.location(),
            );
        }
        transposed.map(TypeInfo::Tensor).and_then(single)
    }

    /// Checks an argument expression that must produce exactly one value.
    fn single_argument(&mut self, types: &[TypeInfo], argument: &Expression) -> Option<TypeInfo> {
        match types {
            [ty] => Some(ty.clone()),
            [] => {
                self.report_mismatch(
                    "must pass a non-void value as argument".to_string(),
                    argument.location(),
                );
                None
            }
            many => {
                self.report_mismatch(
                    format!(
                        "cannot pass multiple values of types {} as a single argument",
                        type_string(many)
                    ),
                    argument.location(),
                );
                None
            }
        }
    }

    fn infer_call(&mut self, call: &FunctionCallExpression, ctx: &mut TypedContext) -> InferResult {
        let mut argument_types = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            argument_types.push(self.infer_expression(argument, AccessMode::Read, ctx)?);
        }

        let name = &call.function.name;
        if !self.symbol_table.contains_function(name) {
            self.report_undeclared(IdentifierKind::Function, name, call.function.location.clone());
            return Ok(None);
        }
        let func = self.symbol_table.get_function(name)?;

        if call.arguments.len() != func.arguments.len() {
            // Intrinsics without declared parameters accept any arguments.
            if !(func.is_intrinsic() && func.arguments.is_empty()) {
                self.report(TypeCheckError::ArgumentCountMismatch {
                    function: func.name.clone(),
                    expected: func.arguments.len(),
                    found: call.arguments.len(),
                    location: call.location.clone(),
                });
            }
        } else {
            for ((argument, types), parameter) in
                call.arguments.iter().zip(&argument_types).zip(&func.arguments)
            {
                let Some(types) = types else {
                    continue;
                };
                let Some(actual) = self.single_argument(types, argument) else {
                    continue;
                };
                if let Some(expected) = &parameter.ty
                    && actual != *expected
                {
                    self.report_mismatch(
                        format!(
                            "expected argument of type '{expected}' but got an argument of type '{actual}'"
                        ),
                        argument.location(),
                    );
                }
            }
        }
        Ok(Some(func.result_types()))
    }

    /// `map f(partials) to target` passes the partial actuals, then the
    /// target's element, then for edge sets a tuple of the endpoint elements.
    fn infer_map(&mut self, map: &MapExpression, ctx: &mut TypedContext) -> InferResult {
        let mut actuals: Vec<Option<TypeInfo>> = Vec::with_capacity(map.partial_actuals.len() + 2);
        for partial in &map.partial_actuals {
            let types = self.infer_expression(partial, AccessMode::Read, ctx)?;
            actuals.push(types.and_then(|types| self.single_argument(&types, partial)));
        }

        let function_name = &map.function.name;
        let func = if self.symbol_table.contains_function(function_name) {
            Some(self.symbol_table.get_function(function_name)?)
        } else {
            self.report_undeclared(
                IdentifierKind::Function,
                function_name,
                map.function.location.clone(),
            );
            None
        };

        let target_name = &map.target.name;
        let target = if self.symbol_table.has_symbol(target_name, false) {
            let symbol = self.symbol_table.get_symbol(target_name)?;
            match &symbol.var.ty {
                Some(TypeInfo::Set(_)) => Some(symbol.var),
                Some(_) => {
                    self.report_mismatch(
                        "map operation can only be applied to sets".to_string(),
                        map.target.location.clone(),
                    );
                    None
                }
                None => None,
            }
        } else {
            self.report_undeclared(IdentifierKind::Set, target_name, map.target.location.clone());
            None
        };

        let Some(func) = func else {
            return Ok(None);
        };
        let result = Some(func.result_types());
        let Some(target) = target else {
            return Ok(result);
        };
        let target_set = bound_set_type(&target)?;

        actuals.push(Some((*target_set.element_type).clone()));
        if let Some(first_endpoint) = target_set.endpoints.first()
            && actuals.len() != func.arguments.len()
        {
            let neighbor_set = bound_set_type(first_endpoint)?;
            actuals.push(Some(TypeInfo::Tuple(TupleType {
                element_type: neighbor_set.element_type.clone(),
                length: u32::try_from(target_set.endpoints.len())?,
            })));
        }

        if actuals.len() != func.arguments.len() {
            self.report(TypeCheckError::MapArgumentCountMismatch {
                function: func.name.clone(),
                expected: func.arguments.len(),
                found: actuals.len(),
                location: map.location.clone(),
            });
            return Ok(result);
        }

        for (i, (actual, parameter)) in actuals.iter().zip(&func.arguments).enumerate() {
            let (Some(actual), Some(expected)) = (actual, &parameter.ty) else {
                continue;
            };
            if actual == expected {
                continue;
            }
            let location = map
                .partial_actuals
                .get(i)
                .map_or_else(|| map.target.location.clone(), Expression::location);
            self.report_mismatch(
                format!(
                    "map operation passes argument of type '{actual}' to assembly function but function '{}' expects argument of type '{expected}'",
                    func.name
                ),
                location,
            );
        }
        Ok(result)
    }

    fn infer_tensor_read(
        &mut self,
        read: &TensorReadExpression,
        mode: AccessMode,
        ctx: &mut TypedContext,
    ) -> InferResult {
        let base_mode = if mode == AccessMode::Read {
            AccessMode::Read
        } else {
            AccessMode::Write
        };
        let Some(base) = self.infer_expression(&read.tensor, base_mode, ctx)? else {
            return Ok(None);
        };
        let [base] = base.as_slice() else {
            self.report_mismatch(
                "can only access elements of a single tensor or tuple".to_string(),
                read.tensor.location(),
            );
            return Ok(None);
        };

        match base {
            TypeInfo::Tensor(tensor) => self.read_tensor(tensor, read, ctx),
            TypeInfo::Tuple(tuple) => {
                self.read_tuple(read, ctx)?;
                Ok(single((*tuple.element_type).clone()))
            }
            other => {
                self.report_mismatch(
                    format!("cannot access elements from objects of type '{other}'"),
                    read.tensor.location(),
                );
                Ok(None)
            }
        }
    }

    fn read_tensor(
        &mut self,
        tensor: &TensorType,
        read: &TensorReadExpression,
        ctx: &mut TypedContext,
    ) -> InferResult {
        if tensor.order() != read.indices.len() {
            self.report(TypeCheckError::IndexCountMismatch {
                expected: tensor.order(),
                found: read.indices.len(),
                location: read.location.clone(),
            });
            return Ok(None);
        }

        let outer_dimensions = tensor.outer_dimensions();
        let mut kept: Vec<IndexDomain> = Vec::new();
        for ((index, dimension), outer) in read.indices.iter().zip(&tensor.dimensions).zip(&outer_dimensions) {
            let ReadParam::Expression(index_expression) = index else {
                kept.push(dimension.clone());
                continue;
            };
            let Some(types) = self.infer_expression(index_expression, AccessMode::Read, ctx)? else {
                continue;
            };
            let index_type = match types.as_slice() {
                [ty] => ty,
                [] => {
                    self.report_mismatch(
                        "must pass a non-void value as index".to_string(),
                        index.location(),
                    );
                    continue;
                }
                many => {
                    self.report_mismatch(
                        format!(
                            "cannot pass multiple values of types {} as a single index",
                            type_string(many)
                        ),
                        index.location(),
                    );
                    continue;
                }
            };
            match outer {
                IndexSet::Range(_) => {
                    if !index_type.is_int() {
                        self.report_mismatch(
                            format!(
                                "expected an integral index but got an index of type '{index_type}'"
                            ),
                            index.location(),
                        );
                    }
                }
                IndexSet::Set(set) => {
                    let element_type = &bound_set_type(set)?.element_type;
                    if !index_type.is_int() && **element_type != *index_type {
                        self.report_mismatch(
                            format!(
                                "expected an integral index or an index of type '{element_type}' but got an index of type '{index_type}'"
                            ),
                            index.location(),
                        );
                    }
                }
                IndexSet::Dynamic => {}
            }
        }

        if kept.is_empty() {
            return Ok(single(TypeInfo::Tensor(tensor.block_type())));
        }
        let is_column_vector =
            kept.len() == 1 && read.indices.last().is_some_and(|index| !index.is_slice());
        Ok(single(TypeInfo::Tensor(TensorType::with_orientation(
            tensor.component,
            kept,
            is_column_vector,
        ))))
    }

    fn read_tuple(&mut self, read: &TensorReadExpression, ctx: &mut TypedContext) -> anyhow::Result<()> {
        let [index] = read.indices.as_slice() else {
            self.report(TypeCheckError::TupleIndexCountMismatch {
                found: read.indices.len(),
                location: read.location.clone(),
            });
            return Ok(());
        };
        let ReadParam::Expression(index_expression) = index else {
            self.report_mismatch(
                "tuple access expects an integral index".to_string(),
                index.location(),
            );
            return Ok(());
        };
        if let Some(types) = self.infer_expression(index_expression, AccessMode::Read, ctx)?
            && !is_single_int(&types)
        {
            self.report_mismatch(
                format!(
                    "tuple access expects an integral index but got an index of type {}",
                    type_string(&types)
                ),
                index.location(),
            );
        }
        Ok(())
    }

    fn infer_field_read(
        &mut self,
        read: &FieldReadExpression,
        mode: AccessMode,
        ctx: &mut TypedContext,
    ) -> InferResult {
        let base_mode = if mode == AccessMode::Read {
            AccessMode::Read
        } else {
            AccessMode::Write
        };
        let Some(base) = self.infer_expression(&read.expression, base_mode, ctx)? else {
            return Ok(None);
        };
        let [base] = base.as_slice() else {
            self.report_mismatch(
                "can only access fields of a single set or element".to_string(),
                read.expression.location(),
            );
            return Ok(None);
        };

        let element_type = match base {
            TypeInfo::Element(element) => Rc::clone(element),
            TypeInfo::Set(set) => Rc::clone(set.element_type.to_element()?),
            _ => {
                self.report_mismatch(
                    "field accesses are only valid for sets and elements".to_string(),
                    read.expression.location(),
                );
                return Ok(None);
            }
        };

        let field_name = &read.field.name;
        let Some(field) = element_type.field(field_name) else {
            self.report(TypeCheckError::UndefinedField {
                field: field_name.clone(),
                location: read.field.location.clone(),
            });
            return Ok(None);
        };
        if base.is_element() {
            return Ok(single(field.ty.clone()));
        }

        // A set field is a vector over the set whose blocks are the
        // per-element field values.
        let field_tensor = match &field.ty {
            TypeInfo::Tensor(tensor) if tensor.order() <= 1 => tensor,
            _ => {
                self.report_mismatch(
                    "cannot read from non-scalar and non-vector set fields".to_string(),
                    read.location.clone(),
                );
                return Ok(None);
            }
        };
        let set_index = match read.expression.unparenthesized().as_identifier() {
            Some(identifier) => IndexSet::Set(self.symbol_table.get_symbol(&identifier.name)?.var),
            None => IndexSet::Dynamic,
        };
        let mut index_sets = vec![set_index];
        if let Some(inner) = field_tensor.dimensions.first() {
            index_sets.extend(inner.index_sets.iter().cloned());
        }
        Ok(single(TypeInfo::Tensor(TensorType::with_orientation(
            field_tensor.component,
            vec![IndexDomain::new(index_sets)],
            field_tensor.is_column_vector,
        ))))
    }

    fn infer_literal(&mut self, literal: &Literal) -> Option<Vec<TypeInfo>> {
        match literal {
            Literal::Int(_) => single(TypeInfo::int()),
            Literal::Float(_) => single(TypeInfo::float()),
            Literal::Bool(_) => single(TypeInfo::boolean()),
            Literal::DenseTensor(dense) => self.infer_dense_literal(dense),
        }
    }

    fn infer_dense_literal(&mut self, literal: &DenseTensorLiteral) -> Option<Vec<TypeInfo>> {
        let shape = match infer_shape(literal) {
            Ok(shape) => shape,
            Err(err) => {
                self.report_mismatch(err.to_string(), literal.location());
                return None;
            }
        };
        let dimensions: Vec<IndexDomain> = shape
            .dimensions()
            .into_iter()
            .map(|size| IndexDomain::from(IndexSet::Range(size)))
            .collect();
        let transposed = literal.is_transposed();
        if transposed && dimensions.len() != 1 {
            self.report_mismatch(
                "only one-dimensional tensor literals can be transposed".to_string(),
                literal.location(),
            );
            return None;
        }
        single(TypeInfo::Tensor(TensorType::with_orientation(
            shape.component,
            dimensions,
            transposed,
        )))
    }
}
