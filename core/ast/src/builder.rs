//! Programmatic AST builder.
//!
//! The `Builder` constructs typed AST nodes for front ends and tests that
//! produce trees without going through source text. It handles:
//!
//! - Assigning unique sequential IDs to each node
//! - Stamping every node with the builder's current source position
//! - Wrapping nodes into the enum variants the checker matches on
//!
//! # Example
//!
//! ```
//! use lattice_ast::builder::Builder;
//! use lattice_ast::nodes::OperatorKind;
//!
//! let mut b = Builder::new();
//! b.at(1, 1);
//! let body = vec![b.assign(
//!     vec![b.var("y")],
//!     b.binary(b.var("x"), OperatorKind::Add, b.int(1)),
//! )];
//! let f = b.function(
//!     "f",
//!     vec![b.argument("x", b.int_type())],
//!     vec![b.result("y", b.int_type())],
//!     body,
//! );
//! let source_file = b.source_file(vec![f]);
//! assert_eq!(source_file.definitions.len(), 1);
//! ```
//!
//! # Node ID Assignment
//!
//! Node IDs are assigned sequentially starting from 1 using an atomic counter:
//!
//! - **Unique per process**: two builders never hand out the same ID
//! - **Zero is reserved**: ID 0 represents invalid/uninitialized nodes
//!
//! # Locations
//!
//! `Builder::at` moves the cursor to a single point; `Builder::span` sets a
//! full source range, offsets included. Every node created afterwards carries
//! that location until the cursor moves again.

use std::{
    rc::Rc,
    sync::atomic::{AtomicU32, Ordering},
};

use crate::nodes::{
    Argument, AssignStatement, BinaryExpression, Block, BoolLiteral, ComparisonExpression,
    ComparisonOperatorKind, ConstantDefinition, Definition, DenseTensorLiteral, DynamicIndexSet,
    ElementTypeDefinition, Expression, ExpressionStatement, ExternDefinition, FieldDefinition,
    FieldReadExpression, FloatLiteral, FloatVectorLiteral, ForDomain, ForStatement,
    FunctionCallExpression, FunctionDefinition, FunctionKind, Identifier, IfStatement, IndexSet,
    IndexSetDomain, IntLiteral, IntVectorLiteral, Literal, Location, MapExpression,
    NestedTensorLiteral, OperatorKind, ParenthesizedExpression, PrefixUnaryExpression,
    PrintStatement, RangeDomain, RangeIndexSet, ReadParam, ResultDefinition, ScalarTypeKind,
    SetIndexSet, SliceParam, SourceFile, Statement, TensorReadExpression, TestDefinition,
    TransposeExpression, Type, TypeElement, TypeScalar, TypeSet, TypeTensor, TypeTuple,
    UnaryOperatorKind, VariableDefinitionStatement, WhileStatement,
};

#[derive(Debug, Clone)]
pub struct Builder {
    cursor: Location,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cursor: Location::new(0, 0, 1, 1, 1, 1),
        }
    }

    /// Moves the source position stamped on subsequently created nodes.
    pub fn at(&mut self, line: u32, column: u32) -> &mut Self {
        self.cursor = Location::new(0, 0, line, column, line, column);
        self
    }

    /// Stamps subsequently created nodes with the whole `location` range.
    pub fn span(&mut self, location: Location) -> &mut Self {
        self.cursor = location;
        self
    }

    #[must_use]
    pub fn source_file(&self, definitions: Vec<Definition>) -> Rc<SourceFile> {
        Rc::new(SourceFile {
            id: Self::get_node_id(),
            location: self.location(),
            definitions,
        })
    }

    #[must_use]
    pub fn identifier(&self, name: &str) -> Rc<Identifier> {
        Rc::new(Identifier {
            id: Self::get_node_id(),
            location: self.location(),
            name: name.to_string(),
        })
    }

    // Definitions

    #[must_use]
    pub fn element_type(&self, name: &str, fields: Vec<(&str, Type)>) -> Definition {
        let fields = fields
            .into_iter()
            .map(|(field_name, ty)| {
                Rc::new(FieldDefinition {
                    id: Self::get_node_id(),
                    location: self.location(),
                    name: self.identifier(field_name),
                    ty,
                })
            })
            .collect();
        Definition::ElementType(Rc::new(ElementTypeDefinition {
            id: Self::get_node_id(),
            location: self.location(),
            name: self.identifier(name),
            fields,
        }))
    }

    #[must_use]
    pub fn extern_definition(&self, name: &str, ty: Type) -> Definition {
        Definition::Extern(Rc::new(ExternDefinition {
            id: Self::get_node_id(),
            location: self.location(),
            name: self.identifier(name),
            ty,
        }))
    }

    #[must_use]
    pub fn function(
        &self,
        name: &str,
        arguments: Vec<Rc<Argument>>,
        results: Vec<Rc<ResultDefinition>>,
        body: Vec<Statement>,
    ) -> Definition {
        self.function_of_kind(FunctionKind::Function, name, arguments, results, body)
    }

    #[must_use]
    pub fn procedure(
        &self,
        name: &str,
        arguments: Vec<Rc<Argument>>,
        results: Vec<Rc<ResultDefinition>>,
        body: Vec<Statement>,
    ) -> Definition {
        self.function_of_kind(FunctionKind::Procedure, name, arguments, results, body)
    }

    fn function_of_kind(
        &self,
        kind: FunctionKind,
        name: &str,
        arguments: Vec<Rc<Argument>>,
        results: Vec<Rc<ResultDefinition>>,
        body: Vec<Statement>,
    ) -> Definition {
        Definition::Function(Rc::new(FunctionDefinition {
            id: Self::get_node_id(),
            location: self.location(),
            kind,
            name: self.identifier(name),
            arguments,
            results,
            body: self.block(body),
        }))
    }

    #[must_use]
    pub fn argument(&self, name: &str, ty: Type) -> Rc<Argument> {
        self.argument_with_mode(name, ty, false)
    }

    #[must_use]
    pub fn inout_argument(&self, name: &str, ty: Type) -> Rc<Argument> {
        self.argument_with_mode(name, ty, true)
    }

    fn argument_with_mode(&self, name: &str, ty: Type, is_inout: bool) -> Rc<Argument> {
        Rc::new(Argument {
            id: Self::get_node_id(),
            location: self.location(),
            name: self.identifier(name),
            is_inout,
            ty,
        })
    }

    #[must_use]
    pub fn result(&self, name: &str, ty: Type) -> Rc<ResultDefinition> {
        Rc::new(ResultDefinition {
            id: Self::get_node_id(),
            location: self.location(),
            name: self.identifier(name),
            ty,
        })
    }

    #[must_use]
    pub fn global_constant(&self, name: &str, ty: Type, value: Option<Expression>) -> Definition {
        Definition::Constant(self.constant_definition(name, ty, value))
    }

    #[must_use]
    pub fn test(&self, function: &str, arguments: Vec<Expression>, expected: Expression) -> Definition {
        Definition::Test(Rc::new(TestDefinition {
            id: Self::get_node_id(),
            location: self.location(),
            function: self.identifier(function),
            arguments,
            expected,
        }))
    }

    // Statements

    #[must_use]
    pub fn block(&self, statements: Vec<Statement>) -> Rc<Block> {
        Rc::new(Block {
            id: Self::get_node_id(),
            location: self.location(),
            statements,
        })
    }

    #[must_use]
    pub fn variable(&self, name: &str, ty: Type, value: Option<Expression>) -> Statement {
        Statement::VariableDefinition(Rc::new(VariableDefinitionStatement {
            id: Self::get_node_id(),
            location: self.location(),
            name: self.identifier(name),
            ty,
            value,
        }))
    }

    #[must_use]
    pub fn constant(&self, name: &str, ty: Type, value: Option<Expression>) -> Statement {
        Statement::ConstantDefinition(self.constant_definition(name, ty, value))
    }

    fn constant_definition(
        &self,
        name: &str,
        ty: Type,
        value: Option<Expression>,
    ) -> Rc<ConstantDefinition> {
        Rc::new(ConstantDefinition {
            id: Self::get_node_id(),
            location: self.location(),
            name: self.identifier(name),
            ty,
            value,
        })
    }

    #[must_use]
    pub fn while_loop(&self, condition: Expression, body: Vec<Statement>) -> Statement {
        Statement::While(Rc::new(WhileStatement {
            id: Self::get_node_id(),
            location: self.location(),
            condition,
            body: self.block(body),
        }))
    }

    #[must_use]
    pub fn if_else(
        &self,
        condition: Expression,
        if_arm: Vec<Statement>,
        else_arm: Option<Vec<Statement>>,
    ) -> Statement {
        Statement::If(Rc::new(IfStatement {
            id: Self::get_node_id(),
            location: self.location(),
            condition,
            if_arm: self.block(if_arm),
            else_arm: else_arm.map(|statements| self.block(statements)),
        }))
    }

    #[must_use]
    pub fn for_range(
        &self,
        loop_variable: &str,
        lower: Expression,
        upper: Expression,
        body: Vec<Statement>,
    ) -> Statement {
        let domain = ForDomain::Range(Rc::new(RangeDomain {
            id: Self::get_node_id(),
            location: self.location(),
            lower,
            upper,
        }));
        self.for_loop(loop_variable, domain, body)
    }

    #[must_use]
    pub fn for_set(&self, loop_variable: &str, set: &str, body: Vec<Statement>) -> Statement {
        let domain = ForDomain::IndexSet(Rc::new(IndexSetDomain {
            id: Self::get_node_id(),
            location: self.location(),
            set: self.set_index_set_node(set),
        }));
        self.for_loop(loop_variable, domain, body)
    }

    fn for_loop(&self, loop_variable: &str, domain: ForDomain, body: Vec<Statement>) -> Statement {
        Statement::For(Rc::new(ForStatement {
            id: Self::get_node_id(),
            location: self.location(),
            loop_variable: self.identifier(loop_variable),
            domain,
            body: self.block(body),
        }))
    }

    #[must_use]
    pub fn print(&self, expression: Expression) -> Statement {
        Statement::Print(Rc::new(PrintStatement {
            id: Self::get_node_id(),
            location: self.location(),
            expression,
        }))
    }

    #[must_use]
    pub fn assign(&self, targets: Vec<Expression>, value: Expression) -> Statement {
        Statement::Assign(Rc::new(AssignStatement {
            id: Self::get_node_id(),
            location: self.location(),
            targets,
            value,
        }))
    }

    #[must_use]
    pub fn expression_statement(&self, expression: Expression) -> Statement {
        Statement::Expression(Rc::new(ExpressionStatement {
            id: Self::get_node_id(),
            location: self.location(),
            expression,
        }))
    }

    // Expressions

    #[must_use]
    pub fn var(&self, name: &str) -> Expression {
        Expression::Identifier(self.identifier(name))
    }

    #[must_use]
    pub fn binary(&self, left: Expression, operator: OperatorKind, right: Expression) -> Expression {
        Expression::Binary(Rc::new(BinaryExpression {
            id: Self::get_node_id(),
            location: self.location(),
            left,
            operator,
            right,
        }))
    }

    #[must_use]
    pub fn compare(
        &self,
        operands: Vec<Expression>,
        operators: Vec<ComparisonOperatorKind>,
    ) -> Expression {
        Expression::Comparison(Rc::new(ComparisonExpression {
            id: Self::get_node_id(),
            location: self.location(),
            operands,
            operators,
        }))
    }

    #[must_use]
    pub fn unary(&self, operator: UnaryOperatorKind, expression: Expression) -> Expression {
        Expression::PrefixUnary(Rc::new(PrefixUnaryExpression {
            id: Self::get_node_id(),
            location: self.location(),
            expression,
            operator,
        }))
    }

    #[must_use]
    pub fn transpose(&self, expression: Expression) -> Expression {
        Expression::Transpose(Rc::new(TransposeExpression {
            id: Self::get_node_id(),
            location: self.location(),
            expression,
        }))
    }

    #[must_use]
    pub fn call(&self, function: &str, arguments: Vec<Expression>) -> Expression {
        Expression::FunctionCall(Rc::new(FunctionCallExpression {
            id: Self::get_node_id(),
            location: self.location(),
            function: self.identifier(function),
            arguments,
        }))
    }

    #[must_use]
    pub fn map(&self, function: &str, partial_actuals: Vec<Expression>, target: &str) -> Expression {
        Expression::Map(Rc::new(MapExpression {
            id: Self::get_node_id(),
            location: self.location(),
            function: self.identifier(function),
            partial_actuals,
            target: self.identifier(target),
        }))
    }

    #[must_use]
    pub fn tensor_read(&self, tensor: Expression, indices: Vec<ReadParam>) -> Expression {
        Expression::TensorRead(Rc::new(TensorReadExpression {
            id: Self::get_node_id(),
            location: self.location(),
            tensor,
            indices,
        }))
    }

    #[must_use]
    pub fn slice(&self) -> ReadParam {
        ReadParam::Slice(Rc::new(SliceParam {
            id: Self::get_node_id(),
            location: self.location(),
        }))
    }

    #[must_use]
    pub fn index(&self, expression: Expression) -> ReadParam {
        ReadParam::Expression(expression)
    }

    #[must_use]
    pub fn field_read(&self, expression: Expression, field: &str) -> Expression {
        Expression::FieldRead(Rc::new(FieldReadExpression {
            id: Self::get_node_id(),
            location: self.location(),
            expression,
            field: self.identifier(field),
        }))
    }

    #[must_use]
    pub fn parenthesized(&self, expression: Expression) -> Expression {
        Expression::Parenthesized(Rc::new(ParenthesizedExpression {
            id: Self::get_node_id(),
            location: self.location(),
            expression,
        }))
    }

    // Literals

    #[must_use]
    pub fn int(&self, value: i64) -> Expression {
        Expression::Literal(Literal::Int(self.int_literal(value)))
    }

    fn int_literal(&self, value: i64) -> Rc<IntLiteral> {
        Rc::new(IntLiteral {
            id: Self::get_node_id(),
            location: self.location(),
            value,
        })
    }

    #[must_use]
    pub fn float(&self, value: f64) -> Expression {
        Expression::Literal(Literal::Float(Rc::new(FloatLiteral {
            id: Self::get_node_id(),
            location: self.location(),
            value,
        })))
    }

    #[must_use]
    pub fn boolean(&self, value: bool) -> Expression {
        Expression::Literal(Literal::Bool(Rc::new(BoolLiteral {
            id: Self::get_node_id(),
            location: self.location(),
            value,
        })))
    }

    #[must_use]
    pub fn int_vector(&self, values: Vec<i64>, transposed: bool) -> DenseTensorLiteral {
        DenseTensorLiteral::IntVector(Rc::new(IntVectorLiteral {
            id: Self::get_node_id(),
            location: self.location(),
            values,
            transposed,
        }))
    }

    #[must_use]
    pub fn float_vector(&self, values: Vec<f64>, transposed: bool) -> DenseTensorLiteral {
        DenseTensorLiteral::FloatVector(Rc::new(FloatVectorLiteral {
            id: Self::get_node_id(),
            location: self.location(),
            values,
            transposed,
        }))
    }

    #[must_use]
    pub fn nested_tensor(
        &self,
        elements: Vec<DenseTensorLiteral>,
        transposed: bool,
    ) -> DenseTensorLiteral {
        DenseTensorLiteral::Nested(Rc::new(NestedTensorLiteral {
            id: Self::get_node_id(),
            location: self.location(),
            elements,
            transposed,
        }))
    }

    #[must_use]
    pub fn dense(&self, literal: DenseTensorLiteral) -> Expression {
        Expression::Literal(Literal::DenseTensor(literal))
    }

    // Types

    #[must_use]
    pub fn int_type(&self) -> Type {
        self.scalar_type(ScalarTypeKind::Int)
    }

    #[must_use]
    pub fn float_type(&self) -> Type {
        self.scalar_type(ScalarTypeKind::Float)
    }

    #[must_use]
    pub fn bool_type(&self) -> Type {
        self.scalar_type(ScalarTypeKind::Bool)
    }

    fn scalar_type(&self, kind: ScalarTypeKind) -> Type {
        Type::Scalar(Rc::new(TypeScalar {
            id: Self::get_node_id(),
            location: self.location(),
            kind,
        }))
    }

    /// `tensor[index_sets](block_type)`, a row vector when it has one dimension.
    #[must_use]
    pub fn tensor_type(&self, index_sets: Vec<IndexSet>, block_type: Type) -> Type {
        self.tensor_type_with_orientation(index_sets, block_type, false)
    }

    /// `tensor[index_sets](block_type)'`
    #[must_use]
    pub fn column_vector_type(&self, index_sets: Vec<IndexSet>, block_type: Type) -> Type {
        self.tensor_type_with_orientation(index_sets, block_type, true)
    }

    fn tensor_type_with_orientation(
        &self,
        index_sets: Vec<IndexSet>,
        block_type: Type,
        is_column_vector: bool,
    ) -> Type {
        Type::Tensor(Rc::new(TypeTensor {
            id: Self::get_node_id(),
            location: self.location(),
            index_sets,
            block_type,
            is_column_vector,
        }))
    }

    #[must_use]
    pub fn element_type_ref(&self, name: &str) -> Type {
        Type::Element(self.element_type_node(name))
    }

    fn element_type_node(&self, name: &str) -> Rc<TypeElement> {
        Rc::new(TypeElement {
            id: Self::get_node_id(),
            location: self.location(),
            name: name.to_string(),
        })
    }

    #[must_use]
    pub fn set_type(&self, element: &str, endpoints: &[&str]) -> Type {
        Type::Set(Rc::new(TypeSet {
            id: Self::get_node_id(),
            location: self.location(),
            element: self.element_type_node(element),
            endpoints: endpoints
                .iter()
                .map(|endpoint| self.identifier(endpoint))
                .collect(),
        }))
    }

    #[must_use]
    pub fn tuple_type(&self, element: &str, length: i64) -> Type {
        Type::Tuple(Rc::new(TypeTuple {
            id: Self::get_node_id(),
            location: self.location(),
            element: self.element_type_node(element),
            length: self.int_literal(length),
        }))
    }

    #[must_use]
    pub fn range_index_set(&self, range: u32) -> IndexSet {
        IndexSet::Range(Rc::new(RangeIndexSet {
            id: Self::get_node_id(),
            location: self.location(),
            range,
        }))
    }

    #[must_use]
    pub fn set_index_set(&self, name: &str) -> IndexSet {
        IndexSet::Set(self.set_index_set_node(name))
    }

    fn set_index_set_node(&self, name: &str) -> Rc<SetIndexSet> {
        Rc::new(SetIndexSet {
            id: Self::get_node_id(),
            location: self.location(),
            name: name.to_string(),
        })
    }

    #[must_use]
    pub fn dynamic_index_set(&self) -> IndexSet {
        IndexSet::Dynamic(Rc::new(DynamicIndexSet {
            id: Self::get_node_id(),
            location: self.location(),
        }))
    }

    /// Generate a unique node ID using an atomic counter.
    ///
    /// Uses a global atomic counter to ensure unique IDs across all AST nodes.
    /// Starting from 1 (0 is reserved as invalid/uninitialized).
    fn get_node_id() -> u32 {
        static COUNTER: AtomicU32 = AtomicU32::new(1);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }

    fn location(&self) -> Location {
        self.cursor.clone()
    }
}
