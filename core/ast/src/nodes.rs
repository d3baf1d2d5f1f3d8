use core::fmt;
use std::{
    fmt::{Display, Formatter},
    rc::Rc,
};

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Location {
    pub offset_start: u32,
    pub offset_end: u32,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    #[must_use]
    pub fn new(
        offset_start: u32,
        offset_end: u32,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            offset_start,
            offset_end,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

#[macro_export]
macro_rules! ast_node {
    (
        $(#[$outer:meta])*
        $struct_vis:vis struct $name:ident {
            $(
                $(#[$field_attr:meta])*
                $field_vis:vis $field_name:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, PartialEq, Debug)]
        $struct_vis struct $name {
            pub id: u32,
            pub location: $crate::nodes::Location,
            $(
                $(#[$field_attr])*
                $field_vis $field_name : $field_ty,
            )*
        }
    };
}

macro_rules! ast_nodes {
    (
        $(
            $(#[$outer:meta])*
            $struct_vis:vis struct $name:ident { $($fields:tt)* }
        )+
    ) => {
        $(
            ast_node! {
                $(#[$outer])*
                $struct_vis struct $name { $($fields)* }
            }
        )+
    };
}

macro_rules! ast_enum {
    (
        $(#[$outer:meta])*
        $enum_vis:vis enum $name:ident {
            $(
                $(#[$arm_attr:meta])*
                $(@$conv:ident)? $arm:ident $( ( $($tuple:tt)* ) )? $( { $($struct:tt)* } )? ,
            )*
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, PartialEq, Debug)]
        $enum_vis enum $name {
            $(
                $(#[$arm_attr])*
                $arm $( ( $($tuple)* ) )? $( { $($struct)* } )? ,
            )*
        }

        impl $name {

            #[must_use]
            pub fn id(&self) -> u32 {
                match self {
                    $(
                        $name::$arm(n, ..) => { ast_enum!(@id_arm n, $($conv)?) }
                    )*
                }
            }

            #[must_use]
            pub fn location(&self) -> Location {
                match self {
                    $(
                        $name::$arm(n, ..) => { ast_enum!(@location_arm n, $($conv)?) }
                    )*
                }
            }
        }
    };

    (@id_arm $inner:ident, inner_enum) => {
        $inner.id()
    };

    (@id_arm $inner:ident, ) => {
        $inner.id
    };

    (@location_arm $inner:ident, inner_enum) => {
        $inner.location()
    };

    (@location_arm $inner:ident, ) => {
        $inner.location.clone()
    };
}

macro_rules! ast_enums {
    (
        $(
            $(#[$outer:meta])*
            $enum_vis:vis enum $name:ident { $($arms:tt)* }
        )+
    ) => {
        $(
            ast_enum! {
                $(#[$outer])*
                $enum_vis enum $name { $($arms)* }
            }
        )+

        #[derive(Clone, Debug)]
        pub enum AstNode {
            $(
                $name($name),
            )+
        }

        impl AstNode {
            #[must_use]
            pub fn id(&self) -> u32 {
                match self {
                    $(
                        AstNode::$name(node) => node.id(),
                    )+
                }
            }

            #[must_use]
            pub fn start_line(&self) -> u32 {
                match self {
                    $(
                        AstNode::$name(node) => node.location().start_line,
                    )+
                }
            }
        }
    };
}

ast_enums! {

    pub enum Definition {
        ElementType(Rc<ElementTypeDefinition>),
        Extern(Rc<ExternDefinition>),
        Function(Rc<FunctionDefinition>),
        Constant(Rc<ConstantDefinition>),
        Test(Rc<TestDefinition>),
    }

    pub enum Statement {
        VariableDefinition(Rc<VariableDefinitionStatement>),
        ConstantDefinition(Rc<ConstantDefinition>),
        While(Rc<WhileStatement>),
        If(Rc<IfStatement>),
        For(Rc<ForStatement>),
        Print(Rc<PrintStatement>),
        Assign(Rc<AssignStatement>),
        Expression(Rc<ExpressionStatement>),
    }

    pub enum ForDomain {
        Range(Rc<RangeDomain>),
        IndexSet(Rc<IndexSetDomain>),
    }

    pub enum Expression {
        Binary(Rc<BinaryExpression>),
        Comparison(Rc<ComparisonExpression>),
        PrefixUnary(Rc<PrefixUnaryExpression>),
        Transpose(Rc<TransposeExpression>),
        FunctionCall(Rc<FunctionCallExpression>),
        Map(Rc<MapExpression>),
        TensorRead(Rc<TensorReadExpression>),
        FieldRead(Rc<FieldReadExpression>),
        Parenthesized(Rc<ParenthesizedExpression>),
        @inner_enum Literal(Literal),
        Identifier(Rc<Identifier>),
    }

    pub enum ReadParam {
        Slice(Rc<SliceParam>),
        @inner_enum Expression(Expression),
    }

    pub enum Literal {
        Int(Rc<IntLiteral>),
        Float(Rc<FloatLiteral>),
        Bool(Rc<BoolLiteral>),
        @inner_enum DenseTensor(DenseTensorLiteral),
    }

    pub enum DenseTensorLiteral {
        IntVector(Rc<IntVectorLiteral>),
        FloatVector(Rc<FloatVectorLiteral>),
        Nested(Rc<NestedTensorLiteral>),
    }

    pub enum Type {
        Scalar(Rc<TypeScalar>),
        Tensor(Rc<TypeTensor>),
        Element(Rc<TypeElement>),
        Set(Rc<TypeSet>),
        Tuple(Rc<TypeTuple>),
    }

    pub enum IndexSet {
        Range(Rc<RangeIndexSet>),
        Set(Rc<SetIndexSet>),
        Dynamic(Rc<DynamicIndexSet>),
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FunctionKind {
    #[default]
    Function,
    Procedure,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScalarTypeKind {
    Int,
    Float,
    Bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOperatorKind {
    Not,
    Neg,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperatorKind {
    Or,
    And,
    Xor,
    Add,
    Sub,
    Mul,
    Div,
    ElwiseMul,
    ElwiseDiv,
    Exp,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ComparisonOperatorKind {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

ast_nodes! {

    pub struct SourceFile {
        pub definitions: Vec<Definition>,
    }

    pub struct Identifier {
        pub name: String,
    }

    pub struct ElementTypeDefinition {
        pub name: Rc<Identifier>,
        pub fields: Vec<Rc<FieldDefinition>>,
    }

    pub struct FieldDefinition {
        pub name: Rc<Identifier>,
        pub ty: Type,
    }

    pub struct ExternDefinition {
        pub name: Rc<Identifier>,
        pub ty: Type,
    }

    pub struct FunctionDefinition {
        pub kind: FunctionKind,
        pub name: Rc<Identifier>,
        pub arguments: Vec<Rc<Argument>>,
        pub results: Vec<Rc<ResultDefinition>>,
        pub body: Rc<Block>,
    }

    pub struct Argument {
        pub name: Rc<Identifier>,
        pub is_inout: bool,
        pub ty: Type,
    }

    pub struct ResultDefinition {
        pub name: Rc<Identifier>,
        pub ty: Type,
    }

    pub struct ConstantDefinition {
        pub name: Rc<Identifier>,
        pub ty: Type,
        pub value: Option<Expression>,
    }

    pub struct TestDefinition {
        pub function: Rc<Identifier>,
        pub arguments: Vec<Expression>,
        pub expected: Expression,
    }

    pub struct Block {
        pub statements: Vec<Statement>,
    }

    pub struct VariableDefinitionStatement {
        pub name: Rc<Identifier>,
        pub ty: Type,
        pub value: Option<Expression>,
    }

    pub struct WhileStatement {
        pub condition: Expression,
        pub body: Rc<Block>,
    }

    pub struct IfStatement {
        pub condition: Expression,
        pub if_arm: Rc<Block>,
        pub else_arm: Option<Rc<Block>>,
    }

    pub struct ForStatement {
        pub loop_variable: Rc<Identifier>,
        pub domain: ForDomain,
        pub body: Rc<Block>,
    }

    pub struct RangeDomain {
        pub lower: Expression,
        pub upper: Expression,
    }

    pub struct IndexSetDomain {
        pub set: Rc<SetIndexSet>,
    }

    pub struct PrintStatement {
        pub expression: Expression,
    }

    pub struct AssignStatement {
        pub targets: Vec<Expression>,
        pub value: Expression,
    }

    pub struct ExpressionStatement {
        pub expression: Expression,
    }

    pub struct BinaryExpression {
        pub left: Expression,
        pub operator: OperatorKind,
        pub right: Expression,
    }

    pub struct ComparisonExpression {
        pub operands: Vec<Expression>,
        pub operators: Vec<ComparisonOperatorKind>,
    }

    pub struct PrefixUnaryExpression {
        pub expression: Expression,
        pub operator: UnaryOperatorKind,
    }

    pub struct TransposeExpression {
        pub expression: Expression,
    }

    pub struct FunctionCallExpression {
        pub function: Rc<Identifier>,
        pub arguments: Vec<Expression>,
    }

    pub struct MapExpression {
        pub function: Rc<Identifier>,
        pub partial_actuals: Vec<Expression>,
        pub target: Rc<Identifier>,
    }

    pub struct TensorReadExpression {
        pub tensor: Expression,
        pub indices: Vec<ReadParam>,
    }

    pub struct SliceParam {}

    pub struct FieldReadExpression {
        pub expression: Expression,
        pub field: Rc<Identifier>,
    }

    pub struct ParenthesizedExpression {
        pub expression: Expression,
    }

    pub struct IntLiteral {
        pub value: i64,
    }

    pub struct FloatLiteral {
        pub value: f64,
    }

    pub struct BoolLiteral {
        pub value: bool,
    }

    pub struct IntVectorLiteral {
        pub values: Vec<i64>,
        pub transposed: bool,
    }

    pub struct FloatVectorLiteral {
        pub values: Vec<f64>,
        pub transposed: bool,
    }

    pub struct NestedTensorLiteral {
        pub elements: Vec<DenseTensorLiteral>,
        pub transposed: bool,
    }

    pub struct TypeScalar {
        pub kind: ScalarTypeKind,
    }

    pub struct TypeTensor {
        pub index_sets: Vec<IndexSet>,
        pub block_type: Type,
        pub is_column_vector: bool,
    }

    pub struct TypeElement {
        pub name: String,
    }

    pub struct TypeSet {
        pub element: Rc<TypeElement>,
        pub endpoints: Vec<Rc<Identifier>>,
    }

    pub struct TypeTuple {
        pub element: Rc<TypeElement>,
        pub length: Rc<IntLiteral>,
    }

    pub struct RangeIndexSet {
        pub range: u32,
    }

    pub struct SetIndexSet {
        pub name: String,
    }

    pub struct DynamicIndexSet {}

}
