//! Type Information
//!
//! This module defines the semantic types produced by the type checker.
//!
//! The lattice language supports:
//! - Scalars: `int`, `float`, `bool`
//! - Tensors: scalars, vectors, matrices and higher-order (possibly blocked)
//!   tensors whose dimensions are [`IndexDomain`]s
//! - Sets of elements, optionally edge sets over endpoint sets
//! - Fixed-length tuples of elements
//! - Element records with named fields
//!
//! A type that could not be determined is represented by `None` wherever an
//! `Option<TypeInfo>` appears. Such a type was already reported and is never
//! compared or formatted.

use core::fmt;
use std::{
    fmt::{Display, Formatter},
    rc::Rc,
    sync::atomic::{AtomicU32, Ordering},
};

use lattice_ast::nodes::{Block, ScalarTypeKind};

use crate::errors::InvariantViolation;

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum ScalarType {
    Int,
    Float,
    Boolean,
}

impl ScalarType {
    #[must_use = "returns the string representation without modifying self"]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Boolean => "bool",
        }
    }

    #[must_use = "this is a pure check with no side effects"]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Int | ScalarType::Float)
    }
}

impl From<ScalarTypeKind> for ScalarType {
    fn from(kind: ScalarTypeKind) -> Self {
        match kind {
            ScalarTypeKind::Int => ScalarType::Int,
            ScalarTypeKind::Float => ScalarType::Float,
            ScalarTypeKind::Bool => ScalarType::Boolean,
        }
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Size descriptor of a single tensor dimension.
#[derive(Debug, Clone)]
pub enum IndexSet {
    Range(u32),
    /// Dimension indexed by the members of a declared set.
    Set(Rc<Var>),
    /// Size unknown until runtime, written `*`.
    Dynamic,
}

impl PartialEq for IndexSet {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IndexSet::Range(l), IndexSet::Range(r)) => l == r,
            (IndexSet::Set(l), IndexSet::Set(r)) => l.id == r.id,
            (IndexSet::Dynamic, IndexSet::Dynamic) => true,
            _ => false,
        }
    }
}

impl Eq for IndexSet {}

impl Display for IndexSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IndexSet::Range(range) => write!(f, "{range}"),
            IndexSet::Set(set) => write!(f, "{}", set.name),
            IndexSet::Dynamic => write!(f, "*"),
        }
    }
}

/// One tensor axis. More than one index set means the axis is blocked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexDomain {
    pub index_sets: Vec<IndexSet>,
}

impl IndexDomain {
    #[must_use]
    pub fn new(index_sets: Vec<IndexSet>) -> Self {
        Self { index_sets }
    }
}

impl From<IndexSet> for IndexDomain {
    fn from(index_set: IndexSet) -> Self {
        Self {
            index_sets: vec![index_set],
        }
    }
}

impl Display for IndexDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.index_sets.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" x "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorType {
    pub component: ScalarType,
    pub dimensions: Vec<IndexDomain>,
    /// Only meaningful for order-1 tensors.
    pub is_column_vector: bool,
}

impl TensorType {
    #[must_use]
    pub fn scalar(component: ScalarType) -> Self {
        Self {
            component,
            dimensions: Vec::new(),
            is_column_vector: false,
        }
    }

    #[must_use]
    pub fn new(component: ScalarType, dimensions: Vec<IndexDomain>) -> Self {
        Self {
            component,
            dimensions,
            is_column_vector: false,
        }
    }

    #[must_use]
    pub fn with_orientation(
        component: ScalarType,
        dimensions: Vec<IndexDomain>,
        is_column_vector: bool,
    ) -> Self {
        Self {
            component,
            dimensions,
            is_column_vector,
        }
    }

    #[must_use]
    pub fn order(&self) -> usize {
        self.dimensions.len()
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// The leading index set of every dimension.
    #[must_use]
    pub fn outer_dimensions(&self) -> Vec<IndexSet> {
        self.dimensions
            .iter()
            .filter_map(|domain| domain.index_sets.first().cloned())
            .collect()
    }

    /// The tensor type of one block, obtained by dropping the leading index
    /// set of every dimension. Unblocked tensors have scalar blocks.
    #[must_use]
    pub fn block_type(&self) -> TensorType {
        let nesting = self
            .dimensions
            .first()
            .map_or(0, |domain| domain.index_sets.len());
        if nesting <= 1 {
            return TensorType::scalar(self.component);
        }
        let dimensions = self
            .dimensions
            .iter()
            .map(|domain| IndexDomain::new(domain.index_sets.iter().skip(1).cloned().collect()))
            .collect();
        TensorType::with_orientation(self.component, dimensions, self.is_column_vector)
    }

    /// Transposed type of a tensor of order two or less.
    ///
    /// Scalars are unchanged, vectors flip their orientation and matrices
    /// swap their two dimensions. Returns `None` for higher orders.
    #[must_use]
    pub fn transposed(&self) -> Option<TensorType> {
        match self.order() {
            0 => Some(self.clone()),
            1 => Some(TensorType::with_orientation(
                self.component,
                self.dimensions.clone(),
                !self.is_column_vector,
            )),
            2 => Some(TensorType::new(
                self.component,
                vec![self.dimensions[1].clone(), self.dimensions[0].clone()],
            )),
            _ => None,
        }
    }
}

impl Display for TensorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            return write!(f, "{}", self.component);
        }
        let outer: Vec<String> = self
            .outer_dimensions()
            .iter()
            .map(ToString::to_string)
            .collect();
        let block = self.block_type();
        if block.is_scalar() {
            write!(f, "tensor[{}]({})", outer.join(","), self.component)?;
        } else {
            write!(f, "tensor[{}]({block})", outer.join(","))?;
        }
        if self.is_column_vector {
            write!(f, "'")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetType {
    pub element_type: Box<TypeInfo>,
    /// Endpoint sets of an edge set, each bound to a set-typed variable.
    pub endpoints: Vec<Rc<Var>>,
}

impl SetType {
    #[must_use]
    pub fn is_edge_set(&self) -> bool {
        !self.endpoints.is_empty()
    }
}

impl Display for SetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "set{{{}}}", self.element_type)?;
        if self.is_edge_set() {
            let endpoints: Vec<&str> = self.endpoints.iter().map(|e| e.name.as_str()).collect();
            write!(f, "({})", endpoints.join(","))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleType {
    pub element_type: Box<TypeInfo>,
    pub length: u32,
}

impl Display for TupleType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}*{})", self.element_type, self.length)
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: TypeInfo,
}

/// A named record type. Names are unique per compilation unit, so two element
/// types are equal iff their names are.
#[derive(Debug)]
pub struct ElementType {
    pub name: String,
    pub fields: Vec<Field>,
}

impl ElementType {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeInfo {
    Tensor(TensorType),
    Set(SetType),
    Tuple(TupleType),
    Element(Rc<ElementType>),
}

impl TypeInfo {
    #[must_use]
    pub fn int() -> Self {
        TypeInfo::Tensor(TensorType::scalar(ScalarType::Int))
    }

    #[must_use]
    pub fn float() -> Self {
        TypeInfo::Tensor(TensorType::scalar(ScalarType::Float))
    }

    #[must_use]
    pub fn boolean() -> Self {
        TypeInfo::Tensor(TensorType::scalar(ScalarType::Boolean))
    }

    #[must_use = "this is a pure check with no side effects"]
    pub fn is_tensor(&self) -> bool {
        matches!(self, TypeInfo::Tensor(_))
    }

    #[must_use = "this is a pure check with no side effects"]
    pub fn is_set(&self) -> bool {
        matches!(self, TypeInfo::Set(_))
    }

    #[must_use = "this is a pure check with no side effects"]
    pub fn is_tuple(&self) -> bool {
        matches!(self, TypeInfo::Tuple(_))
    }

    #[must_use = "this is a pure check with no side effects"]
    pub fn is_element(&self) -> bool {
        matches!(self, TypeInfo::Element(_))
    }

    /// `true` for a scalar of any component type.
    #[must_use = "this is a pure check with no side effects"]
    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeInfo::Tensor(tensor) if tensor.is_scalar())
    }

    #[must_use = "this is a pure check with no side effects"]
    pub fn is_boolean(&self) -> bool {
        matches!(self, TypeInfo::Tensor(tensor) if tensor.is_scalar() && tensor.component == ScalarType::Boolean)
    }

    #[must_use = "this is a pure check with no side effects"]
    pub fn is_int(&self) -> bool {
        matches!(self, TypeInfo::Tensor(tensor) if tensor.is_scalar() && tensor.component == ScalarType::Int)
    }

    #[must_use]
    pub fn as_tensor(&self) -> Option<&TensorType> {
        match self {
            TypeInfo::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_set(&self) -> Option<&SetType> {
        match self {
            TypeInfo::Set(set) => Some(set),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tuple(&self) -> Option<&TupleType> {
        match self {
            TypeInfo::Tuple(tuple) => Some(tuple),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&Rc<ElementType>> {
        match self {
            TypeInfo::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Narrows to a tensor type after a tag check.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] if the type is not a tensor.
    pub fn to_tensor(&self) -> Result<&TensorType, InvariantViolation> {
        self.as_tensor()
            .ok_or_else(|| InvariantViolation::narrowing("tensor", self))
    }

    /// Narrows to a set type after a tag check.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] if the type is not a set.
    pub fn to_set(&self) -> Result<&SetType, InvariantViolation> {
        self.as_set()
            .ok_or_else(|| InvariantViolation::narrowing("set", self))
    }

    /// Narrows to a tuple type after a tag check.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] if the type is not a tuple.
    pub fn to_tuple(&self) -> Result<&TupleType, InvariantViolation> {
        self.as_tuple()
            .ok_or_else(|| InvariantViolation::narrowing("tuple", self))
    }

    /// Narrows to an element type after a tag check.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] if the type is not an element.
    pub fn to_element(&self) -> Result<&Rc<ElementType>, InvariantViolation> {
        self.as_element()
            .ok_or_else(|| InvariantViolation::narrowing("element", self))
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::Tensor(tensor) => write!(f, "{tensor}"),
            TypeInfo::Set(set) => write!(f, "{set}"),
            TypeInfo::Tuple(tuple) => write!(f, "{tuple}"),
            TypeInfo::Element(element) => write!(f, "{element}"),
        }
    }
}

/// Formats the result types of an expression for diagnostics.
#[must_use]
pub fn type_string(types: &[TypeInfo]) -> String {
    match types {
        [] => "void".to_string(),
        [single] => format!("'{single}'"),
        many => {
            let parts: Vec<String> = many.iter().map(|ty| format!("'{ty}'")).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// A variable, constant, argument or result binding.
///
/// Every `Var` receives a unique id on creation; equality is identity.
#[derive(Debug)]
pub struct Var {
    pub id: u32,
    pub name: String,
    pub ty: Option<TypeInfo>,
}

impl Var {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Option<TypeInfo>) -> Self {
        Self {
            id: Self::next_id(),
            name: name.into(),
            ty,
        }
    }

    fn next_id() -> u32 {
        static COUNTER: AtomicU32 = AtomicU32::new(1);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Var {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncKind {
    Normal,
    Intrinsic,
}

#[derive(Debug)]
pub struct Func {
    pub name: String,
    pub arguments: Vec<Rc<Var>>,
    pub results: Vec<Rc<Var>>,
    /// `None` for intrinsics.
    pub body: Option<Rc<Block>>,
    pub kind: FuncKind,
}

impl Func {
    #[must_use]
    pub fn is_intrinsic(&self) -> bool {
        self.kind == FuncKind::Intrinsic
    }

    /// Declared result types. Registered functions never carry undefined
    /// argument or result types.
    #[must_use]
    pub fn result_types(&self) -> Vec<TypeInfo> {
        self.results
            .iter()
            .filter_map(|result| result.ty.clone())
            .collect()
    }
}
