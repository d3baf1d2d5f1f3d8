use std::rc::Rc;

use super::nodes::{
    Definition, DenseTensorLiteral, ElementTypeDefinition, Expression, FunctionDefinition,
    Identifier, ReadParam, SourceFile,
};

impl SourceFile {
    #[must_use]
    pub fn function_definitions(&self) -> Vec<Rc<FunctionDefinition>> {
        self.definitions
            .iter()
            .filter_map(|def| match def {
                Definition::Function(func) => Some(func.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn element_type_definitions(&self) -> Vec<Rc<ElementTypeDefinition>> {
        self.definitions
            .iter()
            .filter_map(|def| match def {
                Definition::ElementType(element) => Some(element.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Expression {
    /// Returns the identifier when this expression is a bare variable reference.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&Rc<Identifier>> {
        match self {
            Expression::Identifier(identifier) => Some(identifier),
            _ => None,
        }
    }

    /// Strips any number of enclosing parentheses.
    #[must_use]
    pub fn unparenthesized(&self) -> &Expression {
        match self {
            Expression::Parenthesized(paren) => paren.expression.unparenthesized(),
            _ => self,
        }
    }
}

impl ReadParam {
    #[must_use]
    pub fn is_slice(&self) -> bool {
        matches!(self, ReadParam::Slice(_))
    }
}

impl DenseTensorLiteral {
    #[must_use]
    pub fn is_transposed(&self) -> bool {
        match self {
            DenseTensorLiteral::IntVector(lit) => lit.transposed,
            DenseTensorLiteral::FloatVector(lit) => lit.transposed,
            DenseTensorLiteral::Nested(lit) => lit.transposed,
        }
    }
}
