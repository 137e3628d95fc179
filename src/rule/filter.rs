use super::group::Group;
use super::Evaluatable;
use crate::datamodel::{Element, EntityGraph};
use crate::metamodel::TypeExpression;
use std::sync::Arc;

/// Root of a filter expression for one type.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    name: Option<String>,
    type_expression: Arc<TypeExpression>,
    root: Group,
}

impl Filter {
    /// A filter with an empty AND group, which accepts everything.
    pub fn new(type_expression: Arc<TypeExpression>) -> Self {
        Self::with_group(type_expression, Group::and())
    }

    pub fn with_group(type_expression: Arc<TypeExpression>, root: Group) -> Self {
        Self {
            name: None,
            type_expression,
            root,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn type_expression(&self) -> &Arc<TypeExpression> {
        &self.type_expression
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }
}

impl Evaluatable for Filter {
    fn evaluate(&self, element: &Element, graph: &EntityGraph) -> bool {
        self.root.evaluate(element, graph)
    }

    fn is_valid(&self) -> bool {
        self.root.is_valid()
    }
}
