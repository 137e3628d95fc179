use super::leaf::Rule;
use super::Evaluatable;
use crate::datamodel::{Element, EntityGraph};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupOperator {
    And,
    Or,
    /// Negates the first child; further children are ignored.
    Not,
}

impl fmt::Display for GroupOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GroupOperator::And => "AND",
            GroupOperator::Or => "OR",
            GroupOperator::Not => "NOT",
        })
    }
}

/// Child of a group.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    Group(Group),
}

impl From<Rule> for Node {
    fn from(rule: Rule) -> Self {
        Node::Rule(rule)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl Evaluatable for Node {
    fn evaluate(&self, element: &Element, graph: &EntityGraph) -> bool {
        match self {
            Node::Rule(rule) => rule.evaluate(element, graph),
            Node::Group(group) => group.evaluate(element, graph),
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            Node::Rule(rule) => rule.is_valid(),
            Node::Group(group) => group.is_valid(),
        }
    }
}

/// Boolean combination over an ordered list of children.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    operator: GroupOperator,
    children: Vec<Node>,
}

impl Group {
    pub fn new(operator: GroupOperator) -> Self {
        Self {
            operator,
            children: Vec::new(),
        }
    }

    pub fn and() -> Self {
        Self::new(GroupOperator::And)
    }

    pub fn or() -> Self {
        Self::new(GroupOperator::Or)
    }

    pub fn not() -> Self {
        Self::new(GroupOperator::Not)
    }

    /// Builder form of [`Group::add_child`].
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.add_child(child);
        self
    }

    pub fn operator(&self) -> GroupOperator {
        self.operator
    }

    /// Switching to NOT keeps only the first child.
    pub fn set_operator(&mut self, operator: GroupOperator) -> &mut Self {
        self.operator = operator;
        if operator == GroupOperator::Not {
            self.children.truncate(1);
        }
        self
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    pub fn add_child(&mut self, child: impl Into<Node>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    pub fn add_child_first(&mut self, child: impl Into<Node>) -> &mut Self {
        self.children.insert(0, child.into());
        self
    }

    /// Inserts at `index`, clamped to the current length.
    pub fn insert_child(&mut self, index: usize, child: impl Into<Node>) -> &mut Self {
        let index = index.min(self.children.len());
        self.children.insert(index, child.into());
        self
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::and()
    }
}

impl Evaluatable for Group {
    /// An empty group accepts everything, whatever its operator.
    fn evaluate(&self, element: &Element, graph: &EntityGraph) -> bool {
        let Some(first) = self.children.first() else {
            return true;
        };
        match self.operator {
            GroupOperator::Not => !first.evaluate(element, graph),
            GroupOperator::And => self.children.iter().all(|c| c.evaluate(element, graph)),
            GroupOperator::Or => self.children.iter().any(|c| c.evaluate(element, graph)),
        }
    }

    fn is_valid(&self) -> bool {
        self.children.iter().all(Node::is_valid)
    }
}
