use super::errors::{RuleError, RuleResult};
use super::operators::{Operand, Operator};
use super::value::RuleValue;
use super::Evaluatable;
use crate::datamodel::{Element, EntityGraph};
use crate::metamodel::Feature;
use std::sync::Arc;

/// Leaf predicate binding a feature, an operator and a value.
///
/// Feature and operator are checked against each other whenever both are
/// set; an incompatible pairing is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
    feature: Option<Arc<Feature>>,
    operator: Option<&'static Operator>,
    value: Option<RuleValue>,
}

impl Rule {
    pub fn new(
        feature: Arc<Feature>,
        operator: &'static Operator,
        value: Option<RuleValue>,
    ) -> RuleResult<Self> {
        check_compatible(operator, &feature)?;
        Ok(Self {
            feature: Some(feature),
            operator: Some(operator),
            value,
        })
    }

    /// A rule with only its feature chosen.
    pub fn for_feature(feature: Arc<Feature>) -> Self {
        Self {
            feature: Some(feature),
            ..Default::default()
        }
    }

    pub fn feature(&self) -> Option<&Arc<Feature>> {
        self.feature.as_ref()
    }

    pub fn operator(&self) -> Option<&'static Operator> {
        self.operator
    }

    pub fn value(&self) -> Option<&RuleValue> {
        self.value.as_ref()
    }

    pub fn set_feature(&mut self, feature: Arc<Feature>) -> RuleResult<&mut Self> {
        if let Some(operator) = self.operator {
            check_compatible(operator, &feature)?;
        }
        self.feature = Some(feature);
        Ok(self)
    }

    pub fn set_operator(&mut self, operator: &'static Operator) -> RuleResult<&mut Self> {
        if let Some(feature) = &self.feature {
            check_compatible(operator, feature)?;
        }
        self.operator = Some(operator);
        Ok(self)
    }

    pub fn set_value(&mut self, value: impl Into<RuleValue>) -> &mut Self {
        self.value = Some(value.into());
        self
    }

    pub fn clear_value(&mut self) -> &mut Self {
        self.value = None;
        self
    }
}

fn check_compatible(operator: &'static Operator, feature: &Feature) -> RuleResult<()> {
    if operator.compatible_with(feature) {
        Ok(())
    } else {
        Err(RuleError::IncompatibleOperator {
            operator: operator.key,
            feature: feature.persistent_name.clone(),
            kind: feature.kind,
        })
    }
}

impl Evaluatable for Rule {
    /// A rule without operator (or feature) lets everything through.
    fn evaluate(&self, element: &Element, graph: &EntityGraph) -> bool {
        let (Some(operator), Some(feature)) = (self.operator, &self.feature) else {
            return true;
        };
        let operand = Operand {
            element,
            feature: feature.as_ref(),
            graph,
        };
        operator.evaluate(&operand, self.value.as_ref())
    }

    /// Needs feature and operator, plus a value of a shape the operator
    /// understands (or no value where none is required).
    fn is_valid(&self) -> bool {
        match (&self.feature, self.operator, &self.value) {
            (Some(_), Some(operator), Some(value)) => operator.accepts(value),
            (Some(_), Some(operator), None) => !operator.requires_input(),
            _ => false,
        }
    }
}
