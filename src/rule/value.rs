use super::filter::Filter;
use crate::datamodel::{parse_to_instant, ElementKey};
use crate::metamodel::{Feature, FeatureKind, InterfaceDirection};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// The value a rule compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleValue {
    Boolean(bool),
    Instant(DateTime<Utc>),
    Decimal(f64),
    Integer(i64),
    Text(String),
    /// Accepted interface directions.
    Directions(BTreeSet<InterfaceDirection>),
    /// Literal persistent names.
    Literals(BTreeSet<String>),
    Elements(BTreeSet<ElementKey>),
    /// Nested filter applied to related elements.
    Filter(Box<Filter>),
}

impl RuleValue {
    pub fn literals<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RuleValue::Literals(names.into_iter().map(Into::into).collect())
    }

    pub fn directions(directions: impl IntoIterator<Item = InterfaceDirection>) -> Self {
        RuleValue::Directions(directions.into_iter().collect())
    }

    pub fn elements(keys: impl IntoIterator<Item = ElementKey>) -> Self {
        RuleValue::Elements(keys.into_iter().collect())
    }

    /// Reads user input as a value for `feature`.
    ///
    /// Enumerations take comma-separated literal persistent names, interface
    /// directions comma-separated export tokens. Relations have no textual
    /// form and yield `None`, as does input that does not parse.
    pub fn parse_for(feature: &Feature, text: &str) -> Option<Self> {
        let items = || text.split(',').map(str::trim).filter(|item| !item.is_empty());
        match feature.kind {
            FeatureKind::String | FeatureKind::RichText => Some(RuleValue::from(text)),
            FeatureKind::Boolean => text.trim().parse::<bool>().ok().map(RuleValue::Boolean),
            FeatureKind::Integer => text.trim().parse::<i64>().ok().map(RuleValue::Integer),
            FeatureKind::Decimal => text.trim().parse::<f64>().ok().map(RuleValue::Decimal),
            FeatureKind::Date | FeatureKind::DateTime => {
                parse_to_instant(text.trim()).ok().map(RuleValue::Instant)
            }
            FeatureKind::Enumeration => {
                let names: BTreeSet<String> = items().map(str::to_string).collect();
                (!names.is_empty()).then_some(RuleValue::Literals(names))
            }
            FeatureKind::InterfaceDirection => {
                let directions = items()
                    .map(InterfaceDirection::from_token)
                    .collect::<Option<BTreeSet<_>>>()?;
                (!directions.is_empty()).then_some(RuleValue::Directions(directions))
            }
            FeatureKind::Relation | FeatureKind::SelfRelation | FeatureKind::BuildingBlockType => None,
        }
    }
}

impl From<bool> for RuleValue {
    fn from(value: bool) -> Self {
        RuleValue::Boolean(value)
    }
}

impl From<i64> for RuleValue {
    fn from(value: i64) -> Self {
        RuleValue::Integer(value)
    }
}

impl From<f64> for RuleValue {
    fn from(value: f64) -> Self {
        RuleValue::Decimal(value)
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        RuleValue::Text(value.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(value: String) -> Self {
        RuleValue::Text(value)
    }
}

impl From<DateTime<Utc>> for RuleValue {
    fn from(value: DateTime<Utc>) -> Self {
        RuleValue::Instant(value)
    }
}

impl From<Filter> for RuleValue {
    fn from(value: Filter) -> Self {
        RuleValue::Filter(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::RelationTarget;

    fn feature(declared_type: &str) -> Feature {
        Feature::new("f", "F", "", "", declared_type, false, false, RelationTarget::Unresolved)
    }

    #[test]
    fn test_parse_for_feature_kind() {
        let lifecycle = feature("io.luy.model.attribute.EnumAT.Lifecycle");
        assert_eq!(
            RuleValue::parse_for(&lifecycle, "production, planned"),
            Some(RuleValue::literals(["planned", "production"]))
        );
        assert_eq!(RuleValue::parse_for(&lifecycle, " , "), None);

        let direction = feature("io.luy.model.Direction");
        assert_eq!(
            RuleValue::parse_for(&direction, "FIRST_TO_SECOND,BOTH_DIRECTIONS"),
            Some(RuleValue::directions([
                InterfaceDirection::FirstToSecond,
                InterfaceDirection::BothDirections
            ]))
        );
        assert_eq!(RuleValue::parse_for(&direction, "FIRST_TO_SECOND,SIDEWAYS"), None);

        assert_eq!(
            RuleValue::parse_for(&feature("string"), "CRM"),
            Some(RuleValue::Text("CRM".to_string()))
        );
        assert_eq!(RuleValue::parse_for(&feature("integer"), " 42"), Some(RuleValue::Integer(42)));
        assert_eq!(RuleValue::parse_for(&feature("integer"), "many"), None);
        assert_eq!(RuleValue::parse_for(&feature("boolean"), "true"), Some(RuleValue::Boolean(true)));
        assert!(matches!(
            RuleValue::parse_for(&feature("date"), "2023-01-15 14:30:00"),
            Some(RuleValue::Instant(_))
        ));
        assert_eq!(RuleValue::parse_for(&feature("Application"), "1"), None);
    }
}
