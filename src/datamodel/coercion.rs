//! Builds elements from raw records
//!
//! Every feature value is converted to the native shape of its feature kind.
//! Relation values are left as raw `{id}` objects here and resolved by the
//! graph once all elements exist.

use super::dates::parse_to_instant;
use super::element::{BuildingBlockData, Element, ElementKind};
use super::errors::DataParseError;
use super::value::{AttributeValue, Value};
use crate::constants::{
    DESCRIPTION_KEY, ELEMENT_URI_KEY, HIERARCHY_LEVEL_KEY, ID_KEY, LAST_MODIFICATION_TIME_KEY,
    LAST_MODIFICATION_USER_KEY, NAME_KEY, POSITION_KEY, UNKNOWN_ELEMENT_TEXT,
};
use crate::metamodel::parsing::json_text;
use crate::metamodel::{Feature, FeatureKind, InterfaceDirection, Metamodel, TypeExpression};
use chrono::{DateTime, Utc};
use log::warn;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::sync::Arc;

const ELEMENT_SYSTEM_KEYS: [&str; 4] = [
    ID_KEY,
    ELEMENT_URI_KEY,
    LAST_MODIFICATION_TIME_KEY,
    LAST_MODIFICATION_USER_KEY,
];

const BUILDING_BLOCK_SYSTEM_KEYS: [&str; 4] =
    [HIERARCHY_LEVEL_KEY, NAME_KEY, DESCRIPTION_KEY, POSITION_KEY];

pub(crate) fn build_element(
    record: &Map<String, Json>,
    type_expression: &Arc<TypeExpression>,
    metamodel: &Metamodel,
) -> Result<Element, DataParseError> {
    let is_building_block = type_expression.is_substantial();
    let uri = first_raw(record, ELEMENT_URI_KEY)
        .map(json_text)
        .unwrap_or_else(|| UNKNOWN_ELEMENT_TEXT.to_string());
    let id = system_integer(record, ID_KEY, &uri)?;
    let last_modification_time = match first_raw(record, LAST_MODIFICATION_TIME_KEY) {
        Some(raw) => parse_to_instant(&json_text(raw)).map_err(|e| {
            invalid_field(LAST_MODIFICATION_TIME_KEY, &uri, e.to_string())
        })?,
        None => DateTime::<Utc>::default(),
    };
    let last_modification_user = first_raw(record, LAST_MODIFICATION_USER_KEY)
        .map(json_text)
        .unwrap_or_else(|| UNKNOWN_ELEMENT_TEXT.to_string());

    let mut additional_data = BTreeMap::new();
    let mut enumerations = BTreeMap::new();
    for (key, raw) in record {
        if ELEMENT_SYSTEM_KEYS.contains(&key.as_str())
            || (is_building_block && BUILDING_BLOCK_SYSTEM_KEYS.contains(&key.as_str()))
        {
            continue;
        }
        let value = match type_expression.feature(key) {
            Some(feature) => coerce_feature(feature, raw, metamodel, &uri),
            None => pass_through(raw),
        };
        if type_expression
            .feature(key)
            .is_some_and(|f| f.kind == FeatureKind::Enumeration)
        {
            let literals = value
                .values()
                .iter()
                .filter_map(Value::as_literal)
                .cloned()
                .collect();
            enumerations.insert(key.clone(), literals);
        }
        additional_data.insert(key.clone(), value);
    }

    additional_data.insert(ID_KEY.to_string(), AttributeValue::Scalar(Value::Integer(id)));
    additional_data.insert(
        ELEMENT_URI_KEY.to_string(),
        AttributeValue::Scalar(Value::Text(uri.clone())),
    );
    additional_data.insert(
        LAST_MODIFICATION_TIME_KEY.to_string(),
        AttributeValue::Scalar(Value::Instant(last_modification_time)),
    );
    additional_data.insert(
        LAST_MODIFICATION_USER_KEY.to_string(),
        AttributeValue::Scalar(Value::Text(last_modification_user.clone())),
    );

    let kind = if is_building_block {
        let data = BuildingBlockData {
            hierarchy_level: system_integer(record, HIERARCHY_LEVEL_KEY, &uri)?,
            name: first_raw(record, NAME_KEY)
                .map(json_text)
                .unwrap_or_else(|| UNKNOWN_ELEMENT_TEXT.to_string()),
            description: first_raw(record, DESCRIPTION_KEY)
                .map(json_text)
                .unwrap_or_default(),
            position: system_integer(record, POSITION_KEY, &uri)?,
        };
        additional_data.insert(
            HIERARCHY_LEVEL_KEY.to_string(),
            AttributeValue::Scalar(Value::Integer(data.hierarchy_level)),
        );
        additional_data.insert(
            NAME_KEY.to_string(),
            AttributeValue::Scalar(Value::Text(data.name.clone())),
        );
        additional_data.insert(
            DESCRIPTION_KEY.to_string(),
            AttributeValue::Scalar(Value::Text(data.description.clone())),
        );
        additional_data.insert(
            POSITION_KEY.to_string(),
            AttributeValue::Scalar(Value::Integer(data.position)),
        );
        ElementKind::BuildingBlock(data)
    } else {
        ElementKind::Relationship
    };

    Ok(Element {
        id,
        uri,
        last_modification_time,
        last_modification_user,
        type_expression: Arc::clone(type_expression),
        additional_data,
        enumerations,
        relationships: BTreeMap::new(),
        kind,
    })
}

/// Coerces one raw feature value.
///
/// Lists are converted item by item; unreadable user values are dropped with
/// a warning. A non-list value is kept as found, except for enumerations,
/// which always end up as a (possibly empty) literal list.
pub(crate) fn coerce_feature(
    feature: &Feature,
    raw: &Json,
    metamodel: &Metamodel,
    uri: &str,
) -> AttributeValue {
    let items = match raw {
        Json::Array(items) => items,
        other if feature.kind == FeatureKind::Enumeration => {
            warn!(
                "Enumeration value of '{}' on {} is not a list: {}",
                feature.persistent_name, uri, other
            );
            return AttributeValue::List(Vec::new());
        }
        other => return AttributeValue::Scalar(Value::Raw(other.clone())),
    };
    if feature.kind == FeatureKind::BuildingBlockType {
        warn!(
            "Unhandled feature type {} for '{}' on {}",
            feature.kind, feature.persistent_name, uri
        );
    }

    AttributeValue::List(
        items
            .iter()
            .filter(|item| !item.is_null())
            .filter_map(|item| coerce_item(feature, item, metamodel, uri))
            .collect(),
    )
}

fn coerce_item(feature: &Feature, item: &Json, metamodel: &Metamodel, uri: &str) -> Option<Value> {
    let dropped = |reason: &dyn std::fmt::Display| {
        warn!(
            "Dropping value {} of '{}' on {}: {}",
            item, feature.persistent_name, uri, reason
        );
        None
    };

    match feature.kind {
        FeatureKind::Boolean => Some(Value::Boolean(match item {
            Json::Bool(b) => *b,
            other => json_text(other).trim().eq_ignore_ascii_case("true"),
        })),
        FeatureKind::Date | FeatureKind::DateTime => match parse_to_instant(&json_text(item)) {
            Ok(instant) => Some(Value::Instant(instant)),
            Err(e) => dropped(&e),
        },
        FeatureKind::Decimal => {
            let parsed = match item {
                Json::Number(n) => n.as_f64(),
                other => json_text(other).trim().parse::<f64>().ok(),
            };
            match parsed {
                Some(d) => Some(Value::Decimal(d)),
                None => dropped(&"not a decimal"),
            }
        }
        FeatureKind::Integer => {
            let parsed = match item {
                Json::Number(n) => n.as_i64(),
                other => json_text(other).trim().parse::<i64>().ok(),
            };
            match parsed {
                Some(i) => Some(Value::Integer(i)),
                None => dropped(&"not an integer"),
            }
        }
        FeatureKind::RichText | FeatureKind::String => Some(Value::Text(json_text(item))),
        FeatureKind::InterfaceDirection => match InterfaceDirection::from_token(&json_text(item)) {
            Some(direction) => Some(Value::Direction(direction)),
            None => dropped(&"not an interface direction"),
        },
        FeatureKind::Enumeration => metamodel
            .enumeration(&feature.declared_type)
            .and_then(|enumeration| enumeration.literal(&json_text(item)))
            .map(|literal| Value::Literal(Arc::clone(literal))),
        FeatureKind::Relation | FeatureKind::SelfRelation | FeatureKind::BuildingBlockType => {
            Some(Value::Raw(item.clone()))
        }
    }
}

fn pass_through(raw: &Json) -> AttributeValue {
    match raw {
        Json::Array(items) => AttributeValue::List(items.iter().cloned().map(Value::Raw).collect()),
        other => AttributeValue::Scalar(Value::Raw(other.clone())),
    }
}

/// System fields arrive either bare or as single-element lists.
fn first_raw<'a>(record: &'a Map<String, Json>, key: &str) -> Option<&'a Json> {
    match record.get(key)? {
        Json::Array(items) => items.first().filter(|item| !item.is_null()),
        Json::Null => None,
        other => Some(other),
    }
}

fn system_integer(record: &Map<String, Json>, key: &str, uri: &str) -> Result<i64, DataParseError> {
    match first_raw(record, key) {
        None => Ok(-1),
        Some(Json::Number(n)) => n
            .as_i64()
            .ok_or_else(|| invalid_field(key, uri, format!("{} is not an integer", n))),
        Some(other) => {
            let text = json_text(other);
            text.trim()
                .parse::<i64>()
                .map_err(|e| invalid_field(key, uri, format!("'{}': {}", text, e)))
        }
    }
}

fn invalid_field(field: &str, uri: &str, reason: String) -> DataParseError {
    DataParseError::InvalidSystemField {
        field: field.to_string(),
        uri: uri.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metamodel() -> Metamodel {
        let schema = json!([
            {
                "type": "EnumerationExpression",
                "persistentName": "io.luy.model.attribute.EnumAT.Status",
                "name": "Status",
                "literals": [
                    {"persistentName": "active", "name": "Active"},
                    {"persistentName": "retired", "name": "Retired"}
                ]
            },
            {
                "type": "SubstantialTypeExpression",
                "persistentName": "App",
                "name": "Application",
                "features": [
                    {"persistentName": "age", "name": "Age", "type": "integer"},
                    {"persistentName": "cost", "name": "Cost", "type": "decimal"},
                    {"persistentName": "live", "name": "Live", "type": "boolean"},
                    {"persistentName": "born", "name": "Born", "type": "date"},
                    {"persistentName": "status", "name": "Status", "type": "io.luy.model.attribute.EnumAT.Status", "multiple": true},
                    {"persistentName": "parent", "name": "Parent", "type": "App"}
                ]
            },
            {
                "type": "RelationshipTypeExpression",
                "persistentName": "Flow",
                "name": "Flow",
                "features": [
                    {"persistentName": "direction", "name": "Direction", "type": "io.luy.model.Direction"},
                    {"persistentName": "name", "name": "Name", "type": "string"}
                ]
            }
        ]);
        Metamodel::load("v", schema.to_string().as_bytes()).unwrap()
    }

    fn record(value: Json) -> Map<String, Json> {
        match value {
            Json::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_coerces_feature_values_to_native_types() {
        let metamodel = metamodel();
        let app = metamodel.substantial_type("App").unwrap();
        let element = build_element(
            &record(json!({
                "id": [3],
                "elementURI": ["luy:App/3"],
                "name": ["Billing"],
                "lastModificationTime": ["2023-01-15 14:30:00"],
                "age": ["42", 7, "old"],
                "cost": [1.5],
                "live": ["TRUE"],
                "born": ["15.01.2023 14:30:00", "never"],
                "status": ["active", "unknown"],
                "parent": [{"id": 1}],
                "extra": "kept"
            })),
            app,
            &metamodel,
        )
        .unwrap();

        assert_eq!(element.id, 3);
        assert_eq!(element.uri, "luy:App/3");
        assert_eq!(element.label(), "Billing");
        assert_eq!(
            element.value("age"),
            Some(&AttributeValue::List(vec![Value::Integer(42), Value::Integer(7)]))
        );
        assert_eq!(element.first_value("cost"), Some(&Value::Decimal(1.5)));
        assert_eq!(element.first_value("live"), Some(&Value::Boolean(true)));
        assert_eq!(element.value("born").unwrap().values().len(), 1);
        assert_eq!(element.literals("status").len(), 1);
        assert_eq!(element.literals("status")[0].persistent_name, "active");
        assert!(matches!(element.first_value("parent"), Some(Value::Raw(_))));
        assert_eq!(
            element.value("extra"),
            Some(&AttributeValue::Scalar(Value::Raw(json!("kept"))))
        );
        assert_eq!(element.max_values(), 2);
    }

    #[test]
    fn test_system_field_defaults() {
        let metamodel = metamodel();
        let app = metamodel.substantial_type("App").unwrap();
        let element = build_element(&record(json!({})), app, &metamodel).unwrap();
        assert_eq!(element.id, -1);
        assert_eq!(element.uri, UNKNOWN_ELEMENT_TEXT);
        assert_eq!(element.last_modification_time.timestamp(), 0);
        assert_eq!(element.last_modification_user, UNKNOWN_ELEMENT_TEXT);
        let data = element.building_block().unwrap();
        assert_eq!(data.hierarchy_level, -1);
        assert_eq!(data.position, -1);
        assert_eq!(data.description, "");
        assert_eq!(
            element.value(ID_KEY),
            Some(&AttributeValue::Scalar(Value::Integer(-1)))
        );
    }

    #[test]
    fn test_unreadable_system_fields_fail() {
        let metamodel = metamodel();
        let app = metamodel.substantial_type("App").unwrap();
        let err = build_element(&record(json!({"id": ["abc"]})), app, &metamodel).unwrap_err();
        assert!(matches!(err, DataParseError::InvalidSystemField { ref field, .. } if field == "id"));

        let err = build_element(
            &record(json!({"id": [1], "lastModificationTime": ["someday"]})),
            app,
            &metamodel,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataParseError::InvalidSystemField { ref field, .. } if field == LAST_MODIFICATION_TIME_KEY
        ));
    }

    #[test]
    fn test_relationship_keeps_name_as_feature() {
        let metamodel = metamodel();
        let flow = metamodel.relationship_type("Flow").unwrap();
        let element = build_element(
            &record(json!({"id": [9], "name": ["a to b"], "direction": ["FIRST_TO_SECOND", "UP"]})),
            flow,
            &metamodel,
        )
        .unwrap();
        assert!(element.building_block().is_none());
        assert_eq!(
            element.value("name"),
            Some(&AttributeValue::List(vec![Value::Text("a to b".into())]))
        );
        assert_eq!(
            element.value("direction"),
            Some(&AttributeValue::List(vec![Value::Direction(
                InterfaceDirection::FirstToSecond
            )]))
        );
    }
}
