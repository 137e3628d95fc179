//! Shared fixture for the integration tests
//!
//! A small landscape: five information systems with a parent hierarchy,
//! two business units and three information flows between the systems.

#![allow(dead_code)]

use luyview::datamodel::{EntityGraph, LoadOptions};
use luyview::metamodel::{Feature, Metamodel, TypeExpression};
use luyview::session::{DirectorySource, SessionStore};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const SESSION_ID: &str = "1700000000";

pub fn init_logging() {
    luyview::logging::init_test_logging();
}

pub fn schema_document() -> Vec<u8> {
    json!([
        {
            "type": "EnumerationExpression",
            "persistentName": "io.luy.model.attribute.EnumAT.Lifecycle",
            "name": "Lifecycle",
            "literals": [
                {"persistentName": "planned", "name": "Planned", "color": "rgb(0,0,255)", "index": 0},
                {"persistentName": "production", "name": "Production", "color": "rgb(0,255,0)", "index": 1},
                {"persistentName": "retired", "name": "Retired", "color": "rgb(128,128,128)", "index": 2}
            ]
        },
        {
            "type": "SubstantialTypeExpression",
            "persistentName": "InformationSystem",
            "name": "Information System",
            "pluralName": "Information Systems",
            "abbreviation": "IS",
            "features": [
                {"persistentName": "id", "name": "ID", "type": "integer", "mandatory": true},
                {"persistentName": "name", "name": "Name", "type": "string", "mandatory": true},
                {"persistentName": "description", "name": "Description", "type": "richtext"},
                {"persistentName": "users", "name": "Users", "type": "integer"},
                {"persistentName": "costs", "name": "Costs", "type": "decimal"},
                {"persistentName": "critical", "name": "Critical", "type": "boolean"},
                {"persistentName": "goLive", "name": "Go-Live", "type": "date"},
                {"persistentName": "lifecycle", "name": "Lifecycle", "type": "io.luy.model.attribute.EnumAT.Lifecycle"},
                {"persistentName": "parent", "name": "Parent", "type": "InformationSystem"},
                {"persistentName": "children", "name": "Children", "type": "InformationSystem", "multiple": "true"},
                {"persistentName": "owner", "name": "Owner", "type": "BusinessUnit", "multiple": true},
                {"persistentName": "flows", "name": "Information Flows", "type": "InformationFlow", "multiple": true}
            ]
        },
        {
            "type": "SubstantialTypeExpression",
            "persistentName": "BusinessUnit",
            "name": "Business Unit",
            "features": [
                {"persistentName": "id", "name": "ID", "type": "integer"},
                {"persistentName": "name", "name": "Name", "type": "string"}
            ]
        },
        {
            "type": "RelationshipTypeExpression",
            "persistentName": "InformationFlow",
            "name": "Information Flow",
            "features": [
                {"persistentName": "id", "name": "ID", "type": "integer"},
                {"persistentName": "direction", "name": "Direction", "type": "io.luy.model.Direction"},
                {"persistentName": "payload", "name": "Payload", "type": "string"}
            ]
        }
    ])
    .to_string()
    .into_bytes()
}

pub fn records_document() -> Vec<u8> {
    json!([
        {
            "query": "InformationSystem",
            "result": [
                {
                    "id": [1], "elementURI": ["luy:is/1"], "name": ["CRM"],
                    "lastModificationTime": ["2023-01-15 14:30:00"], "lastModificationUser": ["alice"],
                    "$$hierarchy_level$$": [0], "position": [0],
                    "users": [120], "costs": [1500.5], "critical": [true], "goLive": ["2019-04-01 00:00:00"],
                    "lifecycle": ["production"], "children": [{"id": 2}, {"id": 3}],
                    "owner": [{"id": 100}], "flows": [{"id": 1000}, {"id": 1001}]
                },
                {
                    "id": [2], "elementURI": ["luy:is/2"], "name": ["CRM Mobile"],
                    "$$hierarchy_level$$": [1], "users": [40], "costs": ["250"], "critical": [false],
                    "lifecycle": ["planned"], "parent": [{"id": 1}], "owner": [{"id": 100}]
                },
                {
                    "id": [3], "elementURI": ["luy:is/3"], "name": ["CRM Web"],
                    "$$hierarchy_level$$": [1], "users": [80], "lifecycle": ["production"],
                    "parent": [{"id": 1}], "owner": [{"id": 101}], "flows": [{"id": 1002}]
                },
                {
                    "id": [4], "elementURI": ["luy:is/4"], "name": ["ERP"],
                    "description": ["Finance backbone"], "users": [300], "costs": ["not a number"],
                    "lifecycle": ["retired"], "owner": [{"id": 101}, {"id": 404}]
                },
                {
                    "id": [5], "elementURI": ["luy:is/5"], "name": ["Archive"],
                    "goLive": ["garbage"]
                }
            ]
        },
        {
            "query": "BusinessUnit",
            "result": [
                {"id": [100], "name": ["Sales"]},
                {"id": [101], "name": ["Finance"]}
            ]
        },
        {
            "query": "InformationFlow",
            "result": [
                {"id": [1000], "direction": ["FIRST_TO_SECOND"], "payload": ["Customers"]},
                {"id": [1001], "direction": ["BOTH_DIRECTIONS"], "payload": ["Orders"]},
                {"id": [1002], "direction": ["NO_DIRECTION"], "payload": ["Contacts"]}
            ]
        }
    ])
    .to_string()
    .into_bytes()
}

pub fn graph() -> Arc<EntityGraph> {
    let metamodel = Metamodel::load(SESSION_ID, &schema_document()).unwrap();
    Arc::new(
        EntityGraph::load(Arc::new(metamodel), &records_document(), &LoadOptions::default())
            .unwrap(),
    )
}

pub fn information_system(graph: &EntityGraph) -> Arc<TypeExpression> {
    graph
        .metamodel()
        .substantial_type("InformationSystem")
        .unwrap()
        .clone()
}

pub fn feature(type_expression: &TypeExpression, name: &str) -> Arc<Feature> {
    type_expression.feature(name).unwrap().clone()
}

pub fn write_session(dir: &Path, id: &str) {
    fs::write(dir.join(format!("{}_metamodel.json", id)), schema_document()).unwrap();
    fs::write(dir.join(format!("{}_data.json", id)), records_document()).unwrap();
}

/// A session directory holding the fixture session.
pub fn session_store() -> (Arc<SessionStore>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    write_session(dir.path(), SESSION_ID);
    let source = Arc::new(DirectorySource::new(dir.path()).unwrap());
    (
        Arc::new(SessionStore::new(source, LoadOptions::default())),
        dir,
    )
}
