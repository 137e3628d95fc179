//! Event type definitions and unified Event enum
use crate::metamodel::{Feature, TypeKey};
use crate::view::SortOrder;
use serde::{Deserialize, Serialize};

/// Trait for types that can be used as events in the message bus
pub trait EventType: Clone + Send + 'static {
    /// Get the unique type identifier for this event type
    fn type_id() -> &'static str;
}

/// The sort order of a feature changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SortingChanged {
    pub type_key: TypeKey,
    pub feature: Feature,
    pub order: SortOrder,
}

impl SortingChanged {
    pub fn new(type_key: TypeKey, feature: &Feature, order: SortOrder) -> Self {
        Self {
            type_key,
            feature: feature.clone(),
            order,
        }
    }
}

impl EventType for SortingChanged {
    fn type_id() -> &'static str {
        "SortingChanged"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureHidden {
    pub type_key: TypeKey,
    pub feature: Feature,
}

impl FeatureHidden {
    pub fn new(type_key: TypeKey, feature: &Feature) -> Self {
        Self {
            type_key,
            feature: feature.clone(),
        }
    }
}

impl EventType for FeatureHidden {
    fn type_id() -> &'static str {
        "FeatureHidden"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureUnhidden {
    pub type_key: TypeKey,
    pub feature: Feature,
}

impl FeatureUnhidden {
    pub fn new(type_key: TypeKey, feature: &Feature) -> Self {
        Self {
            type_key,
            feature: feature.clone(),
        }
    }
}

impl EventType for FeatureUnhidden {
    fn type_id() -> &'static str {
        "FeatureUnhidden"
    }
}

/// The stored filter of a type was replaced or cleared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterChanged {
    pub type_key: TypeKey,
}

impl EventType for FilterChanged {
    fn type_id() -> &'static str {
        "FilterChanged"
    }
}

/// A memoized view was discarded and will be recomputed on the next read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewInvalidated {
    pub type_key: TypeKey,
}

impl EventType for ViewInvalidated {
    fn type_id() -> &'static str {
        "ViewInvalidated"
    }
}

/// Unified event enumeration that encompasses all event types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    SortingChanged(SortingChanged),
    FeatureHidden(FeatureHidden),
    FeatureUnhidden(FeatureUnhidden),
    FilterChanged(FilterChanged),
    ViewInvalidated(ViewInvalidated),
}

impl Event {
    /// Get the event type as a string identifier
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::SortingChanged(_) => SortingChanged::type_id(),
            Event::FeatureHidden(_) => FeatureHidden::type_id(),
            Event::FeatureUnhidden(_) => FeatureUnhidden::type_id(),
            Event::FilterChanged(_) => FilterChanged::type_id(),
            Event::ViewInvalidated(_) => ViewInvalidated::type_id(),
        }
    }

    /// The type whose view state the event concerns
    pub fn type_key(&self) -> &TypeKey {
        match self {
            Event::SortingChanged(e) => &e.type_key,
            Event::FeatureHidden(e) => &e.type_key,
            Event::FeatureUnhidden(e) => &e.type_key,
            Event::FilterChanged(e) => &e.type_key,
            Event::ViewInvalidated(e) => &e.type_key,
        }
    }
}

impl EventType for Event {
    fn type_id() -> &'static str {
        "Event"
    }
}
