use crate::datamodel::{AttributeValue, Element};
use crate::metamodel::Feature;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Per-feature sort state. Cycles unsorted, ascending, descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

impl SortOrder {
    /// The order a header click moves to.
    pub fn next(self) -> Self {
        match self {
            SortOrder::Unsorted => SortOrder::Ascending,
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Unsorted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Unsorted => "unsorted",
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An active sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub feature: Arc<Feature>,
    pub order: SortOrder,
}

static NO_VALUES: AttributeValue = AttributeValue::List(Vec::new());

/// Compares two elements on one feature. Missing values count as an empty list.
pub fn compare_on(feature: &Feature, order: SortOrder, a: &Element, b: &Element) -> Ordering {
    let left = a.value(&feature.persistent_name).unwrap_or(&NO_VALUES);
    let right = b.value(&feature.persistent_name).unwrap_or(&NO_VALUES);
    let ordering = left.sort_cmp(right);
    match order {
        SortOrder::Descending => ordering.reverse(),
        SortOrder::Ascending | SortOrder::Unsorted => ordering,
    }
}

/// Applies `keys` as successive stable sorts, in the order given.
pub fn apply_sort_keys<'a>(elements: &mut [Arc<Element>], keys: impl IntoIterator<Item = &'a SortKey>) {
    for key in keys {
        elements.sort_by(|a, b| compare_on(&key.feature, key.order, a, b));
    }
}
