//! # Filtered and sorted views
//!
//! Holds the mutable presentation state of every type: an optional filter,
//! the active sort keys, the hidden features, and a memoized result. Every
//! mutation discards the memo; the next read recomputes it.
//!
//! All state sits behind one mutex, so concurrent callers never observe a
//! half-applied change. Notifications go out on the [`MessageBus`] after the
//! lock is released.

pub mod sorting;

pub use sorting::{apply_sort_keys, compare_on, SortKey, SortOrder};

use crate::datamodel::{Element, EntityGraph};
use crate::error::LuyResult;
use crate::message_bus::{
    Event, FeatureHidden, FeatureUnhidden, FilterChanged, MessageBus, SortingChanged,
    ViewInvalidated,
};
use crate::metamodel::{Feature, TypeExpression, TypeKey};
use crate::rule::{Evaluatable, Filter};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// Result of a view computation; shared until the next invalidation.
pub type ElementList = Arc<Vec<Arc<Element>>>;

#[derive(Debug, Default)]
struct TypeState {
    filter: Option<Filter>,
    /// Insertion order; later keys are applied later.
    sort_keys: Vec<SortKey>,
    hidden: BTreeSet<String>,
    memo: Option<ElementList>,
}

impl TypeState {
    fn invalidate(&mut self, type_key: &TypeKey, events: &mut Vec<Event>) {
        if self.memo.take().is_some() {
            events.push(Event::ViewInvalidated(ViewInvalidated {
                type_key: type_key.clone(),
            }));
        }
    }
}

pub struct FilteredAndSortedView {
    graph: Arc<EntityGraph>,
    bus: Arc<MessageBus>,
    state: Mutex<HashMap<TypeKey, TypeState>>,
}

impl FilteredAndSortedView {
    pub fn new(graph: Arc<EntityGraph>, bus: Arc<MessageBus>) -> Self {
        Self {
            graph,
            bus,
            state: Mutex::new(HashMap::new()),
        }
    }

    pub fn graph(&self) -> &Arc<EntityGraph> {
        &self.graph
    }

    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// Substantial types in display order.
    pub fn types(&self) -> Vec<Arc<TypeExpression>> {
        self.graph
            .metamodel()
            .substantial_types()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Sets the sort order of `feature`.
    ///
    /// Any existing key for the feature is removed first. A non-unsorted
    /// order on a sortable feature is then appended as the newest key.
    pub fn sort(&self, type_expression: &TypeExpression, feature: &Arc<Feature>, order: SortOrder) {
        if type_expression.feature(&feature.persistent_name).is_none() {
            warn!(
                "Ignoring sort on '{}': not a feature of '{}'",
                feature.persistent_name, type_expression.persistent_name
            );
            return;
        }
        let type_key = type_expression.key();
        let mut events = Vec::new();
        {
            let mut state = self.state();
            let entry = state.entry(type_key.clone()).or_default();
            let before = entry.sort_keys.len();
            entry
                .sort_keys
                .retain(|key| key.feature.persistent_name != feature.persistent_name);
            let mut changed = entry.sort_keys.len() != before;

            if order != SortOrder::Unsorted && feature.sortable {
                entry.sort_keys.push(SortKey {
                    feature: Arc::clone(feature),
                    order,
                });
                changed = true;
                events.push(Event::SortingChanged(SortingChanged::new(
                    type_key.clone(),
                    feature,
                    order,
                )));
            } else if order != SortOrder::Unsorted {
                debug!("Feature '{}' is not sortable", feature.persistent_name);
            }

            if changed {
                entry.invalidate(&type_key, &mut events);
            }
        }
        self.notify(events);
    }

    /// Current order of `feature`; unsorted when it has no key.
    pub fn sort_order(&self, type_expression: &TypeExpression, feature: &Feature) -> SortOrder {
        self.state()
            .get(&type_expression.key())
            .and_then(|state| {
                state
                    .sort_keys
                    .iter()
                    .find(|key| key.feature.persistent_name == feature.persistent_name)
            })
            .map_or(SortOrder::Unsorted, |key| key.order)
    }

    /// Active sort keys, oldest first.
    pub fn sort_keys(&self, type_expression: &TypeExpression) -> Vec<SortKey> {
        self.state()
            .get(&type_expression.key())
            .map(|state| state.sort_keys.clone())
            .unwrap_or_default()
    }

    /// Hides a feature. `id` and `name` cannot be hidden.
    ///
    /// Returns true if the hidden set changed.
    pub fn hide_feature(&self, type_expression: &TypeExpression, feature: &Feature) -> bool {
        if feature.is_pinned() {
            debug!("Refusing to hide pinned feature '{}'", feature.persistent_name);
            return false;
        }
        let type_key = type_expression.key();
        let mut events = Vec::new();
        let changed = {
            let mut state = self.state();
            let entry = state.entry(type_key.clone()).or_default();
            let changed = entry.hidden.insert(feature.persistent_name.clone());
            if changed {
                events.push(Event::FeatureHidden(FeatureHidden::new(type_key.clone(), feature)));
                entry.invalidate(&type_key, &mut events);
            }
            changed
        };
        self.notify(events);
        changed
    }

    /// Shows a hidden feature again. Returns true if the hidden set changed.
    pub fn show_feature(&self, type_expression: &TypeExpression, feature: &Feature) -> bool {
        let type_key = type_expression.key();
        let mut events = Vec::new();
        let changed = {
            let mut state = self.state();
            let entry = state.entry(type_key.clone()).or_default();
            let changed = entry.hidden.remove(&feature.persistent_name);
            if changed {
                events.push(Event::FeatureUnhidden(FeatureUnhidden::new(
                    type_key.clone(),
                    feature,
                )));
                entry.invalidate(&type_key, &mut events);
            }
            changed
        };
        self.notify(events);
        changed
    }

    pub fn is_hidden(&self, type_expression: &TypeExpression, feature: &Feature) -> bool {
        self.state()
            .get(&type_expression.key())
            .is_some_and(|state| state.hidden.contains(&feature.persistent_name))
    }

    /// Visible features in declared order.
    pub fn ordered_features(&self, type_expression: &TypeExpression) -> Vec<Arc<Feature>> {
        let state = self.state();
        let hidden = state.get(&type_expression.key()).map(|s| &s.hidden);
        let visible = type_expression
            .features
            .iter()
            .filter(|feature| hidden.map_or(true, |h| !h.contains(&feature.persistent_name)))
            .cloned()
            .collect();
        visible
    }

    /// Replaces the filter stored for the filter's type.
    pub fn set_filter(&self, filter: Filter) {
        let type_key = filter.type_expression().key();
        let mut events = vec![Event::FilterChanged(FilterChanged {
            type_key: type_key.clone(),
        })];
        {
            let mut state = self.state();
            let entry = state.entry(type_key.clone()).or_default();
            entry.filter = Some(filter);
            entry.invalidate(&type_key, &mut events);
        }
        self.notify(events);
    }

    pub fn clear_filter(&self, type_expression: &TypeExpression) {
        let type_key = type_expression.key();
        let mut events = Vec::new();
        {
            let mut state = self.state();
            let entry = state.entry(type_key.clone()).or_default();
            if entry.filter.take().is_some() {
                events.push(Event::FilterChanged(FilterChanged {
                    type_key: type_key.clone(),
                }));
                entry.invalidate(&type_key, &mut events);
            }
        }
        self.notify(events);
    }

    /// A copy of the stored filter.
    pub fn filter(&self, type_expression: &TypeExpression) -> Option<Filter> {
        self.state()
            .get(&type_expression.key())
            .and_then(|state| state.filter.clone())
    }

    /// Elements of the type that pass its filter, in sort-key order.
    ///
    /// The result is memoized: repeated calls without an intervening mutation
    /// return the same shared list.
    pub fn filtered_and_sorted(&self, type_expression: &TypeExpression) -> ElementList {
        let type_key = type_expression.key();
        let mut state = self.state();
        let entry = state.entry(type_key.clone()).or_default();
        if let Some(memo) = &entry.memo {
            return Arc::clone(memo);
        }

        let mut elements: Vec<Arc<Element>> = self
            .graph
            .elements_of_key(&type_key)
            .iter()
            .filter(|element| {
                entry
                    .filter
                    .as_ref()
                    .map_or(true, |filter| filter.evaluate(element, &self.graph))
            })
            .cloned()
            .collect();
        let visible_keys = entry
            .sort_keys
            .iter()
            .filter(|key| !entry.hidden.contains(&key.feature.persistent_name));
        apply_sort_keys(&mut elements, visible_keys);

        debug!(
            "Computed view of '{}': {} of {} elements",
            type_key,
            elements.len(),
            self.graph.elements_of_key(&type_key).len()
        );
        let result = Arc::new(elements);
        entry.memo = Some(Arc::clone(&result));
        result
    }

    /// Computes the view on a blocking worker and hands the outcome to
    /// `continuation`. Must be called within a tokio runtime.
    pub fn spawn_filtered_and_sorted<F>(
        self: &Arc<Self>,
        type_expression: Arc<TypeExpression>,
        continuation: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(LuyResult<ElementList>) + Send + 'static,
    {
        let view = Arc::clone(self);
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                view.filtered_and_sorted(&type_expression)
            })
            .await
            .map_err(Into::into);
            continuation(result);
        })
    }

    fn state(&self) -> MutexGuard<'_, HashMap<TypeKey, TypeState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, events: Vec<Event>) {
        for event in events {
            let event_type = event.event_type();
            if let Err(e) = self.bus.publish_event(event) {
                debug!("Delivery of {} incomplete: {}", event_type, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::LoadOptions;
    use crate::metamodel::Metamodel;
    use serde_json::json;

    fn view() -> (FilteredAndSortedView, Arc<TypeExpression>) {
        let schema = json!([{
            "type": "SubstantialTypeExpression",
            "persistentName": "App",
            "name": "Application",
            "features": [
                {"persistentName": "id", "name": "ID", "type": "integer"},
                {"persistentName": "name", "name": "Name", "type": "string"},
                {"persistentName": "age", "name": "Age", "type": "integer"},
                {"persistentName": "tags", "name": "Tags", "type": "string", "multiple": true}
            ]
        }]);
        let data = json!([{
            "query": "App",
            "result": [
                {"id": [1], "name": ["b"], "age": [30]},
                {"id": [2], "name": ["c"], "age": [10]},
                {"id": [3], "name": ["a"], "age": [20]}
            ]
        }]);
        let metamodel = Arc::new(Metamodel::load("v", schema.to_string().as_bytes()).unwrap());
        let app = metamodel.substantial_type("App").unwrap().clone();
        let graph =
            EntityGraph::load(metamodel, data.to_string().as_bytes(), &LoadOptions::default())
                .unwrap();
        (
            FilteredAndSortedView::new(Arc::new(graph), Arc::new(MessageBus::new())),
            app,
        )
    }

    fn ids(list: &ElementList) -> Vec<i64> {
        list.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_memo_is_shared_until_mutation() {
        let (view, app) = view();
        let first = view.filtered_and_sorted(&app);
        let second = view.filtered_and_sorted(&app);
        assert!(Arc::ptr_eq(&first, &second));

        let age = app.feature("age").unwrap().clone();
        view.sort(&app, &age, SortOrder::Ascending);
        let third = view.filtered_and_sorted(&app);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(ids(&third), vec![2, 3, 1]);
    }

    #[test]
    fn test_unsortable_feature_is_ignored() {
        let (view, app) = view();
        let tags = app.feature("tags").unwrap().clone();
        view.sort(&app, &tags, SortOrder::Ascending);
        assert!(view.sort_keys(&app).is_empty());
        assert_eq!(view.sort_order(&app, &tags), SortOrder::Unsorted);
    }

    #[test]
    fn test_resorting_moves_key_to_the_end() {
        let (view, app) = view();
        let age = app.feature("age").unwrap().clone();
        let name = app.feature("name").unwrap().clone();
        view.sort(&app, &age, SortOrder::Ascending);
        view.sort(&app, &name, SortOrder::Ascending);
        view.sort(&app, &age, SortOrder::Descending);

        let keys: Vec<_> = view
            .sort_keys(&app)
            .into_iter()
            .map(|k| (k.feature.persistent_name.clone(), k.order))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("name".to_string(), SortOrder::Ascending),
                ("age".to_string(), SortOrder::Descending)
            ]
        );
    }

    #[test]
    fn test_hidden_sort_key_is_not_applied() {
        let (view, app) = view();
        let age = app.feature("age").unwrap().clone();
        view.sort(&app, &age, SortOrder::Ascending);
        assert!(view.hide_feature(&app, &age));
        assert_eq!(ids(&view.filtered_and_sorted(&app)), vec![1, 2, 3]);
        assert_eq!(view.sort_order(&app, &age), SortOrder::Ascending);

        assert!(view.show_feature(&app, &age));
        assert_eq!(ids(&view.filtered_and_sorted(&app)), vec![2, 3, 1]);
    }

    #[test]
    fn test_pinned_features_stay_visible() {
        let (view, app) = view();
        for name in ["id", "name"] {
            let feature = app.feature(name).unwrap().clone();
            assert!(!view.hide_feature(&app, &feature));
        }
        assert_eq!(view.ordered_features(&app).len(), 4);
    }
}
