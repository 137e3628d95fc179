//! Session loading
//!
//! A session is one exported pair of schema and records documents, named by
//! the export timestamp. [`SessionStore`] turns a session id into a shared
//! [`EntityGraph`] through a [`DocumentSource`].

pub mod source;

pub use source::{DirectorySource, DocumentSource, SessionDocuments};

use crate::datamodel::{EntityGraph, LoadOptions};
use crate::error::LuyResult;
use crate::metamodel::Metamodel;
use chrono::{DateTime, Local, TimeZone};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::task::JoinHandle;

/// Ids below this are epoch seconds, above it epoch milliseconds.
const MILLISECOND_THRESHOLD: i64 = 10_000_000_000;

/// Human-readable label for a session id.
pub fn session_label(id: &str) -> String {
    let instant = id.trim().parse::<i64>().ok().and_then(|stamp| {
        let result = if stamp < MILLISECOND_THRESHOLD {
            Local.timestamp_opt(stamp, 0)
        } else {
            Local.timestamp_millis_opt(stamp)
        };
        result.single()
    });
    match instant {
        Some(instant) => format_local(&instant),
        None => format!("Invalid timestamp: {}", id),
    }
}

fn format_local(instant: &DateTime<Local>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Loads sessions and shares graphs that are still in use.
pub struct SessionStore {
    source: Arc<dyn DocumentSource>,
    options: LoadOptions,
    loaded: Mutex<HashMap<String, Weak<EntityGraph>>>,
}

impl SessionStore {
    pub fn new(source: Arc<dyn DocumentSource>, options: LoadOptions) -> Self {
        Self {
            source,
            options,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &Arc<dyn DocumentSource> {
        &self.source
    }

    pub fn list_sessions(&self) -> LuyResult<Vec<String>> {
        self.source.list_sessions()
    }

    /// Loads a session, returning the live graph if one is still held.
    pub fn load(&self, session: &str) -> LuyResult<Arc<EntityGraph>> {
        if let Some(graph) = self.cached(session) {
            debug!("Reusing loaded session '{}'", session);
            return Ok(graph);
        }

        let documents = self.source.fetch(session)?;
        let metamodel = Metamodel::load(session, &documents.schema)?;
        let graph = Arc::new(EntityGraph::load(
            Arc::new(metamodel),
            &documents.records,
            &self.options,
        )?);
        info!(
            "Loaded session '{}' ({}): {} building blocks, {} relationships",
            session,
            session_label(session),
            graph.building_block_count(),
            graph.relationship_count()
        );

        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        loaded.retain(|_, weak| weak.strong_count() > 0);
        loaded.insert(session.to_string(), Arc::downgrade(&graph));
        Ok(graph)
    }

    /// Loads a session on a blocking worker.
    pub async fn load_async(self: &Arc<Self>, session: impl Into<String>) -> LuyResult<Arc<EntityGraph>> {
        let store = Arc::clone(self);
        let session = session.into();
        tokio::task::spawn_blocking(move || store.load(&session)).await?
    }

    /// Loads a session in the background and hands the outcome to `continuation`.
    pub fn spawn_load<F>(self: &Arc<Self>, session: impl Into<String>, continuation: F) -> JoinHandle<()>
    where
        F: FnOnce(LuyResult<Arc<EntityGraph>>) + Send + 'static,
    {
        let store = Arc::clone(self);
        let session = session.into();
        tokio::spawn(async move {
            let result = store.load_async(session).await;
            continuation(result);
        })
    }

    fn cached(&self, session: &str) -> Option<Arc<EntityGraph>> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .and_then(Weak::upgrade)
    }
}
