//! Bulk registration: linking one student to many modules, or one module to many students.
//!
//! The selection starts out as the already-linked set, and those keys stay locked in. On submit
//! every selected key is posted, already-linked ones included, leaving duplicate handling to the
//! API. Failures do not stop the batch; only the last error message is kept.

use crate::{
    api::ApiClient,
    data::{
        DataType,
        registration::{NewRegistration, Registration},
    },
};
use futures::future::join_all;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSelection<K: Ord> {
    linked: BTreeSet<K>,
    selected: BTreeSet<K>,
}

impl<K: Ord + Clone> BulkSelection<K> {
    pub fn new(linked: impl IntoIterator<Item = K>) -> Self {
        let linked: BTreeSet<K> = linked.into_iter().collect();
        Self {
            selected: linked.clone(),
            linked,
        }
    }

    /// Rebuilds the selection from a submitted form. Locked rows are never posted by browsers, so
    /// the linked set is always added back.
    pub fn with_posted(linked: impl IntoIterator<Item = K>, posted: impl IntoIterator<Item = K>) -> Self {
        let mut selection = Self::new(linked);
        selection.selected.extend(posted);
        selection
    }

    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    pub fn is_locked(&self, key: &K) -> bool {
        self.linked.contains(key)
    }

    pub fn selected(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }
}

/// Parses posted keys, skipping (and logging) anything that doesn't parse.
pub fn parse_keys<K: std::str::FromStr>(raw: &[String]) -> Vec<K> {
    raw.iter()
        .filter_map(|key| match key.parse() {
            Ok(k) => Some(k),
            Err(_) => {
                warn!(?key, "ignoring unparseable bulk selection key");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub last_error: Option<String>,
}

/// Posts every registration concurrently.
pub async fn submit_registrations(
    registrations: impl IntoIterator<Item = NewRegistration>,
    api: &ApiClient,
) -> BulkOutcome {
    let results = join_all(
        registrations
            .into_iter()
            .map(|registration| Registration::insert(registration, api)),
    )
    .await;

    let mut outcome = BulkOutcome {
        attempted: results.len(),
        ..BulkOutcome::default()
    };
    for result in results {
        match result {
            Ok(()) => outcome.succeeded += 1,
            Err(e) => outcome.last_error = Some(e.to_string()),
        }
    }

    info!(
        attempted = outcome.attempted,
        succeeded = outcome.succeeded,
        "bulk registration finished"
    );
    outcome
}
