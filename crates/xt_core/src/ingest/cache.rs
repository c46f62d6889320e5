//! Read-through event cache.
//!
//! One cache lives for the whole process and is never invalidated: a played
//! match's events do not change. Each match id owns a slot that is filled at
//! most once; concurrent callers for the same id wait on the one fetch in
//! flight instead of issuing their own. A failed fetch leaves the slot empty,
//! so the next call tries again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;

use crate::error::Result;
use crate::ingest::EventSource;
use crate::models::events::{EventTable, MatchId};

type Slot = Arc<OnceCell<Arc<EventTable>>>;

pub struct EventCache<S> {
    source: S,
    slots: Mutex<HashMap<MatchId, Slot>>,
}

impl<S: EventSource> EventCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Events of `match_id`, fetched on first use.
    pub fn get_or_fetch(&self, match_id: MatchId) -> Result<Arc<EventTable>> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(match_id).or_default())
        };

        if let Some(table) = slot.get() {
            log::trace!("Event cache hit for match {match_id}");
            return Ok(Arc::clone(table));
        }

        slot.get_or_try_init(|| {
            log::debug!("Event cache miss for match {match_id}; fetching from {}", self.source.describe());
            self.source.fetch_events(match_id).map(Arc::new)
        })
        .map(Arc::clone)
    }

    /// Match ids whose events are held, ascending.
    pub fn cached_matches(&self) -> Vec<MatchId> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<MatchId> = slots
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{UnavailableReason, XtError};
    use crate::models::events::Event;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts fetches; match 0 always fails.
    #[derive(Default)]
    struct CountingSource {
        fetches: AtomicUsize,
    }

    impl EventSource for CountingSource {
        fn fetch_events(&self, match_id: MatchId) -> Result<EventTable> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            if match_id == 0 {
                return Err(XtError::unavailable(match_id, UnavailableReason::InvalidMatch, "no such match"));
            }
            Ok(EventTable::new(vec![Event::new(format!("Team {match_id}"), 1, "Pass")]))
        }

        fn describe(&self) -> String {
            "counting source".into()
        }
    }

    #[test]
    fn test_second_call_is_served_from_cache() {
        let cache = EventCache::new(CountingSource::default());

        let first = cache.get_or_fetch(7).unwrap();
        let second = cache.get_or_fetch(7).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.source().fetches.load(Ordering::SeqCst), 1);

        cache.get_or_fetch(8).unwrap();
        assert_eq!(cache.source().fetches.load(Ordering::SeqCst), 2);
        assert_eq!(cache.cached_matches(), vec![7, 8]);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = EventCache::new(CountingSource::default());

        assert!(cache.get_or_fetch(0).is_err());
        assert!(cache.get_or_fetch(0).is_err());
        assert_eq!(cache.source().fetches.load(Ordering::SeqCst), 2);
        assert!(cache.cached_matches().is_empty());
    }

    #[test]
    fn test_concurrent_callers_share_one_fetch() {
        let cache = EventCache::new(CountingSource::default());

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let table = cache.get_or_fetch(42).unwrap();
                    assert_eq!(table.teams(), vec!["Team 42".to_string()]);
                });
            }
        });

        assert_eq!(cache.source().fetches.load(Ordering::SeqCst), 1);
    }
}
