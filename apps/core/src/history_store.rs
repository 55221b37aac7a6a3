use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::kv_store::{KeyValueStore, MemoryStore};

pub const HISTORY_KEY: &str = "campusfind.search-history";
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

// Cloned handles share one history. Write failures are logged and the
// store continues in memory for the rest of the session.
#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<Mutex<HistoryState>>,
}

struct HistoryState {
    backend: Box<dyn KeyValueStore>,
    entries: Vec<String>,
    limit: usize,
    loaded: bool,
    session_only: bool,
}

impl HistoryStore {
    pub fn new(backend: impl KeyValueStore + 'static, limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HistoryState {
                backend: Box::new(backend),
                entries: Vec::new(),
                limit: limit.max(1),
                loaded: false,
                session_only: false,
            })),
        }
    }

    pub fn in_memory(limit: usize) -> Self {
        Self::new(MemoryStore::default(), limit)
    }

    pub fn limit(&self) -> usize {
        self.lock().limit
    }

    pub fn load(&self) -> Vec<String> {
        let mut state = self.lock();
        state.ensure_loaded();
        state.entries.clone()
    }

    pub fn record(&self, term: &str) {
        if term.is_empty() {
            return;
        }

        let mut state = self.lock();
        state.ensure_loaded();
        state.entries.retain(|existing| existing != term);
        state.entries.insert(0, term.to_string());
        let limit = state.limit;
        state.entries.truncate(limit);
        state.persist();
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.loaded = true;
        state.entries.clear();
        state.persist();
    }

    pub fn is_session_only(&self) -> bool {
        self.lock().session_only
    }

    fn lock(&self) -> MutexGuard<'_, HistoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HistoryState {
    fn ensure_loaded(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;

        self.entries = match self.backend.get(HISTORY_KEY) {
            Ok(Some(raw)) => decode_entries(&raw, self.limit),
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(error = %error, "failed to read search history; starting empty");
                Vec::new()
            }
        };
    }

    fn persist(&mut self) {
        if self.session_only {
            return;
        }

        let result = serde_json::to_string(&self.entries)
            .map_err(Into::into)
            .and_then(|encoded| self.backend.set(HISTORY_KEY, &encoded));
        if let Err(error) = result {
            tracing::warn!(
                error = %error,
                "failed to persist search history; keeping it for this session only"
            );
            self.session_only = true;
        }
    }
}

fn decode_entries(raw: &str, limit: usize) -> Vec<String> {
    let decoded = match serde_json::from_str::<Vec<String>>(raw) {
        Ok(decoded) => decoded,
        Err(error) => {
            tracing::warn!(error = %error, "ignoring malformed search history");
            return Vec::new();
        }
    };

    let mut entries: Vec<String> = Vec::with_capacity(decoded.len().min(limit));
    for term in decoded {
        if term.is_empty() || entries.contains(&term) {
            continue;
        }
        entries.push(term);
        if entries.len() == limit {
            break;
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::{decode_entries, HistoryStore, HISTORY_KEY};
    use crate::kv_store::{KeyValueStore, MemoryStore, StoreError};

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(Some(r#"["physics"]"#.to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }
    }

    #[test]
    fn recording_same_term_moves_it_to_front() {
        let history = HistoryStore::in_memory(10);
        history.record("algebra");
        history.record("salle");
        history.record("algebra");

        assert_eq!(history.load(), vec!["algebra", "salle"]);
    }

    #[test]
    fn oldest_term_is_evicted_past_limit() {
        let history = HistoryStore::in_memory(3);
        for term in ["a", "b", "c", "d"] {
            history.record(term);
        }

        assert_eq!(history.load(), vec!["d", "c", "b"]);
    }

    #[test]
    fn empty_term_is_ignored() {
        let history = HistoryStore::in_memory(10);
        history.record("");
        assert!(history.load().is_empty());
    }

    #[test]
    fn match_is_case_sensitive() {
        let history = HistoryStore::in_memory(10);
        history.record("Salle");
        history.record("salle");
        assert_eq!(history.load(), vec!["salle", "Salle"]);
    }

    #[test]
    fn persists_through_backend_key() {
        let mut backend = MemoryStore::default();
        backend.set(HISTORY_KEY, r#"["old"]"#).unwrap();
        let history = HistoryStore::new(backend, 10);

        history.record("new");

        assert_eq!(history.load(), vec!["new", "old"]);
        assert!(!history.is_session_only());
    }

    #[test]
    fn write_failure_degrades_to_session_only() {
        let history = HistoryStore::new(ReadOnlyStore, 10);
        history.record("chemistry");
        history.record("biology");

        assert!(history.is_session_only());
        assert_eq!(history.load(), vec!["biology", "chemistry", "physics"]);
    }

    #[test]
    fn clones_share_the_same_history() {
        let history = HistoryStore::in_memory(10);
        let other_screen = history.clone();
        other_screen.record("dept");
        assert_eq!(history.load(), vec!["dept"]);
    }

    #[test]
    fn clear_empties_history() {
        let history = HistoryStore::in_memory(10);
        history.record("x1");
        history.clear();
        assert!(history.load().is_empty());
    }

    #[test]
    fn decode_drops_duplicates_and_malformed_input() {
        assert_eq!(decode_entries(r#"["a","","a","b","c"]"#, 2), vec!["a", "b"]);
        assert!(decode_entries("{not json", 10).is_empty());
    }
}
