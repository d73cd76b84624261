use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;

/// Process-lifetime memo table for one pipeline stage.
///
/// Only successful results are stored. Entries are never evicted. Two callers
/// computing the same key at once both run the computation and the last one
/// to finish wins; equal inputs are expected to produce equal outputs.
pub struct StageCache<K, V> {
    stage: &'static str,
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> StageCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, or run `compute` and remember its success
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key) {
            tracing::debug!(stage = self.stage, "cache hit");
            return Ok(hit);
        }

        tracing::debug!(stage = self.stage, "cache miss");
        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic inside a compute closure never happens while the lock is held,
    // so a poisoned map is still consistent.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, V>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
