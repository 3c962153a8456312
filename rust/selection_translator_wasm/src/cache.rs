// In-memory translation cache, scoped to the page session.
// Bounded, oldest insertion evicted first.

use std::collections::{HashMap, VecDeque};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub text: String,
    pub target_lang: String,
}

impl CacheKey {
    pub fn new(text: &str, target_lang: &str) -> Self {
        Self {
            text: text.to_string(),
            target_lang: target_lang.to_string(),
        }
    }
}

pub struct TranslationCache {
    capacity: usize,
    entries: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
}

impl TranslationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get(&self, text: &str, target_lang: &str) -> Option<&str> {
        self.entries
            .get(&CacheKey::new(text, target_lang))
            .map(String::as_str)
    }

    /// Stores a translation. Re-inserting an existing key updates the value
    /// but keeps its original position in the eviction order.
    pub fn insert(&mut self, text: &str, target_lang: &str, translated: String) {
        let key = CacheKey::new(text, target_lang);
        if let Some(value) = self.entries.get_mut(&key) {
            *value = translated;
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    log::debug!("evicting cached translation for {:?}", oldest.text);
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, translated);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
