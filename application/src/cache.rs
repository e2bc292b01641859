use std::sync::{PoisonError, RwLock};

/// Process-local identifier cache: a snapshot taken at startup, appended
/// after successful inserts and replaced wholesale after deletes. Not a
/// source of truth; a second pipeline instance against the same store must
/// refresh rather than trust it.
#[derive(Debug, Default)]
pub struct IdCache<T> {
    ids: RwLock<Vec<T>>,
}

impl<T: Clone> IdCache<T> {
    pub fn new(ids: Vec<T>) -> Self {
        Self {
            ids: RwLock::new(ids),
        }
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn append(&self, id: T) {
        self.ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
    }

    /// Replaces the cached snapshot, invalidating everything held so far.
    pub fn refresh(&self, ids: Vec<T>) {
        *self.ids.write().unwrap_or_else(PoisonError::into_inner) = ids;
    }

    pub fn len(&self) -> usize {
        self.ids.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_refresh_update_the_snapshot() {
        let cache = IdCache::new(vec![1_i64, 2]);
        assert_eq!(cache.snapshot(), vec![1, 2]);

        cache.append(3);
        assert_eq!(cache.snapshot(), vec![1, 2, 3]);

        cache.refresh(vec![7]);
        assert_eq!(cache.snapshot(), vec![7]);
        assert_eq!(cache.len(), 1);
    }
}
