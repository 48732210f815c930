use dashmap::DashMap;

use super::{KvResult, KvStore};

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: DashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn put(&self, key: &str, value: &str) -> KvResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> KvResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_delete() {
        let kv = MemoryKv::new();
        kv.put("cache:sales", "[]").unwrap();
        kv.put("cache:goals", "{}").unwrap();
        kv.put("session:abc", "{}").unwrap();

        assert_eq!(kv.keys_with_prefix("cache:").unwrap(), vec!["cache:goals", "cache:sales"]);
        assert_eq!(kv.delete_prefix("cache:").unwrap(), 2);
        assert_eq!(kv.len(), 1);
        assert!(kv.get("session:abc").unwrap().is_some());

        // Idempotent
        kv.delete("cache:sales").unwrap();
    }
}
