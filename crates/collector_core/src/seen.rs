use std::collections::HashSet;

/// Append-only set of item identifiers already processed by this agent.
///
/// Lives as long as the running agent and is never persisted. There is no
/// eviction, so very long sessions grow it without bound.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns `false` when the id was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::SeenSet;

    #[test]
    fn insert_reports_first_sighting_only() {
        let mut seen = SeenSet::new();
        assert!(seen.is_empty());
        assert!(seen.insert("42"));
        assert!(!seen.insert("42"));
        assert!(seen.contains("42"));
        assert!(!seen.contains("43"));
        assert_eq!(seen.len(), 1);
    }
}
