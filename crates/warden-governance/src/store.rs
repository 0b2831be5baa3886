use std::collections::BTreeMap;

use warden_core::DailyUsage;

/// Day-keyed usage storage. Implementations do not need their own locking:
/// `BoundaryChecker` serializes every call behind a single lock.
pub trait UsageStore: Send + Sync {
    fn get(&self, date: &str) -> Option<DailyUsage>;
    fn put(&mut self, usage: DailyUsage);
    fn remove(&mut self, date: &str) -> Option<DailyUsage>;
    /// All stored day keys, ascending.
    fn dates(&self) -> Vec<String>;
}

/// In-process store. Days are kept until explicitly removed.
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    days: BTreeMap<String, DailyUsage>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageStore for MemoryUsageStore {
    fn get(&self, date: &str) -> Option<DailyUsage> {
        self.days.get(date).cloned()
    }

    fn put(&mut self, usage: DailyUsage) {
        self.days.insert(usage.date.clone(), usage);
    }

    fn remove(&mut self, date: &str) -> Option<DailyUsage> {
        self.days.remove(date)
    }

    fn dates(&self) -> Vec<String> {
        self.days.keys().cloned().collect()
    }
}
