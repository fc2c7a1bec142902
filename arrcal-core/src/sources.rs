use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Instance, InstanceKind, ReleaseBatch};

/// One configured instance's release-calendar query. Bounds are
/// inclusive calendar days; implementations return decoded domain
/// records and map transport failures into `ArrcalError`.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    fn instance(&self) -> &Instance;

    async fn releases(&self, start: NaiveDate, end: NaiveDate) -> Result<ReleaseBatch>;
}

pub struct SourceRegistry {
    sources: Vec<Arc<dyn CalendarSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register(&mut self, source: Arc<dyn CalendarSource>) {
        self.sources.push(source);
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources
            .iter()
            .map(|s| s.instance().name.as_str())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CalendarSource>> {
        self.sources.iter().find(|s| s.instance().name == name)
    }

    pub fn of_kind(&self, kind: InstanceKind) -> impl Iterator<Item = &Arc<dyn CalendarSource>> {
        self.sources
            .iter()
            .filter(move |s| s.instance().kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CalendarSource>> {
        self.sources.iter()
    }

    pub fn snapshot(&self) -> Vec<Arc<dyn CalendarSource>> {
        self.sources.clone()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
