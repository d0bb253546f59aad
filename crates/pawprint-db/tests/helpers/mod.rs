use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use pawprint_db::{SlugError, SlugLookup, SlugTable};
use uuid::Uuid;

/// Slug lookup over in-memory tables of `(id, slug)` rows
#[derive(Default)]
pub struct InMemorySlugLookup {
    rows: Mutex<HashMap<SlugTable, Vec<(Uuid, String)>>>,
    failing: AtomicBool,
    probes: AtomicUsize,
}

impl InMemorySlugLookup {
    pub fn insert(&self, table: SlugTable, id: Uuid, slug: &str) {
        self.rows
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .push((id, slug.to_string()));
    }

    pub fn fail_probes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SlugLookup for InMemorySlugLookup {
    async fn slug_exists(
        &self,
        table: SlugTable,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, SlugError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SlugError::ProbeFailed {
                table: table.to_string(),
                message: "connection refused".to_string(),
            });
        }

        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&table).is_some_and(|rows| {
            rows.iter()
                .any(|(id, s)| s == slug && Some(*id) != exclude_id)
        }))
    }
}
