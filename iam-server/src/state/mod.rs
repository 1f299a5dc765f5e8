use std::sync::Arc;

use crate::error;
use crate::sec;
use crate::storage::{self, Store};

/// builder for creating the [`Shared`] struct
#[derive(Debug)]
pub struct SharedBuilder {
    sec: sec::state::Builder,
    store: Option<Arc<dyn Store>>,
}

impl SharedBuilder {
    pub fn sec(&mut self) -> &mut sec::state::Builder {
        &mut self.sec
    }

    pub fn set_store(&mut self, store: Arc<dyn Store>) -> &mut Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> error::Result<Shared> {
        let sec = self.sec.build()?;

        let store = self.store.unwrap_or_else(|| {
            Arc::new(storage::memory::MemoryStore::new(sec.session_ttl()))
        });

        Ok(Shared { store, sec })
    }
}

#[derive(Debug)]
pub struct Shared {
    store: Arc<dyn Store>,
    sec: sec::state::Sec,
}

pub type ArcShared = Arc<Shared>;

impl Shared {
    pub fn builder() -> SharedBuilder {
        SharedBuilder {
            sec: sec::state::Sec::builder(),
            store: None,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn sec(&self) -> &sec::state::Sec {
        &self.sec
    }
}

impl AsRef<sec::state::Sec> for Shared {
    fn as_ref(&self) -> &sec::state::Sec {
        &self.sec
    }
}
