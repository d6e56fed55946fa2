//! In-memory package store for reconciler integration tests.

use std::sync::{Arc, Mutex, MutexGuard};

use gitdeps::package::{
    PackageConfig,
    port::{PackageStore, StoreError},
};

#[derive(Debug, Default)]
struct StoreState {
    config: PackageConfig,
    saves: usize,
    fail_saves: bool,
}

/// A [`PackageStore`] kept in memory.
///
/// Clones share state, so a test can hand one clone to the reconciler and
/// inspect or sabotage the store through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn with_config(config: PackageConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                config,
                ..StoreState::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    /// What was last saved (or seeded)
    #[must_use]
    pub fn stored(&self) -> PackageConfig {
        self.state().config.clone()
    }

    #[must_use]
    pub fn saves(&self) -> usize {
        self.state().saves
    }

    /// Make every following save fail until reset
    pub fn fail_saves(&self, fail: bool) {
        self.state().fail_saves = fail;
    }
}

impl PackageStore for MemoryStore {
    fn load(&self) -> Result<PackageConfig, StoreError> {
        Ok(self.stored())
    }

    fn save(&self, config: &PackageConfig) -> Result<(), StoreError> {
        let mut state = self.state();
        if state.fail_saves {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        state.config = config.clone();
        state.saves += 1;
        Ok(())
    }
}
