use crate::config::Config;
use crate::overdue::OverdueThresholds;
use crate::storage::InsurerStore;

#[derive(Clone)]
pub struct AppState {
    pub store: InsurerStore,
    pub thresholds: OverdueThresholds,
}

impl AppState {
    pub fn new(store: InsurerStore, thresholds: OverdueThresholds) -> Self {
        Self { store, thresholds }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(InsurerStore::new(config.data_path.clone()), config.thresholds)
    }
}
