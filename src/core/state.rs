use std::sync::Arc;

use crate::core::config::Settings;
use crate::store::RecordStore;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    store: Arc<dyn RecordStore>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, store: Arc<dyn RecordStore>) -> Self {
        Self { inner: Arc::new(InnerState { settings, store }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn store(&self) -> &Arc<dyn RecordStore> {
        &self.inner.store
    }
}
