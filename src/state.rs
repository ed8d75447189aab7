use std::sync::Arc;

use crate::{filters::PageLimits, reference::ReferenceData, repository::Repository};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub reference: Arc<ReferenceData>,
    pub limits: PageLimits,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>, reference: ReferenceData, limits: PageLimits) -> Self {
        Self {
            repo,
            reference: Arc::new(reference),
            limits,
        }
    }
}
