use std::sync::Arc;

use crate::registry::ActorRegistry;

#[derive(Clone)]
pub struct ServeState {
    pub registry: Arc<ActorRegistry>,
}

impl ServeState {
    pub fn new(registry: Arc<ActorRegistry>) -> Self {
        Self { registry }
    }
}
