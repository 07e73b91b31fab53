// Execution context injected into callables that declare one as their first parameter.
use std::collections::BTreeMap;
use std::sync::Arc;

/// Produces a fresh context for each bind that needs one.
pub type ContextFactory = Arc<dyn Fn() -> Context + Send + Sync>;

/// Cheap to clone; values are shared until a clone adds its own.
#[derive(Clone, Debug, Default)]
pub struct Context {
    values: Arc<BTreeMap<String, serde_json::Value>>,
}

impl Context {
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        Arc::make_mut(&mut self.values).insert(key.into(), value);
        self
    }

    pub fn value(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }
}

pub(crate) fn default_context_factory() -> ContextFactory {
    Arc::new(Context::background)
}
