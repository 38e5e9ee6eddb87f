//! Ordered agent registry.

use super::Agent;
use std::sync::Arc;
use tracing::debug;

/// Agents in registration order. Configured once, read on every run.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an agent.
    pub fn register(&mut self, agent: impl Agent + 'static) -> &mut Self {
        self.register_arc(Arc::new(agent))
    }

    /// Append an already shared agent.
    pub fn register_arc(&mut self, agent: Arc<dyn Agent>) -> &mut Self {
        debug!("Registered agent #{}: {}", self.agents.len() + 1, agent.name());
        self.agents.push(agent);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, agent: impl Agent + 'static) -> Self {
        self.register(agent);
        self
    }

    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.names())
            .finish()
    }
}
