//! Execution-context gate.
//!
//! The map engine and its icon assets only exist in an interactive rendering
//! context. Code that needs them takes a [`ClientEnvironment`], which can only
//! be obtained from [`open_gate`] after detection reports
//! [`ExecutionContext::Interactive`]. A pre-render pass never gets one, so it
//! cannot reach the engine at all.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// Where the widget is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// Live rendering context with the map engine available.
    Interactive,
    /// Non-interactive pre-render pass; browser-only facilities are absent.
    PreRender,
}

/// Detects the execution context. Resolved at most once per widget mount.
#[async_trait]
pub trait RenderEnvironment: Send + Sync {
    async fn detect(&self) -> ExecutionContext;
}

/// Environment that is always interactive.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractiveEnvironment;

#[async_trait]
impl RenderEnvironment for InteractiveEnvironment {
    async fn detect(&self) -> ExecutionContext {
        ExecutionContext::Interactive
    }
}

/// Environment for pre-render passes; never opens the gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreRenderEnvironment;

#[async_trait]
impl RenderEnvironment for PreRenderEnvironment {
    async fn detect(&self) -> ExecutionContext {
        ExecutionContext::PreRender
    }
}

/// Proof that the environment gate has opened.
///
/// Cannot be constructed outside this module.
#[derive(Debug)]
pub struct ClientEnvironment {
    _private: (),
}

/// Run detection and return the proof token if the context is interactive.
pub async fn open_gate(env: &dyn RenderEnvironment) -> Option<ClientEnvironment> {
    match env.detect().await {
        ExecutionContext::Interactive => Some(ClientEnvironment { _private: () }),
        ExecutionContext::PreRender => {
            debug!("Pre-render context detected, environment gate stays closed");
            None
        }
    }
}

#[cfg(test)]
pub(crate) fn test_client_environment() -> ClientEnvironment {
    ClientEnvironment { _private: () }
}
