//! Map engine seam.
//!
//! The controller is the only caller. Attaching requires a
//! [`ClientEnvironment`] and the loaded [`IconSet`], so an engine cannot be
//! created before both lifecycle gates have opened.

use crate::environment::ClientEnvironment;
use crate::icons::IconSet;
use crate::sync::MarkerDiff;
use crate::viewport::{MapView, TileSource, ViewportGeometry};

/// Everything an engine needs to attach.
#[derive(Debug, Clone, Copy)]
pub struct EngineMount<'a> {
    pub icons: &'a IconSet,
    pub geometry: &'a ViewportGeometry,
    pub tiles: &'a TileSource,
    pub view: &'a MapView,
}

/// A live map attached to its rendering surface.
pub trait MapEngine: Send {
    /// Apply marker changes.
    fn apply(&mut self, diff: &MarkerDiff);

    /// Resize the live viewport in place. Must not reset zoom or pan.
    fn resize(&mut self, geometry: &ViewportGeometry);

    /// Detach and free engine resources. Called exactly once.
    fn release(&mut self);
}

/// Creates engines for mounted widgets.
pub trait MapEngineFactory: Send + Sync {
    fn attach(&self, env: &ClientEnvironment, mount: EngineMount<'_>) -> Box<dyn MapEngine>;
}
