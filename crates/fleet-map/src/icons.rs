//! Marker icon registry.
//!
//! Builds one marker glyph per motion state for a single widget instance.
//! Nothing here mutates shared defaults: every widget owns the [`IconSet`]
//! returned by [`initialize_icons`].

use async_trait::async_trait;
use futures_util::future::join3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fleet_core::MotionState;
use fleet_telemetry::Metrics;

use crate::environment::ClientEnvironment;
use crate::error::{MapError, MapResult};

/// Glyph size in pixels.
pub const ICON_SIZE: [u32; 2] = [32, 32];
/// Image point aligned to the coordinate (bottom-centre of the pin).
pub const ICON_ANCHOR: [i32; 2] = [16, 32];
/// Popup offset relative to the anchor.
pub const POPUP_ANCHOR: [i32; 2] = [0, -32];

/// A renderable marker glyph with its placement metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerIcon {
    /// State this icon represents (the icon key).
    pub state: MotionState,
    pub url: String,
    pub size: [u32; 2],
    pub anchor: [i32; 2],
    pub popup_anchor: [i32; 2],
    /// True when the themed asset failed and the generic pin is used.
    pub fallback: bool,
}

impl MarkerIcon {
    /// Standard pin icon.
    pub fn pin(state: MotionState, url: impl Into<String>) -> Self {
        Self {
            state,
            url: url.into(),
            size: ICON_SIZE,
            anchor: ICON_ANCHOR,
            popup_anchor: POPUP_ANCHOR,
            fallback: false,
        }
    }

    /// Generic pin used when the themed asset is unavailable.
    pub fn fallback(state: MotionState, url: impl Into<String>) -> Self {
        Self {
            fallback: true,
            ..Self::pin(state, url)
        }
    }
}

/// One icon per motion state. Lookups are infallible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconSet {
    moving: MarkerIcon,
    stopped: MarkerIcon,
    offline: MarkerIcon,
}

impl IconSet {
    pub fn get(&self, state: MotionState) -> &MarkerIcon {
        match state {
            MotionState::Moving => &self.moving,
            MotionState::Stopped => &self.stopped,
            MotionState::Offline => &self.offline,
        }
    }

    /// Icons in legend order.
    pub fn iter(&self) -> impl Iterator<Item = &MarkerIcon> {
        [&self.moving, &self.stopped, &self.offline].into_iter()
    }

    /// Number of states rendered with the fallback glyph.
    pub fn fallback_count(&self) -> usize {
        self.iter().filter(|icon| icon.fallback).count()
    }
}

/// Asset URLs per state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconTheme {
    #[serde(default = "default_moving_url")]
    pub moving: String,
    #[serde(default = "default_stopped_url")]
    pub stopped: String,
    #[serde(default = "default_offline_url")]
    pub offline: String,
    /// Generic pin substituted for any state whose asset fails.
    #[serde(default = "default_fallback_url")]
    pub fallback: String,
}

fn default_moving_url() -> String {
    "https://cdn-icons-png.flaticon.com/512/854/854894.png".to_string()
}

fn default_stopped_url() -> String {
    "https://cdn-icons-png.flaticon.com/512/854/854866.png".to_string()
}

fn default_offline_url() -> String {
    "https://cdn-icons-png.flaticon.com/512/854/854878.png".to_string()
}

fn default_fallback_url() -> String {
    "/static/marker-fallback.svg".to_string()
}

impl Default for IconTheme {
    fn default() -> Self {
        Self {
            moving: default_moving_url(),
            stopped: default_stopped_url(),
            offline: default_offline_url(),
            fallback: default_fallback_url(),
        }
    }
}

impl IconTheme {
    pub fn url(&self, state: MotionState) -> &str {
        match state {
            MotionState::Moving => &self.moving,
            MotionState::Stopped => &self.stopped,
            MotionState::Offline => &self.offline,
        }
    }
}

/// Loads the glyph for one state.
#[async_trait]
pub trait IconSource: Send + Sync {
    async fn load(&self, state: MotionState) -> MapResult<MarkerIcon>;
}

/// Icon source backed by an [`IconTheme`].
///
/// Accepts absolute `http(s)` URLs and root-relative paths served by the host.
#[derive(Debug, Clone, Default)]
pub struct ThemeIconSource {
    theme: IconTheme,
}

impl ThemeIconSource {
    pub fn new(theme: IconTheme) -> Self {
        Self { theme }
    }
}

fn is_loadable_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("https://")
        || url.starts_with("http://")
        || (url.starts_with('/') && !url.starts_with("//") && url.len() > 1)
}

#[async_trait]
impl IconSource for ThemeIconSource {
    async fn load(&self, state: MotionState) -> MapResult<MarkerIcon> {
        let url = self.theme.url(state);
        if !is_loadable_url(url) {
            return Err(MapError::IconAsset {
                state,
                reason: format!("unsupported asset url {url:?}"),
            });
        }
        Ok(MarkerIcon::pin(state, url.trim()))
    }
}

/// Build the icon set for one widget instance.
///
/// Requires the environment gate to be open. All three states load
/// concurrently; any state whose asset fails gets the fallback glyph, so the
/// result always covers every state.
pub async fn initialize_icons(
    _env: &ClientEnvironment,
    source: &dyn IconSource,
    fallback_url: &str,
) -> IconSet {
    let (moving, stopped, offline) = join3(
        source.load(MotionState::Moving),
        source.load(MotionState::Stopped),
        source.load(MotionState::Offline),
    )
    .await;

    let resolve = |state: MotionState, result: MapResult<MarkerIcon>| match result {
        Ok(icon) => MarkerIcon { state, ..icon },
        Err(e) => {
            warn!(%state, error = %e, "Icon asset failed, using fallback glyph");
            Metrics::icon_fallback(state.as_str());
            MarkerIcon::fallback(state, fallback_url)
        }
    };

    let icons = IconSet {
        moving: resolve(MotionState::Moving, moving),
        stopped: resolve(MotionState::Stopped, stopped),
        offline: resolve(MotionState::Offline, offline),
    };
    debug!(fallbacks = icons.fallback_count(), "Icon set initialized");
    icons
}
