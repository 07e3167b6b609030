//! Viewport geometry and map view settings.

use serde::{Deserialize, Serialize};

use fleet_core::GeoPosition;

/// Fixed height of the windowed viewport in CSS pixels.
pub const WINDOWED_HEIGHT_PX: u32 = 480;

/// Widget configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default)]
    pub fullscreen: bool,
}

/// Vertical extent of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "px", rename_all = "snake_case")]
pub enum ViewportHeight {
    /// Full vertical viewport (`100vh`).
    FullViewport,
    /// Fixed pixel height.
    Fixed(u32),
}

impl ViewportHeight {
    pub fn to_css(&self) -> String {
        match self {
            Self::FullViewport => "100vh".to_string(),
            Self::Fixed(px) => format!("{px}px"),
        }
    }
}

/// Presentation of the map container for one mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewportGeometry {
    pub fullscreen: bool,
    pub height: ViewportHeight,
    pub border_radius: &'static str,
    pub box_shadow: Option<&'static str>,
}

impl ViewportGeometry {
    pub fn for_mode(fullscreen: bool) -> Self {
        if fullscreen {
            Self {
                fullscreen,
                height: ViewportHeight::FullViewport,
                border_radius: "0",
                box_shadow: None,
            }
        } else {
            Self {
                fullscreen,
                height: ViewportHeight::Fixed(WINDOWED_HEIGHT_PX),
                border_radius: "1.5rem",
                box_shadow: Some("0 4px 32px 0 #c7d2fe55"),
            }
        }
    }

    /// Inline style for the map container.
    pub fn to_css(&self) -> String {
        let height = self.height.to_css();
        format!(
            "height:{height};min-height:{height};width:100%;border-radius:{};box-shadow:{}",
            self.border_radius,
            self.box_shadow.unwrap_or("none")
        )
    }
}

impl From<ViewportConfig> for ViewportGeometry {
    fn from(config: ViewportConfig) -> Self {
        Self::for_mode(config.fullscreen)
    }
}

/// Raster tile provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileSource {
    pub url_template: &'static str,
    pub attribution: &'static str,
}

impl TileSource {
    pub const OPEN_STREET_MAP: TileSource = TileSource {
        url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors",
    };
}

/// Initial camera of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    #[serde(default = "default_center")]
    pub center: GeoPosition,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_scroll_wheel_zoom")]
    pub scroll_wheel_zoom: bool,
}

fn default_center() -> GeoPosition {
    GeoPosition::new(35.6892, 51.3890)
}

fn default_zoom() -> u8 {
    12
}

fn default_scroll_wheel_zoom() -> bool {
    true
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            scroll_wheel_zoom: default_scroll_wheel_zoom(),
        }
    }
}
