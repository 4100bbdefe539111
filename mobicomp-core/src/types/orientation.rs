//! Screen orientation and application lifecycle state.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Orientation of a display as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScreenOrientation {
    /// The platform has not reported an orientation yet.
    #[default]
    Primary,
    Portrait,
    Landscape,
    InvertedPortrait,
    InvertedLandscape,
}

impl ScreenOrientation {
    /// Rotation in degrees, clockwise, relative to `native`.
    ///
    /// `Primary` is treated as equal to `native`.
    pub fn angle_from(&self, native: ScreenOrientation) -> u32 {
        fn degrees(o: ScreenOrientation) -> u32 {
            match o {
                ScreenOrientation::Primary | ScreenOrientation::Portrait => 0,
                ScreenOrientation::Landscape => 90,
                ScreenOrientation::InvertedPortrait => 180,
                ScreenOrientation::InvertedLandscape => 270,
            }
        }
        if *self == ScreenOrientation::Primary || native == ScreenOrientation::Primary {
            return 0;
        }
        (degrees(*self) + 360 - degrees(native)) % 360
    }
}

impl fmt::Display for ScreenOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenOrientation::Primary => "primary",
            ScreenOrientation::Portrait => "portrait",
            ScreenOrientation::Landscape => "landscape",
            ScreenOrientation::InvertedPortrait => "inverted-portrait",
            ScreenOrientation::InvertedLandscape => "inverted-landscape",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle state of the hosting application.
///
/// Variants are ordered from least to most active, so "backgrounded or below"
/// is `state <= ApplicationState::Hidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum ApplicationState {
    Suspended,
    Hidden,
    Inactive,
    #[default]
    Active,
}

impl ApplicationState {
    /// True when the application is hidden or suspended and holds no
    /// native surface.
    pub fn is_backgrounded(&self) -> bool {
        *self <= ApplicationState::Hidden
    }
}
