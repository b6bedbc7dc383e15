mod none;
mod pixelate;
mod quantize;
mod resize;
mod toon;

pub use none::Passthrough;
pub use pixelate::Pixelate;
pub use toon::Toon;

use crate::params::FilterParams;
use anyhow::Result;
use image::RgbImage;
use std::collections::HashMap;

/// A stateless per-frame stylization transform.
///
/// Implementations read their tunables from [`FilterParams`] and must return
/// a frame with exactly the input's dimensions.
pub trait FrameFilter {
    /// Identifier used for registry lookup and the HUD.
    fn name(&self) -> &'static str;

    /// Transform one frame.
    fn apply(&self, frame: &RgbImage, params: &FilterParams) -> Result<RgbImage>;

    /// HUD line for this filter's own tunables, if it has any.
    fn hud_line(&self, _params: &FilterParams) -> Option<String> {
        None
    }
}

/// Immutable identifier-to-filter mapping.
pub struct FilterRegistry {
    filters: HashMap<&'static str, Box<dyn FrameFilter>>,
    fallback: Passthrough,
}

impl FilterRegistry {
    pub fn with_builtins() -> Self {
        let builtins: [Box<dyn FrameFilter>; 3] =
            [Box::new(Passthrough), Box::new(Pixelate), Box::new(Toon)];
        let mut filters = HashMap::new();
        for filter in builtins {
            filters.insert(filter.name(), filter);
        }
        Self {
            filters,
            fallback: Passthrough,
        }
    }

    /// Resolve an identifier to its filter. Unknown identifiers degrade to
    /// the passthrough filter so a bad selection can never interrupt the
    /// display.
    pub fn resolve(&self, id: &str) -> &dyn FrameFilter {
        match self.filters.get(id) {
            Some(filter) => filter.as_ref(),
            None => &self.fallback,
        }
    }
}
