/// Runtime-tunable pipeline configuration.
///
/// Every mutation clamps into the tunable's fixed valid range; adjustments
/// never fail, they only pin at the range ends. The active filter id is
/// deliberately not validated here: the registry resolves unknown ids to
/// the passthrough filter.
#[derive(Debug, Clone)]
pub struct FilterParams {
    filter: String,
    scale: f32,
    block_size: u32,
    palette_levels: u32,
    edge_strength: u8,
    color_levels: u32,
}

const SCALE_MIN: f32 = 0.25;
const SCALE_MAX: f32 = 1.0;
const BLOCK_SIZE_MIN: i64 = 1;
const BLOCK_SIZE_MAX: i64 = 32;
const PALETTE_LEVELS_MIN: i64 = 2;
const PALETTE_LEVELS_MAX: i64 = 32;
const EDGE_STRENGTH_MIN: i64 = 10;
const EDGE_STRENGTH_MAX: i64 = 200;
const COLOR_LEVELS_MIN: i64 = 2;
const COLOR_LEVELS_MAX: i64 = 16;

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            filter: "toon".to_string(),
            scale: 0.6,
            block_size: 4,
            palette_levels: 10,
            edge_strength: 80,
            color_levels: 8,
        }
    }
}

impl FilterParams {
    pub fn new(
        filter: &str,
        scale: f32,
        block_size: u32,
        palette_levels: u32,
        edge_strength: u8,
        color_levels: u32,
    ) -> Self {
        let mut params = Self {
            filter: filter.to_string(),
            ..Self::default()
        };
        // Initial values clamp the same way adjustments do.
        params.scale = scale.clamp(SCALE_MIN, SCALE_MAX);
        params.block_size = clamp(block_size as i64, BLOCK_SIZE_MIN, BLOCK_SIZE_MAX) as u32;
        params.palette_levels =
            clamp(palette_levels as i64, PALETTE_LEVELS_MIN, PALETTE_LEVELS_MAX) as u32;
        params.edge_strength =
            clamp(edge_strength as i64, EDGE_STRENGTH_MIN, EDGE_STRENGTH_MAX) as u8;
        params.color_levels = clamp(color_levels as i64, COLOR_LEVELS_MIN, COLOR_LEVELS_MAX) as u32;
        params
    }

    pub fn filter_id(&self) -> &str {
        &self.filter
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn palette_levels(&self) -> u32 {
        self.palette_levels
    }

    pub fn edge_strength(&self) -> u8 {
        self.edge_strength
    }

    pub fn color_levels(&self) -> u32 {
        self.color_levels
    }

    /// Set the active filter id. Any string is accepted.
    pub fn select_filter(&mut self, id: &str) {
        self.filter = id.to_string();
    }

    pub fn adjust_scale(&mut self, delta: f32) {
        self.scale = (self.scale + delta).clamp(SCALE_MIN, SCALE_MAX);
    }

    pub fn adjust_block_size(&mut self, delta: i32) {
        self.block_size =
            clamp(self.block_size as i64 + delta as i64, BLOCK_SIZE_MIN, BLOCK_SIZE_MAX) as u32;
    }

    pub fn adjust_palette_levels(&mut self, delta: i32) {
        self.palette_levels = clamp(
            self.palette_levels as i64 + delta as i64,
            PALETTE_LEVELS_MIN,
            PALETTE_LEVELS_MAX,
        ) as u32;
    }

    pub fn adjust_edge_strength(&mut self, delta: i32) {
        self.edge_strength = clamp(
            self.edge_strength as i64 + delta as i64,
            EDGE_STRENGTH_MIN,
            EDGE_STRENGTH_MAX,
        ) as u8;
    }

    pub fn adjust_color_levels(&mut self, delta: i32) {
        self.color_levels = clamp(
            self.color_levels as i64 + delta as i64,
            COLOR_LEVELS_MIN,
            COLOR_LEVELS_MAX,
        ) as u32;
    }
}

fn clamp(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_configuration() {
        let params = FilterParams::default();
        assert_eq!(params.filter_id(), "toon");
        assert_eq!(params.scale(), 0.6);
        assert_eq!(params.block_size(), 4);
        assert_eq!(params.palette_levels(), 10);
        assert_eq!(params.edge_strength(), 80);
        assert_eq!(params.color_levels(), 8);
    }

    #[test]
    fn scale_pins_at_one_after_repeated_increments() {
        let mut params = FilterParams::default();
        for _ in 0..8 {
            params.adjust_scale(0.05);
        }
        assert_eq!(params.scale(), 1.0);
        // Extra increments must stay pinned, not overshoot.
        params.adjust_scale(0.05);
        assert_eq!(params.scale(), 1.0);
    }

    #[test]
    fn scale_pins_at_lower_bound() {
        let mut params = FilterParams::default();
        for _ in 0..100 {
            params.adjust_scale(-0.05);
        }
        assert_eq!(params.scale(), 0.25);
    }

    #[test]
    fn integer_tunables_pin_at_both_ends() {
        let mut params = FilterParams::default();
        for _ in 0..100 {
            params.adjust_block_size(1);
            params.adjust_palette_levels(1);
            params.adjust_edge_strength(5);
            params.adjust_color_levels(1);
        }
        assert_eq!(params.block_size(), 32);
        assert_eq!(params.palette_levels(), 32);
        assert_eq!(params.edge_strength(), 200);
        assert_eq!(params.color_levels(), 16);

        for _ in 0..100 {
            params.adjust_block_size(-1);
            params.adjust_palette_levels(-1);
            params.adjust_edge_strength(-5);
            params.adjust_color_levels(-1);
        }
        assert_eq!(params.block_size(), 1);
        assert_eq!(params.palette_levels(), 2);
        assert_eq!(params.edge_strength(), 10);
        assert_eq!(params.color_levels(), 2);
    }

    #[test]
    fn construction_clamps_out_of_range_values() {
        let params = FilterParams::new("pixelate", 2.0, 0, 1, 255, 99);
        assert_eq!(params.scale(), 1.0);
        assert_eq!(params.block_size(), 1);
        assert_eq!(params.palette_levels(), 2);
        assert_eq!(params.edge_strength(), 200);
        assert_eq!(params.color_levels(), 16);
    }

    #[test]
    fn any_filter_id_is_accepted() {
        let mut params = FilterParams::default();
        params.select_filter("bogus");
        assert_eq!(params.filter_id(), "bogus");
    }
}
