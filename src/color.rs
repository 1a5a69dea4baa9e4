//! Color bucketing - map scalar values onto discrete palette slots
//!
//! Shared by the scatter and heatmap pipelines:
//! - 8-slot score palette (cold to hot) for point clouds
//! - 10-entry light-to-dark palette for similarity heatmaps
//! - per-slot legend accumulation (min/max/count)

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    #[error("zero-width value range [{0}, {0}] cannot be bucketed")]
    ZeroWidthRange(f64),
}

/// RGB color, serialized as the `rgb(r,g,b)` string the charting layer expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fixed 8-slot palette for score coloring, ordered from slot 0 to slot 7.
///
/// Base channel values are multiples of 100, same scale the profiler
/// front-end has always rendered.
pub const SCORE_PALETTE: [Rgb; 8] = [
    Rgb::new(0, 0, 0),
    Rgb::new(0, 0, 200),
    Rgb::new(0, 100, 200),
    Rgb::new(0, 200, 200),
    Rgb::new(0, 200, 0),
    Rgb::new(200, 200, 0),
    Rgb::new(200, 100, 0),
    Rgb::new(200, 0, 0),
];

/// Fixed 10-entry heatmap palette, ordered light to dark.
///
/// The threshold scale reverses this before indexing, so the lowest
/// similarity bracket draws darkest.
pub const HEATMAP_PALETTE: [Rgb; 10] = [
    Rgb::new(255, 255, 224),
    Rgb::new(255, 229, 184),
    Rgb::new(255, 202, 144),
    Rgb::new(255, 173, 106),
    Rgb::new(255, 142, 72),
    Rgb::new(249, 109, 42),
    Rgb::new(232, 76, 20),
    Rgb::new(208, 47, 4),
    Rgb::new(177, 16, 0),
    Rgb::new(139, 0, 0),
];

/// Map `value` within `[min, max]` onto one of `palette_size` slots.
///
/// `round(normalized * (palette_size - 1))`, clamped into range so
/// out-of-band values land on the edge slots.
pub fn bucket_index(
    value: f64,
    min: f64,
    max: f64,
    palette_size: usize,
) -> Result<usize, DomainError> {
    if max == min {
        return Err(DomainError::ZeroWidthRange(min));
    }
    let normalized = (value - min) / (max - min);
    let last = palette_size as f64 - 1.0;
    Ok((normalized * last).round().clamp(0.0, last) as usize)
}

/// Observed value summary for one occupied palette slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegendSlot {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Legend over a fixed palette: one optional summary per slot.
///
/// Unoccupied slots stay `None` and serialize as `null`, the explicit
/// "empty slot" marker the legend table renders as dashes.
#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    slots: Vec<Option<LegendSlot>>,
}

impl Legend {
    pub fn new(palette_size: usize) -> Self {
        Self {
            slots: vec![None; palette_size],
        }
    }

    /// Record one value landing in `slot`
    pub fn observe(&mut self, slot: usize, value: f64) {
        match &mut self.slots[slot] {
            Some(entry) => {
                if value < entry.min {
                    entry.min = value;
                }
                if value > entry.max {
                    entry.max = value;
                }
                entry.count += 1;
            }
            empty => {
                *empty = Some(LegendSlot {
                    min: value,
                    max: value,
                    count: 1,
                });
            }
        }
    }

    pub fn slots(&self) -> &[Option<LegendSlot>] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_index_endpoints() {
        assert_eq!(bucket_index(0.2, 0.2, 0.8, 8).unwrap(), 0);
        assert_eq!(bucket_index(0.8, 0.2, 0.8, 8).unwrap(), 7);
    }

    #[test]
    fn test_bucket_index_midpoint_rounds() {
        // normalized 0.5 * 7 = 3.5 rounds up
        assert_eq!(bucket_index(0.5, 0.0, 1.0, 8).unwrap(), 4);
    }

    #[test]
    fn test_bucket_index_clamps_out_of_band() {
        assert_eq!(bucket_index(-5.0, 0.0, 1.0, 8).unwrap(), 0);
        assert_eq!(bucket_index(5.0, 0.0, 1.0, 8).unwrap(), 7);
    }

    #[test]
    fn test_bucket_index_zero_width_range() {
        assert_eq!(
            bucket_index(0.5, 0.5, 0.5, 8),
            Err(DomainError::ZeroWidthRange(0.5))
        );
    }

    #[test]
    fn test_legend_accumulates() {
        let mut legend = Legend::new(8);
        legend.observe(3, 0.4);
        legend.observe(3, 0.6);
        legend.observe(3, 0.5);

        let slot = legend.slots()[3].unwrap();
        assert_eq!(slot.min, 0.4);
        assert_eq!(slot.max, 0.6);
        assert_eq!(slot.count, 3);
        assert!(legend.slots()[0].is_none());
    }

    #[test]
    fn test_rgb_wire_format() {
        assert_eq!(Rgb::new(0, 100, 200).to_string(), "rgb(0,100,200)");
    }
}
