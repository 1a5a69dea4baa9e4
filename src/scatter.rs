//! 3D scatter pipeline - raw coordinate/label text to renderer points
//!
//! Input formats (positionally aligned, newline-delimited):
//! - coordinates: up to 3 comma-separated floats per row (x[,y[,z]])
//! - labels: one point name per row
//! - scores: `label:value` pairs
//!
//! Malformed rows are skipped, never fatal. Conversion happens on the fly
//! per visualization request; nothing persists across requests.

use crate::color::{self, Legend, Rgb, SCORE_PALETTE};
use serde::Serialize;
use std::collections::HashMap;

/// One named point of the dataset space
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point3D {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Observed min/max along one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisExtrema {
    pub min: f64,
    pub max: f64,
}

/// How points get their color
#[derive(Debug, Clone)]
pub enum ColorMode {
    /// Clear any previous coloring; no legend
    None,
    /// Each axis drives one RGB channel of its own point
    ByPosition,
    /// Normalized score selects a slot of the 8-color palette
    ByScores(HashMap<String, f64>),
}

/// Parse coordinate + label text into points.
///
/// A row is kept only when at least one coordinate field parses to a
/// non-NaN number; missing trailing fields default to 0.0. Rows without a
/// matching label are dropped as a data-quality condition.
pub fn parse_points(coordinates: &str, labels: &str) -> Vec<Point3D> {
    let labels: Vec<&str> = labels.lines().collect();
    let mut points = Vec::new();

    for (row, line) in coordinates.lines().enumerate() {
        let mut axes = [0.0f64; 3];
        let mut defined = false;
        for (axis, field) in line.split(',').take(3).enumerate() {
            if let Ok(value) = field.trim().parse::<f64>() {
                if !value.is_nan() {
                    axes[axis] = value;
                    defined = true;
                }
            }
        }
        if !defined {
            tracing::debug!("Skipping unparsable coordinate row {}: {:?}", row, line);
            continue;
        }

        let name = match labels.get(row).map(|l| l.trim()) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => {
                tracing::warn!("Coordinate row {} has no label, dropping point", row);
                continue;
            }
        };

        points.push(Point3D {
            name,
            x: axes[0],
            y: axes[1],
            z: axes[2],
            color: None,
            score: None,
        });
    }

    points
}

/// Scan all points once for per-axis extrema.
///
/// Returns `None` for an empty cloud; there is no meaningful range to
/// normalize against.
pub fn compute_extrema(points: &[Point3D]) -> Option<[AxisExtrema; 3]> {
    let first = points.first()?;
    let mut extrema = [
        AxisExtrema { min: first.x, max: first.x },
        AxisExtrema { min: first.y, max: first.y },
        AxisExtrema { min: first.z, max: first.z },
    ];
    for p in points {
        for (axis, value) in [p.x, p.y, p.z].into_iter().enumerate() {
            if value < extrema[axis].min {
                extrema[axis].min = value;
            }
            if value > extrema[axis].max {
                extrema[axis].max = value;
            }
        }
    }
    Some(extrema)
}

/// Color each point by its own normalized position.
///
/// Channel = `floor(normalized * 255)` per axis; a zero-width axis
/// contributes channel 0 instead of dividing by zero.
pub fn colorize_by_position(points: &mut [Point3D], extrema: &[AxisExtrema; 3]) {
    for p in points.iter_mut() {
        let mut channels = [0u8; 3];
        for (axis, value) in [p.x, p.y, p.z].into_iter().enumerate() {
            let AxisExtrema { min, max } = extrema[axis];
            if max > min {
                channels[axis] = (((value - min) / (max - min)) * 255.0).floor() as u8;
            }
        }
        p.color = Some(Rgb::new(channels[0], channels[1], channels[2]));
    }
}

/// Parse `label:value` score text into a mapping.
///
/// Rows without a `:`, or with an unparsable/NaN value, are skipped.
pub fn parse_scores(text: &str) -> HashMap<String, f64> {
    let mut scores = HashMap::new();
    for line in text.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        match value.trim().parse::<f64>() {
            Ok(v) if !v.is_nan() => {
                scores.insert(label.trim().to_string(), v);
            }
            _ => {
                tracing::debug!("Skipping unparsable score row: {:?}", line);
            }
        }
    }
    scores
}

/// Color points by their normalized scores; returns the slot legend.
///
/// Min/max are taken over the provided scores only. Points without a score
/// keep their current color. A constant score range maps every scored
/// point to slot 0 (the zero-default branch for degenerate ranges).
pub fn colorize_by_scores(points: &mut [Point3D], scores: &HashMap<String, f64>) -> Legend {
    let mut legend = Legend::new(SCORE_PALETTE.len());
    let Some((&min, &max)) = min_max(scores) else {
        return legend;
    };

    for p in points.iter_mut() {
        let Some(&score) = scores.get(&p.name) else {
            continue;
        };
        let slot = color::bucket_index(score, min, max, SCORE_PALETTE.len()).unwrap_or(0);
        p.score = Some(score);
        p.color = Some(SCORE_PALETTE[slot]);
        legend.observe(slot, score);
    }
    legend
}

/// Apply a color mode; `ByScores` yields the legend, the others do not.
pub fn apply_color_mode(
    points: &mut [Point3D],
    mode: &ColorMode,
    extrema: Option<&[AxisExtrema; 3]>,
) -> Option<Legend> {
    match mode {
        ColorMode::None => {
            for p in points.iter_mut() {
                p.color = None;
                p.score = None;
            }
            None
        }
        ColorMode::ByPosition => {
            if let Some(extrema) = extrema {
                colorize_by_position(points, extrema);
            }
            None
        }
        ColorMode::ByScores(scores) => Some(colorize_by_scores(points, scores)),
    }
}

fn min_max(scores: &HashMap<String, f64>) -> Option<(&f64, &f64)> {
    let mut iter = scores.values();
    let first = iter.next()?;
    let mut min = first;
    let mut max = first;
    for v in iter {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_points() {
        let points = parse_points("1,2,3\n4,5,6", "A\nB");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "A");
        assert_eq!((points[0].x, points[0].y, points[0].z), (1.0, 2.0, 3.0));
        assert_eq!(points[1].name, "B");
        assert_eq!((points[1].x, points[1].y, points[1].z), (4.0, 5.0, 6.0));
    }

    #[test]
    fn test_parse_missing_fields_default_to_zero() {
        let points = parse_points("1\n2,3", "A\nB");
        assert_eq!((points[0].x, points[0].y, points[0].z), (1.0, 0.0, 0.0));
        assert_eq!((points[1].x, points[1].y, points[1].z), (2.0, 3.0, 0.0));
    }

    #[test]
    fn test_parse_drops_unparsable_rows() {
        let points = parse_points("1,2,3\nnot,numeric,row\n7,8,9", "A\nB\nC");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "A");
        assert_eq!(points[1].name, "C");
    }

    #[test]
    fn test_parse_partial_row_kept() {
        // one good field is enough
        let points = parse_points("x,2,y", "A");
        assert_eq!(points.len(), 1);
        assert_eq!((points[0].x, points[0].y, points[0].z), (0.0, 2.0, 0.0));
    }

    #[test]
    fn test_parse_drops_unlabeled_rows() {
        let points = parse_points("1,2,3\n4,5,6", "A");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "A");
    }

    #[test]
    fn test_extrema_two_points() {
        let points = parse_points("1,2,3\n4,5,6", "A\nB");
        let [x, y, z] = compute_extrema(&points).unwrap();
        assert_eq!((x.min, x.max), (1.0, 4.0));
        assert_eq!((y.min, y.max), (2.0, 5.0));
        assert_eq!((z.min, z.max), (3.0, 6.0));
    }

    #[test]
    fn test_extrema_empty_cloud() {
        assert!(compute_extrema(&[]).is_none());
    }

    #[test]
    fn test_single_point_colors_black() {
        let mut points = parse_points("2,3,4", "A");
        let extrema = compute_extrema(&points).unwrap();
        for axis in &extrema {
            assert_eq!(axis.min, axis.max);
        }
        colorize_by_position(&mut points, &extrema);
        assert_eq!(points[0].color, Some(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn test_colorize_by_position_channels() {
        let mut points = parse_points("0,0,0\n1,2,4", "A\nB");
        let extrema = compute_extrema(&points).unwrap();
        colorize_by_position(&mut points, &extrema);
        assert_eq!(points[0].color, Some(Rgb::new(0, 0, 0)));
        assert_eq!(points[1].color, Some(Rgb::new(255, 255, 255)));
    }

    #[test]
    fn test_score_coloring_extreme_slots() {
        let mut points = parse_points("1,2,3\n4,5,6", "A\nB");
        let scores = parse_scores("A:0.2\nB:0.8");
        let legend = colorize_by_scores(&mut points, &scores);

        assert_eq!(points[0].color, Some(SCORE_PALETTE[0]));
        assert_eq!(points[0].score, Some(0.2));
        assert_eq!(points[1].color, Some(SCORE_PALETTE[7]));
        assert_eq!(points[1].score, Some(0.8));

        let low = legend.slots()[0].unwrap();
        assert_eq!((low.min, low.max, low.count), (0.2, 0.2, 1));
        let high = legend.slots()[7].unwrap();
        assert_eq!((high.min, high.max, high.count), (0.8, 0.8, 1));
        assert!(legend.slots()[3].is_none());
    }

    #[test]
    fn test_score_coloring_skips_unscored_points() {
        let mut points = parse_points("1,2,3\n4,5,6", "A\nB");
        let scores = parse_scores("A:0.5");
        colorize_by_scores(&mut points, &scores);
        assert!(points[0].color.is_some());
        assert!(points[1].color.is_none());
    }

    #[test]
    fn test_constant_scores_use_slot_zero() {
        let mut points = parse_points("1,2,3\n4,5,6", "A\nB");
        let scores = parse_scores("A:0.5\nB:0.5");
        let legend = colorize_by_scores(&mut points, &scores);
        assert_eq!(points[0].color, Some(SCORE_PALETTE[0]));
        assert_eq!(points[1].color, Some(SCORE_PALETTE[0]));
        assert_eq!(legend.slots()[0].unwrap().count, 2);
    }

    #[test]
    fn test_color_mode_none_resets() {
        let mut points = parse_points("1,2,3\n4,5,6", "A\nB");
        let scores = parse_scores("A:0.2\nB:0.8");
        apply_color_mode(&mut points, &ColorMode::ByScores(scores), None);
        assert!(points[0].color.is_some());

        let legend = apply_color_mode(&mut points, &ColorMode::None, None);
        assert!(legend.is_none());
        for p in &points {
            assert!(p.color.is_none());
            assert!(p.score.is_none());
        }
    }

    #[test]
    fn test_parse_scores_tolerates_garbage() {
        let scores = parse_scores("A:0.2\nmalformed line\nB:oops\nC:NaN\nD:0.4");
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["A"], 0.2);
        assert_eq!(scores["D"], 0.4);
    }
}
