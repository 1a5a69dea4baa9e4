//! Similarity heatmap pipeline - raw CSV to orderable dense cells
//!
//! Input format: one header line, then `row,col,value` lines where value is
//! a similarity in [0,1]. The matrix is sparse; a missing pair is "no
//! value", never zero. Malformed lines are skipped, not fatal.

use crate::color::{Rgb, HEATMAP_PALETTE};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One parsed similarity record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityEntry {
    pub row: String,
    pub col: String,
    pub value: f64,
}

/// Bijective label <-> dense position mapping, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    positions: HashMap<String, usize>,
    labels: Vec<String>,
}

impl LabelIndex {
    /// Register a label, returning its position; known labels keep theirs
    pub fn insert(&mut self, label: &str) -> usize {
        if let Some(&pos) = self.positions.get(label) {
            return pos;
        }
        let pos = self.labels.len();
        self.positions.insert(label.to_string(), pos);
        self.labels.push(label.to_string());
        pos
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Sparse labeled square matrix of pairwise similarities
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    index: LabelIndex,
    cells: HashMap<(usize, usize), f64>,
}

/// One cell of the dense projection; `value` is `None` for missing pairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatrixCell {
    pub row: usize,
    pub col: usize,
    pub value: Option<f64>,
}

impl SimilarityMatrix {
    /// Parse similarity CSV. Line 0 is the header and is skipped.
    ///
    /// Labels register in first-seen order across both row and col fields;
    /// lines with an unparsable or NaN value, or an unresolved label, are
    /// dropped without invalidating the registrations they caused.
    pub fn parse(csv: &str) -> Self {
        let mut matrix = Self::default();
        for (lineno, line) in csv.lines().enumerate().skip(1) {
            let mut fields = line.split(',');
            let row = fields.next().map(str::trim).unwrap_or("");
            let col = fields.next().map(str::trim).unwrap_or("");
            let value = fields.next().map(str::trim).unwrap_or("");

            let row_pos = (!row.is_empty()).then(|| matrix.index.insert(row));
            let col_pos = (!col.is_empty()).then(|| matrix.index.insert(col));

            let value = match value.parse::<f64>() {
                Ok(v) if !v.is_nan() => v,
                _ => {
                    tracing::debug!("Skipping similarity line {}: {:?}", lineno, line);
                    continue;
                }
            };
            if let (Some(r), Some(c)) = (row_pos, col_pos) {
                matrix.cells.insert((r, c), value);
            }
        }
        tracing::debug!(
            "Parsed similarity matrix: {} labels, {} cells",
            matrix.index.len(),
            matrix.cells.len()
        );
        matrix
    }

    pub fn labels(&self) -> &[String] {
        self.index.labels()
    }

    pub fn index(&self) -> &LabelIndex {
        &self.index
    }

    /// Similarity between two labels; `None` when the pair was never seen
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let r = self.index.get(row)?;
        let c = self.index.get(col)?;
        self.cells.get(&(r, c)).copied()
    }

    /// Minimum observed similarity, starting from the 1.0 sentinel.
    ///
    /// Values are assumed to live in [0,1]; a matrix whose smallest value
    /// exceeds 1.0 still reports 1.0.
    pub fn global_min(&self) -> f64 {
        self.cells
            .values()
            .fold(1.0, |acc, &v| if v < acc { v } else { acc })
    }

    /// Order labels for display.
    ///
    /// Empty pivot: lexicographic ascending. Otherwise descending by
    /// similarity to the pivot row, stable so equal values keep their
    /// first-seen relative order; labels the pivot has no value for sink
    /// to the end.
    pub fn reorder(&self, pivot: &str) -> Vec<String> {
        let mut ordered = self.index.labels().to_vec();
        if pivot.is_empty() {
            ordered.sort();
        } else {
            ordered.sort_by(|a, b| {
                let sa = self.get(pivot, a).unwrap_or(f64::NEG_INFINITY);
                let sb = self.get(pivot, b).unwrap_or(f64::NEG_INFINITY);
                sb.partial_cmp(&sa).unwrap_or(Ordering::Equal)
            });
        }
        ordered
    }

    /// Dense cartesian projection over an ordered label list.
    ///
    /// Missing pairs come through as `value: None`.
    pub fn project(&self, ordered: &[String]) -> Vec<MatrixCell> {
        let mut cells = Vec::with_capacity(ordered.len() * ordered.len());
        for (i, row) in ordered.iter().enumerate() {
            for (j, col) in ordered.iter().enumerate() {
                cells.push(MatrixCell {
                    row: i,
                    col: j,
                    value: self.get(row, col),
                });
            }
        }
        cells
    }

    /// All parsed entries in label form
    pub fn entries(&self) -> Vec<SimilarityEntry> {
        let labels = self.index.labels();
        let mut entries: Vec<SimilarityEntry> = self
            .cells
            .iter()
            .map(|(&(r, c), &value)| SimilarityEntry {
                row: labels[r].clone(),
                col: labels[c].clone(),
                value,
            })
            .collect();
        entries.sort_by(|a, b| (&a.row, &a.col).cmp(&(&b.row, &b.col)));
        entries
    }
}

/// Discrete color scale for heatmap cells: ascending thresholds paired
/// with the reversed 10-entry palette.
#[derive(Debug, Clone, Serialize)]
pub struct ColorScale {
    pub steps: Vec<f64>,
    pub colors: Vec<Rgb>,
}

impl ColorScale {
    /// Build the scale from the observed minimum.
    ///
    /// Thresholds start at `min` and step by `min/7` (or 0.1 when
    /// `min <= 0`) until the running value reaches 1.0; a final 1.01
    /// threshold keeps the top bracket inclusive of exactly 1.0.
    pub fn from_min(min: f64) -> Self {
        let step = if min > 0.0 { min / 7.0 } else { 0.1 };
        let mut steps = Vec::new();
        let mut value = min;
        while value < 1.0 {
            steps.push(value);
            value += step;
        }
        steps.push(value);
        steps.push(1.01);

        let colors = HEATMAP_PALETTE.iter().rev().copied().collect();
        Self { steps, colors }
    }

    /// Color for a value: the slot of the first threshold the value is at
    /// or below, clamped to the palette.
    pub fn color_for(&self, value: f64) -> Rgb {
        let slot = self
            .steps
            .iter()
            .position(|&t| value <= t)
            .unwrap_or(self.steps.len() - 1);
        self.colors[slot.min(self.colors.len() - 1)]
    }
}
