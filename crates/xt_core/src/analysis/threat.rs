//! # Expected Threat (xT)
//!
//! Values completed passes by the change in expected threat between the zone
//! the pass started in and the zone it ended in.
//!
//! ## Binning
//! Each axis is cut into equal-width intervals spanning the whole pitch:
//!
//! `bin = floor((coord - axis_min) * bins / axis_len)`, clamped to `[0, bins - 1]`
//!
//! Intervals are left-closed, so a coordinate on a boundary falls into the
//! higher bin. Rows index the y-axis, columns the x-axis (towards the
//! attacking goal).

use serde::{Deserialize, Serialize};

use crate::analysis::network::Selection;
use crate::error::{Result, XtError};
use crate::models::events::{Event, EventTable, PitchPoint};

/// Reference xT table: 8 rows (y) by 12 columns (x).
pub const REFERENCE_XT: [[f64; 12]; 8] = [
    [0.00788321, 0.00803695, 0.00819069, 0.00834443, 0.00849817, 0.00865191, 0.00880565, 0.00895939, 0.00911313, 0.00926687, 0.00942061, 0.00957435],
    [0.0088734, 0.0090333, 0.0091932, 0.0093531, 0.009513, 0.0096729, 0.0098328, 0.0099927, 0.0101526, 0.0103125, 0.0104724, 0.0106323],
    [0.0100782, 0.01024346, 0.01040872, 0.01057398, 0.01073924, 0.0109045, 0.01106976, 0.01123502, 0.01140028, 0.01156554, 0.0117308, 0.01189606],
    [0.01160358, 0.01176214, 0.0119207, 0.01207926, 0.01223782, 0.01239638, 0.01255494, 0.0127135, 0.01287206, 0.01303062, 0.01318918, 0.01334774],
    [0.0135894, 0.01377488, 0.01396036, 0.01414584, 0.01433132, 0.0145168, 0.01470228, 0.01488776, 0.01507324, 0.01525872, 0.0154442, 0.01562968],
    [0.0163351, 0.01662998, 0.01692486, 0.01721974, 0.01751462, 0.0178095, 0.01810438, 0.01839926, 0.01869414, 0.01898902, 0.0192839, 0.01957878],
    [0.0205843, 0.02118331, 0.02178232, 0.02238133, 0.02298034, 0.02357935, 0.02417836, 0.02477737, 0.02537638, 0.02597539, 0.0265744, 0.02717341],
    [0.0287163, 0.03043633, 0.03215636, 0.03387639, 0.03559642, 0.03731645, 0.03903648, 0.04075651, 0.04247654, 0.04419657, 0.0459166, 0.04763663],
];

/// Pitch extent in provider coordinates (x along the length).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchDims {
    pub length: f64,
    pub width: f64,
}

impl Default for PitchDims {
    fn default() -> Self {
        // StatsBomb pitch
        Self {
            length: 120.0,
            width: 80.0,
        }
    }
}

/// Left-closed linear binning of one coordinate.
///
/// Returns `None` for non-finite coordinates or a degenerate axis.
pub fn bin(coord: f64, axis_min: f64, axis_len: f64, bins: usize) -> Option<usize> {
    if !coord.is_finite() || bins == 0 || axis_len.is_nan() || axis_len <= 0.0 {
        return None;
    }
    let raw = ((coord - axis_min) * bins as f64 / axis_len).floor();
    Some(raw.clamp(0.0, (bins - 1) as f64) as usize)
}

/// Immutable threat value table indexed by (row, column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct ThreatGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl ThreatGrid {
    /// Validate a rectangular, non-empty table of finite non-negative values.
    pub fn new(table: Vec<Vec<f64>>) -> Result<Self> {
        let rows = table.len();
        let cols = table.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(XtError::InvalidGrid("grid must have at least one cell".into()));
        }
        if let Some(r) = table.iter().position(|row| row.len() != cols) {
            return Err(XtError::InvalidGrid(format!(
                "row {r} has {} columns, expected {cols}",
                table[r].len()
            )));
        }

        let values: Vec<f64> = table.into_iter().flatten().collect();
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(XtError::InvalidGrid(format!("invalid threat value {bad}")));
        }

        Ok(Self { rows, cols, values })
    }

    pub fn reference() -> Self {
        Self {
            rows: REFERENCE_XT.len(),
            cols: REFERENCE_XT[0].len(),
            values: REFERENCE_XT.iter().flatten().copied().collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values.get(row * self.cols + col).copied()
    }

    /// (row, column) of the zone containing `point`.
    pub fn cell_of(&self, point: PitchPoint, dims: PitchDims) -> Option<(usize, usize)> {
        let col = bin(point.x, 0.0, dims.length, self.cols)?;
        let row = bin(point.y, 0.0, dims.width, self.rows)?;
        Some((row, col))
    }

    pub fn value_at(&self, point: PitchPoint, dims: PitchDims) -> Option<f64> {
        let (row, col) = self.cell_of(point, dims)?;
        self.value(row, col)
    }
}

impl Default for ThreatGrid {
    fn default() -> Self {
        Self::reference()
    }
}

impl TryFrom<Vec<Vec<f64>>> for ThreatGrid {
    type Error = XtError;

    fn try_from(table: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(table)
    }
}

impl From<ThreatGrid> for Vec<Vec<f64>> {
    fn from(grid: ThreatGrid) -> Self {
        grid.values.chunks(grid.cols).map(<[f64]>::to_vec).collect()
    }
}

/// A completed pass valued by the threat it added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPass {
    /// Position of the pass in the event table
    pub order: usize,
    pub player: Option<String>,
    pub minute: u32,
    pub second: u32,
    pub start: PitchPoint,
    pub end: PitchPoint,
    pub xt_start: f64,
    pub xt_end: f64,
    /// `xt_end - xt_start`; negative for passes into less dangerous zones
    pub xt_added: f64,
}

/// Score the completed passes of a selection, in event order.
///
/// Fails with [`XtError::InsufficientData`] when the selection has no
/// completed pass with both a start and an end location.
pub fn score_passes(
    table: &EventTable,
    selection: &Selection,
    grid: &ThreatGrid,
    dims: PitchDims,
) -> Result<Vec<ScoredPass>> {
    let candidates: Vec<(usize, &Event, PitchPoint, PitchPoint)> = table
        .iter()
        .enumerate()
        .filter(|(_, e)| selection.matches(e) && e.is_completed_pass())
        .filter_map(|(order, e)| Some((order, e, e.location?, e.pass_end_location?)))
        .collect();

    if candidates.is_empty() {
        return Err(XtError::InsufficientData(format!(
            "no completed passes with locations for {selection}"
        )));
    }

    let scored: Vec<ScoredPass> = candidates
        .into_iter()
        .filter_map(|(order, e, start, end)| {
            let xt_start = grid.value_at(start, dims)?;
            let xt_end = grid.value_at(end, dims)?;
            Some(ScoredPass {
                order,
                player: e.player.clone(),
                minute: e.minute,
                second: e.second,
                start,
                end,
                xt_start,
                xt_end,
                xt_added: xt_end - xt_start,
            })
        })
        .collect();

    if scored.is_empty() {
        return Err(XtError::InsufficientData(format!(
            "no completed pass of {selection} could be placed on the threat grid"
        )));
    }

    log::debug!("{selection}: scored {} completed passes", scored.len());
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_is_left_closed_and_clamped() {
        assert_eq!(bin(0.0, 0.0, 120.0, 12), Some(0));
        assert_eq!(bin(9.999, 0.0, 120.0, 12), Some(0));
        assert_eq!(bin(10.0, 0.0, 120.0, 12), Some(1));
        assert_eq!(bin(60.0, 0.0, 120.0, 12), Some(6));
        assert_eq!(bin(120.0, 0.0, 120.0, 12), Some(11));
        assert_eq!(bin(130.0, 0.0, 120.0, 12), Some(11));
        assert_eq!(bin(-3.0, 0.0, 120.0, 12), Some(0));
        assert_eq!(bin(10.0, 0.0, 80.0, 8), Some(1));
    }

    #[test]
    fn test_bin_rejects_undefined_input() {
        assert_eq!(bin(f64::NAN, 0.0, 120.0, 12), None);
        assert_eq!(bin(f64::INFINITY, 0.0, 120.0, 12), None);
        assert_eq!(bin(5.0, 0.0, 0.0, 12), None);
        assert_eq!(bin(5.0, 0.0, 120.0, 0), None);
    }

    #[test]
    fn test_reference_grid_shape_and_monotonic_columns() {
        let grid = ThreatGrid::reference();
        assert_eq!((grid.rows(), grid.cols()), (8, 12));
        for row in 0..grid.rows() {
            for col in 1..grid.cols() {
                assert!(grid.value(row, col).unwrap() >= grid.value(row, col - 1).unwrap());
            }
        }
        assert_eq!(grid.value(8, 0), None);
        assert_eq!(grid.value(0, 12), None);
    }

    #[test]
    fn test_cell_lookup_uses_row_for_y() {
        let grid = ThreatGrid::reference();
        let dims = PitchDims::default();
        assert_eq!(grid.cell_of(PitchPoint::new(115.0, 75.0), dims), Some((7, 11)));
        assert_eq!(grid.value_at(PitchPoint::new(115.0, 75.0), dims), Some(0.04763663));
        assert_eq!(grid.value_at(PitchPoint::new(0.0, 0.0), dims), Some(0.00788321));
    }

    #[test]
    fn test_grid_validation() {
        assert!(ThreatGrid::new(vec![]).is_err());
        assert!(ThreatGrid::new(vec![vec![0.1, 0.2], vec![0.3]]).is_err());
        assert!(ThreatGrid::new(vec![vec![0.1, -0.2]]).is_err());
        assert!(ThreatGrid::new(vec![vec![0.1, f64::NAN]]).is_err());

        let grid = ThreatGrid::new(vec![vec![0.1, 0.2], vec![0.3, 0.4]]).unwrap();
        assert_eq!(grid.value(1, 0), Some(0.3));
        let table: Vec<Vec<f64>> = grid.into();
        assert_eq!(table, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn test_grid_deserializes_from_nested_arrays() {
        let grid: ThreatGrid = serde_json::from_str("[[0.0, 1.0], [2.0, 3.0]]").unwrap();
        assert_eq!(grid.cols(), 2);
        assert!(serde_json::from_str::<ThreatGrid>("[[0.0, 1.0], [2.0]]").is_err());
    }

    #[test]
    fn test_score_passes_values_and_filters() {
        let table: EventTable = vec![
            Event::pass("Home", 1, "A", "B", (5.0, 5.0), (115.0, 75.0)).at(3, 14),
            Event::pass("Home", 1, "B", "A", (60.0, 40.0), (60.0, 40.0)),
            Event::pass("Home", 1, "A", "B", (5.0, 5.0), (115.0, 75.0)).with_outcome("Incomplete"),
            Event::pass("Away", 1, "X", "Y", (5.0, 5.0), (115.0, 75.0)),
            Event::new("Home", 1, "Pass").with_player("C").with_location(PitchPoint::new(1.0, 1.0)),
        ]
        .into_iter()
        .collect();

        let scored = score_passes(&table, &Selection::new("Home", 1), &ThreatGrid::reference(), PitchDims::default()).unwrap();
        assert_eq!(scored.len(), 2);

        let first = &scored[0];
        assert_eq!(first.order, 0);
        assert_eq!((first.minute, first.second), (3, 14));
        assert!((first.xt_added - (0.04763663 - 0.00788321)).abs() < 1e-12);

        assert_eq!(scored[1].xt_added, 0.0, "pass ending where it started adds nothing");
    }

    #[test]
    fn test_score_passes_insufficient_data() {
        let table: EventTable = vec![
            Event::pass("Home", 1, "A", "B", (5.0, 5.0), (115.0, 75.0)).with_outcome("Out"),
        ]
        .into_iter()
        .collect();

        let err = score_passes(&table, &Selection::new("Home", 1), &ThreatGrid::reference(), PitchDims::default()).unwrap_err();
        assert!(matches!(err, XtError::InsufficientData(_)));
        assert!(!err.is_fatal());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: binning never leaves [0, bins - 1]
            #[test]
            fn prop_bin_in_range(coord in -500.0f64..500.0, bins in 1usize..40) {
                let b = bin(coord, 0.0, 120.0, bins).unwrap();
                prop_assert!(b < bins);
            }

            /// Property: lookup is deterministic and a stationary pass adds no threat
            #[test]
            fn prop_stationary_pass_adds_nothing(x in 0.0f64..120.0, y in 0.0f64..80.0) {
                let grid = ThreatGrid::reference();
                let dims = PitchDims::default();
                let p = PitchPoint::new(x, y);
                prop_assert_eq!(grid.cell_of(p, dims), grid.cell_of(p, dims));

                let table: EventTable = vec![Event::pass("T", 1, "A", "B", (x, y), (x, y))]
                    .into_iter()
                    .collect();
                let scored = score_passes(&table, &Selection::new("T", 1), &grid, dims).unwrap();
                prop_assert_eq!(scored[0].xt_added, 0.0);
            }
        }
    }
}
