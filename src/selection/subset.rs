// src/selection/subset.rs
use crate::error::{ModelError, Result};
use smallvec::SmallVec;
use std::fmt::Write;

/// Per-dimension values; datasets of rank 4 or less stay inline
pub type DimVec = SmallVec<[u64; 4]>;

/// Rectangular sub-region of an N-dimensional dataset shown by a view
///
/// `selected_index` names the dimensions mapped to the visible rows, the
/// visible columns and the frame, in that order. Only the row and column
/// dimensions may have a count above 1, so the window is always a 2-D slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    dims: DimVec,
    start: DimVec,
    stride: DimVec,
    count: DimVec,
    selected_index: SmallVec<[usize; 3]>,
}

impl Selection {
    /// Full first frame of a dataset with extents `dims`
    ///
    /// Rows, columns and frames map to dimensions 0, 1 and 2.
    pub fn new(dims: &[u64]) -> Result<Self> {
        if dims.is_empty() {
            return Err(ModelError::InvalidSelection("dataset has rank 0".to_string()));
        }
        if let Some(d) = dims.iter().position(|&extent| extent == 0) {
            return Err(ModelError::InvalidSelection(format!("dimension {} has zero extent", d)));
        }

        let rank = dims.len();
        let mut selection = Selection {
            dims: dims.iter().copied().collect(),
            start: DimVec::from_elem(0, rank),
            stride: DimVec::from_elem(1, rank),
            count: DimVec::from_elem(1, rank),
            selected_index: (0..rank.min(3)).collect(),
        };
        selection.reset_window();
        Ok(selection)
    }

    fn reset_window(&mut self) {
        let rank = self.rank();
        self.start = DimVec::from_elem(0, rank);
        self.stride = DimVec::from_elem(1, rank);
        self.count = DimVec::from_elem(1, rank);
        for &d in self.selected_index.iter().take(2) {
            self.count[d] = self.dims[d];
        }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    pub fn start(&self) -> &[u64] {
        &self.start
    }

    pub fn stride(&self) -> &[u64] {
        &self.stride
    }

    pub fn count(&self) -> &[u64] {
        &self.count
    }

    pub fn selected_index(&self) -> &[usize] {
        &self.selected_index
    }

    /// Dimension stepped through by frame navigation, for rank 3 and above
    pub fn frame_dim(&self) -> Option<usize> {
        self.selected_index.get(2).copied()
    }

    /// Remap rows, columns and frames to other dimensions
    ///
    /// The window is reset to the full first frame of the new mapping.
    pub fn set_selected_index(&mut self, selected: &[usize]) -> Result<()> {
        let rank = self.rank();
        if selected.len() != rank.min(3) {
            return Err(ModelError::InvalidSelection(format!(
                "expected {} selected dimensions, got {}",
                rank.min(3),
                selected.len()
            )));
        }
        for (i, &d) in selected.iter().enumerate() {
            if d >= rank {
                return Err(ModelError::InvalidSelection(format!(
                    "selected dimension {} out of range for rank {}",
                    d, rank
                )));
            }
            if selected[..i].contains(&d) {
                return Err(ModelError::InvalidSelection(format!("dimension {} selected twice", d)));
            }
        }

        self.selected_index = selected.iter().copied().collect();
        self.reset_window();
        Ok(())
    }

    /// Replace start, stride and count of every dimension
    pub fn set_subset(&mut self, start: &[u64], stride: &[u64], count: &[u64]) -> Result<()> {
        let rank = self.rank();
        if start.len() != rank || stride.len() != rank || count.len() != rank {
            return Err(ModelError::InvalidSelection(format!(
                "start, stride and count must all have length {}",
                rank
            )));
        }

        for d in 0..rank {
            if stride[d] == 0 {
                return Err(ModelError::InvalidSelection(format!("stride of dimension {} is 0", d)));
            }
            if count[d] == 0 {
                return Err(ModelError::InvalidSelection(format!("count of dimension {} is 0", d)));
            }
            let displayed = self.selected_index.iter().take(2).any(|&s| s == d);
            if !displayed && count[d] != 1 {
                return Err(ModelError::InvalidSelection(format!(
                    "dimension {} is not displayed; count must be 1",
                    d
                )));
            }
            let last = (count[d] - 1)
                .checked_mul(stride[d])
                .and_then(|span| span.checked_add(start[d]));
            if !matches!(last, Some(last) if last < self.dims[d]) {
                return Err(ModelError::InvalidSelection(format!(
                    "dimension {} selection runs past extent {}",
                    d, self.dims[d]
                )));
            }
        }

        self.start = start.iter().copied().collect();
        self.stride = stride.iter().copied().collect();
        self.count = count.iter().copied().collect();
        Ok(())
    }

    /// Move the window along the frame dimension
    pub(crate) fn set_frame_start(&mut self, index: u64) -> Result<()> {
        let d = self
            .frame_dim()
            .ok_or_else(|| ModelError::InvalidSelection("dataset has no frame dimension".to_string()))?;
        if index >= self.dims[d] {
            return Err(ModelError::InvalidSelection(format!(
                "frame {} out of range for extent {}",
                index, self.dims[d]
            )));
        }
        self.start[d] = index;
        Ok(())
    }

    /// Visible row count
    pub fn height(&self) -> u64 {
        self.count[self.selected_index[0]]
    }

    /// Visible column count; 1 for one-dimensional data
    pub fn width(&self) -> u64 {
        self.selected_index.get(1).map_or(1, |&d| self.count[d])
    }

    /// Number of elements in the visible window
    pub fn window_len(&self) -> u64 {
        self.height() * self.width()
    }

    /// Dataset index shown in the header of visible row `row`
    pub fn row_label(&self, row: u64, base: i64) -> i64 {
        let d = self.selected_index[0];
        (self.start[d] + row * self.stride[d]) as i64 + base
    }

    /// Dataset index shown in the header of visible column `col`
    pub fn column_label(&self, col: u64, base: i64) -> i64 {
        match self.selected_index.get(1) {
            Some(&d) => (self.start[d] + col * self.stride[d]) as i64 + base,
            None => col as i64 + base,
        }
    }

    /// Full dataset coordinates of a visible cell
    pub fn coordinates(&self, row: u64, col: u64) -> Result<DimVec> {
        if row >= self.height() || col >= self.width() {
            return Err(ModelError::InvalidSelection(format!(
                "cell ({}, {}) outside {}x{} window",
                row,
                col,
                self.height(),
                self.width()
            )));
        }

        let mut coords = self.start.clone();
        let row_dim = self.selected_index[0];
        coords[row_dim] += row * self.stride[row_dim];
        if let Some(&col_dim) = self.selected_index.get(1) {
            coords[col_dim] += col * self.stride[col_dim];
        }
        Ok(coords)
    }

    /// Row-major offset of `coords` in the full dataset
    pub fn linear_index(&self, coords: &[u64]) -> Result<u64> {
        if coords.len() != self.rank() {
            return Err(ModelError::InvalidSelection(format!(
                "coordinates of rank {} for dataset of rank {}",
                coords.len(),
                self.rank()
            )));
        }

        let mut index = 0u64;
        for (d, (&c, &extent)) in coords.iter().zip(self.dims.iter()).enumerate() {
            if c >= extent {
                return Err(ModelError::InvalidSelection(format!(
                    "coordinate {} of dimension {} outside extent {}",
                    c, d, extent
                )));
            }
            index = index
                .checked_mul(extent)
                .and_then(|i| i.checked_add(c))
                .ok_or_else(|| ModelError::InvalidSelection("linear index overflows".to_string()))?;
        }
        Ok(index)
    }

    /// Status-line description of the subset, e.g.
    /// `"[ dims0x1x2, start0x0x3, count10x10x1, stride1x1x1 ]"`
    pub fn summary(&self) -> String {
        let sel = &self.selected_index;
        let mut out = String::from("[ dims");
        out.push_str(&joined(sel.iter().map(|&d| d as u64)));
        let _ = write!(out, ", start{}", joined(sel.iter().map(|&d| self.start[d])));
        let _ = write!(out, ", count{}", joined(sel.iter().map(|&d| self.count[d])));
        let _ = write!(out, ", stride{}", joined(sel.iter().map(|&d| self.stride[d])));
        out.push_str(" ]");
        out
    }
}

fn joined(values: impl Iterator<Item = u64>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join("x")
}
