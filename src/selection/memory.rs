// src/selection/memory.rs
use super::{DataSource, Selection};
use crate::error::{ModelError, Result};
use tracing::trace;

/// Dataset held entirely in memory, in row-major order
#[derive(Debug, Clone)]
pub struct MemoryDataSource<T> {
    selection: Selection,
    values: Vec<T>,
    window: Option<Vec<T>>,
    dirty: bool,
}

impl<T: Clone> MemoryDataSource<T> {
    /// Wrap `values` as a dataset with extents `dims`
    pub fn new(dims: &[u64], values: Vec<T>) -> Result<Self> {
        let selection = Selection::new(dims)?;
        let expected = dims
            .iter()
            .try_fold(1u64, |total, &d| total.checked_mul(d))
            .ok_or_else(|| ModelError::InvalidSelection("dataset element count overflows".to_string()))?;
        if values.len() as u64 != expected {
            return Err(ModelError::InvalidSelection(format!(
                "{} values for a dataset of {} elements",
                values.len(),
                expected
            )));
        }
        Ok(MemoryDataSource {
            selection,
            values,
            window: None,
            dirty: false,
        })
    }

    /// Whole backing array
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Loaded window in row-major order, `None` when cleared
    pub fn window(&self) -> Option<&[T]> {
        self.window.as_deref()
    }

    /// Value of a visible cell in the loaded window
    pub fn cell(&self, row: u64, col: u64) -> Option<&T> {
        let offset = self.window_offset(row, col)?;
        self.window.as_ref()?.get(offset)
    }

    /// Change a visible cell in the loaded window
    ///
    /// The backing array is untouched until [`write_back`](DataSource::write_back);
    /// until then the source reports unsaved edits.
    pub fn set_cell(&mut self, row: u64, col: u64, value: T) -> Result<()> {
        let offset = self.window_offset(row, col).ok_or_else(|| {
            ModelError::InvalidSelection(format!("cell ({}, {}) outside the window", row, col))
        })?;
        let window = self
            .window
            .as_mut()
            .ok_or_else(|| ModelError::Backend("no data loaded".to_string()))?;
        window[offset] = value;
        self.dirty = true;
        Ok(())
    }

    fn window_offset(&self, row: u64, col: u64) -> Option<usize> {
        if row >= self.selection.height() || col >= self.selection.width() {
            return None;
        }
        Some((row * self.selection.width() + col) as usize)
    }

    fn backing_offset(&self, row: u64, col: u64) -> Result<usize> {
        let coords = self.selection.coordinates(row, col)?;
        Ok(self.selection.linear_index(&coords)? as usize)
    }
}

impl<T: Clone> DataSource for MemoryDataSource<T> {
    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    fn load(&mut self) -> Result<()> {
        let (height, width) = (self.selection.height(), self.selection.width());
        let mut window = Vec::with_capacity((height * width) as usize);
        for row in 0..height {
            for col in 0..width {
                let offset = self.backing_offset(row, col)?;
                window.push(self.values[offset].clone());
            }
        }
        trace!(height, width, "window loaded");
        self.window = Some(window);
        Ok(())
    }

    fn clear_data(&mut self) {
        self.window = None;
        self.dirty = false;
    }

    fn write_back(&mut self) -> Result<()> {
        let Some(window) = self.window.take() else {
            return Ok(());
        };
        let width = self.selection.width();
        for (i, value) in window.iter().enumerate() {
            let (row, col) = (i as u64 / width, i as u64 % width);
            let offset = self.backing_offset(row, col)?;
            self.values[offset] = value.clone();
        }
        trace!(cells = window.len(), "window written back");
        self.window = Some(window);
        self.dirty = false;
        Ok(())
    }

    fn has_unsaved_edits(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> MemoryDataSource<u32> {
        MemoryDataSource::new(&[2, 3, 4], (0..24).collect()).unwrap()
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(MemoryDataSource::new(&[2, 3], vec![0u8; 5]).is_err());
        assert!(MemoryDataSource::new(&[u64::MAX, 4], vec![0u8; 4]).is_err());
    }

    #[test]
    fn test_load_first_frame() {
        let mut source = cube();
        source.load().unwrap();
        // element (r, c, 0) sits at r*12 + c*4
        assert_eq!(source.window().unwrap(), &[0, 4, 8, 12, 16, 20]);
        assert_eq!(source.cell(1, 2), Some(&20));
    }

    #[test]
    fn test_load_strided_frame() {
        let mut source = cube();
        source.selection_mut().set_subset(&[0, 0, 3], &[1, 2, 1], &[2, 2, 1]).unwrap();
        source.load().unwrap();
        assert_eq!(source.window().unwrap(), &[3, 11, 15, 23]);
    }

    #[test]
    fn test_write_back_edits() {
        let mut source = cube();
        source.load().unwrap();
        assert!(!source.has_unsaved_edits());
        source.set_cell(0, 1, 100).unwrap();
        assert!(source.has_unsaved_edits());
        assert_eq!(source.values()[4], 4);

        source.write_back().unwrap();
        assert_eq!(source.values()[4], 100);
        assert!(source.window().is_some());
        assert!(!source.has_unsaved_edits());
    }

    #[test]
    fn test_set_cell_requires_window() {
        let mut source = cube();
        assert!(matches!(source.set_cell(0, 0, 1), Err(ModelError::Backend(_))));
        source.load().unwrap();
        assert!(source.set_cell(2, 0, 1).is_err());
        source.clear_data();
        assert!(source.window().is_none());
        assert!(source.write_back().is_ok());
    }
}
