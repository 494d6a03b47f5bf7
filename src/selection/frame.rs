// src/selection/frame.rs
use super::Selection;
use crate::config::IndexBase;
use crate::error::{ModelError, Result};
use tracing::{debug, trace, warn};

/// Storage behind a data view
///
/// The navigator moves the selection, then asks the source to reload the
/// visible window.
pub trait DataSource {
    fn selection(&self) -> &Selection;

    fn selection_mut(&mut self) -> &mut Selection;

    /// Read the window described by the current selection
    fn load(&mut self) -> Result<()>;

    /// Drop the loaded window
    fn clear_data(&mut self);

    /// Persist edits made to the loaded window
    fn write_back(&mut self) -> Result<()>;

    /// Whether the loaded window holds edits not yet written back
    fn has_unsaved_edits(&self) -> bool {
        false
    }
}

/// Steps a view through the frames of a dataset of rank 3 or more
///
/// Frame indices passed to [`goto_frame`](Self::goto_frame) are 0-based
/// positions along the frame dimension. The current frame reported by
/// [`current_frame`](Self::current_frame) is shifted by the index base, so it
/// matches what the user sees. Every navigation call returns `Ok(true)` when
/// the frame changed and `Ok(false)` when there was nothing to do.
///
/// The current frame is always read from the selection's start along the
/// frame dimension. If reloading the new frame fails that start is rolled
/// back, the window is left empty and the error is returned.
#[derive(Debug)]
pub struct FrameNavigator<S: DataSource> {
    source: S,
    index_base: IndexBase,
    edited: bool,
}

impl<S: DataSource> FrameNavigator<S> {
    pub fn new(source: S, index_base: IndexBase) -> Self {
        FrameNavigator {
            source,
            index_base,
            edited: false,
        }
    }

    /// Create a navigator and load the current window
    pub fn open(mut source: S, index_base: IndexBase) -> Result<Self> {
        source.load()?;
        Ok(Self::new(source, index_base))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    pub fn index_base(&self) -> IndexBase {
        self.index_base
    }

    pub fn selection(&self) -> &Selection {
        self.source.selection()
    }

    fn frame_extent(&self) -> Option<i64> {
        let selection = self.source.selection();
        selection.frame_dim().map(|d| selection.dims()[d] as i64)
    }

    /// Displayed number of the current frame; `None` below rank 3
    pub fn current_frame(&self) -> Option<i64> {
        frame_start(self.source.selection()).map(|start| start + self.index_base.value())
    }

    /// Displayed number of the last frame; `None` below rank 3
    pub fn max_frame(&self) -> Option<i64> {
        self.frame_extent().map(|extent| extent - 1 + self.index_base.value())
    }

    /// Header label of visible row `row`
    pub fn row_label(&self, row: u64) -> i64 {
        self.selection().row_label(row, self.index_base.value())
    }

    /// Header label of visible column `col`
    pub fn column_label(&self, col: u64) -> i64 {
        self.selection().column_label(col, self.index_base.value())
    }

    /// Record that the loaded window holds unsaved changes
    ///
    /// Only needed for sources that do not track their own edits.
    pub fn mark_edited(&mut self) {
        self.edited = true;
    }

    pub fn has_unsaved_edits(&self) -> bool {
        self.edited || self.source.has_unsaved_edits()
    }

    /// Write pending edits back to the source
    pub fn flush(&mut self) -> Result<()> {
        if self.has_unsaved_edits() {
            self.source.write_back()?;
            self.edited = false;
            trace!("edits flushed");
        }
        Ok(())
    }

    fn position(&self) -> Option<(i64, i64)> {
        let extent = self.frame_extent()?;
        Some((frame_start(self.source.selection())?, extent))
    }

    pub fn first(&mut self) -> Result<bool> {
        match self.position() {
            Some((current, _)) if current != 0 => self.goto_frame(0),
            _ => Ok(false),
        }
    }

    pub fn previous(&mut self) -> Result<bool> {
        match self.position() {
            Some((current, _)) if current != 0 => self.goto_frame(current - 1),
            _ => Ok(false),
        }
    }

    pub fn next(&mut self) -> Result<bool> {
        match self.position() {
            Some((current, extent)) if current != extent - 1 => self.goto_frame(current + 1),
            _ => Ok(false),
        }
    }

    pub fn last(&mut self) -> Result<bool> {
        match self.position() {
            Some((current, extent)) if current != extent - 1 => self.goto_frame(extent - 1),
            _ => Ok(false),
        }
    }

    /// Jump to the 0-based frame `idx`
    pub fn goto_frame(&mut self, idx: i64) -> Result<bool> {
        let Some(extent) = self.frame_extent() else {
            debug!(idx, "goto_frame: dataset has fewer than 3 dimensions");
            return Ok(false);
        };
        let base = self.index_base.value();
        let previous_start = frame_start(self.source.selection()).unwrap_or(0);
        if idx == previous_start {
            return Ok(false);
        }

        self.flush()?;

        if idx < 0 || idx >= extent {
            debug!(idx, extent, "goto_frame: frame out of range");
            return Err(ModelError::FrameOutOfRange {
                min: base,
                max: extent - 1 + base,
            });
        }

        self.source.selection_mut().set_frame_start(idx as u64)?;
        self.source.clear_data();
        trace!(frame = idx + base, "frame changed");

        if let Err(e) = self.source.load() {
            warn!(frame = idx + base, error = %e, "failed to load frame");
            self.source.selection_mut().set_frame_start(previous_start as u64)?;
            self.source.clear_data();
            debug!(frame = previous_start + base, "frame change rolled back");
            return Err(e);
        }

        Ok(true)
    }

    /// Jump to the frame the user knows as `frame`, counted from the index base
    pub fn goto_display_frame(&mut self, frame: i64) -> Result<bool> {
        self.goto_frame(frame - self.index_base.value())
    }

    /// Jump to a frame typed by the user
    ///
    /// Text that is not a number is treated as frame -1 and reported as out of
    /// range.
    pub fn goto_frame_text(&mut self, text: &str) -> Result<bool> {
        match text.trim().parse::<i64>() {
            Ok(frame) => self.goto_display_frame(frame),
            Err(_) => {
                debug!(text, "goto_frame_text: not a number");
                self.goto_frame(-1)
            }
        }
    }
}

fn frame_start(selection: &Selection) -> Option<i64> {
    selection.frame_dim().map(|d| selection.start()[d] as i64)
}
