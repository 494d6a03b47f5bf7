// src/selection/mod.rs
//! Subsetting of N-dimensional datasets and frame navigation
//!
//! A [`Selection`] fixes which part of a dataset a 2-D view shows. A
//! [`FrameNavigator`] steps that window through the dimension beyond rows
//! and columns, reloading data from a [`DataSource`] as it goes.

mod frame;
mod memory;
mod subset;

pub use frame::{DataSource, FrameNavigator};
pub use memory::MemoryDataSource;
pub use subset::{DimVec, Selection};
