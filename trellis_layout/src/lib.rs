// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Layout: row, column and grid arrangement of boxes.
//!
//! A layout container is an ordinary box whose children get repositioned by
//! one of the arrangement functions here:
//!
//! - [`arrange_row`] packs children left to right with uniform spacing,
//!   aligning each child vertically against the tallest child.
//! - [`arrange_column`] is the transpose: bottom to top, aligned against the
//!   widest child.
//! - [`build_grid`] partitions a flat list of boxes into a column of rows
//!   (when `num_columns` is set) or a row of columns (when `num_rows` is),
//!   filling from the bottom-left; the final lane may run short.
//!
//! The host decides *when* to re-arrange (typically whenever a child is
//! added or removed); the functions always finish by re-resolving the
//! container's rect so a fit-children container hugs its content.
//!
//! A grid with neither `num_columns` nor `num_rows` is undefined and is
//! rejected up front, as is a zero lane width.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::Range;

use kurbo::Point;
use thiserror::Error;
use trellis_box::{
    BoxDefinition, BoxTree, CENTER_CENTER, HorizontalAlignment, NodeId, PositionalAnchor,
    VerticalAlignment,
};

/// Configuration for a layout container.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutDefinition {
    /// Pixels left between adjacent boxes.
    pub spacing: f64,
    /// When set, boxes fill row by row, `num_columns` per row, stacking
    /// rows upward to at most `num_rows` of them.
    pub num_columns: Option<usize>,
    /// When set (and `num_columns` is not), boxes fill column by column,
    /// `num_rows` per column, left to right up to `num_columns` of them.
    pub num_rows: Option<usize>,
    /// The point of each box aligned within its row or column.
    pub alignment: PositionalAnchor,
}

impl Default for LayoutDefinition {
    /// A single row with 10px spacing and centered alignment.
    fn default() -> Self {
        Self {
            spacing: 10.0,
            num_columns: None,
            num_rows: Some(1),
            alignment: CENTER_CENTER,
        }
    }
}

/// A layout definition was rejected.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// A grid needs `num_columns` or `num_rows` to be set.
    #[error("grid layout is undefined with both num_columns and num_rows unset")]
    UnconstrainedGrid,
    /// Lanes of zero boxes can never hold anything.
    #[error("grid lanes must hold at least one box")]
    EmptyLane,
}

/// What shape a [`LayoutDefinition`] describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arrangement {
    /// A single row.
    Row,
    /// A single column.
    Column,
    /// A rectangular grid with the given orientation.
    Grid(GridOrientation),
}

/// Which way a grid nests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GridOrientation {
    /// `num_columns` boxes per row, rows stacked into a column.
    ColumnOfRows,
    /// `num_rows` boxes per column, columns packed into a row.
    RowOfColumns,
}

/// Classify a layout definition.
pub fn arrangement_of(definition: &LayoutDefinition) -> Result<Arrangement, LayoutError> {
    match (definition.num_columns, definition.num_rows) {
        (None, Some(1)) => Ok(Arrangement::Row),
        (Some(1), None) => Ok(Arrangement::Column),
        (Some(0), _) | (_, Some(0)) => Err(LayoutError::EmptyLane),
        (Some(_), _) => Ok(Arrangement::Grid(GridOrientation::ColumnOfRows)),
        (None, Some(_)) => Ok(Arrangement::Grid(GridOrientation::RowOfColumns)),
        (None, None) => Err(LayoutError::UnconstrainedGrid),
    }
}

/// Pack the container's children into a row, left to right.
///
/// Children keep their order; each is aligned vertically per
/// `alignment.vertical` against the tallest child. The container's rect is
/// re-resolved afterwards.
pub fn arrange_row(tree: &mut BoxTree, container: NodeId, definition: &LayoutDefinition) {
    let children: Vec<NodeId> = tree.children_of(container).into();
    if children.is_empty() {
        return;
    }
    let tallest = children
        .iter()
        .filter_map(|&c| tree.size(c))
        .fold(0.0_f64, |acc, s| acc.max(s.height));
    let mut x_total = 0.0;
    for child in children {
        let Some(size) = tree.size(child) else { continue };
        let y = match definition.alignment.vertical {
            VerticalAlignment::Bottom => 0.0,
            VerticalAlignment::Center => (tallest - size.height) / 2.0,
            VerticalAlignment::Top => tallest - size.height,
        };
        tree.set_position(child, Point::new(x_total, y));
        x_total += size.width + definition.spacing;
    }
    tree.update_rect(container);
}

/// Pack the container's children into a column, bottom to top.
///
/// The transpose of [`arrange_row`]: children are aligned horizontally per
/// `alignment.horizontal` against the widest child.
pub fn arrange_column(tree: &mut BoxTree, container: NodeId, definition: &LayoutDefinition) {
    let children: Vec<NodeId> = tree.children_of(container).into();
    if children.is_empty() {
        return;
    }
    let widest = children
        .iter()
        .filter_map(|&c| tree.size(c))
        .fold(0.0_f64, |acc, s| acc.max(s.width));
    let mut y_total = 0.0;
    for child in children {
        let Some(size) = tree.size(child) else { continue };
        let x = match definition.alignment.horizontal {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => (widest - size.width) / 2.0,
            HorizontalAlignment::Right => widest - size.width,
        };
        tree.set_position(child, Point::new(x, y_total));
        y_total += size.height + definition.spacing;
    }
    tree.update_rect(container);
}

/// Partition `count` boxes into grid lanes.
///
/// Returns the orientation and one index range per lane, filling from the
/// bottom-left. The final lane may be short; lanes beyond the configured
/// maximum are dropped.
pub fn grid_batches(
    definition: &LayoutDefinition,
    count: usize,
) -> Result<(GridOrientation, Vec<Range<usize>>), LayoutError> {
    let (orientation, per_lane, max_lanes) = match (definition.num_columns, definition.num_rows) {
        (Some(0), _) | (_, Some(0)) => return Err(LayoutError::EmptyLane),
        (Some(columns), rows) => (GridOrientation::ColumnOfRows, columns, rows),
        (None, Some(rows)) => (GridOrientation::RowOfColumns, rows, definition.num_columns),
        (None, None) => return Err(LayoutError::UnconstrainedGrid),
    };
    let max_lanes = max_lanes.unwrap_or(count.max(1));
    let mut lanes = Vec::new();
    let mut start = 0;
    while start < count && lanes.len() < max_lanes {
        let end = (start + per_lane).min(count);
        lanes.push(start..end);
        start = end;
    }
    Ok((orientation, lanes))
}

/// Containers created by [`build_grid`].
#[derive(Clone, Debug, PartialEq)]
pub struct GridHandles {
    /// The outer container holding the lanes.
    pub outer: NodeId,
    /// One inner container per lane, in fill order.
    pub lanes: Vec<NodeId>,
    /// Which way the grid nests.
    pub orientation: GridOrientation,
}

/// Build a rectangular grid of the given boxes.
///
/// Creates fit-children containers: one per lane plus an outer container,
/// all arranged with the same definition. The boxes must be detached; they
/// are attached to the lane containers in order.
pub fn build_grid(
    tree: &mut BoxTree,
    definition: &LayoutDefinition,
    boxes: &[NodeId],
) -> Result<GridHandles, LayoutError> {
    let (orientation, ranges) = grid_batches(definition, boxes.len())?;
    let outer = tree
        .insert(None, BoxDefinition::default())
        .expect("default definition is valid");
    let mut lanes = Vec::with_capacity(ranges.len());
    for range in ranges {
        let lane = tree
            .insert(Some(outer), BoxDefinition::default())
            .expect("default definition is valid");
        for &b in &boxes[range] {
            tree.attach(b, lane, 0, false);
        }
        match orientation {
            GridOrientation::ColumnOfRows => arrange_row(tree, lane, definition),
            GridOrientation::RowOfColumns => arrange_column(tree, lane, definition),
        }
        lanes.push(lane);
    }
    match orientation {
        GridOrientation::ColumnOfRows => arrange_column(tree, outer, definition),
        GridOrientation::RowOfColumns => arrange_row(tree, outer, definition),
    }
    Ok(GridHandles {
        outer,
        lanes,
        orientation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use trellis_box::{CENTER_BOTTOM, CENTER_TOP, LEFT_CENTER, RIGHT_CENTER};

    fn boxes(tree: &mut BoxTree, parent: NodeId, sizes: &[(f64, f64)]) -> Vec<NodeId> {
        sizes
            .iter()
            .map(|&(w, h)| {
                tree.insert(Some(parent), BoxDefinition::sized(w, h))
                    .unwrap()
            })
            .collect()
    }

    fn def(spacing: f64, alignment: PositionalAnchor) -> LayoutDefinition {
        LayoutDefinition {
            spacing,
            alignment,
            ..LayoutDefinition::default()
        }
    }

    #[test]
    fn row_packs_left_to_right_with_spacing() {
        let mut tree = BoxTree::new();
        let row = tree.insert(None, BoxDefinition::default()).unwrap();
        let ids = boxes(&mut tree, row, &[(10.0, 30.0), (20.0, 10.0), (5.0, 20.0)]);

        arrange_row(&mut tree, row, &def(4.0, CENTER_BOTTOM));
        assert_eq!(tree.position(ids[0]).unwrap(), Point::new(0.0, 0.0));
        assert_eq!(tree.position(ids[1]).unwrap(), Point::new(14.0, 0.0));
        assert_eq!(tree.position(ids[2]).unwrap(), Point::new(38.0, 0.0));
        // The fit-children container hugged the arrangement.
        assert_eq!(tree.size(row).unwrap(), Size::new(43.0, 30.0));
    }

    #[test]
    fn row_vertical_alignment_uses_the_tallest_child() {
        let mut tree = BoxTree::new();
        let row = tree.insert(None, BoxDefinition::default()).unwrap();
        let ids = boxes(&mut tree, row, &[(10.0, 30.0), (10.0, 10.0)]);

        arrange_row(&mut tree, row, &def(0.0, CENTER_CENTER));
        assert_eq!(tree.position(ids[1]).unwrap().y, 10.0);

        arrange_row(&mut tree, row, &def(0.0, CENTER_TOP));
        assert_eq!(tree.position(ids[1]).unwrap().y, 20.0);

        arrange_row(&mut tree, row, &def(0.0, CENTER_BOTTOM));
        assert_eq!(tree.position(ids[1]).unwrap().y, 0.0);
    }

    #[test]
    fn column_packs_bottom_to_top() {
        let mut tree = BoxTree::new();
        let column = tree.insert(None, BoxDefinition::default()).unwrap();
        let ids = boxes(&mut tree, column, &[(30.0, 10.0), (10.0, 20.0)]);

        arrange_column(&mut tree, column, &def(5.0, LEFT_CENTER));
        assert_eq!(tree.position(ids[0]).unwrap(), Point::new(0.0, 0.0));
        assert_eq!(tree.position(ids[1]).unwrap(), Point::new(0.0, 15.0));
        assert_eq!(tree.size(column).unwrap(), Size::new(30.0, 35.0));

        arrange_column(&mut tree, column, &def(5.0, RIGHT_CENTER));
        assert_eq!(tree.position(ids[1]).unwrap().x, 20.0);
    }

    #[test]
    fn rearranging_after_removal_closes_the_gap() {
        let mut tree = BoxTree::new();
        let row = tree.insert(None, BoxDefinition::default()).unwrap();
        let ids = boxes(&mut tree, row, &[(10.0, 10.0), (10.0, 10.0), (10.0, 10.0)]);
        let layout = def(2.0, CENTER_BOTTOM);
        arrange_row(&mut tree, row, &layout);
        assert_eq!(tree.position(ids[2]).unwrap().x, 24.0);

        tree.remove(ids[1]);
        arrange_row(&mut tree, row, &layout);
        assert_eq!(tree.position(ids[2]).unwrap().x, 12.0);
        assert_eq!(tree.size(row).unwrap(), Size::new(22.0, 10.0));
    }

    #[test]
    fn grid_batches_fill_with_short_final_lane() {
        let layout = LayoutDefinition {
            num_columns: Some(3),
            num_rows: None,
            ..LayoutDefinition::default()
        };
        let (orientation, lanes) = grid_batches(&layout, 7).unwrap();
        assert_eq!(orientation, GridOrientation::ColumnOfRows);
        assert_eq!(lanes, alloc::vec![0..3, 3..6, 6..7]);
    }

    #[test]
    fn grid_batches_respect_the_lane_cap() {
        let layout = LayoutDefinition {
            num_columns: Some(2),
            num_rows: Some(2),
            ..LayoutDefinition::default()
        };
        let (_, lanes) = grid_batches(&layout, 10).unwrap();
        assert_eq!(lanes, alloc::vec![0..2, 2..4]);
    }

    #[test]
    fn grid_without_constraints_is_rejected() {
        let layout = LayoutDefinition {
            num_columns: None,
            num_rows: None,
            ..LayoutDefinition::default()
        };
        assert_eq!(
            grid_batches(&layout, 4).unwrap_err(),
            LayoutError::UnconstrainedGrid
        );
        assert_eq!(
            arrangement_of(&layout).unwrap_err(),
            LayoutError::UnconstrainedGrid
        );
    }

    #[test]
    fn arrangement_classification() {
        assert_eq!(
            arrangement_of(&LayoutDefinition::default()).unwrap(),
            Arrangement::Row
        );
        let column = LayoutDefinition {
            num_columns: Some(1),
            num_rows: None,
            ..LayoutDefinition::default()
        };
        assert_eq!(arrangement_of(&column).unwrap(), Arrangement::Column);
        let grid = LayoutDefinition {
            num_columns: Some(2),
            num_rows: Some(2),
            ..LayoutDefinition::default()
        };
        assert_eq!(
            arrangement_of(&grid).unwrap(),
            Arrangement::Grid(GridOrientation::ColumnOfRows)
        );
    }

    #[test]
    fn build_grid_stacks_rows_from_the_bottom_left() {
        let mut tree = BoxTree::new();
        let items: Vec<NodeId> = (0..4)
            .map(|_| tree.insert(None, BoxDefinition::sized(10.0, 10.0)).unwrap())
            .collect();
        let layout = LayoutDefinition {
            spacing: 0.0,
            num_columns: Some(2),
            num_rows: None,
            alignment: CENTER_BOTTOM,
        };
        let grid = build_grid(&mut tree, &layout, &items).unwrap();
        assert_eq!(grid.orientation, GridOrientation::ColumnOfRows);
        assert_eq!(grid.lanes.len(), 2);
        assert_eq!(tree.size(grid.outer).unwrap(), Size::new(20.0, 20.0));

        // First batch is the bottom row.
        assert_eq!(tree.parent_of(items[0]), Some(grid.lanes[0]));
        assert_eq!(tree.position(grid.lanes[0]).unwrap().y, 0.0);
        assert_eq!(tree.position(grid.lanes[1]).unwrap().y, 10.0);
        assert_eq!(tree.position(items[1]).unwrap().x, 10.0);
    }
}
