#![forbid(unsafe_code)]

//! Pointer hit testing against a [`LayoutTree`].

use dockspan_core::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::cell::{CellId, CellKind, DockDirection, SplitAxis};
use crate::tree::LayoutTree;
use crate::view_pane::PaneId;
use crate::workspace::DockKind;

/// Region of a drop target the pointer is over during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockZone {
    Left,
    Right,
    Top,
    Bottom,
    /// Join the target pane's tab group.
    Center,
}

impl DockZone {
    /// Dock request a drop in this zone stands for.
    #[must_use]
    pub const fn dock_kind(self) -> DockKind {
        match self {
            Self::Left => DockKind::Split(DockDirection::Left),
            Self::Right => DockKind::Split(DockDirection::Right),
            Self::Top => DockKind::Split(DockDirection::Top),
            Self::Bottom => DockKind::Split(DockDirection::Bottom),
            Self::Center => DockKind::AsTab,
        }
    }
}

/// Drop target under the pointer plus the zone the pointer lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockPreview {
    pub cell: CellId,
    pub zone: DockZone,
    /// Rectangle a host can highlight for this zone.
    pub highlight: Rect,
}

impl LayoutTree {
    /// Cell whose far edge is within `grip_size / 2` of `point`.
    ///
    /// The returned cell is the left/upper side of the grip; resizing it moves
    /// the boundary. `None` means the point is not on any grip.
    #[must_use]
    pub fn find_resize_cell(&self, point: Point, grip_size: i32) -> Option<CellId> {
        self.find_resize_cell_from(self.root, point, grip_size.max(0) / 2)
    }

    fn find_resize_cell_from(&self, cell: CellId, point: Point, half: i32) -> Option<CellId> {
        let node = self.cells.get(&cell)?;
        let CellKind::Container { axis, children } = &node.kind else {
            return None;
        };
        if !node.rect.contains(point) {
            return None;
        }

        let (_, rest) = children.split_last()?;
        for child in rest {
            let Some(rect) = self.cells.get(child).map(|c| c.rect) else {
                continue;
            };
            let (edge, coord) = match axis {
                SplitAxis::Horizontal => (rect.right(), point.x),
                SplitAxis::Vertical => (rect.bottom(), point.y),
            };
            if (coord - edge).abs() <= half {
                return Some(*child);
            }
        }

        children
            .iter()
            .find_map(|child| self.find_resize_cell_from(*child, point, half))
    }

    /// Leaf (or pane-less root) under `point`; `None` outside the tree.
    #[must_use]
    pub fn find_dock_cell(&self, point: Point) -> Option<CellId> {
        self.find_dock_cell_from(self.root, point)
    }

    fn find_dock_cell_from(&self, cell: CellId, point: Point) -> Option<CellId> {
        let node = self.cells.get(&cell)?;
        match &node.kind {
            CellKind::Leaf { .. } => node.rect.contains(point).then_some(cell),
            CellKind::Container { children, .. } => children
                .iter()
                .find_map(|child| self.find_dock_cell_from(*child, point)),
        }
    }

    /// Pane under `point`.
    #[must_use]
    pub fn find_pane_at(&self, point: Point) -> Option<PaneId> {
        let cell = self.find_dock_cell(point)?;
        self.cells
            .get(&cell)
            .and_then(|c| c.view_pane())
            .map(|pane| pane.id())
    }

    /// Drop target and zone for a drag hovering at `point`.
    ///
    /// The outer quarter of the target on each side maps to that edge; the
    /// middle maps to [`DockZone::Center`]. Empty leaves are always Center.
    #[must_use]
    pub fn dock_preview(&self, point: Point) -> Option<DockPreview> {
        let cell = self.find_dock_cell(point)?;
        let node = self.cells.get(&cell)?;
        let rect = node.rect;
        if node.is_empty_leaf() {
            return Some(DockPreview {
                cell,
                zone: DockZone::Center,
                highlight: rect,
            });
        }
        let zone = classify_zone(rect, point);
        Some(DockPreview {
            cell,
            zone,
            highlight: zone_rect(rect, zone, self.config.split_percent),
        })
    }
}

fn classify_zone(rect: Rect, point: Point) -> DockZone {
    let margin_x = rect.width / 4;
    let margin_y = rect.height / 4;
    let distances = [
        (DockZone::Left, point.x - rect.x, margin_x),
        (DockZone::Right, rect.right() - 1 - point.x, margin_x),
        (DockZone::Top, point.y - rect.y, margin_y),
        (DockZone::Bottom, rect.bottom() - 1 - point.y, margin_y),
    ];
    distances
        .iter()
        .filter(|(_, distance, margin)| distance < margin)
        .min_by_key(|(_, distance, _)| *distance)
        .map_or(DockZone::Center, |(zone, _, _)| *zone)
}

fn zone_rect(rect: Rect, zone: DockZone, split: f32) -> Rect {
    let w = (rect.width as f32 * split).round() as i32;
    let h = (rect.height as f32 * split).round() as i32;
    match zone {
        DockZone::Left => Rect::new(rect.x, rect.y, w, rect.height),
        DockZone::Right => Rect::new(rect.right() - w, rect.y, w, rect.height),
        DockZone::Top => Rect::new(rect.x, rect.y, rect.width, h),
        DockZone::Bottom => Rect::new(rect.x, rect.bottom() - h, rect.width, h),
        DockZone::Center => rect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab::{TabId, ViewTab};
    use crate::view_pane::ViewPane;

    fn pane(raw: u64) -> ViewPane {
        let id = PaneId::new(raw).expect("test ID must be non-zero");
        ViewPane::with_tab(id, ViewTab::new(TabId(1), format!("pane {raw}")))
    }

    fn two_column_tree() -> LayoutTree {
        let mut tree = LayoutTree::new();
        tree.set_rect(Rect::from_size(1000, 500));
        tree.dock_view_pane(tree.root(), pane(1), DockDirection::Left)
            .unwrap();
        tree.dock_view_pane(tree.root(), pane(2), DockDirection::Right)
            .unwrap();
        tree
    }

    #[test]
    fn resize_grip_on_shared_border_returns_left_cell() {
        let tree = two_column_tree();
        let left = tree.find_pane_cell(PaneId::new(1).unwrap()).unwrap();
        assert_eq!(tree.find_resize_cell(Point::new(800, 250), 4), Some(left));
        assert_eq!(tree.find_resize_cell(Point::new(798, 10), 4), Some(left));
        assert_eq!(tree.find_resize_cell(Point::new(802, 10), 4), Some(left));
    }

    #[test]
    fn resize_grip_far_from_border_is_none() {
        let tree = two_column_tree();
        assert_eq!(tree.find_resize_cell(Point::new(400, 250), 4), None);
        assert_eq!(tree.find_resize_cell(Point::new(803, 250), 4), None);
        assert_eq!(tree.find_resize_cell(Point::new(2000, 250), 4), None);
    }

    #[test]
    fn resize_grip_recurses_into_nested_containers() {
        let mut tree = two_column_tree();
        let right = tree.find_pane_cell(PaneId::new(2).unwrap()).unwrap();
        tree.dock_view_pane(right, pane(3), DockDirection::Bottom)
            .unwrap();
        let upper = tree.find_pane_cell(PaneId::new(2).unwrap()).unwrap();
        assert_eq!(tree.find_resize_cell(Point::new(900, 401), 4), Some(upper));
        // The outer vertical border still wins where it is hit.
        let left = tree.find_pane_cell(PaneId::new(1).unwrap()).unwrap();
        assert_eq!(tree.find_resize_cell(Point::new(800, 400), 4), Some(left));
    }

    #[test]
    fn dock_cell_resolves_leaf_under_pointer() {
        let tree = two_column_tree();
        let right = tree.find_pane_cell(PaneId::new(2).unwrap()).unwrap();
        assert_eq!(tree.find_dock_cell(Point::new(900, 100)), Some(right));
        assert_eq!(tree.find_pane_at(Point::new(10, 10)), PaneId::new(1));
        assert_eq!(tree.find_dock_cell(Point::new(-5, 100)), None);
        assert_eq!(tree.find_dock_cell(Point::new(1000, 100)), None);
    }

    #[test]
    fn empty_root_is_a_dock_target() {
        let mut tree = LayoutTree::new();
        tree.set_rect(Rect::from_size(300, 200));
        assert_eq!(tree.find_dock_cell(Point::new(150, 100)), Some(tree.root()));
        let preview = tree.dock_preview(Point::new(5, 5)).unwrap();
        assert_eq!(preview.zone, DockZone::Center);
    }

    #[test]
    fn dock_preview_zones() {
        let tree = two_column_tree();
        let left = tree.find_pane_cell(PaneId::new(1).unwrap()).unwrap();
        let preview = tree.dock_preview(Point::new(10, 250)).unwrap();
        assert_eq!(preview.cell, left);
        assert_eq!(preview.zone, DockZone::Left);
        assert_eq!(preview.highlight, Rect::new(0, 0, 160, 500));

        assert_eq!(
            tree.dock_preview(Point::new(400, 490)).unwrap().zone,
            DockZone::Bottom
        );
        assert_eq!(
            tree.dock_preview(Point::new(400, 250)).unwrap().zone,
            DockZone::Center
        );
        assert!(tree.dock_preview(Point::new(5000, 5000)).is_none());
    }

    #[test]
    fn center_zone_requests_tab_join() {
        assert_eq!(DockZone::Center.dock_kind(), DockKind::AsTab);
        assert_eq!(
            DockZone::Top.dock_kind(),
            DockKind::Split(DockDirection::Top)
        );
    }
}
