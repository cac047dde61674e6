#![forbid(unsafe_code)]

//! Arena-backed layout tree and its docking algebra.
//!
//! A [`LayoutTree`] partitions one window's client rectangle among view
//! panes. Cells live in an ID-keyed arena; each container owns its ordered
//! children by ID and every child records its parent ID for upward queries.
//!
//! Every public mutation either completes and leaves the tree consistent
//! (sibling sizes summing to one, no single-child containers, rects
//! recomputed) or is rejected before anything changes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use dockspan_core::geometry::{Point, Rect};
use dockspan_core::logging::TARGET_LAYOUT;

use crate::cell::{CellId, CellKind, DockDirection, LayoutCell, NormalizedSize, SplitAxis};
use crate::config::{DockConfig, NORMALIZED_EPSILON};
use crate::view_pane::{PaneId, ViewPane};

/// Rejected dock requests. The tree is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockError {
    MissingCell { cell: CellId },
    PaneAlreadyDocked { pane: PaneId, cell: CellId },
    CellIdOverflow { current: CellId },
    /// The dock would nest cells deeper than `DockConfig::max_depth`.
    DepthExceeded { depth: usize, max: usize },
}

impl fmt::Display for DockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCell { cell } => write!(f, "cell {cell} not found"),
            Self::PaneAlreadyDocked { pane, cell } => {
                write!(f, "pane {pane} is already docked in cell {cell}")
            }
            Self::CellIdOverflow { current } => write!(f, "cell id overflow after {current}"),
            Self::DepthExceeded { depth, max } => {
                write!(f, "dock would nest cells {depth} deep, limit is {max}")
            }
        }
    }
}

impl std::error::Error for DockError {}

/// Rejected resize requests. The tree is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum ResizeError {
    MissingCell { cell: CellId },
    RootCell { cell: CellId },
    /// The parent has no other child to give or take space from.
    SingleChild { cell: CellId },
    InvalidSize { cell: CellId, size: f32 },
    /// A sibling (or the cell itself) would drop below the minimum size.
    BelowMinimum { cell: CellId, size: f32, min: f32 },
}

impl fmt::Display for ResizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCell { cell } => write!(f, "cell {cell} not found"),
            Self::RootCell { cell } => write!(f, "cannot resize root cell {cell}"),
            Self::SingleChild { cell } => {
                write!(f, "cell {cell} has no sibling to redistribute into")
            }
            Self::InvalidSize { cell, size } => {
                write!(f, "size {size} for cell {cell} is outside (0, 1)")
            }
            Self::BelowMinimum { cell, size, min } => {
                write!(f, "cell {cell} would shrink to {size}, below minimum {min}")
            }
        }
    }
}

impl std::error::Error for ResizeError {}

/// Structural invariant violations reported by [`LayoutTree::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum TreeInvariantError {
    MissingRoot { root: CellId },
    RootHasParent { root: CellId, parent: CellId },
    MissingChild { parent: CellId, child: CellId },
    ParentMismatch {
        cell: CellId,
        expected: Option<CellId>,
        actual: Option<CellId>,
    },
    CycleDetected { cell: CellId },
    UnreachableCell { cell: CellId },
    EmptyContainer { cell: CellId },
    SingleChildContainer { cell: CellId },
    SizeSumMismatch { cell: CellId, sum: f32 },
    SizeOutOfRange { cell: CellId, size: f32 },
    DuplicatePane { pane: PaneId },
}

impl fmt::Display for TreeInvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRoot { root } => write!(f, "root cell {root} not found"),
            Self::RootHasParent { root, parent } => {
                write!(f, "root cell {root} has parent {parent}")
            }
            Self::MissingChild { parent, child } => {
                write!(f, "container {parent} references missing child {child}")
            }
            Self::ParentMismatch {
                cell,
                expected,
                actual,
            } => write!(
                f,
                "cell {cell} parent mismatch: expected {expected:?}, got {actual:?}"
            ),
            Self::CycleDetected { cell } => write!(f, "cycle detected at cell {cell}"),
            Self::UnreachableCell { cell } => write!(f, "cell {cell} is unreachable from root"),
            Self::EmptyContainer { cell } => write!(f, "container {cell} has no children"),
            Self::SingleChildContainer { cell } => {
                write!(f, "container {cell} has exactly one child")
            }
            Self::SizeSumMismatch { cell, sum } => {
                write!(f, "children of container {cell} sum to {sum}, expected 1")
            }
            Self::SizeOutOfRange { cell, size } => {
                write!(f, "cell {cell} has normalized size {size} outside [0, 1]")
            }
            Self::DuplicatePane { pane } => write!(f, "pane {pane} appears more than once"),
        }
    }
}

impl std::error::Error for TreeInvariantError {}

/// Layout tree for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTree {
    pub(crate) root: CellId,
    pub(crate) next_id: CellId,
    pub(crate) cells: BTreeMap<CellId, LayoutCell>,
    pub(crate) config: DockConfig,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    /// Tree with a single empty root leaf and default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DockConfig::default())
    }

    /// Tree with a single empty root leaf.
    #[must_use]
    pub fn with_config(config: DockConfig) -> Self {
        let root = CellId::MIN;
        let mut cells = BTreeMap::new();
        let _ = cells.insert(root, LayoutCell::leaf(root, None, None));
        Self {
            root,
            next_id: root.checked_next().unwrap_or(root),
            cells,
            config,
        }
    }

    /// Root cell ID.
    #[must_use]
    pub const fn root(&self) -> CellId {
        self.root
    }

    #[must_use]
    pub const fn config(&self) -> &DockConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DockConfig) {
        self.config = config;
    }

    /// Lookup a cell by ID.
    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&LayoutCell> {
        self.cells.get(&id)
    }

    /// Iterate cells in ID order.
    pub fn cells(&self) -> impl Iterator<Item = &LayoutCell> {
        self.cells.values()
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Root rectangle (the window client rectangle).
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.cells
            .get(&self.root)
            .map(|cell| cell.rect)
            .unwrap_or_default()
    }

    /// Set the window client rectangle and recompute every cell rect.
    pub fn set_rect(&mut self, rect: Rect) {
        if let Some(root) = self.cells.get_mut(&self.root) {
            root.rect = rect;
        }
        self.compute_size(self.root);
    }

    /// Whether the tree holds no pane at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panes().next().is_none()
    }

    /// Cell IDs in pre-order (parent before children, children in order).
    #[must_use]
    pub fn pre_order(&self) -> Vec<CellId> {
        let mut out = Vec::with_capacity(self.cells.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(cell) = self.cells.get(&id) else {
                continue;
            };
            out.push(id);
            stack.extend(cell.children().iter().rev().copied());
        }
        out
    }

    /// Number of ancestors of `cell`; the root is at depth 0.
    #[must_use]
    pub fn depth(&self, cell: CellId) -> usize {
        let mut depth = 0;
        let mut current = self.cells.get(&cell).and_then(|c| c.parent);
        while let Some(id) = current {
            depth += 1;
            current = self.cells.get(&id).and_then(|c| c.parent);
        }
        depth
    }

    /// Deepest cell depth anywhere in the tree.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.height(self.root)
    }

    /// Levels below `cell`: 0 for a leaf.
    fn height(&self, cell: CellId) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(cell, 0usize)];
        while let Some((id, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Some(node) = self.cells.get(&id) {
                stack.extend(node.children().iter().map(|child| (*child, level + 1)));
            }
        }
        deepest
    }

    /// Panes in pre-order.
    pub fn panes(&self) -> impl Iterator<Item = &ViewPane> {
        self.pre_order()
            .into_iter()
            .filter_map(|id| self.cells.get(&id))
            .filter_map(LayoutCell::view_pane)
    }

    /// Leaf cell currently holding `pane`.
    #[must_use]
    pub fn find_pane_cell(&self, pane: PaneId) -> Option<CellId> {
        self.cells
            .values()
            .find(|cell| cell.view_pane().is_some_and(|p| p.id() == pane))
            .map(|cell| cell.id)
    }

    #[must_use]
    pub fn pane(&self, pane: PaneId) -> Option<&ViewPane> {
        let cell = self.find_pane_cell(pane)?;
        self.cells.get(&cell).and_then(LayoutCell::view_pane)
    }

    pub fn pane_mut(&mut self, pane: PaneId) -> Option<&mut ViewPane> {
        let cell = self.find_pane_cell(pane)?;
        self.cells.get_mut(&cell).and_then(LayoutCell::view_pane_mut)
    }

    /// Pane held by a leaf cell.
    pub fn cell_pane_mut(&mut self, cell: CellId) -> Option<&mut ViewPane> {
        self.cells.get_mut(&cell).and_then(LayoutCell::view_pane_mut)
    }

    // =====================================================================
    // Geometry
    // =====================================================================

    /// Recompute rects for the subtree under `cell` from its current rect.
    ///
    /// Children are placed in order along the split axis, each starting at
    /// the previous child's far edge. The last child takes whatever extent
    /// remains so rounding never leaves gaps or overlaps. Leaves copy their
    /// rect into their pane.
    pub fn compute_size(&mut self, cell: CellId) {
        let Some(node) = self.cells.get_mut(&cell) else {
            return;
        };
        let rect = node.rect;
        let (axis, children) = match &mut node.kind {
            CellKind::Leaf { pane } => {
                if let Some(pane) = pane {
                    pane.set_rect(rect);
                }
                return;
            }
            CellKind::Container { axis, children } => (*axis, children.clone()),
        };

        let extent = match axis {
            SplitAxis::Horizontal => rect.width,
            SplitAxis::Vertical => rect.height,
        };
        let last = children.len().saturating_sub(1);
        let mut offset = 0;
        for (index, child) in children.iter().enumerate() {
            let remaining = (extent - offset).max(0);
            let size = if index == last {
                remaining
            } else {
                let share = self
                    .cells
                    .get(child)
                    .map_or(0.0, |c| c.normalized_size.get(axis));
                ((extent as f32 * share).round() as i32).clamp(0, remaining)
            };
            let child_rect = match axis {
                SplitAxis::Horizontal => Rect::new(rect.x + offset, rect.y, size, rect.height),
                SplitAxis::Vertical => Rect::new(rect.x, rect.y + offset, rect.width, size),
            };
            if let Some(child_cell) = self.cells.get_mut(child) {
                child_cell.rect = child_rect;
            }
            offset += size;
            self.compute_size(*child);
        }
    }

    /// Put the floating residual `1 - sum` onto the last child so the
    /// children of `cell` sum to exactly one along its axis.
    ///
    /// No-op for leaves and childless containers.
    pub fn fix_normalized_sizes(&mut self, cell: CellId) {
        let Some(CellKind::Container { axis, children }) = self.cells.get(&cell).map(|c| &c.kind)
        else {
            return;
        };
        let axis = *axis;
        let Some(&last) = children.last() else {
            return;
        };
        let sum: f32 = children
            .iter()
            .filter_map(|child| self.cells.get(child))
            .map(|child| child.normalized_size.get(axis))
            .sum();
        if let Some(last_cell) = self.cells.get_mut(&last) {
            let value = last_cell.normalized_size.get(axis) + (1.0 - sum);
            last_cell.normalized_size.set(axis, value);
        }
    }

    /// First child of `parent` with the largest size on the parent's axis.
    ///
    /// Ties resolve to the earliest child in layout order.
    #[must_use]
    pub fn widest_child(&self, parent: CellId, exclude: Option<CellId>) -> Option<CellId> {
        let node = self.cells.get(&parent)?;
        let axis = node.split_axis()?;
        let mut best: Option<(CellId, f32)> = None;
        for child in node.children() {
            if Some(*child) == exclude {
                continue;
            }
            let Some(size) = self.cells.get(child).map(|c| c.normalized_size.get(axis)) else {
                continue;
            };
            if best.is_none_or(|(_, best_size)| size > best_size) {
                best = Some((*child, size));
            }
        }
        best.map(|(id, _)| id)
    }

    // =====================================================================
    // Docking
    // =====================================================================

    /// Dock `pane` against `target` at `direction`.
    ///
    /// Returns the leaf that now holds the pane. An empty target leaf takes
    /// the pane in place; otherwise a new leaf sized `split_percent` is
    /// created, reusing the enclosing container when its axis already
    /// matches and wrapping existing content into a new container when it
    /// does not.
    pub fn dock_view_pane(
        &mut self,
        target: CellId,
        pane: ViewPane,
        direction: DockDirection,
    ) -> Result<CellId, DockError> {
        let target = if direction.targets_root() {
            self.root
        } else {
            target
        };
        let _span = tracing::debug_span!(
            "dock.pane",
            pane = pane.id().get(),
            target = target.get(),
            direction = ?direction,
        )
        .entered();

        let Some(target_cell) = self.cells.get(&target) else {
            return Err(DockError::MissingCell { cell: target });
        };
        if let Some(cell) = self.find_pane_cell(pane.id()) {
            return Err(DockError::PaneAlreadyDocked {
                pane: pane.id(),
                cell,
            });
        }

        if target_cell.is_empty_leaf() {
            if let Some(cell) = self.cells.get_mut(&target) {
                cell.kind = CellKind::Leaf { pane: Some(pane) };
            }
            self.compute_size(target);
            tracing::debug!(
                target: TARGET_LAYOUT,
                cell = target.get(),
                "pane installed into empty cell"
            );
            return Ok(target);
        }

        // Up to two cells are created: the new leaf and a wrapper.
        if self.next_id.get().checked_add(2).is_none() {
            return Err(DockError::CellIdOverflow {
                current: self.next_id,
            });
        }

        let axis = direction.axis();
        let first = direction.inserts_first();
        let target_axis = target_cell.split_axis();
        let parent_level = target_cell.parent.filter(|parent| {
            target_axis.is_none()
                && self.cells.get(parent).is_some_and(|p| {
                    p.split_axis() == Some(axis) && p.children().len() > 1
                })
        });

        let depth = self.depth(target);
        let deepest = match target_axis {
            None if parent_level.is_some() => depth,
            Some(current) if current != axis => depth + 1 + self.height(target),
            _ => depth + 1,
        };
        if deepest > self.config.max_depth {
            return Err(DockError::DepthExceeded {
                depth: deepest,
                max: self.config.max_depth,
            });
        }

        let (container, anchor) = match (target_axis, parent_level) {
            (None, Some(parent)) => (parent, Some(target)),
            (None, None) => {
                self.wrap_leaf(target, axis)?;
                (target, None)
            }
            (Some(current), _) => {
                if current != axis {
                    self.wrap_children(target, axis)?;
                }
                (target, None)
            }
        };

        let new_leaf = self.insert_leaf(container, anchor, first, pane)?;
        self.fix_normalized_sizes(container);
        self.compute_size(self.root);
        tracing::debug!(
            target: TARGET_LAYOUT,
            container = container.get(),
            cell = new_leaf.get(),
            children = self.cells.get(&container).map_or(0, |c| c.children().len()),
            "pane docked"
        );
        Ok(new_leaf)
    }

    /// Turn a pane leaf into a container of `axis` holding one full-size
    /// child with the old pane.
    fn wrap_leaf(&mut self, cell: CellId, axis: SplitAxis) -> Result<(), DockError> {
        let child_id = self.allocate_id()?;
        let Some(node) = self.cells.get_mut(&cell) else {
            return Err(DockError::MissingCell { cell });
        };
        let old = std::mem::replace(
            &mut node.kind,
            CellKind::Container {
                axis,
                children: vec![child_id],
            },
        );
        let pane = match old {
            CellKind::Leaf { pane } => pane,
            CellKind::Container { .. } => None,
        };
        let _ = self
            .cells
            .insert(child_id, LayoutCell::leaf(child_id, Some(cell), pane));
        Ok(())
    }

    /// Move the children of `cell` into one full-size intermediate child
    /// keeping the old axis, then switch `cell` to `axis`.
    fn wrap_children(&mut self, cell: CellId, axis: SplitAxis) -> Result<(), DockError> {
        let wrapper_id = self.allocate_id()?;
        let Some(node) = self.cells.get_mut(&cell) else {
            return Err(DockError::MissingCell { cell });
        };
        let old = std::mem::replace(
            &mut node.kind,
            CellKind::Container {
                axis,
                children: vec![wrapper_id],
            },
        );
        let (old_axis, children) = match old {
            CellKind::Container { axis, children } => (axis, children),
            CellKind::Leaf { .. } => return Ok(()),
        };
        for child in &children {
            if let Some(child_cell) = self.cells.get_mut(child) {
                child_cell.parent = Some(wrapper_id);
            }
        }
        let _ = self.cells.insert(
            wrapper_id,
            LayoutCell {
                id: wrapper_id,
                parent: Some(cell),
                kind: CellKind::Container {
                    axis: old_axis,
                    children,
                },
                normalized_size: NormalizedSize::FULL,
                rect: Rect::default(),
            },
        );
        Ok(())
    }

    /// Insert a new leaf into `container`, taking its share from the widest
    /// existing child.
    ///
    /// With an `anchor` the leaf goes right before/after it; otherwise at
    /// the front or back of the child list.
    fn insert_leaf(
        &mut self,
        container: CellId,
        anchor: Option<CellId>,
        first: bool,
        pane: ViewPane,
    ) -> Result<CellId, DockError> {
        let Some(axis) = self.cells.get(&container).and_then(LayoutCell::split_axis) else {
            return Err(DockError::MissingCell { cell: container });
        };
        let split = self.config.split_percent;
        let share = match self.widest_child(container, None) {
            Some(widest) => {
                let Some(widest_cell) = self.cells.get_mut(&widest) else {
                    return Err(DockError::MissingCell { cell: widest });
                };
                let widest_share = widest_cell.normalized_size.get(axis);
                // A donor narrower than the split gives up half of itself.
                let share = if widest_share > split {
                    split
                } else {
                    widest_share * 0.5
                };
                widest_cell.normalized_size.set(axis, widest_share - share);
                share
            }
            None => 1.0,
        };

        let leaf_id = self.allocate_id()?;
        let mut leaf = LayoutCell::leaf(leaf_id, Some(container), Some(pane));
        leaf.normalized_size = NormalizedSize::along(axis, share);
        let _ = self.cells.insert(leaf_id, leaf);

        if let Some(CellKind::Container { children, .. }) =
            self.cells.get_mut(&container).map(|c| &mut c.kind)
        {
            let index = match anchor.and_then(|a| children.iter().position(|c| *c == a)) {
                Some(position) if first => position,
                Some(position) => position + 1,
                None if first => 0,
                None => children.len(),
            };
            children.insert(index, leaf_id);
        }
        Ok(leaf_id)
    }

    fn allocate_id(&mut self) -> Result<CellId, DockError> {
        let current = self.next_id;
        self.next_id = current
            .checked_next()
            .ok_or(DockError::CellIdOverflow { current })?;
        Ok(current)
    }

    // =====================================================================
    // Removal
    // =====================================================================

    /// Remove the leaf holding `pane` and hand the pane back.
    ///
    /// The freed extent goes to the widest remaining sibling; a container
    /// left with one child collapses into that child. Removing the pane of a
    /// root leaf leaves an empty root. Returns `None`, with no change, when
    /// the pane is not in this tree.
    pub fn remove_view_pane_cell(&mut self, pane: PaneId) -> Option<ViewPane> {
        let cell = self.find_pane_cell(pane)?;
        let _span =
            tracing::debug_span!("remove.pane", pane = pane.get(), cell = cell.get()).entered();

        let removed = if cell == self.root {
            let root = self.cells.get_mut(&cell)?;
            match std::mem::replace(&mut root.kind, CellKind::Leaf { pane: None }) {
                CellKind::Leaf { pane } => pane,
                other => {
                    root.kind = other;
                    None
                }
            }
        } else {
            let record = self.detach_leaf(cell)?;
            match record.kind {
                CellKind::Leaf { pane } => pane,
                CellKind::Container { .. } => None,
            }
        };

        self.compute_size(self.root);
        tracing::debug!(
            target: TARGET_LAYOUT,
            pane = pane.get(),
            cells = self.cells.len(),
            "pane removed"
        );
        removed
    }

    /// Unlink a non-root leaf from its parent and rebalance.
    fn detach_leaf(&mut self, cell: CellId) -> Option<LayoutCell> {
        let parent = self.cells.get(&cell)?.parent?;
        let removed = self.cells.remove(&cell)?;

        let remaining = {
            let parent_cell = self.cells.get_mut(&parent)?;
            let CellKind::Container { children, .. } = &mut parent_cell.kind else {
                return Some(removed);
            };
            children.retain(|child| *child != cell);
            children.len()
        };

        if remaining == 0 {
            // Only reachable for a single-child container loaded from disk.
            if let Some(parent_cell) = self.cells.get_mut(&parent) {
                parent_cell.kind = CellKind::Leaf { pane: None };
            }
            if parent != self.root {
                let _ = self.detach_leaf(parent);
            }
            return Some(removed);
        }

        let axis = self.cells.get(&parent).and_then(LayoutCell::split_axis)?;
        let freed = removed.normalized_size.get(axis);
        if let Some(widest) = self.widest_child(parent, None)
            && let Some(widest_cell) = self.cells.get_mut(&widest)
        {
            let value = widest_cell.normalized_size.get(axis) + freed;
            widest_cell.normalized_size.set(axis, value);
        }

        if remaining == 1 {
            self.collapse(parent);
        } else {
            self.fix_normalized_sizes(parent);
        }
        Some(removed)
    }

    /// Replace a single-child container's contents with its child's,
    /// discarding the child record. The container keeps its own ID, parent
    /// and normalized size.
    fn collapse(&mut self, cell: CellId) {
        let Some(&sole) = self.cells.get(&cell).and_then(|c| c.children().first()) else {
            return;
        };
        let Some(sole_cell) = self.cells.remove(&sole) else {
            return;
        };
        for grandchild in sole_cell.children() {
            if let Some(grandchild_cell) = self.cells.get_mut(grandchild) {
                grandchild_cell.parent = Some(cell);
            }
        }
        if let Some(node) = self.cells.get_mut(&cell) {
            node.kind = sole_cell.kind;
        }
        self.fix_normalized_sizes(cell);
        tracing::debug!(
            target: TARGET_LAYOUT,
            cell = cell.get(),
            absorbed = sole.get(),
            "container collapsed"
        );
    }

    // =====================================================================
    // Resize
    // =====================================================================

    /// Give `cell` a new share of its parent's extent, spreading the
    /// difference evenly over its siblings.
    pub fn set_new_size(&mut self, cell: CellId, new_size: f32) -> Result<(), ResizeError> {
        let node = self
            .cells
            .get(&cell)
            .ok_or(ResizeError::MissingCell { cell })?;
        let parent = node.parent.ok_or(ResizeError::RootCell { cell })?;
        let current = node.normalized_size;
        let parent_cell = self
            .cells
            .get(&parent)
            .ok_or(ResizeError::MissingCell { cell: parent })?;
        let Some(axis) = parent_cell.split_axis() else {
            return Err(ResizeError::MissingCell { cell: parent });
        };
        let siblings = parent_cell.children().to_vec();
        if siblings.len() < 2 {
            return Err(ResizeError::SingleChild { cell });
        }
        if !new_size.is_finite() || new_size <= 0.0 || new_size >= 1.0 {
            return Err(ResizeError::InvalidSize {
                cell,
                size: new_size,
            });
        }

        let min = self.config.min_normalized_size;
        if new_size < min {
            return Err(ResizeError::BelowMinimum {
                cell,
                size: new_size,
                min,
            });
        }
        let delta = current.get(axis) - new_size;
        let per_sibling = delta / (siblings.len() - 1) as f32;
        for sibling in siblings.iter().filter(|s| **s != cell) {
            let size = self
                .cells
                .get(sibling)
                .map_or(0.0, |s| s.normalized_size.get(axis))
                + per_sibling;
            if size < min {
                return Err(ResizeError::BelowMinimum {
                    cell: *sibling,
                    size,
                    min,
                });
            }
        }

        for sibling in &siblings {
            let Some(sibling_cell) = self.cells.get_mut(sibling) else {
                continue;
            };
            let value = if *sibling == cell {
                new_size
            } else {
                sibling_cell.normalized_size.get(axis) + per_sibling
            };
            sibling_cell.normalized_size.set(axis, value);
        }
        self.fix_normalized_sizes(parent);
        self.compute_size(parent);
        tracing::debug!(
            target: TARGET_LAYOUT,
            cell = cell.get(),
            size = new_size,
            "cell resized"
        );
        Ok(())
    }

    /// Resize `cell` so its far edge follows `pointer` along the parent's
    /// axis. Intended for the cell returned by `find_resize_cell`.
    pub fn drag_resize(&mut self, cell: CellId, pointer: Point) -> Result<(), ResizeError> {
        let node = self
            .cells
            .get(&cell)
            .ok_or(ResizeError::MissingCell { cell })?;
        let parent = node.parent.ok_or(ResizeError::RootCell { cell })?;
        let parent_cell = self
            .cells
            .get(&parent)
            .ok_or(ResizeError::MissingCell { cell: parent })?;
        let axis = parent_cell
            .split_axis()
            .ok_or(ResizeError::MissingCell { cell: parent })?;
        let (origin, extent, pointer) = match axis {
            SplitAxis::Horizontal => (node.rect.x, parent_cell.rect.width, pointer.x),
            SplitAxis::Vertical => (node.rect.y, parent_cell.rect.height, pointer.y),
        };
        if extent <= 0 {
            return Err(ResizeError::InvalidSize { cell, size: 0.0 });
        }
        let new_size = (pointer - origin) as f32 / extent as f32;
        self.set_new_size(cell, new_size)
    }

    // =====================================================================
    // Validation
    // =====================================================================

    /// Check every structural invariant of the tree.
    pub fn validate(&self) -> Result<(), TreeInvariantError> {
        let root = self
            .cells
            .get(&self.root)
            .ok_or(TreeInvariantError::MissingRoot { root: self.root })?;
        if let Some(parent) = root.parent {
            return Err(TreeInvariantError::RootHasParent {
                root: self.root,
                parent,
            });
        }

        let mut visited = BTreeSet::new();
        let mut panes = BTreeSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(TreeInvariantError::CycleDetected { cell: id });
            }
            let Some(cell) = self.cells.get(&id) else {
                continue;
            };
            match &cell.kind {
                CellKind::Leaf { pane } => {
                    if let Some(pane) = pane
                        && !panes.insert(pane.id())
                    {
                        return Err(TreeInvariantError::DuplicatePane { pane: pane.id() });
                    }
                }
                CellKind::Container { axis, children } => {
                    match children.len() {
                        0 => return Err(TreeInvariantError::EmptyContainer { cell: id }),
                        1 => return Err(TreeInvariantError::SingleChildContainer { cell: id }),
                        _ => {}
                    }
                    let mut sum = 0.0f32;
                    for child in children {
                        let child_cell =
                            self.cells
                                .get(child)
                                .ok_or(TreeInvariantError::MissingChild {
                                    parent: id,
                                    child: *child,
                                })?;
                        if child_cell.parent != Some(id) {
                            return Err(TreeInvariantError::ParentMismatch {
                                cell: *child,
                                expected: Some(id),
                                actual: child_cell.parent,
                            });
                        }
                        let size = child_cell.normalized_size.get(*axis);
                        if !(-NORMALIZED_EPSILON..=1.0 + NORMALIZED_EPSILON).contains(&size) {
                            return Err(TreeInvariantError::SizeOutOfRange {
                                cell: *child,
                                size,
                            });
                        }
                        sum += size;
                        stack.push(*child);
                    }
                    if (sum - 1.0).abs() > NORMALIZED_EPSILON {
                        return Err(TreeInvariantError::SizeSumMismatch { cell: id, sum });
                    }
                }
            }
        }

        if let Some(orphan) = self.cells.keys().find(|id| !visited.contains(id)) {
            return Err(TreeInvariantError::UnreachableCell { cell: *orphan });
        }
        Ok(())
    }
}
