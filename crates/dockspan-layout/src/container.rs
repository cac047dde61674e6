#![forbid(unsafe_code)]

//! One top-level window and the layout tree it hosts.

use dockspan_core::geometry::{Point, Rect};
use dockspan_core::window::{WindowHandle, WindowHost, WindowState};

use crate::cell::{CellId, DockDirection};
use crate::config::DockConfig;
use crate::hit_test::DockPreview;
use crate::tree::{DockError, LayoutTree};
use crate::view_pane::{PaneId, ViewPane};

/// A host window with its layout tree.
///
/// `window_rect` is the window's placement on screen and is what gets
/// persisted. The tree works in client coordinates, so its root rect is
/// always `(0, 0, width, height)` of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewContainer {
    window: WindowHandle,
    is_main_window: bool,
    window_state: WindowState,
    window_rect: Rect,
    tree: LayoutTree,
}

impl ViewContainer {
    /// Container with an empty root cell.
    #[must_use]
    pub fn new(
        window: WindowHandle,
        is_main_window: bool,
        window_rect: Rect,
        config: DockConfig,
    ) -> Self {
        let mut container = Self {
            window,
            is_main_window,
            window_state: WindowState::Normal,
            window_rect,
            tree: LayoutTree::with_config(config),
        };
        container.tree.set_rect(client_rect(window_rect));
        container
    }

    /// Container for an already-built tree (used when loading a layout).
    pub(crate) fn from_parts(
        window: WindowHandle,
        is_main_window: bool,
        window_state: WindowState,
        window_rect: Rect,
        mut tree: LayoutTree,
    ) -> Self {
        tree.set_rect(client_rect(window_rect));
        Self {
            window,
            is_main_window,
            window_state,
            window_rect,
            tree,
        }
    }

    #[must_use]
    pub const fn window(&self) -> WindowHandle {
        self.window
    }

    #[must_use]
    pub const fn is_main_window(&self) -> bool {
        self.is_main_window
    }

    #[must_use]
    pub const fn window_state(&self) -> WindowState {
        self.window_state
    }

    pub fn set_window_state(&mut self, state: WindowState) {
        self.window_state = state;
    }

    /// Window placement on screen.
    #[must_use]
    pub const fn window_rect(&self) -> Rect {
        self.window_rect
    }

    /// Move or resize the window; the tree is re-laid out for the new size.
    pub fn set_window_rect(&mut self, rect: Rect) {
        self.window_rect = rect;
        self.tree.set_rect(client_rect(rect));
    }

    #[must_use]
    pub const fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut LayoutTree {
        &mut self.tree
    }

    /// Root cell of this window's tree.
    #[must_use]
    pub const fn root_cell(&self) -> CellId {
        self.tree.root()
    }

    /// Dock a pane into this window's tree.
    pub fn dock_view_pane(
        &mut self,
        target: CellId,
        pane: ViewPane,
        direction: DockDirection,
    ) -> Result<CellId, DockError> {
        self.tree.dock_view_pane(target, pane, direction)
    }

    /// Remove a pane from this window's tree.
    pub fn remove_view_pane_cell(&mut self, pane: PaneId) -> Option<ViewPane> {
        self.tree.remove_view_pane_cell(pane)
    }

    /// Resize grip under a client-space point, using the configured grip
    /// width.
    #[must_use]
    pub fn find_resize_cell(&self, point: Point) -> Option<CellId> {
        self.tree
            .find_resize_cell(point, self.tree.config().grip_size)
    }

    #[must_use]
    pub fn find_dock_cell(&self, point: Point) -> Option<CellId> {
        self.tree.find_dock_cell(point)
    }

    /// Drop target and zone for a drag hovering at a client-space point.
    #[must_use]
    pub fn dock_preview(&self, point: Point) -> Option<DockPreview> {
        self.tree.dock_preview(point)
    }

    /// Pull the window's current placement and state from the host.
    pub fn sync_from_host(&mut self, host: &dyn WindowHost) {
        if let Some(rect) = host.window_rect(self.window)
            && rect != self.window_rect
        {
            self.set_window_rect(rect);
        }
        if let Some(state) = host.window_state(self.window) {
            self.window_state = state;
        }
    }
}

/// Client-space rectangle for a window placed at `window_rect`.
#[must_use]
pub const fn client_rect(window_rect: Rect) -> Rect {
    Rect::from_size(window_rect.width, window_rect.height)
}
