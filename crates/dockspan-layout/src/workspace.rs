#![forbid(unsafe_code)]

//! The forest of windows and the dock/undock operations that span them.
//!
//! Splitting a cell is a tree operation
//! ([`LayoutTree::dock_view_pane`](crate::LayoutTree::dock_view_pane)).
//! Joining a tab group, floating a pane into its own window, and moving a
//! pane between windows need the whole forest and live here.

use std::fmt;

use dockspan_core::geometry::Rect;
use dockspan_core::logging::TARGET_WORKSPACE;
use dockspan_core::window::{WindowError, WindowFlags, WindowHandle, WindowHost};

use crate::cell::{CellId, DockDirection};
use crate::config::DockConfig;
use crate::container::ViewContainer;
use crate::tab::ViewTab;
use crate::tree::DockError;
use crate::view_pane::{PaneId, PaneIdAllocator, TabEditError, ViewPane};

/// How an incoming pane joins the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockKind {
    /// Split the target cell at an edge.
    Split(DockDirection),
    /// Append the pane's tabs to the target's tab group; no cell is created.
    AsTab,
    /// Detach into a new top-level window placed at the given rect.
    Floating(Rect),
}

/// Where a dock operation put the pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockPlacement {
    pub window: WindowHandle,
    pub cell: CellId,
    /// Pane that now shows the docked tabs. Differs from the incoming pane
    /// for [`DockKind::AsTab`], whose tabs are merged into the target.
    pub pane: PaneId,
}

/// Rejected workspace operations. The workspace is unchanged when returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    UnknownWindow { window: WindowHandle },
    UnknownPane { pane: PaneId },
    UnknownCell { window: WindowHandle, cell: CellId },
    DuplicateWindow { window: WindowHandle },
    SecondMainWindow { window: WindowHandle },
    PaneAlreadyDocked { pane: PaneId, window: WindowHandle },
    /// AsTab needs a leaf target.
    NotALeaf { cell: CellId },
    /// A pane cannot be docked relative to its own cell.
    DockOntoSelf { pane: PaneId },
    PaneIdExhausted,
    Dock(DockError),
    Tabs(TabEditError),
    Window(WindowError),
}

impl fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownWindow { window } => write!(f, "no container for window {}", window.raw()),
            Self::UnknownPane { pane } => write!(f, "pane {pane} is not docked anywhere"),
            Self::UnknownCell { window, cell } => {
                write!(f, "window {} has no cell {cell}", window.raw())
            }
            Self::DuplicateWindow { window } => {
                write!(f, "window {} already has a container", window.raw())
            }
            Self::SecondMainWindow { window } => write!(
                f,
                "window {} cannot be main: a main container already exists",
                window.raw()
            ),
            Self::PaneAlreadyDocked { pane, window } => {
                write!(f, "pane {pane} is already docked in window {}", window.raw())
            }
            Self::NotALeaf { cell } => write!(f, "cell {cell} is not a leaf"),
            Self::DockOntoSelf { pane } => write!(f, "pane {pane} cannot dock onto itself"),
            Self::PaneIdExhausted => write!(f, "pane id space exhausted"),
            Self::Dock(err) => write!(f, "{err}"),
            Self::Tabs(err) => write!(f, "{err}"),
            Self::Window(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for WorkspaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dock(err) => Some(err),
            Self::Tabs(err) => Some(err),
            Self::Window(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DockError> for WorkspaceError {
    fn from(err: DockError) -> Self {
        Self::Dock(err)
    }
}

impl From<TabEditError> for WorkspaceError {
    fn from(err: TabEditError) -> Self {
        Self::Tabs(err)
    }
}

impl From<WindowError> for WorkspaceError {
    fn from(err: WindowError) -> Self {
        Self::Window(err)
    }
}

/// Every window hosting dockable panes.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    containers: Vec<ViewContainer>,
    pane_ids: PaneIdAllocator,
    config: DockConfig,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(DockConfig::default())
    }
}

impl Workspace {
    /// Workspace with no windows.
    #[must_use]
    pub fn new(config: DockConfig) -> Self {
        Self {
            containers: Vec::new(),
            pane_ids: PaneIdAllocator::default(),
            config,
        }
    }

    /// Workspace with an empty container bound to the host's main window.
    #[must_use]
    pub fn with_main_window(host: &dyn WindowHost, config: DockConfig) -> Self {
        let main = host.main_window();
        let rect = host.window_rect(main).unwrap_or_default();
        let mut workspace = Self::new(config);
        let container = ViewContainer::new(main, true, rect, workspace.config.clone());
        workspace.containers.push(container);
        workspace
    }

    #[must_use]
    pub const fn config(&self) -> &DockConfig {
        &self.config
    }

    /// Containers in creation order.
    #[must_use]
    pub fn containers(&self) -> &[ViewContainer] {
        &self.containers
    }

    #[must_use]
    pub fn container(&self, window: WindowHandle) -> Option<&ViewContainer> {
        self.containers.iter().find(|c| c.window() == window)
    }

    pub fn container_mut(&mut self, window: WindowHandle) -> Option<&mut ViewContainer> {
        self.containers.iter_mut().find(|c| c.window() == window)
    }

    #[must_use]
    pub fn main_container(&self) -> Option<&ViewContainer> {
        self.containers.iter().find(|c| c.is_main_window())
    }

    /// Register a container. Window handles are unique and at most one
    /// container is the main window.
    pub fn add_container(&mut self, container: ViewContainer) -> Result<(), WorkspaceError> {
        let window = container.window();
        if self.container(window).is_some() {
            return Err(WorkspaceError::DuplicateWindow { window });
        }
        if container.is_main_window() && self.main_container().is_some() {
            return Err(WorkspaceError::SecondMainWindow { window });
        }
        for pane in container.tree().panes() {
            if let Some((owner, _)) = self.find_pane(pane.id()) {
                return Err(WorkspaceError::PaneAlreadyDocked {
                    pane: pane.id(),
                    window: owner,
                });
            }
        }
        for pane in container.tree().panes() {
            self.pane_ids.observe(pane.id());
        }
        self.containers.push(container);
        Ok(())
    }

    /// Remove a container without touching its window.
    pub fn remove_container(&mut self, window: WindowHandle) -> Option<ViewContainer> {
        let index = self.containers.iter().position(|c| c.window() == window)?;
        Some(self.containers.remove(index))
    }

    /// Allocate a fresh pane ID.
    pub fn allocate_pane_id(&mut self) -> Result<PaneId, WorkspaceError> {
        self.pane_ids.allocate().ok_or(WorkspaceError::PaneIdExhausted)
    }

    /// New single-tab pane with a fresh ID.
    pub fn new_pane(&mut self, tab: ViewTab) -> Result<ViewPane, WorkspaceError> {
        Ok(ViewPane::with_tab(self.allocate_pane_id()?, tab))
    }

    /// Window and cell currently holding `pane`.
    #[must_use]
    pub fn find_pane(&self, pane: PaneId) -> Option<(WindowHandle, CellId)> {
        self.containers.iter().find_map(|container| {
            container
                .tree()
                .find_pane_cell(pane)
                .map(|cell| (container.window(), cell))
        })
    }

    #[must_use]
    pub fn pane(&self, pane: PaneId) -> Option<&ViewPane> {
        self.containers.iter().find_map(|c| c.tree().pane(pane))
    }

    pub fn pane_mut(&mut self, pane: PaneId) -> Option<&mut ViewPane> {
        self.containers
            .iter_mut()
            .find_map(|c| c.tree_mut().pane_mut(pane))
    }

    /// Total number of docked panes across all windows.
    #[must_use]
    pub fn pane_count(&self) -> usize {
        self.containers.iter().map(|c| c.tree().panes().count()).sum()
    }

    /// Dock a pane that is not yet part of the workspace.
    pub fn dock(
        &mut self,
        host: &mut dyn WindowHost,
        window: WindowHandle,
        target: CellId,
        pane: ViewPane,
        kind: DockKind,
    ) -> Result<DockPlacement, WorkspaceError> {
        if let Some((owner, _)) = self.find_pane(pane.id()) {
            return Err(WorkspaceError::PaneAlreadyDocked {
                pane: pane.id(),
                window: owner,
            });
        }
        let pane_id = pane.id();
        let placement = match kind {
            DockKind::Split(direction) => self.dock_split(window, target, pane, direction),
            DockKind::AsTab => self.dock_as_tab(window, target, pane),
            DockKind::Floating(rect) => self.dock_floating(host, rect, pane),
        }?;
        self.pane_ids.observe(pane_id);
        Ok(placement)
    }

    fn dock_split(
        &mut self,
        window: WindowHandle,
        target: CellId,
        pane: ViewPane,
        direction: DockDirection,
    ) -> Result<DockPlacement, WorkspaceError> {
        let pane_id = pane.id();
        let container = self
            .container_mut(window)
            .ok_or(WorkspaceError::UnknownWindow { window })?;
        let cell = container.dock_view_pane(target, pane, direction)?;
        Ok(DockPlacement {
            window,
            cell,
            pane: pane_id,
        })
    }

    fn dock_as_tab(
        &mut self,
        window: WindowHandle,
        target: CellId,
        pane: ViewPane,
    ) -> Result<DockPlacement, WorkspaceError> {
        let container = self
            .container_mut(window)
            .ok_or(WorkspaceError::UnknownWindow { window })?;
        let tree = container.tree_mut();
        let cell = tree
            .cell(target)
            .ok_or(WorkspaceError::UnknownCell { window, cell: target })?;
        if !cell.is_leaf() {
            return Err(WorkspaceError::NotALeaf { cell: target });
        }
        if cell.is_empty_leaf() {
            let pane_id = pane.id();
            let cell = tree.dock_view_pane(target, pane, DockDirection::Left)?;
            return Ok(DockPlacement {
                window,
                cell,
                pane: pane_id,
            });
        }

        let Some(existing) = tree.cell_pane_mut(target) else {
            return Err(WorkspaceError::NotALeaf { cell: target });
        };
        let merged_into = existing.id();
        let tab_count = pane.tab_count();
        existing.absorb(pane)?;
        tracing::debug!(
            target: TARGET_WORKSPACE,
            window = window.raw(),
            pane = merged_into.get(),
            tabs = tab_count,
            "tabs merged into existing pane"
        );
        Ok(DockPlacement {
            window,
            cell: target,
            pane: merged_into,
        })
    }

    fn dock_floating(
        &mut self,
        host: &mut dyn WindowHost,
        rect: Rect,
        pane: ViewPane,
    ) -> Result<DockPlacement, WorkspaceError> {
        let pane_id = pane.id();
        let window = host.create_window(rect, WindowFlags::default() | WindowFlags::FLOATING)?;
        let mut container = ViewContainer::new(window, false, rect, self.config.clone());
        let root = container.root_cell();
        let cell = container.dock_view_pane(root, pane, DockDirection::Left)?;
        self.containers.push(container);
        tracing::debug!(
            target: TARGET_WORKSPACE,
            window = window.raw(),
            pane = pane_id.get(),
            "pane floated into new window"
        );
        Ok(DockPlacement {
            window,
            cell,
            pane: pane_id,
        })
    }

    /// Take a pane out of whichever window holds it.
    ///
    /// A floating window left without panes is closed: its container is
    /// dropped and the host window hidden. The main window always stays.
    pub fn undock(
        &mut self,
        host: &mut dyn WindowHost,
        pane: PaneId,
    ) -> Result<ViewPane, WorkspaceError> {
        let (window, removed) = self.take_pane(pane)?;
        self.close_if_empty(host, window);
        Ok(removed)
    }

    /// Detach a pane from its tree without closing the window it leaves.
    fn take_pane(&mut self, pane: PaneId) -> Result<(WindowHandle, ViewPane), WorkspaceError> {
        let (window, _) = self
            .find_pane(pane)
            .ok_or(WorkspaceError::UnknownPane { pane })?;
        let container = self
            .container_mut(window)
            .ok_or(WorkspaceError::UnknownWindow { window })?;
        let removed = container
            .remove_view_pane_cell(pane)
            .ok_or(WorkspaceError::UnknownPane { pane })?;
        Ok((window, removed))
    }

    fn close_if_empty(&mut self, host: &mut dyn WindowHost, window: WindowHandle) {
        let Some(container) = self.container(window) else {
            return;
        };
        if container.is_main_window() || !container.tree().is_empty() {
            return;
        }
        let _ = self.remove_container(window);
        host.hide_window(window);
        tracing::debug!(
            target: TARGET_WORKSPACE,
            window = window.raw(),
            "empty floating window closed"
        );
    }

    /// Move a docked pane next to (or into) another cell, possibly in
    /// another window. This is what a completed drag gesture requests.
    ///
    /// On failure the workspace is left as it was; the source window is
    /// only closed once the pane has landed.
    pub fn move_pane(
        &mut self,
        host: &mut dyn WindowHost,
        pane: PaneId,
        window: WindowHandle,
        target: CellId,
        kind: DockKind,
    ) -> Result<DockPlacement, WorkspaceError> {
        let (source_window, source_cell) = self
            .find_pane(pane)
            .ok_or(WorkspaceError::UnknownPane { pane })?;
        let target_cell = self
            .container(window)
            .ok_or(WorkspaceError::UnknownWindow { window })?
            .tree()
            .cell(target)
            .ok_or(WorkspaceError::UnknownCell { window, cell: target })?;
        // Root splits and floating windows never place relative to `target`.
        let ignores_target = match kind {
            DockKind::Split(direction) => direction.targets_root(),
            DockKind::AsTab => false,
            DockKind::Floating(_) => true,
        };
        if source_window == window && source_cell == target && !ignores_target {
            return Err(WorkspaceError::DockOntoSelf { pane });
        }
        if matches!(kind, DockKind::AsTab) && !target_cell.is_leaf() {
            return Err(WorkspaceError::NotALeaf { cell: target });
        }
        let target_parent = target_cell.parent();

        let snapshot = self.clone();
        let (_, moved) = self.take_pane(pane)?;

        // Collapse may fold the target into its parent, which keeps the
        // target's contents under the parent's ID.
        let target = match self.container(window) {
            Some(container) if container.tree().cell(target).is_none() => {
                target_parent.unwrap_or(target)
            }
            _ => target,
        };
        match self.dock(host, window, target, moved, kind) {
            Ok(placement) => {
                self.close_if_empty(host, source_window);
                tracing::debug!(
                    target: TARGET_WORKSPACE,
                    pane = pane.get(),
                    from = source_window.raw(),
                    to = placement.window.raw(),
                    "pane moved"
                );
                Ok(placement)
            }
            Err(err) => {
                *self = snapshot;
                Err(err)
            }
        }
    }

    /// Refresh every container's placement and state from the host.
    pub fn sync_window_geometry(&mut self, host: &dyn WindowHost) {
        for container in &mut self.containers {
            container.sync_from_host(host);
        }
    }

    /// Rebuild from loaded containers, re-seeding the pane ID allocator.
    pub(crate) fn from_containers(containers: Vec<ViewContainer>, config: DockConfig) -> Self {
        let mut pane_ids = PaneIdAllocator::default();
        for container in &containers {
            for pane in container.tree().panes() {
                pane_ids.observe(pane.id());
            }
        }
        Self {
            containers,
            pane_ids,
            config,
        }
    }
}
