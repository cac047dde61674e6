#![forbid(unsafe_code)]

//! Docking layout engine: tabbed view panes arranged in a split tree per
//! window.
//!
//! # Role in dockspan
//! A host application owns the windows and draws the panes; this crate
//! decides where every pane goes. Each [`ViewContainer`] binds one host
//! window to a [`LayoutTree`], and a [`Workspace`] holds all of them.
//!
//! ```
//! use dockspan_core::Rect;
//! use dockspan_layout::{DockDirection, LayoutTree, PaneId, TabId, ViewPane, ViewTab};
//!
//! let mut tree = LayoutTree::new();
//! tree.set_rect(Rect::from_size(1000, 500));
//! let scene = ViewPane::with_tab(PaneId::new(1).unwrap(), ViewTab::new(TabId(1), "Scene"));
//! let props = ViewPane::with_tab(PaneId::new(2).unwrap(), ViewTab::new(TabId(2), "Props"));
//! tree.dock_view_pane(tree.root(), scene, DockDirection::Left).unwrap();
//! tree.dock_view_pane(tree.root(), props, DockDirection::Right).unwrap();
//!
//! let props = tree.pane(PaneId::new(2).unwrap()).unwrap();
//! assert_eq!(props.rect(), Rect::new(800, 0, 200, 500));
//! ```

pub mod cell;
pub mod codec;
pub mod config;
pub mod container;
pub mod hit_test;
pub mod tab;
pub mod tree;
pub mod view_pane;
pub mod workspace;

pub use cell::{CellId, CellKind, DockDirection, LayoutCell, NormalizedSize, SplitAxis};
pub use codec::{
    CodecError, NoTabPayload, TabPayloadHook, load_container, load_tree, load_workspace,
    save_container, save_tree, save_workspace,
};
pub use config::{ConfigError, DockConfig};
pub use container::{ViewContainer, client_rect};
pub use hit_test::{DockPreview, DockZone};
pub use tab::{IconHandle, TabId, ViewTab};
pub use tree::{DockError, LayoutTree, ResizeError, TreeInvariantError};
pub use view_pane::{PaneId, PaneIdAllocator, TabEditError, ViewPane};
pub use workspace::{DockKind, DockPlacement, Workspace, WorkspaceError};
