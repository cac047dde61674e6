#![forbid(unsafe_code)]

//! Layout cell records stored in a [`LayoutTree`](crate::LayoutTree) arena.

use std::fmt;

use dockspan_core::geometry::Rect;
use serde::{Deserialize, Serialize};

use crate::view_pane::ViewPane;

/// Arena handle for layout cells.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(u64);

impl CellId {
    /// Lowest valid cell ID.
    pub const MIN: Self = Self(1);

    /// Create a new cell ID, rejecting 0.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis along which a container lays out its children.
///
/// `Horizontal` places children left to right, `Vertical` top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    Horizontal,
    Vertical,
}

impl SplitAxis {
    /// Byte code used by the layout codec; `0` is reserved for leaves.
    #[must_use]
    pub const fn code(axis: Option<Self>) -> u8 {
        match axis {
            None => 0,
            Some(Self::Horizontal) => 1,
            Some(Self::Vertical) => 2,
        }
    }

    /// Decode a byte produced by [`SplitAxis::code`]. The outer `None` means
    /// the byte is not a known code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Option<Self>> {
        match code {
            0 => Some(None),
            1 => Some(Some(Self::Horizontal)),
            2 => Some(Some(Self::Vertical)),
            _ => None,
        }
    }
}

/// Fractional size of a cell relative to its parent.
///
/// Only the component on the parent's split axis is meaningful for layout;
/// the other component is kept at `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSize {
    pub x: f32,
    pub y: f32,
}

impl NormalizedSize {
    /// The whole parent extent on both axes.
    pub const FULL: Self = Self { x: 1.0, y: 1.0 };

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Full extent except `share` along `axis`.
    #[must_use]
    pub const fn along(axis: SplitAxis, share: f32) -> Self {
        match axis {
            SplitAxis::Horizontal => Self { x: share, y: 1.0 },
            SplitAxis::Vertical => Self { x: 1.0, y: share },
        }
    }

    #[must_use]
    pub const fn get(self, axis: SplitAxis) -> f32 {
        match axis {
            SplitAxis::Horizontal => self.x,
            SplitAxis::Vertical => self.y,
        }
    }

    pub fn set(&mut self, axis: SplitAxis, value: f32) {
        match axis {
            SplitAxis::Horizontal => self.x = value,
            SplitAxis::Vertical => self.y = value,
        }
    }
}

impl Default for NormalizedSize {
    fn default() -> Self {
        Self::FULL
    }
}

/// Contents of a layout cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// Holds zero or one pane. A pane-less leaf only exists transiently,
    /// e.g. as the root of a window before its first dock.
    Leaf { pane: Option<ViewPane> },
    /// Children laid out along `axis`, in order.
    Container {
        axis: SplitAxis,
        children: Vec<CellId>,
    },
}

/// One node of the binary space-partition tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCell {
    pub(crate) id: CellId,
    pub(crate) parent: Option<CellId>,
    pub(crate) kind: CellKind,
    pub(crate) normalized_size: NormalizedSize,
    pub(crate) rect: Rect,
}

impl LayoutCell {
    pub(crate) fn leaf(id: CellId, parent: Option<CellId>, pane: Option<ViewPane>) -> Self {
        Self {
            id,
            parent,
            kind: CellKind::Leaf { pane },
            normalized_size: NormalizedSize::FULL,
            rect: Rect::default(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// Non-owning back-reference; `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<CellId> {
        self.parent
    }

    #[must_use]
    pub const fn kind(&self) -> &CellKind {
        &self.kind
    }

    /// Split axis, or `None` for leaves.
    #[must_use]
    pub const fn split_axis(&self) -> Option<SplitAxis> {
        match &self.kind {
            CellKind::Leaf { .. } => None,
            CellKind::Container { axis, .. } => Some(*axis),
        }
    }

    /// Children in layout order; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[CellId] {
        match &self.kind {
            CellKind::Leaf { .. } => &[],
            CellKind::Container { children, .. } => children,
        }
    }

    #[must_use]
    pub fn view_pane(&self) -> Option<&ViewPane> {
        match &self.kind {
            CellKind::Leaf { pane } => pane.as_ref(),
            CellKind::Container { .. } => None,
        }
    }

    pub fn view_pane_mut(&mut self) -> Option<&mut ViewPane> {
        match &mut self.kind {
            CellKind::Leaf { pane } => pane.as_mut(),
            CellKind::Container { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, CellKind::Leaf { .. })
    }

    /// A leaf with no pane.
    #[must_use]
    pub const fn is_empty_leaf(&self) -> bool {
        matches!(self.kind, CellKind::Leaf { pane: None })
    }

    #[must_use]
    pub const fn normalized_size(&self) -> NormalizedSize {
        self.normalized_size
    }

    /// Pixel rectangle from the last geometry pass.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }
}

/// Edge of a target cell at which a new pane is split in.
///
/// The `Root*` variants dock against the window's root cell regardless of
/// the target passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockDirection {
    Left,
    Right,
    Top,
    Bottom,
    RootLeft,
    RootRight,
    RootTop,
    RootBottom,
}

impl DockDirection {
    /// Axis the split runs along: Left/Right split horizontally.
    #[must_use]
    pub const fn axis(self) -> SplitAxis {
        match self {
            Self::Left | Self::Right | Self::RootLeft | Self::RootRight => SplitAxis::Horizontal,
            Self::Top | Self::Bottom | Self::RootTop | Self::RootBottom => SplitAxis::Vertical,
        }
    }

    /// Whether the new pane goes before existing content.
    #[must_use]
    pub const fn inserts_first(self) -> bool {
        matches!(
            self,
            Self::Left | Self::Top | Self::RootLeft | Self::RootTop
        )
    }

    #[must_use]
    pub const fn targets_root(self) -> bool {
        matches!(
            self,
            Self::RootLeft | Self::RootRight | Self::RootTop | Self::RootBottom
        )
    }
}
