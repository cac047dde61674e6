#![forbid(unsafe_code)]

//! Binary layout persistence.
//!
//! Trees are written in pre-order, little-endian, with no header or version:
//!
//! ```text
//! cell      := u32 child_count, u8 axis, f32 x, f32 y, u8 has_pane,
//!              [pane], cell * child_count
//! pane      := u64 pane_id, u32 tab_count, i32 selected, tab * tab_count
//! tab       := u32 view_id, u32 title_len, title_len * u8 (UTF-8),
//!              u64 user_data_id, hook payload
//! container := u8 is_main, u8 window_state, i32 x, i32 y, i32 w, i32 h, cell
//! workspace := u32 container_count, container * container_count
//! ```
//!
//! Loads are all-or-nothing: the stream is fully parsed and checked before
//! any window is created or any caller state is touched. Saves refuse trees
//! that the same [`DockConfig`] limits would refuse to load, and write
//! nothing in that case.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{self, Read, Write};

use dockspan_core::geometry::Rect;
use dockspan_core::logging::TARGET_CODEC;
use dockspan_core::window::{
    WindowError, WindowFlags, WindowHandle, WindowHost, WindowState, apply_window_state,
};

use crate::cell::{CellId, CellKind, LayoutCell, NormalizedSize, SplitAxis};
use crate::config::{DockConfig, NORMALIZED_EPSILON};
use crate::container::ViewContainer;
use crate::tab::{TabId, ViewTab};
use crate::tree::LayoutTree;
use crate::view_pane::{PaneId, ViewPane};
use crate::workspace::Workspace;

/// Largest drift of a container's child sizes from 1 that a load repairs
/// rather than rejects.
pub const SIZE_REPAIR_TOLERANCE: f32 = 1e-3;

/// Per-tab extension point for application data stored after each tab.
///
/// `load_tab` must consume exactly the bytes `save_tab` wrote.
pub trait TabPayloadHook {
    fn save_tab(
        &mut self,
        tab: &ViewTab,
        user_data_id: u64,
        out: &mut dyn Write,
    ) -> io::Result<()>;

    fn load_tab(
        &mut self,
        tab: &mut ViewTab,
        user_data_id: u64,
        input: &mut dyn Read,
    ) -> io::Result<()>;
}

/// Hook that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTabPayload;

impl TabPayloadHook for NoTabPayload {
    fn save_tab(&mut self, _: &ViewTab, _: u64, _: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    fn load_tab(&mut self, _: &mut ViewTab, _: u64, _: &mut dyn Read) -> io::Result<()> {
        Ok(())
    }
}

/// Failure to save or load a layout. A failed load returns nothing.
#[derive(Debug)]
pub enum CodecError {
    Io(io::Error),
    /// The stream ended in the middle of a record.
    Truncated,
    UnknownAxis { code: u8 },
    UnknownWindowState { code: u8 },
    InvalidFlag { field: &'static str, value: u8 },
    InvalidSize { value: f32 },
    /// Child sizes of a container are too far from summing to 1 to repair.
    SizeSumMismatch { sum: f32 },
    InvalidUtf8,
    TitleTooLong { len: usize, max: usize },
    InvalidSelection { selected: i32, tabs: u32 },
    DuplicateTabId { pane: PaneId },
    ZeroPaneId,
    DuplicatePane { pane: PaneId },
    EmptyContainer,
    LeafWithChildren { children: u32 },
    PaneOnContainer,
    DepthExceeded { max: usize },
    CellIdOverflow,
    SecondMainWindow,
    LengthOverflow { len: usize },
    Window(WindowError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "layout stream I/O error: {err}"),
            Self::Truncated => write!(f, "layout stream ended unexpectedly"),
            Self::UnknownAxis { code } => write!(f, "unknown split axis code {code}"),
            Self::UnknownWindowState { code } => write!(f, "unknown window state code {code}"),
            Self::InvalidFlag { field, value } => {
                write!(f, "flag {field} has invalid value {value}")
            }
            Self::InvalidSize { value } => write!(f, "invalid normalized size {value}"),
            Self::SizeSumMismatch { sum } => {
                write!(f, "container child sizes sum to {sum}, expected 1")
            }
            Self::InvalidUtf8 => write!(f, "tab title is not valid UTF-8"),
            Self::TitleTooLong { len, max } => {
                write!(f, "tab title of {len} bytes exceeds limit {max}")
            }
            Self::InvalidSelection { selected, tabs } => {
                write!(f, "selected tab {selected} invalid for {tabs} tabs")
            }
            Self::DuplicateTabId { pane } => write!(f, "pane {pane} repeats a tab id"),
            Self::ZeroPaneId => write!(f, "pane id 0 is reserved"),
            Self::DuplicatePane { pane } => write!(f, "pane {pane} appears more than once"),
            Self::EmptyContainer => write!(f, "container cell has no children"),
            Self::LeafWithChildren { children } => {
                write!(f, "leaf cell declares {children} children")
            }
            Self::PaneOnContainer => write!(f, "container cell claims a pane"),
            Self::DepthExceeded { max } => write!(f, "layout nesting exceeds depth {max}"),
            Self::CellIdOverflow => write!(f, "cell id space exhausted"),
            Self::SecondMainWindow => write!(f, "more than one container is the main window"),
            Self::LengthOverflow { len } => write!(f, "length {len} does not fit the format"),
            Self::Window(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Window(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(err)
        }
    }
}

impl From<WindowError> for CodecError {
    fn from(err: WindowError) -> Self {
        Self::Window(err)
    }
}

// =========================================================================
// Save
// =========================================================================

/// Write one tree, root first.
pub fn save_tree(
    tree: &LayoutTree,
    hook: &mut dyn TabPayloadHook,
    out: &mut dyn Write,
) -> Result<(), CodecError> {
    check_savable(tree)?;
    write_tree(tree, hook, out)
}

/// Write one container and its tree.
///
/// Placement and state are read from `host`; the container's cached copy
/// is used only for a window the host no longer knows.
pub fn save_container(
    container: &ViewContainer,
    hook: &mut dyn TabPayloadHook,
    host: &dyn WindowHost,
    out: &mut dyn Write,
) -> Result<(), CodecError> {
    check_savable(container.tree())?;
    write_container(container, hook, host, out)
}

/// Write every container of the workspace in order.
pub fn save_workspace(
    workspace: &Workspace,
    hook: &mut dyn TabPayloadHook,
    host: &dyn WindowHost,
    out: &mut dyn Write,
) -> Result<(), CodecError> {
    let containers = workspace.containers();
    for container in containers {
        check_savable(container.tree())?;
    }
    write_len(out, containers.len())?;
    for container in containers {
        write_container(container, hook, host, out)?;
    }
    tracing::debug!(
        target: TARGET_CODEC,
        containers = containers.len(),
        panes = workspace.pane_count(),
        "workspace saved"
    );
    Ok(())
}

/// Reject trees that would not load back under their own config.
fn check_savable(tree: &LayoutTree) -> Result<(), CodecError> {
    let config = tree.config();
    if tree.max_depth() > config.max_depth {
        return Err(CodecError::DepthExceeded {
            max: config.max_depth,
        });
    }
    let longest = tree
        .panes()
        .flat_map(ViewPane::tabs)
        .map(|tab| tab.title.len())
        .max()
        .unwrap_or(0);
    if longest > config.max_title_len {
        return Err(CodecError::TitleTooLong {
            len: longest,
            max: config.max_title_len,
        });
    }
    Ok(())
}

fn write_tree(
    tree: &LayoutTree,
    hook: &mut dyn TabPayloadHook,
    out: &mut dyn Write,
) -> Result<(), CodecError> {
    let _span = tracing::debug_span!("codec.save", cells = tree.cell_count()).entered();
    write_cell(tree, tree.root(), hook, out)
}

fn write_container(
    container: &ViewContainer,
    hook: &mut dyn TabPayloadHook,
    host: &dyn WindowHost,
    out: &mut dyn Write,
) -> Result<(), CodecError> {
    let window = container.window();
    let rect = host
        .window_rect(window)
        .unwrap_or_else(|| container.window_rect());
    let state = host
        .window_state(window)
        .unwrap_or_else(|| container.window_state());
    out.write_all(&[u8::from(container.is_main_window()), state.code()])?;
    for value in [rect.x, rect.y, rect.width, rect.height] {
        out.write_all(&value.to_le_bytes())?;
    }
    write_tree(container.tree(), hook, out)
}

fn write_cell(
    tree: &LayoutTree,
    id: CellId,
    hook: &mut dyn TabPayloadHook,
    out: &mut dyn Write,
) -> Result<(), CodecError> {
    let Some(cell) = tree.cell(id) else {
        return Ok(());
    };
    let children = cell.children();
    write_len(out, children.len())?;
    let size = cell.normalized_size();
    out.write_all(&[SplitAxis::code(cell.split_axis())])?;
    out.write_all(&size.x.to_le_bytes())?;
    out.write_all(&size.y.to_le_bytes())?;
    match cell.view_pane() {
        Some(pane) => {
            out.write_all(&[1])?;
            write_pane(pane, hook, out)?;
        }
        None => out.write_all(&[0])?,
    }
    for child in children {
        write_cell(tree, *child, hook, out)?;
    }
    Ok(())
}

fn write_pane(
    pane: &ViewPane,
    hook: &mut dyn TabPayloadHook,
    out: &mut dyn Write,
) -> Result<(), CodecError> {
    out.write_all(&pane.id().get().to_le_bytes())?;
    write_len(out, pane.tab_count())?;
    let selected = match pane.selected_index() {
        Some(index) => {
            i32::try_from(index).map_err(|_| CodecError::LengthOverflow { len: index })?
        }
        None => -1,
    };
    out.write_all(&selected.to_le_bytes())?;
    for tab in pane.tabs() {
        out.write_all(&tab.id.0.to_le_bytes())?;
        write_len(out, tab.title.len())?;
        out.write_all(tab.title.as_bytes())?;
        out.write_all(&tab.user_data_id.to_le_bytes())?;
        hook.save_tab(tab, tab.user_data_id, out)?;
    }
    Ok(())
}

fn write_len(out: &mut dyn Write, len: usize) -> Result<(), CodecError> {
    let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow { len })?;
    out.write_all(&len.to_le_bytes())?;
    Ok(())
}

// =========================================================================
// Load
// =========================================================================

/// Read one tree written by [`save_tree`].
///
/// Rects are computed against an empty client rect; callers place the tree
/// with [`LayoutTree::set_rect`].
pub fn load_tree(
    input: &mut dyn Read,
    hook: &mut dyn TabPayloadHook,
    config: &DockConfig,
) -> Result<LayoutTree, CodecError> {
    let mut loader = Loader::new(input, hook, config);
    loader.read_tree().inspect_err(log_rejected)
}

/// Read one container written by [`save_container`] and bind it to a window.
pub fn load_container(
    input: &mut dyn Read,
    hook: &mut dyn TabPayloadHook,
    host: &mut dyn WindowHost,
    config: &DockConfig,
) -> Result<ViewContainer, CodecError> {
    let mut loader = Loader::new(input, hook, config);
    let parsed = loader.read_container().inspect_err(log_rejected)?;
    let mut containers = materialize(vec![parsed], host).inspect_err(log_rejected)?;
    containers.pop().ok_or(CodecError::Truncated)
}

/// Read a workspace written by [`save_workspace`], creating a host window
/// for every non-main container.
pub fn load_workspace(
    input: &mut dyn Read,
    hook: &mut dyn TabPayloadHook,
    host: &mut dyn WindowHost,
    config: &DockConfig,
) -> Result<Workspace, CodecError> {
    let _span = tracing::debug_span!("codec.load").entered();
    let mut loader = Loader::new(input, hook, config);
    let parsed = loader.read_workspace().inspect_err(log_rejected)?;
    let containers = materialize(parsed, host).inspect_err(log_rejected)?;
    let workspace = Workspace::from_containers(containers, config.clone());
    tracing::debug!(
        target: TARGET_CODEC,
        containers = workspace.containers().len(),
        panes = workspace.pane_count(),
        "workspace loaded"
    );
    Ok(workspace)
}

fn log_rejected(err: &CodecError) {
    tracing::warn!(target: TARGET_CODEC, error = %err, "layout load rejected");
}

/// A container decoded from the stream but not yet bound to a window.
struct ParsedContainer {
    is_main: bool,
    state: WindowState,
    rect: Rect,
    tree: LayoutTree,
}

/// Bind parsed containers to host windows.
///
/// Floating windows are created first; if one fails, those already created
/// are hidden again and the main window is left untouched.
fn materialize(
    parsed: Vec<ParsedContainer>,
    host: &mut dyn WindowHost,
) -> Result<Vec<ViewContainer>, CodecError> {
    if parsed.iter().filter(|p| p.is_main).count() > 1 {
        return Err(CodecError::SecondMainWindow);
    }
    let mut created: Vec<WindowHandle> = Vec::new();
    let mut windows = Vec::with_capacity(parsed.len());
    for container in &parsed {
        if container.is_main {
            windows.push(host.main_window());
            continue;
        }
        match host.create_window(
            container.rect,
            WindowFlags::default() | WindowFlags::FLOATING,
        ) {
            Ok(window) => {
                created.push(window);
                windows.push(window);
            }
            Err(err) => {
                for window in created {
                    host.hide_window(window);
                }
                return Err(err.into());
            }
        }
    }

    let mut containers = Vec::with_capacity(parsed.len());
    for (container, window) in parsed.into_iter().zip(windows) {
        if container.is_main {
            host.set_window_rect(window, container.rect);
        }
        apply_window_state(host, window, container.state);
        containers.push(ViewContainer::from_parts(
            window,
            container.is_main,
            container.state,
            container.rect,
            container.tree,
        ));
    }
    Ok(containers)
}

/// Bring every container's child sizes back to a sum of 1.
///
/// Sums already within [`NORMALIZED_EPSILON`] are kept bit-exact. A lone
/// child is stretched to full size. Otherwise only drift up to
/// [`SIZE_REPAIR_TOLERANCE`] is repaired, and never by pushing the last
/// child below 0.
fn repair_sizes(tree: &mut LayoutTree) -> Result<(), CodecError> {
    let containers: Vec<(CellId, SplitAxis)> = tree
        .cells()
        .filter_map(|cell| cell.split_axis().map(|axis| (cell.id(), axis)))
        .collect();
    for (id, axis) in containers {
        let sizes: Vec<f32> = tree
            .cell(id)
            .map(LayoutCell::children)
            .unwrap_or_default()
            .iter()
            .filter_map(|child| tree.cell(*child))
            .map(|child| child.normalized_size().get(axis))
            .collect();
        let sum: f32 = sizes.iter().sum();
        let drift = (sum - 1.0).abs();
        if drift <= NORMALIZED_EPSILON {
            continue;
        }
        if sizes.len() > 1 && drift > SIZE_REPAIR_TOLERANCE {
            return Err(CodecError::SizeSumMismatch { sum });
        }
        tree.fix_normalized_sizes(id);
        let last = tree
            .cell(id)
            .and_then(|cell| cell.children().last().copied())
            .and_then(|child| tree.cell(child))
            .map(|child| child.normalized_size().get(axis));
        if let Some(value) = last
            && value < 0.0
        {
            return Err(CodecError::InvalidSize { value });
        }
    }
    Ok(())
}

struct Loader<'a> {
    input: &'a mut dyn Read,
    hook: &'a mut dyn TabPayloadHook,
    config: &'a DockConfig,
    panes: BTreeSet<PaneId>,
}

impl<'a> Loader<'a> {
    fn new(
        input: &'a mut dyn Read,
        hook: &'a mut dyn TabPayloadHook,
        config: &'a DockConfig,
    ) -> Self {
        Self {
            input,
            hook,
            config,
            panes: BTreeSet::new(),
        }
    }

    fn read_workspace(&mut self) -> Result<Vec<ParsedContainer>, CodecError> {
        let count = self.read_u32()?;
        let mut containers = Vec::new();
        for _ in 0..count {
            containers.push(self.read_container()?);
        }
        Ok(containers)
    }

    fn read_container(&mut self) -> Result<ParsedContainer, CodecError> {
        let is_main = self.read_flag("is_main")?;
        let code = self.read_u8()?;
        let state = WindowState::from_code(code).ok_or(CodecError::UnknownWindowState { code })?;
        let rect = Rect::new(
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
        );
        let tree = self.read_tree()?;
        Ok(ParsedContainer {
            is_main,
            state,
            rect,
            tree,
        })
    }

    fn read_tree(&mut self) -> Result<LayoutTree, CodecError> {
        let mut cells = BTreeMap::new();
        let mut next_id = CellId::MIN;
        let root = self.read_cell(&mut cells, &mut next_id, None, 0)?;
        let mut tree = LayoutTree {
            root,
            next_id,
            cells,
            config: self.config.clone(),
        };
        repair_sizes(&mut tree)?;
        tree.compute_size(root);
        Ok(tree)
    }

    fn read_cell(
        &mut self,
        cells: &mut BTreeMap<CellId, LayoutCell>,
        next_id: &mut CellId,
        parent: Option<CellId>,
        depth: usize,
    ) -> Result<CellId, CodecError> {
        if depth > self.config.max_depth {
            return Err(CodecError::DepthExceeded {
                max: self.config.max_depth,
            });
        }
        let child_count = self.read_u32()?;
        let code = self.read_u8()?;
        let axis = SplitAxis::from_code(code).ok_or(CodecError::UnknownAxis { code })?;
        let size = NormalizedSize::new(self.read_size()?, self.read_size()?);
        let has_pane = self.read_flag("has_view_pane")?;

        let id = *next_id;
        *next_id = id.checked_next().ok_or(CodecError::CellIdOverflow)?;

        let kind = match axis {
            None => {
                if child_count != 0 {
                    return Err(CodecError::LeafWithChildren {
                        children: child_count,
                    });
                }
                let pane = if has_pane {
                    Some(self.read_pane()?)
                } else {
                    None
                };
                CellKind::Leaf { pane }
            }
            Some(axis) => {
                if child_count == 0 {
                    return Err(CodecError::EmptyContainer);
                }
                if has_pane {
                    return Err(CodecError::PaneOnContainer);
                }
                CellKind::Container {
                    axis,
                    children: Vec::new(),
                }
            }
        };
        let is_container = matches!(kind, CellKind::Container { .. });
        let mut cell = LayoutCell::leaf(id, parent, None);
        cell.kind = kind;
        cell.normalized_size = size;
        let _ = cells.insert(id, cell);

        if is_container {
            for _ in 0..child_count {
                let child = self.read_cell(cells, next_id, Some(id), depth + 1)?;
                if let Some(CellKind::Container { children, .. }) =
                    cells.get_mut(&id).map(|c| &mut c.kind)
                {
                    children.push(child);
                }
            }
        }
        Ok(id)
    }

    fn read_pane(&mut self) -> Result<ViewPane, CodecError> {
        let id = PaneId::new(self.read_u64()?).ok_or(CodecError::ZeroPaneId)?;
        if !self.panes.insert(id) {
            return Err(CodecError::DuplicatePane { pane: id });
        }
        let tab_count = self.read_u32()?;
        let selected = self.read_i32()?;
        let selection = match selected {
            -1 => None,
            index if index >= 0 && (index as u32) < tab_count => Some(index as usize),
            _ => {
                return Err(CodecError::InvalidSelection {
                    selected,
                    tabs: tab_count,
                });
            }
        };
        if selection.is_none() && tab_count > 0 {
            return Err(CodecError::InvalidSelection {
                selected,
                tabs: tab_count,
            });
        }

        let mut tabs = Vec::new();
        for _ in 0..tab_count {
            tabs.push(self.read_tab()?);
        }
        ViewPane::from_parts(id, tabs, selection).ok_or(CodecError::DuplicateTabId { pane: id })
    }

    fn read_tab(&mut self) -> Result<ViewTab, CodecError> {
        let view_id = self.read_u32()?;
        let len = usize::try_from(self.read_u32()?).unwrap_or(usize::MAX);
        let max = self.config.max_title_len;
        if len > max {
            return Err(CodecError::TitleTooLong { len, max });
        }
        let mut bytes = vec![0u8; len];
        self.input.read_exact(&mut bytes)?;
        let title = String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
        let user_data_id = self.read_u64()?;
        let mut tab = ViewTab::new(TabId(view_id), title).with_user_data(user_data_id);
        self.hook.load_tab(&mut tab, user_data_id, &mut *self.input)?;
        Ok(tab)
    }

    fn read_size(&mut self) -> Result<f32, CodecError> {
        let value = f32::from_le_bytes(self.read_array()?);
        if !(0.0..=1.0 + NORMALIZED_EPSILON).contains(&value) {
            return Err(CodecError::InvalidSize { value });
        }
        Ok(value)
    }

    fn read_flag(&mut self, field: &'static str) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(CodecError::InvalidFlag { field, value }),
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut buf = [0u8; N];
        self.input.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }
}
