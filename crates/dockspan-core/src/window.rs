#![forbid(unsafe_code)]

//! Window-system collaborator.
//!
//! The layout engine never talks to an OS directly. Hosts implement
//! [`WindowHost`] so the engine can snapshot window geometry when saving a
//! layout and recreate floating windows when loading one.
//! [`HeadlessWindowHost`] keeps all state in memory for tests and tools.

use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Opaque OS window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(u64);

impl WindowHandle {
    /// Wrap a raw host handle.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw host handle.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Visibility state of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    #[default]
    Normal,
    Maximized,
    Minimized,
    Hidden,
}

impl WindowState {
    /// Stable byte code used by the layout codec.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Maximized => 1,
            Self::Minimized => 2,
            Self::Hidden => 3,
        }
    }

    /// Decode a byte produced by [`WindowState::code`].
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Normal),
            1 => Some(Self::Maximized),
            2 => Some(Self::Minimized),
            3 => Some(Self::Hidden),
            _ => None,
        }
    }
}

bitflags! {
    /// Creation flags for host windows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u8 {
        /// User may resize the window.
        const RESIZABLE = 0b0001;
        /// Window has OS decorations (title bar, borders).
        const DECORATED = 0b0010;
        /// Window hosts panes undocked from another window.
        const FLOATING  = 0b0100;
    }
}

impl Default for WindowFlags {
    fn default() -> Self {
        Self::RESIZABLE | Self::DECORATED
    }
}

/// Failure reported by a [`WindowHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The host refused or failed to create a window.
    CreateFailed { reason: String },
    /// The handle does not name a live window.
    UnknownWindow { window: WindowHandle },
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateFailed { reason } => write!(f, "window creation failed: {reason}"),
            Self::UnknownWindow { window } => write!(f, "unknown window {}", window.0),
        }
    }
}

impl std::error::Error for WindowError {}

/// Host window system as seen by the layout engine.
pub trait WindowHost {
    /// The application's main window, which always exists.
    fn main_window(&self) -> WindowHandle;

    /// Create a new top-level window with the given client rectangle.
    fn create_window(&mut self, rect: Rect, flags: WindowFlags)
    -> Result<WindowHandle, WindowError>;

    /// Current client rectangle of a window.
    fn window_rect(&self, window: WindowHandle) -> Option<Rect>;

    /// Move/resize a window's client rectangle.
    fn set_window_rect(&mut self, window: WindowHandle, rect: Rect);

    fn maximize_window(&mut self, window: WindowHandle);

    fn minimize_window(&mut self, window: WindowHandle);

    fn hide_window(&mut self, window: WindowHandle);

    /// Current visibility state of a window.
    fn window_state(&self, window: WindowHandle) -> Option<WindowState>;
}

/// Drive a host window into `state` using the collaborator primitives.
///
/// `Normal` needs no call: freshly created or repositioned windows are normal.
pub fn apply_window_state(host: &mut dyn WindowHost, window: WindowHandle, state: WindowState) {
    match state {
        WindowState::Normal => {}
        WindowState::Maximized => host.maximize_window(window),
        WindowState::Minimized => host.minimize_window(window),
        WindowState::Hidden => host.hide_window(window),
    }
}

/// One window tracked by [`HeadlessWindowHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessWindow {
    pub rect: Rect,
    pub state: WindowState,
    pub flags: WindowFlags,
}

/// In-memory [`WindowHost`] with deterministic handle allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessWindowHost {
    main: WindowHandle,
    next_handle: u64,
    windows: BTreeMap<WindowHandle, HeadlessWindow>,
}

impl HeadlessWindowHost {
    /// Create a host whose main window has the given client rectangle.
    #[must_use]
    pub fn new(main_rect: Rect) -> Self {
        let main = WindowHandle(1);
        let mut windows = BTreeMap::new();
        let _ = windows.insert(
            main,
            HeadlessWindow {
                rect: main_rect,
                state: WindowState::Normal,
                flags: WindowFlags::default(),
            },
        );
        Self {
            main,
            next_handle: 2,
            windows,
        }
    }

    /// Inspect a tracked window.
    #[must_use]
    pub fn window(&self, window: WindowHandle) -> Option<&HeadlessWindow> {
        self.windows.get(&window)
    }

    /// Number of windows created so far, including the main window.
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    fn with_window(&mut self, window: WindowHandle, f: impl FnOnce(&mut HeadlessWindow)) {
        if let Some(entry) = self.windows.get_mut(&window) {
            f(entry);
        }
    }
}

impl WindowHost for HeadlessWindowHost {
    fn main_window(&self) -> WindowHandle {
        self.main
    }

    fn create_window(
        &mut self,
        rect: Rect,
        flags: WindowFlags,
    ) -> Result<WindowHandle, WindowError> {
        if rect.is_empty() {
            return Err(WindowError::CreateFailed {
                reason: format!("empty client rect {}x{}", rect.width, rect.height),
            });
        }
        let handle = WindowHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        let _ = self.windows.insert(
            handle,
            HeadlessWindow {
                rect,
                state: WindowState::Normal,
                flags,
            },
        );
        tracing::debug!(
            target: "dockspan.window",
            window = handle.0,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "headless window created"
        );
        Ok(handle)
    }

    fn window_rect(&self, window: WindowHandle) -> Option<Rect> {
        self.windows.get(&window).map(|entry| entry.rect)
    }

    fn set_window_rect(&mut self, window: WindowHandle, rect: Rect) {
        self.with_window(window, |entry| entry.rect = rect);
    }

    fn maximize_window(&mut self, window: WindowHandle) {
        self.with_window(window, |entry| entry.state = WindowState::Maximized);
    }

    fn minimize_window(&mut self, window: WindowHandle) {
        self.with_window(window, |entry| entry.state = WindowState::Minimized);
    }

    fn hide_window(&mut self, window: WindowHandle) {
        self.with_window(window, |entry| entry.state = WindowState::Hidden);
    }

    fn window_state(&self, window: WindowHandle) -> Option<WindowState> {
        self.windows.get(&window).map(|entry| entry.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_state_codes_round_trip() {
        for state in [
            WindowState::Normal,
            WindowState::Maximized,
            WindowState::Minimized,
            WindowState::Hidden,
        ] {
            assert_eq!(WindowState::from_code(state.code()), Some(state));
        }
        assert_eq!(WindowState::from_code(4), None);
    }

    #[test]
    fn headless_host_allocates_distinct_handles() {
        let mut host = HeadlessWindowHost::new(Rect::from_size(800, 600));
        let a = host
            .create_window(Rect::new(10, 10, 200, 100), WindowFlags::FLOATING)
            .expect("create");
        let b = host
            .create_window(Rect::new(20, 20, 200, 100), WindowFlags::FLOATING)
            .expect("create");
        assert_ne!(a, b);
        assert_ne!(a, host.main_window());
        assert_eq!(host.window_count(), 3);
        assert_eq!(host.window_rect(b), Some(Rect::new(20, 20, 200, 100)));
    }

    #[test]
    fn headless_host_rejects_empty_rect() {
        let mut host = HeadlessWindowHost::new(Rect::from_size(800, 600));
        let err = host
            .create_window(Rect::new(0, 0, 0, 10), WindowFlags::default())
            .expect_err("empty rect must fail");
        assert!(matches!(err, WindowError::CreateFailed { .. }));
    }

    #[test]
    fn apply_window_state_drives_host() {
        let mut host = HeadlessWindowHost::new(Rect::from_size(800, 600));
        let main = host.main_window();
        apply_window_state(&mut host, main, WindowState::Maximized);
        assert_eq!(host.window_state(main), Some(WindowState::Maximized));
        apply_window_state(&mut host, main, WindowState::Hidden);
        assert_eq!(host.window_state(main), Some(WindowState::Hidden));
        apply_window_state(&mut host, main, WindowState::Normal);
        assert_eq!(host.window_state(main), Some(WindowState::Hidden));
    }

    #[test]
    fn unknown_window_queries_return_none() {
        let host = HeadlessWindowHost::new(Rect::from_size(800, 600));
        let ghost = WindowHandle::from_raw(99);
        assert_eq!(host.window_rect(ghost), None);
        assert_eq!(host.window_state(ghost), None);
    }
}
