#![forbid(unsafe_code)]

//! Core: geometry and host collaborators for the dockspan layout engine.
//!
//! # Role in dockspan
//! `dockspan-core` holds the pieces the layout tree depends on but does not
//! own: pixel geometry, the window-system collaborator trait, and logging
//! targets. `dockspan-layout` builds the docking algebra on top of these.

pub mod geometry;
pub mod logging;
pub mod window;

pub use geometry::{Point, Rect};
pub use window::{
    HeadlessWindow, HeadlessWindowHost, WindowError, WindowFlags, WindowHandle, WindowHost,
    WindowState, apply_window_state,
};
