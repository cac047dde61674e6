#![forbid(unsafe_code)]

//! Dockable content units.

use serde::{Deserialize, Serialize};

/// Identifier of a tab, unique within its pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

/// Opaque icon handle owned by the host's renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconHandle(pub u64);

/// A single dockable unit of content shown as one entry in a pane's tab bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewTab {
    pub id: TabId,
    pub title: String,
    /// Not persisted; hosts re-resolve icons after a load.
    #[serde(default)]
    pub icon: IconHandle,
    /// Host-owned identifier, round-tripped through persistence untouched.
    pub user_data_id: u64,
}

impl ViewTab {
    #[must_use]
    pub fn new(id: TabId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            icon: IconHandle::default(),
            user_data_id: 0,
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon: IconHandle) -> Self {
        self.icon = icon;
        self
    }

    #[must_use]
    pub fn with_user_data(mut self, user_data_id: u64) -> Self {
        self.user_data_id = user_data_id;
        self
    }
}
