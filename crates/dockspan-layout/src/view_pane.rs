#![forbid(unsafe_code)]

//! Tab groups sharing one screen rectangle.

use std::fmt;

use dockspan_core::geometry::Rect;
use serde::{Deserialize, Serialize};

use crate::tab::{TabId, ViewTab};

/// Stable identifier for view panes.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(u64);

impl PaneId {
    /// Lowest valid pane ID.
    pub const MIN: Self = Self(1);

    /// Create a new pane ID, rejecting 0.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID, or `None` on overflow.
    #[must_use]
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Default for PaneId {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic pane ID allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneIdAllocator {
    next: PaneId,
}

impl PaneIdAllocator {
    /// Start allocating from a known ID.
    #[must_use]
    pub const fn with_next(next: PaneId) -> Self {
        Self { next }
    }

    /// Peek at the next ID without consuming.
    #[must_use]
    pub const fn peek(&self) -> PaneId {
        self.next
    }

    /// Allocate the next ID and advance.
    pub fn allocate(&mut self) -> Option<PaneId> {
        let current = self.next;
        self.next = self.next.checked_next()?;
        Some(current)
    }

    /// Make sure future allocations never reuse `seen`.
    pub fn observe(&mut self, seen: PaneId) {
        if let Some(after) = seen.checked_next()
            && after > self.next
        {
            self.next = after;
        }
    }
}

impl Default for PaneIdAllocator {
    fn default() -> Self {
        Self { next: PaneId::MIN }
    }
}

/// Rejected tab-list edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEditError {
    DuplicateTabId { pane: PaneId, tab: TabId },
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for TabEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTabId { pane, tab } => {
                write!(f, "pane {pane} already holds tab {}", tab.0)
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "tab index {index} out of range for {len} tabs")
            }
        }
    }
}

impl std::error::Error for TabEditError {}

/// An ordered group of tabs sharing one screen rectangle.
///
/// Invariant: `selected` is `Some(i)` with `i < tabs.len()` iff the pane has
/// at least one tab.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPane {
    id: PaneId,
    tabs: Vec<ViewTab>,
    selected: Option<usize>,
    rect: Rect,
}

impl ViewPane {
    /// Empty pane with no tabs.
    #[must_use]
    pub fn new(id: PaneId) -> Self {
        Self {
            id,
            tabs: Vec::new(),
            selected: None,
            rect: Rect::default(),
        }
    }

    /// Pane holding a single selected tab.
    #[must_use]
    pub fn with_tab(id: PaneId, tab: ViewTab) -> Self {
        Self {
            id,
            tabs: vec![tab],
            selected: Some(0),
            rect: Rect::default(),
        }
    }

    /// Rebuild a pane from persisted parts, rejecting inconsistent selection
    /// or duplicate tab IDs.
    pub(crate) fn from_parts(
        id: PaneId,
        tabs: Vec<ViewTab>,
        selected: Option<usize>,
    ) -> Option<Self> {
        let selection_ok = match selected {
            Some(index) => index < tabs.len(),
            None => tabs.is_empty(),
        };
        let unique = tabs
            .iter()
            .enumerate()
            .all(|(i, tab)| tabs[..i].iter().all(|other| other.id != tab.id));
        (selection_ok && unique).then_some(Self {
            id,
            tabs,
            selected,
            rect: Rect::default(),
        })
    }

    #[must_use]
    pub const fn id(&self) -> PaneId {
        self.id
    }

    /// Tabs in tab-bar order.
    #[must_use]
    pub fn tabs(&self) -> &[ViewTab] {
        &self.tabs
    }

    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    #[must_use]
    pub const fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn selected_tab(&self) -> Option<&ViewTab> {
        self.selected.and_then(|index| self.tabs.get(index))
    }

    #[must_use]
    pub fn tab(&self, id: TabId) -> Option<&ViewTab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut ViewTab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    /// Screen rectangle assigned by the last geometry pass.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Append a tab. The first tab of an empty pane becomes selected.
    pub fn add_tab(&mut self, tab: ViewTab) -> Result<usize, TabEditError> {
        let index = self.tabs.len();
        self.insert_tab(index, tab)?;
        Ok(index)
    }

    /// Insert a tab at `index` (`index == len` appends).
    pub fn insert_tab(&mut self, index: usize, tab: ViewTab) -> Result<(), TabEditError> {
        if index > self.tabs.len() {
            return Err(TabEditError::IndexOutOfRange {
                index,
                len: self.tabs.len(),
            });
        }
        if self.tab(tab.id).is_some() {
            return Err(TabEditError::DuplicateTabId {
                pane: self.id,
                tab: tab.id,
            });
        }
        self.tabs.insert(index, tab);
        self.selected = match self.selected {
            None => Some(index),
            Some(selected) if index <= selected => Some(selected + 1),
            keep => keep,
        };
        Ok(())
    }

    /// Remove a tab by ID.
    ///
    /// Removing the selected tab selects its right neighbour, or the new last
    /// tab when it was rightmost.
    pub fn remove_tab(&mut self, id: TabId) -> Option<ViewTab> {
        let index = self.tabs.iter().position(|tab| tab.id == id)?;
        let removed = self.tabs.remove(index);
        self.selected = match self.selected {
            _ if self.tabs.is_empty() => None,
            Some(selected) if index < selected => Some(selected - 1),
            Some(selected) => Some(selected.min(self.tabs.len() - 1)),
            None => None,
        };
        Some(removed)
    }

    /// Select the tab at `index`. Out-of-range indices are ignored.
    pub fn select_tab(&mut self, index: usize) -> bool {
        if index < self.tabs.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Select a tab by ID.
    pub fn select_tab_id(&mut self, id: TabId) -> bool {
        match self.tabs.iter().position(|tab| tab.id == id) {
            Some(index) => self.select_tab(index),
            None => false,
        }
    }

    /// Reorder a tab within the tab bar. The selection follows its tab.
    pub fn move_tab(&mut self, from: usize, to: usize) -> Result<(), TabEditError> {
        let len = self.tabs.len();
        for index in [from, to] {
            if index >= len {
                return Err(TabEditError::IndexOutOfRange { index, len });
            }
        }
        let selected_id = self.selected_tab().map(|tab| tab.id);
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        if let Some(id) = selected_id {
            self.selected = self.tabs.iter().position(|tab| tab.id == id);
        }
        Ok(())
    }

    /// Drain every tab, leaving the pane empty.
    pub fn take_tabs(&mut self) -> Vec<ViewTab> {
        self.selected = None;
        std::mem::take(&mut self.tabs)
    }

    /// Append every tab of `other`, selecting the last one appended.
    ///
    /// Rejected as a whole, with no change, if any tab ID collides.
    pub fn absorb(&mut self, other: ViewPane) -> Result<(), TabEditError> {
        for (i, tab) in other.tabs.iter().enumerate() {
            let collides_here = self.tab(tab.id).is_some();
            let collides_within = other.tabs[..i].iter().any(|prev| prev.id == tab.id);
            if collides_here || collides_within {
                return Err(TabEditError::DuplicateTabId {
                    pane: self.id,
                    tab: tab.id,
                });
            }
        }
        if other.tabs.is_empty() {
            return Ok(());
        }
        self.tabs.extend(other.tabs);
        self.selected = Some(self.tabs.len() - 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane_id(raw: u64) -> PaneId {
        PaneId::new(raw).expect("test ID must be non-zero")
    }

    fn tab(id: u32, title: &str) -> ViewTab {
        ViewTab::new(TabId(id), title)
    }

    fn pane_with(ids: &[u32]) -> ViewPane {
        let mut pane = ViewPane::new(pane_id(1));
        for id in ids {
            pane.add_tab(tab(*id, &format!("tab {id}"))).unwrap();
        }
        pane
    }

    fn titles(pane: &ViewPane) -> Vec<u32> {
        pane.tabs().iter().map(|tab| tab.id.0).collect()
    }

    #[test]
    fn zero_pane_id_is_rejected() {
        assert!(PaneId::new(0).is_none());
        assert_eq!(PaneId::new(7).map(PaneId::get), Some(7));
    }

    #[test]
    fn allocator_is_deterministic_and_observes() {
        let mut alloc = PaneIdAllocator::default();
        assert_eq!(alloc.allocate(), Some(pane_id(1)));
        assert_eq!(alloc.allocate(), Some(pane_id(2)));
        alloc.observe(pane_id(10));
        assert_eq!(alloc.peek(), pane_id(11));
        alloc.observe(pane_id(4));
        assert_eq!(alloc.allocate(), Some(pane_id(11)));
    }

    #[test]
    fn first_tab_is_selected() {
        let mut pane = ViewPane::new(pane_id(1));
        assert_eq!(pane.selected_index(), None);
        pane.add_tab(tab(1, "Log")).unwrap();
        assert_eq!(pane.selected_index(), Some(0));
        pane.add_tab(tab(2, "Assets")).unwrap();
        assert_eq!(pane.selected_index(), Some(0));
    }

    #[test]
    fn duplicate_tab_id_is_rejected() {
        let mut pane = pane_with(&[1, 2]);
        let err = pane.add_tab(tab(2, "again")).unwrap_err();
        assert!(matches!(err, TabEditError::DuplicateTabId { .. }));
        assert_eq!(pane.tab_count(), 2);
    }

    #[test]
    fn insert_before_selection_shifts_it() {
        let mut pane = pane_with(&[1, 2, 3]);
        pane.select_tab(1);
        pane.insert_tab(0, tab(9, "front")).unwrap();
        assert_eq!(pane.selected_tab().map(|t| t.id), Some(TabId(2)));
        assert!(pane.insert_tab(9, tab(10, "far")).is_err());
    }

    #[test]
    fn removing_selected_tab_picks_neighbour() {
        let mut pane = pane_with(&[1, 2, 3]);
        pane.select_tab(1);
        pane.remove_tab(TabId(2)).unwrap();
        assert_eq!(pane.selected_tab().map(|t| t.id), Some(TabId(3)));

        pane.remove_tab(TabId(3)).unwrap();
        assert_eq!(pane.selected_tab().map(|t| t.id), Some(TabId(1)));

        pane.remove_tab(TabId(1)).unwrap();
        assert_eq!(pane.selected_index(), None);
        assert!(pane.remove_tab(TabId(1)).is_none());
    }

    #[test]
    fn removing_before_selection_keeps_selected_tab() {
        let mut pane = pane_with(&[1, 2, 3]);
        pane.select_tab(2);
        pane.remove_tab(TabId(1)).unwrap();
        assert_eq!(pane.selected_tab().map(|t| t.id), Some(TabId(3)));
    }

    #[test]
    fn select_out_of_range_is_ignored() {
        let mut pane = pane_with(&[1, 2]);
        assert!(!pane.select_tab(5));
        assert_eq!(pane.selected_index(), Some(0));
        assert!(pane.select_tab_id(TabId(2)));
        assert_eq!(pane.selected_index(), Some(1));
    }

    #[test]
    fn move_tab_reorders_and_selection_follows() {
        let mut pane = pane_with(&[1, 2, 3]);
        pane.select_tab(0);
        pane.move_tab(0, 2).unwrap();
        assert_eq!(titles(&pane), vec![2, 3, 1]);
        assert_eq!(pane.selected_index(), Some(2));
        assert!(pane.move_tab(0, 3).is_err());
    }

    #[test]
    fn absorb_appends_and_selects_last() {
        let mut pane = pane_with(&[1, 2]);
        let mut other = ViewPane::new(pane_id(2));
        other.add_tab(tab(3, "three")).unwrap();
        other.add_tab(tab(4, "four")).unwrap();
        pane.absorb(other).unwrap();
        assert_eq!(titles(&pane), vec![1, 2, 3, 4]);
        assert_eq!(pane.selected_index(), Some(3));
    }

    #[test]
    fn absorb_with_collision_changes_nothing() {
        let mut pane = pane_with(&[1, 2]);
        let mut other = ViewPane::new(pane_id(2));
        other.add_tab(tab(5, "five")).unwrap();
        other.add_tab(tab(2, "two again")).unwrap();
        assert!(pane.absorb(other).is_err());
        assert_eq!(titles(&pane), vec![1, 2]);
    }

    #[test]
    fn from_parts_validates_selection() {
        let tabs = vec![tab(1, "a"), tab(2, "b")];
        assert!(ViewPane::from_parts(pane_id(1), tabs.clone(), Some(1)).is_some());
        assert!(ViewPane::from_parts(pane_id(1), tabs.clone(), Some(2)).is_none());
        assert!(ViewPane::from_parts(pane_id(1), tabs, None).is_none());
        assert!(ViewPane::from_parts(pane_id(1), Vec::new(), None).is_some());
        let dupes = vec![tab(1, "a"), tab(1, "b")];
        assert!(ViewPane::from_parts(pane_id(1), dupes, Some(0)).is_none());
    }

    #[test]
    fn take_tabs_empties_pane() {
        let mut pane = pane_with(&[1, 2]);
        let tabs = pane.take_tabs();
        assert_eq!(tabs.len(), 2);
        assert!(pane.is_empty());
        assert_eq!(pane.selected_index(), None);
    }
}
