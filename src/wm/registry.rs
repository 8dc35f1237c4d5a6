//! Window state tracking
//!
//! The registry only ever holds what a client asked for or what the manager
//! chose itself. Fields nobody told us about stay `None`.

use std::collections::HashMap;

use crate::transport::{StackMode, WindowChanges, WindowHandle};

/// Last-known geometry and stacking intent for one client window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryEntry {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sibling: Option<WindowHandle>,
    pub stack_mode: Option<StackMode>,
}

impl RegistryEntry {
    /// Overwrite the fields present in `changes`, keep the rest.
    pub fn apply(&mut self, changes: &WindowChanges) {
        if let Some(x) = changes.x {
            self.x = Some(x);
        }
        if let Some(y) = changes.y {
            self.y = Some(y);
        }
        if let Some(width) = changes.width {
            self.width = Some(width);
        }
        if let Some(height) = changes.height {
            self.height = Some(height);
        }
        if let Some(sibling) = changes.sibling {
            self.sibling = Some(sibling);
        }
        if let Some(stack_mode) = changes.stack_mode {
            self.stack_mode = Some(stack_mode);
        }
    }

    /// `(x, y, width, height)` once all four are known.
    pub fn geometry(&self) -> Option<(i32, i32, u32, u32)> {
        Some((self.x?, self.y?, self.width?, self.height?))
    }
}

/// Windows known to the manager.
///
/// Entries are never evicted: destroyed windows leave a stale entry behind.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<WindowHandle, RegistryEntry>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `window`, created empty if this is the first sighting.
    pub fn observe(&mut self, window: WindowHandle) -> &mut RegistryEntry {
        self.windows.entry(window).or_default()
    }

    /// Merge `changes` into the entry for `window`.
    pub fn record(&mut self, window: WindowHandle, changes: &WindowChanges) -> &RegistryEntry {
        let entry = self.observe(window);
        entry.apply(changes);
        entry
    }

    pub fn get(&self, window: WindowHandle) -> Option<&RegistryEntry> {
        self.windows.get(&window)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_creates_empty_entry() {
        let mut registry = WindowRegistry::new();
        assert_eq!(registry.len(), 0);

        registry.observe(WindowHandle(5));

        let entry = registry.get(WindowHandle(5)).unwrap();
        assert_eq!(*entry, RegistryEntry::default());
        assert_eq!(entry.geometry(), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_record_merges_only_present_fields() {
        let mut registry = WindowRegistry::new();
        let window = WindowHandle(7);

        registry.record(
            window,
            &WindowChanges {
                x: Some(10),
                y: Some(20),
                width: Some(300),
                height: Some(200),
                ..Default::default()
            },
        );
        let entry = registry.record(
            window,
            &WindowChanges {
                width: Some(640),
                stack_mode: Some(StackMode::Below),
                ..Default::default()
            },
        );

        assert_eq!(entry.geometry(), Some((10, 20, 640, 200)));
        assert_eq!(entry.stack_mode, Some(StackMode::Below));
        assert_eq!(entry.sibling, None);
    }

    #[test]
    fn test_unseen_window_is_absent() {
        let registry = WindowRegistry::new();
        assert!(registry.get(WindowHandle(99)).is_none());
    }
}
