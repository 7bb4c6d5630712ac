//! Activation tokens that let late async results be recognised and dropped.

use std::path::{Path, PathBuf};

/// Activation token for one opened folder.
///
/// Every activation gets a fresh generation, so a result issued under an
/// earlier activation of the same folder is still recognised as stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    folder: PathBuf,
    generation: u64,
}

impl Scope {
    /// Folder this scope was activated for.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Monotonic activation counter.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Current activation of a component, if any.
#[derive(Debug, Default)]
pub(crate) struct ScopeSlot {
    current: Option<Scope>,
    generation: u64,
}

impl ScopeSlot {
    pub(crate) fn activate(&mut self, folder: PathBuf) -> Scope {
        self.generation += 1;
        let scope = Scope {
            folder,
            generation: self.generation,
        };
        self.current = Some(scope.clone());
        scope
    }

    pub(crate) fn deactivate(&mut self) {
        self.current = None;
    }

    pub(crate) const fn current(&self) -> Option<&Scope> {
        self.current.as_ref()
    }

    pub(crate) fn is_current(&self, scope: &Scope) -> bool {
        self.current.as_ref() == Some(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reactivating_the_same_folder_invalidates_old_tokens() {
        let mut slot = ScopeSlot::default();
        let first = slot.activate(PathBuf::from("/boards/a"));
        let second = slot.activate(PathBuf::from("/boards/a"));

        assert_ne!(first, second);
        assert!(!slot.is_current(&first));
        assert!(slot.is_current(&second));

        slot.deactivate();
        assert!(!slot.is_current(&second));
        assert!(slot.current().is_none());
    }
}
