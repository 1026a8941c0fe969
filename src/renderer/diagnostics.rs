use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt::Arguments;

/// Warn-once bookkeeping for problems that would otherwise repeat every frame,
/// such as a shader that lacks a uniform the renderer keeps setting.
///
/// Keys are `(owner, name)` pairs. Once a pair has been reported, further
/// reports for it are dropped until [`Diagnostics::clear`].
#[derive(Debug, Default)]
pub struct Diagnostics {
    warned: RefCell<HashSet<(String, String)>>,
    warning_count: Cell<usize>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    /// Logs `message` unless `(owner, name)` was already reported. Returns
    /// whether anything was logged.
    pub fn warn_once(&self, owner: &str, name: &str, message: Arguments) -> bool {
        let mut warned = self.warned.borrow_mut();
        if warned.contains(&(owner.to_string(), name.to_string())) {
            return false;
        }
        warned.insert((owner.to_string(), name.to_string()));
        log::warn!("{message}");
        self.warning_count.set(self.warning_count.get() + 1);
        true
    }

    pub fn has_warned(&self, owner: &str, name: &str) -> bool {
        self.warned
            .borrow()
            .contains(&(owner.to_string(), name.to_string()))
    }

    /// Total warnings logged since creation or the last clear.
    pub fn warning_count(&self) -> usize {
        self.warning_count.get()
    }

    pub fn clear(&self) {
        self.warned.borrow_mut().clear();
        self.warning_count.set(0);
    }
}
