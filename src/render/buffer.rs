//! Double buffering of the live table.
//!
//! While a staged draw runs, the visible slot shows a deep copy of the table
//! as it was before the draw; the live table is redrawn off-screen and put
//! back once the draw finishes.

use serde::{Deserialize, Serialize};

use super::node::TableNode;
use crate::layout::Invalidation;

/// Which draws are staged off-screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleBufferPolicy {
    /// Stage when the column window changed
    pub column: bool,
    /// Stage when the row window changed
    pub row: bool,
    /// Stage forced full redraws
    pub recreate: bool,
}

impl Default for DoubleBufferPolicy {
    fn default() -> Self {
        Self {
            column: false,
            row: false,
            recreate: true,
        }
    }
}

impl DoubleBufferPolicy {
    pub const fn needs_swap(self, invalidation: Invalidation, force: bool) -> bool {
        (self.recreate && force)
            || (self.column && (invalidation.column || force))
            || (self.row && (invalidation.row || force))
    }
}

/// What the visible slot currently shows.
#[derive(Debug, Clone, Default)]
pub enum Mount {
    /// Nothing; the grid is detached
    #[default]
    Empty,
    /// Cleared, waiting for the first draw
    Placeholder,
    /// The live table
    Live,
    /// A copy of the live table taken before a staged draw
    Snapshot(Box<TableNode>),
}

#[derive(Debug, Default)]
pub struct DoubleBuffer {
    policy: DoubleBufferPolicy,
    mount: Mount,
}

impl DoubleBuffer {
    pub fn new(policy: DoubleBufferPolicy) -> Self {
        Self {
            policy,
            mount: Mount::Empty,
        }
    }

    pub const fn policy(&self) -> DoubleBufferPolicy {
        self.policy
    }

    pub const fn mount(&self) -> &Mount {
        &self.mount
    }

    pub const fn is_attached(&self) -> bool {
        !matches!(self.mount, Mount::Empty)
    }

    pub const fn is_staged(&self) -> bool {
        matches!(self.mount, Mount::Snapshot(_))
    }

    /// Show the live table.
    pub fn attach(&mut self) {
        self.mount = Mount::Live;
    }

    pub fn detach(&mut self) {
        self.mount = Mount::Empty;
    }

    /// Replace whatever is visible with the placeholder.
    pub fn clear(&mut self) {
        self.mount = Mount::Placeholder;
    }

    /// Prepare the visible slot for a draw of `live`. Returns `true` when the
    /// draw is staged behind a snapshot.
    pub fn swap_in(&mut self, live: &TableNode, invalidation: Invalidation, force: bool) -> bool {
        if self.policy.needs_swap(invalidation, force) {
            self.mount = Mount::Snapshot(Box::new(live.snapshot()));
            true
        } else {
            if !matches!(self.mount, Mount::Live) {
                self.mount = Mount::Live;
            }
            false
        }
    }

    /// Put the live table back after a staged draw.
    pub fn swap_out(&mut self) {
        if self.is_staged() {
            self.mount = Mount::Live;
        }
    }

    /// The table a user would see right now.
    pub fn visible<'a>(&'a self, live: &'a TableNode) -> Option<&'a TableNode> {
        match &self.mount {
            Mount::Live => Some(live),
            Mount::Snapshot(snapshot) => Some(snapshot),
            Mount::Empty | Mount::Placeholder => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const NONE: Invalidation = Invalidation {
        row: false,
        column: false,
    };
    const ROW: Invalidation = Invalidation {
        row: true,
        column: false,
    };
    const COLUMN: Invalidation = Invalidation {
        row: false,
        column: true,
    };

    #[test_case(DoubleBufferPolicy::default(), NONE, true => true; "recreate on force")]
    #[test_case(DoubleBufferPolicy::default(), ROW, false => false; "default ignores rows")]
    #[test_case(DoubleBufferPolicy { column: true, row: false, recreate: false }, COLUMN, false => true; "column axis")]
    #[test_case(DoubleBufferPolicy { column: true, row: false, recreate: false }, ROW, false => false; "column axis ignores rows")]
    #[test_case(DoubleBufferPolicy { column: false, row: true, recreate: false }, NONE, true => true; "row axis on force")]
    #[test_case(DoubleBufferPolicy { column: false, row: false, recreate: false }, NONE, true => false; "all off")]
    fn test_needs_swap(policy: DoubleBufferPolicy, inv: Invalidation, force: bool) -> bool {
        policy.needs_swap(inv, force)
    }

    #[test]
    fn test_staged_draw_shows_snapshot() {
        let live = TableNode::new();
        let mut buffer = DoubleBuffer::new(DoubleBufferPolicy::default());
        buffer.attach();

        assert!(buffer.swap_in(&live, NONE, true));
        let shown = buffer.visible(&live).map(TableNode::id);
        assert!(shown.is_some());
        assert_ne!(shown, Some(live.id()));

        buffer.swap_out();
        assert_eq!(buffer.visible(&live).map(TableNode::id), Some(live.id()));
    }

    #[test]
    fn test_unstaged_draw_attaches_live() {
        let live = TableNode::new();
        let mut buffer = DoubleBuffer::default();
        buffer.clear();
        assert!(buffer.visible(&live).is_none());
        assert!(!buffer.swap_in(&live, ROW, false));
        assert_eq!(buffer.visible(&live).map(TableNode::id), Some(live.id()));
        buffer.detach();
        assert!(!buffer.is_attached());
    }
}
