//! Pre-order traversal of a tree hierarchy.

use arbor_store::ObjectStore;
use arbor_types::ObjectId;

use crate::entry::TreeEntry;
use crate::error::TreeResult;
use crate::tree::Tree;

/// One entry reached by a [`TreeWalk`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkItem {
    /// Nesting level; entries of the root tree are at depth 0.
    pub depth: usize,
    /// Slash-separated path from the root tree.
    pub path: String,
    /// The entry itself.
    pub entry: TreeEntry,
}

struct Frame {
    tree: Tree,
    next: usize,
    depth: usize,
    prefix: String,
}

/// Lazy pre-order walk over a tree and all of its subtrees.
///
/// Each directory entry is yielded before the entries of the subtree it
/// points to. Subtrees are loaded from the store only when reached. Gitlink
/// entries are yielded but not descended into. After the first error the
/// walk yields that error and then ends.
pub struct TreeWalk<'s> {
    store: &'s dyn ObjectStore,
    root: ObjectId,
    stack: Vec<Frame>,
    // Subtree of the directory entry yielded last, loaded on the next step.
    pending: Option<Pending>,
    started: bool,
    finished: bool,
}

struct Pending {
    id: ObjectId,
    depth: usize,
    prefix: String,
}

impl<'s> TreeWalk<'s> {
    /// Walk the tree stored under `root`.
    pub fn new(store: &'s dyn ObjectStore, root: ObjectId) -> Self {
        Self {
            store,
            root,
            stack: Vec::new(),
            pending: None,
            started: false,
            finished: false,
        }
    }

    /// Rewind to the beginning of the walk.
    pub fn restart(&mut self) {
        self.stack.clear();
        self.pending = None;
        self.started = false;
        self.finished = false;
    }

    fn push(&mut self, id: &ObjectId, depth: usize, prefix: String) -> TreeResult<()> {
        let tree = Tree::lookup(self.store, id)?;
        self.stack.push(Frame {
            tree,
            next: 0,
            depth,
            prefix,
        });
        Ok(())
    }

    fn advance(&mut self) -> TreeResult<Option<WalkItem>> {
        if !self.started {
            self.started = true;
            let root = self.root;
            self.push(&root, 0, String::new())?;
        }
        if let Some(Pending { id, depth, prefix }) = self.pending.take() {
            self.push(&id, depth, prefix)?;
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                return Ok(None);
            };
            let Some(entry) = frame.tree.entries().get(frame.next).cloned() else {
                self.stack.pop();
                continue;
            };
            frame.next += 1;

            let depth = frame.depth;
            let path = format!("{}{}", frame.prefix, entry.name);
            if entry.is_tree() {
                self.pending = Some(Pending {
                    id: entry.object_id,
                    depth: depth + 1,
                    prefix: format!("{path}/"),
                });
            }
            return Ok(Some(WalkItem { depth, path, entry }));
        }
    }
}

impl Iterator for TreeWalk<'_> {
    type Item = TreeResult<WalkItem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.advance() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                self.stack.clear();
                self.pending = None;
                Some(Err(e))
            }
        }
    }
}
