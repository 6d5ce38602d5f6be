//! Arena-backed directory tree

use crate::remote::{EntryKind, RemoteEntry};
use serde::Serialize;
use std::collections::HashMap;

/// Index of a node within its [`DirectoryTree`].
///
/// Only meaningful for the tree (and cache entry) that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Progress of a directory's lazy expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionState {
    Unexpanded,
    Expanding,
    Expanded,
}

/// One file or directory in the remote tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryNode {
    pub id: NodeId,
    /// Repository-relative path without leading or trailing slash
    pub path: String,
    pub name: String,
    pub kind: EntryKind,
    /// 0 for top-level entries
    pub depth: usize,
    /// Whether expanding this directory is expected to yield entries
    pub has_expandable_children: bool,
    /// Populated only once `expansion_state` is `Expanded`
    pub children: Vec<NodeId>,
    pub expansion_state: ExpansionState,
    pub parent: Option<NodeId>,
}

impl DirectoryNode {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Directory tree stored as a flat arena with parent-to-children index lists.
#[derive(Debug, Clone, Default)]
pub struct DirectoryTree {
    nodes: Vec<DirectoryNode>,
    roots: Vec<NodeId>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a flat listing rooted at `base`.
    ///
    /// Entries are grouped by shared path prefix: `docs/a` becomes a child of
    /// `docs` when both are listed, and missing intermediate directories are
    /// synthesized. Directories whose children appear in the listing are
    /// marked expanded.
    pub fn from_listing(base: &str, entries: Vec<RemoteEntry>) -> Self {
        let mut tree = Self::new();
        tree.insert_listing(None, base, entries);
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&DirectoryNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut DirectoryNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    /// Snapshot of the top-level nodes, in display order.
    pub fn roots(&self) -> Vec<DirectoryNode> {
        self.snapshot(&self.roots)
    }

    /// Snapshot of a node's attached children, in display order.
    pub fn children(&self, id: NodeId) -> Vec<DirectoryNode> {
        match self.get(id) {
            Some(node) => self.snapshot(&node.children),
            None => Vec::new(),
        }
    }

    /// Find a node by its remote path.
    pub fn find(&self, path: &str) -> Option<&DirectoryNode> {
        let path = path.trim_matches('/');
        self.nodes.iter().find(|n| n.path == path)
    }

    /// Depth-first walk of every node reachable from the roots.
    pub fn walk(&self) -> Vec<&DirectoryNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                out.push(node);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Insert a listing of `base` below `parent` (or as roots).
    ///
    /// Returns the ids of the entries directly under `base`, in display order.
    pub(crate) fn insert_listing(
        &mut self,
        parent: Option<NodeId>,
        base: &str,
        entries: Vec<RemoteEntry>,
    ) -> Vec<NodeId> {
        let base = base.trim_matches('/');
        let base_depth = parent
            .and_then(|id| self.get(id))
            .map(|n| n.depth + 1)
            .unwrap_or(0);

        // Shallow entries first so a listed directory wins over a synthesized one
        let mut relative: Vec<(Vec<String>, EntryKind)> = entries
            .into_iter()
            .map(|entry| (relative_segments(base, &entry), entry.kind))
            .filter(|(segments, _)| !segments.is_empty())
            .collect();
        relative.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        let mut seen: HashMap<String, NodeId> = HashMap::new();
        let mut direct = Vec::new();
        let mut touched = Vec::new();

        for (segments, kind) in relative {
            let mut owner = parent;
            let mut relative_path = String::new();

            for (i, name) in segments.iter().enumerate() {
                let last = i + 1 == segments.len();
                if !relative_path.is_empty() {
                    relative_path.push('/');
                }
                relative_path.push_str(name);

                let id = match seen.get(&relative_path) {
                    Some(id) => *id,
                    None => {
                        let id = NodeId(self.nodes.len());
                        let node_kind = if last { kind } else { EntryKind::Directory };
                        self.nodes.push(DirectoryNode {
                            id,
                            path: join(base, &relative_path),
                            name: name.clone(),
                            kind: node_kind,
                            depth: base_depth + i,
                            has_expandable_children: node_kind == EntryKind::Directory,
                            children: Vec::new(),
                            expansion_state: ExpansionState::Unexpanded,
                            parent: owner,
                        });
                        seen.insert(relative_path.clone(), id);
                        match owner {
                            Some(owner_id) if i > 0 => {
                                if let Some(node) = self.get_mut(owner_id) {
                                    node.children.push(id);
                                }
                            }
                            _ => direct.push(id),
                        }
                        id
                    }
                };

                if !last {
                    // The listing already reached below this directory
                    if let Some(node) = self.get_mut(id) {
                        node.expansion_state = ExpansionState::Expanded;
                        node.has_expandable_children = true;
                    }
                    touched.push(id);
                }
                owner = Some(id);
            }
        }

        match parent {
            Some(id) => {
                if let Some(node) = self.get_mut(id) {
                    node.children = direct;
                }
            }
            None => self.roots = direct,
        }

        self.sort_children(parent);
        for id in touched {
            self.sort_children(Some(id));
        }

        match parent {
            Some(id) => self.get(id).map(|n| n.children.clone()).unwrap_or_default(),
            None => self.roots.clone(),
        }
    }

    fn sort_children(&mut self, parent: Option<NodeId>) {
        let mut ids = match parent {
            Some(id) => match self.get(id) {
                Some(node) => node.children.clone(),
                None => return,
            },
            None => self.roots.clone(),
        };
        ids.sort_by(|a, b| {
            let (a, b) = (&self.nodes[a.0], &self.nodes[b.0]);
            b.is_directory()
                .cmp(&a.is_directory())
                .then_with(|| a.name.cmp(&b.name))
        });
        match parent {
            Some(id) => {
                if let Some(node) = self.get_mut(id) {
                    node.children = ids;
                }
            }
            None => self.roots = ids,
        }
    }

    fn snapshot(&self, ids: &[NodeId]) -> Vec<DirectoryNode> {
        ids.iter().filter_map(|id| self.get(*id).cloned()).collect()
    }
}

/// Path segments of `entry` below `base`.
///
/// Listings normally report full repository paths; an entry outside `base`
/// falls back to its bare name.
fn relative_segments(base: &str, entry: &RemoteEntry) -> Vec<String> {
    let path = entry.path.trim_matches('/');
    let relative = if base.is_empty() {
        Some(path)
    } else {
        path.strip_prefix(base).and_then(|rest| rest.strip_prefix('/'))
    };
    let relative = match relative {
        Some(rel) if !rel.is_empty() => rel,
        _ => entry.name.trim_matches('/'),
    };
    relative
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn join(base: &str, relative: &str) -> String {
    if base.is_empty() {
        relative.to_string()
    } else {
        format!("{}/{}", base, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(nodes: &[DirectoryNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn directories_sort_before_files() {
        let tree = DirectoryTree::from_listing(
            "",
            vec![
                RemoteEntry::file("b.md"),
                RemoteEntry::directory("zeta"),
                RemoteEntry::file("a.md"),
                RemoteEntry::directory("alpha"),
            ],
        );

        assert_eq!(names(&tree.roots()), vec!["alpha", "zeta", "a.md", "b.md"]);
        assert!(tree.roots().iter().all(|n| n.depth == 0 && n.parent.is_none()));
    }

    #[test]
    fn nested_listing_is_grouped_by_prefix() {
        let tree = DirectoryTree::from_listing(
            "",
            vec![
                RemoteEntry::directory("guide"),
                RemoteEntry::file("guide/intro.md"),
                RemoteEntry::directory("guide/advanced"),
                RemoteEntry::file("readme.md"),
            ],
        );

        let roots = tree.roots();
        assert_eq!(names(&roots), vec!["guide", "readme.md"]);
        let guide = &roots[0];
        assert_eq!(guide.expansion_state, ExpansionState::Expanded);
        let children = tree.children(guide.id);
        assert_eq!(names(&children), vec!["advanced", "intro.md"]);
        assert_eq!(children[0].path, "guide/advanced");
        assert_eq!(children[0].depth, 1);
        assert_eq!(children[0].parent, Some(guide.id));
        assert_eq!(children[0].expansion_state, ExpansionState::Unexpanded);
    }

    #[test]
    fn missing_ancestors_are_synthesized() {
        let tree = DirectoryTree::from_listing("", vec![RemoteEntry::file("a/b/c.md")]);

        assert_eq!(tree.len(), 3);
        let a = tree.find("a").unwrap();
        assert!(a.is_directory());
        let b = tree.find("a/b").unwrap();
        assert_eq!(b.parent, Some(a.id));
        assert_eq!(tree.find("a/b/c.md").unwrap().depth, 2);
    }

    #[test]
    fn listing_below_content_root_keeps_full_paths() {
        let tree = DirectoryTree::from_listing(
            "docs",
            vec![RemoteEntry::directory("docs/guide"), RemoteEntry::file("docs/index.md")],
        );

        let roots = tree.roots();
        assert_eq!(names(&roots), vec!["guide", "index.md"]);
        assert_eq!(roots[0].path, "docs/guide");
    }

    #[test]
    fn insert_listing_attaches_children() {
        let mut tree = DirectoryTree::from_listing("", vec![RemoteEntry::directory("guide")]);
        let guide = tree.root_ids()[0];

        let children = tree.insert_listing(
            Some(guide),
            "guide",
            vec![RemoteEntry::file("guide/b.md"), RemoteEntry::file("guide/a.md")],
        );

        assert_eq!(children.len(), 2);
        assert_eq!(names(&tree.children(guide)), vec!["a.md", "b.md"]);
        assert!(tree.children(guide).iter().all(|n| n.depth == 1));
        assert_eq!(tree.walk().len(), 3);
    }
}
