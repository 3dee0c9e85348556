use std::collections::{btree_map::Entry, BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::error::{TimelineError, TimelineResult};

type Children = BTreeMap<String, ActivityNode>;

/// A node of the activity hierarchy. The node's name is the key under which its parent stores
/// it. On disk a node is written as `[id, {children}]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Uuid, Children)", into = "(Uuid, Children)")]
pub struct ActivityNode {
    pub id: Uuid,
    pub children: Children,
}

impl ActivityNode {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            children: BTreeMap::new(),
        }
    }
}

impl From<(Uuid, Children)> for ActivityNode {
    fn from((id, children): (Uuid, Children)) -> Self {
        Self { id, children }
    }
}

impl From<ActivityNode> for (Uuid, Children) {
    fn from(node: ActivityNode) -> Self {
        (node.id, node.children)
    }
}

/// Result of looking an activity up in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedActivity {
    pub id: Uuid,
    pub name: String,
    /// Absolute path, e.g. `/projects/tyme`.
    pub path: String,
}

/// Hierarchical namespace of activities. The root is implicit, its children are the top level
/// categories.
///
/// Children are kept sorted by name, so every traversal (name search, path enumeration) is a
/// pre-order walk in name order and is stable across save and load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityTree {
    roots: Children,
}

impl ActivityTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Creates an activity at an absolute path like `/a/b/c` and returns its new id.
    ///
    /// Every segment but the last must exist unless `create_missing_parents` is set, in which
    /// case missing segments are created as empty branches. Fails without touching the tree when
    /// the last segment already exists.
    pub fn create(&mut self, path: &str, create_missing_parents: bool) -> TimelineResult<Uuid> {
        let segments = split_absolute(path)?;
        let Some((leaf, parents)) = segments.split_last() else {
            return Err(TimelineError::malformed_path(path, "path is empty"));
        };

        let mut children = &mut self.roots;
        for (depth, segment) in parents.iter().enumerate() {
            if !children.contains_key(*segment) {
                if !create_missing_parents {
                    return Err(TimelineError::MissingParent {
                        path: path.to_string(),
                        parent: format!("/{}", segments[..=depth].join("/")),
                    });
                }
                debug!("Creating missing parent /{}", segments[..=depth].join("/"));
            }
            children = &mut children
                .entry(segment.to_string())
                .or_insert_with(ActivityNode::new)
                .children;
        }

        match children.entry(leaf.to_string()) {
            Entry::Occupied(_) => Err(TimelineError::DuplicateActivity(path.to_string())),
            Entry::Vacant(slot) => {
                let node = ActivityNode::new();
                let id = node.id;
                slot.insert(node);
                debug!("Created activity {path} with id {id}");
                Ok(id)
            }
        }
    }

    /// Looks up an activity. Input starting with `/` is an exact absolute path, anything else is
    /// a bare name searched in pre-order. When several nodes share a name, the first one
    /// encountered wins.
    pub fn resolve(&self, name_or_path: &str) -> Option<ResolvedActivity> {
        if name_or_path.starts_with('/') {
            self.resolve_path(name_or_path)
        } else {
            find_by_name(&self.roots, name_or_path, "")
        }
    }

    pub fn resolve_id(&self, name_or_path: &str) -> Option<Uuid> {
        self.resolve(name_or_path).map(|v| v.id)
    }

    /// Absolute path of the node carrying `id`.
    pub fn path_of_id(&self, id: Uuid) -> Option<String> {
        fn walk(children: &Children, id: Uuid, prefix: &str) -> Option<String> {
            children.iter().find_map(|(name, node)| {
                let path = format!("{prefix}/{name}");
                if node.id == id {
                    Some(path)
                } else {
                    walk(&node.children, id, &path)
                }
            })
        }
        walk(&self.roots, id, "")
    }

    /// Lists every node as a placement prefix (`"a/"`, `"a/b/"`). Per level, all children come
    /// first, followed by the entries of each child's subtree.
    pub fn enumerate_paths(&self) -> Vec<String> {
        fn walk(children: &Children, out: &mut Vec<String>, prefix: &str) {
            for name in children.keys() {
                out.push(format!("{prefix}{name}/"));
            }
            for (name, node) in children {
                walk(&node.children, out, &format!("{prefix}{name}/"));
            }
        }

        let mut out = Vec::new();
        walk(&self.roots, &mut out, "");
        out
    }

    /// Checks a tree read from disk: every name is a single non-blank segment and no id is used
    /// twice.
    pub fn validate(&self) -> TimelineResult<()> {
        fn walk(children: &Children, prefix: &str, seen: &mut HashSet<Uuid>) -> TimelineResult<()> {
            for (name, node) in children {
                let path = format!("{prefix}/{name}");
                if name.trim().is_empty() || name.contains('/') {
                    return Err(TimelineError::CorruptTimeline(format!(
                        "activity {path:?} has an invalid name"
                    )));
                }
                if !seen.insert(node.id) {
                    return Err(TimelineError::CorruptTimeline(format!(
                        "activity {path} reuses id {}",
                        node.id
                    )));
                }
                walk(&node.children, &path, seen)?;
            }
            Ok(())
        }
        walk(&self.roots, "", &mut HashSet::new())
    }

    fn resolve_path(&self, path: &str) -> Option<ResolvedActivity> {
        let segments = split_absolute(path).ok()?;
        let (leaf, parents) = segments.split_last()?;
        let mut children = &self.roots;
        for segment in parents {
            children = &children.get(*segment)?.children;
        }
        children.get(*leaf).map(|node| ResolvedActivity {
            id: node.id,
            name: leaf.to_string(),
            path: format!("/{}", segments.join("/")),
        })
    }
}

fn find_by_name(children: &Children, name: &str, prefix: &str) -> Option<ResolvedActivity> {
    for (child_name, node) in children {
        let path = format!("{prefix}/{child_name}");
        if child_name == name {
            return Some(ResolvedActivity {
                id: node.id,
                name: child_name.clone(),
                path,
            });
        }
        if let Some(found) = find_by_name(&node.children, name, &path) {
            return Some(found);
        }
    }
    None
}

/// Splits `/a/b/c` into its segments. Relative paths and empty segments are rejected.
fn split_absolute(path: &str) -> TimelineResult<Vec<&str>> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(TimelineError::malformed_path(
            path,
            "expected an absolute path starting with '/'",
        ));
    };
    let segments = rest.split('/').collect::<Vec<_>>();
    if segments.iter().any(|v| v.trim().is_empty()) {
        return Err(TimelineError::malformed_path(path, "path contains an empty segment"));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use crate::timeline::error::TimelineError;

    use super::ActivityTree;

    fn sample_tree() -> ActivityTree {
        let mut tree = ActivityTree::new();
        tree.create("/work", false).unwrap();
        tree.create("/work/tyme", false).unwrap();
        tree.create("/leisure", false).unwrap();
        tree.create("/leisure/reading", false).unwrap();
        tree
    }

    #[test]
    fn test_create_missing_parent() {
        let mut tree = ActivityTree::new();
        let result = tree.create("/a/b/c", false);
        assert!(matches!(
            result,
            Err(TimelineError::MissingParent { ref parent, .. }) if parent == "/a"
        ));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_create_with_parents() {
        let mut tree = ActivityTree::new();
        let id = tree.create("/a/b/c", true).unwrap();

        let a = tree.resolve("/a").unwrap();
        let b = tree.resolve("/a/b").unwrap();
        let c = tree.resolve("/a/b/c").unwrap();
        assert_eq!(c.id, id);
        assert_eq!(c.name, "c");
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_eq!(tree.enumerate_paths(), vec!["a/", "a/b/", "a/b/c/"]);
    }

    #[test]
    fn test_create_duplicate_leaves_tree_unchanged() {
        let mut tree = sample_tree();
        let before = tree.clone();
        let result = tree.create("/work/tyme", false);
        assert!(matches!(result, Err(TimelineError::DuplicateActivity(_))));
        let result = tree.create("/work/tyme", true);
        assert!(matches!(result, Err(TimelineError::DuplicateActivity(_))));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_create_malformed_paths() {
        let mut tree = sample_tree();
        let before = tree.clone();
        for path in ["", "/", "//work", "/work//x", "/work/", "work/x", "cooking"] {
            assert!(
                matches!(tree.create(path, true), Err(TimelineError::MalformedPath { .. })),
                "{path} should be malformed"
            );
        }
        assert_eq!(tree, before);
        assert_eq!(
            tree.enumerate_paths(),
            vec!["leisure/", "work/", "leisure/reading/", "work/tyme/"]
        );
    }

    #[test]
    fn test_resolve_by_name_and_path() {
        let tree = sample_tree();
        let by_name = tree.resolve("tyme").unwrap();
        assert_eq!(by_name.path, "/work/tyme");
        assert_eq!(tree.resolve("/work/tyme"), Some(by_name.clone()));
        assert_eq!(tree.resolve_id("tyme"), Some(by_name.id));
        assert_eq!(tree.path_of_id(by_name.id).as_deref(), Some("/work/tyme"));
        assert!(tree.resolve("/tyme").is_none());
        assert!(tree.resolve("cooking").is_none());
    }

    #[test]
    fn test_resolve_ambiguous_name_is_preorder() {
        let mut tree = sample_tree();
        tree.create("/leisure/reading/notes", false).unwrap();
        tree.create("/work/notes", false).unwrap();
        tree.create("/archive/old/notes", true).unwrap();

        // Sorted pre-order: archive < leisure < work.
        assert_eq!(tree.resolve("notes").unwrap().path, "/archive/old/notes");
    }

    #[test]
    fn test_validate() {
        let tree = sample_tree();
        assert!(tree.validate().is_ok());

        let id = tree.resolve_id("tyme").unwrap();
        let reused: ActivityTree =
            serde_json::from_value(serde_json::json!({ "a": [id, {}], "b": [id, {}] })).unwrap();
        assert!(matches!(reused.validate(), Err(TimelineError::CorruptTimeline(_))));

        let nested: ActivityTree = serde_json::from_value(
            serde_json::json!({ "c": [uuid::Uuid::new_v4(), { "a/b": [uuid::Uuid::new_v4(), {}] }] }),
        )
        .unwrap();
        assert!(matches!(nested.validate(), Err(TimelineError::CorruptTimeline(_))));
    }

    #[test]
    fn test_serialized_as_id_children_pairs() {
        let mut tree = ActivityTree::new();
        let id = tree.create("/work", false).unwrap();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json, serde_json::json!({ "work": [id.to_string(), {}] }));

        let parsed: ActivityTree = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, tree);
    }
}
