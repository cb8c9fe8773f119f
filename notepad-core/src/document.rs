//! Document tree behind the editor view.
//!
//! A small retained tree of layout boxes standing in for the page the note
//! is displayed on. The capture pipeline clones a region of it, attaches the
//! clone off-screen and detaches it again once rasterized.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{NoteError, NoteResult, StyleAttributes};

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new unique node ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a node displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum NodeKind {
    /// Styled container of the note.
    Region,
    /// The note text.
    Text {
        /// Text content.
        content: String,
    },
    /// Hint shown while the note is empty.
    Placeholder {
        /// Hint text.
        text: String,
    },
    /// Editor status line (character count, alignment).
    Footer {
        /// Status text.
        text: String,
    },
}

impl NodeKind {
    /// Editor hints that never belong in an exported image.
    #[must_use]
    pub fn is_hint(&self) -> bool {
        matches!(self, Self::Placeholder { .. } | Self::Footer { .. })
    }
}

/// Height of a layout box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Extent {
    /// Grow to fit content.
    Auto,
    /// Fixed height in pixels.
    Fixed(f32),
}

/// What happens to content that does not fit a fixed height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Content spills out and stays visible.
    Visible,
    /// Content is clipped.
    Hidden,
    /// Content is clipped and scrollable in the live view.
    Scroll,
}

/// Position and size of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// X position (pixels from the left of the page).
    pub x: f32,
    /// Y position (pixels from the top of the page).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height.
    pub height: Extent,
    /// Overflow behaviour.
    pub overflow: Overflow,
    /// Inner padding on every side, in pixels.
    pub padding: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 600.0,
            height: Extent::Auto,
            overflow: Overflow::Visible,
            padding: 0.0,
        }
    }
}

impl Layout {
    /// True when any part of the box lies inside a viewport anchored at the origin.
    #[must_use]
    pub fn intersects_viewport(&self, width: f32, height: f32) -> bool {
        let bottom = match self.height {
            Extent::Fixed(h) => self.y + h,
            Extent::Auto => self.y,
        };
        self.x + self.width > 0.0 && self.x < width && bottom >= 0.0 && self.y < height
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Node content.
    pub kind: NodeKind,
    /// Position and size.
    pub layout: Layout,
    /// Inline style, if any.
    pub style: Option<StyleAttributes>,
    /// Whether the node is rendered.
    pub visible: bool,
    /// Parent node, `None` for roots.
    pub parent: Option<NodeId>,
    /// Ordered children.
    pub children: Vec<NodeId>,
}

impl Node {
    /// Create a new node with the given kind.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            layout: Layout::default(),
            style: None,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the inline style.
    #[must_use]
    pub fn with_style(mut self, style: StyleAttributes) -> Self {
        self.style = Some(style);
        self
    }
}

/// A detached, self-contained piece of a document.
///
/// `nodes[0]` is the root; parent links inside the subtree are consistent and
/// the root has no parent.
#[derive(Debug, Clone)]
pub struct Subtree {
    /// The root node ID.
    pub root: NodeId,
    /// All nodes, root first, in pre-order.
    pub nodes: Vec<Node>,
}

impl Subtree {
    /// Iterate mutably over every node of the subtree.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// The root node.
    #[must_use]
    pub fn root_node(&self) -> Option<&Node> {
        self.nodes.first()
    }
}

/// A page of nodes.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// All nodes, indexed by ID.
    nodes: HashMap<NodeId, Node>,
    /// Top-level nodes in attach order.
    roots: Vec<NodeId>,
    /// Viewport width in pixels.
    pub viewport_width: f32,
    /// Viewport height in pixels.
    pub viewport_height: f32,
}

impl Document {
    /// Create an empty document with the given viewport size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Attach a node at the top level.
    pub fn attach(&mut self, mut node: Node) -> NodeId {
        let id = node.id;
        node.parent = None;
        self.roots.push(id);
        self.nodes.insert(id, node);
        id
    }

    /// Append `node` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent is not found.
    pub fn append_child(&mut self, parent: NodeId, mut node: Node) -> NoteResult<NodeId> {
        let id = node.id;
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or_else(|| NoteError::NodeNotFound(parent.to_string()))?;
        parent_node.children.push(id);
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Attach a detached subtree at the top level and return its root.
    pub fn attach_subtree(&mut self, subtree: Subtree) -> NodeId {
        let root = subtree.root;
        for mut node in subtree.nodes {
            if node.id == root {
                node.parent = None;
            }
            self.nodes.insert(node.id, node);
        }
        self.roots.push(root);
        root
    }

    /// Remove a node and all its descendants.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not found.
    pub fn detach(&mut self, id: NodeId) -> NoteResult<Subtree> {
        let order = self.descendants(id)?;

        if let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|&c| c != id);
            }
        }
        self.roots.retain(|&r| r != id);

        let mut nodes = Vec::with_capacity(order.len());
        for nid in order {
            if let Some(mut node) = self.nodes.remove(&nid) {
                if nid == id {
                    node.parent = None;
                }
                nodes.push(node);
            }
        }

        tracing::trace!("Detached subtree {id} ({} nodes)", nodes.len());
        Ok(Subtree { root: id, nodes })
    }

    /// Deep-copy a node and its descendants with fresh IDs.
    ///
    /// Inline styles are not carried over: the copy starts unstyled.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not found.
    pub fn clone_subtree(&self, id: NodeId) -> NoteResult<Subtree> {
        let order = self.descendants(id)?;
        let remap: HashMap<NodeId, NodeId> = order.iter().map(|&old| (old, NodeId::new())).collect();

        let nodes = order
            .iter()
            .filter_map(|old| self.nodes.get(old))
            .map(|node| Node {
                id: remap[&node.id],
                kind: node.kind.clone(),
                layout: node.layout,
                style: None,
                visible: node.visible,
                parent: node.parent.and_then(|p| remap.get(&p).copied()),
                children: node.children.iter().filter_map(|c| remap.get(c).copied()).collect(),
            })
            .collect();

        Ok(Subtree {
            root: remap[&id],
            nodes,
        })
    }

    /// Pre-order list of `id` and every node below it.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not found.
    pub fn descendants(&self, id: NodeId) -> NoteResult<Vec<NodeId>> {
        if !self.nodes.contains_key(&id) {
            return Err(NoteError::NodeNotFound(id.to_string()));
        }

        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.nodes.get(&next) {
                stack.extend(node.children.iter().rev());
            }
        }
        Ok(out)
    }

    /// Get a node by ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Children of a node, in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|c| self.nodes.get(c))
    }

    /// Top-level nodes in attach order.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.roots.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Whether the node's box is inside the viewport.
    #[must_use]
    pub fn is_on_screen(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|n| {
            n.layout
                .intersects_viewport(self.viewport_width, self.viewport_height)
        })
    }

    /// Number of attached nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the document is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
