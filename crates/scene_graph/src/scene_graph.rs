//! # Scene Graph
//!
//! The scene graph is the retained element tree the block editor renders
//! from. It plays the role a DOM plays for a browser-hosted editor: the host
//! page, the container the editor is injected into, the main canvas, the drag
//! surface and every rendered block are nodes in one tree.
//!
//! ## Key Concepts
//!
//! - **Elements**: each node carries a kind, an optional class, attributes
//!   (notably an SVG `transform`) and an inline [`Style`]
//! - **Reparenting**: [`SceneGraph::append_child`] moves a node and its whole
//!   subtree; the previous parent loses the child in the same call
//! - **Applied transforms**: translations are stored only as the transform
//!   strings that get rendered, and read back with [`SceneGraph::relative_xy`]

pub mod element;

pub use element::{DisplayMode, ElementKind, Overflow, Style};

use blocks_core::transform::{parse_translate_attribute, parse_translate_style};
use glam::Vec2;
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Write};
use thiserror::Error;

slotmap::new_key_type! {
/// Defines a unique identifier for nodes within the scene graph.
    pub struct SceneNodeId;
}

impl SceneNodeId {
    /// Converts this scene node id to a [u64]
    pub fn as_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

impl Display for SceneNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("scene node {0} does not exist")]
    NodeNotFound(SceneNodeId),

    #[error("the root node cannot be moved or removed")]
    RootIsFixed,

    #[error("cannot append node {child} under {parent}: it is an ancestor of {parent}")]
    CycleDetected {
        parent: SceneNodeId,
        child: SceneNodeId,
    },
}

/// Ordered child list; most elements hold only a handful of children.
pub type Children = SmallVec<[SceneNodeId; 4]>;

/// SceneGraph owns every element of an editor view.
///
/// The graph always has a root node standing in for the host page. All
/// other nodes hang below it; a node never has more than one parent.
pub struct SceneGraph {
    /// The root node of the scene graph
    root: SceneNodeId,

    /// Storage for all scene nodes, indexed by their IDs
    nodes: SlotMap<SceneNodeId, SceneNode>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a new, empty scene graph with a root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new(ElementKind::Root, None));
        Self { root, nodes }
    }

    /// Returns the ID of the root node
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Number of nodes in the graph, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, node_id: SceneNodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Creates a new element as the last child of `parent` (the root when
    /// `None`).
    pub fn create_element(
        &mut self,
        parent: Option<SceneNodeId>,
        kind: ElementKind,
    ) -> Result<SceneNodeId, SceneError> {
        let parent_id = parent.unwrap_or(self.root);
        if !self.nodes.contains_key(parent_id) {
            return Err(SceneError::NodeNotFound(parent_id));
        }

        let node_id = self.nodes.insert(SceneNode::new(kind, Some(parent_id)));
        self.nodes[parent_id].children.push(node_id);
        Ok(node_id)
    }

    /// Moves `child` (with its subtree) to the end of `parent`'s children.
    ///
    /// The previous parent loses the child as part of this call, so a node is
    /// never listed under two parents. Returns the previous parent, which is
    /// `Some(parent)` when the child only moved to the end of its siblings.
    pub fn append_child(
        &mut self,
        parent_id: SceneNodeId,
        child_id: SceneNodeId,
    ) -> Result<Option<SceneNodeId>, SceneError> {
        self.insert_child(parent_id, usize::MAX, child_id)
    }

    /// Moves `child` (with its subtree) to position `index` among
    /// `parent`'s children, clamped to the end of the list.
    ///
    /// Same detach and validation rules as [`SceneGraph::append_child`]; a
    /// failed call changes nothing.
    pub fn insert_child(
        &mut self,
        parent_id: SceneNodeId,
        index: usize,
        child_id: SceneNodeId,
    ) -> Result<Option<SceneNodeId>, SceneError> {
        if !self.nodes.contains_key(parent_id) {
            return Err(SceneError::NodeNotFound(parent_id));
        }
        if !self.nodes.contains_key(child_id) {
            return Err(SceneError::NodeNotFound(child_id));
        }
        if child_id == self.root {
            return Err(SceneError::RootIsFixed);
        }
        if self.is_ancestor(child_id, parent_id) {
            return Err(SceneError::CycleDetected {
                parent: parent_id,
                child: child_id,
            });
        }

        let previous = self.detach(child_id);
        self.nodes[child_id].parent = Some(parent_id);
        let children = &mut self.nodes[parent_id].children;
        children.insert(index.min(children.len()), child_id);
        Ok(previous)
    }

    /// Removes a node and all its children from the scene graph
    pub fn remove_node(&mut self, node_id: SceneNodeId) -> Result<(), SceneError> {
        if node_id == self.root {
            return Err(SceneError::RootIsFixed);
        }
        if !self.nodes.contains_key(node_id) {
            return Err(SceneError::NodeNotFound(node_id));
        }

        self.detach(node_id);
        let mut pending = vec![node_id];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes.remove(id) {
                pending.extend(node.children);
            }
        }
        Ok(())
    }

    /// Unlinks a node from its parent's child list, returning the parent.
    fn detach(&mut self, node_id: SceneNodeId) -> Option<SceneNodeId> {
        let old_parent_id = self.nodes.get(node_id).and_then(|node| node.parent)?;
        if let Some(old_parent) = self.nodes.get_mut(old_parent_id) {
            old_parent.children.retain(|id| *id != node_id);
        }
        self.nodes[node_id].parent = None;
        Some(old_parent_id)
    }

    /// Get a reference to a node by its ID
    pub fn get_node(&self, node_id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(node_id)
    }

    pub fn parent(&self, node_id: SceneNodeId) -> Option<SceneNodeId> {
        self.nodes.get(node_id).and_then(|node| node.parent)
    }

    /// Gets the children of a scene node; empty for unknown nodes
    pub fn children(&self, node_id: SceneNodeId) -> &[SceneNodeId] {
        self.nodes
            .get(node_id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, node_id: SceneNodeId) -> Option<SceneNodeId> {
        self.children(node_id).first().copied()
    }

    /// Position of `node_id` among its parent's children
    pub fn index_in_parent(&self, node_id: SceneNodeId) -> Option<usize> {
        let parent = self.parent(node_id)?;
        self.children(parent).iter().position(|id| *id == node_id)
    }

    pub fn set_attribute(
        &mut self,
        node_id: SceneNodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), SceneError> {
        let node = self.node_mut(node_id)?;
        node.attributes.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn attribute(&self, node_id: SceneNodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node_id)
            .and_then(|node| node.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_class(
        &mut self,
        node_id: SceneNodeId,
        class: impl Into<String>,
    ) -> Result<(), SceneError> {
        self.node_mut(node_id)?.class = Some(class.into());
        Ok(())
    }

    pub fn style(&self, node_id: SceneNodeId) -> Option<&Style> {
        self.nodes.get(node_id).map(|node| &node.style)
    }

    pub fn style_mut(&mut self, node_id: SceneNodeId) -> Result<&mut Style, SceneError> {
        Ok(&mut self.node_mut(node_id)?.style)
    }

    fn node_mut(&mut self, node_id: SceneNodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes
            .get_mut(node_id)
            .ok_or(SceneError::NodeNotFound(node_id))
    }

    /// Finds the first element carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Option<SceneNodeId> {
        let mut pending = vec![self.root];
        while let Some(id) = pending.pop() {
            let node = &self.nodes[id];
            if node.class.as_deref() == Some(class) {
                return Some(id);
            }
            pending.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Determines if a node is an ancestor of (or the same as) another node
    ///
    /// Walks the parent chain of `descendant_id` upward. Used to reject
    /// reparenting that would create a cycle.
    pub fn is_ancestor(&self, node_id: SceneNodeId, descendant_id: SceneNodeId) -> bool {
        let mut current = Some(descendant_id);
        while let Some(id) = current {
            if id == node_id {
                return true;
            }
            current = self.nodes.get(id).and_then(|node| node.parent);
        }
        false
    }

    /// Reads the translation currently applied to a node, relative to its
    /// parent.
    ///
    /// Sums the `translate(..)` of the SVG `transform` attribute and the
    /// `translate(..)`/`translate3d(..)` of the inline style transform.
    /// Anything missing or unparseable contributes zero.
    pub fn relative_xy(&self, node_id: SceneNodeId) -> Vec2 {
        let Some(node) = self.nodes.get(node_id) else {
            return Vec2::ZERO;
        };

        let from_attribute = node
            .attributes
            .get("transform")
            .and_then(|value| parse_translate_attribute(value))
            .unwrap_or(Vec2::ZERO);
        let from_style = node
            .style
            .transform
            .as_deref()
            .and_then(parse_translate_style)
            .unwrap_or(Vec2::ZERO);

        from_attribute + from_style
    }

    /// Renders a node and its subtree as indented markup, for logs and
    /// debugging output.
    pub fn to_markup(&self, node_id: SceneNodeId) -> String {
        let mut out = String::new();
        self.write_markup(node_id, 0, &mut out);
        out
    }

    fn write_markup(&self, node_id: SceneNodeId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(node_id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let tag = node.kind.tag();

        let _ = write!(out, "{indent}<{tag}");
        if let Some(class) = &node.class {
            let _ = write!(out, " class=\"{class}\"");
        }
        for (name, value) in &node.attributes {
            let _ = write!(out, " {name}=\"{value}\"");
        }
        if !node.style.is_empty() {
            let _ = write!(out, " style=\"{}\"", node.style.to_css());
        }

        if node.children.is_empty() {
            out.push_str(" />\n");
            return;
        }
        out.push_str(">\n");
        for child in &node.children {
            self.write_markup(*child, depth + 1, out);
        }
        let _ = writeln!(out, "{indent}</{tag}>");
    }
}

/// SceneNode represents a single element in the scene graph hierarchy.
#[derive(Debug)]
pub struct SceneNode {
    /// Reference to the parent node; only the root and detached nodes have
    /// none
    parent: Option<SceneNodeId>,

    /// References to all child nodes of this node, in paint order
    children: Children,

    kind: ElementKind,

    class: Option<String>,

    /// Element attributes, kept sorted so markup output is stable
    attributes: BTreeMap<String, String>,

    style: Style,
}

impl SceneNode {
    fn new(kind: ElementKind, parent: Option<SceneNodeId>) -> Self {
        Self {
            parent,
            children: Children::new(),
            kind,
            class: None,
            attributes: BTreeMap::new(),
            style: Style::default(),
        }
    }

    /// Returns a reference to the node's children
    pub fn children(&self) -> &[SceneNodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<SceneNodeId> {
        self.parent
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Returns whether the node is hidden by its own style
    pub fn is_hidden(&self) -> bool {
        self.style.is_hidden()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_tree(graph: &mut SceneGraph) -> (SceneNodeId, SceneNodeId, SceneNodeId) {
        let canvas = graph.create_element(None, ElementKind::Canvas).unwrap();
        let block = graph
            .create_element(Some(canvas), ElementKind::Block)
            .unwrap();
        let nested = graph
            .create_element(Some(block), ElementKind::Block)
            .unwrap();
        (canvas, block, nested)
    }

    #[test]
    fn test_scene_graph_creation() {
        let graph = SceneGraph::new();

        assert!(graph.get_node(graph.root()).is_some());
        assert!(graph.parent(graph.root()).is_none());
        assert!(graph.children(graph.root()).is_empty());
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_create_element() {
        let mut graph = SceneGraph::new();
        let (canvas, block, nested) = block_tree(&mut graph);

        assert_eq!(graph.parent(canvas), Some(graph.root()));
        assert_eq!(graph.children(canvas), &[block]);
        assert_eq!(graph.first_child(block), Some(nested));
        assert_eq!(graph.get_node(nested).unwrap().kind(), ElementKind::Block);
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_create_element_stale_parent() {
        let mut graph = SceneGraph::new();
        let (canvas, _, _) = block_tree(&mut graph);
        graph.remove_node(canvas).unwrap();

        assert_eq!(
            graph.create_element(Some(canvas), ElementKind::Block),
            Err(SceneError::NodeNotFound(canvas))
        );
    }

    #[test]
    fn test_append_child_detaches_from_previous_parent() {
        let mut graph = SceneGraph::new();
        let (canvas, block, nested) = block_tree(&mut graph);
        let group = graph.create_element(None, ElementKind::Group).unwrap();

        let previous = graph.append_child(group, block).unwrap();

        assert_eq!(previous, Some(canvas));
        assert!(graph.children(canvas).is_empty());
        assert_eq!(graph.children(group), &[block]);
        assert_eq!(graph.parent(block), Some(group));
        // The subtree travels with its root
        assert_eq!(graph.parent(nested), Some(block));
    }

    #[test]
    fn test_append_child_to_same_parent_moves_to_end() {
        let mut graph = SceneGraph::new();
        let canvas = graph.create_element(None, ElementKind::Canvas).unwrap();
        let a = graph.create_element(Some(canvas), ElementKind::Block).unwrap();
        let b = graph.create_element(Some(canvas), ElementKind::Block).unwrap();

        assert_eq!(graph.append_child(canvas, a).unwrap(), Some(canvas));
        assert_eq!(graph.children(canvas), &[b, a]);
    }

    #[test]
    fn test_insert_child_restores_position() {
        let mut graph = SceneGraph::new();
        let canvas = graph.create_element(None, ElementKind::Canvas).unwrap();
        let a = graph.create_element(Some(canvas), ElementKind::Block).unwrap();
        let b = graph.create_element(Some(canvas), ElementKind::Block).unwrap();
        let c = graph.create_element(Some(canvas), ElementKind::Block).unwrap();
        let elsewhere = graph.create_element(None, ElementKind::Group).unwrap();

        let index = graph.index_in_parent(b).unwrap();
        graph.append_child(elsewhere, b).unwrap();
        assert_eq!(graph.index_in_parent(b), Some(0));

        assert_eq!(graph.insert_child(canvas, index, b).unwrap(), Some(elsewhere));
        assert_eq!(graph.children(canvas), &[a, b, c]);
        assert!(graph.children(elsewhere).is_empty());

        graph.insert_child(canvas, 99, a).unwrap();
        assert_eq!(graph.children(canvas), &[b, c, a]);
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let (_, block, nested) = block_tree(&mut graph);

        assert_eq!(
            graph.append_child(nested, block),
            Err(SceneError::CycleDetected {
                parent: nested,
                child: block
            })
        );
        assert_eq!(
            graph.append_child(block, block),
            Err(SceneError::CycleDetected {
                parent: block,
                child: block
            })
        );
        assert_eq!(
            graph.append_child(block, graph.root()),
            Err(SceneError::RootIsFixed)
        );
        assert_eq!(graph.parent(nested), Some(block));
    }

    #[test]
    fn test_remove_node_removes_subtree() {
        let mut graph = SceneGraph::new();
        let (canvas, block, nested) = block_tree(&mut graph);

        graph.remove_node(block).unwrap();

        assert!(graph.children(canvas).is_empty());
        assert!(!graph.contains(block));
        assert!(!graph.contains(nested));
        assert_eq!(graph.remove_node(graph.root()), Err(SceneError::RootIsFixed));
        assert_eq!(
            graph.remove_node(block),
            Err(SceneError::NodeNotFound(block))
        );
    }

    #[test]
    fn test_find_by_class_in_document_order() {
        let mut graph = SceneGraph::new();
        let first = graph.create_element(None, ElementKind::Container).unwrap();
        let inner = graph
            .create_element(Some(first), ElementKind::Group)
            .unwrap();
        let second = graph.create_element(None, ElementKind::Container).unwrap();
        graph.set_class(inner, "target").unwrap();
        graph.set_class(second, "target").unwrap();

        assert_eq!(graph.find_by_class("target"), Some(inner));
        assert_eq!(graph.find_by_class("missing"), None);
    }

    #[test]
    fn test_relative_xy_sums_attribute_and_style() {
        let mut graph = SceneGraph::new();
        let node = graph.create_element(None, ElementKind::Surface).unwrap();
        assert_eq!(graph.relative_xy(node), Vec2::ZERO);

        graph
            .set_attribute(node, "transform", "translate(5,7) scale(2)")
            .unwrap();
        graph.style_mut(node).unwrap().transform =
            Some("translate3d(20px, 40px, 0px)".to_string());

        assert_eq!(graph.relative_xy(node), Vec2::new(25.0, 47.0));
    }

    #[test]
    fn test_markup() {
        let mut graph = SceneGraph::new();
        let container = graph.create_element(None, ElementKind::Container).unwrap();
        graph.set_class(container, "injectionDiv").unwrap();
        graph.style_mut(container).unwrap().overflow = Some(Overflow::Hidden);
        let block = graph
            .create_element(Some(container), ElementKind::Block)
            .unwrap();
        graph.set_attribute(block, "transform", "translate(1,2)").unwrap();

        assert_eq!(
            graph.to_markup(container),
            "<div class=\"injectionDiv\" style=\"overflow: hidden;\">\n  <g transform=\"translate(1,2)\" />\n</div>\n"
        );
    }
}
