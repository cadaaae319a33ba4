//! Node model for decoded configurations.
//!
//! All nodes of a [`Config`] live in one arena. Children are stored as
//! indices in insertion order and every node keeps the index of its parent,
//! so navigation works in both directions without shared ownership.
//!
//! A decoded `Config` is read-only: nodes are reached through [`Node`]
//! handles that borrow the config.

use std::collections::BTreeMap;
use std::fmt;

use stash_parse::{BranchKind, SectionName, Span};

/// Index of a node inside its [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Discriminator of an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// A top-level section.
    Section,
    /// A plugin block.
    Plugin,
    /// An `if`/`else` block.
    Branch,
}

impl OperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::Section => "section",
            OperationType::Plugin => "plugin",
            OperationType::Branch => "branch",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Section(Section),
    Plugin(Plugin),
    Branch(Branch),
}

impl Operation {
    /// The discriminator for this operation.
    pub fn op_type(&self) -> OperationType {
        match self {
            Operation::Section(_) => OperationType::Section,
            Operation::Plugin(_) => OperationType::Plugin,
            Operation::Branch(_) => OperationType::Branch,
        }
    }
}

/// A top-level pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: SectionName,
}

/// A named plugin and its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    /// Plugin identifier, e.g. `tcp`.
    pub name: String,
    /// Setting values by key. A repeated key keeps its last value.
    pub settings: BTreeMap<String, String>,
}

impl Plugin {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: BTreeMap::new(),
        }
    }

    pub(crate) fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.insert(key.into(), value.into());
    }

    /// Get a setting value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }
}

/// A conditional block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub kind: BranchKind,
    /// The condition as written, with the separators between its tokens
    /// removed. Never evaluated.
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeData {
    operation: Operation,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Span of the token that opened this node.
    span: Span,
}

/// A decoded configuration: up to three sections and everything below them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    nodes: Vec<NodeData>,
    input: Option<NodeId>,
    filter: Option<NodeId>,
    output: Option<NodeId>,
}

impl Config {
    /// The `input` section, if declared.
    pub fn input(&self) -> Option<Node<'_>> {
        self.section(SectionName::Input)
    }

    /// The `filter` section, if declared.
    pub fn filter(&self) -> Option<Node<'_>> {
        self.section(SectionName::Filter)
    }

    /// The `output` section, if declared.
    pub fn output(&self) -> Option<Node<'_>> {
        self.section(SectionName::Output)
    }

    /// A section by name, if declared.
    pub fn section(&self, name: SectionName) -> Option<Node<'_>> {
        self.slot(name).map(|id| Node { config: self, id })
    }

    /// Declared sections in pipeline order (input, filter, output).
    pub fn sections(&self) -> impl Iterator<Item = Node<'_>> {
        SectionName::ALL
            .into_iter()
            .filter_map(|name| self.section(name))
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.index() < self.nodes.len()).then_some(Node { config: self, id })
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no section was declared.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render an indented outline of the tree.
    ///
    /// Sections come in pipeline order and settings in key order, so the
    /// output is stable for a given configuration.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for section in self.sections() {
            // Writing into a String cannot fail.
            let _ = write_outline(&mut out, section, 0);
        }
        out
    }

    fn slot(&self, name: SectionName) -> Option<NodeId> {
        match name {
            SectionName::Input => self.input,
            SectionName::Filter => self.filter,
            SectionName::Output => self.output,
        }
    }

    fn slot_mut(&mut self, name: SectionName) -> &mut Option<NodeId> {
        match name {
            SectionName::Input => &mut self.input,
            SectionName::Filter => &mut self.filter,
            SectionName::Output => &mut self.output,
        }
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn push(&mut self, operation: Operation, parent: Option<NodeId>, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            operation,
            parent,
            children: Vec::new(),
            span,
        });
        id
    }

    /// Whether a section has already been declared.
    pub(crate) fn has_section(&self, name: SectionName) -> bool {
        self.slot(name).is_some()
    }

    /// Create a root section and store it in its slot.
    pub(crate) fn insert_section(&mut self, name: SectionName, span: Span) -> NodeId {
        let id = self.push(Operation::Section(Section { name }), None, span);
        *self.slot_mut(name) = Some(id);
        id
    }

    /// Create a node as the last child of `parent`.
    pub(crate) fn append(&mut self, parent: NodeId, operation: Operation, span: Span) -> NodeId {
        let id = self.push(operation, Some(parent), span);
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub(crate) fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub(crate) fn span_of(&self, id: NodeId) -> Span {
        self.data(id).span
    }

    pub(crate) fn plugin_mut(&mut self, id: NodeId) -> Option<&mut Plugin> {
        match &mut self.nodes[id.index()].operation {
            Operation::Plugin(plugin) => Some(plugin),
            _ => None,
        }
    }
}

/// A borrowed handle to one node of a [`Config`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    config: &'a Config,
    id: NodeId,
}

impl<'a> Node<'a> {
    /// The id of this node.
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The node payload.
    pub fn operation(self) -> &'a Operation {
        &self.config.data(self.id).operation
    }

    /// The discriminator of the payload.
    pub fn op_type(self) -> OperationType {
        self.operation().op_type()
    }

    /// The parent node. Sections have none.
    pub fn parent(self) -> Option<Node<'a>> {
        let config = self.config;
        config.data(self.id).parent.map(|id| Node { config, id })
    }

    /// Children in source order.
    pub fn children(self) -> impl ExactSizeIterator<Item = Node<'a>> + 'a {
        let config = self.config;
        config
            .data(self.id)
            .children
            .iter()
            .map(move |&id| Node { config, id })
    }

    /// The child at `index`.
    pub fn child(self, index: usize) -> Option<Node<'a>> {
        let config = self.config;
        config
            .data(self.id)
            .children
            .get(index)
            .map(|&id| Node { config, id })
    }

    /// Number of children.
    pub fn child_count(self) -> usize {
        self.config.data(self.id).children.len()
    }

    /// Span of the token that opened this node.
    pub fn span(self) -> Span {
        self.config.data(self.id).span
    }

    pub fn as_section(self) -> Option<&'a Section> {
        match self.operation() {
            Operation::Section(section) => Some(section),
            _ => None,
        }
    }

    pub fn as_plugin(self) -> Option<&'a Plugin> {
        match self.operation() {
            Operation::Plugin(plugin) => Some(plugin),
            _ => None,
        }
    }

    pub fn as_branch(self) -> Option<&'a Branch> {
        match self.operation() {
            Operation::Branch(branch) => Some(branch),
            _ => None,
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("operation", self.operation())
            .field("children", &self.child_count())
            .finish()
    }
}

fn write_outline(out: &mut impl fmt::Write, node: Node<'_>, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match node.operation() {
        Operation::Section(section) => writeln!(out, "{pad}section {}", section.name)?,
        Operation::Plugin(plugin) => {
            writeln!(out, "{pad}plugin {}", plugin.name)?;
            for (key, value) in &plugin.settings {
                writeln!(out, "{pad}  {key} = {value:?}")?;
            }
        }
        Operation::Branch(branch) => {
            writeln!(out, "{pad}branch {} {:?}", branch.kind, branch.expression)?
        }
    }
    for child in node.children() {
        write_outline(out, child, depth + 1)?;
    }
    Ok(())
}
