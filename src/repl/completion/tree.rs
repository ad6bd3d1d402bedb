//! Completion tree definitions
//!
//! The tree describes the vocabulary the shell can complete. Every node is
//! either a literal (a fixed word such as `cd` or `racks`) or a dynamic node
//! whose names are produced by a [`Resolver`] each time completion runs.
//!
//! The tree is built once when the shell starts and its shape never changes
//! afterwards; dynamic nodes only re-evaluate their content.

use std::fmt;

use tracing::debug;

/// Produces the names of a dynamic node.
///
/// The resolver receives the full input line so that earlier path segments can
/// be used as filter context. It returns the names in presentation order; an
/// empty list means "no children". Resolvers own their failures: nothing they
/// do may propagate into the completion engine.
pub trait Resolver {
    /// Resolve candidate names for the given line
    ///
    /// # Arguments
    /// * `line` - The full input line
    ///
    /// # Returns
    /// * `Vec<String>` - Names in presentation order
    fn resolve(&self, line: &str) -> Vec<String>;
}

impl<F> Resolver for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn resolve(&self, line: &str) -> Vec<String> {
        self(line)
    }
}

/// Adapter turning a fallible lookup into a [`Resolver`].
///
/// Failures are logged and reported as an empty name list.
pub struct Fallible<F> {
    /// Label used in log messages
    label: &'static str,
    /// Underlying lookup
    lookup: F,
}

impl<F, E> Resolver for Fallible<F>
where
    F: Fn(&str) -> Result<Vec<String>, E>,
    E: fmt::Display,
{
    fn resolve(&self, line: &str) -> Vec<String> {
        match (self.lookup)(line) {
            Ok(names) => names,
            Err(e) => {
                debug!("{} resolver failed: {}", self.label, e);
                Vec::new()
            }
        }
    }
}

/// Wrap a fallible lookup so that errors degrade to "no children"
///
/// # Arguments
/// * `label` - Name used when logging failures
/// * `lookup` - Lookup returning names or an error
///
/// # Returns
/// * `Fallible<F>` - Resolver swallowing the lookup's errors
pub fn fallible<F, E>(label: &'static str, lookup: F) -> Fallible<F>
where
    F: Fn(&str) -> Result<Vec<String>, E>,
    E: fmt::Display,
{
    Fallible { label, lookup }
}

/// What a node matches against.
pub enum NodeKind {
    /// Fixed name
    Literal(String),
    /// Names computed at completion time
    Dynamic(Box<dyn Resolver>),
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Literal(name) => f.debug_tuple("Literal").field(name).finish(),
            NodeKind::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A node of the completion tree.
#[derive(Debug)]
pub struct CompletionNode {
    /// Literal name or resolver
    kind: NodeKind,
    /// Completing this node appends '/' instead of a space
    has_children: bool,
    /// Children in menu presentation order
    children: Vec<CompletionNode>,
}

impl CompletionNode {
    /// Create a literal node
    ///
    /// # Arguments
    /// * `name` - Fixed name, must not be empty
    ///
    /// # Returns
    /// * `Self` - New literal node without children
    ///
    /// # Panics
    /// Panics when `name` is empty. Trees are assembled at startup, so this
    /// fires before the shell ever reads a key.
    pub fn literal(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "literal completion node needs a name");
        Self {
            kind: NodeKind::Literal(name),
            has_children: false,
            children: Vec::new(),
        }
    }

    /// Create a dynamic node
    ///
    /// # Arguments
    /// * `resolver` - Produces this node's names from the current line
    ///
    /// # Returns
    /// * `Self` - New dynamic node without children
    pub fn dynamic(resolver: impl Resolver + 'static) -> Self {
        Self {
            kind: NodeKind::Dynamic(Box::new(resolver)),
            has_children: false,
            children: Vec::new(),
        }
    }

    /// Mark the node as a path container: inserting it appends '/'
    pub fn hierarchical(mut self) -> Self {
        self.has_children = true;
        self
    }

    /// Append a child node
    pub fn child(mut self, node: CompletionNode) -> Self {
        self.children.push(node);
        self
    }

    /// Append several child nodes, keeping their order
    pub fn children(mut self, nodes: impl IntoIterator<Item = CompletionNode>) -> Self {
        self.children.extend(nodes);
        self
    }

    /// Node kind
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether inserting this node appends a path delimiter
    pub fn has_children(&self) -> bool {
        self.has_children
    }

    /// Child nodes in presentation order
    pub fn child_nodes(&self) -> &[CompletionNode] {
        &self.children
    }

    /// Character appended after this node's name on insertion
    pub fn boundary(&self) -> char {
        if self.has_children { '/' } else { ' ' }
    }

    /// Names this node currently stands for
    ///
    /// # Arguments
    /// * `line` - Full input line handed to dynamic resolvers
    ///
    /// # Returns
    /// * `Vec<String>` - One name for literals, the resolver output otherwise
    pub fn names(&self, line: &str) -> Vec<String> {
        match &self.kind {
            NodeKind::Literal(name) => vec![name.clone()],
            NodeKind::Dynamic(resolver) => resolver.resolve(line),
        }
    }

    fn print(&self, prefix: &str, level: usize, out: &mut String) {
        out.push_str(prefix);
        if level > 0 {
            out.push('├');
            out.push_str(&"─".repeat(level * 4 - 2));
            out.push(' ');
        }
        match &self.kind {
            NodeKind::Literal(name) => out.push_str(name),
            NodeKind::Dynamic(_) => out.push_str("<dynamic>"),
        }
        if self.has_children {
            out.push('/');
        }
        out.push('\n');

        for child in &self.children {
            child.print(prefix, level + 1, out);
        }
    }
}

/// The completion vocabulary of a shell.
///
/// The root is unnamed; its children are the first words a user can type.
#[derive(Debug, Default)]
pub struct CompletionTree {
    /// Top-level nodes in presentation order
    roots: Vec<CompletionNode>,
}

impl CompletionTree {
    /// Create a tree from its top-level nodes
    ///
    /// # Arguments
    /// * `roots` - Top-level nodes in presentation order
    ///
    /// # Returns
    /// * `Self` - Immutable-shape completion tree
    pub fn new(roots: impl IntoIterator<Item = CompletionNode>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    /// Top-level nodes
    pub fn roots(&self) -> &[CompletionNode] {
        &self.roots
    }

    /// Whether the tree has no nodes at all
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Render the tree as an indented listing
    ///
    /// # Arguments
    /// * `prefix` - Text written at the start of every line
    ///
    /// # Returns
    /// * `String` - One line per node
    pub fn render(&self, prefix: &str) -> String {
        let mut out = String::new();
        for node in &self.roots {
            node.print(prefix, 0, &mut out);
        }
        out
    }
}

impl fmt::Display for CompletionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}

/// Count the nodes of a tree, used in startup logging
pub fn node_count(tree: &CompletionTree) -> usize {
    fn count(node: &CompletionNode) -> usize {
        1 + node.child_nodes().iter().map(count).sum::<usize>()
    }
    tree.roots().iter().map(count).sum()
}

/// Short description of a node for trace output
pub(crate) fn describe(node: &CompletionNode) -> String {
    match node.kind() {
        NodeKind::Literal(name) => format!("literal '{}'", name),
        NodeKind::Dynamic(_) => "dynamic".to_string(),
    }
}
