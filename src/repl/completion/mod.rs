//! Tab completion for the interactive shell
//!
//! The completion system is built from small pieces, leaves first:
//!
//! - **tree**: the vocabulary, a tree of literal and dynamic nodes
//! - **matcher**: walks the tree against the typed input and returns candidates
//! - **session**: state machine deciding between inserting, listing and selecting
//! - **grid**: lays the candidate list out in columns and draws it
//! - **keys**: routes decoded keys to session transitions
//! - **driver**: what the session needs from the line editor
//! - **provider**: catalog and file resolvers plus the shell's own tree
//!
//! # Examples
//!
//! ```no_run
//! use treeline::repl::completion::{CompletionNode, CompletionTree, PathMatcher};
//!
//! let tree = CompletionTree::new([
//!     CompletionNode::literal("racks").hierarchical(),
//!     CompletionNode::literal("rooms").hierarchical(),
//! ]);
//!
//! let result = PathMatcher::new(&tree).complete("ra", 2);
//! assert_eq!(result.candidates[0].insertion(), "cks/");
//! ```

mod driver;
mod grid;
mod keys;
mod matcher;
mod provider;
mod session;
mod tree;

#[cfg(test)]
pub(crate) mod test_support;

pub use driver::TerminalDriver;
pub use grid::{Frame, GridLayout, GridRenderer, Navigation};
pub use keys::{Dispatch, Key, KeyDispatcher};
pub use matcher::{Candidate, MatchResult, PathMatcher, common_prefix};
pub use provider::{entity_names, entity_resolver, local_file_names, local_file_resolver, shell_tree};
pub use session::{CompletionSession, SessionState, Snapshot};
pub use tree::{CompletionNode, CompletionTree, Fallible, NodeKind, Resolver, fallible, node_count};
