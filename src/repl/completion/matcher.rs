//! Path matching over the completion tree
//!
//! Walks the tree level by level, consuming one completed word or path segment
//! per level, and collects the candidates available at the cursor.
//!
//! Matching works on Unicode code points, is case-sensitive and has no escape
//! syntax: '/' always ends a segment.

use tracing::{debug, trace};

use super::tree::{CompletionNode, CompletionTree, NodeKind, describe};

const DELIMITER: char = '/';

/// A suggested completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Text still to insert after what was typed
    pub suffix: String,
    /// Whether the matched entity has further children
    pub has_children: bool,
}

impl Candidate {
    /// Create a candidate
    ///
    /// # Arguments
    /// * `suffix` - Text still to insert
    /// * `has_children` - Whether insertion should append a path delimiter
    pub fn new(suffix: impl Into<String>, has_children: bool) -> Self {
        Self {
            suffix: suffix.into(),
            has_children,
        }
    }

    /// Text written into the buffer when this candidate is accepted
    ///
    /// # Returns
    /// * `String` - Suffix followed by '/' or a space
    pub fn insertion(&self) -> String {
        let mut text = self.suffix.clone();
        text.push(if self.has_children { DELIMITER } else { ' ' });
        text
    }
}

/// Candidates available at the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Candidates in presentation order
    pub candidates: Vec<Candidate>,
    /// Number of characters already typed that every candidate shares
    pub offset: usize,
}

impl MatchResult {
    /// Whether nothing can be completed
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Longest prefix shared by all candidate suffixes
    pub fn common_prefix(&self) -> String {
        common_prefix(self.candidates.iter().map(|c| c.suffix.as_str()))
    }
}

/// Longest string that is a prefix of every item
///
/// Compared code point by code point. Returns an empty string for an empty
/// input.
///
/// # Arguments
/// * `items` - Strings to compare
///
/// # Returns
/// * `String` - Shared prefix
pub fn common_prefix<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let mut items = items.into_iter();
    let Some(first) = items.next() else {
        return String::new();
    };

    let mut shared: Vec<char> = first.chars().collect();
    for item in items {
        let len = shared
            .iter()
            .zip(item.chars())
            .take_while(|(a, b)| **a == *b)
            .count();
        shared.truncate(len);
        if shared.is_empty() {
            break;
        }
    }
    shared.into_iter().collect()
}

/// Matches input lines against a completion tree.
pub struct PathMatcher<'a> {
    /// Tree being matched
    tree: &'a CompletionTree,
}

impl<'a> PathMatcher<'a> {
    /// Create a matcher for a tree
    pub fn new(tree: &'a CompletionTree) -> Self {
        Self { tree }
    }

    /// Find the candidates for the input left of the cursor
    ///
    /// # Arguments
    /// * `line` - Full input line (handed unchanged to dynamic resolvers)
    /// * `cursor` - Cursor position in code points
    ///
    /// # Returns
    /// * `MatchResult` - Candidates and shared offset; empty when nothing
    ///   completes
    pub fn complete(&self, line: &str, cursor: usize) -> MatchResult {
        let typed: Vec<char> = line.chars().take(cursor).collect();
        let result = walk(self.tree.roots(), &typed, line);
        debug!(
            "Matched {} candidate(s) at offset {} for {:?}",
            result.len(),
            result.offset,
            line
        );
        result
    }
}

/// Exact match found at one level
struct Descent<'n> {
    node: &'n CompletionNode,
    /// Characters of the trimmed input consumed by the match
    consumed: usize,
}

fn walk(children: &[CompletionNode], input: &[char], line: &str) -> MatchResult {
    let typed = trim_start(input);
    let segment_start = typed
        .iter()
        .rposition(|c| *c == DELIMITER)
        .map_or(0, |i| i + 1);

    let mut candidates = Vec::new();
    let mut offset: Option<usize> = None;
    let mut descent: Option<Descent<'_>> = None;

    for child in children {
        // Literals match the whole remaining input; dynamic names only match
        // the segment after the last delimiter.
        let start = match child.kind() {
            NodeKind::Literal(_) => 0,
            NodeKind::Dynamic(_) => segment_start,
        };
        let text = &typed[start..];

        for name in child.names(line) {
            let mut expected: Vec<char> = name.chars().collect();
            expected.push(child.boundary());

            if text.len() >= expected.len() {
                if text.starts_with(&expected) && descent.is_none() {
                    descent = Some(Descent {
                        node: child,
                        consumed: start + expected.len(),
                    });
                }
            } else if expected.starts_with(text) {
                let suffix: String = expected[text.len()..expected.len() - 1].iter().collect();
                candidates.push(Candidate::new(suffix, child.has_children()));
                offset = Some(offset.map_or(text.len(), |o| o.min(text.len())));
            }
        }
    }

    if let Some(Descent { node, consumed }) = descent {
        trace!("Descending into {} after {} char(s)", describe(node), consumed);
        return walk(node.child_nodes(), &typed[consumed..], line);
    }

    if candidates.is_empty() && typed.last() == Some(&DELIMITER) {
        for child in children {
            if let NodeKind::Dynamic(_) = child.kind() {
                candidates.extend(
                    child
                        .names(line)
                        .into_iter()
                        .map(|name| Candidate::new(name, child.has_children())),
                );
            }
        }
        trace!("Listed {} dynamic name(s) after delimiter", candidates.len());
        offset = Some(0);
    }

    MatchResult {
        candidates,
        offset: offset.unwrap_or(0),
    }
}

fn trim_start(input: &[char]) -> &[char] {
    let skip = input.iter().take_while(|c| c.is_whitespace()).count();
    &input[skip..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn suffixes(result: &MatchResult) -> Vec<&str> {
        result.candidates.iter().map(|c| c.suffix.as_str()).collect()
    }

    fn create_test_tree() -> CompletionTree {
        CompletionTree::new([
            CompletionNode::literal("racks")
                .hierarchical()
                .child(
                    CompletionNode::dynamic(|_: &str| names(&["A01", "A02", "B01"])).hierarchical(),
                ),
            CompletionNode::literal("rooms").hierarchical(),
            CompletionNode::literal("cd").child(
                CompletionNode::dynamic(|_: &str| names(&["SiteA", "SiteB", "Lab"])).hierarchical(),
            ),
            CompletionNode::literal("ls").child(CompletionNode::literal("-r")),
            CompletionNode::literal("lsrack"),
            CompletionNode::literal("pwd"),
        ])
    }

    fn complete(tree: &CompletionTree, line: &str) -> MatchResult {
        PathMatcher::new(tree).complete(line, line.chars().count())
    }

    #[test]
    fn test_single_literal_match() {
        let tree = create_test_tree();
        let result = complete(&tree, "ra");

        assert_eq!(result.candidates, vec![Candidate::new("cks", true)]);
        assert_eq!(result.offset, 2);
        assert_eq!(result.candidates[0].insertion(), "cks/");
    }

    #[test]
    fn test_ambiguous_literals() {
        let tree = create_test_tree();
        let result = complete(&tree, "r");

        assert_eq!(suffixes(&result), vec!["acks", "ooms"]);
        assert_eq!(result.offset, 1);
        assert_eq!(result.common_prefix(), "");
    }

    #[test]
    fn test_dynamic_segment_with_common_prefix() {
        let tree = create_test_tree();
        let result = complete(&tree, "racks/A");

        assert_eq!(suffixes(&result), vec!["01", "02"]);
        assert_eq!(result.offset, 1);
        assert_eq!(result.common_prefix(), "0");

        let refined = complete(&tree, "racks/A0");
        assert_eq!(suffixes(&refined), vec!["1", "2"]);
        assert_eq!(refined.common_prefix(), "");
    }

    #[test]
    fn test_completed_segment_lists_children() {
        let tree = create_test_tree();
        let result = complete(&tree, "racks/");

        assert_eq!(suffixes(&result), vec!["A01", "A02", "B01"]);
        assert_eq!(result.offset, 0);
        assert!(result.candidates.iter().all(|c| c.has_children));
    }

    #[test]
    fn test_deeper_segments_use_last_segment() {
        let tree = create_test_tree();
        let result = complete(&tree, "cd SiteA/Sit");

        assert_eq!(suffixes(&result), vec!["eA", "eB"]);
        assert_eq!(result.offset, 3);
    }

    #[test]
    fn test_word_without_boundary_completes_boundary() {
        let tree = create_test_tree();
        let result = complete(&tree, "pwd");

        assert_eq!(result.candidates, vec![Candidate::new("", false)]);
        assert_eq!(result.candidates[0].insertion(), " ");
    }

    #[test]
    fn test_prefix_shared_with_longer_word() {
        let tree = create_test_tree();
        let result = complete(&tree, "ls");

        assert_eq!(suffixes(&result), vec!["", "rack"]);
        assert_eq!(result.common_prefix(), "");
    }

    #[test]
    fn test_exact_word_descends() {
        let tree = create_test_tree();

        let result = complete(&tree, "ls ");
        assert_eq!(suffixes(&result), vec!["-r"]);

        let result = complete(&tree, "ls    -");
        assert_eq!(suffixes(&result), vec!["r"]);
    }

    #[test]
    fn test_leaf_word_has_nothing_more() {
        let tree = create_test_tree();
        assert!(complete(&tree, "pwd ").is_empty());
        assert!(complete(&tree, "ls -r ").is_empty());
    }

    #[test]
    fn test_no_match() {
        let tree = create_test_tree();
        assert!(complete(&tree, "xyz").is_empty());
        assert!(complete(&tree, "RA").is_empty());
    }

    #[test]
    fn test_empty_tree() {
        let tree = CompletionTree::default();
        assert!(complete(&tree, "racks/").is_empty());
        assert!(complete(&tree, "").is_empty());
    }

    #[test]
    fn test_leading_spaces_ignored() {
        let tree = create_test_tree();
        let result = complete(&tree, "   ra");
        assert_eq!(suffixes(&result), vec!["cks"]);
    }

    #[test]
    fn test_only_text_left_of_cursor_matters() {
        let tree = create_test_tree();
        let result = PathMatcher::new(&tree).complete("racks/A01", 7);
        assert_eq!(suffixes(&result), vec!["01", "02"]);
    }

    #[test]
    fn test_resolver_sees_full_line() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let recorder = seen.clone();
        let tree = CompletionTree::new([CompletionNode::literal("cd").child(
            CompletionNode::dynamic(move |line: &str| -> Vec<String> {
                recorder.borrow_mut().push(line.to_string());
                Vec::new()
            }),
        )]);

        PathMatcher::new(&tree).complete("cd SiteA/B extra", 10);
        assert_eq!(seen.borrow().as_slice(), ["cd SiteA/B extra".to_string()]);
    }

    #[test]
    fn test_trailing_delimiter_lists_dynamic_children() {
        let tree = CompletionTree::new([CompletionNode::literal("cd").child(
            CompletionNode::dynamic(|line: &str| {
                if line.ends_with("/") {
                    names(&["R1", "R2"])
                } else {
                    Vec::new()
                }
            })
            .hierarchical(),
        )]);

        let result = complete(&tree, "cd /");
        assert_eq!(suffixes(&result), vec!["R1", "R2"]);
        assert_eq!(result.offset, 0);
    }

    #[test]
    fn test_delimiter_retries_dynamic_children() {
        // Resolver backed by a cache that is only filled after the first miss
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let tree = CompletionTree::new([CompletionNode::literal("cd").child(
            CompletionNode::dynamic(move |_: &str| -> Vec<String> {
                *counter.borrow_mut() += 1;
                if *counter.borrow() == 1 {
                    Vec::new()
                } else {
                    names(&["R1", "R2"])
                }
            })
            .hierarchical(),
        )]);

        let result = complete(&tree, "cd SiteA/");
        assert_eq!(suffixes(&result), vec!["R1", "R2"]);
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_unicode_names() {
        let tree = CompletionTree::new([
            CompletionNode::literal("salle-été"),
            CompletionNode::literal("salle-hiver"),
        ]);
        let result = complete(&tree, "salle-é");
        assert_eq!(suffixes(&result), vec!["té"]);
        assert_eq!(result.offset, 7);
    }

    #[test]
    fn test_mixed_literal_and_dynamic_pool() {
        let tree = CompletionTree::new([CompletionNode::literal("lsrack").children([
            CompletionNode::literal("-r"),
            CompletionNode::dynamic(|_: &str| names(&["-rack1", "R2"])),
        ])]);

        let result = complete(&tree, "lsrack -");
        assert_eq!(suffixes(&result), vec!["r", "rack1"]);
        assert_eq!(result.common_prefix(), "r");
    }

    #[test]
    fn test_refinement_is_idempotent() {
        let tree = create_test_tree();
        let first = complete(&tree, "cd Si");
        let prefix = first.common_prefix();
        assert_eq!(prefix, "te");

        let refined = complete(&tree, &format!("cd Si{}", prefix));
        let expected: Vec<String> = first
            .candidates
            .iter()
            .map(|c| c.suffix[prefix.len()..].to_string())
            .collect();
        let actual: Vec<String> = refined.candidates.iter().map(|c| c.suffix.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(["start", "status", "stop"]), "st");
        assert_eq!(common_prefix(["network", "netscan"]), "net");
        assert_eq!(common_prefix(["abc", "xyz"]), "");
        assert_eq!(common_prefix(["only"]), "only");
        assert_eq!(common_prefix(Vec::<&str>::new()), "");
        assert_eq!(common_prefix(["été", "étage"]), "ét");
    }
}
