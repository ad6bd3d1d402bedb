//! Dynamic resolvers for the shell's completion tree
//!
//! Catalog paths are completed from the shared catalog relative to the
//! current path; script arguments are completed from the local file system.

use std::fs;
use std::io;
use std::path::Path;

use crate::catalog::resolve_path;
use crate::error::CatalogError;
use crate::parser::COMMAND_NAMES;
use crate::repl::SharedState;

use super::tree::{CompletionNode, CompletionTree, Resolver, fallible};

/// Last whitespace-separated word of a line, empty after trailing whitespace
fn last_argument(line: &str) -> &str {
    line.rsplit(char::is_whitespace).next().unwrap_or("")
}

/// Directory part of a typed path, up to and including the last '/'
fn directory_part(arg: &str) -> &str {
    arg.rfind('/').map_or("", |idx| &arg[..=idx])
}

/// Names of the catalog objects the last argument of `line` can continue
///
/// # Arguments
/// * `state` - Shared shell state holding the catalog and current path
/// * `line` - Full input line
///
/// # Returns
/// * `Result<Vec<String>, CatalogError>` - Child names of the typed directory
pub fn entity_names(state: &SharedState, line: &str) -> Result<Vec<String>, CatalogError> {
    let dir = directory_part(last_argument(line));
    let path = resolve_path(&state.current_path(), dir);

    state.with_catalog(|catalog| {
        catalog
            .ls(&path)
            .map(|children| children.iter().map(|e| e.name.clone()).collect())
    })
}

/// File names in the directory typed after the first ':' of `line`
///
/// # Arguments
/// * `line` - Full input line, e.g. `.cmds: scripts/ru`
///
/// # Returns
/// * `io::Result<Vec<String>>` - Sorted entry names
pub fn local_file_names(line: &str) -> io::Result<Vec<String>> {
    let arg = line
        .split_once(':')
        .map(|(_, rest)| rest.trim_start())
        .unwrap_or("");
    let dir = match directory_part(arg) {
        "" => Path::new("."),
        dir => Path::new(dir),
    };

    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

/// Resolver completing catalog paths
pub fn entity_resolver(state: SharedState) -> impl Resolver {
    fallible("catalog", move |line: &str| entity_names(&state, line))
}

/// Resolver completing local file names
pub fn local_file_resolver() -> impl Resolver {
    fallible("local files", local_file_names)
}

/// Build the completion tree of the interactive shell
///
/// # Arguments
/// * `state` - Shared state the catalog resolvers read from
///
/// # Returns
/// * `CompletionTree` - Commands with their argument completions
pub fn shell_tree(state: &SharedState) -> CompletionTree {
    let entities = || CompletionNode::dynamic(entity_resolver(state.clone())).hierarchical();

    CompletionTree::new([
        CompletionNode::literal("cd").child(entities()),
        CompletionNode::literal("ls")
            .child(CompletionNode::literal("-r").child(entities()))
            .child(entities()),
        CompletionNode::literal("tree").child(entities()),
        CompletionNode::literal("pwd"),
        CompletionNode::literal("man")
            .children(COMMAND_NAMES.iter().map(|name| CompletionNode::literal(*name))),
        CompletionNode::literal("help"),
        CompletionNode::literal("clear"),
        CompletionNode::literal(".cmds:").child(CompletionNode::dynamic(local_file_resolver())),
        CompletionNode::literal("exit"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};
    use crate::repl::completion::matcher::PathMatcher;

    fn create_test_state() -> SharedState {
        let mut catalog = Catalog::new();
        for (path, category) in [
            ("SiteA", Category::Site),
            ("SiteA/B1", Category::Building),
            ("SiteA/B1/R1", Category::Room),
            ("SiteA/B1/R2", Category::Room),
            ("SiteA/B2", Category::Building),
            ("SiteB", Category::Site),
        ] {
            catalog.insert(path, category).unwrap();
        }
        SharedState::new(catalog)
    }

    fn suffixes(tree: &CompletionTree, line: &str) -> Vec<String> {
        PathMatcher::new(tree)
            .complete(line, line.chars().count())
            .candidates
            .into_iter()
            .map(|c| c.suffix)
            .collect()
    }

    #[test]
    fn test_entity_names_relative_and_absolute() {
        let state = create_test_state();
        assert_eq!(entity_names(&state, "cd ").unwrap(), vec!["SiteA", "SiteB"]);
        assert_eq!(entity_names(&state, "cd Si").unwrap(), vec!["SiteA", "SiteB"]);
        assert_eq!(entity_names(&state, "cd SiteA/").unwrap(), vec!["B1", "B2"]);
        assert_eq!(
            entity_names(&state, "ls -r /SiteA/B1/R").unwrap(),
            vec!["R1", "R2"]
        );

        state.set_current_path("/SiteA/B1".to_string());
        assert_eq!(entity_names(&state, "cd ").unwrap(), vec!["R1", "R2"]);
        assert_eq!(entity_names(&state, "cd ../").unwrap(), vec!["B1", "B2"]);
        assert_eq!(entity_names(&state, "cd /").unwrap(), vec!["SiteA", "SiteB"]);
    }

    #[test]
    fn test_entity_names_missing_directory() {
        let state = create_test_state();
        assert!(matches!(
            entity_names(&state, "cd Nowhere/"),
            Err(CatalogError::NotFound(_))
        ));

        let resolver = entity_resolver(state);
        assert!(resolver.resolve("cd Nowhere/").is_empty());
    }

    #[test]
    fn test_shell_tree_completes_paths() {
        let state = create_test_state();
        let tree = shell_tree(&state);

        assert_eq!(suffixes(&tree, "cd SiteA/"), vec!["B1", "B2"]);
        assert_eq!(suffixes(&tree, "cd SiteA/B1/R"), vec!["1", "2"]);
        assert_eq!(suffixes(&tree, "tree SiteB"), vec![""]);
        assert_eq!(suffixes(&tree, "ls -"), vec!["r"]);
        assert_eq!(suffixes(&tree, "ls -r Site"), vec!["A", "B"]);
        assert_eq!(suffixes(&tree, "man pw"), vec!["d"]);
        assert_eq!(suffixes(&tree, "p"), vec!["wd"]);
    }

    #[test]
    fn test_shell_tree_follows_current_path() {
        let state = create_test_state();
        let tree = shell_tree(&state);

        state.set_current_path("/SiteA".to_string());
        assert_eq!(suffixes(&tree, "cd B"), vec!["1", "2"]);
    }

    #[test]
    fn test_local_file_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("setup.cmds"), "pwd\n").unwrap();
        fs::write(dir.path().join("racks.cmds"), "ls\n").unwrap();

        let line = format!(".cmds: {}/", dir.path().display());
        assert_eq!(
            local_file_names(&line).unwrap(),
            vec!["racks.cmds", "setup.cmds"]
        );

        let missing = format!(".cmds: {}/nope/", dir.path().display());
        assert!(local_file_names(&missing).is_err());
        assert!(local_file_resolver().resolve(&missing).is_empty());
    }

    #[test]
    fn test_last_argument() {
        assert_eq!(last_argument("cd Site"), "Site");
        assert_eq!(last_argument("cd "), "");
        assert_eq!(last_argument("ls -r  /A/B"), "/A/B");
        assert_eq!(directory_part("/A/B"), "/A/");
        assert_eq!(directory_part("B"), "");
    }
}
