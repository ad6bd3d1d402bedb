//! Hierarchical object catalog
//!
//! The catalog is the data the shell navigates: sites contain buildings,
//! buildings contain rooms, rooms contain racks and so on. Objects are
//! addressed with absolute, '/'-separated paths such as `/SiteA/B1/R1`.
//!
//! A catalog is loaded from a TOML file listing every object:
//!
//! ```toml
//! [[objects]]
//! path = "SiteA"
//! category = "site"
//!
//! [[objects]]
//! path = "SiteA/B1"
//! category = "building"
//! ```
//!
//! Parents must be listed before their children.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CatalogError;

/// Kind of catalog object.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Site,
    Building,
    Room,
    Rack,
    Device,
    #[default]
    Group,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Site => "site",
            Category::Building => "building",
            Category::Room => "room",
            Category::Rack => "rack",
            Category::Device => "device",
            Category::Group => "group",
        };
        f.write_str(name)
    }
}

/// One object of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Last path segment
    pub name: String,
    /// Object kind
    pub category: Category,
    /// Children in insertion order
    pub children: Vec<Entity>,
}

impl Entity {
    fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            children: Vec::new(),
        }
    }

    fn child(&self, name: &str) -> Option<&Entity> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.children.iter_mut().find(|c| c.name == name)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    objects: Vec<ObjectSpec>,
}

#[derive(Debug, Deserialize)]
struct ObjectSpec {
    path: String,
    #[serde(default)]
    category: Category,
}

/// In-memory object hierarchy.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: Entity,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create an empty catalog holding only the root
    pub fn new() -> Self {
        Self {
            root: Entity::new("", Category::Group),
        }
    }

    /// Parse a catalog from TOML text
    ///
    /// # Arguments
    /// * `content` - TOML document with an `objects` array
    ///
    /// # Returns
    /// * `Result<Self, CatalogError>` - Catalog or the first invalid object
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| CatalogError::InvalidFormat(e.to_string()))?;

        let mut catalog = Self::new();
        for spec in file.objects {
            catalog.insert(&spec.path, spec.category)?;
        }
        Ok(catalog)
    }

    /// Load a catalog file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML catalog
    ///
    /// # Returns
    /// * `Result<Self, CatalogError>` - Loaded catalog or error
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::InvalidFormat(format!("cannot read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_toml_str(&content)?;
        info!(
            "Loaded {} catalog objects from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Add an object
    ///
    /// # Arguments
    /// * `path` - Object path, absolute or relative to the root
    /// * `category` - Object kind
    ///
    /// # Returns
    /// * `Result<(), CatalogError>` - Error if the parent is missing or the path is taken
    pub fn insert(&mut self, path: &str, category: Category) -> Result<(), CatalogError> {
        let segments = split_path(path)?;
        let Some((name, parents)) = segments.split_last() else {
            return Err(CatalogError::InvalidPath(path.to_string()));
        };

        let mut node = &mut self.root;
        for segment in parents {
            node = node
                .child_mut(segment)
                .ok_or_else(|| CatalogError::MissingParent(path.to_string()))?;
        }

        if node.child(name).is_some() {
            return Err(CatalogError::AlreadyExists(path.to_string()));
        }
        debug!("catalog: adding {} {}", category, path);
        node.children.push(Entity::new(*name, category));
        Ok(())
    }

    /// Look up an object by absolute path
    ///
    /// # Arguments
    /// * `path` - Absolute path; `/` is the root
    ///
    /// # Returns
    /// * `Option<&Entity>` - The object, if present
    pub fn get(&self, path: &str) -> Option<&Entity> {
        let mut node = &self.root;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// List the children of an object
    ///
    /// # Arguments
    /// * `path` - Absolute path of the parent
    ///
    /// # Returns
    /// * `Result<&[Entity], CatalogError>` - Children in insertion order
    pub fn ls(&self, path: &str) -> Result<&[Entity], CatalogError> {
        self.get(path)
            .map(|e| e.children.as_slice())
            .ok_or_else(|| CatalogError::NotFound(path.to_string()))
    }

    /// Render the subtree below an object
    ///
    /// # Arguments
    /// * `path` - Absolute path of the subtree root
    /// * `depth` - Number of levels to show
    ///
    /// # Returns
    /// * `Result<String, CatalogError>` - One line per object, `├──` indented
    pub fn tree(&self, path: &str, depth: usize) -> Result<String, CatalogError> {
        let root = self
            .get(path)
            .ok_or_else(|| CatalogError::NotFound(path.to_string()))?;

        let mut out = String::new();
        out.push_str(path);
        out.push('\n');
        walk(root, "", depth, &mut out);
        Ok(out)
    }

    /// Number of objects, root excluded
    pub fn len(&self) -> usize {
        fn count(entity: &Entity) -> usize {
            entity.children.iter().map(|c| 1 + count(c)).sum()
        }
        count(&self.root)
    }

    /// Whether the catalog holds no objects
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }
}

fn walk(entity: &Entity, prefix: &str, depth: usize, out: &mut String) {
    if depth == 0 {
        return;
    }
    let last = entity.children.len().saturating_sub(1);
    for (idx, child) in entity.children.iter().enumerate() {
        let (branch, indent) = if idx == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(&child.name);
        out.push('\n');
        walk(child, &format!("{}{}", prefix, indent), depth - 1, out);
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, CatalogError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(CatalogError::InvalidPath(path.to_string()));
    }
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments
        .iter()
        .any(|s| s.is_empty() || *s == "." || *s == "..")
    {
        return Err(CatalogError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Resolve a user-typed path against the current location
///
/// Relative paths start at `current`; `.` and `..` are folded, and `..` never
/// climbs above the root.
///
/// # Arguments
/// * `current` - Absolute current path
/// * `input` - Absolute or relative path as typed
///
/// # Returns
/// * `String` - Absolute path without a trailing '/' (except for the root)
pub fn resolve_path(current: &str, input: &str) -> String {
    let joined = if input.starts_with('/') {
        input.to_string()
    } else {
        format!("{}/{}", current, input)
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }

    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"
[[objects]]
path = "SiteA"
category = "site"

[[objects]]
path = "SiteA/B1"
category = "building"

[[objects]]
path = "SiteA/B1/R1"
category = "room"

[[objects]]
path = "SiteA/B1/R2"
category = "room"

[[objects]]
path = "SiteB"
category = "site"
"#;

    fn create_test_catalog() -> Catalog {
        Catalog::from_toml_str(CATALOG).unwrap()
    }

    fn names(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_load_and_ls() {
        let catalog = create_test_catalog();
        assert_eq!(catalog.len(), 5);
        assert_eq!(names(catalog.ls("/").unwrap()), vec!["SiteA", "SiteB"]);
        assert_eq!(names(catalog.ls("/SiteA/B1").unwrap()), vec!["R1", "R2"]);
        assert!(catalog.ls("/SiteA/B1/R1").unwrap().is_empty());
        assert_eq!(
            catalog.get("/SiteA/B1").map(|e| e.category),
            Some(Category::Building)
        );
    }

    #[test]
    fn test_ls_missing_path() {
        let catalog = create_test_catalog();
        assert!(matches!(
            catalog.ls("/SiteC"),
            Err(CatalogError::NotFound(p)) if p == "/SiteC"
        ));
    }

    #[test]
    fn test_insert_errors() {
        let mut catalog = create_test_catalog();
        assert!(matches!(
            catalog.insert("SiteC/B1", Category::Building),
            Err(CatalogError::MissingParent(_))
        ));
        assert!(matches!(
            catalog.insert("/SiteA", Category::Site),
            Err(CatalogError::AlreadyExists(_))
        ));
        assert!(matches!(
            catalog.insert("SiteA//B2", Category::Building),
            Err(CatalogError::InvalidPath(_))
        ));
        assert!(matches!(
            catalog.insert("/", Category::Site),
            Err(CatalogError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Catalog::from_toml_str("objects = 3"),
            Err(CatalogError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_default_category() {
        let catalog = Catalog::from_toml_str("[[objects]]\npath = \"Misc\"\n").unwrap();
        assert_eq!(catalog.get("/Misc").map(|e| e.category), Some(Category::Group));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let catalog = Catalog::load_from_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 5);

        let missing = file.path().with_extension("missing");
        assert!(Catalog::load_from_file(&missing).is_err());
    }

    #[test]
    fn test_tree_rendering() {
        let catalog = create_test_catalog();
        let rendered = catalog.tree("/", 3).unwrap();
        assert_eq!(
            rendered,
            "/\n├── SiteA\n│   └── B1\n│       ├── R1\n│       └── R2\n└── SiteB\n"
        );

        let shallow = catalog.tree("/SiteA", 1).unwrap();
        assert_eq!(shallow, "/SiteA\n└── B1\n");
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("/SiteA", "B1"), "/SiteA/B1");
        assert_eq!(resolve_path("/SiteA/B1", ".."), "/SiteA");
        assert_eq!(resolve_path("/SiteA/B1", "../../.."), "/");
        assert_eq!(resolve_path("/SiteA", "/SiteB/"), "/SiteB");
        assert_eq!(resolve_path("/SiteA", "./B1/R1"), "/SiteA/B1/R1");
        assert_eq!(resolve_path("/", ""), "/");
    }
}
