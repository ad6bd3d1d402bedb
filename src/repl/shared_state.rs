use std::sync::Arc;

use parking_lot::RwLock;

use crate::catalog::Catalog;
use crate::config::DisplayConfig;

/// Shared state between the line editor, completion resolvers and command
/// execution.
#[derive(Debug, Clone)]
pub struct SharedState {
    /// Current absolute catalog path
    current_path: Arc<RwLock<String>>,

    /// Object catalog being navigated
    catalog: Arc<RwLock<Catalog>>,

    /// Color output setting
    color_enabled: Arc<RwLock<bool>>,
}

impl SharedState {
    /// Create a new shared state positioned at the catalog root.
    ///
    /// * `catalog` - Object catalog to navigate
    pub fn new(catalog: Catalog) -> Self {
        Self::with_config(catalog, &DisplayConfig::default())
    }

    /// Create a new shared state with display configuration.
    ///
    /// * `catalog` - Object catalog to navigate
    /// * `display_config` - Display configuration settings
    pub fn with_config(catalog: Catalog, display_config: &DisplayConfig) -> Self {
        Self {
            current_path: Arc::new(RwLock::new("/".to_string())),
            catalog: Arc::new(RwLock::new(catalog)),
            color_enabled: Arc::new(RwLock::new(display_config.color_output)),
        }
    }

    /// Get current path.
    pub fn current_path(&self) -> String {
        self.current_path.read().clone()
    }

    /// Set current path.
    pub fn set_current_path(&self, path: String) {
        *self.current_path.write() = path;
    }

    /// Run a closure with read access to the catalog
    ///
    /// # Arguments
    /// * `f` - Closure receiving the catalog
    ///
    /// # Returns
    /// * `R` - Whatever the closure returns
    pub fn with_catalog<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        f(&self.catalog.read())
    }

    /// Replace the catalog and go back to the root.
    pub fn replace_catalog(&self, catalog: Catalog) {
        *self.catalog.write() = catalog;
        self.set_current_path("/".to_string());
    }

    /// Get current color setting.
    pub fn color_enabled(&self) -> bool {
        *self.color_enabled.read()
    }

    /// Set color output.
    pub fn set_color_enabled(&self, enabled: bool) {
        *self.color_enabled.write() = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    #[test]
    fn test_clones_share_state() {
        let state = SharedState::new(Catalog::new());
        let other = state.clone();

        other.set_current_path("/SiteA".to_string());
        assert_eq!(state.current_path(), "/SiteA");

        other.set_color_enabled(false);
        assert!(!state.color_enabled());
    }

    #[test]
    fn test_replace_catalog_resets_path() {
        let state = SharedState::new(Catalog::new());
        state.set_current_path("/Gone".to_string());

        let mut catalog = Catalog::new();
        catalog.insert("SiteA", Category::Site).unwrap();
        state.replace_catalog(catalog);

        assert_eq!(state.current_path(), "/");
        assert_eq!(state.with_catalog(|c| c.len()), 1);
    }
}
