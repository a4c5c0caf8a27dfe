//! Fixture loader.
//!
//! Loads JSON files relative to the workspace root (the seed catalog, mostly).

use std::path::Path;

use serde_json::Value;

/// Load a JSON fixture file relative to the workspace root.
///
/// # Example
/// ```no_run
/// use neurarig_testing::fixture::Fixture;
/// let val = Fixture::load("services/store/seed/catalog.json");
/// ```
pub struct Fixture;

impl Fixture {
    /// Load and parse a fixture JSON file at `workspace_root/path`.
    ///
    /// Panics if the file is missing or invalid JSON.
    pub fn load(relative_path: &str) -> Value {
        let contents = Self::read(relative_path);
        serde_json::from_str(&contents)
            .unwrap_or_else(|e| panic!("invalid JSON in fixture {}: {}", relative_path, e))
    }

    /// Raw file contents at `workspace_root/path`.
    pub fn read(relative_path: &str) -> String {
        let workspace_root = std::env::var("CARGO_MANIFEST_DIR")
            .map(|dir| {
                // The workspace root is the first ancestor holding the virtual manifest.
                let p = Path::new(&dir);
                p.ancestors()
                    .find(|a| {
                        std::fs::read_to_string(a.join("Cargo.toml"))
                            .map(|s| s.contains("[workspace]"))
                            .unwrap_or(false)
                    })
                    .unwrap_or(p)
                    .to_path_buf()
            })
            .unwrap_or_else(|_| std::env::current_dir().unwrap());

        let full_path = workspace_root.join(relative_path);
        std::fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("fixture not found at {}: {}", full_path.display(), e))
    }
}
