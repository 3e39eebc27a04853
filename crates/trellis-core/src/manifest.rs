//! Registry manifest
//!
//! The build step that discovers pages and layouts writes a manifest naming
//! each view path, each layout (id, scope, config) and any per-route
//! overrides by component export name. At startup the host pairs it with a
//! [`ComponentCatalog`] of linked components to produce a
//! [`RegistrySnapshot`].

use crate::component::ComponentCatalog;
use crate::layout::{LayoutConfig, LayoutDescriptor, LayoutRegistry, RegistrySnapshot};
use crate::registry::ViewRegistry;
use crate::{Result, TrellisError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One view entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewManifest {
    pub path: String,
    pub component: String,
}

/// One layout entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutManifest {
    pub id: String,
    pub scope: String,
    pub component: String,
    #[serde(default)]
    pub config: LayoutConfig,
}

/// Configuration override for one view path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideManifest {
    pub path: String,
    #[serde(default)]
    pub config: LayoutConfig,
}

/// Serialized description of a registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryManifest {
    pub views: Vec<ViewManifest>,
    pub layouts: Vec<LayoutManifest>,
    pub overrides: Vec<OverrideManifest>,
}

impl RegistryManifest {
    /// Parse JSON manifest text
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| TrellisError::Manifest(format!("JSON: {e}")))
    }

    /// Parse TOML manifest text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| TrellisError::Manifest(format!("TOML: {e}")))
    }

    /// Read a manifest file; `.toml` is parsed as TOML, anything else as JSON
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TrellisError::Manifest(format!("{}: {e}", path.display())))?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        let manifest = if is_toml {
            Self::from_toml(&contents)?
        } else {
            Self::from_json(&contents)?
        };

        tracing::info!(
            path = %path.display(),
            views = manifest.views.len(),
            layouts = manifest.layouts.len(),
            "Loaded registry manifest"
        );
        Ok(manifest)
    }

    /// Link every export against `catalog` and build a snapshot
    pub fn into_snapshot(self, catalog: &ComponentCatalog) -> Result<RegistrySnapshot> {
        let lookup = |export: &str, referenced_by: &str| {
            catalog
                .get(export)
                .ok_or_else(|| TrellisError::UnknownComponent {
                    export: export.to_string(),
                    referenced_by: referenced_by.to_string(),
                })
        };

        let mut views = ViewRegistry::builder();
        for view in &self.views {
            views = views.register(view.path.clone(), lookup(&view.component, &view.path)?);
        }

        let mut layouts = Vec::with_capacity(self.layouts.len());
        for layout in self.layouts {
            let component = lookup(&layout.component, &layout.id)?;
            layouts.push(
                LayoutDescriptor::new(layout.id, layout.scope, component).with_config(layout.config),
            );
        }

        let mut overrides = HashMap::with_capacity(self.overrides.len());
        for entry in self.overrides {
            if overrides.insert(entry.path.clone(), entry.config).is_some() {
                return Err(TrellisError::Manifest(format!(
                    "duplicate override for '{}'",
                    entry.path
                )));
            }
        }

        RegistrySnapshot::new(views.build()?, LayoutRegistry::new(layouts)?)?.with_overrides(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentError, Props, SLOT};
    use crate::context::RenderContext;
    use crate::resolver::LayoutResolver;
    use std::sync::Arc;

    fn catalog() -> ComponentCatalog {
        ComponentCatalog::new()
            .with(
                "RootLayout",
                |_: &Props, _: &RenderContext| -> std::result::Result<String, ComponentError> {
                    Ok(format!("<body>{SLOT}</body>"))
                },
            )
            .with(
                "UserPage",
                |props: &Props, _: &RenderContext| -> std::result::Result<String, ComponentError> {
                    Ok(format!("<p>{}</p>", props["name"]))
                },
            )
    }

    const TOML_MANIFEST: &str = r#"
[[views]]
path = "/users/[id]"
component = "UserPage"

[[layouts]]
id = "Root"
scope = "/"
component = "RootLayout"

[layouts.config]
title = "Users"
nav = true

[[overrides]]
path = "/users/[id]"

[overrides.config]
title = "User detail"
"#;

    #[test]
    fn toml_manifest_builds_a_snapshot() {
        let snapshot = RegistryManifest::from_toml(TOML_MANIFEST)
            .unwrap()
            .into_snapshot(&catalog())
            .unwrap();
        assert_eq!(snapshot.views().len(), 1);
        assert_eq!(snapshot.layouts().len(), 1);

        let chain = LayoutResolver::new(Arc::new(snapshot))
            .resolve_chain("/users/[id]")
            .unwrap();
        assert_eq!(chain.identifiers(), vec!["Root", "/users/[id]"]);
        assert_eq!(chain.config()["title"], "User detail");
        assert_eq!(chain.layouts()[0].props()["title"], "Users");
    }

    #[test]
    fn unknown_export_is_rejected() {
        let manifest = RegistryManifest::from_json(
            r#"{"views":[{"path":"/a","component":"Missing"}]}"#,
        )
        .unwrap();
        let err = manifest.into_snapshot(&catalog()).unwrap_err();
        match err {
            TrellisError::UnknownComponent { export, referenced_by } => {
                assert_eq!(export, "Missing");
                assert_eq!(referenced_by, "/a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn override_for_unregistered_view_is_rejected() {
        let manifest = RegistryManifest::from_json(
            r#"{"views":[{"path":"/a","component":"UserPage"}],
                "overrides":[{"path":"/b","config":{"title":"x"}}]}"#,
        )
        .unwrap();
        let err = manifest.into_snapshot(&catalog()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn malformed_manifest_is_a_manifest_error() {
        let err = RegistryManifest::from_json("{\"views\": 3}").unwrap_err();
        assert!(matches!(err, TrellisError::Manifest(_)));
        assert!(err.is_build_error());
    }

    #[tokio::test]
    async fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("registry.toml");
        tokio::fs::write(&toml_path, TOML_MANIFEST).await.unwrap();
        let json_path = dir.path().join("registry.json");
        tokio::fs::write(&json_path, r#"{"views":[{"path":"/a","component":"UserPage"}]}"#)
            .await
            .unwrap();

        let from_toml = RegistryManifest::load(&toml_path).await.unwrap();
        assert_eq!(from_toml.layouts[0].config["nav"], true);

        let from_json = RegistryManifest::load(&json_path).await.unwrap();
        assert_eq!(from_json.views[0].path, "/a");
        assert!(from_json.layouts.is_empty());

        let missing = RegistryManifest::load(dir.path().join("nope.json")).await;
        assert!(matches!(missing, Err(TrellisError::Manifest(_))));
    }
}
