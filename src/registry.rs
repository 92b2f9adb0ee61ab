//! Component registry: factory keys resolved at run time.
//!
//! Components are registered per `(module, component)` with a provider,
//! then their actions are added with the factory key stored in content
//! associations. Auto-creation looks actions up by the full name
//! `Module\Component\action`.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::{Locale, Parameters};
use crate::error::{Result, StructureError};

/// Text used when a node is auto-created for a component action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOptionTranslation {
    pub locale: Locale,
    pub name: String,
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub slug: Option<String>,
}

/// What a provider tells the auto-creation path about one action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOption {
    /// Human label; prefix of the generated node identifier.
    pub identifier: String,
    /// Per-locale text. Empty means "use the label everywhere".
    pub translations: Vec<ActionOptionTranslation>,
}

impl ActionOption {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_translation(mut self, translation: ActionOptionTranslation) -> Self {
        self.translations.push(translation);
        self
    }
}

/// Supplies labels and translations for a component's actions.
pub trait ComponentProvider: Send + Sync {
    fn action_option(&self, action: &str, parameters: &Parameters) -> ActionOption;
}

/// A registered action ready for auto-creation.
#[derive(Clone)]
pub struct ResolvedAction {
    pub action: String,
    /// Factory key stored in content associations.
    pub factory: String,
    pub provider: Arc<dyn ComponentProvider>,
}

struct Component {
    provider: Arc<dyn ComponentProvider>,
    /// action → factory key
    actions: FxHashMap<String, String>,
}

#[derive(Default)]
pub struct ComponentRegistry {
    components: RwLock<FxHashMap<(String, String), Component>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the provider of `module\component`.
    pub fn add_component(
        &self,
        module: &str,
        component: &str,
        provider: Arc<dyn ComponentProvider>,
    ) {
        self.components
            .write()
            .entry((module.to_string(), component.to_string()))
            .and_modify(|c| c.provider = provider.clone())
            .or_insert_with(|| Component {
                provider,
                actions: FxHashMap::default(),
            });
    }

    /// Add an action to an already registered component.
    pub fn add_action(&self, module: &str, component: &str, action: &str, factory: &str) -> Result<()> {
        let mut components = self.components.write();
        let Some(entry) = components.get_mut(&(module.to_string(), component.to_string())) else {
            return Err(StructureError::Invalid(format!(
                "component {module}\\{component} is not registered"
            )));
        };
        entry.actions.insert(action.to_string(), factory.to_string());
        Ok(())
    }

    /// Resolve `Module\Component\action`.
    pub fn resolve(&self, name: &str) -> Result<ResolvedAction> {
        let mut parts = name.split('\\');
        let (Some(module), Some(component), Some(action), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(StructureError::Invalid(format!(
                "`{name}` is not of the form Module\\Component\\action"
            )));
        };

        let components = self.components.read();
        components
            .get(&(module.to_string(), component.to_string()))
            .and_then(|c| {
                Some(ResolvedAction {
                    action: action.to_string(),
                    factory: c.actions.get(action)?.clone(),
                    provider: c.provider.clone(),
                })
            })
            .ok_or_else(|| StructureError::NotFound(format!("component action {name}")))
    }

    /// Registered action names of one component, sorted.
    pub fn actions(&self, module: &str, component: &str) -> Vec<String> {
        let components = self.components.read();
        let mut actions: Vec<String> = components
            .get(&(module.to_string(), component.to_string()))
            .map(|c| c.actions.keys().cloned().collect())
            .unwrap_or_default();
        actions.sort();
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Labels;

    impl ComponentProvider for Labels {
        fn action_option(&self, action: &str, _parameters: &Parameters) -> ActionOption {
            ActionOption::new(format!("Label {action}"))
        }
    }

    #[test]
    fn test_resolve_registered_action() {
        let registry = ComponentRegistry::new();
        registry.add_component("Article", "Article", Arc::new(Labels));
        registry
            .add_action("Article", "Article", "Detail", "article.detail")
            .unwrap();

        let resolved = registry.resolve("Article\\Article\\Detail").unwrap();
        assert_eq!(resolved.factory, "article.detail");
        assert_eq!(
            resolved
                .provider
                .action_option(&resolved.action, &Parameters::new())
                .identifier,
            "Label Detail"
        );
        assert_eq!(registry.actions("Article", "Article"), ["Detail"]);
    }

    #[test]
    fn test_unknown_names_fail() {
        let registry = ComponentRegistry::new();
        assert!(registry.add_action("Nope", "Nope", "x", "f").is_err());
        assert!(matches!(registry.resolve("Nope\\Nope\\x"), Err(e) if e.is_not_found()));
        assert!(matches!(
            registry.resolve("too-short"),
            Err(StructureError::Invalid(_))
        ));
    }
}
