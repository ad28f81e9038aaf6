//! Injector registry.
//!
//! The [`InjectorRegistry`] maps codes to code-defined [`Injector`]s and holds
//! at most one [`Initializer`]. It is populated once at process start and then
//! shared read-only (typically as `Arc<InjectorRegistry>`) by every resolution.
//!
//! # Usage
//!
//! ```ignore
//! use quill_injector::InjectorRegistry;
//!
//! let mut registry = InjectorRegistry::new();
//! registry.register(CurrentDate::new(clock.clone()));
//! registry.register(InvoiceNumber);
//! let registry = Arc::new(registry.with_initializer(LoadAccount));
//! ```

use crate::catalog::InjectableDefinition;
use crate::error::RegistryError;
use crate::injector::{Initializer, Injector};
use indexmap::IndexMap;
use quill_graph::InjectorLookup;
use std::sync::Arc;

/// Registry of code-defined injectors.
///
/// Iteration order is registration order.
#[derive(Default)]
pub struct InjectorRegistry {
    injectors: IndexMap<String, Arc<dyn Injector>>,
    initializer: Option<Arc<dyn Initializer>>,
}

impl core::fmt::Debug for InjectorRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InjectorRegistry")
            .field("injectors", &self.codes())
            .field("has_initializer", &self.initializer.is_some())
            .finish()
    }
}

impl InjectorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            injectors: IndexMap::new(),
            initializer: None,
        }
    }

    /// Registers an injector.
    ///
    /// # Panics
    ///
    /// Panics if an injector with the same code is already registered.
    pub fn register(&mut self, injector: impl Injector) {
        if let Err(err) = self.try_register(injector) {
            panic!("{err}");
        }
    }

    /// Registers an injector, rejecting duplicate codes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCode`] if the code is taken.
    pub fn try_register(&mut self, injector: impl Injector) -> Result<(), RegistryError> {
        self.try_register_arc(Arc::new(injector))
    }

    /// Registers a shared injector, rejecting duplicate codes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCode`] if the code is taken.
    pub fn try_register_arc(&mut self, injector: Arc<dyn Injector>) -> Result<(), RegistryError> {
        let code = injector.code().to_string();
        if self.injectors.contains_key(&code) {
            return Err(RegistryError::DuplicateCode(code));
        }
        self.injectors.insert(code, injector);
        Ok(())
    }

    /// Installs the global initializer.
    ///
    /// # Panics
    ///
    /// Panics if an initializer is already installed.
    #[must_use]
    pub fn with_initializer(mut self, initializer: impl Initializer) -> Self {
        if let Err(err) = self.set_initializer(initializer) {
            panic!("{err}");
        }
        self
    }

    /// Installs the global initializer.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateInitializer`] if one is already installed.
    pub fn set_initializer(&mut self, initializer: impl Initializer) -> Result<(), RegistryError> {
        if self.initializer.is_some() {
            return Err(RegistryError::DuplicateInitializer);
        }
        self.initializer = Some(Arc::new(initializer));
        Ok(())
    }

    /// Returns the initializer, if any.
    #[must_use]
    pub fn initializer(&self) -> Option<&Arc<dyn Initializer>> {
        self.initializer.as_ref()
    }

    /// Returns the injector registered under `code`.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Arc<dyn Injector>> {
        self.injectors.get(code)
    }

    /// Returns whether `code` is owned by the registry.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.injectors.contains_key(code)
    }

    /// Returns all registered codes in registration order.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.injectors.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered injectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.injectors.len()
    }

    /// Returns true if no injectors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.injectors.is_empty()
    }

    /// Returns catalog definitions for all registered injectors.
    #[must_use]
    pub fn definitions(&self) -> Vec<InjectableDefinition> {
        self.injectors
            .values()
            .map(|injector| InjectableDefinition::from_injector(injector.as_ref()))
            .collect()
    }
}

impl InjectorLookup for InjectorRegistry {
    fn dependencies_of(&self, code: &str) -> Option<Vec<String>> {
        self.injectors
            .get(code)
            .map(|injector| injector.dependencies())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{InitData, ResolutionContext};
    use crate::error::InjectorError;
    use crate::injector::InjectorResult;
    use crate::value::ValueType;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct Named {
        code: &'static str,
        deps: Vec<String>,
    }

    impl Named {
        fn new(code: &'static str) -> Self {
            Self {
                code,
                deps: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Injector for Named {
        fn code(&self) -> &str {
            self.code
        }

        fn data_type(&self) -> ValueType {
            ValueType::String
        }

        fn dependencies(&self) -> Vec<String> {
            self.deps.clone()
        }

        async fn resolve(
            &self,
            _ctx: &ResolutionContext,
            _cancel: CancellationToken,
        ) -> Result<Option<InjectorResult>, InjectorError> {
            Ok(Some(InjectorResult::new(self.code)))
        }
    }

    struct NoopInit;

    #[async_trait]
    impl Initializer for NoopInit {
        async fn init(&self, _ctx: &ResolutionContext) -> Result<InitData, InjectorError> {
            Ok(Arc::new(()))
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = InjectorRegistry::new();
        registry.register(Named::new("b"));
        registry.register(Named::new("a"));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert!(!registry.contains("c"));
        assert_eq!(registry.codes(), vec!["b", "a"]);
        assert_eq!(registry.get("a").map(|i| i.code()), Some("a"));
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let mut registry = InjectorRegistry::new();
        registry.register(Named::new("a"));
        assert_eq!(
            registry.try_register(Named::new("a")),
            Err(RegistryError::DuplicateCode("a".into()))
        );
    }

    #[test]
    #[should_panic(expected = "injector 'a' is already registered")]
    fn register_panics_on_duplicate() {
        let mut registry = InjectorRegistry::new();
        registry.register(Named::new("a"));
        registry.register(Named::new("a"));
    }

    #[test]
    fn initializer_installed_once() {
        let mut registry = InjectorRegistry::new().with_initializer(NoopInit);
        assert!(registry.initializer().is_some());
        assert_eq!(
            registry.set_initializer(NoopInit),
            Err(RegistryError::DuplicateInitializer)
        );
    }

    #[test]
    fn lookup_exposes_dependencies() {
        let mut registry = InjectorRegistry::new();
        registry.register(Named {
            code: "total",
            deps: vec!["subtotal".into()],
        });
        assert_eq!(
            registry.dependencies_of("total"),
            Some(vec!["subtotal".to_string()])
        );
        assert_eq!(registry.dependencies_of("missing"), None);
    }

    #[test]
    fn definitions_follow_registration_order() {
        let mut registry = InjectorRegistry::new();
        registry.register(Named::new("z"));
        registry.register(Named::new("y"));
        let codes: Vec<_> = registry
            .definitions()
            .into_iter()
            .map(|d| d.code)
            .collect();
        assert_eq!(codes, vec!["z", "y"]);
    }
}
