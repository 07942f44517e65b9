use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::{Config, ServicesCfg};
use crate::error::{CoreResult, SkillwireError};
use crate::provider::Provider;
use crate::providers::sharp_api::SharpApiService;

/// Factory producing a fresh provider instance from service configuration.
pub type ProviderFactory = fn(&ServicesCfg) -> Box<dyn Provider>;

/// Resolves provider ids to concrete service instances.
///
/// The mapping table comes from configuration; the service type names it
/// references are looked up in an explicit factory registry. Resolution
/// never caches: every call re-runs the factory, which re-reads the
/// service configuration block.
#[derive(Debug)]
pub struct ProviderResolver {
    mapping: IndexMap<String, String>,
    services: ServicesCfg,
    factories: HashMap<&'static str, ProviderFactory>,
}

impl ProviderResolver {
    /// Build a resolver from configuration with the built-in services
    /// registered. Mapping keys must be case-insensitively unique.
    pub fn from_config(cfg: &Config) -> CoreResult<Self> {
        let mut mapping = IndexMap::with_capacity(cfg.providers.mapping.len());
        for (id, service) in &cfg.providers.mapping {
            let normalized = id.to_lowercase();
            if mapping.insert(normalized, service.clone()).is_some() {
                return Err(SkillwireError::Validation(format!(
                    "duplicate provider id (case-insensitive): {id}"
                )));
            }
        }

        let mut resolver = Self {
            mapping,
            services: cfg.services.clone(),
            factories: HashMap::new(),
        };
        resolver.register(SharpApiService::TYPE_NAME, |services| {
            Box::new(SharpApiService::new(services))
        });
        Ok(resolver)
    }

    /// Register a factory for a service type name. A later registration
    /// under the same name wins.
    pub fn register(&mut self, type_name: &'static str, factory: ProviderFactory) {
        self.factories.insert(type_name, factory);
    }

    /// Look up the id (case-insensitively), run the mapped factory, and
    /// return the fresh instance. All failures surface here, never later.
    pub fn resolve(&self, provider_id: &str) -> CoreResult<Box<dyn Provider>> {
        let normalized = provider_id.to_lowercase();
        let service = self
            .mapping
            .get(&normalized)
            .ok_or_else(|| SkillwireError::UnknownProvider {
                provider: provider_id.to_string(),
            })?;
        let factory =
            self.factories
                .get(service.as_str())
                .ok_or_else(|| SkillwireError::ServiceNotRegistered {
                    service: service.clone(),
                })?;
        debug!(provider = %normalized, %service, "resolved provider");
        Ok(factory(&self.services))
    }

    /// Configured provider ids, in configuration declaration order.
    pub fn available_providers(&self) -> Vec<String> {
        self.mapping.keys().cloned().collect()
    }

    /// Case-insensitive membership test.
    pub fn has_provider(&self, provider_id: &str) -> bool {
        self.mapping.contains_key(&provider_id.to_lowercase())
    }
}
