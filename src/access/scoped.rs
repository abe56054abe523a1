//! Module-qualified reads.
//!
//! `module.get("key")` is exactly `service.get("module.key")`; a `None`
//! module adds no prefix.

use std::borrow::Cow;

use crate::error::Result;
use crate::service::ConfigurationService;

/// A borrowed view of one module namespace.
#[derive(Debug, Clone)]
pub struct ScopedConfig<'a> {
    service: &'a ConfigurationService,
    module: Option<String>,
}

impl<'a> ScopedConfig<'a> {
    pub(crate) fn new(service: &'a ConfigurationService, module: Option<&str>) -> Self {
        Self {
            service,
            module: module.map(str::to_string),
        }
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// The fully qualified name of `key`.
    pub fn qualify<'k>(&self, key: &'k str) -> Cow<'k, str> {
        match &self.module {
            Some(module) => Cow::Owned(format!("{}.{}", module, key)),
            None => Cow::Borrowed(key),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.service.get(&self.qualify(key))
    }

    pub fn get_or(&self, key: &str, default: &str) -> Result<String> {
        self.service.get_or(&self.qualify(key), default)
    }

    pub fn get_int(&self, key: &str) -> Result<i32> {
        self.service.get_int(&self.qualify(key))
    }

    pub fn get_int_or(&self, key: &str, default: i32) -> Result<i32> {
        self.service.get_int_or(&self.qualify(key), default)
    }

    pub fn get_long(&self, key: &str) -> Result<i64> {
        self.service.get_long(&self.qualify(key))
    }

    pub fn get_long_or(&self, key: &str, default: i64) -> Result<i64> {
        self.service.get_long_or(&self.qualify(key), default)
    }

    pub fn get_boolean(&self, key: &str) -> Result<bool> {
        self.service.get_boolean(&self.qualify(key))
    }

    pub fn get_boolean_or(&self, key: &str, default: bool) -> Result<bool> {
        self.service.get_boolean_or(&self.qualify(key), default)
    }

    pub fn get_array(&self, key: &str) -> Result<Vec<String>> {
        self.service.get_array(&self.qualify(key))
    }

    pub fn get_array_or(&self, key: &str, default: &[&str]) -> Result<Vec<String>> {
        self.service.get_array_or(&self.qualify(key), default)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.service.has_property(&self.qualify(key))
    }

    /// Fully qualified keys belonging to this module.
    pub fn property_keys(&self) -> Vec<String> {
        self.service.property_keys(self.module.as_deref())
    }

    /// This module's properties with the module prefix stripped.
    pub fn properties(&self) -> Result<Vec<(String, String)>> {
        self.service.subset(self.module.as_deref().unwrap_or(""))
    }
}
