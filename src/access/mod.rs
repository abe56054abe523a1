//! Typed accessors.
//!
//! # Defaults
//! With no default supplied: numbers read as `0`, booleans as `false`,
//! arrays as empty, strings as `None`. A stored value that cannot be
//! coerced falls back to the default in the same way.
//!
//! Interpolation errors (cycles) are never swallowed by a default.

pub mod coerce;
pub mod scoped;

use crate::error::Result;
use crate::interpolate::Interpolator;
use crate::service::ConfigurationService;
use crate::source::parser::join_escaped;
use crate::store::RawEntry;

pub use coerce::{IntoSetting, Resolved, TargetType, TypedValue};
pub use scoped::ScopedConfig;

impl ConfigurationService {
    /// Interpolated value of `key`, or `None` when absent.
    ///
    /// Multi-valued entries yield their first value.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let snapshot = self.inner.snapshot.load();
        Interpolator::new(&**snapshot).resolve_key(key)
    }

    pub fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// The stored value without interpolation.
    pub fn get_raw(&self, key: &str) -> Option<RawEntry> {
        self.inner.snapshot.load().get(key).cloned()
    }

    /// Interpolate arbitrary text against the live configuration.
    pub fn interpolate(&self, text: &str) -> Result<String> {
        let snapshot = self.inner.snapshot.load();
        Interpolator::new(&**snapshot).resolve_text(text)
    }

    pub fn get_int(&self, key: &str) -> Result<i32> {
        self.get_int_or(key, 0)
    }

    pub fn get_int_or(&self, key: &str, default: i32) -> Result<i32> {
        self.typed_or(key, TypedValue::Int(default))
            .map(|value| match value {
                TypedValue::Int(n) => n,
                _ => default,
            })
    }

    pub fn get_long(&self, key: &str) -> Result<i64> {
        self.get_long_or(key, 0)
    }

    pub fn get_long_or(&self, key: &str, default: i64) -> Result<i64> {
        self.typed_or(key, TypedValue::Long(default))
            .map(|value| match value {
                TypedValue::Long(n) => n,
                _ => default,
            })
    }

    pub fn get_boolean(&self, key: &str) -> Result<bool> {
        self.get_boolean_or(key, false)
    }

    pub fn get_boolean_or(&self, key: &str, default: bool) -> Result<bool> {
        self.typed_or(key, TypedValue::Boolean(default))
            .map(|value| value.as_bool().unwrap_or(default))
    }

    pub fn get_array(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .resolve(key)?
            .map(|resolved| resolved.into_array(self.inner.settings.array_separator))
            .unwrap_or_default())
    }

    pub fn get_array_or(&self, key: &str, default: &[&str]) -> Result<Vec<String>> {
        match self.resolve(key)? {
            Some(resolved) => Ok(resolved.into_array(self.inner.settings.array_separator)),
            None => Ok(default.iter().map(|s| s.to_string()).collect()),
        }
    }

    /// Read `key` as `target`.
    ///
    /// An absent key gives the type's zero value (`None` for strings); a
    /// value that cannot be coerced is a [`TypeCoercion`] error.
    ///
    /// [`TypeCoercion`]: crate::ConfigError::TypeCoercion
    pub fn get_as_type(&self, key: &str, target: TargetType) -> Result<Option<TypedValue>> {
        match self.resolve(key)? {
            Some(resolved) => coerce::coerce(
                key,
                resolved,
                target,
                self.inner.settings.array_separator,
            )
            .map(Some),
            None => Ok(TypedValue::zero(target)),
        }
    }

    /// Read `key` as the type of `default`, falling back to `default`.
    ///
    /// When `add_to_config` is set and the key is absent, the default is
    /// also stored in the live configuration (never in the backing files)
    /// so later plain reads see it.
    pub fn get_as_type_or(
        &self,
        key: &str,
        default: TypedValue,
        add_to_config: bool,
    ) -> Result<TypedValue> {
        if add_to_config && !self.has_property(key) {
            self.set(key, default.clone());
            tracing::debug!(key = %key, "Default value stored in configuration");
            return Ok(default);
        }
        self.typed_or(key, default)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.inner.snapshot.load().contains_key(key)
    }

    /// Keys equal to or nested under `prefix`; every key when `None`.
    pub fn property_keys(&self, prefix: Option<&str>) -> Vec<String> {
        self.inner.snapshot.load().property_keys(prefix)
    }

    /// Immediate child segments of `prefix`.
    pub fn children(&self, prefix: &str) -> Vec<String> {
        self.inner.snapshot.load().children(prefix)
    }

    /// Interpolated entries under `prefix`, with the prefix stripped.
    ///
    /// A multi-valued entry is returned as one string: its values joined
    /// with the array separator, separators inside a value escaped as
    /// `\<sep>`. Splitting that string the way `get_array` splits a single
    /// value gives the original values back.
    pub fn subset(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let snapshot = self.inner.snapshot.load();
        let interp = Interpolator::new(&**snapshot);
        let separator = self.inner.settings.array_separator;
        let full_prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}.", prefix)
        };
        snapshot
            .subset(prefix)
            .into_iter()
            .map(|(name, entry)| {
                let key = format!("{}{}", full_prefix, name);
                let value = match entry {
                    RawEntry::Single(raw) => interp.resolve_value(&key, raw)?,
                    RawEntry::Multi(raws) => {
                        let values = raws
                            .iter()
                            .map(|raw| interp.resolve_value(&key, raw))
                            .collect::<Result<Vec<_>>>()?;
                        join_escaped(&values, separator)
                    }
                };
                Ok((name, value))
            })
            .collect()
    }

    /// A view that prefixes every key with `module.` (no prefix for `None`).
    pub fn module(&self, module: Option<&str>) -> ScopedConfig<'_> {
        ScopedConfig::new(self, module)
    }

    /// Interpolate every value of `key`.
    fn resolve(&self, key: &str) -> Result<Option<Resolved>> {
        let snapshot = self.inner.snapshot.load();
        let Some(entry) = snapshot.get(key) else {
            return Ok(None);
        };
        let interp = Interpolator::new(&**snapshot);
        let values = entry
            .values()
            .iter()
            .map(|raw| interp.resolve_value(key, raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Resolved {
            values,
            multi: entry.is_multi(),
        }))
    }

    fn typed_or(&self, key: &str, default: TypedValue) -> Result<TypedValue> {
        let Some(resolved) = self.resolve(key)? else {
            return Ok(default);
        };
        let target = default.target();
        match coerce::coerce(key, resolved, target, self.inner.settings.array_separator) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::debug!(error = %e, "Using default value");
                Ok(default)
            }
        }
    }
}
