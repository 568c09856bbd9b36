//! Runtime configuration.
//!
//! [`RuntimeConfig`] gathers the knobs the platform reads at construction.
//! Values come from built-in defaults, optionally a TOML document, and
//! finally environment variables carrying a prefix:
//!
//! ```
//! use vireo_core::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_toml_str(r#"
//! public_path = "/assets/"
//! default_mode = "ios"
//! "#).unwrap();
//!
//! assert_eq!(config.public_path, "/assets/");
//! assert_eq!(config.module_timeout_ms, 120_000);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};

/// Environment prefix used by [`RuntimeConfig::from_env`].
pub const ENV_PREFIX: &str = "VIREO_";

/// What happens when a component writes to one of its read-only props.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadonlyPropPolicy {
	/// Log a warning and ignore the write.
	#[default]
	Warn,
	/// Return [`RuntimeError::ReadOnlyProp`].
	Error,
}

/// Platform configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
	/// URL prefix for module scripts and stylesheets.
	pub public_path: String,
	/// Mode used when a host carries no `mode` attribute.
	pub default_mode: String,
	/// Age after which an unfinished module request is abandoned.
	pub module_timeout_ms: u64,
	/// Medium-queue budget of a work frame.
	pub frame_budget_ms: u64,
	/// Medium-queue budget of a cooldown frame.
	pub cooldown_budget_ms: u64,
	/// Class added to a host once it has loaded.
	pub hydrated_class: String,
	pub readonly_prop_writes: ReadonlyPropPolicy,
	/// Prepended to every emitted event name.
	pub event_name_prefix: Option<String>,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self {
			public_path: "/build/".to_string(),
			default_mode: "md".to_string(),
			module_timeout_ms: 120_000,
			frame_budget_ms: 40,
			cooldown_budget_ms: 4,
			hydrated_class: "hydrated".to_string(),
			readonly_prop_writes: ReadonlyPropPolicy::Warn,
			event_name_prefix: None,
		}
	}
}

impl RuntimeConfig {
	/// Parses a TOML document; missing keys keep their defaults.
	pub fn from_toml_str(source: &str) -> RuntimeResult<Self> {
		Ok(toml::from_str(source)?)
	}

	/// Defaults overridden by `VIREO_*` environment variables.
	pub fn from_env() -> RuntimeResult<Self> {
		Self::default().with_env_overrides(ENV_PREFIX)
	}

	/// Applies `<prefix>PUBLIC_PATH`, `<prefix>DEFAULT_MODE` and
	/// `<prefix>MODULE_TIMEOUT_MS` from the process environment.
	pub fn with_env_overrides(self, prefix: &str) -> RuntimeResult<Self> {
		self.with_overrides(prefix, std::env::vars())
	}

	/// Applies overrides from an arbitrary key/value source.
	pub fn with_overrides<I>(mut self, prefix: &str, vars: I) -> RuntimeResult<Self>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		for (key, value) in vars {
			let Some(name) = key.strip_prefix(prefix) else {
				continue;
			};
			match name {
				"PUBLIC_PATH" => self.public_path = value,
				"DEFAULT_MODE" => self.default_mode = value,
				"MODULE_TIMEOUT_MS" => {
					self.module_timeout_ms = value.parse().map_err(|_| RuntimeError::InvalidEnvValue {
						key: key.clone(),
						value: value.clone(),
					})?;
				}
				_ => continue,
			}
			tracing::debug!(key = %key, "runtime config overridden from environment");
		}
		Ok(self)
	}

	pub fn module_timeout(&self) -> Duration {
		Duration::from_millis(self.module_timeout_ms)
	}

	pub fn frame_budget(&self) -> Duration {
		Duration::from_millis(self.frame_budget_ms)
	}

	pub fn cooldown_budget(&self) -> Duration {
		Duration::from_millis(self.cooldown_budget_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;
	use std::env;

	fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[rstest]
	fn test_defaults() {
		let config = RuntimeConfig::default();

		assert_eq!(config.public_path, "/build/");
		assert_eq!(config.default_mode, "md");
		assert_eq!(config.module_timeout(), Duration::from_secs(120));
		assert_eq!(config.frame_budget(), Duration::from_millis(40));
		assert_eq!(config.cooldown_budget(), Duration::from_millis(4));
		assert_eq!(config.hydrated_class, "hydrated");
		assert_eq!(config.readonly_prop_writes, ReadonlyPropPolicy::Warn);
	}

	#[rstest]
	fn test_from_toml_keeps_missing_defaults() {
		let config = RuntimeConfig::from_toml_str(
			r#"
readonly_prop_writes = "error"
event_name_prefix = "app:"
frame_budget_ms = 16
"#,
		)
		.unwrap();

		assert_eq!(config.readonly_prop_writes, ReadonlyPropPolicy::Error);
		assert_eq!(config.event_name_prefix.as_deref(), Some("app:"));
		assert_eq!(config.frame_budget_ms, 16);
		assert_eq!(config.public_path, "/build/");
	}

	#[rstest]
	fn test_from_toml_rejects_bad_types() {
		let err = RuntimeConfig::from_toml_str("module_timeout_ms = \"soon\"").unwrap_err();
		assert!(matches!(err, RuntimeError::Config(_)));
	}

	#[rstest]
	fn test_overrides_only_apply_prefixed_keys() {
		let config = RuntimeConfig::default()
			.with_overrides(
				"VIREO_",
				vars(&[
					("VIREO_PUBLIC_PATH", "/cdn/"),
					("VIREO_MODULE_TIMEOUT_MS", "500"),
					("DEFAULT_MODE", "ios"),
					("VIREO_UNKNOWN", "x"),
				]),
			)
			.unwrap();

		assert_eq!(config.public_path, "/cdn/");
		assert_eq!(config.module_timeout_ms, 500);
		assert_eq!(config.default_mode, "md");
	}

	#[rstest]
	fn test_overrides_reject_non_numeric_timeout() {
		let err = RuntimeConfig::default()
			.with_overrides("VIREO_", vars(&[("VIREO_MODULE_TIMEOUT_MS", "later")]))
			.unwrap_err();

		assert!(matches!(err, RuntimeError::InvalidEnvValue { .. }));
	}

	#[rstest]
	#[serial]
	fn test_from_env() {
		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			env::set_var("VIREO_DEFAULT_MODE", "ios");
		}

		let config = RuntimeConfig::from_env().unwrap();

		// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			env::remove_var("VIREO_DEFAULT_MODE");
		}
		assert_eq!(config.default_mode, "ios");
	}
}
