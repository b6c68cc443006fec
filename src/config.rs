//! Generator configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Strategy used to turn a walked argument graph into a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum KeyDerivation {
    /// Immutable nested sequence compared by deep equality.
    #[default]
    Structural,

    /// Single 64-bit polynomial hash.
    HashCode,
}

/// Configuration options for a key generator.
///
/// Set once when the generator is built; generators never mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KeyGeneratorConfig {
    /// Prefix the key with the invoked method's name.
    pub include_method_name: bool,
    /// Prefix the key with the declaring type and the parameter types.
    pub include_declaring_type_and_param_types: bool,
    /// Cut circular references with a cycle marker. When off, a cyclic
    /// argument graph recurses until the stack overflows.
    pub check_for_cycles: bool,
    /// Decompose reflectable objects field by field instead of comparing
    /// them by identity.
    pub use_reflection: bool,
    /// Key strategy selected by [`KeyGenerator`](crate::KeyGenerator).
    pub derivation: KeyDerivation,
}

impl Default for KeyGeneratorConfig {
    fn default() -> Self {
        Self {
            include_method_name: true,
            include_declaring_type_and_param_types: true,
            check_for_cycles: true,
            use_reflection: false,
            derivation: KeyDerivation::default(),
        }
    }
}

impl KeyGeneratorConfig {
    /// Configuration that keys on argument values alone.
    pub fn arguments_only() -> Self {
        Self {
            include_method_name: false,
            include_declaring_type_and_param_types: false,
            ..Self::default()
        }
    }

    /// Sets whether the method name is part of the key.
    pub fn with_method_name(mut self, include: bool) -> Self {
        self.include_method_name = include;
        self
    }

    /// Sets whether the declaring type and parameter types are part of the key.
    pub fn with_signature_types(mut self, include: bool) -> Self {
        self.include_declaring_type_and_param_types = include;
        self
    }

    /// Sets whether circular references are detected.
    pub fn with_cycle_check(mut self, check: bool) -> Self {
        self.check_for_cycles = check;
        self
    }

    /// Sets whether reflectable objects are decomposed.
    pub fn with_reflection(mut self, enabled: bool) -> Self {
        self.use_reflection = enabled;
        self
    }

    /// Sets the key strategy.
    pub fn with_derivation(mut self, derivation: KeyDerivation) -> Self {
        self.derivation = derivation;
        self
    }

    /// Returns true if any signature prefix is enabled.
    pub fn includes_signature(&self) -> bool {
        self.include_method_name || self.include_declaring_type_and_param_types
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(crate::Error::config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KeyGeneratorConfig::default();
        assert!(config.include_method_name);
        assert!(config.include_declaring_type_and_param_types);
        assert!(config.check_for_cycles);
        assert!(!config.use_reflection);
        assert_eq!(config.derivation, KeyDerivation::Structural);
    }

    #[test]
    fn test_builder_methods() {
        let config = KeyGeneratorConfig::arguments_only()
            .with_cycle_check(false)
            .with_reflection(true)
            .with_derivation(KeyDerivation::HashCode);
        assert!(!config.includes_signature());
        assert!(!config.check_for_cycles);
        assert!(config.use_reflection);
        assert_eq!(config.derivation, KeyDerivation::HashCode);

        assert!(config.with_method_name(true).includes_signature());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: KeyGeneratorConfig =
            serde_json::from_str(r#"{"use_reflection": true, "derivation": "hash_code"}"#)
                .unwrap();
        assert!(config.use_reflection);
        assert!(config.check_for_cycles);
        assert_eq!(config.derivation, KeyDerivation::HashCode);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_from_json_reports_config_errors() {
        let err = KeyGeneratorConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
