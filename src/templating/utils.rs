//! Utility functions for the templating system.

use serde_yaml::Value;

/// Deep merge `overrides` into `base`.
///
/// Mappings merge key by key, recursively. Every other override value
/// (sequence, scalar, null, tagged) replaces the base value wholesale, as
/// does a value whose category differs from the base.
///
/// # Examples
///
/// ```rust,no_run
/// use devops_cli::templating::merge_yaml;
///
/// let mut base: serde_yaml::Value =
///     serde_yaml::from_str("spec: {replicas: 1, ports: [80, 443]}").unwrap();
/// let overrides: serde_yaml::Value = serde_yaml::from_str("spec: {ports: [8080]}").unwrap();
///
/// merge_yaml(&mut base, &overrides);
/// // base: { spec: { replicas: 1, ports: [8080] } }
/// ```
pub fn merge_yaml(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Mapping(base_map), Value::Mapping(override_map)) => {
            for (key, override_value) in override_map {
                match base_map.get_mut(key) {
                    Some(base_value) => merge_yaml(base_value, override_value),
                    None => {
                        base_map.insert(key.clone(), override_value.clone());
                    }
                }
            }
        }
        (base, overrides) => *base = overrides.clone(),
    }
}
