//! ActorBlueprint - blueprint library entries
//!
//! A blueprint is a template the simulator instantiates actors from. The
//! library hands out copies; attribute changes only affect the copy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Single blueprint attribute
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlueprintAttribute {
    /// Current value, always stored as the simulator's string form
    pub value: String,

    /// Values the simulator suggests (e.g. vehicle paint colors)
    #[serde(default)]
    pub recommended_values: Vec<String>,

    #[serde(default = "default_modifiable")]
    pub modifiable: bool,
}

fn default_modifiable() -> bool {
    true
}

impl BlueprintAttribute {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            recommended_values: Vec::new(),
            modifiable: true,
        }
    }

    pub fn with_recommended<I, S>(value: impl Into<String>, recommended: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: value.into(),
            recommended_values: recommended.into_iter().map(Into::into).collect(),
            modifiable: true,
        }
    }

    pub fn read_only(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            recommended_values: Vec::new(),
            modifiable: false,
        }
    }
}

/// Actor blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorBlueprint {
    /// Blueprint id (e.g., "vehicle.tesla.model3")
    pub id: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, BlueprintAttribute>,
}

impl ActorBlueprint {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute insertion
    pub fn with_attribute(mut self, key: impl Into<String>, attribute: BlueprintAttribute) -> Self {
        self.attributes.insert(key.into(), attribute);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn attribute(&self, key: &str) -> Option<&BlueprintAttribute> {
        self.attributes.get(key)
    }

    /// Shortcut for the current value of an attribute
    pub fn attribute_value(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|a| a.value.as_str())
    }

    /// Set an attribute value
    ///
    /// # Errors
    /// - attribute does not exist
    /// - attribute is read-only
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) -> Result<(), ContractError> {
        let attribute = self
            .attributes
            .get_mut(key)
            .ok_or_else(|| ContractError::unknown_attribute(&self.id, key))?;

        if !attribute.modifiable {
            return Err(ContractError::ReadOnlyAttribute {
                blueprint: self.id.clone(),
                attribute: key.to_string(),
            });
        }

        attribute.value = value.into();
        Ok(())
    }

    /// Library filter semantics: the id or any tag matches the wildcard
    pub fn matches(&self, pattern: &str) -> bool {
        wildcard_match(pattern, &self.id) || self.tags.iter().any(|t| wildcard_match(pattern, t))
    }

    /// Attribute values as plain key/value pairs, in key order
    pub fn attribute_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, a)| (k.as_str(), a.value.as_str()))
    }
}

/// fnmatch-style wildcard match: `*` any run, `?` any single char
///
/// Used for both blueprint and actor filters (`vehicle.*`, `sensor.camera.?gb`).
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0usize, 0usize);
    // Last `*` position in the pattern and the text index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        match p.get(pi) {
            Some('*') => {
                backtrack = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == '?' || c == t[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    pi = star + 1;
                    ti = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model3() -> ActorBlueprint {
        ActorBlueprint::new("vehicle.tesla.model3")
            .with_tags(["vehicle", "tesla", "model3"])
            .with_attribute(
                "color",
                BlueprintAttribute::with_recommended("17,37,103", ["17,37,103", "255,255,255"]),
            )
            .with_attribute("role_name", BlueprintAttribute::new("autopilot"))
            .with_attribute("number_of_wheels", BlueprintAttribute::read_only("4"))
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("vehicle.*", "vehicle.tesla.model3"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("*.model3", "vehicle.tesla.model3"));
        assert!(wildcard_match("sensor.camera.?gb", "sensor.camera.rgb"));
        assert!(wildcard_match("*tesla*", "vehicle.tesla.model3"));
        assert!(!wildcard_match("vehicle.*", "walker.pedestrian.0001"));
        assert!(!wildcard_match("vehicle", "vehicle.tesla.model3"));
        assert!(!wildcard_match("sensor.camera.?", "sensor.camera.rgb"));
    }

    #[test]
    fn test_matches_tags() {
        let bp = model3();
        assert!(bp.matches("tesla"));
        assert!(bp.matches("vehicle.*"));
        assert!(!bp.matches("walker*"));
    }

    #[test]
    fn test_set_attribute() {
        let mut bp = model3();
        bp.set_attribute("color", "255,255,255").unwrap();
        assert_eq!(bp.attribute_value("color"), Some("255,255,255"));

        let err = bp.set_attribute("missing", "1").unwrap_err();
        assert!(matches!(err, ContractError::UnknownAttribute { .. }));

        let err = bp.set_attribute("number_of_wheels", "6").unwrap_err();
        assert!(matches!(err, ContractError::ReadOnlyAttribute { .. }));
        assert_eq!(bp.attribute_value("number_of_wheels"), Some("4"));
    }
}
