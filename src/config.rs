use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, Result};

/// Host-owned persisted preferences read by the selection operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Default coplanar tolerance, updated when a coplanar gesture commits.
    pub coplanar_threshold: f64,
    /// Whether the host records the order in which components were picked.
    pub track_selection_order: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            coplanar_threshold: 0.1,
            track_selection_order: false,
        }
    }
}

/// Tunables of the selection operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    pub coplanar: CoplanarConfig,
    pub toggle: ToggleConfig,
}

/// Bounds and scaling of the coplanar tolerance gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoplanarConfig {
    pub min: f64,
    pub max: f64,
    /// Tolerance change per unit of gesture delta.
    pub drag_scale: f64,
    /// Multiplier applied to the live tolerance in contiguous growth.
    pub contiguous_factor: f64,
}

impl Default for CoplanarConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            drag_scale: 0.001,
            contiguous_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleConfig {
    /// Cross-product bound under which two border edges count as parallel.
    pub parallel_tolerance: f64,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            parallel_tolerance: 1e-3,
        }
    }
}

/// A bounded scalar with a committed default and a live gesture value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    min: f64,
    max: f64,
    default: f64,
    live: f64,
}

impl Tolerance {
    /// Creates a tolerance whose live value starts at `default`.
    ///
    /// # Errors
    ///
    /// Returns an error if `min > max` or `default` lies outside `[min, max]`.
    pub fn new(min: f64, max: f64, default: f64) -> Result<Self> {
        if min > max || !(min..=max).contains(&default) {
            return Err(ParameterError::OutOfRange {
                parameter: "tolerance",
                value: default,
                min,
                max,
            }
            .into());
        }
        Ok(Self {
            min,
            max,
            default,
            live: default,
        })
    }

    /// Creates a tolerance bounded by the coplanar configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `default` is out of the configured bounds.
    pub fn coplanar(config: &CoplanarConfig, default: f64) -> Result<Self> {
        Self::new(config.min, config.max, default)
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn default_value(&self) -> f64 {
        self.default
    }

    #[must_use]
    pub fn live(&self) -> f64 {
        self.live
    }

    /// Sets the live value, clamped to the bounds.
    pub fn set_live(&mut self, value: f64) {
        self.live = value.clamp(self.min, self.max);
    }

    /// Sets the live value relative to the default: `default + delta × scale`.
    pub fn drag(&mut self, delta: f64, scale: f64) {
        self.set_live(self.default + delta * scale);
    }

    /// Makes the live value the new default.
    pub fn commit(&mut self) {
        self.default = self.live;
    }

    /// Restores the live value to the default.
    pub fn reset(&mut self) {
        self.live = self.default;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MeshselError;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_default_outside_bounds() {
        let err = Tolerance::new(0.0, 1.0, 1.5).unwrap_err();
        assert!(matches!(
            err,
            MeshselError::Parameter(ParameterError::OutOfRange { value, .. }) if value == 1.5
        ));
        assert!(Tolerance::new(1.0, 0.0, 0.5).is_err());
    }

    #[test]
    fn drag_is_relative_to_default_and_clamped() {
        let mut t = Tolerance::new(0.0, 1.0, 0.1).unwrap();
        t.drag(100.0, 0.001);
        assert_relative_eq!(t.live(), 0.2, epsilon = 1e-12);
        t.drag(50.0, 0.001);
        assert_relative_eq!(t.live(), 0.15, epsilon = 1e-12);
        t.drag(-1000.0, 0.001);
        assert_relative_eq!(t.live(), 0.0);
        t.drag(5000.0, 0.001);
        assert_relative_eq!(t.live(), 1.0);
    }

    #[test]
    fn commit_moves_the_anchor() {
        let mut t = Tolerance::new(0.0, 1.0, 0.1).unwrap();
        t.drag(100.0, 0.001);
        t.commit();
        t.drag(100.0, 0.001);
        assert_relative_eq!(t.live(), 0.3, epsilon = 1e-12);
        t.reset();
        assert_relative_eq!(t.live(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn partial_preferences_fill_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"track_selection_order": true}"#).unwrap();
        assert!(prefs.track_selection_order);
        assert_relative_eq!(prefs.coplanar_threshold, 0.1);

        let config: SelectConfig =
            serde_json::from_str(r#"{"coplanar": {"drag_scale": 0.01}}"#).unwrap();
        assert_relative_eq!(config.coplanar.drag_scale, 0.01);
        assert_relative_eq!(config.coplanar.contiguous_factor, 2.0);
        assert_relative_eq!(config.toggle.parallel_tolerance, 1e-3);
    }
}
