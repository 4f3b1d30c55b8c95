//! Elemental type effectiveness

use ahash::AHashMap;

use crate::core::config::TypeChartEntry;
use crate::core::types::Element;

/// Multiplier applied when an attack element strikes a strong matchup
pub const SUPER_EFFECTIVE: f64 = 1.5;
/// Multiplier applied to the reverse direction of a strong matchup
pub const NOT_VERY_EFFECTIVE: f64 = 0.75;

#[derive(Debug, Clone)]
pub struct TypeChart {
    entries: AHashMap<(Element, Element), f64>,
}

impl TypeChart {
    /// Chart with no matchups (every multiplier is 1.0)
    pub fn neutral() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    /// The standard elemental cycle plus light/shadow opposition
    pub fn builtin() -> Self {
        use Element::*;

        let mut chart = Self::neutral();
        for (strong, weak) in [(Fire, Nature), (Water, Fire), (Nature, Water)] {
            chart.set(strong, weak, SUPER_EFFECTIVE);
            chart.set(weak, strong, NOT_VERY_EFFECTIVE);
        }
        chart.set(Light, Shadow, SUPER_EFFECTIVE);
        chart.set(Shadow, Light, SUPER_EFFECTIVE);
        chart
    }

    /// Built-in chart with config entries layered on top
    pub fn with_overrides(entries: &[TypeChartEntry]) -> Self {
        let mut chart = Self::builtin();
        for entry in entries {
            chart.set(entry.attacker, entry.defender, entry.multiplier);
        }
        chart
    }

    pub fn set(&mut self, attacker: Element, defender: Element, multiplier: f64) {
        self.entries.insert((attacker, defender), multiplier);
    }

    /// 1.0 when either side has no element
    pub fn multiplier(&self, attack: Option<Element>, defender: Option<Element>) -> f64 {
        match (attack, defender) {
            (Some(a), Some(d)) => self.entries.get(&(a, d)).copied().unwrap_or(1.0),
            _ => 1.0,
        }
    }
}

impl Default for TypeChart {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_cycle() {
        let chart = TypeChart::builtin();
        assert_eq!(chart.multiplier(Some(Element::Fire), Some(Element::Nature)), 1.5);
        assert_eq!(chart.multiplier(Some(Element::Nature), Some(Element::Fire)), 0.75);
        assert_eq!(chart.multiplier(Some(Element::Light), Some(Element::Shadow)), 1.5);
        assert_eq!(chart.multiplier(Some(Element::Arcane), Some(Element::Fire)), 1.0);
    }

    #[test]
    fn test_missing_element_is_neutral() {
        let chart = TypeChart::builtin();
        assert_eq!(chart.multiplier(None, Some(Element::Fire)), 1.0);
        assert_eq!(chart.multiplier(Some(Element::Water), None), 1.0);
    }

    #[test]
    fn test_overrides_replace_builtin() {
        let chart = TypeChart::with_overrides(&[TypeChartEntry {
            attacker: Element::Fire,
            defender: Element::Fire,
            multiplier: 0.0,
        }]);
        assert_eq!(chart.multiplier(Some(Element::Fire), Some(Element::Fire)), 0.0);
        assert_eq!(chart.multiplier(Some(Element::Fire), Some(Element::Nature)), 1.5);
    }
}
