//! Affix - Named stat modifiers rolled onto items

use crate::types::{AffixKind, ModKind, SlotCategory, StatType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single stat change carried by an affix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffixEffect {
    pub stat: StatType,
    #[serde(default)]
    pub kind: ModKind,
    pub value: f64,
}

impl AffixEffect {
    pub fn flat(stat: StatType, value: f64) -> Self {
        AffixEffect {
            stat,
            kind: ModKind::Flat,
            value,
        }
    }

    pub fn percentage(stat: StatType, value: f64) -> Self {
        AffixEffect {
            stat,
            kind: ModKind::Percentage,
            value,
        }
    }
}

/// Catalog affix definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affix {
    pub id: String,
    pub name: String,
    /// Slot categories this affix may roll on
    #[serde(default)]
    pub applicable_types: Vec<SlotCategory>,
    #[serde(default)]
    pub effects: Vec<AffixEffect>,
}

impl Affix {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Affix {
            id: id.into(),
            name: name.into(),
            applicable_types: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_applicable(mut self, category: SlotCategory) -> Self {
        self.applicable_types.push(category);
        self
    }

    pub fn with_effect(mut self, effect: AffixEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether this affix may roll on the given category.
    /// An empty applicability list matches nothing.
    pub fn applies_to(&self, category: SlotCategory) -> bool {
        self.applicable_types.contains(&category)
    }

    /// Copy of this affix with every effect value multiplied
    pub fn scaled(&self, factor: f64) -> Affix {
        let mut affix = self.clone();
        for effect in &mut affix.effects {
            effect.value *= factor;
        }
        affix
    }

    /// Value used as the strength of an inscription made from this affix
    pub fn primary_value(&self) -> f64 {
        self.effects.first().map(|e| e.value).unwrap_or(1.0)
    }
}

/// An affix placed on an item, in roll order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedAffix {
    pub kind: AffixKind,
    pub affix: Arc<Affix>,
}

impl AppliedAffix {
    pub fn new(kind: AffixKind, affix: Arc<Affix>) -> Self {
        AppliedAffix { kind, affix }
    }

    pub fn name(&self) -> &str {
        &self.affix.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applies_to() {
        let affix = Affix::new("sharp", "锋利的")
            .with_applicable(SlotCategory::Weapon)
            .with_effect(AffixEffect::flat(StatType::Damage, 5.0));

        assert!(affix.applies_to(SlotCategory::Weapon));
        assert!(!affix.applies_to(SlotCategory::Armor));
        assert!(!Affix::new("empty", "空").applies_to(SlotCategory::Weapon));
    }

    #[test]
    fn test_scaled_leaves_original() {
        let affix = Affix::new("sharp", "锋利的")
            .with_effect(AffixEffect::flat(StatType::Damage, 10.0))
            .with_effect(AffixEffect::percentage(StatType::CritChance, 4.0));

        let scaled = affix.scaled(1.5);
        assert!((scaled.effects[0].value - 15.0).abs() < f64::EPSILON);
        assert!((scaled.effects[1].value - 6.0).abs() < f64::EPSILON);
        assert!((affix.effects[0].value - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_primary_value_defaults_to_one() {
        assert!((Affix::new("x", "x").primary_value() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_effect_kind_defaults_to_flat() {
        let effect: AffixEffect =
            toml::from_str("stat = \"defense\"\nvalue = 12.0").unwrap();
        assert_eq!(effect.kind, ModKind::Flat);
        assert_eq!(effect.stat, StatType::Defense);
    }
}
