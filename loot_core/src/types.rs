use serde::{Deserialize, Serialize};

/// Core attributes every character and enemy carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Strength,
    Agility,
    Precision,
    Vitality,
    Endurance,
}

impl Attribute {
    pub fn all() -> &'static [Attribute] {
        &[
            Attribute::Strength,
            Attribute::Agility,
            Attribute::Precision,
            Attribute::Vitality,
            Attribute::Endurance,
        ]
    }
}

/// The five attribute scalars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default = "default_attribute")]
    pub strength: f64,
    #[serde(default = "default_attribute")]
    pub agility: f64,
    #[serde(default = "default_attribute")]
    pub precision: f64,
    #[serde(default = "default_attribute")]
    pub vitality: f64,
    #[serde(default = "default_attribute")]
    pub endurance: f64,
}

fn default_attribute() -> f64 {
    10.0
}

impl Default for Attributes {
    fn default() -> Self {
        Attributes::uniform(default_attribute())
    }
}

impl Attributes {
    pub fn uniform(value: f64) -> Self {
        Attributes {
            strength: value,
            agility: value,
            precision: value,
            vitality: value,
            endurance: value,
        }
    }

    pub fn get(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Agility => self.agility,
            Attribute::Precision => self.precision,
            Attribute::Vitality => self.vitality,
            Attribute::Endurance => self.endurance,
        }
    }

    pub fn get_mut(&mut self, attribute: Attribute) -> &mut f64 {
        match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Agility => &mut self.agility,
            Attribute::Precision => &mut self.precision,
            Attribute::Vitality => &mut self.vitality,
            Attribute::Endurance => &mut self.endurance,
        }
    }

    /// Sum of all five attributes
    pub fn total(&self) -> f64 {
        Attribute::all().iter().map(|a| self.get(*a)).sum()
    }

    /// Multiply every attribute, rounding to whole points
    pub fn scaled(&self, multiplier: f64) -> Self {
        Attributes {
            strength: (self.strength * multiplier).round(),
            agility: (self.agility * multiplier).round(),
            precision: (self.precision * multiplier).round(),
            vitality: (self.vitality * multiplier).round(),
            endurance: (self.endurance * multiplier).round(),
        }
    }
}

/// Damage types an attack can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    #[default]
    Physical,
    Fire,
    Ice,
    Lightning,
    Poison,
    Electric,
    Paralysis,
}

impl DamageType {
    pub fn all() -> &'static [DamageType] {
        &[
            DamageType::Physical,
            DamageType::Fire,
            DamageType::Ice,
            DamageType::Lightning,
            DamageType::Poison,
            DamageType::Electric,
            DamageType::Paralysis,
        ]
    }

    pub fn is_physical(&self) -> bool {
        matches!(self, DamageType::Physical)
    }
}

/// Per-type resistance percentages
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Resistances {
    pub physical: f64,
    pub fire: f64,
    pub ice: f64,
    pub lightning: f64,
    pub poison: f64,
    pub electric: f64,
    pub paralysis: f64,
}

impl Resistances {
    pub fn get(&self, damage_type: DamageType) -> f64 {
        match damage_type {
            DamageType::Physical => self.physical,
            DamageType::Fire => self.fire,
            DamageType::Ice => self.ice,
            DamageType::Lightning => self.lightning,
            DamageType::Poison => self.poison,
            DamageType::Electric => self.electric,
            DamageType::Paralysis => self.paralysis,
        }
    }

    pub fn get_mut(&mut self, damage_type: DamageType) -> &mut f64 {
        match damage_type {
            DamageType::Physical => &mut self.physical,
            DamageType::Fire => &mut self.fire,
            DamageType::Ice => &mut self.ice,
            DamageType::Lightning => &mut self.lightning,
            DamageType::Poison => &mut self.poison,
            DamageType::Electric => &mut self.electric,
            DamageType::Paralysis => &mut self.paralysis,
        }
    }

    /// Apply `f` to every resistance value
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = *self;
        for dt in DamageType::all() {
            *out.get_mut(*dt) = f(self.get(*dt));
        }
        out
    }
}

/// Item rarity tiers, ordered from lowest to highest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Ancient,
}

impl Rarity {
    pub fn all() -> &'static [Rarity] {
        &[
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Ancient,
        ]
    }

    /// The next tier up, or `None` for ancient
    pub fn next(&self) -> Option<Rarity> {
        match self {
            Rarity::Common => Some(Rarity::Uncommon),
            Rarity::Uncommon => Some(Rarity::Rare),
            Rarity::Rare => Some(Rarity::Epic),
            Rarity::Epic => Some(Rarity::Ancient),
            Rarity::Ancient => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Ancient => "ancient",
        }
    }
}

/// Broad item category used for affix applicability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotCategory {
    Weapon,
    Armor,
    Accessory,
}

/// Type tag of a base item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    // Weapons
    Melee,
    Ranged,
    Magic,
    // Armor
    Head,
    Chest,
    Hands,
    Legs,
    Feet,
    // Accessories
    Finger,
    Neck,
    Waist,
}

impl ItemKind {
    pub fn slot_category(&self) -> SlotCategory {
        match self {
            ItemKind::Melee | ItemKind::Ranged | ItemKind::Magic => SlotCategory::Weapon,
            ItemKind::Head | ItemKind::Chest | ItemKind::Hands | ItemKind::Legs | ItemKind::Feet => {
                SlotCategory::Armor
            }
            ItemKind::Finger | ItemKind::Neck | ItemKind::Waist => SlotCategory::Accessory,
        }
    }

    /// The equipment slot an item of this kind occupies
    pub fn equipment_slot(&self) -> EquipmentSlot {
        match self {
            ItemKind::Melee | ItemKind::Ranged | ItemKind::Magic => EquipmentSlot::Weapon,
            ItemKind::Head => EquipmentSlot::Head,
            ItemKind::Chest => EquipmentSlot::Chest,
            ItemKind::Hands => EquipmentSlot::Hands,
            ItemKind::Legs => EquipmentSlot::Legs,
            ItemKind::Feet => EquipmentSlot::Feet,
            ItemKind::Finger => EquipmentSlot::Ring,
            ItemKind::Neck => EquipmentSlot::Neck,
            ItemKind::Waist => EquipmentSlot::Waist,
        }
    }

    pub fn is_weapon(&self) -> bool {
        self.slot_category() == SlotCategory::Weapon
    }
}

/// Equipment slot on a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Weapon,
    Head,
    Chest,
    Hands,
    Legs,
    Feet,
    Ring,
    Neck,
    Waist,
}

impl EquipmentSlot {
    pub fn all() -> &'static [EquipmentSlot] {
        &[
            EquipmentSlot::Weapon,
            EquipmentSlot::Head,
            EquipmentSlot::Chest,
            EquipmentSlot::Hands,
            EquipmentSlot::Legs,
            EquipmentSlot::Feet,
            EquipmentSlot::Ring,
            EquipmentSlot::Neck,
            EquipmentSlot::Waist,
        ]
    }
}

/// Affix position on an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffixKind {
    Prefix,
    Suffix,
    Unique,
}

/// How an affix effect value is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModKind {
    #[default]
    Flat,
    Percentage,
}

/// Stats an affix effect can modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatType {
    #[serde(alias = "attack")]
    Damage,
    #[serde(alias = "armor")]
    Defense,
    CritChance,
    CritDamage,
    #[serde(alias = "dodge")]
    DodgeRate,
    #[serde(alias = "hit", alias = "accuracy")]
    HitRate,
    #[serde(alias = "penetration_rate")]
    Penetration,
    #[serde(alias = "max_health")]
    Health,
    Strength,
    Agility,
    Precision,
    Vitality,
    Endurance,
    PhysicalResistance,
    FireResistance,
    IceResistance,
    LightningResistance,
    PoisonResistance,
    ElectricResistance,
    ParalysisResistance,
    AllResistances,
}

impl StatType {
    /// The attribute this stat raises, if it is an attribute stat
    pub fn attribute(&self) -> Option<Attribute> {
        match self {
            StatType::Strength => Some(Attribute::Strength),
            StatType::Agility => Some(Attribute::Agility),
            StatType::Precision => Some(Attribute::Precision),
            StatType::Vitality => Some(Attribute::Vitality),
            StatType::Endurance => Some(Attribute::Endurance),
            _ => None,
        }
    }

    /// The damage type this stat resists, if it is a single resistance
    pub fn resistance(&self) -> Option<DamageType> {
        match self {
            StatType::PhysicalResistance => Some(DamageType::Physical),
            StatType::FireResistance => Some(DamageType::Fire),
            StatType::IceResistance => Some(DamageType::Ice),
            StatType::LightningResistance => Some(DamageType::Lightning),
            StatType::PoisonResistance => Some(DamageType::Poison),
            StatType::ElectricResistance => Some(DamageType::Electric),
            StatType::ParalysisResistance => Some(DamageType::Paralysis),
            _ => None,
        }
    }
}

/// Enemy classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnemyType {
    #[default]
    Normal,
    Elite,
    Boss,
}

impl EnemyType {
    /// Elites and bosses get a chance at a rarity upgrade
    pub fn has_rarity_bonus(&self) -> bool {
        matches!(self, EnemyType::Elite | EnemyType::Boss)
    }
}
