//! Agent configuration types
//!
//! [`Configuration`] is the operator-editable description of how the agent
//! should behave. Every field has a default, so a partial document from the
//! server (or none at all) still yields a complete record.

use serde::{Deserialize, Serialize};

use super::identifiers::WaypointId;

// ============================================================================
// Waypoints
// ============================================================================

/// Route traversal mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointMode {
    /// Restart from the first waypoint after the last
    #[default]
    Loop,
    /// Walk the route forwards, then backwards
    BackAndForth,
    /// Walk the route once and stop
    Once,
}

/// Named coordinate pair on the patrol route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Identifier (server-issued or provisional)
    pub id: WaypointId,
    /// Display name
    pub name: String,
    /// X coordinate
    pub x: i64,
    /// Y coordinate
    pub y: i64,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of a create-waypoint request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewWaypoint {
    /// Display name
    pub name: String,
    /// X coordinate
    pub x: i64,
    /// Y coordinate
    pub y: i64,
    /// Free-text description
    pub description: String,
}

impl NewWaypoint {
    /// Attach an identifier, producing the locally stored record
    #[must_use]
    pub fn with_id(self, id: WaypointId) -> Waypoint {
        Waypoint {
            id,
            name: self.name,
            x: self.x,
            y: self.y,
            description: Some(self.description),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Desired agent behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Server-assigned document id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Profile name
    pub name: String,
    pub auto_heal: bool,
    pub auto_food: bool,
    pub auto_attack: bool,
    pub auto_walk: bool,
    pub auto_loot: bool,
    pub heal_spell: String,
    /// Cast `heal_spell` below this HP percentage
    pub heal_at_hp: u32,
    pub heal_mana_spell: String,
    /// Cast `heal_mana_spell` below this MP percentage
    pub heal_at_mp: u32,
    pub attack_spell: String,
    pub food_type: String,
    /// Eat when the food indicator drops below this value
    pub food_at: u32,
    pub food_hotkey: String,
    /// Patrol route, in traversal order
    pub waypoints: Vec<Waypoint>,
    pub waypoint_mode: WaypointMode,
    /// Pause between waypoints in milliseconds
    pub waypoint_delay: u64,
    pub target_creatures: Vec<String>,
    pub loot_items: Vec<String>,
    pub discard_items: Vec<String>,
    /// Loot everything, then drop `discard_items`
    pub loot_all_and_filter: bool,
    /// Looting radius in squares
    pub loot_range: u32,
    pub anti_idle: bool,
    /// Log out below this HP percentage
    pub emergency_logout_hp: u32,
    pub enabled: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            id: None,
            name: "My Tibia Bot".to_string(),
            auto_heal: true,
            auto_food: true,
            auto_attack: true,
            auto_walk: false,
            auto_loot: true,
            heal_spell: "exura".to_string(),
            heal_at_hp: 70,
            heal_mana_spell: "exura gran".to_string(),
            heal_at_mp: 50,
            attack_spell: "exori".to_string(),
            food_type: "ham".to_string(),
            food_at: 90,
            food_hotkey: "F1".to_string(),
            waypoints: Vec::new(),
            waypoint_mode: WaypointMode::Loop,
            waypoint_delay: 1000,
            target_creatures: strings(&["rat", "rotworm", "cyclops"]),
            loot_items: strings(&["gold coin", "platinum coin", "crystal coin"]),
            discard_items: strings(&["leather armor", "studded armor", "chain armor"]),
            loot_all_and_filter: true,
            loot_range: 3,
            anti_idle: true,
            emergency_logout_hp: 10,
            enabled: false,
        }
    }
}

impl Configuration {
    /// Position of a waypoint in the route
    #[must_use]
    pub fn waypoint_index(&self, id: &WaypointId) -> Option<usize> {
        self.waypoints.iter().position(|wp| &wp.id == id)
    }

    /// Apply a single-field edit
    pub fn apply(&mut self, edit: ConfigEdit) {
        match edit {
            ConfigEdit::Name(v) => self.name = v,
            ConfigEdit::AutoHeal(v) => self.auto_heal = v,
            ConfigEdit::AutoFood(v) => self.auto_food = v,
            ConfigEdit::AutoAttack(v) => self.auto_attack = v,
            ConfigEdit::AutoWalk(v) => self.auto_walk = v,
            ConfigEdit::AutoLoot(v) => self.auto_loot = v,
            ConfigEdit::AntiIdle(v) => self.anti_idle = v,
            ConfigEdit::LootAllAndFilter(v) => self.loot_all_and_filter = v,
            ConfigEdit::HealSpell(v) => self.heal_spell = v,
            ConfigEdit::HealAtHp(v) => self.heal_at_hp = v,
            ConfigEdit::HealManaSpell(v) => self.heal_mana_spell = v,
            ConfigEdit::HealAtMp(v) => self.heal_at_mp = v,
            ConfigEdit::AttackSpell(v) => self.attack_spell = v,
            ConfigEdit::FoodType(v) => self.food_type = v,
            ConfigEdit::FoodAt(v) => self.food_at = v,
            ConfigEdit::FoodHotkey(v) => self.food_hotkey = v,
            ConfigEdit::EmergencyLogoutHp(v) => self.emergency_logout_hp = v,
            ConfigEdit::WaypointMode(v) => self.waypoint_mode = v,
            ConfigEdit::WaypointDelay(v) => self.waypoint_delay = v,
            ConfigEdit::LootRange(v) => self.loot_range = v,
            ConfigEdit::Enabled(v) => self.enabled = v,
            ConfigEdit::TargetCreatures(v) => self.target_creatures = v,
            ConfigEdit::LootItems(v) => self.loot_items = v,
            ConfigEdit::DiscardItems(v) => self.discard_items = v,
        }
    }
}

/// A single-field operator edit
///
/// Waypoints are deliberately absent: they change only through the
/// capture and delete flows.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEdit {
    Name(String),
    AutoHeal(bool),
    AutoFood(bool),
    AutoAttack(bool),
    AutoWalk(bool),
    AutoLoot(bool),
    AntiIdle(bool),
    LootAllAndFilter(bool),
    HealSpell(String),
    HealAtHp(u32),
    HealManaSpell(String),
    HealAtMp(u32),
    AttackSpell(String),
    FoodType(String),
    FoodAt(u32),
    FoodHotkey(String),
    EmergencyLogoutHp(u32),
    WaypointMode(WaypointMode),
    WaypointDelay(u64),
    LootRange(u32),
    Enabled(bool),
    TargetCreatures(Vec<String>),
    LootItems(Vec<String>),
    DiscardItems(Vec<String>),
}

impl ConfigEdit {
    /// Target creatures from comma-delimited text
    #[must_use]
    pub fn target_creatures_from_text(text: &str) -> Self {
        Self::TargetCreatures(crate::format::parse_list(text))
    }

    /// Loot items from comma-delimited text
    #[must_use]
    pub fn loot_items_from_text(text: &str) -> Self {
        Self::LootItems(crate::format::parse_list(text))
    }

    /// Discard items from comma-delimited text
    #[must_use]
    pub fn discard_items_from_text(text: &str) -> Self {
        Self::DiscardItems(crate::format::parse_list(text))
    }
}
