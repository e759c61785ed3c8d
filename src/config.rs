use std::{
    collections::HashMap,
    fs::read_to_string,
    path::{Path, PathBuf},
};

use egui::Color32;
use log::warn;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::game::weapon::{WeaponId, WeaponType};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));
/// Wildcard key every lookup falls back to.
pub const ALL: &str = "All";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub esp: EspConfig,
    pub fog: FogConfig,
    pub fonts: HashMap<String, FontConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorToggle {
    pub enabled: bool,
    pub color: Color32,
    pub rainbow: bool,
    pub rainbow_speed: f32,
}

impl ColorToggle {
    pub fn enabled(color: Color32) -> Self {
        Self {
            enabled: true,
            color,
            ..Default::default()
        }
    }
}

impl Default for ColorToggle {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color32::WHITE,
            rainbow: false,
            rainbow_speed: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorToggleThickness {
    pub color: ColorToggle,
    pub thickness: f32,
}

impl Default for ColorToggleThickness {
    fn default() -> Self {
        Self {
            color: ColorToggle::default(),
            thickness: 1.0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxType {
    #[default]
    Flat,
    FlatCorners,
    Volume,
    VolumeCorners,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxStyle {
    pub color: ColorToggle,
    pub kind: BoxType,
    /// Per axis; 0.25 keeps the entity's own bounds.
    pub scale: [f32; 3],
    pub fill: ColorToggle,
    pub rounding: f32,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            color: ColorToggle::default(),
            kind: BoxType::Flat,
            scale: [0.25; 3],
            fill: ColorToggle {
                color: Color32::from_white_alpha(76),
                ..Default::default()
            },
            rounding: 0.0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnaplineType {
    #[default]
    Bottom,
    Top,
    Crosshair,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapline {
    pub color: ColorToggle,
    pub kind: SnaplineType,
    pub thickness: f32,
}

impl Default for Snapline {
    fn default() -> Self {
        Self {
            color: ColorToggle::default(),
            kind: SnaplineType::Bottom,
            thickness: 1.0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBarType {
    #[default]
    Gradient,
    Solid,
    HealthBased,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthBar {
    pub color: ColorToggle,
    pub kind: HealthBarType,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailType {
    #[default]
    Line,
    Circles,
    FilledCircles,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trail {
    pub color: ColorToggle,
    pub kind: TrailType,
    /// Seconds of history drawn.
    pub time: f32,
    pub thickness: f32,
}

impl Default for Trail {
    fn default() -> Self {
        Self {
            color: ColorToggle::default(),
            kind: TrailType::Line,
            time: 2.0,
            thickness: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trails {
    pub enabled: bool,
    pub local_player: Trail,
    pub allies: Trail,
    pub enemies: Trail,
}

/// Point sizes of one font family, picked by distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub big: f32,
    pub medium: f32,
    pub tiny: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            big: 15.0,
            medium: 13.0,
            tiny: 10.0,
        }
    }
}

/// Style shared by everything that gets a box and a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedEsp {
    pub enabled: bool,
    pub font: String,
    pub snapline: Snapline,
    pub box_style: BoxStyle,
    pub name: ColorToggle,
    /// Meters, 0 disables culling.
    pub text_cull_distance: f32,
}

impl SharedEsp {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }
}

impl Default for SharedEsp {
    fn default() -> Self {
        Self {
            enabled: false,
            font: String::new(),
            snapline: Snapline::default(),
            box_style: BoxStyle::default(),
            name: ColorToggle::default(),
            text_cull_distance: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponEsp {
    pub shared: SharedEsp,
    pub ammo: ColorToggle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileEsp {
    pub shared: SharedEsp,
    pub trails: Trails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerEsp {
    pub shared: SharedEsp,
    pub weapon: ColorToggle,
    pub weapon_icon: ColorToggle,
    pub flash_duration: ColorToggle,
    pub audible_only: bool,
    pub spotted_only: bool,
    pub health_bar: HealthBar,
    pub skeleton: ColorToggleThickness,
    pub line_of_sight: ColorToggleThickness,
    pub head_box: BoxStyle,
}

impl Default for PlayerEsp {
    fn default() -> Self {
        Self {
            shared: SharedEsp::default(),
            weapon: ColorToggle::default(),
            weapon_icon: ColorToggle::default(),
            flash_duration: ColorToggle::default(),
            audible_only: false,
            spotted_only: false,
            health_bar: HealthBar::default(),
            skeleton: ColorToggleThickness::default(),
            line_of_sight: ColorToggleThickness::default(),
            head_box: BoxStyle {
                kind: BoxType::Volume,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EspConfig {
    /// Master toggle, normally bound to a hotkey.
    pub enabled: bool,
    /// Keyed "All", "Visible" and "Occluded".
    pub allies: HashMap<String, PlayerEsp>,
    pub enemies: HashMap<String, PlayerEsp>,
    /// Keyed by weapon name, weapon group or "All".
    pub weapons: HashMap<String, WeaponEsp>,
    /// Keyed by projectile name or "All".
    pub projectiles: HashMap<String, ProjectileEsp>,
    pub other_entities: HashMap<String, SharedEsp>,
    pub loot_crates: HashMap<String, SharedEsp>,
}

impl Default for EspConfig {
    fn default() -> Self {
        let players = || {
            ["All", "Visible", "Occluded"]
                .into_iter()
                .map(|key| (key.to_owned(), PlayerEsp::default()))
                .collect()
        };

        let mut weapons = HashMap::from([(ALL.to_owned(), WeaponEsp::default())]);
        for weapon in WeaponId::iter() {
            weapons
                .entry(weapon.name().to_owned())
                .or_insert_with(WeaponEsp::default);
        }
        for kind in [
            WeaponType::Pistol,
            WeaponType::SubMachinegun,
            WeaponType::Rifle,
            WeaponType::SniperRifle,
            WeaponType::Shotgun,
            WeaponType::Machinegun,
            WeaponType::Grenade,
            WeaponType::Melee,
        ] {
            weapons
                .entry(WeaponId::None.group(kind).to_owned())
                .or_insert_with(WeaponEsp::default);
        }
        weapons.insert("Other".to_owned(), WeaponEsp::default());

        Self {
            enabled: true,
            allies: players(),
            enemies: players(),
            weapons,
            projectiles: HashMap::from([(ALL.to_owned(), ProjectileEsp::default())]),
            other_entities: HashMap::from([(ALL.to_owned(), SharedEsp::default())]),
            loot_crates: HashMap::from([(ALL.to_owned(), SharedEsp::default())]),
        }
    }
}

impl EspConfig {
    /// First enabled of the weapon's own entry, its group, then "All".
    pub fn weapon(&self, name: &str, group: &str) -> Option<&WeaponEsp> {
        [name, group, ALL]
            .into_iter()
            .filter_map(|key| self.weapons.get(key))
            .find(|config| config.shared.enabled)
    }

    /// The projectile's own entry when enabled, otherwise "All".
    pub fn projectile(&self, name: &str) -> Option<&ProjectileEsp> {
        [name, ALL]
            .into_iter()
            .filter_map(|key| self.projectiles.get(key))
            .find(|config| config.shared.enabled)
    }

    /// Lookup for name keyed maps such as `other_entities` and `loot_crates`.
    pub fn shared<'a>(map: &'a HashMap<String, SharedEsp>, name: &str) -> Option<&'a SharedEsp> {
        [name, ALL]
            .into_iter()
            .filter_map(|key| map.get(key))
            .find(|config| config.enabled)
    }

    pub fn players(&self, enemy: bool) -> &HashMap<String, PlayerEsp> {
        if enemy { &self.enemies } else { &self.allies }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    /// Leave the world fog untouched.
    pub no_fog: bool,
    pub enabled: bool,
    /// RGB in 0..=1.
    pub color: [f32; 3],
    pub rainbow: bool,
    pub rainbow_speed: f32,
    pub start: f32,
    pub end: f32,
    pub density: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            no_fog: true,
            enabled: false,
            color: [1.0; 3],
            rainbow: false,
            rainbow_speed: 0.6,
            start: 0.0,
            end: 0.0,
            density: 0.0,
        }
    }
}

pub fn get_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(CONFIG_FILE_NAME)
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config_string = read_to_string(path)?;
    Ok(toml::from_str(&config_string)?)
}

/// Loads the config, falling back to defaults when the file is missing or broken.
pub fn parse_config(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match load_config(path) {
        Ok(config) => config,
        Err(error) => {
            warn!("{error}, using defaults");
            Config::default()
        }
    }
}

pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let out = toml::to_string(config)?;
    std::fs::write(path, out)?;
    Ok(())
}
