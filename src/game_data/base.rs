use std::cmp::Ordering;

use glam::{Affine3A, Vec3};

use crate::game::{ClassId, Entity, Game};

/// Placement shared by every drawable record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseData {
    pub distance_to_local: f32,
    pub obb_mins: Vec3,
    pub obb_maxs: Vec3,
    pub coordinate_frame: Affine3A,
}

impl Default for BaseData {
    fn default() -> Self {
        Self {
            distance_to_local: 0.0,
            obb_mins: Vec3::ZERO,
            obb_maxs: Vec3::ZERO,
            coordinate_frame: Affine3A::IDENTITY,
        }
    }
}

impl BaseData {
    /// Players use their collision volume, everything else its model bounds.
    pub fn new(entity: &dyn Entity, local_origin: Vec3) -> Self {
        let bounds = if entity.is_player() {
            Some(entity.collision_bounds())
        } else {
            entity.model_bounds()
        };
        let (obb_mins, obb_maxs) = bounds.map_or((Vec3::ZERO, Vec3::ZERO), |b| (b.min, b.max));

        Self {
            distance_to_local: entity.origin().distance(local_origin),
            obb_mins,
            obb_maxs,
            coordinate_frame: entity.coordinate_frame(),
        }
    }

    /// Draw order: farthest first, so closer records end up on top.
    pub fn draw_order(&self, other: &Self) -> Ordering {
        other.distance_to_local.total_cmp(&self.distance_to_local)
    }
}

/// A weapon lying in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponData {
    pub base: BaseData,
    pub clip: i32,
    pub reserve_ammo: i32,
    pub group: &'static str,
    pub name: &'static str,
    pub display_name: String,
}

impl WeaponData {
    pub fn new(entity: &dyn Entity, game: &dyn Game, local_origin: Vec3) -> Self {
        let mut weapon = Self {
            base: BaseData::new(entity, local_origin),
            clip: entity.clip(),
            reserve_ammo: entity.reserve_ammo(),
            group: "All",
            name: "All",
            display_name: String::new(),
        };

        if let Some(info) = entity.weapon_info() {
            let id = entity.weapon_id();
            weapon.group = id.group(info.kind);
            weapon.name = id.name();
            weapon.display_name = game.localize(&info.name);
        }
        weapon
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityData {
    pub base: BaseData,
    pub name: &'static str,
}

impl EntityData {
    /// `None` for classes without a name.
    pub fn new(entity: &dyn Entity, local_origin: Vec3) -> Option<Self> {
        Some(Self {
            name: entity_name(entity.class_id())?,
            base: BaseData::new(entity, local_origin),
        })
    }
}

pub fn entity_name(class: ClassId) -> Option<&'static str> {
    Some(match class {
        ClassId::EconEntity => "Defuse Kit",
        ClassId::Chicken => "Chicken",
        ClassId::PlantedC4 => "Planted C4",
        ClassId::Hostage => "Hostage",
        ClassId::Dronegun => "Sentry",
        ClassId::Cash => "Cash",
        ClassId::AmmoBox => "Ammo Box",
        ClassId::RadarJammer => "Radar Jammer",
        ClassId::SnowballPile => "Snowball Pile",
        ClassId::DynamicProp => "Collectable Coin",
        _ => return None,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct LootCrateData {
    pub base: BaseData,
    /// `None` for unrecognized models, which are not drawn.
    pub name: Option<&'static str>,
}

impl LootCrateData {
    pub fn new(entity: &dyn Entity, local_origin: Vec3) -> Self {
        Self {
            base: BaseData::new(entity, local_origin),
            name: entity.model_name().and_then(loot_crate_name),
        }
    }
}

fn loot_crate_name(model: &str) -> Option<&'static str> {
    match model {
        "models/props_survival/cases/case_pistol.mdl" => Some("Pistol Case"),
        "models/props_survival/cases/case_light_weapon.mdl" => Some("Light Case"),
        "models/props_survival/cases/case_heavy_weapon.mdl" => Some("Heavy Case"),
        "models/props_survival/cases/case_explosive.mdl" => Some("Explosive Case"),
        "models/props_survival/cases/case_tools.mdl" => Some("Tools Case"),
        "models/props_survival/cash/dufflebag.mdl" => Some("Cash Dufflebag"),
        _ => None,
    }
}
