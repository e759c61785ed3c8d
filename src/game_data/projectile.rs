use glam::Vec3;

use crate::{
    game::{ClassId, Entity, Handle},
    game_data::{FrameContext, base::BaseData},
    tracked::Keyed,
};

/// Seconds a vanished projectile's trail is kept after its last sample.
pub const TRAJECTORY_LIFETIME: f32 = 60.0;

/// A thrown grenade or placed charge, kept across frames for its trail.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileData {
    pub base: BaseData,
    pub name: &'static str,
    pub handle: Handle,
    pub thrown_by_local_player: bool,
    pub thrown_by_enemy: bool,
    pub exploded: bool,
    /// `(realtime, position)`, one sample per position change.
    pub trajectory: Vec<(f32, Vec3)>,
}

impl ProjectileData {
    pub fn new(entity: &dyn Entity, ctx: &FrameContext) -> Self {
        let mut projectile = Self {
            base: BaseData::new(entity, ctx.local_origin),
            name: projectile_name(entity.class_id(), entity.model_name()).unwrap_or("unknown"),
            handle: entity.handle(),
            thrown_by_local_player: false,
            thrown_by_enemy: false,
            exploded: false,
            trajectory: Vec::new(),
        };

        if let Some(thrower) = ctx.game.entity_from_handle(entity.thrower())
            && let Some(local) = ctx.local
        {
            if thrower.handle() == local.handle() {
                projectile.thrown_by_local_player = true;
            } else {
                projectile.thrown_by_enemy = ctx.game.is_other_enemy(local, thrower);
            }
        }
        projectile
    }

    pub fn update(&mut self, entity: &dyn Entity, ctx: &FrameContext) {
        self.base = BaseData::new(entity, ctx.local_origin);

        let position = entity.origin();
        if self.trajectory.last().is_none_or(|&(_, last)| last != position) {
            self.trajectory.push((ctx.realtime, position));
        }
    }

    /// Gone from the entity list and either never moved or idle for too long.
    pub fn is_expired(&self, realtime: f32) -> bool {
        self.trajectory
            .last()
            .is_none_or(|&(time, _)| time + TRAJECTORY_LIFETIME < realtime)
    }
}

impl Keyed for ProjectileData {
    fn handle(&self) -> Handle {
        self.handle
    }
}

pub fn is_projectile(class: ClassId) -> bool {
    matches!(
        class,
        ClassId::BaseCsGrenadeProjectile
            | ClassId::BreachChargeProjectile
            | ClassId::BumpMineProjectile
            | ClassId::DecoyProjectile
            | ClassId::MolotovProjectile
            | ClassId::SensorGrenadeProjectile
            | ClassId::SmokeGrenadeProjectile
            | ClassId::SnowballProjectile
    )
}

pub fn projectile_name(class: ClassId, model: Option<&str>) -> Option<&'static str> {
    Some(match class {
        ClassId::BaseCsGrenadeProjectile => {
            if model.is_some_and(|model| model.contains("flashbang")) {
                "Flashbang"
            } else {
                "HE Grenade"
            }
        }
        ClassId::BreachChargeProjectile => "Breach Charge",
        ClassId::BumpMineProjectile => "Bump Mine",
        ClassId::DecoyProjectile => "Decoy Grenade",
        ClassId::MolotovProjectile => "Molotov",
        ClassId::SensorGrenadeProjectile => "TA Grenade",
        ClassId::SmokeGrenadeProjectile => "Smoke Grenade",
        ClassId::SnowballProjectile => "Snowball",
        _ => return None,
    })
}
