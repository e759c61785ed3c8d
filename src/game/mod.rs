//! Read access to the running game. The snapshot builder only talks to these
//! traits; a memory reader, or the in-memory world in [`crate::sim`], sits behind them.

use glam::{Affine3A, Mat4, Vec3};

use crate::{
    bvh::Aabb,
    game::{
        bones::Bones,
        weapon::{WeaponId, WeaponInfo},
    },
    math,
};

pub mod bones;
pub mod weapon;

pub const AVATAR_SIZE: usize = 32;

/// Stable entity identifier. May outlive the entity it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub i32);

impl Handle {
    pub const INVALID: Self = Self(-1);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Networked class of an entity. Only the classes the overlay cares about are named.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassId {
    // projectiles
    BaseCsGrenadeProjectile,
    BreachChargeProjectile,
    BumpMineProjectile,
    DecoyProjectile,
    MolotovProjectile,
    SensorGrenadeProjectile,
    SmokeGrenadeProjectile,
    SnowballProjectile,

    // world items
    EconEntity,
    Chicken,
    PlantedC4,
    Hostage,
    Dronegun,
    Cash,
    AmmoBox,
    RadarJammer,
    SnowballPile,
    DynamicProp,

    LootCrate,
    Inferno,
    FogController,

    #[default]
    Other,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    #[default]
    None,
    Spectators,
    Terrorists,
    CounterTerrorists,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ObserverMode {
    #[default]
    None,
    Deathcam,
    Freezecam,
    Fixed,
    InEye,
    Chase,
    Roaming,
}

/// Values written into the world's fog controller.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FogParams {
    pub enabled: bool,
    pub start: f32,
    pub end: f32,
    pub density: f32,
    pub color: [u8; 3],
}

/// First hitbox of a model, in bone space.
#[derive(Debug, Clone, Copy)]
pub struct Hitbox {
    pub mins: Vec3,
    pub maxs: Vec3,
    pub bone: Affine3A,
    pub capsule_radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirePoint {
    /// Offset from the inferno origin.
    pub delta: Vec3,
    pub burning: bool,
}

/// A live entity. Accessors that do not apply to an entity's kind keep their defaults.
pub trait Entity {
    fn handle(&self) -> Handle;
    fn index(&self) -> i32;
    fn class_id(&self) -> ClassId;

    fn is_dormant(&self) -> bool {
        false
    }

    fn is_player(&self) -> bool {
        false
    }

    fn is_weapon(&self) -> bool {
        false
    }

    fn is_alive(&self) -> bool {
        false
    }

    fn origin(&self) -> Vec3;

    /// Local to world transform.
    fn coordinate_frame(&self) -> Affine3A {
        Affine3A::from_translation(self.origin())
    }

    /// Collision volume, used for players.
    fn collision_bounds(&self) -> Aabb {
        Aabb::default()
    }

    /// Render model bounds, `None` without a model.
    fn model_bounds(&self) -> Option<Aabb> {
        None
    }

    fn model_name(&self) -> Option<&str> {
        None
    }

    /// Owning entity, [`Handle::INVALID`] for items lying in the world.
    fn owner(&self) -> Handle {
        Handle::INVALID
    }

    fn should_draw(&self) -> bool {
        true
    }

    // players

    fn player_name(&self) -> String {
        String::new()
    }

    fn user_id(&self) -> i32 {
        0
    }

    /// Platform account id, 0 for bots.
    fn platform_id(&self) -> u64 {
        0
    }

    fn team(&self) -> Team {
        Team::None
    }

    fn money(&self) -> i32 {
        0
    }

    fn health(&self) -> i32 {
        0
    }

    fn eye_position(&self) -> Vec3 {
        self.origin()
    }

    fn eye_angles(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn is_spotted(&self) -> bool {
        false
    }

    fn gun_game_immunity(&self) -> bool {
        false
    }

    fn flash_duration(&self) -> f32 {
        0.0
    }

    fn active_weapon(&self) -> Handle {
        Handle::INVALID
    }

    fn observer_mode(&self) -> ObserverMode {
        ObserverMode::None
    }

    fn observer_target(&self) -> Handle {
        Handle::INVALID
    }

    fn velocity_modifier(&self) -> f32 {
        1.0
    }

    fn is_scoped(&self) -> bool {
        false
    }

    fn shots_fired(&self) -> i32 {
        0
    }

    /// Recoil offset added to the view angles, in degrees.
    fn aim_punch(&self) -> Vec3 {
        Vec3::ZERO
    }

    /// Current field of view, 0 when not overridden.
    fn fov(&self) -> i32 {
        0
    }

    fn default_fov(&self) -> i32 {
        90
    }

    fn bone_position(&self, _bone: Bones) -> Option<Vec3> {
        None
    }

    /// `(bone, parent)` pairs of the hitbox skeleton.
    fn bone_segments(&self) -> Vec<(Vec3, Vec3)> {
        Bones::segments(|bone| self.bone_position(bone))
    }

    fn head_hitbox(&self) -> Option<Hitbox> {
        None
    }

    // weapons

    /// Item definition, read from the weapon entity.
    fn weapon_id(&self) -> WeaponId {
        WeaponId::None
    }

    fn weapon_info(&self) -> Option<WeaponInfo> {
        None
    }

    fn clip(&self) -> i32 {
        -1
    }

    fn reserve_ammo(&self) -> i32 {
        0
    }

    /// Radians.
    fn inaccuracy(&self) -> f32 {
        0.0
    }

    /// Radians.
    fn spread(&self) -> f32 {
        0.0
    }

    fn in_reload(&self) -> bool {
        false
    }

    fn next_primary_attack(&self) -> f32 {
        0.0
    }

    // projectiles

    fn thrower(&self) -> Handle {
        Handle::INVALID
    }

    fn did_smoke_effect(&self) -> bool {
        false
    }

    // infernos

    fn fire_points(&self) -> Vec<FirePoint> {
        Vec::new()
    }

    // planted bomb

    fn c4_ticking(&self) -> bool {
        false
    }

    fn c4_blow_time(&self) -> f32 {
        0.0
    }

    fn c4_timer_length(&self) -> f32 {
        0.0
    }

    fn c4_defuser(&self) -> Handle {
        Handle::INVALID
    }

    fn c4_defuse_countdown(&self) -> f32 {
        0.0
    }

    fn c4_defuse_length(&self) -> f32 {
        0.0
    }

    /// Writes fog parameters into a fog controller. No-op for other entities.
    fn write_fog(&self, _fog: &FogParams) {}
}

/// Scoreboard data, indexed by entity index.
pub trait PlayerResource {
    fn armor(&self, index: i32) -> i32;
    fn competitive_ranking(&self, index: i32) -> i32;
    fn competitive_wins(&self, index: i32) -> i32;
    fn clan(&self, index: i32) -> Option<String>;
    fn is_alive(&self, index: i32) -> bool;
    fn health(&self, index: i32) -> i32;
    /// Entity index of the player carrying the bomb.
    fn c4_index(&self) -> i32;
    fn bombsite_center_a(&self) -> Vec3;
    fn bombsite_center_b(&self) -> Vec3;
}

/// Engine and world accessors.
pub trait Game {
    fn frame_count(&self) -> i32;
    fn realtime(&self) -> f32;
    fn server_time(&self) -> f32;

    /// Outgoing latency in seconds, `None` without a network channel.
    fn net_channel_latency(&self) -> Option<f32>;

    fn local_player(&self) -> Option<&dyn Entity>;
    fn highest_entity_index(&self) -> i32;
    fn entity(&self, index: i32) -> Option<&dyn Entity>;
    fn entity_from_handle(&self, handle: Handle) -> Option<&dyn Entity>;

    fn view_matrix(&self) -> Mat4;
    fn view_angles(&self) -> Vec3;
    fn game_mode_name(&self) -> String;

    /// Looks up a localization key, returning the key itself when it is missing.
    fn localize(&self, key: &str) -> String {
        key.to_owned()
    }

    fn player_resource(&self) -> Option<&dyn PlayerResource>;

    /// First planted bomb, if any.
    fn planted_c4(&self) -> Option<&dyn Entity>;

    fn map_has_bomb_target(&self) -> bool {
        true
    }

    fn is_other_enemy(&self, entity: &dyn Entity, other: &dyn Entity) -> bool {
        entity.team() != other.team()
    }

    /// True when the box is entirely outside the view frustum.
    fn cull_box(&self, mins: Vec3, maxs: Vec3) -> bool {
        math::cull_box(mins, maxs, &self.view_matrix())
    }

    /// End point of a ray from `start` to `end` that ignores `skip`.
    fn trace_ray(&self, _start: Vec3, end: Vec3, _skip: &dyn Entity) -> Vec3 {
        end
    }

    /// Whether `viewer` can see any part of `entity`.
    fn is_visible_to(&self, entity: &dyn Entity, viewer: &dyn Entity) -> bool;

    /// Whether the entity is playing a sound right now.
    fn is_entity_audible(&self, _index: i32) -> bool {
        false
    }

    /// Small RGBA avatar, `AVATAR_SIZE` squared.
    fn player_avatar(&self, _platform_id: u64) -> Option<Vec<u8>> {
        None
    }
}
