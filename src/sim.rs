//! In-memory game world. Drives the snapshot and renderer without a game
//! process, for the replay binary and the scenario tests.

use std::{cell::Cell, collections::BTreeMap, collections::HashMap, collections::HashSet};

use glam::{Affine3A, Mat4, Vec3, Vec4};

use crate::{
    bvh::{Aabb, Bvh},
    game::{
        ClassId, Entity, FirePoint, FogParams, Game, Handle, Hitbox, ObserverMode, PlayerResource,
        Team,
        bones::Bones,
        weapon::{WeaponId, WeaponInfo},
    },
    math::vector_from_angle,
};

/// Lower bits of a handle hold the entity index.
const INDEX_BITS: i32 = 12;
const INDEX_MASK: i32 = (1 << INDEX_BITS) - 1;
pub const EYE_HEIGHT: f32 = 64.0;
pub const PLAYER_MINS: Vec3 = Vec3::new(-16.0, -16.0, 0.0);
pub const PLAYER_MAXS: Vec3 = Vec3::new(16.0, 16.0, 72.0);

/// World to screen matrix of a camera at `eye` with pitch/yaw `angles` and a
/// 90 degree horizontal fov, laid out row major like the game's.
pub fn camera_matrix(eye: Vec3, angles: Vec3, aspect: f32) -> Mat4 {
    let forward = vector_from_angle(angles);
    let yaw = angles.y.to_radians();
    let right = Vec3::new(yaw.sin(), -yaw.cos(), 0.0);
    let up = right.cross(forward) * aspect;

    let row = |axis: Vec3| axis.extend(-axis.dot(eye));
    Mat4::from_cols(row(right), row(up), Vec4::ZERO, row(forward))
}

/// Offsets from the origin of a player standing upright, facing +x.
pub fn standing_skeleton() -> Vec<(Bones, Vec3)> {
    vec![
        (Bones::Hip, Vec3::new(0.0, 0.0, 38.0)),
        (Bones::Spine1, Vec3::new(0.0, 0.0, 42.0)),
        (Bones::Spine2, Vec3::new(0.0, 0.0, 47.0)),
        (Bones::Spine3, Vec3::new(0.0, 0.0, 52.0)),
        (Bones::Spine4, Vec3::new(0.0, 0.0, 56.0)),
        (Bones::Neck, Vec3::new(0.0, 0.0, 60.0)),
        (Bones::Head, Vec3::new(0.0, 0.0, 65.0)),
        (Bones::LeftShoulder, Vec3::new(0.0, 7.0, 57.0)),
        (Bones::LeftElbow, Vec3::new(0.0, 10.0, 46.0)),
        (Bones::LeftHand, Vec3::new(6.0, 10.0, 36.0)),
        (Bones::RightShoulder, Vec3::new(0.0, -7.0, 57.0)),
        (Bones::RightElbow, Vec3::new(0.0, -10.0, 46.0)),
        (Bones::RightHand, Vec3::new(6.0, -10.0, 36.0)),
        (Bones::LeftHip, Vec3::new(0.0, 4.0, 36.0)),
        (Bones::LeftKnee, Vec3::new(2.0, 4.0, 19.0)),
        (Bones::LeftFoot, Vec3::new(0.0, 4.0, 2.0)),
        (Bones::RightHip, Vec3::new(0.0, -4.0, 36.0)),
        (Bones::RightKnee, Vec3::new(2.0, -4.0, 19.0)),
        (Bones::RightFoot, Vec3::new(0.0, -4.0, 2.0)),
    ]
}

/// An entity of any kind. Fields that do not apply to the kind keep their defaults.
#[derive(Debug, Clone)]
pub struct SimEntity {
    pub handle: Handle,
    pub index: i32,
    pub class_id: ClassId,
    pub dormant: bool,
    pub player: bool,
    pub weapon: bool,
    pub alive: bool,
    pub origin: Vec3,
    pub bounds: Option<Aabb>,
    pub model: Option<String>,
    pub owner: Handle,
    pub should_draw: bool,

    pub name: String,
    pub user_id: i32,
    pub platform_id: u64,
    pub team: Team,
    pub money: i32,
    pub health: i32,
    pub eye_angles: Vec3,
    pub spotted: bool,
    pub immune: bool,
    pub flash_duration: f32,
    pub active_weapon: Handle,
    pub observer_mode: ObserverMode,
    pub observer_target: Handle,
    pub scoped: bool,
    pub shots_fired: i32,
    pub fov: i32,
    /// Offsets from the origin.
    pub bones: Vec<(Bones, Vec3)>,
    /// Head hitbox relative to the origin.
    pub head: Option<Hitbox>,

    pub weapon_id: WeaponId,
    pub weapon_info: Option<WeaponInfo>,
    pub clip: i32,
    pub reserve_ammo: i32,

    pub thrower: Handle,
    pub did_smoke_effect: bool,
    pub fire_points: Vec<FirePoint>,

    pub c4_ticking: bool,
    pub c4_blow_time: f32,
    pub c4_timer_length: f32,
    pub c4_defuser: Handle,

    /// Last value written by the snapshot builder into a fog controller.
    pub fog: Cell<Option<FogParams>>,
}

impl Default for SimEntity {
    fn default() -> Self {
        Self {
            handle: Handle::INVALID,
            index: 0,
            class_id: ClassId::Other,
            dormant: false,
            player: false,
            weapon: false,
            alive: false,
            origin: Vec3::ZERO,
            bounds: None,
            model: None,
            owner: Handle::INVALID,
            should_draw: true,
            name: String::new(),
            user_id: 0,
            platform_id: 0,
            team: Team::None,
            money: 0,
            health: 0,
            eye_angles: Vec3::ZERO,
            spotted: false,
            immune: false,
            flash_duration: 0.0,
            active_weapon: Handle::INVALID,
            observer_mode: ObserverMode::None,
            observer_target: Handle::INVALID,
            scoped: false,
            shots_fired: 0,
            fov: 0,
            bones: Vec::new(),
            head: None,
            weapon_id: WeaponId::None,
            weapon_info: None,
            clip: -1,
            reserve_ammo: 0,
            thrower: Handle::INVALID,
            did_smoke_effect: false,
            fire_points: Vec::new(),
            c4_ticking: false,
            c4_blow_time: 0.0,
            c4_timer_length: 0.0,
            c4_defuser: Handle::INVALID,
            fog: Cell::new(None),
        }
    }
}

impl SimEntity {
    pub fn new(class_id: ClassId, origin: Vec3) -> Self {
        Self {
            class_id,
            origin,
            bounds: Some(Aabb::new(Vec3::splat(-4.0), Vec3::splat(4.0))),
            ..Default::default()
        }
    }

    /// A living player with a full skeleton and head hitbox.
    pub fn player(name: &str, team: Team, origin: Vec3) -> Self {
        Self {
            player: true,
            alive: true,
            origin,
            name: name.to_owned(),
            team,
            health: 100,
            money: 800,
            bones: standing_skeleton(),
            head: Some(Hitbox {
                mins: Vec3::splat(-4.0),
                maxs: Vec3::splat(4.0),
                bone: Affine3A::from_translation(Vec3::new(0.0, 0.0, 65.0)),
                capsule_radius: 0.0,
            }),
            ..Default::default()
        }
    }

    pub fn weapon(id: WeaponId, info: WeaponInfo, origin: Vec3) -> Self {
        Self {
            weapon: true,
            origin,
            bounds: Some(Aabb::new(
                Vec3::new(-12.0, -2.0, 0.0),
                Vec3::new(12.0, 2.0, 6.0),
            )),
            clip: info.max_clip,
            reserve_ammo: info.max_clip * 3,
            weapon_id: id,
            weapon_info: Some(info),
            ..Default::default()
        }
    }

    pub fn projectile(class_id: ClassId, origin: Vec3, thrower: Handle) -> Self {
        Self {
            thrower,
            bounds: Some(Aabb::new(Vec3::splat(-2.0), Vec3::splat(2.0))),
            ..Self::new(class_id, origin)
        }
    }
}

impl Entity for SimEntity {
    fn handle(&self) -> Handle {
        self.handle
    }

    fn index(&self) -> i32 {
        self.index
    }

    fn class_id(&self) -> ClassId {
        self.class_id
    }

    fn is_dormant(&self) -> bool {
        self.dormant
    }

    fn is_player(&self) -> bool {
        self.player
    }

    fn is_weapon(&self) -> bool {
        self.weapon
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn origin(&self) -> Vec3 {
        self.origin
    }

    fn collision_bounds(&self) -> Aabb {
        Aabb::new(PLAYER_MINS, PLAYER_MAXS)
    }

    fn model_bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn owner(&self) -> Handle {
        self.owner
    }

    fn should_draw(&self) -> bool {
        self.should_draw
    }

    fn player_name(&self) -> String {
        self.name.clone()
    }

    fn user_id(&self) -> i32 {
        self.user_id
    }

    fn platform_id(&self) -> u64 {
        self.platform_id
    }

    fn team(&self) -> Team {
        self.team
    }

    fn money(&self) -> i32 {
        self.money
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn eye_position(&self) -> Vec3 {
        if self.player {
            self.origin + Vec3::new(0.0, 0.0, EYE_HEIGHT)
        } else {
            self.origin
        }
    }

    fn eye_angles(&self) -> Vec3 {
        self.eye_angles
    }

    fn is_spotted(&self) -> bool {
        self.spotted
    }

    fn gun_game_immunity(&self) -> bool {
        self.immune
    }

    fn flash_duration(&self) -> f32 {
        self.flash_duration
    }

    fn active_weapon(&self) -> Handle {
        self.active_weapon
    }

    fn observer_mode(&self) -> ObserverMode {
        self.observer_mode
    }

    fn observer_target(&self) -> Handle {
        self.observer_target
    }

    fn is_scoped(&self) -> bool {
        self.scoped
    }

    fn shots_fired(&self) -> i32 {
        self.shots_fired
    }

    fn fov(&self) -> i32 {
        self.fov
    }

    fn bone_position(&self, bone: Bones) -> Option<Vec3> {
        self.bones
            .iter()
            .find(|(b, _)| *b == bone)
            .map(|(_, offset)| self.origin + *offset)
    }

    fn head_hitbox(&self) -> Option<Hitbox> {
        self.head.map(|head| Hitbox {
            bone: Affine3A::from_translation(self.origin) * head.bone,
            ..head
        })
    }

    fn weapon_id(&self) -> WeaponId {
        self.weapon_id
    }

    fn weapon_info(&self) -> Option<WeaponInfo> {
        self.weapon_info.clone()
    }

    fn clip(&self) -> i32 {
        self.clip
    }

    fn reserve_ammo(&self) -> i32 {
        self.reserve_ammo
    }

    fn thrower(&self) -> Handle {
        self.thrower
    }

    fn did_smoke_effect(&self) -> bool {
        self.did_smoke_effect
    }

    fn fire_points(&self) -> Vec<FirePoint> {
        self.fire_points.clone()
    }

    fn c4_ticking(&self) -> bool {
        self.c4_ticking
    }

    fn c4_blow_time(&self) -> f32 {
        self.c4_blow_time
    }

    fn c4_timer_length(&self) -> f32 {
        self.c4_timer_length
    }

    fn c4_defuser(&self) -> Handle {
        self.c4_defuser
    }

    fn write_fog(&self, fog: &FogParams) {
        if self.class_id == ClassId::FogController {
            self.fog.set(Some(*fog));
        }
    }
}

/// Scoreboard values of one player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceEntry {
    pub armor: i32,
    pub rank: i32,
    pub wins: i32,
    pub clan: Option<String>,
    pub alive: bool,
    pub health: i32,
}

#[derive(Debug, Clone, Default)]
pub struct SimPlayerResource {
    pub entries: HashMap<i32, ResourceEntry>,
    pub c4_index: i32,
    pub bombsite_a: Vec3,
    pub bombsite_b: Vec3,
}

impl SimPlayerResource {
    fn entry(&self, index: i32) -> Option<&ResourceEntry> {
        self.entries.get(&index)
    }
}

impl PlayerResource for SimPlayerResource {
    fn armor(&self, index: i32) -> i32 {
        self.entry(index).map_or(0, |e| e.armor)
    }

    fn competitive_ranking(&self, index: i32) -> i32 {
        self.entry(index).map_or(0, |e| e.rank)
    }

    fn competitive_wins(&self, index: i32) -> i32 {
        self.entry(index).map_or(0, |e| e.wins)
    }

    fn clan(&self, index: i32) -> Option<String> {
        self.entry(index).and_then(|e| e.clan.clone())
    }

    fn is_alive(&self, index: i32) -> bool {
        self.entry(index).is_some_and(|e| e.alive)
    }

    fn health(&self, index: i32) -> i32 {
        self.entry(index).map_or(0, |e| e.health)
    }

    fn c4_index(&self) -> i32 {
        self.c4_index
    }

    fn bombsite_center_a(&self) -> Vec3 {
        self.bombsite_a
    }

    fn bombsite_center_b(&self) -> Vec3 {
        self.bombsite_b
    }
}

pub struct SimGame {
    pub frame: i32,
    pub realtime: f32,
    pub latency: Option<f32>,
    /// Index of the local player.
    pub local: Option<i32>,
    pub view_matrix: Mat4,
    pub view_angles: Vec3,
    pub aspect: f32,
    pub game_mode: String,
    pub resource: Option<SimPlayerResource>,
    /// Static geometry blocking sight lines.
    pub world: Option<Bvh>,
    pub localization: HashMap<String, String>,
    pub avatars: HashMap<u64, Vec<u8>>,
    /// Indices of entities currently making noise.
    pub audible: HashSet<i32>,
    entities: BTreeMap<i32, SimEntity>,
    serial: i32,
}

impl Default for SimGame {
    fn default() -> Self {
        Self::new()
    }
}

impl SimGame {
    pub fn new() -> Self {
        Self {
            frame: 0,
            realtime: 0.0,
            latency: Some(0.0),
            local: None,
            view_matrix: Mat4::ZERO,
            view_angles: Vec3::ZERO,
            aspect: 16.0 / 9.0,
            game_mode: "casual".to_owned(),
            resource: Some(SimPlayerResource::default()),
            world: None,
            localization: HashMap::new(),
            avatars: HashMap::new(),
            audible: HashSet::new(),
            entities: BTreeMap::new(),
            serial: 0,
        }
    }

    /// Adds `entity` at `index`, replacing what was there, and returns its new handle.
    pub fn spawn(&mut self, index: i32, mut entity: SimEntity) -> Handle {
        self.serial += 1;
        entity.index = index;
        entity.handle = Handle((self.serial << INDEX_BITS) | (index & INDEX_MASK));
        let handle = entity.handle;
        self.entities.insert(index, entity);
        handle
    }

    pub fn remove(&mut self, index: i32) -> Option<SimEntity> {
        self.entities.remove(&index)
    }

    pub fn get(&self, index: i32) -> Option<&SimEntity> {
        self.entities.get(&index)
    }

    pub fn get_mut(&mut self, index: i32) -> Option<&mut SimEntity> {
        self.entities.get_mut(&index)
    }

    /// Moves time forward by one game frame.
    pub fn advance(&mut self, dt: f32) {
        self.frame += 1;
        self.realtime += dt;
    }

    /// Points the camera from `eye` along `angles`.
    pub fn look_from(&mut self, eye: Vec3, angles: Vec3) {
        self.view_angles = angles;
        self.view_matrix = camera_matrix(eye, angles, self.aspect);
    }

    /// Points the camera through the local player's eyes.
    pub fn look_through_local_player(&mut self) {
        if let Some(local) = self.local.and_then(|index| self.entities.get(&index)) {
            let eye = local.eye_position();
            let angles = local.eye_angles;
            self.look_from(eye, angles);
        }
    }

    fn sim_entity(&self, index: i32) -> Option<&SimEntity> {
        self.entities.get(&index)
    }
}

impl Game for SimGame {
    fn frame_count(&self) -> i32 {
        self.frame
    }

    fn realtime(&self) -> f32 {
        self.realtime
    }

    fn server_time(&self) -> f32 {
        self.realtime
    }

    fn net_channel_latency(&self) -> Option<f32> {
        self.latency
    }

    fn local_player(&self) -> Option<&dyn Entity> {
        let entity = self.sim_entity(self.local?)?;
        Some(entity)
    }

    fn highest_entity_index(&self) -> i32 {
        self.entities.keys().next_back().copied().unwrap_or(0)
    }

    fn entity(&self, index: i32) -> Option<&dyn Entity> {
        let entity = self.sim_entity(index)?;
        Some(entity)
    }

    fn entity_from_handle(&self, handle: Handle) -> Option<&dyn Entity> {
        if !handle.is_valid() {
            return None;
        }
        let entity = self
            .sim_entity(handle.0 & INDEX_MASK)
            .filter(|entity| entity.handle == handle)?;
        Some(entity)
    }

    fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    fn view_angles(&self) -> Vec3 {
        self.view_angles
    }

    fn game_mode_name(&self) -> String {
        self.game_mode.clone()
    }

    fn localize(&self, key: &str) -> String {
        self.localization
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }

    fn player_resource(&self) -> Option<&dyn PlayerResource> {
        let resource = self.resource.as_ref()?;
        Some(resource)
    }

    fn planted_c4(&self) -> Option<&dyn Entity> {
        let bomb = self
            .entities
            .values()
            .find(|entity| entity.class_id == ClassId::PlantedC4)?;
        Some(bomb)
    }

    fn trace_ray(&self, start: Vec3, end: Vec3, _skip: &dyn Entity) -> Vec3 {
        match &self.world {
            Some(world) => world.trace(start, end),
            None => end,
        }
    }

    fn is_visible_to(&self, entity: &dyn Entity, viewer: &dyn Entity) -> bool {
        match &self.world {
            Some(world) => world.has_line_of_sight(viewer.eye_position(), entity.eye_position()),
            None => true,
        }
    }

    fn is_entity_audible(&self, index: i32) -> bool {
        self.audible.contains(&index)
    }

    fn player_avatar(&self, platform_id: u64) -> Option<Vec<u8>> {
        self.avatars.get(&platform_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::math::world_to_screen;

    #[test]
    fn camera_looks_along_view_angles() {
        let screen = Vec2::new(1600.0, 900.0);
        let eye = Vec3::new(10.0, 20.0, 64.0);
        let angles = Vec3::new(0.0, 90.0, 0.0);
        let vm = camera_matrix(eye, angles, 16.0 / 9.0);

        let ahead = world_to_screen(eye + Vec3::new(0.0, 100.0, 0.0), &vm, screen).unwrap();
        assert!((ahead - screen / 2.0).abs().max_element() <= 1.0);

        let above = world_to_screen(eye + Vec3::new(0.0, 100.0, 20.0), &vm, screen).unwrap();
        assert!(above.y < ahead.y);

        assert!(world_to_screen(eye - Vec3::new(0.0, 100.0, 0.0), &vm, screen).is_none());
    }

    #[test]
    fn stale_handles_do_not_resolve() {
        let mut game = SimGame::new();
        let first = game.spawn(3, SimEntity::new(ClassId::Chicken, Vec3::ZERO));
        assert!(game.entity_from_handle(first).is_some());

        let second = game.spawn(3, SimEntity::new(ClassId::Chicken, Vec3::ZERO));
        assert_ne!(first, second);
        assert!(game.entity_from_handle(first).is_none());
        assert_eq!(game.highest_entity_index(), 3);
    }

    #[test]
    fn fog_is_only_written_to_fog_controllers() {
        let fog = FogParams {
            enabled: true,
            ..Default::default()
        };
        let chicken = SimEntity::new(ClassId::Chicken, Vec3::ZERO);
        chicken.write_fog(&fog);
        assert_eq!(chicken.fog.get(), None);

        let controller = SimEntity::new(ClassId::FogController, Vec3::ZERO);
        controller.write_fog(&fog);
        assert_eq!(controller.fog.get(), Some(fog));
    }
}
