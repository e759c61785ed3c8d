//! Per frame snapshot of the game world.
//!
//! [`GameData::update`] rebuilds the snapshot at most once per game frame, and
//! the renderer reads it through [`GameData::lock`]. Both hold the same lock for
//! the whole pass, so a half rebuilt snapshot is never drawn.

use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicI32, Ordering},
    },
};

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use glam::{Mat4, Vec3};
use log::{debug, info, warn};

use crate::{
    color,
    config::{Config, FogConfig},
    game::{AVATAR_SIZE, ClassId, Entity, FogParams, Game, Handle, ObserverMode},
    tracked::Tracked,
};

pub use self::{
    base::{BaseData, EntityData, LootCrateData, WeaponData},
    local::LocalPlayerData,
    player::{ObserverData, PlayerData},
    projectile::ProjectileData,
    world::{BombData, Bombsite, InfernoData, SmokeData},
};

mod base;
mod local;
mod player;
mod projectile;
mod world;

/// Seconds between two visibility checks, shared by all players.
const VISIBILITY_UPDATE_DELAY: f32 = 0.1;
const RANK_COUNT: usize = 19;
const DANGER_ZONE_RANK_COUNT: usize = 16;

/// What the record constructors need to know about the frame being built.
pub struct FrameContext<'a> {
    pub game: &'a dyn Game,
    pub local: Option<&'a dyn Entity>,
    pub local_origin: Vec3,
    pub realtime: f32,
    /// The shared visibility tick has elapsed.
    pub update_visibility: bool,
}

struct RankNames {
    competitive: Vec<String>,
    danger_zone: Vec<String>,
}

impl RankNames {
    fn localize(game: &dyn Game) -> Self {
        Self {
            competitive: (0..RANK_COUNT)
                .map(|i| game.localize(&format!("RankName_{i}")))
                .collect(),
            danger_zone: (0..DANGER_ZONE_RANK_COUNT)
                .map(|i| game.localize(&format!("skillgroup_{i}dangerzone")))
                .collect(),
        }
    }
}

/// Small RGBA avatar of a player and its texture, created on first use.
struct Avatar {
    rgba: Vec<u8>,
    texture: Option<TextureHandle>,
}

pub struct Snapshot {
    last_frame: Option<i32>,
    next_visibility_update: f32,
    realtime: f32,
    in_game: bool,
    view_matrix: Mat4,
    game_mode: String,
    local: LocalPlayerData,
    players: Tracked<PlayerData>,
    observers: Tracked<ObserverData>,
    weapons: Tracked<WeaponData>,
    entities: Tracked<EntityData>,
    loot_crates: Tracked<LootCrateData>,
    projectiles: Tracked<ProjectileData>,
    infernos: Tracked<InfernoData>,
    smokes: Tracked<SmokeData>,
    bomb: BombData,
    rank_names: Option<RankNames>,
    avatars: HashMap<Handle, Avatar>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            last_frame: None,
            next_visibility_update: 0.0,
            realtime: 0.0,
            in_game: false,
            view_matrix: Mat4::ZERO,
            game_mode: String::new(),
            local: LocalPlayerData::default(),
            players: Tracked::across_frames(),
            observers: Tracked::per_frame(),
            weapons: Tracked::per_frame(),
            entities: Tracked::per_frame(),
            loot_crates: Tracked::per_frame(),
            projectiles: Tracked::across_frames(),
            infernos: Tracked::per_frame(),
            smokes: Tracked::per_frame(),
            bomb: BombData::default(),
            rank_names: None,
            avatars: HashMap::new(),
        }
    }
}

impl Snapshot {
    pub fn local(&self) -> &LocalPlayerData {
        &self.local
    }

    /// Sorted farthest first.
    pub fn players(&self) -> &[PlayerData] {
        self.players.as_slice()
    }

    pub fn player_by_handle(&self, handle: Handle) -> Option<&PlayerData> {
        self.players.get(handle)
    }

    pub fn observers(&self) -> &[ObserverData] {
        self.observers.as_slice()
    }

    pub fn weapons(&self) -> &[WeaponData] {
        self.weapons.as_slice()
    }

    pub fn entities(&self) -> &[EntityData] {
        self.entities.as_slice()
    }

    pub fn loot_crates(&self) -> &[LootCrateData] {
        self.loot_crates.as_slice()
    }

    pub fn projectiles(&self) -> &[ProjectileData] {
        self.projectiles.as_slice()
    }

    pub fn infernos(&self) -> &[InfernoData] {
        self.infernos.as_slice()
    }

    pub fn smokes(&self) -> &[SmokeData] {
        self.smokes.as_slice()
    }

    pub fn planted_c4(&self) -> &BombData {
        &self.bomb
    }

    pub fn to_screen_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn game_mode(&self) -> &str {
        &self.game_mode
    }

    /// Game time of the last rebuild.
    pub fn realtime(&self) -> f32 {
        self.realtime
    }

    /// Localized rank of a skill group; out of range groups map to the first rank.
    pub fn rank_name(&self, skill_group: i32) -> &str {
        let Some(names) = &self.rank_names else {
            return "";
        };
        let table = if self.game_mode == "survival" {
            &names.danger_zone
        } else {
            &names.competitive
        };
        let index = usize::try_from(skill_group)
            .ok()
            .filter(|&index| index < table.len())
            .unwrap_or(0);
        table.get(index).map_or("", String::as_str)
    }

    pub fn has_avatar(&self, handle: Handle) -> bool {
        self.avatars.contains_key(&handle)
    }

    /// Texture of a player's avatar, uploaded on first use.
    pub fn avatar_texture(&mut self, handle: Handle, ctx: &Context) -> Option<TextureId> {
        let avatar = self.avatars.get_mut(&handle)?;
        let texture = avatar.texture.get_or_insert_with(|| {
            ctx.load_texture(
                format!("avatar_{}", handle.0),
                ColorImage::from_rgba_unmultiplied([AVATAR_SIZE, AVATAR_SIZE], &avatar.rgba),
                TextureOptions::LINEAR,
            )
        });
        Some(texture.id())
    }

    fn rebuild(&mut self, game: &dyn Game, config: &Config) {
        self.realtime = game.realtime();

        self.observers.begin_frame();
        self.weapons.begin_frame();
        self.entities.begin_frame();
        self.loot_crates.begin_frame();
        self.infernos.begin_frame();
        self.smokes.begin_frame();

        self.local.update(game);
        self.bomb.update(game);

        if self.rank_names.is_none() {
            self.rank_names = Some(RankNames::localize(game));
        }

        let Some(local) = game.local_player() else {
            if self.in_game {
                info!("left game");
                self.in_game = false;
            }
            self.players.clear();
            self.projectiles.clear();
            self.game_mode.clear();
            return;
        };

        self.game_mode = game.game_mode_name();
        self.view_matrix = game.view_matrix();
        if !self.in_game {
            info!("entered game, mode: {}", self.game_mode);
            self.in_game = true;
        }

        let observer_target =
            (local.observer_mode() == ObserverMode::InEye).then(|| local.observer_target());

        let ctx = FrameContext {
            game,
            local: Some(local),
            local_origin: self.local.origin,
            realtime: self.realtime,
            update_visibility: self.next_visibility_update <= self.realtime,
        };

        for index in 1..=game.highest_entity_index() {
            let Some(entity) = game.entity(index) else {
                continue;
            };

            if entity.is_player() {
                let handle = entity.handle();
                if handle == local.handle() || Some(handle) == observer_target {
                    continue;
                }
                self.track_player(entity, local, &ctx);
            } else if !entity.is_dormant() {
                self.classify(entity, &ctx, config);
            }
        }

        self.players.sort_by(|a, b| a.base.draw_order(&b.base));
        self.weapons.sort_by(|a, b| a.base.draw_order(&b.base));
        self.entities.sort_by(|a, b| a.base.draw_order(&b.base));
        self.loot_crates.sort_by(|a, b| a.base.draw_order(&b.base));
        self.projectiles.sort_by(|a, b| a.base.draw_order(&b.base));

        let resolves = |handle: Handle| game.entity_from_handle(handle).is_some();
        self.projectiles.for_each_mut(|projectile| {
            if !resolves(projectile.handle) {
                projectile.exploded = true;
            }
        });
        let realtime = self.realtime;
        self.projectiles.evict(|projectile| {
            !resolves(projectile.handle) && projectile.is_expired(realtime)
        });
        self.players.evict(|player| !resolves(player.handle));

        if ctx.update_visibility {
            self.next_visibility_update = self.realtime + VISIBILITY_UPDATE_DELAY;
        }

        debug!(
            "frame rebuilt: {} players, {} weapons, {} entities, {} projectiles",
            self.players.len(),
            self.weapons.len(),
            self.entities.len(),
            self.projectiles.len()
        );
    }

    fn track_player(&mut self, entity: &dyn Entity, local: &dyn Entity, ctx: &FrameContext) {
        let handle = entity.handle();
        let mut created = false;
        self.players.upsert(
            handle,
            |player| player.update(entity, ctx),
            || {
                created = true;
                PlayerData::new(entity, ctx)
            },
        );

        if created
            && entity.platform_id() != 0
            && let Some(rgba) = ctx.game.player_avatar(entity.platform_id())
            && rgba.len() == 4 * AVATAR_SIZE * AVATAR_SIZE
        {
            self.avatars.insert(
                handle,
                Avatar {
                    rgba,
                    texture: None,
                },
            );
        }

        if !entity.is_dormant()
            && !entity.is_alive()
            && let Some(target) = ctx.game.entity_from_handle(entity.observer_target())
        {
            self.observers.push(ObserverData {
                player: handle,
                target: target.handle(),
                target_is_local_player: target.handle() == local.handle(),
            });
        }
    }

    fn classify(&mut self, entity: &dyn Entity, ctx: &FrameContext, config: &Config) {
        if entity.is_weapon() {
            if !entity.owner().is_valid() {
                self.weapons
                    .push(WeaponData::new(entity, ctx.game, ctx.local_origin));
            }
            return;
        }

        let class = entity.class_id();
        match class {
            ClassId::BaseCsGrenadeProjectile if !entity.should_draw() => {
                if let Some(projectile) = self.projectiles.get_mut(entity.handle()) {
                    projectile.exploded = true;
                }
            }
            class if projectile::is_projectile(class) => {
                self.projectiles.upsert(
                    entity.handle(),
                    |projectile| projectile.update(entity, ctx),
                    || ProjectileData::new(entity, ctx),
                );
            }
            ClassId::DynamicProp
                if !entity
                    .model_name()
                    .is_some_and(|model| model.contains("challenge_coin")) => {}
            ClassId::EconEntity
            | ClassId::Chicken
            | ClassId::PlantedC4
            | ClassId::Hostage
            | ClassId::Dronegun
            | ClassId::Cash
            | ClassId::AmmoBox
            | ClassId::RadarJammer
            | ClassId::SnowballPile
            | ClassId::DynamicProp => match EntityData::new(entity, ctx.local_origin) {
                Some(data) => self.entities.push(data),
                None => {
                    warn!("no name for entity class {class:?}");
                    debug_assert!(false, "no name for entity class {class:?}");
                }
            },
            ClassId::LootCrate => self
                .loot_crates
                .push(LootCrateData::new(entity, ctx.local_origin)),
            ClassId::Inferno => self.infernos.push(InfernoData::new(entity)),
            _ => {}
        }

        // Writes into the game world, not only reads from it.
        if class == ClassId::FogController && !config.fog.no_fog {
            entity.write_fog(&fog_params(&config.fog, ctx.realtime));
        }

        if class == ClassId::SmokeGrenadeProjectile && entity.did_smoke_effect() {
            self.smokes.push(SmokeData::new(entity));
        }
    }
}

pub fn fog_params(config: &FogConfig, time: f32) -> FogParams {
    let color = if config.rainbow {
        color::rainbow(config.rainbow_speed, time)
    } else {
        config.color
    };

    FogParams {
        enabled: config.enabled,
        start: config.start,
        end: config.end,
        density: config.density,
        color: color.map(color::to_byte),
    }
}

/// Owner of the snapshot. Shared between the update and render paths, usually in an `Arc`.
#[derive(Default)]
pub struct GameData {
    snapshot: Mutex<Snapshot>,
    net_outgoing_latency: AtomicI32,
}

impl GameData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the snapshot, once per game frame. Also writes the configured fog
    /// into the world's fog controller.
    pub fn update(&self, game: &dyn Game, config: &Config) {
        let mut snapshot = self.lock();
        let frame = game.frame_count();
        if snapshot.last_frame == Some(frame) {
            return;
        }
        snapshot.last_frame = Some(frame);

        let latency = game
            .net_channel_latency()
            .map_or(0, |latency| ((latency * 1000.0) as i32).max(0));
        self.net_outgoing_latency.store(latency, Ordering::Relaxed);

        snapshot.rebuild(game, config);
    }

    /// Locks the snapshot for reading. A panic while the lock was held leaves
    /// the last consistent state behind, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn clear_projectile_list(&self) {
        self.lock().projectiles.clear();
    }

    /// Drops avatars of players that are no longer tracked.
    pub fn clear_unused_avatars(&self) {
        let mut snapshot = self.lock();
        let Snapshot {
            avatars, players, ..
        } = &mut *snapshot;
        avatars.retain(|handle, _| players.get(*handle).is_some());
    }

    /// Releases every avatar texture, e.g. after the rendering device was reset.
    pub fn clear_textures(&self) {
        for avatar in self.lock().avatars.values_mut() {
            avatar.texture = None;
        }
    }

    /// Milliseconds, 0 without a connection.
    pub fn net_outgoing_latency(&self) -> i32 {
        self.net_outgoing_latency.load(Ordering::Relaxed)
    }
}
