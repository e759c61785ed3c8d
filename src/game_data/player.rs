use glam::Vec3;

use crate::{
    game::{Entity, Handle, Team},
    game_data::{FrameContext, Snapshot, base::BaseData},
    math::vector_from_angle,
    tracked::Keyed,
};

const GAZE_LENGTH: f32 = 1000.0;
/// Full opacity hold after the last contact, then the fade length.
const FADE_HOLD: f32 = 0.25;
const FADE_TIME: f32 = 1.5;

/// A player other than the local one, kept across frames so dormant players fade out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerData {
    pub base: BaseData,
    pub user_id: i32,
    pub platform_id: u64,
    pub handle: Handle,
    pub name: String,
    pub team: Team,
    pub money: i32,
    pub health: i32,
    pub armor: i32,
    pub skill_group: i32,
    pub competitive_wins: i32,
    pub has_bomb: bool,
    pub clan_tag: String,
    pub dormant: bool,
    pub alive: bool,
    pub in_view_frustum: bool,
    /// Refreshed on the shared visibility tick only.
    pub visible: bool,
    pub audible: bool,
    pub spotted: bool,
    pub enemy: bool,
    pub immune: bool,
    pub flash_duration: f32,
    pub last_contact_time: f32,
    /// Localized active weapon name, empty without a weapon.
    pub active_weapon: String,
    pub active_weapon_icon: String,
    pub ammo_in_clip: i32,
    pub max_clip: i32,
    /// `(bone, parent)` world positions.
    pub bones: Vec<(Vec3, Vec3)>,
    pub head_mins: Vec3,
    pub head_maxs: Vec3,
    /// Where the player's view ray hits the world.
    pub looking_at: Vec3,
    pub origin: Vec3,
}

impl PlayerData {
    pub fn new(entity: &dyn Entity, ctx: &FrameContext) -> Self {
        let mut player = Self {
            base: BaseData::new(entity, ctx.local_origin),
            user_id: entity.user_id(),
            platform_id: entity.platform_id(),
            handle: entity.handle(),
            money: entity.money(),
            ..Default::default()
        };
        player.update(entity, ctx);
        player
    }

    pub fn update(&mut self, entity: &dyn Entity, ctx: &FrameContext) {
        let game = ctx.game;
        self.name = entity.player_name();
        let index = entity.index();

        let resource = game.player_resource();
        if let Some(resource) = resource {
            self.armor = resource.armor(index);
            self.skill_group = resource.competitive_ranking(index);
            self.competitive_wins = resource.competitive_wins(index);
            self.has_bomb = index == resource.c4_index();
            self.clan_tag = resource
                .clan(index)
                .filter(|clan| !clan.is_empty())
                .unwrap_or_default();
        }

        self.dormant = entity.is_dormant();
        if self.dormant {
            if let Some(resource) = resource {
                self.alive = resource.is_alive(index);
                if !self.alive {
                    self.last_contact_time = 0.0;
                }
                self.health = resource.health(index);
            }
            return;
        }

        self.money = entity.money();
        self.team = entity.team();
        self.base = BaseData::new(entity, ctx.local_origin);
        self.origin = entity.origin();
        self.in_view_frustum = !game.cull_box(
            self.base.obb_mins + self.origin,
            self.base.obb_maxs + self.origin,
        );
        self.alive = entity.is_alive();
        self.last_contact_time = if self.alive { ctx.realtime } else { 0.0 };

        let start = entity.eye_position();
        let end = start + vector_from_angle(entity.eye_angles()) * GAZE_LENGTH;
        self.looking_at = game.trace_ray(start, end, entity);

        if let Some(local) = ctx.local {
            self.enemy = game.is_other_enemy(entity, local);

            if !self.in_view_frustum || !self.alive {
                self.visible = false;
            } else if ctx.update_visibility {
                self.visible = game.is_visible_to(entity, local);
            }
        }

        self.audible = game.is_entity_audible(index);
        self.spotted = entity.is_spotted();
        self.health = entity.health();
        self.immune = entity.gun_game_immunity();
        self.flash_duration = entity.flash_duration();

        if let Some(weapon) = game.entity_from_handle(entity.active_weapon()) {
            self.audible = self.audible || game.is_entity_audible(weapon.index());
            self.active_weapon_icon = game.localize(weapon.weapon_id().icon());
            self.ammo_in_clip = weapon.clip();
            if let Some(info) = weapon.weapon_info() {
                self.max_clip = info.max_clip;
                self.active_weapon = game.localize(&info.name);
            }
        }

        if !self.alive || !self.in_view_frustum {
            return;
        }

        self.bones = entity.bone_segments();

        if let Some(head) = entity.head_hitbox() {
            self.head_mins = head.bone.transform_point3(head.mins);
            self.head_maxs = head.bone.transform_point3(head.maxs);
            if head.capsule_radius > 0.0 {
                self.head_mins -= head.capsule_radius;
                self.head_maxs += head.capsule_radius;
            }
        }
    }

    /// 1 for 0.25s after the last contact, then a linear fade to 0 over 1.5s.
    pub fn fading_alpha(&self, now: f32) -> f32 {
        (1.0 - (now - self.last_contact_time - FADE_HOLD) / FADE_TIME).clamp(0.0, 1.0)
    }

    /// Localized rank, from the danger zone table in survival.
    pub fn rank_name<'a>(&self, snapshot: &'a Snapshot) -> &'a str {
        snapshot.rank_name(self.skill_group)
    }

    pub fn head_center(&self) -> Vec3 {
        (self.head_mins + self.head_maxs) / 2.0
    }
}

impl Keyed for PlayerData {
    fn handle(&self) -> Handle {
        self.handle
    }
}

/// A dead player spectating someone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverData {
    pub player: Handle,
    pub target: Handle,
    pub target_is_local_player: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fading_alpha_curve() {
        let player = PlayerData {
            last_contact_time: 10.0,
            ..Default::default()
        };
        assert_eq!(player.fading_alpha(10.0), 1.0);
        assert_eq!(player.fading_alpha(10.25), 1.0);

        let mut previous = 1.0;
        for step in 1..30 {
            let alpha = player.fading_alpha(10.25 + step as f32 * 0.05);
            assert!(alpha < previous);
            previous = alpha;
        }

        assert_eq!(player.fading_alpha(11.75), 0.0);
        assert_eq!(player.fading_alpha(20.0), 0.0);
    }
}
