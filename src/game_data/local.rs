use glam::Vec3;

use crate::{
    game::{Game, Handle, ObserverMode, Team},
    math::vector_from_angle,
};

/// Where the aim rays of the local player end.
const AIM_RAY_LENGTH: f32 = 1000.0;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LocalPlayerData {
    pub exists: bool,
    pub alive: bool,
    pub team: Team,
    /// End of a ray along the edge of the inaccuracy cone.
    pub inaccuracy: Vec3,
    /// End of a ray along view angles plus recoil.
    pub aim_punch: Vec3,
    pub in_reload: bool,
    /// Holding a sniper rifle without scoping in.
    pub no_scope: bool,
    pub shooting: bool,
    pub next_weapon_attack: f32,
    pub velocity_modifier: f32,
    pub fov: i32,
    pub handle: Handle,
    pub flash_duration: f32,
    /// Own origin, or the spectated player's while watching someone.
    pub origin: Vec3,
}

impl LocalPlayerData {
    pub fn update(&mut self, game: &dyn Game) {
        let Some(local) = game.local_player() else {
            self.exists = false;
            return;
        };

        self.exists = true;
        self.alive = local.is_alive();
        self.inaccuracy = Vec3::ZERO;
        self.team = local.team();
        self.velocity_modifier = local.velocity_modifier();

        let eye = local.eye_position();
        let view_angles = game.view_angles();

        if let Some(weapon) = game.entity_from_handle(local.active_weapon()) {
            let cone = (weapon.inaccuracy() + weapon.spread()).to_degrees();
            self.inaccuracy =
                eye + vector_from_angle(view_angles + Vec3::new(cone, 0.0, 0.0)) * AIM_RAY_LENGTH;
            self.in_reload = weapon.in_reload();

            let kind = weapon.weapon_info().map(|info| info.kind).unwrap_or_default();
            self.no_scope = kind.is_sniper_rifle() && !local.is_scoped();
            self.next_weapon_attack = weapon.next_primary_attack();
            self.shooting = if kind.is_pistol() {
                !self.in_reload && self.next_weapon_attack > game.server_time()
            } else {
                local.shots_fired() > 1
            };
        }

        self.fov = match local.fov() {
            0 => local.default_fov(),
            fov => fov,
        };
        self.handle = local.handle();
        self.flash_duration = local.flash_duration();
        self.aim_punch = eye + vector_from_angle(view_angles + local.aim_punch()) * AIM_RAY_LENGTH;

        let mode = local.observer_mode();
        self.origin = match game.entity_from_handle(local.observer_target()) {
            Some(target) if !matches!(mode, ObserverMode::Roaming | ObserverMode::Deathcam) => {
                target.origin()
            }
            _ => local.origin(),
        };
    }
}
