use glam::Vec3;

use crate::game::{Entity, Game, Handle};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Bombsite {
    #[default]
    A,
    B,
}

/// The ticking bomb. `blow_time` is 0 while no bomb is ticking.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BombData {
    pub blow_time: f32,
    pub timer_length: f32,
    pub defuser: Handle,
    pub defuse_count_down: f32,
    pub defuse_length: f32,
    pub bombsite: Bombsite,
}

impl BombData {
    pub fn update(&mut self, game: &dyn Game) {
        if let Some(bomb) = game.planted_c4()
            && game.map_has_bomb_target()
            && bomb.c4_ticking()
        {
            self.blow_time = bomb.c4_blow_time();
            self.timer_length = bomb.c4_timer_length();
            self.defuser = bomb.c4_defuser();
            if self.defuser.is_valid() {
                self.defuse_count_down = bomb.c4_defuse_countdown();
                self.defuse_length = bomb.c4_defuse_length();
            }

            if let Some(resource) = game.player_resource() {
                let origin = bomb.origin();
                let to_a = origin.distance(resource.bombsite_center_a());
                let to_b = origin.distance(resource.bombsite_center_b());
                self.bombsite = if to_a > to_b { Bombsite::B } else { Bombsite::A };
            }
            return;
        }

        self.blow_time = 0.0;
    }

    pub fn is_ticking(&self) -> bool {
        self.blow_time > 0.0
    }

    pub fn is_being_defused(&self) -> bool {
        self.is_ticking() && self.defuser.is_valid()
    }
}

/// Burning fire points of one inferno, in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct InfernoData {
    pub owner: Handle,
    pub points: Vec<Vec3>,
}

impl InfernoData {
    pub fn new(inferno: &dyn Entity) -> Self {
        let origin = inferno.origin();
        Self {
            owner: inferno.owner(),
            points: inferno
                .fire_points()
                .into_iter()
                .filter(|fire| fire.burning)
                .map(|fire| origin + fire.delta)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmokeData {
    pub origin: Vec3,
}

impl SmokeData {
    pub fn new(smoke: &dyn Entity) -> Self {
        Self {
            origin: smoke.origin(),
        }
    }
}
