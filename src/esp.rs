//! Overlay drawn from the snapshot: boxes, labels, health bars, skeletons and
//! grenade trails. Every primitive is drawn twice, first as a black one pixel
//! offset shadow with the same alpha.

use std::f32::consts::PI;

use egui::Color32;
use glam::{Mat4, Vec2, Vec3};

use crate::{
    bounding_box::{BoundingBox, convex_hull},
    color,
    config::{
        ALL, BoxStyle, BoxType, ColorToggle, ColorToggleThickness, Config, EspConfig, HealthBar,
        HealthBarType, PlayerEsp, ProjectileEsp, SharedEsp, Snapline, SnaplineType, Trail,
        TrailType, WeaponEsp,
    },
    draw::{DrawList, Font},
    game_data::{BaseData, GameData, PlayerData, ProjectileData, Snapshot, WeaponData},
    math::{units_to_meters, world_to_screen, world_to_screen_exact},
};

const SHADOW_OFFSET: Vec2 = Vec2::splat(1.0);
const HEALTH_BAR_WIDTH: f32 = 3.0;
const ICON_SIZE: f32 = 12.0;
const DEFAULT_FOV: f32 = 90.0;

/// One draw pass over the snapshot.
pub struct StreamProofEsp<'a> {
    draw: &'a mut dyn DrawList,
    config: &'a Config,
    screen_size: Vec2,
    view_matrix: Mat4,
    local_origin: Vec3,
    fov: f32,
    realtime: f32,
    /// Opacity applied to every color of the record being drawn.
    alpha_factor: f32,
}

impl<'a> StreamProofEsp<'a> {
    /// Draws everything the config enables. Holds the snapshot lock for the whole pass.
    pub fn render(draw: &'a mut dyn DrawList, game_data: &GameData, config: &'a Config) {
        if !config.esp.enabled {
            return;
        }

        let snapshot = game_data.lock();
        let local = snapshot.local();
        let mut esp = StreamProofEsp {
            screen_size: draw.display_size(),
            draw,
            config,
            view_matrix: *snapshot.to_screen_matrix(),
            local_origin: local.origin,
            fov: if local.fov > 0 {
                local.fov as f32
            } else {
                DEFAULT_FOV
            },
            realtime: snapshot.realtime(),
            alpha_factor: 1.0,
        };
        esp.render_snapshot(&snapshot);
    }

    fn render_snapshot(&mut self, snapshot: &Snapshot) {
        let config = self.config;
        let esp = &config.esp;

        for weapon in snapshot.weapons() {
            if let Some(config) = esp.weapon(weapon.name, weapon.group) {
                self.weapon_box(weapon, config);
            }
        }

        for entity in snapshot.entities() {
            if let Some(config) = EspConfig::shared(&esp.other_entities, entity.name) {
                self.entity_box(&entity.base, entity.name, config);
            }
        }

        for crate_data in snapshot.loot_crates() {
            if let Some(name) = crate_data.name
                && let Some(config) = EspConfig::shared(&esp.loot_crates, name)
            {
                self.entity_box(&crate_data.base, name, config);
            }
        }

        for projectile in snapshot.projectiles() {
            if let Some(config) = esp.projectile(projectile.name) {
                self.projectile(projectile, config);
            }
        }

        for player in snapshot.players() {
            if (player.dormant && player.fading_alpha(self.realtime) == 0.0)
                || !player.alive
                || !player.in_view_frustum
            {
                continue;
            }

            let configs = esp.players(player.enemy);
            let drawn = configs
                .get(ALL)
                .is_some_and(|config| self.player(player, config));
            if !drawn {
                let key = if player.visible { "Visible" } else { "Occluded" };
                if let Some(config) = configs.get(key) {
                    self.player(player, config);
                }
            }
        }
    }

    fn color(&self, toggle: &ColorToggle) -> Color32 {
        color::calculate(toggle, self.realtime, self.alpha_factor)
    }

    fn fixed_color(&self, color: Color32) -> Color32 {
        color::with_alpha_factor(color, self.alpha_factor)
    }

    fn bounding_box(&self, base: &BaseData, scale: [f32; 3]) -> BoundingBox {
        BoundingBox::from_base(base, scale, &self.view_matrix, self.screen_size)
    }

    fn project(&self, point: Vec3) -> Option<Vec2> {
        world_to_screen(point, &self.view_matrix, self.screen_size)
    }

    /// Font tier by distance, scaled for zoomed in views.
    fn font(&self, name: &str, distance: f32) -> Font {
        let Some(sizes) = self.config.fonts.get(name) else {
            return Font::Default;
        };

        let distance = distance * self.fov / DEFAULT_FOV;
        let size = if distance <= 400.0 {
            sizes.big
        } else if distance <= 1000.0 {
            sizes.medium
        } else {
            sizes.tiny
        };
        Font::Family {
            name: name.to_owned(),
            size,
        }
    }

    fn rect_filled(&mut self, a: Vec2, b: Vec2, color: Color32, shadow: bool) {
        let (min, max) = (a.min(b), a.max(b));
        if shadow {
            self.draw.rect_filled(
                min + SHADOW_OFFSET,
                max + SHADOW_OFFSET,
                color::shadow(color),
                0.0,
            );
        }
        self.draw.rect_filled(min, max, color, 0.0);
    }

    fn render_box(&mut self, bbox: &BoundingBox, config: &BoxStyle) {
        if !config.color.enabled {
            return;
        }

        let color = self.color(&config.color);
        let fill = config.fill.enabled.then(|| self.color(&config.fill));

        match config.kind {
            BoxType::Flat => {
                match fill {
                    Some(fill) => self.draw.rect_filled(
                        bbox.min + SHADOW_OFFSET,
                        bbox.max - SHADOW_OFFSET,
                        fill,
                        config.rounding,
                    ),
                    None => self.draw.rect(
                        bbox.min + SHADOW_OFFSET,
                        bbox.max + SHADOW_OFFSET,
                        color::shadow(color),
                        config.rounding,
                    ),
                }
                self.draw.rect(bbox.min, bbox.max, color, config.rounding);
            }
            BoxType::FlatCorners => {
                if let Some(fill) = fill {
                    self.draw.rect_filled(
                        bbox.min + SHADOW_OFFSET,
                        bbox.max - SHADOW_OFFSET,
                        fill,
                        config.rounding,
                    );
                }
                self.flat_corners(bbox, color, fill.is_none());
            }
            BoxType::Volume | BoxType::VolumeCorners => {
                let corners = config.kind == BoxType::VolumeCorners;
                match fill {
                    Some(fill) => {
                        let hull = convex_hull(bbox.vertices);
                        if hull.len() >= 3 {
                            self.draw.convex_poly_filled(&hull, fill);
                        }
                    }
                    None => self.volume_edges(bbox, SHADOW_OFFSET, color::shadow(color), corners),
                }
                self.volume_edges(bbox, Vec2::ZERO, color, corners);
            }
        }
    }

    fn flat_corners(&mut self, bbox: &BoundingBox, color: Color32, shadow: bool) {
        let (min, max) = (bbox.min, bbox.max);
        let quarter = ((max - min) * 0.25).floor();

        self.rect_filled(min, Vec2::new(min.x + 1.0, min.y + quarter.y), color, shadow);
        self.rect_filled(min, Vec2::new(min.x + quarter.x, min.y + 1.0), color, shadow);

        self.rect_filled(
            Vec2::new(max.x, min.y),
            Vec2::new(max.x - quarter.x, min.y + 1.0),
            color,
            shadow,
        );
        self.rect_filled(
            Vec2::new(max.x - 1.0, min.y),
            Vec2::new(max.x, min.y + quarter.y),
            color,
            shadow,
        );

        self.rect_filled(
            Vec2::new(min.x, max.y),
            Vec2::new(min.x + 1.0, max.y - quarter.y),
            color,
            shadow,
        );
        self.rect_filled(
            Vec2::new(min.x, max.y - 1.0),
            Vec2::new(min.x + quarter.x, max.y),
            color,
            shadow,
        );

        self.rect_filled(max, Vec2::new(max.x - quarter.x, max.y - 1.0), color, shadow);
        self.rect_filled(max, Vec2::new(max.x - 1.0, max.y - quarter.y), color, shadow);
    }

    /// The 12 box edges, or only their outer quarters when `corners` is set.
    fn volume_edges(&mut self, bbox: &BoundingBox, offset: Vec2, color: Color32, corners: bool) {
        for (i, j) in BoundingBox::edges() {
            let a = bbox.vertices[i] + offset;
            let b = bbox.vertices[j] + offset;
            if corners {
                self.draw.line(a, a.lerp(b, 0.25), color, 1.0);
                self.draw.line(a.lerp(b, 0.75), b, color, 1.0);
            } else {
                self.draw.line(a, b, color, 1.0);
            }
        }
    }

    /// Draws `text` anchored at `pos` and returns its size, or zero when culled.
    /// `centered` centers it horizontally, `above` puts its bottom edge on `pos`.
    #[allow(clippy::too_many_arguments)]
    fn render_text(
        &mut self,
        distance: f32,
        cull_distance: f32,
        color: Color32,
        text: &str,
        font: &Font,
        pos: Vec2,
        centered: bool,
        above: bool,
    ) -> Vec2 {
        if cull_distance != 0.0 && units_to_meters(distance) > cull_distance {
            return Vec2::ZERO;
        }

        let size = self.draw.text_size(text, font);
        let offset = Vec2::new(
            if centered { size.x / 2.0 } else { 0.0 },
            if above { size.y } else { 0.0 },
        );
        let pos = pos - offset;

        self.draw
            .text(pos + SHADOW_OFFSET, text, font, color::shadow(color));
        self.draw.text(pos, text, font, color);
        size
    }

    fn snapline(&mut self, config: &Snapline, min: Vec2, max: Vec2) {
        if !config.color.enabled {
            return;
        }

        let screen = self.screen_size;
        let (from_y, to_y) = match config.kind {
            SnaplineType::Bottom => (screen.y, max.y),
            SnaplineType::Top => (0.0, min.y),
            SnaplineType::Crosshair => (screen.y / 2.0, (min.y + max.y) / 2.0),
        };

        let color = self.color(&config.color);
        self.draw.line(
            Vec2::new(screen.x / 2.0, from_y),
            Vec2::new((min.x + max.x) / 2.0, to_y),
            color,
            config.thickness,
        );
    }

    fn health_bar(&mut self, config: &HealthBar, pos: Vec2, height: f32, health: i32) {
        if !config.color.enabled {
            return;
        }

        let missing = (100 - health) as f32 / 100.0 * height;
        self.draw.push_clip_rect(
            pos + Vec2::new(0.0, missing),
            pos + Vec2::new(HEALTH_BAR_WIDTH + 1.0, height + 1.0),
        );

        if config.kind == HealthBarType::Gradient {
            let green = self.fixed_color(Color32::from_rgb(0, 255, 0));
            let yellow = self.fixed_color(Color32::from_rgb(255, 255, 0));
            let red = self.fixed_color(Color32::from_rgb(255, 0, 0));
            let black = self.fixed_color(Color32::BLACK);

            self.draw.rect_filled(
                pos + SHADOW_OFFSET,
                pos + Vec2::new(HEALTH_BAR_WIDTH + 1.0, height + 1.0),
                black,
                0.0,
            );

            let half = Vec2::new(0.0, height / 2.0);
            let min = pos;
            let max = pos + Vec2::new(HEALTH_BAR_WIDTH, height / 2.0);
            self.draw
                .rect_filled_multicolor(min.floor(), max.floor(), green, yellow);
            self.draw.rect_filled_multicolor(
                (min + half).floor(),
                (max + half).floor(),
                yellow,
                red,
            );
        } else {
            let color = if config.kind == HealthBarType::HealthBased {
                self.fixed_color(color::health_color(health))
            } else {
                self.color(&config.color)
            };
            self.draw.rect_filled(
                pos + SHADOW_OFFSET,
                pos + Vec2::new(HEALTH_BAR_WIDTH + 1.0, height + 1.0),
                color::shadow(color),
                0.0,
            );
            self.draw.rect_filled(
                pos,
                pos + Vec2::new(HEALTH_BAR_WIDTH, height),
                color,
                0.0,
            );
        }

        self.draw.pop_clip_rect();
    }

    fn player_box(&mut self, player: &PlayerData, config: &PlayerEsp) {
        let shared = &config.shared;
        let bbox = self.bounding_box(&player.base, shared.box_style.scale);
        if !bbox.is_valid() {
            return;
        }

        self.render_box(&bbox, &shared.box_style);

        let distance = player.base.distance_to_local;
        let center_x = (bbox.min.x + bbox.max.x) / 2.0;
        let mut offset_mins = Vec2::ZERO;
        let mut offset_maxs = Vec2::ZERO;

        let health = player.health.clamp(0, 100);
        let height = bbox.max.y - bbox.min.y;
        let bar_pos = bbox.min - Vec2::new(5.0, 0.0);
        self.health_bar(&config.health_bar, bar_pos, height, health);
        if config.health_bar.color.enabled && health < 100 {
            let pos = bar_pos + Vec2::new(0.0, (100 - health) as f32 / 100.0 * height);
            let color = self.fixed_color(Color32::WHITE);
            self.render_text(
                distance,
                shared.text_cull_distance,
                color,
                &health.to_string(),
                &Font::Default,
                pos,
                true,
                true,
            );
        }

        let font = self.font(&shared.font, distance);

        if shared.name.enabled {
            let color = self.color(&shared.name);
            let size = self.render_text(
                distance,
                shared.text_cull_distance,
                color,
                &player.name,
                &font,
                Vec2::new(center_x, bbox.min.y - 2.0),
                true,
                true,
            );
            offset_mins.y -= size.y + 2.0;
        }

        if config.flash_duration.enabled && player.flash_duration > 0.0 {
            let radius = (5.0 - distance / 600.0).max(1.0);
            let center = Vec2::new(center_x, bbox.min.y + offset_mins.y - radius * 1.5);
            let sweep = player.flash_duration / 255.0 * PI;
            let color = self.color(&config.flash_duration);
            let thickness = 0.9 + radius * 0.1;

            self.draw.arc(
                center + SHADOW_OFFSET,
                radius,
                PI / 2.0 - sweep,
                PI / 2.0 + sweep,
                color::shadow(color),
                thickness,
            );
            self.draw.arc(
                center,
                radius,
                PI / 2.0 - sweep,
                PI / 2.0 + sweep,
                color,
                thickness,
            );
            offset_mins.y -= radius * 2.5;
        }

        if config.weapon.enabled && !player.active_weapon.is_empty() {
            let color = self.color(&config.weapon);
            let size = self.render_text(
                distance,
                shared.text_cull_distance,
                color,
                &player.active_weapon,
                &font,
                Vec2::new(center_x, bbox.max.y + 1.0),
                true,
                false,
            );
            offset_maxs.y += size.y + 2.0;
        }

        if config.weapon_icon.enabled && !player.active_weapon.is_empty() {
            let below = if config.weapon.enabled { 15.0 } else { 1.0 };
            let color = self.color(&config.weapon_icon);
            let size = self.render_text(
                distance,
                shared.text_cull_distance,
                color,
                &player.active_weapon_icon,
                &Font::Icons { size: ICON_SIZE },
                Vec2::new(center_x, bbox.max.y + below),
                true,
                false,
            );
            offset_maxs.y += size.y + 2.0;
        }

        self.snapline(
            &shared.snapline,
            bbox.min + offset_mins,
            bbox.max + offset_maxs,
        );
    }

    fn skeleton(&mut self, config: &ColorToggleThickness, bones: &[(Vec3, Vec3)]) {
        if !config.color.enabled {
            return;
        }

        let color = self.color(&config.color);
        let segments: Vec<(Vec2, Vec2)> = bones
            .iter()
            .filter_map(|&(bone, parent)| Some((self.project(bone)?, self.project(parent)?)))
            .collect();

        for &(bone, parent) in &segments {
            self.draw.line(
                bone + SHADOW_OFFSET,
                parent + SHADOW_OFFSET,
                color::shadow(color),
                config.thickness,
            );
        }
        for &(bone, parent) in &segments {
            self.draw.line(bone, parent, color, config.thickness);
        }
    }

    fn line_of_sight(&mut self, config: &ColorToggleThickness, player: &PlayerData) {
        if !config.color.enabled {
            return;
        }

        if let Some(start) = self.project(player.head_center())
            && let Some(end) = self.project(player.looking_at)
        {
            let color = self.color(&config.color);
            self.draw.line(start, end, color, config.thickness);
            self.draw.circle(end, 5.0, color, config.thickness);
        }
    }

    /// Returns false when `config` is disabled, so the caller can try the next one.
    fn player(&mut self, player: &PlayerData, config: &PlayerEsp) -> bool {
        if !config.shared.enabled {
            return false;
        }

        // Both filters on means audible or spotted.
        if (config.audible_only && !player.audible && !config.spotted_only)
            || (config.spotted_only
                && !player.spotted
                && !(config.audible_only && player.audible))
        {
            return true;
        }

        if player.immune {
            self.alpha_factor = 0.5;
        }
        self.alpha_factor *= player.fading_alpha(self.realtime);

        self.player_box(player, config);
        self.skeleton(&config.skeleton, &player.bones);

        let head = BoundingBox::new(
            player.head_mins,
            player.head_maxs,
            config.head_box.scale,
            None,
            &self.view_matrix,
            self.screen_size,
        );
        if head.is_valid() {
            self.render_box(&head, &config.head_box);
        }

        self.line_of_sight(&config.line_of_sight, player);

        self.alpha_factor = 1.0;
        true
    }

    fn weapon_box(&mut self, weapon: &WeaponData, config: &WeaponEsp) {
        let shared = &config.shared;
        let bbox = self.bounding_box(&weapon.base, shared.box_style.scale);
        if !bbox.is_valid() {
            return;
        }

        self.render_box(&bbox, &shared.box_style);
        self.snapline(&shared.snapline, bbox.min, bbox.max);

        let distance = weapon.base.distance_to_local;
        let font = self.font(&shared.font, distance);
        let center_x = (bbox.min.x + bbox.max.x) / 2.0;

        if shared.name.enabled && !weapon.display_name.is_empty() {
            let color = self.color(&shared.name);
            self.render_text(
                distance,
                shared.text_cull_distance,
                color,
                &weapon.display_name,
                &font,
                Vec2::new(center_x, bbox.min.y - 2.0),
                true,
                true,
            );
        }

        if config.ammo.enabled && weapon.clip != -1 {
            let color = self.color(&config.ammo);
            let text = format!("{} / {}", weapon.clip, weapon.reserve_ammo);
            self.render_text(
                distance,
                shared.text_cull_distance,
                color,
                &text,
                &font,
                Vec2::new(center_x, bbox.max.y + 1.0),
                true,
                false,
            );
        }
    }

    fn entity_box(&mut self, base: &BaseData, name: &str, config: &SharedEsp) {
        let bbox = self.bounding_box(base, config.box_style.scale);
        if !bbox.is_valid() {
            return;
        }

        self.render_box(&bbox, &config.box_style);
        self.snapline(&config.snapline, bbox.min, bbox.max);

        if config.name.enabled {
            let distance = base.distance_to_local;
            let font = self.font(&config.font, distance);
            let color = self.color(&config.name);
            self.render_text(
                distance,
                config.text_cull_distance,
                color,
                name,
                &font,
                Vec2::new((bbox.min.x + bbox.max.x) / 2.0, bbox.min.y - 5.0),
                true,
                true,
            );
        }
    }

    fn projectile(&mut self, projectile: &ProjectileData, config: &ProjectileEsp) {
        if !projectile.exploded {
            self.entity_box(&projectile.base, projectile.name, &config.shared);
        }

        let trails = &config.trails;
        if trails.enabled {
            let trail = if projectile.thrown_by_local_player {
                &trails.local_player
            } else if !projectile.thrown_by_enemy {
                &trails.allies
            } else {
                &trails.enemies
            };
            self.trail(trail, &projectile.trajectory);
        }
    }

    fn trail(&mut self, config: &Trail, trajectory: &[(f32, Vec3)]) {
        if !config.color.enabled {
            return;
        }

        let color = self.color(&config.color);
        let mut points = Vec::new();

        for &(time, point) in trajectory {
            if time + config.time < self.realtime {
                continue;
            }
            let Some(pos) = world_to_screen_exact(point, &self.view_matrix, self.screen_size)
            else {
                continue;
            };

            let radius = 3.5 - point.distance(self.local_origin) / 700.0;
            match config.kind {
                TrailType::Line => points.push(pos),
                TrailType::Circles => self.draw.circle(pos, radius, color, config.thickness),
                TrailType::FilledCircles => self.draw.circle_filled(pos, radius, color),
            }
        }

        if config.kind == TrailType::Line {
            let shadow: Vec<Vec2> = points.iter().map(|&point| point + SHADOW_OFFSET).collect();
            self.draw
                .polyline(&shadow, color::shadow(color), config.thickness);
            self.draw.polyline(&points, color, config.thickness);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::FontConfig,
        draw::{DrawCommand, RecordingDrawList},
        math::tests::forward_camera,
    };

    const SCREEN: Vec2 = Vec2::new(800.0, 600.0);

    fn pass<'a>(draw: &'a mut RecordingDrawList, config: &'a Config) -> StreamProofEsp<'a> {
        StreamProofEsp {
            draw,
            config,
            screen_size: SCREEN,
            view_matrix: forward_camera(),
            local_origin: Vec3::ZERO,
            fov: 90.0,
            realtime: 10.0,
            alpha_factor: 1.0,
        }
    }

    fn bbox() -> BoundingBox {
        BoundingBox::new(
            Vec3::new(100.0, -10.0, -10.0),
            Vec3::new(120.0, 10.0, 10.0),
            [0.25; 3],
            None,
            &forward_camera(),
            SCREEN,
        )
    }

    fn style(kind: BoxType, fill: bool) -> BoxStyle {
        let mut style = BoxStyle {
            color: ColorToggle::enabled(Color32::RED),
            kind,
            ..Default::default()
        };
        style.fill.enabled = fill;
        style
    }

    fn count(draw: &RecordingDrawList, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        draw.commands().iter().filter(|command| pred(command)).count()
    }

    #[test]
    fn flat_box_draws_shadow_then_box() {
        let config = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        let bbox = bbox();
        pass(&mut draw, &config).render_box(&bbox, &style(BoxType::Flat, false));

        let commands = draw.commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(
            commands[0],
            DrawCommand::Rect { min, color, filled: false, .. }
                if min == bbox.min + SHADOW_OFFSET && color == Color32::BLACK
        ));
        assert!(matches!(
            commands[1],
            DrawCommand::Rect { min, color, .. } if min == bbox.min && color == Color32::RED
        ));
    }

    #[test]
    fn filled_box_has_no_shadow() {
        let config = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        pass(&mut draw, &config).render_box(&bbox(), &style(BoxType::Flat, true));

        assert_eq!(
            count(&draw, |c| matches!(c, DrawCommand::Rect { filled: true, .. })),
            1
        );
        assert_eq!(
            count(&draw, |c| matches!(c, DrawCommand::Rect { filled: false, .. })),
            1
        );
    }

    #[test]
    fn corner_boxes() {
        let config = Config::default();

        let mut draw = RecordingDrawList::new(SCREEN);
        pass(&mut draw, &config).render_box(&bbox(), &style(BoxType::FlatCorners, false));
        assert_eq!(draw.len(), 16);

        let mut draw = RecordingDrawList::new(SCREEN);
        pass(&mut draw, &config).render_box(&bbox(), &style(BoxType::FlatCorners, true));
        assert_eq!(draw.len(), 9);

        let mut draw = RecordingDrawList::new(SCREEN);
        pass(&mut draw, &config).render_box(&bbox(), &style(BoxType::VolumeCorners, false));
        assert_eq!(draw.len(), 48);
    }

    #[test]
    fn volume_box_fill_uses_hull() {
        let config = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        pass(&mut draw, &config).render_box(&bbox(), &style(BoxType::Volume, true));

        assert_eq!(
            count(&draw, |c| matches!(c, DrawCommand::Polygon { .. })),
            1
        );
        assert_eq!(count(&draw, |c| matches!(c, DrawCommand::Line { .. })), 12);
    }

    #[test]
    fn disabled_box_draws_nothing() {
        let config = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        pass(&mut draw, &config).render_box(&bbox(), &BoxStyle::default());
        assert!(draw.is_empty());
    }

    #[test]
    fn text_is_culled_by_distance() {
        let config = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        let mut esp = pass(&mut draw, &config);

        // 1000 units is 25.4 m
        let culled = esp.render_text(
            1000.0,
            25.0,
            Color32::WHITE,
            "far",
            &Font::Default,
            Vec2::ZERO,
            true,
            true,
        );
        assert_eq!(culled, Vec2::ZERO);

        let size = esp.render_text(
            1000.0,
            0.0,
            Color32::WHITE,
            "far",
            &Font::Default,
            Vec2::new(100.0, 100.0),
            true,
            true,
        );
        assert_eq!(size, Vec2::new(19.5, 13.0));
        assert_eq!(draw.texts().collect::<Vec<_>>(), ["far", "far"]);
        assert!(matches!(
            draw.commands()[1],
            DrawCommand::Text { pos, .. } if pos == Vec2::new(100.0 - 9.75, 100.0 - 13.0)
        ));
    }

    #[test]
    fn font_tiers_scale_with_fov() {
        let mut config = Config::default();
        config.fonts.insert("Tahoma".into(), FontConfig::default());
        let mut draw = RecordingDrawList::new(SCREEN);
        let mut esp = pass(&mut draw, &config);

        let size = |font: Font| match font {
            Font::Family { size, .. } => size,
            _ => 0.0,
        };
        assert_eq!(size(esp.font("Tahoma", 300.0)), 15.0);
        assert_eq!(size(esp.font("Tahoma", 900.0)), 13.0);
        assert_eq!(size(esp.font("Tahoma", 1200.0)), 10.0);
        assert_eq!(esp.font("Missing", 0.0), Font::Default);

        esp.fov = 45.0;
        assert_eq!(size(esp.font("Tahoma", 1200.0)), 13.0);
    }

    #[test]
    fn snapline_anchors() {
        let config = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        let mut esp = pass(&mut draw, &config);
        let snapline = |kind| Snapline {
            color: ColorToggle::enabled(Color32::WHITE),
            kind,
            thickness: 2.0,
        };
        let (min, max) = (Vec2::new(10.0, 20.0), Vec2::new(30.0, 60.0));

        esp.snapline(&snapline(SnaplineType::Bottom), min, max);
        esp.snapline(&snapline(SnaplineType::Top), min, max);
        esp.snapline(&snapline(SnaplineType::Crosshair), min, max);

        let lines: Vec<_> = draw
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { a, b, .. } => Some((*a, *b)),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            [
                (Vec2::new(400.0, 600.0), Vec2::new(20.0, 60.0)),
                (Vec2::new(400.0, 0.0), Vec2::new(20.0, 20.0)),
                (Vec2::new(400.0, 300.0), Vec2::new(20.0, 40.0)),
            ]
        );
    }

    #[test]
    fn health_bar_is_clipped_to_health() {
        let config = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        let bar = HealthBar {
            color: ColorToggle::enabled(Color32::WHITE),
            kind: HealthBarType::Gradient,
        };
        pass(&mut draw, &config).health_bar(&bar, Vec2::new(10.0, 0.0), 100.0, 25);

        let commands = draw.commands();
        assert!(matches!(
            commands[0],
            DrawCommand::PushClip { min, max }
                if min == Vec2::new(10.0, 75.0) && max == Vec2::new(14.0, 101.0)
        ));
        assert_eq!(
            count(&draw, |c| matches!(c, DrawCommand::Gradient { .. })),
            2
        );
        assert_eq!(commands.last(), Some(&DrawCommand::PopClip));
        assert_eq!(draw.clip_depth(), 0);
    }

    #[test]
    fn garbage_health_is_clamped() {
        let mut config = PlayerEsp::default();
        config.health_bar.color = ColorToggle::enabled(Color32::GREEN);

        let player = PlayerData {
            alive: true,
            health: i32::MIN,
            base: BaseData {
                obb_mins: Vec3::new(100.0, -10.0, -10.0),
                obb_maxs: Vec3::new(120.0, 10.0, 10.0),
                ..Default::default()
            },
            ..Default::default()
        };

        let root = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        pass(&mut draw, &root).player_box(&player, &config);

        let (top, bottom) = draw
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::PushClip { min, max } => Some((min.y, max.y)),
                _ => None,
            })
            .unwrap();
        assert!((bottom - top - 1.0).abs() < 1e-3);
        assert_eq!(draw.texts().collect::<Vec<_>>(), ["0", "0"]);
    }

    #[test]
    fn line_trail_keeps_recent_samples() {
        let config = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        let trail = Trail {
            color: ColorToggle::enabled(Color32::WHITE),
            ..Default::default()
        };
        let trajectory = [
            (5.0, Vec3::new(100.0, 0.0, 0.0)),
            (8.5, Vec3::new(110.0, 0.0, 0.0)),
            (9.5, Vec3::new(120.0, 0.0, 0.0)),
            (9.9, Vec3::new(-50.0, 0.0, 0.0)),
        ];
        pass(&mut draw, &config).trail(&trail, &trajectory);

        let lengths: Vec<_> = draw
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Polyline { points, .. } => Some(points.len()),
                _ => None,
            })
            .collect();
        assert_eq!(lengths, [2, 2]);
    }

    #[test]
    fn immune_players_are_dimmed() {
        let mut config = PlayerEsp::default();
        config.shared.enabled = true;
        config.skeleton.color = ColorToggle::enabled(Color32::WHITE);

        let player = PlayerData {
            alive: true,
            immune: true,
            last_contact_time: 10.0,
            bones: vec![(Vec3::new(100.0, 0.0, 10.0), Vec3::new(100.0, 0.0, 0.0))],
            ..Default::default()
        };

        let root = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        let mut esp = pass(&mut draw, &root);
        assert!(esp.player(&player, &config));
        assert_eq!(esp.alpha_factor, 1.0);

        let alphas: Vec<u8> = draw
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { color, .. } => Some(color.a()),
                _ => None,
            })
            .collect();
        assert_eq!(alphas.len(), 2);
        assert!(alphas.iter().all(|&a| a == 127 || a == 128));
    }

    #[test]
    fn audible_and_spotted_filters_combine() {
        let mut config = PlayerEsp::default();
        config.shared.enabled = true;
        config.skeleton.color = ColorToggle::enabled(Color32::WHITE);
        config.audible_only = true;
        config.spotted_only = true;

        let mut player = PlayerData {
            alive: true,
            last_contact_time: 10.0,
            bones: vec![(Vec3::new(100.0, 0.0, 10.0), Vec3::new(100.0, 0.0, 0.0))],
            ..Default::default()
        };

        let root = Config::default();
        let mut draw = RecordingDrawList::new(SCREEN);
        assert!(pass(&mut draw, &root).player(&player, &config));
        assert!(draw.is_empty());

        player.audible = true;
        assert!(pass(&mut draw, &root).player(&player, &config));
        assert!(!draw.is_empty());

        let mut disabled = config.clone();
        disabled.shared.enabled = false;
        assert!(!pass(&mut draw, &root).player(&player, &disabled));
    }
}
