use std::f32::consts::PI;

use egui::Color32;

use crate::config::ColorToggle;

/// Cycling hue for `rainbow` colors, RGB in 0..=1.
pub fn rainbow(speed: f32, time: f32) -> [f32; 3] {
    let phase = speed * time;
    [
        phase.sin() * 0.5 + 0.5,
        (phase + 2.0 * PI / 3.0).sin() * 0.5 + 0.5,
        (phase + 4.0 * PI / 3.0).sin() * 0.5 + 0.5,
    ]
}

/// Resolves a configured color at `time`, with alpha scaled by `alpha_factor`.
pub fn calculate(config: &ColorToggle, time: f32, alpha_factor: f32) -> Color32 {
    let alpha = (config.color.a() as f32 * alpha_factor).clamp(0.0, 255.0) as u8;
    if config.rainbow {
        let [r, g, b] = rainbow(config.rainbow_speed, time).map(to_byte);
        Color32::from_rgba_unmultiplied(r, g, b, alpha)
    } else {
        let [r, g, b, _] = config.color.to_srgba_unmultiplied();
        Color32::from_rgba_unmultiplied(r, g, b, alpha)
    }
}

pub fn with_alpha_factor(color: Color32, alpha_factor: f32) -> Color32 {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let alpha = (a as f32 * alpha_factor).clamp(0.0, 255.0) as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// Black with the alpha of `color`, drawn one pixel behind it.
pub fn shadow(color: Color32) -> Color32 {
    Color32::from_black_alpha(color.a())
}

/// Red at 0 through yellow at 50 to green at 100.
pub fn health_color(health: i32) -> Color32 {
    let health = health.clamp(0, 100);

    let (r, g) = if health <= 50 {
        let factor = health as f32 / 50.0;
        (255, (255.0 * factor) as u8)
    } else {
        let factor = 1.0 - (health - 50) as f32 / 50.0;
        ((255.0 * factor) as u8, 255)
    };

    Color32::from_rgb(r, g, 0)
}

/// 0..=1 channel to 0..=255, clamped.
pub fn to_byte(channel: f32) -> u8 {
    ((channel * 255.0) as i32).clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_color_endpoints() {
        assert_eq!(health_color(0), Color32::from_rgb(255, 0, 0));
        assert_eq!(health_color(50), Color32::from_rgb(255, 255, 0));
        assert_eq!(health_color(100), Color32::from_rgb(0, 255, 0));
        assert_eq!(health_color(150), health_color(100));
    }

    #[test]
    fn shadow_keeps_alpha() {
        let color = Color32::from_rgba_unmultiplied(200, 100, 50, 128);
        assert_eq!(shadow(color).a(), 128);
        assert_eq!(shadow(Color32::WHITE), Color32::BLACK);
    }

    #[test]
    fn alpha_factor_scales_alpha() {
        let config = ColorToggle::enabled(Color32::from_rgb(255, 0, 0));
        let half = calculate(&config, 0.0, 0.5);
        assert_eq!(half.a(), 127);
        assert_eq!(calculate(&config, 0.0, 1.0), Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn rainbow_stays_in_range() {
        for step in 0..100 {
            for channel in rainbow(1.3, step as f32 * 0.37) {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
    }

    #[test]
    fn channel_bytes_are_clamped() {
        assert_eq!(to_byte(-0.5), 0);
        assert_eq!(to_byte(2.0), 255);
        assert_eq!(to_byte(1.0), 255);
    }
}
