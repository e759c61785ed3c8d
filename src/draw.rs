use egui::{
    Align2, Color32, FontFamily, FontId, Mesh, Painter, Pos2, Rect, Rounding, Shape, Stroke, pos2,
};
use glam::Vec2;

/// Family name the weapon icon glyph font is registered under.
pub const ICON_FONT: &str = "icons";
const ARC_SEGMENTS: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub enum Font {
    Default,
    Family { name: String, size: f32 },
    Icons { size: f32 },
}

/// Append-only sink for one frame of overlay primitives.
pub trait DrawList {
    fn display_size(&self) -> Vec2;

    fn line(&mut self, a: Vec2, b: Vec2, color: Color32, thickness: f32);
    fn rect(&mut self, min: Vec2, max: Vec2, color: Color32, rounding: f32);
    fn rect_filled(&mut self, min: Vec2, max: Vec2, color: Color32, rounding: f32);
    /// Vertical gradient from `top` to `bottom`.
    fn rect_filled_multicolor(&mut self, min: Vec2, max: Vec2, top: Color32, bottom: Color32);
    /// `points` wound clockwise on screen.
    fn convex_poly_filled(&mut self, points: &[Vec2], color: Color32);
    fn polyline(&mut self, points: &[Vec2], color: Color32, thickness: f32);
    fn circle(&mut self, center: Vec2, radius: f32, color: Color32, thickness: f32);
    fn circle_filled(&mut self, center: Vec2, radius: f32, color: Color32);
    /// Angles in radians, y pointing down.
    fn arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        color: Color32,
        thickness: f32,
    );
    /// `pos` is the top left corner of the text.
    fn text(&mut self, pos: Vec2, text: &str, font: &Font, color: Color32);
    fn text_size(&self, text: &str, font: &Font) -> Vec2;

    /// Intersects the current clip rect with `min`..`max` until the matching pop.
    fn push_clip_rect(&mut self, min: Vec2, max: Vec2);
    fn pop_clip_rect(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        a: Vec2,
        b: Vec2,
        color: Color32,
        thickness: f32,
    },
    Rect {
        min: Vec2,
        max: Vec2,
        color: Color32,
        filled: bool,
    },
    Gradient {
        min: Vec2,
        max: Vec2,
        top: Color32,
        bottom: Color32,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Color32,
    },
    Polyline {
        points: Vec<Vec2>,
        color: Color32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color32,
        filled: bool,
    },
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        color: Color32,
    },
    Text {
        pos: Vec2,
        text: String,
        font: Font,
        color: Color32,
    },
    PushClip {
        min: Vec2,
        max: Vec2,
    },
    PopClip,
}

/// Keeps the commands instead of drawing them. Text is measured with a fixed
/// advance of half the font size per character.
#[derive(Debug, Clone)]
pub struct RecordingDrawList {
    display_size: Vec2,
    commands: Vec<DrawCommand>,
    clip_depth: usize,
}

impl RecordingDrawList {
    pub fn new(display_size: Vec2) -> Self {
        Self {
            display_size,
            commands: Vec::new(),
            clip_depth: 0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.clip_depth = 0;
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Open clip rects, 0 once every push was popped.
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn font_size(font: &Font) -> f32 {
        match font {
            Font::Default => 13.0,
            Font::Family { size, .. } | Font::Icons { size } => *size,
        }
    }
}

impl DrawList for RecordingDrawList {
    fn display_size(&self) -> Vec2 {
        self.display_size
    }

    fn line(&mut self, a: Vec2, b: Vec2, color: Color32, thickness: f32) {
        self.commands.push(DrawCommand::Line {
            a,
            b,
            color,
            thickness,
        });
    }

    fn rect(&mut self, min: Vec2, max: Vec2, color: Color32, _rounding: f32) {
        self.commands.push(DrawCommand::Rect {
            min,
            max,
            color,
            filled: false,
        });
    }

    fn rect_filled(&mut self, min: Vec2, max: Vec2, color: Color32, _rounding: f32) {
        self.commands.push(DrawCommand::Rect {
            min,
            max,
            color,
            filled: true,
        });
    }

    fn rect_filled_multicolor(&mut self, min: Vec2, max: Vec2, top: Color32, bottom: Color32) {
        self.commands.push(DrawCommand::Gradient {
            min,
            max,
            top,
            bottom,
        });
    }

    fn convex_poly_filled(&mut self, points: &[Vec2], color: Color32) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn polyline(&mut self, points: &[Vec2], color: Color32, _thickness: f32) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            color,
        });
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color32, _thickness: f32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            filled: false,
        });
    }

    fn circle_filled(&mut self, center: Vec2, radius: f32, color: Color32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            filled: true,
        });
    }

    fn arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        color: Color32,
        _thickness: f32,
    ) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start,
            end,
            color,
        });
    }

    fn text(&mut self, pos: Vec2, text: &str, font: &Font, color: Color32) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.to_owned(),
            font: font.clone(),
            color,
        });
    }

    fn text_size(&self, text: &str, font: &Font) -> Vec2 {
        let size = Self::font_size(font);
        Vec2::new(text.chars().count() as f32 * size * 0.5, size)
    }

    fn push_clip_rect(&mut self, min: Vec2, max: Vec2) {
        self.clip_depth += 1;
        self.commands.push(DrawCommand::PushClip { min, max });
    }

    fn pop_clip_rect(&mut self) {
        self.clip_depth = self.clip_depth.saturating_sub(1);
        self.commands.push(DrawCommand::PopClip);
    }
}

fn to_pos(v: Vec2) -> Pos2 {
    pos2(v.x, v.y)
}

fn to_rect(min: Vec2, max: Vec2) -> Rect {
    Rect::from_two_pos(to_pos(min), to_pos(max))
}

/// Draws straight into an egui layer, usually the background layer of a
/// transparent overlay window.
pub struct EguiDrawList {
    painter: Painter,
    clip_stack: Vec<Rect>,
}

impl EguiDrawList {
    pub fn new(painter: Painter) -> Self {
        Self {
            painter,
            clip_stack: Vec::new(),
        }
    }

    fn font_id(&self, font: &Font) -> FontId {
        let (family, size) = match font {
            Font::Default => return FontId::proportional(13.0),
            Font::Family { name, size } => (FontFamily::Name(name.as_str().into()), *size),
            Font::Icons { size } => (FontFamily::Name(ICON_FONT.into()), *size),
        };
        let registered = self
            .painter
            .ctx()
            .fonts(|fonts| fonts.families().contains(&family));
        if registered {
            FontId::new(size, family)
        } else {
            FontId::proportional(size)
        }
    }
}

impl DrawList for EguiDrawList {
    fn display_size(&self) -> Vec2 {
        let size = self.painter.ctx().screen_rect().size();
        Vec2::new(size.x, size.y)
    }

    fn line(&mut self, a: Vec2, b: Vec2, color: Color32, thickness: f32) {
        self.painter
            .line_segment([to_pos(a), to_pos(b)], Stroke::new(thickness, color));
    }

    fn rect(&mut self, min: Vec2, max: Vec2, color: Color32, rounding: f32) {
        self.painter.rect_stroke(
            to_rect(min, max),
            Rounding::same(rounding),
            Stroke::new(1.0, color),
        );
    }

    fn rect_filled(&mut self, min: Vec2, max: Vec2, color: Color32, rounding: f32) {
        self.painter
            .rect_filled(to_rect(min, max), Rounding::same(rounding), color);
    }

    fn rect_filled_multicolor(&mut self, min: Vec2, max: Vec2, top: Color32, bottom: Color32) {
        let rect = to_rect(min, max);
        let mut mesh = Mesh::default();
        mesh.colored_vertex(rect.left_top(), top);
        mesh.colored_vertex(rect.right_top(), top);
        mesh.colored_vertex(rect.right_bottom(), bottom);
        mesh.colored_vertex(rect.left_bottom(), bottom);
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        self.painter.add(Shape::mesh(mesh));
    }

    fn convex_poly_filled(&mut self, points: &[Vec2], color: Color32) {
        if points.len() < 3 {
            return;
        }
        self.painter.add(Shape::convex_polygon(
            points.iter().copied().map(to_pos).collect(),
            color,
            Stroke::NONE,
        ));
    }

    fn polyline(&mut self, points: &[Vec2], color: Color32, thickness: f32) {
        if points.len() < 2 {
            return;
        }
        self.painter.line(
            points.iter().copied().map(to_pos).collect(),
            Stroke::new(thickness, color),
        );
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color32, thickness: f32) {
        self.painter
            .circle_stroke(to_pos(center), radius, Stroke::new(thickness, color));
    }

    fn circle_filled(&mut self, center: Vec2, radius: f32, color: Color32) {
        self.painter.circle_filled(to_pos(center), radius, color);
    }

    fn arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        color: Color32,
        thickness: f32,
    ) {
        let points = (0..=ARC_SEGMENTS)
            .map(|i| {
                let angle = start + (end - start) * i as f32 / ARC_SEGMENTS as f32;
                to_pos(center + Vec2::new(angle.cos(), angle.sin()) * radius)
            })
            .collect();
        self.painter.line(points, Stroke::new(thickness, color));
    }

    fn text(&mut self, pos: Vec2, text: &str, font: &Font, color: Color32) {
        let font_id = self.font_id(font);
        self.painter
            .text(to_pos(pos), Align2::LEFT_TOP, text, font_id, color);
    }

    fn text_size(&self, text: &str, font: &Font) -> Vec2 {
        let galley = self
            .painter
            .layout_no_wrap(text.to_owned(), self.font_id(font), Color32::WHITE);
        Vec2::new(galley.size().x, galley.size().y)
    }

    fn push_clip_rect(&mut self, min: Vec2, max: Vec2) {
        let current = self.painter.clip_rect();
        self.clip_stack.push(current);
        self.painter
            .set_clip_rect(current.intersect(to_rect(min, max)));
    }

    fn pop_clip_rect(&mut self) {
        if let Some(rect) = self.clip_stack.pop() {
            self.painter.set_clip_rect(rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    #[test]
    fn recording_tracks_clip_depth() {
        let mut list = RecordingDrawList::new(Vec2::new(800.0, 600.0));
        list.push_clip_rect(Vec2::ZERO, Vec2::ONE);
        list.push_clip_rect(Vec2::ZERO, Vec2::ONE);
        assert_eq!(list.clip_depth(), 2);
        list.pop_clip_rect();
        list.pop_clip_rect();
        list.pop_clip_rect();
        assert_eq!(list.clip_depth(), 0);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn recording_measures_text() {
        let list = RecordingDrawList::new(Vec2::new(800.0, 600.0));
        let font = Font::Family {
            name: "Verdana".into(),
            size: 10.0,
        };
        assert_eq!(list.text_size("abcd", &font), Vec2::new(20.0, 10.0));
    }

    #[test]
    fn egui_painter_receives_shapes() {
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            let mut list = EguiDrawList::new(painter);
            list.line(Vec2::ZERO, Vec2::ONE, Color32::RED, 1.0);
            list.push_clip_rect(Vec2::ZERO, Vec2::splat(10.0));
            list.rect_filled_multicolor(Vec2::ZERO, Vec2::ONE, Color32::GREEN, Color32::RED);
            list.pop_clip_rect();
            list.arc(Vec2::splat(5.0), 3.0, 0.0, PI, Color32::WHITE, 1.0);
            list.text(Vec2::ZERO, "12", &Font::Icons { size: 12.0 }, Color32::WHITE);
            assert!(list.text_size("12", &Font::Default).x > 0.0);
            assert!(list.clip_stack.is_empty());
        });
    }
}
