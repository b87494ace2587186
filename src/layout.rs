use crate::fit::fit_size;
use crate::font::{FontRole, FontSet};
use crate::name::NameLines;
use crate::request::{IsoDate, Level};
use crate::types::{Color, Pt};

pub const NAME_INK: Color = Color::rgb(0.05, 0.1, 0.2);
pub const CAPTION_INK: Color = Color::gray(0.5);

/// Fixed coordinate grid of the certificate, in PDF points from the
/// bottom-left corner of the template page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub left_margin: Pt,
    pub date_x: Pt,
    /// Height of the first name baseline above the vertical page centre.
    pub name_rise: Pt,
    pub line_pitch: Pt,
    /// Gap between the last name baseline and the level caption.
    pub level_drop: Pt,
    pub date_baseline_y: Pt,
    pub max_field_width: Pt,
    pub nominal_name_size: Pt,
    pub level_size: Pt,
    pub date_size: Pt,
}

pub const CERTIFICATE_LAYOUT: LayoutConfig = LayoutConfig {
    left_margin: Pt::from_i32(95),
    date_x: Pt::from_i32(95),
    name_rise: Pt::from_i32(40),
    line_pitch: Pt::from_i32(62),
    level_drop: Pt::from_i32(38),
    date_baseline_y: Pt::from_i32(108),
    max_field_width: Pt::from_i32(420),
    nominal_name_size: Pt::from_i32(42),
    level_size: Pt::from_i32(11),
    date_size: Pt::from_i32(11),
};

impl LayoutConfig {
    /// Anchors the grid on a page of the given height.
    pub fn resolve(&self, page_height: Pt) -> PageGrid {
        PageGrid {
            config: *self,
            name_baseline_y: page_height / 2 + self.name_rise,
        }
    }
}

/// A `LayoutConfig` anchored to one template page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGrid {
    pub config: LayoutConfig,
    pub name_baseline_y: Pt,
}

impl PageGrid {
    pub fn second_line_y(&self) -> Pt {
        self.name_baseline_y - self.config.line_pitch
    }

    pub fn level_y(&self) -> Pt {
        self.second_line_y() - self.config.level_drop
    }
}

/// One positioned text run.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    pub text: String,
    pub x: Pt,
    pub y: Pt,
    pub size: Pt,
    pub role: FontRole,
    pub color: Color,
}

pub fn level_caption(level: Level) -> String {
    format!("For successfully completing and passing the {level} level of English")
}

/// Places the name lines, level caption and date on the grid.
///
/// Name lines are set in the display face and shrunk to fit
/// `max_field_width`; the second line is skipped when empty. The caption
/// keeps its slot below the second line even when that line is absent.
pub fn layout(
    lines: &NameLines,
    level: Level,
    date: &IsoDate,
    grid: &PageGrid,
    fonts: &FontSet,
) -> Vec<DrawInstruction> {
    let config = &grid.config;
    let display = fonts.get(FontRole::Display);
    let name_run = |text: &str, y: Pt| DrawInstruction {
        text: text.to_string(),
        x: config.left_margin,
        y,
        size: fit_size(
            &**display,
            text,
            config.nominal_name_size,
            config.max_field_width,
        ),
        role: FontRole::Display,
        color: NAME_INK,
    };

    let mut out = Vec::with_capacity(4);
    out.push(name_run(&lines.first_line, grid.name_baseline_y));
    if lines.has_second_line() {
        out.push(name_run(&lines.second_line, grid.second_line_y()));
    }
    out.push(DrawInstruction {
        text: level_caption(level),
        x: config.left_margin,
        y: grid.level_y(),
        size: config.level_size,
        role: FontRole::Italic,
        color: CAPTION_INK,
    });
    out.push(DrawInstruction {
        text: date.day_month_year(),
        x: config.date_x,
        y: config.date_baseline_y,
        size: config.date_size,
        role: FontRole::Regular,
        color: CAPTION_INK,
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::TextMeasure;
    use crate::name::segment_name;
    use crate::types::Size;

    fn grid() -> PageGrid {
        CERTIFICATE_LAYOUT.resolve(Size::letter().height)
    }

    #[test]
    fn grid_anchors_on_half_page_height() {
        let g = CERTIFICATE_LAYOUT.resolve(Pt::from_i32(595));
        assert_eq!(g.name_baseline_y.to_milli_i64(), 337_500);
        assert_eq!(g.second_line_y().to_milli_i64(), 275_500);
        assert_eq!(g.level_y().to_milli_i64(), 237_500);
    }

    #[test]
    fn four_word_name_lays_out_every_field() {
        let lines = segment_name("Barbara Andrea Arias Buroz");
        let date = IsoDate::parse("2026-02-16").expect("date");
        let fonts = FontSet::standard();
        let g = grid();
        let out = layout(&lines, Level::B1, &date, &g, &fonts);

        assert_eq!(out.len(), 4);
        assert_eq!(out[0].text, "BARBARA ANDREA");
        assert_eq!(out[0].y, g.name_baseline_y);
        assert_eq!(out[0].role, FontRole::Display);
        assert_eq!(out[1].text, "ARIAS BUROZ");
        assert_eq!(out[1].y, g.second_line_y());
        assert_eq!(
            out[2].text,
            "For successfully completing and passing the B1 level of English"
        );
        assert_eq!(out[2].role, FontRole::Italic);
        assert_eq!(out[2].size, Pt::from_i32(11));
        assert_eq!(out[3].text, "16/02/2026");
        assert_eq!(out[3].y, Pt::from_i32(108));
        assert_eq!(out[3].x, Pt::from_i32(95));
        assert_eq!(out[3].role, FontRole::Regular);
    }

    #[test]
    fn single_word_name_skips_second_line() {
        let lines = segment_name("Cher");
        let date = IsoDate::parse("2026-01-05").expect("date");
        let out = layout(&lines, Level::C1, &date, &grid(), &FontSet::standard());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].text, "CHER");
        assert_eq!(out[1].role, FontRole::Italic);
        assert_eq!(out[1].y, grid().level_y());
    }

    #[test]
    fn long_name_lines_shrink_below_nominal() {
        let lines = segment_name("Maximiliano Bartolomeo Wenceslao Hohenzollern-Sigmaringen");
        let date = IsoDate::parse("2026-02-16").expect("date");
        let fonts = FontSet::standard();
        let out = layout(&lines, Level::A2, &date, &grid(), &fonts);
        let display = fonts.get(FontRole::Display);
        for run in &out[..2] {
            assert!(run.size <= Pt::from_i32(42));
            let width = display.measure_width(&run.text, run.size);
            assert!(width <= Pt::from_i32(420) + Pt::from_f32(0.01));
        }
        assert!(out[1].size < Pt::from_i32(42));
    }

    #[test]
    fn layout_is_deterministic() {
        let lines = segment_name("Juan Pablo");
        let date = IsoDate::parse("2026-02-16").expect("date");
        let fonts = FontSet::standard();
        let a = layout(&lines, Level::A1, &date, &grid(), &fonts);
        let b = layout(&lines, Level::A1, &date, &grid(), &fonts);
        assert_eq!(a, b);
        assert_eq!(a[0].text, "JUAN");
        assert_eq!(a[1].text, "PABLO");
        assert_eq!(a[0].size, Pt::from_i32(42));
    }
}
