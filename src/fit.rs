use crate::font::TextMeasure;
use crate::types::Pt;

/// Largest size not above `nominal` at which `text` fits in `max_width`.
///
/// When the text already fits at `nominal` that size is returned untouched.
/// Otherwise the size is scaled once by `max_width / measured`, which is exact
/// for faces whose widths scale linearly with size. The result is rounded
/// down to `Pt` resolution and never drops below `Pt::EPSILON`; there is no
/// other lower bound.
pub fn fit_size<M: TextMeasure + ?Sized>(face: &M, text: &str, nominal: Pt, max_width: Pt) -> Pt {
    let measured = face.measure_width(text, nominal);
    if measured <= max_width {
        return nominal;
    }
    let fitted = nominal.scale_down(max_width, measured).max(Pt::EPSILON);
    log::debug!(
        "fit {:?}: width {} exceeds {}, size {} -> {}",
        text,
        measured,
        max_width,
        nominal,
        fitted
    );
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::StandardFont;

    /// Every character is `units` thousandths of an em wide.
    struct Monospace {
        units: i32,
    }

    impl TextMeasure for Monospace {
        fn measure_width(&self, text: &str, size: Pt) -> Pt {
            size.mul_ratio(self.units * text.chars().count() as i32, 1000)
        }
    }

    #[test]
    fn fitting_text_keeps_nominal_size_exactly() {
        let face = StandardFont::HelveticaBold;
        let nominal = Pt::from_i32(42);
        let out = fit_size(&face, "JUAN", nominal, Pt::from_i32(420));
        assert_eq!(out, nominal);
    }

    #[test]
    fn text_at_exact_limit_is_not_shrunk() {
        // 10 chars * 1000/1000 em * 42pt = 420pt.
        let face = Monospace { units: 1000 };
        let nominal = Pt::from_i32(42);
        assert_eq!(fit_size(&face, "ABCDEFGHIJ", nominal, Pt::from_i32(420)), nominal);
    }

    /// 600pt wide at 42pt whatever the text, linear in size.
    struct SixHundredAtFortyTwo;

    impl TextMeasure for SixHundredAtFortyTwo {
        fn measure_width(&self, _text: &str, size: Pt) -> Pt {
            Pt::from_i32(600).scale_down(size, Pt::from_i32(42))
        }
    }

    #[test]
    fn overlong_text_scales_by_width_ratio() {
        let face = SixHundredAtFortyTwo;
        let nominal = Pt::from_i32(42);
        assert_eq!(face.measure_width("ANY", nominal), Pt::from_i32(600));
        let out = fit_size(&face, "ANY", nominal, Pt::from_i32(420));
        // 42 * (420 / 600)
        assert_eq!(out.to_milli_i64(), 29_400);
        assert_eq!(face.measure_width("ANY", out), Pt::from_i32(420));
    }

    #[test]
    fn fitted_size_never_overflows_the_field() {
        let face = StandardFont::HelveticaBold;
        let max_width = Pt::from_i32(420);
        let tolerance = Pt::from_f32(0.01);
        for text in [
            "BARBARA ANDREA",
            "MAXIMILIANO ALEJANDRO",
            "WWWWWWWWWWWWWWWWWWWWWWWWWWWWW",
            "ARIAS BUROZ DE LA SANTISIMA TRINIDAD",
        ] {
            let size = fit_size(&face, text, Pt::from_i32(42), max_width);
            assert!(size <= Pt::from_i32(42));
            assert!(size > Pt::ZERO);
            let width = face.measure_width(text, size);
            assert!(width <= max_width + tolerance, "{text}: {width}");
        }
    }

    #[test]
    fn pathological_text_still_gets_a_positive_size() {
        let face = Monospace { units: 1000 };
        let text = "X".repeat(200_000);
        let out = fit_size(&face, &text, Pt::from_i32(42), Pt::from_i32(1));
        assert_eq!(out, Pt::EPSILON);
    }
}
