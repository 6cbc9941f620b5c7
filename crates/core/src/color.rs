/// An `(r, g, b)` triple.
pub type Rgb = (u8, u8, u8);

/// Reference colors for the integer grades 1 (best) to 5 (worst).
pub const GRADE_COLORS: [Rgb; 5] = [
    (136, 191, 74),
    (187, 209, 84),
    (239, 226, 88),
    (242, 158, 88),
    (235, 89, 90),
];

/// Returned when there is no grade to color.
pub const NEUTRAL_COLOR: Rgb = (255, 255, 255);

/// Linear blend from `from` (fraction 0) to `to` (fraction 1).
///
/// Channels round half to even.
#[must_use]
pub fn color_mix(from: Rgb, to: Rgb, fraction: f64) -> Rgb {
    let channel = |a: u8, b: u8| -> u8 {
        let mixed = f64::from(a) * (1.0 - fraction) + f64::from(b) * fraction;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = mixed.round_ties_even().clamp(0.0, 255.0) as u8;
        value
    };
    (
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}

/// Color for a grade on the 1-5 scale.
///
/// The grade is rounded to one decimal (half to even) and clamped to [1, 5]
/// before mixing the two neighbouring reference colors.
#[must_use]
pub fn grade_color(grade: Option<f64>) -> Rgb {
    let Some(grade) = grade.filter(|g| g.is_finite()) else {
        return NEUTRAL_COLOR;
    };
    let grade = ((grade * 10.0).round_ties_even() / 10.0).clamp(1.0, 5.0);
    let lower = grade.floor();
    let upper = grade.ceil();
    color_mix(reference(lower), reference(upper), grade - lower)
}

fn reference(grade: f64) -> Rgb {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (grade as usize).saturating_sub(1).min(GRADE_COLORS.len() - 1);
    GRADE_COLORS[index]
}
