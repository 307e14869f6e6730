//! Radial layout of the menu buttons around the main button.
//!
//! Buttons fan out on an arc centered on 135° (up-left of the main button,
//! which sits in the bottom-right corner). The first [`INNER_CAPACITY`]
//! buttons sit on the inner ring, the rest on the outer ring. Each ring is
//! laid out independently: neighbours are [`STEP_DEG`] apart unless that
//! would spread them over more than [`MAX_SPREAD_DEG`], in which case the
//! step shrinks to fit.

use std::f64::consts::PI;

pub const INNER_RADIUS: f64 = 80.0;
pub const OUTER_RADIUS: f64 = 135.0;
pub const INNER_CAPACITY: usize = 5;
pub const CENTER_ANGLE: f64 = 3.0 * PI / 4.0;
pub const STEP_DEG: f64 = 35.0;
pub const MAX_SPREAD_DEG: f64 = 110.0;

/// Diameter of a rendered menu button, in px.
pub const BUTTON_DIAMETER: f64 = 40.0;

/// Class the container carries while the menu is open.
pub const MENU_OPEN_CLASS: &str = "menu-open";

/// Class of the floating container the rules are scoped under.
pub const CONTAINER_CLASS: &str = "aiFloatingButtonContainer";

/// A button's offset from the main button's center, in px. `y` grows
/// downwards like screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Offset) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Whether this offset means "lay me out automatically".
    pub fn is_auto(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Position of button `index` out of `total` on the radial arc.
pub fn radial_position(index: usize, total: usize) -> Offset {
    let (radius, ring_index, ring_total) = if total > INNER_CAPACITY {
        if index < INNER_CAPACITY {
            (INNER_RADIUS, index, INNER_CAPACITY)
        } else {
            (OUTER_RADIUS, index - INNER_CAPACITY, total - INNER_CAPACITY)
        }
    } else {
        (INNER_RADIUS, index, total)
    };

    let mut step = STEP_DEG.to_radians();
    if ring_total > 1 {
        let max_spread = MAX_SPREAD_DEG.to_radians();
        let gaps = (ring_total - 1) as f64;
        if step * gaps > max_spread {
            step = max_spread / gaps;
        }
    }

    // A single (or absent) button sits on the center angle.
    let half_span = step * ring_total.saturating_sub(1) as f64 / 2.0;
    let angle = CENTER_ANGLE - half_span + ring_index as f64 * step;

    Offset::new(angle.cos() * radius, -angle.sin() * radius)
}

/// The explicit `(x, y)` override when it is non-zero, else the radial
/// position.
pub fn button_position(position: Offset, index: usize, total: usize) -> Offset {
    if position.is_auto() {
        radial_position(index, total)
    } else {
        position
    }
}

/// Per-button transform rules, scoped to the open menu.
pub fn position_css<S: AsRef<str>>(buttons: &[(S, Offset)]) -> String {
    let scope = format!(".{CONTAINER_CLASS}.{MENU_OPEN_CLASS}");
    let mut css = String::new();
    for (id, pos) in buttons {
        let sel = format!("{scope} #{}", id.as_ref());
        let translate = format!("translate({}px, {}px)", pos.x, pos.y);
        css.push_str(&format!("{sel} {{ transform: scale(1) {translate}; }}\n"));
        css.push_str(&format!(
            "{sel}:hover {{ transform: scale(1.1) {translate}; }}\n"
        ));
        css.push_str(&format!(
            "{sel}:active {{ transform: scale(0.95) {translate}; }}\n"
        ));
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn min_separation(total: usize) -> f64 {
        let points: Vec<Offset> = (0..total).map(|i| radial_position(i, total)).collect();
        let mut min = f64::INFINITY;
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                min = min.min(a.distance(b));
            }
        }
        min
    }

    #[test]
    fn single_button_sits_on_center_angle() {
        let p = radial_position(0, 1);
        let expected = Offset::new(-80.0 * (PI / 4.0).cos(), -80.0 * (PI / 4.0).sin());
        assert!((p.x - expected.x).abs() < EPS, "{p:?}");
        assert!((p.y - expected.y).abs() < EPS, "{p:?}");
        assert!((p.x.hypot(p.y) - INNER_RADIUS).abs() < EPS);
    }

    #[test]
    fn buttons_never_overlap_up_to_twelve() {
        let limit = 0.9 * BUTTON_DIAMETER;
        for total in 2..=12 {
            let sep = min_separation(total);
            assert!(sep >= limit, "total={total} separation={sep}");
        }
    }

    #[test]
    fn sixth_button_moves_to_outer_ring() {
        let p = radial_position(5, 6);
        assert!((p.x.hypot(p.y) - OUTER_RADIUS).abs() < EPS);
        let inner = radial_position(4, 6);
        assert!((inner.x.hypot(inner.y) - INNER_RADIUS).abs() < EPS);
    }

    #[test]
    fn spread_is_capped() {
        let first = radial_position(0, 5);
        let last = radial_position(4, 5);
        let chord = 2.0 * INNER_RADIUS * (MAX_SPREAD_DEG.to_radians() / 2.0).sin();
        assert!((first.distance(&last) - chord).abs() < 1e-6);
    }

    #[test]
    fn zero_total_is_finite() {
        let p = radial_position(0, 0);
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn override_bypasses_layout() {
        let manual = Offset::new(0.0, -60.0);
        assert_eq!(button_position(manual, 0, 3), manual);
        assert_eq!(button_position(Offset::default(), 1, 3), radial_position(1, 3));
    }

    #[test]
    fn css_scopes_rules_to_open_menu() {
        let css = position_css(&[("chat", Offset::new(10.0, -20.5))]);
        assert!(css.contains(
            ".aiFloatingButtonContainer.menu-open #chat { transform: scale(1) translate(10px, -20.5px); }"
        ));
        assert!(css.contains("#chat:hover { transform: scale(1.1)"));
        assert!(css.contains("#chat:active { transform: scale(0.95)"));
    }
}
