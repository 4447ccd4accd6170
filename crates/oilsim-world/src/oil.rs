//! Polluted grid cells.
//!
//! An [`OilCell`] is a position plus an [`OilColor`]. Colour doubles as
//! intensity: darkening models weathering of an ageing slick, and each cell
//! that spreads from an existing one starts a shade brighter, so the slick
//! visibly fades with distance from where it began.

use oilsim_types::GridPos;
use serde::{Deserialize, Serialize};

/// Factor applied per shade step: [`OilColor::darker`] multiplies by it,
/// [`OilColor::brighter`] divides by it.
const SHADE_FACTOR: f64 = 0.7;

/// Smallest non-zero channel value [`OilColor::brighter`] will produce.
const MIN_LIT_CHANNEL: u8 = 3;

/// RGB colour of an oil cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OilColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl OilColor {
    /// Colour of freshly spilled oil.
    pub const ORIGIN: Self = Self::new(255, 0, 0);

    /// Create a colour from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Sum of the three channels; grows with brightness.
    pub fn intensity(self) -> u16 {
        u16::from(self.r)
            .saturating_add(u16::from(self.g))
            .saturating_add(u16::from(self.b))
    }

    /// A darker shade: every channel scaled by 0.7, never below 0.
    #[must_use]
    pub fn darker(self) -> Self {
        Self::new(shade(self.r), shade(self.g), shade(self.b))
    }

    /// A brighter shade: every channel divided by 0.7, capped at 255.
    ///
    /// Channels too dim to grow under scaling are first lifted to a small
    /// floor, and pure black becomes a dim grey, so brightening always
    /// makes progress until every lit channel saturates.
    #[must_use]
    pub fn brighter(self) -> Self {
        if self.r == 0 && self.g == 0 && self.b == 0 {
            return Self::new(MIN_LIT_CHANNEL, MIN_LIT_CHANNEL, MIN_LIT_CHANNEL);
        }
        Self::new(tint(self.r), tint(self.g), tint(self.b))
    }
}

impl Default for OilColor {
    fn default() -> Self {
        Self::ORIGIN
    }
}

// Both helpers scale in f64 and truncate toward zero: 90 darkens to 62
// because 90 * 0.7 lands just below 63.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shade(channel: u8) -> u8 {
    (f64::from(channel) * SHADE_FACTOR).clamp(0.0, 255.0) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn tint(channel: u8) -> u8 {
    if channel == 0 {
        return 0;
    }
    let lifted = f64::from(channel.max(MIN_LIT_CHANNEL));
    (lifted / SHADE_FACTOR).clamp(0.0, 255.0) as u8
}

/// One unit of pollution on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OilCell {
    pos: GridPos,
    color: OilColor,
}

impl OilCell {
    /// Create a cell at `pos`, clamped onto the grid.
    pub const fn new(pos: GridPos, color: OilColor) -> Self {
        Self {
            pos: GridPos::clamped(pos.x, pos.y),
            color,
        }
    }

    /// Create a cell of freshly spilled oil.
    pub const fn spill(pos: GridPos) -> Self {
        Self::new(pos, OilColor::ORIGIN)
    }

    /// A new cell at `pos` derived from this one, one shade brighter.
    #[must_use]
    pub fn spread_to(&self, pos: GridPos) -> Self {
        Self::new(pos, self.color.brighter())
    }

    /// Position of the cell.
    pub const fn pos(&self) -> GridPos {
        self.pos
    }

    /// Horizontal coordinate.
    pub const fn x(&self) -> i32 {
        self.pos.x
    }

    /// Vertical coordinate.
    pub const fn y(&self) -> i32 {
        self.pos.y
    }

    /// Current colour.
    pub const fn color(&self) -> OilColor {
        self.color
    }

    /// Darken this cell in place.
    pub fn darker(&mut self) {
        self.color = self.color.darker();
    }

    /// Brighten this cell in place.
    pub fn brighter(&mut self) {
        self.color = self.color.brighter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn darker_decreases_to_floor() {
        let mut color = OilColor::ORIGIN;
        let mut previous = color.intensity();
        for _ in 0..30 {
            color = color.darker();
            assert!(color.intensity() < previous || previous == 0);
            previous = color.intensity();
        }
        assert_eq!(color, OilColor::new(0, 0, 0));
        assert_eq!(color.darker(), color);
    }

    #[test]
    fn darker_truncates_the_scaled_product() {
        assert_eq!(
            OilColor::new(90, 170, 180).darker(),
            OilColor::new(62, 118, 125)
        );
        assert_eq!(OilColor::ORIGIN.darker(), OilColor::new(178, 0, 0));
        assert_eq!(OilColor::new(100, 1, 2).darker(), OilColor::new(70, 0, 1));
    }

    #[test]
    fn brighter_increases_to_ceiling() {
        let mut color = OilColor::new(0, 0, 0);
        let mut previous = color.intensity();
        for _ in 0..30 {
            color = color.brighter();
            assert!(color.intensity() > previous || previous == 765);
            previous = color.intensity();
        }
        assert_eq!(color, OilColor::new(255, 255, 255));
        assert_eq!(color.brighter(), color);
    }

    #[test]
    fn brighter_keeps_dark_channels_dark() {
        assert_eq!(OilColor::ORIGIN.brighter(), OilColor::ORIGIN);
        assert_eq!(OilColor::new(100, 0, 1).brighter(), OilColor::new(142, 0, 4));
    }

    #[test]
    fn cells_are_clamped() {
        let cell = OilCell::spill(GridPos::new(-3, 250));
        assert_eq!(cell.pos(), GridPos::new(0, 100));
    }

    #[test]
    fn spread_brightens() {
        let mut cell = OilCell::spill(GridPos::new(4, 4));
        cell.darker();
        let child = cell.spread_to(GridPos::new(5, 4));
        assert!(child.color().intensity() > cell.color().intensity());
        assert_eq!(child.pos(), GridPos::new(5, 4));
    }
}
