//! Enumeration types for the oil-spill cleanup simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Boat status
// ---------------------------------------------------------------------------

/// Operating mode of a cleanup boat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoatStatus {
    /// Idle: reached its target, force-stopped, or freshly launched.
    Stopped,
    /// Travelling one grid step per tick.
    Moving,
    /// Recharged its battery this tick instead of moving.
    Charging,
    /// Emptied its cargo hold this tick instead of cleaning.
    Unloading,
}

/// Something that happened to a boat and drives its status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoatEvent {
    /// The boat is already at its target.
    Arrived,
    /// The boat advanced one step (or was relaunched).
    Departed,
    /// Battery could not cover another step.
    BatteryDepleted,
    /// Cargo hold could not take another unit.
    HoldFull,
    /// An operator halted the boat.
    Halted,
}

impl BoatStatus {
    /// Return the status that follows `event`.
    ///
    /// Every event is accepted from every status; there is no terminal
    /// state. Charging and unloading fall back to [`BoatStatus::Moving`]
    /// on the next [`BoatEvent::Departed`].
    #[must_use]
    pub const fn next(self, event: BoatEvent) -> Self {
        match event {
            BoatEvent::Arrived | BoatEvent::Halted => Self::Stopped,
            BoatEvent::Departed => Self::Moving,
            BoatEvent::BatteryDepleted => Self::Charging,
            BoatEvent::HoldFull => Self::Unloading,
        }
    }

    /// Whether the boat made forward progress this tick.
    pub const fn is_moving(self) -> bool {
        matches!(self, Self::Moving)
    }
}

impl core::fmt::Display for BoatStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Stopped => "STOP",
            Self::Moving => "MOVING",
            Self::Charging => "CHARGING",
            Self::Unloading => "UNLOADING",
        };
        f.pad(label)
    }
}

// ---------------------------------------------------------------------------
// Heading
// ---------------------------------------------------------------------------

/// One of the eight compass octants a boat can face.
///
/// Headings are derived from the sign of a position delta, never stored
/// as a raw angle. Because `y` grows southward, a negative `dy` points
/// north.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// `dx == 0, dy < 0`.
    North,
    /// `dx > 0, dy < 0`.
    NorthEast,
    /// `dx > 0, dy == 0`.
    East,
    /// `dx > 0, dy > 0`.
    SouthEast,
    /// `dx == 0, dy > 0`.
    South,
    /// `dx < 0, dy > 0`.
    SouthWest,
    /// `dx < 0, dy == 0`.
    #[default]
    West,
    /// `dx < 0, dy < 0`.
    NorthWest,
}

impl Heading {
    /// Heading assigned to a newly launched or restarted boat.
    pub const DEFAULT: Self = Self::West;

    /// Map a position delta onto its octant. A zero delta has no heading.
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        let heading = match (dx.signum(), dy.signum()) {
            (0, -1) => Self::North,
            (1, -1) => Self::NorthEast,
            (1, 0) => Self::East,
            (1, 1) => Self::SouthEast,
            (0, 1) => Self::South,
            (-1, 1) => Self::SouthWest,
            (-1, 0) => Self::West,
            (-1, -1) => Self::NorthWest,
            _ => return None,
        };
        Some(heading)
    }

    /// Compass bearing in degrees, clockwise from north.
    pub const fn degrees(self) -> u16 {
        match self {
            Self::North => 0,
            Self::NorthEast => 45,
            Self::East => 90,
            Self::SouthEast => 135,
            Self::South => 180,
            Self::SouthWest => 225,
            Self::West => 270,
            Self::NorthWest => 315,
        }
    }
}

// ---------------------------------------------------------------------------
// Wind
// ---------------------------------------------------------------------------

/// Grid axis along which wind pushes oil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal (`x`).
    X,
    /// Vertical (`y`).
    Y,
}

/// Prevailing wind, named for the direction it blows from.
///
/// A north wind pushes oil south (`+y`), a west wind pushes it east
/// (`+x`), and so on. [`Wind::None`] causes no drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wind {
    /// Blows from the north; oil drifts toward larger `y`.
    North,
    /// Blows from the south; oil drifts toward smaller `y`.
    South,
    /// Blows from the east; oil drifts toward smaller `x`.
    East,
    /// Blows from the west; oil drifts toward larger `x`.
    #[default]
    West,
    /// Calm.
    None,
}

impl Wind {
    /// All wind values, in the order the rotation gate samples them.
    pub const ALL: [Self; 5] = [Self::East, Self::North, Self::South, Self::West, Self::None];

    /// Axis and unit step of the drift this wind causes, if any.
    pub const fn drift(self) -> Option<(Axis, i32)> {
        match self {
            Self::North => Some((Axis::Y, 1)),
            Self::South => Some((Axis::Y, -1)),
            Self::West => Some((Axis::X, 1)),
            Self::East => Some((Axis::X, -1)),
            Self::None => None,
        }
    }
}

impl core::fmt::Display for Wind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::North => "NORTH",
            Self::South => "SOUTH",
            Self::East => "EAST",
            Self::West => "WEST",
            Self::None => "NO",
        };
        f.write_str(label)
    }
}

impl core::str::FromStr for Wind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Self::North),
            "south" | "s" => Ok(Self::South),
            "east" | "e" => Ok(Self::East),
            "west" | "w" => Ok(Self::West),
            "none" | "no" | "calm" => Ok(Self::None),
            other => Err(format!("unknown wind direction: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_from_every_octant() {
        assert_eq!(Heading::from_delta(0, -4), Some(Heading::North));
        assert_eq!(Heading::from_delta(2, -1), Some(Heading::NorthEast));
        assert_eq!(Heading::from_delta(9, 0), Some(Heading::East));
        assert_eq!(Heading::from_delta(3, 3), Some(Heading::SouthEast));
        assert_eq!(Heading::from_delta(0, 1), Some(Heading::South));
        assert_eq!(Heading::from_delta(-1, 7), Some(Heading::SouthWest));
        assert_eq!(Heading::from_delta(-5, 0), Some(Heading::West));
        assert_eq!(Heading::from_delta(-1, -1), Some(Heading::NorthWest));
        assert_eq!(Heading::from_delta(0, 0), None);
    }

    #[test]
    fn default_heading_is_west() {
        assert_eq!(Heading::default().degrees(), 270);
    }

    #[test]
    fn status_transitions_from_any_state() {
        let all = [
            BoatStatus::Stopped,
            BoatStatus::Moving,
            BoatStatus::Charging,
            BoatStatus::Unloading,
        ];
        for status in all {
            assert_eq!(status.next(BoatEvent::Halted), BoatStatus::Stopped);
            assert_eq!(status.next(BoatEvent::Departed), BoatStatus::Moving);
            assert_eq!(status.next(BoatEvent::BatteryDepleted), BoatStatus::Charging);
            assert_eq!(status.next(BoatEvent::HoldFull), BoatStatus::Unloading);
            assert_eq!(status.next(BoatEvent::Arrived), BoatStatus::Stopped);
        }
    }

    #[test]
    fn wind_drift_is_symmetric() {
        assert_eq!(Wind::North.drift(), Some((Axis::Y, 1)));
        assert_eq!(Wind::South.drift(), Some((Axis::Y, -1)));
        assert_eq!(Wind::West.drift(), Some((Axis::X, 1)));
        assert_eq!(Wind::East.drift(), Some((Axis::X, -1)));
        assert_eq!(Wind::None.drift(), None);
    }

    #[test]
    fn wind_parse_and_serde() {
        assert_eq!("North".parse::<Wind>(), Ok(Wind::North));
        assert_eq!("calm".parse::<Wind>(), Ok(Wind::None));
        assert!("sideways".parse::<Wind>().is_err());

        let json = serde_json::to_string(&Wind::East).unwrap_or_default();
        assert_eq!(json, "\"east\"");
    }
}
