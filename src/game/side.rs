use super::board::Cell;

/// One of the two seats in a game. `One` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// Get the other side
    pub fn other(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// Convert side to the cell value its discs occupy
    pub fn to_cell(self) -> Cell {
        Cell::Disc(self)
    }

    /// Seat number as shown to players (1 or 2)
    pub fn seat(self) -> u8 {
        match self {
            Side::One => 1,
            Side::Two => 2,
        }
    }

    pub fn from_seat(seat: u8) -> Option<Side> {
        match seat {
            1 => Some(Side::One),
            2 => Some(Side::Two),
            _ => None,
        }
    }

    /// Get side name for display
    pub fn name(self) -> &'static str {
        match self {
            Side::One => "Player 1",
            Side::Two => "Player 2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_side() {
        assert_eq!(Side::One.other(), Side::Two);
        assert_eq!(Side::Two.other(), Side::One);
    }

    #[test]
    fn test_seat_roundtrip() {
        assert_eq!(Side::from_seat(Side::One.seat()), Some(Side::One));
        assert_eq!(Side::from_seat(Side::Two.seat()), Some(Side::Two));
        assert_eq!(Side::from_seat(0), None);
    }

    #[test]
    fn test_side_name() {
        assert_eq!(Side::One.name(), "Player 1");
        assert_eq!(Side::Two.name(), "Player 2");
    }
}
