use bitflags::bitflags;
use serde::Deserialize;

/// Direction the player (or an ambient mover) is facing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::Up, Facing::Down, Facing::Left, Facing::Right];

    /// Tile delta of one step in this direction. Y grows downward.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Facing::Up => (0, -1),
            Facing::Down => (0, 1),
            Facing::Left => (-1, 0),
            Facing::Right => (1, 0),
        }
    }

    pub const fn opposite(self) -> Facing {
        match self {
            Facing::Up => Facing::Down,
            Facing::Down => Facing::Up,
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

bitflags! {
    /// Facing directions from which a map event may be triggered.
    ///
    /// An empty mask never matches any facing.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct SideMask: u8 {
        const UP    = 1 << 0;
        const DOWN  = 1 << 1;
        const LEFT  = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl SideMask {
    pub fn accepts(self, facing: Facing) -> bool {
        self.contains(SideMask::from(facing))
    }
}

impl From<Facing> for SideMask {
    fn from(facing: Facing) -> Self {
        match facing {
            Facing::Up => SideMask::UP,
            Facing::Down => SideMask::DOWN,
            Facing::Left => SideMask::LEFT,
            Facing::Right => SideMask::RIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_accepts_exactly_its_member_facings() {
        for bits in 0u8..=0b1111 {
            let mask = SideMask::from_bits_truncate(bits);
            for facing in Facing::ALL {
                let member = bits & SideMask::from(facing).bits() != 0;
                assert_eq!(mask.accepts(facing), member, "mask {bits:#06b} {facing:?}");
            }
        }
    }

    #[test]
    fn empty_mask_never_accepts() {
        for facing in Facing::ALL {
            assert!(!SideMask::empty().accepts(facing));
        }
    }

    #[test]
    fn opposite_round_trips_and_deltas_cancel() {
        for facing in Facing::ALL {
            assert_eq!(facing.opposite().opposite(), facing);
            let (dx, dy) = facing.delta();
            let (ox, oy) = facing.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }
}
