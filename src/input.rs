use bitflags::bitflags;

bitflags! {
    /// Logical keys held during one tick.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Keys: u8 {
        const LEFT     = 1 << 0;
        const RIGHT    = 1 << 1;
        const JUMP     = 1 << 2;
        const FIRE     = 1 << 3;
        const RELOAD   = 1 << 4;
        const INTERACT = 1 << 5;
    }
}

/// Held keys for this tick and the previous one, so one-shot actions fire
/// only on the tick a key goes down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputEdge {
    previous: Keys,
    current: Keys,
}

impl InputEdge {
    pub fn new(previous: Keys, current: Keys) -> Self {
        Self { previous, current }
    }

    /// Shift `current` into `previous` and record this tick's keys.
    pub fn advance(&mut self, held: Keys) {
        self.previous = self.current;
        self.current = held;
    }

    pub fn pressed(&self, key: Keys) -> bool {
        self.current.contains(key)
    }

    pub fn just_pressed(&self, key: Keys) -> bool {
        self.current.contains(key) && !self.previous.contains(key)
    }

    /// -1, 0 or 1. Holding both directions cancels out.
    pub fn direction(&self) -> f32 {
        let mut axis = 0.0;
        if self.pressed(Keys::LEFT) {
            axis -= 1.0;
        }
        if self.pressed(Keys::RIGHT) {
            axis += 1.0;
        }
        axis
    }
}
