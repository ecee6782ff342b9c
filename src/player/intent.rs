use bitflags::bitflags;

bitflags! {
    /// Decoded input flags for a single tick.
    ///
    /// The same type carries both the held keys and the single-shot
    /// "pressed this tick" edges of an [`crate::InputFrame`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SwingIntent: u32 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const FOREHAND = 1 << 4;
        const BACKHAND = 1 << 5;
        const TOPSPIN = 1 << 6;
        const SLICE = 1 << 7;
        const CHOP = 1 << 8;
        const JUMP = 1 << 9;
        const SERVE = 1 << 10;

        /// Flags that move the avatar's root
        const MOVEMENT = Self::FORWARD.bits() | Self::BACKWARD.bits() | Self::LEFT.bits() | Self::RIGHT.bits();

        /// Flags that rotate the torso or swing an arm
        const STROKES = Self::FOREHAND.bits() | Self::BACKHAND.bits() | Self::TOPSPIN.bits() | Self::SLICE.bits();
    }
}

impl Default for SwingIntent {
    fn default() -> Self {
        Self::empty()
    }
}

impl SwingIntent {
    #[inline]
    pub fn forward(self) -> bool {
        self.contains(Self::FORWARD)
    }

    #[inline]
    pub fn backward(self) -> bool {
        self.contains(Self::BACKWARD)
    }

    #[inline]
    pub fn left(self) -> bool {
        self.contains(Self::LEFT)
    }

    #[inline]
    pub fn right(self) -> bool {
        self.contains(Self::RIGHT)
    }

    #[inline]
    pub fn forehand(self) -> bool {
        self.contains(Self::FOREHAND)
    }

    #[inline]
    pub fn backhand(self) -> bool {
        self.contains(Self::BACKHAND)
    }

    #[inline]
    pub fn topspin(self) -> bool {
        self.contains(Self::TOPSPIN)
    }

    #[inline]
    pub fn slice(self) -> bool {
        self.contains(Self::SLICE)
    }

    #[inline]
    pub fn chop(self) -> bool {
        self.contains(Self::CHOP)
    }

    #[inline]
    pub fn jump(self) -> bool {
        self.contains(Self::JUMP)
    }

    #[inline]
    pub fn serve(self) -> bool {
        self.contains(Self::SERVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_cover_their_members() {
        assert!(SwingIntent::MOVEMENT.contains(SwingIntent::LEFT));
        assert!(SwingIntent::STROKES.contains(SwingIntent::SLICE));
        assert!(!SwingIntent::STROKES.contains(SwingIntent::CHOP));
    }

    #[test]
    fn default_is_empty() {
        let intent = SwingIntent::default();
        assert!(intent.is_empty());
        assert!(!intent.forehand());
    }
}
