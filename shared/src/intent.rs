/// Logical movement keys. The client maps physical keys onto these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Back,
    Left,
    Right,
}

impl MoveKey {
    /// The (forward, right) value this key drives its axis to while held.
    const fn axis_value(self) -> (i8, i8) {
        match self {
            MoveKey::Forward => (1, 0),
            MoveKey::Back => (-1, 0),
            MoveKey::Left => (0, 1),
            MoveKey::Right => (0, -1),
        }
    }

    const fn is_forward_axis(self) -> bool {
        matches!(self, MoveKey::Forward | MoveKey::Back)
    }
}

/// Signed forward/right movement direction, each axis in {-1, 0, 1}.
///
/// `right = 1` moves along `up x camera_forward`, which points to the camera's left, so
/// `Left` drives `right` to +1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: i8,
    pub right: i8,
}

impl MoveIntent {
    pub const NONE: Self = Self {
        forward: 0,
        right: 0,
    };

    /// Build an intent, clamping each axis into {-1, 0, 1}.
    pub fn new(forward: i8, right: i8) -> Self {
        Self {
            forward: forward.signum(),
            right: right.signum(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.forward == 0 && self.right == 0
    }

    /// Key went down: its axis takes the key's direction (the latest press wins).
    pub fn press(&mut self, key: MoveKey) {
        let (forward, right) = key.axis_value();
        if key.is_forward_axis() {
            self.forward = forward;
        } else {
            self.right = right;
        }
    }

    /// Key went up: the key's whole axis stops, even if the opposing key is still held.
    pub fn release(&mut self, key: MoveKey) {
        if key.is_forward_axis() {
            self.forward = 0;
        } else {
            self.right = 0;
        }
    }
}
