/// A lightweight, serializable snapshot of the container's scroll state.
///
/// Offsets are signed pixel distances the content has been translated by. Only the magnitude
/// matters for windowing.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub offset: f32,
    /// Offset observed on the previous tick.
    pub previous_offset: f32,
    /// Where an external scroll animation is heading, if any.
    pub target_offset: f32,
}

impl ScrollState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `true` when the offset moved since the last tick.
    pub fn moved(&self) -> bool {
        self.offset != self.previous_offset
    }
}
