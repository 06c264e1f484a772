pub use crate::publisher::Snapshot;
pub use crate::{Drawer, Error};

pub trait Component: std::fmt::Debug + std::fmt::Display {
    /// How many display lines this component occupies.
    fn lines(&self) -> u8 {
        1
    }

    fn draw(
        &self,
        drawable: &mut Drawer,
        offset: embedded_graphics::prelude::Point,
        snapshot: &Snapshot,
    ) -> Result<(), Error>;
}

mod clock;
mod gauge;

pub use self::clock::ClockFace;
pub use self::gauge::Gauge;
