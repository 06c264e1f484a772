use super::{Component, Drawer, Error, Snapshot};

use crate::tick::ClockFormat;

use embedded_graphics::{
    prelude::*,
    text::{Baseline, Text},
};

#[derive(Debug)]
pub struct ClockFace {
    pub format: ClockFormat,
}

impl std::fmt::Display for ClockFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClockFace")
    }
}

impl Component for ClockFace {
    fn lines(&self) -> u8 {
        3 // big font plus a gap above the gauges
    }

    fn draw(&self, drawable: &mut Drawer, offset: Point, snapshot: &Snapshot) -> Result<(), Error> {
        Text::with_baseline(
            &snapshot.clock.text(self.format),
            offset,
            drawable.clock_text_style,
            Baseline::Top,
        )
        .draw(&mut drawable.display)?;

        Ok(())
    }
}
