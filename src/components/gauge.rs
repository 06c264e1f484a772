use super::{Component, Drawer, Error, Snapshot};

use crate::gauges::Reading;

use embedded_graphics::{
    image::{Image, ImageRaw},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Local,
    Remote,
}

#[derive(Debug)]
pub struct Gauge {
    device: Device,
}

impl Gauge {
    const ICON_SIZE: u32 = 8;
    const TEXT_INDENT: i32 = 12;

    pub fn local() -> Self {
        Self {
            device: Device::Local,
        }
    }

    pub fn remote() -> Self {
        Self {
            device: Device::Remote,
        }
    }

    fn reading(&self, snapshot: &Snapshot) -> Reading {
        match self.device {
            Device::Local => snapshot.local,
            Device::Remote => snapshot.remote,
        }
    }

    fn icon(&self) -> &'static [u8] {
        #[rustfmt::skip]
        const WATCH: &[u8] = &[
            0b00111100,
            0b00111100,
            0b01111110,
            0b01000010,
            0b01000011,
            0b01111110,
            0b00111100,
            0b00111100,
        ];
        #[rustfmt::skip]
        const PHONE: &[u8] = &[
            0b00111100,
            0b00100100,
            0b00100100,
            0b00100100,
            0b00100100,
            0b00111100,
            0b00111100,
            0b00000000,
        ];

        match self.device {
            Device::Local => WATCH,
            Device::Remote => PHONE,
        }
    }
}

impl std::fmt::Display for Gauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Gauge({:?})", self.device)
    }
}

impl Component for Gauge {
    fn lines(&self) -> u8 {
        2
    }

    fn draw(&self, drawable: &mut Drawer, offset: Point, snapshot: &Snapshot) -> Result<(), Error> {
        Image::new(
            &ImageRaw::<BinaryColor>::new(self.icon(), Self::ICON_SIZE),
            offset,
        )
        .draw(&mut drawable.display)?;

        Text::with_baseline(
            &self.reading(snapshot).to_string(),
            offset + Point::new(Self::TEXT_INDENT, 0),
            drawable.base_text_style,
            Baseline::Top,
        )
        .draw(&mut drawable.display)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::gauges::Percent;
    use crate::tick::ClockSnapshot;

    fn snapshot() -> Snapshot {
        Snapshot {
            clock: ClockSnapshot { hour: 8, minute: 15 },
            local: Reading::Known(Percent::new(73).unwrap()),
            remote: Reading::Unknown,
        }
    }

    #[test]
    fn test_gauges_pick_their_device() {
        assert_eq!(Gauge::local().reading(&snapshot()).to_string(), "73");
        assert_eq!(Gauge::remote().reading(&snapshot()).to_string(), "-");
    }

    #[test]
    fn test_icons_are_square() {
        for gauge in [Gauge::local(), Gauge::remote()] {
            assert_eq!(gauge.icon().len() as u32, Gauge::ICON_SIZE);
        }
    }
}
