use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X10},
        MonoTextStyle, MonoTextStyleBuilder,
    },
    pixelcolor::BinaryColor,
    prelude::*,
};
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

use i2c_linux::I2c;

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use reqwest::Url;
use tokio::sync::mpsc;

mod components;
use components::{ClockFace, Component, Gauge};

mod dashboard;
mod error;
mod gauges;
mod publisher;
mod tick;
mod transport;

pub use error::Error;

use dashboard::Dashboard;
use gauges::{FetchPolicy, RemoteMetricSource, SystemBattery};
use publisher::Snapshot;
use tick::{ClockFormat, MinuteTicker};
use transport::HttpTransport;

type Display = Ssd1306<
    I2CInterface<EmbeddedHALWriter<File>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

// i2c_linux is written to use Linux system devices, while embedded_graphics is
// targeting embedded device where the I2C bus is behind a bunch of registers,
// not a path on the filesystem. But in the end they are both simple devices
// expecting byte arrays to be written to them. So we just bridge the gap.
struct EmbeddedHALWriter<I>(i2c_linux::I2c<I>);

impl embedded_hal::blocking::i2c::Write for EmbeddedHALWriter<File> {
    type Error = std::io::Error;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.0.smbus_set_slave_address(address.into(), false)?;
        self.0.write_all(bytes)
    }
}

pub struct Drawer<'a> {
    display: Display,
    base_text_style: MonoTextStyle<'a, BinaryColor>,
    clock_text_style: MonoTextStyle<'a, BinaryColor>,
}

impl Drawer<'_> {
    pub const BURNIN_OFFSET_MAX: u8 = 5;
    pub const LINE_HEIGHT: u8 = 11;
    pub fn new_from_device_path(path: &Path, brightness: Brightness) -> Result<Self, Error> {
        let mut display = Ssd1306::new(
            I2CDisplayInterface::new(EmbeddedHALWriter(I2c::<File>::from_path(path)?)),
            DisplaySize128x64,
            DisplayRotation::Rotate270,
        )
        .into_buffered_graphics_mode();
        display.init()?;
        display.set_display_on(true)?;
        display.set_brightness(brightness)?;

        Ok(Self {
            display,
            base_text_style: MonoTextStyleBuilder::new()
                .font(&FONT_6X10)
                .text_color(BinaryColor::On)
                .build(),
            clock_text_style: MonoTextStyleBuilder::new()
                .font(&FONT_10X20)
                .text_color(BinaryColor::On)
                .build(),
        })
    }

    pub fn draw(
        &mut self,
        tick: u64,
        snapshot: &Snapshot,
        components: &[Box<dyn Component>],
    ) -> Result<(), Error> {
        let burn_in_offset = Point::new(
            (tick / 17u64 % Self::BURNIN_OFFSET_MAX as u64) as i32,
            (tick / 11u64 % Self::BURNIN_OFFSET_MAX as u64) as i32,
        );

        DrawTarget::clear(&mut self.display, BinaryColor::Off)?;

        let mut line = 0u8;
        for c in components {
            c.draw(
                self,
                burn_in_offset + Point::new(0, (Self::LINE_HEIGHT * line).into()),
                snapshot,
            )?;
            line += c.lines();
        }

        self.display.flush()?;
        Ok(())
    }
}

impl Drop for Drawer<'_> {
    fn drop(&mut self) {
        // turn off on shut down
        if let Err(e) = self.display.set_display_on(false) {
            log::warn!("Could not turn display off: {:?}", e);
        }
    }
}

fn parse_brightness(value: &str) -> Result<Brightness, Error> {
    match value.to_lowercase().as_str() {
        "brightest" => Ok(Brightness::BRIGHTEST),
        "bright" => Ok(Brightness::BRIGHT),
        "normal" => Ok(Brightness::NORMAL),
        "dim" => Ok(Brightness::DIM),
        "dimmest" => Ok(Brightness::DIMMEST),
        unknown => Err(format!("{} is not a known brightness", unknown).into()),
    }
}

fn parse_url(value: &str) -> Result<Url, Error> {
    Url::parse(value).map_err(|e| format!("{} is not a valid URL: {}", value, e).into())
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// The I2C device to use to communicate with the display
    #[clap(long)]
    device: std::path::PathBuf,

    /// Display brightness. Possible values are brightest, bright, normal, dim, dimmest.
    #[clap(short, long, default_value = "normal", value_parser = parse_brightness)]
    brightness: Brightness,

    /// Endpoint the paired device publishes its battery level on
    #[clap(short, long, env = "DUAL_GAUGE_REMOTE_URL", value_parser = parse_url)]
    remote_url: Url,

    /// Seconds to wait for the paired device before giving up on a request
    #[clap(long, default_value = "30")]
    remote_timeout: u64,

    /// What to do with a still pending request when the next refresh is due.
    /// Possible values are supersede, overlap.
    #[clap(long, default_value = "supersede", value_parser = str::parse::<FetchPolicy>)]
    fetch_policy: FetchPolicy,

    /// Show the clock in 24-hour format
    #[clap(long)]
    twenty_four_hour: bool,
}

/// Draws the current snapshot if anything changed since the last frame.
fn redraw(drawer: &mut Drawer, dashboard: &mut Dashboard, components: &[Box<dyn Component>]) {
    if !dashboard.is_dirty() {
        return;
    }
    let tick = Local::now().timestamp() as u64;
    match drawer.draw(tick, &dashboard.snapshot(), components) {
        Ok(_) => {
            dashboard.take_dirty();
        }
        Err(e) => log::error!("Could not draw update: {}", e),
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let mut drawer = Drawer::new_from_device_path(&args.device, args.brightness)?;

    let components: Vec<Box<dyn Component>> = vec![
        Box::new(ClockFace {
            format: if args.twenty_four_hour {
                ClockFormat::TwentyFourHour
            } else {
                ClockFormat::TwelveHour
            },
        }),
        Box::new(Gauge::local()),
        Box::new(Gauge::remote()),
    ];

    let (results_tx, mut results_rx) = mpsc::unbounded_channel();
    let transport = HttpTransport::new(
        args.remote_url,
        Duration::from_secs(args.remote_timeout),
        results_tx,
    )?;
    log::info!("Fetching remote battery level from {:?}", transport);

    let mut dashboard = Dashboard::activate(
        &Local::now(),
        Box::new(SystemBattery::new()),
        RemoteMetricSource::new(Box::new(transport), args.fetch_policy),
    );

    log::info!("Started");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut ticker = MinuteTicker::starting_at(&Local::now());

    loop {
        for time in ticker.due(&Local::now()) {
            dashboard.on_minute_tick(&time);
        }
        redraw(&mut drawer, &mut dashboard, &components);

        tokio::select! {
            _ = tokio::time::sleep(ticker.sleep_duration(&Local::now())) => {}
            Some(resolution) = results_rx.recv() => {
                dashboard.on_resolution(resolution);
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    log::error!("Could not listen for shutdown signal: {}", e);
                }
                break;
            }
        }
    }

    if let Some(kind) = dashboard.remote().last_error() {
        log::info!("Last remote failure was: {}", kind);
    }
    dashboard.deactivate();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting");
    let args = Args::parse();
    log::debug!("{:?}", &args);

    if let Err(e) = run(args).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
    log::info!("Stopped");
}
