#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_executor::Spawner;
use embassy_time::{Duration, Instant, Timer};
use esp_hal::Blocking;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use log::{debug, error, info, warn};
use rtt_target::rprintln;

use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use embedded_sdmmc::SdCard;

use tacho_core::config::{RPM_WINDOW_SLOTS, WheelConfig};
use tacho_core::speed::{EdgeRecorder, EdgeTimer, SharedRpmWindow, SpeedEstimator};
use tacho_core::storage::sd::SdVolume;
use tacho_core::storage::{CsvRow, FromUnchecked, LogSession, StorageError};
use tacho_firmware::config::*;
use tacho_firmware::time_source::UptimeTimeSource;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

/// The one piece of state shared between the edge and foreground contexts.
static RPM_WINDOW: SharedRpmWindow<RPM_WINDOW_SLOTS> = SharedRpmWindow::new();

/// System state for LED indication
static SYSTEM_STATE: AtomicU8 = AtomicU8::new(STATE_INIT);

type SdSpiDevice = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, NoDelay>;
type Volume = SdVolume<SdSpiDevice, embassy_time::Delay, UptimeTimeSource>;

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    rprintln!("Embassy initialized!");

    // Status LED runs independently of logging for the whole uptime.
    let led = Output::new(peripherals.GPIO38, Level::Low, OutputConfig::default());
    spawner.must_spawn(led_task(led));

    // Hall sensor input; the sensor pulls the line low on each magnet pass.
    let hall = Input::new(
        peripherals.GPIO4,
        InputConfig::default().with_pull(Pull::Up),
    );
    spawner.must_spawn(edge_task(hall));

    // SD card over SPI, brought up slow and raised after init.
    let spi_bus = Spi::new(
        peripherals.SPI2,
        SpiConfig::default().with_frequency(Rate::from_khz(SD_SPI_INIT_FREQ_KHZ)),
    )
    .expect("Failed to configure SPI bus")
    .with_sck(peripherals.GPIO36)
    .with_mosi(peripherals.GPIO37)
    .with_miso(peripherals.GPIO35);
    let cs = Output::new(peripherals.GPIO34, Level::High, OutputConfig::default());
    let spi_device = ExclusiveDevice::new_no_delay(spi_bus, cs).expect("Failed to wrap SPI device");

    let estimator = SpeedEstimator::new(&RPM_WINDOW, WheelConfig::default());

    match start_session(spi_device).await {
        Ok(session) => {
            SYSTEM_STATE.store(STATE_LOGGING, Ordering::Relaxed);
            logging_loop(session, estimator).await;
        }
        Err(e) => error!("logging session failed to start: {e}"),
    }

    // Logging has halted; diagnostics keep running until reset.
    SYSTEM_STATE.store(STATE_SD_ERROR, Ordering::Relaxed);
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}

/// Probe the card with bounded retries, then discover the session's
/// log file.
async fn start_session(spi_device: SdSpiDevice) -> Result<LogSession<'static, Volume>, StorageError> {
    let sd_card = SdCard::new(spi_device, embassy_time::Delay);

    let mut init_ok = false;
    for attempt in 1..=SD_INIT_RETRIES {
        info!("SD init attempt {attempt}/{SD_INIT_RETRIES}...");
        match sd_card.num_bytes() {
            Ok(bytes) => {
                info!("SD card: {} MB", bytes / (1024 * 1024));
                init_ok = true;
                break;
            }
            Err(e) => {
                warn!("SD init failed: {e:?}");
                sd_card.mark_card_uninit();
                Timer::after(Duration::from_millis(500)).await;
            }
        }
    }
    if !init_ok {
        return Err(StorageError::Unavailable(FromUnchecked::from_unchecked(
            "SD card not responding",
        )));
    }

    sd_card.spi(|dev| {
        let _ = dev
            .bus_mut()
            .apply_config(&SpiConfig::default().with_frequency(Rate::from_mhz(SD_SPI_WORK_FREQ_MHZ)));
    });
    info!("SPI raised to {SD_SPI_WORK_FREQ_MHZ} MHz");

    let volume = SdVolume::new(sd_card, UptimeTimeSource);
    LogSession::start(volume, &LOG)
}

/// Foreground loop: poll the estimator at a fixed interval and append
/// one CSV row per poll. Never touches the edge context's state except
/// through the shared window.
async fn logging_loop(
    mut session: LogSession<'static, Volume>,
    estimator: SpeedEstimator<'static, RPM_WINDOW_SLOTS>,
) {
    info!("logging to {}", session.file_name());
    let mut row: CsvRow = CsvRow::new(LOG.delimiter);
    let mut consecutive_failures: u8 = 0;

    loop {
        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;

        let Some(sample) = estimator.sample() else {
            debug!("no rotation data yet, skipping row");
            continue;
        };
        let uptime_s = Instant::now().as_secs();

        row.clear();
        let built = row
            .field(uptime_s)
            .and_then(|row| row.field(format_args!("{:.1}", sample.rpm)))
            .and_then(|row| row.field(format_args!("{:.2}", sample.kph)))
            .map(|_| ());
        if let Err(e) = built {
            error!("row build failed: {e}");
            continue;
        }

        match session.append_row(&row) {
            Ok(()) => consecutive_failures = 0,
            Err(e) => {
                consecutive_failures += 1;
                error!(
                    "row write failed ({consecutive_failures}/{MAX_WRITE_FAILURES}): {e}"
                );
                if consecutive_failures >= MAX_WRITE_FAILURES {
                    error!("too many write failures, halting logging");
                    return;
                }
            }
        }
    }
}

/// Edge context: waits on the hall input and stamps each edge with the
/// microsecond uptime counter. Nothing here blocks or allocates.
#[embassy_executor::task]
async fn edge_task(mut hall: Input<'static>) {
    let mut recorder = EdgeRecorder::new(EdgeTimer::new(TICKS_PER_SECOND), &RPM_WINDOW);
    loop {
        hall.wait_for_rising_edge().await;
        let now = Instant::now().as_micros() as u32;
        recorder.record(now);
    }
}

/// Blink patterns per system state: slow heartbeat while logging, fast
/// blink on SD trouble, solid during init.
#[embassy_executor::task]
async fn led_task(mut led: Output<'static>) {
    loop {
        match SYSTEM_STATE.load(Ordering::Relaxed) {
            STATE_LOGGING => {
                led.set_high();
                Timer::after(Duration::from_millis(100)).await;
                led.set_low();
                Timer::after(Duration::from_millis(1900)).await;
            }
            STATE_SD_ERROR => {
                led.toggle();
                Timer::after(Duration::from_millis(150)).await;
            }
            _ => {
                led.set_high();
                Timer::after(Duration::from_millis(100)).await;
            }
        }
    }
}
