#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};
use log::{error, info};
use node_credentials::{ConfigError, Credentials};

/// Loads the compiled-in credentials and checks them before any network task
/// would be allowed to use them.
fn load_credentials() -> Result<Credentials, ConfigError> {
    let credentials = Credentials::from_constants()?;
    credentials.validate()?;
    Ok(credentials)
}

#[esp_hal_embassy::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init({
        let config = esp_hal::Config::default();
        config.with_cpu_clock(CpuClock::max())
    });
    info!("Node started");
    let timg1 = TimerGroup::new(peripherals.TIMG1);
    esp_hal_embassy::init(timg1.timer0);

    match load_credentials() {
        Ok(credentials) => info!("[CFG] {}", credentials.summary()),
        Err(e) => error!("[CFG] Invalid credentials: {e}"),
    }

    loop {
        Timer::after_secs(2).await;
    }
}
