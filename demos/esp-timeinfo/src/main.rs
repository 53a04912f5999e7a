#![no_std]
#![no_main]

use ds3231_timeinfo::{DS3231, DS3231_I2C_ADDRESS, I2C_CLK_SPEED_HZ};
use esp_backtrace as _;
use esp_hal::{
    clock::CpuClock,
    i2c::master::{Config as I2cConfig, I2c},
    main,
    time::{Duration, Instant, Rate},
};
use log::{error, info};

#[main]
fn main() -> ! {
    // Initialize logger
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("DS3231 Time Info Example Starting...");

    // ESP32-S3 pinout
    let sda = peripherals.GPIO9;
    let scl = peripherals.GPIO10;

    let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(I2C_CLK_SPEED_HZ / 1000));
    let mut i2c = I2c::new(peripherals.I2C0, i2c_config)
        .unwrap()
        .with_sda(sda)
        .with_scl(scl);

    loop {
        let loop_start = Instant::now();

        // Bind, read once, release
        match DS3231::create(&mut i2c, DS3231_I2C_ADDRESS) {
            Ok(mut rtc) => {
                match rtc.raw_timeinfo() {
                    Ok(timeinfo) => {
                        info!(
                            "{:02}-{:02}-{:02} {:02}:{:02}:{:02}, wday: {}",
                            timeinfo.year,
                            timeinfo.month,
                            timeinfo.date,
                            timeinfo.hours,
                            timeinfo.minutes,
                            timeinfo.seconds,
                            timeinfo.day
                        );
                        match timeinfo.to_datetime() {
                            Ok(datetime) => info!("DateTime: {}", datetime),
                            Err(e) => error!("Invalid time registers: {:?}", e),
                        }
                    }
                    Err(e) => error!("Failed to read time info: {:?}", e),
                }
                rtc.destroy();
            }
            Err(e) => error!("Failed to create DS3231: {:?}", e),
        }

        while loop_start.elapsed() < Duration::from_secs(1) {
            // Busy wait
        }
    }
}
