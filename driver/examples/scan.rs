//! `cargo run --example scan -- /dev/ttyUSB0`

use {
    servo_driver::{Bus, serial::SerialComm},
    servo_packet::{MAX_ID, MIN_ID},
    std::time::Duration,
};

const BAUD_RATES: &[u32] = &[57_600, 1_000_000];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        return Err("usage: scan <serial port>".into());
    };

    'baud: for &baud in BAUD_RATES {
        log::info!("{baud} baud:");
        let comm = match SerialComm::open(&path, baud, Duration::from_millis(20)) {
            Ok(comm) => comm,
            Err(e) => {
                log::error!("Couldn't open {path} at {baud} baud: {e}");
                continue 'baud;
            }
        };
        let mut bus = Bus::new(comm);
        for id in bus.scan(MIN_ID..=MAX_ID)? {
            log::info!("    --> ID {id} responded");
        }
    }

    log::info!("Finished.");
    Ok(())
}
