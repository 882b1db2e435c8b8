//! `cargo run --example back_and_forth -- bus.toml`
//!
//! Sweeps the first joint in the configuration between its soft limits.

use {
    servo_driver::{Actuator, BusConfig, Joint, serial::SerialComm},
    std::{cell::RefCell, thread, time::Duration},
};

const SPEED_PERCENT: f64 = 30.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => BusConfig::load(path)?,
        None => BusConfig {
            port: Some("/dev/ttyUSB0".to_owned()),
            ..BusConfig::default()
        },
    };
    let joint_config = config.joints.first().copied().unwrap_or_default();

    let bus = RefCell::new(config.bus(SerialComm::from_config(&config)?));
    let actuator = Actuator::connect(&bus, joint_config.device_id)?;
    let mut joint = Joint::new(actuator, joint_config, config.calibration)?;
    let () = joint.actuator().write_torque_enable(1, true)?;

    let (min, max) = joint.limits();
    let targets = [0.8 * min, 0.8 * max];
    let mut i = 0;
    loop {
        let target = targets[i % targets.len()];
        let () = joint.set_angle_speed(target, SPEED_PERCENT, true)?;
        'wait: loop {
            thread::sleep(Duration::from_millis(50));
            let (angle, rpm) = joint.present_angle_speed()?;
            log::info!("{angle:+.3} rad at {rpm:+} rpm (goal {target:+.3} rad)");
            if !joint.is_moving()? {
                break 'wait;
            }
        }
        i += 1;
    }
}
