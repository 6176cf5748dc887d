//! cifX example: List boards
//!
//! Loads the driver library, opens the driver and prints every board with
//! its channels.
use cifx::Cifx;
use std::io;

pub fn main() -> Result<(), io::Error> {
    env_logger::init();

    let mut cifx = Cifx::load()?;
    cifx.init()?;
    let driver = cifx.open_driver()?;

    println!("Driver: {}", driver.version()?);
    for board in driver.enumerate_boards()? {
        let board = board?;
        let info = board.info();
        println!(
            "Board {} {} (alias {:?}, device {}, serial {}, {} channels)",
            board.index(),
            board.name(),
            board.alias(),
            info.system.device_number,
            info.system.serial_number,
            board.channel_count()
        );
        for channel in board.enumerate_channels() {
            match channel {
                Ok(channel) => println!(
                    "  Channel {}: {} {} ({})",
                    channel.index(),
                    channel.firmware(),
                    channel.info().firmware_version,
                    channel.info().firmware_date
                ),
                Err(e) => log::warn!("{}", e),
            }
        }
    }
    driver.close()?;
    Ok(())
}
