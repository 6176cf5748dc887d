//! cifX example: Cyclic I/O
//!
//! Brings up channel 0 of board 0 and copies the input image to the output
//! image in a loop, incrementing the first byte each cycle.
use cifx::{Cifx, ErrorKind};
use std::{env, io, thread, time::Duration};

const IMAGE_LEN: usize = 8;

pub fn main() -> Result<(), io::Error> {
    env_logger::init();
    let cycles: u32 = match env::args().nth(1) {
        Some(n) => n
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        None => 100,
    };

    let mut cifx = Cifx::load()?;
    cifx.init()?;
    let driver = cifx.open_driver()?;
    driver.log_system_info()?;

    let board = driver.get_board(0)?;
    let mut channel = board.get_channel(0)?;
    channel.open()?;
    channel.start_host()?;
    channel.open_bus()?;
    log::info!("Channel {:?}", channel.state()?);

    let cycle_time = Duration::from_millis(10);
    let mut counter = 0u8;
    for _ in 0..cycles {
        let mut data = match channel.io_read(0, 0, IMAGE_LEN) {
            Ok(data) => data,
            Err(e) if e.kind() == Some(ErrorKind::IoReadFailed) => {
                log::debug!("{}", e);
                vec![0; IMAGE_LEN]
            }
            Err(e) => return Err(e.into()),
        };
        data[0] = counter;
        counter = counter.wrapping_add(1);
        if let Err(e) = channel.io_write(0, 0, &data) {
            log::debug!("{}", e);
        }
        thread::sleep(cycle_time);
    }

    channel.close_bus()?;
    channel.stop_host()?;
    channel.close()?;
    Ok(())
}
