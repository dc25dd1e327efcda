use ocho_chip8::Chip8Error;

fn main() {
    env_logger::init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "ocho".to_string());
    let rom_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("Usage: {program} <rom>");
            std::process::exit(1);
        }
    };

    let rom = match std::fs::read(&rom_path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("{}: {}", rom_path, Chip8Error::RomUnreadable(err));
            std::process::exit(1);
        }
    };
    log::info!("playing ROM '{}' ({} bytes)", rom_path, rom.len());

    if let Err(err) = ocho::run(&rom) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
