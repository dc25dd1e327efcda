use anyhow::Result;
use ocho_chip8::EmulatorApp;
use ocho_sdl2::{App, SdlContext, SdlInitInfo};

/// Load `rom` into a fresh machine and run it under the SDL2 shell.
///
/// Fails before any window opens if the ROM does not fit in memory.
pub fn run(rom: &[u8]) -> Result<()> {
    let mut app = EmulatorApp::default();
    app.emulator.load_rom(rom)?;

    let init_info = SdlInitInfo::builder()
        .width(app.width())
        .height(app.height())
        .scale(app.scale())
        .title(app.title())
        .build();
    SdlContext::run(init_info, app)?;
    Ok(())
}
