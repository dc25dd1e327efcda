use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use typed_builder::TypedBuilder;

pub use ocho_common;
pub use ocho_common::app::App;
pub use sdl2;

use ocho_common::key::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    RGB24,
}

#[derive(TypedBuilder)]
pub struct SdlInitInfo {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub title: String,
    #[builder(default = PixelFormat::RGB24)]
    pub pixel_format: PixelFormat,
}

pub struct SdlContext;

impl SdlContext {
    /// Open a window and drive `app` until it asks to exit or the window
    /// closes. Key events are translated to logical keys before they reach
    /// the app; the app's frame buffer is streamed into a scaled texture.
    pub fn run(sdl_init_info: SdlInitInfo, mut app: impl App) -> Result<()> {
        let SdlInitInfo {
            width,
            height,
            scale,
            title,
            pixel_format,
        } = sdl_init_info;

        log::info!("SDL2 window {}x{} at scale {}", width, height, scale);
        let sdl_context = sdl2::init().map_err(|e| anyhow!(e))?;
        let video_subsystem = sdl_context.video().map_err(|e| anyhow!(e))?;
        let window = video_subsystem
            .window(&title, width * scale, height * scale)
            .position_centered()
            .build()?;
        let mut canvas = window.into_canvas().build()?;
        canvas
            .set_scale(scale as f32, scale as f32)
            .map_err(|e| anyhow!(e))?;

        let creator = canvas.texture_creator();
        let mut texture =
            creator.create_texture_streaming(map_pixel_format(pixel_format), width, height)?;

        let color_size = map_pixel_format_size(pixel_format);
        let mut screen_state = vec![0u8; (width * height * color_size) as usize];

        app.init();
        let mut event_pump = sdl_context.event_pump().map_err(|e| anyhow!(e))?;

        // Hold frames to ~60 FPS so one update stays one display frame.
        let target_frame = Duration::from_micros(16_667);
        let mut last_frame = Instant::now();

        loop {
            if app.should_exit() {
                app.exit();
                break;
            }

            for event in event_pump.poll_iter() {
                match event {
                    Event::Quit { .. } => {
                        app.exit();
                        return Ok(());
                    }
                    Event::KeyDown {
                        keycode: Some(keycode),
                        repeat: false,
                        ..
                    } => {
                        app.handle_key_event(map_keycode(keycode), true);
                    }
                    Event::KeyUp {
                        keycode: Some(keycode),
                        ..
                    } => {
                        app.handle_key_event(map_keycode(keycode), false);
                    }
                    _ => {}
                }
            }

            app.update(&mut screen_state);

            texture
                .update(None, &screen_state, (width * color_size) as usize)
                .map_err(|e| anyhow!(e.to_string()))?;
            canvas.copy(&texture, None, None).map_err(|e| anyhow!(e))?;
            canvas.present();

            let elapsed = last_frame.elapsed();
            if elapsed < target_frame {
                std::thread::sleep(target_frame - elapsed);
            }
            last_frame = Instant::now();
        }

        Ok(())
    }
}

pub fn map_pixel_format(pixel_format: PixelFormat) -> PixelFormatEnum {
    match pixel_format {
        PixelFormat::RGB24 => PixelFormatEnum::RGB24,
    }
}

pub fn map_pixel_format_size(pixel_format: PixelFormat) -> u32 {
    match pixel_format {
        PixelFormat::RGB24 => 3,
    }
}

pub fn map_keycode(keycode: Keycode) -> Key {
    match keycode {
        Keycode::Num1 => Key::Num1,
        Keycode::Num2 => Key::Num2,
        Keycode::Num3 => Key::Num3,
        Keycode::Num4 => Key::Num4,
        Keycode::Q => Key::Q,
        Keycode::W => Key::W,
        Keycode::E => Key::E,
        Keycode::R => Key::R,
        Keycode::A => Key::A,
        Keycode::S => Key::S,
        Keycode::D => Key::D,
        Keycode::F => Key::F,
        Keycode::Z => Key::Z,
        Keycode::X => Key::X,
        Keycode::C => Key::C,
        Keycode::V => Key::V,
        Keycode::Space => Key::Space,
        Keycode::Escape => Key::Escape,
        _ => Key::None,
    }
}
