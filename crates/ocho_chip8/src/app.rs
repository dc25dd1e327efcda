use std::time::Instant;

use ocho_common::app::App;
use ocho_common::key::Key;
use ocho_common::Color;

use crate::{Emulator, StepStatus, TimerClock, SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH};

/// Frontend-facing wrapper that drives the core one frame at a time.
///
/// Each `update` runs a batch of instructions, advances the 60 Hz timers by
/// the measured wall-time delta, and repaints the RGB24 frame buffer when
/// the display changed. Instruction errors are logged once and leave the
/// engine halted, so a bad ROM freezes on screen instead of tearing down
/// the window.
pub struct EmulatorApp {
    should_exit: bool,
    paused: bool,
    pub emulator: Emulator,
    /// Instructions per frame; ~600 instructions/second at 60 FPS.
    pub steps_per_frame: u32,
    clock: TimerClock,
    last_frame: Option<Instant>,
    sound_on: bool,
}

impl Default for EmulatorApp {
    fn default() -> Self {
        EmulatorApp {
            should_exit: false,
            paused: false,
            emulator: Emulator::default(),
            steps_per_frame: 10,
            clock: TimerClock::new(),
            last_frame: None,
            sound_on: false,
        }
    }
}

/// Original QWERTY layout: 1234/QWER/ASDF/ZXCV map onto the 4x4 keypad.
fn keypad_index(key: Key) -> Option<usize> {
    match key {
        Key::Num1 => Some(0x1),
        Key::Num2 => Some(0x2),
        Key::Num3 => Some(0x3),
        Key::Num4 => Some(0xC),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        _ => None,
    }
}

impl App for EmulatorApp {
    fn init(&mut self) {
        log::info!("CHIP-8 init");
    }

    fn update(&mut self, screen: &mut [u8]) {
        let now = Instant::now();
        let elapsed = self.last_frame.map(|t| now - t).unwrap_or_default();
        self.last_frame = Some(now);

        if !self.paused {
            for _ in 0..self.steps_per_frame {
                match self.emulator.step() {
                    Ok(StepStatus::Executed) => {}
                    // Keep the frame going; input polling happens between
                    // frames, so the wait resolves on a later update.
                    Ok(StepStatus::WaitingForKey) => break,
                    Ok(StepStatus::Halted) => break,
                    Err(err) => {
                        log::error!("emulation halted: {err}");
                        break;
                    }
                }
            }
            let ticks = self.clock.advance(elapsed);
            self.emulator.tick_timers(ticks);
        }

        let sound = self.emulator.sound_active();
        if sound != self.sound_on {
            log::debug!("sound {}", if sound { "on" } else { "off" });
            self.sound_on = sound;
        }

        if self.emulator.take_redraw() {
            for (i, pixel) in self.emulator.display().iter().enumerate() {
                let color = if *pixel { Color::WHITE } else { Color::BLACK };
                let index = i * 3;
                screen[index] = color.r;
                screen[index + 1] = color.g;
                screen[index + 2] = color.b;
            }
        }
    }

    fn handle_key_event(&mut self, key: Key, is_down: bool) {
        match key {
            Key::Escape if is_down => self.should_exit = true,
            Key::Space if is_down => {
                self.paused = !self.paused;
                log::info!("{}", if self.paused { "paused" } else { "resumed" });
            }
            _ => {
                if let Some(idx) = keypad_index(key) {
                    self.emulator.set_key(idx, is_down);
                }
            }
        }
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        log::info!("CHIP-8 exit");
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        SCREEN_SCALE
    }

    fn title(&self) -> String {
        "ocho CHIP-8".to_string()
    }
}
