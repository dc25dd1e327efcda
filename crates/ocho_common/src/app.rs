use crate::key::Key;

/// Frontend-agnostic application surface.
///
/// The SDL shell drives an `App` once per frame: key events first, then
/// `update` with the RGB24 frame buffer to fill.
pub trait App {
    fn init(&mut self);
    fn update(&mut self, screen: &mut [u8]);
    fn handle_key_event(&mut self, key: Key, is_down: bool);
    fn should_exit(&self) -> bool;
    fn exit(&mut self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn scale(&self) -> u32;
    fn title(&self) -> String;
}
