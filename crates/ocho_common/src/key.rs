/// Logical keys the frontends report to an `App`.
///
/// This is the subset of the keyboard the emulator cares about: the 4x4
/// block that maps onto the CHIP-8 keypad plus a few control keys. The
/// mapping from physical scancodes lives in the SDL shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Num1,
    Num2,
    Num3,
    Num4,
    Q,
    W,
    E,
    R,
    A,
    S,
    D,
    F,
    Z,
    X,
    C,
    V,
    Space,
    Escape,
    None,
}
