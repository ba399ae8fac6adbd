//! Window event types forwarded to cameras and the viewer loop.

use bitflags::bitflags;

/// The state of a key or mouse button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// The button or key is released.
    Release,
    /// The button or key is pressed.
    Press,
}

/// A mouse button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MouseButton {
    /// The left mouse button.
    Button1,
    /// The right mouse button.
    Button2,
    /// The middle mouse button.
    Button3,
    /// An extra mouse button.
    Button4,
}

/// A keyboard key.
///
/// Only the keys the viewer reacts to are distinguished; everything else maps
/// to [`Key::Unknown`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    /// The escape key.
    Escape,
    /// The enter/return key.
    Return,
    /// The space bar.
    Space,
    /// Any other key.
    Unknown,
}

bitflags! {
    /// Keyboard modifiers held while an event fired.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        /// A shift key.
        const SHIFT = 0b0001;
        /// A control key.
        const CONTROL = 0b0010;
        /// An alt key.
        const ALT = 0b0100;
        /// A logo/super key.
        const SUPER = 0b1000;
    }
}

/// An event produced by the window system.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WindowEvent {
    /// The window close button was activated.
    Close,
    /// The framebuffer was resized to the given pixel size.
    ///
    /// The viewer deliberately ignores this: surface and camera keep their
    /// setup-time dimensions.
    FramebufferSize(u32, u32),
    /// The cursor moved to the given window position, in pixels.
    CursorPos(f64, f64, Modifiers),
    /// A mouse button changed state.
    MouseButton(MouseButton, Action, Modifiers),
    /// The scroll wheel moved by the given horizontal/vertical offsets.
    Scroll(f64, f64, Modifiers),
    /// A keyboard key changed state.
    Key(Key, Action, Modifiers),
}
