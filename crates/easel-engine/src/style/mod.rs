//! Drawing style and the save/restore stacks.

mod anchor;
mod stack;
mod style;

pub use anchor::Anchor;
pub use stack::StateStack;
pub use style::{LineCap, Style, StyleError};
