//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Frame layout, login form and quit prompt
//! - `home`: The Home screen with the CupoYa and CajaCero overview
//! - `input`: Keyboard event handling
//! - `styles`: Brand palette and text styling

pub mod home;
pub mod input;
pub mod render;
pub mod styles;
