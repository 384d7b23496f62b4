//! mclaunch is a library for resolving a Minecraft version from the Mojang version
//! manifest, acquiring its libraries and assets, and launching it.
//!
//! The pipeline is driven by the [`Installer`], which produces a [`Game`] that can be
//! launched as a child process.

#![deny(unsafe_op_in_unsafe_fn)]

mod path;
mod store;

pub mod http;
pub mod platform;
pub mod event;
pub mod manifest;
pub mod acquire;
pub mod classpath;
pub mod template;
pub mod launch;
pub mod install;

pub use platform::Platform;
pub use event::{Event, Handler};
pub use launch::{Game, LaunchMode, Launched};
pub use install::{Installer, Version, Error, Result};
