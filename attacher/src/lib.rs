//! Desktop background attachment for backdrop.
//!
//! [`WallpaperAttacher`] finds the container the desktop shell keeps behind
//! its icon layer and reparents a caller-supplied window into it, so the
//! window renders as an interactive wallpaper. The shell is reached through
//! the [`ShellWindows`] trait; [`Win32Shell`] implements it on Windows.
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn demo() -> anyhow::Result<()> {
//! use attacher::{Config, WallpaperAttacher, Win32Shell};
//!
//! let profile = Config::load()?.shell_profile()?;
//! let attacher = WallpaperAttacher::new(Win32Shell::new(), profile);
//!
//! let target = "0x000A0B2C".parse()?;
//! attacher.attach(target)?;
//! # Ok(())
//! # }
//! ```

mod config;
mod macros;
mod platform;
mod wallpaper_attacher;

#[cfg(windows)]
mod win32;

pub use config::{Config, GeneralSettings, ShellSettings};
pub use platform::ShellWindows;
pub use wallpaper_attacher::WallpaperAttacher;

#[cfg(windows)]
pub use win32::Win32Shell;
