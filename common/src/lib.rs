//! Common types for backdrop.
//!
//! This crate defines the handle, error and shell-profile types shared between
//! the attacher library and the `backdrop` command line tool.
//!
//! # Shell identities
//!
//! The desktop shell exposes no documented API for hosting a wallpaper window.
//! Discovery relies on window classes and a private message code that have
//! held for several shell generations but may change. They are collected in
//! the constants below and in [`ShellProfile`] so they can be swapped without
//! touching the discovery algorithm.
//!
//! # Examples
//!
//! ```
//! use common::{HostStrategy, ShellProfile, WindowHandle};
//!
//! let target: WindowHandle = "0x000A0B2C".parse().unwrap();
//! assert_eq!(target.as_raw(), 0x000A_0B2C);
//!
//! let profile = ShellProfile {
//!     host_strategy: HostStrategy::Matched,
//!     ..Default::default()
//! };
//! assert_eq!(profile.root_class, "Progman");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use thiserror::Error;

/// Class of the shell's top-level desktop container.
pub const PROGMAN_CLASS: &str = "Progman";

/// Class of the icon view hosted by the window that sits above the wallpaper.
pub const SHELL_VIEW_CLASS: &str = "SHELLDLL_DefView";

/// Class of the worker windows the shell spawns behind the icons.
pub const WORKER_CLASS: &str = "WorkerW";

/// Private shell message asking `Progman` to spawn its background worker.
pub const WM_SPAWN_WORKER: u32 = 0x052C;

/// Bounded wait for the spawn directive, in milliseconds.
pub const SPAWN_TIMEOUT_MS: u32 = 1000;

/// Errors returned by the attach protocol.
///
/// All errors are serializable so they can be reported as JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachError {
    /// The shell root container is missing: the shell is not running or uses
    /// an unknown identity.
    #[error("desktop shell root window not found")]
    ShellRootNotFound,

    /// No window hosting the icon view was found, or its background sibling
    /// is missing.
    #[error("background host container not found")]
    HostContainerNotFound,

    /// The platform rejected the reparent call. Carries the platform error code.
    #[error("reparent failed (platform error {0})")]
    ReparentFailed(u32),
}

/// Opaque, non-null native window handle.
///
/// The handle is owned by whoever created the window. Holding one never keeps
/// the window alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(NonZeroUsize);

impl WindowHandle {
    /// Wrap a raw handle value. Returns `None` for the null handle.
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.as_raw())
    }
}

/// Error parsing a [`WindowHandle`] from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseHandleError {
    #[error("invalid window handle '{0}' (expected decimal or 0x-prefixed hex)")]
    Invalid(String),

    #[error("window handle must not be null")]
    Null,
}

impl FromStr for WindowHandle {
    type Err = ParseHandleError;

    /// Accepts decimal (`655148`) or hexadecimal (`0x0009FF2C`) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => usize::from_str_radix(hex, 16),
            None => trimmed.parse::<usize>(),
        };

        let raw = parsed.map_err(|_| ParseHandleError::Invalid(s.to_string()))?;
        Self::from_raw(raw).ok_or(ParseHandleError::Null)
    }
}

/// How the background host is located once the icon-view anchor is found.
///
/// Shell versions differ: on some the window carrying the icon view is itself
/// the host, on others the host is the worker window enumerated right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostStrategy {
    /// Use the next top-level window of the host class after the anchor.
    #[default]
    NextSibling,
    /// Use the anchor window itself.
    Matched,
}

impl HostStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NextSibling => "next-sibling",
            Self::Matched => "matched",
        }
    }
}

impl FromStr for HostStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "next-sibling" | "next_sibling" | "sibling" => Ok(Self::NextSibling),
            "matched" | "anchor" => Ok(Self::Matched),
            _ => Err(format!(
                "unknown host strategy '{}' (expected next-sibling or matched)",
                s
            )),
        }
    }
}

impl fmt::Display for HostStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Message sent to the shell root to make it spawn the background host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnDirective {
    pub message: u32,
    pub wparam: usize,
    pub lparam: isize,
    /// Upper bound on the synchronous send, in milliseconds
    pub timeout_ms: u32,
}

impl Default for SpawnDirective {
    fn default() -> Self {
        Self {
            message: WM_SPAWN_WORKER,
            wparam: 0,
            lparam: 0,
            timeout_ms: SPAWN_TIMEOUT_MS,
        }
    }
}

/// Every version-dependent identity the discovery protocol relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellProfile {
    pub root_class: String,
    pub root_title: Option<String>,
    pub icon_view_class: String,
    pub host_class: String,
    pub spawn: SpawnDirective,
    pub host_strategy: HostStrategy,
}

impl Default for ShellProfile {
    fn default() -> Self {
        Self {
            root_class: PROGMAN_CLASS.to_string(),
            root_title: None,
            icon_view_class: SHELL_VIEW_CLASS.to_string(),
            host_class: WORKER_CLASS.to_string(),
            spawn: SpawnDirective::default(),
            host_strategy: HostStrategy::default(),
        }
    }
}

/// Outcome of a discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub shell_root: WindowHandle,
    /// Whether the spawn directive was delivered before its timeout
    pub directive_delivered: bool,
    /// First enumerated window hosting the icon view
    pub anchor: WindowHandle,
    /// Container the target gets reparented under
    pub host: WindowHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_from_raw() {
        assert!(WindowHandle::from_raw(0).is_none());
        assert_eq!(WindowHandle::from_raw(42).unwrap().as_raw(), 42);
    }

    #[test]
    fn test_handle_parse() {
        let hex: WindowHandle = "0x0009FF2C".parse().unwrap();
        assert_eq!(hex.as_raw(), 0x0009_FF2C);

        let upper: WindowHandle = "0XAB".parse().unwrap();
        assert_eq!(upper.as_raw(), 0xAB);

        let dec: WindowHandle = " 655148 ".parse().unwrap();
        assert_eq!(dec.as_raw(), 655_148);
    }

    #[test]
    fn test_handle_parse_invalid() {
        assert_eq!("0".parse::<WindowHandle>(), Err(ParseHandleError::Null));
        assert_eq!("0x0".parse::<WindowHandle>(), Err(ParseHandleError::Null));
        assert!(matches!(
            "window".parse::<WindowHandle>(),
            Err(ParseHandleError::Invalid(_))
        ));
        assert!(matches!(
            "0xZZ".parse::<WindowHandle>(),
            Err(ParseHandleError::Invalid(_))
        ));
        assert!(matches!(
            "-5".parse::<WindowHandle>(),
            Err(ParseHandleError::Invalid(_))
        ));
    }

    #[test]
    fn test_handle_display() {
        let handle = WindowHandle::from_raw(0x1A2B).unwrap();
        assert_eq!(handle.to_string(), "0x00001A2B");
        assert_eq!(handle.to_string().parse::<WindowHandle>().unwrap(), handle);
    }

    #[test]
    fn test_handle_serializes_as_number() {
        let handle = WindowHandle::from_raw(4096).unwrap();
        assert_eq!(serde_json::to_string(&handle).unwrap(), "4096");
        assert!(serde_json::from_str::<WindowHandle>("0").is_err());
    }

    #[test]
    fn test_host_strategy_parse() {
        assert_eq!(
            "next-sibling".parse::<HostStrategy>(),
            Ok(HostStrategy::NextSibling)
        );
        assert_eq!("Matched".parse::<HostStrategy>(), Ok(HostStrategy::Matched));
        assert!("best".parse::<HostStrategy>().is_err());
        assert_eq!(HostStrategy::default(), HostStrategy::NextSibling);
    }

    #[test]
    fn test_host_strategy_serde_names() {
        let json = serde_json::to_string(&HostStrategy::NextSibling).unwrap();
        assert_eq!(json, "\"next-sibling\"");
        let parsed: HostStrategy = serde_json::from_str("\"matched\"").unwrap();
        assert_eq!(parsed, HostStrategy::Matched);
    }

    #[test]
    fn test_default_profile() {
        let profile = ShellProfile::default();
        assert_eq!(profile.root_class, PROGMAN_CLASS);
        assert!(profile.root_title.is_none());
        assert_eq!(profile.icon_view_class, SHELL_VIEW_CLASS);
        assert_eq!(profile.host_class, WORKER_CLASS);
        assert_eq!(profile.spawn.message, 0x052C);
        assert_eq!(profile.spawn.timeout_ms, 1000);
        assert_eq!(profile.spawn.wparam, 0);
        assert_eq!(profile.spawn.lparam, 0);
    }

    #[test]
    fn test_attach_error_display() {
        assert_eq!(
            AttachError::ShellRootNotFound.to_string(),
            "desktop shell root window not found"
        );
        assert_eq!(
            AttachError::ReparentFailed(1400).to_string(),
            "reparent failed (platform error 1400)"
        );
    }

    #[test]
    fn test_discovery_json() {
        let discovery = Discovery {
            shell_root: WindowHandle::from_raw(1).unwrap(),
            directive_delivered: false,
            anchor: WindowHandle::from_raw(2).unwrap(),
            host: WindowHandle::from_raw(3).unwrap(),
        };
        let json = serde_json::to_string(&discovery).unwrap();
        assert!(json.contains("\"directive_delivered\":false"));
        let back: Discovery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, discovery);
    }
}
