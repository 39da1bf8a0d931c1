use common::{AttachError, Discovery, HostStrategy, ShellProfile, WindowHandle};
use std::ops::ControlFlow;

use crate::platform::ShellWindows;

/// Places windows into the desktop shell's background layer.
///
/// The attacher keeps no state between calls: every [`attach`](Self::attach)
/// rediscovers the shell windows from scratch, so calling it again after a
/// failure (or after a shell restart) is always safe.
pub struct WallpaperAttacher<P> {
    platform: P,
    profile: ShellProfile,
}

impl<P: ShellWindows> WallpaperAttacher<P> {
    pub fn new(platform: P, profile: ShellProfile) -> Self {
        Self { platform, profile }
    }

    /// Attacher using the built-in shell identities
    pub fn with_default_profile(platform: P) -> Self {
        Self::new(platform, ShellProfile::default())
    }

    pub fn profile(&self) -> &ShellProfile {
        &self.profile
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Reparent `target` under the shell's background host container.
    ///
    /// `target` must be a realized window owned by the caller. Only its parent
    /// changes; position and size are left alone.
    ///
    /// # Errors
    ///
    /// - [`AttachError::ShellRootNotFound`] if the shell root is missing
    /// - [`AttachError::HostContainerNotFound`] if discovery finds no host
    /// - [`AttachError::ReparentFailed`] if the platform rejects the reparent
    pub fn attach(&self, target: WindowHandle) -> Result<(), AttachError> {
        let discovery = self.discover()?;

        log::debug!("Reparenting {} under host {}", target, discovery.host);
        self.platform
            .reparent(target, discovery.host)
            .map_err(AttachError::ReparentFailed)
    }

    /// Locate the background host without reparenting anything.
    pub fn discover(&self) -> Result<Discovery, AttachError> {
        let profile = &self.profile;

        let shell_root = self
            .platform
            .find_top_level(&profile.root_class, profile.root_title.as_deref())
            .ok_or(AttachError::ShellRootNotFound)?;
        log::debug!("Shell root '{}' at {}", profile.root_class, shell_root);

        // Some shell builds spawn the worker without acknowledging the message,
        // so an undelivered directive does not end discovery.
        let directive_delivered = self.platform.send_directive(shell_root, &profile.spawn);
        if !directive_delivered {
            log::debug!(
                "Spawn directive 0x{:04X} not delivered within {}ms, scanning anyway",
                profile.spawn.message,
                profile.spawn.timeout_ms
            );
        }

        let anchor = self
            .find_anchor()
            .ok_or(AttachError::HostContainerNotFound)?;
        log::debug!("Found '{}' inside {}", profile.icon_view_class, anchor);

        let host = match profile.host_strategy {
            HostStrategy::Matched => anchor,
            HostStrategy::NextSibling => self
                .platform
                .find_next_top_level(anchor, &profile.host_class)
                .ok_or(AttachError::HostContainerNotFound)?,
        };
        log::debug!(
            "Background host {} (strategy: {})",
            host,
            profile.host_strategy
        );

        Ok(Discovery {
            shell_root,
            directive_delivered,
            anchor,
            host,
        })
    }

    /// First top-level window, in enumeration order, that owns the icon view.
    fn find_anchor(&self) -> Option<WindowHandle> {
        let mut anchor = None;

        self.platform.enumerate_top_level(&mut |window| {
            log::trace!("Checking {} for '{}'", window, self.profile.icon_view_class);
            if self
                .platform
                .find_child(window, &self.profile.icon_view_class, None)
                .is_some()
            {
                anchor = Some(window);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        anchor
    }
}
