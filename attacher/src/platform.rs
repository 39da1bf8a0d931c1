//! Windowing capabilities the discovery protocol consumes.

use common::{SpawnDirective, WindowHandle};
use std::ops::ControlFlow;

/// Access to the desktop shell's window tree.
///
/// Implemented by [`crate::Win32Shell`] on Windows and by in-memory fakes in
/// tests. Every call is synchronous.
pub trait ShellWindows {
    /// Find a top-level window by class and optional title.
    fn find_top_level(&self, class: &str, title: Option<&str>) -> Option<WindowHandle>;

    /// Find a direct child of `parent` by class and optional title.
    fn find_child(
        &self,
        parent: WindowHandle,
        class: &str,
        title: Option<&str>,
    ) -> Option<WindowHandle>;

    /// Find the first top-level window of `class` enumerated after `after`.
    fn find_next_top_level(&self, after: WindowHandle, class: &str) -> Option<WindowHandle>;

    /// Send `directive` with a bounded wait. Returns whether it was delivered;
    /// the reply payload is discarded.
    fn send_directive(&self, window: WindowHandle, directive: &SpawnDirective) -> bool;

    /// Visit top-level windows in native enumeration order until `visit`
    /// breaks or the list is exhausted.
    fn enumerate_top_level(&self, visit: &mut dyn FnMut(WindowHandle) -> ControlFlow<()>);

    /// Make `new_parent` the parent of `child`. Errors carry the platform code.
    fn reparent(&self, child: WindowHandle, new_parent: WindowHandle) -> Result<(), u32>;
}

impl<T: ShellWindows + ?Sized> ShellWindows for &T {
    fn find_top_level(&self, class: &str, title: Option<&str>) -> Option<WindowHandle> {
        (**self).find_top_level(class, title)
    }

    fn find_child(
        &self,
        parent: WindowHandle,
        class: &str,
        title: Option<&str>,
    ) -> Option<WindowHandle> {
        (**self).find_child(parent, class, title)
    }

    fn find_next_top_level(&self, after: WindowHandle, class: &str) -> Option<WindowHandle> {
        (**self).find_next_top_level(after, class)
    }

    fn send_directive(&self, window: WindowHandle, directive: &SpawnDirective) -> bool {
        (**self).send_directive(window, directive)
    }

    fn enumerate_top_level(&self, visit: &mut dyn FnMut(WindowHandle) -> ControlFlow<()>) {
        (**self).enumerate_top_level(visit)
    }

    fn reparent(&self, child: WindowHandle, new_parent: WindowHandle) -> Result<(), u32> {
        (**self).reparent(child, new_parent)
    }
}
