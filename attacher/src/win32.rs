//! Win32 backend for [`ShellWindows`].

use common::{SpawnDirective, WindowHandle};
use std::ffi::CString;
use std::ops::ControlFlow;
use std::ptr::{null, null_mut};
use windows_sys::Win32::Foundation::{BOOL, FALSE, GetLastError, HWND, LPARAM, SetLastError, TRUE};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    EnumWindows, FindWindowA, FindWindowExA, SMTO_NORMAL, SendMessageTimeoutA, SetParent,
};

use crate::platform::ShellWindows;

type Visitor<'a> = &'a mut dyn FnMut(WindowHandle) -> ControlFlow<()>;

/// The live desktop shell, reached through `user32`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Shell;

impl Win32Shell {
    pub fn new() -> Self {
        Self
    }
}

fn to_hwnd(handle: WindowHandle) -> HWND {
    handle.as_raw() as HWND
}

fn from_hwnd(hwnd: HWND) -> Option<WindowHandle> {
    WindowHandle::from_raw(hwnd as usize)
}

/// Class and title names come from config, so interior NULs are possible.
fn c_name(name: &str) -> Option<CString> {
    match CString::new(name) {
        Ok(c) => Some(c),
        Err(_) => {
            log::warn!("Window identity {:?} contains a NUL byte", name);
            None
        }
    }
}

fn find_window_ex(
    parent: HWND,
    after: HWND,
    class: &str,
    title: Option<&str>,
) -> Option<WindowHandle> {
    let class = c_name(class)?;
    let title = match title {
        Some(t) => Some(c_name(t)?),
        None => None,
    };
    let title_ptr = title.as_ref().map_or(null(), |t| t.as_ptr() as *const u8);

    let hwnd = unsafe { FindWindowExA(parent, after, class.as_ptr() as *const u8, title_ptr) };
    from_hwnd(hwnd)
}

unsafe extern "system" fn visit_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // lparam is the visitor pointer handed to EnumWindows below and outlives the call.
    let visit = unsafe { &mut *(lparam as *mut Visitor<'_>) };

    match from_hwnd(hwnd) {
        Some(window) => match visit(window) {
            ControlFlow::Continue(()) => TRUE,
            ControlFlow::Break(()) => FALSE,
        },
        None => TRUE,
    }
}

impl ShellWindows for Win32Shell {
    fn find_top_level(&self, class: &str, title: Option<&str>) -> Option<WindowHandle> {
        let class = c_name(class)?;
        let title = match title {
            Some(t) => Some(c_name(t)?),
            None => None,
        };
        let title_ptr = title.as_ref().map_or(null(), |t| t.as_ptr() as *const u8);

        let hwnd = unsafe { FindWindowA(class.as_ptr() as *const u8, title_ptr) };
        from_hwnd(hwnd)
    }

    fn find_child(
        &self,
        parent: WindowHandle,
        class: &str,
        title: Option<&str>,
    ) -> Option<WindowHandle> {
        find_window_ex(to_hwnd(parent), null_mut(), class, title)
    }

    fn find_next_top_level(&self, after: WindowHandle, class: &str) -> Option<WindowHandle> {
        find_window_ex(null_mut(), to_hwnd(after), class, None)
    }

    fn send_directive(&self, window: WindowHandle, directive: &SpawnDirective) -> bool {
        let mut reply: usize = 0;
        let sent = unsafe {
            SendMessageTimeoutA(
                to_hwnd(window),
                directive.message,
                directive.wparam,
                directive.lparam,
                SMTO_NORMAL,
                directive.timeout_ms,
                &mut reply,
            )
        };

        if sent == 0 {
            let code = unsafe { GetLastError() };
            log::debug!("SendMessageTimeout to {} failed (error {})", window, code);
            return false;
        }
        true
    }

    fn enumerate_top_level(&self, visit: &mut dyn FnMut(WindowHandle) -> ControlFlow<()>) {
        let mut visit: Visitor<'_> = visit;
        let data = &mut visit as *mut Visitor<'_> as LPARAM;

        // Returns FALSE when the visitor breaks early, which is not an error here.
        unsafe {
            EnumWindows(Some(visit_window), data);
        }
    }

    fn reparent(&self, child: WindowHandle, new_parent: WindowHandle) -> Result<(), u32> {
        unsafe {
            SetLastError(0);
            let previous = SetParent(to_hwnd(child), to_hwnd(new_parent));
            if previous.is_null() {
                // A null previous parent is also returned for success on some
                // window kinds, so only a recorded error counts as failure.
                let code = GetLastError();
                if code != 0 {
                    return Err(code);
                }
            }
        }
        Ok(())
    }
}
