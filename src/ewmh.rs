//! EWMH/ICCCM property glue: client-list maintenance, `WM_STATE`,
//! fullscreen toggling, and the supporting-wm-check window (§6, §4.8).

use std::ffi::CString;
use std::os::raw::c_long;

use x11::xlib::{
    Atom, Display, PropModeAppend, PropModeReplace, Window, XA_ATOM, XA_WINDOW, XChangeProperty,
    XCreateSimpleWindow, XDeleteProperty, XInternAtom, XSetWMProtocols,
};

use crate::atom::Atoms;

pub const WM_STATE_WITHDRAWN: c_long = 0;
pub const WM_STATE_NORMAL: c_long = 1;
pub const WM_STATE_ICONIC: c_long = 3;

/// Create the invisible 1x1 window EWMH calls the "supporting WM check"
/// window, set `_NET_SUPPORTING_WM_CHECK` on both it and the root to point
/// at each other, and set `_NET_WM_NAME` = "dwm" on it (§6).
pub unsafe fn create_supporting_window(display: *mut Display, root: Window, atoms: &Atoms) -> Window {
    let win = XCreateSimpleWindow(display, root, 0, 0, 1, 1, 0, 0, 0);
    XChangeProperty(
        display,
        win,
        atoms.net_supporting_wm_check,
        XA_WINDOW,
        32,
        PropModeReplace,
        &win as *const Window as *const u8,
        1,
    );
    let name = CString::new("dwm").unwrap();
    let utf8_string = XInternAtom(display, CString::new("UTF8_STRING").unwrap().as_ptr(), 0);
    XChangeProperty(
        display,
        win,
        atoms.net_wm_name,
        utf8_string,
        8,
        PropModeReplace,
        name.as_ptr() as *const u8,
        3,
    );
    XChangeProperty(
        display,
        root,
        atoms.net_supporting_wm_check,
        XA_WINDOW,
        32,
        PropModeReplace,
        &win as *const Window as *const u8,
        1,
    );
    win
}

/// Advertise every atom the core implements via `_NET_SUPPORTED`.
pub unsafe fn set_supported(display: *mut Display, root: Window, atoms: &Atoms) {
    let list = atoms.net_supported_list();
    XChangeProperty(
        display,
        root,
        atoms.net_supported,
        XA_ATOM,
        32,
        PropModeReplace,
        list.as_ptr() as *const u8,
        list.len() as i32,
    );
}

/// Rewrite `_NET_CLIENT_LIST` to exactly `windows`, in arrangement order
/// (dwm instead appends on every `manage` and clears on `updateclientlist`;
/// rewriting is equivalent and simpler to reason about under our data
/// model, with the same observable property contents).
pub unsafe fn update_client_list(display: *mut Display, root: Window, atoms: &Atoms, windows: &[Window]) {
    XDeleteProperty(display, root, atoms.net_client_list);
    for w in windows {
        XChangeProperty(
            display,
            root,
            atoms.net_client_list,
            XA_WINDOW,
            32,
            PropModeAppend,
            w as *const Window as *const u8,
            1,
        );
    }
}

/// `WM_STATE` per ICCCM: `(state, icon_window)`, icon_window always `None`.
pub unsafe fn set_wm_state(display: *mut Display, window: Window, atoms: &Atoms, state: c_long) {
    let data: [c_long; 2] = [state, 0];
    XChangeProperty(
        display,
        window,
        atoms.wm_state,
        atoms.wm_state,
        32,
        PropModeReplace,
        data.as_ptr() as *const u8,
        2,
    );
}

pub unsafe fn set_active_window(display: *mut Display, root: Window, atoms: &Atoms, window: Option<Window>) {
    match window {
        Some(w) => {
            XChangeProperty(
                display,
                root,
                atoms.net_active_window,
                XA_WINDOW,
                32,
                PropModeReplace,
                &w as *const Window as *const u8,
                1,
            );
        }
        None => {
            XDeleteProperty(display, root, atoms.net_active_window);
        }
    }
}

pub unsafe fn set_fullscreen_property(display: *mut Display, window: Window, atoms: &Atoms, on: bool) {
    if on {
        let data: [Atom; 1] = [atoms.net_wm_state_fullscreen];
        XChangeProperty(
            display,
            window,
            atoms.net_wm_state,
            XA_ATOM,
            32,
            PropModeReplace,
            data.as_ptr() as *const u8,
            1,
        );
    } else {
        XChangeProperty(
            display,
            window,
            atoms.net_wm_state,
            XA_ATOM,
            32,
            PropModeReplace,
            std::ptr::null(),
            0,
        );
    }
}

/// Advertise `WM_DELETE_WINDOW` and `WM_TAKE_FOCUS` support to `window`.
pub unsafe fn set_protocols(display: *mut Display, window: Window, atoms: &Atoms) {
    let mut protocols = [atoms.wm_delete_window, atoms.wm_take_focus];
    XSetWMProtocols(display, window, protocols.as_mut_ptr(), protocols.len() as i32);
}

