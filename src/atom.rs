//! Interned atom table. Atoms are looked up once at startup and cached here;
//! everything else refers to `Atoms` fields rather than re-interning.

use std::ffi::CString;
use x11::xlib::{Atom, Display, XInternAtom};

/// `WM_*` (ICCCM) and `_NET_*` (EWMH) atoms used by the core. Grouped as one
/// table rather than two: callers do not care which protocol family an atom
/// belongs to, only its name.
#[derive(Debug, Clone, Copy)]
pub struct Atoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub wm_state: Atom,
    pub wm_take_focus: Atom,

    pub net_active_window: Atom,
    pub net_supported: Atom,
    pub net_wm_name: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_fullscreen: Atom,
    pub net_wm_window_type: Atom,
    pub net_wm_window_type_dialog: Atom,
    pub net_client_list: Atom,
    pub net_supporting_wm_check: Atom,
}

impl Atoms {
    /// Interns every atom the core needs. `only_if_exists` is `False`: each
    /// atom is created in the server if it does not already exist, matching
    /// dwm's own `initatoms`.
    pub fn intern(display: *mut Display) -> Self {
        let get = |name: &str| -> Atom {
            let c = CString::new(name).expect("atom name contains a NUL byte");
            unsafe { XInternAtom(display, c.as_ptr(), x11::xlib::False) }
        };

        Atoms {
            wm_protocols: get("WM_PROTOCOLS"),
            wm_delete_window: get("WM_DELETE_WINDOW"),
            wm_state: get("WM_STATE"),
            wm_take_focus: get("WM_TAKE_FOCUS"),

            net_active_window: get("_NET_ACTIVE_WINDOW"),
            net_supported: get("_NET_SUPPORTED"),
            net_wm_name: get("_NET_WM_NAME"),
            net_wm_state: get("_NET_WM_STATE"),
            net_wm_state_fullscreen: get("_NET_WM_STATE_FULLSCREEN"),
            net_wm_window_type: get("_NET_WM_WINDOW_TYPE"),
            net_wm_window_type_dialog: get("_NET_WM_WINDOW_TYPE_DIALOG"),
            net_client_list: get("_NET_CLIENT_LIST"),
            net_supporting_wm_check: get("_NET_SUPPORTING_WM_CHECK"),
        }
    }

    /// The `_NET_SUPPORTED` list advertised on the root window.
    pub fn net_supported_list(&self) -> [Atom; 9] {
        [
            self.net_active_window,
            self.net_supported,
            self.net_wm_name,
            self.net_wm_state,
            self.net_wm_state_fullscreen,
            self.net_wm_window_type,
            self.net_wm_window_type_dialog,
            self.net_client_list,
            self.net_supporting_wm_check,
        ]
    }
}
