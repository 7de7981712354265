//! Event dispatcher: a fixed, event-type-indexed table and the 14 handlers
//! it routes to (§4.1). Handlers mutate client/monitor state and then call
//! `arrange` on whichever monitors were affected, per §2's data-flow
//! summary.

use x11::xlib::{
    Atom, ButtonPress, ClientMessage, ConfigureNotify, ConfigureRequest, DestroyNotify,
    EnterNotify, FocusIn, KeyPress, LockMask, MapRequest, MappingNotify, MappingKeyboard,
    MotionNotify, NotifyInferior, NotifyNormal, PropertyNotify, UnmapNotify, XButtonEvent,
    XClientMessageEvent, XConfigureEvent, XConfigureRequestEvent, XCrossingEvent,
    XDestroyWindowEvent, XEvent, XGetClassHint, XGetWindowAttributes, XKeyEvent,
    XKeycodeToKeysym, XMapRequestEvent, XMappingEvent, XPropertyEvent, XRefreshKeyboardMapping,
    XSendEvent, XUnmapEvent, XWindowAttributes, XClassHint, XFree, XConfigureWindow,
    XWindowChanges, CWX, CWY, CWWidth, CWHeight, XGetTransientForHint, XAllowEvents, ReplayPointer,
};

use crate::client::{ClientFlags, ClientId};
use crate::config::{self, ClickRegion};
use crate::wm::Wm;

/// Routes one event to its handler. `MotionNotify` is only meaningful at
/// the root (cross-monitor pointer transitions); events inside an
/// interactive grab are routed here too (Design Notes: "do not duplicate
/// handlers").
pub fn dispatch(wm: &mut Wm, ev: &mut XEvent) {
    unsafe {
        match ev.type_ {
            ButtonPress => on_button_press(wm, &ev.button),
            x11::xlib::ButtonRelease => on_combo_release(wm),
            x11::xlib::KeyRelease => on_key_release(wm, &ev.key),
            KeyPress => on_key_press(wm, &ev.key),
            ClientMessage => on_client_message(wm, &ev.client_message),
            ConfigureRequest => on_configure_request(wm, &mut ev.configure_request),
            ConfigureNotify => on_configure_notify(wm, &ev.configure),
            DestroyNotify => on_destroy_notify(wm, &ev.destroy_window),
            UnmapNotify => on_unmap_notify(wm, &ev.unmap),
            EnterNotify => on_enter_notify(wm, &ev.crossing),
            FocusIn => on_focus_in(wm),
            MappingNotify => on_mapping_notify(wm, &mut ev.mapping),
            MapRequest => on_map_request(wm, &ev.map_request),
            MotionNotify => on_motion_notify(wm, &ev.motion),
            PropertyNotify => on_property_notify(wm, &ev.property),
            _ => {}
        }
    }
}

fn clean_mask(wm: &Wm, mask: u32) -> u32 {
    mask & !(LockMask | wm.numlock_mask) & (x11::xlib::ShiftMask
        | x11::xlib::ControlMask
        | x11::xlib::Mod1Mask
        | x11::xlib::Mod2Mask
        | x11::xlib::Mod3Mask
        | x11::xlib::Mod4Mask
        | x11::xlib::Mod5Mask)
}

// ---- ButtonPress / ButtonRelease / KeyRelease ---------------------------

fn region_of(wm: &mut Wm, window: x11::xlib::Window, x: i32) -> (ClickRegion, Option<ClientId>) {
    if let Some(mon_id) = wm.monitors.bar_to_monitor(window) {
        let mon = wm.monitors.get(mon_id);
        let tag_bar_w = 40 * config::TAGS.len() as i32;
        if x < tag_bar_w {
            return (ClickRegion::TagBar, None);
        } else if x < tag_bar_w + 200 {
            return (ClickRegion::WinTitle, None);
        }
        let _ = mon;
        return (ClickRegion::StatusText, None);
    }
    if let Some(id) = wm.clients.window_to_client(window) {
        return (ClickRegion::ClientWin, Some(id));
    }
    (ClickRegion::RootWin, None)
}

fn on_button_press(wm: &mut Wm, ev: &XButtonEvent) {
    trace!("ButtonPress: {:?}", ev.window);

    let pointer_mon = wm.monitors.point_to_monitor(ev.x_root, ev.y_root, wm.selmon);
    if pointer_mon != wm.selmon {
        crate::focus::focus(wm, None);
        wm.selmon = pointer_mon;
        crate::focus::focus(wm, None);
    }

    let (region, client) = region_of(wm, ev.window, ev.x);

    if let Some(id) = client {
        crate::focus::focus(wm, Some(id));
        crate::focus::restack(wm, wm.selmon);
        unsafe {
            XAllowEvents(wm.display, ReplayPointer, ev.time);
        }
    }

    let clean = clean_mask(wm, ev.state);
    for b in config::BUTTONS {
        if b.click == region && b.button == ev.button && b.modifiers == clean {
            let mut arg = b.arg;
            if region == ClickRegion::TagBar {
                let tag_bar_w = 40;
                let idx = (ev.x / tag_bar_w).max(0) as u32;
                if (idx as usize) < config::TAGS.len() {
                    arg = config::Arg::UInt(1 << idx);
                }
            }
            (b.func)(wm, &arg);
            break;
        }
    }
}

fn on_combo_release(wm: &mut Wm) {
    wm.combo = false;
    wm.combo_mask = 0;
}

/// Only releasing `MODKEY` itself ends combo mode; releasing one of the
/// tag keys while the modifier is still held must not reset the
/// accumulator (§4.4, §8 scenario 5).
fn on_key_release(wm: &mut Wm, ev: &XKeyEvent) {
    let keysym = unsafe { XKeycodeToKeysym(wm.display, ev.keycode as u8, 0) } as u32;
    if config::MODKEY_KEYSYMS.contains(&keysym) {
        on_combo_release(wm);
    }
}

// ---- KeyPress ------------------------------------------------------------

fn on_key_press(wm: &mut Wm, ev: &XKeyEvent) {
    trace!("KeyPress: keycode={}", ev.keycode);
    let keysym = unsafe { XKeycodeToKeysym(wm.display, ev.keycode as u8, 0) };
    let clean = clean_mask(wm, ev.state);
    for k in config::KEYS {
        if k.keysym as u64 == keysym && k.modifiers == clean {
            (k.func)(wm, &k.arg);
            break;
        }
    }
}

// ---- ClientMessage ---------------------------------------------------

fn on_client_message(wm: &mut Wm, ev: &XClientMessageEvent) {
    trace!("ClientMessage: {:?}", ev.window);
    let Some(id) = wm.clients.window_to_client(ev.window) else { return };

    if ev.message_type == wm.atoms.net_wm_state {
        let data = unsafe { ev.data.as_longs() };
        let target = data[1] as Atom;
        let target2 = data[2] as Atom;
        if target == wm.atoms.net_wm_state_fullscreen || target2 == wm.atoms.net_wm_state_fullscreen {
            // 0 = remove, 1 = add, 2 = toggle (EWMH _NET_WM_STATE_*).
            let action = data[0];
            let want = match action {
                0 => false,
                1 => true,
                _ => !wm.clients.get(id).is_fullscreen(),
            };
            crate::wm::set_fullscreen(wm, id, want);
        }
    } else if ev.message_type == wm.atoms.net_active_window {
        let mon_id = wm.clients.get(id).mon;
        if wm.monitors.get(mon_id).selected != Some(id) {
            wm.clients.get_mut(id).flags.insert(ClientFlags::URGENT);
            let window = wm.clients.get(id).window;
            unsafe {
                x11::xlib::XSetWindowBorder(wm.display, window, config::BORDER_URGENT);
            }
        }
    }
}

// ---- ConfigureRequest / ConfigureNotify --------------------------------

fn on_configure_request(wm: &mut Wm, ev: &mut XConfigureRequestEvent) {
    trace!("ConfigureRequest: {:?}", ev.window);

    if let Some(id) = wm.clients.window_to_client(ev.window) {
        let floating = wm.clients.get(id).is_floating();
        if floating {
            let mon_id = wm.clients.get(id).mon;
            let mon = wm.monitors.get(mon_id);
            let mut r = wm.clients.get(id).rect;
            let mut moved_only = true;

            if ev.value_mask & CWX as u64 != 0 {
                r.x = ev.x;
            }
            if ev.value_mask & CWY as u64 != 0 {
                r.y = ev.y;
            }
            if ev.value_mask & CWWidth as u64 != 0 {
                r.w = ev.width;
                moved_only = false;
            }
            if ev.value_mask & CWHeight as u64 != 0 {
                r.h = ev.height;
                moved_only = false;
            }

            if r.x + r.w > mon.screen.x + mon.screen.w && r.w < mon.screen.w {
                r.x = mon.screen.x + (mon.screen.w - r.w) / 2;
            }
            if r.y + r.h > mon.screen.y + mon.screen.h && r.h < mon.screen.h {
                r.y = mon.screen.y + (mon.screen.h - r.h) / 2;
            }

            wm.clients.get_mut(id).rect = r;
            crate::wm::resize_and_configure(wm, id, r);
            if moved_only {
                crate::wm::send_configure_notify(wm, id);
            }
        } else {
            crate::wm::send_configure_notify(wm, id);
        }
        return;
    }

    // Unmanaged window: forward the request verbatim.
    let mut changes = XWindowChanges {
        x: ev.x,
        y: ev.y,
        width: ev.width,
        height: ev.height,
        border_width: ev.border_width,
        sibling: ev.above,
        stack_mode: ev.detail,
    };
    unsafe {
        XConfigureWindow(wm.display, ev.window, ev.value_mask as u32, &mut changes);
    }
}

fn on_configure_notify(wm: &mut Wm, ev: &XConfigureEvent) {
    if ev.window != wm.root {
        return;
    }
    if ev.width == wm.screen.w && ev.height == wm.screen.h {
        return;
    }
    trace!("root ConfigureNotify: {}x{}", ev.width, ev.height);
    wm.screen.w = ev.width;
    wm.screen.h = ev.height;
    crate::wm::update_geometry(wm);
}

// ---- DestroyNotify / UnmapNotify ---------------------------------------

fn on_destroy_notify(wm: &mut Wm, ev: &XDestroyWindowEvent) {
    trace!("DestroyNotify: {:?}", ev.window);
    if let Some(id) = wm.clients.window_to_client(ev.window) {
        crate::wm::unmanage(wm, id, true);
        return;
    }
    if wm.monitors.bar_to_monitor(ev.window).is_some() {
        crate::wm::clear_bar(wm, ev.window);
    }
    if wm.monitors.tray_to_monitor(ev.window).is_some() {
        crate::wm::clear_tray(wm, ev.window);
    }
}

fn on_unmap_notify(wm: &mut Wm, ev: &XUnmapEvent) {
    trace!("UnmapNotify: {:?} synthetic={}", ev.window, ev.send_event);
    if let Some(id) = wm.clients.window_to_client(ev.window) {
        if ev.send_event != 0 {
            crate::wm::set_withdrawn(wm, id);
        } else {
            crate::wm::unmanage(wm, id, false);
        }
        return;
    }
    if wm.monitors.bar_to_monitor(ev.window).is_some() {
        crate::wm::clear_bar(wm, ev.window);
    }
    if wm.monitors.tray_to_monitor(ev.window).is_some() {
        crate::wm::clear_tray(wm, ev.window);
    }
}

// ---- EnterNotify / FocusIn ----------------------------------------------

fn on_enter_notify(wm: &mut Wm, ev: &XCrossingEvent) {
    if ev.mode != NotifyNormal || (ev.detail == NotifyInferior && ev.window != wm.root) {
        return;
    }
    trace!("EnterNotify: {:?}", ev.window);

    let id = wm.clients.window_to_client(ev.window);
    let mon_id = match id {
        Some(id) => wm.clients.get(id).mon,
        None => wm.monitors.point_to_monitor(ev.x_root, ev.y_root, wm.selmon),
    };
    if mon_id != wm.selmon {
        wm.selmon = mon_id;
    }
    if id != wm.monitors.get(wm.selmon).selected {
        crate::focus::focus(wm, id);
    }
}

fn on_focus_in(wm: &mut Wm) {
    let sel = wm.monitors.get(wm.selmon).selected;
    if sel.is_some() {
        crate::focus::focus(wm, sel);
    }
}

// ---- MappingNotify -------------------------------------------------------

fn on_mapping_notify(wm: &mut Wm, ev: &mut XMappingEvent) {
    unsafe {
        XRefreshKeyboardMapping(ev);
    }
    if ev.request == MappingKeyboard {
        crate::wm::update_numlock_mask(wm);
        crate::wm::grab_keys(wm);
        crate::wm::regrab_buttons(wm);
    }
}

// ---- MapRequest -----------------------------------------------------------

fn on_map_request(wm: &mut Wm, ev: &XMapRequestEvent) {
    trace!("MapRequest: {:?}", ev.window);
    let mut attrs: XWindowAttributes = unsafe { std::mem::zeroed() };
    if unsafe { XGetWindowAttributes(wm.display, ev.window, &mut attrs) } == 0 {
        return;
    }
    if attrs.override_redirect != 0 {
        return;
    }
    if wm.clients.window_to_client(ev.window).is_some() {
        return;
    }

    if window_class_matches(wm, ev.window, config::BAR_CLASS) {
        crate::wm::register_bar(wm, ev.window, &attrs);
        return;
    }
    if window_class_matches(wm, ev.window, config::TRAY_CLASS) {
        crate::wm::register_tray(wm, ev.window, &attrs);
        return;
    }

    crate::wm::manage(wm, ev.window, &attrs);
}

fn window_class_matches(wm: &Wm, window: x11::xlib::Window, class: &str) -> bool {
    let mut hint: XClassHint = unsafe { std::mem::zeroed() };
    if unsafe { XGetClassHint(wm.display, window, &mut hint) } == 0 {
        return false;
    }
    let res_class = unsafe { c_str_to_string(hint.res_class) };
    let matches = res_class.as_deref() == Some(class);
    unsafe {
        if !hint.res_name.is_null() {
            XFree(hint.res_name as *mut _);
        }
        if !hint.res_class.is_null() {
            XFree(hint.res_class as *mut _);
        }
    }
    matches
}

unsafe fn c_str_to_string(ptr: *mut i8) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

pub(crate) fn transient_for(wm: &Wm, window: x11::xlib::Window) -> Option<x11::xlib::Window> {
    let mut transient: x11::xlib::Window = 0;
    let ok = unsafe { XGetTransientForHint(wm.display, window, &mut transient) };
    if ok != 0 && transient != 0 {
        Some(transient)
    } else {
        None
    }
}

// ---- MotionNotify ----------------------------------------------------------

fn on_motion_notify(wm: &mut Wm, ev: &x11::xlib::XMotionEvent) {
    if ev.window != wm.root {
        return;
    }
    let mon_id = wm.monitors.point_to_monitor(ev.x_root, ev.y_root, wm.selmon);
    if mon_id != wm.selmon {
        crate::focus::focus(wm, None);
        wm.selmon = mon_id;
        crate::focus::focus(wm, None);
    }
}

// ---- PropertyNotify --------------------------------------------------------

fn on_property_notify(wm: &mut Wm, ev: &XPropertyEvent) {
    if ev.window == wm.root {
        return;
    }
    let Some(id) = wm.clients.window_to_client(ev.window) else { return };

    if ev.atom == x11::xlib::XA_WM_TRANSIENT_FOR {
        if !wm.clients.get(id).is_floating() {
            if let Some(t) = transient_for(wm, ev.window) {
                if wm.clients.window_to_client(t).is_some() {
                    wm.clients.get_mut(id).flags.insert(ClientFlags::FLOATING);
                    crate::wm::arrange(wm, wm.clients.get(id).mon);
                }
            }
        }
    } else if ev.atom == x11::xlib::XA_WM_NORMAL_HINTS {
        crate::wm::update_size_hints(wm, id);
    } else if ev.atom == x11::xlib::XA_WM_HINTS {
        crate::wm::update_wm_hints(wm, id);
    } else if ev.atom == x11::xlib::XA_WM_NAME || ev.atom == wm.atoms.net_wm_name {
        crate::wm::update_title(wm, id);
    } else if ev.atom == wm.atoms.net_wm_window_type {
        crate::wm::update_window_type(wm, id);
    }
}
