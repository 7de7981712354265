//! Focus acquisition/release, urgency, stacking restack, and
//! `focusstack`/`zoom` (§4.6).

use x11::xlib::{
    Atom, CurrentTime, RevertToPointerRoot, XCheckMaskEvent, XEvent, XGetWMProtocols, XFree,
    XRaiseWindow, XSendEvent, XSetInputFocus, XSetWindowBorder, XSync, EnterWindowMask,
};

use crate::client::{self, attach, attach_stack, detach_stack, ClientId};
use crate::config::{BORDER_NORMAL, BORDER_SELECTED};
use crate::ewmh;
use crate::monitor::MonitorId;
use crate::wm::Wm;

/// Does `window` list `proto` in its `WM_PROTOCOLS`? Used for both
/// `WM_DELETE_WINDOW` (killclient) and `WM_TAKE_FOCUS` (focus).
pub unsafe fn supports_protocol(wm: &Wm, window: x11::xlib::Window, proto: Atom) -> bool {
    let mut protocols: *mut Atom = std::ptr::null_mut();
    let mut count: i32 = 0;
    if XGetWMProtocols(wm.display, window, &mut protocols, &mut count) == 0 {
        return false;
    }
    let slice = std::slice::from_raw_parts(protocols, count as usize);
    let found = slice.contains(&proto);
    XFree(protocols as *mut _);
    found
}

fn send_client_message(wm: &Wm, window: x11::xlib::Window, proto: Atom) {
    unsafe {
        let mut ev: XEvent = std::mem::zeroed();
        ev.client_message.type_ = x11::xlib::ClientMessage;
        ev.client_message.window = window;
        ev.client_message.message_type = wm.atoms.wm_protocols;
        ev.client_message.format = 32;
        ev.client_message.data.set_long(0, proto as i64);
        ev.client_message.data.set_long(1, CurrentTime as i64);
        XSendEvent(wm.display, window, 0, 0, &mut ev);
    }
}

/// `focus(c)`: select `c` (or re-derive from the stack if `c` is `None` or
/// invisible), demote the previous selection, promote the new one to the
/// head of the focus stack, and assert input focus (§4.6).
pub fn focus(wm: &mut Wm, mut c: Option<ClientId>) {
    let mon_id = wm.selmon;

    let visible_now = c
        .map(|id| {
            let active = wm.monitors.get(mon_id).active_tagset();
            wm.clients.try_get(id).map(|cl| cl.visible_on(active)).unwrap_or(false)
        })
        .unwrap_or(false);

    if !visible_now {
        let active = wm.monitors.get(mon_id).active_tagset();
        let stack = wm.monitors.get(mon_id).stack(&wm.clients);
        c = stack.into_iter().find(|&id| wm.clients.get(id).visible_on(active));
    }

    let prev = wm.monitors.get(mon_id).selected;
    if let Some(old) = prev {
        if Some(old) != c {
            if let Some(old_client) = wm.clients.try_get(old) {
                let window = old_client.window;
                unsafe { XSetWindowBorder(wm.display, window, BORDER_NORMAL) };
            }
        }
    }

    if let Some(id) = c {
        let mon = client_mon(wm, id);
        {
            let m = wm.monitors.get_mut(mon);
            detach_stack(&mut wm.clients, m, id);
            attach_stack(&mut wm.clients, m, id);
        }
        wm.clients.get_mut(id).flags.remove(client::ClientFlags::URGENT);
        let window = wm.clients.get(id).window;
        unsafe { XSetWindowBorder(wm.display, window, BORDER_SELECTED) };
        set_focus(wm, id);
    } else {
        unsafe {
            XSetInputFocus(wm.display, wm.root, RevertToPointerRoot, CurrentTime);
            ewmh::set_active_window(wm.display, wm.root, &wm.atoms, None);
        }
    }

    wm.monitors.get_mut(mon_id).selected = c;
}

fn client_mon(wm: &Wm, id: ClientId) -> MonitorId {
    wm.clients.get(id).mon
}

fn set_focus(wm: &Wm, id: ClientId) {
    let c = wm.clients.get(id);
    if !c.never_focus() {
        unsafe {
            XSetInputFocus(wm.display, c.window, RevertToPointerRoot, CurrentTime);
        }
    }
    unsafe {
        ewmh::set_active_window(wm.display, wm.root, &wm.atoms, Some(c.window));
    }
    if unsafe { supports_protocol(wm, c.window, wm.atoms.wm_take_focus) } {
        send_client_message(wm, c.window, wm.atoms.wm_take_focus);
    }
}

/// `restack(m)`: raise the selection if floating, then drain pending
/// `EnterNotify` so the restack itself doesn't cause a spurious
/// pointer-follows-focus refocus.
pub fn restack(wm: &mut Wm, mon_id: MonitorId) {
    let mon = wm.monitors.get(mon_id);
    if let Some(sel) = mon.selected {
        let c = wm.clients.get(sel);
        if c.is_floating() {
            unsafe { XRaiseWindow(wm.display, c.window) };
        }
    }
    unsafe {
        XSync(wm.display, 0);
        let mut ev: XEvent = std::mem::zeroed();
        while XCheckMaskEvent(wm.display, EnterWindowMask, &mut ev) != 0 {}
    }
}

/// `focusstack(dir)`: advance selection to the next/previous visible client
/// in arrangement order, wrapping.
pub fn focus_stack(wm: &mut Wm, dir: i32) {
    let mon_id = wm.selmon;
    let mon = wm.monitors.get(mon_id);
    let Some(cur) = mon.selected else { return };
    let order = mon.clients(&wm.clients);
    if order.is_empty() {
        return;
    }
    let active = mon.active_tagset();
    let visible: Vec<ClientId> = order.into_iter().filter(|&id| wm.clients.get(id).visible_on(active)).collect();
    if visible.is_empty() {
        return;
    }
    let pos = visible.iter().position(|&id| id == cur).unwrap_or(0) as i32;
    let len = visible.len() as i32;
    let next_pos = ((pos + dir) % len + len) % len;
    let next = visible[next_pos as usize];
    focus(wm, Some(next));
    restack(wm, mon_id);
}

/// `zoom`: promote the selected client to head of the arrangement list
/// (making it master), unless it already is the first tiled client, in
/// which case the second tiled client is promoted instead (§4.6, §8
/// scenario 3).
pub fn zoom(wm: &mut Wm) {
    let mon_id = wm.selmon;
    let mon = wm.monitors.get(mon_id);
    let Some(sel) = mon.selected else { return };
    if wm.clients.get(sel).is_floating() {
        return;
    }

    let tiled = mon.tiled_clients(&wm.clients);
    if tiled.is_empty() {
        return;
    }

    let target = if tiled[0] == sel {
        if tiled.len() < 2 {
            return;
        }
        tiled[1]
    } else {
        sel
    };

    let m = wm.monitors.get_mut(mon_id);
    client::detach(&mut wm.clients, m, target);
    attach(&mut wm.clients, m, target);
    focus(wm, Some(target));
    crate::wm::arrange(wm, mon_id);
}
