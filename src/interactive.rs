//! Interactive mouse move/resize modal loops (§4.7).

use x11::xlib::{
    ButtonPress as XButtonPress, ButtonRelease, ButtonReleaseMask, ConfigureRequest, Expose,
    GrabModeAsync, MapRequest, MotionNotify, PointerMotionMask, XEvent, XGrabPointer,
    XMaskEvent, XQueryPointer, XUngrabPointer, XWarpPointer, CurrentTime,
};

use crate::client::{ClientFlags, ClientId};
use crate::config::SNAP;
use crate::focus;
use crate::geometry::Rect;
use crate::wm::Wm;

const GRAB_MASK: i64 = (PointerMotionMask
    | x11::xlib::ButtonPressMask
    | ButtonReleaseMask) as i64;

/// Throttle `MotionNotify` to roughly 60 Hz, matching dwm's timestamp-diff
/// throttle in `movemouse`/`resizemouse`.
const MOTION_INTERVAL_MS: u32 = 1000 / 60;

fn grab_pointer(wm: &Wm, cursor: u64) -> bool {
    unsafe {
        XGrabPointer(
            wm.display,
            wm.root,
            0,
            GRAB_MASK,
            GrabModeAsync,
            GrabModeAsync,
            0,
            cursor,
            CurrentTime,
        ) == 0
    }
}

/// `movemouse`: drag the selected client under the pointer. Refuses to run
/// on fullscreen clients. Promotes a tiled client to floating the first
/// time the drag would move it more than [`SNAP`] pixels, then snaps the
/// client's edges to the work-area edges while within `SNAP` pixels.
pub fn movemouse(wm: &mut Wm, id: ClientId) {
    if wm.clients.get(id).is_fullscreen() {
        return;
    }
    if !grab_pointer(wm, wm.cursor_move) {
        return;
    }

    let start_rect = wm.clients.get(id).rect;
    let (ok, start_x, start_y, _, _, _, _, _) = query_pointer(wm);
    if !ok {
        unsafe { XUngrabPointer(wm.display, CurrentTime) };
        return;
    }

    let mut last_time: u64 = 0;
    loop {
        let ev = next_grabbed_event(wm);
        match event_kind(&ev) {
            Kind::Motion(time, x, y) => {
                if time.wrapping_sub(last_time) < MOTION_INTERVAL_MS as u64 {
                    continue;
                }
                last_time = time;

                let dx = x - start_x;
                let dy = y - start_y;

                if !wm.clients.get(id).is_floating()
                    && (dx.abs() > SNAP || dy.abs() > SNAP)
                {
                    togglefloating_for_move(wm, id);
                }

                if wm.clients.get(id).is_floating() {
                    let mut r = start_rect;
                    r.x += dx;
                    r.y += dy;
                    let mon = wm.monitors.get(wm.clients.get(id).mon);
                    snap_rect(&mut r, &mon.work);
                    resize_client(wm, id, r, true);
                }
            }
            Kind::ButtonRelease => {
                break;
            }
            Kind::Other(mut owned) => {
                crate::event::dispatch(wm, &mut owned);
            }
        }
    }

    unsafe { XUngrabPointer(wm.display, CurrentTime) };
    reassign_monitor_after_drag(wm, id);
}

/// `resizemouse`: warp the pointer to the bottom-right corner, drag to
/// resize, warp back on release.
pub fn resizemouse(wm: &mut Wm, id: ClientId) {
    if wm.clients.get(id).is_fullscreen() {
        return;
    }
    if !grab_pointer(wm, wm.cursor_resize) {
        return;
    }

    let start_rect = wm.clients.get(id).rect;
    unsafe {
        XWarpPointer(
            wm.display,
            0,
            wm.clients.get(id).window,
            0,
            0,
            0,
            0,
            start_rect.w,
            start_rect.h,
        );
    }

    let mut last_time: u64 = 0;
    loop {
        let ev = next_grabbed_event(wm);
        match event_kind(&ev) {
            Kind::Motion(time, x, y) => {
                if time.wrapping_sub(last_time) < MOTION_INTERVAL_MS as u64 {
                    continue;
                }
                last_time = time;

                let nw = (x - start_rect.x).max(1);
                let nh = (y - start_rect.y).max(1);

                if !wm.clients.get(id).is_floating() && (nw - start_rect.w).abs() > SNAP {
                    togglefloating_for_move(wm, id);
                }

                if wm.clients.get(id).is_floating() {
                    let r = Rect::new(start_rect.x, start_rect.y, nw, nh);
                    resize_client(wm, id, r, true);
                }
            }
            Kind::ButtonRelease => break,
            Kind::Other(mut owned) => crate::event::dispatch(wm, &mut owned),
        }
    }

    let rect = wm.clients.get(id).rect;
    unsafe {
        XWarpPointer(wm.display, 0, wm.clients.get(id).window, 0, 0, 0, 0, rect.w, rect.h);
        XUngrabPointer(wm.display, CurrentTime);
    }
    reassign_monitor_after_drag(wm, id);
}

fn togglefloating_for_move(wm: &mut Wm, id: ClientId) {
    wm.clients.get_mut(id).flags.insert(ClientFlags::FLOATING);
    crate::wm::arrange(wm, wm.clients.get(id).mon);
}

fn snap_rect(r: &mut Rect, work: &Rect) {
    if (r.x - work.x).abs() < SNAP {
        r.x = work.x;
    }
    if (r.y - work.y).abs() < SNAP {
        r.y = work.y;
    }
    if ((work.x + work.w) - (r.x + r.w)).abs() < SNAP {
        r.x = work.x + work.w - r.w;
    }
    if ((work.y + work.h) - (r.y + r.h)).abs() < SNAP {
        r.y = work.y + work.h - r.h;
    }
}

fn resize_client(wm: &mut Wm, id: ClientId, r: Rect, _interact: bool) {
    wm.clients.get_mut(id).rect = r;
    crate::wm::resize_and_configure(wm, id, r);
}

fn reassign_monitor_after_drag(wm: &mut Wm, id: ClientId) {
    let rect = wm.clients.get(id).rect;
    let cur_mon = wm.clients.get(id).mon;
    let target = wm.monitors.rect_to_monitor(&rect, cur_mon);
    if target != cur_mon {
        crate::wm::send_to_monitor(wm, id, target);
        wm.selmon = target;
        focus::focus(wm, Some(id));
    }
}

fn query_pointer(wm: &Wm) -> (bool, i32, i32, i32, i32, i32, i32, u32) {
    unsafe {
        let mut root_ret = 0;
        let mut child_ret = 0;
        let (mut rx, mut ry, mut wx, mut wy) = (0, 0, 0, 0);
        let mut mask = 0;
        let ok = XQueryPointer(
            wm.display,
            wm.root,
            &mut root_ret,
            &mut child_ret,
            &mut rx,
            &mut ry,
            &mut wx,
            &mut wy,
            &mut mask,
        );
        (ok != 0, rx, ry, wx, wy, rx, ry, mask)
    }
}

fn next_grabbed_event(wm: &Wm) -> XEvent {
    unsafe {
        let mut ev: XEvent = std::mem::zeroed();
        XMaskEvent(
            wm.display,
            GRAB_MASK | x11::xlib::SubstructureRedirectMask as i64 | x11::xlib::ExposureMask as i64,
            &mut ev,
        );
        ev
    }
}

enum Kind {
    Motion(u64, i32, i32),
    ButtonRelease,
    Other(XEvent),
}

fn event_kind(ev: &XEvent) -> Kind {
    unsafe {
        match ev.type_ {
            MotionNotify => Kind::Motion(ev.motion.time as u64, ev.motion.x_root, ev.motion.y_root),
            ButtonRelease => Kind::ButtonRelease,
            XButtonPress | ConfigureRequest | Expose | MapRequest => Kind::Other(*ev),
            _ => Kind::Other(*ev),
        }
    }
}
