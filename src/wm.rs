//! Central `Wm` state, root setup/teardown, client management, and the
//! config-bound action functions (§4.2, §4.8, §6, §7).

use std::sync::atomic::{AtomicBool, Ordering};

use x11::xinerama::{XineramaIsActive, XineramaQueryScreens};
use x11::xlib::{
    self, AnyModifier, Atom, ButtonPressMask, ButtonReleaseMask, Cursor, CurrentTime, Display,
    EnterWindowMask, False, GrabModeAsync, LeaveWindowMask, LockMask, NoEventMask,
    PointerMotionMask, PropertyChangeMask, StructureNotifyMask, SubstructureNotifyMask,
    SubstructureRedirectMask, True, Window, XA_ATOM, XA_WM_NAME, XClassHint, XCloseDisplay,
    XConfigureEvent, XCreateFontCursor, XDefaultScreen, XDestroyWindow, XDisplayKeycodes, XEvent,
    XFree, XFreeModifiermap, XGetClassHint, XGetModifierMapping, XGetWMHints, XGetWMNormalHints,
    XGetWindowAttributes, XGetWindowProperty, XGrabButton, XGrabKey, XGrabServer, XKeysymToKeycode,
    XKillClient, XMapWindow, XMoveResizeWindow, XNextEvent, XOpenDisplay, XQueryTree, XRaiseWindow,
    XRootWindow, XSelectInput, XSendEvent, XSetErrorHandler, XSetWindowBorder, XSetWindowBorderWidth,
    XSizeHints, XSync, XUngrabServer, XWindowAttributes,
};

use crate::atom::Atoms;
use crate::client::{self, Client, ClientFlags, ClientId, Clients};
use crate::config::{self, Arg, BORDERPX, SHOWBAR, TAGMASK, TOPBAR};
use crate::error::{Error, Result};
use crate::ewmh;
use crate::geometry::{apply_size_hints, Rect, SizeHints};
use crate::layout;
use crate::monitor::{self, Monitor, MonitorId, Monitors};
use crate::spawn;

/// Set by the installed `XSetErrorHandler` when the initial
/// `SubstructureRedirectMask` select fails with `BadAccess`, the signal that
/// another window manager already owns the display (§7).
static ANOTHER_WM_RUNNING: AtomicBool = AtomicBool::new(false);

unsafe extern "C" fn startup_error_handler(
    _display: *mut Display,
    event: *mut xlib::XErrorEvent,
) -> i32 {
    let code = (*event).error_code;
    if code == xlib::BadAccess {
        ANOTHER_WM_RUNNING.store(true, Ordering::SeqCst);
    }
    0
}

/// Installed for the rest of the run: logs and swallows everything except
/// the handful of X errors dwm itself is known to trigger benignly (closing
/// a window that already destroyed itself, etc.) per §7's "never abort on an
/// X error" policy.
unsafe extern "C" fn runtime_error_handler(
    _display: *mut Display,
    event: *mut xlib::XErrorEvent,
) -> i32 {
    let e = &*event;
    if e.error_code == xlib::BadWindow {
        return 0;
    }
    error!(
        "X error: request={} code={} resourceid={}",
        e.request_code, e.error_code, e.resourceid
    );
    0
}

pub struct Wm {
    pub display: *mut Display,
    pub root: Window,
    pub screen_idx: i32,
    pub screen: Rect,
    pub atoms: Atoms,
    pub cursor_normal: Cursor,
    pub cursor_move: Cursor,
    pub cursor_resize: Cursor,
    pub numlock_mask: u32,
    pub running: bool,
    /// Set while a key chord's modifier is still held, so `KeyRelease`
    /// clears any latched state (§4.1).
    pub combo: bool,
    /// Tag mask accumulated across repeated tag-key presses while `combo`
    /// is set; committed to the monitor/client on every press, reset when
    /// the modifier itself is released (§4.4 combo mode).
    pub combo_mask: u32,
    pub clients: Clients,
    pub monitors: Monitors,
    pub selmon: MonitorId,
    pub wmcheckwin: Window,
}

impl Wm {
    /// Open the display, verify no other WM owns `SubstructureRedirectMask`
    /// on the root, intern atoms, build cursors, and discover the initial
    /// monitor layout (§7 startup sequence).
    pub fn new() -> Result<Self> {
        let display = unsafe { XOpenDisplay(std::ptr::null()) };
        if display.is_null() {
            return Err(Error::OpenDisplay);
        }

        let screen_idx = unsafe { XDefaultScreen(display) };
        let root = unsafe { XRootWindow(display, screen_idx) };

        ANOTHER_WM_RUNNING.store(false, Ordering::SeqCst);
        unsafe {
            XSetErrorHandler(Some(startup_error_handler));
            XSelectInput(
                display,
                root,
                SubstructureRedirectMask | SubstructureNotifyMask,
            );
            XSync(display, False);
        }
        if ANOTHER_WM_RUNNING.load(Ordering::SeqCst) {
            unsafe { XCloseDisplay(display) };
            return Err(Error::AnotherWmRunning);
        }
        unsafe {
            XSetErrorHandler(Some(runtime_error_handler));
        }

        let atoms = Atoms::intern(display);

        let (cursor_normal, cursor_move, cursor_resize) = unsafe {
            (
                XCreateFontCursor(display, 68),  // XC_left_ptr
                XCreateFontCursor(display, 52),  // XC_fleur
                XCreateFontCursor(display, 120), // XC_sizing
            )
        };

        let screen_w = unsafe { xlib::XDisplayWidth(display, screen_idx) };
        let screen_h = unsafe { xlib::XDisplayHeight(display, screen_idx) };

        let mut wm = Wm {
            display,
            root,
            screen_idx,
            screen: Rect::new(0, 0, screen_w, screen_h),
            atoms,
            cursor_normal,
            cursor_move,
            cursor_resize,
            numlock_mask: 0,
            running: true,
            combo: false,
            combo_mask: 0,
            clients: Clients::new(),
            monitors: Monitors::new(),
            selmon: MonitorId(0),
            wmcheckwin: 0,
        };

        update_numlock_mask(&mut wm);
        update_geometry(&mut wm);
        Ok(wm)
    }

    /// Select root events, grab keys, create the EWMH supporting-wm-check
    /// window, and advertise `_NET_SUPPORTED` (§6, §7).
    pub fn setup(&mut self) {
        unsafe {
            XSelectInput(
                self.display,
                self.root,
                SubstructureRedirectMask
                    | SubstructureNotifyMask
                    | StructureNotifyMask
                    | PropertyChangeMask
                    | ButtonPressMask
                    | PointerMotionMask
                    | EnterWindowMask
                    | LeaveWindowMask,
            );
            self.wmcheckwin = ewmh::create_supporting_window(self.display, self.root, &self.atoms);
            ewmh::set_supported(self.display, self.root, &self.atoms);
            ewmh::update_client_list(self.display, self.root, &self.atoms, &[]);
        }
        grab_keys(self);
        info!("root set up, {} monitor(s)", self.monitors.len());
    }

    /// `scan`: walk the existing window tree once at startup and `manage`
    /// every window that's mapped (or iconic per `WM_HINTS`) and not an
    /// override-redirect window (§7).
    pub fn scan(&mut self) {
        unsafe {
            let mut root_ret: Window = 0;
            let mut parent_ret: Window = 0;
            let mut children: *mut Window = std::ptr::null_mut();
            let mut n: u32 = 0;
            if XQueryTree(self.display, self.root, &mut root_ret, &mut parent_ret, &mut children, &mut n) == 0 {
                return;
            }
            let slice = std::slice::from_raw_parts(children, n as usize).to_vec();
            XFree(children as *mut _);

            for &w in &slice {
                let mut attrs: XWindowAttributes = std::mem::zeroed();
                if XGetWindowAttributes(self.display, w, &mut attrs) == 0 {
                    continue;
                }
                if attrs.override_redirect != 0 {
                    continue;
                }
                if attrs.map_state == x11::xlib::IsViewable {
                    manage(self, w, &attrs);
                }
            }
        }
        for mon in self.monitors.ids().collect::<Vec<_>>() {
            arrange(self, mon);
        }
    }

    /// Main event loop: block on `XNextEvent`, dispatch, repeat until
    /// `quit` clears `running` (§4.1, §7).
    pub fn run(&mut self) {
        info!("entering event loop");
        while self.running {
            unsafe {
                let mut ev: XEvent = std::mem::zeroed();
                XNextEvent(self.display, &mut ev);
                crate::event::dispatch(self, &mut ev);
            }
        }
    }

    /// Unmanage every remaining client, destroy the supporting-wm-check
    /// window, and close the display (§7 teardown).
    pub fn cleanup(&mut self) {
        let all: Vec<ClientId> = self.clients.iter().map(|(id, _)| id).collect();
        for id in all {
            unmanage(self, id, false);
        }
        unsafe {
            XDestroyWindow(self.display, self.wmcheckwin);
            XCloseDisplay(self.display);
        }
    }
}

pub(crate) fn update_numlock_mask(wm: &mut Wm) {
    unsafe {
        let modmap = XGetModifierMapping(wm.display);
        let mut mask = 0u32;
        for i in 0..8 {
            for j in 0..(*modmap).max_keypermod {
                let keycode = *(*modmap)
                    .modifiermap
                    .offset((i * (*modmap).max_keypermod + j) as isize);
                if keycode == XKeysymToKeycode(wm.display, x11::keysym::XK_Num_Lock as u64) {
                    mask = 1 << i;
                }
            }
        }
        XFreeModifiermap(modmap);
        wm.numlock_mask = mask;
    }
}

/// Grab every configured key combination (plain, plus Lock/NumLock
/// variants so the binding still fires regardless of those lock states),
/// re-run whenever `MappingNotify` says the keymap changed (§4.1).
pub fn grab_keys(wm: &mut Wm) {
    unsafe {
        xlib::XUngrabKey(wm.display, xlib::AnyKey, AnyModifier, wm.root);
        let (min_kc, max_kc) = {
            let mut min = 0;
            let mut max = 0;
            XDisplayKeycodes(wm.display, &mut min, &mut max);
            (min, max)
        };
        let _ = (min_kc, max_kc);

        for k in config::KEYS {
            let code = XKeysymToKeycode(wm.display, k.keysym as u64);
            if code == 0 {
                continue;
            }
            for extra in [0, LockMask, wm.numlock_mask, wm.numlock_mask | LockMask] {
                XGrabKey(
                    wm.display,
                    code as i32,
                    k.modifiers | extra,
                    wm.root,
                    True,
                    GrabModeAsync,
                    GrabModeAsync,
                );
            }
        }
    }
}

pub(crate) fn grab_buttons(wm: &Wm, window: Window, focused: bool) {
    unsafe {
        xlib::XUngrabButton(wm.display, xlib::AnyButton as u32, AnyModifier, window);
        if !focused {
            XGrabButton(
                wm.display,
                xlib::AnyButton as u32,
                AnyModifier,
                window,
                False,
                (ButtonPressMask | ButtonReleaseMask) as u32,
                GrabModeAsync,
                GrabModeAsync,
                0,
                0,
            );
        }
        for b in config::BUTTONS {
            if b.click != config::ClickRegion::ClientWin {
                continue;
            }
            for extra in [0, LockMask, wm.numlock_mask, wm.numlock_mask | LockMask] {
                XGrabButton(
                    wm.display,
                    b.button,
                    b.modifiers | extra,
                    window,
                    False,
                    (ButtonPressMask | ButtonReleaseMask) as u32,
                    GrabModeAsync,
                    GrabModeAsync,
                    0,
                    0,
                );
            }
        }
    }
}

/// Re-grab every managed client's buttons, keeping the selected client's
/// pass-through grab and every other client's full grab in sync with a
/// newly recomputed `numlock_mask` (dwm's `mappingnotify`).
pub(crate) fn regrab_buttons(wm: &Wm) {
    for (id, c) in wm.clients.iter() {
        let focused = wm.monitors.get(c.mon).selected == Some(id);
        grab_buttons(wm, c.window, focused);
    }
}

// ---- Geometry / monitor topology (§4.3) --------------------------------

/// Re-query Xinerama, diff against the current monitor list, migrate
/// clients off any monitor that disappears onto monitor 0, and recompute
/// every surviving monitor's work area.
pub fn update_geometry(wm: &mut Wm) {
    let screens: Vec<Rect> = unsafe {
        if XineramaIsActive(wm.display) == 0 {
            vec![wm.screen]
        } else {
            let mut n: i32 = 0;
            let infos = XineramaQueryScreens(wm.display, &mut n);
            if infos.is_null() || n == 0 {
                vec![wm.screen]
            } else {
                let slice = std::slice::from_raw_parts(infos, n as usize);
                let out = slice
                    .iter()
                    .map(|s| Rect::new(s.x_org as i32, s.y_org as i32, s.width as i32, s.height as i32))
                    .collect();
                XFree(infos as *mut _);
                out
            }
        }
    };

    let old_n = wm.monitors.len();
    let new_n = screens.len();

    for (i, r) in screens.iter().enumerate() {
        if i < old_n {
            wm.monitors.get_mut(MonitorId(i)).screen = *r;
        } else {
            wm.monitors.push(Monitor::new(i, *r));
        }
    }

    while wm.monitors.len() > new_n.max(1) {
        let last = MonitorId(wm.monitors.len() - 1);
        let mut removed = wm.monitors.pop().expect("checked len > 1");
        let head = wm.monitors.get_mut(MonitorId(0));
        monitor::migrate_all_clients(&mut wm.clients, &mut removed, head, MonitorId(0));
        if wm.selmon == last {
            wm.selmon = MonitorId(0);
        }
    }

    for id in wm.monitors.ids().collect::<Vec<_>>() {
        let (bar_window, bar_x, bar_y, bar_w, bar_h, screen) = {
            let mon = wm.monitors.get_mut(id);
            mon.bar_h = if SHOWBAR { 24 } else { 0 };
            mon.bar_y = if TOPBAR { mon.screen.y } else { mon.screen.y + mon.screen.h - mon.bar_h };
            mon.update_work_area(SHOWBAR, TOPBAR);
            (mon.bar_window, mon.screen.x, mon.bar_y, mon.screen.w, mon.bar_h, mon.screen)
        };

        if let Some(bar) = bar_window {
            unsafe {
                XMoveResizeWindow(wm.display, bar, bar_x, bar_y, bar_w.max(1) as u32, bar_h.max(1) as u32);
            }
        }

        let fullscreen: Vec<ClientId> = wm
            .clients
            .iter()
            .filter(|(_, c)| c.mon == id && c.is_fullscreen())
            .map(|(cid, _)| cid)
            .collect();
        for cid in fullscreen {
            wm.clients.get_mut(cid).rect = screen;
            let window = wm.clients.get(cid).window;
            unsafe {
                XMoveResizeWindow(wm.display, window, screen.x, screen.y, screen.w.max(1) as u32, screen.h.max(1) as u32);
            }
        }
    }

    if wm.monitors.is_empty() {
        wm.monitors.push(Monitor::new(0, wm.screen));
    }
    if wm.selmon.0 >= wm.monitors.len() {
        wm.selmon = MonitorId(0);
    }
}

// ---- Client lifecycle (§4.2) --------------------------------------------

/// `manage`: build a `Client` for `window`, apply placement rules, read its
/// size/WM hints, reparent-free (dwm normally reparents into a frame; the
/// Design Notes drop framing as unnecessary for this core, so this manages
/// the client window directly), attach it to its monitor, and map it.
pub fn manage(wm: &mut Wm, window: Window, attrs: &XWindowAttributes) {
    let trans = crate::event::transient_for(wm, window);
    let trans_mon = trans.and_then(|t| wm.clients.window_to_client(t)).map(|id| wm.clients.get(id).mon);
    let initial_mon = trans_mon.unwrap_or(wm.selmon);
    let active = wm.monitors.get(initial_mon).active_tagset();

    let rect = Rect::new(attrs.x, attrs.y, attrs.width, attrs.height);
    let id = wm.clients.insert(Client::new(window, initial_mon, active, rect, BORDERPX as i32));

    update_size_hints(wm, id);
    update_wm_hints(wm, id);
    update_title(wm, id);
    update_window_type(wm, id);

    if trans.is_some() {
        wm.clients.get_mut(id).flags.insert(ClientFlags::FLOATING);
    }
    apply_rules(wm, id);

    // `apply_rules` may have pinned the client to a different monitor via
    // `Rule.monitor`; the client is not attached anywhere yet, so resolving
    // the final owner here (rather than reusing `initial_mon`) is enough to
    // keep the clamp, attach, and arrange below all agreeing with `Client.mon`.
    let mon_id = wm.clients.get(id).mon;
    if mon_id != initial_mon {
        let retagged = wm.monitors.get(mon_id).active_tagset();
        wm.clients.get_mut(id).tags = retagged;
    }

    let c = wm.clients.get(id);
    let mut r = c.rect;
    let mon = wm.monitors.get(mon_id);
    r.clamp_into(&mon.screen);
    wm.clients.get_mut(id).rect = r;

    unsafe {
        XSetWindowBorderWidth(wm.display, window, BORDERPX);
        XSetWindowBorder(wm.display, window, config::BORDER_NORMAL);
        configure(wm, id);
        ewmh::set_wm_state(wm.display, window, &wm.atoms, ewmh::WM_STATE_NORMAL);
        ewmh::set_protocols(wm.display, window, &wm.atoms);
        XSelectInput(
            wm.display,
            window,
            EnterWindowMask | StructureNotifyMask | PropertyChangeMask,
        );
    }
    grab_buttons(wm, window, false);

    {
        let m = wm.monitors.get_mut(mon_id);
        client::attach(&mut wm.clients, m, id);
        client::attach_stack(&mut wm.clients, m, id);
    }

    unsafe {
        XMapWindow(wm.display, window);
    }

    update_client_list(wm);
    arrange(wm, mon_id);
    crate::focus::focus(wm, Some(id));
    trace!("managed window {}", window);
}

/// `unmanage`: detach from both lists, optionally restore the window to
/// withdrawn state (skipped if the window already destroyed itself), and
/// reassign focus within the monitor (§4.2).
pub fn unmanage(wm: &mut Wm, id: ClientId, destroyed: bool) {
    let mon_id = wm.clients.get(id).mon;
    let window = wm.clients.get(id).window;

    {
        let m = wm.monitors.get_mut(mon_id);
        client::detach(&mut wm.clients, m, id);
        client::detach_stack(&mut wm.clients, m, id);
    }
    wm.clients.remove(id);

    if !destroyed {
        unsafe {
            XGrabServer(wm.display);
            ewmh::set_wm_state(wm.display, window, &wm.atoms, ewmh::WM_STATE_WITHDRAWN);
            XUngrabServer(wm.display);
        }
    }

    update_client_list(wm);
    arrange(wm, mon_id);
    if wm.monitors.get(mon_id).selected.is_none() {
        crate::focus::focus(wm, None);
    }
}

fn update_client_list(wm: &Wm) {
    let windows: Vec<Window> = wm.clients.iter().map(|(_, c)| c.window).collect();
    unsafe { ewmh::update_client_list(wm.display, wm.root, &wm.atoms, &windows) };
}

pub fn set_withdrawn(wm: &mut Wm, id: ClientId) {
    unmanage(wm, id, false);
}

pub fn clear_bar(wm: &mut Wm, window: Window) {
    if let Some(mon_id) = wm.monitors.bar_to_monitor(window) {
        wm.monitors.get_mut(mon_id).bar_window = None;
    }
}

pub fn clear_tray(wm: &mut Wm, window: Window) {
    if let Some(mon_id) = wm.monitors.tray_to_monitor(window) {
        wm.monitors.get_mut(mon_id).tray_window = None;
    }
}

pub fn register_bar(wm: &mut Wm, window: Window, attrs: &XWindowAttributes) {
    let mon_id = wm.monitors.rect_to_monitor(
        &Rect::new(attrs.x, attrs.y, attrs.width, attrs.height),
        wm.selmon,
    );
    wm.monitors.get_mut(mon_id).bar_window = Some(window);
    unsafe {
        XMapWindow(wm.display, window);
    }
    arrange(wm, mon_id);
}

pub fn register_tray(wm: &mut Wm, window: Window, attrs: &XWindowAttributes) {
    let mon_id = wm.monitors.rect_to_monitor(
        &Rect::new(attrs.x, attrs.y, attrs.width, attrs.height),
        wm.selmon,
    );
    wm.monitors.get_mut(mon_id).tray_window = Some(window);
    unsafe {
        XMapWindow(wm.display, window);
    }
    arrange(wm, mon_id);
}

unsafe fn c_str(ptr: *mut i8) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// `gettextprop`-equivalent for `WM_NAME`/`_NET_WM_NAME`: reads a window
/// property as a NUL-terminated byte string via `XGetWindowProperty`
/// (dwm reads `_NET_WM_NAME` as UTF8_STRING and falls back to `WM_NAME`;
/// treating both as Latin-1 byte strings here is a deliberate
/// simplification, since title text is log/display-only, never parsed).
unsafe fn fetch_name(display: *mut Display, window: Window, atoms: &Atoms) -> Option<String> {
    for atom in [atoms.net_wm_name, XA_WM_NAME] {
        if let Some(s) = fetch_text_prop(display, window, atom) {
            return Some(s);
        }
    }
    None
}

unsafe fn fetch_text_prop(display: *mut Display, window: Window, atom: Atom) -> Option<String> {
    let mut actual_type: Atom = 0;
    let mut actual_format: i32 = 0;
    let mut n_items: u64 = 0;
    let mut bytes_after: u64 = 0;
    let mut data: *mut u8 = std::ptr::null_mut();
    let status = XGetWindowProperty(
        display,
        window,
        atom,
        0,
        i64::MAX / 4,
        False,
        xlib::AnyPropertyType as u64,
        &mut actual_type,
        &mut actual_format,
        &mut n_items,
        &mut bytes_after,
        &mut data,
    );
    if status != 0 || data.is_null() || n_items == 0 {
        if !data.is_null() {
            XFree(data as *mut _);
        }
        return None;
    }
    let bytes = std::slice::from_raw_parts(data, n_items as usize).to_vec();
    XFree(data as *mut _);
    Some(String::from_utf8_lossy(&bytes).trim_end_matches('\0').to_string())
}

unsafe fn get_atom_prop(display: *mut Display, window: Window, atom: Atom) -> Option<Atom> {
    let mut actual_type: Atom = 0;
    let mut actual_format: i32 = 0;
    let mut n_items: u64 = 0;
    let mut bytes_after: u64 = 0;
    let mut data: *mut u8 = std::ptr::null_mut();
    let status = XGetWindowProperty(
        display,
        window,
        atom,
        0,
        1,
        False,
        XA_ATOM,
        &mut actual_type,
        &mut actual_format,
        &mut n_items,
        &mut bytes_after,
        &mut data,
    );
    if status != 0 || data.is_null() || n_items == 0 {
        if !data.is_null() {
            XFree(data as *mut _);
        }
        return None;
    }
    let value = *(data as *const Atom);
    XFree(data as *mut _);
    Some(value)
}

fn apply_rules(wm: &mut Wm, id: ClientId) {
    let window = wm.clients.get(id).window;
    let mut hint: XClassHint = unsafe { std::mem::zeroed() };
    let have_hint = unsafe { XGetClassHint(wm.display, window, &mut hint) } != 0;
    let class = if have_hint {
        unsafe { c_str(hint.res_class) }
    } else {
        None
    };
    let instance = if have_hint {
        unsafe { c_str(hint.res_name) }
    } else {
        None
    };
    if have_hint {
        unsafe {
            if !hint.res_name.is_null() {
                XFree(hint.res_name as *mut _);
            }
            if !hint.res_class.is_null() {
                XFree(hint.res_class as *mut _);
            }
        }
    }
    let title = wm.clients.get(id).name.clone();

    for rule in config::RULES {
        let class_ok = rule.class.map(|want| class.as_deref() == Some(want)).unwrap_or(true);
        let inst_ok = rule.instance.map(|want| instance.as_deref() == Some(want)).unwrap_or(true);
        let title_ok = rule.title.map(|want| title.contains(want)).unwrap_or(true);
        if class_ok && inst_ok && title_ok {
            if rule.floating {
                wm.clients.get_mut(id).flags.insert(ClientFlags::FLOATING);
            }
            if rule.tags_mask != 0 {
                wm.clients.get_mut(id).tags = rule.tags_mask & TAGMASK;
            }
            if let Some(m) = rule.monitor {
                if m < wm.monitors.len() {
                    wm.clients.get_mut(id).mon = MonitorId(m);
                }
            }
            break;
        }
    }
}

pub fn update_size_hints(wm: &mut Wm, id: ClientId) {
    let window = wm.clients.get(id).window;
    let mut hints: XSizeHints = unsafe { std::mem::zeroed() };
    let mut supplied = 0;
    unsafe { XGetWMNormalHints(wm.display, window, &mut hints, &mut supplied) };
    let c = wm.clients.get_mut(id);
    c.hints = SizeHints::from_raw(&hints, c.rect.w, c.rect.h);
    if c.hints.is_fixed() {
        c.flags.insert(ClientFlags::FIXED | ClientFlags::FLOATING);
    }
}

pub fn update_wm_hints(wm: &mut Wm, id: ClientId) {
    let window = wm.clients.get(id).window;
    let hints = unsafe { XGetWMHints(wm.display, window) };
    if hints.is_null() {
        return;
    }
    let h = unsafe { *hints };
    let c = wm.clients.get_mut(id);
    if h.flags & xlib::XUrgencyHint != 0 {
        if Some(id) == wm.monitors.get(c.mon).selected {
            // never auto-demote: the selected client simply clears the hint on the server
        } else {
            c.flags.insert(ClientFlags::URGENT);
        }
    } else {
        c.flags.remove(ClientFlags::URGENT);
    }
    if h.flags & xlib::InputHint != 0 && h.input == 0 {
        c.flags.insert(ClientFlags::NEVER_FOCUS);
    } else {
        c.flags.remove(ClientFlags::NEVER_FOCUS);
    }
    unsafe { XFree(hints as *mut _) };
}

pub fn update_title(wm: &mut Wm, id: ClientId) {
    let window = wm.clients.get(id).window;
    let name = unsafe { fetch_name(wm.display, window, &wm.atoms) };
    wm.clients.get_mut(id).set_name(name.unwrap_or_else(|| "broken".to_string()));
}

pub fn update_window_type(wm: &mut Wm, id: ClientId) {
    let window = wm.clients.get(id).window;
    let wtype = unsafe { get_atom_prop(wm.display, window, wm.atoms.net_wm_window_type) };
    let state = unsafe { get_atom_prop(wm.display, window, wm.atoms.net_wm_state) };
    if state == Some(wm.atoms.net_wm_state_fullscreen) {
        set_fullscreen(wm, id, true);
    }
    if wtype == Some(wm.atoms.net_wm_window_type_dialog) {
        wm.clients.get_mut(id).flags.insert(ClientFlags::FLOATING);
    }
}

// ---- Layout / geometry application (§4.5, §4.8) -------------------------

/// `arrange`: recompute tiled geometry for `mon_id`'s visible tiled clients
/// and push the result to X; floating/fullscreen clients are left alone
/// here since they keep their own geometry until moved/resized.
pub fn arrange(wm: &mut Wm, mon_id: MonitorId) {
    let placements = layout::tile(wm.monitors.get(mon_id), &wm.clients);
    for (id, r) in placements {
        wm.clients.get_mut(id).rect = r;
        resize_and_configure(wm, id, r);
    }
    crate::focus::restack(wm, mon_id);
}

/// Apply size hints (when floating or `resize_hints` requested), move/
/// resize the X window if the geometry actually changed, and otherwise
/// send a synthetic `ConfigureNotify` so ICCCM-strict clients still see a
/// geometry "change" acknowledgment (§4.5).
pub fn resize_and_configure(wm: &mut Wm, id: ClientId, mut r: Rect) {
    let mon_id = wm.clients.get(id).mon;
    let mon = wm.monitors.get(mon_id);
    let floating = wm.clients.get(id).is_floating();
    let hints = wm.clients.get(id).hints;

    r = apply_size_hints(r, &hints, mon.bar_h, &mon.work, &mon.screen, false, floating, floating);

    let c = wm.clients.get_mut(id);
    let changed = r != c.rect;
    c.rect = r;
    let window = c.window;
    let border_w = c.border_w;

    unsafe {
        if changed {
            XMoveResizeWindow(wm.display, window, r.x, r.y, r.w.max(1) as u32, r.h.max(1) as u32);
        }
        XSetWindowBorderWidth(wm.display, window, border_w as u32);
    }
    if !changed {
        send_configure_notify(wm, id);
    }
}

pub fn send_configure_notify(wm: &Wm, id: ClientId) {
    let c = wm.clients.get(id);
    let mut ev: XConfigureEvent = unsafe { std::mem::zeroed() };
    ev.type_ = xlib::ConfigureNotify;
    ev.display = wm.display;
    ev.event = c.window;
    ev.window = c.window;
    ev.x = c.rect.x;
    ev.y = c.rect.y;
    ev.width = c.rect.w;
    ev.height = c.rect.h;
    ev.border_width = c.border_w;
    ev.above = 0;
    ev.override_redirect = 0;
    unsafe {
        let mut wrapped = XEvent { configure: ev };
        XSendEvent(wm.display, c.window, False, StructureNotifyMask, &mut wrapped);
    }
}

pub fn configure(wm: &mut Wm, id: ClientId) {
    send_configure_notify(wm, id);
}

pub fn send_to_monitor(wm: &mut Wm, id: ClientId, target: MonitorId) {
    let source = wm.clients.get(id).mon;
    if source == target {
        return;
    }
    {
        let m = wm.monitors.get_mut(source);
        client::detach(&mut wm.clients, m, id);
        client::detach_stack(&mut wm.clients, m, id);
    }
    let active = wm.monitors.get(target).active_tagset();
    wm.clients.get_mut(id).mon = target;
    wm.clients.get_mut(id).tags = active;
    {
        let m = wm.monitors.get_mut(target);
        client::attach(&mut wm.clients, m, id);
        client::attach_stack(&mut wm.clients, m, id);
    }
    arrange(wm, source);
    arrange(wm, target);
}

/// `setfullscreen`: enter saves the prior floating state and geometry,
/// expands to the full screen rect with zero border; leave restores both
/// (§4.8).
pub fn set_fullscreen(wm: &mut Wm, id: ClientId, want: bool) {
    let c = wm.clients.get(id);
    if want == c.is_fullscreen() {
        return;
    }
    let window = c.window;
    unsafe { ewmh::set_fullscreen_property(wm.display, window, &wm.atoms, want) };

    if want {
        let was_floating = wm.clients.get(id).is_floating();
        let old_rect = wm.clients.get(id).rect;
        let old_border = wm.clients.get(id).border_w;
        let c = wm.clients.get_mut(id);
        c.old_rect = old_rect;
        c.old_border_w = old_border;
        c.flags.set(ClientFlags::WAS_FLOATING, was_floating);
        c.flags.insert(ClientFlags::FULLSCREEN | ClientFlags::FLOATING);
        c.border_w = 0;
        let mon = wm.monitors.get(wm.clients.get(id).mon).screen;
        let r = mon;
        wm.clients.get_mut(id).rect = r;
        unsafe {
            XSetWindowBorderWidth(wm.display, window, 0);
            XMoveResizeWindow(wm.display, window, r.x, r.y, r.w as u32, r.h as u32);
            XRaiseWindow(wm.display, window);
        }
    } else {
        let c = wm.clients.get_mut(id);
        c.flags.remove(ClientFlags::FULLSCREEN);
        if !c.flags.contains(ClientFlags::WAS_FLOATING) {
            c.flags.remove(ClientFlags::FLOATING);
        }
        c.flags.remove(ClientFlags::WAS_FLOATING);
        let r = c.old_rect;
        let border_w = c.old_border_w;
        c.border_w = border_w;
        c.rect = r;
        unsafe {
            XSetWindowBorderWidth(wm.display, window, border_w as u32);
            XMoveResizeWindow(wm.display, window, r.x, r.y, r.w.max(1) as u32, r.h.max(1) as u32);
        }
        let mon_id = wm.clients.get(id).mon;
        arrange(wm, mon_id);
    }
}

/// `killclient`: politely ask via `WM_DELETE_WINDOW` if the client
/// advertises it, otherwise forcibly `XKillClient` (§4.2, bracketed by a
/// server grab per dwm's own `killclient`).
pub fn kill_client(wm: &mut Wm, id: ClientId) {
    let window = wm.clients.get(id).window;
    unsafe {
        if crate::focus::supports_protocol(wm, window, wm.atoms.wm_delete_window) {
            let mut ev: XEvent = std::mem::zeroed();
            ev.client_message.type_ = xlib::ClientMessage;
            ev.client_message.window = window;
            ev.client_message.message_type = wm.atoms.wm_protocols;
            ev.client_message.format = 32;
            ev.client_message.data.set_long(0, wm.atoms.wm_delete_window as i64);
            ev.client_message.data.set_long(1, CurrentTime as i64);
            XSendEvent(wm.display, window, False, NoEventMask, &mut ev);
        } else {
            XGrabServer(wm.display);
            XSetErrorHandler(Some(runtime_error_handler));
            XKillClient(wm.display, window);
            XSync(wm.display, False);
            XUngrabServer(wm.display);
        }
    }
}

// ---- Config-bound actions (§4.4, §4.6, §4.8) -----------------------------

pub fn spawn(wm: &mut Wm, arg: &Arg) {
    let _ = wm;
    if let Arg::Str(cmd) = arg {
        spawn::spawn(cmd);
    }
}

pub fn killclient(wm: &mut Wm, _arg: &Arg) {
    if let Some(id) = wm.monitors.get(wm.selmon).selected {
        kill_client(wm, id);
    }
}

pub fn focus_stack(wm: &mut Wm, arg: &Arg) {
    if let Arg::Int(dir) = arg {
        crate::focus::focus_stack(wm, *dir);
    }
}

pub fn zoom(wm: &mut Wm, _arg: &Arg) {
    crate::focus::zoom(wm);
}

pub fn setmfact(wm: &mut Wm, arg: &Arg) {
    if let Arg::Float(delta) = arg {
        let mon_id = wm.selmon;
        if monitor::set_mfact(wm.monitors.get_mut(mon_id), *delta) {
            arrange(wm, mon_id);
        }
    }
}

pub fn incnmaster(wm: &mut Wm, arg: &Arg) {
    if let Arg::Int(delta) = arg {
        let mon_id = wm.selmon;
        monitor::inc_nmaster(wm.monitors.get_mut(mon_id), *delta);
        arrange(wm, mon_id);
    }
}

pub fn togglefloating(wm: &mut Wm, _arg: &Arg) {
    let mon_id = wm.selmon;
    let Some(id) = wm.monitors.get(mon_id).selected else { return };
    if wm.clients.get(id).is_fullscreen() {
        return;
    }
    let was_floating = wm.clients.get(id).is_floating();
    let old_rect = wm.clients.get(id).rect;
    let c = wm.clients.get_mut(id);
    c.flags.toggle(ClientFlags::FLOATING);
    if !was_floating {
        c.old_rect = old_rect;
    } else {
        let restore = c.old_rect;
        c.rect = restore;
    }
    arrange(wm, mon_id);
}

pub fn togglefullscreen(wm: &mut Wm, _arg: &Arg) {
    let mon_id = wm.selmon;
    if let Some(id) = wm.monitors.get(mon_id).selected {
        let want = !wm.clients.get(id).is_fullscreen();
        set_fullscreen(wm, id, want);
    }
}

pub fn view(wm: &mut Wm, arg: &Arg) {
    if let Arg::UInt(mask) = arg {
        let mon_id = wm.selmon;
        monitor::view(wm.monitors.get_mut(mon_id), *mask);
        crate::focus::focus(wm, None);
        arrange(wm, mon_id);
    }
}

/// `comboview`: like `view`, but while `wm.combo` is held, successive calls
/// OR the requested tag into the same active slot instead of flipping the
/// view-history slot again (§4.4 combo mode).
pub fn comboview(wm: &mut Wm, arg: &Arg) {
    if let Arg::UInt(mask) = arg {
        let mon_id = wm.selmon;
        let add = mask & TAGMASK;
        if wm.combo {
            wm.combo_mask |= add;
            monitor::set_active_tagset(wm.monitors.get_mut(mon_id), wm.combo_mask);
        } else {
            wm.combo = true;
            wm.combo_mask = add;
            monitor::view(wm.monitors.get_mut(mon_id), wm.combo_mask);
        }
        crate::focus::focus(wm, None);
        arrange(wm, mon_id);
    }
}

/// `combotag`: like `tag`, accumulating the requested tags into the
/// selected client's mask across repeated presses while the modifier is
/// held (§4.4 combo mode).
pub fn combotag(wm: &mut Wm, arg: &Arg) {
    if let Arg::UInt(mask) = arg {
        wm.combo = true;
        wm.combo_mask |= mask & TAGMASK;
        let mon_id = wm.selmon;
        {
            let mon = wm.monitors.get(mon_id);
            monitor::tag(&mut wm.clients, mon, wm.combo_mask);
        }
        arrange(wm, mon_id);
    }
}

pub fn toggle_view(wm: &mut Wm, arg: &Arg) {
    if let Arg::UInt(mask) = arg {
        let mon_id = wm.selmon;
        monitor::toggle_view(wm.monitors.get_mut(mon_id), *mask);
        crate::focus::focus(wm, None);
        arrange(wm, mon_id);
    }
}

pub fn tag(wm: &mut Wm, arg: &Arg) {
    if let Arg::UInt(mask) = arg {
        let mon_id = wm.selmon;
        {
            let mon = wm.monitors.get(mon_id);
            monitor::tag(&mut wm.clients, mon, *mask);
        }
        arrange(wm, mon_id);
    }
}

pub fn toggle_tag(wm: &mut Wm, arg: &Arg) {
    if let Arg::UInt(mask) = arg {
        let mon_id = wm.selmon;
        {
            let mon = wm.monitors.get(mon_id);
            monitor::toggle_tag(&mut wm.clients, mon, *mask);
        }
        arrange(wm, mon_id);
    }
}

/// `focusmonitor`: move selection to the next/previous monitor by index,
/// wrapping (§4.3).
pub fn focus_monitor(wm: &mut Wm, arg: &Arg) {
    if wm.monitors.len() < 2 {
        return;
    }
    if let Arg::Int(dir) = arg {
        let n = wm.monitors.len() as i32;
        let next = ((wm.selmon.0 as i32 + dir) % n + n) % n;
        crate::focus::focus(wm, None);
        wm.selmon = MonitorId(next as usize);
        crate::focus::focus(wm, None);
    }
}

pub fn movemouse(wm: &mut Wm, _arg: &Arg) {
    if let Some(id) = wm.monitors.get(wm.selmon).selected {
        crate::interactive::movemouse(wm, id);
    }
}

pub fn resizemouse(wm: &mut Wm, _arg: &Arg) {
    if let Some(id) = wm.monitors.get(wm.selmon).selected {
        crate::interactive::resizemouse(wm, id);
    }
}

pub fn quit(wm: &mut Wm, _arg: &Arg) {
    info!("quit requested");
    wm.running = false;
}
