//! Monitor data model, monitor registry (Xinerama discovery / topology
//! changes), and the tag engine (§4.3, §4.4).

use x11::xlib::Window;

use crate::client::{self, ClientId, Clients};
use crate::config::TAGMASK;
use crate::geometry::Rect;

/// Index into the [`Monitors`] arena. Monitors are only ever appended or
/// truncated from the tail (§4.3), so a plain index stays valid as long as
/// callers reassign surviving clients before truncating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorId(pub usize);

#[derive(Debug, Clone)]
pub struct Monitor {
    pub num: usize,
    /// Screen rectangle (`mx, my, mw, mh`).
    pub screen: Rect,
    /// Work area: screen minus the bar band.
    pub work: Rect,
    /// Bar geometry; `bar_y`/`bar_h` only, `bar_x`/`bar_w` always track the
    /// screen width (dwm never lets the bar be narrower than the monitor).
    pub bar_y: i32,
    pub bar_h: i32,
    pub bar_window: Option<Window>,
    pub tray_window: Option<Window>,

    pub mfact: f32,
    pub nmaster: u32,
    pub gappx: i32,

    /// Two tag bitmasks; `sel_tags` (0 or 1) selects which is active. Gives
    /// a one-deep "previous view" history (§4.4).
    pub tagset: [u32; 2],
    pub sel_tags: usize,

    pub clients_head: Option<ClientId>,
    pub stack_head: Option<ClientId>,
    pub selected: Option<ClientId>,
}

impl Monitor {
    pub fn new(num: usize, screen: Rect) -> Self {
        Monitor {
            num,
            screen,
            work: screen,
            bar_y: screen.y,
            bar_h: 0,
            bar_window: None,
            tray_window: None,
            mfact: crate::config::MFACT,
            nmaster: crate::config::NMASTER,
            gappx: crate::config::GAPPX,
            tagset: [1, 1],
            sel_tags: 0,
            clients_head: None,
            stack_head: None,
            selected: None,
        }
    }

    pub fn active_tagset(&self) -> u32 {
        self.tagset[self.sel_tags]
    }

    /// Recompute `work` from `screen` and the bar band, on whichever edge
    /// the bar occupies (§3 Monitor invariant).
    pub fn update_work_area(&mut self, show_bar: bool, top_bar: bool) {
        self.work = self.screen;
        if show_bar && self.bar_h > 0 {
            if top_bar {
                self.work.y += self.bar_h;
            }
            self.work.h -= self.bar_h;
        }
    }

    pub fn clients(&self, clients: &Clients) -> Vec<ClientId> {
        clients.arrangement_order(self.clients_head)
    }

    pub fn stack(&self, clients: &Clients) -> Vec<ClientId> {
        clients.stack_order(self.stack_head)
    }

    pub fn visible_clients(&self, clients: &Clients) -> Vec<ClientId> {
        let active = self.active_tagset();
        self.clients(clients)
            .into_iter()
            .filter(|&id| clients.get(id).visible_on(active))
            .collect()
    }

    pub fn tiled_clients(&self, clients: &Clients) -> Vec<ClientId> {
        let active = self.active_tagset();
        self.clients(clients)
            .into_iter()
            .filter(|&id| {
                let c = clients.get(id);
                c.visible_on(active) && !c.is_floating()
            })
            .collect()
    }
}

/// Arena of live monitors. Index 0 is always the "head" monitor that
/// absorbs clients when the tail shrinks away (§4.3).
#[derive(Debug, Default)]
pub struct Monitors {
    arena: Vec<Monitor>,
}

impl Monitors {
    pub fn new() -> Self {
        Monitors { arena: Vec::new() }
    }

    pub fn get(&self, id: MonitorId) -> &Monitor {
        &self.arena[id.0]
    }

    pub fn get_mut(&mut self, id: MonitorId) -> &mut Monitor {
        &mut self.arena[id.0]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = MonitorId> {
        (0..self.arena.len()).map(MonitorId)
    }

    pub fn push(&mut self, m: Monitor) -> MonitorId {
        self.arena.push(m);
        MonitorId(self.arena.len() - 1)
    }

    pub fn pop(&mut self) -> Option<Monitor> {
        self.arena.pop()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Monitor> {
        self.arena.iter()
    }

    /// `recttomon`: the monitor whose screen rectangle has the largest
    /// intersection with `r`, defaulting to `fallback` on a tie or if `r`
    /// intersects nothing (§4.3).
    pub fn rect_to_monitor(&self, r: &Rect, fallback: MonitorId) -> MonitorId {
        let mut best = fallback;
        let mut best_area = -1i64;
        for (i, m) in self.arena.iter().enumerate() {
            let area = r.intersection_area(&m.screen);
            if area > best_area {
                best_area = area;
                best = MonitorId(i);
            }
        }
        best
    }

    /// `wintomon` for the root-via-pointer-query case: the monitor
    /// containing point `(x, y)`, defaulting to `fallback`.
    pub fn point_to_monitor(&self, x: i32, y: i32, fallback: MonitorId) -> MonitorId {
        for (i, m) in self.arena.iter().enumerate() {
            if m.screen.contains_point(x, y) {
                return MonitorId(i);
            }
        }
        fallback
    }

    pub fn bar_to_monitor(&self, w: Window) -> Option<MonitorId> {
        self.arena
            .iter()
            .enumerate()
            .find(|(_, m)| m.bar_window == Some(w))
            .map(|(i, _)| MonitorId(i))
    }

    pub fn tray_to_monitor(&self, w: Window) -> Option<MonitorId> {
        self.arena
            .iter()
            .enumerate()
            .find(|(_, m)| m.tray_window == Some(w))
            .map(|(i, _)| MonitorId(i))
    }
}

// ---- Tag engine (§4.4) -----------------------------------------------

/// `view(mask)`: toggle the active slot and, if `mask` is nonzero, assign it
/// to the newly active slot. A no-op when `mask` already equals the active
/// tagset (the "view is idempotent on the current mask" law in §8).
pub fn view(mon: &mut Monitor, mask: u32) {
    if mask & TAGMASK == mon.active_tagset() {
        return;
    }
    mon.sel_tags ^= 1;
    if mask & TAGMASK != 0 {
        mon.tagset[mon.sel_tags] = mask & TAGMASK;
    }
}

/// Overwrite the active slot in place without flipping `sel_tags`, used by
/// combo-mode accumulation once the initial view flip has already happened
/// (§4.4).
pub fn set_active_tagset(mon: &mut Monitor, mask: u32) {
    if mask & TAGMASK != 0 {
        mon.tagset[mon.sel_tags] = mask & TAGMASK;
    }
}

/// `toggleview(mask)`: XOR `mask` into the active slot, refusing to empty
/// it (§4.4, §8 "toggleview is an involution whenever the intermediate
/// state is non-empty").
pub fn toggle_view(mon: &mut Monitor, mask: u32) {
    let new_mask = mon.active_tagset() ^ (mask & TAGMASK);
    if new_mask != 0 {
        mon.tagset[mon.sel_tags] = new_mask;
    }
}

/// `tag(mask)`: assign `mask` to the selected client's tags (§8: `tag(T);
/// tag(U)` leaves tags = `U & TAGMASK` when nonzero).
pub fn tag(clients: &mut Clients, mon: &Monitor, mask: u32) {
    if let Some(id) = mon.selected {
        if mask & TAGMASK != 0 {
            clients.get_mut(id).tags = mask & TAGMASK;
        }
    }
}

/// `toggletag(mask)`: XOR `mask` into the selected client's tags, refusing
/// to produce an empty tag set (§3 invariant: tags is always nonzero).
pub fn toggle_tag(clients: &mut Clients, mon: &Monitor, mask: u32) {
    if let Some(id) = mon.selected {
        let c = clients.get_mut(id);
        let new_tags = c.tags ^ (mask & TAGMASK);
        if new_tags != 0 {
            c.tags = new_tags;
        }
    }
}

/// `setmfact`: clamp into `[0.05, 0.95]`; out-of-range deltas are rejected
/// without mutating state (§8 boundary behavior).
pub fn set_mfact(mon: &mut Monitor, delta: f32) -> bool {
    let f = mon.mfact + delta;
    if !(0.05..=0.95).contains(&f) {
        return false;
    }
    mon.mfact = f;
    true
}

/// `incnmaster`: clamp to `>= 0`.
pub fn inc_nmaster(mon: &mut Monitor, delta: i32) {
    let n = mon.nmaster as i32 + delta;
    mon.nmaster = n.max(0) as u32;
}

/// Reassign every client owned by `from` onto `to`'s lists, preserving each
/// client's own tag bitmask (§4.3/§8 scenario 6 - monitor removal migrates
/// clients to the head monitor).
pub fn migrate_all_clients(clients: &mut Clients, from: &mut Monitor, to: &mut Monitor, to_id: MonitorId) {
    let order = clients.arrangement_order(from.clients_head);
    from.clients_head = None;
    from.stack_head = None;
    from.selected = None;
    for id in order.into_iter().rev() {
        clients.get_mut(id).mon = to_id;
        client::attach(clients, to, id);
        client::attach_stack(clients, to, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mon() -> Monitor {
        Monitor::new(0, Rect::new(0, 0, 1920, 1080))
    }

    #[test]
    fn view_same_mask_is_noop() {
        let mut m = mon();
        let before = m.tagset;
        let before_sel = m.sel_tags;
        view(&mut m, m.active_tagset());
        assert_eq!(m.tagset, before);
        assert_eq!(m.sel_tags, before_sel);
    }

    #[test]
    fn view_twice_same_mask_restores_active_tagset() {
        let mut m = mon();
        let active_before = m.active_tagset();
        view(&mut m, 0b0010);
        view(&mut m, 0b0010);
        assert_eq!(m.active_tagset(), active_before);
    }

    #[test]
    fn toggleview_is_involution_when_nonempty() {
        let mut m = mon();
        let before = m.active_tagset();
        toggle_view(&mut m, 0b0100);
        toggle_view(&mut m, 0b0100);
        assert_eq!(m.active_tagset(), before);
    }

    #[test]
    fn toggleview_refuses_to_empty() {
        let mut m = mon();
        m.tagset[m.sel_tags] = 0b0001;
        toggle_view(&mut m, 0b0001);
        assert_eq!(m.active_tagset(), 0b0001);
    }

    #[test]
    fn setmfact_clamps_out_of_range() {
        let mut m = mon();
        m.mfact = 0.5;
        assert!(!set_mfact(&mut m, 10.0));
        assert_eq!(m.mfact, 0.5);
        assert!(set_mfact(&mut m, 0.05));
        assert!((m.mfact - 0.55).abs() < 0.001);
    }

    #[test]
    fn incnmaster_clamps_nonnegative() {
        let mut m = mon();
        m.nmaster = 1;
        inc_nmaster(&mut m, -5);
        assert_eq!(m.nmaster, 0);
    }

    #[test]
    fn recttomon_ties_default_to_fallback() {
        let mut monitors = Monitors::new();
        monitors.push(Monitor::new(0, Rect::new(0, 0, 1920, 1080)));
        monitors.push(Monitor::new(1, Rect::new(1920, 0, 1920, 1080)));
        let r = Rect::new(5000, 5000, 10, 10);
        assert_eq!(monitors.rect_to_monitor(&r, MonitorId(1)), MonitorId(1));
    }

    #[test]
    fn tag_then_tag_leaves_only_the_last_mask() {
        use crate::client::Client;
        let mut clients = Clients::new();
        let mut m = mon();
        let id = clients.insert(Client::new(1, MonitorId(0), 1, Rect::new(0, 0, 1, 1), 0));
        client::attach(&mut clients, &mut m, id);
        m.selected = Some(id);

        tag(&mut clients, &m, 0b0010);
        tag(&mut clients, &m, 0b0100);
        assert_eq!(clients.get(id).tags, 0b0100);
    }

    #[test]
    fn scenario_startup_single_monitor_has_default_view_and_no_selection() {
        let mut monitors = Monitors::new();
        monitors.push(Monitor::new(0, Rect::new(0, 0, 1920, 1080)));
        assert_eq!(monitors.len(), 1);
        let m = monitors.get(MonitorId(0));
        assert_eq!(m.screen, Rect::new(0, 0, 1920, 1080));
        assert_eq!(m.active_tagset(), 1);
        assert!(m.selected.is_none());
    }

    #[test]
    fn scenario_combo_view_unions_tags_across_presses_while_held() {
        let mut m = mon();
        // First comboview press while idle behaves like a plain `view`.
        view(&mut m, 0b0001);
        // Second comboview press while still composing unions in place,
        // without flipping the view-history slot again.
        let before_sel = m.sel_tags;
        set_active_tagset(&mut m, m.active_tagset() | 0b0100);
        assert_eq!(m.active_tagset(), 0b0101);
        assert_eq!(m.sel_tags, before_sel);
    }

    #[test]
    fn migrate_all_clients_preserves_tags_and_reassigns_monitor() {
        use crate::client::Client;
        let mut clients = Clients::new();
        let mut from = Monitor::new(0, Rect::new(0, 0, 1920, 1080));
        let mut to = Monitor::new(1, Rect::new(1920, 0, 1920, 1080));
        let a = clients.insert(Client::new(1, MonitorId(0), 0b0100, Rect::new(0, 0, 1, 1), 0));
        client::attach(&mut clients, &mut from, a);
        client::attach_stack(&mut clients, &mut from, a);

        migrate_all_clients(&mut clients, &mut from, &mut to, MonitorId(1));

        assert_eq!(clients.get(a).mon, MonitorId(1));
        assert_eq!(clients.get(a).tags, 0b0100);
        assert_eq!(to.clients_head, Some(a));
        assert!(from.clients_head.is_none());
    }
}
