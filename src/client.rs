//! Client data model and the arena-backed client registry.
//!
//! Design Notes call for clients kept in an arena with stable indices and
//! two intrusive "next" links (arrangement order vs. focus stack) rather
//! than shared-ownership pointers; `mon` is a lookup back-reference, never
//! an owner. `ClientId` is that stable index.

use std::collections::HashMap;

use x11::xlib::Window;

use crate::geometry::{Rect, SizeHints};
use crate::monitor::{Monitor, MonitorId};

bitflags::bitflags! {
    /// Per-client flag set (§3). `FULLSCREEN` implies `FLOATING` and a zero
    /// border; `FIXED` implies `FLOATING`; both invariants are enforced by
    /// the call sites that flip these bits, not by the bitflags type itself.
    pub struct ClientFlags: u32 {
        const NONE        = 0;
        const FIXED       = 1 << 0;
        const FLOATING    = 1 << 1;
        const URGENT      = 1 << 2;
        const NEVER_FOCUS = 1 << 3;
        const FULLSCREEN  = 1 << 4;
        /// Saved immediately before entering fullscreen so leaving it can
        /// restore the prior floating/tiled state (§4.8).
        const WAS_FLOATING = 1 << 5;
    }
}

/// Maximum bytes retained for a client's title (§3: "bounded 256 bytes").
pub const TITLE_LIMIT: usize = 256;

#[derive(Debug, Clone)]
pub struct Client {
    pub window: Window,
    pub name: String,
    pub rect: Rect,
    pub old_rect: Rect,
    pub border_w: i32,
    pub old_border_w: i32,
    pub hints: SizeHints,
    pub flags: ClientFlags,
    pub tags: u32,
    pub mon: MonitorId,
    /// Next client in the monitor's arrangement list (head-inserted).
    pub next: Option<ClientId>,
    /// Next client in the monitor's focus stack (head-inserted).
    pub next_stack: Option<ClientId>,
}

impl Client {
    pub fn new(window: Window, mon: MonitorId, tags: u32, rect: Rect, border_w: i32) -> Self {
        Client {
            window,
            name: String::new(),
            rect,
            old_rect: rect,
            border_w,
            old_border_w: border_w,
            hints: SizeHints::default(),
            flags: ClientFlags::NONE,
            tags,
            mon,
            next: None,
            next_stack: None,
        }
    }

    pub fn is_floating(&self) -> bool {
        self.flags.contains(ClientFlags::FLOATING)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.flags.contains(ClientFlags::FULLSCREEN)
    }

    pub fn is_urgent(&self) -> bool {
        self.flags.contains(ClientFlags::URGENT)
    }

    pub fn never_focus(&self) -> bool {
        self.flags.contains(ClientFlags::NEVER_FOCUS)
    }

    pub fn visible_on(&self, active_tagset: u32) -> bool {
        self.tags & active_tagset != 0
    }

    pub fn set_name(&mut self, name: String) {
        let mut n = name;
        if n.len() > TITLE_LIMIT {
            n.truncate(TITLE_LIMIT);
        }
        self.name = n;
    }
}

/// Stable index into a [`Clients`] arena. `0` is a valid id (unlike an X
/// `Window`, for which `0` means "none" - see Design Notes on
/// `wintoclient(0)`), so code that must represent "no client" uses
/// `Option<ClientId>`, never a sentinel value of `ClientId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub usize);

/// Arena owning every managed client, plus an index from X window handle to
/// [`ClientId`] for O(1) `window_to_client` lookups (the teacher's
/// `HashMap<Window, Window>` generalized to the richer `Client` record).
#[derive(Debug, Default)]
pub struct Clients {
    arena: Vec<Option<Client>>,
    by_window: HashMap<Window, ClientId>,
}

impl Clients {
    pub fn new() -> Self {
        Clients {
            arena: Vec::new(),
            by_window: HashMap::new(),
        }
    }

    pub fn insert(&mut self, client: Client) -> ClientId {
        let window = client.window;
        self.arena.push(Some(client));
        let id = ClientId(self.arena.len() - 1);
        self.by_window.insert(window, id);
        id
    }

    pub fn remove(&mut self, id: ClientId) -> Client {
        let client = self.arena[id.0].take().expect("double-remove of a client");
        self.by_window.remove(&client.window);
        client
    }

    pub fn get(&self, id: ClientId) -> &Client {
        self.arena[id.0].as_ref().expect("stale ClientId")
    }

    pub fn get_mut(&mut self, id: ClientId) -> &mut Client {
        self.arena[id.0].as_mut().expect("stale ClientId")
    }

    pub fn try_get(&self, id: ClientId) -> Option<&Client> {
        self.arena.get(id.0).and_then(|c| c.as_ref())
    }

    /// `wintoclient`. May be called with window `0` (e.g. from a
    /// `ClientMessage` with no target); the `by_window` map never contains
    /// that key, so this returns `None` without a special case, per the
    /// Design Notes hazard about `wintoclient(0)`.
    pub fn window_to_client(&self, window: Window) -> Option<ClientId> {
        self.by_window.get(&window).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClientId, &Client)> {
        self.arena
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (ClientId(i), c)))
    }

    /// Walk the monitor's arrangement list in order, head to tail.
    pub fn arrangement_order(&self, mut head: Option<ClientId>) -> Vec<ClientId> {
        let mut out = Vec::new();
        while let Some(id) = head {
            out.push(id);
            head = self.get(id).next;
        }
        out
    }

    /// Walk the monitor's focus stack in order, head (most-recently focused)
    /// to tail.
    pub fn stack_order(&self, mut head: Option<ClientId>) -> Vec<ClientId> {
        let mut out = Vec::new();
        while let Some(id) = head {
            out.push(id);
            head = self.get(id).next_stack;
        }
        out
    }
}

/// Head-insert `id` into `mon`'s arrangement list (dwm's `attach`).
pub fn attach(clients: &mut Clients, mon: &mut Monitor, id: ClientId) {
    clients.get_mut(id).next = mon.clients_head;
    mon.clients_head = Some(id);
}

/// Splice `id` out of `mon`'s arrangement list by pointer-to-next rewrite
/// (dwm's `detach`).
pub fn detach(clients: &mut Clients, mon: &mut Monitor, id: ClientId) {
    let mut cur = mon.clients_head;
    let mut prev: Option<ClientId> = None;
    while let Some(cid) = cur {
        let next = clients.get(cid).next;
        if cid == id {
            match prev {
                Some(p) => clients.get_mut(p).next = next,
                None => mon.clients_head = next,
            }
            clients.get_mut(id).next = None;
            return;
        }
        prev = Some(cid);
        cur = next;
    }
}

/// Head-insert `id` into `mon`'s focus stack (dwm's `attachstack`).
pub fn attach_stack(clients: &mut Clients, mon: &mut Monitor, id: ClientId) {
    clients.get_mut(id).next_stack = mon.stack_head;
    mon.stack_head = Some(id);
}

/// Splice `id` out of `mon`'s focus stack. If `id` was the monitor's
/// selection, re-derive it as the topmost remaining *visible* client in the
/// stack (dwm's `detachstack`); this is the one place list surgery and
/// selection are coupled, because dwm couples them too.
pub fn detach_stack(clients: &mut Clients, mon: &mut Monitor, id: ClientId) {
    let mut cur = mon.stack_head;
    let mut prev: Option<ClientId> = None;
    while let Some(cid) = cur {
        let next = clients.get(cid).next_stack;
        if cid == id {
            match prev {
                Some(p) => clients.get_mut(p).next_stack = next,
                None => mon.stack_head = next,
            }
            clients.get_mut(id).next_stack = None;
            break;
        }
        prev = Some(cid);
        cur = next;
    }

    if mon.selected == Some(id) {
        let active = mon.active_tagset();
        let mut t = mon.stack_head;
        let mut found = None;
        while let Some(tid) = t {
            if clients.get(tid).visible_on(active) {
                found = Some(tid);
                break;
            }
            t = clients.get(tid).next_stack;
        }
        mon.selected = found;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::Monitor;

    fn new_mon() -> Monitor {
        Monitor::new(0, Rect::new(0, 0, 1920, 1080))
    }

    #[test]
    fn attach_detach_preserves_membership() {
        let mut clients = Clients::new();
        let mut mon = new_mon();
        let a = clients.insert(Client::new(1, MonitorId(0), 1, Rect::new(0, 0, 1, 1), 0));
        let b = clients.insert(Client::new(2, MonitorId(0), 1, Rect::new(0, 0, 1, 1), 0));
        attach(&mut clients, &mut mon, a);
        attach(&mut clients, &mut mon, b);
        let mut order = clients.arrangement_order(mon.clients_head);
        order.sort_by_key(|c| c.0);
        assert_eq!(order, vec![a, b]);

        detach(&mut clients, &mut mon, a);
        let remaining = clients.arrangement_order(mon.clients_head);
        assert_eq!(remaining, vec![b]);
    }

    #[test]
    fn detach_stack_reselects_topmost_visible() {
        let mut clients = Clients::new();
        let mut mon = new_mon();
        let a = clients.insert(Client::new(1, MonitorId(0), 1, Rect::new(0, 0, 1, 1), 0));
        let b = clients.insert(Client::new(2, MonitorId(0), 1, Rect::new(0, 0, 1, 1), 0));
        attach_stack(&mut clients, &mut mon, b);
        attach_stack(&mut clients, &mut mon, a);
        mon.selected = Some(a);
        mon.tagset[mon.sel_tags as usize] = 1;

        detach_stack(&mut clients, &mut mon, a);
        assert_eq!(mon.selected, Some(b));
    }
}
