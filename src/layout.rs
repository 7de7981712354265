//! Master-stack tiling with gaps (§4.5).

use crate::client::{ClientId, Clients};
use crate::geometry::Rect;
use crate::monitor::Monitor;

/// Compute tiled geometry for every visible, non-floating client on `mon`,
/// in arrangement order. Returns `(ClientId, Rect)` pairs; the caller is
/// responsible for running each through `apply_size_hints` and issuing the
/// X configure (this module only does arithmetic, matching dwm's `tile()`
/// separated from `resize()`).
///
/// Boundary behaviors (§8): an empty monitor yields no rectangles; with
/// `nmaster == 0` the master column has zero width and every client goes to
/// the stack column.
pub fn tile(mon: &Monitor, clients: &Clients) -> Vec<(ClientId, Rect)> {
    let visible = mon.tiled_clients(clients);
    let n = visible.len();
    if n == 0 {
        return Vec::new();
    }

    let gap = mon.gappx;
    let work = mon.work;
    let nmaster = (mon.nmaster as usize).min(n);

    let master_w = if n > nmaster {
        ((work.w as f32) * mon.mfact) as i32
    } else {
        work.w
    };

    let mut out = Vec::with_capacity(n);
    let mut master_y = work.y + gap;
    let mut stack_y = work.y + gap;
    let master_remaining_h = work.h - gap;
    let stack_remaining_h = work.h - gap;

    for (i, &id) in visible.iter().enumerate() {
        if i < nmaster {
            let remaining = nmaster - i;
            let h = (master_remaining_h - (master_y - (work.y + gap))) / remaining as i32 - gap;
            let w = if nmaster == n { work.w - 2 * gap } else { master_w - gap - gap / 2 };
            let r = Rect::new(work.x + gap, master_y, w, h);
            master_y += h + gap;
            out.push((id, r));
        } else {
            let remaining = n - i;
            let h = (stack_remaining_h - (stack_y - (work.y + gap))) / remaining as i32 - gap;
            let stack_x = if nmaster == 0 {
                work.x + gap
            } else {
                work.x + master_w + gap / 2
            };
            let stack_w = if nmaster == 0 {
                work.w - 2 * gap
            } else {
                work.w - master_w - gap - gap / 2
            };
            let r = Rect::new(stack_x, stack_y, stack_w, h);
            stack_y += h + gap;
            out.push((id, r));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{attach, Client};
    use crate::monitor::MonitorId;

    fn mon_with(n: usize, nmaster: u32) -> (Monitor, Clients) {
        let mut mon = Monitor::new(0, Rect::new(0, 0, 1920, 1080));
        mon.update_work_area(false, false);
        mon.nmaster = nmaster;
        mon.gappx = 10;
        mon.mfact = 0.55;
        let mut clients = Clients::new();
        for _ in 0..n {
            let id = clients.insert(Client::new(0, MonitorId(0), 1, Rect::new(0, 0, 1, 1), 0));
            attach(&mut clients, &mut mon, id);
        }
        (mon, clients)
    }

    #[test]
    fn empty_monitor_is_noop() {
        let (mon, clients) = mon_with(0, 1);
        assert!(tile(&mon, &clients).is_empty());
    }

    #[test]
    fn n_le_nmaster_uses_full_width() {
        let (mon, clients) = mon_with(1, 1);
        let result = tile(&mon, &clients);
        assert_eq!(result.len(), 1);
        let (_, r) = result[0];
        assert_eq!(r.w, mon.work.w - 2 * mon.gappx);
    }

    #[test]
    fn zero_nmaster_puts_single_client_in_stack() {
        let (mon, clients) = mon_with(1, 0);
        let result = tile(&mon, &clients);
        assert_eq!(result.len(), 1);
        let (_, r) = result[0];
        assert_eq!(r.x, mon.work.x + mon.gappx);
        assert_eq!(r.w, mon.work.w - 2 * mon.gappx);
    }

    #[test]
    fn scenario_two_clients_master_stack_placement() {
        let mut mon = Monitor::new(0, Rect::new(0, 0, 1920, 1080));
        mon.gappx = 10;
        mon.mfact = 0.55;
        mon.nmaster = 1;
        mon.update_work_area(false, false);
        let mut clients = Clients::new();
        let a = clients.insert(Client::new(1, MonitorId(0), 1, Rect::new(0, 0, 1, 1), 0));
        let b = clients.insert(Client::new(2, MonitorId(0), 1, Rect::new(0, 0, 1, 1), 0));
        attach(&mut clients, &mut mon, a);
        attach(&mut clients, &mut mon, b);

        let result = tile(&mon, &clients);
        assert_eq!(result.len(), 2);
        let (master_id, master) = result[0];
        let (stack_id, stack) = result[1];
        assert_ne!(master_id, stack_id);

        assert_eq!(master.x, 10);
        assert_eq!(master.y, 10);
        assert!(master.w > 1000 && master.w < 1060);
        assert_eq!(master.h, 1060);

        assert!(stack.x >= master.x + master.w);
        assert!(stack.x + stack.w <= mon.work.x + mon.work.w);
        assert_eq!(stack.h, 1060);
    }

    #[test]
    fn master_and_stack_are_contained_and_non_overlapping() {
        let (mon, clients) = mon_with(2, 1);
        let result = tile(&mon, &clients);
        assert_eq!(result.len(), 2);
        let (_, master) = result[0];
        let (_, stack) = result[1];
        assert!(master.x + master.w <= stack.x);
        assert!(master.x >= mon.work.x);
        assert!(stack.x + stack.w <= mon.work.x + mon.work.w);
    }
}
