//! Compile-time configuration. dwm keeps bindings, rules, and layout knobs
//! as constants in `config.h`; §1 makes that explicit as a Non-goal ("does
//! not parse configuration at runtime") so this module is the Rust
//! equivalent: plain `const`/`static` tables, no file I/O.
#![allow(dead_code)]

use x11::keysym::*;
use x11::xlib::{Button1, Button2, Button3, ControlMask, Mod1Mask, ShiftMask};

use crate::wm;

/// Workspace names, in bit order (tag `i` <-> bit `i`). `TAGS.len()` must be
/// `<= 32` so the set fits a `u32` bitmask.
pub const TAGS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

pub const TAGMASK: u32 = (1u32 << TAGS.len()) - 1;

pub const MODKEY: u32 = Mod1Mask;
/// Keysyms that realize `MODKEY` itself; releasing one of these (rather than
/// just releasing a tag key while it's held) ends combo mode (§4.4).
pub const MODKEY_KEYSYMS: &[u32] = &[XK_Alt_L, XK_Alt_R];

/// Master-stack tiling parameters (§4.5).
pub const MFACT: f32 = 0.55;
pub const NMASTER: u32 = 1;
pub const GAPPX: i32 = 6;
pub const BORDERPX: u32 = 1;
/// Pixel threshold for edge snapping and tiled->floating promotion in the
/// interactive loops (§4.7).
pub const SNAP: i32 = 32;

pub const SHOWBAR: bool = true;
pub const TOPBAR: bool = true;
/// `WM_CLASS` the dispatcher matches on `MapRequest` to recognize the
/// external status bar (§6).
pub const BAR_CLASS: &str = "dwmbar";
/// `WM_CLASS` the dispatcher matches on `MapRequest` to recognize a
/// systray window (e.g. `stalonetray`, `trayer`) (§6).
pub const TRAY_CLASS: &str = "dwmtray";

pub const BORDER_NORMAL: u64 = 0x44_4444;
pub const BORDER_SELECTED: u64 = 0x55_7799;
pub const BORDER_URGENT: u64 = 0xAA_3333;

/// Window-class/instance/title match -> placement rule (dwm's `rules[]`).
/// `tags_mask == 0` means "don't force tags, keep whatever `manage`
/// computed from the current monitor's active tagset".
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub class: Option<&'static str>,
    pub instance: Option<&'static str>,
    pub title: Option<&'static str>,
    pub tags_mask: u32,
    pub floating: bool,
    pub monitor: Option<usize>,
}

pub const RULES: &[Rule] = &[
    Rule {
        class: Some("Gimp"),
        instance: None,
        title: None,
        tags_mask: 0,
        floating: true,
        monitor: None,
    },
    Rule {
        class: Some(BAR_CLASS),
        instance: None,
        title: None,
        tags_mask: 0,
        floating: true,
        monitor: None,
    },
];

/// Payload passed to a bound action, modeled on dwm's `Arg` union as a Rust
/// enum instead (Design Notes: "no dynamic dispatch required", matched by
/// equality/shape rather than polymorphism).
#[derive(Debug, Clone, Copy)]
pub enum Arg {
    None,
    Int(i32),
    UInt(u32),
    Float(f32),
    Str(&'static str),
}

pub type Action = fn(&mut wm::Wm, &Arg);

#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    pub modifiers: u32,
    pub keysym: u32,
    pub func: Action,
    pub arg: Arg,
}

/// Regions a `ButtonPress` can land in (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickRegion {
    TagBar,
    StatusText,
    WinTitle,
    ClientWin,
    RootWin,
}

#[derive(Debug, Clone, Copy)]
pub struct ButtonBinding {
    pub click: ClickRegion,
    pub modifiers: u32,
    pub button: u32,
    pub func: Action,
    pub arg: Arg,
}

/// `MODKEY` + number -> view that tag, composing with any other tag held
/// down since the modifier was last pressed (`wm::comboview`, §4.4).
macro_rules! tagkeys {
    ($keysym:expr, $tag:expr) => {
        KeyBinding {
            modifiers: MODKEY,
            keysym: $keysym,
            func: wm::comboview,
            arg: Arg::UInt(1 << $tag),
        }
    };
}

/// `MODKEY|ShiftMask` + number -> move the selected client to that tag,
/// composing the same way (`wm::combotag`, §4.4).
macro_rules! tagkeys_shift {
    ($keysym:expr, $tag:expr) => {
        KeyBinding {
            modifiers: MODKEY | ShiftMask,
            keysym: $keysym,
            func: wm::combotag,
            arg: Arg::UInt(1 << $tag),
        }
    };
}

pub const KEYS: &[KeyBinding] = &[
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_Return,
        func: wm::spawn,
        arg: Arg::Str("xterm"),
    },
    KeyBinding {
        modifiers: MODKEY | ShiftMask,
        keysym: XK_c,
        func: wm::killclient,
        arg: Arg::None,
    },
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_j,
        func: wm::focus_stack,
        arg: Arg::Int(1),
    },
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_k,
        func: wm::focus_stack,
        arg: Arg::Int(-1),
    },
    KeyBinding {
        modifiers: MODKEY | ShiftMask,
        keysym: XK_Return,
        func: wm::zoom,
        arg: Arg::None,
    },
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_h,
        func: wm::setmfact,
        arg: Arg::Float(-0.05),
    },
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_l,
        func: wm::setmfact,
        arg: Arg::Float(0.05),
    },
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_i,
        func: wm::incnmaster,
        arg: Arg::Int(1),
    },
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_d,
        func: wm::incnmaster,
        arg: Arg::Int(-1),
    },
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_space,
        func: wm::togglefloating,
        arg: Arg::None,
    },
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_f,
        func: wm::togglefullscreen,
        arg: Arg::None,
    },
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_0,
        func: wm::view,
        arg: Arg::UInt(!0),
    },
    KeyBinding {
        modifiers: MODKEY,
        keysym: XK_Tab,
        func: wm::view,
        arg: Arg::UInt(0),
    },
    KeyBinding {
        modifiers: MODKEY | ControlMask,
        keysym: XK_comma,
        func: wm::focus_monitor,
        arg: Arg::Int(-1),
    },
    KeyBinding {
        modifiers: MODKEY | ControlMask,
        keysym: XK_period,
        func: wm::focus_monitor,
        arg: Arg::Int(1),
    },
    KeyBinding {
        modifiers: MODKEY | ShiftMask,
        keysym: XK_q,
        func: wm::quit,
        arg: Arg::None,
    },
    tagkeys!(XK_1, 0),
    tagkeys!(XK_2, 1),
    tagkeys!(XK_3, 2),
    tagkeys!(XK_4, 3),
    tagkeys!(XK_5, 4),
    tagkeys!(XK_6, 5),
    tagkeys!(XK_7, 6),
    tagkeys!(XK_8, 7),
    tagkeys!(XK_9, 8),
    tagkeys_shift!(XK_1, 0),
    tagkeys_shift!(XK_2, 1),
    tagkeys_shift!(XK_3, 2),
    tagkeys_shift!(XK_4, 3),
    tagkeys_shift!(XK_5, 4),
    tagkeys_shift!(XK_6, 5),
    tagkeys_shift!(XK_7, 6),
    tagkeys_shift!(XK_8, 7),
    tagkeys_shift!(XK_9, 8),
];

/// Clicks on `TagBar` carry `Arg::UInt(0)` here; the `ButtonPress` handler
/// overwrites it with `1 << clicked_tag` before invoking `func`, since which
/// tag was clicked depends on pointer position, not static configuration
/// (mirrors dwm's `buttons[]` + `ev->x`-driven override in `buttonpress`).
pub const BUTTONS: &[ButtonBinding] = &[
    ButtonBinding {
        click: ClickRegion::TagBar,
        modifiers: 0,
        button: Button1,
        func: wm::view,
        arg: Arg::UInt(0),
    },
    ButtonBinding {
        click: ClickRegion::TagBar,
        modifiers: 0,
        button: Button3,
        func: wm::toggle_view,
        arg: Arg::UInt(0),
    },
    ButtonBinding {
        click: ClickRegion::TagBar,
        modifiers: MODKEY,
        button: Button1,
        func: wm::tag,
        arg: Arg::UInt(0),
    },
    ButtonBinding {
        click: ClickRegion::TagBar,
        modifiers: MODKEY,
        button: Button3,
        func: wm::toggle_tag,
        arg: Arg::UInt(0),
    },
    ButtonBinding {
        click: ClickRegion::ClientWin,
        modifiers: MODKEY,
        button: Button1,
        func: wm::movemouse,
        arg: Arg::None,
    },
    ButtonBinding {
        click: ClickRegion::ClientWin,
        modifiers: MODKEY,
        button: Button2,
        func: wm::togglefloating,
        arg: Arg::None,
    },
    ButtonBinding {
        click: ClickRegion::ClientWin,
        modifiers: MODKEY,
        button: Button3,
        func: wm::resizemouse,
        arg: Arg::None,
    },
    ButtonBinding {
        click: ClickRegion::WinTitle,
        modifiers: 0,
        button: Button2,
        func: wm::zoom,
        arg: Arg::None,
    },
];
