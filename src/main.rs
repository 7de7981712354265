//! Entry point: argv handling, logging setup, and the startup/run/teardown
//! sequence (§6, §7).

#[macro_use]
extern crate log;

mod atom;
mod client;
mod config;
mod error;
mod event;
mod ewmh;
mod focus;
mod geometry;
mod interactive;
mod layout;
mod monitor;
mod spawn;
mod wm;

use env_logger::WriteStyle::Auto;
use wm::Wm;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage_and_exit() -> ! {
    eprintln!("usage: rdwm [-v]");
    std::process::exit(1);
}

fn main() {
    let mut args = std::env::args().skip(1);
    if let Some(arg) = args.next() {
        if arg == "-v" {
            println!("rdwm-{}", VERSION);
            std::process::exit(0);
        }
        print_usage_and_exit();
    }

    env_logger::builder()
        .format_timestamp(None)
        .write_style(Auto)
        .parse_default_env()
        .init();
    info!("starting rdwm {}", VERSION);

    let mut wm = match Wm::new() {
        Ok(wm) => wm,
        Err(e) => {
            error!("startup failed: {}", e);
            std::process::exit(1);
        }
    };

    spawn::install_sigchld_handler();
    wm.setup();
    wm.scan();
    spawn::run_autostart();
    wm.run();
    wm.cleanup();
    info!("exiting");
}
