//! Error types for the handful of operations that have a meaningful failure
//! path. The event loop itself never returns these (see §7 of the design
//! notes): X protocol errors are filtered in the installed error handler,
//! not threaded through `Result`.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not open connection to X display")]
    OpenDisplay,

    #[error("another window manager is already running on this display")]
    AnotherWmRunning,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
