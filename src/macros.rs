//! Small crate-wide convenience macros.
//!
//! The logging macros write to the browser console when compiled for
//! `wasm32`.  On native targets (unit tests) the `web_sys` console imports
//! are unavailable, so the same calls go to stderr instead.

/// Debug-level log line.  Compiled out of release builds.
///
/// ```rust,ignore
/// debug_log!("Fetched {} threads", threads.len());
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::log_1(&format!($($arg)*).into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("[debug] {}", format!($($arg)*));
        }
    };
}

/// Warning-level log line.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::warn_1(&format!($($arg)*).into());
        #[cfg(not(target_arch = "wasm32"))]
        eprintln!("[warn] {}", format!($($arg)*));
    }};
}

/// Error-level log line.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::error_1(&format!($($arg)*).into());
        #[cfg(not(target_arch = "wasm32"))]
        eprintln!("[error] {}", format!($($arg)*));
    }};
}

/// `RefCell::borrow_mut` under a name that stands out at call sites.
/// Used for the global `APP_STATE`; a nested borrow panics.
#[macro_export]
macro_rules! mut_borrow {
    ($cell:expr) => {
        $cell.borrow_mut()
    };
}
