// Optional logging: the `log` facade when the feature is on, nothing otherwise.
// Arguments are still type-checked in the disabled arm so no variable goes
// unused on no_std builds.

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ if false { ::core::mem::drop(::core::format_args!($($arg)*)); } }};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {{ if false { ::core::mem::drop(::core::format_args!($($arg)*)); } }};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ if false { ::core::mem::drop(::core::format_args!($($arg)*)); } }};
}
