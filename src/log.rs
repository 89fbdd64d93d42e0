// Logging shims.
//
// Forward to `tracing` when the `tracing` feature is enabled and compile to
// nothing otherwise, so call sites need no `cfg` of their own.

macro_rules! trace {
    ($($t:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($t)*);
    };
}

macro_rules! debug {
    ($($t:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($t)*);
    };
}

macro_rules! warning {
    ($($t:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($t)*);
    };
}

macro_rules! error {
    ($($t:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!($($t)*);
    };
}

// `warn` would collide with the built-in lint attribute.
pub(crate) use {debug, error, trace, warning};
