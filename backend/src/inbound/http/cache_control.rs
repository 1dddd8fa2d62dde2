//! Shared cache-control policies for HTTP handlers.

/// User records are per-caller and change on every read.
pub const PRIVATE_NO_STORE: &str = "private, no-store";

/// Build the standard cache-control header tuple for user data responses.
pub const fn private_no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_STORE)
}
