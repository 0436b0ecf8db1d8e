//! Span definitions per operation: refresh cycle, sub-fetch, live update, authorization.

/// Create a refresh-cycle span.
#[macro_export]
macro_rules! refresh_span {
    ($cycle_id:expr) => {
        tracing::info_span!("vitals.refresh", cycle_id = $cycle_id)
    };
}

/// Create a sub-fetch span.
#[macro_export]
macro_rules! fetch_span {
    ($kind:expr) => {
        tracing::debug_span!("vitals.fetch", kind = %$kind)
    };
}

/// Create a live-update span.
#[macro_export]
macro_rules! live_update_span {
    ($kind:expr) => {
        tracing::info_span!("vitals.live_update", kind = %$kind)
    };
}

/// Create an authorization span.
#[macro_export]
macro_rules! authorization_span {
    () => {
        tracing::info_span!("vitals.authorization")
    };
}

