/// Upper bound of a single location request.
pub const POLL_TIMEOUT_MILLIS: u64 = 200;
/// Pause between consecutive location requests.
pub const POLL_DELAY_MILLIS: u64 = 200;
