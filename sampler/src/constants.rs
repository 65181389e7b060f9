pub const DEFAULT_SAMPLING_PERIOD_MILLIS: u64 = 100;
