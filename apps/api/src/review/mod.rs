// Spaced-repetition review subsystem.
// Implements: the interval ladder, priority bucketing, due-item listing and
// progress upserts. The scheduling math lives in `schedule` and is pure;
// `service` wires it to the store.

pub mod handlers;
pub mod schedule;
pub mod service;
