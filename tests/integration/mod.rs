//! Integration test modules.

mod chest_opening_test;
mod concurrency_test;
mod daily_challenge_test;
mod submission_test;
