//! Unit test modules.

mod catalog_test;
mod chest_roll_test;
mod leaderboard_test;
mod progression_test;
