//! Database schema definitions for Bomber.
//!
//! Uniqueness constraints here are what make achievement grants, daily
//! claims and equipment acquisition safe under retries and concurrent
//! submissions.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Player profiles (one per user)
CREATE TABLE IF NOT EXISTS profiles (
    user_id TEXT PRIMARY KEY,
    xp INTEGER NOT NULL DEFAULT 0 CHECK (xp >= 0),
    level INTEGER NOT NULL DEFAULT 1,
    division TEXT NOT NULL DEFAULT 'bronze',
    coins INTEGER NOT NULL DEFAULT 0 CHECK (coins >= 0),
    gems INTEGER NOT NULL DEFAULT 0 CHECK (gems >= 0),
    total_drives INTEGER NOT NULL DEFAULT 0,
    night_drives INTEGER NOT NULL DEFAULT 0,
    best_distance INTEGER NOT NULL DEFAULT 0,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_played_date TEXT,
    last_daily_reward_at TEXT,
    equipped_driver_id TEXT,
    equipped_ball_id TEXT,
    chests_opened INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Equipment ownership (a row exists iff the item is owned)
CREATE TABLE IF NOT EXISTS equipment_ownership (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(user_id),
    equipment_id TEXT NOT NULL,
    equipment_type TEXT NOT NULL,
    rarity TEXT NOT NULL,
    level INTEGER NOT NULL DEFAULT 1,
    duplicates_owned INTEGER NOT NULL DEFAULT 0,
    acquired_at TEXT NOT NULL,
    UNIQUE(user_id, equipment_id)
);

CREATE INDEX IF NOT EXISTS idx_equipment_user ON equipment_ownership(user_id);

-- Reward chests; contents are written exactly once, at open time
CREATE TABLE IF NOT EXISTS chests (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(user_id),
    chest_type TEXT NOT NULL,
    source TEXT NOT NULL,
    earned_at TEXT NOT NULL,
    opened_at TEXT,
    contents_json TEXT,
    CHECK ((opened_at IS NULL) = (contents_json IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_chests_user ON chests(user_id);

-- Append-only drive log backing the leaderboard
CREATE TABLE IF NOT EXISTS drives (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    user_id TEXT NOT NULL REFERENCES profiles(user_id),
    distance INTEGER NOT NULL,
    ball_speed REAL NOT NULL,
    launch_angle REAL NOT NULL,
    wind REAL NOT NULL,
    night_mode INTEGER NOT NULL DEFAULT 0,
    venue_id TEXT NOT NULL,
    driver_id TEXT NOT NULL,
    ball_id TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_drives_ranking ON drives(distance DESC, recorded_at ASC, seq ASC);
CREATE INDEX IF NOT EXISTS idx_drives_user ON drives(user_id);

-- Achievement unlocks (at most one per user and achievement)
CREATE TABLE IF NOT EXISTS achievement_unlocks (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(user_id),
    achievement_id TEXT NOT NULL,
    unlocked_at TEXT NOT NULL,
    UNIQUE(user_id, achievement_id)
);

-- Daily challenge claims (at most one per user and date)
CREATE TABLE IF NOT EXISTS daily_challenge_claims (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(user_id),
    challenge_date TEXT NOT NULL,
    challenge_id TEXT NOT NULL,
    reward_json TEXT NOT NULL,
    claimed_at TEXT NOT NULL,
    UNIQUE(user_id, challenge_date)
);
"#;

/// Schema version table
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
