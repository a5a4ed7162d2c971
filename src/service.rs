//! Request-level facade over the engine.
//!
//! Every call checks the account directory first, then runs against the
//! store. Writes go through one immediate transaction each; the service
//! holds no player state of its own.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::accounts::AccountDirectory;
use crate::achievements::evaluator::{AchievementEvaluator, AchievementUnlock};
use crate::catalog::venues::{venue_statuses, VenueProgress, VenueStatus};
use crate::challenges::tracker::{ChallengeTracker, ClaimOutcome, DailyChallengeStatus};
use crate::error::{BomberError, BomberResult};
use crate::leaderboards::rankings::{
    DriveRecord, LeaderboardEntry, LeaderboardFilter, LeaderboardManager, RankStatus,
};
use crate::ledger::manager::LedgerManager;
use crate::ledger::types::{EquipmentOwnership, PlayerProfile, ProfileView};
use crate::rewards::chests::{Chest, ChestManager, OpenedChest};
use crate::storage::config::AppConfig;
use crate::storage::database::Database;
use crate::submission::orchestrator::{self, SubmissionResult};
use crate::submission::validation::RawDriveEvent;

/// Source of "now" for every time-dependent call.
pub type Clock = fn() -> DateTime<Utc>;

/// The progression and rewards service.
pub struct BomberService<A: AccountDirectory> {
    db: Database,
    config: AppConfig,
    accounts: A,
    clock: Clock,
}

impl<A: AccountDirectory> BomberService<A> {
    /// Wrap an open database.
    pub fn new(db: Database, config: AppConfig, accounts: A) -> Self {
        Self {
            db,
            config,
            accounts,
            clock: Utc::now,
        }
    }

    /// Open the database named by the config.
    pub fn open(config: AppConfig, accounts: A) -> BomberResult<Self> {
        let path = config.database.resolved_path();
        let db = Database::open_with(&path, &config.database)?;
        tracing::info!("Opened Bomber store at {:?}", path);
        Ok(Self::new(db, config, accounts))
    }

    /// Replace the wall clock, e.g. with a fixed instant in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn ensure_account(&self, user_id: Uuid) -> BomberResult<()> {
        if self.accounts.exists(user_id) {
            Ok(())
        } else {
            Err(BomberError::NotFound(format!("user {}", user_id)))
        }
    }

    /// Profile with derived level and division. Known players who have not
    /// driven yet get the starting profile without it being stored.
    pub fn profile(&self, user_id: Uuid) -> BomberResult<ProfileView> {
        self.ensure_account(user_id)?;
        LedgerManager::new(self.db.connection(), &self.config).view(user_id, self.now())
    }

    /// Book one drive.
    pub fn submit_drive(
        &mut self,
        user_id: Uuid,
        event: &RawDriveEvent,
    ) -> BomberResult<SubmissionResult> {
        self.ensure_account(user_id)?;
        let now = self.now();
        orchestrator::submit_drive(&mut self.db, &self.config, user_id, event, now)
    }

    /// Top `n` drives, with usernames filled in.
    pub fn leaderboard(
        &self,
        n: usize,
        filter: &LeaderboardFilter,
    ) -> BomberResult<Vec<LeaderboardEntry>> {
        let mut entries =
            LeaderboardManager::new(self.db.connection()).top_n(n, filter, self.now())?;
        for entry in &mut entries {
            entry.username = self.accounts.username(entry.drive.user_id);
        }
        Ok(entries)
    }

    pub fn rank(&self, user_id: Uuid, filter: &LeaderboardFilter) -> BomberResult<RankStatus> {
        self.ensure_account(user_id)?;
        LeaderboardManager::new(self.db.connection()).rank_of(user_id, filter, self.now())
    }

    pub fn personal_top(&self, user_id: Uuid, n: usize) -> BomberResult<Vec<DriveRecord>> {
        self.ensure_account(user_id)?;
        LeaderboardManager::new(self.db.connection()).personal_top(user_id, n)
    }

    /// Unlocked achievements, oldest first.
    pub fn achievements(&self, user_id: Uuid) -> BomberResult<Vec<AchievementUnlock>> {
        self.ensure_account(user_id)?;
        AchievementEvaluator::new(self.db.connection(), &self.config).unlocked(user_id)
    }

    /// Every venue with its unlock state for the player.
    pub fn venues(&self, user_id: Uuid) -> BomberResult<Vec<VenueStatus>> {
        let view = self.profile(user_id)?;
        Ok(venue_statuses(&VenueProgress {
            xp: view.profile.xp,
            level: view.level.level,
            total_drives: view.profile.total_drives,
        }))
    }

    pub fn chests(&self, user_id: Uuid) -> BomberResult<Vec<Chest>> {
        self.ensure_account(user_id)?;
        ChestManager::new(self.db.connection(), &self.config).list(user_id)
    }

    /// Open a chest; opening it again returns the same contents.
    pub fn open_chest(&mut self, user_id: Uuid, chest_id: Uuid) -> BomberResult<OpenedChest> {
        self.ensure_account(user_id)?;
        let now = self.now();
        let config = &self.config;
        self.db
            .run_transaction(|tx| ChestManager::new(tx, config).open(user_id, chest_id, now))
    }

    /// Today's challenge and the player's claim, if any.
    pub fn daily_challenge(&self, user_id: Uuid) -> BomberResult<DailyChallengeStatus> {
        self.ensure_account(user_id)?;
        let today = self.now().date_naive();
        ChallengeTracker::new(self.db.connection(), &self.config).status(user_id, today)
    }

    /// Claim today's challenge with any drive already booked today.
    pub fn claim_daily_challenge(&mut self, user_id: Uuid) -> BomberResult<ClaimOutcome> {
        self.ensure_account(user_id)?;
        let now = self.now();
        let config = &self.config;
        self.db.run_transaction(|tx| {
            ChallengeTracker::new(tx, config).claim_from_history(user_id, now.date_naive(), now)
        })
    }

    pub fn equip(&mut self, user_id: Uuid, equipment_id: &str) -> BomberResult<PlayerProfile> {
        self.ensure_account(user_id)?;
        let now = self.now();
        let config = &self.config;
        self.db
            .run_transaction(|tx| LedgerManager::new(tx, config).equip(user_id, equipment_id, now))
    }

    /// Spend coins to raise an owned item one level.
    pub fn upgrade(
        &mut self,
        user_id: Uuid,
        equipment_id: &str,
    ) -> BomberResult<EquipmentOwnership> {
        self.ensure_account(user_id)?;
        let now = self.now();
        let config = &self.config;
        self.db.run_transaction(|tx| {
            LedgerManager::new(tx, config).upgrade_equipment(user_id, equipment_id, now)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::InMemoryAccounts;
    use crate::catalog::venues::DEFAULT_VENUE_ID;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()
    }

    fn service() -> (BomberService<InMemoryAccounts>, Uuid) {
        let user = Uuid::new_v4();
        let mut accounts = InMemoryAccounts::new();
        accounts.insert(user, "bomber_one");
        let svc = BomberService::new(
            Database::open_in_memory().unwrap(),
            AppConfig::default(),
            accounts,
        )
        .with_clock(fixed_now);
        (svc, user)
    }

    fn drive(distance: f64) -> RawDriveEvent {
        RawDriveEvent {
            distance,
            ball_speed: 150.0,
            launch_angle: 12.0,
            wind: 0.0,
            night_mode: false,
            venue_id: DEFAULT_VENUE_ID.to_string(),
            equipment_used: None,
        }
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let (mut svc, _) = service();
        let stranger = Uuid::new_v4();
        assert!(matches!(
            svc.submit_drive(stranger, &drive(250.0)),
            Err(BomberError::NotFound(_))
        ));
        assert!(matches!(svc.profile(stranger), Err(BomberError::NotFound(_))));
    }

    #[test]
    fn test_profile_before_first_drive() {
        let (svc, user) = service();
        let view = svc.profile(user).unwrap();
        assert_eq!(view.profile.xp, 0);
        assert_eq!(view.level.level, 1);
        assert_eq!(view.division.id, "bronze");
        assert_eq!(view.equipment.len(), 2);
    }

    #[test]
    fn test_leaderboard_has_usernames() {
        let (mut svc, user) = service();
        svc.submit_drive(user, &drive(280.0)).unwrap();

        let board = svc.leaderboard(10, &LeaderboardFilter::default()).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].username.as_deref(), Some("bomber_one"));
        assert_eq!(
            svc.rank(user, &LeaderboardFilter::default()).unwrap().rank(),
            Some(1)
        );
    }

    #[test]
    fn test_venues_follow_progress() {
        let (mut svc, user) = service();
        let locked = |svc: &BomberService<InMemoryAccounts>| {
            svc.venues(user)
                .unwrap()
                .into_iter()
                .find(|s| s.venue.id == "links_course")
                .map(|s| s.unlocked)
        };
        assert_eq!(locked(&svc), Some(false));

        for _ in 0..10 {
            svc.submit_drive(user, &drive(200.0)).unwrap();
        }
        assert_eq!(locked(&svc), Some(true));
    }

    #[test]
    fn test_level_up_chest_can_be_opened() {
        let (mut svc, user) = service();
        // 350 yd gives 70 XP; two drives pass the 100 XP mark
        svc.submit_drive(user, &drive(350.0)).unwrap();
        let result = svc.submit_drive(user, &drive(350.0)).unwrap();
        assert!(result.level_up.is_some());

        let chest = svc
            .chests(user)
            .unwrap()
            .into_iter()
            .find(|c| c.source == "level_up:2")
            .unwrap();
        let first = svc.open_chest(user, chest.id).unwrap();
        let again = svc.open_chest(user, chest.id).unwrap();
        assert!(first.newly_opened);
        assert!(!again.newly_opened);
        assert_eq!(first.contents, again.contents);
    }
}
