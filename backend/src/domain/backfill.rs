//! Fire-and-forget repair of membership linkage.
//!
//! When a resolver infers a user's team from a secondary source it records
//! that linkage in the primary sources, so the next resolution short-circuits
//! earlier. Writes run as detached tasks and their failures are logged and
//! discarded; the value already returned to the caller never depends on them.
//! Every write is an idempotent update or conflict-ignoring upsert, so racing
//! resolutions for the same user converge.
//!
//! Writes are spawned on the runtime that built the [`Backfill`], not on the
//! runtime of the request that scheduled them. HTTP workers own short-lived
//! runtimes that are torn down at shutdown; the builder's runtime outlives
//! them and can drain the tracker.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use super::ports::{DirectoryError, TeamMembershipRepository, UserDirectory};
use super::{NewUserRecord, TeamId, UserId};

/// Schedules best-effort repair writes.
#[derive(Clone)]
pub struct Backfill {
    users: Arc<dyn UserDirectory>,
    memberships: Arc<dyn TeamMembershipRepository>,
    tracker: TaskTracker,
    runtime: Option<Handle>,
}

impl Backfill {
    /// Create a scheduler writing through the given ports. Called inside a
    /// runtime, that runtime hosts every write.
    pub fn new(
        users: Arc<dyn UserDirectory>,
        memberships: Arc<dyn TeamMembershipRepository>,
    ) -> Self {
        Self {
            users,
            memberships,
            tracker: TaskTracker::new(),
            runtime: Handle::try_current().ok(),
        }
    }

    /// Record that `user_id` belongs to `team_id` in both the legacy column
    /// and the membership table.
    pub fn record_team(&self, user_id: &UserId, team_id: &TeamId) {
        self.assign_team(user_id, team_id);
        self.link_membership(team_id, user_id);
    }

    /// Write `team_id` onto the user's row.
    pub fn assign_team(&self, user_id: &UserId, team_id: &TeamId) {
        let users = Arc::clone(&self.users);
        let user_id = user_id.clone();
        let team_id = team_id.clone();
        self.submit("assign_team", async move {
            users.assign_team(&user_id, &team_id).await
        });
    }

    /// Upsert the `(team_id, user_id)` membership row.
    pub fn link_membership(&self, team_id: &TeamId, user_id: &UserId) {
        let memberships = Arc::clone(&self.memberships);
        let user_id = user_id.clone();
        let team_id = team_id.clone();
        self.submit("link_membership", async move {
            memberships.link(&team_id, &user_id).await
        });
    }

    /// Create a minimal user row carrying its team.
    ///
    /// Environments without a `users.team_id` column reject the insert; the
    /// row is then inserted without the column and the team applied by a
    /// separate update.
    pub fn ensure_user(&self, record: NewUserRecord) {
        let users = Arc::clone(&self.users);
        self.submit("ensure_user", async move {
            insert_tolerating_missing_team_column(users.as_ref(), &record).await
        });
    }

    /// Wait for every scheduled write to finish.
    ///
    /// Used during shutdown so in-flight repairs are not cut off, and by
    /// tests that observe the repaired state.
    pub async fn settle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Number of writes still in flight.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    fn submit<F>(&self, operation: &'static str, write: F)
    where
        F: Future<Output = Result<(), DirectoryError>> + Send + 'static,
    {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            debug!(operation, "no async runtime available, skipping backfill");
            return;
        };
        self.tracker.spawn_on(
            async move {
                match write.await {
                    Ok(()) => debug!(operation, "backfill applied"),
                    Err(error) if error.is_schema_variance() => {
                        debug!(operation, %error, "backfill skipped on schema variance");
                    }
                    Err(error) => warn!(operation, %error, "backfill failed"),
                }
            },
            &runtime,
        );
    }
}

async fn insert_tolerating_missing_team_column(
    users: &dyn UserDirectory,
    record: &NewUserRecord,
) -> Result<(), DirectoryError> {
    match users.insert_user(record).await {
        Err(error) if error.is_missing_column() => {
            debug!(user_id = %record.id, "users.team_id missing, retrying insert without it");
            users.insert_user(&record.without_team()).await?;
            match &record.team_id {
                Some(team_id) => users.assign_team(&record.id, team_id).await,
                None => Ok(()),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockTeamMembershipRepository, MockUserDirectory};
    use crate::domain::{IdentityMetadata, Role, UserRecord};
    use crate::test_support::InMemoryDirectory;
    use mockall::predicate::eq;

    fn user() -> UserId {
        UserId::new("user-1").expect("user id")
    }

    fn team() -> TeamId {
        TeamId::new("team-1").expect("team id")
    }

    fn backfill(users: MockUserDirectory, memberships: MockTeamMembershipRepository) -> Backfill {
        Backfill::new(Arc::new(users), Arc::new(memberships))
    }

    #[tokio::test]
    async fn record_team_writes_both_sources() {
        let mut users = MockUserDirectory::new();
        users
            .expect_assign_team()
            .with(eq(user()), eq(team()))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut memberships = MockTeamMembershipRepository::new();
        memberships
            .expect_link()
            .with(eq(team()), eq(user()))
            .times(1)
            .returning(|_, _| Ok(()));

        let backfill = backfill(users, memberships);
        backfill.record_team(&user(), &team());
        backfill.settle().await;

        assert_eq!(backfill.pending(), 0);
    }

    #[tokio::test]
    async fn failed_writes_are_swallowed() {
        let mut users = MockUserDirectory::new();
        users
            .expect_assign_team()
            .times(1)
            .returning(|_, _| Err(DirectoryError::connection("refused")));
        let backfill = backfill(users, MockTeamMembershipRepository::new());

        backfill.assign_team(&user(), &team());
        backfill.settle().await;
    }

    #[tokio::test]
    async fn ensure_user_retries_without_missing_team_column() {
        let record = NewUserRecord::from_identity(user(), &IdentityMetadata::default(), team());
        let mut users = MockUserDirectory::new();
        let mut sequence = mockall::Sequence::new();
        users
            .expect_insert_user()
            .withf(|record| record.team_id.is_some())
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Err(DirectoryError::missing_column("users.team_id")));
        users
            .expect_insert_user()
            .withf(|record| record.team_id.is_none() && record.role == Role::from("member".to_owned()))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
        users
            .expect_assign_team()
            .with(eq(user()), eq(team()))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(()));

        let backfill = backfill(users, MockTeamMembershipRepository::new());
        backfill.ensure_user(record);
        backfill.settle().await;
    }

    #[tokio::test]
    async fn ensure_user_does_not_retry_other_failures() {
        let record = NewUserRecord::from_identity(user(), &IdentityMetadata::default(), team());
        let mut users = MockUserDirectory::new();
        users
            .expect_insert_user()
            .times(1)
            .returning(|_| Err(DirectoryError::query("duplicate key")));
        users.expect_assign_team().times(0);

        let backfill = backfill(users, MockTeamMembershipRepository::new());
        backfill.ensure_user(record);
        backfill.settle().await;
    }

    #[test]
    fn writes_without_runtime_are_skipped() {
        let mut users = MockUserDirectory::new();
        users.expect_assign_team().times(0);
        let backfill = backfill(users, MockTeamMembershipRepository::new());

        backfill.assign_team(&user(), &team());

        assert_eq!(backfill.pending(), 0);
    }

    #[tokio::test]
    async fn writes_outlive_the_runtime_that_scheduled_them() {
        let directory = Arc::new(InMemoryDirectory::new().with_user(UserRecord::new(user())));
        let ports = directory.ports();
        let backfill = Backfill::new(ports.users, ports.memberships);

        let scheduler = backfill.clone();
        std::thread::spawn(move || {
            let worker = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("worker runtime");
            worker.block_on(async { scheduler.assign_team(&user(), &team()) });
        })
        .join()
        .expect("worker thread");

        backfill.settle().await;

        let stored = directory.user(&user()).expect("user row");
        assert_eq!(stored.team_id, Some(team()));
    }

    #[test]
    fn writes_schedule_on_caller_runtime_when_built_outside_one() {
        let directory = Arc::new(InMemoryDirectory::new().with_user(UserRecord::new(user())));
        let ports = directory.ports();
        let backfill = Backfill::new(ports.users, ports.memberships);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        runtime.block_on(async {
            backfill.assign_team(&user(), &team());
            backfill.settle().await;
        });

        let stored = directory.user(&user()).expect("user row");
        assert_eq!(stored.team_id, Some(team()));
    }
}
