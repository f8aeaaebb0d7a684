//! In-memory implementation of every driven port.
//!
//! The directory models the same partially migrated schema the Diesel
//! adapters face: tables can be dropped to simulate environments that predate
//! them, the `users.team_id` column can be removed, and any table can be made
//! to fail with a transient error.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    DirectoryError, IdentityProvider, IdentityProviderError, SeatGrantRepository,
    SubscriptionRepository, TeamInviteRepository, TeamMembershipRepository,
    TeamSettingsRepository, UserDirectory,
};
use crate::domain::{
    AccessPorts, IdentityMetadata, NewUserRecord, SubscriptionTier, TeamId, TeamInvite,
    TeamSettings, UserId, UserRecord,
};

/// Tables the directory can drop or fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// `users`
    Users,
    /// `team_members`
    TeamMembers,
    /// `team_seats`
    TeamSeats,
    /// `team_settings`
    TeamSettings,
    /// `team_invites`
    TeamInvites,
    /// `subscriptions`
    Subscriptions,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::TeamMembers => "team_members",
            Self::TeamSeats => "team_seats",
            Self::TeamSettings => "team_settings",
            Self::TeamInvites => "team_invites",
            Self::Subscriptions => "subscriptions",
        }
    }
}

#[derive(Default)]
struct DirectoryState {
    users: BTreeMap<UserId, UserRecord>,
    plans: HashMap<UserId, String>,
    memberships: Vec<(TeamId, UserId)>,
    seats: Vec<(UserId, UserId)>,
    team_settings: HashMap<TeamId, TeamSettings>,
    admin_settings: HashMap<UserId, TeamSettings>,
    invites: Vec<TeamInvite>,
    tiers: HashMap<UserId, SubscriptionTier>,
    identities: HashMap<UserId, IdentityMetadata>,
    dropped: HashSet<Table>,
    failing: HashSet<Table>,
    identity_failing: bool,
    team_column_dropped: bool,
    writes: usize,
}

impl DirectoryState {
    fn check(&self, table: Table) -> Result<(), DirectoryError> {
        if self.dropped.contains(&table) {
            return Err(DirectoryError::missing_relation(format!(
                "relation \"{}\" does not exist",
                table.name()
            )));
        }
        if self.failing.contains(&table) {
            return Err(DirectoryError::query(format!("{} unavailable", table.name())));
        }
        Ok(())
    }

    fn check_team_column(&self) -> Result<(), DirectoryError> {
        if self.team_column_dropped {
            return Err(DirectoryError::missing_column(
                "column \"team_id\" of relation \"users\" does not exist",
            ));
        }
        Ok(())
    }
}

/// Shared in-memory store; clone the `Arc` to hand it to several ports.
#[derive(Default)]
pub struct InMemoryDirectory {
    state: Mutex<DirectoryState>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, DirectoryState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Store a user row.
    pub fn with_user(self, record: UserRecord) -> Self {
        self.state().users.insert(record.id.clone(), record);
        self
    }

    /// Store a user's plan column.
    pub fn with_plan(self, user_id: &UserId, plan: &str) -> Self {
        self.state().plans.insert(user_id.clone(), plan.to_owned());
        self
    }

    /// Store a membership row.
    pub fn with_membership(self, team_id: &TeamId, user_id: &UserId) -> Self {
        self.state()
            .memberships
            .push((team_id.clone(), user_id.clone()));
        self
    }

    /// Store a seat grant billing `member_id` under `admin_id`.
    pub fn with_seat(self, admin_id: &UserId, member_id: &UserId) -> Self {
        self.state().seats.push((admin_id.clone(), member_id.clone()));
        self
    }

    /// Store a team-keyed settings row.
    pub fn with_team_settings(self, team_id: &TeamId, settings: TeamSettings) -> Self {
        self.state().team_settings.insert(team_id.clone(), settings);
        self
    }

    /// Store an admin-keyed settings row.
    pub fn with_admin_settings(self, admin_id: &UserId, settings: TeamSettings) -> Self {
        self.state().admin_settings.insert(admin_id.clone(), settings);
        self
    }

    /// Store an invite; later invites are more recent.
    pub fn with_invite(self, invite: TeamInvite) -> Self {
        self.state().invites.push(invite);
        self
    }

    /// Store a subscription tier.
    ///
    /// # Panics
    ///
    /// Panics when `tier` is blank.
    pub fn with_tier(self, user_id: &UserId, tier: &str) -> Self {
        let tier = SubscriptionTier::parse(tier)
            .unwrap_or_else(|| panic!("fixture tier must not be blank"));
        self.state().tiers.insert(user_id.clone(), tier);
        self
    }

    /// Store identity provider metadata for a principal.
    pub fn with_identity(self, user_id: &UserId, metadata: IdentityMetadata) -> Self {
        self.state().identities.insert(user_id.clone(), metadata);
        self
    }

    /// Simulate an environment where the table does not exist.
    pub fn without_table(self, table: Table) -> Self {
        self.state().dropped.insert(table);
        self
    }

    /// Simulate an environment where `users.team_id` does not exist.
    pub fn without_team_column(self) -> Self {
        self.state().team_column_dropped = true;
        self
    }

    /// Make every operation on the table fail transiently.
    pub fn failing(self, table: Table) -> Self {
        self.state().failing.insert(table);
        self
    }

    /// Make every identity provider lookup fail.
    pub fn failing_identity(self) -> Self {
        self.state().identity_failing = true;
        self
    }

    /// Current user row, bypassing failure injection.
    pub fn user(&self, user_id: &UserId) -> Option<UserRecord> {
        self.state().users.get(user_id).cloned()
    }

    /// Teams the user is linked to in the membership table.
    pub fn memberships_of(&self, user_id: &UserId) -> Vec<TeamId> {
        self.state()
            .memberships
            .iter()
            .filter(|(_, member)| member == user_id)
            .map(|(team, _)| team.clone())
            .collect()
    }

    /// Number of mutations applied so far.
    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Expose this directory through every driven port.
    pub fn ports(self: &Arc<Self>) -> AccessPorts {
        AccessPorts {
            users: Arc::clone(self) as Arc<dyn UserDirectory>,
            memberships: Arc::clone(self) as Arc<dyn TeamMembershipRepository>,
            seat_grants: Arc::clone(self) as Arc<dyn SeatGrantRepository>,
            settings: Arc::clone(self) as Arc<dyn TeamSettingsRepository>,
            invites: Arc::clone(self) as Arc<dyn TeamInviteRepository>,
            subscriptions: Arc::clone(self) as Arc<dyn SubscriptionRepository>,
            identity: Arc::clone(self) as Arc<dyn IdentityProvider>,
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, DirectoryError> {
        let state = self.state();
        state.check(Table::Users)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_plan(&self, id: &UserId) -> Result<Option<String>, DirectoryError> {
        let state = self.state();
        state.check(Table::Users)?;
        Ok(state.plans.get(id).cloned())
    }

    async fn list_team_members(&self, team_id: &TeamId) -> Result<Vec<UserId>, DirectoryError> {
        let state = self.state();
        state.check(Table::Users)?;
        state.check_team_column()?;
        Ok(state
            .users
            .values()
            .filter(|user| user.team_id.as_ref() == Some(team_id))
            .map(|user| user.id.clone())
            .collect())
    }

    async fn find_team_admin(
        &self,
        team_id: &TeamId,
        admin_roles: &[&'static str],
    ) -> Result<Option<UserId>, DirectoryError> {
        let state = self.state();
        state.check(Table::Users)?;
        state.check_team_column()?;
        Ok(state
            .users
            .values()
            .filter(|user| user.team_id.as_ref() == Some(team_id))
            .find(|user| user.role.as_ref().is_some_and(|role| role.is_one_of(admin_roles)))
            .map(|user| user.id.clone()))
    }

    async fn assign_team(&self, id: &UserId, team_id: &TeamId) -> Result<(), DirectoryError> {
        let mut state = self.state();
        state.check(Table::Users)?;
        state.check_team_column()?;
        if let Some(user) = state.users.get_mut(id) {
            user.team_id = Some(team_id.clone());
            state.writes += 1;
        }
        Ok(())
    }

    async fn insert_user(&self, record: &NewUserRecord) -> Result<(), DirectoryError> {
        let mut state = self.state();
        state.check(Table::Users)?;
        if record.team_id.is_some() {
            state.check_team_column()?;
        }
        if state.users.contains_key(&record.id) {
            return Ok(());
        }
        let user = UserRecord {
            id: record.id.clone(),
            team_id: record.team_id.clone(),
            role: Some(record.role.clone()),
            email: record.email.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
        };
        state.users.insert(record.id.clone(), user);
        state.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl TeamMembershipRepository for InMemoryDirectory {
    async fn find_team_for_user(&self, user_id: &UserId) -> Result<Option<TeamId>, DirectoryError> {
        let state = self.state();
        state.check(Table::TeamMembers)?;
        Ok(state
            .memberships
            .iter()
            .find(|(_, member)| member == user_id)
            .map(|(team, _)| team.clone()))
    }

    async fn list_members(&self, team_id: &TeamId) -> Result<Vec<UserId>, DirectoryError> {
        let state = self.state();
        state.check(Table::TeamMembers)?;
        Ok(state
            .memberships
            .iter()
            .filter(|(team, _)| team == team_id)
            .map(|(_, member)| member.clone())
            .collect())
    }

    async fn link(&self, team_id: &TeamId, user_id: &UserId) -> Result<(), DirectoryError> {
        let mut state = self.state();
        state.check(Table::TeamMembers)?;
        let pair = (team_id.clone(), user_id.clone());
        if !state.memberships.contains(&pair) {
            state.memberships.push(pair);
            state.writes += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl SeatGrantRepository for InMemoryDirectory {
    async fn find_admin_for_member(
        &self,
        member_id: &UserId,
    ) -> Result<Option<UserId>, DirectoryError> {
        let state = self.state();
        state.check(Table::TeamSeats)?;
        Ok(state
            .seats
            .iter()
            .find(|(_, member)| member == member_id)
            .map(|(admin, _)| admin.clone()))
    }

    async fn list_members_for_admin(&self, admin_id: &UserId) -> Result<Vec<UserId>, DirectoryError> {
        let state = self.state();
        state.check(Table::TeamSeats)?;
        let members: BTreeSet<UserId> = state
            .seats
            .iter()
            .filter(|(admin, _)| admin == admin_id)
            .map(|(_, member)| member.clone())
            .collect();
        Ok(members.into_iter().collect())
    }
}

#[async_trait]
impl TeamSettingsRepository for InMemoryDirectory {
    async fn find_by_team(&self, team_id: &TeamId) -> Result<Option<TeamSettings>, DirectoryError> {
        let state = self.state();
        state.check(Table::TeamSettings)?;
        Ok(state.team_settings.get(team_id).copied())
    }

    async fn find_by_admin(
        &self,
        admin_id: &UserId,
    ) -> Result<Option<TeamSettings>, DirectoryError> {
        let state = self.state();
        state.check(Table::TeamSettings)?;
        Ok(state.admin_settings.get(admin_id).copied())
    }
}

#[async_trait]
impl TeamInviteRepository for InMemoryDirectory {
    async fn latest_for_email(&self, email: &str) -> Result<Option<TeamInvite>, DirectoryError> {
        let state = self.state();
        state.check(Table::TeamInvites)?;
        Ok(state
            .invites
            .iter()
            .rev()
            .find(|invite| invite.email == email)
            .cloned())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryDirectory {
    async fn find_tier(&self, user_id: &UserId) -> Result<Option<SubscriptionTier>, DirectoryError> {
        let state = self.state();
        state.check(Table::Subscriptions)?;
        Ok(state.tiers.get(user_id).cloned())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryDirectory {
    async fn fetch_metadata(
        &self,
        user_id: &UserId,
    ) -> Result<Option<IdentityMetadata>, IdentityProviderError> {
        let state = self.state();
        if state.identity_failing {
            return Err(IdentityProviderError::transport("identity provider offline"));
        }
        Ok(state.identities.get(user_id).cloned())
    }
}
