//! Tests for the sharing scope resolver.

use std::collections::HashSet;
use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockSeatGrantRepository, MockTeamContextQuery, MockTeamMembershipRepository,
    MockTeamSettingsRepository, MockUserDirectory,
};
use crate::domain::{TeamContext, UserRecord};
use crate::test_support::{InMemoryDirectory, Table, team_id, user_id};

fn context_of(team: Option<&str>, role: Option<&str>) -> MockTeamContextQuery {
    let context = TeamContext::new(team.map(team_id), role.and_then(Role::parse));
    let mut query = MockTeamContextQuery::new();
    query
        .expect_resolve_context()
        .returning(move |_| context.clone());
    query
}

fn resolver_over(
    directory: &Arc<InMemoryDirectory>,
    context: MockTeamContextQuery,
) -> SharingScopeResolver {
    let ports = directory.ports();
    SharingScopeResolver::new(
        Arc::new(context),
        ports.users,
        ports.memberships,
        ports.seat_grants,
        ports.settings,
    )
}

fn settings(share_deals: bool, share_deals_members: bool) -> TeamSettings {
    TeamSettings {
        share_deals,
        share_deals_members,
    }
}

/// Team T1 with three members on the legacy column, one of them the admin.
fn team_t1() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_user(
            UserRecord::new(user_id("admin"))
                .with_team(team_id("T1"))
                .with_role("admin"),
        )
        .with_user(
            UserRecord::new(user_id("mia"))
                .with_team(team_id("T1"))
                .with_role("member"),
        )
        .with_user(
            UserRecord::new(user_id("noah"))
                .with_team(team_id("T1"))
                .with_role("member"),
        )
        .with_user(UserRecord::new(user_id("outsider")).with_team(team_id("T9")))
}

fn ids(raw: &[&str]) -> Vec<UserId> {
    raw.iter().copied().map(user_id).collect()
}

#[tokio::test]
async fn member_without_settings_row_sees_whole_team() {
    let directory = Arc::new(team_t1());
    let resolver = resolver_over(&directory, context_of(Some("T1"), Some("member")));

    let scope = resolver.resolve(&user_id("mia")).await;

    assert!(scope.share_deals);
    assert!(scope.share_deals_members);
    assert_eq!(scope.team_id, Some(team_id("T1")));
    assert_eq!(scope.visible_owner_ids, ids(&["mia", "admin", "noah"]));
}

#[tokio::test]
async fn membership_table_and_legacy_column_are_unioned() {
    let directory = Arc::new(
        team_t1()
            .with_user(UserRecord::new(user_id("olga")))
            .with_membership(&team_id("T1"), &user_id("olga"))
            .with_membership(&team_id("T1"), &user_id("mia")),
    );
    let resolver = resolver_over(&directory, context_of(Some("T1"), Some("member")));

    let scope = resolver.resolve(&user_id("mia")).await;

    let unique: HashSet<_> = scope.visible_owner_ids.iter().collect();
    assert_eq!(unique.len(), scope.visible_owner_ids.len());
    assert_eq!(scope.visible_owner_ids, ids(&["mia", "admin", "noah", "olga"]));
}

#[rstest]
#[case(Some("member"))]
#[case(Some("admin"))]
#[case(None)]
#[tokio::test]
async fn sharing_off_restricts_everyone_to_self(#[case] role: Option<&str>) {
    let directory = Arc::new(team_t1().with_team_settings(&team_id("T1"), settings(false, true)));
    let resolver = resolver_over(&directory, context_of(Some("T1"), role));

    let scope = resolver.resolve(&user_id("mia")).await;

    assert!(!scope.share_deals);
    assert_eq!(scope.team_id, Some(team_id("T1")));
    assert_eq!(scope.visible_owner_ids, ids(&["mia"]));
}

#[tokio::test]
async fn member_sharing_off_restricts_members_only() {
    let directory = Arc::new(team_t1().with_team_settings(&team_id("T1"), settings(true, false)));

    let member_scope = resolver_over(&directory, context_of(Some("T1"), Some("member")))
        .resolve(&user_id("mia"))
        .await;
    let admin_scope = resolver_over(&directory, context_of(Some("T1"), Some("Admin")))
        .resolve(&user_id("admin"))
        .await;

    assert_eq!(member_scope.visible_owner_ids, ids(&["mia"]));
    assert!(!member_scope.share_deals_members);
    assert_eq!(admin_scope.visible_owner_ids, ids(&["admin", "mia", "noah"]));
}

#[tokio::test]
async fn admin_keyed_settings_apply_when_team_row_missing() {
    let directory = Arc::new(
        team_t1().with_admin_settings(&user_id("admin"), settings(false, false)),
    );
    let resolver = resolver_over(&directory, context_of(Some("T1"), Some("member")));

    let scope = resolver.resolve(&user_id("noah")).await;

    assert!(!scope.share_deals);
    assert_eq!(scope.team_admin_id, Some(user_id("admin")));
    assert_eq!(scope.visible_owner_ids, ids(&["noah"]));
}

#[tokio::test]
async fn team_row_takes_precedence_over_admin_row() {
    let directory = Arc::new(
        team_t1()
            .with_team_settings(&team_id("T1"), settings(true, true))
            .with_admin_settings(&user_id("admin"), settings(false, false)),
    );
    let resolver = resolver_over(&directory, context_of(Some("T1"), Some("member")));

    let scope = resolver.resolve(&user_id("noah")).await;

    assert!(scope.share_deals);
    assert_eq!(scope.team_admin_id, None);
    assert_eq!(scope.visible_owner_ids.len(), 3);
}

#[tokio::test]
async fn no_team_and_no_seat_is_self_only() {
    let directory = Arc::new(InMemoryDirectory::new());
    let resolver = resolver_over(&directory, context_of(None, Some("member")));

    let scope = resolver.resolve(&user_id("solo")).await;

    assert_eq!(
        scope,
        SharingScope {
            role: Role::parse("member"),
            ..SharingScope::self_only(&user_id("solo"))
        }
    );
}

#[tokio::test]
async fn seat_admin_anchors_scope_without_team() {
    let admin = user_id("A1");
    let directory = Arc::new(
        InMemoryDirectory::new()
            .with_seat(&admin, &user_id("m1"))
            .with_seat(&admin, &user_id("m2")),
    );
    let resolver = resolver_over(&directory, context_of(None, Some("member")));

    let scope = resolver.resolve(&user_id("m2")).await;

    assert_eq!(scope.team_id, None);
    assert_eq!(scope.team_admin_id, Some(admin));
    assert_eq!(scope.visible_owner_ids, ids(&["m2", "A1", "m1"]));
}

#[tokio::test]
async fn admin_without_team_anchors_on_self() {
    let admin = user_id("A1");
    let directory = Arc::new(
        InMemoryDirectory::new()
            .with_seat(&admin, &user_id("m1"))
            .with_admin_settings(&admin, settings(true, false)),
    );
    let resolver = resolver_over(&directory, context_of(None, Some("owner")));

    let scope = resolver.resolve(&admin).await;

    assert_eq!(scope.team_admin_id, Some(admin.clone()));
    assert_eq!(scope.visible_owner_ids, ids(&["A1", "m1"]));
}

#[tokio::test]
async fn settings_failure_uses_defaults() {
    let directory = Arc::new(team_t1().failing(Table::TeamSettings));
    let resolver = resolver_over(&directory, context_of(Some("T1"), Some("member")));

    let scope = resolver.resolve(&user_id("mia")).await;

    assert!(scope.share_deals);
    assert!(scope.share_deals_members);
    assert_eq!(scope.visible_owner_ids.len(), 3);
}

#[tokio::test]
async fn team_settings_failure_skips_admin_settings() {
    let mut users = MockUserDirectory::new();
    users
        .expect_list_team_members()
        .returning(|_| Ok(ids(&["mia", "noah"])));
    users.expect_find_team_admin().times(0);
    let mut memberships = MockTeamMembershipRepository::new();
    memberships.expect_list_members().returning(|_| Ok(Vec::new()));
    let mut settings = MockTeamSettingsRepository::new();
    settings
        .expect_find_by_team()
        .times(1)
        .returning(|_| Err(DirectoryError::query("statement timeout")));
    settings.expect_find_by_admin().times(0);

    let resolver = SharingScopeResolver::new(
        Arc::new(context_of(Some("T1"), Some("member"))),
        Arc::new(users),
        Arc::new(memberships),
        Arc::new(MockSeatGrantRepository::new()),
        Arc::new(settings),
    );

    let scope = resolver.resolve(&user_id("mia")).await;

    assert_eq!((scope.share_deals, scope.share_deals_members), (true, true));
    assert_eq!(scope.team_admin_id, None);
    assert_eq!(scope.visible_owner_ids, ids(&["mia", "noah"]));
}

#[tokio::test]
async fn missing_membership_table_still_reads_legacy_column() {
    let directory = Arc::new(team_t1().without_table(Table::TeamMembers));
    let resolver = resolver_over(&directory, context_of(Some("T1"), Some("member")));

    let scope = resolver.resolve(&user_id("mia")).await;

    assert_eq!(scope.visible_owner_ids, ids(&["mia", "admin", "noah"]));
}

#[tokio::test]
async fn member_lookups_all_failing_narrow_to_self() {
    let directory = Arc::new(
        InMemoryDirectory::new()
            .failing(Table::TeamMembers)
            .failing(Table::Users),
    );
    let resolver = resolver_over(&directory, context_of(Some("T1"), Some("member")));

    let scope = resolver.resolve(&user_id("mia")).await;

    assert!(scope.share_deals);
    assert_eq!(scope.visible_owner_ids, ids(&["mia"]));
}

#[tokio::test]
async fn requesting_user_is_included_even_when_absent_from_member_lists() {
    let mut users = MockUserDirectory::new();
    users.expect_list_team_members().returning(|_| Ok(Vec::new()));
    users.expect_find_team_admin().returning(|_, _| Ok(None));
    let mut memberships = MockTeamMembershipRepository::new();
    memberships.expect_list_members().returning(|_| Ok(Vec::new()));
    let mut settings = MockTeamSettingsRepository::new();
    settings.expect_find_by_team().returning(|_| Ok(None));
    let mut seat_grants = MockSeatGrantRepository::new();
    seat_grants.expect_find_admin_for_member().times(0);

    let resolver = SharingScopeResolver::new(
        Arc::new(context_of(Some("T1"), Some("member"))),
        Arc::new(users),
        Arc::new(memberships),
        Arc::new(seat_grants),
        Arc::new(settings),
    );

    let scope = resolver.resolve_scope(&user_id("lone")).await;

    assert!(scope.contains(&user_id("lone")));
    assert_eq!(scope.visible_owner_ids, ids(&["lone"]));
}

#[tokio::test]
async fn seat_lookup_failure_is_self_only() {
    let mut seat_grants = MockSeatGrantRepository::new();
    seat_grants
        .expect_find_admin_for_member()
        .returning(|_| Err(DirectoryError::connection("refused")));

    let resolver = SharingScopeResolver::new(
        Arc::new(context_of(None, None)),
        Arc::new(MockUserDirectory::new()),
        Arc::new(MockTeamMembershipRepository::new()),
        Arc::new(seat_grants),
        Arc::new(MockTeamSettingsRepository::new()),
    );

    let scope = resolver.resolve(&user_id("pat")).await;

    assert_eq!(scope, SharingScope::self_only(&user_id("pat")));
}

#[test]
fn scope_serialises_in_camel_case() {
    let scope = SharingScope::self_only(&user_id("u1"));
    let json = serde_json::to_value(&scope).expect("serialise scope");
    assert_eq!(json["visibleOwnerIds"], serde_json::json!(["u1"]));
    assert_eq!(json["shareDeals"], serde_json::json!(false));
    assert!(json["teamAdminId"].is_null());
}
