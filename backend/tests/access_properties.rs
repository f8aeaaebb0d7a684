//! Behavioural tests for the access engine over the in-memory directory.
//!
//! Each test builds a small partially migrated dataset and checks an
//! observable property of the three driving ports.

use std::collections::HashSet;
use std::sync::Arc;

use access_engine::domain::policy::{ADMIN_ROLES, PAID_ROLES};
use access_engine::domain::{AccessEngine, IdentityMetadata, TeamSettings, UserRecord};
use access_engine::test_support::{InMemoryDirectory, Table, team_id, user_id};
use rstest::{fixture, rstest};

fn engine(directory: &Arc<InMemoryDirectory>) -> AccessEngine {
    AccessEngine::new(directory.ports())
}

/// Team T1 on the legacy column: an admin, two members and an outsider.
#[fixture]
fn legacy_team() -> InMemoryDirectory {
    let t1 = team_id("T1");
    InMemoryDirectory::new()
        .with_user(UserRecord::new(user_id("admin")).with_team(t1.clone()).with_role("admin"))
        .with_user(UserRecord::new(user_id("mia")).with_team(t1.clone()).with_role("member"))
        .with_user(UserRecord::new(user_id("noah")).with_team(t1).with_role("member"))
        .with_user(
            UserRecord::new(user_id("outsider"))
                .with_team(team_id("T9"))
                .with_role("member"),
        )
}

#[rstest]
#[tokio::test]
async fn authoritative_team_column_wins_over_every_other_source() {
    let user = user_id("u-1");
    let directory = Arc::new(
        InMemoryDirectory::new()
            .with_user(UserRecord::new(user.clone()).with_team(team_id("T1")).with_role("member"))
            .with_membership(&team_id("T2"), &user)
            .with_seat(&user_id("other-admin"), &user)
            .with_identity(
                &user,
                IdentityMetadata {
                    team_id: Some(team_id("T3")),
                    ..IdentityMetadata::default()
                },
            ),
    );

    let context = engine(&directory).context_query().resolve_context(&user).await;

    assert_eq!(context.team_id, Some(team_id("T1")));
    assert_eq!(context.role.as_ref().map(|r| r.as_str()), Some("member"));
}

#[rstest]
#[case::known_role(Some("recruiter"))]
#[case::no_role(None)]
#[tokio::test]
async fn users_without_membership_data_resolve_to_no_team(#[case] role: Option<&str>) {
    let user = user_id("loner");
    let record = role.map_or_else(
        || UserRecord::new(user.clone()),
        |role| UserRecord::new(user.clone()).with_role(role),
    );
    let directory = Arc::new(InMemoryDirectory::new().with_user(record));

    let context = engine(&directory).context_query().resolve_context(&user).await;

    assert_eq!(context.team_id, None);
    assert_eq!(context.role.as_ref().map(|r| r.as_str()), role);
}

#[rstest]
#[tokio::test]
async fn every_source_failing_still_yields_an_empty_context() {
    let user = user_id("ghost");
    let directory = Arc::new(
        InMemoryDirectory::new()
            .failing(Table::Users)
            .failing(Table::TeamMembers)
            .failing(Table::TeamSeats)
            .failing(Table::TeamInvites)
            .failing_identity(),
    );

    let engine = engine(&directory);
    let context = engine.context_query().resolve_context(&user).await;
    let scope = engine.scope_query().resolve_scope(&user).await;

    assert_eq!(context.team_id, None);
    assert_eq!(context.role, None);
    assert_eq!(scope.visible_owner_ids, vec![user]);
}

#[rstest]
#[tokio::test]
async fn seat_grant_resolution_backfills_and_converges() {
    let member = user_id("member");
    let admin = user_id("A1");
    let directory = Arc::new(
        InMemoryDirectory::new()
            .with_user(UserRecord::new(member.clone()).with_role("member"))
            .with_user(UserRecord::new(admin.clone()).with_team(team_id("T2")).with_role("admin"))
            .with_seat(&admin, &member),
    );
    let engine = engine(&directory);

    let first = engine.context_query().resolve_context(&member).await;
    engine.backfill().settle().await;
    let second = engine.context_query().resolve_context(&member).await;

    assert_eq!(first.team_id, Some(team_id("T2")));
    assert_eq!(second.team_id, first.team_id);
    assert_eq!(
        directory.user(&member).and_then(|record| record.team_id),
        Some(team_id("T2"))
    );
    assert_eq!(directory.memberships_of(&member), vec![team_id("T2")]);
}

#[rstest]
#[tokio::test]
async fn identity_team_synthesizes_missing_user_rows() {
    let user = user_id("new-hire");
    let directory = Arc::new(InMemoryDirectory::new().with_identity(
        &user,
        IdentityMetadata {
            team_id: Some(team_id("T5")),
            email: Some("new@example.com".to_owned()),
            ..IdentityMetadata::default()
        },
    ));
    let engine = engine(&directory);

    let context = engine.context_query().resolve_context(&user).await;
    engine.backfill().settle().await;

    assert_eq!(context.team_id, Some(team_id("T5")));
    let record = directory.user(&user).expect("row synthesized");
    assert_eq!(record.team_id, Some(team_id("T5")));
    assert_eq!(record.role.as_ref().map(|r| r.as_str()), Some("member"));
    assert_eq!(record.email.as_deref(), Some("new@example.com"));
}

#[rstest]
#[case::member("mia")]
#[case::admin("admin")]
#[case::outsider("outsider")]
#[case::unknown("nobody")]
#[tokio::test]
async fn scope_always_contains_the_caller(
    legacy_team: InMemoryDirectory,
    #[case] caller: &str,
) {
    let caller = user_id(caller);
    let directory = Arc::new(legacy_team);

    let scope = engine(&directory).scope_query().resolve_scope(&caller).await;

    assert!(scope.contains(&caller));
    let unique: HashSet<_> = scope.visible_owner_ids.iter().collect();
    assert_eq!(unique.len(), scope.visible_owner_ids.len());
}

#[rstest]
#[tokio::test]
async fn missing_settings_row_pools_the_whole_legacy_team(legacy_team: InMemoryDirectory) {
    let caller = user_id("mia");
    let directory = Arc::new(legacy_team);

    let scope = engine(&directory).scope_query().resolve_scope(&caller).await;

    assert!(scope.share_deals);
    assert!(scope.share_deals_members);
    let visible: HashSet<_> = scope.visible_owner_ids.iter().cloned().collect();
    let expected: HashSet<_> = ["admin", "mia", "noah"].into_iter().map(user_id).collect();
    assert_eq!(visible, expected);
}

#[rstest]
#[case::team_row_for_member(false, "mia")]
#[case::team_row_for_admin(false, "admin")]
#[case::admin_row_for_member(true, "mia")]
#[tokio::test]
async fn disabled_sharing_restricts_to_self(
    legacy_team: InMemoryDirectory,
    #[case] keyed_by_admin: bool,
    #[case] caller: &str,
) {
    let off = TeamSettings {
        share_deals: false,
        share_deals_members: true,
    };
    let directory = if keyed_by_admin {
        legacy_team.with_admin_settings(&user_id("admin"), off)
    } else {
        legacy_team.with_team_settings(&team_id("T1"), off)
    };
    let caller = user_id(caller);
    let directory = Arc::new(directory);

    let scope = engine(&directory).scope_query().resolve_scope(&caller).await;

    assert!(!scope.share_deals);
    assert_eq!(scope.team_id, Some(team_id("T1")));
    assert_eq!(scope.visible_owner_ids, vec![caller]);
}

#[rstest]
#[tokio::test]
async fn member_flag_restricts_members_but_not_admins(legacy_team: InMemoryDirectory) {
    let directory = Arc::new(legacy_team.with_team_settings(
        &team_id("T1"),
        TeamSettings {
            share_deals: true,
            share_deals_members: false,
        },
    ));
    let engine = engine(&directory);

    let member = engine.scope_query().resolve_scope(&user_id("noah")).await;
    let admin = engine.scope_query().resolve_scope(&user_id("admin")).await;

    assert_eq!(member.visible_owner_ids, vec![user_id("noah")]);
    assert_eq!(admin.visible_owner_ids.len(), 3);
    assert_eq!(admin.visible_owner_ids.first(), Some(&user_id("admin")));
}

#[rstest]
#[tokio::test]
async fn pooled_scope_covers_membership_and_legacy_members(legacy_team: InMemoryDirectory) {
    let t1 = team_id("T1");
    let migrated = user_id("olga");
    let directory = Arc::new(
        legacy_team
            .with_user(UserRecord::new(migrated.clone()).with_role("member"))
            .with_membership(&t1, &migrated)
            .with_membership(&t1, &user_id("mia")),
    );

    let scope = engine(&directory).scope_query().resolve_scope(&user_id("noah")).await;

    assert!(scope.visible_owner_ids.len() >= 4);
    assert!(scope.contains(&migrated));
    assert!(scope.contains(&user_id("mia")));
    let unique: HashSet<_> = scope.visible_owner_ids.iter().collect();
    assert_eq!(unique.len(), scope.visible_owner_ids.len());
}

#[rstest]
#[tokio::test]
async fn paid_roles_are_entitled_despite_free_billing() {
    for role in PAID_ROLES {
        let user = user_id("payer");
        let directory = Arc::new(
            InMemoryDirectory::new()
                .with_user(UserRecord::new(user.clone()).with_role(role))
                .with_tier(&user, "free")
                .with_plan(&user, "free"),
        );
        assert!(
            engine(&directory).entitlement_query().is_entitled(&user).await,
            "role {role} should be entitled"
        );
    }
    assert!(ADMIN_ROLES.iter().all(|role| PAID_ROLES.contains(role)));
}

#[rstest]
#[case::guest_without_team("guest", None, false)]
#[case::guest_on_a_team("guest", Some("T1"), true)]
#[case::free_without_team("free", None, false)]
#[case::member_without_billing("member", None, true)]
#[tokio::test]
async fn explicit_negative_roles_deny_only_without_a_team(
    #[case] role: &str,
    #[case] team: Option<&str>,
    #[case] expected: bool,
) {
    let user = user_id("visitor");
    let record = UserRecord::new(user.clone()).with_role(role);
    let record = match team {
        Some(team) => record.with_team(team_id(team)),
        None => record,
    };
    let directory = Arc::new(InMemoryDirectory::new().with_user(record));

    let entitled = engine(&directory).entitlement_query().is_entitled(&user).await;

    assert_eq!(entitled, expected);
}

#[rstest]
#[case::free_tier(Some("free"), None, false)]
#[case::paid_tier_over_free_plan(Some("pro"), Some("free"), true)]
#[case::free_plan_without_tier(None, Some("free"), false)]
#[case::no_billing_data(None, None, true)]
#[tokio::test]
async fn billing_signals_decide_teamless_members(
    #[case] tier: Option<&str>,
    #[case] plan: Option<&str>,
    #[case] expected: bool,
) {
    let user = user_id("solo");
    let mut directory = InMemoryDirectory::new().with_user(UserRecord::new(user.clone()));
    if let Some(tier) = tier {
        directory = directory.with_tier(&user, tier);
    }
    if let Some(plan) = plan {
        directory = directory.with_plan(&user, plan);
    }
    let directory = Arc::new(directory);

    let entitled = engine(&directory).entitlement_query().is_entitled(&user).await;

    assert_eq!(entitled, expected);
}

#[rstest]
#[case::subscriptions_fail(Table::Subscriptions)]
#[case::plan_lookup_fails(Table::Users)]
#[tokio::test]
async fn billing_lookup_failures_fail_open(#[case] table: Table) {
    let user = user_id("solo");
    let directory = Arc::new(
        InMemoryDirectory::new()
            .with_user(UserRecord::new(user.clone()))
            .with_plan(&user, "free")
            .failing(table),
    );

    let entitled = engine(&directory).entitlement_query().is_entitled(&user).await;

    assert!(entitled);
}

#[rstest]
#[tokio::test]
async fn missing_membership_table_does_not_break_resolution() {
    let user = user_id("member");
    let directory = Arc::new(
        InMemoryDirectory::new()
            .with_user(UserRecord::new(user.clone()).with_role("member"))
            .with_seat(&user_id("A1"), &user)
            .without_table(Table::TeamMembers),
    );
    let engine = engine(&directory);

    let context = engine.context_query().resolve_context(&user).await;
    let scope = engine.scope_query().resolve_scope(&user).await;
    let entitled = engine.entitlement_query().is_entitled(&user).await;

    assert_eq!(context.team_id, None);
    assert!(scope.contains(&user));
    assert!(entitled);
}

#[rstest]
#[case::free_plan(Some("free"), false)]
#[case::paid_plan(Some("pro"), true)]
#[case::no_plan(None, true)]
#[tokio::test]
async fn missing_subscriptions_table_defers_to_the_plan_column(
    #[case] plan: Option<&str>,
    #[case] expected: bool,
) {
    let user = user_id("solo");
    let mut directory = InMemoryDirectory::new()
        .with_user(UserRecord::new(user.clone()))
        .without_table(Table::Subscriptions);
    if let Some(plan) = plan {
        directory = directory.with_plan(&user, plan);
    }
    let directory = Arc::new(directory);

    let entitled = engine(&directory).entitlement_query().is_entitled(&user).await;

    assert_eq!(entitled, expected);
}
