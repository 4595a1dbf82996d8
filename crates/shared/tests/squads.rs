mod common;

use common::{MockTransport, context, init_tracing};
use feedkit_graphql::Error;
use feedkit_query::{CacheEvent, FetchNext, LoadOutcome, QueryKey, ScopeId};
use feedkit_shared::squads::{
	SQUAD_MEMBERS, SourceMemberRole, SourcePermission, Squad, SquadActions, UpdateMemberRole,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn squad(id: &str) -> Squad {
	serde_json::from_value(json!({
		"id": id,
		"name": "Rustaceans",
		"handle": "rust",
		"membersCount": 3,
		"currentMember": {
			"role": "owner",
			"user": { "id": "u0", "name": "Owner" },
			"permissions": ["view", "moderator_add"],
		},
	}))
	.unwrap()
}

fn member(id: &str, role: &str) -> Value {
	json!({
		"role": role,
		"referralToken": format!("ref-{id}"),
		"user": { "id": id, "name": format!("User {id}"), "username": id },
	})
}

fn members_page(nodes: Vec<Value>, next: Option<&str>) -> Value {
	let edges: Vec<Value> = nodes.into_iter().map(|node| json!({ "node": node })).collect();
	json!({
		"data": {
			"sourceMembers": {
				"pageInfo": { "hasNextPage": next.is_some(), "endCursor": next },
				"edges": edges,
			}
		}
	})
}

fn member_ids(actions: &SquadActions) -> Vec<String> {
	actions.members().iter().map(|m| m.user.id.clone()).collect()
}

#[tokio::test]
async fn members_page_through_squad() {
	init_tracing();
	let transport = MockTransport::new();
	transport
		.reply(members_page(vec![member("u1", "owner"), member("u2", "member")], Some("c1")))
		.reply(members_page(vec![member("u3", "moderator")], None));
	let ctx = context(&transport, 2);
	let actions = SquadActions::new(&ctx, Some(squad("squad-42")), true);

	let members = actions.members_query();
	assert_eq!(members.load().await.unwrap(), LoadOutcome::Fetched);
	assert_eq!(members.fetch_next_page().await.unwrap(), FetchNext::Fetched);
	assert_eq!(members.fetch_next_page().await.unwrap(), FetchNext::Exhausted);

	assert_eq!(member_ids(&actions), vec!["u1", "u2", "u3"]);
	assert_eq!(actions.members()[2].role, SourceMemberRole::Moderator);
	assert_eq!(actions.members()[0].referral_token.as_deref(), Some("ref-u1"));

	let requests = transport.requests();
	assert_eq!(requests.len(), 2);
	assert_eq!(requests[0].operation_name, Some("SourceMembers"));
	assert_eq!(requests[0].variables, json!({ "id": "squad-42", "after": null, "first": 2 }));
	assert_eq!(requests[1].variables, json!({ "id": "squad-42", "after": "c1", "first": 2 }));
}

#[tokio::test]
async fn members_stay_unloaded_without_id_or_intent() {
	let transport = MockTransport::new();
	let ctx = context(&transport, 10);

	let anonymous = SquadActions::new(&ctx, None, true);
	let blank = SquadActions::new(&ctx, Some(squad("")), true);
	let not_wanted = SquadActions::new(&ctx, Some(squad("squad-1")), false);
	for actions in [&anonymous, &blank, &not_wanted] {
		assert_eq!(actions.members_query().load().await.unwrap(), LoadOutcome::Disabled);
		assert_eq!(actions.members_query().fetch_next_page().await.unwrap(), FetchNext::Disabled);
		assert!(actions.members().is_empty());
		assert!(!actions.members_query().result().is_loading());
	}
	assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn enabling_later_loads_members() {
	let transport = MockTransport::new();
	transport.reply(members_page(vec![member("u1", "member")], None));
	let ctx = context(&transport, 10);
	let mut actions = SquadActions::new(&ctx, Some(squad("squad-1")), false);

	let outcome = actions.members_query_mut().set_enabled(true).await.unwrap();
	assert_eq!(outcome, Some(LoadOutcome::Fetched));
	assert_eq!(member_ids(&actions), vec!["u1"]);
}

#[tokio::test]
async fn role_change_invalidates_that_squads_members() {
	let transport = MockTransport::new();
	transport
		.reply(members_page(vec![member("u1", "member")], None))
		.reply(json!({ "data": { "updateMemberRole": { "_": true } } }))
		.reply(members_page(vec![member("u1", "moderator")], None));
	let ctx = context(&transport, 10);
	let actions = SquadActions::new(&ctx, Some(squad("squad-1")), true);
	actions.members_query().load().await.unwrap();

	let mut events = ctx.cache().subscribe();
	actions
		.update_role(UpdateMemberRole {
			source_id: ScopeId::new("squad-1").unwrap(),
			member_id: "u1".to_owned(),
			role: SourceMemberRole::Moderator,
		})
		.await
		.unwrap();

	let key = QueryKey::new(SQUAD_MEMBERS, ScopeId::new("squad-1").unwrap());
	assert_eq!(events.try_recv().unwrap(), CacheEvent::Invalidated(key.clone()));
	assert!(events.try_recv().is_err());
	assert!(ctx.cache().is_stale(&key));

	let mutation = &transport.requests()[1];
	assert_eq!(mutation.operation_name, Some("UpdateMemberRole"));
	assert_eq!(mutation.variables, json!({ "sourceId": "squad-1", "memberId": "u1", "role": "moderator" }));

	assert_eq!(actions.members_query().load().await.unwrap(), LoadOutcome::Refetched);
	assert_eq!(actions.members()[0].role, SourceMemberRole::Moderator);
}

#[tokio::test]
async fn rejected_role_change_passes_server_error_through() {
	let transport = MockTransport::new();
	transport.reply(json!({
		"data": null,
		"errors": [{ "message": "Access denied!", "extensions": { "code": "FORBIDDEN" } }],
	}));
	let ctx = context(&transport, 10);
	let actions = SquadActions::new(&ctx, Some(squad("squad-1")), true);
	let mut events = ctx.cache().subscribe();

	let err = actions
		.update_role(UpdateMemberRole {
			source_id: ScopeId::new("squad-1").unwrap(),
			member_id: "u1".to_owned(),
			role: SourceMemberRole::Blocked,
		})
		.await
		.unwrap_err();

	let errors = match err {
		Error::Graphql(errors) => errors,
		other => panic!("expected a GraphQL error, got {other:?}"),
	};
	assert_eq!(errors.first_message(), Some("Access denied!"));
	assert_eq!(errors.code(), Some("FORBIDDEN"));
	assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn permissions_follow_the_bound_squad() {
	let transport = MockTransport::new();
	let ctx = context(&transport, 10);

	let owner = SquadActions::new(&ctx, Some(squad("squad-1")), false);
	assert!(owner.verify_permission(SourcePermission::ModeratorAdd));
	assert!(!owner.verify_permission(SourcePermission::Delete));
	assert!(!owner.verify_permission(SourcePermission::Unrecognized));

	let anonymous = SquadActions::new(&ctx, None, false);
	assert!(!anonymous.verify_permission(SourcePermission::View));
	assert_eq!(transport.calls(), 0);
}
