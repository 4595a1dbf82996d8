//! Squads: membership listing, role changes and permission checks.

use std::sync::Arc;

use async_trait::async_trait;
use feedkit_graphql::{GraphqlTransport, request};
use feedkit_query::{
	InfiniteQuery, Mutation, MutationExecutor, Page, PageFetcher, PageRequest, Projected, QueryKey, QueryKind,
	QueryOptions, ScopeId,
};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::AppContext;

/// Collection kind of a squad's member list, scoped by squad id.
pub const SQUAD_MEMBERS: QueryKind = QueryKind::new("squadMembers");

/// Member listing, one page per request.
pub const SQUAD_MEMBERS_QUERY: &str = r#"
query SourceMembers($id: ID!, $after: String, $first: Int) {
  sourceMembers(sourceId: $id, after: $after, first: $first) {
    pageInfo {
      endCursor
      hasNextPage
    }
    edges {
      node {
        role
        referralToken
        user {
          id
          name
          image
          permalink
          username
          bio
        }
      }
    }
  }
}
"#;

/// Role change for one member.
pub const UPDATE_MEMBER_ROLE_MUTATION: &str = r#"
mutation UpdateMemberRole($sourceId: ID!, $memberId: ID!, $role: String!) {
  updateMemberRole(sourceId: $sourceId, memberId: $memberId, role: $role) {
    _
  }
}
"#;

wire_enum! {
	/// A member's standing in a squad.
	pub enum SourceMemberRole {
		Owner = "owner",
		Moderator = "moderator",
		Member = "member",
		Blocked = "blocked",
		_ => Unrecognized = "unrecognized",
	}
}

wire_enum! {
	/// Action a member may be allowed to perform in a squad.
	///
	/// Values the server adds later decode as [`SourcePermission::Unrecognized`],
	/// which is never granted.
	pub enum SourcePermission {
		View = "view",
		Post = "post",
		PostLimit = "post_limit",
		PostDelete = "post_delete",
		PostPin = "post_pin",
		MemberInvite = "member_invite",
		MemberRemove = "member_remove",
		ModeratorAdd = "moderator_add",
		ModeratorRemove = "moderator_remove",
		InviteDisable = "invite_disable",
		Edit = "edit",
		Delete = "delete",
		Leave = "leave",
		_ => Unrecognized = "unrecognized",
	}
}

/// Public profile fields shown next to a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserShortProfile {
	/// User id.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Handle, when the user picked one.
	#[serde(default)]
	pub username: Option<String>,
	/// Avatar URL.
	#[serde(default)]
	pub image: Option<String>,
	/// Profile page URL.
	#[serde(default)]
	pub permalink: Option<String>,
	/// Short bio.
	#[serde(default)]
	pub bio: Option<String>,
}

/// A user's membership in a squad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMember {
	/// Standing in the squad.
	pub role: SourceMemberRole,
	/// Token embedded in this member's invite links.
	#[serde(default)]
	pub referral_token: Option<String>,
	/// The member.
	pub user: UserShortProfile,
	/// Granted permissions. Only populated for the viewer's own membership.
	#[serde(default)]
	pub permissions: Vec<SourcePermission>,
}

/// A squad as seen by the current viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Squad {
	/// Squad id, the scope of its member list.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Unique handle.
	pub handle: String,
	/// Squad image URL.
	#[serde(default)]
	pub image: Option<String>,
	/// Number of members.
	#[serde(default)]
	pub members_count: u64,
	/// The viewer's membership, absent for non-members and anonymous viewers.
	#[serde(default)]
	pub current_member: Option<SourceMember>,
}

/// Whether the viewer holds `permission` in `squad`.
///
/// Pure and total: an absent squad, an absent membership and
/// [`SourcePermission::Unrecognized`] all answer `false`.
pub fn verify_permission(squad: Option<&Squad>, permission: SourcePermission) -> bool {
	if permission == SourcePermission::Unrecognized {
		return false;
	}
	squad
		.and_then(|s| s.current_member.as_ref())
		.is_some_and(|member| member.permissions.contains(&permission))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SquadMembersData {
	source_members: Page<SourceMember>,
}

/// Loads member pages for a squad.
#[derive(Clone)]
pub struct SquadMembersFetcher {
	transport: Arc<dyn GraphqlTransport>,
	page_size: u32,
}

impl SquadMembersFetcher {
	/// Fetches `page_size` members per page over `transport`.
	pub fn new(transport: Arc<dyn GraphqlTransport>, page_size: u32) -> Self {
		Self { transport, page_size }
	}
}

#[async_trait]
impl PageFetcher for SquadMembersFetcher {
	type Node = SourceMember;
	type Error = feedkit_graphql::Error;

	fn kind(&self) -> QueryKind {
		SQUAD_MEMBERS
	}

	async fn fetch_page(&self, scope: &ScopeId, page: &PageRequest) -> Result<Page<SourceMember>, Self::Error> {
		let variables = json!({
			"id": scope.as_str(),
			"after": page.after(),
			"first": self.page_size,
		});
		let data: SquadMembersData = request(self.transport.as_ref(), SQUAD_MEMBERS_QUERY, variables).await?;
		Ok(data.source_members)
	}
}

/// Changes `member_id`'s role in `source_id` to `role`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMemberRole {
	/// Squad id.
	pub source_id: ScopeId,
	/// User id of the member.
	pub member_id: String,
	/// New role.
	pub role: SourceMemberRole,
}

/// Sends [`UpdateMemberRole`] commands; success invalidates that squad's members.
#[derive(Clone)]
pub struct RoleMutation {
	transport: Arc<dyn GraphqlTransport>,
}

impl RoleMutation {
	/// Sends role changes over `transport`.
	pub fn new(transport: Arc<dyn GraphqlTransport>) -> Self {
		Self { transport }
	}
}

#[async_trait]
impl Mutation for RoleMutation {
	type Command = UpdateMemberRole;
	type Output = ();
	type Error = feedkit_graphql::Error;

	async fn execute(&self, command: &UpdateMemberRole) -> Result<(), Self::Error> {
		let variables = json!({
			"sourceId": command.source_id.as_str(),
			"memberId": command.member_id,
			"role": command.role,
		});
		let _: IgnoredAny = request(self.transport.as_ref(), UPDATE_MEMBER_ROLE_MUTATION, variables).await?;
		Ok(())
	}

	fn invalidates(&self, command: &UpdateMemberRole) -> QueryKey {
		QueryKey::new(SQUAD_MEMBERS, command.source_id.clone())
	}
}

/// Member list, role changes and permission checks for one squad.
pub struct SquadActions {
	squad: Option<Squad>,
	members: InfiniteQuery<SquadMembersFetcher>,
	roles: MutationExecutor<RoleMutation>,
}

impl SquadActions {
	/// Binds actions to `squad`.
	///
	/// The member list loads only when `members_enabled` is set and the squad
	/// has an id. Nothing is fetched until [`Self::members_query`] is driven.
	pub fn new(ctx: &AppContext, squad: Option<Squad>, members_enabled: bool) -> Self {
		let scope = ScopeId::from_optional(squad.as_ref().map(|s| s.id.as_str()));
		let fetcher = SquadMembersFetcher::new(Arc::clone(ctx.transport()), ctx.config().page_size);
		let members = InfiniteQuery::new(ctx.cache().clone(), Arc::new(fetcher), scope, QueryOptions {
			enabled: members_enabled,
		});
		let roles = MutationExecutor::new(ctx.cache().clone(), RoleMutation::new(Arc::clone(ctx.transport())));
		Self { squad, members, roles }
	}

	/// The squad these actions are bound to.
	pub fn squad(&self) -> Option<&Squad> {
		self.squad.as_ref()
	}

	/// Paging control and status for the member list.
	pub fn members_query(&self) -> &InfiniteQuery<SquadMembersFetcher> {
		&self.members
	}

	/// Mutable access, for toggling whether the member list loads.
	pub fn members_query_mut(&mut self) -> &mut InfiniteQuery<SquadMembersFetcher> {
		&mut self.members
	}

	/// Loaded members in server order, each tied to its page.
	pub fn members(&self) -> Vec<Projected<SourceMember>> {
		self.members.items()
	}

	/// Changes a member's role. On success the member list of
	/// `command.source_id` becomes stale.
	pub async fn update_role(&self, command: UpdateMemberRole) -> Result<(), feedkit_graphql::Error> {
		self.roles.mutate(command).await
	}

	/// [`verify_permission`] against the bound squad.
	pub fn verify_permission(&self, permission: SourcePermission) -> bool {
		verify_permission(self.squad.as_ref(), permission)
	}
}
