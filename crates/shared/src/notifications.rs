//! Notification center: the notification feed, item view models and the
//! persisted welcome notification.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feedkit_graphql::{GraphqlTransport, request};
use feedkit_persist::{KeyValueStore, PersistentValue};
use feedkit_query::{Page, PageFetcher, PageRequest, QueryKind, ScopeId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::{debug, warn};

/// Collection kind of a user's notifications, scoped by user id.
pub const NOTIFICATIONS: QueryKind = QueryKind::new("notifications");

/// Notification feed, one page per request.
pub const NOTIFICATIONS_QUERY: &str = r#"
query Notifications($after: String, $first: Int) {
  notifications(after: $after, first: $first) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        createdAt
        readAt
        icon
        title
        type
        description
        targetUrl
        avatars {
          type
          image
          referenceId
          name
          targetUrl
        }
        attachments {
          type
          image
          title
        }
      }
    }
  }
}
"#;

/// Preference key holding the welcome notification's unread flag.
pub const FIRST_NOTIFICATION_READ: &str = "FIRST_NOTIFICATION_READ";

/// Title of the welcome notification.
pub const FIRST_NOTIFICATION_TITLE: &str = "Welcome to your new notification center!";

/// Body of the welcome notification.
pub const FIRST_NOTIFICATION_DESCRIPTION: &str =
	"The notification system notifies you of important events such as replies, mentions, updates etc.";

wire_enum! {
	/// What triggered a notification.
	pub enum NotificationType {
		System = "system",
		CommunityPicksFailed = "community_picks_failed",
		CommunityPicksSucceeded = "community_picks_succeeded",
		CommunityPicksGranted = "community_picks_granted",
		ArticlePicked = "article_picked",
		ArticleNewComment = "article_new_comment",
		ArticleUpvoteMilestone = "article_upvote_milestone",
		ArticleReportApproved = "article_report_approved",
		ArticleAnalytics = "article_analytics",
		SourceApproved = "source_approved",
		SourceRejected = "source_rejected",
		CommentMention = "comment_mention",
		CommentReply = "comment_reply",
		CommentUpvoteMilestone = "comment_upvote_milestone",
		SquadPostAdded = "squad_post_added",
		SquadMemberJoined = "squad_member_joined",
		SquadReply = "squad_reply",
		SquadPostViewed = "squad_post_viewed",
		_ => Unrecognized = "unrecognized",
	}
}

wire_enum! {
	/// Icon shown beside a notification.
	pub enum NotificationIconType {
		Bell = "Bell",
		CommunityPicks = "CommunityPicks",
		DailyDev = "DailyDev",
		Comment = "Comment",
		Upvote = "Upvote",
		DevCard = "DevCard",
		Block = "Block",
		Star = "Star",
		View = "View",
		_ => Unrecognized = "Unrecognized",
	}
}

wire_enum! {
	/// What an avatar links to.
	pub enum AvatarType {
		User = "user",
		Source = "source",
		_ => Unrecognized = "unrecognized",
	}
}

/// Colour family for a notification icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconTheme {
	/// Neutral label colour.
	Primary,
	/// Positive outcomes and milestones.
	Avocado,
	/// Conversations.
	Blueberry,
	/// Rejections and failures.
	Ketchup,
	/// Squad activity.
	Cabbage,
	/// Editorial picks.
	Bun,
}

/// Icon theme for a notification type.
pub fn notification_type_theme(kind: NotificationType) -> IconTheme {
	use NotificationType as T;
	match kind {
		T::System | T::Unrecognized => IconTheme::Primary,
		T::CommunityPicksSucceeded
		| T::CommunityPicksGranted
		| T::ArticleUpvoteMilestone
		| T::CommentUpvoteMilestone
		| T::ArticleReportApproved
		| T::SourceApproved => IconTheme::Avocado,
		T::ArticleNewComment | T::CommentMention | T::CommentReply | T::ArticleAnalytics => IconTheme::Blueberry,
		T::CommunityPicksFailed | T::SourceRejected => IconTheme::Ketchup,
		T::SquadPostAdded | T::SquadMemberJoined | T::SquadReply | T::SquadPostViewed => IconTheme::Cabbage,
		T::ArticlePicked => IconTheme::Bun,
	}
}

/// An avatar that can be linked back to its user or source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAvatar {
	/// User or source.
	#[serde(rename = "type")]
	pub kind: AvatarType,
	/// Image URL.
	pub image: String,
	/// Display name.
	pub name: String,
	/// Link target.
	pub target_url: String,
	/// Id of the user or source.
	pub reference_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAvatar {
	#[serde(rename = "type")]
	kind: AvatarType,
	#[serde(default)]
	image: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	target_url: String,
	#[serde(default)]
	reference_id: Option<String>,
}

/// Keeps only avatars that carry a reference id; `null` lists are empty.
fn referenced_avatars<'de, D>(deserializer: D) -> Result<Vec<NotificationAvatar>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<Vec<WireAvatar>>::deserialize(deserializer)?.unwrap_or_default();
	Ok(raw
		.into_iter()
		.filter_map(|a| {
			let reference_id = a.reference_id.filter(|id| !id.is_empty())?;
			Some(NotificationAvatar {
				kind: a.kind,
				image: a.image,
				name: a.name,
				target_url: a.target_url,
				reference_id,
			})
		})
		.collect())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Media attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAttachment {
	/// Attachment kind, e.g. `post`.
	#[serde(rename = "type", default)]
	pub kind: String,
	/// Image URL.
	#[serde(default)]
	pub image: String,
	/// Title, also its identity within the notification.
	pub title: String,
}

/// One entry of the notification feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
	/// Notification id.
	pub id: String,
	/// Trigger.
	#[serde(rename = "type")]
	pub kind: NotificationType,
	/// Icon.
	pub icon: NotificationIconType,
	/// Title as HTML from the server.
	pub title: String,
	/// Optional body as HTML from the server.
	#[serde(default)]
	pub description: Option<String>,
	/// Where clicking leads.
	pub target_url: String,
	/// Linked avatars; entries without a reference id are dropped on decode.
	#[serde(default, deserialize_with = "referenced_avatars")]
	pub avatars: Vec<NotificationAvatar>,
	/// Attachments.
	#[serde(default, deserialize_with = "null_as_empty")]
	pub attachments: Vec<NotificationAttachment>,
	/// Creation time.
	pub created_at: DateTime<Utc>,
	/// When the user read it.
	#[serde(default)]
	pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
	/// Whether the user has not read this notification.
	pub fn is_unread(&self) -> bool {
		self.read_at.is_none()
	}
}

#[derive(Deserialize)]
struct NotificationsData {
	notifications: Page<Notification>,
}

/// Loads pages of the signed-in user's notifications.
///
/// The backend derives the user from the session; the scope only keys the
/// cache so different accounts never share pages.
#[derive(Clone)]
pub struct NotificationsFetcher {
	transport: Arc<dyn GraphqlTransport>,
	page_size: u32,
}

impl NotificationsFetcher {
	/// Fetches `page_size` notifications per page over `transport`.
	pub fn new(transport: Arc<dyn GraphqlTransport>, page_size: u32) -> Self {
		Self { transport, page_size }
	}
}

#[async_trait]
impl PageFetcher for NotificationsFetcher {
	type Node = Notification;
	type Error = feedkit_graphql::Error;

	fn kind(&self) -> QueryKind {
		NOTIFICATIONS
	}

	async fn fetch_page(&self, _scope: &ScopeId, page: &PageRequest) -> Result<Page<Notification>, Self::Error> {
		let variables = json!({ "after": page.after(), "first": self.page_size });
		let data: NotificationsData = request(self.transport.as_ref(), NOTIFICATIONS_QUERY, variables).await?;
		Ok(data.notifications)
	}
}

/// Turns server HTML into markup that is safe to display.
pub trait Purifier: Send + Sync {
	/// Returns the sanitized form of `html`.
	fn purify(&self, html: &str) -> String;
}

/// Whitelist sanitizer: formatting tags and safe links survive; scripts,
/// event handlers and unknown tags are removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPurifier;

impl Purifier for HtmlPurifier {
	fn purify(&self, html: &str) -> String {
		ammonia::clean(html)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Purified {
	title: String,
	description: Option<String>,
}

/// View model of one notification row.
///
/// Title and description are shown only after [`NotificationItem::purify`]
/// has run; before that [`NotificationItem::view`] yields nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
	kind: NotificationType,
	icon: NotificationIconType,
	title: String,
	description: Option<String>,
	target_url: String,
	avatars: Vec<NotificationAvatar>,
	attachments: Vec<NotificationAttachment>,
	is_unread: bool,
	purified: Option<Purified>,
}

/// Render-ready fields of a [`NotificationItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationView<'a> {
	/// Icon.
	pub icon: NotificationIconType,
	/// Icon colour family.
	pub theme: IconTheme,
	/// Sanitized title.
	pub title: &'a str,
	/// Sanitized description.
	pub description: Option<&'a str>,
	/// Avatars, all with reference ids.
	pub avatars: &'a [NotificationAvatar],
	/// Attachments.
	pub attachments: &'a [NotificationAttachment],
	/// Link target.
	pub target_url: &'a str,
	/// Highlight as unread.
	pub is_unread: bool,
}

impl NotificationItem {
	/// A bare item without avatars or attachments.
	pub fn new(
		kind: NotificationType,
		icon: NotificationIconType,
		title: impl Into<String>,
		description: Option<String>,
		target_url: impl Into<String>,
	) -> Self {
		Self {
			kind,
			icon,
			title: title.into(),
			description,
			target_url: target_url.into(),
			avatars: Vec::new(),
			attachments: Vec::new(),
			is_unread: false,
			purified: None,
		}
	}

	/// Sets the unread highlight.
	pub fn with_unread(mut self, is_unread: bool) -> Self {
		self.is_unread = is_unread;
		self
	}

	/// Whether sanitized content is available.
	pub fn is_ready(&self) -> bool {
		self.purified.is_some()
	}

	/// Sanitizes title and description. Later calls re-run `purifier`.
	pub fn purify(&mut self, purifier: &dyn Purifier) {
		self.purified = Some(Purified {
			title: purifier.purify(&self.title),
			description: self.description.as_deref().map(|d| purifier.purify(d)),
		});
	}

	/// Render-ready fields, or `None` until sanitized.
	pub fn view(&self) -> Option<NotificationView<'_>> {
		let purified = self.purified.as_ref()?;
		Some(NotificationView {
			icon: self.icon,
			theme: notification_type_theme(self.kind),
			title: &purified.title,
			description: purified.description.as_deref(),
			avatars: &self.avatars,
			attachments: &self.attachments,
			target_url: &self.target_url,
			is_unread: self.is_unread,
		})
	}
}

impl From<&Notification> for NotificationItem {
	fn from(n: &Notification) -> Self {
		Self {
			avatars: n.avatars.clone(),
			attachments: n.attachments.clone(),
			is_unread: n.is_unread(),
			..Self::new(n.kind, n.icon, n.title.clone(), n.description.clone(), n.target_url.clone())
		}
	}
}

/// The welcome notification shown before the user has any real ones.
///
/// Its unread state lives in the [`FIRST_NOTIFICATION_READ`] preference
/// (`true` means unread). Dismissing the view, or dropping it, writes `false`
/// exactly once.
pub struct FirstNotification {
	flag: PersistentValue<bool>,
	item: NotificationItem,
	dismissed: bool,
}

impl std::fmt::Debug for FirstNotification {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FirstNotification")
			.field("item", &self.item)
			.field("dismissed", &self.dismissed)
			.finish_non_exhaustive()
	}
}

impl FirstNotification {
	/// Reads the unread flag from `store` and builds the item linking to
	/// `target_url`. An unreadable flag counts as unread.
	pub fn open(store: Arc<dyn KeyValueStore>, target_url: impl Into<String>) -> Self {
		let flag = PersistentValue::new(store, FIRST_NOTIFICATION_READ, true);
		let is_unread = flag.get().unwrap_or_else(|e| {
			warn!(key = FIRST_NOTIFICATION_READ, error = %e, "notifications.first.read_failed");
			true
		});
		let item = NotificationItem::new(
			NotificationType::System,
			NotificationIconType::Bell,
			FIRST_NOTIFICATION_TITLE,
			Some(FIRST_NOTIFICATION_DESCRIPTION.to_owned()),
			target_url,
		)
		.with_unread(is_unread);
		Self {
			flag,
			item,
			dismissed: false,
		}
	}

	/// Whether the flag said unread when this view opened.
	pub fn is_unread(&self) -> bool {
		self.item.is_unread
	}

	/// The row to render.
	pub fn item(&self) -> &NotificationItem {
		&self.item
	}

	/// Mutable row, for sanitizing.
	pub fn item_mut(&mut self) -> &mut NotificationItem {
		&mut self.item
	}

	/// Closes the view and records it as read.
	pub fn dismiss(mut self) -> feedkit_persist::Result<()> {
		self.mark_read()
	}

	fn mark_read(&mut self) -> feedkit_persist::Result<()> {
		if std::mem::replace(&mut self.dismissed, true) {
			return Ok(());
		}
		debug!(key = FIRST_NOTIFICATION_READ, "notifications.first.mark_read");
		self.flag.set(&false)
	}
}

impl Drop for FirstNotification {
	fn drop(&mut self) {
		if let Err(e) = self.mark_read() {
			warn!(key = FIRST_NOTIFICATION_READ, error = %e, "notifications.first.write_failed");
		}
	}
}
