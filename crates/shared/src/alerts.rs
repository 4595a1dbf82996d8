//! Per-user alert flags (onboarding hints, changelog, feed markers).

use chrono::{DateTime, Utc};
use feedkit_graphql::{GraphqlTransport, request};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Writes alert flags and returns the stored values.
pub const UPDATE_ALERTS: &str = r#"
mutation UpdateUserAlerts($data: UpdateAlertsInput!) {
  updateUserAlerts(data: $data) {
    filter
    rankLastSeen
    myFeed
    companionHelper
    squadTour
    lastChangelog
  }
}
"#;

/// Alert flags as read from the server. Absent fields are unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alerts {
	/// Show the feed filter hint.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filter: Option<bool>,
	/// When the user last saw their rank.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rank_last_seen: Option<DateTime<Utc>>,
	/// Personal feed state, e.g. `created`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub my_feed: Option<String>,
	/// Show the squad tour.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub squad_tour: Option<bool>,
	/// Show the companion helper.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub companion_helper: Option<bool>,
	/// Last changelog entry the user saw.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_changelog: Option<String>,
	/// Whether a new changelog entry is waiting. Computed by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub changelog: Option<bool>,
}

/// Writable subset of [`Alerts`]. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsUpdate {
	/// See [`Alerts::filter`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filter: Option<bool>,
	/// See [`Alerts::rank_last_seen`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rank_last_seen: Option<DateTime<Utc>>,
	/// See [`Alerts::my_feed`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub my_feed: Option<String>,
	/// See [`Alerts::squad_tour`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub squad_tour: Option<bool>,
	/// See [`Alerts::companion_helper`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub companion_helper: Option<bool>,
	/// See [`Alerts::last_changelog`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_changelog: Option<String>,
}

impl From<&Alerts> for AlertsUpdate {
	fn from(alerts: &Alerts) -> Self {
		Self {
			filter: alerts.filter,
			rank_last_seen: alerts.rank_last_seen,
			my_feed: alerts.my_feed.clone(),
			squad_tour: alerts.squad_tour,
			companion_helper: alerts.companion_helper,
			last_changelog: alerts.last_changelog.clone(),
		}
	}
}

impl Alerts {
	/// Overwrites the fields `update` sets; `changelog` is left alone.
	pub fn apply(&mut self, update: AlertsUpdate) {
		let AlertsUpdate {
			filter,
			rank_last_seen,
			my_feed,
			squad_tour,
			companion_helper,
			last_changelog,
		} = update;
		self.filter = filter.or(self.filter);
		self.rank_last_seen = rank_last_seen.or(self.rank_last_seen);
		self.my_feed = my_feed.or(self.my_feed.take());
		self.squad_tour = squad_tour.or(self.squad_tour);
		self.companion_helper = companion_helper.or(self.companion_helper);
		self.last_changelog = last_changelog.or(self.last_changelog.take());
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAlertsData {
	update_user_alerts: AlertsUpdate,
}

/// Sends `data` and returns the alerts as stored by the server.
pub async fn update_user_alerts(
	transport: &dyn GraphqlTransport,
	data: &AlertsUpdate,
) -> feedkit_graphql::Result<AlertsUpdate> {
	let response: UpdateAlertsData = request(transport, UPDATE_ALERTS, json!({ "data": data })).await?;
	debug!(changelog = ?response.update_user_alerts.last_changelog, "alerts.updated");
	Ok(response.update_user_alerts)
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn update_sends_only_set_fields() {
		let update = AlertsUpdate {
			squad_tour: Some(false),
			rank_last_seen: Some(Utc.with_ymd_and_hms(2023, 3, 1, 8, 0, 0).unwrap()),
			..AlertsUpdate::default()
		};
		assert_eq!(
			serde_json::to_value(&update).unwrap(),
			json!({ "squadTour": false, "rankLastSeen": "2023-03-01T08:00:00Z" })
		);
	}

	#[test]
	fn apply_keeps_changelog_and_unset_fields() {
		let mut alerts: Alerts = serde_json::from_value(json!({
			"filter": true,
			"myFeed": "created",
			"changelog": true,
		}))
		.unwrap();
		alerts.apply(AlertsUpdate {
			filter: Some(false),
			last_changelog: Some("2023-03-01".to_owned()),
			..AlertsUpdate::default()
		});

		assert_eq!(alerts.filter, Some(false));
		assert_eq!(alerts.my_feed.as_deref(), Some("created"));
		assert_eq!(alerts.last_changelog.as_deref(), Some("2023-03-01"));
		assert_eq!(alerts.changelog, Some(true));
	}

	#[test]
	fn update_from_alerts_drops_changelog() {
		let alerts = Alerts {
			companion_helper: Some(true),
			changelog: Some(true),
			..Alerts::default()
		};
		let update = AlertsUpdate::from(&alerts);
		assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "companionHelper": true }));
	}
}
