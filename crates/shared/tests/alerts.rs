mod common;

use common::MockTransport;
use feedkit_graphql::Error;
use feedkit_shared::alerts::{Alerts, AlertsUpdate, update_user_alerts};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn update_returns_stored_alerts() {
	let transport = MockTransport::new();
	transport.reply(json!({ "data": { "updateUserAlerts": {
		"filter": false,
		"rankLastSeen": "2023-03-01T08:00:00Z",
		"myFeed": "created",
		"companionHelper": null,
		"squadTour": false,
		"lastChangelog": null,
	}}}));

	let update = AlertsUpdate {
		squad_tour: Some(false),
		..AlertsUpdate::default()
	};
	let stored = update_user_alerts(transport.as_ref(), &update).await.unwrap();
	assert_eq!(stored.squad_tour, Some(false));
	assert_eq!(stored.my_feed.as_deref(), Some("created"));
	assert_eq!(stored.companion_helper, None);

	let request = &transport.requests()[0];
	assert_eq!(request.operation_name, Some("UpdateUserAlerts"));
	assert_eq!(request.variables, json!({ "data": { "squadTour": false } }));

	let mut alerts = Alerts {
		changelog: Some(true),
		..Alerts::default()
	};
	alerts.apply(stored);
	assert_eq!(alerts.filter, Some(false));
	assert_eq!(alerts.changelog, Some(true));
}

#[tokio::test]
async fn missing_data_is_an_error() {
	let transport = MockTransport::new();
	transport.reply(json!({ "data": null }));
	let err = update_user_alerts(transport.as_ref(), &AlertsUpdate::default()).await.unwrap_err();
	assert!(matches!(err, Error::MissingData));
}
