use api_contract::{ContentInstanceRequest, FeedEntry, NodeStatusDto};
use serde_json::Value;

#[test]
fn feed_entry_keeps_only_field_slots() {
    let payload = r#"{
        "created_at": "2024-06-01T12:00:00Z",
        "entry_id": 42,
        "field1": null,
        "field6": "1.5",
        "field7": 26.3,
        "fieldx": "ignored",
        "latitude": "12.9"
    }"#;
    let entry: FeedEntry = serde_json::from_str(payload).expect("parse");
    assert_eq!(entry.entry_id, 42);
    assert_eq!(entry.created_at, "2024-06-01T12:00:00Z");

    let slots = entry.field_slots();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots.get("field1"), Some(&None));
    assert_eq!(slots.get("field6"), Some(&Some("1.5".to_string())));
    assert_eq!(slots.get("field7"), Some(&Some("26.3".to_string())));
    assert!(!slots.contains_key("fieldx"));
    assert!(!slots.contains_key("latitude"));
}

#[test]
fn feed_entry_rejects_empty_channel_marker() {
    // 空通道时遥测服务返回裸 -1
    assert!(serde_json::from_str::<FeedEntry>("-1").is_err());
}

#[test]
fn feed_entry_requires_entry_id() {
    let payload = r#"{"created_at": "2024-06-01T12:00:00Z", "field6": "1.5"}"#;
    assert!(serde_json::from_str::<FeedEntry>(payload).is_err());
}

#[test]
fn content_instance_uses_m2m_key() {
    let request = ContentInstanceRequest::new(
        vec!["AE-WM-WL".to_string(), "node-1".to_string()],
        "[1, 2.0, 3.0]".to_string(),
    );
    let value = serde_json::to_value(&request).expect("serialize");
    let cin = value.get("m2m:cin").expect("m2m:cin");
    assert_eq!(cin["lbl"][1], Value::from("node-1"));
    assert_eq!(cin["con"], Value::from("[1, 2.0, 3.0]"));
    assert!(value.get("cin").is_none());
}

#[test]
fn node_status_is_camel_case() {
    let status = NodeStatusDto {
        node_id: "node-1".to_string(),
        last_entry_id: Some(5),
        last_delivered_entry_id: None,
    };
    let value = serde_json::to_value(status).expect("serialize");
    assert_eq!(value["nodeId"], Value::from("node-1"));
    assert_eq!(value["lastEntryId"], Value::from(5));
    assert!(value["lastDeliveredEntryId"].is_null());
}
