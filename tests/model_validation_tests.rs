use admin_scaffold::{
    AppError,
    models::{MessageResponse, Record, Role, SampleNonGenericRequest, User},
};
use serde_json::json;
use uuid::Uuid;

// --- Role ---

#[test]
fn test_role_serializes_lowercase() {
    assert_eq!(serde_json::to_value(Role::Superuser).unwrap(), json!("superuser"));
    assert_eq!(serde_json::to_value(Role::User).unwrap(), json!("user"));
    let parsed: Role = serde_json::from_value(json!("superuser")).unwrap();
    assert_eq!(parsed, Role::Superuser);
}

#[test]
fn test_role_from_column_text() {
    assert_eq!(Role::from("superuser".to_string()), Role::Superuser);
    assert_eq!(Role::from("user".to_string()), Role::User);
    // Unrecognised values never grant the privileged role.
    assert_eq!(Role::from("SUPERUSER".to_string()), Role::User);
    assert_eq!(Role::from(String::new()), Role::User);
}

// --- User ---

#[test]
fn test_user_serialization_hides_credentials() {
    let user = User {
        id: Uuid::nil(),
        username: "admin".into(),
        role: Role::Superuser,
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
    };
    let value = serde_json::to_value(&user).unwrap();

    assert_eq!(value["username"], "admin");
    assert_eq!(value["role"], "superuser");
    assert!(value.get("password_hash").is_none());
    assert_eq!(value.as_object().unwrap().len(), 3);
}

// --- Record ---

#[test]
fn test_record_soft_delete_state() {
    let mut record = Record::new("Widget", "tools");
    assert!(record.is_active());

    let actor = Uuid::new_v4();
    record.mark_deleted(actor);
    assert!(!record.is_active());
    assert_eq!(record.deleted_by, Some(actor));
}

// --- SampleNonGenericRequest ---

fn sample(name: &str, quantity: i64, note: Option<&str>) -> SampleNonGenericRequest {
    SampleNonGenericRequest {
        name: name.to_string(),
        quantity,
        note: note.map(str::to_string),
    }
}

#[test]
fn test_sample_request_boundaries() {
    assert!(sample("widget", 1, None).validate().is_ok());
    assert!(sample("widget", 1000, Some("fragile")).validate().is_ok());
    assert!(sample(&"n".repeat(100), 5, Some(&"x".repeat(500))).validate().is_ok());

    for invalid in [
        sample("   ", 5, None),
        sample(&"n".repeat(101), 5, None),
        sample("widget", 0, None),
        sample("widget", 1001, None),
        sample("widget", 5, Some(&"x".repeat(501))),
    ] {
        assert!(
            matches!(invalid.validate(), Err(AppError::Validation(_))),
            "{:?} should be rejected",
            invalid
        );
    }
}

#[test]
fn test_sample_request_decoding() {
    let decoded: SampleNonGenericRequest =
        serde_json::from_value(json!({ "name": "widget", "quantity": 7 })).unwrap();
    assert_eq!(decoded.quantity, 7);
    assert!(decoded.note.is_none());

    // A missing required field fails at decode time.
    assert!(serde_json::from_value::<SampleNonGenericRequest>(json!({ "name": "widget" })).is_err());
}

// --- MessageResponse ---

#[test]
fn test_message_response_shape() {
    assert_eq!(
        serde_json::to_value(MessageResponse::success()).unwrap(),
        json!({ "message": "Success" })
    );
    assert_eq!(
        serde_json::to_value(MessageResponse::error()).unwrap(),
        json!({ "message": "Error" })
    );
}
