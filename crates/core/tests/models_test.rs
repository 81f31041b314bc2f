use chrono::{NaiveTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{from_value, json, to_value};
use coachline_core::{
    models::{
        auth::{AuthUser, UserMetadata},
        booking::{BookingStatus, BookingWithDetails, Decision},
        profile::{AccountType, Profile, Role},
        schedule::{AvailabilityTemplate, Opening},
        views::{ListView, NO_OPENINGS},
    },
    relation::Related,
};
use uuid::Uuid;

fn opening(spots: i32, hours_from_now: i64) -> Opening {
    let start_at = Utc::now() + chrono::Duration::hours(hours_from_now);
    Opening {
        id: Uuid::new_v4(),
        coach_id: Uuid::new_v4(),
        start_at,
        end_at: start_at + chrono::Duration::hours(1),
        capacity: 2,
        spots_available: spots,
    }
}

#[test]
fn test_profile_from_backend_row() {
    let id = Uuid::new_v4();
    let profile: Profile = from_value(json!({
        "id": id,
        "email": "parent@example.com",
        "full_name": "Pat Parent",
        "role": "client",
        "account_type": "parent",
        "time_zone": "America/Denver",
        "player_id": null
    }))
    .expect("Failed to decode profile");

    assert_eq!(profile.id, id);
    assert_eq!(profile.role, Role::Client);
    assert_eq!(profile.account_type, Some(AccountType::Parent));
}

#[test]
fn test_profile_without_role_defaults_to_client() {
    let profile: Profile = from_value(json!({
        "id": Uuid::new_v4(),
        "email": null,
        "full_name": null,
        "account_type": null,
        "time_zone": null,
        "player_id": null
    }))
    .expect("Failed to decode profile");

    assert_eq!(profile.role, Role::Client);
}

#[rstest]
#[case("pending", BookingStatus::Pending)]
#[case("accepted", BookingStatus::Accepted)]
#[case("declined", BookingStatus::Declined)]
#[case("cancel", BookingStatus::Cancel)]
fn test_booking_status_wire_names(#[case] wire: &str, #[case] status: BookingStatus) {
    let decoded: BookingStatus = from_value(json!(wire)).unwrap();
    assert_eq!(decoded, status);
}

#[test]
fn test_decision_wire_names() {
    assert_eq!(to_value(Decision::Accept).unwrap(), json!("accept"));
    assert_eq!(to_value(Decision::Cancel).unwrap(), json!("cancel"));
    assert_eq!(Decision::Decline.as_str(), "decline");
}

#[test]
fn test_booking_with_embedded_rows_in_both_shapes() {
    let opening_id = Uuid::new_v4();
    let client_id = Uuid::new_v4();
    let row = json!({
        "id": Uuid::new_v4(),
        "opening_id": opening_id,
        "client_id": client_id,
        "status": "pending",
        "location_requested": "North field",
        "created_at": "2026-03-01T15:00:00Z",
        "opening": [{
            "id": opening_id,
            "coach_id": Uuid::new_v4(),
            "start_at": "2026-03-05T15:00:00Z",
            "end_at": "2026-03-05T16:00:00Z",
            "capacity": 1,
            "spots_available": 1
        }],
        "client": null
    });

    let booking: BookingWithDetails = from_value(row).expect("Failed to decode booking");

    assert_eq!(booking.booking.status, BookingStatus::Pending);
    assert_eq!(booking.booking.location_requested.as_deref(), Some("North field"));
    match booking.opening {
        Related::Single(ref o) => assert_eq!(o.id, opening_id),
        Related::NotFound => panic!("opening should be present"),
    }
    assert_eq!(booking.client, Related::NotFound);
}

#[test]
fn test_template_times_use_postgres_format() {
    let template: AvailabilityTemplate = from_value(json!({
        "id": Uuid::new_v4(),
        "coach_id": null,
        "weekday": 2,
        "start_time": "09:00:00",
        "end_time": "12:30:00",
        "slot_minutes": 60,
        "active": true
    }))
    .expect("Failed to decode template");

    assert_eq!(template.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(template.end_time, NaiveTime::from_hms_opt(12, 30, 0).unwrap());
}

#[rstest]
#[case(1, 24, true)]
#[case(0, 24, false)]
#[case(1, -2, false)]
fn test_opening_bookability(#[case] spots: i32, #[case] hours: i64, #[case] bookable: bool) {
    assert_eq!(opening(spots, hours).is_bookable(Utc::now()), bookable);
}

#[test]
fn test_spots_taken_never_negative() {
    let mut o = opening(2, 24);
    assert_eq!(o.spots_taken(), 0);
    o.spots_available = 1;
    assert_eq!(o.spots_taken(), 1);
}

#[rstest]
#[case(json!({}), false)]
#[case(json!({ "account_type": "player" }), false)]
#[case(json!({ "account_type": "player", "player_name": "  " }), false)]
#[case(json!({ "account_type": "parent", "player_name": "Sam" }), true)]
fn test_metadata_completeness(#[case] metadata: serde_json::Value, #[case] complete: bool) {
    let user: AuthUser = from_value(json!({
        "id": Uuid::new_v4(),
        "email": "a@b.c",
        "user_metadata": metadata
    }))
    .unwrap();
    assert_eq!(user.user_metadata.is_complete(), complete);
}

#[test]
fn test_metadata_skips_absent_fields() {
    let metadata = UserMetadata {
        account_type: Some(AccountType::Player),
        player_name: None,
        full_name: None,
    };
    assert_eq!(to_value(&metadata).unwrap(), json!({ "account_type": "player" }));
}

#[test]
fn test_empty_list_view_carries_message() {
    let view = ListView::<Opening>::from_items(Vec::new(), NO_OPENINGS);
    assert_eq!(
        to_value(&view).unwrap(),
        json!({ "state": "empty", "message": "No Available Openings" })
    );
    assert!(view.items().is_empty());
}

#[test]
fn test_populated_list_view() {
    let o = opening(1, 48);
    let view = ListView::from_items(vec![o.clone()], NO_OPENINGS);
    assert_eq!(view.items(), &[o]);
    let json = to_value(&view).unwrap();
    assert_eq!(json["state"], "populated");
}

#[test]
fn test_timestamps_decode_as_utc() {
    let o: Opening = from_value(json!({
        "id": Uuid::new_v4(),
        "coach_id": Uuid::new_v4(),
        "start_at": "2026-03-05T10:00:00-05:00",
        "end_at": "2026-03-05T11:00:00-05:00",
        "capacity": 1,
        "spots_available": 1
    }))
    .unwrap();
    assert_eq!(o.start_at, Utc.with_ymd_and_hms(2026, 3, 5, 15, 0, 0).unwrap());
}
