//! # View keys and change signals
//!
//! Every cached screen is named by a [`QueryKey`]. Every remote write, local
//! or reported by the backend, is described by a [`ChangeEvent`]. The view
//! cache invalidates exactly the keys whose data depends on the changed
//! table, which makes change events the single refresh path for all views.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::profile::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Profiles,
    Players,
    AvailabilityTemplates,
    Openings,
    Bookings,
    Lessons,
    LessonNotes,
    Conversations,
    Messages,
    AppSettings,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Players => "players",
            Table::AvailabilityTemplates => "availability_templates",
            Table::Openings => "openings",
            Table::Bookings => "bookings",
            Table::Lessons => "lessons",
            Table::LessonNotes => "lesson_notes",
            Table::Conversations => "conversations",
            Table::Messages => "messages",
            Table::AppSettings => "app_settings",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "profiles" => Table::Profiles,
            "players" => Table::Players,
            "availability_templates" => Table::AvailabilityTemplates,
            "openings" => Table::Openings,
            "bookings" => Table::Bookings,
            "lessons" => Table::Lessons,
            "lesson_notes" => Table::LessonNotes,
            "conversations" => Table::Conversations,
            "messages" => Table::Messages,
            "app_settings" => Table::AppSettings,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "view", content = "id", rename_all = "snake_case")]
pub enum QueryKey {
    CoachDashboard,
    ClientDashboard,
    Templates,
    Openings,
    BookableOpenings,
    PendingRequests,
    MyBookings,
    Lessons,
    Lesson(Uuid),
    Conversations,
    Profile,
    Players,
    Clients,
}

impl QueryKey {
    /// Tables whose rows feed this view.
    pub fn sources(&self) -> &'static [Table] {
        use Table::*;
        match self {
            QueryKey::CoachDashboard => &[Lessons, Bookings, Messages, Profiles],
            QueryKey::ClientDashboard => &[Lessons, Bookings, Openings, Messages, Profiles],
            QueryKey::Templates => &[AvailabilityTemplates],
            QueryKey::Openings => &[Openings],
            QueryKey::BookableOpenings => &[Openings, Bookings],
            QueryKey::PendingRequests => &[Bookings, Openings, Profiles],
            QueryKey::MyBookings => &[Bookings, Openings],
            QueryKey::Lessons => &[Lessons, Profiles],
            QueryKey::Lesson(_) => &[Lessons, LessonNotes, Profiles],
            QueryKey::Conversations => &[Conversations, Messages, Profiles],
            QueryKey::Profile => &[Profiles],
            QueryKey::Players => &[Players],
            QueryKey::Clients => &[Profiles, Players],
        }
    }

    pub fn depends_on(&self, table: Table) -> bool {
        self.sources().contains(&table)
    }

    /// The list screens a role can have open.
    pub fn for_role(role: Role) -> &'static [QueryKey] {
        match role {
            Role::Coach => &[
                QueryKey::CoachDashboard,
                QueryKey::Templates,
                QueryKey::Openings,
                QueryKey::PendingRequests,
                QueryKey::Lessons,
                QueryKey::Conversations,
                QueryKey::Clients,
                QueryKey::Profile,
            ],
            Role::Client => &[
                QueryKey::ClientDashboard,
                QueryKey::BookableOpenings,
                QueryKey::MyBookings,
                QueryKey::Lessons,
                QueryKey::Conversations,
                QueryKey::Players,
                QueryKey::Profile,
            ],
        }
    }
}

/// A write that happened to `table`, optionally naming the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub record_id: Option<Uuid>,
}

impl ChangeEvent {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            record_id: None,
        }
    }

    pub fn row(table: Table, record_id: Uuid) -> Self {
        Self {
            table,
            record_id: Some(record_id),
        }
    }
}

impl ChangeEvent {
    /// Whether any screen `role` can show reads from the changed table.
    pub fn concerns(&self, role: Role) -> bool {
        self.table == Table::LessonNotes
            || QueryKey::for_role(role)
                .iter()
                .any(|key| key.depends_on(self.table))
    }
}

/// Row-change payload posted by the backend's database webhooks.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub table: String,
    #[serde(default)]
    pub record: Option<Value>,
    #[serde(default)]
    pub old_record: Option<Value>,
}

impl ChangeNotification {
    /// `None` for tables no view reads from.
    pub fn event(&self) -> Option<ChangeEvent> {
        let table = Table::from_name(&self.table)?;
        let record_id = [&self.record, &self.old_record]
            .into_iter()
            .flatten()
            .find_map(|row| row.get("id")?.as_str()?.parse::<Uuid>().ok());
        Some(ChangeEvent { table, record_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_round_trip() {
        for table in [
            Table::Profiles,
            Table::Players,
            Table::AvailabilityTemplates,
            Table::Openings,
            Table::Bookings,
            Table::Lessons,
            Table::LessonNotes,
            Table::Conversations,
            Table::Messages,
            Table::AppSettings,
        ] {
            assert_eq!(Table::from_name(table.name()), Some(table));
        }
        assert_eq!(Table::from_name("schedules"), None);
    }

    #[test]
    fn booking_writes_invalidate_request_and_booking_views() {
        assert!(QueryKey::PendingRequests.depends_on(Table::Bookings));
        assert!(QueryKey::BookableOpenings.depends_on(Table::Bookings));
        assert!(!QueryKey::Templates.depends_on(Table::Bookings));
    }

    #[test]
    fn deletes_are_identified_by_the_old_row() {
        let id = Uuid::new_v4();
        let notification: ChangeNotification = serde_json::from_value(serde_json::json!({
            "type": "DELETE",
            "table": "openings",
            "record": null,
            "old_record": { "id": id.to_string() }
        }))
        .unwrap();

        assert_eq!(notification.kind, "DELETE");
        assert_eq!(notification.event(), Some(ChangeEvent::row(Table::Openings, id)));
    }

    #[test]
    fn unknown_tables_produce_no_event() {
        let notification: ChangeNotification = serde_json::from_value(serde_json::json!({
            "type": "INSERT",
            "table": "audit_log",
            "record": { "id": 7 }
        }))
        .unwrap();

        assert_eq!(notification.event(), None);
    }

    #[test]
    fn templates_concern_only_the_coach() {
        let event = ChangeEvent::new(Table::AvailabilityTemplates);
        assert!(event.concerns(Role::Coach));
        assert!(!event.concerns(Role::Client));
        assert!(ChangeEvent::new(Table::Bookings).concerns(Role::Client));
    }
}
