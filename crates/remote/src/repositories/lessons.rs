use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use serde_json::json;
use uuid::Uuid;

use coachline_core::{
    models::{
        lesson::{LessonNote, LessonWithClient},
        profile::Role,
    },
    query::Table,
};

use crate::{
    client::BackendClient,
    error::RemoteResult,
    postgrest::Query,
    repositories::schedule::timestamp,
};

const LESSON_WITH_CLIENT: &str = "*,client:profiles!lessons_client_id_fkey(*)";

/// Column that ties a lesson to the viewer.
fn owner_column(role: Role) -> &'static str {
    match role {
        Role::Coach => "coach_id",
        Role::Client => "client_id",
    }
}

#[automock]
#[async_trait]
pub trait LessonRepo: Send + Sync {
    /// Lessons of `user_id` as seen from `role`, oldest first. With `from`,
    /// only lessons starting at or after it.
    async fn list_lessons(
        &self,
        token: &str,
        role: Role,
        user_id: Uuid,
        from: Option<DateTime<Utc>>,
    ) -> RemoteResult<Vec<LessonWithClient>>;

    async fn get_lesson(&self, token: &str, lesson_id: Uuid) -> RemoteResult<Option<LessonWithClient>>;

    async fn list_notes(&self, token: &str, lesson_id: Uuid) -> RemoteResult<Vec<LessonNote>>;

    async fn add_note(&self, token: &str, lesson_id: Uuid, content: &str) -> RemoteResult<LessonNote>;
}

#[async_trait]
impl LessonRepo for BackendClient {
    async fn list_lessons(
        &self,
        token: &str,
        role: Role,
        user_id: Uuid,
        from: Option<DateTime<Utc>>,
    ) -> RemoteResult<Vec<LessonWithClient>> {
        let mut query = Query::table(Table::Lessons)
            .select(LESSON_WITH_CLIENT)
            .eq(owner_column(role), user_id);
        if let Some(from) = from {
            query = query.gte("start_at", timestamp(from));
        }
        self.select(token, &query.order("start_at", true)).await
    }

    async fn get_lesson(&self, token: &str, lesson_id: Uuid) -> RemoteResult<Option<LessonWithClient>> {
        let query = Query::table(Table::Lessons)
            .select(LESSON_WITH_CLIENT)
            .eq("id", lesson_id);
        self.select_one(token, query).await
    }

    async fn list_notes(&self, token: &str, lesson_id: Uuid) -> RemoteResult<Vec<LessonNote>> {
        let query = Query::table(Table::LessonNotes)
            .eq("lesson_id", lesson_id)
            .order("created_at", true);
        self.select(token, &query).await
    }

    async fn add_note(&self, token: &str, lesson_id: Uuid, content: &str) -> RemoteResult<LessonNote> {
        self.insert(
            token,
            Table::LessonNotes,
            &json!({ "lesson_id": lesson_id, "content": content }),
        )
        .await
    }
}
