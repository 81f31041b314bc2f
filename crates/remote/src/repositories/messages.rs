use async_trait::async_trait;
use chrono::Utc;
use mockall::automock;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use coachline_core::{
    models::{
        messaging::{Conversation, ConversationWithClient, Message},
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

#[automock]
#[async_trait]
pub trait MessageRepo: Send + Sync {
    async fn list_conversations(
        &self,
        token: &str,
        role: Role,
        user_id: Uuid,
    ) -> RemoteResult<Vec<ConversationWithClient>>;

    async fn find_conversation(
        &self,
        token: &str,
        coach_id: Uuid,
        client_id: Uuid,
    ) -> RemoteResult<Option<Conversation>>;

    async fn get_conversation(&self, token: &str, conversation_id: Uuid) -> RemoteResult<Option<Conversation>>;

    async fn create_conversation(&self, token: &str, coach_id: Uuid, client_id: Uuid) -> RemoteResult<Conversation>;

    async fn list_messages(&self, token: &str, conversation_id: Uuid) -> RemoteResult<Vec<Message>>;

    async fn send_message(
        &self,
        token: &str,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> RemoteResult<Message>;

    /// Bumps `updated_at` so the thread sorts first.
    async fn touch_conversation(&self, token: &str, conversation_id: Uuid) -> RemoteResult<()>;

    /// Stamps `read_at` on the other party's unread messages; returns how
    /// many were marked.
    async fn mark_read(&self, token: &str, conversation_id: Uuid, reader_id: Uuid) -> RemoteResult<usize>;

    /// Messages addressed to `user_id` that are still unread.
    async fn unread_count(&self, token: &str, user_id: Uuid) -> RemoteResult<usize>;
}

#[async_trait]
impl MessageRepo for BackendClient {
    async fn list_conversations(
        &self,
        token: &str,
        role: Role,
        user_id: Uuid,
    ) -> RemoteResult<Vec<ConversationWithClient>> {
        let owner = match role {
            Role::Coach => "coach_id",
            Role::Client => "client_id",
        };
        let query = Query::table(Table::Conversations)
            .select("*,client:profiles!conversations_client_id_fkey(*)")
            .eq(owner, user_id)
            .order("updated_at", false);
        self.select(token, &query).await
    }

    async fn find_conversation(
        &self,
        token: &str,
        coach_id: Uuid,
        client_id: Uuid,
    ) -> RemoteResult<Option<Conversation>> {
        let query = Query::table(Table::Conversations)
            .eq("coach_id", coach_id)
            .eq("client_id", client_id);
        self.select_one(token, query).await
    }

    async fn get_conversation(&self, token: &str, conversation_id: Uuid) -> RemoteResult<Option<Conversation>> {
        self.select_one(token, Query::table(Table::Conversations).eq("id", conversation_id))
            .await
    }

    async fn create_conversation(&self, token: &str, coach_id: Uuid, client_id: Uuid) -> RemoteResult<Conversation> {
        debug!(%coach_id, %client_id, "creating conversation");
        self.insert(
            token,
            Table::Conversations,
            &json!({ "coach_id": coach_id, "client_id": client_id }),
        )
        .await
    }

    async fn list_messages(&self, token: &str, conversation_id: Uuid) -> RemoteResult<Vec<Message>> {
        let query = Query::table(Table::Messages)
            .eq("conversation_id", conversation_id)
            .order("created_at", true);
        self.select(token, &query).await
    }

    async fn send_message(
        &self,
        token: &str,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> RemoteResult<Message> {
        self.insert(
            token,
            Table::Messages,
            &json!({
                "conversation_id": conversation_id,
                "sender_id": sender_id,
                "content": content,
            }),
        )
        .await
    }

    async fn touch_conversation(&self, token: &str, conversation_id: Uuid) -> RemoteResult<()> {
        let query = Query::table(Table::Conversations).eq("id", conversation_id);
        self.update::<serde_json::Value, _>(token, &query, &json!({ "updated_at": timestamp(Utc::now()) }))
            .await
            .map(|_| ())
    }

    async fn mark_read(&self, token: &str, conversation_id: Uuid, reader_id: Uuid) -> RemoteResult<usize> {
        let query = Query::table(Table::Messages)
            .eq("conversation_id", conversation_id)
            .neq("sender_id", reader_id)
            .is_null("read_at");
        let marked = self
            .update::<serde_json::Value, _>(token, &query, &json!({ "read_at": timestamp(Utc::now()) }))
            .await?;
        Ok(marked.len())
    }

    async fn unread_count(&self, token: &str, user_id: Uuid) -> RemoteResult<usize> {
        let query = Query::table(Table::Messages)
            .select("id")
            .neq("sender_id", user_id)
            .is_null("read_at");
        let rows: Vec<serde_json::Value> = self.select(token, &query).await?;
        Ok(rows.len())
    }
}
