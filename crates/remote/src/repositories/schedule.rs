use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use mockall::automock;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use coachline_core::{
    models::schedule::{AvailabilityTemplate, NewOpening, NewTemplate, Opening},
    query::Table,
};

use crate::{
    client::{BackendClient, Bearer},
    error::{RemoteError, RemoteResult},
    postgrest::Query,
};

pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[automock]
#[async_trait]
pub trait ScheduleRepo: Send + Sync {
    async fn list_templates(&self, token: &str, coach_id: Uuid) -> RemoteResult<Vec<AvailabilityTemplate>>;

    async fn create_template(&self, token: &str, template: &NewTemplate) -> RemoteResult<AvailabilityTemplate>;

    async fn set_template_active(
        &self,
        token: &str,
        template_id: Uuid,
        active: bool,
    ) -> RemoteResult<AvailabilityTemplate>;

    async fn delete_template(&self, token: &str, template_id: Uuid) -> RemoteResult<()>;

    /// `generate_openings` procedure; returns how many openings were created.
    async fn generate_openings(&self, token: &str, weeks: i32) -> RemoteResult<i64>;

    async fn list_openings(
        &self,
        token: &str,
        coach_id: Uuid,
        from: DateTime<Utc>,
    ) -> RemoteResult<Vec<Opening>>;

    /// Future openings with at least one spot left.
    async fn list_bookable_openings(&self, token: &str, from: DateTime<Utc>) -> RemoteResult<Vec<Opening>>;

    async fn get_opening(&self, token: &str, opening_id: Uuid) -> RemoteResult<Option<Opening>>;

    async fn create_opening(&self, token: &str, opening: &NewOpening) -> RemoteResult<Opening>;

    async fn delete_opening(&self, token: &str, opening_id: Uuid) -> RemoteResult<()>;
}

#[async_trait]
impl ScheduleRepo for BackendClient {
    async fn list_templates(&self, token: &str, coach_id: Uuid) -> RemoteResult<Vec<AvailabilityTemplate>> {
        let query = Query::table(Table::AvailabilityTemplates)
            .eq("coach_id", coach_id)
            .order("weekday", true)
            .order("start_time", true);
        self.select(token, &query).await
    }

    async fn create_template(&self, token: &str, template: &NewTemplate) -> RemoteResult<AvailabilityTemplate> {
        self.insert(token, Table::AvailabilityTemplates, template).await
    }

    async fn set_template_active(
        &self,
        token: &str,
        template_id: Uuid,
        active: bool,
    ) -> RemoteResult<AvailabilityTemplate> {
        let query = Query::table(Table::AvailabilityTemplates).eq("id", template_id);
        self.update::<AvailabilityTemplate, _>(token, &query, &json!({ "active": active }))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::api(404, "Availability template not found"))
    }

    async fn delete_template(&self, token: &str, template_id: Uuid) -> RemoteResult<()> {
        self.delete(token, &Query::table(Table::AvailabilityTemplates).eq("id", template_id))
            .await
    }

    async fn generate_openings(&self, token: &str, weeks: i32) -> RemoteResult<i64> {
        let created: i64 = self
            .rpc(Bearer::User(token), "generate_openings", &json!({ "weeks": weeks }))
            .await?;
        info!(weeks, created, "generated openings");
        Ok(created)
    }

    async fn list_openings(
        &self,
        token: &str,
        coach_id: Uuid,
        from: DateTime<Utc>,
    ) -> RemoteResult<Vec<Opening>> {
        let query = Query::table(Table::Openings)
            .eq("coach_id", coach_id)
            .gte("start_at", timestamp(from))
            .order("start_at", true);
        self.select(token, &query).await
    }

    async fn list_bookable_openings(&self, token: &str, from: DateTime<Utc>) -> RemoteResult<Vec<Opening>> {
        let query = Query::table(Table::Openings)
            .gt("start_at", timestamp(from))
            .gt("spots_available", 0)
            .order("start_at", true);
        self.select(token, &query).await
    }

    async fn get_opening(&self, token: &str, opening_id: Uuid) -> RemoteResult<Option<Opening>> {
        self.select_one(token, Query::table(Table::Openings).eq("id", opening_id))
            .await
    }

    async fn create_opening(&self, token: &str, opening: &NewOpening) -> RemoteResult<Opening> {
        self.insert(token, Table::Openings, opening).await
    }

    async fn delete_opening(&self, token: &str, opening_id: Uuid) -> RemoteResult<()> {
        self.delete(token, &Query::table(Table::Openings).eq("id", opening_id))
            .await
    }
}
