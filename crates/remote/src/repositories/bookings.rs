use async_trait::async_trait;
use mockall::automock;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use coachline_core::{
    models::booking::{BookingWithDetails, Decision},
    query::Table,
};

use crate::{
    client::{BackendClient, Bearer},
    error::RemoteResult,
    postgrest::Query,
};

const BOOKING_DETAILS: &str = "*,opening:openings(*),client:profiles(*)";

#[automock]
#[async_trait]
pub trait BookingRepo: Send + Sync {
    /// `request_booking` procedure. Retried calls with the same
    /// `idempotency_key` resolve to the same booking.
    async fn request_booking(
        &self,
        token: &str,
        opening_id: Uuid,
        idempotency_key: Uuid,
        location_requested: Option<String>,
    ) -> RemoteResult<Uuid>;

    /// `decide_booking` procedure.
    async fn decide_booking(&self, token: &str, booking_id: Uuid, decision: Decision) -> RemoteResult<()>;

    async fn list_pending_requests(&self, token: &str, coach_id: Uuid) -> RemoteResult<Vec<BookingWithDetails>>;

    async fn list_client_bookings(&self, token: &str, client_id: Uuid) -> RemoteResult<Vec<BookingWithDetails>>;
}

#[async_trait]
impl BookingRepo for BackendClient {
    async fn request_booking(
        &self,
        token: &str,
        opening_id: Uuid,
        idempotency_key: Uuid,
        location_requested: Option<String>,
    ) -> RemoteResult<Uuid> {
        let booking_id: Uuid = self
            .rpc(
                Bearer::User(token),
                "request_booking",
                &json!({
                    "opening_id": opening_id,
                    "idempotency_key": idempotency_key,
                    "location_requested": location_requested,
                }),
            )
            .await?;
        info!(%opening_id, %booking_id, "booking requested");
        Ok(booking_id)
    }

    async fn decide_booking(&self, token: &str, booking_id: Uuid, decision: Decision) -> RemoteResult<()> {
        self.rpc_void(
            Bearer::User(token),
            "decide_booking",
            &json!({ "booking_id": booking_id, "decision": decision }),
        )
        .await?;
        info!(%booking_id, decision = decision.as_str(), "booking decided");
        Ok(())
    }

    async fn list_pending_requests(&self, token: &str, coach_id: Uuid) -> RemoteResult<Vec<BookingWithDetails>> {
        let query = Query::table(Table::Bookings)
            .select("*,opening:openings!inner(*),client:profiles(*)")
            .eq("status", "pending")
            .eq("opening.coach_id", coach_id)
            .order("created_at", true);
        self.select(token, &query).await
    }

    async fn list_client_bookings(&self, token: &str, client_id: Uuid) -> RemoteResult<Vec<BookingWithDetails>> {
        let query = Query::table(Table::Bookings)
            .select(BOOKING_DETAILS)
            .eq("client_id", client_id)
            .order("created_at", false);
        self.select(token, &query).await
    }
}
