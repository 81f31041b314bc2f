use async_trait::async_trait;
use mockall::automock;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use coachline_core::{
    models::profile::{
        AppSettings, ClientSummary, NewPlayer, Player, PlayerUpdate, Profile, ProfileUpdate, Role,
    },
    query::Table,
};

use crate::{
    client::{BackendClient, Bearer, Credential},
    error::{RemoteError, RemoteResult},
    postgrest::Query,
};

#[automock]
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn get_profile(&self, token: &str, user_id: Uuid) -> RemoteResult<Option<Profile>>;

    async fn update_profile(
        &self,
        token: &str,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> RemoteResult<Profile>;

    async fn set_role(&self, token: &str, user_id: Uuid, role: Role) -> RemoteResult<()>;

    async fn get_app_settings(&self, token: &str) -> RemoteResult<Option<AppSettings>>;

    /// `ensure_profile_exists` procedure; idempotent.
    async fn ensure_profile_exists(&self, credential: &Credential, user_id: Uuid) -> RemoteResult<()>;

    /// `create_player` procedure.
    async fn create_player(&self, credential: &Credential, player: &NewPlayer) -> RemoteResult<()>;

    async fn list_players(&self, token: &str, account_id: Uuid) -> RemoteResult<Vec<Player>>;

    /// The account's primary player row.
    async fn primary_player(
        &self,
        credential: &Credential,
        account_id: Uuid,
    ) -> RemoteResult<Option<Player>>;

    /// Points `user_id`'s profile at the player row that identity plays as.
    async fn link_player(
        &self,
        credential: &Credential,
        user_id: Uuid,
        player_id: Uuid,
    ) -> RemoteResult<()>;

    async fn update_player(
        &self,
        token: &str,
        player_id: Uuid,
        update: &PlayerUpdate,
    ) -> RemoteResult<Player>;

    /// Client profiles with their players, for the coach roster.
    async fn list_clients(&self, token: &str) -> RemoteResult<Vec<ClientSummary>>;
}

#[async_trait]
impl ProfileRepo for BackendClient {
    async fn get_profile(&self, token: &str, user_id: Uuid) -> RemoteResult<Option<Profile>> {
        self.select_one(token, Query::table(Table::Profiles).eq("id", user_id))
            .await
    }

    async fn update_profile(
        &self,
        token: &str,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> RemoteResult<Profile> {
        let query = Query::table(Table::Profiles).eq("id", user_id);
        self.update::<Profile, _>(token, &query, update)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::api(404, "Profile not found"))
    }

    async fn set_role(&self, token: &str, user_id: Uuid, role: Role) -> RemoteResult<()> {
        info!(%user_id, role = role.as_str(), "writing derived role");
        let query = Query::table(Table::Profiles).eq("id", user_id);
        self.update::<serde_json::Value, _>(token, &query, &json!({ "role": role }))
            .await
            .map(|_| ())
    }

    async fn get_app_settings(&self, token: &str) -> RemoteResult<Option<AppSettings>> {
        self.select_one(token, Query::table(Table::AppSettings).order("id", true))
            .await
    }

    async fn ensure_profile_exists(&self, credential: &Credential, user_id: Uuid) -> RemoteResult<()> {
        self.rpc_void(
            Bearer::from(credential),
            "ensure_profile_exists",
            &json!({ "user_id": user_id }),
        )
        .await
    }

    async fn create_player(&self, credential: &Credential, player: &NewPlayer) -> RemoteResult<()> {
        self.rpc_void(Bearer::from(credential), "create_player", player)
            .await
    }

    async fn list_players(&self, token: &str, account_id: Uuid) -> RemoteResult<Vec<Player>> {
        let query = Query::table(Table::Players)
            .eq("account_id", account_id)
            .order("is_primary", false)
            .order("name", true);
        self.select(token, &query).await
    }

    async fn primary_player(
        &self,
        credential: &Credential,
        account_id: Uuid,
    ) -> RemoteResult<Option<Player>> {
        let query = Query::table(Table::Players)
            .eq("account_id", account_id)
            .eq("is_primary", true)
            .limit(1);
        let rows: Vec<Player> = self.select_as(Bearer::from(credential), &query).await?;
        Ok(rows.into_iter().next())
    }

    async fn link_player(
        &self,
        credential: &Credential,
        user_id: Uuid,
        player_id: Uuid,
    ) -> RemoteResult<()> {
        info!(%user_id, %player_id, "linking player identity");
        let query = Query::table(Table::Profiles).eq("id", user_id);
        let rows: Vec<serde_json::Value> = self
            .update_as(Bearer::from(credential), &query, &json!({ "player_id": player_id }))
            .await?;
        if rows.is_empty() {
            return Err(RemoteError::api(404, "Profile not found"));
        }
        Ok(())
    }

    async fn update_player(
        &self,
        token: &str,
        player_id: Uuid,
        update: &PlayerUpdate,
    ) -> RemoteResult<Player> {
        let query = Query::table(Table::Players).eq("id", player_id);
        self.update::<Player, _>(token, &query, update)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::api(404, "Player not found"))
    }

    async fn list_clients(&self, token: &str) -> RemoteResult<Vec<ClientSummary>> {
        let query = Query::table(Table::Profiles)
            .select("*,players(*)")
            .eq("role", "client")
            .order("full_name", true);
        self.select(token, &query).await
    }
}
