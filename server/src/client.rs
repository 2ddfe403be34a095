//! HTTP client for the IM API
//!
//! One async method per endpoint. Non-2xx responses are decoded from the
//! `{error, code, message}` body into [`ClientError::Api`].

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::routes::health::HealthResponse;
use crate::api::routes::identity::types::{
    ComparePasswordResponse, CreateGroupRequest, CreateUserRequest, DescribeGroupsResponse,
    DescribeUsersResponse, GroupDto, GroupIdsRequest, GroupSetResponse, JoinGroupResponse,
    LeaveGroupResponse, MembershipRequest, ModifyPasswordResponse, PasswordRequest, UserDto,
    UserIdsRequest, UserIdsResponse, UserSetResponse,
};
use crate::core::config::{ServerConfig, is_all_interfaces};
use crate::core::constants::CLIENT_TIMEOUT_SECS;
use crate::domain::identity::{DescribeGroupsRequest, DescribeUsersRequest};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Client configuration error: {0}")]
    Config(String),
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Clone)]
pub struct ImClient {
    client: reqwest::Client,
    base_url: String,
}

impl ImClient {
    /// Client for a server at `host:port`. A wildcard bind address is
    /// reached through loopback.
    pub fn new(host: &str, port: u16) -> Result<Self, ClientError> {
        let host = if is_all_interfaces(host) {
            "127.0.0.1"
        } else {
            host
        };
        let base_url = if host.contains(':') {
            format!("http://[{}]:{}", host, port)
        } else {
            format!("http://{}:{}", host, port)
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(%base_url, "IM client initialized");
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, ClientError> {
        Self::new(&config.host, config.port)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let text = resp.text().await?;
        let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.code, body.message),
            Err(_) => ("HTTP_ERROR".to_string(), text),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.post(&url).json(body).send().await?;
        Self::decode(resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/api/v1/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Self::decode(resp).await
    }

    pub async fn create_user(&self, req: &CreateUserRequest) -> Result<UserDto, ClientError> {
        self.post("/api/v1/users", req).await
    }

    pub async fn describe_users(
        &self,
        req: &DescribeUsersRequest,
    ) -> Result<DescribeUsersResponse, ClientError> {
        self.post("/api/v1/users/describe", req).await
    }

    pub async fn create_group(&self, req: &CreateGroupRequest) -> Result<GroupDto, ClientError> {
        self.post("/api/v1/groups", req).await
    }

    pub async fn describe_groups(
        &self,
        req: &DescribeGroupsRequest,
    ) -> Result<DescribeGroupsResponse, ClientError> {
        self.post("/api/v1/groups/describe", req).await
    }

    pub async fn join_group(
        &self,
        user_ids: &[String],
        group_ids: &[String],
    ) -> Result<JoinGroupResponse, ClientError> {
        let body = MembershipRequest {
            user_ids: user_ids.to_vec(),
            group_ids: group_ids.to_vec(),
        };
        self.post("/api/v1/groups/join", &body).await
    }

    /// Returns the number of bindings removed
    pub async fn leave_group(
        &self,
        user_ids: &[String],
        group_ids: &[String],
    ) -> Result<u64, ClientError> {
        let body = MembershipRequest {
            user_ids: user_ids.to_vec(),
            group_ids: group_ids.to_vec(),
        };
        let resp: LeaveGroupResponse = self.post("/api/v1/groups/leave", &body).await?;
        Ok(resp.removed)
    }

    pub async fn get_groups_by_user_ids(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<GroupDto>, ClientError> {
        let body = UserIdsRequest {
            user_ids: user_ids.to_vec(),
        };
        let resp: GroupSetResponse = self.post("/api/v1/groups/by-users", &body).await?;
        Ok(resp.group_set)
    }

    pub async fn get_users_by_group_ids(
        &self,
        group_ids: &[String],
    ) -> Result<Vec<UserDto>, ClientError> {
        let body = GroupIdsRequest {
            group_ids: group_ids.to_vec(),
        };
        let resp: UserSetResponse = self.post("/api/v1/users/by-groups", &body).await?;
        Ok(resp.user_set)
    }

    pub async fn get_user_ids_by_group_ids(
        &self,
        group_ids: &[String],
    ) -> Result<Vec<String>, ClientError> {
        let body = GroupIdsRequest {
            group_ids: group_ids.to_vec(),
        };
        let resp: UserIdsResponse = self.post("/api/v1/users/ids-by-groups", &body).await?;
        Ok(resp.user_ids)
    }

    pub async fn compare_password(&self, user_id: &str, password: &str) -> Result<bool, ClientError> {
        let body = PasswordRequest {
            user_id: user_id.to_string(),
            password: password.to_string(),
        };
        let resp: ComparePasswordResponse = self.post("/api/v1/passwords/compare", &body).await?;
        Ok(resp.is_match)
    }

    pub async fn modify_password(&self, user_id: &str, password: &str) -> Result<(), ClientError> {
        let body = PasswordRequest {
            user_id: user_id.to_string(),
            password: password.to_string(),
        };
        let _: ModifyPasswordResponse = self.post("/api/v1/passwords/modify", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::net::TcpListener;

    use super::*;
    use crate::api::ApiServer;
    use crate::data::SqliteService;
    use crate::domain::IdentityService;

    async fn spawn_server() -> ImClient {
        let db = Arc::new(SqliteService::in_memory().await.unwrap());
        let router = ApiServer::router(db.clone(), IdentityService::new(db));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        ImClient::new("127.0.0.1", port).unwrap()
    }

    #[test]
    fn test_base_url() {
        assert_eq!(
            ImClient::new("0.0.0.0", 9119).unwrap().base_url(),
            "http://127.0.0.1:9119"
        );
        assert_eq!(
            ImClient::new("::1", 80).unwrap().base_url(),
            "http://[::1]:80"
        );
        let config = ServerConfig {
            host: "example.internal".into(),
            port: 8080,
        };
        assert_eq!(
            ImClient::from_config(&config).unwrap().base_url(),
            "http://example.internal:8080"
        );
    }

    #[tokio::test]
    async fn test_client_round_trip() {
        let client = spawn_server().await;
        assert_eq!(client.health().await.unwrap().status, "ok");

        let user = client
            .create_user(&CreateUserRequest {
                username: "ann".into(),
                email: "ann@example.com".into(),
                password: "pw".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let root = client
            .create_group(&CreateGroupRequest {
                name: "root".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let child = client
            .create_group(&CreateGroupRequest {
                parent_group_id: root.group_id.clone(),
                name: "child".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let users = vec![user.user_id.clone()];
        let groups = vec![child.group_id.clone()];
        let joined = client.join_group(&users, &groups).await.unwrap();
        assert_eq!(joined.bindings.len(), 1);

        let subtree = client
            .describe_groups(&DescribeGroupsRequest {
                root_group_id: vec![root.group_id.clone()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(subtree.total_count, 2);

        let found = client
            .describe_users(&DescribeUsersRequest {
                user_id: users.clone(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.user_set, vec![user.clone()]);

        assert_eq!(client.get_groups_by_user_ids(&users).await.unwrap().len(), 1);
        assert_eq!(client.get_users_by_group_ids(&groups).await.unwrap().len(), 1);
        assert_eq!(client.get_user_ids_by_group_ids(&groups).await.unwrap(), users);

        assert!(client.compare_password(&user.user_id, "pw").await.unwrap());
        client.modify_password(&user.user_id, "pw2").await.unwrap();
        assert!(!client.compare_password(&user.user_id, "pw").await.unwrap());

        assert_eq!(client.leave_group(&users, &groups).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_api_errors_are_decoded() {
        let client = spawn_server().await;

        let err = client.leave_group(&[], &[]).await.unwrap_err();
        match err {
            ClientError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, "INVALID_ARGUMENT");
                assert!(message.contains("empty user id or group id"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = client.compare_password("usr-missing", "x").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));
    }
}
