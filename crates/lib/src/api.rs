//! REST client for the admin backend (http://127.0.0.1:8000/api by default).
//! Collections come wrapped in a `{ status, message, data }` envelope; mutations only
//! report success through the status code.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::{
    ApiResponse, Collection, Group, GroupsData, Kind, ModelsData, Resident, ResidentsData,
};

/// Join `path` onto `base`, with exactly one slash between them.
pub fn build_api_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("api request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("api error: {status} {body}")]
    Status { status: u16, body: String },
    #[error("api response malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Whose profile a profile request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOwner {
    Resident,
    Group,
}

impl ProfileOwner {
    fn path_segment(self) -> &'static str {
        match self {
            ProfileOwner::Resident => "resident_profile",
            ProfileOwner::Group => "group_profile",
        }
    }

    /// Profile owner for a kind; models have no profile.
    pub fn for_kind(kind: Kind) -> Option<Self> {
        match kind {
            Kind::Residents => Some(ProfileOwner::Resident),
            Kind::Groups => Some(ProfileOwner::Group),
            Kind::Models => None,
        }
    }
}

#[derive(Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    profile: Option<String>,
}

#[derive(Serialize)]
struct ProfileBody<'a> {
    profile_text: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// Client for the admin REST API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    bearer: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            bearer: None,
        }
    }

    /// Attach `Authorization: Bearer <token>` to every request when a token is given.
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = build_api_url(&self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let res = builder.send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            log::warn!("api call failed with {}", status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(self.request(reqwest::Method::GET, path)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET /<kind>: the full collection of one kind.
    pub async fn fetch_collection(&self, kind: Kind) -> Result<Collection, ApiError> {
        log::debug!("fetching {}", kind);
        let path = kind.as_str();
        Ok(match kind {
            Kind::Residents => {
                let resp: ApiResponse<ResidentsData> = self.get_json(path).await?;
                Collection::Residents(resp.data.residents)
            }
            Kind::Groups => {
                let resp: ApiResponse<GroupsData> = self.get_json(path).await?;
                Collection::Groups(resp.data.groups)
            }
            Kind::Models => {
                let resp: ApiResponse<ModelsData> = self.get_json(path).await?;
                Collection::Models(resp.data.llm_model_list)
            }
        })
    }

    /// PUT /residents/<id> with the full record.
    pub async fn update_resident(&self, resident: &Resident) -> Result<(), ApiError> {
        let path = format!("residents/{}", urlencoding::encode(&resident.resident_id));
        self.send(self.request(reqwest::Method::PUT, &path).json(resident))
            .await?;
        Ok(())
    }

    /// PUT /groups/<id> with the full record.
    pub async fn update_group(&self, group: &Group) -> Result<(), ApiError> {
        let path = format!("groups/{}", urlencoding::encode(&group.group_id));
        self.send(self.request(reqwest::Method::PUT, &path).json(group))
            .await?;
        Ok(())
    }

    /// GET /resident_profile/<id> or /group_profile/<id>. A missing or null profile is "".
    pub async fn fetch_profile(&self, owner: ProfileOwner, id: &str) -> Result<String, ApiError> {
        let path = format!("{}/{}", owner.path_segment(), urlencoding::encode(id));
        let resp: ProfileResponse = self.get_json(&path).await?;
        Ok(resp.profile.unwrap_or_default())
    }

    /// POST /<owner>_profile/<id>/ with `{ profile_text }`. The text is sent verbatim.
    pub async fn save_profile(
        &self,
        owner: ProfileOwner,
        id: &str,
        text: &str,
    ) -> Result<(), ApiError> {
        let path = format!("{}/{}/", owner.path_segment(), urlencoding::encode(id));
        let body = ProfileBody { profile_text: text };
        self.send(self.request(reqwest::Method::POST, &path).json(&body))
            .await?;
        Ok(())
    }

    /// PUT /register with `{ username, password }`.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let body = RegisterBody { username, password };
        self.send(self.request(reqwest::Method::PUT, "register").json(&body))
            .await?;
        log::info!("registered resident {}", username);
        Ok(())
    }

    /// POST /agents/run
    pub async fn run_agents(&self) -> Result<(), ApiError> {
        self.send(self.request(reqwest::Method::POST, "agents/run"))
            .await?;
        Ok(())
    }

    /// POST /agents/stop
    pub async fn stop_agents(&self) -> Result<(), ApiError> {
        self.send(self.request(reqwest::Method::POST, "agents/stop"))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_join_has_single_slash() {
        assert_eq!(
            build_api_url("http://h/api/", "/residents"),
            "http://h/api/residents"
        );
        assert_eq!(build_api_url("http://h/api", "groups/G1"), "http://h/api/groups/G1");
        assert_eq!(
            build_api_url("http://h/api", "resident_profile/R1/"),
            "http://h/api/resident_profile/R1/"
        );
    }

    #[test]
    fn profile_owner_follows_kind() {
        assert_eq!(ProfileOwner::for_kind(Kind::Residents), Some(ProfileOwner::Resident));
        assert_eq!(ProfileOwner::for_kind(Kind::Groups), Some(ProfileOwner::Group));
        assert_eq!(ProfileOwner::for_kind(Kind::Models), None);
    }

    #[test]
    fn blank_token_is_not_attached() {
        let client = ApiClient::new("http://h/api/").with_bearer(Some(String::new()));
        assert!(client.bearer.is_none());
        assert_eq!(client.base_url(), "http://h/api");
    }
}
