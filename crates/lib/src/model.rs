//! Residents, groups and LLM models as the backend serves them, plus the kind tag
//! that selects schema and endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pagination;

/// Which collection a route, list or request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Residents,
    Groups,
    Models,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Residents, Kind::Groups, Kind::Models];

    /// Path segment used in routes and REST endpoints.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Residents => "residents",
            Kind::Groups => "groups",
            Kind::Models => "models",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for Kind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "residents" => Ok(Kind::Residents),
            "groups" => Ok(Kind::Groups),
            "models" => Ok(Kind::Models),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Active,
    Inactive,
}

/// A chat account; `is_agent` marks AI-backed residents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub resident_id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub is_agent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_timestamp_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_timestamp_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<LifecycleState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub alias: String,
    /// Member count.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmModel {
    pub provider: String,
    pub model_id: String,
    #[serde(default)]
    pub group_id: String,
    /// Parameter count in billions; may be fractional.
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub version: String,
}

/// Envelope of every collection response: `{ status, message, data }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResidentsData {
    #[serde(default)]
    pub residents: Vec<Resident>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupsData {
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsData {
    #[serde(default)]
    pub llm_model_list: Vec<LlmModel>,
}

/// Full, unpaginated list of one kind, tagged at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Residents(Vec<Resident>),
    Groups(Vec<Group>),
    Models(Vec<LlmModel>),
}

/// Borrowed item of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemRef<'a> {
    Resident(&'a Resident),
    Group(&'a Group),
    Model(&'a LlmModel),
}

impl<'a> ItemRef<'a> {
    /// The kind's identifier field (`resident_id`, `group_id` or `model_id`).
    pub fn id(&self) -> &'a str {
        match self {
            ItemRef::Resident(r) => &r.resident_id,
            ItemRef::Group(g) => &g.group_id,
            ItemRef::Model(m) => &m.model_id,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            ItemRef::Resident(_) => Kind::Residents,
            ItemRef::Group(_) => Kind::Groups,
            ItemRef::Model(_) => Kind::Models,
        }
    }
}

impl Collection {
    pub fn empty(kind: Kind) -> Self {
        match kind {
            Kind::Residents => Collection::Residents(Vec::new()),
            Kind::Groups => Collection::Groups(Vec::new()),
            Kind::Models => Collection::Models(Vec::new()),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Collection::Residents(_) => Kind::Residents,
            Collection::Groups(_) => Kind::Groups,
            Collection::Models(_) => Kind::Models,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::Residents(v) => v.len(),
            Collection::Groups(v) => v.len(),
            Collection::Models(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items of the 1-based `page`; empty past the last page.
    pub fn page(&self, page: u32) -> Vec<ItemRef<'_>> {
        match self {
            Collection::Residents(v) => pagination::page_slice(v, page)
                .iter()
                .map(ItemRef::Resident)
                .collect(),
            Collection::Groups(v) => pagination::page_slice(v, page)
                .iter()
                .map(ItemRef::Group)
                .collect(),
            Collection::Models(v) => pagination::page_slice(v, page)
                .iter()
                .map(ItemRef::Model)
                .collect(),
        }
    }

    /// Item whose identifier equals `id`, if present in this collection.
    pub fn find(&self, id: &str) -> Option<ItemRef<'_>> {
        match self {
            Collection::Residents(v) => v
                .iter()
                .find(|r| r.resident_id == id)
                .map(ItemRef::Resident),
            Collection::Groups(v) => v.iter().find(|g| g.group_id == id).map(ItemRef::Group),
            Collection::Models(v) => v.iter().find(|m| m.model_id == id).map(ItemRef::Model),
        }
    }

    /// Replace the stored copy of an edited resident (matched by identifier).
    pub fn replace_resident(&mut self, updated: &Resident) {
        if let Collection::Residents(v) = self {
            if let Some(slot) = v.iter_mut().find(|r| r.resident_id == updated.resident_id) {
                *slot = updated.clone();
            }
        }
    }

    /// Replace the stored copy of an edited group (matched by identifier).
    pub fn replace_group(&mut self, updated: &Group) {
        if let Collection::Groups(v) = self {
            if let Some(slot) = v.iter_mut().find(|g| g.group_id == updated.group_id) {
                *slot = updated.clone();
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn resident(id: &str) -> Resident {
        Resident {
            resident_id: id.to_string(),
            display_name: format!("Resident {}", id),
            avatar_url: format!("https://example.org/{}.png", id),
            is_agent: false,
            email: None,
            last_login_timestamp_ms: None,
            last_sync_timestamp_ms: None,
            role: Some(Role::User),
            agent: Some(AgentState::Disabled),
            state: Some(LifecycleState::Active),
            profile: None,
        }
    }

    pub fn group(id: &str) -> Group {
        Group {
            group_id: id.to_string(),
            name: format!("Group {}", id),
            alias: format!("#{}", id.to_lowercase()),
            size: 3,
            public: true,
            encryption: None,
            avatar_url: None,
            profile: None,
        }
    }

    pub fn residents(n: usize) -> Collection {
        Collection::Residents((1..=n).map(|i| resident(&format!("R{}", i))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn kind_round_trips_through_path_segment() {
        for kind in Kind::ALL {
            assert_eq!(kind.as_str().parse::<Kind>().unwrap(), kind);
        }
        assert!("users".parse::<Kind>().is_err());
    }

    #[test]
    fn residents_envelope_decodes() {
        let json = r#"{
            "status": "ok",
            "message": "",
            "data": { "residents": [
                { "resident_id": "R1", "display_name": "Ada", "avatar_url": "a.png", "is_agent": true,
                  "role": "admin", "agent": "enabled", "state": "active", "last_login_timestamp_ms": 1700000000000,
                  "access_token": "ignored" }
            ] }
        }"#;
        let resp: ApiResponse<ResidentsData> = serde_json::from_str(json).unwrap();
        let r = &resp.data.residents[0];
        assert_eq!(r.resident_id, "R1");
        assert!(r.is_agent);
        assert_eq!(r.role, Some(Role::Admin));
        assert_eq!(r.agent, Some(AgentState::Enabled));
        assert_eq!(r.last_login_timestamp_ms, Some(1_700_000_000_000));
    }

    #[test]
    fn models_envelope_uses_llm_model_list() {
        let json = r#"{ "status": "ok", "message": "", "data": { "llm_model_list": [
            { "provider": "qwen", "model_id": "M1", "group_id": "G1", "size": 7.5, "version": "2" }
        ] } }"#;
        let resp: ApiResponse<ModelsData> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.llm_model_list[0].size, 7.5);
    }

    #[test]
    fn find_matches_only_the_kinds_identifier() {
        let c = residents(3);
        assert_eq!(c.find("R2").map(|i| i.id()), Some("R2"));
        assert!(c.find("R9").is_none());
        let g = Collection::Groups(vec![group("G1")]);
        assert_eq!(g.find("G1").map(|i| i.kind()), Some(Kind::Groups));
    }

    #[test]
    fn page_is_a_slice_of_the_collection() {
        let c = residents(23);
        let ids: Vec<&str> = c.page(3).iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["R21", "R22", "R23"]);
        assert!(c.page(4).is_empty());
    }

    #[test]
    fn replace_resident_keeps_position() {
        let mut c = residents(3);
        let mut r = resident("R2");
        r.display_name = "Foo".to_string();
        c.replace_resident(&r);
        match c.find("R2") {
            Some(ItemRef::Resident(found)) => assert_eq!(found.display_name, "Foo"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c.page(1)[1].id(), "R2");
    }

    #[test]
    fn optional_fields_are_omitted_when_serialized() {
        let mut r = resident("R1");
        r.role = None;
        r.agent = None;
        r.state = None;
        let value = serde_json::to_value(&r).unwrap();
        assert!(value.get("email").is_none());
        assert!(value.get("role").is_none());
        assert_eq!(value["resident_id"], "R1");
    }
}
