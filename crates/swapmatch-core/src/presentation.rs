//! Outbound views and their conversion to public JSON.
//!
//! Views are plain serializable structs built by the engine. [`present`]
//! encodes one and renames every internal `_id` key to `id`, at any depth.
//! Contact redaction is decided when a match view is built; a participant's
//! own request is never redacted.

use crate::error::Result;
use crate::rank::MatchType;
use crate::types::{ExchangeRequest, ParticipantId, RequestKind, Resource};
use serde::Serialize;
use serde_json::{Map, Value};

const INTERNAL_ID_KEY: &str = "_id";
const PUBLIC_ID_KEY: &str = "id";

/// Encode a view for delivery.
pub fn present<T: Serialize + ?Sized>(view: &T) -> Result<Value> {
    Ok(to_public(serde_json::to_value(view)?))
}

/// Rename internal primary keys to `id`, recursively.
pub fn to_public(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                let key = if key == INTERNAL_ID_KEY {
                    PUBLIC_ID_KEY.to_string()
                } else {
                    key
                };
                out.insert(key, to_public(inner));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(to_public).collect()),
        other => other,
    }
}

/// The contact to show a counterpart: the real one once disclosed,
/// otherwise the placeholder.
pub fn contact_for(contact: &str, disclosed: bool, placeholder: &str) -> String {
    if disclosed {
        contact.to_string()
    } else {
        placeholder.to_string()
    }
}

/// A participant's own request. Never redacted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnRequestView {
    #[serde(flatten)]
    pub request: ExchangeRequest,
    pub is_own: bool,
}

impl From<ExchangeRequest> for OwnRequestView {
    fn from(request: ExchangeRequest) -> Self {
        Self {
            request,
            is_own: true,
        }
    }
}

/// One preference-kind match from the caller's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutualMatchView {
    pub other_user_id: ParticipantId,
    pub other_user_name: String,
    pub other_held_resource: Resource,
    pub other_held_resource_detail: Option<String>,
    /// Caller's rank for the counterpart's held resource.
    pub my_preference_level: u8,
    /// Counterpart's rank for the caller's held resource.
    pub they_want_my_level: u8,
    pub mutually_confirmed: bool,
    pub i_expressed_interest: bool,
    pub they_expressed_interest: bool,
    pub other_contact_display: String,
    pub other_first_choice: Option<Resource>,
    pub other_second_choice: Option<Resource>,
    pub other_third_choice: Option<Resource>,
}

/// A counterpart in a cycle-kind match or the global pair listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyView {
    pub user_id: ParticipantId,
    pub user_name: String,
    pub held_resource: Resource,
    pub held_resource_detail: Option<String>,
    pub desired_resource: Option<Resource>,
    pub contact_display: String,
}

impl PartyView {
    pub fn new(request: &ExchangeRequest, contact_display: String) -> Self {
        Self {
            user_id: request.owner_id.clone(),
            user_name: request.owner_name.clone(),
            held_resource: request.held_resource.clone(),
            held_resource_detail: request.held_resource_detail.clone(),
            desired_resource: request
                .desired
                .ranked()
                .first()
                .map(|(_, resource)| (*resource).clone()),
            contact_display,
        }
    }
}

/// One cycle-kind match from the caller's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleMatchView {
    pub match_type: MatchType,
    /// The party whose resource the caller receives.
    pub other: PartyView,
    /// The party who receives the caller's resource, for chains.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub third: Option<PartyView>,
}

/// One mutual pair in the global listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairMatchView {
    pub kind: RequestKind,
    pub a: PartyView,
    pub b: PartyView,
    /// a's rank for b's held resource.
    pub a_preference_level: u8,
    /// b's rank for a's held resource.
    pub b_preference_level: u8,
    pub mutually_confirmed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DesiredResources, Participant};
    use serde_json::json;

    fn request() -> ExchangeRequest {
        ExchangeRequest::new(
            &Participant::new("u1", "Ana", "ana@example.edu"),
            Resource::new("Hall B").unwrap(),
            Some("2".into()),
            DesiredResources::Single(Resource::new("Hall C").unwrap()),
        )
    }

    #[test]
    fn test_to_public_renames_nested_ids() {
        let value = json!({
            "_id": "abc",
            "items": [{"_id": 1, "name": "x"}],
            "inner": {"_id": null, "id_like": "_id"}
        });

        let public = to_public(value);
        assert_eq!(
            public,
            json!({
                "id": "abc",
                "items": [{"id": 1, "name": "x"}],
                "inner": {"id": null, "id_like": "_id"}
            })
        );
    }

    #[test]
    fn test_own_request_view_is_public_and_unredacted() {
        let req = request();
        let id = req.id;
        let value = present(&OwnRequestView::from(req)).unwrap();

        assert_eq!(value["id"], json!(id.to_string()));
        assert!(value.get("_id").is_none());
        assert_eq!(value["is_own"], json!(true));
        assert_eq!(value["owner_contact"], json!("ana@example.edu"));
        assert_eq!(value["kind"], json!("cycle"));
    }

    #[test]
    fn test_contact_for() {
        assert_eq!(contact_for("a@b", true, "hidden"), "a@b");
        assert_eq!(contact_for("a@b", false, "hidden"), "hidden");
    }

    #[test]
    fn test_cycle_view_omits_missing_third() {
        let req = request();
        let view = CycleMatchView {
            match_type: MatchType::DirectSwap,
            other: PartyView::new(&req, "hidden".into()),
            third: None,
        };
        let value = present(&view).unwrap();
        assert_eq!(value["match_type"], json!("direct_swap"));
        assert_eq!(value["other"]["desired_resource"], json!("Hall C"));
        assert!(value.get("third").is_none());
    }
}
