//! Gym resources exposed by the REST API: typed records, their endpoints and
//! the query keys their reads are cached under.

pub mod models;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use models::{
    Category, Group, Member, Membership, NamedRef, Profile, Role, Specialization, Staff,
};

/// Standard response wrapper: `{ statusCode, message, data, success }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

/// Body of a mutation response; `data` is whatever the endpoint returns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl MessageResponse {
    /// The session token a login response carries, if any
    pub fn access_token(&self) -> Option<&str> {
        self.data
            .get("accessToken")
            .and_then(serde_json::Value::as_str)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Member,
    Staff,
    Role,
    Specialization,
    Group,
    Category,
    Membership,
}

/// REST routes for one resource, relative to the API base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub list: &'static str,
    pub detail: Option<&'static str>,
    pub create: &'static str,
    /// Id is appended as a path segment
    pub update: Option<&'static str>,
    /// Id is appended as a path segment
    pub delete: Option<&'static str>,
    /// Create sends `multipart/form-data` with an `image` part
    pub multipart: bool,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Member,
        ResourceKind::Staff,
        ResourceKind::Role,
        ResourceKind::Specialization,
        ResourceKind::Group,
        ResourceKind::Category,
        ResourceKind::Membership,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Member => "member",
            ResourceKind::Staff => "staff",
            ResourceKind::Role => "role",
            ResourceKind::Specialization => "specialization",
            ResourceKind::Group => "group",
            ResourceKind::Category => "category",
            ResourceKind::Membership => "membership",
        }
    }

    /// Human label used in notices ("Category already exists")
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Member => "Member",
            ResourceKind::Staff => "Staff member",
            ResourceKind::Role => "Role",
            ResourceKind::Specialization => "Specialization",
            ResourceKind::Group => "Group",
            ResourceKind::Category => "Category",
            ResourceKind::Membership => "Membership",
        }
    }

    /// Path segment of the list screen (`/member/list`)
    pub fn route_segment(&self) -> &'static str {
        match self {
            ResourceKind::Staff => "staff-member",
            other => other.name(),
        }
    }

    /// Cache key for the list read
    pub fn list_key(&self) -> &'static str {
        match self {
            ResourceKind::Member => "membersList",
            ResourceKind::Staff => "staffList",
            ResourceKind::Role => "rolesList",
            ResourceKind::Specialization => "specializationList",
            ResourceKind::Group => "groupList",
            ResourceKind::Category => "categoryList",
            ResourceKind::Membership => "membershipList",
        }
    }

    /// Cache key for detail reads
    pub fn detail_key(&self) -> String {
        format!("{}Detail", self.name())
    }

    pub fn endpoints(&self) -> Endpoints {
        match self {
            ResourceKind::Member => Endpoints {
                list: "memberManagement/get-members-list",
                detail: None,
                create: "memberManagement/add-member",
                update: None,
                delete: None,
                multipart: true,
            },
            ResourceKind::Staff => Endpoints {
                list: "memberManagement/get-staff-list",
                detail: None,
                create: "memberManagement/add-staff",
                update: None,
                delete: None,
                multipart: true,
            },
            ResourceKind::Role => Endpoints {
                list: "memberManagement/role-list",
                detail: None,
                create: "memberManagement/add-role",
                update: None,
                delete: None,
                multipart: false,
            },
            ResourceKind::Specialization => Endpoints {
                list: "memberManagement/specialization-list",
                detail: None,
                create: "memberManagement/add-specialization",
                update: None,
                delete: None,
                multipart: false,
            },
            ResourceKind::Group => Endpoints {
                list: "group/group-list",
                detail: None,
                create: "group/add-group",
                update: None,
                delete: None,
                multipart: false,
            },
            ResourceKind::Category => Endpoints {
                list: "memberShipTypes/category-list",
                detail: Some("memberShipTypes/category"),
                create: "memberShipTypes/add-category",
                update: Some("memberShipTypes/update-category"),
                delete: Some("memberShipTypes/delete-category"),
                multipart: false,
            },
            ResourceKind::Membership => Endpoints {
                list: "memberShipTypes/membership",
                detail: Some("memberShipTypes/memberShip-detail"),
                create: "memberShipTypes/add-memberShip",
                update: Some("memberShipTypes/memberShip-detail"),
                delete: Some("memberShipTypes/delete-memberShip"),
                multipart: false,
            },
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Account endpoints
pub mod user {
    pub const LOGIN: &str = "user/login";
    pub const REGISTER: &str = "user/register";
    pub const DETAILS: &str = "user/user-details";
    pub const UPDATE_PROFILE: &str = "user/update-profile";
    pub const PROFILE_KEY: &str = "profile";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_tolerates_missing_metadata() {
        let env: Envelope<Vec<Role>> = serde_json::from_value(json!({
            "data": [{ "_id": "1", "name": "Coach", "description": "Leads classes" }]
        }))
        .unwrap();
        assert_eq!(env.data.len(), 1);
        assert_eq!(env.message, None);
    }

    #[test]
    fn login_response_without_a_token_has_none() {
        let ok: MessageResponse = serde_json::from_value(json!({
            "message": "Login successful",
            "data": { "accessToken": "abc" }
        }))
        .unwrap();
        assert_eq!(ok.access_token(), Some("abc"));

        let empty: MessageResponse =
            serde_json::from_value(json!({ "message": "Login successful", "data": { "accessToken": "" } })).unwrap();
        assert_eq!(empty.access_token(), None);

        let missing: MessageResponse = serde_json::from_value(json!({ "message": "Login successful" })).unwrap();
        assert_eq!(missing.access_token(), None);
    }

    #[test]
    fn only_category_and_membership_support_edit_and_delete() {
        for kind in ResourceKind::ALL {
            let e = kind.endpoints();
            let editable = matches!(kind, ResourceKind::Category | ResourceKind::Membership);
            assert_eq!(e.update.is_some(), editable, "{kind}");
            assert_eq!(e.delete.is_some(), editable, "{kind}");
        }
    }

    #[test]
    fn member_and_staff_upload_images() {
        assert!(ResourceKind::Member.endpoints().multipart);
        assert!(ResourceKind::Staff.endpoints().multipart);
        assert!(!ResourceKind::Category.endpoints().multipart);
    }

    #[test]
    fn list_keys_are_unique() {
        let mut keys: Vec<_> = ResourceKind::ALL.iter().map(|k| k.list_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ResourceKind::ALL.len());
    }
}
