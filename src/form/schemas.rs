//! Field schemas of every add/edit screen.

use super::schema::{FieldRule, FieldSpec, FormMode, FormSchema};
use crate::guard::Route;
use crate::resources::ResourceKind;

const FIRST_NAME: FieldSpec = FieldSpec::text(
    "firstName",
    "First Name",
    &[FieldRule::MinLength(3, "First Name must be at least 3 characters")],
);
const LAST_NAME: FieldSpec = FieldSpec::text(
    "lastName",
    "Last Name",
    &[FieldRule::MinLength(3, "Last Name must be at least 3 characters")],
);
const EMAIL: FieldSpec = FieldSpec::text("email", "Email", &[FieldRule::Email("Invalid email address")]);
const PHONE: FieldSpec = FieldSpec::text("phone", "Phone", &[FieldRule::MinLength(10, "Phone number is too short")]);
const ADDRESS: FieldSpec = FieldSpec::text("address", "Address", &[]).optional();
const CITY: FieldSpec = FieldSpec::text("city", "City", &[]).optional();
const STATE: FieldSpec = FieldSpec::text("state", "State", &[]).optional();
const GENDER: FieldSpec = FieldSpec::text("gender", "Gender", &[FieldRule::MinLength(1, "Please select a gender")]);
const DATE_OF_BIRTH: FieldSpec = FieldSpec::date("dateOfBirth", "Date of Birth");
const IMAGE: FieldSpec = FieldSpec::file("image", "Image");
const NAME: FieldSpec = FieldSpec::text("name", "Name", &[FieldRule::MinLength(3, "Name must be at least 3 characters")]);
const USERNAME: FieldSpec = FieldSpec::text(
    "username",
    "Username",
    &[FieldRule::MinLength(3, "Username must be at least 3 characters")],
);
const PASSWORD: FieldSpec = FieldSpec::text(
    "password",
    "Password",
    &[FieldRule::MinLength(8, "Password must be at least 8 characters")],
);

static MEMBER_FIELDS: &[FieldSpec] = &[
    IMAGE,
    FIRST_NAME,
    LAST_NAME,
    GENDER,
    DATE_OF_BIRTH,
    FieldSpec::text("groupName", "Group", &[FieldRule::Required("Group name is required")]),
    ADDRESS,
    CITY,
    STATE,
    PHONE,
    EMAIL,
    FieldSpec::number("weight", "Weight", &[FieldRule::MinNumber(1.0, "Weight must be greater than 0")]),
    FieldSpec::number("height", "Height", &[FieldRule::MinNumber(1.0, "Height must be greater than 0")]),
    FieldSpec::number("chest", "Chest", &[FieldRule::MinNumber(1.0, "Chest must be greater than 0")]),
    FieldSpec::number("waist", "Waist", &[FieldRule::MinNumber(1.0, "Waist must be greater than 0")]),
    FieldSpec::number("thigh", "Thigh", &[FieldRule::MinNumber(1.0, "Thigh must be greater than 0")]),
    FieldSpec::number("arms", "Arms", &[FieldRule::MinNumber(1.0, "Arms must be greater than 0")]),
    FieldSpec::number("fat", "Fat", &[FieldRule::MinNumber(1.0, "Fat must be greater than 0")]),
    FieldSpec::text(
        "staffMemberName",
        "Staff Member",
        &[FieldRule::Required("Staff Member Name is required")],
    ),
    FieldSpec::text(
        "memberShipName",
        "Membership",
        &[FieldRule::Required("Membership Name is required")],
    ),
    FieldSpec::date("memberShipValidFrom", "Valid From"),
    FieldSpec::date("memberShipValidTo", "Valid To"),
];

static STAFF_FIELDS: &[FieldSpec] = &[
    IMAGE,
    FIRST_NAME,
    LAST_NAME,
    GENDER,
    DATE_OF_BIRTH,
    FieldSpec::text("roleName", "Role", &[FieldRule::Required("Role is required")]),
    FieldSpec::text(
        "specializationName",
        "Specialization",
        &[FieldRule::Required("Specialization is required")],
    ),
    ADDRESS,
    CITY,
    STATE,
    PHONE,
    EMAIL,
];

static DESCRIBED_FIELDS: &[FieldSpec] = &[
    NAME,
    FieldSpec::text("description", "Description", &[FieldRule::MinLength(10, "Description is too short")]),
];

static GROUP_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name", "Name", &[]),
    FieldSpec::text("description", "Description", &[]),
];

static CATEGORY_FIELDS: &[FieldSpec] = &[
    NAME,
    FieldSpec::text("description", "Description", &[FieldRule::MinLength(3, "Description is too short")]),
];

static MEMBERSHIP_FIELDS: &[FieldSpec] = &[
    NAME,
    FieldSpec::text("categoryName", "Category", &[FieldRule::Required("Category is required")]),
    FieldSpec::number("period", "Period", &[FieldRule::MinNumber(1.0, "Period must be at least 1 day")]),
    FieldSpec::number("amount", "Amount", &[FieldRule::MinNumber(1.0, "Amount must be greater than 0")]),
    FieldSpec::text("description", "Description", &[]).optional(),
];

static PROFILE_FIELDS: &[FieldSpec] = &[
    USERNAME,
    EMAIL,
    FieldSpec::text("phone", "Phone", &[]).optional(),
    FieldSpec::text("address", "Address", &[]).optional(),
];

static SIGNUP_FIELDS: &[FieldSpec] = &[
    USERNAME,
    EMAIL,
    FieldSpec::text("phone", "Phone", &[FieldRule::Digits(11, "Phone number must be 11 digits")]),
    FieldSpec::text(
        "address",
        "Address",
        &[FieldRule::MinLength(5, "Address must be at least 5 characters")],
    ),
    PASSWORD,
];

static LOGIN_FIELDS: &[FieldSpec] = &[USERNAME, EMAIL, PASSWORD];

fn conflict(kind: ResourceKind) -> Option<String> {
    Some(format!("{} already exists", kind.label()))
}

/// Schema of the add screen for a resource
pub fn create(kind: ResourceKind) -> FormSchema {
    let (title, fields, failure_message) = match kind {
        ResourceKind::Member => ("Add Member", MEMBER_FIELDS, "Failed to add member"),
        ResourceKind::Staff => ("Add Staff Member", STAFF_FIELDS, "Failed to add staff member"),
        ResourceKind::Role => ("Add Role", DESCRIBED_FIELDS, "Failed to add role"),
        ResourceKind::Specialization => ("Add Specialization", DESCRIBED_FIELDS, "Failed to add specialization"),
        ResourceKind::Group => ("Add Group", GROUP_FIELDS, "Failed to add group"),
        ResourceKind::Category => ("Add Category", CATEGORY_FIELDS, "Failed to add category"),
        ResourceKind::Membership => ("Add Membership", MEMBERSHIP_FIELDS, "Failed to add membership"),
    };

    FormSchema {
        title,
        mode: FormMode::Create,
        resource: Some(kind),
        fields,
        success_route: Route::List(kind),
        success_fallback: "Saved successfully",
        failure_message,
        conflict_message: conflict(kind),
        prefer_server_error: false,
    }
}

/// Schema of the edit screen; only categories and memberships are editable
pub fn update(kind: ResourceKind) -> Option<FormSchema> {
    let schema = match kind {
        ResourceKind::Category => FormSchema {
            title: "Edit Category",
            mode: FormMode::Update,
            resource: Some(kind),
            fields: CATEGORY_FIELDS,
            success_route: Route::List(kind),
            success_fallback: "Category updated successfully",
            failure_message: "Failed to update category",
            conflict_message: conflict(kind),
            prefer_server_error: false,
        },
        ResourceKind::Membership => FormSchema {
            title: "Edit Membership",
            mode: FormMode::Update,
            resource: Some(kind),
            fields: MEMBERSHIP_FIELDS,
            success_route: Route::List(kind),
            success_fallback: "Membership updated successfully",
            failure_message: "Failed to update membership",
            conflict_message: None,
            prefer_server_error: false,
        },
        _ => return None,
    };
    Some(schema)
}

pub fn profile() -> FormSchema {
    FormSchema {
        title: "Edit Profile",
        mode: FormMode::Update,
        resource: None,
        fields: PROFILE_FIELDS,
        success_route: Route::Dashboard,
        success_fallback: "Profile updated successfully",
        failure_message: "Profile update failed",
        conflict_message: None,
        prefer_server_error: false,
    }
}

pub fn signup() -> FormSchema {
    FormSchema {
        title: "Sign Up",
        mode: FormMode::Create,
        resource: None,
        fields: SIGNUP_FIELDS,
        success_route: Route::Login,
        success_fallback: "Account created",
        failure_message: "Failed to sign up",
        conflict_message: Some("User already exists".to_string()),
        prefer_server_error: false,
    }
}

pub fn login() -> FormSchema {
    FormSchema {
        title: "Login",
        mode: FormMode::Create,
        resource: None,
        fields: LOGIN_FIELDS,
        success_route: Route::Dashboard,
        success_fallback: "Logged in",
        failure_message: "An error occurred",
        conflict_message: None,
        prefer_server_error: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_create_schema_reports_conflicts_by_label() {
        for kind in ResourceKind::ALL {
            let schema = create(kind);
            assert_eq!(schema.conflict_message, Some(format!("{} already exists", kind.label())));
            assert_eq!(schema.success_route, Route::List(kind));
        }
    }

    #[test]
    fn only_member_and_staff_upload_files() {
        for kind in ResourceKind::ALL {
            assert_eq!(create(kind).has_files(), kind.endpoints().multipart, "{kind}");
        }
    }

    #[test]
    fn edit_schemas_exist_for_editable_resources() {
        for kind in ResourceKind::ALL {
            assert_eq!(update(kind).is_some(), kind.endpoints().update.is_some(), "{kind}");
        }
        assert_eq!(update(ResourceKind::Membership).unwrap().conflict_message, None);
    }

    #[test]
    fn field_names_are_unique() {
        let schemas = ResourceKind::ALL
            .into_iter()
            .map(create)
            .chain([profile(), signup(), login()]);
        for schema in schemas {
            let mut names = schema.field_names();
            let len = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), len, "{}", schema.title);
        }
    }
}
