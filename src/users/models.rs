//! User Models
//! Mission: Identity records, role-keyed profile details, API views

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Campus roles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    TeachingStaff,
    NonTeachingStaff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Student => "student",
            Role::TeachingStaff => "teaching_staff",
            Role::NonTeachingStaff => "non_teaching_staff",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "teaching_staff" => Some(Role::TeachingStaff),
            "non_teaching_staff" => Some(Role::NonTeachingStaff),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StudentDetails {
    pub branch: Option<String>,
    pub degree: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StaffDetails {
    pub subject: Option<String>,
    pub designation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NonTeachingStaffDetails {
    pub details: Option<String>,
}

/// Role-specific profile details. Exactly one variant is live at a time, so
/// switching role drops the other roles' data by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleDetails {
    Student(StudentDetails),
    TeachingStaff(StaffDetails),
    NonTeachingStaff(NonTeachingStaffDetails),
    Admin,
}

impl RoleDetails {
    /// Build the detail variant for `role`. A provided block wins; otherwise
    /// an existing block survives only if it already matches the role.
    pub fn rebuild(
        role: Role,
        student: Option<StudentDetails>,
        staff: Option<StaffDetails>,
        non_teaching: Option<NonTeachingStaffDetails>,
        existing: Option<&RoleDetails>,
    ) -> Self {
        match role {
            Role::Student => RoleDetails::Student(student.unwrap_or_else(|| match existing {
                Some(RoleDetails::Student(d)) => d.clone(),
                _ => StudentDetails::default(),
            })),
            Role::TeachingStaff => {
                RoleDetails::TeachingStaff(staff.unwrap_or_else(|| match existing {
                    Some(RoleDetails::TeachingStaff(d)) => d.clone(),
                    _ => StaffDetails::default(),
                }))
            }
            Role::NonTeachingStaff => {
                RoleDetails::NonTeachingStaff(non_teaching.unwrap_or_else(|| match existing {
                    Some(RoleDetails::NonTeachingStaff(d)) => d.clone(),
                    _ => NonTeachingStaffDetails::default(),
                }))
            }
            Role::Admin => RoleDetails::Admin,
        }
    }

    /// Project into the three wire-level blocks; the non-matching ones are
    /// empty.
    pub fn blocks(&self) -> (StudentDetails, StaffDetails, NonTeachingStaffDetails) {
        let mut blocks = (
            StudentDetails::default(),
            StaffDetails::default(),
            NonTeachingStaffDetails::default(),
        );
        match self {
            RoleDetails::Student(d) => blocks.0 = d.clone(),
            RoleDetails::TeachingStaff(d) => blocks.1 = d.clone(),
            RoleDetails::NonTeachingStaff(d) => blocks.2 = d.clone(),
            RoleDetails::Admin => {}
        }
        blocks
    }
}

/// Identity record. The password never leaves the store as plaintext; only
/// the bcrypt hash is held here and it is never serialized.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub details: RoleDetails,
    pub additional_details: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn profile(&self) -> ProfileView {
        let (student_details, staff_details, non_teaching_staff_details) = self.details.blocks();
        ProfileView {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
            is_verified: self.is_verified,
            student_details,
            staff_details,
            non_teaching_staff_details,
            additional_details: self.additional_details.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Sanitized profile returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub student_details: StudentDetails,
    pub staff_details: StaffDetails,
    pub non_teaching_staff_details: NonTeachingStaffDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile plus a freshly issued token (register, login, profile update).
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: ProfileView,
    pub token: String,
}

/// Owner projection embedded in resource views.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerView {
    pub name: String,
    pub role: Role,
}

/// Owner reference: raw id on create, resolved projection on list/get.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OwnerRef {
    Id(String),
    Resolved(OwnerView),
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub student_details: Option<StudentDetails>,
    pub staff_details: Option<StaffDetails>,
    pub non_teaching_staff_details: Option<NonTeachingStaffDetails>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile patch. `None` leaves the stored value unchanged; a provided empty
/// or whitespace-only string is also treated as "no change", so there is no
/// way to clear a text field through update.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub student_details: Option<StudentDetails>,
    pub staff_details: Option<StaffDetails>,
    pub non_teaching_staff_details: Option<NonTeachingStaffDetails>,
    pub additional_details: Option<String>,
}

/// `Some` only for trimmed non-empty input.
pub fn nonempty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn merge_field(target: &mut String, value: Option<String>) {
    if let Some(v) = nonempty(value) {
        *target = v;
    }
}

pub fn merge_opt_field(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = nonempty(value) {
        *target = Some(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), r#""student""#);
        assert_eq!(
            serde_json::to_string(&Role::TeachingStaff).unwrap(),
            r#""teaching_staff""#
        );

        let role: Role = serde_json::from_str(r#""non_teaching_staff""#).unwrap();
        assert_eq!(role, Role::NonTeachingStaff);
        assert!(serde_json::from_str::<Role>(r#""janitor""#).is_err());
    }

    #[test]
    fn test_role_string_conversion() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::from_str("teaching_staff"), Some(Role::TeachingStaff));
        assert_eq!(Role::from_str("invalid"), None);
    }

    #[test]
    fn test_rebuild_switching_role_drops_old_details() {
        let existing = RoleDetails::Student(StudentDetails {
            branch: Some("CSE".to_string()),
            degree: Some("BTech".to_string()),
        });

        let rebuilt = RoleDetails::rebuild(Role::TeachingStaff, None, None, None, Some(&existing));
        assert_eq!(rebuilt, RoleDetails::TeachingStaff(StaffDetails::default()));

        let (student, _, _) = rebuilt.blocks();
        assert_eq!(student, StudentDetails::default());
    }

    #[test]
    fn test_rebuild_same_role_keeps_details_when_not_provided() {
        let existing = RoleDetails::Student(StudentDetails {
            branch: Some("ECE".to_string()),
            degree: None,
        });

        let rebuilt = RoleDetails::rebuild(Role::Student, None, None, None, Some(&existing));
        assert_eq!(rebuilt, existing);
    }

    #[test]
    fn test_rebuild_provided_block_wins() {
        let existing = RoleDetails::Student(StudentDetails {
            branch: Some("ECE".to_string()),
            degree: None,
        });
        let provided = StudentDetails {
            branch: Some("CSE".to_string()),
            degree: Some("MTech".to_string()),
        };

        let rebuilt = RoleDetails::rebuild(
            Role::Student,
            Some(provided.clone()),
            None,
            None,
            Some(&existing),
        );
        assert_eq!(rebuilt, RoleDetails::Student(provided));
    }

    #[test]
    fn test_rebuild_admin_has_no_block() {
        let existing = RoleDetails::NonTeachingStaff(NonTeachingStaffDetails {
            details: Some("electrician".to_string()),
        });

        let rebuilt = RoleDetails::rebuild(Role::Admin, None, None, None, Some(&existing));
        assert_eq!(rebuilt, RoleDetails::Admin);

        let (student, staff, non_teaching) = rebuilt.blocks();
        assert_eq!(student, StudentDetails::default());
        assert_eq!(staff, StaffDetails::default());
        assert_eq!(non_teaching, NonTeachingStaffDetails::default());
    }

    #[test]
    fn test_role_details_storage_roundtrip() {
        let details = RoleDetails::TeachingStaff(StaffDetails {
            subject: Some("Physics".to_string()),
            designation: Some("Professor".to_string()),
        });

        let json = serde_json::to_string(&details).unwrap();
        assert!(json.contains(r#""role":"teaching_staff""#));

        let back: RoleDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(back, details);
    }

    #[test]
    fn test_merge_helpers_ignore_empty_input() {
        let mut name = "Alice".to_string();
        merge_field(&mut name, None);
        merge_field(&mut name, Some("".to_string()));
        merge_field(&mut name, Some("   ".to_string()));
        assert_eq!(name, "Alice");

        merge_field(&mut name, Some("Bob".to_string()));
        assert_eq!(name, "Bob");

        let mut phone = Some("123".to_string());
        merge_opt_field(&mut phone, Some("".to_string()));
        assert_eq!(phone.as_deref(), Some("123"));
        merge_opt_field(&mut phone, Some("456".to_string()));
        assert_eq!(phone.as_deref(), Some("456"));
    }

    #[test]
    fn test_owner_ref_serialization() {
        let raw = OwnerRef::Id("abc-123".to_string());
        assert_eq!(serde_json::to_string(&raw).unwrap(), r#""abc-123""#);

        let resolved = OwnerRef::Resolved(OwnerView {
            name: "Alice".to_string(),
            role: Role::Student,
        });
        assert_eq!(
            serde_json::to_string(&resolved).unwrap(),
            r#"{"name":"Alice","role":"student"}"#
        );
    }
}
