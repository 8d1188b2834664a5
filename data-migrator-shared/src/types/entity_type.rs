//! Entity types handled by the migration.

use serde::Serialize;

/// The kinds of records migrated from the document store.
///
/// Each variant knows the MongoDB collection it is read from and the DynamoDB
/// table it is written to. Use `entity.as_str()` for the canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityType {
    User,
    UserMapping,
    Project,
    Issue,
    CopilotPayment,
    OwnerUserTeam,
    OwnerUserGroup,
}

impl EntityType {
    /// Every entity type, in declaration order.
    pub const ALL: [EntityType; 7] = [
        EntityType::User,
        EntityType::UserMapping,
        EntityType::Project,
        EntityType::Issue,
        EntityType::CopilotPayment,
        EntityType::OwnerUserTeam,
        EntityType::OwnerUserGroup,
    ];

    /// Returns the canonical entity name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "User",
            EntityType::UserMapping => "UserMapping",
            EntityType::Project => "Project",
            EntityType::Issue => "Issue",
            EntityType::CopilotPayment => "CopilotPayment",
            EntityType::OwnerUserTeam => "OwnerUserTeam",
            EntityType::OwnerUserGroup => "OwnerUserGroup",
        }
    }

    /// Returns the source collection name (lowercased, pluralized model name).
    pub fn source_collection(&self) -> &'static str {
        match self {
            EntityType::User => "users",
            EntityType::UserMapping => "usermappings",
            EntityType::Project => "projects",
            EntityType::Issue => "issues",
            EntityType::CopilotPayment => "copilotpayments",
            EntityType::OwnerUserTeam => "owneruserteams",
            EntityType::OwnerUserGroup => "ownerusergroups",
        }
    }

    /// Returns the destination table name, without any deployment prefix.
    pub fn destination_table(&self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
