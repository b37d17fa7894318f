use serde::{Deserialize, Serialize};

use roster_sql::Row;
use roster_store::{integer_or_null, text_or_null, Entity, FieldDef, FieldKind, TableDef};

/// A training group, owned by the user who created it.
///
/// Fields are optional so a partially-filled value doubles as a search
/// example; a persisted group always has owner and name set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Group {
    pub group_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Entity for Group {
    const TABLE: TableDef = TableDef {
        name: "groups",
        key: "group_id",
        fields: &[
            FieldDef {
                name: "group_id",
                kind: FieldKind::Integer,
            },
            FieldDef {
                name: "owner_id",
                kind: FieldKind::Integer,
            },
            FieldDef {
                name: "name",
                kind: FieldKind::Text,
            },
            FieldDef {
                name: "description",
                kind: FieldKind::Text,
            },
        ],
    };

    fn values(&self) -> Vec<roster_sql::Value> {
        vec![
            integer_or_null(self.group_id),
            integer_or_null(self.owner_id),
            text_or_null(self.name.as_deref()),
            text_or_null(self.description.as_deref()),
        ]
    }

    fn from_row(row: &Row) -> Self {
        Self {
            group_id: row.get_i64("group_id"),
            owner_id: row.get_i64("owner_id"),
            name: row.get_str("name").map(|s| s.to_string()),
            description: row.get_str("description").map(|s| s.to_string()),
        }
    }

    fn key(&self) -> Option<i64> {
        self.group_id
    }

    fn set_key(&mut self, key: i64) {
        self.group_id = Some(key);
    }
}

/// A membership row linking a user to a group. The (group_id, user_id)
/// pair is unique in the schema; `id` is a synthetic row key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupMember {
    pub id: Option<i64>,
    pub group_id: Option<i64>,
    pub user_id: Option<i64>,
}

impl Entity for GroupMember {
    const TABLE: TableDef = TableDef {
        name: "group_members",
        key: "id",
        fields: &[
            FieldDef {
                name: "id",
                kind: FieldKind::Integer,
            },
            FieldDef {
                name: "group_id",
                kind: FieldKind::Integer,
            },
            FieldDef {
                name: "user_id",
                kind: FieldKind::Integer,
            },
        ],
    };

    fn values(&self) -> Vec<roster_sql::Value> {
        vec![
            integer_or_null(self.id),
            integer_or_null(self.group_id),
            integer_or_null(self.user_id),
        ]
    }

    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get_i64("id"),
            group_id: row.get_i64("group_id"),
            user_id: row.get_i64("user_id"),
        }
    }

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn set_key(&mut self, key: i64) {
        self.id = Some(key);
    }
}

/// A user row, consulted for target resolution and profile projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct User {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub name: Option<String>,
}

impl Entity for User {
    const TABLE: TableDef = TableDef {
        name: "users",
        key: "user_id",
        fields: &[
            FieldDef {
                name: "user_id",
                kind: FieldKind::Integer,
            },
            FieldDef {
                name: "username",
                kind: FieldKind::Text,
            },
            FieldDef {
                name: "name",
                kind: FieldKind::Text,
            },
        ],
    };

    fn values(&self) -> Vec<roster_sql::Value> {
        vec![
            integer_or_null(self.user_id),
            text_or_null(self.username.as_deref()),
            text_or_null(self.name.as_deref()),
        ]
    }

    fn from_row(row: &Row) -> Self {
        Self {
            user_id: row.get_i64("user_id"),
            username: row.get_str("username").map(|s| s.to_string()),
            name: row.get_str("name").map(|s| s.to_string()),
        }
    }

    fn key(&self) -> Option<i64> {
        self.user_id
    }

    fn set_key(&mut self, key: i64) {
        self.user_id = Some(key);
    }
}

/// Input for creating a group.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for adding a member to a group.
#[derive(Debug, Clone, Deserialize)]
pub struct AddMember {
    pub user_id: i64,
}

/// A user's public profile, projected into group details.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Group details response payload: the group plus a profile per member.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDetails {
    pub group: Group,
    pub users: Vec<Profile>,
}
