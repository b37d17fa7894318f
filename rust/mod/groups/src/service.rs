use std::sync::Arc;

use tracing::info;

use roster_core::{validate, ServiceError};
use roster_sql::SQLStore;
use roster_store::{EntityStore, SearchOptions, StoreError};

use crate::directory::UserDirectory;
use crate::model::{CreateGroup, Group, GroupDetails, GroupMember, User};
use crate::schema;

/// Group membership service.
///
/// Every operation runs within one request: validation and authorization
/// first, then one or more sequential store round-trips. The current user
/// is resolved by the API layer and passed in.
pub struct GroupService {
    store: EntityStore,
    users: Arc<dyn UserDirectory>,
}

impl GroupService {
    /// Create the service, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self {
            store: EntityStore::new(sql),
            users,
        })
    }

    /// Create a group owned by the current user. The name must be
    /// non-empty; the description is optional.
    pub fn create_group(&self, owner_id: i64, input: CreateGroup) -> Result<(), ServiceError> {
        validate::require_non_empty(&input.name, "name")?;

        let mut group = Group {
            group_id: None,
            owner_id: Some(owner_id),
            name: Some(input.name),
            description: input.description,
        };
        self.store.save(&mut group).map_err(wrap_store)?;
        info!(group_id = ?group.group_id, owner_id, "group created");
        Ok(())
    }

    /// Add a user to an owned group. Adding an already-present member
    /// is a no-op.
    pub fn add_member(
        &self,
        current_user: i64,
        group_id: i64,
        target_user: i64,
    ) -> Result<(), ServiceError> {
        self.owned_group(current_user, group_id)?;
        let target = self.resolve_target(target_user)?;

        let example = GroupMember {
            id: None,
            group_id: Some(group_id),
            user_id: target.user_id,
        };
        let existing = self
            .store
            .search(&example, &SearchOptions::default())
            .map_err(wrap_store)?;
        if !existing.is_empty() {
            return Ok(());
        }

        let mut member = example;
        self.store.save(&mut member).map_err(wrap_store)?;
        info!(group_id, user_id = target_user, "member added");
        Ok(())
    }

    /// Remove a user from an owned group. The membership row must exist.
    pub fn remove_member(
        &self,
        current_user: i64,
        group_id: i64,
        target_user: i64,
    ) -> Result<(), ServiceError> {
        self.owned_group(current_user, group_id)?;
        let target = self.resolve_target(target_user)?;

        let example = GroupMember {
            id: None,
            group_id: Some(group_id),
            user_id: target.user_id,
        };
        let member = self
            .store
            .search(&example, &SearchOptions::default())
            .map_err(wrap_store)?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::parameter_not_found("User"))?;

        self.store.delete(&member).map_err(wrap_store)?;
        info!(group_id, user_id = target_user, "member removed");
        Ok(())
    }

    /// All groups owned by the current user.
    pub fn list_groups(&self, current_user: i64) -> Result<Vec<Group>, ServiceError> {
        let example = Group {
            owner_id: Some(current_user),
            ..Default::default()
        };
        self.store
            .search(&example, &SearchOptions::default())
            .map_err(wrap_store)
    }

    /// The group record plus a profile for every member.
    pub fn group_details(
        &self,
        current_user: i64,
        group_id: i64,
    ) -> Result<GroupDetails, ServiceError> {
        let group = self.owned_group(current_user, group_id)?;

        let example = GroupMember {
            group_id: Some(group_id),
            ..Default::default()
        };
        let members = self
            .store
            .search(&example, &SearchOptions::default())
            .map_err(wrap_store)?;

        let mut users = Vec::new();
        for member in &members {
            let user_id = member.user_id.ok_or_else(|| {
                ServiceError::Database("membership row without user_id".into())
            })?;
            users.push(self.users.profile(user_id)?);
        }

        Ok(GroupDetails { group, users })
    }

    /// Authorization: the group must exist (a missing group is a
    /// parameter error, citing the entity) and the current user must be
    /// its owner.
    fn owned_group(&self, current_user: i64, group_id: i64) -> Result<Group, ServiceError> {
        let group: Group = self
            .store
            .get_by_key(Some(group_id))
            .map_err(wrap_store)?
            .ok_or_else(|| ServiceError::parameter_not_found("Group"))?;

        if group.owner_id != Some(current_user) {
            return Err(ServiceError::Forbidden("not the group owner".into()));
        }
        Ok(group)
    }

    fn resolve_target(&self, user_id: i64) -> Result<User, ServiceError> {
        self.users
            .resolve(user_id)?
            .ok_or_else(|| ServiceError::parameter_not_found("User"))
    }
}

/// Boundary translation: persistence failures become database-operation
/// errors; queries the store itself rejected surface as parameter errors.
fn wrap_store(e: StoreError) -> ServiceError {
    match e {
        StoreError::InvalidQuery(m) => ServiceError::Parameter(m),
        StoreError::NotFound(m) | StoreError::Storage(m) => ServiceError::Database(m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::SqlUserDirectory;
    use roster_sql::SqliteStore;

    struct Fixture {
        service: GroupService,
        directory: Arc<SqlUserDirectory>,
    }

    fn fixture() -> Fixture {
        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let directory = Arc::new(SqlUserDirectory::new(Arc::clone(&sql)));
        let service = GroupService::new(sql, directory.clone()).unwrap();
        Fixture { service, directory }
    }

    fn user(fx: &Fixture, username: &str) -> i64 {
        fx.directory
            .create_user(username, None)
            .unwrap()
            .user_id
            .unwrap()
    }

    fn group_of(fx: &Fixture, owner: i64, name: &str) -> i64 {
        fx.service
            .create_group(
                owner,
                CreateGroup {
                    name: name.to_string(),
                    description: None,
                },
            )
            .unwrap();
        fx.service.list_groups(owner).unwrap()
            .into_iter()
            .find(|g| g.name.as_deref() == Some(name))
            .unwrap()
            .group_id
            .unwrap()
    }

    #[test]
    fn created_group_is_listed_only_for_its_owner() {
        let fx = fixture();
        let owner = user(&fx, "ana");
        let other = user(&fx, "bob");

        fx.service
            .create_group(
                owner,
                CreateGroup {
                    name: "Contest Prep".to_string(),
                    description: Some("IOI training".to_string()),
                },
            )
            .unwrap();

        let mine = fx.service.list_groups(owner).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name.as_deref(), Some("Contest Prep"));
        assert_eq!(mine[0].owner_id, Some(owner));

        assert!(fx.service.list_groups(other).unwrap().is_empty());
    }

    #[test]
    fn empty_name_fails_before_any_persistence() {
        let fx = fixture();
        let owner = user(&fx, "ana");

        let err = fx
            .service
            .create_group(
                owner,
                CreateGroup {
                    name: "".to_string(),
                    description: None,
                },
            )
            .unwrap_err();

        assert!(matches!(err, ServiceError::Parameter(_)));
        assert!(err.to_string().contains("name"));
        assert!(fx.service.list_groups(owner).unwrap().is_empty());
    }

    #[test]
    fn added_member_appears_in_group_details() {
        let fx = fixture();
        let owner = user(&fx, "ana");
        let member = user(&fx, "carol");
        let group_id = group_of(&fx, owner, "Prep");

        fx.service.add_member(owner, group_id, member).unwrap();

        let details = fx.service.group_details(owner, group_id).unwrap();
        assert_eq!(details.group.group_id, Some(group_id));
        assert_eq!(details.users.len(), 1);
        assert_eq!(details.users[0].user_id, member);
        assert_eq!(details.users[0].username, "carol");
    }

    #[test]
    fn non_owner_cannot_add_members() {
        let fx = fixture();
        let owner = user(&fx, "ana");
        let intruder = user(&fx, "bob");
        let target = user(&fx, "carol");
        let group_id = group_of(&fx, owner, "Prep");

        let err = fx
            .service
            .add_member(intruder, group_id, target)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        // No membership row was created.
        let details = fx.service.group_details(owner, group_id).unwrap();
        assert!(details.users.is_empty());
    }

    #[test]
    fn removing_a_user_who_was_never_added_cites_user() {
        let fx = fixture();
        let owner = user(&fx, "ana");
        let stranger = user(&fx, "dave");
        let group_id = group_of(&fx, owner, "Prep");

        let err = fx
            .service
            .remove_member(owner, group_id, stranger)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Parameter(_)));
        assert!(err.to_string().contains("User"));
    }

    #[test]
    fn remove_member_deletes_the_membership_row() {
        let fx = fixture();
        let owner = user(&fx, "ana");
        let member = user(&fx, "carol");
        let group_id = group_of(&fx, owner, "Prep");

        fx.service.add_member(owner, group_id, member).unwrap();
        fx.service.remove_member(owner, group_id, member).unwrap();

        let details = fx.service.group_details(owner, group_id).unwrap();
        assert!(details.users.is_empty());
    }

    #[test]
    fn add_member_twice_is_a_no_op() {
        let fx = fixture();
        let owner = user(&fx, "ana");
        let member = user(&fx, "carol");
        let group_id = group_of(&fx, owner, "Prep");

        fx.service.add_member(owner, group_id, member).unwrap();
        fx.service.add_member(owner, group_id, member).unwrap();

        let details = fx.service.group_details(owner, group_id).unwrap();
        assert_eq!(details.users.len(), 1);
    }

    #[test]
    fn missing_group_is_a_parameter_error() {
        let fx = fixture();
        let owner = user(&fx, "ana");
        let target = user(&fx, "carol");

        let err = fx.service.add_member(owner, 9999, target).unwrap_err();
        assert!(matches!(err, ServiceError::Parameter(_)));
        assert!(err.to_string().contains("Group"));
    }

    #[test]
    fn unresolvable_target_user_is_a_parameter_error() {
        let fx = fixture();
        let owner = user(&fx, "ana");
        let group_id = group_of(&fx, owner, "Prep");

        let err = fx.service.add_member(owner, group_id, 9999).unwrap_err();
        assert!(matches!(err, ServiceError::Parameter(_)));
        assert!(err.to_string().contains("User"));
    }

    #[test]
    fn details_require_ownership() {
        let fx = fixture();
        let owner = user(&fx, "ana");
        let other = user(&fx, "bob");
        let group_id = group_of(&fx, owner, "Prep");

        let err = fx.service.group_details(other, group_id).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }
}
