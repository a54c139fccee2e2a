use std::collections::HashSet;

use docmgmt_core::UserId;

use crate::store::{PermissionStore, RoleStore, StoreError};
use crate::{PermissionToken, Role};

/// Turns a user id into its effective permission set.
///
/// user → roles → permissions of those roles, de-duplicated. There is no
/// cache here: every call reads the store. The only cached copy is the
/// snapshot a [`Session`](crate::Session) takes at authentication time.
#[derive(Debug, Clone)]
pub struct PermissionResolver<S> {
    store: S,
}

impl<S> PermissionResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: PermissionStore> PermissionResolver<S> {
    /// Effective permission tokens for `user_id`. Empty when the user holds no
    /// roles (or does not exist); only a backend failure is an error.
    pub fn resolve(&self, user_id: UserId) -> Result<HashSet<PermissionToken>, StoreError> {
        let tokens = self.store.list_permission_tokens(user_id)?;
        tracing::debug!(user_id = %user_id, count = tokens.len(), "resolved permission set");
        Ok(tokens)
    }
}

impl<S: RoleStore> PermissionResolver<S> {
    /// Roles assigned to `user_id`, sorted by name for stable display.
    pub fn roles(&self, user_id: UserId) -> Result<Vec<Role>, StoreError> {
        let mut roles = self.store.list_roles(user_id)?;
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    /// Role graph kept as plain maps; the join happens in `list_permission_tokens`
    /// exactly like the SQL backend does it.
    #[derive(Default)]
    struct RoleGraph {
        user_roles: HashMap<UserId, Vec<Role>>,
        role_tokens: HashMap<String, Vec<&'static str>>,
    }

    impl RoleGraph {
        fn grant(&mut self, user: UserId, role: &str, tokens: &[&'static str]) {
            self.user_roles.entry(user).or_default().push(Role::new(role));
            self.role_tokens.entry(role.to_string()).or_default().extend_from_slice(tokens);
        }
    }

    impl PermissionStore for RoleGraph {
        fn list_permission_tokens(&self, user_id: UserId) -> Result<HashSet<PermissionToken>, StoreError> {
            let roles = self.user_roles.get(&user_id).cloned().unwrap_or_default();
            Ok(roles
                .iter()
                .flat_map(|r| self.role_tokens.get(&r.name).cloned().unwrap_or_default())
                .map(PermissionToken::from_static)
                .collect())
        }
    }

    impl RoleStore for RoleGraph {
        fn list_roles(&self, user_id: UserId) -> Result<Vec<Role>, StoreError> {
            Ok(self.user_roles.get(&user_id).cloned().unwrap_or_default())
        }
    }

    #[test]
    fn user_without_roles_resolves_to_empty_set() {
        let resolver = PermissionResolver::new(RoleGraph::default());
        assert!(resolver.resolve(UserId::new()).unwrap().is_empty());
        assert!(resolver.roles(UserId::new()).unwrap().is_empty());
    }

    #[test]
    fn overlapping_roles_are_deduplicated() {
        let user = UserId::new();
        let mut graph = RoleGraph::default();
        graph.grant(user, "editor", &["document:create", "document:edit:own"]);
        graph.grant(user, "author", &["document:create"]);

        let tokens = PermissionResolver::new(graph).resolve(user).unwrap();

        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("document:create"));
        assert!(tokens.contains("document:edit:own"));
    }

    #[test]
    fn roles_come_back_sorted_by_name() {
        let user = UserId::new();
        let mut graph = RoleGraph::default();
        graph.grant(user, "viewer", &[]);
        graph.grant(user, "admin", &[]);

        let names: Vec<String> = PermissionResolver::new(graph)
            .roles(user)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["admin", "viewer"]);
    }

    const TOKENS: &[&str] = &[
        "document:create",
        "document:list:all",
        "document:edit:own",
        "document:delete:own",
        "user:manage",
    ];

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: the resolved set is exactly the union of the tokens of
        /// every assigned role, however the grants overlap.
        #[test]
        fn resolved_set_is_union_of_role_grants(
            grants in prop::collection::vec(prop::collection::vec(0usize..TOKENS.len(), 0..4), 0..5)
        ) {
            let user = UserId::new();
            let mut graph = RoleGraph::default();
            let mut expected: HashSet<&str> = HashSet::new();

            for (i, picks) in grants.iter().enumerate() {
                let tokens: Vec<&'static str> = picks.iter().map(|&p| TOKENS[p]).collect();
                expected.extend(tokens.iter().copied());
                graph.grant(user, &format!("role-{i}"), &tokens);
            }

            let resolved = PermissionResolver::new(graph).resolve(user).unwrap();
            let resolved: HashSet<&str> = resolved.iter().map(|t| t.as_str()).collect();
            prop_assert_eq!(resolved, expected);
        }
    }
}
