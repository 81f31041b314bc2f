//! # Role authority
//!
//! The one place that decides whether an identity is the coach or a client.
//! The designated coach is named by the single `app_settings` row; every
//! other identity is a client regardless of what its profile row claims.

use uuid::Uuid;

use crate::models::profile::{AppSettings, Profile, Role};

/// Derives the effective role of `user_id`.
///
/// With a settings row naming a coach, only that identity is a coach. With
/// no designation the stored profile role is trusted, defaulting to client.
pub fn derive_role(user_id: Uuid, settings: Option<&AppSettings>, stored: Option<Role>) -> Role {
    match settings.and_then(|s| s.coach_id) {
        Some(coach_id) if coach_id == user_id => Role::Coach,
        Some(_) => Role::Client,
        None => stored.unwrap_or_default(),
    }
}

/// Returns the role that should be written back to `profile` when its stored
/// role disagrees with the derived one, or `None` when it is already right.
pub fn reconcile(profile: &Profile, settings: Option<&AppSettings>) -> Option<Role> {
    let derived = derive_role(profile.id, settings, Some(profile.role));
    (derived != profile.role).then_some(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings(coach_id: Option<Uuid>) -> AppSettings {
        AppSettings { id: 1, coach_id }
    }

    fn profile(id: Uuid, role: Role) -> Profile {
        Profile {
            id,
            email: None,
            full_name: None,
            role,
            account_type: None,
            time_zone: None,
            player_id: None,
        }
    }

    #[test]
    fn designated_coach_is_coach() {
        let coach = Uuid::new_v4();
        let s = settings(Some(coach));
        assert_eq!(derive_role(coach, Some(&s), Some(Role::Client)), Role::Coach);
    }

    #[test]
    fn everyone_else_is_client_even_if_stored_as_coach() {
        let s = settings(Some(Uuid::new_v4()));
        assert_eq!(derive_role(Uuid::new_v4(), Some(&s), Some(Role::Coach)), Role::Client);
    }

    #[test]
    fn without_designation_stored_role_is_used() {
        let id = Uuid::new_v4();
        assert_eq!(derive_role(id, None, Some(Role::Coach)), Role::Coach);
        assert_eq!(derive_role(id, Some(&settings(None)), None), Role::Client);
    }

    #[test]
    fn reconcile_demotes_wrongly_provisioned_coach() {
        let s = settings(Some(Uuid::new_v4()));
        let p = profile(Uuid::new_v4(), Role::Coach);
        assert_eq!(reconcile(&p, Some(&s)), Some(Role::Client));
    }

    #[test]
    fn reconcile_leaves_correct_rows_alone() {
        let coach = Uuid::new_v4();
        let s = settings(Some(coach));
        assert_eq!(reconcile(&profile(coach, Role::Coach), Some(&s)), None);
        assert_eq!(reconcile(&profile(Uuid::new_v4(), Role::Client), Some(&s)), None);
    }
}
