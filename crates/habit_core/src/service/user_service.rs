//! User use-case service.
//!
//! # Invariants
//! - `sign_in` is get-or-create keyed by email; it never creates twice.
//! - Every user has a settings row from the moment it exists.

use crate::calendar::ReferenceZone;
use crate::model::user::{User, UserId, UserSettings};
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;

pub struct UserService<R: UserRepository> {
    repo: R,
    /// Zone written into settings of newly created users.
    default_zone: ReferenceZone,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R, default_zone: ReferenceZone) -> Self {
        Self { repo, default_zone }
    }

    /// Returns the user registered under `email`, creating it on first use.
    pub fn sign_in(&self, email: &str, name: Option<String>, now_ms: i64) -> RepoResult<User> {
        if let Some(user) = self.repo.find_user_by_email(email)? {
            return Ok(user);
        }

        let user = User::new(email, name, now_ms);
        let settings = UserSettings::defaults_for(user.uuid, self.default_zone);
        match self.repo.create_user(&user, &settings) {
            Ok(_) => {
                info!(
                    "event=user_create module=service status=ok user_id={}",
                    user.uuid
                );
                Ok(user)
            }
            // Lost a race with a concurrent sign-in for the same email.
            Err(RepoError::DuplicateEmail(_)) => self
                .repo
                .find_user_by_email(email)?
                .ok_or_else(|| RepoError::InvalidData(format!("user `{email}` vanished"))),
            Err(err) => Err(err),
        }
    }

    pub fn get_user(&self, user_id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(user_id)
    }

    /// Looks up an existing user without creating one.
    pub fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.repo.find_user_by_email(email)
    }

    /// Replaces profile fields that are `Some`.
    pub fn update_profile(
        &self,
        user_id: UserId,
        name: Option<String>,
        avatar: Option<String>,
    ) -> RepoResult<User> {
        let mut user = self
            .repo
            .get_user(user_id)?
            .ok_or(RepoError::UserNotFound(user_id))?;
        if name.is_some() {
            user.name = name;
        }
        if avatar.is_some() {
            user.avatar = avatar;
        }
        self.repo.update_user(&user)?;
        Ok(user)
    }

    pub fn settings(&self, user_id: UserId) -> RepoResult<UserSettings> {
        self.repo
            .get_settings(user_id)?
            .ok_or(RepoError::UserNotFound(user_id))
    }

    pub fn update_settings(&self, settings: &UserSettings) -> RepoResult<()> {
        self.repo.update_settings(settings)
    }

    /// Zone in which this user's days are evaluated.
    pub fn reference_zone(&self, user_id: UserId) -> RepoResult<ReferenceZone> {
        self.settings(user_id)?
            .reference_zone()
            .map_err(|err| RepoError::InvalidData(err.to_string()))
    }
}
