use crate::core::error::DirectoryError;
use crate::models::user::{NewUser, User, UserInfo, UserProfile};
use crate::utils::auth::{secrets_match, Credentials};
use crate::utils::time::years_between;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Returns true iff a user is present and carries the admin flag
pub fn is_admin(user: Option<&User>) -> bool {
    user.is_some_and(|u| u.admin)
}

/// The authenticated caller of an operation
struct Caller {
    login: String,
    admin: bool,
}

/// In-memory registry of users
///
/// A single mutex guards the whole collection and is held for the full
/// duration of each operation, so authentication, authorization and the
/// mutation itself are observed atomically by concurrent requests.
/// Lookups are linear scans.
pub struct UserDirectory {
    users: Mutex<Vec<User>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }

    fn users(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a record as-is, bypassing authorization. Seeds the bootstrap administrator.
    pub fn insert(&self, user: User) {
        self.users().push(user);
    }

    pub fn len(&self) -> usize {
        self.users().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users().is_empty()
    }

    /// Find the active user whose login and password match exactly
    pub fn authenticate(&self, login: &str, password: &str) -> Option<User> {
        find_active_match(&self.users(), login, password).cloned()
    }

    pub fn create_user(
        &self,
        new_user: NewUser,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<User, DirectoryError> {
        let mut users = self.users();
        let caller = require_admin(&users, credentials, "Only administrators can create users")?;

        if users.iter().any(|u| u.login == new_user.login) {
            return Err(login_taken());
        }

        let user = new_user.into_user(&caller.login, now);
        users.push(user.clone());
        Ok(user)
    }

    pub fn update_info(
        &self,
        target: &str,
        info: UserInfo,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<User, DirectoryError> {
        let mut users = self.users();
        let (caller, idx) = resolve_self_service(
            &users,
            target,
            credentials,
            "You can only update your own information",
        )?;

        let user = &mut users[idx];
        user.name = info.name;
        user.gender = info.gender;
        user.birthday = info.birthday;
        user.touch(&caller.login, now);
        Ok(user.clone())
    }

    pub fn update_password(
        &self,
        target: &str,
        new_password: String,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<User, DirectoryError> {
        let mut users = self.users();
        let (caller, idx) = resolve_self_service(
            &users,
            target,
            credentials,
            "You can only update your own password",
        )?;

        let user = &mut users[idx];
        user.password = new_password;
        user.touch(&caller.login, now);
        Ok(user.clone())
    }

    pub fn update_login(
        &self,
        target: &str,
        new_login: String,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<User, DirectoryError> {
        let mut users = self.users();
        let (caller, idx) = resolve_self_service(
            &users,
            target,
            credentials,
            "You can only update your own login",
        )?;

        if users.iter().any(|u| u.login == new_login) {
            return Err(login_taken());
        }

        let user = &mut users[idx];
        user.login = new_login;
        user.touch(&caller.login, now);
        Ok(user.clone())
    }

    /// Active users ordered by creation time, oldest first
    pub fn list_active_users(&self, credentials: &Credentials) -> Result<Vec<User>, DirectoryError> {
        let users = self.users();
        require_admin(&users, credentials, "Only administrators can list active users")?;

        let mut active: Vec<User> = users.iter().filter(|u| u.is_active()).cloned().collect();
        active.sort_by_key(|u| u.created_on);
        Ok(active)
    }

    /// Profile of any user with the given login, revoked or not
    pub fn get_by_login(
        &self,
        target: &str,
        credentials: &Credentials,
    ) -> Result<UserProfile, DirectoryError> {
        let users = self.users();
        require_admin(&users, credentials, "Only administrators can view user data")?;

        users
            .iter()
            .find(|u| u.login == target)
            .map(User::profile)
            .ok_or_else(user_not_found)
    }

    pub fn get_self(&self, credentials: &Credentials) -> Result<UserProfile, DirectoryError> {
        let users = self.users();
        find_caller(&users, credentials)
            .map(User::profile)
            .ok_or_else(|| {
                DirectoryError::Unauthorized(
                    "Invalid credentials or user does not exist".to_string(),
                )
            })
    }

    /// Users of any state whose birth year is at least `age` years before `now`
    pub fn list_older_than(
        &self,
        age: i32,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<Vec<User>, DirectoryError> {
        let users = self.users();
        require_admin(
            &users,
            credentials,
            "Only administrators can list users older than a given age",
        )?;

        Ok(users
            .iter()
            .filter(|u| u.birthday.is_some_and(|b| years_between(b, now) >= age))
            .cloned()
            .collect())
    }

    /// Revoke (soft) or remove (hard) the user with the given login
    pub fn delete_user(
        &self,
        target: &str,
        soft_delete: bool,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<(), DirectoryError> {
        let mut users = self.users();
        let caller = require_admin(&users, credentials, "Only administrators can delete users")?;

        let idx = users
            .iter()
            .position(|u| u.login == target)
            .ok_or_else(user_not_found)?;

        if soft_delete {
            let user = &mut users[idx];
            user.revoked_on = Some(now);
            user.revoked_by = Some(caller.login);
        } else {
            users.remove(idx);
        }
        Ok(())
    }

    pub fn restore_user(
        &self,
        target: &str,
        credentials: &Credentials,
    ) -> Result<User, DirectoryError> {
        let mut users = self.users();
        require_admin(&users, credentials, "Only administrators can restore users")?;

        let user = users
            .iter_mut()
            .find(|u| u.login == target && !u.is_active())
            .ok_or_else(|| DirectoryError::NotFound("User not found or already active".to_string()))?;

        user.revoked_on = None;
        user.revoked_by = None;
        Ok(user.clone())
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn find_active_match<'a>(users: &'a [User], login: &str, password: &str) -> Option<&'a User> {
    users
        .iter()
        .find(|u| u.is_active() && u.login == login && secrets_match(password, &u.password))
}

/// Absent login or password headers never match, even a stored empty string
fn find_caller<'a>(users: &'a [User], credentials: &Credentials) -> Option<&'a User> {
    let (login, password) = credentials.pair()?;
    find_active_match(users, login, password)
}

fn authenticate_caller(users: &[User], credentials: &Credentials) -> Option<Caller> {
    find_caller(users, credentials).map(|u| Caller {
        login: u.login.clone(),
        admin: u.admin,
    })
}

fn require_admin(
    users: &[User],
    credentials: &Credentials,
    message: &str,
) -> Result<Caller, DirectoryError> {
    match find_caller(users, credentials) {
        Some(user) if is_admin(Some(user)) => Ok(Caller {
            login: user.login.clone(),
            admin: true,
        }),
        _ => Err(DirectoryError::Unauthorized(message.to_string())),
    }
}

/// Resolve caller and active target for the self-service updates.
///
/// An unauthenticated caller and a missing target both yield NotFound; a
/// non-admin acting on someone else yields Unauthorized.
fn resolve_self_service(
    users: &[User],
    target: &str,
    credentials: &Credentials,
    forbidden: &str,
) -> Result<(Caller, usize), DirectoryError> {
    let caller = authenticate_caller(users, credentials);
    let idx = users.iter().position(|u| u.login == target && u.is_active());

    let (Some(caller), Some(idx)) = (caller, idx) else {
        return Err(DirectoryError::NotFound(
            "User not found or not authorized".to_string(),
        ));
    };

    if !caller.admin && caller.login != target {
        return Err(DirectoryError::Unauthorized(forbidden.to_string()));
    }

    Ok((caller, idx))
}

fn user_not_found() -> DirectoryError {
    DirectoryError::NotFound("User not found".to_string())
}

fn login_taken() -> DirectoryError {
    DirectoryError::Conflict("A user with this login already exists".to_string())
}
