use chrono::{DateTime, Utc};
use tracing::info;

use crate::core::config::BootstrapConfig;
use crate::models::user::{Gender, User};

// this runs at boot time
pub fn bootstrap_admin(config: &BootstrapConfig, now: DateTime<Utc>) -> User {
    info!(
        admin_login = %config.admin_login,
        created_by = %config.created_by,
        "Seeding bootstrap administrator"
    );

    User {
        login: config.admin_login.clone(),
        password: config.admin_password.clone(),
        name: config.admin_name.clone(),
        gender: Gender::Male,
        birthday: None,
        admin: true,
        created_on: now,
        created_by: config.created_by.clone(),
        modified_on: None,
        modified_by: None,
        revoked_on: None,
        revoked_by: None,
    }
}
