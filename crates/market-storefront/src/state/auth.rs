use crate::model::AuthProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub is_admin: bool,
    pub first_name: String,
    pub last_name: String,
}

impl AuthState {
    pub fn login(&mut self, profile: AuthProfile) {
        self.is_authenticated = true;
        self.is_admin = profile.is_admin;
        self.first_name = profile.first_name;
        self.last_name = profile.last_name;
    }

    /// A fresh account is signed in but never an admin.
    pub fn register(&mut self, profile: AuthProfile) {
        self.is_authenticated = true;
        self.first_name = profile.first_name;
        self.last_name = profile.last_name;
    }

    pub fn login_failed(&mut self) {
        self.is_authenticated = false;
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }
}
