//! User profile records kept next to the stories.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Identity;
use crate::error::ProfileError;
use crate::store::{DocumentStore, Fields};

const PROFILE_COLLECTION: &str = "users";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub joined: DateTime<Utc>,
}

pub struct ProfileService {
    documents: Arc<dyn DocumentStore>,
}

impl ProfileService {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    pub async fn register(
        &self,
        identity: Option<&Identity>,
        name: &str,
        email: &str,
    ) -> Result<UserProfile, ProfileError> {
        let identity = identity.ok_or(ProfileError::Unauthenticated)?;
        let (name, email) = validate_contact(name, email)?;
        let profile = UserProfile {
            id: identity.to_string(),
            name,
            email,
            joined: Utc::now(),
        };
        let fields = to_fields(&profile)?;
        self.documents
            .update(PROFILE_COLLECTION, identity.as_str(), fields, false)
            .await?;
        tracing::info!(identity = %identity, "profile registered");
        Ok(profile)
    }

    pub async fn fetch(&self, identity: Option<&Identity>) -> Result<Option<UserProfile>, ProfileError> {
        let identity = identity.ok_or(ProfileError::Unauthenticated)?;
        let Some(document) = self.documents.get(PROFILE_COLLECTION, identity.as_str()).await? else {
            return Ok(None);
        };
        let mut profile: UserProfile = serde_json::from_value(Value::Object(document.fields))
            .map_err(|err| ProfileError::Store(err.into()))?;
        if profile.id.is_empty() {
            profile.id = document.id;
        }
        Ok(Some(profile))
    }

    /// Only name and email are written; the join date is kept. Users must
    /// register first.
    pub async fn update(
        &self,
        identity: Option<&Identity>,
        name: &str,
        email: &str,
    ) -> Result<UserProfile, ProfileError> {
        let identity = identity.ok_or(ProfileError::Unauthenticated)?;
        let (name, email) = validate_contact(name, email)?;
        if self.fetch(Some(identity)).await?.is_none() {
            return Err(ProfileError::Validation("profile not found".to_string()));
        }
        let mut fields = Fields::new();
        fields.insert("name".to_string(), Value::String(name));
        fields.insert("email".to_string(), Value::String(email));
        self.documents
            .update(PROFILE_COLLECTION, identity.as_str(), fields, true)
            .await?;
        self.fetch(Some(identity))
            .await?
            .ok_or_else(|| ProfileError::Validation("profile not found".to_string()))
    }
}

fn validate_contact(name: &str, email: &str) -> Result<(String, String), ProfileError> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() {
        return Err(ProfileError::Validation("name and email are required".to_string()));
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(ProfileError::Validation("please enter a valid email address".to_string()));
    }
    Ok((name.to_string(), email.to_string()))
}

fn to_fields(profile: &UserProfile) -> Result<Fields, ProfileError> {
    match serde_json::to_value(profile).map_err(|err| ProfileError::Store(err.into()))? {
        Value::Object(fields) => Ok(fields),
        _ => Err(ProfileError::Validation("profile is not an object".to_string())),
    }
}
