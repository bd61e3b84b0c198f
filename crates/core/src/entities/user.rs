//! User profiles, addressable by id, email and Google account.

use serde::Serialize;
use uuid::Uuid;

use crate::item::{
    optional, validate_string_field, validate_string_list_field, validate_timestamp_field, Item,
    StringRules, TimestampRules, ATTR_GSI2_PK, ATTR_GSI2_SK, ATTR_GSI3_PK, ATTR_GSI3_SK,
};
use crate::keys::{user_gsi2_pk, user_gsi3_pk, user_key, user_pk, TableKey};
use crate::storage::{
    AttributeQuery, AttributeUpdates, EntityMapper, Repository, RepositoryError, Result,
    Timestamped,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: Uuid,
    pub google_id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub roles: Option<Vec<String>>,
    pub last_login_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserMapper;

impl EntityMapper for UserMapper {
    type Entity = User;
    type Key = Uuid;
    type Patch = UserPatch;

    const ENTITY_TYPE: &'static str = "User";

    fn build_keys(&self, user_id: &Uuid) -> TableKey {
        user_key(*user_id)
    }

    fn key_of(&self, user: &User) -> Uuid {
        user.user_id
    }

    fn to_item(&self, user: &User) -> Item {
        Item::keyed(&user_key(user.user_id), Self::ENTITY_TYPE)
            .with("UserID", user.user_id.to_string())
            .with("GoogleID", user.google_id.as_str())
            .with("Email", user.email.as_str())
            .with("Name", user.name.as_str())
            .with_opt("Picture", user.picture.as_deref())
            .with("Roles", user.roles.clone())
            .with_opt("LastLoginAt", user.last_login_at)
            .with(ATTR_GSI2_PK, user_gsi2_pk(&user.email))
            .with(ATTR_GSI2_SK, user_pk(user.user_id))
            .with(ATTR_GSI3_PK, user_gsi3_pk(&user.google_id))
            .with(ATTR_GSI3_SK, user_pk(user.user_id))
    }

    fn to_entity(&self, item: &Item) -> Result<User> {
        let raw_id = validate_string_field(item.get("UserID"), "UserID", &StringRules::default())?;
        let user_id = Uuid::parse_str(&raw_id).map_err(|_| {
            RepositoryError::InvalidEntityData("field \"UserID\" must be a UUID".to_string())
        })?;

        Ok(User {
            user_id,
            google_id: validate_string_field(
                item.get("GoogleID"),
                "GoogleID",
                &StringRules::default(),
            )?,
            email: validate_string_field(item.get("Email"), "Email", &StringRules::default())?,
            name: validate_string_field(item.get("Name"), "Name", &StringRules::default())?,
            picture: optional(item.get("Picture"), |v| {
                validate_string_field(v, "Picture", &StringRules::default())
            })?,
            roles: validate_string_list_field(item.get("Roles"), "Roles")?,
            last_login_at: optional(item.get("LastLoginAt"), |v| {
                validate_timestamp_field(v, "LastLoginAt", &TimestampRules::default())
            })?,
        })
    }

    fn patch_attributes(&self, patch: &UserPatch) -> AttributeUpdates {
        let mut set = AttributeUpdates::new();
        if let Some(email) = &patch.email {
            set.insert("Email".to_string(), email.as_str().into());
            // Keep the email index in step with the attribute.
            set.insert(ATTR_GSI2_PK.to_string(), user_gsi2_pk(email).into());
        }
        if let Some(name) = &patch.name {
            set.insert("Name".to_string(), name.as_str().into());
        }
        if let Some(picture) = &patch.picture {
            set.insert("Picture".to_string(), picture.as_str().into());
        }
        if let Some(roles) = &patch.roles {
            set.insert("Roles".to_string(), roles.clone().into());
        }
        if let Some(last_login_at) = patch.last_login_at {
            set.insert("LastLoginAt".to_string(), last_login_at.into());
        }
        set
    }
}

pub type UserRepository = Repository<UserMapper>;

impl Repository<UserMapper> {
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Timestamped<User>>> {
        self.find_one(&AttributeQuery::gsi2(user_gsi2_pk(email)))
            .await
    }

    pub async fn find_by_google_id(&self, google_id: &str) -> Result<Option<Timestamped<User>>> {
        self.find_one(&AttributeQuery::gsi3(user_gsi3_pk(google_id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::item::AttributeValue;
    use crate::storage::{decode_record, encode_record, InMemoryStore};

    fn user() -> User {
        User {
            user_id: Uuid::new_v4(),
            google_id: "g-123".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            picture: None,
            roles: vec!["user".to_string()],
            last_login_at: Some(1_700_000_000_000),
        }
    }

    fn repository() -> UserRepository {
        UserRepository::new(Arc::new(InMemoryStore::new("t")), UserMapper)
    }

    #[test]
    fn test_user_item_projects_secondary_indexes() {
        let user = user();
        let item = UserMapper.to_item(&user);
        let user_pk = format!("USER#{}", user.user_id);

        assert_eq!(item.pk(), Some(user_pk.as_str()));
        assert_eq!(item.sk(), Some("PROFILE"));
        assert_eq!(item.get_s("GSI2PK"), Some("EMAIL#ada@example.com"));
        assert_eq!(item.get_s("GSI2SK"), Some(user_pk.as_str()));
        assert_eq!(item.get_s("GSI3PK"), Some("GOOGLE#g-123"));
    }

    #[test]
    fn test_user_record_round_trip() {
        let mut user = user();
        user.picture = Some("https://example.com/ada.png".to_string());
        let record = Timestamped::new(user, 1_700_000_000_000);

        let item = encode_record(&UserMapper, &record);
        assert_eq!(decode_record(&UserMapper, &item).unwrap(), record);
    }

    #[test]
    fn test_user_decode_accepts_iso_last_login() {
        let mut item = encode_record(&UserMapper, &Timestamped::new(user(), 1));
        item.insert("LastLoginAt", AttributeValue::from("2024-01-01T00:00:00Z"));

        let decoded = decode_record(&UserMapper, &item).unwrap();
        assert_eq!(decoded.last_login_at, Some(1_704_067_200_000));
    }

    #[test]
    fn test_email_patch_moves_index_key() {
        let patch = UserPatch {
            email: Some("new@example.com".to_string()),
            ..UserPatch::default()
        };
        let set = UserMapper.patch_attributes(&patch);
        assert_eq!(
            set.get("GSI2PK"),
            Some(&AttributeValue::from("EMAIL#new@example.com"))
        );
    }

    #[tokio::test]
    async fn test_find_by_email_and_google_id() {
        let repo = repository();
        let created = repo.create(user()).await.unwrap();

        let by_email = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.user_id, created.user_id);

        let by_google = repo.find_by_google_id("g-123").await.unwrap().unwrap();
        assert_eq!(by_google.user_id, created.user_id);

        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_email_follows_email_change() {
        let repo = repository();
        let created = repo.create(user()).await.unwrap();

        let patch = UserPatch {
            email: Some("lovelace@example.com".to_string()),
            ..UserPatch::default()
        };
        repo.update(&created.user_id, &patch).await.unwrap();

        assert!(repo.find_by_email("ada@example.com").await.unwrap().is_none());
        let found = repo.find_by_email("lovelace@example.com").await.unwrap().unwrap();
        assert_eq!(found.email, "lovelace@example.com");
    }
}
