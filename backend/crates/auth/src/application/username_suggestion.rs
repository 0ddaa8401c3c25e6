//! User Name Suggestion
//!
//! First initial plus last name, lower-cased and reduced to `[a-z0-9_-]`,
//! with the first free numeric suffix appended: `jdoe`, `jdoe1`, `jdoe2`, ...

use std::sync::Arc;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_name::USER_NAME_MAX_LENGTH;
use crate::error::AuthResult;

/// Base used when the names contain nothing usable
pub const FALLBACK_BASE: &str = "user";

/// User name suggestion use case
pub struct SuggestUserNameUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> SuggestUserNameUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, first_name: &str, last_name: &str) -> AuthResult<String> {
        let base = suggestion_base(first_name, last_name);

        let mut suffix: u32 = 0;
        loop {
            let candidate = with_suffix(&base, suffix);
            if !self.user_repo.exists_by_user_name(&candidate).await? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }
}

/// Collision-free part of the suggestion, at most `USER_NAME_MAX_LENGTH` long
pub fn suggestion_base(first_name: &str, last_name: &str) -> String {
    let mut base: String = first_name
        .trim()
        .chars()
        .take(1)
        .chain(last_name.trim().chars())
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    base.truncate(USER_NAME_MAX_LENGTH);

    if base.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        base
    }
}

// base is ASCII, so byte truncation stays on a char boundary
fn with_suffix(base: &str, suffix: u32) -> String {
    if suffix == 0 {
        return base.to_string();
    }
    let suffix = suffix.to_string();
    let keep = base.len().min(USER_NAME_MAX_LENGTH.saturating_sub(suffix.len()));
    format!("{}{suffix}", &base[..keep])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::User;
    use crate::domain::value_object::user_name::UserName;
    use crate::infra::memory::InMemoryAuthRepository;
    use platform::password::PasswordDigest;

    #[test]
    fn test_suggestion_base() {
        assert_eq!(suggestion_base("Jane", "Doe"), "jdoe");
        assert_eq!(suggestion_base("  Jean-Luc ", "O'Brien"), "jobrien");
        assert_eq!(suggestion_base("Émile", "Zola"), "zola");
        assert_eq!(suggestion_base("", "Smith-Jones"), "smith-jones");
        assert_eq!(suggestion_base("", ""), FALLBACK_BASE);
    }

    #[tokio::test]
    async fn test_suffixes_until_free() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let uc = SuggestUserNameUseCase::new(repo.clone());

        assert_eq!(uc.execute("Jane", "Doe").await.unwrap(), "jdoe");

        for name in ["jdoe", "JDoe1"] {
            let user = User::new(
                UserName::new(name).unwrap(),
                PasswordDigest::from_stored("00"),
                format!("{name}@example.org"),
            );
            repo.create(&user).await.unwrap();
        }

        assert_eq!(uc.execute("Jane", "Doe").await.unwrap(), "jdoe2");
    }

    #[tokio::test]
    async fn test_long_names_stay_valid_user_names() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let uc = SuggestUserNameUseCase::new(repo.clone());
        let last_name = "Wolfeschlegelsteinhausenbergerdorff";

        let first = uc.execute("Hubert", last_name).await.unwrap();
        assert_eq!(first.len(), USER_NAME_MAX_LENGTH);
        let user = User::new(
            UserName::new(&first).unwrap(),
            PasswordDigest::from_stored("00"),
            "hubert@example.org",
        );
        repo.create(&user).await.unwrap();

        let second = uc.execute("Hubert", last_name).await.unwrap();
        assert_eq!(second.len(), USER_NAME_MAX_LENGTH);
        assert!(second.ends_with('1'));
        assert!(UserName::new(&second).is_ok());
    }
}
