use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::jwt::JwtService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<R: UserRepository> {
    repo: R,
    jwt: JwtService,
}

impl<R: UserRepository> AuthService<R> {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(repo: R, jwt: JwtService) -> Self {
        Self { repo, jwt }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let password_hash = self.hash_password(&req.password)?;
        let user = self
            .repo
            .create_user(NewUser {
                name: req.name,
                email: req.email,
                password_hash,
            })
            .await?;

        let access_token = self
            .jwt
            .generate_token(user.id, &user.name)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(AuthResult { user, access_token })
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let credentials = match self.repo.find_by_email(&req.email).await? {
            Some(credentials) => credentials,
            None => {
                // Keep timing comparable whether or not the email exists.
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        self.verify_password(&req.password, &credentials.password_hash)?;

        let access_token = self
            .jwt
            .generate_token(credentials.user.id, &credentials.user.name)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(AuthResult {
            user: credentials.user,
            access_token,
        })
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use super::AuthService;
    use crate::data::repositories::memory::MemoryStore;
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, RegisterRequest};
    use crate::infrastructure::jwt::JwtService;

    fn service(store: &MemoryStore) -> AuthService<MemoryStore> {
        AuthService::new(
            store.clone(),
            JwtService::new("0123456789abcdef0123456789abcdef", 3600),
        )
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            name: "Max".to_string(),
            email: "max@example.com".to_string(),
            password: "very-secure-password".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let store = MemoryStore::new();
        let svc = service(&store);

        let registered = svc
            .register(register_request())
            .await
            .expect("register must succeed");
        assert_eq!(registered.user.email, "max@example.com");
        assert!(!registered.access_token.is_empty());

        let logged_in = svc
            .login(LoginRequest {
                email: "Max@Example.com".to_string(),
                password: "very-secure-password".to_string(),
            })
            .await
            .expect("login must succeed");
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email_alike() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.register(register_request())
            .await
            .expect("register must succeed");

        let wrong_password = svc
            .login(LoginRequest {
                email: "max@example.com".to_string(),
                password: "not-the-password".to_string(),
            })
            .await
            .expect_err("wrong password must fail");
        assert!(matches!(wrong_password, DomainError::InvalidCredentials));

        let unknown_email = svc
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "whatever-it-is".to_string(),
            })
            .await
            .expect_err("unknown email must fail");
        assert!(matches!(unknown_email, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.register(register_request())
            .await
            .expect("register must succeed");

        let err = svc
            .register(register_request())
            .await
            .expect_err("duplicate email must fail");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }
}
