use std::{sync::Arc, time::Duration};

use rand::Rng;
use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        CheckCodeRequest, LoginRequest, LoginResponse, PublicUser, ResetRequest, SignupRequest,
        SignupResponse, StatusResponse, UpdatePasswordRequest, UpdateUserRequest,
    },
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    validate::{
        is_strong_password, is_valid_birthday, is_valid_email, is_valid_full_name,
        is_valid_username, parse_birthday,
    },
};
use crate::{
    error::{ApiError, ApiResult},
    notify::Notifier,
    store::{CredentialStore, NewUser, User},
};

const WEAK_PASSWORD: &str = "Password must be at least 8 characters and contain an uppercase \
     letter, a lowercase letter, a digit and a special character";
const BAD_USERNAME: &str = "Username must be 3-20 letters, digits, '_' or '.'";
const BAD_FULL_NAME: &str = "Full name must look like \"First [Middle] Last\"";
const BAD_BIRTHDAY: &str = "Birthday must be a past date formatted YYYY-MM-DD";

/// Account operations over a credential store and a code notifier.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    keys: JwtKeys,
    code_ttl: Duration,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        keys: JwtKeys,
        code_ttl: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            keys,
            code_ttl,
        }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    #[instrument(skip(self, req), fields(email = %req.email, username = %req.username))]
    pub async fn signup(&self, req: SignupRequest) -> ApiResult<SignupResponse> {
        let email = normalize_email(&req.email);
        let username = req.username.trim().to_string();
        let full_name = req.full_name.trim().to_string();

        if !is_valid_email(&email) {
            return Err(ApiError::validation("Invalid email"));
        }
        if !is_valid_username(&username) {
            return Err(ApiError::validation(BAD_USERNAME));
        }
        if !is_valid_full_name(&full_name) {
            return Err(ApiError::validation(BAD_FULL_NAME));
        }
        if !is_strong_password(&req.password) {
            return Err(ApiError::validation(WEAK_PASSWORD));
        }
        if !is_valid_birthday(req.birthday.trim()) {
            return Err(ApiError::validation(BAD_BIRTHDAY));
        }
        let birthday = parse_birthday(req.birthday.trim())
            .ok_or_else(|| ApiError::validation(BAD_BIRTHDAY))?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            warn!("email already registered");
            return Err(ApiError::Conflict("Email already registered".into()));
        }
        if self.store.find_user_by_username(&username).await?.is_some() {
            warn!("username already taken");
            return Err(ApiError::Conflict("Username already taken".into()));
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .store
            .insert_user(NewUser {
                full_name: full_name.clone(),
                username: username.clone(),
                email: email.clone(),
                password_hash,
                birthday,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(SignupResponse {
            full_name,
            username,
            email,
            birthday: req.birthday.trim().to_string(),
        })
    }

    #[instrument(skip(self, req))]
    pub async fn login(&self, req: LoginRequest) -> ApiResult<LoginResponse> {
        let identifier = req.identifier.trim();
        let identifier = if identifier.contains('@') {
            normalize_email(identifier)
        } else {
            identifier.to_string()
        };

        let Some(user) = self.store.find_user_by_login(&identifier).await? else {
            warn!(%identifier, "login unknown user");
            return Err(ApiError::InvalidCredentials);
        };

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.keys.sign(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    /// Sets a new password for a holder of a live reset code.
    ///
    /// `old_password` and `new_password` are a confirmation pair and must be
    /// equal. The change is accepted only when that password differs from the
    /// one currently stored.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn update_password(&self, req: UpdatePasswordRequest) -> ApiResult<StatusResponse> {
        let email = normalize_email(&req.email);
        let code = req.code.trim();
        self.live_code(&email, code).await?;

        if req.old_password != req.new_password {
            return Err(ApiError::validation("Passwords do not match"));
        }

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(ApiError::NotFound("User"))?;

        if verify_password(&req.old_password, &user.password_hash)? {
            return Err(ApiError::validation(
                "New password must differ from the current password",
            ));
        }
        if !is_strong_password(&req.new_password) {
            return Err(ApiError::validation(WEAK_PASSWORD));
        }

        let password_hash = hash_password(&req.new_password)?;
        self.store.set_password_hash(&email, &password_hash).await?;
        self.store.delete_code(&email, code).await?;

        info!(user_id = %user.id, "password reset");
        Ok(StatusResponse::ok("Password updated"))
    }

    #[instrument(skip(self, req))]
    pub async fn update_user(&self, id: Uuid, req: UpdateUserRequest) -> ApiResult<PublicUser> {
        let current = self
            .store
            .find_user(id)
            .await?
            .ok_or(ApiError::NotFound("User"))?;
        let mut next = current.clone();

        if let Some(username) = req.username.as_deref().map(str::trim) {
            if !is_valid_username(username) {
                return Err(ApiError::validation(BAD_USERNAME));
            }
            if self.taken_by_other(id, self.store.find_user_by_username(username).await?) {
                return Err(ApiError::Conflict("Username already taken".into()));
            }
            next.username = username.to_string();
        }
        if let Some(full_name) = req.full_name.as_deref().map(str::trim) {
            if !is_valid_full_name(full_name) {
                return Err(ApiError::validation(BAD_FULL_NAME));
            }
            next.full_name = full_name.to_string();
        }
        if let Some(email) = req.email.as_deref().map(normalize_email) {
            if !is_valid_email(&email) {
                return Err(ApiError::validation("Invalid email"));
            }
            if self.taken_by_other(id, self.store.find_user_by_email(&email).await?) {
                return Err(ApiError::Conflict("Email already registered".into()));
            }
            next.email = email;
        }
        if let Some(birthday) = req.birthday.as_deref() {
            next.birthday =
                parse_birthday(birthday.trim()).ok_or_else(|| ApiError::validation(BAD_BIRTHDAY))?;
        }

        if let (Some(old), Some(new)) = (req.old_password.as_deref(), req.new_password.as_deref()) {
            if old == new {
                return Err(ApiError::validation(
                    "New password must differ from the old password",
                ));
            }
            if !verify_password(old, &current.password_hash)? {
                return Err(ApiError::validation("Old password is incorrect"));
            }
            if !is_strong_password(new) {
                return Err(ApiError::validation(WEAK_PASSWORD));
            }
            next.password_hash = hash_password(new)?;
        }

        if next == current {
            return Err(ApiError::validation("Nothing to update"));
        }

        let updated = self.store.update_user(&next).await?;
        info!(user_id = %id, "user updated");
        Ok(updated.into())
    }

    /// Issues a fresh reset code, replacing any earlier one, and mails it.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn request_reset(&self, req: ResetRequest) -> ApiResult<StatusResponse> {
        let email = normalize_email(&req.email);
        if self.store.find_user_by_email(&email).await?.is_none() {
            return Err(ApiError::NotFound("User"));
        }

        let code = generate_code();
        self.store.delete_codes_for(&email).await?;
        self.store.insert_code(&email, &code).await?;

        self.schedule_expiry(email.clone(), code.clone());
        self.dispatch_code(email, code);

        Ok(StatusResponse::ok("Verification code sent"))
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn check_code(&self, req: CheckCodeRequest) -> ApiResult<StatusResponse> {
        let email = normalize_email(&req.email);
        self.live_code(&email, req.code.trim()).await?;
        Ok(StatusResponse::ok("Code verified"))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> ApiResult<StatusResponse> {
        let removed = self.store.delete_user(id).await?;
        info!(user_id = %id, removed, "delete user");
        Ok(StatusResponse {
            success: removed,
            message: if removed {
                "User deleted".into()
            } else {
                "No user with that id".into()
            },
        })
    }

    pub async fn get_user(&self, id: Uuid) -> ApiResult<PublicUser> {
        self.store
            .find_user(id)
            .await?
            .map(PublicUser::from)
            .ok_or(ApiError::NotFound("User"))
    }

    pub async fn list_users(&self) -> ApiResult<Vec<PublicUser>> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    fn taken_by_other(&self, id: Uuid, found: Option<User>) -> bool {
        found.is_some_and(|u| u.id != id)
    }

    async fn live_code(&self, email: &str, code: &str) -> ApiResult<()> {
        match self.store.find_code(email, code).await? {
            Some(row) if !row.is_expired(self.code_ttl, OffsetDateTime::now_utc()) => Ok(()),
            Some(_) => {
                debug!(%email, "verification code past its ttl");
                Err(ApiError::InvalidCode)
            }
            None => Err(ApiError::InvalidCode),
        }
    }

    /// Deletes this exact code once the ttl elapses. A newer code for the same
    /// email is left alone.
    fn schedule_expiry(&self, email: String, code: String) {
        let store = Arc::clone(&self.store);
        let ttl = self.code_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            match store.delete_code(&email, &code).await {
                Ok(true) => debug!(%email, "verification code expired"),
                Ok(false) => {}
                Err(e) => warn!(error = %e, %email, "failed to expire verification code"),
            }
        });
    }

    fn dispatch_code(&self, email: String, code: String) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            match notifier.send_verification_code(&email, &code).await {
                Ok(()) => info!(%email, "verification email sent"),
                Err(e) => error!(error = %e, %email, "verification email failed"),
            }
        });
    }
}
