//! Accounts: login, registration, profiles and admin user management

use shared::error::{AppError, ErrorCode};
use shared::models::{
    AdminProfile, AuthSession, GymCreate, GymProfile, GymUpdate, LoginRequest, MemberProfile,
    MemberUpdate, RegisterMember, Role, User, UserProfile, UserSummary, default_permissions_json,
};
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::db::{RepoError, admins, gyms, members, users};
use crate::email::Mailer;
use crate::error::{ServiceError, ServiceResult};
use crate::security_log;
use crate::util::{generate_gym_code, generate_temp_password, hash_password, verify_password};
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, normalize_gym_code, validate_email,
    validate_gym_create, validate_gym_update, validate_optional_text, validate_password,
    validate_required_text,
};

fn hash(password: &str) -> ServiceResult<String> {
    hash_password(password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        ServiceError::App(AppError::internal("Password hashing failed"))
    })
}

fn issue_token(jwt: &JwtService, id: i64, role: Role) -> ServiceResult<String> {
    jwt.generate_token(id, role).map_err(|e| {
        tracing::error!(error = %e, "Token generation failed");
        ServiceError::App(AppError::internal("Token generation failed"))
    })
}

/// Map a unique violation on `users.email` to `EmailExists`
fn email_conflict(err: RepoError, email: &str) -> ServiceError {
    if err.is_duplicate_of("users.email") {
        return AppError::new(ErrorCode::EmailExists)
            .with_detail("email", email.to_string())
            .into();
    }
    err.into()
}

async fn summary(pool: &SqlitePool, user: &User) -> ServiceResult<UserSummary> {
    let mut summary = UserSummary::from_user(user);
    match user.role {
        Role::Member => {
            summary.tokens = members::find_by_id(pool, user.id).await?.map(|m| m.tokens);
        }
        Role::Gym => {
            summary.gym_code = gyms::find_by_id(pool, user.id).await?.map(|g| g.gym_code);
        }
        Role::Admin => {}
    }
    Ok(summary)
}

pub async fn login(
    pool: &SqlitePool,
    jwt: &JwtService,
    req: &LoginRequest,
) -> ServiceResult<AuthSession> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("email and password are required").into());
    }

    let user = match users::find_by_email(pool, &email).await? {
        Some(user) if user.role == req.role => user,
        _ => {
            security_log!("WARN", "login_unknown_user", email = email.clone(), role = req.role.as_db());
            return Err(AppError::invalid_credentials().into());
        }
    };
    if !user.is_active {
        security_log!("WARN", "login_disabled", user_id = user.id);
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }
    if !verify_password(&req.password, &user.password_hash) {
        security_log!("WARN", "login_bad_password", user_id = user.id);
        return Err(AppError::invalid_credentials().into());
    }

    let token = issue_token(jwt, user.id, user.role)?;
    tracing::info!(user_id = user.id, role = user.role.as_db(), "User logged in");
    Ok(AuthSession {
        token,
        user: summary(pool, &user).await?,
    })
}

pub async fn register_member(
    pool: &SqlitePool,
    jwt: &JwtService,
    data: &RegisterMember,
    now: i64,
) -> ServiceResult<AuthSession> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_email(&data.email)?;
    validate_password(&data.password)?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&data.date_of_birth, "date_of_birth", MAX_SHORT_TEXT_LEN)?;

    let email = data.email.trim().to_lowercase();
    if users::email_exists(pool, &email).await? {
        return Err(AppError::new(ErrorCode::EmailExists)
            .with_detail("email", email)
            .into());
    }

    let password_hash = hash(&data.password)?;
    let id = members::create(pool, data, &password_hash, now)
        .await
        .map_err(|e| email_conflict(e, &email))?;
    let token = issue_token(jwt, id, Role::Member)?;

    tracing::info!(member_id = id, "Member registered");
    Ok(AuthSession {
        token,
        user: UserSummary {
            id,
            name: data.name.trim().to_string(),
            email,
            role: Role::Member,
            tokens: Some(0),
            gym_code: None,
        },
    })
}

/// Full role-specific profile of a user
pub async fn profile(pool: &SqlitePool, user_id: i64, role: Role) -> ServiceResult<UserProfile> {
    let profile = match role {
        Role::Member => members::find_by_id(pool, user_id)
            .await?
            .map(|m| UserProfile::Member(MemberProfile::from(m))),
        Role::Gym => gyms::find_by_id(pool, user_id)
            .await?
            .map(|g| UserProfile::Gym(GymProfile::from(g))),
        Role::Admin => admins::find_by_id(pool, user_id)
            .await?
            .map(|a| UserProfile::Admin(AdminProfile::from(a))),
    };
    profile.ok_or_else(|| AppError::new(ErrorCode::UserNotFound).into())
}

/// Create a gym account with a temporary password and mail the credentials
pub async fn create_gym(
    pool: &SqlitePool,
    mailer: &Mailer,
    data: &GymCreate,
    now: i64,
) -> ServiceResult<GymProfile> {
    validate_gym_create(data)?;

    let email = data.email.trim().to_lowercase();
    if users::email_exists(pool, &email).await? {
        return Err(AppError::new(ErrorCode::EmailExists)
            .with_detail("email", email)
            .into());
    }

    let gym_code = match &data.gym_code {
        Some(code) if !code.trim().is_empty() => normalize_gym_code(code)?,
        _ => generate_gym_code(now),
    };
    if gyms::code_exists(pool, &gym_code).await? {
        return Err(AppError::new(ErrorCode::GymCodeExists)
            .with_detail("gym_code", gym_code)
            .into());
    }

    let temp_password = generate_temp_password();
    let password_hash = hash(&temp_password)?;
    let id = gyms::create(pool, data, &gym_code, &password_hash, now)
        .await
        .map_err(|e| {
            if e.is_duplicate_of("gyms.gym_code") {
                return ServiceError::from(
                    AppError::new(ErrorCode::GymCodeExists).with_detail("gym_code", gym_code.clone()),
                );
            }
            email_conflict(e, &email)
        })?;

    mailer
        .send_gym_credentials(&email, data.name.trim(), &gym_code, &temp_password)
        .await;

    let gym = gyms::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::internal("Created gym not found"))?;
    tracing::info!(gym_id = id, %gym_code, "Gym created");
    Ok(GymProfile::from(gym))
}

pub async fn update_member(
    pool: &SqlitePool,
    member_id: i64,
    data: &MemberUpdate,
    now: i64,
) -> ServiceResult<MemberProfile> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&data.date_of_birth, "date_of_birth", MAX_SHORT_TEXT_LEN)?;

    let member = members::update(pool, member_id, data, now)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => ServiceError::from(AppError::new(ErrorCode::MemberNotFound)),
            other => ServiceError::from(other),
        })?;
    tracing::info!(member_id, "Member updated");
    Ok(MemberProfile::from(member))
}

pub async fn update_gym(
    pool: &SqlitePool,
    gym_id: i64,
    data: &GymUpdate,
    now: i64,
) -> ServiceResult<GymProfile> {
    validate_gym_update(data)?;
    let gym = gyms::update(pool, gym_id, data, now)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => ServiceError::from(AppError::new(ErrorCode::GymNotFound)),
            other => ServiceError::from(other),
        })?;
    tracing::info!(gym_id, "Gym updated");
    Ok(GymProfile::from(gym))
}

pub async fn deactivate_user(pool: &SqlitePool, user_id: i64, now: i64) -> ServiceResult<UserSummary> {
    let user = users::deactivate(pool, user_id, now)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    security_log!("INFO", "user_deactivated", user_id = user.id, role = user.role.as_db());
    Ok(UserSummary::from_user(&user))
}

/// Create the first admin from configured credentials when none exists.
///
/// Returns the new admin id, or `None` when an admin is already present.
pub async fn bootstrap_admin(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    now: i64,
) -> ServiceResult<Option<i64>> {
    if users::count_by_role(pool, Role::Admin).await? > 0 {
        return Ok(None);
    }
    validate_email(email)?;
    validate_password(password)?;

    let password_hash = hash(password)?;
    let id = admins::create(
        pool,
        "Administrator",
        email,
        &password_hash,
        &default_permissions_json(),
        now,
    )
    .await
    .map_err(|e| email_conflict(e, email))?;
    tracing::info!(admin_id = id, email = %email.trim().to_lowercase(), "Bootstrap admin created");
    Ok(Some(id))
}
