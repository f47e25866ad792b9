use argon2::{Argon2, PasswordHash, PasswordVerifier};
use jsonwebtoken::{DecodingKey, Validation, decode};
use storefront_api::{
    dto::auth::Claims,
    middleware::auth::{AuthUser, ROLE_ADMIN, ensure_admin},
    services::auth_service::{hash_password, issue_token},
};
use uuid::Uuid;

#[test]
fn issued_token_carries_user_and_role() {
    let user_id = Uuid::new_v4();
    let token = issue_token("secret", user_id, ROLE_ADMIN).expect("token");

    let data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(b"secret"),
        &Validation::default(),
    )
    .expect("valid token");
    assert_eq!(data.claims.sub, user_id.to_string());
    assert_eq!(data.claims.role, ROLE_ADMIN);

    let wrong = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(b"other"),
        &Validation::default(),
    );
    assert!(wrong.is_err());
}

#[test]
fn password_hash_verifies() {
    let hash = hash_password("correct horse").expect("hash");
    let parsed = PasswordHash::new(&hash).expect("phc string");
    assert!(Argon2::default().verify_password(b"correct horse", &parsed).is_ok());
    assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
}

#[test]
fn only_admins_pass_the_guard() {
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: ROLE_ADMIN.into(),
    };
    let user = AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    };
    assert!(ensure_admin(&admin).is_ok());
    assert!(ensure_admin(&user).is_err());
}
