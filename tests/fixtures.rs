//! Shared builders for integration tests.

use serde_json::{Value, json};

/// A WordPress post body with the embedded envelope shape the client expects.
pub fn wp_post(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "date": "2024-01-01T00:00:00",
        "title": { "rendered": title },
        "content": { "rendered": format!("<p>{title} body</p>") },
        "categories": [1]
    })
}

/// A successful login/register response body.
pub fn auth_body(access: &str, refresh: &str) -> Value {
    json!({
        "accessToken": access,
        "refreshToken": refresh,
        "user": { "id": "u1", "email": "a@b.com", "name": "Ada" }
    })
}

/// A minimal profile document.
pub fn profile_body(name: &str) -> Value {
    json!({
        "_id": "u1",
        "name": name,
        "email": "a@b.com",
        "level": "Explorer",
        "profile": { "skills": ["rust"], "bio": null }
    })
}

/// A pre-populated session store file, as the app would have written it.
pub fn session_file(access: &str, refresh: &str) -> String {
    let user = json!({ "id": "u1", "email": "a@b.com", "name": "Ada" });
    serde_json::to_string_pretty(&json!({
        "accessToken": access,
        "refreshToken": refresh,
        "userInfo": user.to_string(),
        "onboardingCompleted": "true"
    }))
    .expect("serialize session fixture")
}
