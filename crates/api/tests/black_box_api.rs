use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jobboard_api::app::services::AppServices;
use jobboard_api::config::ApiConfig;
use jobboard_auth::{JwtClaims, LOCAL_PROVIDER, NewRole, NewUser, PasswordHasher, RoleType};
use jobboard_core::UserId;
use jobboard_infra::{InMemoryStore, RoleStore, Store, UserStore, run_bootstrap};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = test_config();
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        run_bootstrap(&*store);
        Self::spawn_with(Arc::new(AppServices::new(store, &config)), config).await
    }

    async fn spawn_with(services: Arc<AppServices>, config: ApiConfig) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = jobboard_api::app::build_app_with(services, &config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, username: &str, role: &str) -> (String, Value) {
        let res = self
            .client
            .post(self.url("/api/auth/local/register"))
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "correct horse",
                "profile": {"headline": username},
                "role": role,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "register {username}");
        let body: Value = res.json().await.unwrap();
        (body["jwt"].as_str().unwrap().to_string(), body["user"].clone())
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn put(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn create_job(&self, token: &str, title: &str) -> u64 {
        let (status, body) = self
            .post(
                token,
                "/api/jobs",
                json!({"data": {"title": title, "description": "Write Rust", "job_type": "Full-time"}}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["id"].as_u64().unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn test_config() -> ApiConfig {
    ApiConfig {
        jwt_secret: JWT_SECRET.to_string(),
        ..ApiConfig::default()
    }
}

fn mint_jwt(user_id: u64, issued_at: chrono::DateTime<Utc>, ttl: ChronoDuration) -> String {
    let claims = JwtClaims::new(UserId::new(user_id), issued_at, ttl);
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn login(srv: &TestServer, body: Value) -> (StatusCode, Value) {
    let res = srv
        .client
        .post(srv.url("/api/auth/local"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn health_is_public_and_protected_routes_need_a_token() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/api/jobs")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"]["name"], "UnauthorizedError");
    assert_eq!(body["error"]["status"], 401);
    assert_eq!(error_message(&body), "Missing or invalid credentials");
}

#[tokio::test]
async fn tokens_for_unknown_users_or_expired_tokens_are_rejected() {
    let srv = TestServer::spawn().await;

    let ghost = mint_jwt(999, Utc::now(), ChronoDuration::minutes(10));
    let (status, _) = srv.get(&ghost, "/api/users/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, user) = srv.register("carol", "candidate").await;
    let id = user["id"].as_u64().unwrap();
    let expired = mint_jwt(id, Utc::now() - ChronoDuration::hours(2), ChronoDuration::hours(1));
    let (status, _) = srv.get(&expired, "/api/users/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let valid = mint_jwt(id, Utc::now(), ChronoDuration::minutes(10));
    let (status, body) = srv.get(&valid, "/api/users/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "carol");
}

#[tokio::test]
async fn registration_login_and_profile() {
    let srv = TestServer::spawn().await;

    let (token, user) = srv.register("alice", "Employer").await;
    assert_eq!(user["provider"], "local");
    assert_eq!(user["confirmed"], false);
    assert_eq!(user["role"]["type"], "employer");
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    let (status, me) = srv.get(&token, "/api/users/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");
    assert_eq!(me["role"]["name"], "Employer");
    assert_eq!(me["profile"]["headline"], "alice");

    for identifier in ["alice", "ALICE@example.com"] {
        let res = srv
            .client
            .post(srv.url("/api/auth/local"))
            .json(&json!({"identifier": identifier, "password": "correct horse"}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "login as {identifier}");
        let body: Value = res.json().await.unwrap();
        assert!(body["jwt"].as_str().is_some());
        assert_eq!(body["user"]["role"]["type"], "employer");
    }

    let res = srv
        .client
        .post(srv.url("/api/auth/local"))
        .json(&json!({"identifier": "alice", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(error_message(&body), "Invalid identifier or password");
}

#[tokio::test]
async fn duplicate_or_invalid_registrations_create_nothing() {
    let srv = TestServer::spawn().await;
    srv.register("dana", "candidate").await;

    let attempts = [
        (
            json!({"username": "dana", "email": "other@example.com", "password": "pw", "role": "candidate"}),
            "Username is already taken",
        ),
        (
            json!({"username": "dana2", "email": "DANA@example.com", "password": "pw", "role": "candidate"}),
            "Email is already registered",
        ),
        (
            json!({"username": "erin", "email": "erin@example.com", "password": "pw", "role": "admin"}),
            "Invalid or missing role: must be \"candidate\" or \"employer\"",
        ),
        (
            json!({"username": "erin", "email": "erin@example.com"}),
            "Missing required fields: username, email, and password are required",
        ),
    ];

    for (body, message) in attempts {
        let res = srv
            .client
            .post(srv.url("/auth/local/register"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await.unwrap();
        assert_eq!(error_message(&body), message);
        assert_eq!(body["error"]["name"], "BadRequestError");
    }

    // The rejected "dana2" registration left no account behind.
    let res = srv
        .client
        .post(srv.url("/api/auth/local"))
        .json(&json!({"identifier": "dana2", "password": "pw"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_employers_create_jobs() {
    let srv = TestServer::spawn().await;
    let (candidate, _) = srv.register("frank", "candidate").await;
    let (employer, _) = srv.register("grace", "employer").await;

    let (status, body) = srv
        .post(&candidate, "/api/jobs", json!({"data": {"title": "T", "description": "D"}}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "Only Employers can create jobs");

    let (status, body) = srv.post(&employer, "/api/jobs", json!({"data": {"title": "T"}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "Missing required fields: title and description are required"
    );

    let (status, body) = srv
        .post(
            &employer,
            "/api/jobs",
            json!({"data": {"title": "T", "description": "D", "job_type": "Gig"}}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "Invalid job_type: must be one of Full-time, Part-time, Contract, Internship"
    );

    let (status, body) = srv
        .post(
            &employer,
            "/api/jobs",
            json!({"data": {"title": "Rust Dev", "description": "D", "published_at": true}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["employer"]["username"], "grace");
    assert!(body["data"]["publishedAt"].is_string());
    assert_eq!(body["meta"], json!({}));
}

#[tokio::test]
async fn candidate_cannot_see_or_apply_to_unpublished_jobs() {
    let srv = TestServer::spawn().await;
    let (employer, _) = srv.register("heidi", "employer").await;
    let (candidate, _) = srv.register("ivan", "candidate").await;
    let job_id = srv.create_job(&employer, "Draft role").await;

    let (status, _) = srv.get(&candidate, &format!("/api/jobs/{job_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = srv.get(&employer, &format!("/api/jobs/{job_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["publishedAt"], Value::Null);

    let (status, body) = srv.get(&candidate, "/api/jobs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = srv
        .post(&candidate, "/api/applications", json!({"data": {"job": job_id}}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Job not found or not published");

    let (status, body) = srv.get(&candidate, "/api/jobs/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Invalid job ID: must be a positive integer");
}

#[tokio::test]
async fn publish_apply_and_review_applications() {
    let srv = TestServer::spawn().await;
    let (employer, _) = srv.register("judy", "employer").await;
    let (other_employer, _) = srv.register("ken", "employer").await;
    let (candidate, _) = srv.register("liam", "candidate").await;
    let job_id = srv.create_job(&employer, "Platform Engineer").await;

    let (status, body) = srv
        .post(&other_employer, &format!("/api/jobs/{job_id}/publish"), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "You can only publish jobs you created");

    let (status, body) = srv
        .post(&employer, &format!("/api/jobs/{job_id}/publish"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["publishedAt"].is_string());

    let (status, body) = srv
        .post(&candidate, "/api/applications", json!({"data": {"job": job_id.to_string()}}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["app_status"], "Submitted");
    assert_eq!(body["data"]["job"]["employer"]["username"], "judy");
    assert_eq!(body["data"]["candidate"]["username"], "liam");

    let (status, body) = srv
        .post(&candidate, "/api/applications", json!({"data": {"job": job_id}}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "You have already applied to this job");

    let (status, body) = srv
        .post(&employer, "/api/applications", json!({"data": {"job": job_id}}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "Only Candidates can apply to jobs");

    let (status, body) = srv.get(&candidate, "/api/applications/me").await;
    assert_eq!(status, StatusCode::OK);
    let mine = body["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["job"]["title"], "Platform Engineer");
    assert_eq!(mine[0]["app_status"], "Submitted");

    let path = format!("/api/applications/job/{job_id}");
    let (status, body) = srv.get(&other_employer, &path).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        error_message(&body),
        "You can only view applications for jobs you created"
    );

    let (status, body) = srv.get(&candidate, &path).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "Only Employers can view job applications");

    let (status, body) = srv.get(&employer, &path).await;
    assert_eq!(status, StatusCode::OK);
    let applicants = body["data"].as_array().unwrap();
    assert_eq!(applicants.len(), 1);
    assert_eq!(applicants[0]["candidate"]["email"], "liam@example.com");

    let (status, body) = srv.get(&employer, "/api/applications/job/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "Job with ID 9999 not found");
}

#[tokio::test]
async fn updates_are_owner_only_and_whitelisted() {
    let srv = TestServer::spawn().await;
    let (owner, owner_user) = srv.register("mallory", "employer").await;
    let (intruder, intruder_user) = srv.register("nina", "employer").await;
    let (candidate, _) = srv.register("oscar", "candidate").await;
    let job_id = srv.create_job(&owner, "Original").await;
    let path = format!("/api/jobs/{job_id}");

    let (status, body) = srv.put(&intruder, &path, json!({"data": {"title": "Hijacked"}})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "You can only update jobs you created");

    let (status, body) = srv.put(&candidate, &path, json!({"data": {"title": "Nope"}})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "Only Employers can update jobs");

    let (status, body) = srv.put(&owner, &path, json!({"title": "No envelope"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Missing data in request body");

    let (status, body) = srv.put(&owner, &path, json!({"data": {"title": "  "}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Title cannot be empty");

    let (status, body) = srv
        .put(
            &owner,
            &path,
            json!({"data": {
                "title": "Renamed",
                "location": "Berlin",
                "employer": intruder_user["id"],
                "publishedAt": "2020-01-01T00:00:00Z",
            }}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Renamed");
    assert_eq!(body["data"]["location"], "Berlin");
    assert_eq!(body["data"]["description"], "Write Rust");
    assert_eq!(body["data"]["publishedAt"], Value::Null);
    assert_eq!(body["data"]["employer"]["id"], owner_user["id"]);

    let (_, body) = srv.get(&owner, &path).await;
    assert_eq!(body["data"]["employer"]["id"], owner_user["id"]);
    assert_ne!(body["data"]["createdAt"], body["data"]["updatedAt"]);

    let (status, _) = srv.put(&owner, "/api/jobs/4242", json!({"data": {"title": "X"}})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_job_removes_its_applications() {
    let srv = TestServer::spawn().await;
    let (employer, _) = srv.register("peggy", "employer").await;
    let (candidate, _) = srv.register("quinn", "candidate").await;
    let job_id = srv.create_job(&employer, "Short lived").await;
    srv.post(&employer, &format!("/api/jobs/{job_id}/publish"), json!({})).await;

    let (status, _) = srv
        .post(&candidate, "/api/applications", json!({"data": {"job": job_id}}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let res = srv
        .client
        .delete(srv.url(&format!("/api/jobs/{job_id}")))
        .bearer_auth(&employer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (_, body) = srv.get(&candidate, "/api/applications/me").await;
    assert_eq!(body["data"], json!([]));
    let (status, _) = srv.get(&employer, &format!("/api/jobs/{job_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn employers_can_list_only_their_own_jobs() {
    let srv = TestServer::spawn().await;
    let (alpha, _) = srv.register("rita", "employer").await;
    let (beta, _) = srv.register("sam", "employer").await;
    srv.create_job(&alpha, "Alpha role").await;
    srv.create_job(&beta, "Beta role").await;

    let (_, all) = srv.get(&alpha, "/api/jobs").await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);

    let (_, mine) = srv.get(&alpha, "/api/jobs?mine=true").await;
    let mine = mine["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["title"], "Alpha role");
}

#[tokio::test]
async fn blocked_users_cannot_log_in_or_use_tokens() {
    let config = test_config();
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    run_bootstrap(&*store);

    let role = store
        .find_role_by_type(&RoleType::AUTHENTICATED)
        .unwrap()
        .unwrap();
    let user = store
        .create_user(NewUser {
            username: "trent".to_string(),
            email: "trent@example.com".to_string(),
            password_hash: PasswordHasher::new().hash("pw").unwrap(),
            profile: None,
            role: role.id,
            provider: LOCAL_PROVIDER.to_string(),
            confirmed: true,
            blocked: true,
        })
        .unwrap();

    let srv = TestServer::spawn_with(Arc::new(AppServices::new(store, &config)), config).await;

    let res = srv
        .client
        .post(srv.url("/api/auth/local"))
        .json(&json!({"identifier": "trent", "password": "pw"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        error_message(&body),
        "Your account has been blocked by an administrator"
    );

    let token = mint_jwt(user.id.get(), Utc::now(), ChronoDuration::minutes(5));
    let (status, _) = srv.get(&token, "/api/users/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_missing_fields_and_unknown_users() {
    let srv = TestServer::spawn().await;
    srv.register("uma", "candidate").await;

    for body in [
        json!({"identifier": "uma"}),
        json!({"password": "correct horse"}),
        json!({"identifier": "  ", "password": "correct horse"}),
    ] {
        let (status, res) = login(&srv, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&res), "Missing identifier or password");
    }

    let (status, res) = login(&srv, json!({"identifier": "nobody", "password": "pw"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&res), "Invalid identifier or password");
    assert_eq!(res["error"]["name"], "BadRequestError");
}

#[tokio::test]
async fn usernames_cannot_shadow_another_users_email() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/api/auth/local/register"))
        .json(&json!({
            "username": "victim@x.io",
            "email": "att@x.io",
            "password": "pw",
            "role": "candidate",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(error_message(&body), r#"Username cannot contain "@""#);

    let res = srv
        .client
        .post(srv.url("/api/auth/local/register"))
        .json(&json!({
            "username": "victim",
            "email": "victim@x.io",
            "password": "pw",
            "role": "candidate",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (status, body) = login(&srv, json!({"identifier": "victim@x.io", "password": "pw"})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["username"], "victim");
}

#[tokio::test]
async fn non_ascii_emails_log_in_in_any_case() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/api/auth/local/register"))
        .json(&json!({
            "username": "zoe",
            "email": "Zoë@Example.com",
            "password": "pw",
            "role": "candidate",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (status, body) = login(&srv, json!({"identifier": "ZOË@EXAMPLE.COM", "password": "pw"})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["email"], "zoë@example.com");
}

#[tokio::test]
async fn registration_fails_when_the_role_does_not_exist() {
    let config = test_config();
    // No bootstrap: the employer role was never created.
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let srv = TestServer::spawn_with(Arc::new(AppServices::new(store, &config)), config).await;

    let res = srv
        .client
        .post(srv.url("/api/auth/local/register"))
        .json(&json!({
            "username": "victor",
            "email": "victor@example.com",
            "password": "pw",
            "role": "employer",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(error_message(&body), r#"Role "employer" not found"#);

    let (status, _) = login(&srv, json!({"identifier": "victor", "password": "pw"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn roles_without_the_grant_are_forbidden() {
    let config = test_config();
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    // Employer role exists but holds no permission grants.
    store
        .create_role(NewRole {
            name: "Employer".to_string(),
            role_type: RoleType::EMPLOYER,
            description: None,
        })
        .unwrap();
    let srv = TestServer::spawn_with(Arc::new(AppServices::new(store, &config)), config).await;
    let (employer, _) = srv.register("wendy", "employer").await;

    let (status, body) = srv
        .post(&employer, "/api/jobs", json!({"data": {"title": "T", "description": "D"}}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "Forbidden");
    assert_eq!(body["error"]["name"], "ForbiddenError");

    let (status, body) = srv.get(&employer, "/api/jobs").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "Forbidden");
}

#[tokio::test]
async fn employers_cannot_list_candidate_applications() {
    let srv = TestServer::spawn().await;
    let (employer, _) = srv.register("xena", "employer").await;

    let (status, body) = srv.get(&employer, "/api/applications/me").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        error_message(&body),
        "Only Candidates can view their applications"
    );
}

#[tokio::test]
async fn unpublishing_hides_the_job_from_candidates_again() {
    let srv = TestServer::spawn().await;
    let (employer, _) = srv.register("yara", "employer").await;
    let (other_employer, _) = srv.register("yusuf", "employer").await;
    let (candidate, _) = srv.register("yves", "candidate").await;
    let job_id = srv.create_job(&employer, "Seasonal").await;

    srv.post(&employer, &format!("/api/jobs/{job_id}/publish"), json!({})).await;
    let (status, _) = srv.get(&candidate, &format!("/api/jobs/{job_id}")).await;
    assert_eq!(status, StatusCode::OK);

    let unpublish = format!("/api/jobs/{job_id}/unpublish");
    let (status, body) = srv.post(&other_employer, &unpublish, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "You can only publish jobs you created");

    let (status, body) = srv.post(&employer, &unpublish, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["publishedAt"], Value::Null);

    let (status, _) = srv.get(&candidate, &format!("/api/jobs/{job_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = srv.get(&candidate, "/api/jobs").await;
    assert_eq!(body["data"], json!([]));

    let (status, body) = srv
        .post(&candidate, "/api/applications", json!({"data": {"job": job_id}}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Job not found or not published");
}
