#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use directory::{
    AppState,
    auth::{self, AuthConfig, SESSION_COOKIE},
    build_router,
    flash::FLASH_COOKIE,
};
use entity::{department, employee, role};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DatabaseConnection,
    EntityTrait, PaginatorTrait,
};
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "adminadmin";
pub const USER_USERNAME: &str = "test_user";
pub const USER_PASSWORD: &str = "useruser";

/// Argon2 is slow in debug builds; hash the fixture passwords once per binary.
fn fixture_hashes() -> &'static (String, String) {
    static HASHES: OnceLock<(String, String)> = OnceLock::new();
    HASHES.get_or_init(|| {
        (
            auth::hash_password(ADMIN_PASSWORD).unwrap(),
            auth::hash_password(USER_PASSWORD).unwrap(),
        )
    })
}

pub struct TestApp {
    pub router: Router,
    pub db: Arc<DatabaseConnection>,
    pub auth: Arc<AuthConfig>,
    pub admin_id: i32,
    pub user_id: i32,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_routes(Router::new()).await
    }

    /// Builds the app on a fresh in-memory database, merging `extra` routes
    /// in front of the directory router.
    pub async fn with_routes(extra: Router) -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let conn = Database::connect(options).await.unwrap();
        Migrator::up(&conn, None).await.unwrap();

        let (admin_hash, user_hash) = fixture_hashes().clone();
        let admin_id = insert_employee(&conn, ADMIN_USERNAME, admin_hash, true).await;
        let user_id = insert_employee(&conn, USER_USERNAME, user_hash, false).await;

        let db = Arc::new(conn);
        let auth = Arc::new(AuthConfig {
            jwt_secret: "integration-test-secret".into(),
            session_ttl_minutes: 30,
            secure_cookies: false,
        });
        let router = extra.merge(build_router(AppState::new(db.clone(), auth.clone())));
        Self {
            router,
            db,
            auth,
            admin_id,
            user_id,
        }
    }

    pub fn session_for(&self, employee_id: i32) -> String {
        let token = auth::issue_token(employee_id, &self.auth).unwrap();
        format!("{}={}", SESSION_COOKIE, token)
    }

    pub fn admin_session(&self) -> String {
        self.session_for(self.admin_id)
    }

    pub fn user_session(&self) -> String {
        self.session_for(self.user_id)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, body: &str) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Follows a redirect the way a browser would, carrying the session and
    /// any flash cookie the response just set. Returns the rendered page.
    pub async fn follow(&self, response: Response<Body>, session: &str) -> (StatusCode, String) {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(&response);
        let mut cookies = Vec::new();
        if !session.is_empty() {
            cookies.push(session.to_string());
        }
        if let Some(flash) = set_cookie(&response, FLASH_COOKIE) {
            cookies.push(format!("{}={}", FLASH_COOKIE, flash));
        }
        let cookie = cookies.join("; ");
        let page = self
            .get(&target, Some(cookie.as_str()).filter(|c| !c.is_empty()))
            .await;
        let status = page.status();
        (status, body_text(page).await)
    }

    pub async fn department_count(&self) -> u64 {
        department::Entity::find()
            .count(self.db.as_ref())
            .await
            .unwrap()
    }

    pub async fn role_count(&self) -> u64 {
        role::Entity::find().count(self.db.as_ref()).await.unwrap()
    }

    pub async fn add_department(&self, name: &str, description: &str) -> department::Model {
        department::ActiveModel {
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .unwrap()
    }

    pub async fn add_role(&self, name: &str, description: &str) -> role::Model {
        role::ActiveModel {
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .unwrap()
    }

    pub async fn employee(&self, id: i32) -> employee::Model {
        employee::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .unwrap()
            .unwrap()
    }
}

async fn insert_employee(
    db: &DatabaseConnection,
    username: &str,
    password_hash: String,
    is_admin: bool,
) -> i32 {
    employee::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        is_admin: Set(is_admin),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without location")
        .to_str()
        .unwrap()
        .to_string()
}

/// Value of the named cookie in the response's `Set-Cookie` headers.
pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .map(|value| {
            value[prefix.len()..]
                .split(';')
                .next()
                .unwrap_or_default()
                .to_string()
        })
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
