#![allow(dead_code)]

use aula::{
    api::{build_router, AppState},
    cache::create_cache,
    config::{CacheConfig, CatalogConfig},
    db::{
        create_test_pool, migrations,
        repositories::{SqlxContentRepository, SqlxDirectoryRepository, SqlxSessionRepository},
    },
    models::{Category, ContentDomain, ContentItem, CreateContentInput, Level, PublishState},
    services::{CatalogService, IdentityService},
};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

pub struct TestApp {
    pub catalog: Arc<CatalogService>,
    pub identity: Arc<IdentityService>,
    pub router: axum::Router,
}

pub async fn create_test_app() -> TestApp {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let catalog = Arc::new(CatalogService::new(
        CatalogConfig::default(),
        SqlxContentRepository::boxed(pool.clone()),
        SqlxDirectoryRepository::boxed(pool.clone()),
        create_cache(&CacheConfig::default()),
    ));
    let identity = Arc::new(IdentityService::new(SqlxSessionRepository::boxed(pool.clone())));

    let state = AppState {
        pool,
        catalog: catalog.clone(),
        identity: identity.clone(),
    };
    let router = build_router(state, "*");

    TestApp {
        catalog,
        identity,
        router,
    }
}

impl TestApp {
    pub async fn category(&self, name: &str) -> Category {
        self.catalog
            .directory()
            .create_category(name)
            .await
            .expect("Failed to create category")
    }

    pub async fn level(&self, name: &str) -> Level {
        self.catalog
            .directory()
            .create_level(name)
            .await
            .expect("Failed to create level")
    }

    pub async fn publish(&self, input: CreateContentInput) -> ContentItem {
        let input = input.with_state(PublishState::Published);
        self.catalog
            .content(input.domain)
            .create(&input)
            .await
            .expect("Failed to create item")
    }

    pub async fn draft(&self, input: CreateContentInput) -> ContentItem {
        self.catalog
            .content(input.domain)
            .create(&input)
            .await
            .expect("Failed to create item")
    }

    /// Publish `count` news items dated on consecutive days of March 2024
    pub async fn seed_news(&self, count: u32, category_id: i64) {
        for day in 1..=count {
            let input = CreateContentInput::new(ContentDomain::News, format!("Nota {}", day), category_id)
                .with_date(Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap());
            self.publish(input).await;
        }
    }

    /// Register a member and return a live session token
    pub async fn session_for(&self, username: &str, level_id: Option<i64>) -> String {
        let member = self
            .identity
            .register_member(username, level_id, Some("student"))
            .await
            .expect("Failed to register member");
        self.identity
            .issue_session(member.id)
            .await
            .expect("Failed to issue session")
            .id
    }
}

pub mod server_utils {
    use super::*;
    use axum_test::TestServer;

    pub async fn create_test_server() -> (TestServer, TestApp) {
        let app = create_test_app().await;
        let server = TestServer::new(app.router.clone()).unwrap();
        (server, app)
    }
}
