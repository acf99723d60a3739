//! End-to-end flow against a running server.
//!
//! Start the server with a scratch database, then run with the same
//! `DATABASE_URL` the server uses:
//! `RENU_BASE_URL=http://127.0.0.1:3000 cargo test -- --ignored`

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

struct TestContext {
    client: reqwest::Client,
    base_url: String,
}

impl TestContext {
    fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: std::env::var("RENU_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string()),
        }
    }

    fn unique_email() -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("user_{}@example.com", nanos)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register_and_login(&self, email: &str, password: &str) -> String {
        let reg = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(reg.status().as_u16(), 201, "Registration failed");

        let login = self
            .client
            .post(self.url("/api/auth/token"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(login.status().as_u16(), 200, "Login failed");

        let body: Value = login.json().await.unwrap();
        assert_eq!(body["token_type"], "bearer");
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn list_items(&self, token: &str) -> Vec<Value> {
        let items: Value = self
            .client
            .get(self.url("/api/items"))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        items.as_array().unwrap().clone()
    }

    /// Moves an item's cycle start into the past, straight in the database.
    async fn backdate_start(item_id: &str, days: i64) {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let (client, connection) = tokio_postgres::connect(&url, tokio_postgres::NoTls)
            .await
            .unwrap();
        tokio::spawn(connection);

        let id: Uuid = item_id.parse().unwrap();
        let start = Utc::now() - Duration::days(days);
        let updated = client
            .execute("UPDATE items SET start_date = $1 WHERE id = $2", &[&start, &id])
            .await
            .unwrap();
        assert_eq!(updated, 1);
    }
}

fn find<'a>(items: &'a [Value], id: &str) -> &'a Value {
    items
        .iter()
        .find(|item| item["id"] == id)
        .unwrap_or_else(|| panic!("item {} missing from listing", id))
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn test_item_lifecycle() {
    let ctx = TestContext::new();
    let email = TestContext::unique_email();
    let token = ctx.register_and_login(&email, "SecurePass123!").await;

    // Duplicate registration
    let dup = ctx
        .client
        .post(ctx.url("/api/auth/register"))
        .json(&json!({ "email": email, "password": "SecurePass123!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(dup.status().as_u16(), 409);

    // Category
    let cat: Value = ctx
        .client
        .post(ctx.url("/api/categories"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Cozinha" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let category_id = cat["id"].as_str().unwrap().to_string();

    // Rolling deadline inside the category
    let created = ctx
        .client
        .post(ctx.url("/api/items"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Filtro",
            "control_type": "PRAZO",
            "period_days": 2,
            "category_id": category_id
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let prazo_id = created.json::<Value>().await.unwrap()["item_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Fixed date far away, no category, given as a bare date
    let far = (Utc::now() + Duration::days(60)).format("%Y-%m-%d").to_string();
    let created = ctx
        .client
        .post(ctx.url("/api/items"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Extintor",
            "control_type": "VALIDADE",
            "fixed_expiry": far
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let validade_id = created.json::<Value>().await.unwrap()["item_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Missing period_days
    let invalid = ctx
        .client
        .post(ctx.url("/api/items"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Sem prazo", "control_type": "PRAZO" }))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status().as_u16(), 400);

    // Full listing: soonest first
    let items: Value = ctx
        .client
        .get(ctx.url("/api/items"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(items[0]["name"], "Filtro");
    assert_eq!(items[0]["category"], "Cozinha");
    assert_eq!(items[1]["category"], "Sem Categoria");
    assert_eq!(items[1]["status"], "OK");

    // Urgent listing: only the rolling deadline
    let urgent: Value = ctx
        .client
        .get(ctx.url("/api/items/urgent"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(urgent.as_array().unwrap().len(), 1);
    assert_eq!(urgent[0]["status"], "URGENTE");

    // Let the rolling deadline lapse
    TestContext::backdate_start(&prazo_id, 10).await;
    let items = ctx.list_items(&token).await;
    let lapsed = find(&items, &prazo_id);
    assert_eq!(lapsed["status"], "VENCIDO/TROCAR");
    assert_eq!(lapsed["days_remaining"], 0);
    assert_eq!(items[0]["id"], prazo_id.as_str());
    let validade_expires_on = find(&items, &validade_id)["expires_on"].clone();
    assert_eq!(
        validade_expires_on,
        (Utc::now() + Duration::days(60)).format("%d/%m/%Y").to_string()
    );

    // Renew works for PRAZO only
    let expected_before = (Utc::now() + Duration::days(2)).format("%d/%m/%Y").to_string();
    let renew = ctx
        .client
        .patch(ctx.url(&format!("/api/items/{}/renew", prazo_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(renew.status().as_u16(), 200);

    let renew = ctx
        .client
        .patch(ctx.url(&format!("/api/items/{}/renew", validade_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(renew.status().as_u16(), 400);

    // The new cycle is stored: expiry is now + period, the fixed date is untouched
    let items = ctx.list_items(&token).await;
    let expected_after = (Utc::now() + Duration::days(2)).format("%d/%m/%Y").to_string();
    let renewed = find(&items, &prazo_id);
    assert_eq!(renewed["status"], "OK");
    // Two days minus the time spent since the renew, floored
    assert_eq!(renewed["days_remaining"], 1);
    let renewed_on = renewed["expires_on"].as_str().unwrap();
    assert!(
        renewed_on == expected_before || renewed_on == expected_after,
        "unexpected expiry {}",
        renewed_on
    );
    assert_eq!(find(&items, &validade_id)["expires_on"], validade_expires_on);

    // Category in use cannot be deleted
    let del_cat = ctx
        .client
        .delete(ctx.url(&format!("/api/categories/{}", category_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(del_cat.status().as_u16(), 409);

    // Another user cannot see or touch these items
    let other = ctx
        .register_and_login(&TestContext::unique_email(), "OtherPass123!")
        .await;
    let foreign = ctx
        .client
        .delete(ctx.url(&format!("/api/items/{}", prazo_id)))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(foreign.status().as_u16(), 404);

    // Profile counts, then account deletion
    let me: Value = ctx
        .client
        .get(ctx.url("/api/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["total_items"], 2);
    assert_eq!(me["total_categories"], 1);

    let gone = ctx
        .client
        .delete(ctx.url("/api/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 200);

    let after = ctx
        .client
        .get(ctx.url("/api/items"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(after.status().as_u16(), 401);
}
