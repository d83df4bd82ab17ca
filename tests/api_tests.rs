// tests/api_tests.rs

use std::sync::Arc;

use chrono::{Days, Local};
use schoolhub::{
    config::Config,
    models::account::{Account, Role},
    routes,
    services::achievements::seed_default_catalog,
    state::AppState,
    store::RecordStore,
    utils::hash::hash_password,
};
use serde_json::{Value, json};
use tempfile::TempDir;

const ADMIN: &str = "admin";
const ADMIN_PASSWORD: &str = "admin-password";

struct TestApp {
    address: String,
    client: reqwest::Client,
    // Keeps the data directory alive for the duration of the test.
    _data: TempDir,
}

/// Spawns the app on a random port over an empty data directory holding only
/// an admin account and the default achievement catalog.
async fn spawn_app() -> TestApp {
    let data = TempDir::new().expect("Failed to create temp dir");
    let store = RecordStore::open(data.path()).expect("Failed to open store");

    store
        .save(&[Account {
            id: "acc-admin".to_string(),
            username: ADMIN.to_string(),
            password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
            role: Role::Admin,
            person_id: None,
        }])
        .unwrap();
    seed_default_catalog(&store).unwrap();

    let config = Config {
        data_dir: data.path().to_path_buf(),
        log_dir: data.path().join("logs"),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        port: 0,
        admin_username: None,
        admin_password: None,
    };

    let state = AppState {
        store: Arc::new(store),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        _data: data,
    }
}

impl TestApp {
    async fn login(&self, username: &str, password: &str) -> String {
        let body: Value = self
            .client
            .post(format!("{}/api/auth/login", self.address))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["token"].as_str().expect("login returned no token").to_string()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// Registers a person with a login of the given role.
    async fn add_person(&self, admin_token: &str, username: &str, role: &str, courses: &[&str]) {
        let response = self
            .post(
                "/api/people",
                admin_token,
                json!({
                    "name": format!("{} full name", username),
                    "birth_date": "2005-04-10",
                    "courses": courses,
                    "study_hours": 12.0,
                    "username": username,
                    "password": "pass1234",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
    }

    /// Creates a two-question exam open from yesterday until tomorrow.
    async fn add_exam(&self, token: &str, title: &str, course: &str) -> String {
        let today = Local::now().date_naive();
        let response = self
            .post(
                "/api/exams",
                token,
                json!({
                    "title": title,
                    "course": course,
                    "start_date": today.checked_sub_days(Days::new(1)).unwrap(),
                    "end_date": today.checked_add_days(Days::new(1)).unwrap(),
                    "time_limit_minutes": 30,
                    "questions": [
                        {"text": "2 + 2?", "options": ["3", "4", "5", "6"], "correct": "4"},
                        {
                            "text": "Capital of France?",
                            "options": ["Paris", "Rome", "Madrid", "Lisbon"],
                            "correct": "Paris",
                        },
                    ],
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(format!("{}/random_path_that_does_not_exist", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_user() {
    let app = spawn_app().await;

    for (username, password) in [(ADMIN, "wrong"), ("nobody", ADMIN_PASSWORD)] {
        let response = app
            .client
            .post(format!("{}/api/auth/login", app.address))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);
    }
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = spawn_app().await;

    for path in ["/api/me", "/api/exams", "/api/reports/dashboard", "/api/forum/posts"] {
        let response = app
            .client
            .get(format!("{}{}", app.address, path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401, "{}", path);
    }

    let response = app.get("/api/me", "not-a-jwt").await;
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn student_takes_an_exam_once() {
    let app = spawn_app().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.add_person(&admin, "student1", "student", &["Math"]).await;
    let math = app.add_exam(&admin, "Algebra I", "Math").await;
    let physics = app.add_exam(&admin, "Mechanics", "Physics").await;

    let student = app.login("student1", "pass1234").await;

    // Only enrolled courses are listed
    let listed: Vec<Value> = app.get("/api/exams", &student).await.json().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], math.as_str());

    // Starting hides the answers
    let started = app.get(&format!("/api/exams/{}/start", math), &student).await;
    assert_eq!(started.status().as_u16(), 200);
    let started: Value = started.json().await.unwrap();
    assert_eq!(started["questions"].as_array().unwrap().len(), 2);
    assert!(started["questions"][0].get("correct").is_none());

    // One right, one wrong, using the form field names
    let submitted = app
        .post(
            &format!("/api/exams/{}/submit", math),
            &student,
            json!({"answers": {"questao_0": "4", "questao_1": "Rome"}}),
        )
        .await;
    assert_eq!(submitted.status().as_u16(), 201);
    let submitted: Value = submitted.json().await.unwrap();
    assert_eq!(submitted["result"]["score"], 1);
    assert_eq!(submitted["result"]["total"], 2);
    assert_eq!(submitted["result"]["username"], "student1");
    let earned: Vec<&str> = submitted["new_achievements"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["id"].as_str())
        .collect();
    assert_eq!(earned, vec!["first_exam"]);

    // A second attempt is refused and nothing new is stored
    let again = app
        .post(
            &format!("/api/exams/{}/submit", math),
            &student,
            json!({"answers": {"0": "4", "1": "Paris"}}),
        )
        .await;
    assert_eq!(again.status().as_u16(), 409);
    let reopened = app.get(&format!("/api/exams/{}/start", math), &student).await;
    assert_eq!(reopened.status().as_u16(), 409);

    let results: Vec<Value> = app.get("/api/me/results", &student).await.json().await.unwrap();
    assert_eq!(results.len(), 1);

    // Not enrolled in Physics
    let physics_start = app.get(&format!("/api/exams/{}/start", physics), &student).await;
    assert_eq!(physics_start.status().as_u16(), 403);

    let missing = app.get("/api/exams/does-not-exist/start", &student).await;
    assert_eq!(missing.status().as_u16(), 404);

    // The achievement was recorded on the profile
    let me: Value = app.get("/api/me", &student).await.json().await.unwrap();
    assert_eq!(me["exams_taken"], 1);
    assert_eq!(me["person"]["achievements"][0]["id"], "first_exam");
}

#[tokio::test]
async fn reports_are_staff_only() {
    let app = spawn_app().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.add_person(&admin, "student1", "student", &["Math"]).await;
    app.add_person(&admin, "teacher1", "teacher", &[]).await;
    let exam = app.add_exam(&admin, "Algebra I", "Math").await;

    let student = app.login("student1", "pass1234").await;
    let submitted = app
        .post(
            &format!("/api/exams/{}/submit", exam),
            &student,
            json!({"answers": {"0": "4", "1": "Paris"}}),
        )
        .await;
    assert_eq!(submitted.status().as_u16(), 201);

    let denied = app.get("/api/reports/dashboard", &student).await;
    assert_eq!(denied.status().as_u16(), 403);

    let teacher = app.login("teacher1", "pass1234").await;
    // Staff may take the same exam repeatedly; none of it is reported.
    for _ in 0..2 {
        let tried = app
            .post(&format!("/api/exams/{}/submit", exam), &teacher, json!({"answers": {}}))
            .await;
        assert_eq!(tried.status().as_u16(), 201);
    }

    let dashboard = app.get("/api/reports/dashboard", &teacher).await;
    assert_eq!(dashboard.status().as_u16(), 200);
    let dashboard: Value = dashboard.json().await.unwrap();
    assert_eq!(dashboard["exam_averages"][0]["exam_id"], exam.as_str());
    assert_eq!(dashboard["exam_averages"][0]["average"], 100.0);
    assert_eq!(dashboard["exam_averages"][0]["attempts"], 1);
    assert_eq!(dashboard["low_performers"].as_array().unwrap().len(), 1);
    assert_eq!(dashboard["ranking"]["Math"][0]["username"], "student1");

    let summary: Value = app.get("/api/reports/summary", &teacher).await.json().await.unwrap();
    assert_eq!(summary["total_students"], 1);
    assert_eq!(summary["average_study_hours"], 12.0);

    let critical: Vec<Value> = app
        .get(&format!("/api/reports/exams/{}/critical-questions", exam), &teacher)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(critical.len(), 2);
    assert!(critical.iter().all(|q| q["errors"] == 0));

    // Teachers manage content but not accounts or logs
    let accounts = app.get("/api/accounts", &teacher).await;
    assert_eq!(accounts.status().as_u16(), 403);
    let logs = app.get("/api/admin/logs", &teacher).await;
    assert_eq!(logs.status().as_u16(), 403);
    let logs = app.get("/api/admin/logs", &admin).await;
    assert_eq!(logs.status().as_u16(), 200);
}

#[tokio::test]
async fn students_cannot_manage_content() {
    let app = spawn_app().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.add_person(&admin, "student1", "student", &["Math"]).await;
    let student = app.login("student1", "pass1234").await;

    let lesson = json!({"title": "Fractions", "course": "Math", "content": "<p>Halves</p>"});
    let denied = app.post("/api/lessons", &student, lesson.clone()).await;
    assert_eq!(denied.status().as_u16(), 403);

    let created = app.post("/api/lessons", &admin, lesson).await;
    assert_eq!(created.status().as_u16(), 201);

    let lessons: Vec<Value> = app
        .get("/api/lessons?course=Math", &student)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0]["title"], "Fractions");

    let people = app.get("/api/people", &student).await;
    assert_eq!(people.status().as_u16(), 403);
}

#[tokio::test]
async fn forum_posts_and_replies() {
    let app = spawn_app().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.add_person(&admin, "student1", "student", &["Math"]).await;
    app.add_person(&admin, "student2", "student", &["Math"]).await;
    let alice = app.login("student1", "pass1234").await;
    let bob = app.login("student2", "pass1234").await;

    let created = app
        .post(
            "/api/forum/posts",
            &alice,
            json!({"title": "Help with fractions", "course": "Math", "content": "<b>How?</b><script>x()</script>"}),
        )
        .await;
    assert_eq!(created.status().as_u16(), 201);
    let post_id = created.json::<Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let reply = app
        .post(
            &format!("/api/forum/posts/{}/replies", post_id),
            &bob,
            json!({"content": "Common denominators."}),
        )
        .await;
    assert_eq!(reply.status().as_u16(), 201);

    let post: Value = app
        .get(&format!("/api/forum/posts/{}", post_id), &bob)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(post["views"], 1);
    assert_eq!(post["content"], "<b>How?</b>");
    assert_eq!(post["replies"][0]["author"], "student2");

    let listed: Vec<Value> = app
        .get("/api/forum/posts?q=FRACTIONS", &bob)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    // Only the author (or a moderator) may delete
    let path = format!("{}/api/forum/posts/{}", app.address, post_id);
    let denied = app.client.delete(&path).bearer_auth(&bob).send().await.unwrap();
    assert_eq!(denied.status().as_u16(), 403);
    let deleted = app.client.delete(&path).bearer_auth(&alice).send().await.unwrap();
    assert_eq!(deleted.status().as_u16(), 204);
}

#[tokio::test]
async fn username_with_results_cannot_be_reused() {
    let app = spawn_app().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.add_person(&admin, "student1", "student", &["Math"]).await;
    let exam = app.add_exam(&admin, "Algebra I", "Math").await;

    let student = app.login("student1", "pass1234").await;
    let submitted = app
        .post(
            &format!("/api/exams/{}/submit", exam),
            &student,
            json!({"answers": {"0": "4"}}),
        )
        .await;
    assert_eq!(submitted.status().as_u16(), 201);

    let people: Vec<Value> = app.get("/api/people", &admin).await.json().await.unwrap();
    let person_id = people[0]["id"].as_str().unwrap().to_string();
    let deleted = app
        .client
        .delete(format!("{}/api/people/{}", app.address, person_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    // The old result still belongs to "student1"
    let again = app
        .post(
            "/api/people",
            &admin,
            json!({"name": "Someone Else", "username": "student1", "password": "pass1234"}),
        )
        .await;
    assert_eq!(again.status().as_u16(), 409);

    let bare = app
        .post(
            "/api/accounts",
            &admin,
            json!({"username": "student1", "password": "pass1234", "role": "student"}),
        )
        .await;
    assert_eq!(bare.status().as_u16(), 409);

    let averages: Value = app.get("/api/reports/dashboard", &admin).await.json().await.unwrap();
    assert!(averages["exam_averages"].as_array().unwrap().is_empty());
}
