// tests/timing_leaderboard_tests.rs

use std::sync::Arc;

use assessment_backend::{
    config::Config,
    models::assessment::{Assessment, AssessmentKind, ShowResultAfter},
    models::question::{CorrectAnswer, Question},
    routes,
    state::AppState,
    store::clock::ManualClock,
    store::memory::{InMemoryQuestionBank, InMemoryStore},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap()
}

struct TestApp {
    address: String,
    clock: Arc<ManualClock>,
    client: reqwest::Client,
}

async fn spawn_app(assessments: Vec<Assessment>) -> TestApp {
    let store = Arc::new(InMemoryStore::default());
    let bank = Arc::new(InMemoryQuestionBank::default());
    for assessment in assessments {
        bank.insert(assessment);
    }
    let clock = Arc::new(ManualClock::new(base_time()));

    let config = Config {
        bind_addr: "127.0.0.1:0".to_string(),
        rust_log: "error".to_string(),
        fixtures_path: None,
    };
    let state = AppState::new(store, bank, clock.clone(), config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        clock,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    async fn start_attempt(&self, assessment_id: Uuid, user: Uuid) -> Uuid {
        let body: serde_json::Value = self
            .client
            .post(format!(
                "{}/api/assessments/{}/attempts",
                self.address, assessment_id
            ))
            .header("X-User-Id", user.to_string())
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse start response");
        Uuid::parse_str(body["attempt_id"].as_str().unwrap()).unwrap()
    }

    async fn save_nat(
        &self,
        attempt_id: Uuid,
        question_id: Uuid,
        user: Uuid,
        value: f64,
    ) -> reqwest::Response {
        self.client
            .put(format!(
                "{}/api/attempts/{}/answers/{}",
                self.address, attempt_id, question_id
            ))
            .header("X-User-Id", user.to_string())
            .json(&serde_json::json!({ "value": { "type": "nat", "value": value } }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn submit(&self, attempt_id: Uuid, user: Uuid) -> reqwest::Response {
        self.client
            .post(format!("{}/api/attempts/{}/submit", self.address, attempt_id))
            .header("X-User-Id", user.to_string())
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn result(&self, attempt_id: Uuid, user: Uuid) -> reqwest::Response {
        self.client
            .get(format!("{}/api/attempts/{}/result", self.address, attempt_id))
            .header("X-User-Id", user.to_string())
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn paper(&self, attempt_id: Uuid, user: Uuid) -> serde_json::Value {
        self.client
            .get(format!("{}/api/attempts/{}", self.address, attempt_id))
            .header("X-User-Id", user.to_string())
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse paper")
    }

    /// No identity header: the leaderboard is a reporting view.
    async fn leaderboard(&self, assessment_id: Uuid, limit: Option<usize>) -> reqwest::Response {
        let mut url = format!(
            "{}/api/assessments/{}/leaderboard",
            self.address, assessment_id
        );
        if let Some(limit) = limit {
            url.push_str(&format!("?limit={limit}"));
        }
        self.client
            .get(url)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

fn nat_question(marks: f64, value: f64) -> Question {
    Question {
        id: Uuid::new_v4(),
        text: "how much".to_string(),
        marks,
        options: vec![],
        correct: CorrectAnswer::Nat {
            value,
            tolerance: 0.0,
        },
        explanation: None,
    }
}

fn assessment(questions: Vec<Question>) -> Assessment {
    Assessment {
        id: Uuid::new_v4(),
        title: "Timed test".to_string(),
        kind: AssessmentKind::Test,
        duration_minutes: Some(10),
        start_time: None,
        end_time: None,
        passing_marks: None,
        max_attempts: 3,
        negative_marking_percent: 50.0,
        shuffle_questions: false,
        shuffle_options: false,
        show_result_after: ShowResultAfter::Submit,
        published: true,
        questions,
    }
}

#[tokio::test]
async fn deadline_forces_submission_with_skipped_scoring_zero() {
    let questions: Vec<Question> = (0..5).map(|i| nat_question(2.0, f64::from(i))).collect();
    let ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
    let a = assessment(questions);
    let assessment_id = a.id;
    let app = spawn_app(vec![a]).await;
    let user = Uuid::new_v4();

    let attempt_id = app.start_attempt(assessment_id, user).await;
    for i in 0..3 {
        let saved = app
            .save_nat(attempt_id, ids[i], user, f64::from(i as u32))
            .await;
        assert_eq!(saved.status().as_u16(), 200);
    }

    // Cross the 10-minute deadline; the next touch settles the attempt.
    app.clock.advance(Duration::minutes(11));
    let late = app.save_nat(attempt_id, ids[3], user, 3.0).await;
    assert_eq!(late.status().as_u16(), 410);
    let body: serde_json::Value = late.json().await.unwrap();
    assert_eq!(body["code"], "attempt_expired");

    let paper = app.paper(attempt_id, user).await;
    assert_eq!(paper["status"], "submitted");

    let result: serde_json::Value = app.result(attempt_id, user).await.json().await.unwrap();
    // Three answered correctly; the two unanswered score zero, not negative,
    // despite negative marking being configured.
    assert_eq!(result["correct_count"], 3);
    assert_eq!(result["wrong_count"], 0);
    assert_eq!(result["skipped_count"], 2);
    assert_eq!(result["total_score"].as_f64().unwrap(), 6.0);
    assert_eq!(result["max_score"].as_f64().unwrap(), 10.0);
    assert_eq!(result["percentage"].as_f64().unwrap(), 60.0);
}

#[tokio::test]
async fn manual_release_withholds_the_result_endpoint() {
    let q = nat_question(2.0, 7.0);
    let q_id = q.id;
    let mut a = assessment(vec![q]);
    a.show_result_after = ShowResultAfter::Manual;
    let assessment_id = a.id;
    let app = spawn_app(vec![a]).await;
    let user = Uuid::new_v4();

    let attempt_id = app.start_attempt(assessment_id, user).await;
    app.save_nat(attempt_id, q_id, user, 7.0).await;

    // The submit call itself reports the score...
    let submitted = app.submit(attempt_id, user).await;
    assert_eq!(submitted.status().as_u16(), 200);
    let result: serde_json::Value = submitted.json().await.unwrap();
    assert_eq!(result["total_score"].as_f64().unwrap(), 2.0);

    // ...but the result endpoint stays closed until release.
    let withheld = app.result(attempt_id, user).await;
    assert_eq!(withheld.status().as_u16(), 409);
    let body: serde_json::Value = withheld.json().await.unwrap();
    assert_eq!(body["code"], "result_not_released");
}

#[tokio::test]
async fn leaderboard_ranks_best_attempts_and_breaks_ties_by_time() {
    let q1 = nat_question(4.0, 1.0);
    let q2 = nat_question(6.0, 2.0);
    let (q1_id, q2_id) = (q1.id, q2.id);
    let a = assessment(vec![q1, q2]);
    let assessment_id = a.id;
    let app = spawn_app(vec![a]).await;

    let (alice, bob, carol, dave) = (
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
    );

    // Alice: 40% first, then a 100% retake. Only the retake should count.
    let attempt = app.start_attempt(assessment_id, alice).await;
    app.save_nat(attempt, q1_id, alice, 1.0).await;
    app.submit(attempt, alice).await;

    app.clock.advance(Duration::minutes(1));
    let attempt = app.start_attempt(assessment_id, alice).await;
    app.save_nat(attempt, q1_id, alice, 1.0).await;
    app.save_nat(attempt, q2_id, alice, 2.0).await;
    app.submit(attempt, alice).await;

    // Bob then Carol both land 60%; Bob submits earlier.
    app.clock.advance(Duration::minutes(1));
    let attempt = app.start_attempt(assessment_id, bob).await;
    app.save_nat(attempt, q2_id, bob, 2.0).await;
    app.submit(attempt, bob).await;

    app.clock.advance(Duration::minutes(1));
    let attempt = app.start_attempt(assessment_id, carol).await;
    app.save_nat(attempt, q2_id, carol, 2.0).await;
    app.submit(attempt, carol).await;

    // Dave never submits and must not appear.
    app.start_attempt(assessment_id, dave).await;

    let response = app.leaderboard(assessment_id, None).await;
    assert_eq!(response.status().as_u16(), 200);
    let entries: serde_json::Value = response.json().await.unwrap();
    let entries = entries.as_array().unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["user_id"].as_str().unwrap(), alice.to_string());
    assert_eq!(entries[0]["percentage"].as_f64().unwrap(), 100.0);
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[1]["user_id"].as_str().unwrap(), bob.to_string());
    assert_eq!(entries[1]["rank"], 2);
    assert_eq!(entries[2]["user_id"].as_str().unwrap(), carol.to_string());
    assert_eq!(entries[2]["rank"], 3);

    let top = app.leaderboard(assessment_id, Some(1)).await;
    let top: serde_json::Value = top.json().await.unwrap();
    assert_eq!(top.as_array().unwrap().len(), 1);
    assert_eq!(top[0]["user_id"].as_str().unwrap(), alice.to_string());
}
