mod common;

use axum::http::StatusCode;
use common::*;
use entities::Role;
use serde_json::{Value, json};
use task_store::{TaskFilter, TaskStore};
use taskboard_server::config::Config;

async fn create_task(app: &axum::Router, token: &str, body: Value) -> (StatusCode, Value) {
    let response = send(app, json_request("POST", "/api/tasks", Some(token), body)).await;
    let status = response.status();
    (status, read_json(response).await)
}

async fn task_for(app: &axum::Router, token: &str, assignee: &str, title: &str) -> String {
    let (status, body) = create_task(
        app,
        token,
        json!({"title": title, "assignedTo": assignee, "dueDate": "2025-01-01T00:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().expect("task id").to_string()
}

fn titles(body: &Value) -> Vec<String> {
    let mut titles: Vec<String> = body
        .as_array()
        .expect("task array")
        .iter()
        .map(|task| task["title"].as_str().unwrap_or_default().to_string())
        .collect();
    titles.sort();
    titles
}

#[tokio::test]
async fn register_rejects_mismatched_passwords_without_writing() {
    let (app, state) = test_app();

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": PASSWORD,
                "passwordConfirm": "Different-Passw0rd"
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["fields"]["nonFieldErrors"][0], "Passwords don't match.");
    assert!(state.store.get_identity_by_username("carol").await.unwrap().is_none());
}

#[tokio::test]
async fn register_reports_field_errors() {
    let (app, state) = test_app();
    seed_account(&state, "taken", Role::User, None).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"username": "taken", "password": "12345678", "passwordConfirm": "12345678"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    let fields = &body["error"]["fields"];
    assert!(fields["password"].as_array().is_some_and(|m| !m.is_empty()));
    assert!(fields.get("nonFieldErrors").is_none());

    // The duplicate username surfaces once the password is acceptable.
    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"username": "taken", "password": PASSWORD, "passwordConfirm": PASSWORD}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(
        body["error"]["fields"]["username"][0],
        "A user with that username already exists."
    );
}

#[tokio::test]
async fn register_ignores_requested_role_unless_allowed() {
    let (app, _state) = test_app();
    let request = json!({
        "username": "mallory",
        "password": PASSWORD,
        "passwordConfirm": PASSWORD,
        "role": "superadmin"
    });

    let response = send(&app, json_request("POST", "/api/auth/register", None, request.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["user"]["role"], "user");

    let mut config = Config::for_testing("integration-test-secret");
    config.allow_registration_role = true;
    let (app, _state) = test_app_with(config);
    let response = send(&app, json_request("POST", "/api/auth/register", None, request)).await;
    let body = read_json(response).await;
    assert_eq!(body["user"]["role"], "superadmin");
}

#[tokio::test]
async fn login_profile_and_logout() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;

    let response = send(
        &app,
        json_request("POST", "/api/auth/login", None, json!({"username": "alice", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["message"], "Invalid credentials");

    let response = send(
        &app,
        json_request("POST", "/api/auth/login", None, json!({"username": "alice", "password": PASSWORD})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["user"]["id"], fixture.alice.id.to_string());
    assert_eq!(body["user"]["assignedAdminUsername"], "boss");
    let token = body["accessToken"].as_str().expect("token").to_string();

    let response = send(&app, get_request("/api/auth/profile", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "user");

    let response = send(&app, json_request("POST", "/api/auth/logout", Some(&token), json!({}))).await;
    assert_eq!(response.status(), StatusCode::RESET_CONTENT);

    let response = send(&app, get_request("/api/auth/profile", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let (app, _state) = test_app();

    let response = send(&app, get_request("/api/tasks", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, get_request("/api/dashboard", Some("not-a-jwt"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_cannot_create_tasks() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;

    let (status, body) = create_task(
        &app,
        &fixture.alice.token,
        json!({"title": "Sneaky", "assignedTo": "alice", "dueDate": "2025-01-01T00:00"}),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Users cannot create tasks");
    let (_, total) = state.store.list_tasks(TaskFilter::default()).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn admin_creates_pending_task() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;

    let (status, body) = create_task(
        &app,
        &fixture.boss.token,
        json!({
            "title": "Write report",
            "assignedTo": "alice",
            "dueDate": "2025-01-01T00:00",
            "status": "pending",
            "createdBy": fixture.root.id
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["title"], "Write report");
    assert_eq!(body["assignedTo"], fixture.alice.id.to_string());
    assert_eq!(body["assignedToUsername"], "alice");
    assert_eq!(body["createdBy"], fixture.boss.id.to_string());
    assert_eq!(body["createdByUsername"], "boss");
    assert_eq!(body["status"], "pending");
    assert!(body["completionReport"].is_null());
    assert!(body["workedHours"].is_null());
}

#[tokio::test]
async fn create_task_reports_every_bad_field() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;

    let (status, body) = create_task(
        &app,
        &fixture.boss.token,
        json!({"assignedTo": "nobody", "dueDate": "someday", "status": "done"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = &body["error"]["fields"];
    for field in ["title", "assignedTo", "dueDate", "status"] {
        assert!(fields.get(field).is_some(), "missing error for {field}: {body}");
    }
}

#[tokio::test]
async fn completing_requires_report_and_hours() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;
    let task_id = task_for(&app, &fixture.boss.token, "alice", "Write report").await;
    let uri = format!("/api/tasks/{task_id}");

    let response = send(
        &app,
        json_request("PUT", &uri, Some(&fixture.alice.token), json!({"status": "completed"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(
        body["error"]["fields"]["completionReport"][0],
        "Completion report is required when task is marked as completed."
    );
    assert_eq!(
        body["error"]["fields"]["workedHours"][0],
        "Worked hours are required when task is marked as completed."
    );

    let response = send(
        &app,
        json_request(
            "PUT",
            &uri,
            Some(&fixture.alice.token),
            json!({"status": "completed", "completionReport": "done", "workedHours": 3.5}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["completionReport"], "done");
    assert_eq!(body["workedHours"], 3.5);

    // Leaving the completed state drops the report and hours.
    let response = send(
        &app,
        json_request("PUT", &uri, Some(&fixture.boss.token), json!({"status": "in_progress"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["completionReport"].is_null());
    assert!(body["workedHours"].is_null());
}

#[tokio::test]
async fn open_tasks_drop_supplied_report_and_hours() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;

    let (status, body) = create_task(
        &app,
        &fixture.boss.token,
        json!({
            "title": "Early notes",
            "assignedTo": "alice",
            "dueDate": "2025-01-01T00:00",
            "status": "pending",
            "completionReport": "half done",
            "workedHours": 2.5,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["completionReport"].is_null());
    assert!(body["workedHours"].is_null());

    let uri = format!("/api/tasks/{}", body["id"].as_str().unwrap());
    for hours in [json!(-1), json!(5000), json!("lots")] {
        let response = send(
            &app,
            json_request(
                "PUT",
                &uri,
                Some(&fixture.alice.token),
                json!({"status": "in_progress", "completionReport": "notes", "workedHours": hours}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "in_progress");
        assert!(body["completionReport"].is_null());
        assert!(body["workedHours"].is_null());
    }

    // The same hours are rejected once the task is completed.
    let response = send(
        &app,
        json_request(
            "PUT",
            &uri,
            Some(&fixture.alice.token),
            json!({"status": "completed", "completionReport": "notes", "workedHours": -1}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "validation_failed");
    assert!(body["error"]["fields"].get("workedHours").is_some());
}

#[tokio::test]
async fn user_may_only_progress_own_tasks() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;
    let alice_task = task_for(&app, &fixture.boss.token, "alice", "Alice task").await;
    let bob_task = task_for(&app, &fixture.root.token, "bob", "Bob task").await;

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/tasks/{bob_task}"),
            Some(&fixture.alice.token),
            json!({"status": "in_progress"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/tasks/{alice_task}"),
            Some(&fixture.alice.token),
            json!({"title": "Renamed"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admins only reach tasks of the users they oversee.
    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/tasks/{bob_task}"),
            Some(&fixture.boss.token),
            json!({"title": "Renamed"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/tasks/{alice_task}"),
            Some(&fixture.boss.token),
            json!({"title": "Renamed"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["title"], "Renamed");
}

#[tokio::test]
async fn unknown_tasks_are_not_found() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;

    for uri in [
        format!("/api/tasks/{}", uuid::Uuid::new_v4()),
        "/api/tasks/42".to_string(),
    ] {
        let response = send(
            &app,
            json_request("PUT", &uri, Some(&fixture.root.token), json!({"status": "pending"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn report_visibility() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;
    let bob_task = task_for(&app, &fixture.root.token, "bob", "Bob task").await;
    let alice_task = task_for(&app, &fixture.boss.token, "alice", "Alice task").await;
    let report = |id: &str| format!("/api/tasks/{id}/report");

    // Foreign task: forbidden whatever its status.
    let response = send(&app, get_request(&report(&bob_task), Some(&fixture.alice.token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Own task, not completed yet.
    let response = send(&app, get_request(&report(&alice_task), Some(&fixture.boss.token))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await["error"]["message"],
        "Report is only available for completed tasks"
    );

    send(
        &app,
        json_request(
            "PUT",
            &format!("/api/tasks/{bob_task}"),
            Some(&fixture.bob.token),
            json!({"status": "completed", "completionReport": "shipped", "workedHours": "2.25"}),
        ),
    )
    .await;
    let response = send(&app, get_request(&report(&bob_task), Some(&fixture.alice.token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, get_request(&report(&bob_task), Some(&fixture.bob.token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["completionReport"], "shipped");
    assert_eq!(body["workedHours"], 2.25);
}

#[tokio::test]
async fn listing_follows_role_visibility() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;
    task_for(&app, &fixture.boss.token, "alice", "managed").await;
    task_for(&app, &fixture.root.token, "boss", "own").await;
    task_for(&app, &fixture.boss.token, "bob", "created").await;
    task_for(&app, &fixture.root.token, "bob", "foreign").await;

    let list = |token: &str| get_request("/api/tasks", Some(token));
    let body = read_json(send(&app, list(&fixture.alice.token)).await).await;
    assert_eq!(titles(&body), ["managed"]);

    let body = read_json(send(&app, list(&fixture.bob.token)).await).await;
    assert_eq!(titles(&body), ["created", "foreign"]);

    let body = read_json(send(&app, list(&fixture.boss.token)).await).await;
    assert_eq!(titles(&body), ["created", "managed", "own"]);

    let body = read_json(send(&app, list(&fixture.root.token)).await).await;
    assert_eq!(titles(&body), ["created", "foreign", "managed", "own"]);

    let response = send(&app, get_request("/api/tasks?status=bogus", Some(&fixture.root.token))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_depends_on_role() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;
    let alice_task = task_for(&app, &fixture.boss.token, "alice", "Alice task").await;
    task_for(&app, &fixture.root.token, "bob", "Bob task").await;
    send(
        &app,
        json_request(
            "PUT",
            &format!("/api/tasks/{alice_task}"),
            Some(&fixture.alice.token),
            json!({"status": "completed", "completionReport": "done", "workedHours": 1}),
        ),
    )
    .await;

    let body = read_json(send(&app, get_request("/api/dashboard", Some(&fixture.root.token))).await).await;
    assert_eq!(body["scope"], "global");
    assert_eq!(body["totalUsers"], 2);
    assert_eq!(body["totalAdmins"], 1);
    assert_eq!(body["totalTasks"], 2);
    assert_eq!(body["completedTasks"], 1);

    let body = read_json(send(&app, get_request("/api/dashboard", Some(&fixture.boss.token))).await).await;
    assert_eq!(body["scope"], "managed");
    assert_eq!(body["managedUsers"], 1);
    assert_eq!(body["totalTasks"], 1);
    assert_eq!(body["completedTasks"], 1);
    assert_eq!(body["users"][0]["username"], "alice");

    let body = read_json(send(&app, get_request("/api/dashboard", Some(&fixture.bob.token))).await).await;
    assert_eq!(body["scope"], "personal");
    assert_eq!(body["totalTasks"], 1);
    assert_eq!(body["completedTasks"], 0);
    assert_eq!(body["recentTasks"][0]["title"], "Bob task");
}

#[tokio::test]
async fn deactivated_identity_loses_access() {
    let (app, state) = test_app();
    let fixture = seed_fixture(&state).await;

    let mut account = state
        .store
        .list_accounts(Default::default())
        .await
        .unwrap()
        .0
        .into_iter()
        .find(|account| account.identity.id == fixture.bob.id)
        .expect("bob");
    account.identity.is_active = false;
    state.store.update_account(account).await.unwrap();

    let response = send(&app, get_request("/api/tasks", Some(&fixture.bob.token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        json_request("POST", "/api/auth/login", None, json!({"username": "bob", "password": PASSWORD})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"]["message"], "User account is disabled");
}

#[tokio::test]
async fn bootstrap_creates_superadmin_once() {
    let mut config = Config::for_testing("integration-test-secret");
    config.bootstrap_admin = Some(taskboard_server::config::BootstrapAdmin {
        username: "root".to_string(),
        email: "root@example.com".to_string(),
        password: PASSWORD.to_string(),
    });
    let (app, state) = test_app_with(config);

    taskboard_server::bootstrap(&state).await.unwrap();
    taskboard_server::bootstrap(&state).await.unwrap();
    let (accounts, total) = state
        .store
        .list_accounts(task_store::AccountFilter::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(accounts[0].profile.role, Role::Superadmin);
    let hash = accounts[0].identity.password_hash.as_deref().unwrap();
    assert!(hash.starts_with("$argon2id$"));

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": "root", "password": PASSWORD}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["user"]["role"], "superadmin");
}
