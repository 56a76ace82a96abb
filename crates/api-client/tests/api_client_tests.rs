use api_client::ApiClient;
use domain::{Todo, TodoId, TodoPatch, User, UserId};
use serde_json::json;
use shared::ApiError;
use test_support::{
    seed_alice, seed_logged_in_alice, unreachable_config, FakeBackend, ALICE_EMAIL, ALICE_NAME,
    ALICE_PASSWORD,
};

/// ログイン済みクライアントを用意する
async fn logged_in_client() -> (FakeBackend, ApiClient, User) {
    let backend = FakeBackend::spawn().await;
    let (user, session) = seed_logged_in_alice(&backend);
    let client = ApiClient::new(&backend.config()).unwrap().with_session(&session);
    (backend, client, user)
}

#[tokio::test]
async fn test_create_todo_returns_server_object() {
    let (backend, client, _) = logged_in_client().await;

    let todo = client.create_todo("Buy milk").await.unwrap();

    assert_eq!(
        todo,
        Todo {
            id: TodoId::from(1),
            title: "Buy milk".to_string(),
            done: false,
        }
    );
    let request = backend.state.last_request().unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.body, Some(json!({"title": "Buy milk"})));
}

#[tokio::test]
async fn test_fetch_todos_sends_session_cookie() {
    let (backend, client, _) = logged_in_client().await;
    backend.state.add_todo("A", false);
    backend.state.add_todo("B", true);

    let todos = client.fetch_todos().await.unwrap();

    let titles: Vec<&str> = todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
    assert!(todos[1].done);
    assert!(backend
        .state
        .requests()
        .iter()
        .all(|request| request.session.is_some()));
}

#[tokio::test]
async fn test_fetch_todos_without_session_fails_with_status() {
    let backend = FakeBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    let err = client.fetch_todos().await.unwrap_err();

    assert_eq!(
        err,
        ApiError::RequestFailed {
            status: 401,
            message: Some("unauthorized".to_string()),
        }
    );
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_non_success_statuses_carry_status() {
    let (backend, client, _) = logged_in_client().await;

    for status in [400u16, 403, 404, 409, 500, 502, 503] {
        backend.state.fail_next(status, "");
        let err = client.fetch_todos().await.unwrap_err();
        assert_eq!(err.status(), Some(status), "status {}", status);
        assert!(matches!(err, ApiError::RequestFailed { message: None, .. }));

        backend.state.fail_next(status, "boom");
        let err = client.create_todo("x").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::RequestFailed {
                status,
                message: Some("boom".to_string()),
            }
        );
    }
}

#[tokio::test]
async fn test_update_todo_with_typed_patch() {
    let (backend, client, _) = logged_in_client().await;
    let todo = backend.state.add_todo("Draft", false);

    let updated = client
        .update_todo(&todo.id, &TodoPatch::title("Final"))
        .await
        .unwrap();

    assert_eq!(updated.title, "Final");
    assert!(!updated.done);
    let request = backend.state.last_request().unwrap();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path, "/todos/1");
    assert_eq!(request.body, Some(json!({"title": "Final"})));
}

#[tokio::test]
async fn test_update_todo_accepts_generic_patch_object() {
    let (backend, client, _) = logged_in_client().await;
    let todo = backend.state.add_todo("Walk dog", false);

    let updated = client
        .update_todo(&todo.id, &json!({"done": true}))
        .await
        .unwrap();
    assert!(updated.done);

    let reopened = client.set_done(&todo.id, false).await.unwrap();
    assert!(!reopened.done);
    assert_eq!(
        backend.state.last_request().unwrap().body,
        Some(json!({"done": false}))
    );
}

#[tokio::test]
async fn test_update_missing_todo_uses_body_text_as_message() {
    let (_backend, client, _) = logged_in_client().await;

    let err = client
        .update_todo(&TodoId::from(99), &TodoPatch::done(true))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::RequestFailed {
            status: 404,
            message: Some("not found".to_string()),
        }
    );
}

#[tokio::test]
async fn test_delete_todo_treats_no_content_as_success() {
    let (backend, client, _) = logged_in_client().await;
    let todo = backend.state.add_todo("Trash", false);

    client.delete_todo(&todo.id).await.unwrap();

    assert!(backend.state.todos().is_empty());
    assert_eq!(backend.state.last_request().unwrap().method, "DELETE");
}

#[tokio::test]
async fn test_delete_todo_accepts_other_success_and_rejects_failures() {
    let (backend, client, _) = logged_in_client().await;
    let todo = backend.state.add_todo("Trash", false);

    backend.state.fail_next(200, "{}");
    client.delete_todo(&todo.id).await.unwrap();

    backend.state.fail_next(500, "redis error");
    let err = client.delete_todo(&todo.id).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_text_ids_stay_inside_todo_path() {
    let (backend, client, _) = logged_in_client().await;
    backend.state.add_todo("Keep me", false);

    let id: TodoId = "../me".parse().unwrap();
    client.delete_todo(&id).await.unwrap();

    let request = backend.state.last_request().unwrap();
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.path, "/todos/../me");
    assert_eq!(backend.state.todos().len(), 1);
    assert_eq!(backend.state.session_count(), 1);

    let id: TodoId = "1?x=#".parse().unwrap();
    let err = client
        .update_todo(&id, &TodoPatch::done(true))
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::request_failed(404, "not found"));
    assert_eq!(backend.state.last_request().unwrap().path, "/todos/1?x=#");
    assert!(!backend.state.todos()[0].done);
}

#[tokio::test]
async fn test_register_returns_user() {
    let backend = FakeBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    let user = client
        .register(ALICE_EMAIL, ALICE_NAME, ALICE_PASSWORD)
        .await
        .unwrap();

    assert_eq!(user.id, UserId::from(1));
    assert_eq!(user.email, ALICE_EMAIL);
    assert_eq!(user.name, ALICE_NAME);
}

#[tokio::test]
async fn test_register_failure_carries_server_text() {
    let backend = FakeBackend::spawn().await;
    seed_alice(&backend);
    let client = ApiClient::new(&backend.config()).unwrap();

    let err = client
        .register(ALICE_EMAIL, "Other", "pw")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::RequestFailed {
            status: 409,
            message: Some("email already registered".to_string()),
        }
    );
}

#[tokio::test]
async fn test_login_rejected_with_401() {
    let backend = FakeBackend::spawn().await;
    seed_alice(&backend);
    let client = ApiClient::new(&backend.config()).unwrap();

    let err = client.login(ALICE_EMAIL, "wrong").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(
        err,
        ApiError::RequestFailed {
            status: 401,
            message: Some("invalid credentials".to_string()),
        }
    );
    assert!(client.session().is_none());
}

#[tokio::test]
async fn test_login_establishes_ambient_session() {
    let backend = FakeBackend::spawn().await;
    let alice = seed_alice(&backend);
    let client = ApiClient::new(&backend.config()).unwrap();

    let outcome = client.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    assert_eq!(outcome.response.status.as_deref(), Some("ok"));
    assert_eq!(outcome.response.user.as_ref(), Some(&alice));
    assert!(outcome.session.is_some());
    assert_eq!(client.session(), outcome.session);

    // 以降の呼び出しには Cookie が自動で付与される
    let me = client.fetch_me().await.unwrap();
    assert_eq!(me, alice);
    client.create_todo("after login").await.unwrap();
}

#[tokio::test]
async fn test_login_with_empty_body_still_succeeds() {
    let backend = FakeBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    backend.state.fail_next(200, "");
    let outcome = client.login("a@example.com", "pw").await.unwrap();

    assert!(outcome.response.user.is_none());
    assert!(outcome.session.is_none());
}

#[tokio::test]
async fn test_fetch_me_maps_failures_to_unauthorized() {
    let backend = FakeBackend::spawn().await;
    let client = ApiClient::new(&backend.config()).unwrap();

    let err = client.fetch_me().await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized { status: 401 });

    backend.state.fail_next(500, "redis error");
    let err = client.fetch_me().await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized { status: 500 });
}

#[tokio::test]
async fn test_logout_ends_server_session() {
    let (backend, client, _) = logged_in_client().await;
    assert_eq!(backend.state.session_count(), 1);

    client.logout().await.unwrap();

    assert_eq!(backend.state.session_count(), 0);
    assert!(matches!(
        client.fetch_me().await,
        Err(ApiError::Unauthorized { status: 401 })
    ));
}

#[tokio::test]
async fn test_logout_failure_is_reported() {
    let (backend, client, _) = logged_in_client().await;

    backend.state.fail_next(500, "session error");
    let err = client.logout().await.unwrap_err();

    assert_eq!(err, ApiError::request_failed(500, "session error"));
}

#[tokio::test]
async fn test_undecodable_body_is_deserialization_error() {
    let (backend, client, _) = logged_in_client().await;

    backend.state.fail_next(200, "<html>oops</html>");
    let err = client.fetch_todos().await.unwrap_err();

    assert!(matches!(err, ApiError::Deserialization(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = ApiClient::new(&unreachable_config().await).unwrap();

    let err = client.fetch_todos().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.status(), None);
}
