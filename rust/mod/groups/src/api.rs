use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use roster_core::{validate, Authenticator, ServiceError};

use crate::model::{AddMember, CreateGroup};
use crate::service::GroupService;

/// Shared state for the groups API.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GroupService>,
    pub auth: Arc<dyn Authenticator>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{id}", get(group_details))
        .route("/groups/{id}/members", post(add_member))
        .route("/groups/{id}/members/{user_id}", delete(remove_member))
        .with_state(state)
}

async fn create_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateGroup>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let current_user = state.auth.authenticate(&headers)?;
    state.service.create_group(current_user, input)?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn list_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let current_user = state.auth.authenticate(&headers)?;
    let groups = state.service.list_groups(current_user)?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "groups": groups,
    })))
}

async fn group_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let current_user = state.auth.authenticate(&headers)?;
    let group_id = validate::require_number(&id, "group_id")?;
    let details = state.service.group_details(current_user, group_id)?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "group": details.group,
        "users": details.users,
    })))
}

async fn add_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<AddMember>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let current_user = state.auth.authenticate(&headers)?;
    let group_id = validate::require_number(&id, "group_id")?;
    state
        .service
        .add_member(current_user, group_id, input.user_id)?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn remove_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let current_user = state.auth.authenticate(&headers)?;
    let group_id = validate::require_number(&id, "group_id")?;
    let user_id = validate::require_number(&user_id, "user_id")?;
    state
        .service
        .remove_member(current_user, group_id, user_id)?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::SqlUserDirectory;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use roster_core::StaticUser;
    use roster_sql::{SQLStore, SqliteStore};
    use tower::ServiceExt;

    fn test_app(current_user: i64) -> (Router, Arc<SqlUserDirectory>) {
        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let directory = Arc::new(SqlUserDirectory::new(Arc::clone(&sql)));
        let service = Arc::new(GroupService::new(sql, directory.clone()).unwrap());
        let state = AppState {
            service,
            auth: Arc::new(StaticUser(current_user)),
        };
        (routes(state), directory)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn create_and_list_response_shapes() {
        let (app, directory) = test_app(42);
        let owner = directory.create_user("ana", None).unwrap();
        assert_eq!(owner.user_id, Some(1));

        let (status, body) = send(
            &app,
            json_post("/groups", serde_json::json!({"name": "Contest Prep"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&app, get_req("/groups")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["groups"].as_array().unwrap().len(), 1);
        assert_eq!(body["groups"][0]["name"], "Contest Prep");
        assert_eq!(body["groups"][0]["owner_id"], 42);
    }

    #[tokio::test]
    async fn details_include_member_profiles() {
        let (app, directory) = test_app(42);
        let member = directory.create_user("carol", Some("Carol")).unwrap();
        let member_id = member.user_id.unwrap();

        send(
            &app,
            json_post("/groups", serde_json::json!({"name": "Prep"})),
        )
        .await;
        let (status, _) = send(
            &app,
            json_post("/groups/1/members", serde_json::json!({"user_id": member_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, get_req("/groups/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["group"]["group_id"], 1);
        assert_eq!(body["users"][0]["username"], "carol");
    }

    #[tokio::test]
    async fn remove_member_round_trip() {
        let (app, directory) = test_app(42);
        let member_id = directory
            .create_user("carol", None)
            .unwrap()
            .user_id
            .unwrap();

        send(
            &app,
            json_post("/groups", serde_json::json!({"name": "Prep"})),
        )
        .await;
        send(
            &app,
            json_post("/groups/1/members", serde_json::json!({"user_id": member_id})),
        )
        .await;

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/groups/1/members/{}", member_id))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (_, body) = send(&app, get_req("/groups/1")).await;
        assert!(body["users"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_numeric_group_id_is_a_parameter_error() {
        let (app, _) = test_app(42);
        let (status, body) = send(&app, get_req("/groups/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PARAMETER");
        assert!(body["message"].as_str().unwrap().contains("group_id"));
    }

    #[tokio::test]
    async fn empty_name_is_a_parameter_error() {
        let (app, _) = test_app(42);
        let (status, body) = send(
            &app,
            json_post("/groups", serde_json::json!({"name": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PARAMETER");
    }

    #[tokio::test]
    async fn unauthenticated_requests_are_rejected() {
        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let directory = Arc::new(SqlUserDirectory::new(Arc::clone(&sql)));
        let service = Arc::new(GroupService::new(sql, directory).unwrap());
        let app = routes(AppState {
            service,
            auth: Arc::new(roster_core::DenyAll),
        });

        let (status, body) = send(&app, get_req("/groups")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }
}
