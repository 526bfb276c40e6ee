use super::*;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    posted: Arc<Mutex<Vec<Value>>>,
}

async fn search_patients(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.queries.lock().await.push(query);
    Json(json!({
        "results": [
            {
                "uuid": "patient-1",
                "display": "0101/24/00001 - Maria Silva",
                "identifiers": [
                    { "uuid": "ident-1", "identifier": "0101/24/00001", "preferred": true }
                ]
            }
        ]
    }))
}

async fn get_patient(
    Path(uuid): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if uuid == "patient-1" {
        return Ok(Json(json!({ "uuid": "patient-1", "display": "Maria Silva" })));
    }
    Err((
        StatusCode::NOT_FOUND,
        Json(json!({ "error": { "message": "[Object with given uuid doesn't exist]" } })),
    ))
}

async fn identifier_types() -> Json<Value> {
    Json(json!({
        "results": [ { "uuid": "type-nid", "display": "NID (SERVICO TARV)" } ]
    }))
}

async fn patient_identifiers(Path(uuid): Path<String>) -> Json<Value> {
    Json(json!({
        "results": [ { "uuid": format!("{uuid}-ident"), "identifier": "0101/24/00001" } ]
    }))
}

async fn update_identifier(
    State(state): State<ServerState>,
    Path((_patient, identifier_uuid)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.posted.lock().await.push(body.clone());
    let mut updated = body;
    updated["uuid"] = json!(identifier_uuid);
    Json(updated)
}

async fn spawn_server() -> (RestPatientService, ServerState) {
    let state = ServerState::default();
    let app = Router::new()
        .route("/openmrs/ws/rest/v1/patient", get(search_patients))
        .route("/openmrs/ws/rest/v1/patient/:uuid", get(get_patient))
        .route(
            "/openmrs/ws/rest/v1/patientidentifiertype",
            get(identifier_types),
        )
        .route(
            "/openmrs/ws/rest/v1/patient/:uuid/identifier",
            get(patient_identifiers),
        )
        .route(
            "/openmrs/ws/rest/v1/patient/:uuid/identifier/:identifier_uuid",
            post(update_identifier),
        )
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let settings = Settings {
        openmrs_url: format!("http://{addr}/openmrs"),
        ..Settings::default()
    };
    let service = RestPatientService::from_settings(&settings).expect("client");
    (service, state)
}

#[tokio::test]
async fn search_sends_query_as_name_and_identifier() {
    let (service, state) = spawn_server().await;

    let patients = service.search("00001").await.expect("search");

    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].identifiers[0].identifier, "0101/24/00001");
    let queries = state.queries.lock().await;
    assert_eq!(queries[0].get("q").map(String::as_str), Some("00001"));
    assert_eq!(queries[0].get("identifier").map(String::as_str), Some("00001"));
    assert_eq!(queries[0].get("v").map(String::as_str), Some("full"));
}

#[tokio::test]
async fn missing_patient_maps_openmrs_error_body() {
    let (service, _) = spawn_server().await;

    let found = service.get_patient("patient-1").await.expect("patient");
    assert_eq!(found.display, "Maria Silva");

    let err = service
        .get_patient("patient-404")
        .await
        .expect_err("missing patient");
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(
        err.display_message(),
        "Object with given uuid doesn't exist"
    );
}

#[tokio::test]
async fn lists_identifier_types_and_identifiers() {
    let (service, _) = spawn_server().await;

    let types = service.identifier_types().await.expect("types");
    assert_eq!(types[0].uuid, "type-nid");

    let identifiers = service
        .patient_identifiers("patient-1")
        .await
        .expect("identifiers");
    assert_eq!(identifiers[0].uuid.as_deref(), Some("patient-1-ident"));
}

#[tokio::test]
async fn update_identifier_posts_json_body() {
    let (service, state) = spawn_server().await;
    let identifier = PatientIdentifier {
        uuid: None,
        identifier: "0101/24/00002".to_string(),
        identifier_type: Some(PatientIdentifierType::new("type-nid", "NID")),
        preferred: true,
    };

    let updated = service
        .update_patient_identifier("patient-1", "ident-1", &identifier)
        .await
        .expect("update");

    assert_eq!(updated.uuid.as_deref(), Some("ident-1"));
    let posted = state.posted.lock().await;
    assert_eq!(posted[0]["identifier"], "0101/24/00002");
    assert_eq!(posted[0]["identifierType"]["uuid"], "type-nid");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let settings = Settings {
        openmrs_url: format!("http://{addr}/openmrs"),
        ..Settings::default()
    };
    let service = RestPatientService::from_settings(&settings).expect("client");

    let err = service.search("x").await.expect_err("no server");

    assert_eq!(err.code, ErrorCode::Transport);
}
