//! Firestore adapter flows against a stub REST server.
//!
//! The stub keeps documents in memory and honours the two request features
//! the adapter relies on: `currentDocument.exists` preconditions and
//! `updateMask.fieldPaths` partial writes.

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use ebuddy_backend::domain::ports::{UserRecordRepository, UserRecordRepositoryError};
use ebuddy_backend::domain::{RentalStats, UserId};
use ebuddy_backend::outbound::firestore::{FirestoreConfig, FirestoreUserRecordRepository};
use ebuddy_backend::test_support::clock::MutableClock;
use reqwest::Url;
use serde_json::{Map, Value, json};

const PROJECT: &str = "demo-project";
const DOCUMENT_PATH: &str = "/v1/projects/{project}/databases/{database}/documents/USERS/{id}";

#[derive(Default)]
struct StubFirestore {
    documents: Mutex<HashMap<String, Map<String, Value>>>,
    auth_headers: Mutex<Vec<Option<String>>>,
}

impl StubFirestore {
    fn document(&self, id: &str) -> Option<Map<String, Value>> {
        self.documents.lock().expect("documents lock").get(id).cloned()
    }

    fn insert(&self, id: &str, fields: Value) {
        let fields = fields.as_object().cloned().expect("fields object");
        self.documents
            .lock()
            .expect("documents lock")
            .insert(id.to_owned(), fields);
    }
}

fn status_body(code: u16, status: &str) -> Value {
    json!({ "error": { "code": code, "message": status.to_lowercase(), "status": status } })
}

fn document_body(id: &str, fields: &Map<String, Value>) -> Value {
    json!({
        "name": format!("projects/{PROJECT}/databases/(default)/documents/USERS/{id}"),
        "fields": fields,
    })
}

fn record_auth(stub: &StubFirestore, req: &HttpRequest) {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    stub.auth_headers.lock().expect("auth lock").push(header);
}

async fn get_document(
    stub: web::Data<StubFirestore>,
    req: HttpRequest,
    path: web::Path<(String, String, String)>,
) -> HttpResponse {
    record_auth(&stub, &req);
    let (_, _, id) = path.into_inner();
    match stub.document(&id) {
        Some(fields) => HttpResponse::Ok().json(document_body(&id, &fields)),
        None => HttpResponse::NotFound().json(status_body(404, "NOT_FOUND")),
    }
}

async fn patch_document(
    stub: web::Data<StubFirestore>,
    req: HttpRequest,
    path: web::Path<(String, String, String)>,
    body: web::Json<Value>,
) -> HttpResponse {
    record_auth(&stub, &req);
    let (_, _, id) = path.into_inner();
    let mut exists = None;
    let mut mask = Vec::new();
    for (key, value) in url::form_urlencoded::parse(req.query_string().as_bytes()) {
        match key.as_ref() {
            "currentDocument.exists" => exists = Some(value == "true"),
            "updateMask.fieldPaths" => mask.push(value.into_owned()),
            _ => {}
        }
    }

    let mut documents = stub.documents.lock().expect("documents lock");
    let current = documents.get(&id).cloned();
    match (exists, &current) {
        (Some(false), Some(_)) => {
            return HttpResponse::Conflict().json(status_body(409, "ALREADY_EXISTS"));
        }
        (Some(true), None) => {
            return HttpResponse::NotFound().json(status_body(404, "NOT_FOUND"));
        }
        _ => {}
    }

    let incoming = body
        .get("fields")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let fields = if mask.is_empty() {
        incoming
    } else {
        let mut fields = current.unwrap_or_default();
        for path in &mask {
            match incoming.get(path) {
                Some(value) => fields.insert(path.clone(), value.clone()),
                None => fields.remove(path),
            };
        }
        fields
    };
    let response = document_body(&id, &fields);
    documents.insert(id, fields);
    HttpResponse::Ok().json(response)
}

async fn always_unavailable() -> HttpResponse {
    HttpResponse::InternalServerError().json(status_body(500, "INTERNAL"))
}

struct StubServer {
    base_url: String,
    handle: ServerHandle,
    stub: web::Data<StubFirestore>,
}

impl StubServer {
    async fn stop(self) {
        self.handle.stop(true).await;
    }
}

fn spawn_stub(failing: bool) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    let stub = web::Data::new(StubFirestore::default());
    let app_stub = stub.clone();

    let server = HttpServer::new(move || {
        let app = App::new().app_data(app_stub.clone());
        if failing {
            app.default_service(web::to(always_unavailable))
        } else {
            app.route(DOCUMENT_PATH, web::get().to(get_document))
                .route(DOCUMENT_PATH, web::patch().to(patch_document))
        }
    })
    .workers(1)
    .listen(listener)
    .expect("listen on stub")
    .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    StubServer {
        base_url: format!("http://{addr}/v1/"),
        handle,
        stub,
    }
}

fn repository(
    base_url: &str,
    clock: Arc<MutableClock>,
    access_token: Option<&str>,
) -> FirestoreUserRecordRepository {
    FirestoreUserRecordRepository::new(
        FirestoreConfig {
            base_url: Url::parse(base_url).expect("stub url"),
            project_id: PROJECT.to_owned(),
            access_token: access_token.map(str::to_owned),
            timeout: Duration::from_secs(5),
        },
        clock,
    )
    .expect("adapter builds")
}

fn user(id: &str) -> UserId {
    UserId::new(id).expect("fixture id")
}

fn stats(ratings: f64, rents: f64) -> RentalStats {
    RentalStats::try_new(ratings, rents).expect("fixture stats")
}

#[actix_web::test]
async fn create_then_get_round_trips_typed_values() {
    let server = spawn_stub(false);
    let clock = Arc::new(MutableClock::at_millis(1_000));
    let repo = repository(&server.base_url, clock, Some("secret-token"));

    let created = repo.create(&user("u1"), &stats(4.8, 10.0)).await.expect("create");
    let fetched = repo.get(&user("u1")).await.expect("get").expect("present");

    assert_eq!(created, fetched);
    assert_eq!(fetched.created_at, 1_000);
    let stored = server.stub.document("u1").expect("stored");
    assert_eq!(stored["totalAverageWeightRatings"], json!({"doubleValue": 4.8}));
    assert_eq!(stored["numberOfRents"], json!({"integerValue": "10"}));
    assert!(stored.get("id").is_none(), "id is the document key, not a field");
    assert!(
        server
            .stub
            .auth_headers
            .lock()
            .expect("auth lock")
            .iter()
            .all(|header| header.as_deref() == Some("Bearer secret-token"))
    );
    server.stop().await;
}

#[actix_web::test]
async fn missing_documents_read_as_none() {
    let server = spawn_stub(false);
    let repo = repository(&server.base_url, Arc::new(MutableClock::at_millis(0)), None);

    assert_eq!(repo.get(&user("missing-user")).await.expect("get"), None);
    server.stop().await;
}

#[actix_web::test]
async fn create_on_existing_document_reports_already_exists() {
    let server = spawn_stub(false);
    let repo = repository(&server.base_url, Arc::new(MutableClock::at_millis(0)), None);
    repo.create(&user("u1"), &stats(4.8, 10.0)).await.expect("first create");

    let err = repo
        .create(&user("u1"), &stats(1.0, 1.0))
        .await
        .expect_err("second create");

    assert!(matches!(err, UserRecordRepositoryError::AlreadyExists { .. }));
    let stored = server.stub.document("u1").expect("stored");
    assert_eq!(stored["numberOfRents"], json!({"integerValue": "10"}));
    server.stop().await;
}

#[actix_web::test]
async fn merge_keeps_creation_time_and_advances_timestamps() {
    let server = spawn_stub(false);
    let clock = Arc::new(MutableClock::at_millis(1_000));
    let repo = repository(&server.base_url, clock.clone(), None);
    repo.create(&user("u1"), &stats(4.8, 10.0)).await.expect("create");

    clock.advance_millis(500);
    let merged = repo.merge(&user("u1"), &stats(3.0, 12.0)).await.expect("merge");

    assert_eq!(merged.created_at, 1_000);
    assert_eq!(merged.updated_at, 1_500);
    assert_eq!(merged.recently_active, 1_500);
    assert_eq!(merged.total_average_weight_ratings, 3.0);
    assert_eq!(merged.number_of_rents, 12);
    server.stop().await;
}

#[actix_web::test]
async fn integer_encoded_ratings_are_accepted() {
    let server = spawn_stub(false);
    server.stub.insert(
        "legacy",
        json!({
            "totalAverageWeightRatings": {"integerValue": "4"},
            "numberOfRents": {"doubleValue": 7.0},
            "recentlyActive": {"integerValue": "10"},
            "createdAt": {"integerValue": "5"},
            "updatedAt": {"integerValue": "10"},
        }),
    );
    let repo = repository(&server.base_url, Arc::new(MutableClock::at_millis(0)), None);

    let record = repo.get(&user("legacy")).await.expect("get").expect("present");

    assert_eq!(record.total_average_weight_ratings, 4.0);
    assert_eq!(record.number_of_rents, 7);
    server.stop().await;
}

#[actix_web::test]
async fn touch_updates_only_activity_timestamps() {
    let server = spawn_stub(false);
    let clock = Arc::new(MutableClock::at_millis(1_000));
    let repo = repository(&server.base_url, clock.clone(), None);
    repo.create(&user("u1"), &stats(4.8, 10.0)).await.expect("create");

    clock.advance_millis(250);
    repo.touch_activity(&user("u1")).await.expect("touch");

    let record = repo.get(&user("u1")).await.expect("get").expect("present");
    assert_eq!(record.recently_active, 1_250);
    assert_eq!(record.updated_at, 1_250);
    assert_eq!(record.created_at, 1_000);
    assert_eq!(record.number_of_rents, 10);
    server.stop().await;
}

#[actix_web::test]
async fn touch_on_missing_document_reports_missing() {
    let server = spawn_stub(false);
    let repo = repository(&server.base_url, Arc::new(MutableClock::at_millis(0)), None);

    let err = repo
        .touch_activity(&user("ghost"))
        .await
        .expect_err("no document");

    assert!(matches!(err, UserRecordRepositoryError::Missing { .. }));
    assert!(server.stub.document("ghost").is_none(), "touch must not create");
    server.stop().await;
}

#[actix_web::test]
async fn server_errors_map_to_query_failures() {
    let server = spawn_stub(true);
    let repo = repository(&server.base_url, Arc::new(MutableClock::at_millis(0)), None);

    let err = repo.get(&user("u1")).await.expect_err("stub fails");

    match err {
        UserRecordRepositoryError::Query { message } => {
            assert!(message.contains("status 500"), "unexpected message: {message}");
        }
        other => panic!("expected query error, got {other:?}"),
    }
    server.stop().await;
}

#[actix_web::test]
async fn unreachable_store_maps_to_connection_failure() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    };
    let repo = repository(
        &format!("http://{addr}/v1/"),
        Arc::new(MutableClock::at_millis(0)),
        None,
    );

    let err = repo.get(&user("u1")).await.expect_err("nothing listening");

    assert!(matches!(err, UserRecordRepositoryError::Connection { .. }));
}
