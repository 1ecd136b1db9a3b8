//! HTTP integration tests for the rendez-vous endpoints.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

#[path = "test_utils/mod.rs"]
mod test_utils;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn create_accepts_legacy_field_names_in_data_envelope() {
    let db = test_utils::setup_test_db().await.unwrap();
    let app = test_utils::build_test_app(db);

    let payload = json!({
        "data": {
            "type": "positionnement",
            "nom": "Martin",
            "prenom": "Paul",
            "email": "paul.martin@example.fr",
            "formatRdv": "visio",
            "objectifs": "monter en compétences"
        }
    });

    let response = app
        .oneshot(json_request("POST", "/api/rendezvous", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["data"]["statut"], "nouveau");
    assert_eq!(body["data"]["nomBeneficiaire"], "Martin");
    assert_eq!(body["data"]["emailBeneficiaire"], "paul.martin@example.fr");
    assert_eq!(body["data"]["canal"], "visio");
    // a bare string objectifs is coerced into a one-element list
    assert_eq!(body["data"]["objectifs"], json!(["monter en compétences"]));
    assert_eq!(body["data"]["version"], 1);
}

#[tokio::test]
async fn create_accepts_a_bare_array_and_creates_each_record() {
    let db = test_utils::setup_test_db().await.unwrap();
    let app = test_utils::build_test_app(db);

    let payload = json!([
        {"type": "positionnement", "nom": "Un", "prenom": "Alpha"},
        {"type": "positionnement", "nom": "Deux", "prenom": "Beta"}
    ]);

    let response = app
        .oneshot(json_request("POST", "/api/rendezvous", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_rejects_scalar_data_envelope_with_fixed_message() {
    let db = test_utils::setup_test_db().await.unwrap();
    let app = test_utils::build_test_app(db);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/rendezvous",
            json!({"data": "unexpected format"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["code"], "INVALID_ENVELOPE");
    assert_eq!(body["message"], "Format de réponse invalide");
}

#[tokio::test]
async fn create_rejects_invalid_email() {
    let db = test_utils::setup_test_db().await.unwrap();
    let app = test_utils::build_test_app(db);

    let payload = json!({
        "type": "positionnement",
        "nom": "Martin",
        "prenom": "Paul",
        "email": "pas-un-email"
    });

    let response = app
        .oneshot(json_request("POST", "/api/rendezvous", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["details"]["field"], "emailBeneficiaire");
}

#[tokio::test]
async fn list_filters_by_statut() {
    let db = test_utils::setup_test_db().await.unwrap();
    let first = test_utils::create_positionnement(&db).await.unwrap();
    test_utils::create_positionnement(&db).await.unwrap();
    let app = test_utils::build_test_app(db);

    // plan one of the two
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/rendezvous/{}/valider", first.id),
            json!({"formatRdv": "visio"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/rendezvous?statut=rdv_planifie"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], first.id.to_string());
    assert_eq!(items[0]["canal"], "visio");
}

#[tokio::test]
async fn get_unknown_rendezvous_returns_404() {
    let db = test_utils::setup_test_db().await.unwrap();
    let app = test_utils::build_test_app(db);

    let response = app
        .oneshot(get_request(&format!("/api/rendezvous/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Rendez-vous introuvable");
}

#[tokio::test]
async fn statut_endpoint_rejects_illegal_transition() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let app = test_utils::build_test_app(db);

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/rendezvous/{}/statut", model.id),
            json!({"statut": "termine"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response_json(response).await;
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["details"]["from"], "nouveau");
    assert_eq!(body["details"]["to"], "termine");
}

#[tokio::test]
async fn stale_expected_version_yields_409_with_details() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let app = test_utils::build_test_app(db);

    // first edit bumps the version to 2
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/rendezvous/{}", model.id),
            json!({"commentaires": "premier passage", "expectedVersion": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // a second client still holding version 1 is rejected
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/rendezvous/{}", model.id),
            json!({"commentaires": "second passage", "expectedVersion": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response_json(response).await;
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["details"]["expected_version"], 1);
    assert_eq!(body["details"]["found_version"], 2);
}

#[tokio::test]
async fn impact_chain_through_the_api() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let app = test_utils::build_test_app(db);

    // plan the follow-up
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/rendezvous/{}/impact/planifier", model.id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let impact = &body["data"]["rendezvous"];
    assert_eq!(impact["type"], "impact");
    assert_eq!(impact["statut"], "impact");
    assert_eq!(impact["rendezvousParentId"], model.id.to_string());
    let impact_id = impact["id"].as_str().unwrap().to_string();

    // record the evaluation
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/rendezvous/{}/impact/evaluation", impact_id),
            json!({"satisfactionImpact": 9, "competencesAppliquees": "tableurs"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["statut"], "impact_complete");
    assert_eq!(body["data"]["satisfactionImpact"], 9);

    // close it
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/rendezvous/{}/impact/terminer", impact_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["statut"], "impact_termine");

    // the report location is exposed
    let response = app
        .oneshot(get_request(&format!(
            "/api/rendezvous/{}/impact/rapport",
            impact_id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(
        body["rapportUrl"],
        format!("/rapports/impact/{}.pdf", impact_id)
    );
}

#[tokio::test]
async fn evaluation_out_of_scale_is_rejected() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let app = test_utils::build_test_app(db);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/rendezvous/{}/impact/planifier", model.id),
            json!({}),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    let impact_id = body["data"]["rendezvous"]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/rendezvous/{}/impact/evaluation", impact_id),
            json!({"satisfactionImpact": 0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn generer_programme_returns_both_identifiers() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let app = test_utils::build_test_app(db);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/rendezvous/{}/generer-programme", model.id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert!(body["programmeId"].as_str().is_some());
    assert!(body["dossierId"].as_str().is_some());
}

#[tokio::test]
async fn compte_rendu_requires_a_synthese() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let app = test_utils::build_test_app(db);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/rendezvous/{}/compte-rendu", model.id),
            json!({"synthese": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/rendezvous/{}/compte-rendu", model.id),
            json!({"synthese": "Entretien riche, besoins identifiés.", "notes": "relance en mars"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["synthese"], "Entretien riche, besoins identifiés.");
    assert_eq!(body["data"]["notes"], "relance en mars");
}

#[tokio::test]
async fn delete_removes_the_rendezvous() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let app = test_utils::build_test_app(db);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/rendezvous/{}", model.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get_request(&format!("/api/rendezvous/{}", model.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
