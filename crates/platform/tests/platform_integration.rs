//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: pkid — a small certificate authority and PKI service.
//

//! Router-level integration tests for the pkid HTTP surface, exercised via
//! `tower::ServiceExt::oneshot` against the full Axum router. These cover
//! the end-to-end scenarios the design doc quantifies over the HTTP
//! boundary; manager-level unit tests live alongside `ca::manager`.

#![cfg(feature = "http")]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pkid_platform::ca::storage::file::FileStorage;
use pkid_platform::ca::TransactionalManager;
use pkid_platform::http::{create_router, AppState};
use tower::ServiceExt;

fn router() -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage: Box<dyn pkid_platform::ca::storage::Storage> =
        Box::new(FileStorage::new(dir.path()).unwrap());
    let state = AppState::new(TransactionalManager::new(storage));
    (create_router(state), dir)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn healthz_returns_ok() {
    let (app, _dir) = router();
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn self_signed_rsa_root_scenario() {
    let (app, _dir) = router();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ca")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("name=root&rsaBits=2048"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let id = body_text(response).await;
    assert!(!id.is_empty());

    let response = app
        .oneshot(Request::builder().uri(format!("/ca/{id}/cert")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pem = body_text(response).await;
    assert!(pem.contains("BEGIN CERTIFICATE"));
}

#[tokio::test]
async fn full_hierarchy_and_elided_get_scenario() {
    let (app, _dir) = router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ca")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("name=root&curve=P-256"))
                .unwrap(),
        )
        .await
        .unwrap();
    let root_id = body_text(response).await;

    for typ in ["ca", "client", "server"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/ca/{root_id}/{typ}"))
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(format!("name={typ}-child&curve=P-256")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/ca/{root_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["cert"], "");
    assert_eq!(json["key"], "");
    // num-bigint serializes BigUint as a string in human-readable formats.
    assert_eq!(json["serial"], "4");
}

#[tokio::test]
async fn revoke_and_crl_scenario() {
    let (app, _dir) = router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ca")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("name=root&curve=P-256"))
                .unwrap(),
        )
        .await
        .unwrap();
    let root_id = body_text(response).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/ca/{root_id}/client"))
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("name=leaf&curve=P-256"))
                .unwrap(),
        )
        .await
        .unwrap();
    let client_id = body_text(response).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/ca/{root_id}/client/{client_id}/revoke"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "revoked");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/ca/{root_id}/crl"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pem = body_text(response).await;
    assert!(pem.contains("BEGIN X509 CRL"));
}

#[tokio::test]
async fn unknown_ca_is_not_found() {
    let (app, _dir) = router();
    let response = app
        .oneshot(Request::builder().uri("/ca/does-not-exist").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_role_is_bad_request() {
    let (app, _dir) = router();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ca")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("name=root&curve=P-256"))
                .unwrap(),
        )
        .await
        .unwrap();
    let root_id = body_text(response).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/ca/{root_id}/vpn"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
