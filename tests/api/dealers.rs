use serde_json::json;

use crate::support::{backends, get_json, ids, start_server};

#[tokio::test]
async fn health_lists_endpoints() {
    for (name, store) in backends() {
        let base = start_server(store).await;
        let (status, body) = get_json(format!("{base}/")).await;
        assert_eq!(status, 200, "{name}");
        assert_eq!(body["message"], "Dealer API Server is running");

        let endpoints = body["endpoints"].as_array().unwrap();
        assert!(endpoints.iter().any(|e| e == "POST /insert_review"));
        assert!(endpoints.iter().any(|e| e == "GET /fetchInventory/dealer/:id"));
    }
}

#[tokio::test]
async fn fetch_all_dealers() {
    for (name, store) in backends() {
        let base = start_server(store).await;
        let (status, body) = get_json(format!("{base}/fetchDealers")).await;
        assert_eq!(status, 200, "{name}");
        assert_eq!(ids(&body), vec![1, 2, 3], "{name}");
    }
}

#[tokio::test]
async fn fetch_dealers_by_state_is_exact() {
    for (name, store) in backends() {
        let base = start_server(store).await;

        let (status, body) = get_json(format!("{base}/fetchDealers/NY")).await;
        assert_eq!(status, 200, "{name}");
        assert_eq!(ids(&body), vec![1, 3], "{name}");

        let (_, lower) = get_json(format!("{base}/fetchDealers/ny")).await;
        assert_eq!(lower, json!([]), "{name}");

        let (status, none) = get_json(format!("{base}/fetchDealers/TX")).await;
        assert_eq!(status, 200, "{name}");
        assert_eq!(none, json!([]), "{name}");
    }
}

#[tokio::test]
async fn fetch_single_dealer() {
    for (name, store) in backends() {
        let base = start_server(store).await;

        let (status, body) = get_json(format!("{base}/fetchDealer/2")).await;
        assert_eq!(status, 200, "{name}");
        assert_eq!(body["full_name"], "Golden Autos", "{name}");

        let (status, body) = get_json(format!("{base}/fetchDealer/999")).await;
        assert_eq!(status, 404, "{name}");
        assert_eq!(body, json!({ "error": "Dealer not found" }), "{name}");
    }
}
