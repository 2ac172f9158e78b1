use dealer_api::{Collection, RecordStore};
use serde_json::json;

use crate::support::{backends, get_json, ids, start_server};

#[tokio::test]
async fn fetch_reviews_for_dealer() {
    for (name, store) in backends() {
        let base = start_server(store).await;

        let (status, body) = get_json(format!("{base}/fetchReviews/dealer/3")).await;
        assert_eq!(status, 200, "{name}");
        assert_eq!(ids(&body), vec![2], "{name}");

        let (_, none) = get_json(format!("{base}/fetchReviews/dealer/42")).await;
        assert_eq!(none, json!([]), "{name}");
    }
}

#[tokio::test]
async fn insert_review_assigns_id_and_is_readable() {
    for (name, store) in backends() {
        let base = start_server(store.clone()).await;
        let client = reqwest::Client::new();
        let before = store.count(Collection::Reviews).unwrap();

        let resp = client
            .post(format!("{base}/insert_review"))
            .json(&json!({
                "name": "Cy",
                "dealership": 2,
                "review": "Great service",
                "purchase": true,
                "car_make": "Kia",
                "id": 1
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "{name}");

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true, "{name}");
        assert_eq!(body["review"]["id"], 3, "{name}");
        assert_eq!(body["review"]["car_make"], "Kia", "{name}");
        assert_eq!(store.count(Collection::Reviews).unwrap(), before + 1);

        let (_, listed) = get_json(format!("{base}/fetchReviews/dealer/2")).await;
        assert_eq!(listed, json!([body["review"].clone()]), "{name}");
    }
}

#[tokio::test]
async fn insert_review_coerces_dealership_string() {
    for (name, store) in backends() {
        let base = start_server(store).await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/insert_review"))
            .json(&json!({ "dealership": "1", "review": "Fine" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "{name}");

        let (_, listed) = get_json(format!("{base}/fetchReviews/dealer/1")).await;
        assert_eq!(listed.as_array().unwrap().len(), 2, "{name}");
    }
}

#[tokio::test]
async fn concurrent_inserts_never_share_an_id() {
    for (name, store) in backends() {
        let base = start_server(store).await;
        let client = reqwest::Client::new();

        let tasks: Vec<_> = (0..20)
            .map(|n| {
                let client = client.clone();
                let url = format!("{base}/insert_review");
                tokio::spawn(async move {
                    let body: serde_json::Value = client
                        .post(url)
                        .json(&json!({ "dealership": 9, "review": format!("#{n}") }))
                        .send()
                        .await
                        .unwrap()
                        .json()
                        .await
                        .unwrap();
                    body["review"]["id"].as_i64().unwrap()
                })
            })
            .collect();

        let mut assigned = Vec::new();
        for task in tasks {
            assigned.push(task.await.unwrap());
        }
        assigned.sort_unstable();
        assigned.dedup();
        assert_eq!(assigned.len(), 20, "{name}");
    }
}
