//! Delivery agents, distributors, restock orders and replenishment.

mod common;

use axum::http::StatusCode;
use common::{add_item, build_test_app, create_retailer, get, post};
use serde_json::json;

async fn add_oslo_distributor(app: &axum::Router) {
    let (status, json) = post(
        app,
        "/distributors",
        json!({ "location": "Oslo", "distributors": [{ "name": "Nordgros", "contact": "+4798765432", "email": "ordre@nordgros.no" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
}

#[tokio::test]
async fn test_agents_by_location() {
    let app = build_test_app();
    let user_id = create_retailer(&app, "mikael", None).await;

    let (status, json) = post(
        &app,
        &format!("/addDeliveryAgent/{}", user_id),
        json!({ "delivery_name": "Erik", "delivery_number": "+4712345678", "location": "Oslo Sentrum" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Delivery Agent added successfully for Oslo Sentrum");

    let (_, json) = get(&app, &format!("/getDeliveryAgents/{}?location=sentrum", user_id)).await;
    assert_eq!(json["agents"].as_array().unwrap().len(), 1);

    let (status, json) = get(&app, &format!("/getDeliveryAgentsByLocation/{}/oslo", user_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["location"], "oslo");

    let (status, json) = get(&app, &format!("/getDeliveryAgentsByLocation/{}/Bergen", user_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "No agents found in Bergen");
}

#[tokio::test]
async fn test_add_agent_requires_fields() {
    let app = build_test_app();
    let user_id = create_retailer(&app, "mikael", None).await;

    let (status, _) = post(&app, &format!("/addDeliveryAgent/{}", user_id), json!({ "delivery_name": "Erik" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_distributor_listing() {
    let app = build_test_app();
    add_oslo_distributor(&app).await;

    let (_, json) = get(&app, "/distributors?location=oslo").await;
    assert_eq!(json["distributors"].as_array().unwrap().len(), 1);
    assert_eq!(json["distributors"][0]["name"], "Nordgros");

    let (_, json) = get(&app, "/distributors?location=Trondheim").await;
    assert!(json["distributors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_restock_order() {
    let app = build_test_app();
    let user_id = create_retailer(&app, "mikael", None).await;
    add_oslo_distributor(&app).await;

    let (status, json) = post(
        &app,
        "/restock-order",
        json!({ "userId": user_id, "city": "oslo", "order_items": [{ "product_name": "soap", "quantity": 40 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    assert_eq!(json["distributors"].as_array().unwrap().len(), 1);

    let (status, json) = post(
        &app,
        "/restock-order",
        json!({ "userId": user_id, "city": "Tromsø", "order_items": [{ "product_name": "soap", "quantity": 40 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "No distributors found for Tromsø");
}

#[tokio::test]
async fn test_replenish_check_places_order_in_region() {
    let app = build_test_app();
    let user_id = create_retailer(&app, "mikael", Some("Oslo")).await;
    add_oslo_distributor(&app).await;
    add_item(&app, &user_id, json!({ "product_name": "soap", "quantity": 5, "country": "norway", "month": 4 })).await;
    add_item(&app, &user_id, json!({ "product_name": "lotion", "quantity": 60, "country": "norway", "month": 4 })).await;

    let (status, json) = post(&app, &format!("/replenish/check/{}", user_id), json!({})).await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productId"], "norway/soap");
    assert_eq!(items[0]["name"], "soap");
    assert_eq!(items[0]["needsRestock"], true);
    assert_eq!(items[0]["orderPlaced"], true);
    assert_eq!(items[0]["suggestedQuantity"], 95);
}

#[tokio::test]
async fn test_replenish_check_without_distributor() {
    let app = build_test_app();
    let user_id = create_retailer(&app, "mikael", Some("Bodø")).await;
    add_item(&app, &user_id, json!({ "product_name": "soap", "quantity": 1, "country": "norway", "month": 4 })).await;

    let (_, json) = post(&app, &format!("/replenish/check/{}", user_id), json!({})).await;
    assert_eq!(json["items"][0]["orderPlaced"], false);
}
