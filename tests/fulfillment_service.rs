//! Fulfillment operations against a wiremock Shopify API.

use serde_json::json;
use shopapi::{
    Count, Create, Fulfillment, FulfillmentCreate, FulfillmentStatus, Get, LineItem, List,
    ListOptions, RetryPolicy, ShopifyClient, ShopifyError, Update,
};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORDERS: &str = "/admin/api/2024-01/orders/450789469";

fn client(server: &MockServer) -> ShopifyClient {
    ShopifyClient::new(&server.uri(), "shpat_test")
        .unwrap()
        .with_retry_policy(RetryPolicy::none())
}

fn shipped() -> serde_json::Value {
    json!({
        "id": 255858046,
        "order_id": 450789469,
        "status": "success",
        "created_at": "2024-01-02T11:44:56-05:00",
        "service": "manual",
        "updated_at": "2024-01-02T11:44:56-05:00",
        "tracking_company": "USPS",
        "shipment_status": null,
        "location_id": 24826418,
        "line_items": [{
            "id": 466157049,
            "variant_id": 39072856,
            "title": "IPod Nano - 8gb",
            "quantity": 1,
            "sku": "IPOD2008GREEN",
            "price": "199.00",
            "tax_lines": [{ "price": "3.98", "rate": 0.06, "title": "State Tax" }]
        }],
        "tracking_number": "1Z2345",
        "tracking_numbers": ["1Z2345"],
        "tracking_url": "https://tools.usps.com/go/TrackConfirmAction_input?qtc_tLabels1=1Z2345",
        "tracking_urls": ["https://tools.usps.com/go/TrackConfirmAction_input?qtc_tLabels1=1Z2345"],
        "receipt": { "testcase": true, "authorization": "123456" },
        "name": "#1001.0"
    })
}

#[tokio::test]
async fn test_get_fulfillment_decodes_nested_members() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{ORDERS}/fulfillments/255858046.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fulfillment": shipped() })))
        .expect(1)
        .mount(&server)
        .await;

    let fulfillment = Fulfillment::get(&client(&server), (450789469, 255858046), None)
        .await
        .unwrap();

    assert_eq!(fulfillment.status, Some(FulfillmentStatus::Success));
    assert_eq!(fulfillment.all_tracking_numbers(), vec!["1Z2345"]);
    assert_eq!(fulfillment.receipt.as_ref().unwrap()["authorization"], "123456");

    let items = fulfillment.line_items.unwrap();
    assert_eq!(items[0].sku.as_deref(), Some("IPOD2008GREEN"));
    assert!(items[0].extra.contains_key("tax_lines"));
}

#[tokio::test]
async fn test_list_fulfillments_passes_options() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{ORDERS}/fulfillments.json")))
        .and(query_param("limit", "5"))
        .and(query_param("since_id", "255858045"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "fulfillments": [shipped()] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let options = ListOptions {
        limit: Some(5),
        since_id: Some(255858045),
        ..Default::default()
    };
    let fulfillments = Fulfillment::list_all(&client(&server), &(450789469, options))
        .await
        .unwrap();

    assert_eq!(fulfillments.len(), 1);
    assert_eq!(fulfillments[0].order_id, Some(450789469));
}

#[tokio::test]
async fn test_count_fulfillments() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{ORDERS}/fulfillments/count.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 2 })))
        .expect(1)
        .mount(&server)
        .await;

    let count = Fulfillment::count(&client(&server), 450789469).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_create_fulfillment_sends_notify_customer_inside_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{ORDERS}/fulfillments.json")))
        .and(body_json(json!({
            "fulfillment": {
                "location_id": 24826418,
                "tracking_number": "123456789",
                "line_items": [{ "id": 466157049 }],
                "notify_customer": true
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "fulfillment": shipped() })))
        .expect(1)
        .mount(&server)
        .await;

    let params = FulfillmentCreate {
        order_id: 450789469,
        fulfillment: Fulfillment {
            location_id: Some(24826418),
            tracking_number: Some("123456789".to_string()),
            line_items: Some(vec![LineItem {
                id: Some(466157049),
                ..Default::default()
            }]),
            ..Default::default()
        },
        notify_customer: Some(true),
    };
    let created = Fulfillment::create(&client(&server), params).await.unwrap();

    assert_eq!(created.id, Some(255858046));
}

#[tokio::test]
async fn test_update_fulfillment_tracking() {
    let server = MockServer::start().await;

    let mut body = shipped();
    body["tracking_number"] = json!("987654321");

    Mock::given(method("PUT"))
        .and(path(format!("{ORDERS}/fulfillments/255858046.json")))
        .and(body_json(json!({
            "fulfillment": {
                "id": 255858046,
                "order_id": 450789469,
                "tracking_number": "987654321"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fulfillment": body })))
        .expect(1)
        .mount(&server)
        .await;

    let patch = Fulfillment {
        id: Some(255858046),
        order_id: Some(450789469),
        tracking_number: Some("987654321".to_string()),
        ..Default::default()
    };
    let updated = Fulfillment::update(&client(&server), &patch).await.unwrap();

    assert_eq!(updated.tracking_number.as_deref(), Some("987654321"));
}

#[tokio::test]
async fn test_cancel_fulfillment_posts_empty_envelope() {
    let server = MockServer::start().await;

    let mut body = shipped();
    body["status"] = json!("cancelled");

    Mock::given(method("POST"))
        .and(path(format!("{ORDERS}/fulfillments/255858046/cancel.json")))
        .and(body_json(json!({ "fulfillment": {} })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fulfillment": body })))
        .expect(1)
        .mount(&server)
        .await;

    let cancelled = Fulfillment::cancel(&client(&server), 450789469, 255858046)
        .await
        .unwrap();

    assert_eq!(cancelled.status, Some(FulfillmentStatus::Cancelled));
}

#[tokio::test]
async fn test_update_without_order_fails_before_sending() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let patch = Fulfillment {
        id: Some(255858046),
        ..Default::default()
    };
    let err = Fulfillment::update(&client(&server), &patch).await.unwrap_err();

    assert!(matches!(err, ShopifyError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_zero_order_id_is_rejected() {
    let server = MockServer::start().await;

    let err = Fulfillment::count(&client(&server), 0).await.unwrap_err();
    assert!(matches!(err, ShopifyError::InvalidArgument(_)));
}
