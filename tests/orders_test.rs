//! Signed order operations against a mock exchange.

mod common;

use common::{
    ALL_ORDERS_JSON, API_KEY, ORDER_ACK_JSON, UNREACHABLE_URL, public_client, signed_client,
};
use dipscan::DipscanError;
use dipscan::auth::API_KEY_HEADER;
use dipscan::models::{OrderRequest, OrderSide, OrderType, TimeInForce};
use mockito::Matcher;
use rust_decimal_macros::dec;

/// Query string of a signed limit buy, parameters in documented order.
const SIGNED_BUY_QUERY: &str = r"^symbol=BTCUSDT&side=BUY&type=LIMIT&timeInForce=GTC&quantity=0\.5&price=83\.6&recvWindow=5000&timestamp=\d{13}&signature=[0-9a-f]{64}$";

#[tokio::test]
async fn test_orders_go_to_validation_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let test_mock = server
        .mock("POST", "/api/v3/order/test")
        .match_header(API_KEY_HEADER, API_KEY)
        .match_query(Matcher::Regex(SIGNED_BUY_QUERY.to_string()))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let live_mock = server
        .mock("POST", "/api/v3/order")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = signed_client(&server.url());
    let report = client
        .place_order("BTCUSDT", OrderSide::Buy, OrderType::Limit, dec!(0.5), dec!(83.6), true)
        .await
        .unwrap();

    assert!(report.is_empty());
    test_mock.assert_async().await;
    live_mock.assert_async().await;
}

#[tokio::test]
async fn live_orders_return_the_acknowledgement() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v3/order")
        .match_header(API_KEY_HEADER, API_KEY)
        .match_query(Matcher::Regex(SIGNED_BUY_QUERY.to_string()))
        .with_status(200)
        .with_body(ORDER_ACK_JSON)
        .create_async()
        .await;

    let client = signed_client(&server.url());
    let report = client
        .place_order("BTCUSDT", OrderSide::Buy, OrderType::Limit, dec!(0.5), dec!(83.6), false)
        .await
        .unwrap();

    assert_eq!(report.symbol.as_deref(), Some("BTCUSDT"));
    assert_eq!(report.order_id, Some(28));
    assert_eq!(report.status.as_deref(), Some("NEW"));
    assert_eq!(report.price, Some(dec!(83.6)));
    assert_eq!(report.order_type, Some(OrderType::Limit));
    assert_eq!(report.side, Some(OrderSide::Buy));
    assert_eq!(report.transact_time, Some(1_507_725_176_595));
    mock.assert_async().await;
}

#[tokio::test]
async fn submit_order_honours_time_in_force() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v3/order/test")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("side".into(), "SELL".into()),
            Matcher::UrlEncoded("timeInForce".into(), "IOC".into()),
            Matcher::UrlEncoded("price".into(), "0.00001234".into()),
        ]))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let request = OrderRequest::limit("SHIBUSDT", OrderSide::Sell, dec!(1000000), dec!(0.00001234))
        .with_time_in_force(TimeInForce::Ioc);
    let client = signed_client(&server.url());
    client.submit_order(&request, true).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn symbol_cannot_inject_extra_parameters() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v3/order/test")
        .match_query(Matcher::Regex(
            r"^symbol=BTCUSDT%26side%3DSELL&side=BUY&type=LIMIT&".to_string(),
        ))
        .with_status(400)
        .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#)
        .expect(1)
        .create_async()
        .await;

    let client = signed_client(&server.url());
    let err = client
        .place_order("BTCUSDT&side=SELL", OrderSide::Buy, OrderType::Limit, dec!(1), dec!(100), true)
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(-1121));
    mock.assert_async().await;
}

#[tokio::test]
async fn placements_are_never_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v3/order")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("Service Unavailable")
        .expect(1)
        .create_async()
        .await;

    let client = signed_client(&server.url());
    let err = client
        .place_order("BTCUSDT", OrderSide::Buy, OrderType::Limit, dec!(1), dec!(100), false)
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(503));
    mock.assert_async().await;
}

#[tokio::test]
async fn exchange_rejection_carries_its_code() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v3/order")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"code":-2010,"msg":"Account has insufficient balance for requested action."}"#)
        .create_async()
        .await;

    let client = signed_client(&server.url());
    let err = client
        .place_order("BTCUSDT", OrderSide::Buy, OrderType::Limit, dec!(1), dec!(100), false)
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(-2010));
    assert!(err.to_string().contains("insufficient balance"));
}

#[tokio::test]
async fn transport_failure_is_code_minus_one() {
    let client = signed_client(UNREACHABLE_URL);
    let err = client
        .place_order("BTCUSDT", OrderSide::Buy, OrderType::Limit, dec!(1), dec!(100), true)
        .await
        .unwrap_err();

    assert!(matches!(err, DipscanError::Transport(_)), "got {err:?}");
    assert_eq!(err.code(), Some(-1));
}

#[tokio::test]
async fn errors_never_leak_the_secret_or_signature() {
    let client = signed_client(UNREACHABLE_URL);
    let err = client.get_order_info("BTCUSDT", 7).await.unwrap_err();
    let text = err.to_string();
    assert!(!text.contains(common::API_SECRET));
    assert!(!text.contains("signature="));
}

#[tokio::test]
async fn orders_without_credentials_are_not_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v3/order")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = public_client(&server.url());
    let err = client
        .place_order("BTCUSDT", OrderSide::Buy, OrderType::Limit, dec!(1), dec!(100), false)
        .await
        .unwrap_err();

    assert!(matches!(err, DipscanError::Config(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn invalid_orders_are_rejected_locally() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v3/order/test")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = signed_client(&server.url());
    let err = client
        .place_order("BTCUSDT", OrderSide::Buy, OrderType::Limit, dec!(0), dec!(100), true)
        .await
        .unwrap_err();

    assert!(matches!(err, DipscanError::Config(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn cancel_uses_delete_with_order_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/v3/order")
        .match_header(API_KEY_HEADER, API_KEY)
        .match_query(Matcher::Regex(
            r"^symbol=BTCUSDT&orderId=28&recvWindow=5000&timestamp=\d+&signature=[0-9a-f]{64}$"
                .to_string(),
        ))
        .with_status(200)
        .with_body(
            r#"{"symbol":"BTCUSDT","orderId":28,"origClientOrderId":"6gCrw2kRUAF9CvJDGP16IP","price":"83.6","origQty":"0.5","executedQty":"0","status":"CANCELED","timeInForce":"GTC","type":"LIMIT","side":"BUY"}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = signed_client(&server.url());
    let report = client.cancel_order("BTCUSDT", 28).await.unwrap();

    assert_eq!(report.status.as_deref(), Some("CANCELED"));
    assert_eq!(report.order_id, Some(28));
    mock.assert_async().await;
}

#[tokio::test]
async fn query_reads_one_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/order")
        .match_header(API_KEY_HEADER, API_KEY)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
            Matcher::UrlEncoded("orderId".into(), "28".into()),
            Matcher::Regex("signature=[0-9a-f]{64}".into()),
        ]))
        .with_status(200)
        .with_body(ORDER_ACK_JSON)
        .create_async()
        .await;

    let client = signed_client(&server.url());
    let report = client.get_order_info("BTCUSDT", 28).await.unwrap();
    assert_eq!(report.client_order_id.as_deref(), Some("6gCrw2kRUAF9CvJDGP16IP"));
    mock.assert_async().await;
}

#[tokio::test]
async fn signed_reads_are_resigned_on_retry() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/order")
        .match_query(Matcher::Regex("timestamp=\\d+&signature=[0-9a-f]{64}$".into()))
        .with_status(502)
        .with_body("Bad Gateway")
        .expect(3)
        .create_async()
        .await;

    let client = signed_client(&server.url());
    let err = client.get_order_info("BTCUSDT", 28).await.unwrap_err();
    assert_eq!(err.code(), Some(502));
    mock.assert_async().await;
}

#[tokio::test]
async fn all_orders_are_listed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/allOrders")
        .match_header(API_KEY_HEADER, API_KEY)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
            Matcher::UrlEncoded("recvWindow".into(), "5000".into()),
        ]))
        .with_status(200)
        .with_body(ALL_ORDERS_JSON)
        .create_async()
        .await;

    let client = signed_client(&server.url());
    let orders = client.get_all_order_info("BTCUSDT").await.unwrap();

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].status.as_deref(), Some("FILLED"));
    assert_eq!(orders[1].side, Some(OrderSide::Sell));
    assert_eq!(orders[1].time, Some(1_499_827_319_600));
    mock.assert_async().await;
}
