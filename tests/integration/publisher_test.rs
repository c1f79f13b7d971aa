// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};
use zondcc::config::settings::NotificationSettings;
use zondcc::domain::services::notification_service::NotificationService;
use zondcc::infrastructure::services::notification_service_impl::HttpNotificationService;

fn settings(base_url: String, queue_capacity: usize) -> NotificationSettings {
    NotificationSettings {
        base_url,
        queue_capacity,
        max_in_flight: 4,
        timeout_seconds: Some(5),
    }
}

/// 等待模拟服务器收到指定数量的请求
async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<Request> {
    for _ in 0..100 {
        let received = server.received_requests().await.unwrap_or_default();
        if received.len() >= count {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    server.received_requests().await.unwrap_or_default()
}

#[tokio::test]
async fn test_publish_and_unpublish_are_delivered() {
    // Given
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pub/tasks/done"))
        .and(body_string(r#"{"uuid":"t1"}"#))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/pub/zond:z1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let (service, publisher) = HttpNotificationService::new(&settings(server.uri(), 16)).unwrap();
    let handle = publisher.start();

    // When
    service.publish("tasks/done", r#"{"uuid":"t1"}"#.to_string());
    service.unpublish("zond:z1");

    // Then
    let received = wait_for_requests(&server, 2).await;
    assert_eq!(received.len(), 2);
    handle.abort();
}

#[tokio::test]
async fn test_full_queue_drops_without_blocking() {
    // Given: 投递器尚未启动，容量为1
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let (service, publisher) = HttpNotificationService::new(&settings(server.uri(), 1)).unwrap();

    // When
    service.publish("tasks", "first".to_string());
    service.publish("tasks", "second".to_string());
    service.publish("tasks", "third".to_string());
    let handle = publisher.start();

    // Then: 只有第一条被投递
    let received = wait_for_requests(&server, 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let received_after = server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1);
    assert_eq!(received_after.len(), 1);
    assert_eq!(received_after[0].body, b"first".to_vec());
    handle.abort();
}

#[tokio::test]
async fn test_failed_delivery_does_not_stop_publisher() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let (service, publisher) = HttpNotificationService::new(&settings(server.uri(), 16)).unwrap();
    let handle = publisher.start();

    service.publish("tasks", "a".to_string());
    service.publish("tasks", "b".to_string());

    assert_eq!(wait_for_requests(&server, 2).await.len(), 2);
    assert!(!handle.is_finished());
    handle.abort();
}

#[tokio::test]
async fn test_service_builds_with_and_without_timeout() {
    // Given: 有超时与无超时两种配置
    let mut without_timeout = settings("http://127.0.0.1:9".to_string(), 4);
    without_timeout.timeout_seconds = None;

    // When
    let with_timeout = HttpNotificationService::new(&settings("http://127.0.0.1:9".to_string(), 4));
    let without = HttpNotificationService::new(&without_timeout);

    // Then: 客户端构建结果以 Result 返回
    assert!(with_timeout.is_ok());
    assert!(without.is_ok());
}
