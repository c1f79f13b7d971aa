// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};
use zondcc::domain::repositories::kv_store::KvStore;
use zondcc::infrastructure::cache::redis_client::RedisClient;

async fn start_redis() -> (ContainerAsync<GenericImage>, RedisClient) {
    let node = GenericImage::new("redis", "7-alpine")
        .with_exposed_port(6379.tcp())
        .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
        .start()
        .await
        .expect("Failed to start Redis");
    let port = node
        .get_host_port_ipv4(6379)
        .await
        .expect("Failed to get Redis port");
    let client = RedisClient::new(&format!("redis://127.0.0.1:{}", port))
        .await
        .expect("Failed to connect to Redis");
    (node, client)
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_redis_store_contract() {
    let (_node, store) = start_redis().await;

    // strings with TTL
    store.set("a/alive", "c1", Some(Duration::from_secs(1))).await.unwrap();
    store.set("task/t1", "{}", None).await.unwrap();
    assert_eq!(store.get("a/alive").await.unwrap().as_deref(), Some("c1"));
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.get("a/alive").await.unwrap(), None);

    // set removal reports the count
    store.set_add("tasks-new", "t1").await.unwrap();
    assert!(store.set_is_member("tasks-new", "t1").await.unwrap());
    assert_eq!(store.set_remove("tasks-new", "t1").await.unwrap(), 1);
    assert_eq!(store.set_remove("tasks-new", "t1").await.unwrap(), 0);

    // scan covers the whole set
    for i in 0..250 {
        store
            .set_add("tasks-repeatable-300", &format!("s{}", i))
            .await
            .unwrap();
    }
    assert_eq!(store.set_cardinality("tasks-repeatable-300").await.unwrap(), 250);
    let mut cursor = 0;
    let mut seen = std::collections::BTreeSet::new();
    loop {
        let (batch, next) = store
            .set_scan("tasks-repeatable-300", cursor, 100)
            .await
            .unwrap();
        seen.extend(batch);
        if next == 0 {
            break;
        }
        cursor = next;
    }
    assert_eq!(seen.len(), 250);
    assert_eq!(
        store.keys("tasks-repeatable-*").await.unwrap(),
        vec!["tasks-repeatable-300".to_string()]
    );

    // hashes and multi_get
    store.hash_set("zond:city", "z1", "Berlin").await.unwrap();
    assert_eq!(store.hash_values("zond:city").await.unwrap(), vec!["Berlin"]);
    store.hash_delete("zond:city", "z1").await.unwrap();
    assert!(store.hash_values("zond:city").await.unwrap().is_empty());
    assert_eq!(
        store
            .multi_get(&["task/t1".to_string(), "task/missing".to_string()])
            .await
            .unwrap(),
        vec![Some("{}".to_string()), None]
    );
    assert!(store.multi_get(&[]).await.unwrap().is_empty());
    store.del("task/t1").await.unwrap();
    assert_eq!(store.get("task/t1").await.unwrap(), None);
}
