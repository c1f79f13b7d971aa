// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::NotificationSettings;
use crate::domain::services::notification_service::NotificationService;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 待投递的通知
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Publish { topic: String, payload: String },
    Unpublish { topic: String },
}

/// HTTP通知服务
///
/// `publish`/`unpublish` 只把消息放进有界通道，由 `NotificationPublisher`
/// 在后台投递。通道满时直接丢弃并记录告警。
#[derive(Clone)]
pub struct HttpNotificationService {
    sender: mpsc::Sender<Notification>,
}

impl HttpNotificationService {
    /// 创建通知服务及其后台投递器
    ///
    /// # 参数
    ///
    /// * `settings` - 通知配置
    ///
    /// # 返回值
    ///
    /// 返回服务句柄和尚未启动的投递器，HTTP客户端无法构建时返回错误
    pub fn new(settings: &NotificationSettings) -> Result<(Self, NotificationPublisher)> {
        let (sender, receiver) = mpsc::channel(settings.queue_capacity.max(1));

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| anyhow!("Failed to build notification client: {}", e))?;

        let publisher = NotificationPublisher {
            receiver,
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            permits: Arc::new(Semaphore::new(settings.max_in_flight.max(1))),
        };

        Ok((Self { sender }, publisher))
    }

    fn enqueue(&self, notification: Notification) {
        if let Err(e) = self.sender.try_send(notification) {
            metrics::counter!("notifications_dropped_total").increment(1);
            match e {
                mpsc::error::TrySendError::Full(n) => {
                    warn!("Notification queue full, dropping {:?}", n)
                }
                mpsc::error::TrySendError::Closed(n) => {
                    warn!("Notification publisher stopped, dropping {:?}", n)
                }
            }
        }
    }
}

impl NotificationService for HttpNotificationService {
    fn publish(&self, topic: &str, payload: String) {
        self.enqueue(Notification::Publish {
            topic: topic.to_string(),
            payload,
        });
    }

    fn unpublish(&self, topic: &str) {
        self.enqueue(Notification::Unpublish {
            topic: topic.to_string(),
        });
    }
}

/// 通知投递器
///
/// 从通道读取通知，以有限并发向 `<base_url>/pub/<topic>` 发送：
/// 发布使用POST，撤销使用DELETE。
pub struct NotificationPublisher {
    receiver: mpsc::Receiver<Notification>,
    client: reqwest::Client,
    base_url: String,
    permits: Arc<Semaphore>,
}

impl NotificationPublisher {
    /// 运行投递循环，直到所有发送端关闭
    pub async fn run(mut self) {
        info!("Notification publisher started, endpoint {}", self.base_url);

        while let Some(notification) = self.receiver.recv().await {
            let permit = match self.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let client = self.client.clone();
            let base_url = self.base_url.clone();
            tokio::spawn(async move {
                if let Err(e) = deliver(&client, &base_url, &notification).await {
                    error!("Failed to deliver notification: {}", e);
                }
                drop(permit);
            });
        }

        info!("Notification publisher stopped");
    }

    /// 启动后台运行
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}

async fn deliver(client: &reqwest::Client, base_url: &str, notification: &Notification) -> Result<()> {
    let response = match notification {
        Notification::Publish { topic, payload } => {
            debug!("Publishing to {}", topic);
            client
                .post(format!("{}/pub/{}", base_url, topic))
                .body(payload.clone())
                .send()
                .await?
        }
        Notification::Unpublish { topic } => {
            debug!("Unpublishing {}", topic);
            client
                .delete(format!("{}/pub/{}", base_url, topic))
                .send()
                .await?
        }
    };

    if response.status().is_success() {
        Ok(())
    } else {
        Err(anyhow!(
            "pub/sub endpoint returned status {}",
            response.status()
        ))
    }
}
