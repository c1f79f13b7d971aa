// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::notification_service::NotificationService;
use crate::infrastructure::services::notification_service_impl::Notification;
use parking_lot::Mutex;

/// 记录型通知服务
///
/// 只在内存中记录发布的消息，供测试断言和无发布端点的本地运行使用
#[derive(Default)]
pub struct RecordingNotificationService {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全部已记录的通知
    pub fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    /// 发布到指定主题的消息体
    pub fn published_to(&self, topic: &str) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Publish { topic: t, payload } if t == topic => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    /// 被撤销的主题
    pub fn unpublished(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Unpublish { topic } => Some(topic.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl NotificationService for RecordingNotificationService {
    fn publish(&self, topic: &str, payload: String) {
        self.sent.lock().push(Notification::Publish {
            topic: topic.to_string(),
            payload,
        });
    }

    fn unpublish(&self, topic: &str) {
        self.sent.lock().push(Notification::Unpublish {
            topic: topic.to_string(),
        });
    }
}
