// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 通知服务特质
///
/// 发布订阅扇出的出口。发布是"发出即忘"的：实现不得阻塞调用方，
/// 也不向调用方报告投递结果。
pub trait NotificationService: Send + Sync {
    /// 向主题发布消息
    ///
    /// # 参数
    ///
    /// * `topic` - 主题名称
    /// * `payload` - 已编码的消息体
    fn publish(&self, topic: &str, payload: String);

    /// 撤销主题（断开该主题的全部订阅者）
    fn unpublish(&self, topic: &str);
}
