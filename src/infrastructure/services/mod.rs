// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施服务实现
///
/// 包括HTTP发布订阅通知和记录型通知
pub mod notification_service_impl;
pub mod recording_notification_service;
