// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存模块
///
/// 提供键值存储的实现
/// 包括Redis客户端和用于单机运行与测试的内存存储
pub mod memory_store;
pub mod redis_client;
