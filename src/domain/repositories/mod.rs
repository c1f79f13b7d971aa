// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义领域层依赖的存储抽象，具体实现由基础设施层提供：
/// - 键值存储（kv_store）：Redis 与内存两种实现共享同一契约
pub mod kv_store;
