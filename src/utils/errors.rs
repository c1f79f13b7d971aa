// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::kv_store::StoreError;
use thiserror::Error;
use tracing::error;

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),

    #[error("内部错误: {0}")]
    InternalError(String),
}

/// 读取失败时记录日志并回退到零值
///
/// 服务层对单条记录的读取失败一律按"未找到"处理，
/// 只有扫描入口的顶层列举才会向上传播错误。
pub trait LogFallback<T> {
    fn or_log_default(self, context: &str) -> T;
}

impl<T: Default> LogFallback<T> for Result<T, StoreError> {
    fn or_log_default(self, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(e) => {
                error!("{}: {}", context, e);
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_log_default() {
        let ok: Result<u64, StoreError> = Ok(3);
        assert_eq!(ok.or_log_default("ok"), 3);

        let failed: Result<Option<String>, StoreError> =
            Err(StoreError::Other("connection reset".to_string()));
        assert_eq!(failed.or_log_default("get"), None);
    }
}
