// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub page: u64,
    pub pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
    pub total: u64,
    pub results: Vec<T>,
}

/// 计算分页窗口
///
/// # 参数
///
/// * `page` - 请求页码，截断到 `[1, 总页数]`
/// * `per_page` - 每页条数
/// * `total` - 总条数
///
/// # 返回值
///
/// 返回 `(当前页, 总页数, 起始下标, 结束下标)`，下标已截断到 `total` 以内
pub fn paginate(page: u64, per_page: u64, total: u64) -> (u64, u64, usize, usize) {
    let per_page = per_page.max(1);
    let pages = total.div_ceil(per_page);
    let page = page.clamp(1, pages.max(1));
    let start = ((page - 1) * per_page).min(total);
    let end = (start + per_page).min(total);
    (page, pages, start as usize, end as usize)
}

impl<T> Page<T> {
    /// 对已排序的全集切出一页
    pub fn slice(items: &[String], page: u64, per_page: u64) -> (Page<T>, Vec<String>) {
        let total = items.len() as u64;
        let (page, pages, start, end) = paginate(page, per_page, total);
        let window = items[start..end].to_vec();
        (
            Page {
                page,
                pages,
                has_prev: page > 1,
                has_next: page < pages,
                total,
                results: Vec::new(),
            },
            window,
        )
    }

    pub fn with_results(mut self, results: Vec<T>) -> Self {
        self.results = results;
        self
    }
}
