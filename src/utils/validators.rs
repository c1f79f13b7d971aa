// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use once_cell::sync::Lazy;
use regex::Regex;

static IPV4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}$").expect("Failed to compile IPv4 regex")
});

// RFC-1035 hostname labels
static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(([a-zA-Z]|[a-zA-Z][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)*([A-Za-z]|[A-Za-z][A-Za-z0-9\-]*[A-Za-z0-9])$",
    )
    .expect("Failed to compile hostname regex")
});

/// 检查字符串是否为IPv4地址（仅校验形式）
///
/// # 参数
///
/// * `value` - 待检查字符串
///
/// # 返回值
///
/// 如果形如 `a.b.c.d` 则返回true
pub fn is_ipv4(value: &str) -> bool {
    IPV4_RE.is_match(value)
}

/// 检查字符串是否为合法主机名
pub fn is_hostname(value: &str) -> bool {
    HOSTNAME_RE.is_match(value)
}

/// 检查字符串是否为IPv4地址或主机名
pub fn is_ip_or_hostname(value: &str) -> bool {
    is_ipv4(value) || is_hostname(value)
}

/// 检查字符串是否具有UUID的外形（36个字符，4个连字符）
pub fn looks_like_uuid(value: &str) -> bool {
    value.len() == 36 && value.matches('-').count() == 4
}
