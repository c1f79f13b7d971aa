// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod api_tests;
pub mod dispatch_redirect_test;
pub mod geolocation_test;
pub mod helpers;
pub mod publisher_test;
pub mod redis_store_test;
pub mod worker_flow_test;
