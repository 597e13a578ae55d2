// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod auth;
pub mod profile;
pub mod records;
pub mod income;
pub mod expenses;
pub mod summary;
pub mod exporter;
pub mod doctor;
pub mod config;
