// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

pub mod config;
pub mod engine;
pub mod message;
pub mod prompt;
pub mod proxy;
pub mod stream;
