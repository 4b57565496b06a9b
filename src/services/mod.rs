// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Services module - business logic layer.

pub mod approval;
pub mod credentials;
pub mod notify;
pub mod staff;

pub use approval::{ApprovalOutcome, ApprovalParams, ApprovalService};
pub use notify::WelcomeMailer;
pub use staff::{CreatedStaffUser, StaffParams, StaffService};
