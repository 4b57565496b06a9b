// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Data models for the portal.

pub mod facility;
pub mod profile;
pub mod registration;
pub mod role;

pub use facility::{Facility, FacilityStatus, NewFacility};
pub use profile::{ProfileRow, StaffStatus, StaffUser, UserProfile};
pub use registration::{
    DeveloperRegistrationData, FacilityRegistrationData, RegistrationRequest, RequestKind,
    RequestStatus,
};
pub use role::Role;
