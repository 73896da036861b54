// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::provider::ProviderId;

/// Errors that are reported to the consumer of a location session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// No usable provider exists or the active provider became unavailable.
    #[error("Location services are disabled")]
    ServiceDisabled,

    /// The requested accuracy profile or the tracking options are malformed.
    #[error("Invalid accuracy profile: {0}")]
    InvalidProfile(String),
}

/// Faults of the platform location service.
///
/// These never leave a session, they are reported as [`LocationError::ServiceDisabled`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Location service is not available")]
    Unavailable,

    #[error("Failed to bind the location service: {0}")]
    Binding(String),

    #[error("Unknown location provider {0}")]
    UnknownProvider(ProviderId),
}

impl From<ServiceError> for LocationError {
    fn from(_: ServiceError) -> Self {
        LocationError::ServiceDisabled
    }
}
