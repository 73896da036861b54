// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::SubscriptionRequest;
use algorithm::calculate_distance;
use common::position::{Position, PositionSample};

/// Applies the interval and displacement filter of a [`SubscriptionRequest`].
///
/// Both filters are measured against the last delivered sample, the first
/// sample always passes.
#[derive(Clone, Debug)]
pub struct UpdateFilter {
    request: SubscriptionRequest,
    last_delivered: Option<PositionSample>,
}

impl UpdateFilter {
    pub fn new(request: SubscriptionRequest) -> Self {
        UpdateFilter {
            request,
            last_delivered: None,
        }
    }

    /// Returns `true` if `sample` shall be delivered and remembers it in that case.
    pub fn pass(&mut self, sample: &PositionSample) -> bool {
        if let Some(last) = &self.last_delivered {
            let elapsed_ms = sample.timestamp().saturating_sub(last.timestamp());
            if self.request.min_interval_ms > 0 && elapsed_ms < self.request.min_interval_ms as i64 {
                return false;
            }
            let displacement = calculate_distance(&Position::from(last), &Position::from(sample));
            if displacement < f64::from(self.request.min_displacement_m) {
                return false;
            }
        }
        self.last_delivered = Some(sample.clone());
        true
    }
}
