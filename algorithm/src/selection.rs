// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::provider::ProviderId;
use std::collections::BTreeSet;

/// Applies the fixed provider preference to a capability based selection.
///
/// The network provider is taken whenever it is enabled, otherwise the
/// satellite provider. Only if neither is enabled the `capability_match` is
/// used.
///
/// # Arguments
///
/// * `enabled` - The currently enabled providers.
/// * `capability_match` - The provider that matched the requested criteria, if any.
pub fn prefer_provider(
    enabled: &BTreeSet<ProviderId>,
    capability_match: Option<ProviderId>,
) -> Option<ProviderId> {
    [ProviderId::network(), ProviderId::gps()]
        .into_iter()
        .find(|preferred| enabled.contains(preferred))
        .or(capability_match)
}
