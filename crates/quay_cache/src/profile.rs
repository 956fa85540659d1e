//! Which targets a cache profile applies to.
//!
//! Device and OS only change the binary for artifacts built per platform
//! variant (xcframeworks) and for test bundles, which embed a run destination.
//! Every other target hashes the same with or without a profile.

use quay_common::HashComposer;
use quay_config::CacheProfile;
use quay_graph::Product;

use crate::output::CacheOutputType;

const NO_PROFILE: &str = "no-profile";
const PROFILE: &str = "profile";

/// Returns `true` if the profile's device and OS enter the hash of a
/// `product` target built as `output_type`.
pub fn is_profile_sensitive(product: Product, output_type: CacheOutputType) -> bool {
    output_type == CacheOutputType::Xcframework || product.is_test_bundle()
}

/// Writes the profile discriminant of one target.
///
/// The profile name is never written.
pub(crate) fn write_discriminant(
    composer: &mut HashComposer,
    product: Product,
    output_type: CacheOutputType,
    profile: Option<&CacheProfile>,
) {
    match profile {
        Some(profile) if is_profile_sensitive(product, output_type) => {
            composer
                .write_str(PROFILE)
                .write_opt_str(profile.device.as_deref())
                .write_opt_str(profile.os.as_deref());
        }
        _ => {
            composer.write_str(NO_PROFILE);
        }
    }
}
