use crate::models::TherapistProfile;

/// Check if a therapist can be recommended at all
///
/// Only therapists that accept new clients and whose account is active are
/// eligible.
#[inline]
pub fn is_eligible(profile: &TherapistProfile) -> bool {
    profile.is_accepting_clients && profile.is_active
}

/// Keep eligible therapists, preserving enumeration order
pub fn eligible_candidates(candidates: Vec<TherapistProfile>) -> Vec<TherapistProfile> {
    candidates.into_iter().filter(is_eligible).collect()
}
