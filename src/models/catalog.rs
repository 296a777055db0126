//! Display names for the codes stored in preference and profile tags.

/// Specialization code -> display name
pub const SPECIALIZATIONS: &[(&str, &str)] = &[
    ("anxiety", "Anxiety Disorders"),
    ("depression", "Depression"),
    ("trauma", "Trauma & PTSD"),
    ("relationships", "Relationship Counseling"),
    ("addiction", "Addiction Recovery"),
    ("grief", "Grief & Loss"),
    ("eating_disorders", "Eating Disorders"),
    ("bipolar", "Bipolar Disorder"),
    ("adhd", "ADHD"),
    ("ocd", "OCD"),
    ("family", "Family Therapy"),
    ("couples", "Couples Therapy"),
    ("child", "Child Psychology"),
    ("adolescent", "Adolescent Therapy"),
];

/// Therapy approach code -> display name
pub const THERAPY_APPROACHES: &[(&str, &str)] = &[
    ("cbt", "Cognitive Behavioral Therapy"),
    ("dbt", "Dialectical Behavior Therapy"),
    ("emdr", "EMDR"),
    ("psychodynamic", "Psychodynamic"),
    ("humanistic", "Humanistic"),
    ("systemic", "Systemic"),
    ("gestalt", "Gestalt"),
    ("mindfulness", "Mindfulness-Based"),
    ("somatic", "Somatic Therapy"),
    ("art_therapy", "Art Therapy"),
    ("music_therapy", "Music Therapy"),
];

fn lookup<'a>(table: &'static [(&'static str, &'static str)], code: &'a str) -> &'a str {
    table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// Display name for a specialization code; unknown codes are returned as-is
pub fn specialization_label(code: &str) -> &str {
    lookup(SPECIALIZATIONS, code)
}

/// Display name for a therapy approach code; unknown codes are returned as-is
pub fn approach_label(code: &str) -> &str {
    lookup(THERAPY_APPROACHES, code)
}
