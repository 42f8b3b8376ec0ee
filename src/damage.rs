//! Damage tooltip estimate.
//!
//! Reproduces the number the game client prints for a skill's damage fact:
//! `ceil(hits * round(base * 1000 * multiplier / 2597))`, where `base` depends
//! on the wielded weapon and `round` ties to even.

// Base weapon strength used when the skill has no weapon or an unlisted one.
pub const DEFAULT_BASE_DAMAGE: f64 = 690.5;

// Armor value the tooltip formula divides by.
const TOOLTIP_ARMOR: f64 = 2597.0;

const WEAPON_BUCKETS: [(f64, &[&str]); 7] = [
    (
        952.5,
        &[
            "axe", "dagger", "mace", "pistol", "scepter", "spear", "trident", "speargun",
            "aquatic", "shortbow", "sword",
        ],
    ),
    (857.5, &["focus", "shield", "torch"]),
    (857.0, &["warhorn"]),
    (1047.5, &["greatsword"]),
    (1048.0, &["staff", "hammer"]),
    (1000.0, &["longbow"]),
    (1095.5, &["rifle"]),
];

/// Looks up the base damage for a weapon type, case-insensitively.
pub fn base_damage(weapon_type: Option<&str>) -> f64 {
    let Some(weapon) = weapon_type else {
        return DEFAULT_BASE_DAMAGE;
    };
    let weapon = weapon.to_lowercase();
    WEAPON_BUCKETS
        .iter()
        .find(|(_, weapons)| weapons.contains(&weapon.as_str()))
        .map(|(base, _)| *base)
        .unwrap_or(DEFAULT_BASE_DAMAGE)
}

pub fn estimate_damage(weapon_type: Option<&str>, hit_count: u32, multiplier: f64) -> u64 {
    let per_hit = (base_damage(weapon_type) * 1000.0 * multiplier / TOOLTIP_ARMOR).round_ties_even();
    (f64::from(hit_count) * per_hit).ceil().max(0.0) as u64
}
