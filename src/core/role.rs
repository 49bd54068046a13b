//! Player roles, stat categories and the role policy.
//!
//! The policy decides which categories a player may record. Categories that
//! do not apply to a role still exist in every record and stay at zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VolleyError;

/// Player role on court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Setter (passeur).
    #[serde(rename = "passeur")]
    Setter,
    /// Libero.
    #[serde(rename = "libero")]
    Libero,
    /// Receiver-attacker, outside hitter (R4).
    #[serde(rename = "r4")]
    ReceiverAttacker,
    /// Middle blocker (central).
    #[serde(rename = "central")]
    Middle,
    /// Opposite (pointu).
    #[serde(rename = "pointu")]
    Opposite,
}

impl Role {
    /// All roles, in the order offered at setup.
    pub const ALL: [Role; 5] = [
        Role::Setter,
        Role::Libero,
        Role::ReceiverAttacker,
        Role::Middle,
        Role::Opposite,
    ];

    /// Short identifier used in snapshots and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Role::Setter => "passeur",
            Role::Libero => "libero",
            Role::ReceiverAttacker => "r4",
            Role::Middle => "central",
            Role::Opposite => "pointu",
        }
    }

    /// Label printed in tables and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Setter => "Passeur",
            Role::Libero => "Libéro",
            Role::ReceiverAttacker => "R4",
            Role::Middle => "Central",
            Role::Opposite => "Pointu",
        }
    }

    /// Parse a role from its short id or English name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "passeur" | "setter" => Some(Role::Setter),
            "libero" | "libéro" => Some(Role::Libero),
            "r4" | "receiver-attacker" | "receiver_attacker" | "outside" => {
                Some(Role::ReceiverAttacker)
            }
            "central" | "middle" => Some(Role::Middle),
            "pointu" | "opposite" => Some(Role::Opposite),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = VolleyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| {
            VolleyError::setup(format!(
                "unknown role '{}' (expected one of: passeur, libero, r4, central, pointu)",
                s
            ))
        })
    }
}

/// Stat category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Service,
    Attack,
    Pass,
    Reception,
    Defense,
    Faults,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 6] = [
        Category::Service,
        Category::Attack,
        Category::Pass,
        Category::Reception,
        Category::Defense,
        Category::Faults,
    ];

    /// Identifier used on the command line and in JSON.
    pub fn id(&self) -> &'static str {
        match self {
            Category::Service => "service",
            Category::Attack => "attack",
            Category::Pass => "pass",
            Category::Reception => "reception",
            Category::Defense => "defense",
            Category::Faults => "faults",
        }
    }

    /// French label used in summaries and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Service => "Service",
            Category::Attack => "Attaque",
            Category::Pass => "Passe",
            Category::Reception => "Réception",
            Category::Defense => "Défense",
            Category::Faults => "Fautes",
        }
    }

    /// Parse a category id (case-insensitive). Accepts the French labels too.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "service" | "serve" => Some(Category::Service),
            "attack" | "attaque" => Some(Category::Attack),
            "pass" | "passe" => Some(Category::Pass),
            "reception" | "réception" => Some(Category::Reception),
            "defense" | "défense" | "defence" => Some(Category::Defense),
            "faults" | "fault" | "fautes" => Some(Category::Faults),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Whether a role records statistics in a category.
pub fn is_category_applicable(role: Role, category: Category) -> bool {
    match category {
        Category::Service => role != Role::Libero,
        Category::Attack => !matches!(role, Role::Setter | Role::Libero),
        Category::Reception => !matches!(role, Role::Setter | Role::Middle),
        Category::Defense => role != Role::Middle,
        Category::Pass | Category::Faults => true,
    }
}

/// Categories a role records, in canonical order.
pub fn applicable_categories(role: Role) -> Vec<Category> {
    Category::ALL
        .into_iter()
        .filter(|category| is_category_applicable(role, *category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_libero_does_not_serve() {
        assert!(!is_category_applicable(Role::Libero, Category::Service));
    }

    #[test]
    fn test_middle_does_not_receive_or_defend() {
        assert!(!is_category_applicable(Role::Middle, Category::Reception));
        assert!(!is_category_applicable(Role::Middle, Category::Defense));
        assert!(is_category_applicable(Role::Middle, Category::Attack));
    }

    #[test]
    fn test_setter_does_not_attack_or_receive() {
        assert!(!is_category_applicable(Role::Setter, Category::Attack));
        assert!(!is_category_applicable(Role::Setter, Category::Reception));
        assert!(is_category_applicable(Role::Setter, Category::Service));
        assert!(is_category_applicable(Role::Setter, Category::Defense));
    }

    #[test]
    fn test_receiver_attacker_records_everything() {
        for category in Category::ALL {
            assert!(is_category_applicable(Role::ReceiverAttacker, category));
        }
        assert_eq!(
            applicable_categories(Role::ReceiverAttacker),
            Category::ALL.to_vec()
        );
    }

    #[test]
    fn test_pass_and_faults_always_apply() {
        for role in Role::ALL {
            assert!(is_category_applicable(role, Category::Pass));
            assert!(is_category_applicable(role, Category::Faults));
        }
    }

    #[test]
    fn test_applicable_categories_libero() {
        assert_eq!(
            applicable_categories(Role::Libero),
            vec![
                Category::Pass,
                Category::Reception,
                Category::Defense,
                Category::Faults
            ]
        );
    }

    #[test]
    fn test_role_parse_aliases() {
        assert_eq!(Role::parse("r4"), Some(Role::ReceiverAttacker));
        assert_eq!(Role::parse("Receiver-Attacker"), Some(Role::ReceiverAttacker));
        assert_eq!(Role::parse("SETTER"), Some(Role::Setter));
        assert_eq!(Role::parse("central"), Some(Role::Middle));
        assert_eq!(Role::parse("opposite"), Some(Role::Opposite));
        assert_eq!(Role::parse("coach"), None);
        assert!("coach".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_uses_short_ids() {
        let json = serde_json::to_string(&Role::Setter).unwrap();
        assert_eq!(json, "\"passeur\"");
        let role: Role = serde_json::from_str("\"central\"").unwrap();
        assert_eq!(role, Role::Middle);
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::Libero.label(), "Libéro");
        assert_eq!(Role::ReceiverAttacker.to_string(), "R4");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("Defense"), Some(Category::Defense));
        assert_eq!(Category::parse("fautes"), Some(Category::Faults));
        assert_eq!(Category::parse("block"), None);
    }
}
