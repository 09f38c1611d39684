// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// Minimal list entry returned by the gateway's paginated roster
/// endpoint. Full records are resolved separately, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonRef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl TypeKind {
    pub const ALL: [Self; 18] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Electric,
        Self::Grass,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Electric => "electric",
            Self::Grass => "grass",
            Self::Ice => "ice",
            Self::Fighting => "fighting",
            Self::Poison => "poison",
            Self::Ground => "ground",
            Self::Flying => "flying",
            Self::Psychic => "psychic",
            Self::Bug => "bug",
            Self::Rock => "rock",
            Self::Ghost => "ghost",
            Self::Dragon => "dragon",
            Self::Dark => "dark",
            Self::Steel => "steel",
            Self::Fairy => "fairy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "fire" => Some(Self::Fire),
            "water" => Some(Self::Water),
            "electric" => Some(Self::Electric),
            "grass" => Some(Self::Grass),
            "ice" => Some(Self::Ice),
            "fighting" => Some(Self::Fighting),
            "poison" => Some(Self::Poison),
            "ground" => Some(Self::Ground),
            "flying" => Some(Self::Flying),
            "psychic" => Some(Self::Psychic),
            "bug" => Some(Self::Bug),
            "rock" => Some(Self::Rock),
            "ghost" => Some(Self::Ghost),
            "dragon" => Some(Self::Dragon),
            "dark" => Some(Self::Dark),
            "steel" => Some(Self::Steel),
            "fairy" => Some(Self::Fairy),
            _ => None,
        }
    }

    /// Localized display label, matching the handheld UI copy.
    pub const fn label_pt(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Fire => "Fogo",
            Self::Water => "Água",
            Self::Electric => "Elétrico",
            Self::Grass => "Planta",
            Self::Ice => "Gelo",
            Self::Fighting => "Lutador",
            Self::Poison => "Venenoso",
            Self::Ground => "Terrestre",
            Self::Flying => "Voador",
            Self::Psychic => "Psíquico",
            Self::Bug => "Inseto",
            Self::Rock => "Pedra",
            Self::Ghost => "Fantasma",
            Self::Dragon => "Dragão",
            Self::Dark => "Sombrio",
            Self::Steel => "Aço",
            Self::Fairy => "Fada",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub hidden: bool,
}

/// Flattened base stats. The gateway's wire format carries these as a
/// tagged array; normalization collapses them so downstream code never
/// searches by stat name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

/// Canonical detail record. Both backend payload generations map into
/// this one shape at the gateway boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    pub height_dm: u32,
    pub weight_hg: u32,
    pub base_experience: u32,
    pub abilities: Vec<Ability>,
    pub stats: BaseStats,
    pub types: Vec<TypeKind>,
    pub artwork_url: String,
}

impl Pokemon {
    /// Primary type, used for related-record grouping.
    pub fn main_type(&self) -> Option<TypeKind> {
        self.types.first().copied()
    }

    pub fn has_type(&self, kind: TypeKind) -> bool {
        self.types.contains(&kind)
    }

    pub fn height_m(&self) -> f64 {
        f64::from(self.height_dm) / 10.0
    }

    pub fn weight_kg(&self) -> f64 {
        f64::from(self.weight_hg) / 10.0
    }
}
