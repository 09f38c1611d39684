// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Pokemon, TypeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TypeKind),
}

impl TypeFilter {
    /// Next filter in the confirm-button rotation:
    /// all -> each type in roster order -> all.
    pub fn cycle(self) -> Self {
        match self {
            Self::All => Self::Only(TypeKind::ALL[0]),
            Self::Only(kind) => {
                let position = TypeKind::ALL.iter().position(|entry| *entry == kind);
                match position {
                    Some(index) if index + 1 < TypeKind::ALL.len() => {
                        Self::Only(TypeKind::ALL[index + 1])
                    }
                    _ => Self::All,
                }
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "TODOS",
            Self::Only(kind) => kind.label_pt(),
        }
    }

    pub fn matches(self, pokemon: &Pokemon) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => pokemon.has_type(kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Numeric id, ascending.
    #[default]
    NationalId,
    /// Health stat, descending.
    Health,
    /// Base experience, descending.
    Experience,
    /// Name, lexicographic ascending.
    Name,
}

impl SortMode {
    pub const ALL: [Self; 4] = [Self::NationalId, Self::Health, Self::Experience, Self::Name];

    pub const fn label(self) -> &'static str {
        match self {
            Self::NationalId => "Nº",
            Self::Health => "HP",
            Self::Experience => "PODER",
            Self::Name => "NOME",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" | "numero" => Some(Self::NationalId),
            "hp" => Some(Self::Health),
            "poder" => Some(Self::Experience),
            "nome" => Some(Self::Name),
            _ => None,
        }
    }

    pub fn cycle(self) -> Self {
        let position = Self::ALL
            .iter()
            .position(|entry| *entry == self)
            .unwrap_or(0);
        Self::ALL[(position + 1) % Self::ALL.len()]
    }
}

/// Current search/filter/sort inputs. The derived view is recomputed
/// from scratch on every change; the accumulated list is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewCriteria {
    pub search: String,
    pub type_filter: TypeFilter,
    pub sort: SortMode,
}

impl ViewCriteria {
    pub fn is_default(&self) -> bool {
        self.search.is_empty()
            && self.type_filter == TypeFilter::All
            && self.sort == SortMode::NationalId
    }

    pub fn reset(&mut self) {
        self.search.clear();
        self.type_filter = TypeFilter::All;
        self.sort = SortMode::NationalId;
    }
}

/// Pure derivation of the visible roster. Name matching is a
/// case-insensitive substring test; sorts are stable.
pub fn derive_view<'a>(records: &'a [Pokemon], criteria: &ViewCriteria) -> Vec<&'a Pokemon> {
    let needle = criteria.search.to_lowercase();
    let mut view: Vec<&Pokemon> = records
        .iter()
        .filter(|pokemon| needle.is_empty() || pokemon.name.to_lowercase().contains(&needle))
        .filter(|pokemon| criteria.type_filter.matches(pokemon))
        .collect();

    match criteria.sort {
        SortMode::NationalId => view.sort_by_key(|pokemon| pokemon.id),
        SortMode::Health => view.sort_by(|a, b| b.stats.hp.cmp(&a.stats.hp)),
        SortMode::Experience => view.sort_by(|a, b| b.base_experience.cmp(&a.base_experience)),
        SortMode::Name => view.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    view
}
