// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use pokedex_app::{Ability, BaseStats, Pokemon, PokemonRef, TypeKind};
use pokedex_fetch::Gateway;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

const SPECIES: [&str; 36] = [
    "bulbasaur",
    "ivysaur",
    "venusaur",
    "charmander",
    "charmeleon",
    "charizard",
    "squirtle",
    "wartortle",
    "blastoise",
    "caterpie",
    "metapod",
    "butterfree",
    "weedle",
    "kakuna",
    "beedrill",
    "pidgey",
    "pidgeotto",
    "pidgeot",
    "rattata",
    "raticate",
    "spearow",
    "fearow",
    "ekans",
    "arbok",
    "pikachu",
    "raichu",
    "sandshrew",
    "sandslash",
    "nidoran-f",
    "nidorina",
    "nidoqueen",
    "nidoran-m",
    "nidorino",
    "nidoking",
    "clefairy",
    "clefable",
];

fn species_name(id: u32) -> String {
    SPECIES
        .get(id as usize - 1)
        .map(|name| (*name).to_owned())
        .unwrap_or_else(|| format!("specimen-{id}"))
}

/// Deterministic record: stats and type derive from the id so tests can
/// predict sort orders without fixture files.
pub fn sample_pokemon(id: u32) -> Pokemon {
    let kind = TypeKind::ALL[(id as usize - 1) % TypeKind::ALL.len()];
    Pokemon {
        id,
        name: species_name(id),
        height_dm: 4 + id % 10,
        weight_hg: 60 + id * 3,
        base_experience: 50 + (id * 7) % 200,
        abilities: vec![Ability {
            name: format!("ability-{id}"),
            hidden: false,
        }],
        stats: BaseStats {
            hp: 30 + (id * 5) % 100,
            attack: 40 + (id * 3) % 80,
            defense: 40 + (id * 2) % 80,
            special_attack: 35 + id % 90,
            special_defense: 35 + (id * 4) % 90,
            speed: 45 + (id * 6) % 75,
        },
        types: vec![kind],
        artwork_url: format!("https://img.example/{id}.png"),
    }
}

pub fn sample_roster(count: u32) -> Vec<Pokemon> {
    (1..=count).map(sample_pokemon).collect()
}

/// In-memory gateway over a fixed roster, with per-key call counters,
/// injectable failures, and an optional per-call delay for exercising
/// the single-flight window.
pub struct FakeGateway {
    roster: Vec<Pokemon>,
    calls: Mutex<HashMap<String, usize>>,
    fail_details: Mutex<HashSet<String>>,
    detail_delay: Duration,
}

impl FakeGateway {
    pub fn new(roster: Vec<Pokemon>) -> Self {
        Self {
            roster,
            calls: Mutex::new(HashMap::new()),
            fail_details: Mutex::new(HashSet::new()),
            detail_delay: Duration::ZERO,
        }
    }

    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = delay;
        self
    }

    /// Make `details(name)` fail until `clear_failures` is called.
    pub fn fail_detail(&self, name: &str) {
        lock(&self.fail_details).insert(name.to_lowercase());
    }

    pub fn clear_failures(&self) {
        lock(&self.fail_details).clear();
    }

    pub fn calls_for(&self, key: &str) -> usize {
        lock(&self.calls).get(key).copied().unwrap_or(0)
    }

    pub fn detail_calls(&self, name: &str) -> usize {
        self.calls_for(&format!("detail:{}", name.to_lowercase()))
    }

    pub fn insight_calls(&self, name: &str) -> usize {
        self.calls_for(&format!("insight:{}", name.to_lowercase()))
    }

    pub fn list_calls(&self, limit: u32, offset: u32) -> usize {
        self.calls_for(&format!("list:{limit}:{offset}"))
    }

    pub fn total_detail_calls(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|(key, _)| key.starts_with("detail:"))
            .map(|(_, count)| count)
            .sum()
    }

    fn record(&self, key: String) {
        *lock(&self.calls).entry(key).or_insert(0) += 1;
    }
}

impl Gateway for FakeGateway {
    fn list(&self, limit: u32, offset: u32) -> Result<Vec<PokemonRef>> {
        self.record(format!("list:{limit}:{offset}"));
        let start = (offset as usize).min(self.roster.len());
        let end = (start + limit as usize).min(self.roster.len());
        Ok(self.roster[start..end]
            .iter()
            .map(|pokemon| PokemonRef {
                name: pokemon.name.clone(),
                url: format!("https://gw.example/pokemon/{}", pokemon.id),
            })
            .collect())
    }

    fn details(&self, name: &str) -> Result<Pokemon> {
        let key = name.trim().to_lowercase();
        self.record(format!("detail:{key}"));
        if !self.detail_delay.is_zero() {
            thread::sleep(self.detail_delay);
        }
        if lock(&self.fail_details).contains(&key) {
            bail!("injected failure for {key:?}");
        }
        match self.roster.iter().find(|pokemon| pokemon.name == key) {
            Some(pokemon) => Ok(pokemon.clone()),
            None => bail!("no such record {key:?}"),
        }
    }

    fn insight(&self, name: &str) -> String {
        let key = name.trim().to_lowercase();
        self.record(format!("insight:{key}"));
        format!("O Professor diz: {key} é um Pokémon notável.")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
