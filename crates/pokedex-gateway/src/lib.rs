// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use pokedex_app::{Ability, BaseStats, Pokemon, PokemonRef, TypeKind};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Shown in place of an insight whenever the gateway cannot produce one.
pub const INSIGHT_FALLBACK: &str =
    "O Professor Carvalho está ocupado no laboratório agora. Por favor, volte mais tarde!";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("gateway.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("gateway.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("gateway.base_url must use http or https, got {:?}", parsed.scheme());
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One page of the roster. The gateway serves either a bare array or
    /// the upstream `{ results: [...] }` envelope depending on version.
    pub fn list(&self, limit: u32, offset: u32) -> Result<Vec<PokemonRef>> {
        let response = self
            .http
            .get(format!(
                "{}/pokemon?limit={limit}&offset={offset}",
                self.base_url
            ))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: RawList = response.json().context("decode roster page")?;
        Ok(match parsed {
            RawList::Bare(refs) => refs,
            RawList::Envelope { results } => results,
        })
    }

    pub fn details(&self, name_or_id: &str) -> Result<Pokemon> {
        let key = name_or_id.trim().to_lowercase();
        if key.is_empty() {
            bail!("record name must not be empty");
        }

        let response = self
            .http
            .get(format!("{}/pokemon/{key}/details", self.base_url))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let raw: RawDetails = response
            .json()
            .with_context(|| format!("decode details for {key:?}"))?;
        raw.normalize()
    }

    /// Professor flavor text for a record. Never fails: any transport,
    /// status, or decode problem degrades to the fixed fallback line.
    pub fn insight(&self, name: &str) -> String {
        match self.try_insight(name) {
            Ok(text) => text,
            Err(error) => {
                log::warn!("insight for {name:?} unavailable: {error:#}");
                INSIGHT_FALLBACK.to_owned()
            }
        }
    }

    fn try_insight(&self, name: &str) -> Result<String> {
        let key = name.trim().to_lowercase();
        let response = self
            .http
            .get(format!("{}/pokemon/{key}/insight", self.base_url))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: InsightResponse = response.json().context("decode insight")?;
        if parsed.text.trim().is_empty() {
            bail!("gateway returned an empty insight");
        }
        Ok(parsed.text)
    }

    /// Reachability probe: the smallest roster request the gateway accepts.
    pub fn ping(&self) -> Result<()> {
        self.list(1, 0)?;
        Ok(())
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check the network or set gateway.base_url ({} )",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return anyhow!("gateway error ({}): {}", status.as_u16(), error);
    }

    if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        return anyhow!("gateway error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("gateway returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawList {
    Bare(Vec<PokemonRef>),
    Envelope { results: Vec<PokemonRef> },
}

#[derive(Debug, Deserialize)]
struct InsightResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

/// Type slots arrive slotted (`{ slot, type: { name } }`) from the older
/// gateway and as bare strings from the newer one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTypeSlot {
    Named(String),
    Slotted {
        #[serde(rename = "type")]
        kind: NamedResource,
    },
}

impl RawTypeSlot {
    fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Slotted { kind } => &kind.name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAbility {
    Named(String),
    Slotted {
        ability: NamedResource,
        #[serde(default)]
        is_hidden: bool,
    },
}

#[derive(Debug, Deserialize)]
struct RawStat {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
struct RawArtwork {
    front_default: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSpriteVariants {
    #[serde(rename = "official-artwork", default)]
    official_artwork: Option<RawArtwork>,
    #[serde(default)]
    home: Option<RawArtwork>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSprites {
    #[serde(default)]
    other: Option<RawSpriteVariants>,
    #[serde(default)]
    front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDetails {
    id: u32,
    name: String,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    weight: u32,
    #[serde(default)]
    base_experience: u32,
    #[serde(default)]
    abilities: Vec<RawAbility>,
    #[serde(default)]
    stats: Vec<RawStat>,
    types: Vec<RawTypeSlot>,
    #[serde(default)]
    sprites: Option<RawSprites>,
    #[serde(default)]
    image: Option<String>,
}

impl RawDetails {
    fn normalize(self) -> Result<Pokemon> {
        let mut types = Vec::with_capacity(self.types.len());
        for slot in &self.types {
            let name = slot.name();
            let kind = TypeKind::parse(name)
                .ok_or_else(|| anyhow!("record {:?} has unknown type {name:?}", self.name))?;
            types.push(kind);
        }

        let abilities = self
            .abilities
            .into_iter()
            .map(|raw| match raw {
                RawAbility::Named(name) => Ability {
                    name,
                    hidden: false,
                },
                RawAbility::Slotted { ability, is_hidden } => Ability {
                    name: ability.name,
                    hidden: is_hidden,
                },
            })
            .collect();

        let by_name: HashMap<&str, u32> = self
            .stats
            .iter()
            .map(|stat| (stat.stat.name.as_str(), stat.base_stat))
            .collect();
        let stat = |name: &str| by_name.get(name).copied().unwrap_or(0);
        let stats = BaseStats {
            hp: stat("hp"),
            attack: stat("attack"),
            defense: stat("defense"),
            special_attack: stat("special-attack"),
            special_defense: stat("special-defense"),
            speed: stat("speed"),
        };

        let artwork_url = self
            .image
            .filter(|url| !url.is_empty())
            .or_else(|| {
                let sprites = self.sprites.as_ref()?;
                let other = sprites.other.as_ref()?;
                other
                    .official_artwork
                    .as_ref()
                    .and_then(|art| art.front_default.clone())
                    .or_else(|| other.home.as_ref().and_then(|art| art.front_default.clone()))
            })
            .or_else(|| self.sprites.as_ref()?.front_default.clone())
            .unwrap_or_default();

        Ok(Pokemon {
            id: self.id,
            name: self.name.to_lowercase(),
            height_dm: self.height,
            weight_hg: self.weight,
            base_experience: self.base_experience,
            abilities,
            stats,
            types,
            artwork_url,
        })
    }
}
