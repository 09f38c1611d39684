// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;

use anyhow::{Context, Result, anyhow};
use config::Config;
use pokedex_app::{
    Narrator, Pokemon, SortMode, TypeFilter, TypeKind, UnsupportedSpeech, ViewCriteria,
    derive_view, strip_markup,
};
use pokedex_fetch::{FetchCache, LoadOutcome, PageSession};
use pokedex_gateway::Client;
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `pokedex --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let client = Client::new(config.gateway_base_url(), config.gateway_timeout()?)
        .with_context(|| {
            format!(
                "invalid [gateway] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?;

    if options.check_only {
        client.ping().context("gateway reachability check")?;
        println!("gateway {} is reachable", config.gateway_base_url());
        return Ok(());
    }

    let cache = FetchCache::new(client);
    if let Some(name) = &options.lookup {
        return lookup(&cache, &config, name);
    }

    let mut session = PageSession::new(cache);
    session.set_prefetch(config.prefetch());
    session.set_detail_concurrency(config.detail_concurrency());
    browse(&mut session, &options)
}

fn lookup(cache: &FetchCache<Client>, config: &Config, name: &str) -> Result<()> {
    let pokemon = cache
        .detail(name)
        .with_context(|| format!("fetch details for {name:?}"))?;
    print_detail(&pokemon);

    let insight = cache.insight(&pokemon.name);
    println!();
    println!("{}", strip_markup(&insight));

    if config.speech_enabled() {
        let narrator = Narrator::new(UnsupportedSpeech);
        narrator.toggle(&insight)?;
    }
    Ok(())
}

fn browse(session: &mut PageSession<Client>, options: &CliOptions) -> Result<()> {
    session.load_initial().context("load initial page")?;

    if options.crawl_all {
        loop {
            match session.load_more().context("load next page")? {
                LoadOutcome::Appended(count) => log::info!("appended {count} records"),
                LoadOutcome::Exhausted | LoadOutcome::Skipped => break,
            }
        }
    }

    let state = session.state();
    let view = derive_view(&state.detailed, &options.criteria);
    for pokemon in &view {
        println!(
            "#{:04} {:<14} {:<20} HP:{:>3} PODER:{:>3}",
            pokemon.id,
            pokemon.name,
            type_labels(pokemon),
            pokemon.stats.hp,
            pokemon.base_experience,
        );
    }

    let suffix = if state.has_more { " (more available)" } else { "" };
    println!(
        "{} of {} records shown{suffix}",
        view.len(),
        state.detailed.len()
    );
    Ok(())
}

fn print_detail(pokemon: &Pokemon) {
    println!("#{:04} {}", pokemon.id, pokemon.name);
    println!("  tipo:    {}", type_labels(pokemon));
    println!("  altura:  {:.1} m", pokemon.height_m());
    println!("  peso:    {:.1} kg", pokemon.weight_kg());
    println!("  poder:   {}", pokemon.base_experience);
    let stats = &pokemon.stats;
    println!(
        "  stats:   PV {} / Ataque {} / Defesa {} / Atq.Esp {} / Def.Esp {} / Velocidade {}",
        stats.hp, stats.attack, stats.defense, stats.special_attack, stats.special_defense,
        stats.speed
    );
    for ability in &pokemon.abilities {
        let marker = if ability.hidden { " (oculta)" } else { "" };
        println!("  habilidade: {}{marker}", ability.name);
    }
}

fn type_labels(pokemon: &Pokemon) -> String {
    pokemon
        .types
        .iter()
        .map(|kind| kind.label_pt())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    crawl_all: bool,
    show_help: bool,
    lookup: Option<String>,
    criteria: ViewCriteria,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        crawl_all: false,
        show_help: false,
        lookup: None,
        criteria: ViewCriteria::default(),
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--all" => {
                options.crawl_all = true;
            }
            "--search" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--search requires a term"))?;
                options.criteria.search = value.as_ref().to_owned();
            }
            "--type" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--type requires a type name"))?;
                options.criteria.type_filter = parse_type_filter(value.as_ref())?;
            }
            "--sort" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--sort requires a mode"))?;
                options.criteria.sort = SortMode::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!("unknown sort mode {:?}; use id, hp, poder, or nome", value.as_ref())
                })?;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            name if !name.starts_with('-') && options.lookup.is_none() => {
                options.lookup = Some(name.to_owned());
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn parse_type_filter(value: &str) -> Result<TypeFilter> {
    if value.eq_ignore_ascii_case("todos") || value.eq_ignore_ascii_case("all") {
        return Ok(TypeFilter::All);
    }
    TypeKind::parse(value)
        .map(TypeFilter::Only)
        .ok_or_else(|| anyhow!("unknown type {value:?}; use an English type name or \"todos\""))
}

fn print_help() {
    println!("pokedex (Rust)");
    println!("  <name>                   Show one record plus the professor's insight");
    println!("  --all                    Crawl every page instead of just the first");
    println!("  --search <term>          Filter the listing by name substring");
    println!("  --type <name>            Filter the listing by type (or \"todos\")");
    println!("  --sort <mode>            Sort by id, hp, poder, or nome");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config + gateway reachability");
    println!("  --help                   Show this help");
}
