use std::collections::BTreeMap;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use ouk::check::EndState;
use ouk::config::Rules;
use ouk::controller::MatchController;
use ouk::hooks::Hooks;

const DEFAULT_GAMES: usize = 20;
const DEFAULT_MAX_PLIES: usize = 300;

struct Args {
    games: usize,
    seed: u64,
    max_plies: usize,
    rules: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args { games: DEFAULT_GAMES, seed: 0, max_plies: DEFAULT_MAX_PLIES, rules: None };
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = || it.next().ok_or_else(|| format!("{flag} needs a value"));
        match flag.as_str() {
            "--games" => args.games = value()?.parse().map_err(|e| format!("--games: {e}"))?,
            "--seed" => args.seed = value()?.parse().map_err(|e| format!("--seed: {e}"))?,
            "--max-plies" => args.max_plies = value()?.parse().map_err(|e| format!("--max-plies: {e}"))?,
            "--rules" => args.rules = Some(value()?),
            other => return Err(format!("unknown argument {other}")),
        }
    }
    Ok(args)
}

#[derive(Serialize, Default)]
struct Summary {
    games: usize,
    seed: u64,
    results: BTreeMap<String, usize>,
    total_plies: usize,
    promotions: usize,
    captures: usize,
    checks: usize,
}

fn play_one(rules: Rules, rng: &mut StdRng, max_plies: usize, summary: &mut Summary) -> &'static str {
    let mut game = MatchController::new(rules, Hooks::default());
    for ply in 0..max_plies {
        let moves = game.legal_moves();
        let Some(&mv) = moves.choose(rng) else {
            break;
        };
        let (outcome, report) = match game.play_move(mv.piece, mv.to) {
            Ok(played) => played,
            Err(err) => {
                debug!("ply {ply}: generated move rejected: {err}");
                break;
            }
        };
        summary.total_plies += 1;
        summary.captures += usize::from(outcome.captured.is_some());
        summary.promotions += usize::from(outcome.promoted.is_some());
        match report.end_state {
            EndState::Check => summary.checks += 1,
            EndState::Checkmate => {
                return match report.winner {
                    Some(ouk::Side::White) => "white_mates",
                    _ => "black_mates",
                }
            }
            EndState::Stalemate => return "stalemate",
            EndState::None => {}
        }
    }
    "unfinished"
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("usage: playout [--games N] [--seed S] [--max-plies M] [--rules FILE]");
            std::process::exit(2);
        }
    };

    let rules = match &args.rules {
        Some(path) => {
            let loaded = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|text| Rules::from_json(&text).map_err(|e| e.to_string()));
            match loaded {
                Ok(rules) => rules,
                Err(msg) => {
                    eprintln!("{path}: {msg}");
                    std::process::exit(1);
                }
            }
        }
        None => Rules::default(),
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut summary = Summary { games: args.games, seed: args.seed, ..Summary::default() };
    for game in 0..args.games {
        let result = play_one(rules.clone(), &mut rng, args.max_plies, &mut summary);
        info!("game {game}: {result}");
        *summary.results.entry(result.to_string()).or_default() += 1;
    }

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to serialize summary: {err}"),
    }
}
