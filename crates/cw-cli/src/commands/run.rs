use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use cw_core::{Cast, CastId, tally_votes};
use cw_season::event::SeasonEventKind;
use cw_season::{PostSeasonStats, Season, SeasonConfig, TemplateNarrator};

pub fn run(seed: &str, cast_arg: &str, verbose: bool, json: bool) -> Result<(), String> {
    let ids: Vec<CastId> = cast_arg
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(CastId::new)
        .collect();
    if ids.is_empty() {
        return Err("no cast members given".to_string());
    }
    let cast = Cast::new(ids).map_err(|e| e.to_string())?;

    let mut season =
        Season::new(seed, cast, SeasonConfig::default()).map_err(|e| e.to_string())?;
    season
        .run_to_completion(&mut TemplateNarrator)
        .map_err(|e| e.to_string())?;
    let stats = PostSeasonStats::compute(&season);

    if json {
        let payload = serde_json::json!({
            "season": season,
            "stats": stats,
        });
        let out = serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    // Header
    println!(
        "  {} {}",
        "Season".bold(),
        format!(
            "(seed={seed}, cast={}, rounds={})",
            season.cast().len(),
            season.rounds().len()
        )
        .dimmed()
    );
    println!();

    // Round table
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Round", "Trial", "Immunity", "Eliminated", "Votes"]);
    for summary in season.rounds() {
        let counts = tally_votes(&summary.votes);
        let against = counts.get(&summary.eliminated).copied().unwrap_or(0);
        let eliminated = if summary.forced_tie_break {
            format!("{} (tie-break)", summary.eliminated)
        } else {
            summary.eliminated.to_string()
        };
        table.add_row(vec![
            summary.round_number.to_string(),
            summary.trial.name.clone(),
            summary
                .trial
                .winners
                .iter()
                .map(CastId::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            eliminated,
            format!("{against}/{}", summary.votes.len()),
        ]);
    }
    println!("{table}");
    println!();

    // Finale
    let finalists = season
        .finalists()
        .iter()
        .map(CastId::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    println!("  Finalists: {finalists}");
    println!("  Jury: {} members", season.jury().len());
    if let Some(champion) = season.champion() {
        println!("  {} {}", "Champion:".bold(), champion.to_string().green().bold());
    }
    println!();

    // Awards
    println!("  {}", "Awards".bold().underline());
    match &stats.most_loyal {
        Some(a) => println!("  Most loyal: {} ({}/{} with the bloc)", a.id, a.matched, a.total),
        None => println!("  Most loyal: —"),
    }
    match &stats.biggest_flip {
        Some(a) => println!(
            "  Biggest flip: {} (round {}, {} -> {})",
            a.id, a.round, a.intended, a.actual
        ),
        None => println!("  Biggest flip: —"),
    }
    match &stats.social_butterfly {
        Some(a) => println!("  Social butterfly: {} ({} alliances)", a.id, a.alliance_count),
        None => println!("  Social butterfly: —"),
    }
    match &stats.underdog {
        Some(a) => println!(
            "  Underdog: {} (targeted round {}, lasted {} more)",
            a.id, a.first_targeted_round, a.rounds_survived
        ),
        None => println!("  Underdog: —"),
    }

    // Event log
    if verbose {
        println!();
        println!("  {}", "Event Log".bold().underline());
        for event in season.log().events() {
            let label = format!("[round {:>2}]", event.round).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {label} {desc}");
        }
    }

    Ok(())
}

fn colorize_event(kind: &SeasonEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SeasonEventKind::Eliminated { .. } => description.red().bold(),
        SeasonEventKind::TieBreakForced { .. } => description.red(),
        SeasonEventKind::TrialWon { .. } => description.green(),
        SeasonEventKind::ChampionCrowned { .. } => description.green().bold(),
        SeasonEventKind::AllianceFormed { .. } => description.cyan(),
        SeasonEventKind::AllianceDissolved { .. } => description.yellow(),
        SeasonEventKind::AdvantagePlayed { .. } => description.magenta(),
        SeasonEventKind::VoteCast { .. } | SeasonEventKind::JuryVoteCast { .. } => {
            description.blue()
        }
        SeasonEventKind::PhaseEntered { .. } => description.dimmed(),
        SeasonEventKind::NarratorLine { .. }
        | SeasonEventKind::NarratorFallback { .. } => description.normal(),
    }
}
