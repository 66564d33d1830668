use colored::Colorize;

use cw_season::reveal::TickOutcome;
use cw_season::{RevealConfig, RevealSequencer, RevealSpeed};

pub fn run(votes: usize, speed_arg: &str) -> Result<(), String> {
    let speed = parse_speed(speed_arg)?;
    let mut sequencer = RevealSequencer::new(votes, RevealConfig::default());
    sequencer.set_speed(speed);

    println!(
        "  {} {}",
        "Reveal trace".bold(),
        format!(
            "({votes} votes, speed={speed_arg}, interval={}ms)",
            sequencer.effective_interval_ms()
        )
        .dimmed()
    );

    if votes == 0 {
        println!("  nothing to reveal");
        return Ok(());
    }

    let interval = sequencer.effective_interval_ms();
    let mut now = 0;
    let mut guard = 0;
    while !sequencer.is_complete() && guard < votes * 2 + 4 {
        guard += 1;
        match sequencer.tick(now) {
            TickOutcome::Idle => {
                println!("  {:>8}ms  {}", now, "anchor".dimmed());
            }
            TickOutcome::Advanced(index) => {
                println!("  {:>8}ms  reveal vote #{}", now, index + 1);
            }
            TickOutcome::Completed(index) => {
                println!(
                    "  {:>8}ms  reveal vote #{} — {}",
                    now,
                    index + 1,
                    "complete".green().bold()
                );
            }
        }
        now += interval;
    }
    Ok(())
}

fn parse_speed(arg: &str) -> Result<RevealSpeed, String> {
    match arg.to_lowercase().as_str() {
        "instant" | "inf" | "infinite" => Ok(RevealSpeed::Instant),
        other => {
            let multiplier: f32 = other
                .parse()
                .map_err(|_| format!("invalid speed '{other}', use a number or 'instant'"))?;
            if multiplier <= 0.0 {
                return Err("speed must be positive".to_string());
            }
            Ok(RevealSpeed::Multiplier(multiplier))
        }
    }
}
