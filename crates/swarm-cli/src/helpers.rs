//! Shared CLI helpers — response and usage printing.

use colored::Colorize;
use swarm_usage::{UsageRecord, UsageTotals};

/// Format a USD cost with enough precision for sub-cent calls.
pub fn format_cost(cost: f64) -> String {
    format!("${:.6}", cost)
}

/// Status marker for a configured / missing item.
pub fn check_mark(ok: bool) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        "·".dimmed().to_string()
    }
}

/// Print completion texts to stdout, numbering them when there are several.
pub fn print_response(texts: &[String]) {
    println!();
    println!("{}", "🐝 Swarm".cyan().bold());
    match texts {
        [] => println!("{}", "(no response)".dimmed()),
        [single] if single.is_empty() => println!("{}", "(empty response)".dimmed()),
        [single] => println!("{single}"),
        many => {
            for (i, text) in many.iter().enumerate() {
                println!("{} {}", format!("[{}]", i + 1).bold(), text);
            }
        }
    }
    println!();
}

/// Print each usage record and the running totals.
pub fn print_usage(records: &[UsageRecord], totals: &UsageTotals) {
    println!("  {}", "Usage:".bold());
    for record in records {
        let outcome = if record.success {
            "ok".green().to_string()
        } else {
            "failed".red().to_string()
        };
        println!(
            "    {:<20} {:>6} in {:>6} out  {:>12}  {:>6} ms  {}",
            record.model,
            record.prompt_tokens,
            record.completion_tokens,
            format_cost(record.cost),
            record.latency_ms(),
            outcome,
        );
    }
    println!(
        "  {:<18} {} ({} prompt + {} completion tokens)",
        "Total cost:".bold(),
        format_cost(totals.cost),
        totals.prompt_tokens,
        totals.completion_tokens,
    );
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
