// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lectern models` and `lectern config` output.

use std::io::IsTerminal;

use lectern_config::{LecternConfig, ModelConfig};

const REDACTED: &str = "<redacted>";

/// Prints the roster. Colors are off with `plain` or when stdout is not a TTY.
pub fn print_roster(config: &LecternConfig, plain: bool) {
    let use_color = !plain && std::io::stdout().is_terminal();

    println!();
    println!("  lectern models");
    println!("  {}", "-".repeat(72));
    println!(
        "    {:<10} {:<10} {:<26} {:<12} {:>7} {:>9}",
        "ID", "PROVIDER", "MODEL", "PRIMARY", "TOKENS", "$/1K"
    );
    for model in &config.models {
        let id = format!("{:<10}", model.id);
        if use_color {
            use colored::Colorize;
            println!("    {} {}", id.green(), details(model));
        } else {
            println!("    {id} {}", details(model));
        }
    }
    println!();
}

fn details(model: &ModelConfig) -> String {
    format!(
        "{:<10} {:<26} {:<12} {:>7} {:>9.4}",
        model.provider.to_string(),
        model.model,
        model.primary_strength,
        model.token_limit,
        model.cost_per_token
    )
}

/// Copy of `config` with API keys masked, for printing.
pub fn redacted(config: &LecternConfig) -> LecternConfig {
    let mut copy = config.clone();
    for provider in [
        &mut copy.providers.openai,
        &mut copy.providers.anthropic,
        &mut copy.providers.gemini,
    ] {
        if provider.api_key.is_some() {
            provider.api_key = Some(REDACTED.to_string());
        }
    }
    copy
}
