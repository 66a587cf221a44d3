// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared configuration and message fixtures.

use lectern_config::LecternConfig;
use lectern_core::Message;

/// The stock three-model roster with the blended-signal weights used across
/// coordinator tests: floor 0.3, two sections per model.
pub fn three_model_config() -> LecternConfig {
    let mut config = LecternConfig::default();
    config.assignment.keyword_weight = 0.6;
    config.assignment.semantic_weight = 0.4;
    config
}

pub fn technical_messages() -> Vec<Message> {
    vec![Message::new(
        "The algorithm implements a distributed consensus protocol using Byzantine fault tolerance.\n\
         System architecture includes redundant data structures for efficient processing.\n\
         Technical implementation details focus on optimization and performance metrics.",
    )]
}

pub fn contextual_messages() -> Vec<Message> {
    vec![Message::new(
        "Historical development of the pattern shows evolution over time.\n\
         Background context reveals important relationships between components.\n\
         Understanding the history helps explain current design choices.",
    )]
}

/// Roughly equal technical, historical, and cultural vocabulary.
pub fn mixed_messages() -> Vec<Message> {
    vec![Message::new(
        "The system architecture implements advanced algorithms.\n\
         Historical context shows how the pattern evolved.\n\
         Cultural implications suggest important perspectives.",
    )]
}
