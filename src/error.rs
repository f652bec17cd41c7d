use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    /// A template row's run lengths do not span its grid row exactly.
    #[error("template row {row} spans {actual} cells, expected {expected}")]
    TemplateShape { row: u8, expected: u8, actual: usize },

    /// The engine reported an attacker count the threat scale cannot
    /// represent. The engine owns that data; nothing meaningful can be
    /// recovered here.
    #[error("engine reported attacker count {count}, which overflows the threat scale")]
    EngineContract { count: u32 },
}
