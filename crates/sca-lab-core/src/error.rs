use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("label '{label}' is declared numeric but '{value}' contains no digits")]
    LabelFormat { label: String, value: String },
    #[error("run [{run}] has no value for numeric label '{label}'")]
    MissingLabel { label: String, run: String },
    #[error("no catalogue entry produced a result; nothing to tabulate")]
    EmptyBatch,
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("unknown label '{0}'")]
    UnknownLabel(String),
}
