use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("unknown filter group: {0}")]
    UnknownGroup(String),
    #[error("unknown filter rule: {0}")]
    UnknownRule(String),
    #[error("operator {operator} is not valid for {kind} fields")]
    IncompatibleOperator { operator: String, kind: String },
    #[error("column {0} is not custom and cannot be removed")]
    NotRemovable(String),
    #[error("no filterable column available for a new rule")]
    NoFilterableColumn,
}

pub type Result<T> = std::result::Result<T, ModelError>;
