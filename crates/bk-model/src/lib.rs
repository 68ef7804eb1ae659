//! bk-model: the equipment profile entity and its BeerXML file format.

pub mod beerxml;
pub mod equipment;
pub mod field;
pub mod load;
pub mod record;
pub mod validate;

pub use beerxml::{
    parse_equipment, parse_equipment_with_reports, parse_records, write_equipment, write_records,
};
pub use equipment::{ChangeCallback, Equipment, SCHEMA_VERSION, SetResult, cmp_by_name};
pub use field::{Bound, EquipmentField};
pub use load::{EQUIPMENT_TAG, LoadReport, RejectedField};
pub use record::{FieldNode, Record, TextError};
pub use validate::ValidationError;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Unclosed <{tag}> opened at line {line}")]
    Truncated { tag: String, line: usize },

    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn load_file(path: &std::path::Path) -> ModelResult<Vec<Equipment>> {
    let content = std::fs::read_to_string(path)?;
    parse_equipment(&content)
}

pub fn load_file_with_reports(
    path: &std::path::Path,
) -> ModelResult<Vec<(Equipment, LoadReport)>> {
    let content = std::fs::read_to_string(path)?;
    parse_equipment_with_reports(&content)
}

pub fn save_file(path: &std::path::Path, profiles: &[Equipment]) -> ModelResult<()> {
    let content = write_equipment(profiles)?;
    std::fs::write(path, content)?;
    tracing::debug!(
        "wrote {} equipment profile(s) to {}",
        profiles.len(),
        path.display()
    );
    Ok(())
}
