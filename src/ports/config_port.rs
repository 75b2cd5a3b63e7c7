//! Configuration access port trait.

use crate::domain::error::SimtraderError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Comma-separated list of numbers; `None` when the key is absent or blank.
    fn get_double_list(&self, section: &str, key: &str) -> Result<Option<Vec<f64>>, SimtraderError> {
        let raw = match self.get_string(section, key) {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Ok(None),
        };
        raw.split(',')
            .map(|token| {
                token.trim().parse::<f64>().map_err(|_| {
                    SimtraderError::invalid(section, key, format!("'{}' is not a number", token.trim()))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}
