use crate::config::DEFAULT_COMBO;
use crate::error::ConfigError;
use crate::geometry::ZoneId;

/// Fixed, non-empty sequence of zones to hit.
///
/// Steps are stored as [`ZoneId`]s, so every step is a valid index into a
/// complete zone set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboScript {
    steps: Vec<ZoneId>,
}

impl ComboScript {
    pub fn from_indices(indices: &[usize]) -> Result<Self, ConfigError> {
        if indices.is_empty() {
            return Err(ConfigError::Invalid("combo must contain at least one step".into()));
        }
        let steps = indices
            .iter()
            .map(|&idx| {
                ZoneId::from_index(idx).ok_or_else(|| {
                    ConfigError::Invalid(format!("combo zone index {idx} is out of range"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Zone for `step`. Callers keep `step < len()`.
    pub fn zone_at(&self, step: usize) -> ZoneId {
        self.steps[step]
    }

    pub fn steps(&self) -> &[ZoneId] {
        &self.steps
    }
}

impl Default for ComboScript {
    fn default() -> Self {
        Self { steps: DEFAULT_COMBO.iter().filter_map(|&i| ZoneId::from_index(i)).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_combo() {
        let combo = ComboScript::default();
        assert_eq!(combo.len(), 8);
        assert_eq!(combo.zone_at(0), ZoneId::Jab);
        assert_eq!(combo.zone_at(7), ZoneId::LeftHook);
        assert_eq!(ComboScript::from_indices(&DEFAULT_COMBO).unwrap(), combo);
    }

    #[test]
    fn test_rejects_invalid_indices() {
        assert!(ComboScript::from_indices(&[]).is_err());
        assert!(ComboScript::from_indices(&[0, 6]).is_err());
        assert!(ComboScript::from_indices(&[5, 5, 5]).is_ok());
    }
}
