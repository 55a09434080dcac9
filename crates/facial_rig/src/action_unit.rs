use thiserror::Error;

/// Upper bound of the weight range; weights live in `[0, MAX_WEIGHT]`.
pub const MAX_WEIGHT: f32 = 100.0;

/// An error that occurs when building a rig from morph-target names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RigError {
    #[error("blend shape name {name:?} mentions AU but carries no AU_ code")]
    MalformedAuName { name: String },
}

/// A single facial action unit: one independently weighted morph target
/// following the `AU_..` naming convention.
///
/// Name and morph index are fixed at discovery; only the weight moves.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionUnit {
    code: String,
    morph_index: usize,
    weight: f32,
}

impl ActionUnit {
    /// Canonical five-character code, e.g. `"AU_04"`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Index of the backing morph target in the mesh's target table.
    pub fn morph_index(&self) -> usize {
        self.morph_index
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub(crate) fn set_weight(&mut self, weight: f32) {
        self.weight = clamp_weight(weight);
    }
}

pub(crate) fn clamp_weight(weight: f32) -> f32 {
    weight.clamp(0.0, MAX_WEIGHT)
}

/// Extracts the canonical action unit code from a blend shape name: the
/// first occurrence of `"AU_"` plus the two characters that follow it.
/// Returns `None` when the name holds no such code.
pub fn au_code(name: &str) -> Option<&str> {
    let start = name.find("AU_")?;
    let rest = &name[start..];
    let end = rest
        .char_indices()
        .nth(5)
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let code = &rest[..end];
    (code.chars().count() == 5).then_some(code)
}

fn is_lateral(name: &str) -> bool {
    name.contains("_L_") || name.contains("_R_")
}

/// Scans an ordered list of morph-target names and registers one
/// [`ActionUnit`] per qualifying name: contains `"AU"`, carries no
/// left/right laterality marker, and yields a canonical code.
///
/// A name that passes the substring filter but fails code extraction is a
/// malformed asset naming convention and fails the whole scan. Zero
/// qualifying names is a valid (empty) result.
pub fn discover_action_units<'a, I>(names: I) -> Result<Vec<ActionUnit>, RigError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut units = Vec::new();
    for (index, name) in names.into_iter().enumerate() {
        if !name.contains("AU") || is_lateral(name) {
            continue;
        }
        let code = au_code(name).ok_or_else(|| RigError::MalformedAuName {
            name: name.to_owned(),
        })?;
        tracing::debug!(code, index, "discovered action unit");
        units.push(ActionUnit {
            code: code.to_owned(),
            morph_index: index,
            weight: 0.0,
        });
    }
    if units.is_empty() {
        tracing::warn!("no action units discovered in morph target names");
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_extraction_takes_first_match() {
        assert_eq!(au_code("AU_04"), Some("AU_04"));
        assert_eq!(au_code("Face.AU_12_Lip"), Some("AU_12"));
        assert_eq!(au_code("AU_01_AU_02"), Some("AU_01"));
        assert_eq!(au_code("Basis"), None);
        assert_eq!(au_code("AU_4"), None);
    }

    #[test]
    fn discovery_keeps_morph_indices() {
        let names = ["Basis", "AU_04", "Smile", "AU_26_Jaw"];
        let units = discover_action_units(names).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].code(), "AU_04");
        assert_eq!(units[0].morph_index(), 1);
        assert_eq!(units[1].code(), "AU_26");
        assert_eq!(units[1].morph_index(), 3);
        assert!(units.iter().all(|au| au.weight() == 0.0));
    }

    #[test]
    fn discovery_skips_lateral_shapes() {
        let names = ["AU_12_L_Lip", "AU_12_R_Lip", "AU_12"];
        let units = discover_action_units(names).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].morph_index(), 2);
    }

    #[test]
    fn discovery_codes_are_five_chars() {
        let names = ["AU_01", "Brow_AU_02_Outer", "AU_06_Cheek"];
        for au in discover_action_units(names).unwrap() {
            assert_eq!(au.code().chars().count(), 5);
            assert!(au.code().starts_with("AU_"));
        }
    }

    #[test]
    fn malformed_name_fails_discovery() {
        let names = ["AU_04", "browAU"];
        let err = discover_action_units(names).unwrap_err();
        assert_eq!(
            err,
            RigError::MalformedAuName {
                name: "browAU".to_owned()
            }
        );
    }

    #[test]
    fn empty_discovery_is_valid() {
        let units = discover_action_units(["Basis", "Smile"]).unwrap();
        assert!(units.is_empty());
    }
}
