use crate::error::ConfigError;
use core::fmt::{self, Display};

/// The branches the versioning rules tell apart.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BranchClass {
    /// Releases: `1.2.3`.
    Master,
    /// Release candidates: `1.2.3-rc1`.
    Dev,
    /// Feature and merge request branches: `1.2.3.1-dev1+name`.
    Other,
}

/// A branch name, sanitized so it can be used as semver build metadata.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Branch {
    name: String,
    class: BranchClass,
}

impl Branch {
    /// Sanitizes a ref name such as `DEVOPS-1234` into `devops1234`.
    ///
    /// Everything but ASCII letters and digits is dropped and the rest is lower-cased, so the
    /// result is always a single valid build identifier.
    ///
    /// # Errors
    ///
    /// - If nothing is left after sanitizing, returns [ConfigError::EmptyBranch].
    pub fn parse(ref_name: &str) -> Result<Self, ConfigError> {
        let name: String = ref_name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let class = match name.as_str() {
            "" => {
                return Err(ConfigError::EmptyBranch {
                    ref_name: ref_name.to_owned(),
                })
            }
            "master" => BranchClass::Master,
            "dev" => BranchClass::Dev,
            _ => BranchClass::Other,
        };

        Ok(Self { name, class })
    }

    /// The sanitized name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Which rules apply on this branch.
    pub fn class(&self) -> BranchClass {
        self.class
    }

    /// Returns true for `master` and `dev`.
    pub fn is_long_lived(&self) -> bool {
        self.class != BranchClass::Other
    }
}

impl Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("master", "master", BranchClass::Master)]
    #[case("Dev", "dev", BranchClass::Dev)]
    #[case("DEVOPS-1234", "devops1234", BranchClass::Other)]
    #[case("feature/BIOMED-12_fix", "featurebiomed12fix", BranchClass::Other)]
    #[case("de-v", "dev", BranchClass::Dev)]
    #[case("develop", "develop", BranchClass::Other)]
    fn test_parse(#[case] ref_name: &str, #[case] name: &str, #[case] class: BranchClass) {
        let branch = Branch::parse(ref_name).unwrap();
        assert_eq!(name, branch.name());
        assert_eq!(class, branch.class());
        assert_eq!(class != BranchClass::Other, branch.is_long_lived());
    }

    #[test]
    fn test_parse_empty() {
        for ref_name in ["", "---", "/_"] {
            assert_eq!(
                Err(ConfigError::EmptyBranch {
                    ref_name: ref_name.to_owned()
                }),
                Branch::parse(ref_name)
            );
        }
    }
}
