use core::fmt::{self, Display};

/// Which component of `major.minor.patch` a bump increments.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum BumpLevel {
    /// The major level. It is greater than the minor and patch levels.
    Major,
    /// The minor level. It is less than the major level and greater than the patch level.
    Minor,
    /// The patch level. It is less than the major and minor levels. Used when no label asks for
    /// anything else.
    #[default]
    Patch,
}

impl BumpLevel {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            BumpLevel::Major => "major",
            BumpLevel::Minor => "minor",
            BumpLevel::Patch => "patch",
        }
    }

    fn order_key(&self) -> u8 {
        match self {
            BumpLevel::Major => 0,
            BumpLevel::Minor => 1,
            BumpLevel::Patch => 2,
        }
    }

    /// Picks the bump level requested by merge request labels.
    ///
    /// Labels are matched case-insensitively and surrounding whitespace is ignored. `major` wins
    /// over `minor`; anything else (including no labels) means [BumpLevel::Patch].
    pub fn from_labels<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        labels
            .into_iter()
            .filter_map(|label| match label.as_ref().trim().to_ascii_uppercase().as_str() {
                "MAJOR" => Some(BumpLevel::Major),
                "MINOR" => Some(BumpLevel::Minor),
                _ => None,
            })
            .max()
            .unwrap_or_default()
    }
}

impl Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialOrd for BumpLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BumpLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // reverse it so e.g. major > minor
        other.order_key().cmp(&self.order_key())
    }
}
