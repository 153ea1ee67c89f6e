use thiserror::Error;

/// One stretch of a schedule: `steps` steps taken by compound member `member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    /// Index of the compound member to activate.
    pub member: usize,

    /// Number of steps to take with that member.
    pub steps: usize,
}

impl Segment {
    /// Creates a segment.
    #[must_use]
    pub fn new(member: usize, steps: usize) -> Self {
        Self { member, steps }
    }
}

/// Configuration for the schedule driver.
///
/// A schedule is a non-empty list of [`Segment`]s run in order. By default the
/// observer sees one event per segment; [`with_chunk`](Self::with_chunk)
/// splits each segment into chunks of at most `chunk` steps with an event after
/// each one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawConfig")
)]
pub struct Config {
    segments: Vec<Segment>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    chunk: Option<usize>,
}

/// Errors that can occur when validating a schedule config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("schedule must contain at least one segment")]
    Empty,

    #[error("segment {0} must take at least one step")]
    ZeroSteps(usize),

    #[error("schedule takes more steps in total than fit in a usize")]
    TooManySteps,

    #[error("chunk must be at least one step")]
    ZeroChunk,
}

impl Config {
    /// Creates a config that runs `segments` in order.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is empty, any segment takes zero steps,
    /// or the total step count overflows `usize`.
    pub fn new(segments: Vec<Segment>) -> Result<Self, ConfigError> {
        if segments.is_empty() {
            return Err(ConfigError::Empty);
        }
        if let Some(index) = segments.iter().position(|segment| segment.steps == 0) {
            return Err(ConfigError::ZeroSteps(index));
        }
        segments
            .iter()
            .try_fold(0_usize, |total, segment| total.checked_add(segment.steps))
            .ok_or(ConfigError::TooManySteps)?;

        Ok(Self {
            segments,
            chunk: None,
        })
    }

    /// Returns the config with each segment split into chunks of at most
    /// `chunk` steps.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroChunk`] if `chunk` is zero.
    pub fn with_chunk(self, chunk: usize) -> Result<Self, ConfigError> {
        if chunk == 0 {
            return Err(ConfigError::ZeroChunk);
        }

        Ok(Self {
            chunk: Some(chunk),
            ..self
        })
    }

    /// Returns the segments in run order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the chunk size, if segments are split.
    #[must_use]
    pub fn chunk(&self) -> Option<usize> {
        self.chunk
    }

    /// Returns the total number of steps across all segments.
    ///
    /// Never overflows: [`Config::new`] rejects schedules whose total does not
    /// fit in a `usize`.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.segments.iter().map(|segment| segment.steps).sum()
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawConfig {
    segments: Vec<Segment>,
    #[serde(default)]
    chunk: Option<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let config = Self::new(raw.segments)?;
        match raw.chunk {
            Some(chunk) => config.with_chunk(chunk),
            None => Ok(config),
        }
    }
}
