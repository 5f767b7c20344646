//! Deterministic artifact names derived from a [`ClipSpec`].
//!
//! Names are pure functions of the record, so re-runs resolve to the same
//! paths (the idempotency gate) and the two pipeline variants can find
//! each other's outputs without any shared state. A collision between two
//! distinct records is a manifest-authoring error, not something the
//! pipeline recovers from.
//!
//! # Two-stage naming contract
//!
//! The audio pipeline reads a separately fetched, unmodified source whose
//! name splices a literal `full_` marker in front of the last four
//! characters of the source id. This presumes ids carry a fixed-length
//! suffix from the fetch stage; ids shorter than four characters are
//! rejected. From the intermediate `_audio` artifact name, removing the
//! spliced marker and the `_audio` suffix restores the single-stage output
//! name exactly - the remux step relies on finding the cropped-video
//! artifact at that converged name.

use thiserror::Error;

use crate::manifest::ClipSpec;

/// Marker spliced into two-stage source names by the fetch stage.
pub const FULL_MARKER: &str = "full_";
/// Suffix identifying the two-stage intermediate audio artifact.
pub const AUDIO_SUFFIX: &str = "_audio";
/// Container extension shared by every artifact.
pub const MP4_EXT: &str = ".mp4";
/// Length of the source-id tail the marker is spliced in front of.
pub const SPLICE_TAIL: usize = 4;

/// Errors from two-stage name derivation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
    #[error(
        "source id {0:?} is too short to carry the {SPLICE_TAIL}-character \
         fetch-stage suffix"
    )]
    UnsplittableSourceId(String),
}

impl ClipSpec {
    /// `_S{start}_E{end}_L{left}_T{top}_R{right}_B{bottom}` - the edit
    /// parameters encoded into every artifact name.
    fn edit_suffix(&self) -> String {
        format!(
            "_S{}_E{}_L{}_T{}_R{}_B{}",
            self.start_frame,
            self.end_frame,
            self.crop.left,
            self.crop.top,
            self.crop.right,
            self.crop.bottom
        )
    }

    /// Single-stage input file name: `{source_id}.mp4`.
    pub fn source_filename(&self) -> String {
        format!("{}{}", self.source_id, MP4_EXT)
    }

    /// Single-stage (and converged) output file name:
    /// `{source_id}_S{s}_E{e}_L{l}_T{t}_R{r}_B{b}.mp4`.
    pub fn output_filename(&self) -> String {
        format!("{}{}{}", self.source_id, self.edit_suffix(), MP4_EXT)
    }

    /// Source id with the `full_` marker spliced in front of its last four
    /// characters, per the fetch-stage naming contract.
    pub fn spliced_source_id(&self) -> Result<String, NamingError> {
        let id = &self.source_id;
        let Some(split) = id.len().checked_sub(SPLICE_TAIL) else {
            return Err(NamingError::UnsplittableSourceId(id.clone()));
        };
        if !id.is_char_boundary(split) {
            return Err(NamingError::UnsplittableSourceId(id.clone()));
        }
        Ok(format!("{}{}{}", &id[..split], FULL_MARKER, &id[split..]))
    }

    /// Two-stage input file name: `{spliced_source_id}.mp4`.
    pub fn audio_source_filename(&self) -> Result<String, NamingError> {
        Ok(format!("{}{}", self.spliced_source_id()?, MP4_EXT))
    }

    /// Two-stage intermediate artifact name:
    /// `{spliced_source_id}_S{..}_B{..}_audio.mp4`.
    pub fn audio_filename(&self) -> Result<String, NamingError> {
        Ok(format!(
            "{}{}{}{}",
            self.spliced_source_id()?,
            self.edit_suffix(),
            AUDIO_SUFFIX,
            MP4_EXT
        ))
    }

    /// Cropped-video artifact the remux step consumes, derived from the
    /// intermediate name by dropping the first `full_` marker and the
    /// `_audio` suffix. Equal to [`ClipSpec::output_filename`] whenever the
    /// id does not itself contain the marker ahead of the splice point -
    /// part of why this convention is flagged for manifest-format review.
    pub fn dependency_filename(&self) -> Result<String, NamingError> {
        Ok(strip_audio_suffix(
            &self.audio_filename()?.replacen(FULL_MARKER, "", 1),
        ))
    }

    /// Final two-stage output name, derived from the intermediate name by
    /// dropping only the `_audio` suffix. Keeps the spliced marker, so the
    /// remux never writes over the cropped-video artifact it reads.
    pub fn remux_filename(&self) -> Result<String, NamingError> {
        Ok(strip_audio_suffix(&self.audio_filename()?))
    }
}

/// Remove the `_audio` tag from `{stem}_audio.mp4`; names without the tag
/// pass through unchanged.
fn strip_audio_suffix(name: &str) -> String {
    match name
        .strip_suffix(MP4_EXT)
        .and_then(|stem| stem.strip_suffix(AUDIO_SUFFIX))
    {
        Some(base) => format!("{base}{MP4_EXT}"),
        None => name.to_string(),
    }
}
